use std::sync::Arc;

use onboarding_wizard::config::WizardConfig;
use onboarding_wizard::console::{Console, HELP};
use onboarding_wizard::effects::{LoggingEffects, SimulatedMailer};
use onboarding_wizard::telemetry;
use onboarding_wizard::wizard::OnboardingSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_dir = telemetry::log_dir_from_env();
    let _guard = telemetry::init_tracing(log_dir.as_deref())?;

    let config = WizardConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("Onboarding Wizard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Flow: {:?}", config.flow);
    eprintln!("   Upload mode: {:?}", config.upload_mode);
    eprintln!("   Finish gate: {:?}", config.finish_gate);
    if let Some(dir) = &log_dir {
        eprintln!("   Log file: {}", dir.join(telemetry::LOG_FILE_NAME).display());
    }
    eprintln!("\n{HELP}\n");

    let session = OnboardingSession::new(config, Arc::new(LoggingEffects), Arc::new(SimulatedMailer));
    let mut console = Console::new(session);
    console.run().await?;

    tracing::info!("Shutting down");
    Ok(())
}
