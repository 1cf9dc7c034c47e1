//! Console host: stdin/stdout loop driving an [`OnboardingSession`].
//!
//! Plain text rendering only. All validation lives in the steps.

use std::fmt::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error};

use crate::config::UploadMode;
use crate::steps::{ActiveStep, EmailSendStatus, SubmitOutcome};
use crate::wizard::catalog::{
    GOALS, INTEGRATIONS, Manual, PROCESSING_OPTIONS, company_size_label, contact_label,
    industry_label, support_label,
};
use crate::wizard::record::{CompanySize, ContactChannel, Industry, SupportTier};
use crate::wizard::session::{OnboardingSession, UploadValidation};

/// What `download` should fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadTarget {
    Manual(Manual),
    Summary,
}

/// One console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Set { field: String, value: String },
    Toggle(String),
    File(String),
    Next,
    Back,
    Validate,
    Send,
    Download(DownloadTarget),
    Finish,
    Help,
    Quit,
}

pub const HELP: &str = "\
Comandos:
  show                  mostra a etapa atual
  set <campo> <valor>   preenche um campo
  toggle <id>           marca ou desmarca uma opção
  file <caminho>        anexa um arquivo (etapa de validação)
  next                  continua para a próxima etapa
  back                  volta para a etapa anterior
  validate              executa o validador de arquivos
  send                  envia o email de ativação
  download <alvo>       client | files | summary
  finish                conclui o onboarding
  help                  mostra esta ajuda
  quit                  sai";

/// Parse a trimmed input line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let need_arg = |name: &str| {
        if rest.is_empty() {
            Err(format!("uso: {name} <argumento>"))
        } else {
            Ok(rest.to_string())
        }
    };

    match verb.to_lowercase().as_str() {
        "show" | "" => Ok(Command::Show),
        "set" => {
            let Some((field, value)) = rest.split_once(char::is_whitespace) else {
                return match rest {
                    "" => Err("uso: set <campo> <valor>".to_string()),
                    field => Ok(Command::Set {
                        field: field.to_string(),
                        value: String::new(),
                    }),
                };
            };
            Ok(Command::Set {
                field: field.to_string(),
                value: value.trim().to_string(),
            })
        }
        "toggle" => need_arg("toggle").map(Command::Toggle),
        "file" => need_arg("file").map(Command::File),
        "next" => Ok(Command::Next),
        "back" => Ok(Command::Back),
        "validate" => Ok(Command::Validate),
        "send" => Ok(Command::Send),
        "download" => {
            let target = need_arg("download")?;
            if target == "summary" {
                Ok(Command::Download(DownloadTarget::Summary))
            } else {
                Manual::from_key(&target)
                    .map(|m| Command::Download(DownloadTarget::Manual(m)))
                    .ok_or_else(|| format!("alvo desconhecido: {target}"))
            }
        }
        "finish" => Ok(Command::Finish),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "/quit" => Ok(Command::Quit),
        other => Err(format!("comando desconhecido: {other} (digite help)")),
    }
}

/// Text reply to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn say(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

pub struct Console {
    session: OnboardingSession,
}

impl Console {
    pub fn new(session: OnboardingSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &OnboardingSession {
        &self.session
    }

    /// Run one command against the session.
    pub async fn handle(&mut self, command: Command) -> Reply {
        debug!(?command, "Console command");
        match command {
            Command::Show => Reply::say(render(&self.session)),
            Command::Help => Reply::say(HELP),
            Command::Quit => Reply {
                text: "Até logo!".to_string(),
                quit: true,
            },
            Command::Set { field, value } => match self.session.set_field(&field, &value) {
                Ok(()) => Reply::say(render_step(&self.session)),
                Err(e) => Reply::say(format!("Erro: {e}")),
            },
            Command::Toggle(id) => match self.session.toggle(&id) {
                Ok(()) => Reply::say(render_step(&self.session)),
                Err(e) => Reply::say(format!("Erro: {e}")),
            },
            Command::File(path) => match self.session.attach_file(&path).await {
                Ok(file) => Reply::say(format!(
                    "Arquivo anexado: {} ({} bytes)",
                    file.name, file.size_bytes
                )),
                Err(e) => Reply::say(format!("Erro: {e}")),
            },
            Command::Next => match self.session.submit() {
                SubmitOutcome::Advanced { from, to } if from == to => {
                    Reply::say("Esta é a última etapa. Use finish para concluir.")
                }
                SubmitOutcome::Advanced { .. } => Reply::say(render(&self.session)),
                SubmitOutcome::Rejected(_) => Reply::say(render_step(&self.session)),
            },
            Command::Back => {
                if self.session.back() {
                    Reply::say(render(&self.session))
                } else {
                    Reply::say("Você já está na primeira etapa.")
                }
            }
            Command::Validate => match self.session.validate_upload().await {
                Ok(UploadValidation::Completed(result)) => {
                    Reply::say(format!("{}\n\n{}", result.message, result.log_dump))
                }
                Ok(UploadValidation::Rejected(_)) => Reply::say(render_step(&self.session)),
                Err(e) => Reply::say(format!("Erro: {e}")),
            },
            Command::Send => match self.session.send_activation_email().await {
                Ok(EmailSendStatus::Sent) => Reply::say("Email de ativação enviado!"),
                Ok(EmailSendStatus::Failed(reason)) => {
                    Reply::say(format!("Falha no envio: {reason}. Tente novamente."))
                }
                Ok(status) => Reply::say(format!("Status do envio: {status:?}")),
                Err(e) => Reply::say(format!("Erro: {e}")),
            },
            Command::Download(DownloadTarget::Manual(manual)) => {
                match self.session.download_manual(manual) {
                    Ok(ack) => Reply::say(ack),
                    Err(e) => Reply::say(format!("Erro: {e}")),
                }
            }
            Command::Download(DownloadTarget::Summary) => match self.session.download_summary() {
                Ok(ack) => Reply::say(ack),
                Err(e) => Reply::say(format!("Erro: {e}")),
            },
            Command::Finish => match self.session.finish() {
                Ok(ack) => Reply {
                    text: ack,
                    quit: true,
                },
                Err(e) => Reply::say(format!("Erro: {e}")),
            },
        }
    }

    /// Read commands from stdin until `quit`, `finish` or EOF.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("{}\n", render(&self.session));
        eprint!("> ");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("Error reading stdin: {}", e);
                    return Err(e.into());
                }
            };

            let reply = match parse_command(&line) {
                Ok(command) => {
                    if matches!(command, Command::Validate | Command::Send) {
                        eprintln!("Processando...");
                    }
                    self.handle(command).await
                }
                Err(message) => Reply::say(message),
            };

            println!("\n{}\n", reply.text);
            if reply.quit {
                break;
            }
            eprint!("> ");
        }
        Ok(())
    }
}

/// Progress header plus the active step.
pub fn render(session: &OnboardingSession) -> String {
    let mut out = String::new();
    let controller = session.controller();
    let _ = writeln!(
        out,
        "Etapa {} de {} ({}% completo)",
        controller.current_step(),
        controller.total_steps(),
        session.progress_percent()
    );
    for status in session.steps() {
        let mark = if status.completed {
            "x"
        } else if status.current {
            ">"
        } else {
            " "
        };
        let _ = writeln!(out, "  [{mark}] {}. {}", status.index, status.label);
    }
    out.push('\n');
    out.push_str(&render_step(session));
    out
}

/// Body of the active step, with any field errors.
pub fn render_step(session: &OnboardingSession) -> String {
    let mut out = String::new();
    let active = session.active_step();
    let _ = writeln!(out, "== {} ==", active.kind().label());

    match active {
        ActiveStep::Identification(step) => {
            let _ = writeln!(out, "clientName: {}", step.client_name);
            let _ = writeln!(out, "taxId: {}", step.tax_id);
        }
        ActiveStep::CompanyProfile(step) => {
            let size = step.company_size.map(|s| company_size_label(s.key()));
            let industry = step.industry.map(|i| industry_label(i.key()));
            let _ = writeln!(out, "companySize: {}", size.unwrap_or("-"));
            let _ = writeln!(out, "industry: {}", industry.unwrap_or("-"));
            let sizes: Vec<&str> = CompanySize::ALL.iter().map(|s| s.key()).collect();
            let industries: Vec<&str> = Industry::ALL.iter().map(|i| i.key()).collect();
            let _ = writeln!(out, "  portes: {}", sizes.join(", "));
            let _ = writeln!(out, "  setores: {}", industries.join(", "));
        }
        ActiveStep::Manuals(step) => {
            let manuals = [
                ("client", Manual::ClientInstallation),
                ("files", Manual::FileStandard),
            ];
            for (key, manual) in manuals {
                let done = if step.was_downloaded(manual) {
                    " (baixado)"
                } else {
                    ""
                };
                let _ = writeln!(out, "[{key}] {}{done}", manual.title());
                let _ = writeln!(out, "    {}", manual.description());
            }
        }
        ActiveStep::Upload(step) => {
            let _ = writeln!(out, "modo: {:?}", step.mode());
            match &step.file {
                Some(file) => {
                    let _ = writeln!(out, "arquivo: {} ({} bytes)", file.name, file.size_bytes);
                }
                None if step.text.is_empty() => {
                    let _ = writeln!(out, "conteúdo: (vazio)");
                }
                None => {
                    let _ = writeln!(out, "conteúdo: {} linha(s)", step.text.lines().count());
                }
            }
            if !step.options.is_empty() || step.mode() == UploadMode::SingleFileWithOptions {
                for option in PROCESSING_OPTIONS {
                    let mark = if step.options.contains(option.id) { "x" } else { " " };
                    let _ = writeln!(out, "  [{mark}] {} - {}", option.id, option.label);
                }
            }
        }
        ActiveStep::Results(_) => match session.results_view() {
            Ok(view) => {
                let _ = writeln!(out, "{}: {}", view.heading, view.detail);
                let _ = writeln!(out, "\n{}", view.log_dump);
            }
            Err(e) => {
                let _ = writeln!(out, "Erro: {e}");
            }
        },
        ActiveStep::Goals(step) => {
            for goal in GOALS {
                let mark = if step.selected.contains(goal.id) { "x" } else { " " };
                let _ = writeln!(out, "  [{mark}] {} - {}: {}", goal.id, goal.label, goal.description);
            }
            let _ = writeln!(out, "{}", step.selection_summary());
        }
        ActiveStep::Integrations(step) => {
            for integration in INTEGRATIONS {
                let mark = if step.selected.contains(integration.id) { "x" } else { " " };
                let _ = writeln!(out, "  [{mark}] {} - {}", integration.id, integration.label);
            }
        }
        ActiveStep::Preferences(step) => {
            let _ = writeln!(out, "notificationsEnabled: {}", step.notifications_enabled);
            let _ = writeln!(out, "newsletterEnabled: {}", step.newsletter_enabled);
            let support = step.support_tier.map(|t| support_label(t.key()));
            let channel = step.preferred_channel.map(|c| contact_label(c.key()));
            let _ = writeln!(out, "supportTier: {}", support.unwrap_or("-"));
            let _ = writeln!(out, "email: {}", step.email);
            let _ = writeln!(out, "phone: {}", step.phone);
            let _ = writeln!(out, "preferredChannel: {}", channel.unwrap_or("-"));
            let tiers: Vec<&str> = SupportTier::ALL.iter().map(|t| t.key()).collect();
            let channels: Vec<&str> = ContactChannel::ALL.iter().map(|c| c.key()).collect();
            let _ = writeln!(out, "  planos: {}", tiers.join(", "));
            let _ = writeln!(out, "  canais: {}", channels.join(", "));
        }
        ActiveStep::Activation(_) => {
            let _ = writeln!(out, "{}", session.summary());
            let _ = writeln!(out, "\nEmail de ativação: {:?}", session.email_status());
            let finish = if session.finish_enabled() { "habilitado" } else { "aguardando envio" };
            let _ = writeln!(out, "Finalizar: {finish}");
        }
    }

    let errors = active.view().errors();
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "! {field}: {message}");
    }
    out
}
