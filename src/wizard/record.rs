//! Onboarding record and the patches merged into it.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Company headcount bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanySize {
    #[serde(rename = "micro")]
    Micro,
    #[serde(rename = "pequena")]
    Small,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "grande")]
    Large,
}

impl CompanySize {
    pub const ALL: [CompanySize; 4] = [Self::Micro, Self::Small, Self::Medium, Self::Large];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Micro => "micro",
            Self::Small => "pequena",
            Self::Medium => "media",
            Self::Large => "grande",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

/// Business sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Industry {
    Tecnologia,
    Varejo,
    Servicos,
    Industria,
    Saude,
    Educacao,
    Financeiro,
    Agricultura,
    Construcao,
    Outros,
}

impl Industry {
    pub const ALL: [Industry; 10] = [
        Self::Tecnologia,
        Self::Varejo,
        Self::Servicos,
        Self::Industria,
        Self::Saude,
        Self::Educacao,
        Self::Financeiro,
        Self::Agricultura,
        Self::Construcao,
        Self::Outros,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Tecnologia => "tecnologia",
            Self::Varejo => "varejo",
            Self::Servicos => "servicos",
            Self::Industria => "industria",
            Self::Saude => "saude",
            Self::Educacao => "educacao",
            Self::Financeiro => "financeiro",
            Self::Agricultura => "agricultura",
            Self::Construcao => "construcao",
            Self::Outros => "outros",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportTier {
    Basic,
    Standard,
    Premium,
}

impl SupportTier {
    pub const ALL: [SupportTier; 3] = [Self::Basic, Self::Standard, Self::Premium];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactChannel {
    Email,
    Phone,
    Chat,
}

impl ContactChannel {
    pub const ALL: [ContactChannel; 3] = [Self::Email, Self::Phone, Self::Chat];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Chat => "chat",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

/// Communication and support preferences collected together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPreferences {
    pub notifications_enabled: bool,
    pub newsletter_enabled: bool,
    pub support_tier: SupportTier,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub preferred_channel: ContactChannel,
}

/// Metadata of a file picked on the upload step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub name: String,
    pub size_bytes: u64,
    /// `None` when the content is not text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_count: Option<usize>,
}

impl FileReference {
    /// Read a file from disk and capture its name, size and line count.
    pub async fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let line_count = std::str::from_utf8(&bytes).ok().map(|s| s.lines().count());
        Ok(Self {
            name,
            size_bytes: bytes.len() as u64,
            line_count,
        })
    }
}

/// What the client handed over for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UploadedContent {
    Text(String),
    File(FileReference),
}

impl UploadedContent {
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::Text(text) => text.len() as u64,
            Self::File(file) => file.size_bytes,
        }
    }

    pub fn line_count(&self) -> Option<usize> {
        match self {
            Self::Text(text) => Some(text.lines().count()),
            Self::File(file) => file.line_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Pending,
    Success,
    Failed,
}

/// Outcome of the (simulated) file validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub message: String,
    pub log_dump: String,
}

/// Data accumulated across steps. A field is "set" when it is `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<CompanySize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<Industry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_content: Option<UploadedContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_processing_options: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_result: Option<ValidationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_goals: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_integrations: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_preferences: Option<ContactPreferences>,
}

/// Partial record produced by a step. `None` means "not part of this patch".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<CompanySize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<Industry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_content: Option<UploadedContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_processing_options: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_result: Option<ValidationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_goals: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_integrations: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_preferences: Option<ContactPreferences>,
}

impl RecordPatch {
    /// Whether the patch carries no keys at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Names of the keys this patch carries.
    pub fn keys(&self) -> Vec<&'static str> {
        field_names(
            [
                self.client_name.is_some(),
                self.tax_id.is_some(),
                self.company_size.is_some(),
                self.industry.is_some(),
                self.uploaded_content.is_some(),
                self.selected_processing_options.is_some(),
                self.validation_result.is_some(),
                self.main_goals.is_some(),
                self.selected_integrations.is_some(),
                self.contact_preferences.is_some(),
            ],
        )
    }
}

const FIELD_NAMES: [&str; 10] = [
    "clientName",
    "taxId",
    "companySize",
    "industry",
    "uploadedContent",
    "selectedProcessingOptions",
    "validationResult",
    "mainGoals",
    "selectedIntegrations",
    "contactPreferences",
];

fn field_names(present: [bool; 10]) -> Vec<&'static str> {
    FIELD_NAMES
        .iter()
        .zip(present)
        .filter_map(|(name, set)| set.then_some(*name))
        .collect()
}

impl OnboardingRecord {
    /// Shallow merge: every key present in `patch` replaces the record's
    /// value wholesale; absent keys leave the record untouched.
    pub fn merge(mut self, patch: RecordPatch) -> Self {
        self.apply(patch);
        self
    }

    /// In-place form of [`OnboardingRecord::merge`].
    pub fn apply(&mut self, patch: RecordPatch) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        let RecordPatch {
            client_name,
            tax_id,
            company_size,
            industry,
            uploaded_content,
            selected_processing_options,
            validation_result,
            main_goals,
            selected_integrations,
            contact_preferences,
        } = patch;

        take(&mut self.client_name, client_name);
        take(&mut self.tax_id, tax_id);
        take(&mut self.company_size, company_size);
        take(&mut self.industry, industry);
        take(&mut self.uploaded_content, uploaded_content);
        take(
            &mut self.selected_processing_options,
            selected_processing_options,
        );
        take(&mut self.validation_result, validation_result);
        take(&mut self.main_goals, main_goals);
        take(&mut self.selected_integrations, selected_integrations);
        take(&mut self.contact_preferences, contact_preferences);
    }

    /// camelCase names of the fields that have been set.
    pub fn populated_fields(&self) -> Vec<&'static str> {
        field_names([
            self.client_name.is_some(),
            self.tax_id.is_some(),
            self.company_size.is_some(),
            self.industry.is_some(),
            self.uploaded_content.is_some(),
            self.selected_processing_options.is_some(),
            self.validation_result.is_some(),
            self.main_goals.is_some(),
            self.selected_integrations.is_some(),
            self.contact_preferences.is_some(),
        ])
    }
}
