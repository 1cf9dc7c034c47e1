//! Static catalogs: step order, option tables and display-label lookups.
//!
//! Everything here is fixed configuration. Keys are the stable identifiers
//! stored in the record; labels are what the user sees.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One screen of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Identification,
    CompanyProfile,
    Manuals,
    Upload,
    Results,
    Goals,
    Integrations,
    Preferences,
    Activation,
}

impl StepKind {
    /// Display label shown in the progress indicator.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Identification => "Informações iniciais",
            Self::CompanyProfile => "Perfil da empresa",
            Self::Manuals => "Manuais",
            Self::Upload => "Validação",
            Self::Results => "Resultado",
            Self::Goals => "Objetivos",
            Self::Integrations => "Integrações",
            Self::Preferences => "Preferências",
            Self::Activation => "Ativação",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Identification => "identification",
            Self::CompanyProfile => "company_profile",
            Self::Manuals => "manuals",
            Self::Upload => "upload",
            Self::Results => "results",
            Self::Goals => "goals",
            Self::Integrations => "integrations",
            Self::Preferences => "preferences",
            Self::Activation => "activation",
        };
        write!(f, "{s}")
    }
}

/// Ordered list of steps the wizard walks through.
///
/// Never empty and never contains the same step twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCatalog {
    steps: Vec<StepKind>,
}

impl StepCatalog {
    /// Build a catalog from an explicit order.
    pub fn new(steps: Vec<StepKind>) -> Result<Self, ConfigError> {
        if steps.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "steps".to_string(),
                message: "step catalog must contain at least one step".to_string(),
            });
        }
        for (i, step) in steps.iter().enumerate() {
            if steps[..i].contains(step) {
                return Err(ConfigError::InvalidValue {
                    key: "steps".to_string(),
                    message: format!("step {step} appears more than once"),
                });
            }
        }
        Ok(Self { steps })
    }

    /// The five-step product flow: identification, manuals, upload,
    /// results, activation.
    pub fn classic() -> Self {
        Self {
            steps: vec![
                StepKind::Identification,
                StepKind::Manuals,
                StepKind::Upload,
                StepKind::Results,
                StepKind::Activation,
            ],
        }
    }

    /// Full flow including profile, goals, integrations and preferences.
    pub fn extended() -> Self {
        Self {
            steps: vec![
                StepKind::Identification,
                StepKind::CompanyProfile,
                StepKind::Goals,
                StepKind::Integrations,
                StepKind::Manuals,
                StepKind::Upload,
                StepKind::Results,
                StepKind::Preferences,
                StepKind::Activation,
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at a 1-based index.
    pub fn get(&self, index: usize) -> Option<StepKind> {
        index.checked_sub(1).and_then(|i| self.steps.get(i)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = StepKind> + '_ {
        self.steps.iter().copied()
    }
}

/// A selectable catalog entry (goal, integration or processing option).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

const fn entry(id: &'static str, label: &'static str, description: &'static str) -> CatalogEntry {
    CatalogEntry {
        id,
        label,
        description,
    }
}

/// Business goals offered on the goals step.
pub const GOALS: [CatalogEntry; 6] = [
    entry(
        "efficiency",
        "Aumentar Eficiência Operacional",
        "Otimizar processos e reduzir custos",
    ),
    entry(
        "analytics",
        "Melhorar Análise de Dados",
        "Obter insights mais precisos do negócio",
    ),
    entry("security", "Fortalecer Segurança", "Proteger dados e sistemas"),
    entry("automation", "Automatizar Processos", "Reduzir tarefas manuais"),
    entry(
        "integration",
        "Integrar Sistemas",
        "Conectar diferentes plataformas",
    ),
    entry("scale", "Escalar Operações", "Preparar para crescimento"),
];

/// Systems the client may connect; selection is optional.
pub const INTEGRATIONS: [CatalogEntry; 6] = [
    entry("erp", "ERP", "Pedidos, notas fiscais e estoque"),
    entry("crm", "CRM", "Clientes e oportunidades"),
    entry("ecommerce", "E-commerce", "Loja virtual própria"),
    entry("marketplace", "Marketplaces", "Canais de venda de terceiros"),
    entry(
        "business_intelligence",
        "Business Intelligence",
        "Painéis e relatórios analíticos",
    ),
    entry("edi_gateway", "Gateway EDI", "Troca eletrônica de documentos"),
];

/// Processing options for the multi-option upload mode.
pub const PROCESSING_OPTIONS: [CatalogEntry; 4] = [
    entry(
        "layout_check",
        "Verificar layout",
        "Confere posições e tamanhos dos campos",
    ),
    entry(
        "duplicate_check",
        "Detectar duplicidades",
        "Aponta registros repetidos",
    ),
    entry(
        "encoding_normalization",
        "Normalizar codificação",
        "Converte o arquivo para UTF-8",
    ),
    entry(
        "summary_report",
        "Gerar resumo",
        "Inclui totais por tipo de registro",
    ),
];

pub fn find_entry<'a>(catalog: &'a [CatalogEntry], id: &str) -> Option<&'a CatalogEntry> {
    catalog.iter().find(|e| e.id == id)
}

/// Downloadable documentation offered on the manuals step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Manual {
    ClientInstallation,
    FileStandard,
}

impl Manual {
    pub const ALL: [Manual; 2] = [Manual::ClientInstallation, Manual::FileStandard];

    pub fn title(&self) -> &'static str {
        match self {
            Self::ClientInstallation => "Manual de instalação do client",
            Self::FileStandard => "Manual do padrão de arquivos",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ClientInstallation => {
                "Guia completo para instalação e configuração do cliente Neogrid"
            }
            Self::FileStandard => {
                "Especificações técnicas para formatação e estrutura de arquivos"
            }
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "client" | "client_installation" => Some(Self::ClientInstallation),
            "files" | "file_standard" => Some(Self::FileStandard),
            _ => None,
        }
    }
}

pub fn industry_label(key: &str) -> &str {
    match key {
        "tecnologia" => "Tecnologia",
        "varejo" => "Varejo",
        "servicos" => "Serviços",
        "industria" => "Indústria",
        "saude" => "Saúde",
        "educacao" => "Educação",
        "financeiro" => "Financeiro",
        "agricultura" => "Agricultura",
        "construcao" => "Construção",
        "outros" => "Outros",
        other => other,
    }
}

pub fn company_size_label(key: &str) -> &str {
    match key {
        "micro" => "Micro (até 9 funcionários)",
        "pequena" => "Pequena (10-49 funcionários)",
        "media" => "Média (50-249 funcionários)",
        "grande" => "Grande (250+ funcionários)",
        other => other,
    }
}

pub fn support_label(key: &str) -> &str {
    match key {
        "basic" => "Suporte Básico (Email)",
        "standard" => "Suporte Padrão (Email + Chat)",
        "premium" => "Suporte Premium (24/7)",
        other => other,
    }
}

pub fn contact_label(key: &str) -> &str {
    match key {
        "email" => "Email",
        "phone" => "Telefone",
        "chat" => "Chat",
        other => other,
    }
}

/// Render a goal or integration id for the summary: the first underscore
/// becomes a space and every word is capitalized.
pub fn humanize_identifier(id: &str) -> String {
    let spaced = id.replacen('_', " ", 1);
    spaced
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
