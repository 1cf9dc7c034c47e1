//! Communication preferences and contact data.

use crate::wizard::catalog::StepKind;
use crate::wizard::format::{format_phone, is_valid_email};
use crate::wizard::record::{
    ContactChannel, ContactPreferences, OnboardingRecord, RecordPatch, SupportTier,
};

use super::{FieldErrors, FieldInputError, LocalValidation, StepView};

#[derive(Debug, Clone)]
pub struct PreferencesStep {
    pub notifications_enabled: bool,
    pub newsletter_enabled: bool,
    pub support_tier: Option<SupportTier>,
    pub email: String,
    /// Masked as typed.
    pub phone: String,
    pub preferred_channel: Option<ContactChannel>,
    errors: FieldErrors,
}

impl Default for PreferencesStep {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            newsletter_enabled: false,
            support_tier: None,
            email: String::new(),
            phone: String::new(),
            preferred_channel: None,
            errors: FieldErrors::new(),
        }
    }
}

impl PreferencesStep {
    pub fn from_record(record: &OnboardingRecord) -> Self {
        match &record.contact_preferences {
            Some(prefs) => Self {
                notifications_enabled: prefs.notifications_enabled,
                newsletter_enabled: prefs.newsletter_enabled,
                support_tier: Some(prefs.support_tier),
                email: prefs.email.clone(),
                phone: prefs.phone.clone().unwrap_or_default(),
                preferred_channel: Some(prefs.preferred_channel),
                errors: FieldErrors::new(),
            },
            None => Self::default(),
        }
    }

    fn flag(&mut self, field: &str) -> Option<&mut bool> {
        match field {
            "notificationsEnabled" => Some(&mut self.notifications_enabled),
            "newsletterEnabled" => Some(&mut self.newsletter_enabled),
            _ => None,
        }
    }
}

impl StepView for PreferencesStep {
    fn kind(&self) -> StepKind {
        StepKind::Preferences
    }

    fn validate_local(&self) -> LocalValidation {
        let mut errors = FieldErrors::new();

        if self.email.trim().is_empty() {
            errors.insert("email", "Email é obrigatório");
        } else if !is_valid_email(&self.email) {
            errors.insert("email", "Email inválido");
        }

        if self.support_tier.is_none() {
            errors.insert("supportTier", "Selecione um plano de suporte");
        }

        if self.preferred_channel.is_none() {
            errors.insert("preferredChannel", "Selecione a forma de contato preferida");
        }

        errors.into()
    }

    fn build_patch(&self) -> RecordPatch {
        let (Some(support_tier), Some(preferred_channel)) =
            (self.support_tier, self.preferred_channel)
        else {
            return RecordPatch::default();
        };

        let phone = (!self.phone.is_empty()).then(|| self.phone.clone());

        RecordPatch {
            contact_preferences: Some(ContactPreferences {
                notifications_enabled: self.notifications_enabled,
                newsletter_enabled: self.newsletter_enabled,
                support_tier,
                email: self.email.clone(),
                phone,
                preferred_channel,
            }),
            ..Default::default()
        }
    }

    fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), FieldInputError> {
        let invalid = || FieldInputError::InvalidOption {
            field: field.to_string(),
            value: value.to_string(),
        };

        match field {
            "email" => {
                self.email = value.to_string();
                self.errors.remove("email");
            }
            "phone" => self.phone = format_phone(value),
            "supportTier" => {
                self.support_tier = Some(SupportTier::from_key(value).ok_or_else(invalid)?);
                self.errors.remove("supportTier");
            }
            "preferredChannel" => {
                self.preferred_channel =
                    Some(ContactChannel::from_key(value).ok_or_else(invalid)?);
                self.errors.remove("preferredChannel");
            }
            "notificationsEnabled" | "newsletterEnabled" => {
                let parsed: bool = value.parse().map_err(|_| invalid())?;
                if let Some(slot) = self.flag(field) {
                    *slot = parsed;
                }
            }
            other => {
                return Err(FieldInputError::UnknownField {
                    step: self.kind(),
                    field: other.to_string(),
                });
            }
        }
        Ok(())
    }

    fn toggle(&mut self, id: &str) -> Result<(), FieldInputError> {
        let kind = self.kind();
        let slot = self.flag(id).ok_or_else(|| FieldInputError::UnknownField {
            step: kind,
            field: id.to_string(),
        })?;
        *slot = !*slot;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PreferencesStep {
        let mut step = PreferencesStep::default();
        step.set_field("email", "contato@acme.com.br").unwrap();
        step.set_field("supportTier", "standard").unwrap();
        step.set_field("preferredChannel", "chat").unwrap();
        step
    }

    #[test]
    fn defaults_match_product() {
        let step = PreferencesStep::default();
        assert!(step.notifications_enabled);
        assert!(!step.newsletter_enabled);
    }

    #[test]
    fn empty_email_gets_required_message() {
        let validation = PreferencesStep::default().validate_local();
        assert_eq!(validation.field_errors.get("email"), Some("Email é obrigatório"));
        assert_eq!(
            validation.field_errors.get("supportTier"),
            Some("Selecione um plano de suporte")
        );
        assert_eq!(
            validation.field_errors.get("preferredChannel"),
            Some("Selecione a forma de contato preferida")
        );
    }

    #[test]
    fn malformed_email_gets_invalid_message() {
        let mut step = complete();
        step.set_field("email", "a@b").unwrap();
        assert_eq!(step.validate_local().field_errors.get("email"), Some("Email inválido"));
    }

    #[test]
    fn email_with_surrounding_spaces_is_invalid() {
        let mut step = complete();
        step.set_field("email", " a@b.com").unwrap();
        assert_eq!(step.validate_local().field_errors.get("email"), Some("Email inválido"));

        step.set_field("email", "   ").unwrap();
        assert_eq!(step.validate_local().field_errors.get("email"), Some("Email é obrigatório"));
    }

    #[test]
    fn phone_is_optional_and_masked() {
        let mut step = complete();
        assert!(step.validate_local().valid);
        let prefs = step.build_patch().contact_preferences.unwrap();
        assert_eq!(prefs.phone, None);

        step.set_field("phone", "11999999999").unwrap();
        assert_eq!(step.phone, "(11) 99999-9999");
        let prefs = step.build_patch().contact_preferences.unwrap();
        assert_eq!(prefs.phone.as_deref(), Some("(11) 99999-9999"));
    }

    #[test]
    fn toggles_flip_flags() {
        let mut step = complete();
        step.toggle("notificationsEnabled").unwrap();
        step.toggle("newsletterEnabled").unwrap();
        assert!(!step.notifications_enabled);
        assert!(step.newsletter_enabled);
        assert!(step.toggle("sms").is_err());
    }

    #[test]
    fn flags_parse_from_text() {
        let mut step = complete();
        step.set_field("newsletterEnabled", "true").unwrap();
        assert!(step.newsletter_enabled);
        assert!(step.set_field("newsletterEnabled", "sim").is_err());
    }

    #[test]
    fn round_trips_through_record() {
        let step = complete();
        let record = OnboardingRecord::default().merge(step.build_patch());
        let reseeded = PreferencesStep::from_record(&record);
        assert_eq!(reseeded.email, "contato@acme.com.br");
        assert_eq!(reseeded.support_tier, Some(SupportTier::Standard));
        assert_eq!(reseeded.preferred_channel, Some(ContactChannel::Chat));
    }
}
