//! Field validation for user credentials and Wh payloads.
//!
//! A [`Validator`] is built once from a [`ValidationConfig`] and shared by the
//! services. Payload rules live in per-kind tables in [`tables`].

pub mod predicates;
mod tables;

use std::fmt::Display;

use crate::error::{ServiceError, ServiceResult};
use crate::wh::{GenerationProps, SOURCE_CODES, Source, WhPayload};
use predicates::{Check, Violation, excludes, length};

#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub name_max: usize,
    pub description_max: usize,
    pub medium_text_max: usize,
    pub source_page_max: usize,
    pub forbidden_chars: String,
    pub username_max: usize,
    pub password_min: usize,
    pub password_max: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            name_max: 200,
            description_max: 100_000,
            medium_text_max: 200,
            source_page_max: 15,
            forbidden_chars: "<>".to_string(),
            username_max: 254,
            password_min: 5,
            password_max: 255,
        }
    }
}

/// One entry of a rule table: the field name used in error messages and the
/// check applied to the whole value.
pub struct FieldRule<T> {
    pub field: &'static str,
    pub check: fn(&T, &Validator) -> Check,
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    fn text(&self, value: &str, max: usize) -> Check {
        length(value, 0, max)?;
        excludes(value, &self.config.forbidden_chars)
    }

    pub fn name(&self, value: &str) -> Check {
        self.text(value, self.config.name_max)
    }

    pub fn description(&self, value: &str) -> Check {
        self.text(value, self.config.description_max)
    }

    pub fn medium_text(&self, value: &str) -> Check {
        self.text(value, self.config.medium_text_max)
    }

    pub fn source(&self, source: &Source) -> Check {
        for (code, page) in source {
            if !SOURCE_CODES.contains(&code.as_str()) {
                return Err(Violation(format!("unknown source {code}")));
            }
            self.text(page, self.config.source_page_max)
                .map_err(|v| Violation(format!("{code}: {}", v.0)))?;
        }
        Ok(())
    }

    pub fn username(&self, value: &str) -> Check {
        length(value, 1, self.config.username_max)?;
        predicates::email(value)
    }

    pub fn password(&self, value: &str) -> Check {
        length(value, self.config.password_min, self.config.password_max)
    }

    pub fn validate_username(&self, value: &str) -> ServiceResult<()> {
        into_result([("username", self.username(value))])
    }

    pub fn validate_password(&self, value: &str) -> ServiceResult<()> {
        into_result([("password", self.password(value))])
    }

    pub fn validate_shared_accounts(&self, names: &[String]) -> ServiceResult<()> {
        into_result([(
            "sharedAccounts",
            predicates::each(names, |name| self.username(name)),
        )])
    }

    /// Runs the rule table for the payload's kind and reports every failing field.
    pub fn validate_payload(&self, payload: &WhPayload) -> ServiceResult<()> {
        let failures = match payload {
            WhPayload::Mutation(m) => self.run(tables::MUTATION, m),
            WhPayload::Spell(s) => self.run(tables::SPELL, s),
            WhPayload::Property(p) => self.run(tables::PROPERTY, p),
            WhPayload::Item(i) => self.run(tables::ITEM, i),
            WhPayload::Character(c) => self.run(tables::CHARACTER, c),
        };
        into_result(failures)
    }

    pub fn validate_generation(&self, props: &GenerationProps) -> ServiceResult<()> {
        into_result(self.run(tables::GENERATION, props))
    }

    fn run<T>(&self, rules: &[FieldRule<T>], value: &T) -> Vec<(&'static str, Check)> {
        rules
            .iter()
            .map(|rule| (rule.field, (rule.check)(value, self)))
            .collect()
    }
}

fn into_result<F: Display>(results: impl IntoIterator<Item = (F, Check)>) -> ServiceResult<()> {
    let failures: Vec<String> = results
        .into_iter()
        .filter_map(|(field, check)| check.err().map(|v| format!("{field}: {}", v.0)))
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::InvalidArguments(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wh::{WhMutation, WhSpell};

    #[test]
    fn username_must_be_an_email() {
        let v = Validator::default();
        assert!(v.validate_username("reiklander@example.com").is_ok());
        assert!(matches!(
            v.validate_username("reiklander"),
            Err(ServiceError::InvalidArguments(_))
        ));
    }

    #[test]
    fn password_length_comes_from_config() {
        let v = Validator::new(ValidationConfig {
            password_min: 8,
            ..Default::default()
        });
        assert!(v.validate_password("1234567").is_err());
        assert!(v.validate_password("12345678").is_ok());
    }

    #[test]
    fn reports_every_failing_field() {
        let v = Validator::default();
        let payload = WhPayload::Mutation(WhMutation {
            name: "<b>".into(),
            mutation_type: 7,
            ..Default::default()
        });
        let Err(ServiceError::InvalidArguments(msg)) = v.validate_payload(&payload) else {
            panic!("expected invalid arguments");
        };
        assert!(msg.contains("name"));
        assert!(msg.contains("type"));
    }

    #[test]
    fn source_keys_and_pages_are_checked() {
        let v = Validator::default();
        let mut spell = WhSpell {
            name: "Dart".into(),
            ..Default::default()
        };
        spell.source.insert("1".into(), "240".into());
        assert!(v.validate_payload(&WhPayload::Spell(spell.clone())).is_ok());

        spell.source.insert("99".into(), "1".into());
        assert!(v.validate_payload(&WhPayload::Spell(spell)).is_err());
    }
}
