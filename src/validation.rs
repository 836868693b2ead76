//! Batch validation of parsed [`MaterialRecord`]s.
//!
//! Validation never fails: it narrows a collection to the records that satisfy every
//! [`ValidationRule`] and accounts for the rest as [`Rejection`]s.
//!
//! ```rust
//! use material_catalog::types::MaterialRecord;
//! use material_catalog::validation::CatalogValidator;
//!
//! let records = vec![
//!     MaterialRecord { code: "CONC-001".into(), name: "C30 Concrete".into(), ..Default::default() },
//!     MaterialRecord { code: "".into(), name: "Nameless code".into(), ..Default::default() },
//! ];
//! let outcome = CatalogValidator::default().validate(records);
//! assert_eq!(outcome.valid.len(), 1);
//! assert_eq!(outcome.rejected_count(), 1);
//! ```

use std::fmt;

use serde::Serialize;

use crate::types::MaterialRecord;

/// A single record-level rule.
pub trait ValidationRule: Send + Sync {
    /// Short rule name, used in rejection reports.
    fn name(&self) -> &str;

    /// Returns `Err(reason)` when the record violates the rule.
    fn check(&self, record: &MaterialRecord) -> Result<(), String>;
}

/// Rejects records with a blank `code` or `name`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequiredFields;

impl ValidationRule for RequiredFields {
    fn name(&self) -> &str {
        "required_fields"
    }

    fn check(&self, record: &MaterialRecord) -> Result<(), String> {
        if record.code.trim().is_empty() {
            return Err("missing code".to_string());
        }
        if record.name.trim().is_empty() {
            return Err("missing name".to_string());
        }
        Ok(())
    }
}

/// Rejects records whose numeric measurements are negative or not finite.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonNegativeMeasurements;

impl ValidationRule for NonNegativeMeasurements {
    fn name(&self) -> &str {
        "non_negative_measurements"
    }

    fn check(&self, record: &MaterialRecord) -> Result<(), String> {
        for (field, value) in record.measurements() {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{field} must be finite and >= 0 (got {value})"));
            }
        }
        Ok(())
    }
}

/// Why a record was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Record code, or `(no code)` when blank.
    pub code: String,
    /// Name of the violated rule.
    pub rule: String,
    pub reason: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.code, self.rule, self.reason)
    }
}

/// Result of [`CatalogValidator::validate`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationOutcome {
    /// Records that passed every rule, in input order.
    pub valid: Vec<MaterialRecord>,
    pub rejected: Vec<Rejection>,
}

impl ValidationOutcome {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// An ordered set of [`ValidationRule`]s.
///
/// The default validator checks [`RequiredFields`] then [`NonNegativeMeasurements`].
pub struct CatalogValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl CatalogValidator {
    /// A validator with no rules; every record passes.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule. Rules are evaluated in insertion order and the first violation is reported.
    pub fn with_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Check one record against all rules.
    pub fn check(&self, record: &MaterialRecord) -> Result<(), Rejection> {
        for rule in &self.rules {
            if let Err(reason) = rule.check(record) {
                let code = if record.code.trim().is_empty() {
                    "(no code)".to_string()
                } else {
                    record.code.clone()
                };
                return Err(Rejection {
                    code,
                    rule: rule.name().to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Split `records` into the valid subset and rejections.
    pub fn validate(&self, records: Vec<MaterialRecord>) -> ValidationOutcome {
        let mut outcome = ValidationOutcome {
            valid: Vec::with_capacity(records.len()),
            rejected: Vec::new(),
        };
        for record in records {
            match self.check(&record) {
                Ok(()) => outcome.valid.push(record),
                Err(rejection) => outcome.rejected.push(rejection),
            }
        }
        outcome
    }
}

impl Default for CatalogValidator {
    fn default() -> Self {
        Self::empty()
            .with_rule(RequiredFields)
            .with_rule(NonNegativeMeasurements)
    }
}

impl fmt::Debug for CatalogValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogValidator")
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogValidator, RequiredFields, ValidationRule};
    use crate::types::MaterialRecord;

    fn record(code: &str, name: &str) -> MaterialRecord {
        MaterialRecord {
            code: code.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn keeps_complete_records_in_order() {
        let records = vec![record("A-1", "Alpha"), record("B-1", "Beta"), record("C-1", "Gamma")];
        let out = CatalogValidator::default().validate(records.clone());
        assert_eq!(out.valid, records);
        assert_eq!(out.rejected_count(), 0);
    }

    #[test]
    fn rejects_blank_code_or_name() {
        let records = vec![
            record("A-1", "Alpha"),
            record("  ", "No code"),
            record("C-1", ""),
            record("D-1", "Delta"),
        ];
        let out = CatalogValidator::default().validate(records);

        let codes: Vec<_> = out.valid.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["A-1", "D-1"]);
        assert_eq!(out.rejected_count(), 2);
        assert_eq!(out.rejected[0].code, "(no code)");
        assert_eq!(out.rejected[0].reason, "missing code");
        assert_eq!(out.rejected[1].code, "C-1");
        assert_eq!(out.rejected[1].rule, "required_fields");
    }

    #[test]
    fn rejects_negative_and_non_finite_measurements() {
        let mut negative = record("N-1", "Negative");
        negative.density = -1.0;
        let mut infinite = record("I-1", "Infinite");
        infinite.cost = f64::INFINITY;

        let out = CatalogValidator::default().validate(vec![negative, infinite]);
        assert!(out.valid.is_empty());
        assert!(out.rejected[0].reason.starts_with("density"));
        assert!(out.rejected[1].reason.starts_with("cost"));
    }

    struct RequireManufacturer;

    impl ValidationRule for RequireManufacturer {
        fn name(&self) -> &str {
            "manufacturer"
        }

        fn check(&self, record: &MaterialRecord) -> Result<(), String> {
            if record.manufacturer.is_empty() {
                Err("missing manufacturer".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn custom_rules_extend_the_default_set() {
        let validator = CatalogValidator::default().with_rule(RequireManufacturer);
        let mut with_maker = record("M-1", "Made");
        with_maker.manufacturer = "BuildCo".to_string();

        let out = validator.validate(vec![with_maker, record("M-2", "Unmade")]);
        assert_eq!(out.valid.len(), 1);
        assert_eq!(out.rejected[0].rule, "manufacturer");
    }

    #[test]
    fn empty_validator_accepts_everything() {
        let out = CatalogValidator::empty().validate(vec![record("", "")]);
        assert_eq!(out.valid.len(), 1);
        assert!(RequiredFields.check(&record("", "x")).is_err());
    }
}
