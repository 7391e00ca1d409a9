//! Built-in attribute validators
//!
//! Validators run during `validate_config` against known, non-null values.
//! String and number validators also accept a list or set, in which case each
//! element is checked on its own.

use crate::schema::{Validator, ValidatorRequest, ValidatorResponse};
use crate::types::{AttributePath, Diagnostic, Dynamic};

fn each_element<'a>(value: &'a Dynamic) -> Vec<&'a Dynamic> {
    match value {
        Dynamic::List(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn invalid(path: &AttributePath, summary: String, detail: String) -> Diagnostic {
    Diagnostic::error(summary, detail).with_attribute(path.clone())
}

pub struct StringLenBetween {
    pub min: usize,
    pub max: usize,
}

impl StringLenBetween {
    pub fn create(min: usize, max: usize) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }
}

impl Validator for StringLenBetween {
    fn description(&self) -> String {
        format!("string length must be between {} and {}", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];
        for value in each_element(&request.config_value.value) {
            if let Some(s) = value.as_str() {
                let len = s.chars().count();
                if len < self.min || len > self.max {
                    diagnostics.push(invalid(
                        &request.path,
                        format!("Invalid length for {}", request.path),
                        format!(
                            "expected length to be in the range ({} - {}), got {}",
                            self.min, self.max, len
                        ),
                    ));
                }
            }
        }
        ValidatorResponse { diagnostics }
    }
}

pub struct StringMatches {
    pub pattern: regex::Regex,
    pub message: String,
}

impl StringMatches {
    pub fn create(pattern: regex::Regex, message: &str) -> Box<dyn Validator> {
        Box::new(Self {
            pattern,
            message: message.to_string(),
        })
    }
}

impl Validator for StringMatches {
    fn description(&self) -> String {
        self.message.clone()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];
        for value in each_element(&request.config_value.value) {
            if let Some(s) = value.as_str() {
                if !self.pattern.is_match(s) {
                    diagnostics.push(invalid(
                        &request.path,
                        format!("Invalid value for {}", request.path),
                        format!("{}, got: {}", self.message, s),
                    ));
                }
            }
        }
        ValidatorResponse { diagnostics }
    }
}

pub struct StringOneOf {
    pub allowed: Vec<String>,
}

impl StringOneOf {
    pub fn create(allowed: &[&str]) -> Box<dyn Validator> {
        Box::new(Self {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl Validator for StringOneOf {
    fn description(&self) -> String {
        format!("value must be one of: {}", self.allowed.join(", "))
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];
        for value in each_element(&request.config_value.value) {
            if let Some(s) = value.as_str() {
                if !self.allowed.iter().any(|a| a == s) {
                    diagnostics.push(invalid(
                        &request.path,
                        format!("Invalid value for {}", request.path),
                        format!("expected one of {:?}, got {}", self.allowed, s),
                    ));
                }
            }
        }
        ValidatorResponse { diagnostics }
    }
}

pub struct IntBetween {
    pub min: i64,
    pub max: i64,
}

impl IntBetween {
    pub fn create(min: i64, max: i64) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }
}

impl Validator for IntBetween {
    fn description(&self) -> String {
        format!("value must be between {} and {}", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];
        for value in each_element(&request.config_value.value) {
            if let Some(n) = value.as_number() {
                if n.fract() != 0.0 || n < self.min as f64 || n > self.max as f64 {
                    diagnostics.push(invalid(
                        &request.path,
                        format!("Invalid value for {}", request.path),
                        format!(
                            "expected an integer in the range ({} - {}), got {}",
                            self.min, self.max, n
                        ),
                    ));
                }
            }
        }
        ValidatorResponse { diagnostics }
    }
}

pub struct IntAtLeast {
    pub min: i64,
}

impl IntAtLeast {
    pub fn create(min: i64) -> Box<dyn Validator> {
        Box::new(Self { min })
    }
}

impl Validator for IntAtLeast {
    fn description(&self) -> String {
        format!("value must be at least {}", self.min)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];
        for value in each_element(&request.config_value.value) {
            if let Some(n) = value.as_number() {
                if n.fract() != 0.0 || n < self.min as f64 {
                    diagnostics.push(invalid(
                        &request.path,
                        format!("Invalid value for {}", request.path),
                        format!("expected an integer of at least {}, got {}", self.min, n),
                    ));
                }
            }
        }
        ValidatorResponse { diagnostics }
    }
}

/// TCP/UDP port in 1..=65535
pub struct IsPortNumber;

impl IsPortNumber {
    pub fn create() -> Box<dyn Validator> {
        Box::new(Self)
    }
}

impl Validator for IsPortNumber {
    fn description(&self) -> String {
        "value must be a valid port number".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = IntBetween { min: 1, max: 65535 }.validate(request);
        for diag in &mut response.diagnostics {
            diag.summary = diag.summary.replace("Invalid value", "Invalid port");
        }
        response
    }
}

/// 12-digit AWS account ID
pub fn account_id() -> Box<dyn Validator> {
    match regex::Regex::new(r"^\d{12}$") {
        Ok(pattern) => StringMatches::create(pattern, "must be a 12-digit AWS account ID"),
        Err(_) => StringLenBetween::create(12, 12),
    }
}

/// Amazon Resource Name (`arn:partition:service:region:account:resource`)
pub fn arn() -> Box<dyn Validator> {
    match regex::Regex::new(r"^arn:[\w-]+:[\w-]+:[\w-]*:\d{0,12}:.+$") {
        Ok(pattern) => StringMatches::create(pattern, "must be a valid ARN"),
        Err(_) => StringLenBetween::create(1, 2048),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DynamicValue;

    fn run(validator: &dyn Validator, value: Dynamic) -> Vec<Diagnostic> {
        validator
            .validate(ValidatorRequest {
                config_value: DynamicValue::new(value),
                path: AttributePath::new("field"),
            })
            .diagnostics
    }

    fn string(s: &str) -> Dynamic {
        Dynamic::String(s.to_string())
    }

    #[test]
    fn string_len_between_accepts_valid_length() {
        let validator = StringLenBetween { min: 1, max: 255 };
        assert!(run(&validator, string("my-mesh")).is_empty());
    }

    #[test]
    fn string_len_between_rejects_empty_and_long_values() {
        let validator = StringLenBetween { min: 1, max: 5 };
        assert_eq!(run(&validator, string("")).len(), 1);
        assert_eq!(run(&validator, string("toolong")).len(), 1);
    }

    #[test]
    fn string_one_of_checks_every_set_element() {
        let validator = StringOneOf {
            allowed: vec!["cancelled".to_string(), "internal".to_string()],
        };
        let value = Dynamic::List(vec![string("cancelled"), string("bogus"), string("internal")]);

        let diagnostics = run(&validator, value);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].detail.contains("bogus"));
    }

    #[test]
    fn int_between_rejects_fractional_and_out_of_range() {
        let validator = IntBetween { min: 0, max: 100 };
        assert!(run(&validator, Dynamic::Number(100.0)).is_empty());
        assert_eq!(run(&validator, Dynamic::Number(101.0)).len(), 1);
        assert_eq!(run(&validator, Dynamic::Number(1.5)).len(), 1);
    }

    #[test]
    fn int_at_least_enforces_lower_bound() {
        let validator = IntAtLeast { min: 1 };
        assert!(run(&validator, Dynamic::Number(1.0)).is_empty());
        assert_eq!(run(&validator, Dynamic::Number(0.0)).len(), 1);
    }

    #[test]
    fn port_number_range() {
        assert!(run(&IsPortNumber, Dynamic::Number(8080.0)).is_empty());
        let diagnostics = run(&IsPortNumber, Dynamic::Number(0.0));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.starts_with("Invalid port"));
    }

    #[test]
    fn account_id_requires_twelve_digits() {
        let validator = account_id();
        assert!(run(validator.as_ref(), string("123456789012")).is_empty());
        assert_eq!(run(validator.as_ref(), string("12345")).len(), 1);
    }

    #[test]
    fn arn_validator() {
        let validator = arn();
        assert!(run(
            validator.as_ref(),
            string("arn:aws:acm:us-west-2:123456789012:certificate/abc")
        )
        .is_empty());
        assert_eq!(run(validator.as_ref(), string("not-an-arn")).len(), 1);
    }

    #[test]
    fn validators_ignore_other_types() {
        let validator = StringLenBetween { min: 1, max: 2 };
        assert!(run(&validator, Dynamic::Number(42.0)).is_empty());
    }
}
