use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{ApiError, FieldError};

/// Declarative field checks over a raw JSON body.
///
/// Each endpoint declares a fixed list of constraints; checks run in
/// declaration order, the first failing rule per field is recorded, and
/// every failing field is reported. The payload itself is never touched.
pub struct Validator<'a> {
    body: &'a Value,
    errors: Vec<FieldError>,
}

impl<'a> Validator<'a> {
    pub fn new(body: &'a Value) -> Self {
        Self {
            body,
            errors: Vec::new(),
        }
    }

    fn field(&self, name: &str) -> Option<&'a Value> {
        match self.body.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn fail(&mut self, field: &str, message: &str) {
        if self.errors.iter().any(|e| e.field == field) {
            return;
        }
        self.errors.push(FieldError::new(field, message));
    }

    fn require(&mut self, field: &str, message: &str, check: impl Fn(&Value) -> bool) {
        match self.field(field) {
            Some(value) if check(value) => {}
            _ => self.fail(field, message),
        }
    }

    fn optional(&mut self, field: &str, message: &str, check: impl Fn(&Value) -> bool) {
        if let Some(value) = self.field(field) {
            if !check(value) {
                self.fail(field, message);
            }
        }
    }

    pub fn non_empty_string(&mut self, field: &str, message: &str) {
        self.require(field, message, is_non_empty_string);
    }

    pub fn optional_non_empty_string(&mut self, field: &str, message: &str) {
        self.optional(field, message, is_non_empty_string);
    }

    pub fn min_length(&mut self, field: &str, min: usize, message: &str) {
        self.require(field, message, |v| {
            v.as_str().is_some_and(|s| s.chars().count() >= min)
        });
    }

    pub fn numeric(&mut self, field: &str, message: &str) {
        self.require(field, message, Value::is_number);
    }

    pub fn optional_numeric(&mut self, field: &str, message: &str) {
        self.optional(field, message, Value::is_number);
    }

    pub fn float_range(&mut self, field: &str, min: f64, max: f64, message: &str) {
        self.require(field, message, |v| in_range(v, min, max));
    }

    pub fn optional_float_range(&mut self, field: &str, min: f64, max: f64, message: &str) {
        self.optional(field, message, |v| in_range(v, min, max));
    }

    pub fn positive_int(&mut self, field: &str, message: &str) {
        self.require(field, message, is_positive_int);
    }

    pub fn optional_positive_int(&mut self, field: &str, message: &str) {
        self.optional(field, message, is_positive_int);
    }

    pub fn iso_date(&mut self, field: &str, message: &str) {
        self.require(field, message, |v| parse_iso_date(v).is_some());
    }

    pub fn optional_iso_date(&mut self, field: &str, message: &str) {
        self.optional(field, message, |v| parse_iso_date(v).is_some());
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

fn is_non_empty_string(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.trim().is_empty())
}

fn in_range(value: &Value, min: f64, max: f64) -> bool {
    value.as_f64().is_some_and(|n| n >= min && n <= max)
}

fn is_positive_int(value: &Value) -> bool {
    value.as_u64().is_some_and(|n| n >= 1)
}

/// Accepts a calendar date (`2024-09-30`) or a full RFC 3339 timestamp.
pub fn parse_iso_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Path-parameter identifier check.
pub fn loan_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::Validation(vec![FieldError::new("id", "Invalid loan ID")]))
}

pub fn register(body: &Value) -> Result<(), ApiError> {
    let mut v = Validator::new(body);
    v.min_length(
        "username",
        3,
        "Username must be at least 3 characters long",
    );
    v.min_length(
        "password",
        6,
        "Password must be at least 6 characters long",
    );
    v.finish()
}

pub fn login(body: &Value) -> Result<(), ApiError> {
    let mut v = Validator::new(body);
    v.non_empty_string("username", "Username is required");
    v.non_empty_string("password", "Password is required");
    v.finish()
}

pub fn calculate(body: &Value) -> Result<(), ApiError> {
    let mut v = Validator::new(body);
    v.numeric("loanAmount", "Loan amount must be a number");
    v.float_range(
        "interestRate",
        0.0,
        100.0,
        "Interest rate must be between 0 and 100",
    );
    v.positive_int("loanTerm", "Loan term must be a positive integer");
    v.finish()
}

pub fn create_loan(body: &Value) -> Result<(), ApiError> {
    let mut v = Validator::new(body);
    v.non_empty_string("borrowerName", "Borrower name is required");
    v.numeric("loanAmount", "Loan amount must be a number");
    v.float_range(
        "interestRate",
        0.0,
        100.0,
        "Interest rate must be between 0 and 100",
    );
    v.positive_int("loanTerm", "Loan term must be a positive integer");
    v.iso_date("paymentDueDate", "Payment due date must be a valid date");
    v.finish()
}

pub fn update_loan(body: &Value) -> Result<(), ApiError> {
    let mut v = Validator::new(body);
    v.optional_non_empty_string("borrowerName", "Borrower name cannot be empty");
    v.optional_numeric("loanAmount", "Loan amount must be a number");
    v.optional_float_range(
        "interestRate",
        0.0,
        100.0,
        "Interest rate must be between 0 and 100",
    );
    v.optional_positive_int("loanTerm", "Loan term must be a positive integer");
    v.optional_iso_date("paymentDueDate", "Payment due date must be a valid date");
    v.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn errors(result: Result<(), ApiError>) -> Vec<FieldError> {
        match result.unwrap_err() {
            ApiError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_loan_reports_every_failing_field_in_order() {
        let errors = errors(create_loan(&json!({})));
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "borrowerName",
                "loanAmount",
                "interestRate",
                "loanTerm",
                "paymentDueDate"
            ]
        );
    }

    #[test]
    fn non_numeric_amount_gets_the_exact_message() {
        let errors = errors(calculate(&json!({
            "loanAmount": "invalid",
            "interestRate": 5,
            "loanTerm": 12,
        })));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], FieldError::new("loanAmount", "Loan amount must be a number"));
    }

    #[test]
    fn calculate_accepts_the_happy_path() {
        assert!(calculate(&json!({
            "loanAmount": 10000,
            "interestRate": 5,
            "loanTerm": 12,
        }))
        .is_ok());
    }

    #[test]
    fn interest_rate_range_is_inclusive() {
        assert!(calculate(&json!({"loanAmount": 1, "interestRate": 0, "loanTerm": 1})).is_ok());
        assert!(calculate(&json!({"loanAmount": 1, "interestRate": 100, "loanTerm": 1})).is_ok());
        let errors = errors(calculate(
            &json!({"loanAmount": 1, "interestRate": 100.5, "loanTerm": 1}),
        ));
        assert_eq!(errors[0].field, "interestRate");
    }

    #[test]
    fn loan_term_must_be_a_positive_integer() {
        for bad in [json!(0), json!(-3), json!(2.5), json!("12")] {
            let errors = errors(calculate(
                &json!({"loanAmount": 1, "interestRate": 1, "loanTerm": bad}),
            ));
            assert_eq!(errors[0].field, "loanTerm");
        }
    }

    #[test]
    fn update_loan_ignores_absent_fields_but_checks_present_ones() {
        assert!(update_loan(&json!({})).is_ok());
        assert!(update_loan(&json!({"loanAmount": 12000})).is_ok());
        let errors = errors(update_loan(&json!({"borrowerName": "  "})));
        assert_eq!(
            errors[0],
            FieldError::new("borrowerName", "Borrower name cannot be empty")
        );
    }

    #[test]
    fn dates_accept_calendar_and_rfc3339_forms() {
        assert!(parse_iso_date(&json!("2024-09-30")).is_some());
        assert!(parse_iso_date(&json!("2024-09-30T12:00:00Z")).is_some());
        assert!(parse_iso_date(&json!("tomorrow")).is_none());
        assert!(parse_iso_date(&json!(20240930)).is_none());
    }

    #[test]
    fn register_enforces_minimum_lengths() {
        let errors = errors(register(&json!({"username": "ab", "password": "short"})));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "username");
        assert_eq!(errors[1].field, "password");
    }

    #[test]
    fn loan_id_rejects_non_uuid_input() {
        assert!(loan_id("not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(loan_id(&id.to_string()).unwrap(), id);
    }
}
