//! Rule-based form-input validation.
//!
//! A [`Validator`] applies an ordered list of named [`Rule`]s to a single
//! input value, accumulating human-readable messages and returning an
//! overall pass/fail. Rules parse from `"name"` or `"name:param"` strings
//! as they appear in settings-field definitions.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::sync::OnceLock;

/// One validation rule, possibly parameterized.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    Numeric,
    Int,
    Positive,
    Email,
    Alphanumeric,
    Alpha,
    Name,
    MinLen(usize),
    MaxLen(usize),
    MinVal(f64),
    MaxVal(f64),
    Regex(String),
    Past,
    Date,
    Website,
    Password(usize),
    Custom,
    StripHtml,
    /// Unrecognized rule name; fails the value with a diagnostic message.
    Unknown(String),
}

impl Rule {
    /// Parse a rule from its `"name"` or `"name:param"` form.
    pub fn parse(rule: &str) -> Self {
        let (name, param) = match rule.split_once(':') {
            Some((name, param)) => (name, Some(param)),
            None => (rule, None),
        };
        let int_param = || param.and_then(|p| p.trim().parse::<usize>().ok()).unwrap_or(0);
        let num_param = || param.and_then(|p| p.trim().parse::<f64>().ok()).unwrap_or(0.0);

        match name {
            "required" => Self::Required,
            "numeric" => Self::Numeric,
            "int" => Self::Int,
            "positive" => Self::Positive,
            "email" => Self::Email,
            "alphanumeric" => Self::Alphanumeric,
            "alpha" => Self::Alpha,
            "name" => Self::Name,
            "minlen" => Self::MinLen(int_param()),
            "maxlen" => Self::MaxLen(int_param()),
            "minval" => Self::MinVal(num_param()),
            "maxval" => Self::MaxVal(num_param()),
            "regex" => Self::Regex(param.unwrap_or_default().to_string()),
            "past" => Self::Past,
            "date" => Self::Date,
            "website" => Self::Website,
            "password" => Self::Password(int_param()),
            "custom" => Self::Custom,
            "striphtml" => Self::StripHtml,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Parse a list of rule strings.
    pub fn parse_list<S: AsRef<str>>(rules: &[S]) -> Vec<Self> {
        rules.iter().map(|rule| Self::parse(rule.as_ref())).collect()
    }
}

/// Applies rules to input values, accumulating error messages.
#[derive(Default)]
pub struct Validator {
    errors: Vec<String>,
    custom: Option<(Box<dyn Fn(&str) -> bool>, String)>,
    field_error: Option<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the predicate behind the `custom` rule. The callback returns
    /// `true` when the value is invalid, in which case `message` is
    /// recorded.
    pub fn set_custom_validation(
        &mut self,
        callback: impl Fn(&str) -> bool + 'static,
        message: &str,
    ) {
        self.custom = Some((Box::new(callback), message.to_string()));
    }

    /// Override the message recorded when a `regex` rule fails.
    pub fn set_field_error(&mut self, message: &str) {
        self.field_error = Some(message.to_string());
    }

    /// Accumulated error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Whether no rule has failed so far.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Apply `rules` to `value` in order. Returns `true` when every rule
    /// passed. `striphtml` transforms the value in place rather than
    /// checking it.
    pub fn validate(&mut self, value: &mut String, rules: &[Rule]) -> bool {
        let mut results = true;
        for rule in rules {
            match rule {
                Rule::Required => {
                    if value.trim().is_empty() {
                        results = self.fail("This field is required.");
                    }
                }
                Rule::Numeric => {
                    if value.trim().parse::<f64>().is_err() {
                        results = self.fail("This field must be a number.");
                    }
                }
                Rule::Int => {
                    let v = value.trim();
                    if v.is_empty() || !v.chars().all(|c| c.is_ascii_digit()) {
                        results = self.fail("This field must be an integer value.");
                    }
                }
                Rule::Positive => {
                    if let Ok(v) = value.trim().parse::<f64>() {
                        if v < 0.0 {
                            results = self.fail("This field must be positive.");
                        }
                    }
                }
                Rule::Email => {
                    if !is_email(value) {
                        results = self.fail("This field must be an email address.");
                    }
                }
                Rule::Alphanumeric => {
                    let comp: String = value.chars().filter(|&c| c != '_').collect();
                    if !comp.is_empty() && !comp.chars().all(char::is_alphanumeric) {
                        results =
                            self.fail("This field only accepts alphanumeric characters.");
                    }
                }
                Rule::Alpha => {
                    let comp: String = value.chars().filter(|&c| c != ' ').collect();
                    if !comp.is_empty() && !comp.chars().all(char::is_alphabetic) {
                        results = self.fail("This field only accepts alpha letters.");
                    }
                }
                Rule::Name => {
                    let comp: String = value
                        .chars()
                        .filter(|&c| c != ' ' && c != '-' && c != '\'')
                        .collect();
                    if !comp.is_empty() && !comp.chars().all(char::is_alphabetic) {
                        results = self.fail(
                            "This field only accepts alpha letters, spaces, dashes(-), and apostrophes(').",
                        );
                    }
                }
                Rule::MinLen(min) => {
                    if value.chars().count() < *min {
                        results = self.fail(&format!(
                            "This field is too short, should be at least {min} characters."
                        ));
                    }
                }
                Rule::MaxLen(max) => {
                    if value.chars().count() > *max {
                        results = self.fail(&format!(
                            "This field is too long, should be no more than {max} characters."
                        ));
                    }
                }
                Rule::MinVal(min) => {
                    if value.trim().parse::<f64>().unwrap_or(0.0) < *min {
                        results = self.fail(&format!(
                            "This field value should be at least {min}."
                        ));
                    }
                }
                Rule::MaxVal(max) => {
                    if value.trim().parse::<f64>().unwrap_or(0.0) > *max {
                        results = self.fail(&format!(
                            "This field value should be no more than {max}."
                        ));
                    }
                }
                Rule::Regex(pattern) => match regex::Regex::new(pattern) {
                    Ok(re) => {
                        if !re.is_match(value) {
                            let message = match &self.field_error {
                                Some(custom) => custom.clone(),
                                None => format!("Failed regular expression {pattern}"),
                            };
                            results = self.fail(&message);
                        }
                    }
                    Err(_) => {
                        results =
                            self.fail(&format!("Failed regular expression {pattern}"));
                    }
                },
                Rule::Past => {
                    if let Some(date) = parse_date(value) {
                        if date > Local::now().date_naive() {
                            results = self.fail("Please enter a date in the past.");
                        }
                    }
                }
                Rule::Date => {
                    if parse_date(value).is_none() {
                        results = self.fail("This field must be a valid date.");
                    }
                }
                Rule::Website => {
                    let v = value.trim();
                    if !v.is_empty() {
                        let candidate = if v.contains("://") {
                            v.to_string()
                        } else {
                            format!("http://{v}")
                        };
                        if url::Url::parse(&candidate).is_err() {
                            results = self.fail("This field must be a valid website.");
                        }
                    }
                }
                Rule::Password(min) => {
                    let comp = value.trim();
                    if !comp.is_empty() && comp.chars().count() < *min {
                        results = self.fail(&format!(
                            "The password should be at least {min} characters."
                        ));
                    }
                }
                Rule::Custom => {
                    let failed = match &self.custom {
                        Some((callback, message)) if callback(value) => Some(message.clone()),
                        _ => None,
                    };
                    if let Some(message) = failed {
                        results = self.fail(&message);
                    }
                }
                Rule::StripHtml => {
                    *value = strip_tags(value);
                }
                Rule::Unknown(name) => {
                    results = self.fail(&format!(
                        "Unrecognized validation rule: \"{name}\""
                    ));
                }
            }
        }
        results
    }

    fn fail(&mut self, message: &str) -> bool {
        self.errors.push(message.to_string());
        false
    }
}

/// Best-effort email validation.
///
/// This is intentionally not fully RFC-compliant; install a custom rule for
/// stricter checks.
pub fn is_email(s: &str) -> bool {
    static EMAIL_RE: OnceLock<regex::Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| {
            regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid built-in email regex")
        })
        .is_match(s)
}

/// Remove `<...>` tag spans from a value. An unclosed tag drops the
/// remainder of the string.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(value: &str, rules: &[Rule]) -> (bool, Vec<String>) {
        let mut validator = Validator::new();
        let mut value = value.to_string();
        let ok = validator.validate(&mut value, rules);
        (ok, validator.errors().to_vec())
    }

    #[test]
    fn required_rejects_blank() {
        assert!(!run("   ", &[Rule::Required]).0);
        assert!(run("x", &[Rule::Required]).0);
    }

    #[test]
    fn numeric_and_int_rules() {
        assert!(run("3.25", &[Rule::Numeric]).0);
        assert!(!run("3.2.5", &[Rule::Numeric]).0);
        assert!(run("42", &[Rule::Int]).0);
        assert!(!run("4.2", &[Rule::Int]).0);
        assert!(!run("", &[Rule::Int]).0);
    }

    #[test]
    fn positive_rule_only_fails_parsed_negatives() {
        assert!(run("5", &[Rule::Positive]).0);
        assert!(!run("-5", &[Rule::Positive]).0);
        assert!(run("abc", &[Rule::Positive]).0);
    }

    #[test]
    fn email_rule() {
        assert!(run("user@example.com", &[Rule::Email]).0);
        assert!(!run("not-an-email", &[Rule::Email]).0);
        assert!(!run("a b@example.com", &[Rule::Email]).0);
    }

    #[test]
    fn character_class_rules() {
        assert!(run("abc_123", &[Rule::Alphanumeric]).0);
        assert!(!run("abc!", &[Rule::Alphanumeric]).0);
        assert!(run("John Smith", &[Rule::Alpha]).0);
        assert!(!run("John5", &[Rule::Alpha]).0);
        assert!(run("Mary-Jane O'Brien", &[Rule::Name]).0);
        assert!(!run("R2-D2", &[Rule::Name]).0);
    }

    #[test]
    fn length_bounds() {
        assert!(!run("ab", &[Rule::MinLen(3)]).0);
        assert!(run("abc", &[Rule::MinLen(3)]).0);
        assert!(!run("abcd", &[Rule::MaxLen(3)]).0);
        assert!(run("abc", &[Rule::MaxLen(3)]).0);
    }

    #[test]
    fn value_bounds() {
        assert!(!run("5", &[Rule::MinVal(10.0)]).0);
        assert!(run("15", &[Rule::MinVal(10.0)]).0);
        assert!(!run("15", &[Rule::MaxVal(10.0)]).0);
        assert!(run("5", &[Rule::MaxVal(10.0)]).0);
    }

    #[test]
    fn regex_rule_uses_pattern_message() {
        let (ok, errors) = run("abc", &[Rule::Regex("^[0-9]+$".to_string())]);
        assert!(!ok);
        assert_eq!(errors, vec!["Failed regular expression ^[0-9]+$"]);
        assert!(run("123", &[Rule::Regex("^[0-9]+$".to_string())]).0);
    }

    #[test]
    fn regex_rule_prefers_field_error() {
        let mut validator = Validator::new();
        validator.set_field_error("Digits only, please.");
        let mut value = "abc".to_string();
        assert!(!validator.validate(&mut value, &[Rule::Regex("^[0-9]+$".to_string())]));
        assert_eq!(validator.errors(), ["Digits only, please."]);
    }

    #[test]
    fn date_rules() {
        assert!(run("2020-02-29", &[Rule::Date]).0);
        assert!(!run("2020-02-30", &[Rule::Date]).0);
        assert!(!run("yesterday", &[Rule::Date]).0);
        assert!(run("1999-01-01", &[Rule::Past]).0);
        assert!(!run("2999-01-01", &[Rule::Past]).0);
    }

    #[test]
    fn website_rule_accepts_schemeless_values() {
        assert!(run("example.com/page", &[Rule::Website]).0);
        assert!(run("https://example.com", &[Rule::Website]).0);
        assert!(run("", &[Rule::Website]).0);
        assert!(!run("not a url", &[Rule::Website]).0);
    }

    #[test]
    fn password_rule_checks_minimum_length() {
        assert!(!run("short", &[Rule::Password(8)]).0);
        assert!(run("long enough", &[Rule::Password(8)]).0);
        assert!(run("", &[Rule::Password(8)]).0);
    }

    #[test]
    fn custom_rule_records_custom_message() {
        let mut validator = Validator::new();
        validator.set_custom_validation(|v| v.contains("forbidden"), "No forbidden words.");
        let mut value = "forbidden fruit".to_string();
        assert!(!validator.validate(&mut value, &[Rule::Custom]));
        assert_eq!(validator.errors(), ["No forbidden words."]);

        let mut value = "fine".to_string();
        let mut validator2 = Validator::new();
        validator2.set_custom_validation(|v| v.contains("forbidden"), "No forbidden words.");
        assert!(validator2.validate(&mut value, &[Rule::Custom]));
    }

    #[test]
    fn striphtml_transforms_the_value() {
        let mut validator = Validator::new();
        let mut value = "<b>bold</b> text".to_string();
        assert!(validator.validate(&mut value, &[Rule::StripHtml]));
        assert_eq!(value, "bold text");
    }

    #[test]
    fn unknown_rule_fails_with_diagnostic() {
        let (ok, errors) = run("anything", &[Rule::parse("sparkly")]);
        assert!(!ok);
        assert_eq!(errors, vec!["Unrecognized validation rule: \"sparkly\""]);
    }

    #[test]
    fn messages_accumulate_across_failed_rules() {
        let (ok, errors) = run("", &[Rule::Required, Rule::MinLen(2)]);
        assert!(!ok);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn rule_parsing_with_parameters() {
        assert_eq!(Rule::parse("maxlen:40"), Rule::MaxLen(40));
        assert_eq!(Rule::parse("minval:2.5"), Rule::MinVal(2.5));
        assert_eq!(
            Rule::parse("regex:^a+$"),
            Rule::Regex("^a+$".to_string())
        );
        assert_eq!(Rule::parse("maxlen:junk"), Rule::MaxLen(0));
        assert_eq!(
            Rule::parse_list(&["required", "maxlen:10"]),
            vec![Rule::Required, Rule::MaxLen(10)]
        );
    }

    #[test]
    fn strip_tags_drops_unclosed_tag_remainder() {
        assert_eq!(strip_tags("keep <a href='x'"), "keep ");
    }
}
