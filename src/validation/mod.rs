use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use url::Url;

use crate::link::is_drive_link;
use crate::types::{is_object_id, lenient::parse_int};
use crate::{MaterialError, Result};

pub mod rules;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

const MAX_EMAIL_LEN: usize = 254;

#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// Character count of the trimmed string.
    Length { min: usize, max: usize },
    IntRange { min: i64, max: i64 },
    NonEmptyArray,
    /// Applies `Length` to every element of an array.
    EachLength { min: usize, max: usize },
    EachNonBlank,
    Url,
    Email,
    ObjectId,
    DriveLink,
    OneOf(&'static [&'static str]),
}

impl Check {
    pub fn passes(&self, value: &Value) -> bool {
        match self {
            Check::Length { min, max } => value.as_str().is_some_and(|s| within(s, *min, *max)),
            Check::IntRange { min, max } => parse_int(value).is_some_and(|n| (*min..=*max).contains(&n)),
            Check::NonEmptyArray => value.as_array().is_some_and(|items| !items.is_empty()),
            Check::EachLength { min, max } => each(value, |s| within(s, *min, *max)),
            Check::EachNonBlank => each(value, |s| !s.trim().is_empty()),
            Check::Url => value.as_str().is_some_and(is_absolute_url),
            Check::Email => value.as_str().is_some_and(is_email),
            Check::ObjectId => value.as_str().is_some_and(is_object_id),
            Check::DriveLink => value.as_str().is_some_and(is_drive_link),
            Check::OneOf(allowed) => value.as_str().is_some_and(|s| allowed.contains(&s.trim())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub field: &'static str,
    pub check: Check,
    pub optional: bool,
    pub message: &'static str,
}

impl Rule {
    fn applies_to(&self, value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => !self.optional,
            Some(Value::String(s)) if self.optional && s.trim().is_empty() => false,
            Some(_) => true,
        }
    }

    fn holds(&self, payload: &Map<String, Value>) -> bool {
        let value = payload.get(self.field);
        if !self.applies_to(value) {
            return true;
        }
        value.is_some_and(|v| self.check.passes(v))
    }

    pub fn to_error(&self) -> MaterialError {
        match self.check {
            Check::DriveLink => MaterialError::InvalidAssetLink(self.message.to_string()),
            _ => MaterialError::ValidationFailed(self.message.to_string()),
        }
    }
}

/// An ordered list of field constraints. Only the first failing rule is reported.
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: &'static str,
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(name: &'static str) -> Self {
        Self { name, rules: Vec::new() }
    }

    pub fn rule(mut self, field: &'static str, check: Check, message: &'static str) -> Self {
        self.rules.push(Rule { field, check, optional: false, message });
        self
    }

    pub fn optional(mut self, field: &'static str, check: Check, message: &'static str) -> Self {
        self.rules.push(Rule { field, check, optional: true, message });
        self
    }

    /// Same constraints, checked only for fields that are present.
    pub fn partial(mut self, name: &'static str) -> Self {
        self.name = name;
        for rule in &mut self.rules {
            rule.optional = true;
        }
        self
    }

    pub fn first_failure(&self, payload: &Map<String, Value>) -> Option<&Rule> {
        self.rules.iter().find(|rule| !rule.holds(payload))
    }

    pub fn validate(&self, payload: &Map<String, Value>) -> Result<()> {
        match self.first_failure(payload) {
            Some(rule) => {
                tracing::debug!(rule_set = self.name, field = rule.field, "validation failed");
                Err(rule.to_error())
            }
            None => Ok(()),
        }
    }

    /// Validates path or query parameters given as plain strings.
    pub fn validate_params(&self, params: &[(&str, &str)]) -> Result<()> {
        let payload: Map<String, Value> = params
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect();
        self.validate(&payload)
    }
}

fn within(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.trim().chars().count())
}

fn each(value: &Value, check: impl Fn(&str) -> bool) -> bool {
    match value.as_array() {
        Some(items) => items.iter().all(|item| item.as_str().is_some_and(&check)),
        None => true,
    }
}

pub fn is_absolute_url(raw: &str) -> bool {
    match Url::parse(raw.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

pub fn is_email(raw: &str) -> bool {
    let raw = raw.trim();
    raw.len() <= MAX_EMAIL_LEN && EMAIL.is_match(raw)
}

/// Trimmed and lower-cased, so one voter maps to one upvote entry.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
