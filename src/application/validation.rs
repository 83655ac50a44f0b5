//! Per-route field constraints as data.
//!
//! Each route owns an ordered rule table. `validate` evaluates every rule in
//! declaration order and collects all violations; callers surface only the
//! first one through [`first_violation`].

use serde::Serialize;
use serde_json::Value;

use crate::domain::error::{AppError, ErrorCode};

pub const NAME_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location { Params, Body }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence { Required, Optional }

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Field {
        field: &'static str,
        location: Location,
        presence: Presence,
        check: fn(&Value) -> bool,
        message: &'static str,
    },
    /// At least one of the listed body fields must be present.
    AnyOf {
        fields: &'static [&'static str],
        message: &'static str,
    },
}

/// Raw request input: the `:id` path segment (if the route has one) and the
/// decoded JSON body (if the route takes one).
#[derive(Debug, Clone, Copy, Default)]
pub struct Input<'a> {
    pub id: Option<&'a str>,
    pub body: Option<&'a Value>,
}

impl<'a> Input<'a> {
    pub fn path(id: &'a str) -> Self { Self { id: Some(id), body: None } }
    pub fn body(body: &'a Value) -> Self { Self { id: None, body: Some(body) } }
    pub fn path_and_body(id: &'a str, body: &'a Value) -> Self { Self { id: Some(id), body: Some(body) } }

    fn lookup(&self, field: &str, location: Location) -> Option<Value> {
        match location {
            Location::Params if field == "id" => self.id.map(|s| Value::String(s.to_owned())),
            Location::Params => None,
            Location::Body => self.body.and_then(|b| b.get(field)).cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub location: Location,
    pub value: Option<Value>,
    pub message: &'static str,
}

pub fn is_uuid(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.len() == 36 && uuid::Uuid::try_parse(s).is_ok())
}

pub fn is_duty_name(value: &Value) -> bool {
    value.as_str().is_some_and(|s| (1..=NAME_MAX_CHARS).contains(&s.trim().chars().count()))
}

pub fn is_boolean(value: &Value) -> bool { value.is_boolean() }

const ID: Rule = Rule::Field {
    field: "id",
    location: Location::Params,
    presence: Presence::Required,
    check: is_uuid,
    message: "ID must be a valid UUID",
};

const fn name(presence: Presence) -> Rule {
    Rule::Field {
        field: "name",
        location: Location::Body,
        presence,
        check: is_duty_name,
        message: "Name must be a string and between 1 and 100 characters",
    }
}

const fn is_completed(presence: Presence) -> Rule {
    Rule::Field {
        field: "is_completed",
        location: Location::Body,
        presence,
        check: is_boolean,
        message: "is_completed must be a boolean",
    }
}

pub const LIST_RULES: &[Rule] = &[];
pub const GET_RULES: &[Rule] = &[ID];
pub const DELETE_RULES: &[Rule] = &[ID];
pub const CREATE_RULES: &[Rule] = &[name(Presence::Required)];
pub const UPDATE_RULES: &[Rule] = &[
    ID,
    name(Presence::Optional),
    is_completed(Presence::Optional),
    Rule::AnyOf {
        fields: &["name", "is_completed"],
        message: "Either name or is_completed must be provided",
    },
];
pub const UPDATE_STATUS_RULES: &[Rule] = &[ID, is_completed(Presence::Required)];

pub fn validate(rules: &[Rule], input: &Input<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();
    for rule in rules {
        match *rule {
            Rule::Field { field, location, presence, check, message } => {
                let value = input.lookup(field, location);
                let ok = match (&value, presence) {
                    (None, Presence::Optional) => true,
                    (None, Presence::Required) => false,
                    (Some(v), _) => check(v),
                };
                if !ok {
                    violations.push(Violation { field, location, value, message });
                }
            }
            Rule::AnyOf { fields, message } => {
                let present = fields.iter().any(|f| input.lookup(f, Location::Body).is_some());
                if !present {
                    violations.push(Violation { field: "body", location: Location::Body, value: input.body.cloned(), message });
                }
            }
        }
    }
    violations
}

/// Runs the rule table and turns the first violation, if any, into the
/// error carrier.
pub fn first_violation(rules: &[Rule], input: &Input<'_>) -> Result<(), AppError> {
    match validate(rules, input).into_iter().next() {
        Some(violation) => Err(violation_error(&violation)),
        None => Ok(()),
    }
}

pub fn violation_error(violation: &Violation) -> AppError {
    let details = serde_json::to_string(violation).ok();
    match violation.field {
        "id" => AppError::from_code(ErrorCode::InvalidId, details),
        "name" => AppError::from_code(ErrorCode::InvalidName, details),
        "is_completed" => AppError::from_code(ErrorCode::InvalidIsCompleted, details),
        _ => AppError::new(ErrorCode::ValidationFailed, violation.message, details),
    }
}
