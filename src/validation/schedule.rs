//! Trial-class booking form.
//!
//! Every field is cleaned on its own and failures are collected into
//! [`FieldErrors`]; one bad field never hides problems in another.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::timeslot::TimeslotCatalog;

pub const FIELD_NAME: &str = "nome_sobrenome";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PHONE: &str = "telefone";
pub const FIELD_DATE: &str = "data";
pub const FIELD_TIMESLOT: &str = "horario";

pub const MSG_NAME_REQUIRED: &str = "Informe seu nome completo";
pub const MSG_NAME_INVALID: &str = "Nome inválido";
pub const MSG_EMAIL_REQUIRED: &str = "E-mail é obrigatório";
pub const MSG_EMAIL_INVALID: &str = "E-mail inválido";
pub const MSG_PHONE_INVALID: &str = "Telefone inválido";
pub const MSG_DATE_INVALID: &str = "Data inválida";
pub const MSG_DATE_WEEKEND: &str = "Escolha um dia útil (segunda a sexta)";
pub const MSG_TIMESLOT_INVALID: &str = "Horário inválido";
pub const MSG_TIMESLOT_UNAVAILABLE: &str = "Horário 5:30 indisponível às terças e quintas";

const DATE_FORMAT: &str = "%Y-%m-%d";
const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 9..=11;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("whitespace pattern");
    static ref NAME_PATTERN: Regex =
        Regex::new(r"^[A-Za-zÀ-ÖØ-öø-ÿ\s\-]{3,100}$").expect("name pattern");
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+$").expect("email pattern");
}

/// Raw, untyped booking request as posted by the browser.
#[derive(Debug, Clone, Default)]
pub struct ScheduleSubmission {
    fields: Map<String, Value>,
}

impl ScheduleSubmission {
    /// Accepts only JSON objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// String value of `key`; non-string values read as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for ScheduleSubmission {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// A booking whose every field passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanedSchedule {
    #[serde(rename = "nome_sobrenome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "horario")]
    pub timeslot: String,
}

/// Field name → message. Serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, &'static str>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }

    /// Records the first failure for `field` and passes successes through.
    fn check(&mut self, field: &'static str, result: Result<String, &'static str>) -> Option<String> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.0.entry(field).or_insert(message);
                None
            }
        }
    }
}

/// Run every field rule over `submission`.
pub fn validate(submission: &ScheduleSubmission) -> Result<CleanedSchedule, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name = errors.check(FIELD_NAME, clean_name(submission.text(FIELD_NAME)));
    let email = errors.check(FIELD_EMAIL, clean_email(submission.text(FIELD_EMAIL)));
    let phone = errors.check(FIELD_PHONE, clean_phone(submission.text(FIELD_PHONE)));
    let date = errors.check(FIELD_DATE, clean_date(submission.text(FIELD_DATE)));

    // The slot rule re-reads the raw date when the date rule failed.
    let date_hint = date.as_deref().or_else(|| submission.text(FIELD_DATE));
    let timeslot = errors.check(
        FIELD_TIMESLOT,
        clean_timeslot(submission.text(FIELD_TIMESLOT), date_hint),
    );

    match (name, email, phone, date, timeslot) {
        (Some(name), Some(email), Some(phone), Some(date), Some(timeslot)) if errors.is_empty() => {
            Ok(CleanedSchedule {
                name,
                email,
                phone,
                date,
                timeslot,
            })
        }
        _ => Err(errors),
    }
}

pub fn clean_name(raw: Option<&str>) -> Result<String, &'static str> {
    let trimmed = raw.unwrap_or_default().trim();
    if trimmed.is_empty() {
        return Err(MSG_NAME_REQUIRED);
    }

    let name = WHITESPACE_RUN.replace_all(trimmed, " ");
    if !NAME_PATTERN.is_match(&name) {
        return Err(MSG_NAME_INVALID);
    }
    Ok(name.into_owned())
}

pub fn clean_email(raw: Option<&str>) -> Result<String, &'static str> {
    let email = raw.unwrap_or_default().trim().to_lowercase();
    if email.is_empty() {
        return Err(MSG_EMAIL_REQUIRED);
    }
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(MSG_EMAIL_INVALID);
    }
    Ok(email)
}

pub fn clean_phone(raw: Option<&str>) -> Result<String, &'static str> {
    let digits: String = raw
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    if !PHONE_DIGITS.contains(&digits.len()) {
        return Err(MSG_PHONE_INVALID);
    }
    Ok(digits)
}

/// Keeps the submitted string as-is once it parses to a weekday.
pub fn clean_date(raw: Option<&str>) -> Result<String, &'static str> {
    let raw = raw.ok_or(MSG_DATE_INVALID)?;
    let date = parse_date(raw).ok_or(MSG_DATE_INVALID)?;

    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return Err(MSG_DATE_WEEKEND);
    }
    Ok(raw.to_string())
}

/// `date` is only consulted for the weekday rule; an unparseable date is
/// left for [`clean_date`] to report.
pub fn clean_timeslot(raw: Option<&str>, date: Option<&str>) -> Result<String, &'static str> {
    let catalog = TimeslotCatalog;
    let slot = raw.unwrap_or_default().trim();
    if !catalog.contains(slot) {
        return Err(MSG_TIMESLOT_INVALID);
    }

    if let Some(day) = date.and_then(parse_date) {
        if !catalog.runs_on(slot, day.weekday()) {
            return Err(MSG_TIMESLOT_UNAVAILABLE);
        }
    }
    Ok(slot.to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}
