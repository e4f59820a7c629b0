use chrono::{Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::borrow::Cow;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::FieldErrors;
use crate::models::employee::{Area, Country, IdentificationType};

/// How far back a join date may lie, counted from today.
pub const JOIN_WINDOW_DAYS: i64 = 30;

/// Wire format of `fecha_ingreso`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const REQUIRED: &str = "Este campo es requerido.";
pub const BLANK: &str = "Este campo no puede estar en blanco.";
pub const BAD_DATE: &str = "Formato de fecha inválido, use AAAA-MM-DD.";
pub const LETTERS_ONLY: &str = "Solo letras mayúsculas A-Z.";
pub const LETTERS_AND_SPACES: &str = "Solo letras mayúsculas A-Z y espacios.";
pub const DIGITS_ONLY: &str = "Solo números.";
pub const DUPLICATE_IDENTIFICATION: &str =
    "Ya existe un empleado con este tipo y número de identificación.";

// Accepts lowercase too, even though the messages ask for uppercase.
pub static LETTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").expect("letters pattern is valid"));
pub static LETTERS_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z ]+$").expect("letters and spaces pattern is valid"));
pub static DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("digits pattern is valid"));

fn rule(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Text fields accept any JSON scalar and are trimmed, so a wrong type ends
/// up as a field error instead of rejecting the whole body.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.trim().to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Runs the derived rules and returns every violation keyed by field.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), FieldErrors> {
    payload.validate().map_err(|err| field_errors(&err))
}

pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|err| match &err.message {
                    Some(message) => message.to_string(),
                    None => err.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

pub fn check_join_date(date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if date > today {
        return Err(rule(
            "fecha_ingreso_futura",
            "La fecha de ingreso no puede ser futura.",
        ));
    }
    if date < today - Duration::days(JOIN_WINDOW_DAYS) {
        return Err(rule(
            "fecha_ingreso_antigua",
            "La fecha de ingreso no puede ser anterior a un mes.",
        ));
    }
    Ok(())
}

pub fn parse_join_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| rule("fecha_invalida", BAD_DATE))
}

pub fn validate_join_date(value: &str) -> Result<(), ValidationError> {
    check_join_date(parse_join_date(value)?, Utc::now().date_naive())
}

/// Required names: not blank, letters only.
pub fn validate_letters(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(rule("en_blanco", BLANK))
    } else if LETTERS.is_match(value) {
        Ok(())
    } else {
        Err(rule("letras", LETTERS_ONLY))
    }
}

pub fn validate_digits(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(rule("en_blanco", BLANK))
    } else if DIGITS.is_match(value) {
        Ok(())
    } else {
        Err(rule("numeros", DIGITS_ONLY))
    }
}

/// Blank is allowed for the second surname; otherwise letters only.
pub fn validate_optional_letters(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || LETTERS.is_match(value) {
        Ok(())
    } else {
        Err(rule("letras", LETTERS_ONLY))
    }
}

pub fn validate_other_names(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || LETTERS_SPACES.is_match(value) {
        Ok(())
    } else {
        Err(rule("letras_espacios", LETTERS_AND_SPACES))
    }
}

fn validate_choice<T: FromStr>(value: &str) -> Result<(), ValidationError> {
    match value.parse::<T>() {
        Ok(_) => Ok(()),
        Err(_) => Err(rule(
            "eleccion_invalida",
            format!("\"{}\" no es una elección válida.", value),
        )),
    }
}

pub fn validate_country(value: &str) -> Result<(), ValidationError> {
    validate_choice::<Country>(value)
}

pub fn validate_identification_type(value: &str) -> Result<(), ValidationError> {
    validate_choice::<IdentificationType>(value)
}

pub fn validate_area(value: &str) -> Result<(), ValidationError> {
    validate_choice::<Area>(value)
}
