use crate::oracle::{LibPhoneNumber, Oracle, Verdict};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

const EMPTY_SENTINELS: [&str; 3] = ["", "nan", "None"];
const DOMESTIC_LENGTH: usize = 10;
const MEXICAN_CODE: &str = "52";
// "55" is the Mexico City area code and the most common miskey of "52".
const MISKEYED_CODE: &str = "55";

/// A phone number exactly as it arrived, before any cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PhoneInput {
    Text(String),
    Integer(i64),
    Absent,
}

impl PhoneInput {
    fn is_empty(&self) -> bool {
        match self {
            PhoneInput::Absent => true,
            PhoneInput::Text(text) => EMPTY_SENTINELS.contains(&text.as_str()),
            PhoneInput::Integer(_) => false,
        }
    }
}

impl fmt::Display for PhoneInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhoneInput::Text(text) => f.write_str(text),
            PhoneInput::Integer(n) => write!(f, "{}", n),
            PhoneInput::Absent => f.write_str("None"),
        }
    }
}

impl From<&str> for PhoneInput {
    fn from(text: &str) -> Self {
        PhoneInput::Text(text.to_string())
    }
}

impl From<String> for PhoneInput {
    fn from(text: String) -> Self {
        PhoneInput::Text(text)
    }
}

impl From<i64> for PhoneInput {
    fn from(n: i64) -> Self {
        PhoneInput::Integer(n)
    }
}

impl<T: Into<PhoneInput>> From<Option<T>> for PhoneInput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PhoneInput::Absent)
    }
}

impl From<&Value> for PhoneInput {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => PhoneInput::Absent,
            Value::String(text) => PhoneInput::Text(text.clone()),
            Value::Number(n) => n
                .as_i64()
                .map(PhoneInput::Integer)
                .unwrap_or_else(|| PhoneInput::Text(n.to_string())),
            other => PhoneInput::Text(other.to_string()),
        }
    }
}

/// Which rewrite rule produced the candidate number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Empty,
    #[serde(rename = "MEXICAN_10_DIGITS")]
    Mexican10Digits,
    MexicanWithCode,
    #[serde(rename = "MEXICAN_55_CORRECTED")]
    Mexican55Corrected,
    #[serde(rename = "MEXICAN_PLUS55_CORRECTED")]
    MexicanPlus55Corrected,
    InternationalNoPlus,
    AlreadyFormatted,
    UnknownFormat,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Empty => "EMPTY",
            Status::Mexican10Digits => "MEXICAN_10_DIGITS",
            Status::MexicanWithCode => "MEXICAN_WITH_CODE",
            Status::Mexican55Corrected => "MEXICAN_55_CORRECTED",
            Status::MexicanPlus55Corrected => "MEXICAN_PLUS55_CORRECTED",
            Status::InternationalNoPlus => "INTERNATIONAL_NO_PLUS",
            Status::AlreadyFormatted => "ALREADY_FORMATTED",
            Status::UnknownFormat => "UNKNOWN_FORMAT",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of normalizing one phone number.
///
/// `is_valid` implies `candidate_number` is present and starts with `+`;
/// an [`Status::Empty`] result carries neither `cleaned_digits` nor
/// `candidate_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationResult {
    pub original: PhoneInput,
    pub cleaned_digits: Option<String>,
    pub candidate_number: Option<String>,
    pub is_valid: bool,
    pub status: Status,
    pub notes: String,
}

impl NormalizationResult {
    fn empty(original: PhoneInput, notes: &str) -> NormalizationResult {
        NormalizationResult {
            original,
            cleaned_digits: None,
            candidate_number: None,
            is_valid: false,
            status: Status::Empty,
            notes: notes.to_string(),
        }
    }

    /// The candidate number, only when the oracle accepted it.
    pub fn clean_phone(&self) -> Option<&str> {
        self.candidate_number
            .as_deref()
            .filter(|_| self.is_valid)
    }
}

/// Classifies and rewrites phone numbers, then asks an [`Oracle`] whether
/// the rewritten number is real.
#[derive(Debug, Default, Clone)]
pub struct Normalizer<O = LibPhoneNumber> {
    oracle: O,
}

impl<O: Oracle> Normalizer<O> {
    pub fn new(oracle: O) -> Normalizer<O> {
        Normalizer { oracle }
    }

    /// Never fails on malformed input; an `Err` only comes from the oracle.
    pub fn normalize(&self, input: impl Into<PhoneInput>) -> Result<NormalizationResult> {
        let original = input.into();
        if original.is_empty() {
            return Ok(NormalizationResult::empty(original, "Empty or null input"));
        }

        let cleaned = clean(&original.to_string());
        if cleaned.is_empty() {
            return Ok(NormalizationResult::empty(original, "Empty after cleaning"));
        }

        let (status, candidate) = rewrite(&cleaned);
        let mut notes = describe(status, cleaned.len());

        let is_valid = match self.oracle.verdict(&candidate)? {
            Verdict::Valid => {
                notes.push_str(" - valid number");
                true
            }
            Verdict::Invalid => {
                notes.push_str(" - not a valid international number");
                false
            }
            Verdict::Unparseable(detail) => {
                notes.push_str(&format!(" - validation error: {}", detail));
                false
            }
        };

        Ok(NormalizationResult {
            original,
            cleaned_digits: Some(cleaned),
            // Only prefixed candidates count, whatever the oracle says.
            is_valid: is_valid && candidate.starts_with('+'),
            candidate_number: Some(candidate),
            status,
            notes,
        })
    }

    pub fn clean_phone(&self, input: impl Into<PhoneInput>) -> Result<Option<String>> {
        Ok(self.normalize(input)?.clean_phone().map(str::to_string))
    }

    pub fn is_valid_phone(&self, input: impl Into<PhoneInput>) -> Result<bool> {
        Ok(self.normalize(input)?.is_valid)
    }
}

fn clean(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// First matching rule wins.
fn rewrite(cleaned: &str) -> (Status, String) {
    let all_digits = cleaned.bytes().all(|b| b.is_ascii_digit());

    if all_digits && cleaned.len() == DOMESTIC_LENGTH {
        return (Status::Mexican10Digits, format!("+{}{}", MEXICAN_CODE, cleaned));
    }

    if all_digits && cleaned.len() > DOMESTIC_LENGTH {
        return match cleaned.len() {
            12 if cleaned.starts_with(MEXICAN_CODE) => {
                (Status::MexicanWithCode, format!("+{}", cleaned))
            }
            12 if cleaned.starts_with(MISKEYED_CODE) => (
                Status::Mexican55Corrected,
                format!("+{}{}", MEXICAN_CODE, &cleaned[2..]),
            ),
            _ => (Status::InternationalNoPlus, format!("+{}", cleaned)),
        };
    }

    if let Some(rest) = cleaned.strip_prefix('+') {
        return match rest.strip_prefix(MISKEYED_CODE) {
            Some(local) if cleaned.len() == 13 => (
                Status::MexicanPlus55Corrected,
                format!("+{}{}", MEXICAN_CODE, local),
            ),
            _ => (Status::AlreadyFormatted, cleaned.to_string()),
        };
    }

    (Status::UnknownFormat, cleaned.to_string())
}

fn describe(status: Status, cleaned_len: usize) -> String {
    match status {
        Status::Empty => "Empty or null input".to_string(),
        Status::Mexican10Digits => "10-digit Mexican number, added +52".to_string(),
        Status::MexicanWithCode => "Mexican number with country code 52, added +".to_string(),
        Status::Mexican55Corrected => {
            "Mexican number corrected: leading 55 replaced with country code 52".to_string()
        }
        Status::MexicanPlus55Corrected => {
            "Mexican number corrected: +55 replaced with +52".to_string()
        }
        Status::InternationalNoPlus => "International number without +, added +".to_string(),
        Status::AlreadyFormatted => "Number already in international format".to_string(),
        Status::UnknownFormat => format!("Unknown format - length: {}", cleaned_len),
    }
}

pub fn normalize(input: impl Into<PhoneInput>) -> Result<NormalizationResult> {
    Normalizer::<LibPhoneNumber>::default().normalize(input)
}

pub fn clean_phone(input: impl Into<PhoneInput>) -> Result<Option<String>> {
    Normalizer::<LibPhoneNumber>::default().clean_phone(input)
}

pub fn is_valid_phone(input: impl Into<PhoneInput>) -> Result<bool> {
    Normalizer::<LibPhoneNumber>::default().is_valid_phone(input)
}
