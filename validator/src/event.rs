use crate::normalize::{NormalizationResult, Normalizer, PhoneInput};
use crate::oracle::Oracle;
use lambda_runtime::tracing;
use serde::Serialize;
use serde_json::Value;

/// Keys a workflow step may use for the phone number, in lookup order.
const PHONE_KEYS: [&str; 5] = ["phone", "phoneNumber", "phone_number", "telephone", "mobile"];

#[derive(Debug, Serialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub validation_result: Option<NormalizationResult>,
    pub clean_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_phone: Option<PhoneInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_event: Option<Value>,
}

impl Response {
    fn missing(event: &Value) -> Response {
        Response {
            status_code: 400,
            success: false,
            message: "No phone number provided in the request".to_string(),
            error: Some("MISSING_PHONE_NUMBER".to_string()),
            validation_result: None,
            clean_phone: None,
            original_phone: None,
            original_event: Some(event.clone()),
        }
    }

    fn internal(event: &Value, err: &anyhow::Error) -> Response {
        Response {
            status_code: 500,
            success: false,
            message: format!("Internal error during phone validation: {}", err),
            error: Some("INTERNAL_ERROR".to_string()),
            validation_result: None,
            clean_phone: None,
            original_phone: None,
            original_event: Some(event.clone()),
        }
    }

    fn validated(phone: PhoneInput, result: NormalizationResult) -> Response {
        let clean_phone = result.clean_phone().map(str::to_string);

        let (status_code, message, error) = if result.is_valid {
            (
                200,
                "Phone number successfully validated and formatted".to_string(),
                None,
            )
        } else {
            (
                422,
                format!("Phone number validation failed: {}", result.notes),
                Some(result.status.to_string()),
            )
        };

        Response {
            status_code,
            success: result.is_valid,
            message,
            error,
            validation_result: Some(result),
            clean_phone,
            original_phone: Some(phone),
            original_event: None,
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn lookup(object: &serde_json::Map<String, Value>) -> Option<&Value> {
    PHONE_KEYS
        .iter()
        .filter_map(|key| object.get(*key))
        .find(|value| truthy(value))
}

/// Finds the phone number in a workflow payload: a bare string or integer,
/// one of the known keys, or the same keys under `data`.
pub fn extract_phone(event: &Value) -> Option<PhoneInput> {
    let found = match event {
        Value::Object(object) => lookup(object).or_else(|| match object.get("data") {
            Some(Value::Object(data)) => lookup(data),
            _ => None,
        }),
        Value::String(_) => Some(event).filter(|value| truthy(value)),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(event).filter(|value| truthy(value)),
        _ => None,
    };

    found.map(PhoneInput::from)
}

pub fn respond<O: Oracle>(normalizer: &Normalizer<O>, event: &Value) -> Response {
    let Some(phone) = extract_phone(event) else {
        tracing::warn!("No phone number found in event");
        return Response::missing(event);
    };

    tracing::info!("Processing phone number: {}", phone);

    match normalizer.normalize(phone.clone()) {
        Ok(result) => {
            if result.is_valid {
                tracing::info!(
                    "Phone validation successful: {} -> {}",
                    phone,
                    result.clean_phone().unwrap_or_default()
                );
            } else {
                tracing::warn!("Phone validation failed: {} - {}", phone, result.notes);
            }
            Response::validated(phone, result)
        }
        Err(err) => {
            tracing::error!("Unexpected error processing phone validation: {:#}", err);
            Response::internal(event, &err)
        }
    }
}
