use itertools::Itertools;
use lambda_runtime::tracing;
use phone_validator::{NormalizationResult, Normalizer, Oracle, PhoneInput};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_BATCH_LIMIT: usize = 1000;

#[derive(Debug, Serialize)]
pub struct Entry {
    pub index: usize,
    pub original_phone: PhoneInput,
    pub validation_result: Option<NormalizationResult>,
    pub clean_phone: Option<String>,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Summary {
    pub total_processed: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub success_rate: f64,
}

impl Summary {
    fn new(entries: &[Entry]) -> Summary {
        let total_processed = entries.len();
        let valid_count = entries.iter().filter(|entry| entry.is_valid).count();

        let success_rate = if total_processed == 0 {
            0.0
        } else {
            let percent = valid_count as f64 / total_processed as f64 * 100.0;
            (percent * 100.0).round() / 100.0
        };

        Summary {
            total_processed,
            valid_count,
            invalid_count: total_processed - valid_count,
            success_rate,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub results: Vec<Entry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl Response {
    fn rejected(error: &str, message: String) -> Response {
        Response {
            status_code: 400,
            success: false,
            message,
            error: Some(error.to_string()),
            results: Vec::new(),
            summary: None,
        }
    }

    fn completed(results: Vec<Entry>) -> Response {
        let summary = Summary::new(&results);

        Response {
            status_code: 200,
            success: true,
            message: format!(
                "Batch validation completed: {}/{} valid numbers",
                summary.valid_count, summary.total_processed
            ),
            error: None,
            results,
            summary: Some(summary),
        }
    }
}

pub struct Batch<'a, O> {
    normalizer: &'a Normalizer<O>,
    limit: usize,
}

impl<'a, O: Oracle> Batch<'a, O> {
    pub fn new(normalizer: &'a Normalizer<O>, limit: usize) -> Batch<'a, O> {
        Batch { normalizer, limit }
    }

    pub fn run(&self, event: &Value) -> Response {
        let Some(phones) = Self::phones(event) else {
            return Response::rejected(
                "INVALID_INPUT",
                r#"Expected array of phone numbers in "phones" field"#.to_string(),
            );
        };
        tracing::info!("Number of phone numbers received: {}", phones.len());

        if phones.len() > self.limit {
            tracing::warn!("Batch exceeds limit of {}", self.limit);
            return Response::rejected(
                "BATCH_TOO_LARGE",
                format!(
                    "Batch of {} phone numbers exceeds the limit of {}",
                    phones.len(),
                    self.limit
                ),
            );
        }

        let results: Vec<Entry> = phones
            .iter()
            .enumerate()
            .map(|(index, phone)| self.entry(index, phone))
            .collect();

        let invalid = results
            .iter()
            .filter(|entry| !entry.is_valid)
            .map(|entry| entry.index)
            .join(", ");
        if !invalid.is_empty() {
            tracing::warn!("Invalid phone numbers at indices: {}", invalid);
        }

        Response::completed(results)
    }

    fn phones(event: &Value) -> Option<&Vec<Value>> {
        event
            .get("phones")
            .and_then(Value::as_array)
            .filter(|phones| !phones.is_empty())
    }

    fn entry(&self, index: usize, phone: &Value) -> Entry {
        let original_phone = PhoneInput::from(phone);

        match self.normalizer.normalize(original_phone.clone()) {
            Ok(result) => Entry {
                index,
                original_phone,
                clean_phone: result.clean_phone().map(str::to_string),
                is_valid: result.is_valid,
                validation_result: Some(result),
                error: None,
            },
            Err(err) => {
                tracing::error!(
                    "Error validating phone at index {}: {} - {:#}",
                    index,
                    original_phone,
                    err
                );
                Entry {
                    index,
                    original_phone,
                    validation_result: None,
                    clean_phone: None,
                    is_valid: false,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use phone_validator::{Status, Verdict};
    use serde_json::json;

    fn accept_long(candidate: &str) -> Result<Verdict> {
        if candidate.len() >= 12 {
            Ok(Verdict::Valid)
        } else {
            Ok(Verdict::Invalid)
        }
    }

    fn broken_on_plus_one(candidate: &str) -> Result<Verdict> {
        if candidate.starts_with("+1") {
            anyhow::bail!("region metadata missing");
        }
        accept_long(candidate)
    }

    #[test]
    fn rejects_missing_or_empty_phones() {
        let normalizer = Normalizer::new(accept_long);
        let batch = Batch::new(&normalizer, DEFAULT_BATCH_LIMIT);

        for event in [
            json!({}),
            json!({"phones": []}),
            json!({"phones": "5512345678"}),
            json!("5512345678"),
        ] {
            let response = batch.run(&event);
            assert_eq!(response.status_code, 400);
            assert!(!response.success);
            assert_eq!(response.error.as_deref(), Some("INVALID_INPUT"));
            assert!(response.results.is_empty());
            assert!(response.summary.is_none());
        }
    }

    #[test]
    fn rejects_batches_over_limit() {
        let normalizer = Normalizer::new(accept_long);
        let response = Batch::new(&normalizer, 2).run(&json!({"phones": ["1", "2", "3"]}));

        assert_eq!(response.status_code, 400);
        assert_eq!(response.error.as_deref(), Some("BATCH_TOO_LARGE"));
    }

    #[test]
    fn validates_each_phone_in_order() {
        let normalizer = Normalizer::new(accept_long);
        let event = json!({
            "phones": ["55 1234-5678", "+52 55 1234 5678", "invalid", null, 5512345678_i64]
        });
        let response = Batch::new(&normalizer, DEFAULT_BATCH_LIMIT).run(&event);

        assert_eq!(response.status_code, 200);
        assert!(response.success);
        assert_eq!(response.message, "Batch validation completed: 3/5 valid numbers");

        let indices: Vec<usize> = response.results.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);

        let first = &response.results[0];
        assert!(first.is_valid);
        assert_eq!(first.clean_phone.as_deref(), Some("+525512345678"));

        let invalid = &response.results[2];
        assert!(!invalid.is_valid);
        assert_eq!(invalid.clean_phone, None);
        let status = invalid.validation_result.as_ref().map(|r| r.status);
        assert_eq!(status, Some(Status::Empty));

        assert_eq!(response.results[3].original_phone, PhoneInput::Absent);
        assert_eq!(response.results[4].original_phone, PhoneInput::Integer(5512345678));
        assert!(response.results[4].is_valid);

        assert_eq!(
            response.summary,
            Some(Summary {
                total_processed: 5,
                valid_count: 3,
                invalid_count: 2,
                success_rate: 60.0,
            })
        );
    }

    #[test]
    fn faulty_entry_does_not_abort_batch() {
        let normalizer = Normalizer::new(broken_on_plus_one);
        let event = json!({"phones": ["+1 555 123 4567", "5512345678"]});
        let response = Batch::new(&normalizer, DEFAULT_BATCH_LIMIT).run(&event);

        assert_eq!(response.status_code, 200);
        let failed = &response.results[0];
        assert!(!failed.is_valid);
        assert!(failed.validation_result.is_none());
        assert_eq!(failed.error.as_deref(), Some("region metadata missing"));
        assert!(response.results[1].is_valid);
    }

    #[test]
    fn success_rate_is_rounded() {
        let normalizer = Normalizer::new(accept_long);
        let event = json!({"phones": ["5512345678", "5512345679", "123"]});
        let response = Batch::new(&normalizer, DEFAULT_BATCH_LIMIT).run(&event);

        let summary = response.summary.unwrap();
        assert_eq!(summary.success_rate, 66.67);
    }

    #[test]
    fn serializes_summary_and_results() {
        let normalizer = Normalizer::new(accept_long);
        let response =
            Batch::new(&normalizer, DEFAULT_BATCH_LIMIT).run(&json!({"phones": ["5512345678"]}));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["statusCode"], json!(200));
        assert_eq!(value["summary"]["valid_count"], json!(1));
        assert_eq!(value["results"][0]["clean_phone"], json!("+525512345678"));
        assert!(value["results"][0].get("error").is_none());
    }
}
