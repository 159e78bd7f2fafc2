use anyhow::{Result, bail};
use batch::{Batch, DEFAULT_BATCH_LIMIT, Response};
use lambda_runtime::tracing;
use phone_validator::Normalizer;
use serde_json::Value;
use std::env::VarError;

fn get_batch_limit() -> Result<usize> {
    match std::env::var("MAX_BATCH_SIZE") {
        Ok(value) => {
            let limit: usize = value.parse()?;
            if limit == 0 {
                bail!("MAX_BATCH_SIZE must be positive");
            }
            Ok(limit)
        }
        Err(VarError::NotPresent) => Ok(DEFAULT_BATCH_LIMIT),
        Err(err) => Err(err.into()),
    }
}

async fn handle(
    request: lambda_runtime::LambdaEvent<Value>,
) -> Result<Response, lambda_runtime::Error> {
    let normalizer: Normalizer = Normalizer::default();
    let batch = Batch::new(&normalizer, get_batch_limit()?);

    let response = batch.run(&request.payload);
    if let Some(summary) = &response.summary {
        tracing::info!("Number of valid phone numbers: {}", summary.valid_count);
        tracing::info!("Number of invalid phone numbers: {}", summary.invalid_count);
    }

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let service_fn = lambda_runtime::service_fn(handle);
    lambda_runtime::run(service_fn).await
}
