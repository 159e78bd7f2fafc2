use lambda_runtime::tracing;
use phone_validator::Normalizer;
use phone_validator::event::{self, Response};
use serde_json::Value;

async fn handle(
    request: lambda_runtime::LambdaEvent<Value>,
) -> Result<Response, lambda_runtime::Error> {
    tracing::info!("Received event: {}", request.payload);

    let normalizer: Normalizer = Normalizer::default();
    let response = event::respond(&normalizer, &request.payload);
    tracing::info!("Responding with status code: {}", response.status_code);

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let service_fn = lambda_runtime::service_fn(handle);
    lambda_runtime::run(service_fn).await
}
