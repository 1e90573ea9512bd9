//! Lambda handler
//!
//! Event: `{"manual": bool?, "task": "idle-stop" | "list-buckets" | "list-instances"?}`.
//! A platform timer sends scheduled events; unknown fields are ignored.

use idlestop_cloud_aws::AwsProvider;
use idlestop_config::Settings;
use idlestop_core::{InvocationEvent, SystemClock, WebhookNotifier, Workflow};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // CloudWatch Logs: no colours, no module targets
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();

    // Settings and clients are built once per execution environment
    let settings = idlestop_config::load_settings()?;
    let provider = AwsProvider::from_region(&settings.region).await;
    let notifier = WebhookNotifier::from_settings(&settings.notifications);

    let settings = &settings;
    let provider = &provider;
    let notifier = &notifier;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<InvocationEvent>| async move {
        handler(settings, provider, notifier, event).await
    }))
    .await
}

async fn handler(
    settings: &Settings,
    provider: &AwsProvider,
    notifier: &WebhookNotifier,
    event: LambdaEvent<InvocationEvent>,
) -> Result<Value, Error> {
    let (event, context) = event.into_parts();
    tracing::info!(request_id = %context.request_id, "{:?}", event);

    let workflow = Workflow::new(provider, notifier, &SystemClock, settings)?;
    let output = workflow.handle(&event).await?;
    Ok(serde_json::to_value(output)?)
}
