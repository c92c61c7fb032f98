use alert_relay_core::response::AlertResponse;
use alert_relay_lambda::adapters::publisher::NotificationPublisher;
use alert_relay_lambda::config::RelayConfig;
use alert_relay_lambda::handlers::pipeline::AlertPipeline;
use alert_relay_lambda::telemetry::init_logging;
use aws_sdk_sns::error::DisplayErrorContext;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info_span;

struct SnsPublisher {
    sns_client: aws_sdk_sns::Client,
}

impl NotificationPublisher for SnsPublisher {
    fn publish(&self, topic_arn: &str, subject: &str, message: &str) -> Result<(), String> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                self.sns_client
                    .publish()
                    .target_arn(topic_arn)
                    .subject(subject)
                    .message(message)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!(
                            "failed to publish sns notification: {}",
                            DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }
}

async fn handle_request(
    publisher: &SnsPublisher,
    event: LambdaEvent<Value>,
) -> Result<AlertResponse, Error> {
    let span = info_span!("alert_relay", request_id = %event.context.request_id);
    let pipeline = AlertPipeline::new(RelayConfig::from_env(), publisher, span);
    Ok(pipeline.handle(&event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging()?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let publisher = SnsPublisher {
        sns_client: aws_sdk_sns::Client::new(&aws_config),
    };
    let publisher = &publisher;

    lambda_runtime::run(service_fn(move |event| handle_request(publisher, event))).await
}
