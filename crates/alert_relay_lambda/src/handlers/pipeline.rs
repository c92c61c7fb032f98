use alert_relay_core::envelope::{decode_envelope, DecodeError};
use alert_relay_core::extract::{extract_alert, ExtractionError};
use alert_relay_core::format::{format_alert, Alert};
use alert_relay_core::response::{respond, AlertResponse};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn, Span};

use crate::adapters::publisher::NotificationPublisher;
use crate::config::RelayConfig;

pub const PROCESSED_MESSAGE: &str = "Error processed and email sent.";
pub const PROCESSING_FAILED_MESSAGE: &str = "Error processing the event.";
pub const CONTROL_ACKNOWLEDGED_MESSAGE: &str = "Control message acknowledged.";
pub const MISSING_TOPIC_MESSAGE: &str = "SNS topic ARN missing!";
pub const PUBLISH_FAILED_MESSAGE: &str = "Failed to send notification!";

const COMPONENT: &str = "alert_pipeline";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    Decoded,
    Extracted,
    Published,
    Responded,
    Failed,
}

impl PipelineStage {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Decoded => "decoded",
            Self::Extracted => "extracted",
            Self::Published => "published",
            Self::Responded => "responded",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishFailure {
    #[error("SNS_TOPIC_ARN is missing from the relay configuration")]
    MissingTopic,
    #[error("notification publish was rejected: {0}")]
    Rejected(String),
}

impl PublishFailure {
    pub fn degraded_response(&self) -> AlertResponse {
        match self {
            Self::MissingTopic => respond(500, MISSING_TOPIC_MESSAGE),
            Self::Rejected(_) => respond(500, PUBLISH_FAILED_MESSAGE),
        }
    }
}

#[derive(Debug, Error)]
enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Decode → extract → format → publish → respond, for one invocation.
///
/// Decode and extraction failures end in a generic 500. Publish failures are
/// inspected and, depending on [`RelayConfig::propagate_publish_failure`],
/// either surfaced or logged while the caller still gets a success response.
pub struct AlertPipeline<'a, P: ?Sized> {
    config: RelayConfig,
    publisher: &'a P,
    span: Span,
}

impl<'a, P> AlertPipeline<'a, P>
where
    P: NotificationPublisher + ?Sized,
{
    pub fn new(config: RelayConfig, publisher: &'a P, span: Span) -> Self {
        Self {
            config,
            publisher,
            span,
        }
    }

    pub fn handle(&self, event: &Value) -> AlertResponse {
        let _entered = self.span.enter();

        let batch = match decode_envelope(event) {
            Ok(value) => value,
            Err(error) => return processing_failed(PipelineStage::Start, error.into()),
        };
        info!(
            component = COMPONENT,
            event = "batch_decoded",
            stage = PipelineStage::Decoded.as_str(),
            log_group = batch.log_group.as_deref().unwrap_or(""),
            log_events = batch.log_events.as_ref().map_or(0, Vec::len),
        );

        if batch.is_control_message() {
            info!(component = COMPONENT, event = "control_message_acknowledged");
            return respond(200, CONTROL_ACKNOWLEDGED_MESSAGE);
        }

        let extracted = match extract_alert(&batch) {
            Ok(value) => value,
            Err(error) => return processing_failed(PipelineStage::Decoded, error.into()),
        };
        info!(
            component = COMPONENT,
            event = "alert_extracted",
            stage = PipelineStage::Extracted.as_str(),
            source_name = %extracted.source_name,
            log_stream = %extracted.log_stream,
        );

        let alert = format_alert(&extracted);
        if let Err(failure) = publish_alert(&alert, &self.config, self.publisher) {
            if self.config.propagate_publish_failure {
                return failure.degraded_response();
            }
            warn!(
                component = COMPONENT,
                event = "publish_failure_suppressed",
                error = %failure,
                "reporting success although the alert was not delivered"
            );
        }

        info!(
            component = COMPONENT,
            event = "invocation_completed",
            stage = PipelineStage::Responded.as_str(),
        );
        respond(200, PROCESSED_MESSAGE)
    }
}

/// Sends one alert to the configured topic. The collaborator is not called
/// when no topic is configured.
pub fn publish_alert<P>(
    alert: &Alert,
    config: &RelayConfig,
    publisher: &P,
) -> Result<(), PublishFailure>
where
    P: NotificationPublisher + ?Sized,
{
    let Some(topic_arn) = config.topic_arn.as_deref() else {
        error!(
            component = COMPONENT,
            event = "topic_missing",
            "SNS_TOPIC_ARN is missing from environment variables"
        );
        return Err(PublishFailure::MissingTopic);
    };

    if let Err(message) = publisher.publish(topic_arn, &alert.subject, &alert.body) {
        error!(
            component = COMPONENT,
            event = "publish_failed",
            topic_arn,
            error = %message,
        );
        return Err(PublishFailure::Rejected(message));
    }

    info!(
        component = COMPONENT,
        event = "alert_published",
        stage = PipelineStage::Published.as_str(),
        topic_arn,
        subject = %alert.subject,
    );
    Ok(())
}

fn processing_failed(stage: PipelineStage, error: PipelineError) -> AlertResponse {
    error!(
        component = COMPONENT,
        event = "invocation_failed",
        stage = PipelineStage::Failed.as_str(),
        last_stage = stage.as_str(),
        error = %error,
    );
    respond(500, PROCESSING_FAILED_MESSAGE)
}
