use thiserror::Error;

use crate::envelope::LogBatch;

pub const ERROR_MESSAGE_SEPARATOR: &str = "\t";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedAlert {
    pub log_group: String,
    pub log_stream: String,
    /// Last `/` segment of the log group, i.e. the function name for
    /// `/aws/lambda/<name>` groups.
    pub source_name: String,
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("log batch has no logEvents sequence")]
    MissingLogEvents,
}

pub fn extract_alert(batch: &LogBatch) -> Result<ExtractedAlert, ExtractionError> {
    let log_events = batch
        .log_events
        .as_ref()
        .ok_or(ExtractionError::MissingLogEvents)?;

    let log_group = batch.log_group.clone().unwrap_or_default();
    let log_stream = batch.log_stream.clone().unwrap_or_default();
    let source_name = source_name(&log_group).to_string();
    let error_message = log_events
        .iter()
        .map(|record| record.message.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(ERROR_MESSAGE_SEPARATOR);

    Ok(ExtractedAlert {
        log_group,
        log_stream,
        source_name,
        error_message,
    })
}

pub fn source_name(log_group: &str) -> &str {
    log_group.rsplit('/').next().unwrap_or("")
}
