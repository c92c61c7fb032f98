use thiserror::Error;
use tracing::warn;

pub const TOPIC_ARN_VAR: &str = "SNS_TOPIC_ARN";
pub const PROPAGATE_PUBLISH_FAILURE_VAR: &str = "PROPAGATE_PUBLISH_FAILURE";

/// Per-invocation relay settings. A missing topic is not a load error; the
/// publish step reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayConfig {
    pub topic_arn: Option<String>,
    /// Return the publisher's degraded response instead of reporting success
    /// when the alert could not be sent.
    pub propagate_publish_failure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{variable} must be one of true/false, 1/0, yes/no; got {value:?}")]
    InvalidBool {
        variable: &'static str,
        value: String,
    },
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Invalid optional settings are logged and fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let topic_arn = lookup(TOPIC_ARN_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let propagate_publish_failure = match lookup(PROPAGATE_PUBLISH_FAILURE_VAR) {
            None => false,
            Some(value) => {
                parse_bool(PROPAGATE_PUBLISH_FAILURE_VAR, &value).unwrap_or_else(|error| {
                    warn!(
                        component = "relay_config",
                        event = "invalid_setting",
                        error = %error,
                        "falling back to default"
                    );
                    false
                })
            }
        };

        Self {
            topic_arn,
            propagate_publish_failure,
        }
    }
}

fn parse_bool(variable: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            variable,
            value: value.to_string(),
        }),
    }
}
