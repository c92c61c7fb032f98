//! Pure alert relay primitives.
//!
//! This crate owns the CloudWatch Logs envelope contract, field extraction,
//! alert rendering and the response envelope. It excludes AWS SDK and Lambda
//! runtime concerns, which live in `alert_relay_lambda`.

pub mod envelope;
pub mod extract;
pub mod format;
pub mod response;
