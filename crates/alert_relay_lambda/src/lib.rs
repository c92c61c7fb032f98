//! AWS-oriented adapters and handlers for the Lambda error alert relay.
//!
//! This crate owns runtime integration details (configuration, the
//! notification publisher seam, and pipeline orchestration). Decoding and
//! formatting live in `alert_relay_core`; the SNS client is wired up in the
//! `alert_relay` binary.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod telemetry;
