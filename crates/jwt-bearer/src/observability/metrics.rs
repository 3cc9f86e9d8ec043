//! Metrics definitions for client assertion authentication.
//!
//! All metrics follow Prometheus naming conventions:
//! - `jwt_bearer_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `outcome`: 3 values (success, fail, error)
//! - `stage`: 7 values (entry, decode, claims, key, signature, identity, complete)

use crate::outcome::Stage;
use metrics::{counter, histogram};
use std::time::Duration;

/// Record the result of one `authenticate` call.
///
/// Metrics: `jwt_bearer_assertions_total`, `jwt_bearer_assertion_duration_seconds`
/// Labels: `outcome`, `stage` (counter only)
pub fn record_assertion_outcome(outcome: &'static str, stage: Stage, duration: Duration) {
    histogram!("jwt_bearer_assertion_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());

    counter!("jwt_bearer_assertions_total", "outcome" => outcome, "stage" => stage.as_str())
        .increment(1);
}
