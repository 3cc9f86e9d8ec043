//! Observability for the authenticator.
//!
//! # Privacy by Default
//!
//! The pipeline is instrumented with `#[instrument(skip_all)]` and explicit
//! field allow-listing:
//! - **SAFE**: outcome kind, stage, claim check labels, sizes, timestamps
//! - **NEVER**: assertions, subjects, client IDs, key material
//!
//! Metrics labels are bounded enums; see [`metrics`].

pub mod metrics;
