//! # JWT-bearer Test Utilities
//!
//! Shared test utilities for the `jwt-bearer` crate.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (fixed Ed25519 keys and HMAC secrets)
//! - Signed client assertion builders (`TestAssertionBuilder`)
//! - Mock key and identity resolvers with call counters
//! - Custom assertions on authentication outcomes (`OutcomeAssertions`)
//! - Test tracing setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jwt_bearer_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let key = test_signing_key(1)?;
//!     let assertion = TestAssertionBuilder::new().sign_ed25519(&key);
//!
//!     let keys = StaticKeyResolver::new().with_key(TEST_ISSUER, key.verification_key());
//!     let clients = StaticIdentityResolver::new().with_identity(TEST_SUBJECT, "client-1");
//!
//!     authenticator.authenticate(Some(&params), &()).await
//!         .assert_success_with(&"client-1");
//! }
//! ```

pub mod assertion_builders;
pub mod assertions;
pub mod crypto_fixtures;
pub mod resolvers;
pub mod tracing_setup;

// Re-export commonly used items
pub use assertion_builders::*;
pub use assertions::*;
pub use crypto_fixtures::*;
pub use resolvers::*;
pub use tracing_setup::*;
