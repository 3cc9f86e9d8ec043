//! OAuth 2.0 JWT-bearer client assertion authentication.
//!
//! Validates the `client_assertion` presented with
//! `client_assertion_type=urn:ietf:params:oauth:client-assertion-type:jwt-bearer`
//! (RFC 7523 `private_key_jwt`). One call to [`Authenticator::authenticate`]
//! runs the whole pipeline:
//!
//! ```text
//! entry guard -> decode (unverified) -> claim policy -> key resolver
//!     -> signature check -> identity resolver -> Outcome
//! ```
//!
//! Key material and client identities are owned by the host application and
//! reached through the [`KeyResolver`] and [`IdentityResolver`] traits.
//!
//! # Security
//!
//! - Unverified header and payload contents are only used to route the key lookup
//! - Structural rejections (malformed assertion, missing mandatory claim) carry
//!   HTTP 400; every policy rejection carries no status so callers cannot tell
//!   a bad signature from a wrong audience
//! - Assertions are size-checked before any decoding
//!
//! # Usage
//!
//! ```rust,ignore
//! use jwt_bearer::{key_resolver, identity_resolver, Authenticated, AuthenticatorConfig, Authenticator};
//!
//! let config = AuthenticatorConfig::with_audience("https://rp.example");
//! let authenticator: Authenticator<_, _> = Authenticator::new(
//!     &config,
//!     key_resolver::by_issuer(|issuer| async move { keys.lookup(&issuer).await }),
//!     identity_resolver::by_subject(|subject| async move {
//!         Ok(clients.find(&subject).await?.map(Authenticated::new))
//!     }),
//! )?;
//!
//! match authenticator.authenticate(Some(&params), &()).await {
//!     Outcome::Success { identity, .. } => { /* authenticated client */ }
//!     Outcome::Fail(rejection) => { /* 401, or rejection.status() */ }
//!     Outcome::Error(cause) => { /* 5xx */ }
//! }
//! ```

#![warn(clippy::pedantic)]

/// Module for the authentication pipeline
pub mod authenticator;

/// Module for the claim set carried in an assertion payload
pub mod claims;

/// Module for construction-time configuration
pub mod config;

/// Module for assertion decoding and JWT constants
pub mod jwt;

/// Module for verification key material and signature checks
pub mod keys;

/// Module for metrics
pub mod observability;

/// Module for authentication outcomes
pub mod outcome;

/// Module for claim policy checks
pub mod policy;

/// Module for key and identity resolvers
pub mod resolver;

pub use authenticator::{AssertionParams, Authenticator};
pub use claims::{Audience, ClaimSet};
pub use config::{AuthenticatorConfig, ConfigError};
pub use jwt::{decode_assertion, DecodeError, DecodedAssertion, JoseHeader, CLIENT_ASSERTION_TYPE};
pub use keys::{verify_signature, KeyError, VerificationKey};
pub use outcome::{Outcome, Rejection, Stage};
pub use policy::{AssertionPolicy, CheckedClaims, ClaimError};
pub use resolver::{
    identity_resolver, key_resolver, Authenticated, BoxError, IdentityResolver, KeyResolver,
    ResolveError,
};
