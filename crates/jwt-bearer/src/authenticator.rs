//! Client assertion authentication pipeline.
//!
//! # Security
//!
//! - Claims are checked BEFORE the key lookup, so unauthenticated requests
//!   with stale or misdirected assertions never reach the key store
//! - The signature is verified BEFORE the identity lookup
//! - Rejections carry no reason; the failing stage is logged at debug level
//!   and recorded as a metric label

use crate::config::{AuthenticatorConfig, ConfigError};
use crate::jwt::{decode_assertion, DecodedAssertion, CLIENT_ASSERTION_TYPE};
use crate::keys::verify_signature;
use crate::observability::metrics;
use crate::outcome::{Outcome, Rejection, Stage};
use crate::policy::AssertionPolicy;
use crate::resolver::{Authenticated, IdentityResolver, KeyResolver};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::instrument;

/// Client authentication parameters from a token request body.
///
/// The assertion is held as a [`SecretString`] so it never appears in
/// `Debug` output.
#[derive(Debug, Default, Deserialize)]
pub struct AssertionParams {
    /// Must be `urn:ietf:params:oauth:client-assertion-type:jwt-bearer`.
    pub client_assertion_type: Option<String>,

    /// Compact JWS client assertion.
    pub client_assertion: Option<SecretString>,

    /// Optional client identifier, cross-checked against `sub`.
    pub client_id: Option<String>,
}

impl AssertionParams {
    /// Parameters with an explicit assertion type.
    pub fn new(
        client_assertion_type: impl Into<String>,
        client_assertion: impl Into<String>,
    ) -> Self {
        Self {
            client_assertion_type: Some(client_assertion_type.into()),
            client_assertion: Some(SecretString::from(client_assertion.into())),
            client_id: None,
        }
    }

    /// Parameters for a JWT-bearer client assertion.
    pub fn jwt_bearer(client_assertion: impl Into<String>) -> Self {
        Self::new(CLIENT_ASSERTION_TYPE, client_assertion)
    }

    /// Add a `client_id` hint.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}

/// JWT-bearer client assertion authenticator.
///
/// Holds the immutable claim policy and the two resolvers. `C` is the
/// request context type handed to resolvers when `pass_request_context` is
/// enabled.
pub struct Authenticator<K, I, C: ?Sized = ()> {
    policy: AssertionPolicy,
    pass_request_context: bool,
    key_resolver: K,
    identity_resolver: I,
    _context: PhantomData<fn(&C)>,
}

impl<K, I, C> Authenticator<K, I, C>
where
    C: ?Sized + Sync,
    K: KeyResolver<C>,
    I: IdentityResolver<C>,
{
    /// Create a new authenticator.
    ///
    /// # Arguments
    ///
    /// * `config` - Audience and policy configuration
    /// * `key_resolver` - Looks up the verification key for an issuer
    /// * `identity_resolver` - Looks up the client for a verified subject
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no audience is configured and the audience
    /// check is not skipped, or if a limit is out of range.
    pub fn new(
        config: &AuthenticatorConfig,
        key_resolver: K,
        identity_resolver: I,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            policy: AssertionPolicy::from_config(config)?,
            pass_request_context: config.pass_request_context,
            key_resolver,
            identity_resolver,
            _context: PhantomData,
        })
    }

    /// Claim policy in effect.
    #[must_use]
    pub fn policy(&self) -> &AssertionPolicy {
        &self.policy
    }

    /// Authenticate a client from its assertion parameters.
    ///
    /// # Pipeline
    ///
    /// 1. Entry guard - parameters present with the JWT-bearer assertion type
    /// 2. Decode header and payload (unverified)
    /// 3. Claim policy checks
    /// 4. Key resolver
    /// 5. Signature verification
    /// 6. Identity resolver
    ///
    /// Never panics and never returns early with an error: every failure is
    /// expressed as an [`Outcome`].
    #[instrument(skip_all)]
    pub async fn authenticate(
        &self,
        params: Option<&AssertionParams>,
        context: &C,
    ) -> Outcome<I::Identity, I::Info> {
        let start = Instant::now();
        let (outcome, stage) = self.run(params, context).await;

        match &outcome {
            Outcome::Success { .. } => {
                tracing::debug!(target: "jwt_bearer.authenticator", "Client assertion accepted");
            }
            Outcome::Fail(rejection) => {
                tracing::debug!(
                    target: "jwt_bearer.authenticator",
                    stage = stage.as_str(),
                    status = ?rejection.status(),
                    "Client assertion rejected"
                );
            }
            Outcome::Error(e) => {
                tracing::warn!(
                    target: "jwt_bearer.authenticator",
                    stage = stage.as_str(),
                    error = %e.get_ref(),
                    "Client assertion resolver failed"
                );
            }
        }

        metrics::record_assertion_outcome(outcome.kind(), stage, start.elapsed());
        outcome
    }

    async fn run(
        &self,
        params: Option<&AssertionParams>,
        context: &C,
    ) -> (Outcome<I::Identity, I::Info>, Stage) {
        let Some(assertion) = params.and_then(jwt_bearer_assertion) else {
            return (Outcome::Fail(Rejection::unspecified()), Stage::Entry);
        };

        let Ok(decoded) = decode_assertion(assertion, self.policy.max_assertion_bytes()) else {
            return (Outcome::Fail(Rejection::bad_request()), Stage::Decode);
        };

        let client_id = params.and_then(|p| p.client_id.as_deref());
        let checked = match self.policy.validate(&decoded.payload, client_id) {
            Ok(checked) => checked,
            Err(e) => {
                tracing::debug!(
                    target: "jwt_bearer.policy",
                    check = e.as_str(),
                    "Assertion claims rejected"
                );
                let rejection = if e.is_structural() {
                    Rejection::bad_request()
                } else {
                    Rejection::unspecified()
                };
                return (Outcome::Fail(rejection), Stage::Claims);
            }
        };

        let context = self.pass_request_context.then_some(context);

        let key = match self
            .key_resolver
            .resolve_key(context, checked.issuer, &decoded.header)
            .await
        {
            Ok(Some(key)) => key,
            Ok(None) => {
                tracing::debug!(target: "jwt_bearer.authenticator", "No key for assertion issuer");
                return (Outcome::Fail(Rejection::unspecified()), Stage::Key);
            }
            Err(e) => return (Outcome::Error(e), Stage::Key),
        };

        if !verify_signature(assertion, &key) {
            return (Outcome::Fail(Rejection::unspecified()), Stage::Signature);
        }

        let Some(subject) = identity_subject(&decoded) else {
            return (Outcome::Fail(Rejection::unspecified()), Stage::Identity);
        };

        match self
            .identity_resolver
            .resolve_identity(context, subject, &decoded.header, &decoded.payload)
            .await
        {
            Ok(Some(Authenticated { identity, info })) => {
                (Outcome::Success { identity, info }, Stage::Complete)
            }
            Ok(None) => {
                tracing::debug!(
                    target: "jwt_bearer.authenticator",
                    "Identity resolver declined subject"
                );
                (Outcome::Fail(Rejection::unspecified()), Stage::Identity)
            }
            Err(e) => (Outcome::Error(e), Stage::Identity),
        }
    }
}

/// Assertion string, if the parameters carry a non-empty JWT-bearer assertion.
fn jwt_bearer_assertion(params: &AssertionParams) -> Option<&str> {
    let assertion_type = params
        .client_assertion_type
        .as_deref()
        .filter(|t| !t.is_empty())?;
    let assertion = params
        .client_assertion
        .as_ref()
        .map(ExposeSecret::expose_secret)
        .filter(|a| !a.is_empty())?;

    if assertion_type != CLIENT_ASSERTION_TYPE {
        tracing::debug!(target: "jwt_bearer.authenticator", "Unsupported client assertion type");
        return None;
    }
    Some(assertion)
}

/// Subject presented to the identity resolver: `sub`, falling back to the
/// issuer replicated in the header.
fn identity_subject(decoded: &DecodedAssertion) -> Option<&str> {
    decoded
        .payload
        .subject()
        .or_else(|| decoded.header.issuer())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::claims::ClaimSet;
    use crate::jwt::JoseHeader;
    use crate::resolver::{identity_resolver, key_resolver};
    use serde_json::json;

    fn authenticator(
    ) -> Authenticator<impl KeyResolver, impl IdentityResolver<Identity = String, Info = ()>> {
        Authenticator::new(
            &AuthenticatorConfig::with_audience("https://rp.example"),
            key_resolver::by_issuer(|_issuer| async { Ok(None) }),
            identity_resolver::by_subject(|subject| async move {
                Ok(Some(Authenticated::new(subject)))
            }),
        )
        .unwrap()
    }

    fn assert_entry_rejection(outcome: &Outcome<String>) {
        let rejection = outcome.rejection().expect("expected Fail");
        assert_eq!(rejection.status(), None);
        assert_eq!(rejection.challenge(), None);
    }

    #[tokio::test]
    async fn test_missing_params_fail_without_status() {
        let outcome = authenticator().authenticate(None, &()).await;
        assert_entry_rejection(&outcome);
    }

    #[tokio::test]
    async fn test_empty_params_fail_without_status() {
        let params = AssertionParams::default();
        let outcome = authenticator().authenticate(Some(&params), &()).await;
        assert_entry_rejection(&outcome);
    }

    #[tokio::test]
    async fn test_wrong_assertion_type_fails_without_status() {
        let params = AssertionParams::new(
            "urn:ietf:params:oauth:client-assertion-type:saml2-bearer",
            "a.b.c",
        );
        let outcome = authenticator().authenticate(Some(&params), &()).await;
        assert_entry_rejection(&outcome);
    }

    #[tokio::test]
    async fn test_empty_assertion_fails_without_status() {
        let params = AssertionParams::jwt_bearer("");
        let outcome = authenticator().authenticate(Some(&params), &()).await;
        assert_entry_rejection(&outcome);
    }

    #[tokio::test]
    async fn test_garbage_assertion_is_bad_request() {
        let params = AssertionParams::jwt_bearer("not-a-jwt");
        let outcome = authenticator().authenticate(Some(&params), &()).await;

        assert_eq!(
            outcome.rejection().and_then(Rejection::status),
            Some(http::StatusCode::BAD_REQUEST)
        );
    }

    #[test]
    fn test_params_debug_redacts_assertion() {
        let params =
            AssertionParams::jwt_bearer("eyJhbGciOiJFZERTQSJ9.secret-payload.sig");
        let debug_str = format!("{params:?}");

        assert!(!debug_str.contains("secret-payload"));
        assert!(debug_str.contains(CLIENT_ASSERTION_TYPE));
    }

    #[test]
    fn test_params_deserialize_from_form_fields() {
        let params: AssertionParams = serde_json::from_value(json!({
            "client_assertion_type": CLIENT_ASSERTION_TYPE,
            "client_assertion": "a.b.c",
            "client_id": "client-1"
        }))
        .unwrap();

        assert_eq!(jwt_bearer_assertion(&params), Some("a.b.c"));
        assert_eq!(params.client_id.as_deref(), Some("client-1"));
    }

    #[test]
    fn test_identity_subject_prefers_sub() {
        let decoded = DecodedAssertion {
            header: JoseHeader::new(
                json!({ "iss": "header-issuer" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            ),
            payload: ClaimSet::new(json!({ "sub": "client-1" }).as_object().cloned().unwrap()),
        };
        assert_eq!(identity_subject(&decoded), Some("client-1"));
    }

    #[test]
    fn test_identity_subject_falls_back_to_header_issuer() {
        let decoded = DecodedAssertion {
            header: JoseHeader::new(
                json!({ "iss": "header-issuer" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            ),
            payload: ClaimSet::default(),
        };
        assert_eq!(identity_subject(&decoded), Some("header-issuer"));
    }
}
