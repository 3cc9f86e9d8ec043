//! Claim policy checks for client assertions.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. `iss` present and non-empty
//! 2. `sub` present and non-empty
//! 3. `aud` present
//! 4. `exp` present
//! 5. `aud` intersects the accepted audiences (unless skipped)
//! 6. `client_id` request parameter, when given, equals `sub`
//! 7. `exp` is in the future
//! 8. `nbf`, when present, is not in the future
//!
//! Checks 1-4 are structural: the assertion is malformed and the rejection
//! carries HTTP 400. Checks 5-8 are trust failures and the rejection carries
//! no status, so a caller cannot tell which one fired.

use crate::claims::ClaimSet;
use crate::config::{AuthenticatorConfig, ConfigError};
use std::time::Duration;
use thiserror::Error;

/// Maximum allowed clock skew tolerance (10 minutes).
///
/// This prevents misconfiguration that could weaken security by allowing
/// excessively large clock skew tolerance.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_mins(10);

/// Claim check failures.
///
/// Note: Display messages are intentionally generic. The variant is only
/// logged at debug level and never surfaced in a rejection.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimError {
    #[error("The client assertion is malformed")]
    MissingIssuer,

    #[error("The client assertion is malformed")]
    MissingSubject,

    #[error("The client assertion is malformed")]
    MissingAudience,

    #[error("The client assertion is malformed")]
    MissingExpiry,

    #[error("The client assertion is invalid")]
    AudienceMismatch,

    #[error("The client assertion is invalid")]
    SubjectMismatch,

    #[error("The client assertion is invalid")]
    Expired,

    #[error("The client assertion is invalid")]
    NotYetValid,
}

impl ClaimError {
    /// Whether this failure means the assertion is malformed (HTTP 400)
    /// rather than untrusted.
    #[must_use]
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            ClaimError::MissingIssuer
                | ClaimError::MissingSubject
                | ClaimError::MissingAudience
                | ClaimError::MissingExpiry
        )
    }

    /// Stable label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimError::MissingIssuer => "missing_issuer",
            ClaimError::MissingSubject => "missing_subject",
            ClaimError::MissingAudience => "missing_audience",
            ClaimError::MissingExpiry => "missing_expiry",
            ClaimError::AudienceMismatch => "audience_mismatch",
            ClaimError::SubjectMismatch => "subject_mismatch",
            ClaimError::Expired => "expired",
            ClaimError::NotYetValid => "not_yet_valid",
        }
    }
}

/// Claims that passed every policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedClaims<'a> {
    /// Assertion issuer, used to route the key lookup.
    pub issuer: &'a str,

    /// Assertion subject.
    pub subject: &'a str,
}

/// Immutable claim policy, built once from an [`AuthenticatorConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionPolicy {
    expected_audiences: Vec<String>,
    skip_audience_check: bool,
    clock_skew: Duration,
    max_assertion_bytes: usize,
}

impl AssertionPolicy {
    /// Build the policy, checking the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by
    /// [`AuthenticatorConfig::validate`].
    pub fn from_config(config: &AuthenticatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            expected_audiences: config
                .audiences
                .iter()
                .filter(|aud| !aud.is_empty())
                .cloned()
                .collect(),
            skip_audience_check: config.skip_audience_check,
            clock_skew: config.clock_skew,
            max_assertion_bytes: config.max_assertion_bytes,
        })
    }

    /// Accepted audiences.
    #[must_use]
    pub fn expected_audiences(&self) -> &[String] {
        &self.expected_audiences
    }

    /// Whether the audience check is disabled.
    #[must_use]
    pub fn skips_audience_check(&self) -> bool {
        self.skip_audience_check
    }

    /// Leeway applied to `exp` and `nbf`.
    #[must_use]
    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    /// Maximum accepted assertion size.
    #[must_use]
    pub fn max_assertion_bytes(&self) -> usize {
        self.max_assertion_bytes
    }

    /// Validate a claim set against the policy at the current time.
    ///
    /// # Arguments
    ///
    /// * `claims` - Unverified claim set from the assertion payload
    /// * `client_id` - `client_id` request parameter, if the client sent one
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ClaimError`] in check order.
    pub fn validate<'a>(
        &self,
        claims: &'a ClaimSet,
        client_id: Option<&str>,
    ) -> Result<CheckedClaims<'a>, ClaimError> {
        self.validate_at(claims, client_id, chrono::Utc::now().timestamp())
    }

    /// Deterministic validation against an explicit `now` timestamp.
    ///
    /// Prefer [`AssertionPolicy::validate`] in production code. This variant
    /// exists so that time boundaries can be tested without wall-clock
    /// dependence.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ClaimError`] in check order.
    pub fn validate_at<'a>(
        &self,
        claims: &'a ClaimSet,
        client_id: Option<&str>,
        now: i64,
    ) -> Result<CheckedClaims<'a>, ClaimError> {
        let issuer = claims.issuer().ok_or(ClaimError::MissingIssuer)?;
        let subject = claims.subject().ok_or(ClaimError::MissingSubject)?;
        let audience = claims.audience().ok_or(ClaimError::MissingAudience)?;
        let expires_at = claims.expires_at().ok_or(ClaimError::MissingExpiry)?;

        if !self.skip_audience_check && !audience.intersects(&self.expected_audiences) {
            return Err(ClaimError::AudienceMismatch);
        }

        if let Some(client_id) = client_id.filter(|id| !id.is_empty()) {
            if client_id != subject {
                return Err(ClaimError::SubjectMismatch);
            }
        }

        // Safe cast: clock_skew is bounded to MAX_CLOCK_SKEW (600 seconds)
        #[allow(clippy::cast_possible_wrap)]
        let skew = self.clock_skew.as_secs() as i64;

        if expires_at.saturating_add(skew) <= now {
            tracing::debug!(
                target: "jwt_bearer.policy",
                exp = expires_at,
                now = now,
                clock_skew_secs = skew,
                "Assertion rejected: expired"
            );
            return Err(ClaimError::Expired);
        }

        if claims.contains("nbf") {
            match claims.not_before() {
                Some(nbf) if nbf.saturating_sub(skew) <= now => {}
                not_before => {
                    tracing::debug!(
                        target: "jwt_bearer.policy",
                        nbf = ?not_before,
                        now = now,
                        clock_skew_secs = skew,
                        "Assertion rejected: not yet valid"
                    );
                    return Err(ClaimError::NotYetValid);
                }
            }
        }

        Ok(CheckedClaims { issuer, subject })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const NOW: i64 = 1_700_000_000;

    fn claims(value: Value) -> ClaimSet {
        serde_json::from_value(value).unwrap()
    }

    fn valid_claims() -> Value {
        json!({
            "iss": "https://idp.example",
            "sub": "mailto:a@example.com",
            "aud": "https://rp.example",
            "exp": NOW + 60
        })
    }

    fn with(mut base: Value, name: &str, value: Value) -> ClaimSet {
        base.as_object_mut()
            .unwrap()
            .insert(name.to_string(), value);
        claims(base)
    }

    fn without(mut base: Value, name: &str) -> ClaimSet {
        base.as_object_mut().unwrap().remove(name);
        claims(base)
    }

    fn policy() -> AssertionPolicy {
        AssertionPolicy::from_config(&AuthenticatorConfig::with_audience("https://rp.example"))
            .unwrap()
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    #[test]
    fn test_from_config_requires_audience() {
        let result = AssertionPolicy::from_config(&AuthenticatorConfig::default());
        assert_eq!(result, Err(ConfigError::MissingAudience));
    }

    #[test]
    fn test_from_config_skip_without_audience() {
        let policy =
            AssertionPolicy::from_config(&AuthenticatorConfig::skipping_audience_check()).unwrap();
        assert!(policy.skips_audience_check());
        assert!(policy.expected_audiences().is_empty());
    }

    #[test]
    fn test_from_config_rejects_excessive_clock_skew() {
        let config = AuthenticatorConfig::with_audience("https://rp.example")
            .clock_skew(MAX_CLOCK_SKEW + Duration::from_secs(1));
        assert!(matches!(
            AssertionPolicy::from_config(&config),
            Err(ConfigError::ClockSkewTooLarge(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Structural checks
    // -------------------------------------------------------------------------

    #[test]
    fn test_valid_claims_pass() {
        let claims = claims(valid_claims());
        let checked = policy().validate_at(&claims, None, NOW).unwrap();

        assert_eq!(checked.issuer, "https://idp.example");
        assert_eq!(checked.subject, "mailto:a@example.com");
    }

    #[test]
    fn test_missing_mandatory_claims() {
        let cases = [
            ("iss", ClaimError::MissingIssuer),
            ("sub", ClaimError::MissingSubject),
            ("aud", ClaimError::MissingAudience),
            ("exp", ClaimError::MissingExpiry),
        ];

        for (claim, expected) in cases {
            let claims = without(valid_claims(), claim);
            let err = policy().validate_at(&claims, None, NOW).unwrap_err();
            assert_eq!(err, expected, "missing {claim}");
            assert!(err.is_structural());
        }
    }

    #[test]
    fn test_empty_or_mistyped_mandatory_claims() {
        let cases = [
            ("iss", json!(""), ClaimError::MissingIssuer),
            ("sub", json!(null), ClaimError::MissingSubject),
            ("aud", json!(""), ClaimError::MissingAudience),
            ("exp", json!(0), ClaimError::MissingExpiry),
            ("exp", json!("soon"), ClaimError::MissingExpiry),
        ];

        for (claim, value, expected) in cases {
            let claims = with(valid_claims(), claim, value.clone());
            assert_eq!(
                policy().validate_at(&claims, None, NOW),
                Err(expected),
                "{claim}={value}"
            );
        }
    }

    #[test]
    fn test_structural_checks_run_before_policy_checks() {
        // Expired and wrong audience, but missing iss is reported first
        let claims = claims(json!({
            "sub": "client",
            "aud": "https://other.example",
            "exp": NOW - 10
        }));

        assert_eq!(
            policy().validate_at(&claims, Some("someone-else"), NOW),
            Err(ClaimError::MissingIssuer)
        );
    }

    // -------------------------------------------------------------------------
    // Audience
    // -------------------------------------------------------------------------

    #[test]
    fn test_audience_mismatch() {
        let claims = with(valid_claims(), "aud", json!("https://other.example"));
        let err = policy().validate_at(&claims, None, NOW).unwrap_err();

        assert_eq!(err, ClaimError::AudienceMismatch);
        assert!(!err.is_structural());
    }

    #[test]
    fn test_audience_array_intersection() {
        let claims = with(
            valid_claims(),
            "aud",
            json!(["https://other.example", "https://rp.example"]),
        );
        assert!(policy().validate_at(&claims, None, NOW).is_ok());

        let claims = with(valid_claims(), "aud", json!(["https://other.example"]));
        assert_eq!(
            policy().validate_at(&claims, None, NOW),
            Err(ClaimError::AudienceMismatch)
        );
    }

    #[test]
    fn test_any_configured_audience_matches() {
        let policy = AssertionPolicy::from_config(&AuthenticatorConfig::with_audiences([
            "https://rp.example",
            "https://rp.example/token",
        ]))
        .unwrap();

        let claims = with(valid_claims(), "aud", json!("https://rp.example/token"));
        assert!(policy.validate_at(&claims, None, NOW).is_ok());
    }

    #[test]
    fn test_skip_audience_check_ignores_audience_value() {
        let policy =
            AssertionPolicy::from_config(&AuthenticatorConfig::skipping_audience_check()).unwrap();
        let claims = with(valid_claims(), "aud", json!("https://anything.example"));

        assert!(policy.validate_at(&claims, None, NOW).is_ok());
    }

    #[test]
    fn test_skip_audience_check_still_requires_audience() {
        let policy =
            AssertionPolicy::from_config(&AuthenticatorConfig::skipping_audience_check()).unwrap();
        let claims = without(valid_claims(), "aud");

        assert_eq!(
            policy.validate_at(&claims, None, NOW),
            Err(ClaimError::MissingAudience)
        );
    }

    // -------------------------------------------------------------------------
    // client_id cross-check
    // -------------------------------------------------------------------------

    #[test]
    fn test_client_id_matching_subject() {
        let claims = claims(valid_claims());
        assert!(policy()
            .validate_at(&claims, Some("mailto:a@example.com"), NOW)
            .is_ok());
    }

    #[test]
    fn test_client_id_mismatch() {
        let claims = claims(valid_claims());
        assert_eq!(
            policy().validate_at(&claims, Some("mailto:b@example.com"), NOW),
            Err(ClaimError::SubjectMismatch)
        );
    }

    #[test]
    fn test_empty_client_id_is_ignored() {
        let claims = claims(valid_claims());
        assert!(policy().validate_at(&claims, Some(""), NOW).is_ok());
    }

    // -------------------------------------------------------------------------
    // exp / nbf
    // -------------------------------------------------------------------------

    #[test]
    fn test_exp_boundary() {
        // exp == now is expired, exp == now + 1 is accepted
        let claims = with(valid_claims(), "exp", json!(NOW));
        assert_eq!(
            policy().validate_at(&claims, None, NOW),
            Err(ClaimError::Expired)
        );

        let claims = with(valid_claims(), "exp", json!(NOW + 1));
        assert!(policy().validate_at(&claims, None, NOW).is_ok());
    }

    #[test]
    fn test_exp_in_past() {
        let claims = with(valid_claims(), "exp", json!(NOW - 3600));
        let err = policy().validate_at(&claims, None, NOW).unwrap_err();

        assert_eq!(err, ClaimError::Expired);
        assert!(!err.is_structural());
    }

    #[test]
    fn test_fractional_exp_is_expired_not_missing() {
        for exp in [json!(0.5), json!(-0.5)] {
            let claims = with(valid_claims(), "exp", exp.clone());
            let err = policy().validate_at(&claims, None, NOW).unwrap_err();

            assert_eq!(err, ClaimError::Expired, "exp={exp}");
            assert!(!err.is_structural());
        }
    }

    #[test]
    fn test_empty_audience_array_entries_are_missing() {
        for aud in [json!(""), json!([""])] {
            let claims = with(valid_claims(), "aud", aud.clone());
            let err = policy().validate_at(&claims, None, NOW).unwrap_err();

            assert_eq!(err, ClaimError::MissingAudience, "aud={aud}");
            assert!(err.is_structural());
        }
    }

    #[test]
    fn test_nbf_boundary() {
        // nbf == now is accepted, nbf == now + 1 is rejected
        let claims = with(valid_claims(), "nbf", json!(NOW));
        assert!(policy().validate_at(&claims, None, NOW).is_ok());

        let claims = with(valid_claims(), "nbf", json!(NOW + 1));
        assert_eq!(
            policy().validate_at(&claims, None, NOW),
            Err(ClaimError::NotYetValid)
        );
    }

    #[test]
    fn test_nbf_non_numeric_is_not_yet_valid() {
        let claims = with(valid_claims(), "nbf", json!("yesterday"));
        assert_eq!(
            policy().validate_at(&claims, None, NOW),
            Err(ClaimError::NotYetValid)
        );
    }

    #[test]
    fn test_nbf_null_is_absent() {
        let claims = with(valid_claims(), "nbf", json!(null));
        assert!(policy().validate_at(&claims, None, NOW).is_ok());
    }

    #[test]
    fn test_clock_skew_extends_exp_and_nbf() {
        let config = AuthenticatorConfig::with_audience("https://rp.example")
            .clock_skew(Duration::from_secs(30));
        let policy = AssertionPolicy::from_config(&config).unwrap();

        let claims = with(valid_claims(), "exp", json!(NOW - 29));
        assert!(policy.validate_at(&claims, None, NOW).is_ok());

        let claims = with(valid_claims(), "exp", json!(NOW - 30));
        assert_eq!(
            policy.validate_at(&claims, None, NOW),
            Err(ClaimError::Expired)
        );

        let claims = with(valid_claims(), "nbf", json!(NOW + 30));
        assert!(policy.validate_at(&claims, None, NOW).is_ok());

        let claims = with(valid_claims(), "nbf", json!(NOW + 31));
        assert_eq!(
            policy.validate_at(&claims, None, NOW),
            Err(ClaimError::NotYetValid)
        );
    }

    #[test]
    fn test_validate_uses_wall_clock() {
        let now = chrono::Utc::now().timestamp();
        let claims = with(valid_claims(), "exp", json!(now + 3600));
        assert!(policy().validate(&claims, None).is_ok());

        let claims = with(valid_claims(), "exp", json!(now - 3600));
        assert_eq!(policy().validate(&claims, None), Err(ClaimError::Expired));
    }

    #[test]
    fn test_claim_error_labels_are_unique() {
        let all = [
            ClaimError::MissingIssuer,
            ClaimError::MissingSubject,
            ClaimError::MissingAudience,
            ClaimError::MissingExpiry,
            ClaimError::AudienceMismatch,
            ClaimError::SubjectMismatch,
            ClaimError::Expired,
            ClaimError::NotYetValid,
        ];
        let labels: std::collections::HashSet<_> =
            all.iter().copied().map(ClaimError::as_str).collect();
        assert_eq!(labels.len(), all.len());
    }
}
