//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions on authentication outcomes.

use http::StatusCode;
use jwt_bearer::Outcome;
use std::fmt::Debug;

/// Custom assertions for authentication outcomes
///
/// # Example
/// ```rust,ignore
/// outcome.assert_fail_without_status();
/// outcome.assert_success_with(&"client-1");
/// outcome.assert_error_caused_by::<TestFault>();
/// ```
pub trait OutcomeAssertions {
    /// Assert that authentication succeeded
    fn assert_success(&self) -> &Self;

    /// Assert that authentication failed with no status
    fn assert_fail_without_status(&self) -> &Self;

    /// Assert that authentication failed with HTTP 400
    fn assert_bad_request(&self) -> &Self;

    /// Assert that authentication ended in a resolver error
    fn assert_error(&self) -> &Self;

    /// Assert that the resolver error wraps an `E`
    fn assert_error_caused_by<E: std::error::Error + 'static>(&self) -> &Self;
}

impl<I: Debug, A: Debug> OutcomeAssertions for Outcome<I, A> {
    fn assert_success(&self) -> &Self {
        assert!(self.is_success(), "Expected Success, got {:?}", self);
        self
    }

    fn assert_fail_without_status(&self) -> &Self {
        let rejection = self
            .rejection()
            .unwrap_or_else(|| panic!("Expected Fail, got {:?}", self));
        assert_eq!(
            rejection.status(),
            None,
            "Policy rejections must not carry a status"
        );
        assert_eq!(rejection.challenge(), None);
        self
    }

    fn assert_bad_request(&self) -> &Self {
        let rejection = self
            .rejection()
            .unwrap_or_else(|| panic!("Expected Fail, got {:?}", self));
        assert_eq!(rejection.status(), Some(StatusCode::BAD_REQUEST));
        self
    }

    fn assert_error(&self) -> &Self {
        assert!(self.is_error(), "Expected Error, got {:?}", self);
        self
    }

    fn assert_error_caused_by<E: std::error::Error + 'static>(&self) -> &Self {
        match self {
            Outcome::Error(e) => assert!(
                e.get_ref().is::<E>(),
                "Resolver error has unexpected cause: {:?}",
                e.get_ref()
            ),
            other => panic!("Expected Error, got {:?}", other),
        }
        self
    }
}

/// Assertions that need an identity to compare against
pub trait SuccessAssertions<I> {
    /// Assert that authentication succeeded with `expected` as the identity
    fn assert_success_with(&self, expected: &I) -> &Self;
}

impl<I: Debug + PartialEq, A: Debug> SuccessAssertions<I> for Outcome<I, A> {
    fn assert_success_with(&self, expected: &I) -> &Self {
        match self {
            Outcome::Success { identity, .. } => assert_eq!(identity, expected),
            other => panic!("Expected Success, got {:?}", other),
        }
        self
    }
}
