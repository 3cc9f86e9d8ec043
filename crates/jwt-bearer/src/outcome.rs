//! Authentication outcomes.
//!
//! Every call to [`Authenticator::authenticate`](crate::Authenticator::authenticate)
//! yields exactly one [`Outcome`]:
//!
//! - `Success`: the assertion verified and the identity resolver returned a client
//! - `Fail`: the request was rejected; [`Rejection::status`] is `400` only for
//!   structurally malformed assertions
//! - `Error`: a resolver hit an infrastructure fault
//!
//! The core renders no responses. Hosts map `Fail` to 401 (or the carried
//! status) and `Error` to a 5xx.

use crate::resolver::ResolveError;
use http::StatusCode;

/// Details of a failed authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rejection {
    challenge: Option<String>,
    status: Option<StatusCode>,
}

impl Rejection {
    /// Rejection carrying no status.
    ///
    /// Used for every trust failure so that callers cannot distinguish an
    /// expired assertion from a bad signature or an unknown client.
    #[must_use]
    pub fn unspecified() -> Self {
        Self::default()
    }

    /// Rejection for a malformed assertion (HTTP 400).
    #[must_use]
    pub fn bad_request() -> Self {
        Self {
            challenge: None,
            status: Some(StatusCode::BAD_REQUEST),
        }
    }

    /// Attach a challenge for the host to send in `WWW-Authenticate`.
    ///
    /// The pipeline never sets one; hosts that answer with a challenge add it
    /// before rendering the response.
    #[must_use]
    pub fn with_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.challenge = Some(challenge.into());
        self
    }

    /// HTTP status the host should use, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Challenge for a `WWW-Authenticate` header, if any.
    #[must_use]
    pub fn challenge(&self) -> Option<&str> {
        self.challenge.as_deref()
    }
}

/// Result of one authentication attempt.
#[derive(Debug)]
pub enum Outcome<I, A = ()> {
    /// Client authenticated.
    Success {
        /// Identity returned by the identity resolver.
        identity: I,
        /// Additional info returned by the identity resolver.
        info: Option<A>,
    },

    /// Client not authenticated.
    Fail(Rejection),

    /// Resolver fault; the request could not be evaluated.
    Error(ResolveError),
}

impl<I, A> Outcome<I, A> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    #[must_use]
    pub fn is_fail(&self) -> bool {
        matches!(self, Outcome::Fail(_))
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    /// Rejection details, if this is a `Fail`.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Fail(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// Bounded label for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Success { .. } => "success",
            Outcome::Fail(_) => "fail",
            Outcome::Error(_) => "error",
        }
    }
}

/// Pipeline stage at which an attempt terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Request parameters missing or of the wrong assertion type.
    Entry,
    /// Assertion decoding.
    Decode,
    /// Claim policy checks.
    Claims,
    /// Key resolution.
    Key,
    /// Signature verification.
    Signature,
    /// Identity resolution (declined or faulted).
    Identity,
    /// Every stage passed.
    Complete,
}

impl Stage {
    /// Bounded label for logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Entry => "entry",
            Stage::Decode => "decode",
            Stage::Claims => "claims",
            Stage::Key => "key",
            Stage::Signature => "signature",
            Stage::Identity => "identity",
            Stage::Complete => "complete",
        }
    }
}
