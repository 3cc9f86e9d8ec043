//! Key and identity resolvers.
//!
//! The authenticator owns no key material and no client registry. Both are
//! reached through two async capabilities supplied by the host application:
//!
//! - [`KeyResolver`] maps an issuer (plus the unverified header) to the key
//!   that must have signed the assertion
//! - [`IdentityResolver`] maps a verified subject to the host's client identity
//!
//! Each returns `Ok(None)` to decline (authentication fails without a status)
//! and `Err` for an infrastructure fault (surfaced as [`Outcome::Error`]).
//!
//! Hosts usually implement the traits on their own types. For closures, the
//! [`key_resolver`] and [`identity_resolver`] modules provide adapters for
//! each supported argument shape.
//!
//! [`Outcome::Error`]: crate::Outcome::Error

use crate::claims::ClaimSet;
use crate::jwt::JoseHeader;
use crate::keys::{KeyError, VerificationKey};
use std::sync::Arc;
use thiserror::Error;

pub mod identity_resolver;
pub mod key_resolver;

/// Boxed error accepted from resolvers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Infrastructure fault raised by a resolver.
///
/// Returned unchanged inside [`Outcome::Error`](crate::Outcome::Error); the
/// original cause is reachable through [`std::error::Error::source`].
#[derive(Error, Debug)]
#[error("Resolver failed")]
pub struct ResolveError {
    #[source]
    source: BoxError,
}

impl ResolveError {
    /// Wrap any error as a resolver fault.
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Borrow the underlying cause.
    #[must_use]
    pub fn get_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Consume the error, returning the underlying cause.
    #[must_use]
    pub fn into_inner(self) -> BoxError {
        self.source
    }
}

impl From<BoxError> for ResolveError {
    fn from(source: BoxError) -> Self {
        Self { source }
    }
}

impl From<KeyError> for ResolveError {
    fn from(err: KeyError) -> Self {
        Self::new(err)
    }
}

/// Identity produced by an [`IdentityResolver`], with optional extra info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated<I, A = ()> {
    /// Host-defined client identity.
    pub identity: I,

    /// Host-defined additional information passed through to the outcome.
    pub info: Option<A>,
}

impl<I> Authenticated<I> {
    /// Identity without additional info.
    pub fn new(identity: I) -> Self {
        Self {
            identity,
            info: None,
        }
    }
}

impl<I, A> Authenticated<I, A> {
    /// Identity with additional info.
    pub fn with_info(identity: I, info: A) -> Self {
        Self {
            identity,
            info: Some(info),
        }
    }
}

/// Resolves the verification key for an assertion issuer.
///
/// `context` is `Some` only when the authenticator was configured with
/// `pass_request_context`.
#[async_trait::async_trait]
pub trait KeyResolver<C: ?Sized + Sync = ()>: Send + Sync {
    /// Look up the key for `issuer`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` on an infrastructure fault (key store down,
    /// JWKS fetch failed). Return `Ok(None)` for an unknown issuer.
    async fn resolve_key(
        &self,
        context: Option<&C>,
        issuer: &str,
        header: &JoseHeader,
    ) -> Result<Option<VerificationKey>, ResolveError>;
}

/// Resolves the client identity for a verified assertion subject.
#[async_trait::async_trait]
pub trait IdentityResolver<C: ?Sized + Sync = ()>: Send + Sync {
    /// Host-defined client identity.
    type Identity: Send;

    /// Host-defined additional information.
    type Info: Send;

    /// Look up the client for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` on an infrastructure fault. Return `Ok(None)`
    /// for an unknown or disabled client.
    async fn resolve_identity(
        &self,
        context: Option<&C>,
        subject: &str,
        header: &JoseHeader,
        claims: &ClaimSet,
    ) -> Result<Option<Authenticated<Self::Identity, Self::Info>>, ResolveError>;
}

#[async_trait::async_trait]
impl<C, T> KeyResolver<C> for Arc<T>
where
    C: ?Sized + Sync,
    T: KeyResolver<C> + ?Sized,
{
    async fn resolve_key(
        &self,
        context: Option<&C>,
        issuer: &str,
        header: &JoseHeader,
    ) -> Result<Option<VerificationKey>, ResolveError> {
        (**self).resolve_key(context, issuer, header).await
    }
}

#[async_trait::async_trait]
impl<C, T> IdentityResolver<C> for Arc<T>
where
    C: ?Sized + Sync,
    T: IdentityResolver<C> + ?Sized,
{
    type Identity = T::Identity;
    type Info = T::Info;

    async fn resolve_identity(
        &self,
        context: Option<&C>,
        subject: &str,
        header: &JoseHeader,
        claims: &ClaimSet,
    ) -> Result<Option<Authenticated<Self::Identity, Self::Info>>, ResolveError> {
        (**self)
            .resolve_identity(context, subject, header, claims)
            .await
    }
}
