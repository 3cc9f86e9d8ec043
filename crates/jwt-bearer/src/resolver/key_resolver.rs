//! Closure adapters for [`KeyResolver`].
//!
//! Pick the adapter matching the arguments the closure needs:
//!
//! | Adapter | Closure arguments |
//! |---|---|
//! | [`by_issuer`] | `issuer` |
//! | [`by_issuer_and_header`] | `issuer, header` |
//! | [`with_context`] | `context, issuer` |
//! | [`with_context_and_header`] | `context, issuer, header` |
//!
//! Arguments are passed by value so the returned future can own them. The
//! context is borrowed only for the synchronous part of the call; clone what
//! the future needs out of it.

use super::{KeyResolver, ResolveError};
use crate::jwt::JoseHeader;
use crate::keys::VerificationKey;
use std::future::Future;

/// Adapter returned by [`by_issuer`].
#[derive(Clone)]
pub struct ByIssuer<F>(F);

/// Adapter returned by [`by_issuer_and_header`].
#[derive(Clone)]
pub struct ByIssuerAndHeader<F>(F);

/// Adapter returned by [`with_context`].
#[derive(Clone)]
pub struct WithContext<F>(F);

/// Adapter returned by [`with_context_and_header`].
#[derive(Clone)]
pub struct WithContextAndHeader<F>(F);

/// Resolve keys from the issuer alone.
pub fn by_issuer<F, Fut>(f: F) -> ByIssuer<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<VerificationKey>, ResolveError>> + Send,
{
    ByIssuer(f)
}

/// Resolve keys from the issuer and the unverified header (`kid`, `jku`).
pub fn by_issuer_and_header<F, Fut>(f: F) -> ByIssuerAndHeader<F>
where
    F: Fn(String, JoseHeader) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<VerificationKey>, ResolveError>> + Send,
{
    ByIssuerAndHeader(f)
}

/// Resolve keys from the request context and the issuer.
pub fn with_context<C, F, Fut>(f: F) -> WithContext<F>
where
    C: ?Sized + Sync,
    F: Fn(Option<&C>, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<VerificationKey>, ResolveError>> + Send,
{
    WithContext(f)
}

/// Resolve keys from the request context, the issuer, and the header.
pub fn with_context_and_header<C, F, Fut>(f: F) -> WithContextAndHeader<F>
where
    C: ?Sized + Sync,
    F: Fn(Option<&C>, String, JoseHeader) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<VerificationKey>, ResolveError>> + Send,
{
    WithContextAndHeader(f)
}

#[async_trait::async_trait]
impl<C, F, Fut> KeyResolver<C> for ByIssuer<F>
where
    C: ?Sized + Sync,
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<VerificationKey>, ResolveError>> + Send,
{
    async fn resolve_key(
        &self,
        _context: Option<&C>,
        issuer: &str,
        _header: &JoseHeader,
    ) -> Result<Option<VerificationKey>, ResolveError> {
        (self.0)(issuer.to_owned()).await
    }
}

#[async_trait::async_trait]
impl<C, F, Fut> KeyResolver<C> for ByIssuerAndHeader<F>
where
    C: ?Sized + Sync,
    F: Fn(String, JoseHeader) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<VerificationKey>, ResolveError>> + Send,
{
    async fn resolve_key(
        &self,
        _context: Option<&C>,
        issuer: &str,
        header: &JoseHeader,
    ) -> Result<Option<VerificationKey>, ResolveError> {
        (self.0)(issuer.to_owned(), header.clone()).await
    }
}

#[async_trait::async_trait]
impl<C, F, Fut> KeyResolver<C> for WithContext<F>
where
    C: ?Sized + Sync,
    F: Fn(Option<&C>, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<VerificationKey>, ResolveError>> + Send,
{
    async fn resolve_key(
        &self,
        context: Option<&C>,
        issuer: &str,
        _header: &JoseHeader,
    ) -> Result<Option<VerificationKey>, ResolveError> {
        (self.0)(context, issuer.to_owned()).await
    }
}

#[async_trait::async_trait]
impl<C, F, Fut> KeyResolver<C> for WithContextAndHeader<F>
where
    C: ?Sized + Sync,
    F: Fn(Option<&C>, String, JoseHeader) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<VerificationKey>, ResolveError>> + Send,
{
    async fn resolve_key(
        &self,
        context: Option<&C>,
        issuer: &str,
        header: &JoseHeader,
    ) -> Result<Option<VerificationKey>, ResolveError> {
        (self.0)(context, issuer.to_owned(), header.clone()).await
    }
}
