//! Closure adapters for [`IdentityResolver`].
//!
//! | Adapter | Closure arguments |
//! |---|---|
//! | [`by_subject`] | `subject` |
//! | [`by_subject_and_header`] | `subject, header` |
//! | [`by_subject_header_and_payload`] | `subject, header, claims` |
//! | [`with_context`] | `context, subject` |
//! | [`with_context_and_header`] | `context, subject, header` |
//! | [`with_context_header_and_payload`] | `context, subject, header, claims` |
//!
//! The closure's future resolves to
//! `Result<Option<Authenticated<Identity, Info>>, ResolveError>`; the
//! identity and info types are taken from it.

use super::{Authenticated, IdentityResolver, ResolveError};
use crate::claims::ClaimSet;
use crate::jwt::JoseHeader;
use std::future::Future;

/// Adapter returned by [`by_subject`].
#[derive(Clone)]
pub struct BySubject<F>(F);

/// Adapter returned by [`by_subject_and_header`].
#[derive(Clone)]
pub struct BySubjectAndHeader<F>(F);

/// Adapter returned by [`by_subject_header_and_payload`].
#[derive(Clone)]
pub struct BySubjectHeaderAndPayload<F>(F);

/// Adapter returned by [`with_context`].
#[derive(Clone)]
pub struct WithContext<F>(F);

/// Adapter returned by [`with_context_and_header`].
#[derive(Clone)]
pub struct WithContextAndHeader<F>(F);

/// Adapter returned by [`with_context_header_and_payload`].
#[derive(Clone)]
pub struct WithContextHeaderAndPayload<F>(F);

/// Resolve identities from the subject alone.
pub fn by_subject<F, Fut, I, A>(f: F) -> BySubject<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Authenticated<I, A>>, ResolveError>> + Send,
{
    BySubject(f)
}

/// Resolve identities from the subject and the assertion header.
pub fn by_subject_and_header<F, Fut, I, A>(f: F) -> BySubjectAndHeader<F>
where
    F: Fn(String, JoseHeader) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Authenticated<I, A>>, ResolveError>> + Send,
{
    BySubjectAndHeader(f)
}

/// Resolve identities from the subject, header, and full claim set.
pub fn by_subject_header_and_payload<F, Fut, I, A>(f: F) -> BySubjectHeaderAndPayload<F>
where
    F: Fn(String, JoseHeader, ClaimSet) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Authenticated<I, A>>, ResolveError>> + Send,
{
    BySubjectHeaderAndPayload(f)
}

/// Resolve identities from the request context and the subject.
pub fn with_context<C, F, Fut, I, A>(f: F) -> WithContext<F>
where
    C: ?Sized + Sync,
    F: Fn(Option<&C>, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Authenticated<I, A>>, ResolveError>> + Send,
{
    WithContext(f)
}

/// Resolve identities from the request context, subject, and header.
pub fn with_context_and_header<C, F, Fut, I, A>(f: F) -> WithContextAndHeader<F>
where
    C: ?Sized + Sync,
    F: Fn(Option<&C>, String, JoseHeader) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Authenticated<I, A>>, ResolveError>> + Send,
{
    WithContextAndHeader(f)
}

/// Resolve identities from the request context, subject, header, and claims.
pub fn with_context_header_and_payload<C, F, Fut, I, A>(f: F) -> WithContextHeaderAndPayload<F>
where
    C: ?Sized + Sync,
    F: Fn(Option<&C>, String, JoseHeader, ClaimSet) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Authenticated<I, A>>, ResolveError>> + Send,
{
    WithContextHeaderAndPayload(f)
}

#[async_trait::async_trait]
impl<C, F, Fut, I, A> IdentityResolver<C> for BySubject<F>
where
    C: ?Sized + Sync,
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Authenticated<I, A>>, ResolveError>> + Send,
    I: Send,
    A: Send,
{
    type Identity = I;
    type Info = A;

    async fn resolve_identity(
        &self,
        _context: Option<&C>,
        subject: &str,
        _header: &JoseHeader,
        _claims: &ClaimSet,
    ) -> Result<Option<Authenticated<I, A>>, ResolveError> {
        (self.0)(subject.to_owned()).await
    }
}

#[async_trait::async_trait]
impl<C, F, Fut, I, A> IdentityResolver<C> for BySubjectAndHeader<F>
where
    C: ?Sized + Sync,
    F: Fn(String, JoseHeader) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Authenticated<I, A>>, ResolveError>> + Send,
    I: Send,
    A: Send,
{
    type Identity = I;
    type Info = A;

    async fn resolve_identity(
        &self,
        _context: Option<&C>,
        subject: &str,
        header: &JoseHeader,
        _claims: &ClaimSet,
    ) -> Result<Option<Authenticated<I, A>>, ResolveError> {
        (self.0)(subject.to_owned(), header.clone()).await
    }
}

#[async_trait::async_trait]
impl<C, F, Fut, I, A> IdentityResolver<C> for BySubjectHeaderAndPayload<F>
where
    C: ?Sized + Sync,
    F: Fn(String, JoseHeader, ClaimSet) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Authenticated<I, A>>, ResolveError>> + Send,
    I: Send,
    A: Send,
{
    type Identity = I;
    type Info = A;

    async fn resolve_identity(
        &self,
        _context: Option<&C>,
        subject: &str,
        header: &JoseHeader,
        claims: &ClaimSet,
    ) -> Result<Option<Authenticated<I, A>>, ResolveError> {
        (self.0)(subject.to_owned(), header.clone(), claims.clone())
            .await
    }
}

#[async_trait::async_trait]
impl<C, F, Fut, I, A> IdentityResolver<C> for WithContext<F>
where
    C: ?Sized + Sync,
    F: Fn(Option<&C>, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Authenticated<I, A>>, ResolveError>> + Send,
    I: Send,
    A: Send,
{
    type Identity = I;
    type Info = A;

    async fn resolve_identity(
        &self,
        context: Option<&C>,
        subject: &str,
        _header: &JoseHeader,
        _claims: &ClaimSet,
    ) -> Result<Option<Authenticated<I, A>>, ResolveError> {
        (self.0)(context, subject.to_owned()).await
    }
}

#[async_trait::async_trait]
impl<C, F, Fut, I, A> IdentityResolver<C> for WithContextAndHeader<F>
where
    C: ?Sized + Sync,
    F: Fn(Option<&C>, String, JoseHeader) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Authenticated<I, A>>, ResolveError>> + Send,
    I: Send,
    A: Send,
{
    type Identity = I;
    type Info = A;

    async fn resolve_identity(
        &self,
        context: Option<&C>,
        subject: &str,
        header: &JoseHeader,
        _claims: &ClaimSet,
    ) -> Result<Option<Authenticated<I, A>>, ResolveError> {
        (self.0)(context, subject.to_owned(), header.clone()).await
    }
}

#[async_trait::async_trait]
impl<C, F, Fut, I, A> IdentityResolver<C> for WithContextHeaderAndPayload<F>
where
    C: ?Sized + Sync,
    F: Fn(Option<&C>, String, JoseHeader, ClaimSet) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Authenticated<I, A>>, ResolveError>> + Send,
    I: Send,
    A: Send,
{
    type Identity = I;
    type Info = A;

    async fn resolve_identity(
        &self,
        context: Option<&C>,
        subject: &str,
        header: &JoseHeader,
        claims: &ClaimSet,
    ) -> Result<Option<Authenticated<I, A>>, ResolveError> {
        (self.0)(context, subject.to_owned(), header.clone(), claims.clone())
            .await
    }
}
