//! Mock resolvers for testing.
//!
//! Each mock counts its calls so tests can assert which pipeline stages ran.

use async_trait::async_trait;
use jwt_bearer::{
    Authenticated, ClaimSet, IdentityResolver, JoseHeader, KeyResolver, ResolveError,
    VerificationKey,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Infrastructure fault raised by the failing mocks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TestFault(pub &'static str);

/// Key resolver backed by a fixed issuer -> key map.
///
/// Unknown issuers are declined.
#[derive(Default)]
pub struct StaticKeyResolver {
    keys: HashMap<String, VerificationKey>,
    call_count: AtomicUsize,
}

impl StaticKeyResolver {
    /// Create a resolver with no keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the key for an issuer.
    pub fn with_key(mut self, issuer: &str, key: VerificationKey) -> Self {
        self.keys.insert(issuer.to_string(), key);
        self
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<C: ?Sized + Sync> KeyResolver<C> for StaticKeyResolver {
    async fn resolve_key(
        &self,
        _context: Option<&C>,
        issuer: &str,
        _header: &JoseHeader,
    ) -> Result<Option<VerificationKey>, ResolveError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.keys.get(issuer).cloned())
    }
}

/// Key resolver that always returns an error.
#[derive(Default)]
pub struct FailingKeyResolver {
    call_count: AtomicUsize,
}

impl FailingKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<C: ?Sized + Sync> KeyResolver<C> for FailingKeyResolver {
    async fn resolve_key(
        &self,
        _context: Option<&C>,
        _issuer: &str,
        _header: &JoseHeader,
    ) -> Result<Option<VerificationKey>, ResolveError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Err(ResolveError::new(TestFault("key store unavailable")))
    }
}

/// Identity resolver backed by a fixed subject -> identity map.
///
/// Unknown subjects are declined.
pub struct StaticIdentityResolver<I> {
    identities: HashMap<String, I>,
    call_count: AtomicUsize,
}

impl<I> StaticIdentityResolver<I> {
    /// Create a resolver with no identities.
    pub fn new() -> Self {
        Self {
            identities: HashMap::new(),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Register the identity for a subject.
    pub fn with_identity(mut self, subject: &str, identity: I) -> Self {
        self.identities.insert(subject.to_string(), identity);
        self
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl<I> Default for StaticIdentityResolver<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<C, I> IdentityResolver<C> for StaticIdentityResolver<I>
where
    C: ?Sized + Sync,
    I: Clone + Send + Sync,
{
    type Identity = I;
    type Info = ();

    async fn resolve_identity(
        &self,
        _context: Option<&C>,
        subject: &str,
        _header: &JoseHeader,
        _claims: &ClaimSet,
    ) -> Result<Option<Authenticated<I>>, ResolveError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let identity = self.identities.get(subject).cloned();
        Ok(identity.map(Authenticated::new))
    }
}

/// Identity resolver that always returns an error.
#[derive(Default)]
pub struct FailingIdentityResolver {
    call_count: AtomicUsize,
}

impl FailingIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<C: ?Sized + Sync> IdentityResolver<C> for FailingIdentityResolver {
    type Identity = String;
    type Info = ();

    async fn resolve_identity(
        &self,
        _context: Option<&C>,
        _subject: &str,
        _header: &JoseHeader,
        _claims: &ClaimSet,
    ) -> Result<Option<Authenticated<String>>, ResolveError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Err(ResolveError::new(TestFault("client registry unavailable")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_key_resolver_declines_unknown_issuer() {
        let resolver = StaticKeyResolver::new()
            .with_key("https://idp.example", VerificationKey::from_secret(b"secret"));
        let header = JoseHeader::default();

        let mut found = Vec::new();
        for issuer in ["https://idp.example", "https://evil.example"] {
            let key = KeyResolver::<()>::resolve_key(&resolver, None, issuer, &header)
                .await
                .unwrap();
            found.push(key.is_some());
        }

        assert_eq!(found, [true, false]);
        assert_eq!(resolver.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_identity_resolver_returns_fault() {
        let resolver = FailingIdentityResolver::new();
        let err = IdentityResolver::<()>::resolve_identity(
            &resolver,
            None,
            "client-1",
            &JoseHeader::default(),
            &ClaimSet::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.get_ref().downcast_ref::<TestFault>(),
            Some(&TestFault("client registry unavailable"))
        );
        assert_eq!(resolver.call_count(), 1);
    }
}
