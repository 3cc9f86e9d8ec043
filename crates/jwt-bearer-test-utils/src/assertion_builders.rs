//! Builder patterns for test client assertions
//!
//! Provides a fluent API for creating signed JWT-bearer client assertions.

use crate::crypto_fixtures::TestSigningKey;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey};
use serde_json::{json, Map, Value};

/// Default assertion issuer
pub const TEST_ISSUER: &str = "https://idp.example";

/// Default assertion subject
pub const TEST_SUBJECT: &str = "mailto:a@example.com";

/// Default assertion audience
pub const TEST_AUDIENCE: &str = "https://rp.example";

/// Builder for creating test client assertions
///
/// Defaults to a currently valid assertion from [`TEST_ISSUER`] about
/// [`TEST_SUBJECT`] for [`TEST_AUDIENCE`], expiring in one hour.
///
/// # Example
/// ```rust,ignore
/// let assertion = TestAssertionBuilder::new()
///     .subject("client-1")
///     .audience("https://other.example")
///     .expires_in(60)
///     .sign_ed25519(&key);
/// ```
pub struct TestAssertionBuilder {
    header: Map<String, Value>,
    claims: Map<String, Value>,
}

impl TestAssertionBuilder {
    /// Create a new assertion builder with defaults
    pub fn new() -> Self {
        let exp = (Utc::now() + Duration::seconds(3600)).timestamp();
        let claims = json!({
            "iss": TEST_ISSUER,
            "sub": TEST_SUBJECT,
            "aud": TEST_AUDIENCE,
            "exp": exp,
        });

        Self {
            header: Map::new(),
            claims: claims.as_object().cloned().unwrap_or_default(),
        }
    }

    /// Set the issuer
    pub fn issuer(self, issuer: &str) -> Self {
        self.claim("iss", issuer)
    }

    /// Set the subject
    pub fn subject(self, subject: &str) -> Self {
        self.claim("sub", subject)
    }

    /// Set a single audience
    pub fn audience(self, audience: &str) -> Self {
        self.claim("aud", audience)
    }

    /// Set an audience array
    pub fn audiences(self, audiences: &[&str]) -> Self {
        self.claim("aud", audiences.to_vec())
    }

    /// Set expiration in seconds from now (negative for the past)
    pub fn expires_in(self, seconds: i64) -> Self {
        let exp = Utc::now() + Duration::seconds(seconds);
        self.claim("exp", exp.timestamp())
    }

    /// Set not-before in seconds from now (negative for the past)
    pub fn not_before_in(self, seconds: i64) -> Self {
        let nbf = Utc::now() + Duration::seconds(seconds);
        self.claim("nbf", nbf.timestamp())
    }

    /// Set any claim
    pub fn claim(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.claims.insert(name.to_string(), value.into());
        self
    }

    /// Remove a claim
    pub fn without(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// Set the `kid` header
    pub fn kid(self, kid: &str) -> Self {
        self.header_member("kid", kid)
    }

    /// Set the `jku` header
    pub fn jku(self, jku: &str) -> Self {
        self.header_member("jku", jku)
    }

    /// Set any header member
    pub fn header_member(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.header.insert(name.to_string(), value.into());
        self
    }

    /// Claims as a JSON value
    pub fn claims(&self) -> Value {
        Value::Object(self.claims.clone())
    }

    /// Sign with an Ed25519 test key (EdDSA), setting `kid` unless already set
    pub fn sign_ed25519(self, key: &TestSigningKey) -> String {
        let builder = if self.header.contains_key("kid") {
            self
        } else {
            self.kid(key.kid())
        };
        builder.sign_with(Algorithm::EdDSA, &key.encoding_key())
    }

    /// Sign with a shared secret (HS256)
    pub fn sign_hs256(self, secret: &[u8]) -> String {
        self.sign_with(Algorithm::HS256, &EncodingKey::from_secret(secret))
    }

    /// Sign with an arbitrary algorithm and key
    pub fn sign_with(self, alg: Algorithm, key: &EncodingKey) -> String {
        let signing_input = self.signing_input(&format!("{alg:?}"));
        let signature = jsonwebtoken::crypto::sign(signing_input.as_bytes(), key, alg)
            .expect("Failed to sign test assertion");
        format!("{signing_input}.{signature}")
    }

    /// Unsecured assertion (`alg: none`, empty signature)
    ///
    /// Structurally valid, so it exercises every check before signature
    /// verification.
    pub fn unsigned(self) -> String {
        format!("{}.", self.signing_input("none"))
    }

    fn signing_input(mut self, alg: &str) -> String {
        self.header.insert("alg".to_string(), Value::from(alg));
        self.header
            .entry("typ")
            .or_insert_with(|| Value::from("JWT"));

        let header = serde_json::to_vec(&self.header).expect("Failed to serialize header");
        let claims = serde_json::to_vec(&self.claims).expect("Failed to serialize claims");
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }
}

impl Default for TestAssertionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
