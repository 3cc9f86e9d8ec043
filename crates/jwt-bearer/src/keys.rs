//! Verification key material and the signature check.
//!
//! A [`VerificationKey`] pairs a `jsonwebtoken` decoding key with the family
//! of algorithms it may verify. The family is fixed when the key is built, so
//! an assertion whose header names an algorithm from another family (for
//! example HS256 against an RSA public key) can never verify.
//!
//! # Security
//!
//! - The `alg` header is only trusted to pick an algorithm inside the key's family
//! - `none` is never accepted
//! - Every lower-level failure is reported as "invalid signature"

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk};
use jsonwebtoken::{Algorithm, DecodingKey};
use std::fmt;
use thiserror::Error;

/// Errors building a [`VerificationKey`].
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid key material: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

impl KeyFamily {
    fn algorithms(self) -> &'static [Algorithm] {
        match self {
            KeyFamily::Hmac => &[Algorithm::HS256, Algorithm::HS384, Algorithm::HS512],
            KeyFamily::Rsa => &[
                Algorithm::RS256,
                Algorithm::RS384,
                Algorithm::RS512,
                Algorithm::PS256,
                Algorithm::PS384,
                Algorithm::PS512,
            ],
            KeyFamily::Ec => &[Algorithm::ES256, Algorithm::ES384],
            KeyFamily::Ed => &[Algorithm::EdDSA],
        }
    }
}

/// Key material returned by a [`KeyResolver`](crate::KeyResolver).
#[derive(Clone)]
pub struct VerificationKey {
    key: DecodingKey,
    family: KeyFamily,
}

/// Debug output never includes key bytes.
impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("algorithms", &self.algorithms())
            .finish_non_exhaustive()
    }
}

impl VerificationKey {
    /// RSA public key in PEM format.
    ///
    /// Accepts `PUBLIC KEY`, `RSA PUBLIC KEY`, and X.509 `CERTIFICATE`
    /// blocks. For a certificate, the subject public key is used and the
    /// certificate itself is not validated.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Invalid` if the PEM cannot be parsed.
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, KeyError> {
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|e| KeyError::Invalid(e.to_string()))?;
        Ok(Self::new(key, KeyFamily::Rsa))
    }

    /// RSA public key from base64url modulus and exponent (JWK `n`/`e`).
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Invalid` if the components are not valid base64url.
    pub fn from_rsa_components(modulus: &str, exponent: &str) -> Result<Self, KeyError> {
        let key = DecodingKey::from_rsa_components(modulus, exponent)
            .map_err(|e| KeyError::Invalid(e.to_string()))?;
        Ok(Self::new(key, KeyFamily::Rsa))
    }

    /// EC (P-256/P-384) public key in PEM format.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Invalid` if the PEM cannot be parsed.
    pub fn from_ec_pem(pem: &[u8]) -> Result<Self, KeyError> {
        let key = DecodingKey::from_ec_pem(pem)
            .map_err(|e| KeyError::Invalid(e.to_string()))?;
        Ok(Self::new(key, KeyFamily::Ec))
    }

    /// Ed25519 public key in SPKI PEM format.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Invalid` if the PEM cannot be parsed.
    pub fn from_ed_pem(pem: &[u8]) -> Result<Self, KeyError> {
        let key = DecodingKey::from_ed_pem(pem)
            .map_err(|e| KeyError::Invalid(e.to_string()))?;
        Ok(Self::new(key, KeyFamily::Ed))
    }

    /// Raw 32-byte Ed25519 public key.
    #[must_use]
    pub fn from_ed_der(public_key: &[u8]) -> Self {
        Self::new(DecodingKey::from_ed_der(public_key), KeyFamily::Ed)
    }

    /// Shared secret for HMAC-signed assertions (`client_secret_jwt`).
    #[must_use]
    pub fn from_secret(secret: &[u8]) -> Self {
        Self::new(DecodingKey::from_secret(secret), KeyFamily::Hmac)
    }

    /// Public key from a JSON Web Key.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Invalid` if the JWK parameters cannot be decoded.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, KeyError> {
        let family = match &jwk.algorithm {
            AlgorithmParameters::RSA(_) => KeyFamily::Rsa,
            AlgorithmParameters::EllipticCurve(_) => KeyFamily::Ec,
            AlgorithmParameters::OctetKeyPair(_) => KeyFamily::Ed,
            AlgorithmParameters::OctetKey(_) => KeyFamily::Hmac,
        };
        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| KeyError::Invalid(e.to_string()))?;
        Ok(Self::new(key, family))
    }

    fn new(key: DecodingKey, family: KeyFamily) -> Self {
        Self { key, family }
    }

    /// Algorithms this key may verify.
    #[must_use]
    pub fn algorithms(&self) -> &'static [Algorithm] {
        self.family.algorithms()
    }

    /// Whether this key may verify signatures made with `alg`.
    #[must_use]
    pub fn supports(&self, alg: Algorithm) -> bool {
        self.algorithms().contains(&alg)
    }
}

/// Verify the signature of a compact JWS assertion.
///
/// Only the signature is checked; claims are validated separately by
/// [`AssertionPolicy`](crate::AssertionPolicy). Never fails: any decoding or
/// cryptographic error is reported as `false`.
#[must_use]
pub fn verify_signature(assertion: &str, key: &VerificationKey) -> bool {
    let header = match jsonwebtoken::decode_header(assertion) {
        Ok(header) => header,
        Err(e) => {
            tracing::debug!(
                target: "jwt_bearer.keys",
                error = %e,
                "Unsupported or invalid JWS header"
            );
            return false;
        }
    };

    if !key.supports(header.alg) {
        tracing::debug!(
            target: "jwt_bearer.keys",
            alg = ?header.alg,
            "Assertion algorithm does not match key type"
        );
        return false;
    }

    let Some((message, signature)) = assertion.rsplit_once('.') else {
        return false;
    };

    match jsonwebtoken::crypto::verify(signature, message.as_bytes(), &key.key, header.alg) {
        Ok(valid) => {
            if !valid {
                tracing::debug!(target: "jwt_bearer.keys", "Assertion signature mismatch");
            }
            valid
        }
        Err(e) => {
            tracing::debug!(
                target: "jwt_bearer.keys",
                error = %e,
                "Assertion signature verification failed"
            );
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"client-shared-secret-with-enough-length";

    const CLIENT_CERT_PEM: &[u8] = include_bytes!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/client-cert.pem"
    ));

    const CLIENT_KEY_PEM: &[u8] = include_bytes!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/client-key.pem"
    ));

    fn hs256_assertion(secret: &[u8]) -> String {
        let claims = json!({
            "iss": "client",
            "sub": "client",
            "aud": "rp",
            "exp": 7_702_588_800_i64
        });
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_hmac_signature() {
        let assertion = hs256_assertion(SECRET);
        assert!(verify_signature(
            &assertion,
            &VerificationKey::from_secret(SECRET)
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let assertion = hs256_assertion(SECRET);
        assert!(!verify_signature(
            &assertion,
            &VerificationKey::from_secret(b"some-other-secret")
        ));
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let assertion = hs256_assertion(SECRET);
        let (header, rest) = assertion.split_once('.').unwrap();
        let (_, signature) = rest.split_once('.').unwrap();
        let tampered_payload = URL_SAFE_NO_PAD.encode(r#"{"iss":"client","sub":"admin"}"#);
        let tampered = format!("{header}.{tampered_payload}.{signature}");

        assert!(!verify_signature(
            &tampered,
            &VerificationKey::from_secret(SECRET)
        ));
    }

    #[test]
    fn test_verify_rejects_algorithm_family_mismatch() {
        // HS256 assertion presented against an Ed25519 key must not verify,
        // even if the raw key bytes were used as the HMAC secret
        let public_key = [7u8; 32];
        let assertion = hs256_assertion(&public_key);

        assert!(!verify_signature(
            &assertion,
            &VerificationKey::from_ed_der(&public_key)
        ));
    }

    #[test]
    fn test_verify_rejects_alg_none() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
        let payload = URL_SAFE_NO_PAD.encode(r#"{"iss":"client"}"#);
        let assertion = format!("{header}.{payload}.");

        assert!(!verify_signature(
            &assertion,
            &VerificationKey::from_secret(SECRET)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let key = VerificationKey::from_secret(SECRET);
        assert!(!verify_signature("", &key));
        assert!(!verify_signature("not-a-jwt", &key));
        assert!(!verify_signature("a.b.c", &key));
    }

    #[test]
    fn test_verify_rs256_with_certificate_pem() {
        let assertion = encode(
            &Header::new(Algorithm::RS256),
            &json!({ "iss": "client", "sub": "client" }),
            &EncodingKey::from_rsa_pem(CLIENT_KEY_PEM).unwrap(),
        )
        .unwrap();

        let key = VerificationKey::from_rsa_pem(CLIENT_CERT_PEM).unwrap();
        assert!(key.supports(Algorithm::RS256));
        assert!(verify_signature(&assertion, &key));

        let hs256 = hs256_assertion(CLIENT_CERT_PEM);
        assert!(!verify_signature(&hs256, &key));
    }

    #[test]
    fn test_key_families() {
        let hmac = VerificationKey::from_secret(SECRET);
        assert!(hmac.supports(Algorithm::HS256));
        assert!(!hmac.supports(Algorithm::RS256));

        let ed = VerificationKey::from_ed_der(&[0u8; 32]);
        assert_eq!(ed.algorithms(), &[Algorithm::EdDSA]);
    }

    #[test]
    fn test_invalid_pem_is_rejected() {
        assert!(matches!(
            VerificationKey::from_rsa_pem(b"not a pem"),
            Err(KeyError::Invalid(_))
        ));
        assert!(VerificationKey::from_ec_pem(b"not a pem").is_err());
        assert!(VerificationKey::from_ed_pem(b"not a pem").is_err());
    }

    #[test]
    fn test_from_jwk_octet_key_pair() {
        let jwk: Jwk = serde_json::from_value(json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"
        }))
        .unwrap();

        let key = VerificationKey::from_jwk(&jwk).unwrap();
        assert!(key.supports(Algorithm::EdDSA));
    }

    #[test]
    fn test_from_jwk_rsa() {
        let jwk: Jwk = serde_json::from_value(json!({
            "kty": "RSA",
            "n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
            "e": "AQAB"
        }))
        .unwrap();

        let key = VerificationKey::from_jwk(&jwk).unwrap();
        assert!(key.supports(Algorithm::RS256));
        assert!(key.supports(Algorithm::PS512));
        assert!(!key.supports(Algorithm::ES256));
    }

    #[test]
    fn test_debug_does_not_expose_key_bytes() {
        let key = VerificationKey::from_secret(b"super-secret-value");
        let debug_str = format!("{key:?}");

        assert!(!debug_str.contains("super-secret-value"));
        assert!(debug_str.contains("HS256"));
    }
}
