//! Deterministic cryptographic fixtures for testing
//!
//! Provides reproducible Ed25519 keypairs and HMAC secrets.
//! All fixtures are deterministic based on seed values.

use base64::engine::general_purpose;
use base64::Engine;
use jsonwebtoken::EncodingKey;
use jwt_bearer::VerificationKey;
use ring::signature::{Ed25519KeyPair, KeyPair};
use serde_json::{json, Value};
use thiserror::Error;

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

/// DER prefix of an Ed25519 SubjectPublicKeyInfo (RFC 8410).
const ED25519_SPKI_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// Deterministic Ed25519 keypair for signing test assertions.
#[derive(Clone)]
pub struct TestSigningKey {
    kid: String,
    pkcs8: Vec<u8>,
    public_key: Vec<u8>,
}

/// Generate a deterministic Ed25519 signing key for testing.
///
/// The same seed always produces the same keypair, ensuring test reproducibility.
///
/// # Arguments
/// * `seed` - Seed value for deterministic key generation (0-255)
///
/// # Example
/// ```rust,ignore
/// let key = test_signing_key(1)?;
/// let key2 = test_signing_key(1)?;
/// assert_eq!(key.public_key(), key2.public_key());
/// ```
pub fn test_signing_key(seed: u8) -> Result<TestSigningKey, FixtureError> {
    let seed_bytes = seed_bytes(seed);

    // Deterministic and suitable for testing only
    let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed_bytes)
        .map_err(|e| FixtureError::Crypto(format!("Failed to generate test keypair: {:?}", e)))?;

    Ok(TestSigningKey {
        kid: format!("test-key-{seed:02}"),
        pkcs8: build_pkcs8_from_seed(&seed_bytes),
        public_key: key_pair.public_key().as_ref().to_vec(),
    })
}

impl TestSigningKey {
    /// Key ID used in the `kid` header of assertions signed with this key.
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Raw 32-byte public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Public key as an SPKI PEM document.
    pub fn public_key_pem(&self) -> String {
        let mut spki = ED25519_SPKI_PREFIX.to_vec();
        spki.extend_from_slice(&self.public_key);
        format!(
            "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----\n",
            general_purpose::STANDARD.encode(spki)
        )
    }

    /// Public key as an OKP JSON Web Key.
    pub fn public_key_jwk(&self) -> Value {
        json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "kid": self.kid,
            "x": general_purpose::URL_SAFE_NO_PAD.encode(&self.public_key),
        })
    }

    /// Key material a resolver would return for this signer.
    pub fn verification_key(&self) -> VerificationKey {
        VerificationKey::from_ed_der(&self.public_key)
    }

    /// `jsonwebtoken` signing key.
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_ed_der(&self.pkcs8)
    }
}

/// Deterministic 32-byte HMAC secret for `client_secret_jwt` tests.
pub fn test_hmac_secret(seed: u8) -> Vec<u8> {
    seed_bytes(seed).to_vec()
}

fn seed_bytes(seed: u8) -> [u8; 32] {
    let mut seed_bytes = [0u8; 32];
    seed_bytes[0] = seed;
    // Fill rest with deterministic pattern
    for (i, byte) in seed_bytes.iter_mut().enumerate().skip(1) {
        *byte = seed.wrapping_mul(i as u8).wrapping_add(i as u8);
    }
    seed_bytes
}

/// Build PKCS#8 v1 document from Ed25519 seed
///
/// This is a test-only utility. Production keys come from the host's key store.
fn build_pkcs8_from_seed(seed: &[u8; 32]) -> Vec<u8> {
    // SEQUENCE { version INTEGER (0), AlgorithmIdentifier, OCTET STRING { OCTET STRING seed } }
    let mut pkcs8 = vec![0x30, 0x2e, 0x02, 0x01, 0x00];

    // AlgorithmIdentifier with OID 1.3.101.112 (Ed25519)
    pkcs8.extend_from_slice(&[0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70]);

    // Private key
    pkcs8.extend_from_slice(&[0x04, 0x22, 0x04, 0x20]);
    pkcs8.extend_from_slice(seed);

    pkcs8
}
