//! Assertion decoding and JWT constants.
//!
//! This module parses a compact JWS client assertion into its header and
//! payload WITHOUT verifying the signature:
//! - Size limit for denial-of-service prevention
//! - Three-segment structure check
//! - base64url + JSON object decoding of header and payload
//!
//! # Security
//!
//! - Assertions are size-checked BEFORE any base64 work
//! - Nothing returned here is trusted until [`crate::keys::verify_signature`]
//!   passes; the header is only used to route the key lookup
//! - Error messages are generic; details are logged at debug level

use crate::claims::ClaimSet;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::{Map, Value};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Client assertion type registered for JWT-bearer client authentication (RFC 7523).
pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Default maximum client assertion size in bytes (8KB).
///
/// Typical client assertions are well under 1KB even with an RSA signature.
/// Oversized assertions are rejected before base64 decoding so they cannot
/// force large allocations.
pub const MAX_ASSERTION_SIZE_BYTES: usize = 8192;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while decoding an assertion.
///
/// Both variants map to a structural (HTTP 400) rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Assertion size exceeds the configured maximum.
    #[error("The client assertion is malformed")]
    TooLarge,

    /// Assertion is not a three-segment JWS with JSON object header and payload.
    #[error("The client assertion is malformed")]
    Malformed,
}

// =============================================================================
// Types
// =============================================================================

/// Unverified JOSE header of a client assertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoseHeader(Map<String, Value>);

impl JoseHeader {
    /// Wrap a decoded header object.
    #[must_use]
    pub fn new(members: Map<String, Value>) -> Self {
        Self(members)
    }

    /// Look up a header member by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Look up a header member that must be a non-empty string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Signing algorithm (`alg`).
    #[must_use]
    pub fn alg(&self) -> Option<&str> {
        self.get_str("alg")
    }

    /// Key ID (`kid`).
    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        self.get_str("kid")
    }

    /// JWK Set URL hint (`jku`).
    #[must_use]
    pub fn jku(&self) -> Option<&str> {
        self.get_str("jku")
    }

    /// Issuer replicated into the header (`iss`), used as a subject fallback.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.get_str("iss")
    }

    /// All header members.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Header and payload of an assertion whose signature has not been checked yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAssertion {
    /// Unverified JOSE header.
    pub header: JoseHeader,

    /// Unverified claim set.
    pub payload: ClaimSet,
}

// =============================================================================
// Functions
// =============================================================================

/// Decode a compact client assertion without verifying its signature.
///
/// # Arguments
///
/// * `assertion` - The compact JWS string from `client_assertion`
/// * `max_bytes` - Maximum accepted assertion length
///
/// # Errors
///
/// - `TooLarge` - Assertion exceeds `max_bytes`
/// - `Malformed` - Wrong segment count, bad base64url, or a header/payload
///   that is not a JSON object
pub fn decode_assertion(
    assertion: &str,
    max_bytes: usize,
) -> Result<DecodedAssertion, DecodeError> {
    if assertion.len() > max_bytes {
        tracing::debug!(
            target: "jwt_bearer.jwt",
            assertion_size = assertion.len(),
            max_size = max_bytes,
            "Assertion rejected: size exceeds maximum allowed"
        );
        return Err(DecodeError::TooLarge);
    }

    // JWS compact format: header.payload.signature
    let mut parts = assertion.split('.');
    let (Some(header_part), Some(payload_part), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        tracing::debug!(
            target: "jwt_bearer.jwt",
            parts = assertion.split('.').count(),
            "Assertion rejected: invalid JWS format"
        );
        return Err(DecodeError::Malformed);
    };

    let header = decode_segment(header_part, "header")?;
    let payload = decode_segment(payload_part, "payload")?;

    Ok(DecodedAssertion {
        header: JoseHeader::new(header),
        payload: ClaimSet::new(payload),
    })
}

fn decode_segment(segment: &str, name: &'static str) -> Result<Map<String, Value>, DecodeError> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        tracing::debug!(
            target: "jwt_bearer.jwt",
            segment = name,
            error = %e,
            "Failed to decode assertion base64"
        );
        DecodeError::Malformed
    })?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(members)) => Ok(members),
        Ok(_) => {
            tracing::debug!(
                target: "jwt_bearer.jwt",
                segment = name,
                "Assertion segment is not a JSON object"
            );
            Err(DecodeError::Malformed)
        }
        Err(e) => {
            tracing::debug!(
                target: "jwt_bearer.jwt",
                segment = name,
                error = %e,
                "Failed to parse assertion JSON"
            );
            Err(DecodeError::Malformed)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
