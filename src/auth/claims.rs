//! Local decoding of the token's embedded expiry claim
//!
//! The session token is a JWT whose payload carries a unix `exp` timestamp.
//! The claim is decoded without verifying the cryptographic signature: the
//! server is the authority on signature validity, the client only avoids
//! sending obviously stale tokens. This is a cache-freshness check, not a
//! security boundary.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use crate::errors::{AuthError, AuthResult};

/// The subset of JWT claims the client inspects
#[derive(Debug, Deserialize)]
struct ClaimSet {
    /// Expiry as a unix timestamp in seconds
    exp: i64,
}

/// Decodes the `exp` claim from a compact JWT without signature verification
///
/// # Errors
///
/// Returns `AuthError::MalformedToken` if the token is not a three-segment
/// JWT, the payload is not valid base64url, or the claim set lacks `exp`.
pub fn decode_expiry(token: &str) -> AuthResult<i64> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(AuthError::MalformedToken {
            reason: "expected three dot-separated segments".to_string(),
        });
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AuthError::MalformedToken {
            reason: format!("payload is not base64url: {e}"),
        })?;

    let claims: ClaimSet =
        serde_json::from_slice(&bytes).map_err(|e| AuthError::MalformedToken {
            reason: format!("claim set is not valid JSON: {e}"),
        })?;

    Ok(claims.exp)
}

/// Builds an unsigned JWT with the given expiry, mirroring what the server
/// issues (header and signature content are irrelevant to the client).
#[cfg(test)]
pub(crate) fn make_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"ES256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
    format!("{header}.{payload}.sig")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_expiry_roundtrip() {
        let token = make_token(1_900_000_000);
        assert_eq!(decode_expiry(&token).unwrap(), 1_900_000_000);
    }

    #[test]
    fn test_decode_rejects_non_jwt() {
        let result = decode_expiry("not-a-jwt");
        assert!(matches!(
            result.unwrap_err(),
            AuthError::MalformedToken { .. }
        ));
    }

    #[test]
    fn test_decode_rejects_two_segment_token() {
        // A decodable payload is not enough; the compact form has three parts
        let payload = URL_SAFE_NO_PAD.encode(br#"{"exp":1900000000}"#);
        let token = format!("header.{payload}");
        assert!(matches!(
            decode_expiry(&token).unwrap_err(),
            AuthError::MalformedToken { .. }
        ));
    }

    #[test]
    fn test_decode_rejects_bad_payload() {
        let result = decode_expiry("aGVhZGVy.!!!.sig");
        assert!(matches!(
            result.unwrap_err(),
            AuthError::MalformedToken { .. }
        ));
    }

    #[test]
    fn test_decode_rejects_missing_exp() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"user-1"}"#);
        let token = format!("h.{payload}.s");
        assert!(decode_expiry(&token).is_err());
    }
}
