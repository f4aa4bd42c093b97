//! VAPID application-server identification (RFC 8292).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use reqwest::Url;
use ring::{
    rand::SystemRandom,
    signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING},
};

use crate::error::{DispatchError, Result};

/// JWTs are valid for 12 hours; push services reject anything over 24.
pub const TOKEN_LIFETIME_SECS: i64 = 12 * 60 * 60;

/// Decode base64url with or without trailing `=` padding, as browsers and
/// key generators disagree on it.
pub fn decode_base64url(value: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(value.trim().trim_end_matches('='))
}

/// Signs ES256 VAPID tokens with the server's P-256 key pair.
pub struct VapidSigner {
    key_pair: EcdsaKeyPair,
    public_key: String,
    subject: String,
    rng: SystemRandom,
}

impl VapidSigner {
    /// Build from the raw key format produced by `web-push generate-vapid-keys`:
    /// a 65-byte uncompressed public point and a 32-byte private scalar, both
    /// base64url.
    pub fn from_base64(public_key: &str, private_key: &str, subject: impl Into<String>) -> Result<Self> {
        let public = decode_base64url(public_key)
            .map_err(|e| DispatchError::Vapid(format!("public key is not base64url: {e}")))?;
        let private = decode_base64url(private_key)
            .map_err(|e| DispatchError::Vapid(format!("private key is not base64url: {e}")))?;

        let rng = SystemRandom::new();
        let key_pair = EcdsaKeyPair::from_private_key_and_public_key(
            &ECDSA_P256_SHA256_FIXED_SIGNING,
            &private,
            &public,
            &rng,
        )
        .map_err(|e| DispatchError::Vapid(format!("key pair rejected: {e}")))?;
        Ok(Self::with_key_pair(key_pair, subject.into(), rng))
    }

    /// Build from a PKCS#8 document (e.g. `openssl genpkey` output in DER).
    pub fn from_pkcs8(pkcs8: &[u8], subject: impl Into<String>) -> Result<Self> {
        let rng = SystemRandom::new();
        let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
            .map_err(|e| DispatchError::Vapid(format!("invalid PKCS#8 key: {e}")))?;
        Ok(Self::with_key_pair(key_pair, subject.into(), rng))
    }

    fn with_key_pair(key_pair: EcdsaKeyPair, subject: String, rng: SystemRandom) -> Self {
        let public_key = URL_SAFE_NO_PAD.encode(key_pair.public_key().as_ref());
        Self {
            key_pair,
            public_key,
            subject,
            rng,
        }
    }

    /// base64url public key: what the browser passes as `applicationServerKey`.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// `Authorization` header value for a push to `endpoint`.
    pub fn authorization(&self, endpoint: &Url, now: i64) -> Result<String> {
        let audience = endpoint.origin().ascii_serialization();
        let jwt = self.sign_jwt(&audience, now + TOKEN_LIFETIME_SECS)?;
        Ok(format!("vapid t={jwt}, k={}", self.public_key))
    }

    fn sign_jwt(&self, audience: &str, expires_at: i64) -> Result<String> {
        let header = serde_json::json!({
            "typ": "JWT",
            "alg": "ES256"
        });
        let claims = serde_json::json!({
            "aud": audience,
            "exp": expires_at,
            "sub": self.subject
        });

        let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string().as_bytes());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        let message = format!("{header_b64}.{claims_b64}");

        // FIXED signing yields raw r || s, which is what JWS ES256 expects.
        let sig = self
            .key_pair
            .sign(&self.rng, message.as_bytes())
            .map_err(|e| DispatchError::Vapid(format!("ES256 signing failed: {e}")))?;

        Ok(format!("{message}.{}", URL_SAFE_NO_PAD.encode(sig.as_ref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_FIXED};

    fn signer() -> VapidSigner {
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &SystemRandom::new()).unwrap();
        VapidSigner::from_pkcs8(pkcs8.as_ref(), "mailto:ops@example.com").unwrap()
    }

    #[test]
    fn header_carries_verifiable_token() {
        let signer = signer();
        let endpoint = Url::parse("https://fcm.googleapis.com/fcm/send/abc:def").unwrap();
        let header = signer.authorization(&endpoint, 1_700_000_000).unwrap();

        let rest = header.strip_prefix("vapid t=").unwrap();
        let (jwt, key) = rest.split_once(", k=").unwrap();
        assert_eq!(key, signer.public_key());

        let parts: Vec<&str> = jwt.split('.').collect();
        assert_eq!(parts.len(), 3);

        let claims: serde_json::Value =
            serde_json::from_slice(&decode_base64url(parts[1]).unwrap()).unwrap();
        assert_eq!(claims["aud"], "https://fcm.googleapis.com");
        assert_eq!(claims["exp"], 1_700_000_000 + TOKEN_LIFETIME_SECS);
        assert_eq!(claims["sub"], "mailto:ops@example.com");

        let public = decode_base64url(key).unwrap();
        assert_eq!(public.len(), 65);
        let signature = decode_base64url(parts[2]).unwrap();
        assert_eq!(signature.len(), 64);
        UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, public)
            .verify(format!("{}.{}", parts[0], parts[1]).as_bytes(), &signature)
            .expect("signature must verify");
    }

    #[test]
    fn audience_keeps_non_default_port() {
        let signer = signer();
        let endpoint = Url::parse("http://127.0.0.1:4567/push/1").unwrap();
        let header = signer.authorization(&endpoint, 0).unwrap();
        let jwt = header.strip_prefix("vapid t=").unwrap().split(", k=").next().unwrap();
        let claims: serde_json::Value = serde_json::from_slice(
            &decode_base64url(jwt.split('.').nth(1).unwrap()).unwrap(),
        )
        .unwrap();
        assert_eq!(claims["aud"], "http://127.0.0.1:4567");
    }

    #[test]
    fn padded_and_unpadded_base64_both_decode() {
        assert_eq!(decode_base64url("AQI").unwrap(), vec![1, 2]);
        assert_eq!(decode_base64url("AQI=").unwrap(), vec![1, 2]);
    }

    #[test]
    fn garbage_keys_rejected() {
        assert!(matches!(
            VapidSigner::from_base64("!!", "AAAA", "mailto:x"),
            Err(DispatchError::Vapid(_))
        ));
        assert!(matches!(
            VapidSigner::from_base64("AAAA", "AAAA", "mailto:x"),
            Err(DispatchError::Vapid(_))
        ));
    }
}
