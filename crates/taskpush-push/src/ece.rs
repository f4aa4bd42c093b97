//! Encrypted content-encoding for Web Push (RFC 8188 `aes128gcm`, keyed per RFC 8291).
//!
//! A reminder is far smaller than one record, so every message is a single
//! record terminated by the `0x02` delimiter.

use ring::{
    aead, agreement, hkdf,
    rand::{SecureRandom, SystemRandom},
};

use crate::error::{DispatchError, Result};

pub const RECORD_SIZE: u32 = 4096;
const SALT_LEN: usize = 16;
const AUTH_SECRET_LEN: usize = 16;
const PUBLIC_KEY_LEN: usize = 65;
const TAG_LEN: usize = 16;
const LAST_RECORD_DELIMITER: u8 = 0x02;
/// salt || rs || idlen || keyid
pub const HEADER_LEN: usize = SALT_LEN + 4 + 1 + PUBLIC_KEY_LEN;
/// Largest plaintext that still fits in one record.
pub const MAX_PLAINTEXT_LEN: usize = RECORD_SIZE as usize - TAG_LEN - 1;

struct OkmLen(usize);

impl hkdf::KeyType for OkmLen {
    fn len(&self) -> usize {
        self.0
    }
}

fn expand<const N: usize>(prk: &hkdf::Prk, info: &[&[u8]]) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    prk.expand(info, OkmLen(N))
        .and_then(|okm| okm.fill(&mut out))
        .map_err(|_| DispatchError::Encryption("HKDF expand failed".to_string()))?;
    Ok(out)
}

/// Combine the ECDH secret with the client's auth secret into the 32-byte IKM.
fn derive_ikm(ecdh_secret: &[u8], auth_secret: &[u8], ua_public: &[u8], as_public: &[u8]) -> Result<[u8; 32]> {
    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, auth_secret).extract(ecdh_secret);
    expand::<32>(&prk, &[b"WebPush: info\0".as_slice(), ua_public, as_public])
}

/// Content-encryption key and nonce for the (only) record.
fn derive_content_keys(ikm: &[u8], salt: &[u8]) -> Result<([u8; 16], [u8; 12])> {
    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, salt).extract(ikm);
    let cek = expand::<16>(&prk, &[b"Content-Encoding: aes128gcm\0".as_slice()])?;
    let nonce = expand::<12>(&prk, &[b"Content-Encoding: nonce\0".as_slice()])?;
    Ok((cek, nonce))
}

/// Encrypt `plaintext` for the user agent identified by `ua_public` / `auth_secret`.
///
/// Returns the full request body: header followed by the sealed record.
pub fn encrypt(plaintext: &[u8], ua_public: &[u8], auth_secret: &[u8]) -> Result<Vec<u8>> {
    if ua_public.len() != PUBLIC_KEY_LEN || ua_public[0] != 0x04 {
        return Err(DispatchError::InvalidSubscription(format!(
            "p256dh must be an uncompressed P-256 point ({} bytes given)",
            ua_public.len()
        )));
    }
    if auth_secret.len() != AUTH_SECRET_LEN {
        return Err(DispatchError::InvalidSubscription(format!(
            "auth secret must be {AUTH_SECRET_LEN} bytes ({} given)",
            auth_secret.len()
        )));
    }
    if plaintext.len() > MAX_PLAINTEXT_LEN {
        return Err(DispatchError::Encryption(format!(
            "payload of {} bytes exceeds {MAX_PLAINTEXT_LEN}",
            plaintext.len()
        )));
    }

    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| DispatchError::Encryption("salt generation failed".to_string()))?;

    let as_private = agreement::EphemeralPrivateKey::generate(&agreement::ECDH_P256, &rng)
        .map_err(|_| DispatchError::Encryption("ephemeral key generation failed".to_string()))?;
    let as_public = as_private
        .compute_public_key()
        .map_err(|_| DispatchError::Encryption("ephemeral public key failed".to_string()))?;

    let peer = agreement::UnparsedPublicKey::new(&agreement::ECDH_P256, ua_public);
    let ikm = agreement::agree_ephemeral(as_private, &peer, |shared| {
        derive_ikm(shared, auth_secret, ua_public, as_public.as_ref())
    })
    .map_err(|_| DispatchError::InvalidSubscription("p256dh is not a valid P-256 point".to_string()))??;

    let (cek, nonce) = derive_content_keys(&ikm, &salt)?;
    let key = aead::UnboundKey::new(&aead::AES_128_GCM, &cek)
        .map(aead::LessSafeKey::new)
        .map_err(|_| DispatchError::Encryption("invalid content key".to_string()))?;

    let mut record = Vec::with_capacity(plaintext.len() + 1 + TAG_LEN);
    record.extend_from_slice(plaintext);
    record.push(LAST_RECORD_DELIMITER);
    key.seal_in_place_append_tag(
        aead::Nonce::assume_unique_for_key(nonce),
        aead::Aad::empty(),
        &mut record,
    )
    .map_err(|_| DispatchError::Encryption("AES-GCM seal failed".to_string()))?;

    let mut body = Vec::with_capacity(HEADER_LEN + record.len());
    body.extend_from_slice(&salt);
    body.extend_from_slice(&RECORD_SIZE.to_be_bytes());
    body.push(PUBLIC_KEY_LEN as u8);
    body.extend_from_slice(as_public.as_ref());
    body.extend_from_slice(&record);
    Ok(body)
}
