//! ES256 primitives (C1): keypair generation, signing, verification, SHA-256,
//! and base64url codec.
//!
//! The legacy C implementation drives OpenSSL's `EVP_DigestSign*` over a BIO
//! chain, which conflates hashing and signing behind one call. This module
//! keeps them separate operations so each can be exercised and swapped on
//! its own.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::rand_core::OsRng;
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use p256::{PublicKey, SecretKey};
use sha2::{Digest, Sha256};

use crate::error::{Result, ShakenError};

/// An ES256 keypair plus the raw 32-byte scalar form of the private key,
/// kept around for test plumbing and PEM-free code paths.
pub struct KeyPair {
    pub signing_key: SigningKey,
    pub verifying_key: VerifyingKey,
    pub raw32: [u8; 32],
}

impl KeyPair {
    /// Generate a fresh ES256 keypair on curve P-256.
    pub fn generate() -> Result<Self> {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = VerifyingKey::from(&signing_key);
        let raw32: [u8; 32] = signing_key
            .to_bytes()
            .as_slice()
            .try_into()
            .map_err(|_| ShakenError::CryptoError("scalar is not 32 bytes".into()))?;
        Ok(Self {
            signing_key,
            verifying_key,
            raw32,
        })
    }

    /// Load a keypair from a PKCS#8 PEM-encoded private key.
    pub fn from_private_pem(pem: &str) -> Result<Self> {
        let secret = SecretKey::from_pkcs8_pem(pem)
            .map_err(|e| ShakenError::CryptoError(format!("invalid private key PEM: {e}")))?;
        let signing_key = SigningKey::from(secret.clone());
        let verifying_key = VerifyingKey::from(&signing_key);
        let raw32: [u8; 32] = secret
            .to_bytes()
            .as_slice()
            .try_into()
            .map_err(|_| ShakenError::CryptoError("scalar is not 32 bytes".into()))?;
        Ok(Self {
            signing_key,
            verifying_key,
            raw32,
        })
    }

    /// Export the private key as a PKCS#8 PEM document.
    pub fn private_key_pem(&self) -> Result<String> {
        let secret = SecretKey::from(self.signing_key.clone());
        secret
            .to_pkcs8_pem(LineEnding::LF)
            .map(|z| z.to_string())
            .map_err(|e| ShakenError::CryptoError(format!("failed to encode private key: {e}")))
    }

    /// Export the public key as an SPKI PEM document.
    pub fn public_key_pem(&self) -> Result<String> {
        let public = PublicKey::from(self.verifying_key);
        public
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| ShakenError::CryptoError(format!("failed to encode public key: {e}")))
    }
}

/// Load a standalone public key from an SPKI PEM document.
pub fn verifying_key_from_pem(pem: &str) -> Result<VerifyingKey> {
    let public = PublicKey::from_public_key_pem(pem)
        .map_err(|e| ShakenError::CryptoError(format!("invalid public key PEM: {e}")))?;
    Ok(VerifyingKey::from(public))
}

/// SHA-256 over `msg_bytes`, ECDSA-sign the digest, and encode the result as
/// a fixed 64-byte big-endian `r || s` concatenation. Never emits DER — the
/// JWS format mandates raw `r || s` (RFC 7518 §3.4).
pub fn sign(signing_key: &SigningKey, msg_bytes: &[u8]) -> Result<[u8; 64]> {
    let signature: Signature = signing_key
        .try_sign(msg_bytes)
        .map_err(|e| ShakenError::CryptoError(format!("signing failed: {e}")))?;
    signature
        .to_bytes()
        .as_slice()
        .try_into()
        .map_err(|_| ShakenError::CryptoError("signature is not 64 bytes".into()))
}

/// Verify `sig` over `msg_bytes` under `verifying_key`. Accepts either the
/// 64-byte raw `r || s` form (preferred) or DER (tolerated for interop with
/// legacy signers) and returns whether it matches.
pub fn verify(verifying_key: &VerifyingKey, msg_bytes: &[u8], sig: &[u8]) -> bool {
    let signature = if sig.len() == 64 {
        Signature::from_slice(sig).ok()
    } else {
        Signature::from_der(sig).ok()
    };
    match signature {
        Some(signature) => verifying_key.verify(msg_bytes, &signature).is_ok(),
        None => false,
    }
}

/// SHA-256 digest of `bytes`.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// URL-safe, unpadded base64 (RFC 7515 §2).
pub fn b64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode URL-safe base64. Rejects non-alphabet bytes; does not require
/// padding but tolerates trailing `=` for legacy inputs.
pub fn b64url_decode(s: &str) -> Result<Vec<u8>> {
    let trimmed = s.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .map_err(|e| ShakenError::InvalidIdentityHeader(format!("invalid base64url: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let kp = KeyPair::generate().unwrap();
        let msg = b"header.payload";
        let sig = sign(&kp.signing_key, msg).unwrap();
        assert_eq!(sig.len(), 64);
        assert!(verify(&kp.verifying_key, msg, &sig));
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let kp = KeyPair::generate().unwrap();
        let sig = sign(&kp.signing_key, b"original").unwrap();
        assert!(!verify(&kp.verifying_key, b"tampered", &sig));
    }

    #[test]
    fn verify_accepts_der_signature() {
        let kp = KeyPair::generate().unwrap();
        let msg = b"der-form-message";
        let signature: Signature = kp.signing_key.try_sign(msg).unwrap();
        let der = signature.to_der();
        assert!(verify(&kp.verifying_key, msg, der.as_bytes()));
    }

    #[test]
    fn b64url_round_trips_arbitrary_bytes() {
        let data = b"\x00\x01\xff\xfe hello world \xfd";
        let encoded = b64url_encode(data);
        assert!(!encoded.contains('+') && !encoded.contains('/') && !encoded.contains('='));
        let decoded = b64url_decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn b64url_decode_tolerates_trailing_padding() {
        let decoded = b64url_decode("aGVsbG8=").unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn b64url_decode_rejects_invalid_alphabet() {
        assert!(b64url_decode("not valid base64!!").is_err());
    }

    #[test]
    fn private_key_pem_round_trips() {
        let kp = KeyPair::generate().unwrap();
        let pem = kp.private_key_pem().unwrap();
        let reloaded = KeyPair::from_private_pem(&pem).unwrap();
        assert_eq!(kp.raw32, reloaded.raw32);
    }
}
