//! Request authentication for the interaction endpoint.
//!
//! Every interaction is signed by the chat platform with Ed25519 over
//! `timestamp || raw_body`. The verifier here is deliberately narrow: it
//! answers yes or no, and every failure mode collapses to `false`.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use std::fmt;

use crate::error::CoreError;

/// Length of a hex-encoded Ed25519 signature header.
pub const SIGNATURE_HEX_LEN: usize = 128;

/// The application's public key, as registered with the chat platform.
pub const APPLICATION_PUBLIC_KEY: Ed25519PublicKey = Ed25519PublicKey([
    0x36, 0x79, 0x6b, 0x86, 0x9d, 0x4a, 0x48, 0xef, 0x7c, 0x75, 0x74, 0x4b, 0x00, 0x5e, 0xba, 0xc9,
    0xa2, 0x8b, 0x6f, 0xfe, 0xbf, 0x84, 0x2d, 0x91, 0xc3, 0x70, 0x66, 0x3c, 0xd1, 0x1e, 0x7c, 0x87,
]);

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CoreError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;

        let sig = Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

impl From<[u8; 32]> for Ed25519PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a signature header value.
    ///
    /// The value must be exactly [`SIGNATURE_HEX_LEN`] hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        if s.len() != SIGNATURE_HEX_LEN {
            return Err(CoreError::MalformedSignature(format!(
                "expected {SIGNATURE_HEX_LEN} hex characters, got {}",
                s.len()
            )));
        }
        let mut arr = [0u8; 64];
        hex::decode_to_slice(s, &mut arr)
            .map_err(|e| CoreError::MalformedSignature(e.to_string()))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({}...)", &self.to_hex()[..16])
    }
}

impl From<[u8; 64]> for Ed25519Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

/// Build the signed message: the raw timestamp header followed by the raw body.
pub fn signed_message(timestamp: &str, body: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);
    message
}

/// Verify a hex-encoded signature over `message`.
///
/// Wrong length, bad hex, an unusable key and a cryptographic mismatch all
/// return `false`. The primitive is not invoked unless the signature is
/// exactly [`SIGNATURE_HEX_LEN`] characters long.
pub fn verify_signature(public_key: &Ed25519PublicKey, signature_hex: &str, message: &[u8]) -> bool {
    let Ok(signature) = Ed25519Signature::from_hex(signature_hex) else {
        return false;
    };
    public_key.verify(message, &signature).is_ok()
}

/// A signing keypair.
///
/// The endpoint itself only verifies; this exists so tooling and tests can
/// produce requests that look like they came from the platform.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let sig = self.signing_key.sign(message);
        Ed25519Signature(sig.to_bytes())
    }

    /// Sign `timestamp || body` and return the hex header value.
    pub fn sign_request(&self, timestamp: &str, body: &[u8]) -> String {
        self.sign(&signed_message(timestamp, body)).to_hex()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_request() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let signature = keypair.sign_request("1700000000", b"{\"type\":1}");

        let message = signed_message("1700000000", b"{\"type\":1}");
        assert!(verify_signature(&keypair.public_key(), &signature, &message));

        // Tampered body should fail
        let tampered = signed_message("1700000000", b"{\"type\":2}");
        assert!(!verify_signature(&keypair.public_key(), &signature, &tampered));
    }

    #[test]
    fn test_signed_message_has_no_separator() {
        assert_eq!(signed_message("123", b"abc"), b"123abc".to_vec());
        assert_eq!(signed_message("", b""), Vec::<u8>::new());
    }

    #[test]
    fn test_wrong_length_signature_rejected() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let signature = keypair.sign_request("ts", b"body");
        let message = signed_message("ts", b"body");

        assert!(!verify_signature(&keypair.public_key(), &signature[..126], &message));
        assert!(!verify_signature(&keypair.public_key(), &format!("{signature}00"), &message));
        assert!(!verify_signature(&keypair.public_key(), "", &message));
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let message = signed_message("ts", b"body");
        let garbage = "zz".repeat(64);

        assert!(matches!(
            Ed25519Signature::from_hex(&garbage),
            Err(CoreError::MalformedSignature(_))
        ));
        assert!(!verify_signature(&keypair.public_key(), &garbage, &message));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let signer = Keypair::from_seed(&[0x01; 32]);
        let other = Keypair::from_seed(&[0x02; 32]);
        let signature = signer.sign_request("ts", b"body");

        assert!(!verify_signature(
            &other.public_key(),
            &signature,
            &signed_message("ts", b"body")
        ));
    }

    #[test]
    fn test_application_key_is_usable() {
        assert_eq!(
            APPLICATION_PUBLIC_KEY.to_hex(),
            "36796b869d4a48ef7c75744b005ebac9a28b6ffebf842d91c370663cd11e7c87"
        );
        assert!(VerifyingKey::from_bytes(APPLICATION_PUBLIC_KEY.as_bytes()).is_ok());
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = Keypair::generate().public_key();
        let recovered = Ed25519PublicKey::from_hex(&pk.to_hex()).unwrap();
        assert_eq!(pk, recovered);
        assert!(Ed25519PublicKey::from_hex("abcd").is_err());
    }
}
