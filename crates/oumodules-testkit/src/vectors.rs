//! Golden signature vectors.
//!
//! Fixed (key, message, signature) triples produced by an independent Ed25519
//! implementation. The verifier must accept the valid ones and reject the rest.

use oumodules_core::{verify_signature, Ed25519PublicKey};

/// A golden signature vector.
#[derive(Debug, Clone)]
pub struct SignatureVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Public key (hex).
    pub public_key: &'static str,
    /// Signed message.
    pub message: &'static [u8],
    /// Signature header value.
    pub signature: &'static str,
    /// Whether verification should succeed.
    pub valid: bool,
}

const VECTOR_KEY: &str = "168544f25101a8d47ce15cae78a6b65526f5456fb57cdd2279c4167b22af3fb1";

const VECTOR_SIGNATURE: &str = concat!(
    "3759625910b41f02e219d72aa171a714",
    "f455d50c56fdec84bb725e305de9b285",
    "174ccd27d5af53c8af5308db5ea44fe1",
    "5985f1b451d2ae797f2959335c49d805",
);

/// Get all golden vectors.
pub fn all_vectors() -> Vec<SignatureVector> {
    vec![
        SignatureVector {
            name: "valid signature",
            public_key: VECTOR_KEY,
            message: b"some_message",
            signature: VECTOR_SIGNATURE,
            valid: true,
        },
        SignatureVector {
            name: "different message",
            public_key: VECTOR_KEY,
            message: b"your_message",
            signature: VECTOR_SIGNATURE,
            valid: false,
        },
        SignatureVector {
            name: "first digit changed",
            public_key: VECTOR_KEY,
            message: b"some_message",
            signature: concat!(
                "0759625910b41f02e219d72aa171a714",
                "f455d50c56fdec84bb725e305de9b285",
                "174ccd27d5af53c8af5308db5ea44fe1",
                "5985f1b451d2ae797f2959335c49d805",
            ),
            valid: false,
        },
        SignatureVector {
            name: "truncated signature",
            public_key: VECTOR_KEY,
            message: b"some_message",
            signature: "3759625910b41f02e219d72aa171a714",
            valid: false,
        },
    ]
}

/// Run every vector through the verifier.
///
/// Returns `(name, matches_expectation)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool)> {
    all_vectors()
        .iter()
        .map(|v| {
            let key = Ed25519PublicKey::from_hex(v.public_key).expect("vector key is valid hex");
            let verified = verify_signature(&key, v.signature, v.message);
            (v.name.to_string(), verified == v.valid)
        })
        .collect()
}
