//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use oumodules_core::{CodeCatalog, Ed25519PublicKey, Keypair};
use serde_json::{json, Value};

pub const FAKE_GUILD_ID: &str = "fake_guild_id";
pub const FAKE_CHANNEL_ID: &str = "fake_channel_id";
pub const FAKE_TARGET_ID: &str = "foo";
pub const FAKE_TOKEN: &str = "fake_token";
pub const FAKE_REQUEST_ID: &str = "fake_request_id";
pub const TEST_TIMESTAMP: &str = "1736870400";

/// A small catalog in the on-disk format.
pub const SAMPLE_CATALOG_JSON: &str = r#"{
 "M208": ["Pure mathematics", "http://www.open.ac.uk/courses/modules/m208"],
 "MST125": ["Essential mathematics 2", "http://www.open.ac.uk/courses/modules/mst125"],
 "MU123": ["Discovering mathematics", "http://www.open.ac.uk/courses/modules/mu123"],
 "T313": ["Renewable energy for a sustainable future", "http://www.open.ac.uk/courses/modules/t313"],
 "T329": ["Making the connection: cryptography and network security", "http://www.open.ac.uk/courses/modules/t329"],
 "A012": ["Arts and humanities: an introduction", null],
 "QD": ["BA/BSc (Honours) Open", "http://www.open.ac.uk/courses/qualifications/qd"]
}"#;

/// The sample catalog, parsed.
pub fn sample_catalog() -> CodeCatalog {
    CodeCatalog::from_json_str(SAMPLE_CATALOG_JSON).expect("sample catalog is valid")
}

/// A message command invoked on a message with `content`.
pub fn command_request(content: &str) -> Value {
    json!({
        "type": 2,
        "data": {
            "target_id": FAKE_TARGET_ID,
            "resolved": {
                "messages": {
                    FAKE_TARGET_ID: {
                        "channel_id": FAKE_CHANNEL_ID,
                        "content": content
                    }
                }
            }
        },
        "guild_id": FAKE_GUILD_ID,
        "token": FAKE_TOKEN,
        "id": FAKE_REQUEST_ID
    })
}

/// A ping.
pub fn ping_request() -> Value {
    json!({"type": 1, "id": FAKE_REQUEST_ID, "token": FAKE_TOKEN})
}

/// The jump link every fixture command produces.
pub fn fake_jump_url() -> String {
    format!("https://discord.com/channels/{FAKE_GUILD_ID}/{FAKE_CHANNEL_ID}/{FAKE_TARGET_ID}")
}

/// A body with the headers the platform would send alongside it.
#[derive(Debug, Clone)]
pub struct SignedBody {
    pub timestamp: String,
    pub signature: String,
    pub body: Vec<u8>,
}

/// A test fixture standing in for the platform's signing key.
pub struct TestFixture {
    pub keypair: Keypair,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
        }
    }

    /// The key the endpoint should be configured with.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    /// Sign `body` at [`TEST_TIMESTAMP`].
    pub fn sign_body(&self, body: &[u8]) -> SignedBody {
        self.sign_body_at(TEST_TIMESTAMP, body)
    }

    /// Sign `body` at `timestamp`.
    pub fn sign_body_at(&self, timestamp: &str, body: &[u8]) -> SignedBody {
        SignedBody {
            timestamp: timestamp.to_string(),
            signature: self.keypair.sign_request(timestamp, body),
            body: body.to_vec(),
        }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Flip one hex digit of a signature, keeping it valid hex.
pub fn flip_hex_char(signature: &str, index: usize) -> String {
    signature
        .char_indices()
        .map(|(i, c)| {
            if i != index {
                return c;
            }
            if c == '0' {
                '1'
            } else {
                '0'
            }
        })
        .collect()
}
