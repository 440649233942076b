//! Configuration for the endpoint and the deferred worker.

use std::path::PathBuf;

use oumodules_core::{Ed25519PublicKey, APPLICATION_PUBLIC_KEY};

use crate::error::{InteractionError, Result};

/// Environment variable overriding [`InteractionConfig::public_key`] (hex).
pub const ENV_PUBLIC_KEY: &str = "OUMODULES_PUBLIC_KEY";
/// Environment variable overriding [`InteractionConfig::catalog_path`].
pub const ENV_CATALOG_PATH: &str = "OUMODULES_CATALOG_PATH";
/// Environment variable overriding [`InteractionConfig::jump_link_base`].
pub const ENV_JUMP_LINK_BASE: &str = "OUMODULES_JUMP_LINK_BASE";

/// Where deferred interactions are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffTopic {
    pub project: String,
    pub topic: String,
}

impl Default for HandoffTopic {
    fn default() -> Self {
        Self {
            project: "ou-modules-bot".to_string(),
            topic: "interactions".to_string(),
        }
    }
}

/// Configuration for the interaction endpoint.
#[derive(Debug, Clone)]
pub struct InteractionConfig {
    /// Key the platform signs requests with.
    pub public_key: Ed25519PublicKey,
    /// Prefix of jump links: `<base>/<guild>/<channel>/<message>`.
    pub jump_link_base: String,
    /// Topic for deferred interactions.
    pub handoff_topic: HandoffTopic,
    /// Catalog source file.
    pub catalog_path: PathBuf,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            public_key: APPLICATION_PUBLIC_KEY,
            jump_link_base: "https://discord.com/channels".to_string(),
            handoff_topic: HandoffTopic::default(),
            catalog_path: PathBuf::from("cache.json"),
        }
    }
}

impl InteractionConfig {
    /// Defaults, overridden by any of the `OUMODULES_*` variables that are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(hex) = lookup(ENV_PUBLIC_KEY) {
            config.public_key = Ed25519PublicKey::from_hex(hex.trim())
                .map_err(|e| InteractionError::Config(format!("{ENV_PUBLIC_KEY}: {e}")))?;
        }
        if let Some(path) = lookup(ENV_CATALOG_PATH) {
            config.catalog_path = PathBuf::from(path);
        }
        if let Some(base) = lookup(ENV_JUMP_LINK_BASE) {
            config.jump_link_base = base;
        }
        Ok(config)
    }
}

/// Configuration for the deferred worker's follow-up message.
#[derive(Debug, Clone)]
pub struct FollowUpConfig {
    /// Application the follow-up is sent as.
    pub application_id: u64,
    /// Maximum number of raw matches the worker looks at.
    pub codes_limit: usize,
    /// Webhook API prefix.
    pub webhook_base: String,
    /// Prefix of jump links.
    pub jump_link_base: String,
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self {
            application_id: 511181619785236500,
            codes_limit: 5,
            webhook_base: "https://discord.com/api/v10/webhooks".to_string(),
            jump_link_base: "https://discord.com/channels".to_string(),
        }
    }
}
