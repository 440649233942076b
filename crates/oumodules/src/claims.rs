//! Message claims: at most one worker instance answers a handoff.
//!
//! The queue may deliver a handoff more than once, and several worker
//! instances may run at the same time. Before answering, a worker claims the
//! handoff's [`claim_key`](crate::HandoffPayload::claim_key). A claim is
//! released only when processing failed before anything was posted, so a
//! later delivery can retry.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;

/// Shared claim registry.
#[async_trait]
pub trait MessageClaims: Send + Sync {
    /// Claim `key`. `Ok(false)` means another instance already holds it.
    async fn try_claim(&self, key: &str) -> Result<bool>;

    /// Give up a claim so a later delivery may process the message again.
    async fn release(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<C: MessageClaims + ?Sized> MessageClaims for std::sync::Arc<C> {
    async fn try_claim(&self, key: &str) -> Result<bool> {
        (**self).try_claim(key).await
    }

    async fn release(&self, key: &str) -> Result<()> {
        (**self).release(key).await
    }
}

/// In-memory claims for tests and single-instance runs.
#[derive(Debug, Default)]
pub struct MemoryClaims {
    held: Mutex<HashSet<String>>,
}

impl MemoryClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is currently held.
    pub fn is_claimed(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.held.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl MessageClaims for MemoryClaims {
    async fn try_claim(&self, key: &str) -> Result<bool> {
        Ok(self.lock().insert(key.to_string()))
    }

    async fn release(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_claim_once() {
        let claims = MemoryClaims::new();

        assert!(claims.try_claim("foo_1").await.unwrap());
        assert!(!claims.try_claim("foo_1").await.unwrap());
        assert!(claims.try_claim("foo_2").await.unwrap());
        assert!(claims.is_claimed("foo_1"));
    }

    #[tokio::test]
    async fn test_release_allows_retry() {
        let claims = MemoryClaims::new();
        claims.try_claim("foo_1").await.unwrap();

        claims.release("foo_1").await.unwrap();
        assert!(!claims.is_claimed("foo_1"));
        assert!(claims.try_claim("foo_1").await.unwrap());
    }

    #[tokio::test]
    async fn test_shared_between_workers() {
        let claims = Arc::new(MemoryClaims::new());
        let other = Arc::clone(&claims);

        assert!(claims.try_claim("foo_1").await.unwrap());
        assert!(!other.try_claim("foo_1").await.unwrap());
    }
}
