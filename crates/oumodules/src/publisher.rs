//! Publisher trait: where deferred interactions go.
//!
//! The queue client itself lives outside this crate. Implementations return
//! a message id on success; any failure is fatal for the invocation and is
//! never retried here.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::HandoffTopic;
use crate::error::{InteractionError, Result};

/// Async interface to the message queue.
#[async_trait]
pub trait HandoffPublisher: Send + Sync {
    /// Publish `data` to `topic`, returning the queue's message id.
    async fn publish(&self, topic: &HandoffTopic, data: Bytes) -> Result<String>;
}

#[async_trait]
impl<P: HandoffPublisher + ?Sized> HandoffPublisher for std::sync::Arc<P> {
    async fn publish(&self, topic: &HandoffTopic, data: Bytes) -> Result<String> {
        (**self).publish(topic, data).await
    }
}

/// A published message, as recorded by [`MemoryPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub id: String,
    pub topic: HandoffTopic,
    pub data: Bytes,
}

/// In-memory publisher for tests and local runs.
///
/// Can be switched into a failing mode to exercise the fatal path.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    inner: Mutex<MemoryPublisherInner>,
}

#[derive(Debug, Default)]
struct MemoryPublisherInner {
    messages: Vec<PublishedMessage>,
    fail_with: Option<String>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher that rejects every message with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        let publisher = Self::new();
        publisher.lock().fail_with = Some(reason.into());
        publisher
    }

    /// Everything published so far.
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.lock().messages.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryPublisherInner> {
        // A poisoned lock only means a test panicked mid-publish.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl HandoffPublisher for MemoryPublisher {
    async fn publish(&self, topic: &HandoffTopic, data: Bytes) -> Result<String> {
        let mut inner = self.lock();
        if let Some(reason) = &inner.fail_with {
            return Err(InteractionError::Publish(reason.clone()));
        }
        let id = (inner.messages.len() + 1).to_string();
        inner.messages.push(PublishedMessage {
            id: id.clone(),
            topic: topic.clone(),
            data,
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_publisher_records_messages() {
        let publisher = MemoryPublisher::new();
        let topic = HandoffTopic::default();

        let first = publisher.publish(&topic, Bytes::from_static(b"a")).await.unwrap();
        let second = publisher.publish(&topic, Bytes::from_static(b"b")).await.unwrap();

        assert_ne!(first, second);
        let messages = publisher.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].data, Bytes::from_static(b"b"));
        assert_eq!(messages[0].topic, topic);
    }

    #[tokio::test]
    async fn test_failing_publisher() {
        let publisher = MemoryPublisher::failing("queue unavailable");
        let result = publisher
            .publish(&HandoffTopic::default(), Bytes::from_static(b"a"))
            .await;

        assert!(matches!(result, Err(InteractionError::Publish(_))));
        assert!(publisher.messages().is_empty());
    }
}
