//! In-process topic broker and client.
//!
//! Each topic is a tokio broadcast channel. A `MessagingClient` is an
//! explicitly owned service object: it is connected to a broker, subscribes
//! to topics, publishes, and remembers the last message it received. Nothing
//! here is process-global.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::select_all;
use tokio::sync::broadcast;

use super::message::Message;

/// Topic used when no other topic is specified.
pub const DEFAULT_TOPIC: &str = "message";

/// Default number of messages retained per topic for slow receivers.
pub const DEFAULT_CAPACITY: usize = 64;

/// A payload delivered on a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub topic: String,
    pub payload: String,
}

/// Errors that can occur during messaging operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    /// The client has been disconnected.
    NotConnected,
    /// The client is already subscribed to this topic.
    AlreadySubscribed(String),
    /// The broker's topic table lock was poisoned.
    BrokerPoisoned,
    /// A message could not be encoded.
    Encode(String),
}

impl std::fmt::Display for MessagingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "messaging client is not connected"),
            Self::AlreadySubscribed(topic) => write!(f, "already subscribed to {topic}"),
            Self::BrokerPoisoned => write!(f, "broker lock poisoned"),
            Self::Encode(reason) => write!(f, "failed to encode message: {reason}"),
        }
    }
}

impl std::error::Error for MessagingError {}

/// Shared handle to the topic table.
#[derive(Debug, Clone)]
pub struct Broker {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<Envelope>>>>,
    capacity: usize,
}

impl Broker {
    /// Create a broker retaining up to `capacity` messages per topic.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Get the sender for a topic, creating the topic on first use.
    fn sender(&self, topic: &str) -> Result<broadcast::Sender<Envelope>, MessagingError> {
        let mut topics = self
            .topics
            .lock()
            .map_err(|_| MessagingError::BrokerPoisoned)?;
        let sender = topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Ok(sender.clone())
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A connection to a broker.
#[derive(Debug)]
pub struct MessagingClient {
    broker: Option<Broker>,
    subscriptions: HashMap<String, broadcast::Receiver<Envelope>>,
    last_message: Option<String>,
}

impl MessagingClient {
    /// Connect to a broker.
    #[must_use]
    pub fn connect(broker: &Broker) -> Self {
        tracing::info!("messaging client connected");
        Self {
            broker: Some(broker.clone()),
            subscriptions: HashMap::new(),
            last_message: None,
        }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.broker.is_some()
    }

    /// Start receiving messages published on `topic`.
    ///
    /// Only messages published after this call are received.
    pub fn subscribe(&mut self, topic: &str) -> Result<(), MessagingError> {
        let broker = self.broker.as_ref().ok_or(MessagingError::NotConnected)?;
        if self.subscriptions.contains_key(topic) {
            return Err(MessagingError::AlreadySubscribed(topic.to_string()));
        }
        let receiver = broker.sender(topic)?.subscribe();
        self.subscriptions.insert(topic.to_string(), receiver);
        tracing::debug!(topic, "subscribed");
        Ok(())
    }

    /// Publish a payload on `topic`.
    ///
    /// Returns the number of subscribers the payload was delivered to. A
    /// topic with no subscribers is not an error.
    pub fn publish(&self, topic: &str, payload: impl Into<String>) -> Result<usize, MessagingError> {
        let broker = self.broker.as_ref().ok_or(MessagingError::NotConnected)?;
        let envelope = Envelope {
            topic: topic.to_string(),
            payload: payload.into(),
        };
        let delivered = broker.sender(topic)?.send(envelope).unwrap_or(0);
        tracing::debug!(topic, delivered, "published");
        Ok(delivered)
    }

    /// Publish a chat message as JSON on `topic`.
    pub fn publish_message(&self, topic: &str, message: &Message) -> Result<usize, MessagingError> {
        let json = message
            .to_json()
            .map_err(|e| MessagingError::Encode(e.to_string()))?;
        self.publish(topic, json)
    }

    /// Wait for the next message on any subscribed topic.
    ///
    /// Records the payload as the last message. Returns `None` if there are
    /// no subscriptions or the broker has gone away.
    pub async fn next_message(&mut self) -> Option<Envelope> {
        loop {
            if self.subscriptions.is_empty() {
                return None;
            }
            let receivers = self
                .subscriptions
                .values_mut()
                .map(|receiver| Box::pin(receiver.recv()));
            let (result, _, _) = select_all(receivers).await;

            match result {
                Ok(envelope) => {
                    tracing::debug!(topic = %envelope.topic, "received message");
                    self.last_message = Some(envelope.payload.clone());
                    return Some(envelope);
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    tracing::warn!("message receiver lagged by {count} messages");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("broker channel closed");
                    return None;
                }
            }
        }
    }

    /// Payload of the most recently received message.
    #[must_use]
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Drop all subscriptions and the broker handle.
    ///
    /// Returns `false` if the client was already disconnected.
    pub fn disconnect(&mut self) -> bool {
        self.subscriptions.clear();
        let was_connected = self.broker.take().is_some();
        if was_connected {
            tracing::info!("messaging client disconnected");
        }
        was_connected
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::messaging::User;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let broker = Broker::default();
        let mut receiver = MessagingClient::connect(&broker);
        let sender = MessagingClient::connect(&broker);
        receiver.subscribe(DEFAULT_TOPIC).expect("subscribe");

        let delivered = sender.publish(DEFAULT_TOPIC, "hello").expect("publish");
        let envelope = receiver.next_message().await.expect("message");

        assert_eq!(delivered, 1);
        assert_eq!(envelope.topic, DEFAULT_TOPIC);
        assert_eq!(envelope.payload, "hello");
        assert_eq!(receiver.last_message(), Some("hello"));
    }

    #[tokio::test]
    async fn test_last_message_tracks_latest() {
        let broker = Broker::default();
        let mut client = MessagingClient::connect(&broker);
        client.subscribe(DEFAULT_TOPIC).expect("subscribe");
        assert_eq!(client.last_message(), None);

        client.publish(DEFAULT_TOPIC, "first").expect("publish");
        client.publish(DEFAULT_TOPIC, "second").expect("publish");
        client.next_message().await.expect("message");
        client.next_message().await.expect("message");

        assert_eq!(client.last_message(), Some("second"));
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let broker = Broker::default();
        let mut client = MessagingClient::connect(&broker);
        client.subscribe("alerts").expect("subscribe");

        assert_eq!(client.publish(DEFAULT_TOPIC, "ignored").expect("publish"), 0);
        client.publish("alerts", "fire").expect("publish");

        let envelope = client.next_message().await.expect("message");
        assert_eq!(envelope.payload, "fire");
    }

    #[tokio::test]
    async fn test_next_message_without_subscriptions() {
        let broker = Broker::default();
        let mut client = MessagingClient::connect(&broker);
        assert_eq!(client.next_message().await, None);
    }

    #[tokio::test]
    async fn test_next_message_waits_for_publish() {
        let broker = Broker::default();
        let mut client = MessagingClient::connect(&broker);
        client.subscribe(DEFAULT_TOPIC).expect("subscribe");

        let waiting = tokio::time::timeout(Duration::from_millis(50), client.next_message()).await;
        assert!(waiting.is_err(), "no message should be available yet");
    }

    #[tokio::test]
    async fn test_lagged_receiver_continues() {
        let broker = Broker::new(2);
        let mut client = MessagingClient::connect(&broker);
        client.subscribe(DEFAULT_TOPIC).expect("subscribe");

        for i in 0..5 {
            client.publish(DEFAULT_TOPIC, format!("m{i}")).expect("publish");
        }

        let envelope = client.next_message().await.expect("message");
        assert_eq!(envelope.payload, "m3");
    }

    #[test]
    fn test_subscribe_twice_is_rejected() {
        let broker = Broker::default();
        let mut client = MessagingClient::connect(&broker);
        client.subscribe(DEFAULT_TOPIC).expect("subscribe");

        assert_eq!(
            client.subscribe(DEFAULT_TOPIC),
            Err(MessagingError::AlreadySubscribed(DEFAULT_TOPIC.to_string()))
        );
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let broker = Broker::default();
        let mut client = MessagingClient::connect(&broker);
        client.subscribe(DEFAULT_TOPIC).expect("subscribe");

        assert!(client.disconnect());
        assert!(!client.disconnect());
        assert!(!client.is_connected());
        assert_eq!(client.publish(DEFAULT_TOPIC, "x"), Err(MessagingError::NotConnected));
        assert_eq!(client.subscribe(DEFAULT_TOPIC), Err(MessagingError::NotConnected));
    }

    #[tokio::test]
    async fn test_publish_message_as_json() {
        let broker = Broker::default();
        let mut client = MessagingClient::connect(&broker);
        client.subscribe(DEFAULT_TOPIC).expect("subscribe");
        let message = Message::new(
            User {
                id: "u1".to_string(),
                name: "Ada".to_string(),
            },
            "hi",
            Utc::now(),
        );

        client.publish_message(DEFAULT_TOPIC, &message).expect("publish");
        let envelope = client.next_message().await.expect("message");

        assert_eq!(Message::from_json(&envelope.payload).expect("decodes"), message);
    }

    #[test]
    fn test_messaging_error_display() {
        assert_eq!(
            MessagingError::NotConnected.to_string(),
            "messaging client is not connected"
        );
        assert_eq!(
            MessagingError::AlreadySubscribed("message".to_string()).to_string(),
            "already subscribed to message"
        );
    }
}
