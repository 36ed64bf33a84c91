//! Topic-based messaging.
//!
//! A [`Broker`] owns a set of named topics. Each [`MessagingClient`] is an
//! owned connection to a broker: it subscribes to topics, publishes payloads,
//! and keeps the payload of the last message it received.
//!
//! ```
//! use lcd_clock::messaging::{Broker, DEFAULT_TOPIC, MessagingClient};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let broker = Broker::default();
//! let mut client = MessagingClient::connect(&broker);
//! client.subscribe(DEFAULT_TOPIC).unwrap();
//! client.publish(DEFAULT_TOPIC, "ping").unwrap();
//!
//! let envelope = client.next_message().await.unwrap();
//! assert_eq!(envelope.payload, "ping");
//! assert_eq!(client.last_message(), Some("ping"));
//! # });
//! ```

mod broker;
mod message;

pub use broker::{
    Broker, DEFAULT_CAPACITY, DEFAULT_TOPIC, Envelope, MessagingClient, MessagingError,
};
pub use message::{Message, User};
