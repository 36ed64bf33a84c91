//! Messaging clients sharing one broker.

use chrono::Utc;

use crate::messaging::{Broker, DEFAULT_TOPIC, Message, MessagingClient, User};

#[tokio::test]
async fn test_every_subscriber_receives_broadcast() {
    let broker = Broker::default();
    let publisher = MessagingClient::connect(&broker);
    let mut first = MessagingClient::connect(&broker);
    let mut second = MessagingClient::connect(&broker);
    first.subscribe(DEFAULT_TOPIC).unwrap();
    second.subscribe(DEFAULT_TOPIC).unwrap();

    let message = Message::new(
        User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
        },
        "time to sync",
        Utc::now(),
    );
    let delivered = publisher.publish_message(DEFAULT_TOPIC, &message).unwrap();

    assert_eq!(delivered, 2);
    for client in [&mut first, &mut second] {
        let envelope = client.next_message().await.unwrap();
        assert_eq!(Message::from_json(&envelope.payload).unwrap(), message);
        assert_eq!(client.last_message(), Some(envelope.payload.as_str()));
    }
}

#[tokio::test]
async fn test_disconnected_client_stops_receiving() {
    let broker = Broker::default();
    let publisher = MessagingClient::connect(&broker);
    let mut client = MessagingClient::connect(&broker);
    client.subscribe(DEFAULT_TOPIC).unwrap();

    assert!(client.disconnect());

    assert_eq!(publisher.publish(DEFAULT_TOPIC, "anyone?").unwrap(), 0);
    assert_eq!(client.next_message().await, None);
}
