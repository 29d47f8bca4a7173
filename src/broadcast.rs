//! Broadcast dispatch
//!
//! Fans one formatted line out to every registered client except the
//! origin. Recipient queues are unbounded, so a live recipient never
//! misses a line; only a recipient whose writer has already exited fails,
//! and that failure never stops the pass.

use tracing::debug;

use crate::message::{format_line, Origin};
use crate::registry::Registry;
use crate::types::Identity;

/// Outcome of one broadcast pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Recipients whose queue accepted the line
    pub delivered: usize,
    /// Recipients that could not be reached
    pub failed: Vec<Identity>,
}

/// Deliver `[origin]: text` to every entry other than `origin`
pub fn broadcast(registry: &Registry, origin: Origin, text: &str) -> Delivery {
    let mut delivery = Delivery::default();
    if registry.is_empty() {
        return delivery;
    }

    let line = format_line(origin, text);
    debug!("Broadcasting: {}", line);

    let skip = origin.identity();

    for client in registry.iter().filter(|c| Some(c.identity) != skip) {
        match client.send(line.clone()) {
            Ok(()) => delivery.delivered += 1,
            Err(e) => {
                debug!("Delivery to {} failed: {}", client.identity, e);
                delivery.failed.push(client.identity);
            }
        }
    }

    delivery
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::client::Client;

    fn register(registry: &mut Registry, n: u64) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        registry.insert(Client::new(Identity(n), None, tx));
        rx
    }

    #[tokio::test]
    async fn test_sender_is_excluded() {
        let mut registry = Registry::new();
        let mut rx1 = register(&mut registry, 1);
        let mut rx2 = register(&mut registry, 2);

        let delivery = broadcast(&registry, Origin::Client(Identity(1)), "hello");

        assert_eq!(delivery.delivered, 1);
        assert!(delivery.failed.is_empty());
        assert_eq!(rx2.recv().await.as_deref(), Some("[User1]: hello"));
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_server_notice_reaches_everyone() {
        let mut registry = Registry::new();
        let mut rx1 = register(&mut registry, 1);
        let mut rx2 = register(&mut registry, 2);

        let delivery = broadcast(&registry, Origin::Server, "User2 has joined the chat.");

        assert_eq!(delivery.delivered, 2);
        for rx in [&mut rx1, &mut rx2] {
            assert_eq!(
                rx.recv().await.as_deref(),
                Some("[SERVER]: User2 has joined the chat.")
            );
        }
    }

    #[tokio::test]
    async fn test_failed_recipient_does_not_stop_delivery() {
        let mut registry = Registry::new();
        let _rx1 = register(&mut registry, 1);
        let mut rx2 = register(&mut registry, 2);
        let rx3 = register(&mut registry, 3);
        let mut rx4 = register(&mut registry, 4);
        drop(rx3);

        let delivery = broadcast(&registry, Origin::Client(Identity(1)), "still here");

        assert_eq!(delivery.delivered, 2);
        assert_eq!(delivery.failed, vec![Identity(3)]);
        assert_eq!(rx2.recv().await.as_deref(), Some("[User1]: still here"));
        assert_eq!(rx4.recv().await.as_deref(), Some("[User1]: still here"));
    }

    #[tokio::test]
    async fn test_burst_reaches_slow_reader_in_order() {
        let mut registry = Registry::new();
        let _rx1 = register(&mut registry, 1);
        let mut rx2 = register(&mut registry, 2);

        // Recipient does not drain until the whole burst has been queued
        for i in 0..5000 {
            let delivery = broadcast(&registry, Origin::Client(Identity(1)), &i.to_string());
            assert_eq!(delivery.delivered, 1);
            assert!(delivery.failed.is_empty());
        }

        for i in 0..5000 {
            assert_eq!(rx2.recv().await, Some(format!("[User1]: {}", i)));
        }
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        assert_eq!(broadcast(&registry, Origin::Server, "x"), Delivery::default());
    }
}
