use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

/// Domain events published after a lifecycle mutation commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    PurchaseRequestCreated(i64),
    PurchaseRequestUpdated(i64),
    PurchaseRequestFollowedUp {
        purchase_request_id: i64,
        buyer: String,
    },
    PurchaseRequestStatusChanged {
        purchase_request_id: i64,
        old_status: String,
        new_status: String,
    },
    PurchaseRequestDeleted(i64),

    GoodsCategoryCreated(i64),
    GoodsCategoryUpdated(i64),
    GoodsCategoryDeleted(i64),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel for the lifetime of the process. Consumers that
/// need more than a log line (webhooks, queues) hang off this loop.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::PurchaseRequestCreated(id) => {
                info!(purchase_request_id = %id, "purchase request created")
            }
            Event::PurchaseRequestUpdated(id) => {
                info!(purchase_request_id = %id, "purchase request updated")
            }
            Event::PurchaseRequestFollowedUp {
                purchase_request_id,
                buyer,
            } => {
                info!(purchase_request_id = %purchase_request_id, buyer = %buyer, "purchase request followed up")
            }
            Event::PurchaseRequestStatusChanged {
                purchase_request_id,
                old_status,
                new_status,
            } => {
                info!(
                    purchase_request_id = %purchase_request_id,
                    old_status = %old_status,
                    new_status = %new_status,
                    "purchase request status changed"
                )
            }
            Event::PurchaseRequestDeleted(id) => {
                info!(purchase_request_id = %id, "purchase request deleted")
            }
            Event::GoodsCategoryCreated(id) => info!(category_id = %id, "goods category created"),
            Event::GoodsCategoryUpdated(id) => info!(category_id = %id, "goods category updated"),
            Event::GoodsCategoryDeleted(id) => info!(category_id = %id, "goods category deleted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_fails_once_the_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        drop(rx);

        let result = sender.send(Event::PurchaseRequestCreated(1)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn events_round_trip_through_the_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::PurchaseRequestStatusChanged {
                purchase_request_id: 7,
                old_status: "pending".into(),
                new_status: "approved".into(),
            })
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            Event::PurchaseRequestStatusChanged {
                purchase_request_id,
                new_status,
                ..
            } => {
                assert_eq!(purchase_request_id, 7);
                assert_eq!(new_status, "approved");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
