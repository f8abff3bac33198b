use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Sends domain events to the background processor
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

    /// Sends an event, logging instead of failing when the channel is closed
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "Dropping domain event");
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    CompanyCreated(Uuid),
    OfficeCreated(Uuid),
    WorkOrderCreated(Uuid),
    WorkOrderConverted {
        work_order_id: Uuid,
        order_id: Uuid,
    },
    OrderCreated(Uuid),
    OrderDuplicated {
        source_id: Uuid,
        order_id: Uuid,
    },
    StatusChanged {
        entity_type: String,
        entity_id: Uuid,
        from: String,
        to: String,
    },
    PaymentRecorded {
        order_id: Uuid,
        payment_id: Uuid,
    },
    InvoiceCreated {
        invoice_id: Uuid,
        order_id: Uuid,
    },
    InvoiceSynced {
        invoice_id: Uuid,
        quickbooks_invoice_id: String,
    },
    InvoiceSyncFailed {
        invoice_id: Uuid,
        error: String,
    },
    QuickbooksConnected {
        user_id: Uuid,
        realm_id: String,
    },
    QuickbooksTokenRefreshed(Uuid),
}

/// Drains the event channel, logging each event
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::InvoiceSyncFailed { invoice_id, error } => {
                warn!(invoice_id = %invoice_id, error = %error, "Invoice sync failed");
            }
            Event::StatusChanged {
                entity_type,
                entity_id,
                from,
                to,
            } => {
                info!(entity_type = %entity_type, entity_id = %entity_id, from = %from, to = %to, "Status changed");
            }
            other => info!(event = ?other, "Domain event"),
        }
    }

    info!("Event channel closed; stopping processor");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();
        sender.send(Event::OrderCreated(id)).await.unwrap();
        assert_eq!(rx.recv().await, Some(Event::OrderCreated(id)));
    }

    #[tokio::test]
    async fn closed_channel_is_reported() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::CompanyCreated(Uuid::new_v4())).await.is_err());
        sender.send_or_log(Event::CompanyCreated(Uuid::new_v4())).await;
    }
}
