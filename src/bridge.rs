use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::expense::{self, ParsedExpense};
use crate::platform::IncomingMessage;
use crate::webhook::{Delivery, ExpenseRecord, WebhookClient};

/// Our own confirmation lines, so copied or forwarded ones don't get re-recorded.
static CONFIRMATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:✅\s*added|⚠\x{FE0F}?\s*not saved):").unwrap()
});

/// Turns group messages into webhook records and confirmation replies.
/// Platform-agnostic: receives IncomingMessage, returns the reply text if any.
pub struct Bridge {
    webhook: WebhookClient,
}

impl Bridge {
    pub fn new(webhook: WebhookClient) -> Self {
        Self { webhook }
    }

    /// Process one group message. `None` means the message was not an expense
    /// and nothing should be sent back.
    pub async fn process_message(&self, incoming: &IncomingMessage) -> Option<String> {
        if is_confirmation(&incoming.text) {
            debug!("Ignoring confirmation echo in {}", incoming.chat_id);
            return None;
        }

        let payer = incoming.payer_name();
        if let Some(mention) = incoming.mentions.first() {
            debug!(
                "First mention {} resolved to {:?}",
                mention.id, mention.display_name
            );
        }
        info!(
            "{} message from {} in {}: {}",
            incoming.platform, payer, incoming.chat_id, incoming.text
        );

        let Some(ParsedExpense { item, price }) = expense::parse_expense(&incoming.text) else {
            debug!("No expense found in message from {}", incoming.sender_id);
            return None;
        };

        let record = ExpenseRecord {
            name: payer.to_string(),
            item,
            price,
            group_id: incoming.chat_id.clone(),
            raw_text: incoming.text.clone(),
            timestamp_ms: incoming.timestamp_ms,
        };

        let delivery = self.webhook.deliver(&record).await;
        Some(confirmation_text(&record, delivery))
    }
}

fn is_confirmation(text: &str) -> bool {
    CONFIRMATION_RE.is_match(text)
}

fn confirmation_text(record: &ExpenseRecord, delivery: Delivery) -> String {
    let prefix = match delivery {
        Delivery::Posted | Delivery::Skipped => "✅ added:",
        Delivery::Failed => "⚠️ not saved:",
    };
    format!(
        "{}  · {} {} · ₹{}",
        prefix,
        record.name.to_lowercase(),
        record.item.to_lowercase(),
        record.price
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{test_message, Mention};
    use crate::webhook::tests::{client, spawn_webhook};
    use axum::http::StatusCode;

    fn bridge(url: &str) -> Bridge {
        Bridge::new(client(url))
    }

    #[test]
    fn test_confirmation_format() {
        let record = ExpenseRecord {
            name: "Priya".to_string(),
            item: "cab".to_string(),
            price: 1200.5,
            group_id: "g".to_string(),
            raw_text: "cab 1,200.50".to_string(),
            timestamp_ms: 0,
        };
        assert_eq!(
            confirmation_text(&record, Delivery::Posted),
            "✅ added:  · priya cab · ₹1200.5"
        );
        assert_eq!(
            confirmation_text(&record, Delivery::Failed),
            "⚠️ not saved:  · priya cab · ₹1200.5"
        );
    }

    #[test]
    fn test_confirmations_are_recognized() {
        assert!(is_confirmation("✅ added:  · priya cab · ₹250"));
        assert!(is_confirmation("✅ added: · priya cab · ₹250"));
        assert!(is_confirmation("  ✅ ADDED: · priya cab · ₹250"));
        assert!(is_confirmation("⚠️ not saved: · priya cab · ₹250"));
        assert!(!is_confirmation("cab 250 ✅ added: later"));
    }

    #[tokio::test]
    async fn test_non_expense_is_silent() {
        let bridge = bridge("");
        assert_eq!(bridge.process_message(&test_message("good morning all")).await, None);
    }

    #[tokio::test]
    async fn test_confirmation_echo_is_silent() {
        let bridge = bridge("");
        let msg = test_message("✅ added: · priya lunch · ₹250");
        assert_eq!(bridge.process_message(&msg).await, None);
    }

    #[tokio::test]
    async fn test_skipped_webhook_still_confirms() {
        let bridge = bridge("");
        let reply = bridge
            .process_message(&test_message("paid 250 for lunch today"))
            .await;
        assert_eq!(reply.as_deref(), Some("✅ added:  · priya lunch today · ₹250"));
    }

    #[tokio::test]
    async fn test_posts_record_with_mentioned_payer() {
        let (url, received) = spawn_webhook(StatusCode::OK).await;
        let bridge = bridge(&url);

        let mut msg = test_message("@rahul gave 1,200 rs for cab");
        msg.mentions = vec![Mention {
            id: "rahul".to_string(),
            display_name: "Rahul".to_string(),
        }];

        let reply = bridge.process_message(&msg).await;
        assert_eq!(reply.as_deref(), Some("✅ added:  · rahul rahul cab · ₹1200"));

        let bodies = received.lock().await;
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["name"], "Rahul");
        assert_eq!(bodies[0]["item"], "rahul cab");
        assert_eq!(bodies[0]["price"], 1200.0);
        assert_eq!(bodies[0]["group_id"], "-1001234567890");
        assert_eq!(bodies[0]["raw_text"], "@rahul gave 1,200 rs for cab");
        assert_eq!(bodies[0]["timestamp_ms"], 1_767_225_600_000i64);
    }

    #[tokio::test]
    async fn test_failed_webhook_changes_confirmation() {
        let bridge = bridge("http://127.0.0.1:1/hook");
        let reply = bridge.process_message(&test_message("chai 20")).await;
        assert_eq!(reply.as_deref(), Some("⚠️ not saved:  · priya chai · ₹20"));
    }
}
