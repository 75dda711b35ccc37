pub mod telegram;

/// A user referenced inside a message
#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    /// Platform-specific user ID or handle
    pub id: String,
    /// Name to credit the expense to; may be empty when the platform can't resolve it
    pub display_name: String,
}

/// A group message received from any platform
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Platform identifier (e.g., "telegram")
    pub platform: String,
    /// Platform-specific sender ID as string
    pub sender_id: String,
    /// Display name of the sender
    pub sender_name: String,
    /// Platform-specific group ID as string
    pub chat_id: String,
    /// The message text
    pub text: String,
    /// Message time in milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Users mentioned in the message, in order of appearance
    pub mentions: Vec<Mention>,
}

impl IncomingMessage {
    /// Who paid: the first mentioned user if their name is known, otherwise the sender.
    pub fn payer_name(&self) -> &str {
        self.mentions
            .first()
            .map(|m| m.display_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(self.sender_name.as_str())
    }
}

#[cfg(test)]
pub(crate) fn test_message(text: &str) -> IncomingMessage {
    IncomingMessage {
        platform: "telegram".to_string(),
        sender_id: "42".to_string(),
        sender_name: "Priya".to_string(),
        chat_id: "-1001234567890".to_string(),
        text: text.to_string(),
        timestamp_ms: 1_767_225_600_000,
        mentions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(name: &str) -> Mention {
        Mention {
            id: "7".to_string(),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn test_payer_defaults_to_sender() {
        let msg = test_message("lunch 250");
        assert_eq!(msg.payer_name(), "Priya");
    }

    #[test]
    fn test_payer_from_first_mention() {
        let mut msg = test_message("@rahul cab 1200");
        msg.mentions = vec![mention("Rahul"), mention("Anita")];
        assert_eq!(msg.payer_name(), "Rahul");
    }

    #[test]
    fn test_unresolved_mention_keeps_sender() {
        let mut msg = test_message("cab 1200");
        msg.mentions = vec![mention(""), mention("Anita")];
        assert_eq!(msg.payer_name(), "Priya");
    }
}
