//! Family chat: an append-only per-family message log.

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::domain::commands::messages::SendMessageCommand;
use crate::domain::models::message::ChatMessage;
use crate::storage::files::{FileConnection, MessageRepository};
use crate::storage::traits::MessageStorage;

#[derive(Clone)]
pub struct MessagingService {
    message_repository: MessageRepository,
}

impl MessagingService {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self {
            message_repository: MessageRepository::new(connection),
        }
    }

    /// A family's chat log, oldest first. The log is append-only, so the
    /// stored order already matches; the sort guards against clock skew
    /// between writers.
    pub fn list_messages(&self, family_id: &str) -> Result<Vec<ChatMessage>> {
        let mut messages = self.message_repository.list_messages(family_id)?;
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    pub fn send_message(&self, command: SendMessageCommand) -> Result<ChatMessage> {
        let message = ChatMessage {
            id: ChatMessage::generate_id(),
            family_id: command.family_id,
            sender_id: command.sender_id,
            text: command.text,
            timestamp: Utc::now(),
            is_system: command.is_system,
        };

        self.message_repository.append_message(&message)?;
        info!(
            "💬 Message {} appended to family {} log",
            message.id, message.family_id
        );
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::files::test_utils::TestEnvironment;

    fn setup() -> Result<(MessagingService, TestEnvironment)> {
        let env = TestEnvironment::new()?;
        let service = MessagingService::new(env.connection.clone());
        Ok((service, env))
    }

    #[test]
    fn test_empty_log() -> Result<()> {
        let (service, _env) = setup()?;
        assert!(service.list_messages("fam-1")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_messages_come_back_oldest_first() -> Result<()> {
        let (service, _env) = setup()?;
        for text in ["first", "second", "third"] {
            service.send_message(SendMessageCommand {
                family_id: "fam-1".to_string(),
                sender_id: "p1".to_string(),
                text: text.to_string(),
                is_system: false,
            })?;
        }

        let texts: Vec<String> = service
            .list_messages("fam-1")?
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        Ok(())
    }

    #[test]
    fn test_logs_are_scoped_per_family() -> Result<()> {
        let (service, _env) = setup()?;
        service.send_message(SendMessageCommand {
            family_id: "fam-1".to_string(),
            sender_id: "p1".to_string(),
            text: "hello".to_string(),
            is_system: false,
        })?;
        service.send_message(SendMessageCommand {
            family_id: "fam-2".to_string(),
            sender_id: "c1".to_string(),
            text: "Sofia joined the family.".to_string(),
            is_system: true,
        })?;

        let first = service.list_messages("fam-1")?;
        assert_eq!(first.len(), 1);
        assert!(!first[0].is_system);

        let second = service.list_messages("fam-2")?;
        assert_eq!(second.len(), 1);
        assert!(second[0].is_system);
        Ok(())
    }
}
