//! File-backed chat log: one CSV file per family under `messages/`,
//! appended to in arrival order.

use anyhow::{Context, Result};
use csv::{Reader, WriterBuilder};
use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::sync::Arc;

use super::connection::FileConnection;
use crate::domain::models::message::ChatMessage;
use crate::storage::traits::MessageStorage;

#[derive(Clone)]
pub struct MessageRepository {
    connection: Arc<FileConnection>,
}

impl MessageRepository {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self { connection }
    }
}

impl MessageStorage for MessageRepository {
    fn append_message(&self, message: &ChatMessage) -> Result<()> {
        let directory = self.connection.messages_directory();
        if !directory.exists() {
            fs::create_dir_all(&directory)
                .with_context(|| format!("Failed to create messages directory {:?}", directory))?;
        }

        let file_path = self.connection.messages_file(&message.family_id);
        let is_new_file = !file_path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .with_context(|| format!("Failed to open {:?} for append", file_path))?;
        let mut csv_writer = WriterBuilder::new()
            .has_headers(is_new_file)
            .from_writer(BufWriter::new(file));

        csv_writer.serialize(message)?;
        csv_writer.flush()?;

        debug!("Appended message {} to family {}", message.id, message.family_id);
        Ok(())
    }

    fn list_messages(&self, family_id: &str) -> Result<Vec<ChatMessage>> {
        let file_path = self.connection.messages_file(family_id);
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)
            .with_context(|| format!("Failed to open {:?}", file_path))?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut messages = Vec::new();
        for result in csv_reader.deserialize() {
            let message: ChatMessage =
                result.with_context(|| format!("Malformed row in {:?}", file_path))?;
            messages.push(message);
        }
        Ok(messages)
    }
}
