//! Chat front-end: turns incoming messages into report requests.
//!
//! `/start` gets the welcome text; any other plain text is taken as a report
//! title. Generation runs on the blocking pool, and its failures are reported
//! back to the chat rather than dropped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Institution;
use crate::pipeline::{GeneratedReport, ReportGenerator};
use crate::telegram::client::{TelegramClient, TelegramError, Update};
use crate::telegram::messages::{DOCUMENT_CAPTION, FAILURE, PROGRESS, WELCOME};

const POLL_TIMEOUT_SECS: u32 = 50;
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Outbound side of a chat. Implemented by `TelegramClient`.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> Result<(), TelegramError>;
}

pub struct ReportBot<T> {
    transport: T,
    generator: Arc<dyn ReportGenerator>,
    institution: Institution,
}

impl<T: ChatTransport> ReportBot<T> {
    pub fn new(transport: T, generator: Arc<dyn ReportGenerator>, institution: Institution) -> Self {
        Self {
            transport,
            generator,
            institution,
        }
    }

    pub async fn handle_update(&self, update: Update) -> Result<(), TelegramError> {
        let Some(message) = update.message else {
            return Ok(());
        };
        let Some(text) = message.text.as_deref().map(str::trim) else {
            return Ok(());
        };
        let chat_id = message.chat.id;

        if is_command(text, "start") {
            return self.transport.send_message(chat_id, WELCOME).await;
        }
        if text.starts_with('/') || text.is_empty() {
            debug!(chat_id, "ignoring message");
            return Ok(());
        }

        self.transport.send_message(chat_id, PROGRESS).await?;

        match self.generate(text).await {
            Ok(report) => match report.take_bytes().await {
                Ok(bytes) => {
                    self.transport
                        .send_document(chat_id, &report.file_name, bytes, DOCUMENT_CAPTION)
                        .await
                }
                Err(e) => {
                    error!(path = %report.path.display(), "failed to read generated report: {e}");
                    self.transport.send_message(chat_id, FAILURE).await
                }
            },
            Err(e) => {
                error!(chat_id, "report generation failed: {e}");
                self.transport.send_message(chat_id, FAILURE).await
            }
        }
    }

    async fn generate(&self, title: &str) -> anyhow::Result<GeneratedReport> {
        let request_id = Uuid::new_v4();
        let metadata = self.institution.metadata(title);
        let generator = self.generator.clone();
        info!(%request_id, title = %metadata.title, "report requested over chat");

        let report = tokio::task::spawn_blocking(move || generator.generate(request_id, metadata))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking failed in report generation: {e}"))??;
        Ok(report)
    }
}

/// True for `/name` and `/name@SomeBot`, with or without arguments.
fn is_command(text: &str, name: &str) -> bool {
    let Some(command) = text.strip_prefix('/') else {
        return false;
    };
    let command = command.split_whitespace().next().unwrap_or_default();
    let command = command.split('@').next().unwrap_or_default();
    command == name
}

/// Long-polls Telegram forever, handing each update to its own task.
pub async fn run_polling(client: TelegramClient, bot: Arc<ReportBot<TelegramClient>>) {
    info!("Telegram polling started");
    let mut offset: Option<i64> = None;

    loop {
        let updates = match client.get_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!(
                    "getUpdates failed, retrying after {}s: {e}",
                    POLL_ERROR_BACKOFF.as_secs()
                );
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            let bot = bot.clone();
            tokio::spawn(async move {
                let update_id = update.update_id;
                if let Err(e) = bot.handle_update(update).await {
                    warn!(update_id, "failed to answer update: {e}");
                }
            });
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
