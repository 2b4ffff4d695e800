//! Telegram chat front-end. Enabled when `TELEGRAM_BOT_TOKEN` is set.

pub mod bot;
pub mod client;
pub mod messages;

pub use bot::{run_polling, ReportBot};
pub use client::TelegramClient;
