//! Homework API and Telegram client modules
//!
//! The API client, the notifier and the poll loop are split so each can be
//! tested against a mock server on its own.

pub mod api;
pub mod config;
pub mod error;
pub mod poller;
pub mod telegram;

// Re-export main types for convenience
pub use api::HomeworkApi;
pub use error::ClientError;
pub use poller::HomeworkPoller;
pub use telegram::TelegramNotifier;
