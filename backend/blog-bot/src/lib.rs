//! Blog Bot
//!
//! Telegram front-end for the blog API.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `client` - HTTP client for the blog API
//! - `dialogue` - Per-chat conversation state machine
//! - `session` - In-memory tokens and dialogue state
//! - `keyboards` - Reply menu, inline buttons, callback data
//! - `render` - Post and error text
//! - `handlers` - Update handlers and dispatcher

pub mod client;
pub mod config;
pub mod dialogue;
pub mod handlers;
pub mod keyboards;
pub mod render;
pub mod session;

pub use config::BotConfig;
