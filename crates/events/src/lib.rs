//! Outbound notification delivery.
//!
//! - [`delivery::telegram`] — Telegram Bot API `sendMessage` channel,
//!   configured from the environment and disabled unless opted in.

pub mod delivery;

pub use delivery::telegram::{TelegramConfig, TelegramDelivery, TelegramError};
