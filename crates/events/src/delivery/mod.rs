//! External delivery channels for operator notifications.

pub mod telegram;
