//! Operator-side agent: configuration, clipboard, terminal desk and the
//! poll loop that drives [`wurk_core::JobSelector`].

pub mod clipboard;
pub mod config;
pub mod console;
pub mod poller;
