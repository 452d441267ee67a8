//! HTTP client for the job service.
//!
//! - [`WurkApi`] — [`reqwest`]-backed implementation of
//!   [`wurk_core::JobService`].
//! - [`Credentials`] — session cookie and XSRF token loading at startup.

pub mod api;
pub mod credentials;

pub use api::{ClientError, WurkApi, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
pub use credentials::{Credentials, CredentialsError, DEFAULT_COOKIE_FILE};
