//! Session credentials for the job service.
//!
//! Two sources, tried in order: a browser cookie export (JSON array of
//! `{name, value}` objects) and a raw `Cookie` header string. The XSRF token
//! travels both as a cookie and as the `X-XSRF-TOKEN` header.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Cookie export looked up in the working directory by default.
pub const DEFAULT_COOKIE_FILE: &str = "cookies_wurk.json";

const XSRF_COOKIE: &str = "XSRF-TOKEN";
const SESSION_COOKIE: &str = "wurk.sid";

static XSRF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|;\s*)XSRF-TOKEN=([^;]+)").expect("valid regex"));

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("No session cookie: provide {} or set WURK_COOKIE", cookie_file.display())]
    Missing { cookie_file: PathBuf },
}

/// Cookie header plus the XSRF token echoed back on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub cookie: String,
    pub xsrf: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cookie", &"<redacted>")
            .field("xsrf", &self.xsrf.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials from the cookie file, falling back to the raw
    /// cookie string (usually `WURK_COOKIE`).
    pub fn load(cookie_file: &Path, cookie_header: Option<&str>) -> Result<Self, CredentialsError> {
        Self::from_cookie_file(cookie_file)
            .or_else(|| cookie_header.and_then(Self::from_cookie_header))
            .ok_or_else(|| CredentialsError::Missing {
                cookie_file: cookie_file.to_path_buf(),
            })
    }

    /// Read a browser cookie export. Both the XSRF and session cookies must
    /// be present; anything unreadable yields `None`.
    pub fn from_cookie_file(path: &Path) -> Option<Self> {
        let raw = std::fs::read_to_string(path).ok()?;
        let entries: Vec<Value> = serde_json::from_str(&raw).ok()?;

        let cookie_value = |wanted: &str| {
            entries.iter().find_map(|entry| {
                let name = entry.get("name")?.as_str()?;
                let value = entry.get("value")?.as_str()?;
                (name == wanted && !value.is_empty()).then(|| value.to_string())
            })
        };

        let xsrf = cookie_value(XSRF_COOKIE)?;
        let session = cookie_value(SESSION_COOKIE)?;
        Some(Self {
            cookie: format!("{XSRF_COOKIE}={xsrf}; {SESSION_COOKIE}={session}"),
            xsrf: Some(xsrf),
        })
    }

    /// Use a raw `Cookie` header value. Blank input yields `None`.
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        let cookie = header.trim();
        if cookie.is_empty() {
            return None;
        }
        Some(Self {
            cookie: cookie.to_string(),
            xsrf: xsrf_from_cookie_header(cookie),
        })
    }
}

/// Extract and percent-decode the XSRF token from a cookie header. The raw
/// value is kept when it is not valid percent-encoding.
pub fn xsrf_from_cookie_header(cookie: &str) -> Option<String> {
    let raw = XSRF_RE.captures(cookie)?.get(1)?.as_str();
    Some(percent_decode(raw).unwrap_or_else(|| raw.to_string()))
}

fn percent_decode(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
