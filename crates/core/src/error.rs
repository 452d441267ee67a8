/// Failure classes reported by a [`JobService`](crate::service::JobService).
///
/// None of them is fatal to the process. Callers decide per call site
/// whether a variant degrades to "no data" or ends the current cycle.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Unauthorized ({status}): credentials rejected or expired")]
    Unauthorized { status: u16 },

    #[error("Job service returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ServiceError {
    /// Map an HTTP status to the authorization class, if it is one.
    ///
    /// Both 401 and 403 mean the session cookie is no longer accepted.
    pub fn from_auth_status(status: u16) -> Option<Self> {
        matches!(status, 401 | 403).then_some(Self::Unauthorized { status })
    }
}
