//! Job discovery, deduplication and the active-job state machine.
//!
//! - [`candidates`] — builds the ordered candidate list from a listing.
//! - [`selector`] — [`JobSelector`], the single active-job slot and its
//!   confirmation → verification lifecycle.
//! - [`service`] — capability traits for the remote job service and the
//!   operator-facing sink.
//! - [`fields`] — ordered field probing over generic JSON responses.

pub mod candidates;
pub mod done_set;
pub mod error;
pub mod fields;
pub mod selector;
pub mod service;
pub mod types;

pub use candidates::build_candidates;
pub use done_set::DoneSet;
pub use error::ServiceError;
pub use selector::{
    DeskPhase, DeskSnapshot, JobSelector, PollOutcome, Verification, VerificationReport,
};
pub use service::{JobService, PresentationSink};
pub use types::{Candidate, JobDetail, JobId, JobSummary};
