//! Job Selector: owns the single active-job slot and the Done Set.
//!
//! Lifecycle of a job:
//!
//! ```text
//! Idle --offer--> Presenting --confirmation--> Verifying --> Idle
//! ```
//!
//! The poll loop calls [`JobSelector::poll_cycle`] on every tick. When a
//! job is promoted, the confirmation wait and verification sequence run on
//! a spawned task so the poll loop keeps its cadence. Every mutation of the
//! shared state happens under one short-lived lock; no lock is held across
//! a call to the job service or the presentation sink.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::candidates::build_candidates;
use crate::done_set::DoneSet;
use crate::error::ServiceError;
use crate::fields::any_truthy;
use crate::service::{JobService, PresentationSink};
use crate::types::{Candidate, JobId};

/// Fields of the verify-retweet response that signal success.
const RETWEET_CONFIRMED_FIELDS: &[&str] = &["ok", "verified", "success", "retweet_verified"];

/// Fields of the verify-status response that signal success.
const STATUS_VERIFIED_FIELDS: &[&str] = &[
    "verified",
    "is_verified",
    "user_has_reposted",
    "_user_has_reposted",
    "ok",
    "retweet_verified",
];

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Where the active-job slot currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum DeskPhase {
    Idle,
    /// Shown to the operator, waiting for the confirmation signal.
    Presenting(Candidate),
    /// Confirmation received, verification calls in flight.
    Verifying(Candidate),
}

impl DeskPhase {
    pub fn active(&self) -> Option<&Candidate> {
        match self {
            DeskPhase::Idle => None,
            DeskPhase::Presenting(c) | DeskPhase::Verifying(c) => Some(c),
        }
    }
}

#[derive(Debug)]
struct DeskState {
    phase: DeskPhase,
    last_shown: Option<JobId>,
    done: DoneSet,
}

/// Point-in-time view for the heartbeat.
#[derive(Debug, Clone, PartialEq)]
pub struct DeskSnapshot {
    pub active: Option<JobId>,
    pub verifying: bool,
    pub done_count: usize,
}

/// Result of one poll cycle.
#[derive(Debug)]
pub struct PollOutcome {
    pub candidate_count: usize,
    /// Confirmation/verification task for a job promoted in this cycle.
    pub promoted: Option<JoinHandle<Option<VerificationReport>>>,
}

/// What the service said about the two verification calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub retweet_confirmed: bool,
    pub verified: bool,
}

/// Summary of one confirmation → verification → cleanup run.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub job_id: JobId,
    /// `None` when the sequence aborted on an error.
    pub verification: Option<Verification>,
    pub idle_announced: bool,
}

// ---------------------------------------------------------------------------
// JobSelector
// ---------------------------------------------------------------------------

pub struct JobSelector {
    service: Arc<dyn JobService>,
    sink: Arc<dyn PresentationSink>,
    state: Mutex<DeskState>,
}

impl JobSelector {
    pub fn new(service: Arc<dyn JobService>, sink: Arc<dyn PresentationSink>) -> Self {
        Self {
            service,
            sink,
            state: Mutex::new(DeskState {
                phase: DeskPhase::Idle,
                last_shown: None,
                done: DoneSet::new(),
            }),
        }
    }

    pub async fn snapshot(&self) -> DeskSnapshot {
        let state = self.state.lock().await;
        DeskSnapshot {
            active: state.phase.active().map(|c| c.id.clone()),
            verifying: matches!(state.phase, DeskPhase::Verifying(_)),
            done_count: state.done.len(),
        }
    }

    pub async fn phase(&self) -> DeskPhase {
        self.state.lock().await.phase.clone()
    }

    pub async fn is_done(&self, id: &JobId) -> bool {
        self.state.lock().await.done.contains(id)
    }

    /// One poll cycle: list, build, offer the newest candidate.
    ///
    /// A promotion spawns the confirmation task and hands its handle back.
    pub async fn poll_cycle(self: &Arc<Self>) -> Result<PollOutcome, ServiceError> {
        let candidates = self.fetch_candidates().await?;
        let mut promoted = None;
        if let Some(newest) = candidates.first() {
            if self.offer(newest).await {
                let selector = Arc::clone(self);
                promoted = Some(tokio::spawn(async move { selector.confirm_and_verify().await }));
            }
        }

        Ok(PollOutcome {
            candidate_count: candidates.len(),
            promoted,
        })
    }

    /// Fetch the listing and build candidates against the current Done Set.
    ///
    /// Authorization and HTTP-status failures on the listing degrade to an
    /// empty listing. Transport failures are returned.
    pub async fn fetch_candidates(&self) -> Result<Vec<Candidate>, ServiceError> {
        let jobs = match self.service.list_open_jobs().await {
            Ok(jobs) => jobs,
            Err(ServiceError::Unauthorized { status }) => {
                tracing::warn!(
                    status,
                    "Job listing unauthorized, session cookie expired or invalid"
                );
                Vec::new()
            }
            Err(ServiceError::HttpStatus { status }) => {
                tracing::warn!(status, "Job listing failed");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let mut done = self.state.lock().await.done.clone();
        let candidates = build_candidates(self.service.as_ref(), &jobs, &mut done).await;
        self.state.lock().await.done.merge(done);

        Ok(candidates)
    }

    /// `Idle -> Presenting` for `newest`, if allowed.
    ///
    /// Refused while a job is active, and for the job that was last shown.
    /// Returns whether the job was promoted.
    pub async fn offer(&self, newest: &Candidate) -> bool {
        {
            let mut state = self.state.lock().await;
            if state.phase.active().is_some() || state.last_shown.as_ref() == Some(&newest.id) {
                return false;
            }
            state.last_shown = Some(newest.id.clone());
            state.phase = DeskPhase::Presenting(newest.clone());
        }

        tracing::info!(
            job_id = %newest.id,
            reward = newest.reward,
            url = %newest.action_url,
            "Active job promoted",
        );

        self.sink.present(newest).await;
        if self.sink.copy_to_clipboard(&newest.action_url).await {
            tracing::info!(job_id = %newest.id, "Action URL copied to clipboard");
        } else {
            tracing::warn!(job_id = %newest.id, "Failed to copy action URL to clipboard");
        }
        self.sink.notify(&notification_text(newest)).await;

        true
    }

    /// Wait for the operator, verify, then return to `Idle`.
    ///
    /// Returns `None` if the confirmation arrived with no job presenting.
    pub async fn confirm_and_verify(&self) -> Option<VerificationReport> {
        self.sink.wait_for_confirmation().await;

        let candidate = {
            let mut state = self.state.lock().await;
            match std::mem::replace(&mut state.phase, DeskPhase::Idle) {
                DeskPhase::Presenting(c) => {
                    state.phase = DeskPhase::Verifying(c.clone());
                    c
                }
                other => {
                    state.phase = other;
                    tracing::debug!("Confirmation with no job presenting, ignored");
                    return None;
                }
            }
        };

        tracing::info!(job_id = %candidate.id, "Confirmation received, verifying");

        let verification = match self.verify(&candidate).await {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::error!(job_id = %candidate.id, error = %e, "Verification failed");
                None
            }
        };

        {
            let mut state = self.state.lock().await;
            if verification.is_some_and(|v| v.verified) {
                state.done.insert(candidate.id.clone());
            }
            state.phase = DeskPhase::Idle;
        }

        let idle_announced = self.announce_if_exhausted().await;

        Some(VerificationReport {
            job_id: candidate.id,
            verification,
            idle_announced,
        })
    }

    /// The two-call verification sequence, run once per confirmation.
    ///
    /// An authorization failure on either call means that check could not be
    /// made and counts as "not confirmed". Any other error aborts.
    async fn verify(&self, candidate: &Candidate) -> Result<Verification, ServiceError> {
        let id = &candidate.id;

        let retweet = self.service.verify_retweet(id).await;
        let retweet = allow_unauthorized(retweet, id, "verify-retweet")?;
        let retweet_confirmed = confirmed(retweet.as_ref(), RETWEET_CONFIRMED_FIELDS);
        if retweet_confirmed {
            tracing::info!(job_id = %id, "Verify-retweet confirmed");
        } else {
            tracing::warn!(job_id = %id, "Verify-retweet not confirmed");
        }

        let status = self.service.verify_status(id).await;
        let status = allow_unauthorized(status, id, "verify-status")?;
        let verified = confirmed(status.as_ref(), STATUS_VERIFIED_FIELDS);
        tracing::info!(job_id = %id, verified, "Verify-status checked");

        if verified && candidate.reward > 0.0 {
            tracing::info!(
                job_id = %id,
                reward = candidate.reward,
                "Reward credited: +{} SOL",
                candidate.reward
            );
        }

        Ok(Verification {
            retweet_confirmed,
            verified,
        })
    }

    /// Immediate rebuild after clearing the slot. Announces idle only when
    /// no candidate remains; a failing rebuild stays silent.
    async fn announce_if_exhausted(&self) -> bool {
        match self.fetch_candidates().await {
            Ok(candidates) if candidates.is_empty() => {
                tracing::info!("All jobs done, waiting for new jobs");
                self.sink.announce_idle().await;
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::debug!(error = %e, "Idle check rebuild failed");
                false
            }
        }
    }
}

fn allow_unauthorized(
    result: Result<Option<Value>, ServiceError>,
    id: &JobId,
    call: &'static str,
) -> Result<Option<Value>, ServiceError> {
    match result {
        Err(ServiceError::Unauthorized { status }) => {
            tracing::warn!(job_id = %id, status, call, "Verification call unauthorized");
            Ok(None)
        }
        other => other,
    }
}

fn confirmed(body: Option<&Value>, fields: &[&str]) -> bool {
    body.is_some_and(|b| any_truthy(b, fields))
}

/// Text of the external notification sent when a job becomes active.
pub fn notification_text(candidate: &Candidate) -> String {
    [
        "New job detected".to_string(),
        format!("ID: {}", candidate.id),
        format!("Reward: {} SOL", candidate.reward),
        format!("URL: {}", candidate.action_url),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate() -> Candidate {
        Candidate {
            id: JobId::from("A"),
            display_name: "hello".into(),
            reward: 0.05,
            action_url: "https://x/1".into(),
            poster: None,
        }
    }

    #[test]
    fn notification_lists_id_reward_and_url() {
        let text = notification_text(&candidate());
        assert_eq!(
            text,
            "New job detected\nID: A\nReward: 0.05 SOL\nURL: https://x/1"
        );
    }

    #[test]
    fn phase_exposes_active_candidate() {
        assert!(DeskPhase::Idle.active().is_none());
        assert_eq!(
            DeskPhase::Verifying(candidate()).active().map(|c| c.id.clone()),
            Some(JobId::from("A"))
        );
    }

    #[test]
    fn absent_body_is_not_confirmed() {
        assert!(!confirmed(None, RETWEET_CONFIRMED_FIELDS));
        assert!(!confirmed(Some(&json!({"ok": false})), RETWEET_CONFIRMED_FIELDS));
        assert!(confirmed(Some(&json!({"is_verified": 1})), STATUS_VERIFIED_FIELDS));
    }

    #[test]
    fn unauthorized_verification_call_degrades_to_absent() {
        let id = JobId::from("A");
        let unauthorized = Err(ServiceError::Unauthorized { status: 403 });
        let result = allow_unauthorized(unauthorized, &id, "verify-status");
        assert!(matches!(result, Ok(None)));

        let reset = Err(ServiceError::Transport("reset".into()));
        let result = allow_unauthorized(reset, &id, "verify-status");
        assert!(matches!(result, Err(ServiceError::Transport(_))));
    }
}
