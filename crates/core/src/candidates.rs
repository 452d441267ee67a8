//! Candidate Builder: turns the raw listing into the ordered list of jobs
//! eligible for presentation.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::done_set::DoneSet;
use crate::fields::{self, detail, first_present, summary, Probe};
use crate::service::JobService;
use crate::types::{Candidate, JobDetail, JobId, JobSummary};

// ---------------------------------------------------------------------------
// Probe tables
// ---------------------------------------------------------------------------

const ID_PROBES: &[Probe] = &[
    summary(&["short_id"]),
    summary(&["shortId"]),
    summary(&["id"]),
];

/// Judged by the truthiness of the first present value, not of any value.
const ALREADY_ACTED_PROBES: &[Probe] = &[
    detail(&["_user_has_reposted"]),
    detail(&["user_has_reposted"]),
    summary(&["_user_has_reposted"]),
];

const ACTION_URL_PROBES: &[Probe] = &[
    detail(&["work_url"]),
    summary(&["tweet_url"]),
    summary(&["tweet_snapshot", "url"]),
    summary(&["work_url"]),
];

const REWARD_PROBES: &[Probe] = &[
    detail(&["reward_per_retweet_sol"]),
    detail(&["reward_per_retweet"]),
    detail(&["reward"]),
    detail(&["data", "reward_per_retweet_sol"]),
    summary(&["reward_per_retweet_sol"]),
];

const DISPLAY_NAME_PROBES: &[Probe] = &[
    summary(&["tweet_snapshot", "id"]),
    summary(&["title"]),
    summary(&["tweet_snapshot", "tweet_id"]),
    summary(&["name"]),
    summary(&["description"]),
];

const FALLBACK_DISPLAY_NAME: &str = "(no-title)";

/// Poster paths, tried against the detail first and then the summary.
const POSTER_PATHS: &[fields::FieldPath] = &[
    &["listed_by"],
    &["listedBy"],
    &["poster"],
    &["posted_by"],
    &["creator"],
    &["owner"],
    &["user", "username"],
    &["user", "name"],
    &["account", "username"],
    &["creator_username"],
    &["creator_handle"],
];

static NON_NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.]").expect("valid regex"));

static LEADING_DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+\.?\d*|\.\d+)").expect("valid regex"));

// ---------------------------------------------------------------------------
// Field resolution
// ---------------------------------------------------------------------------

/// Identifier of a listing entry. Numeric ids are rendered as decimals;
/// empty strings and zero are not identifiers.
pub fn resolve_id(job: &JobSummary) -> Option<JobId> {
    let empty = Value::Null;
    match first_present(&job.0, &empty, ID_PROBES)? {
        Value::String(s) if !s.is_empty() => Some(JobId::new(s.as_str())),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => {
            Some(JobId::new(n.to_string()))
        }
        _ => None,
    }
}

/// Whether the service says the operator already performed the action.
pub fn already_acted(job: &JobSummary, detail: &JobDetail) -> bool {
    first_present(&job.0, &detail.0, ALREADY_ACTED_PROBES).is_some_and(fields::is_truthy)
}

/// Action URL, detail first. The first present value decides: if it is
/// not a non-empty string there is no URL.
pub fn resolve_action_url(job: &JobSummary, detail: &JobDetail) -> Option<String> {
    first_present(&job.0, &detail.0, ACTION_URL_PROBES)
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
}

/// Reward amount from the first present reward field. Never fails.
pub fn resolve_reward(job: &JobSummary, detail: &JobDetail) -> f64 {
    parse_reward(first_present(&job.0, &detail.0, REWARD_PROBES))
}

/// Parse a reward value such as `"0.05 SOL"` or `0.05`.
///
/// Everything except digits and `.` is stripped, then the longest leading
/// decimal is parsed. Absent, unparseable or non-finite input yields 0.
pub fn parse_reward(raw: Option<&Value>) -> f64 {
    let text = match raw {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return 0.0,
    };
    let digits = NON_NUMERIC_RE.replace_all(&text, "");
    LEADING_DECIMAL_RE
        .find(&digits)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

/// Human-readable label taken from the listing entry.
pub fn resolve_display_name(job: &JobSummary) -> String {
    let empty = Value::Null;
    first_present(&job.0, &empty, DISPLAY_NAME_PROBES)
        .map(fields::display_text)
        .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string())
}

/// Who listed the job, if either record says.
pub fn resolve_poster(job: &JobSummary, detail: &JobDetail) -> Option<String> {
    [&detail.0, &job.0]
        .into_iter()
        .flat_map(|record| POSTER_PATHS.iter().map(move |path| (record, *path)))
        .find_map(|(record, path)| fields::lookup(record, path))
        .map(fields::display_text)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the ordered candidate list for one listing.
///
/// Listing order is kept as is; the first element is the newest candidate.
/// An id listed twice yields two candidates; only the Done Set filters.
/// Jobs the service reports as already acted upon are added to `done` even
/// though they are left out of the output. A job without a resolvable
/// action URL is skipped without being marked done. A failed detail fetch
/// degrades that job to summary-only fields.
pub async fn build_candidates(
    service: &dyn JobService,
    jobs: &[JobSummary],
    done: &mut DoneSet,
) -> Vec<Candidate> {
    let mut out = Vec::new();

    for job in jobs {
        let Some(id) = resolve_id(job) else {
            continue;
        };
        if done.contains(&id) {
            continue;
        }

        let detail = match service.job_detail(&id).await {
            Ok(Some(detail)) => detail,
            Ok(None) => JobDetail::empty(),
            Err(e) => {
                tracing::debug!(
                    job_id = %id,
                    error = %e,
                    "Detail fetch failed, using summary only"
                );
                JobDetail::empty()
            }
        };

        if already_acted(job, &detail) {
            tracing::debug!(job_id = %id, "Already acted upon, marking done");
            done.insert(id);
            continue;
        }

        let Some(action_url) = resolve_action_url(job, &detail) else {
            tracing::debug!(job_id = %id, "No action URL yet, skipping");
            continue;
        };

        out.push(Candidate {
            display_name: resolve_display_name(job),
            reward: resolve_reward(job, &detail),
            poster: resolve_poster(job, &detail),
            action_url,
            id,
        });
    }

    out
}
