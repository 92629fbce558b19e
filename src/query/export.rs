//! Export job launcher.
//!
//! Each export kind a screen declares gets one job with the life cycle
//! `Idle → Requested → Idle`. While requested, the job derives an
//! export-flavoured payload from the same inputs as the listing and runs it
//! through its own [`FetchGate`], so an export never waits on the listing query
//! and vice versa.
//!
//! Completion is one-shot: the transition back to idle consumes the requested
//! state and hands the artifact locator out exactly once. A replayed result
//! arriving afterwards finds no outstanding request and is discarded.

use super::deriver::{DeriveInputs, PayloadDeriver};
use super::fetch_gate::{FetchDescriptor, FetchGate, GateDecision, RequestSequence, Resolution};
use crate::domain::ExportFormat;
use crate::network::{ExportStatus, FetchRequest, FetchResponse, RequestOrigin};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default delay before re-polling an export whose result had no locator yet.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Name of an export flavour offered by a screen (`"csv"`, `"report"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportKind(String);

impl ExportKind {
    /// Wraps an export name as declared by a screen.
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// The export name, as sent in request origins and logs.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExportKind {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Result of feeding a response to the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The artifact is ready; run the fulfil side effect with `url` once.
    Fulfilled { kind: ExportKind, url: String },
    /// The request failed or the backend reported a failed job. Job is idle.
    Failed { kind: ExportKind, message: String },
    /// The result carried no locator yet. Job stays requested and re-polls.
    Incomplete { kind: ExportKind, retry_at: Instant },
}

/// Life cycle of one export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    Idle,
    /// `repoll_at` is set while waiting to re-poll an incomplete result.
    Requested { repoll_at: Option<Instant> },
}

#[derive(Debug, Clone)]
struct ExportJob {
    format: ExportFormat,
    state: JobState,
    gate: FetchGate,
}

/// Owns every export job of one screen.
///
/// Jobs are keyed by [`ExportKind`] and iterated in name order, so the order
/// of issued export requests is stable across runs.
#[derive(Debug, Clone)]
pub struct ExportLauncher {
    /// One job per declared export kind.
    jobs: BTreeMap<ExportKind, ExportJob>,

    /// Delay between an incomplete result and the next poll.
    poll_interval: Duration,
}

impl ExportLauncher {
    /// Creates a launcher with one idle job per declared export.
    ///
    /// # Parameters
    ///
    /// * `kinds` - Export names paired with the format stamped on their payloads
    /// * `poll_interval` - Delay before re-polling a result that had no locator
    ///   (usually [`DEFAULT_POLL_INTERVAL`])
    pub fn new<I>(kinds: I, poll_interval: Duration) -> Self
    where
        I: IntoIterator<Item = (ExportKind, ExportFormat)>,
    {
        let jobs = kinds
            .into_iter()
            .map(|(kind, format)| {
                let job = ExportJob {
                    format,
                    state: JobState::Idle,
                    gate: FetchGate::new(RequestOrigin::Export { kind: kind.clone() }),
                };
                (kind, job)
            })
            .collect();

        Self { jobs, poll_interval }
    }

    /// Moves `kind` from idle to requested.
    ///
    /// The request itself is issued by the next [`reconcile`](Self::reconcile).
    ///
    /// # Returns
    ///
    /// `true` if the job was idle and is now requested. `false` (and nothing
    /// changes) if the kind is unknown or an earlier request for it is still
    /// outstanding.
    pub fn request_export(&mut self, kind: &ExportKind) -> bool {
        let Some(job) = self.jobs.get_mut(kind) else {
            tracing::debug!(kind = %kind, "export kind not offered by this screen");
            return false;
        };
        if job.state != JobState::Idle {
            tracing::debug!(kind = %kind, "export already requested, ignoring");
            return false;
        }
        tracing::debug!(kind = %kind, format = %job.format, "export requested");
        job.state = JobState::Requested { repoll_at: None };
        true
    }

    /// Whether `kind` is between `request_export` and its completion.
    #[must_use]
    pub fn is_exporting(&self, kind: &ExportKind) -> bool {
        self.jobs
            .get(kind)
            .is_some_and(|job| matches!(job.state, JobState::Requested { .. }))
    }

    /// Kinds currently in the requested state.
    pub fn exporting(&self) -> impl Iterator<Item = &ExportKind> {
        self.jobs
            .iter()
            .filter(|(_, job)| matches!(job.state, JobState::Requested { .. }))
            .map(|(kind, _)| kind)
    }

    /// Every export kind this launcher knows, in name order.
    pub fn kinds(&self) -> impl Iterator<Item = &ExportKind> {
        self.jobs.keys()
    }

    /// Derives export payloads for requested jobs and collects the requests to send.
    ///
    /// Export gates always run enabled; the listing's enable flag does not
    /// apply to user-initiated exports. A job waiting to re-poll stays quiet
    /// until `now` reaches its deadline, then re-issues the same payload.
    ///
    /// # Parameters
    ///
    /// * `deriver` - The screen's deriver, used for readiness and projection
    /// * `inputs` - Current filters, search and sort (the page is pinned to 1)
    /// * `ids` - The screen's request id allocator
    /// * `now` - Current instant, compared against re-poll deadlines
    ///
    /// # Returns
    ///
    /// The requests to hand to the network collaborator, in kind order. Empty
    /// when no job is requested or the screen is not ready.
    pub fn reconcile(
        &mut self,
        deriver: &PayloadDeriver,
        inputs: &DeriveInputs<'_>,
        ids: &mut RequestSequence,
        now: Instant,
    ) -> Vec<FetchRequest> {
        let mut requests = Vec::new();

        for (kind, job) in &mut self.jobs {
            let JobState::Requested { repoll_at } = job.state else {
                continue;
            };
            if repoll_at.is_some_and(|at| now >= at) {
                tracing::debug!(kind = %kind, "re-polling incomplete export");
                job.gate.refresh();
                job.state = JobState::Requested { repoll_at: None };
            } else if repoll_at.is_some() {
                continue;
            }

            let payload = deriver.derive_export(inputs, job.format).map(Arc::new);
            if let GateDecision::Issue(request) = job.gate.execute(&FetchDescriptor::new(payload, true), ids) {
                requests.push(request);
            }
        }

        requests
    }

    /// Returns `true` if one of the export gates issued the request `response` answers.
    #[must_use]
    pub fn owns(&self, response: &FetchResponse) -> bool {
        self.jobs.values().any(|job| job.gate.owns(response.id))
    }

    /// Applies a response to the job that issued it.
    ///
    /// An explicit `status: failed` wins over a locator. A non-blank locator
    /// fulfils the job. A result with neither keeps the job requested and
    /// schedules a re-poll at `now + poll_interval`.
    ///
    /// # Parameters
    ///
    /// * `response` - Network response; matched to a job by request id
    /// * `now` - Current instant, the base for a re-poll deadline
    ///
    /// # Returns
    ///
    /// The job's [`ExportOutcome`], or `None` when no job is waiting for this
    /// response (stale or replayed). Only `Fulfilled` and `Failed` return the
    /// job to idle.
    pub fn resolve(&mut self, response: FetchResponse, now: Instant) -> Option<ExportOutcome> {
        let (kind, job) = self.jobs.iter_mut().find(|(_, job)| job.gate.owns(response.id))?;

        match job.gate.resolve(response) {
            Resolution::Discarded => None,
            Resolution::Failed(message) => {
                tracing::debug!(kind = %kind, error = %message, "export failed");
                Self::finish(job);
                Some(ExportOutcome::Failed { kind: kind.clone(), message })
            }
            Resolution::Applied => {
                let result = job.gate.data()?;
                if result.status == Some(ExportStatus::Failed) {
                    let message = result
                        .message
                        .clone()
                        .unwrap_or_else(|| format!("{kind} export failed"));
                    tracing::debug!(kind = %kind, error = %message, "backend reported failed export");
                    Self::finish(job);
                    return Some(ExportOutcome::Failed { kind: kind.clone(), message });
                }

                if let Some(url) = result.artifact_locator().map(String::from) {
                    tracing::debug!(kind = %kind, url = %url, "export artifact ready");
                    Self::finish(job);
                    return Some(ExportOutcome::Fulfilled { kind: kind.clone(), url });
                }

                let retry_at = now + self.poll_interval;
                tracing::debug!(kind = %kind, "export result has no locator yet");
                job.state = JobState::Requested { repoll_at: Some(retry_at) };
                Some(ExportOutcome::Incomplete { kind: kind.clone(), retry_at })
            }
        }
    }

    /// Earliest pending re-poll instant across all jobs.
    #[must_use]
    pub fn next_wake(&self) -> Option<Instant> {
        self.jobs
            .values()
            .filter_map(|job| match job.state {
                JobState::Requested { repoll_at } => repoll_at,
                JobState::Idle => None,
            })
            .min()
    }

    /// Returns every job to idle without running any side effect. Called on teardown.
    pub fn cancel_all(&mut self) {
        for job in self.jobs.values_mut() {
            Self::finish(job);
        }
    }

    fn finish(job: &mut ExportJob) {
        job.state = JobState::Idle;
        job.gate.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{names, FilterState};
    use crate::network::QueryResult;
    use crate::query::ReadinessGate;
    use crate::query::deriver::Capabilities;

    struct Fixture {
        deriver: PayloadDeriver,
        filters: FilterState,
        ids: RequestSequence,
        launcher: ExportLauncher,
        t0: Instant,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                deriver: PayloadDeriver::new(
                    ReadinessGate::new([names::TENANT]),
                    Vec::<String>::new(),
                    Capabilities::default(),
                ),
                filters: [(names::TENANT, "T1")].into_iter().collect(),
                ids: RequestSequence::default(),
                launcher: ExportLauncher::new(
                    [
                        (ExportKind::from("csv"), ExportFormat::Csv),
                        (ExportKind::from("report"), ExportFormat::Xlsx),
                    ],
                    Duration::from_millis(3000),
                ),
                t0: Instant::now(),
            }
        }

        fn reconcile_at(&mut self, now: Instant) -> Vec<FetchRequest> {
            let inputs = DeriveInputs {
                filters: &self.filters,
                page: 3,
                page_size: 10,
                search: None,
                sort_key: None,
            };
            self.launcher.reconcile(&self.deriver, &inputs, &mut self.ids, now)
        }

        fn reconcile(&mut self) -> Vec<FetchRequest> {
            self.reconcile_at(self.t0)
        }
    }

    fn with_url(url: &str) -> QueryResult {
        QueryResult {
            artifact_url: Some(url.to_string()),
            ..QueryResult::default()
        }
    }

    #[test]
    fn idle_jobs_issue_nothing() {
        let mut f = Fixture::new();
        assert!(f.reconcile().is_empty());
        assert!(!f.launcher.is_exporting(&"csv".into()));
    }

    #[test]
    fn requested_export_issues_marked_payload_once() {
        let mut f = Fixture::new();
        assert!(f.launcher.request_export(&"csv".into()));

        let requests = f.reconcile();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].payload.export_marker, Some(ExportFormat::Csv));
        assert_eq!(requests[0].payload.page, 1);
        assert!(f.reconcile().is_empty());
    }

    #[test]
    fn locator_fulfils_once_and_returns_to_idle() {
        let mut f = Fixture::new();
        let kind = ExportKind::from("csv");
        f.launcher.request_export(&kind);
        let request = f.reconcile().remove(0);

        let outcome = f
            .launcher
            .resolve(FetchResponse::data(request.id, with_url("https://files/x.csv")), f.t0);
        assert_eq!(
            outcome,
            Some(ExportOutcome::Fulfilled {
                kind: kind.clone(),
                url: "https://files/x.csv".to_string()
            })
        );
        assert!(!f.launcher.is_exporting(&kind));

        // A replay of the same result must not fulfil again.
        let replay = f
            .launcher
            .resolve(FetchResponse::data(request.id, with_url("https://files/x.csv")), f.t0);
        assert_eq!(replay, None);
    }

    #[test]
    fn duplicate_request_is_rejected_while_outstanding() {
        let mut f = Fixture::new();
        let kind = ExportKind::from("report");
        assert!(f.launcher.request_export(&kind));
        let first = f.reconcile();
        assert!(!f.launcher.request_export(&kind));
        assert!(f.reconcile().is_empty());
        assert_eq!(first.len(), 1);
        assert!(f.launcher.is_exporting(&kind));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let mut f = Fixture::new();
        assert!(!f.launcher.request_export(&"pdf".into()));
        assert_eq!(f.launcher.exporting().count(), 0);
    }

    #[test]
    fn failure_returns_to_idle_without_fulfilling() {
        let mut f = Fixture::new();
        let kind = ExportKind::from("csv");
        f.launcher.request_export(&kind);
        let request = f.reconcile().remove(0);

        let outcome = f.launcher.resolve(FetchResponse::error(request.id, "502"), f.t0);
        assert!(matches!(outcome, Some(ExportOutcome::Failed { .. })));
        assert!(!f.launcher.is_exporting(&kind));
        assert!(f.launcher.request_export(&kind));
    }

    #[test]
    fn explicit_failed_status_wins_over_locator() {
        let mut f = Fixture::new();
        let kind = ExportKind::from("csv");
        f.launcher.request_export(&kind);
        let request = f.reconcile().remove(0);

        let result = QueryResult {
            status: Some(ExportStatus::Failed),
            ..with_url("https://files/partial.csv")
        };
        let outcome = f.launcher.resolve(FetchResponse::data(request.id, result), f.t0);
        assert!(matches!(outcome, Some(ExportOutcome::Failed { .. })));
    }

    #[test]
    fn missing_locator_keeps_job_requested_and_repolls() {
        let mut f = Fixture::new();
        let kind = ExportKind::from("csv");
        f.launcher.request_export(&kind);
        let first = f.reconcile().remove(0);

        let outcome = f.launcher.resolve(FetchResponse::data(first.id, QueryResult::default()), f.t0);
        let retry_at = f.t0 + Duration::from_millis(3000);
        assert_eq!(outcome, Some(ExportOutcome::Incomplete { kind: kind.clone(), retry_at }));
        assert!(f.launcher.is_exporting(&kind));
        assert_eq!(f.launcher.next_wake(), Some(retry_at));

        assert!(f.reconcile_at(f.t0 + Duration::from_millis(1000)).is_empty());
        let second = f.reconcile_at(retry_at);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].payload, first.payload);
        assert_eq!(f.launcher.next_wake(), None);
    }

    #[test]
    fn cancel_all_returns_jobs_to_idle() {
        let mut f = Fixture::new();
        f.launcher.request_export(&"csv".into());
        let request = f.reconcile().remove(0);
        f.launcher.cancel_all();
        assert_eq!(f.launcher.exporting().count(), 0);
        assert_eq!(
            f.launcher.resolve(FetchResponse::data(request.id, with_url("u")), f.t0),
            None
        );
    }
}
