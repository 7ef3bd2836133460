// src/directory/mod.rs
//! Job directory adapter: the only component that performs I/O.
//!
//! Every change publishes a brand-new `JobDirectorySnapshot` through a watch
//! channel, so readers never see a half-updated collection. Each `fetch_all`
//! carries a request token; a completion whose token is no longer the latest
//! started one is discarded.

pub mod api;

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::filter::FilterState;
use crate::normalizer::{normalize, normalize_batch};
use crate::session::Session;
use crate::types::{
    Applicant, ApplicantList, Application, ApplicationReceipt, ApplicationStatus, JobRecord, NewJob,
};

pub use api::JobDirectoryApi;

#[derive(Debug, Clone, PartialEq)]
pub struct JobDirectorySnapshot {
    pub records: Arc<[JobRecord]>,
    /// Set only while a `fetch_all` is outstanding; other calls are tracked by `JobDirectory::is_busy`
    pub is_loading: bool,
    pub last_error: Option<Error>,
    /// Token of the fetch that produced `records`; 0 before the first fetch
    pub generation: u64,
    /// Records the normalizer rejected in that fetch
    pub dropped: usize,
}

impl Default for JobDirectorySnapshot {
    fn default() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            is_loading: false,
            last_error: None,
            generation: 0,
            dropped: 0,
        }
    }
}

impl JobDirectorySnapshot {
    pub fn from_records(records: Vec<JobRecord>) -> Self {
        Self {
            records: records.into(),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&JobRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

struct BusyGuard<'a>(&'a AtomicUsize);

impl<'a> BusyGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct JobDirectory<A> {
    api: A,
    session: Arc<Session>,
    snapshot: watch::Sender<Arc<JobDirectorySnapshot>>,
    next_token: AtomicU64,
    latest_token: AtomicU64,
    in_flight: AtomicUsize,
}

impl<A: JobDirectoryApi> JobDirectory<A> {
    pub fn new(api: A, session: Arc<Session>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(JobDirectorySnapshot::default()));
        Self {
            api,
            session,
            snapshot,
            next_token: AtomicU64::new(0),
            latest_token: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> Arc<JobDirectorySnapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    /// Receiver notified on every wholesale snapshot replacement
    pub fn subscribe(&self) -> watch::Receiver<Arc<JobDirectorySnapshot>> {
        self.snapshot.subscribe()
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// True while any non-listing call is outstanding
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Refresh the snapshot. Returns the snapshot readers should display, which
    /// is not this fetch's result when a later fetch superseded it.
    pub async fn fetch_all(&self, filters: Option<&FilterState>) -> Result<Arc<JobDirectorySnapshot>> {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest_token.fetch_max(token, Ordering::SeqCst);
        self.snapshot.send_modify(|current| {
            *current = Arc::new(JobDirectorySnapshot {
                is_loading: true,
                ..(**current).clone()
            });
        });

        let params = filters.map(FilterState::server_params).unwrap_or_default();
        debug!("Fetching jobs (request {}) with {} params", token, params.len());

        match self.api.list_jobs(&params).await {
            Ok(raws) => {
                let batch = normalize_batch(&raws);
                let applied = self.snapshot.send_if_modified(|current| {
                    if !self.is_latest(token) {
                        return false;
                    }
                    *current = Arc::new(JobDirectorySnapshot {
                        records: batch.records.into(),
                        is_loading: false,
                        last_error: None,
                        generation: token,
                        dropped: batch.dropped,
                    });
                    true
                });

                if applied {
                    info!("Loaded {} jobs (request {})", self.snapshot.borrow().len(), token);
                } else {
                    debug!("Discarding stale job list from request {}", token);
                }
                Ok(self.snapshot())
            }
            Err(err) => {
                self.handle_auth(&err);
                let failure = err.clone();
                let applied = self.snapshot.send_if_modified(|current| {
                    if !self.is_latest(token) {
                        return false;
                    }
                    *current = Arc::new(JobDirectorySnapshot {
                        is_loading: false,
                        last_error: Some(failure),
                        ..(**current).clone()
                    });
                    true
                });

                if applied {
                    warn!("Job list request {} failed: {}", token, err);
                } else {
                    debug!("Ignoring failure of stale request {}: {}", token, err);
                }
                Err(err)
            }
        }
    }

    /// Supersede every in-flight `fetch_all`; their results will be ignored
    pub fn cancel(&self) {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest_token.fetch_max(token, Ordering::SeqCst);
        self.snapshot.send_if_modified(|current| {
            if !current.is_loading {
                return false;
            }
            *current = Arc::new(JobDirectorySnapshot {
                is_loading: false,
                ..(**current).clone()
            });
            true
        });
        debug!("Cancelled job list requests up to {}", token);
    }

    pub async fn fetch_by_id(&self, id: &str) -> Result<JobRecord> {
        let _busy = BusyGuard::enter(&self.in_flight);
        let result = match self.api.get_job(id).await {
            Ok(raw) => normalize(&raw).map_err(Error::from),
            Err(e) => Err(e),
        };
        self.settle(result)
    }

    pub async fn create(&self, job: &NewJob) -> Result<JobRecord> {
        let job = job.clone().canonicalize()?;
        let _busy = BusyGuard::enter(&self.in_flight);
        let result = match self.api.create_job(&job).await {
            Ok(raw) => normalize(&raw).map_err(Error::from),
            Err(e) => Err(e),
        };
        if let Ok(record) = &result {
            info!("Created job {} '{}'", record.id, record.title);
        }
        self.settle(result)
    }

    pub async fn update(&self, id: &str, job: &NewJob) -> Result<JobRecord> {
        let job = job.clone().canonicalize()?;
        let _busy = BusyGuard::enter(&self.in_flight);
        let result = match self.api.update_job(id, &job).await {
            Ok(raw) => normalize(&raw).map_err(Error::from),
            Err(e) => Err(e),
        };
        self.settle(result)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let _busy = BusyGuard::enter(&self.in_flight);
        let result = self.api.delete_job(id).await;
        if result.is_ok() {
            info!("Deleted job {}", id);
        }
        self.settle(result)
    }

    pub async fn apply(&self, id: &str, application: &Application) -> Result<ApplicationReceipt> {
        let _busy = BusyGuard::enter(&self.in_flight);
        let result = self.api.apply(id, application).await;
        if let Ok(receipt) = &result {
            info!("Application for job {} is {}", id, receipt.status);
        }
        self.settle(result)
    }

    pub async fn applicants(&self, id: &str) -> Result<ApplicantList> {
        let _busy = BusyGuard::enter(&self.in_flight);
        let result = self.api.applicants(id).await;
        self.settle(result)
    }

    /// Move a candidate to another review stage
    pub async fn update_application_status(
        &self,
        job_id: &str,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<Applicant> {
        let _busy = BusyGuard::enter(&self.in_flight);
        let result = self
            .api
            .update_application_status(job_id, application_id, status)
            .await;
        if result.is_ok() {
            info!(
                "Application {} for job {} is now {}",
                application_id,
                job_id,
                status.code()
            );
        }
        self.settle(result)
    }

    fn is_latest(&self, token: u64) -> bool {
        self.latest_token.load(Ordering::SeqCst) == token
    }

    /// Record a failed call as `last_error`, keeping the current records
    fn settle<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.handle_auth(err);
            let failure = err.clone();
            self.snapshot.send_modify(|current| {
                *current = Arc::new(JobDirectorySnapshot {
                    last_error: Some(failure),
                    ..(**current).clone()
                });
            });
        }
        result
    }

    fn handle_auth(&self, err: &Error) {
        if matches!(err, Error::Auth { .. }) {
            self.session.expire();
        }
    }
}
