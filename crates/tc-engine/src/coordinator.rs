//! Background run coordinator.
//!
//! One run at a time, system wide: [`RunGuard`] is a compare-and-swap flag
//! shared by every coordinator built from it. An accepted run executes the
//! classification and execution passes on a blocking worker task and reports
//! through a [`RunHandle`]: zero or more chunk events, then exactly one
//! terminal event. The guard is released before the terminal event is sent.

use crate::classifier::Classifier;
use crate::error::{EngineError, EngineResult};
use crate::executor::Executor;
use crate::lifecycle::RunLifecycle;
use crate::progress::{ChunkProgress, RunControl};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tc_core::{Config, RunVersion, Tally, TripId, UserId};
use tc_db::{trips, TripDb};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Notification from a background run
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    ChunkCompleted(ChunkProgress),
    Completed {
        trip_id: TripId,
        run_version: RunVersion,
        tally: Tally,
    },
    /// `run_version` is `None` when the run stopped during classification
    Canceled {
        trip_id: TripId,
        run_version: Option<RunVersion>,
    },
    Failed {
        trip_id: TripId,
        message: String,
    },
}

impl RunEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunEvent::ChunkCompleted(_))
    }
}

#[derive(Debug, Default)]
struct GuardState {
    in_progress: AtomicBool,
    cancel: AtomicBool,
}

/// Single-flight flag plus cancellation request for background runs.
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    state: Arc<GuardState>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.state.in_progress.load(Ordering::SeqCst)
    }

    /// Ask the active run to stop before its next check. Returns false when
    /// no run is active.
    pub fn request_cancel(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state.cancel.store(true, Ordering::SeqCst);
        true
    }

    fn try_acquire(&self) -> Option<RunSlot> {
        self.state
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        self.state.cancel.store(false, Ordering::SeqCst);
        Some(RunSlot {
            state: Arc::clone(&self.state),
        })
    }
}

/// Held by the worker for the lifetime of a run.
struct RunSlot {
    state: Arc<GuardState>,
}

impl RunSlot {
    fn cancel_flag(&self) -> &AtomicBool {
        &self.state.cancel
    }
}

impl Drop for RunSlot {
    fn drop(&mut self) {
        self.state.in_progress.store(false, Ordering::SeqCst);
    }
}

/// Everything a finished run reported
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub chunks: Vec<ChunkProgress>,
    /// `None` only if the worker died without reporting
    pub terminal: Option<RunEvent>,
}

/// Receiving end of an accepted run.
pub struct RunHandle {
    pub trip_id: TripId,
    events: mpsc::UnboundedReceiver<RunEvent>,
    join: JoinHandle<()>,
}

impl RunHandle {
    /// Next event, or `None` once the terminal event has been consumed.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Drain all events and join the worker.
    pub async fn finish(mut self) -> RunOutcome {
        let mut chunks = Vec::new();
        let mut terminal = None;
        while let Some(event) = self.events.recv().await {
            match event {
                RunEvent::ChunkCompleted(progress) => chunks.push(progress),
                other => terminal = Some(other),
            }
        }
        if let Err(e) = self.join.await {
            log::error!("Run worker for trip {} did not finish cleanly: {e}", self.trip_id);
        }
        RunOutcome { chunks, terminal }
    }
}

/// Starts and cancels background trip check runs.
pub struct RunCoordinator {
    db: Arc<TripDb>,
    config: Arc<Config>,
    guard: RunGuard,
}

impl RunCoordinator {
    pub fn new(db: Arc<TripDb>, config: Arc<Config>, guard: RunGuard) -> Self {
        Self { db, config, guard }
    }

    pub fn guard(&self) -> &RunGuard {
        &self.guard
    }

    /// Request cancellation of the active run, if any.
    pub fn cancel_run(&self) -> bool {
        let requested = self.guard.request_cancel();
        if requested {
            log::info!("Cancellation requested for the active trip check run");
        }
        requested
    }

    /// Validate the request and start the run in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_run(&self, trip_id: TripId, user_id: UserId) -> EngineResult<RunHandle> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        if !self.db.with_conn(|conn| trips::exists(conn, trip_id))? {
            return Err(EngineError::InvalidTrip(trip_id));
        }
        if self.config.run.require_classified_catalog
            && !Classifier::new(&self.db, &self.config).is_catalog_classified()?
        {
            return Err(EngineError::CatalogNotClassified);
        }
        let slot = self
            .guard
            .try_acquire()
            .ok_or(EngineError::RunAlreadyInProgress)?;

        log::info!("Starting trip check run for trip {trip_id}");
        let (tx, rx) = mpsc::unbounded_channel();
        let db = Arc::clone(&self.db);
        let config = Arc::clone(&self.config);
        let join = runtime.spawn_blocking(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                run_pipeline(&db, &config, trip_id, user_id, slot.cancel_flag(), &tx)
            }));
            let terminal = match result {
                Ok(Ok(event)) => event,
                Ok(Err(e)) => {
                    log::error!("Trip check run for trip {trip_id} failed: {e}");
                    RunEvent::Failed {
                        trip_id,
                        message: e.to_string(),
                    }
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    log::error!("Trip check run for trip {trip_id} panicked: {message}");
                    RunEvent::Failed { trip_id, message }
                }
            };
            drop(slot);
            // The receiver may already be gone
            let _ = tx.send(terminal);
        });

        Ok(RunHandle {
            trip_id,
            events: rx,
            join,
        })
    }
}

fn run_pipeline(
    db: &TripDb,
    config: &Config,
    trip_id: TripId,
    user_id: UserId,
    cancel: &AtomicBool,
    events: &mpsc::UnboundedSender<RunEvent>,
) -> EngineResult<RunEvent> {
    let mut control = RunControl::new(config.run.chunk_size)
        .with_cancel(cancel)
        .with_progress(|progress| {
            let _ = events.send(RunEvent::ChunkCompleted(progress));
        });

    let pass = Classifier::new(db, config).classify_catalog(false, &mut control)?;
    if pass.canceled {
        return Ok(RunEvent::Canceled {
            trip_id,
            run_version: None,
        });
    }

    let report = Executor::new(db, config).execute(trip_id, user_id, &mut control)?;
    let lifecycle = RunLifecycle::new(db);
    if report.canceled {
        lifecycle.cancel(trip_id, &report.run_version)?;
        return Ok(RunEvent::Canceled {
            trip_id,
            run_version: Some(report.run_version),
        });
    }

    lifecycle.complete(trip_id, &report.run_version)?;
    Ok(RunEvent::Completed {
        trip_id,
        run_version: report.run_version,
        tally: report.tally,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
