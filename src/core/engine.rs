//! Scheduler engines: pull eligible flights and dispatch them onto runways.
//!
//! Each engine runs the cycle
//!
//! ```text
//! WaitingForWork -> Evaluating -> NoneEligible -> WaitingForWork
//!                            \-> Dequeued -> WaitingForRunway -> Assigning -> Dispatched
//! ```
//!
//! with these ordering rules:
//!
//! - the state lock is never held while waiting on a permit;
//! - free capacity is returned right after a dequeue, before the runway wait;
//! - a runway permit is taken before any runway slot is claimed;
//! - an engine that finds nothing eligible hands its pending unit back and
//!   sleeps until the state changes;
//! - an engine that holds a runway permit but finds every slot taken rolls
//!   the flight back and sleeps until some runway is vacated.
//!
//! Workers are spawned into a per-engine [`JoinSet`] and reaped
//! opportunistically; [`EngineHandle::shutdown`] drains or cancels them.

use std::future::Future;

use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::airfield::Airfield;
use crate::core::runway::ReleaseOutcome;
use crate::core::worker::{occupy_runway, OccupancyReport, RunwayAssignment};
use crate::core::{FlightRequest, SchedulerError};

/// How [`EngineHandle::shutdown`] treats runways still occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownMode {
    /// Let every outstanding occupancy run to completion.
    #[default]
    Drain,
    /// Cut outstanding occupancies short; slots are cleared without metrics.
    Cancel,
}

/// Counters an engine keeps about its own work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    /// Flights handed to an occupancy worker.
    pub dispatched: u64,
    /// Workers that finished their full occupancy.
    pub completed: u64,
    /// Workers cut short by a cancelling shutdown.
    pub cancelled: u64,
    /// Dequeued flights returned to the queue front.
    pub rollbacks: u64,
    /// Flights lost because no slot was left for a rollback.
    pub dropped: u64,
    /// Bookkeeping disagreements: a runway permit with no free slot, a lease
    /// mismatch on release, or a worker that failed to join.
    pub consistency_warnings: u64,
    /// Times the engine found nothing eligible and waited for a change.
    pub idle_waits: u64,
}

impl EngineStats {
    fn merge(&mut self, other: Self) {
        self.dispatched += other.dispatched;
        self.completed += other.completed;
        self.cancelled += other.cancelled;
        self.rollbacks += other.rollbacks;
        self.dropped += other.dropped;
        self.consistency_warnings += other.consistency_warnings;
        self.idle_waits += other.idle_waits;
    }

    /// Workers reaped so far, however they ended.
    #[must_use]
    pub const fn workers_reaped(&self) -> u64 {
        self.completed + self.cancelled
    }
}

/// One scheduler engine and the occupancy workers it spawned.
#[derive(Debug)]
pub struct SchedulerEngine {
    id: usize,
    airfield: Airfield,
    shutdown: CancellationToken,
    cancel_workers: CancellationToken,
    workers: JoinSet<OccupancyReport>,
    stats: EngineStats,
}

impl SchedulerEngine {
    /// Engine `id` over `airfield`.
    ///
    /// `shutdown` stops the dispatch loop; `cancel_workers` cuts outstanding
    /// occupancies short.
    #[must_use]
    pub fn new(
        id: usize,
        airfield: Airfield,
        shutdown: CancellationToken,
        cancel_workers: CancellationToken,
    ) -> Self {
        Self {
            id,
            airfield,
            shutdown,
            cancel_workers,
            workers: JoinSet::new(),
            stats: EngineStats::default(),
        }
    }

    /// Run until shutdown or until the airfield closes, then wait for every
    /// spawned worker and return this engine's counters.
    pub async fn run(mut self) -> EngineStats {
        info!(engine = self.id, "scheduler engine started");
        loop {
            self.reap_finished();
            match self.cycle().await {
                Ok(()) => {}
                Err(SchedulerError::Closed) => break,
                Err(e) => {
                    error!(engine = self.id, error = %e, "scheduler cycle failed");
                    break;
                }
            }
        }

        debug!(
            engine = self.id,
            outstanding = self.workers.len(),
            "dispatch stopped; joining occupancy workers"
        );
        while let Some(joined) = self.workers.join_next().await {
            self.record(joined);
        }
        info!(
            engine = self.id,
            dispatched = self.stats.dispatched,
            rollbacks = self.stats.rollbacks,
            "scheduler engine stopped"
        );
        self.stats
    }

    /// One pass of the cycle. `Err(Closed)` ends the loop.
    async fn cycle(&mut self) -> Result<(), SchedulerError> {
        let seen = self
            .until_shutdown(self.airfield.permits().pending().acquire())
            .await?;

        let picked = self.airfield.state().lock().take_eligible();
        let Some(flight) = picked else {
            self.airfield.permits().pending().restore();
            self.stats.idle_waits += 1;
            debug!(engine = self.id, "no eligible flight; waiting for a state change");
            return self
                .until_shutdown(self.airfield.permits().pending().wait_for_change(seen))
                .await;
        };

        self.airfield.permits().release_capacity();
        debug!(
            engine = self.id,
            flight_id = flight.id,
            kind = %flight.kind,
            emergency = flight.emergency,
            "flight dequeued"
        );

        if let Err(e) = self.until_shutdown(self.airfield.permits().acquire_runway()).await {
            if self.rollback(flight) {
                self.airfield.permits().pending().post();
            }
            return Err(e);
        }

        let claimed = {
            let mut state = self.airfield.state().lock();
            state
                .assign_runway(flight.id)
                .ok_or_else(|| state.runways().vacated())
        };
        let (slot, lease) = match claimed {
            Ok(claim) => claim,
            Err(vacated) => {
                error!(
                    engine = self.id,
                    flight_id = flight.id,
                    "runway permit held but no runway slot free; waiting for a runway to be vacated"
                );
                self.stats.consistency_warnings += 1;
                self.airfield.permits().release_runway();
                if !self.rollback(flight) {
                    return Ok(());
                }
                // re-posting now would hand the same flight the same permit again
                let waited = self
                    .until_shutdown(self.airfield.wait_for_vacated_runway(vacated))
                    .await;
                self.airfield.permits().pending().post();
                return waited;
            }
        };

        if self.shutdown.is_cancelled() {
            self.airfield.vacate_runway(slot, lease);
            self.airfield.permits().release_runway();
            warn!(
                engine = self.id,
                flight_id = flight.id,
                runway = slot + 1,
                "shutdown before dispatch; assignment undone"
            );
            if self.rollback(flight) {
                self.airfield.permits().pending().post();
            }
            return Err(SchedulerError::Closed);
        }

        info!(
            engine = self.id,
            flight_id = flight.id,
            label = %flight.label,
            runway = slot + 1,
            %lease,
            "runway assigned"
        );
        let assignment = RunwayAssignment {
            slot,
            lease,
            flight_id: flight.id,
            label: flight.label,
            duration_ms: flight.occupancy_duration_ms,
        };
        self.workers.spawn(occupy_runway(
            self.airfield.clone(),
            assignment,
            self.cancel_workers.child_token(),
        ));
        self.stats.dispatched += 1;
        Ok(())
    }

    async fn until_shutdown<T>(
        &self,
        wait: impl Future<Output = Result<T, SchedulerError>>,
    ) -> Result<T, SchedulerError> {
        tokio::select! {
            () = self.shutdown.cancelled() => Err(SchedulerError::Closed),
            result = wait => result,
        }
    }

    /// Put a dequeued flight back at the front of the queue. Returns true if
    /// it was requeued; the caller decides when to post pending work for it.
    ///
    /// Capacity is re-reserved first. If the airfield is closed the flight is
    /// requeued anyway, since submitters are gone. If the queue refilled in
    /// the meantime the flight is dropped and logged.
    fn rollback(&mut self, flight: FlightRequest) -> bool {
        let flight_id = flight.id;
        let permits = self.airfield.permits();
        let reserved = match permits.try_reserve_capacity() {
            Ok(()) => true,
            Err(SchedulerError::Closed) => false,
            Err(e) => {
                error!(engine = self.id, flight_id, error = %e, "rollback failed; flight dropped");
                self.airfield.state().lock().record_dropped(flight_id);
                self.stats.dropped += 1;
                return false;
            }
        };

        let requeued = self.airfield.state().lock().requeue_front(flight);
        match requeued {
            Ok(()) => {
                warn!(engine = self.id, flight_id, "flight returned to queue front");
                self.stats.rollbacks += 1;
                true
            }
            Err(e) => {
                if reserved {
                    permits.release_capacity();
                }
                error!(engine = self.id, flight_id, error = %e, "rollback failed; flight dropped");
                self.airfield.state().lock().record_dropped(flight_id);
                self.stats.dropped += 1;
                false
            }
        }
    }

    fn reap_finished(&mut self) {
        while let Some(joined) = self.workers.try_join_next() {
            self.record(joined);
        }
    }

    fn record(&mut self, joined: Result<OccupancyReport, JoinError>) {
        match joined {
            Ok(report) => match report.outcome {
                ReleaseOutcome::Released => self.stats.completed += 1,
                ReleaseOutcome::Cancelled => self.stats.cancelled += 1,
                ReleaseOutcome::OwnershipMismatch => {
                    self.stats.completed += 1;
                    self.stats.consistency_warnings += 1;
                }
            },
            Err(e) => {
                error!(engine = self.id, error = %e, "occupancy worker failed");
                self.stats.consistency_warnings += 1;
            }
        }
    }
}

/// Running set of scheduler engines.
#[derive(Debug)]
pub struct EngineHandle {
    airfield: Airfield,
    shutdown: CancellationToken,
    cancel_workers: CancellationToken,
    engines: JoinSet<EngineStats>,
    count: usize,
}

impl EngineHandle {
    /// Start `count` engines on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// `Config` when `count` is zero, `Setup` when called outside a tokio runtime.
    pub fn spawn(airfield: &Airfield, count: usize) -> Result<Self, SchedulerError> {
        if count == 0 {
            return Err(SchedulerError::Config(
                "scheduler_count must be > 0".into(),
            ));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SchedulerError::Setup(e.to_string()))?;

        let shutdown = CancellationToken::new();
        let cancel_workers = CancellationToken::new();
        let mut engines = JoinSet::new();
        for id in 0..count {
            let engine = SchedulerEngine::new(
                id,
                airfield.clone(),
                shutdown.clone(),
                cancel_workers.clone(),
            );
            engines.spawn_on(engine.run(), &runtime);
        }
        info!(engines = count, "scheduler engines spawned");
        Ok(Self {
            airfield: airfield.clone(),
            shutdown,
            cancel_workers,
            engines,
            count,
        })
    }

    /// Number of engines started.
    #[must_use]
    pub const fn engine_count(&self) -> usize {
        self.count
    }

    /// The airfield the engines serve.
    #[must_use]
    pub const fn airfield(&self) -> &Airfield {
        &self.airfield
    }

    /// Token that stops the dispatch loops when cancelled.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Close the airfield, stop every engine and settle outstanding workers.
    ///
    /// Flights still queued stay in the queue; flights caught between dequeue
    /// and dispatch are rolled back to the front.
    pub async fn shutdown(mut self, mode: ShutdownMode) -> EngineStats {
        info!(?mode, "shutting down scheduler engines");
        self.airfield.close();
        self.shutdown.cancel();
        if mode == ShutdownMode::Cancel {
            self.cancel_workers.cancel();
        }

        let mut total = EngineStats::default();
        while let Some(joined) = self.engines.join_next().await {
            match joined {
                Ok(stats) => total.merge(stats),
                Err(e) => error!(error = %e, "scheduler engine failed"),
            }
        }
        info!(
            dispatched = total.dispatched,
            completed = total.completed,
            cancelled = total.cancelled,
            rollbacks = total.rollbacks,
            "scheduler engines stopped"
        );
        total
    }
}
