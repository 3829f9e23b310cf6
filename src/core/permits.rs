//! Counting permits that coordinate submitters, engines and workers.
//!
//! Three counters model the shared resource pools:
//!
//! - **pending work** (starts at 0): posted once per enqueue, emergency mark
//!   and weather toggle; consumed each time an engine evaluates the queue.
//! - **free capacity** (starts at the queue capacity): taken before every
//!   enqueue, returned after every dequeue.
//! - **free runways** (starts at the runway count): taken before a runway is
//!   assigned, returned when the occupancy worker finishes.
//!
//! The state lock is a separate `parking_lot::Mutex` owned by the airfield.
//! None of the waits below may happen while that lock is held; the guard is
//! not `Send`, so holding it across an `.await` does not compile in the
//! spawned engine and worker tasks.

use parking_lot::Mutex;
use tokio::sync::{Notify, Semaphore, TryAcquireError};

use crate::core::SchedulerError;

#[derive(Debug, Default)]
struct PendingState {
    count: u64,
    generation: u64,
    closed: bool,
}

/// Pending-work counter with a change generation.
///
/// Every [`post`](Self::post) bumps both the count and the generation. An
/// engine that finds nothing eligible hands its unit back with
/// [`restore`](Self::restore) (no generation bump) and then sleeps in
/// [`wait_for_change`](Self::wait_for_change) until a later post, instead of
/// polling on a timer.
#[derive(Debug, Default)]
pub struct PendingWork {
    state: Mutex<PendingState>,
    notify: Notify,
}

impl PendingWork {
    /// Create an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal one unit of work (or one state change worth re-evaluating).
    pub fn post(&self) {
        {
            let mut state = self.state.lock();
            state.count += 1;
            state.generation = state.generation.wrapping_add(1);
        }
        self.notify.notify_waiters();
    }

    /// Give back a consumed unit without announcing a new change.
    pub fn restore(&self) {
        self.state.lock().count += 1;
    }

    /// Wait for a unit and consume it. Returns the generation seen at that moment.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Closed` once the counter is closed.
    pub async fn acquire(&self) -> Result<u64, SchedulerError> {
        loop {
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock();
                if state.closed {
                    return Err(SchedulerError::Closed);
                }
                if state.count > 0 {
                    state.count -= 1;
                    return Ok(state.generation);
                }
            }
            notified.await;
        }
    }

    /// Wait until something was posted after generation `seen`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Closed` once the counter is closed.
    pub async fn wait_for_change(&self, seen: u64) -> Result<(), SchedulerError> {
        loop {
            let notified = self.notify.notified();
            {
                let state = self.state.lock();
                if state.closed {
                    return Err(SchedulerError::Closed);
                }
                if state.generation != seen {
                    return Ok(());
                }
            }
            notified.await;
        }
    }

    /// Units currently posted.
    #[must_use]
    pub fn available(&self) -> u64 {
        self.state.lock().count
    }

    /// Wake every waiter and make further waits fail.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.notify.notify_waiters();
    }
}

/// The three counters of the protocol, sized from configuration.
#[derive(Debug)]
pub struct Permits {
    pending: PendingWork,
    free_capacity: Semaphore,
    free_runways: Semaphore,
    runway_vacated: Notify,
    queue_capacity: usize,
    runway_count: usize,
}

impl Permits {
    /// Counters for a queue of `queue_capacity` and `runway_count` runways.
    #[must_use]
    pub fn new(queue_capacity: usize, runway_count: usize) -> Self {
        Self {
            pending: PendingWork::new(),
            free_capacity: Semaphore::new(queue_capacity),
            free_runways: Semaphore::new(runway_count),
            runway_vacated: Notify::new(),
            queue_capacity,
            runway_count,
        }
    }

    /// Pending-work counter.
    #[must_use]
    pub const fn pending(&self) -> &PendingWork {
        &self.pending
    }

    /// Take one free-capacity unit, waiting while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Closed` if the airfield was closed.
    pub async fn reserve_capacity(&self) -> Result<(), SchedulerError> {
        let permit = self
            .free_capacity
            .acquire()
            .await
            .map_err(|_| SchedulerError::Closed)?;
        permit.forget();
        Ok(())
    }

    /// Take one free-capacity unit without waiting.
    ///
    /// # Errors
    ///
    /// `QueueFull` when none is available, `Closed` if the airfield was closed.
    pub fn try_reserve_capacity(&self) -> Result<(), SchedulerError> {
        match self.free_capacity.try_acquire() {
            Ok(permit) => {
                permit.forget();
                Ok(())
            }
            Err(TryAcquireError::NoPermits) => Err(SchedulerError::QueueFull {
                capacity: self.queue_capacity,
            }),
            Err(TryAcquireError::Closed) => Err(SchedulerError::Closed),
        }
    }

    /// Return one free-capacity unit after a dequeue.
    pub fn release_capacity(&self) {
        self.free_capacity.add_permits(1);
    }

    /// Take one runway permit, waiting while every runway is busy.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Closed` if the runway pool was closed.
    pub async fn acquire_runway(&self) -> Result<(), SchedulerError> {
        let permit = self
            .free_runways
            .acquire()
            .await
            .map_err(|_| SchedulerError::Closed)?;
        permit.forget();
        Ok(())
    }

    /// Return one runway permit.
    pub fn release_runway(&self) {
        self.free_runways.add_permits(1);
    }

    /// Signal raised after a runway slot is cleared in the state store.
    ///
    /// Waiters must register with `notified()` before they read the vacate
    /// counter, so a clear between the read and the await is not missed.
    #[must_use]
    pub const fn runway_vacated(&self) -> &Notify {
        &self.runway_vacated
    }

    /// Free-capacity units available right now.
    #[must_use]
    pub fn available_capacity(&self) -> usize {
        self.free_capacity.available_permits()
    }

    /// Runway permits available right now.
    #[must_use]
    pub fn available_runways(&self) -> usize {
        self.free_runways.available_permits()
    }

    /// Runway permits currently checked out.
    #[must_use]
    pub fn runways_checked_out(&self) -> usize {
        self.runway_count
            .saturating_sub(self.free_runways.available_permits())
    }

    /// Stop accepting submissions and wake any engine waiting for work.
    pub fn close(&self) {
        self.free_capacity.close();
        self.pending.close();
    }
}
