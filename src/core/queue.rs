//! Bounded circular queue of flight requests with positional removal.

use crate::core::{FlightId, FlightRequest, SchedulerError};

/// Queue capacity of the shared layout.
pub const QUEUE_CAPACITY: usize = 256;

/// Fixed-capacity ring buffer holding queued flights in submission order.
///
/// Insertion is always at `tail`. Removal can happen at any logical position
/// because the weather policy may pick a flight behind the front; the entries
/// after it are shifted one slot toward `head` so the occupied region stays
/// contiguous and the relative order of the untouched entries is preserved.
///
/// `count == (tail - head) mod capacity` holds at all times; `head == tail`
/// means empty when `count == 0` and full when `count == capacity`.
#[derive(Debug, Clone)]
pub struct FlightQueue {
    slots: Vec<Option<FlightRequest>>,
    head: usize,
    tail: usize,
    count: usize,
}

impl FlightQueue {
    /// Create an empty queue with the given capacity (must be non-zero).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Maximum number of queued flights.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of queued flights.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// True when nothing is queued.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True when every slot is taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Ring index of the front entry.
    #[must_use]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Ring index one past the back entry.
    #[must_use]
    pub const fn tail(&self) -> usize {
        self.tail
    }

    fn slot_index(&self, position: usize) -> usize {
        (self.head + position) % self.capacity()
    }

    /// Append at `tail`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::QueueFull` if no slot is free. Callers that
    /// hold a free-capacity permit never see this.
    pub fn enqueue(&mut self, flight: FlightRequest) -> Result<(), SchedulerError> {
        if self.is_full() {
            return Err(SchedulerError::QueueFull {
                capacity: self.capacity(),
            });
        }
        let tail = self.tail;
        self.slots[tail] = Some(flight);
        self.tail = (tail + 1) % self.capacity();
        self.count += 1;
        Ok(())
    }

    /// Put a flight back in front of `head`, ahead of everything queued.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::QueueFull` if no slot is free.
    pub fn push_front(&mut self, flight: FlightRequest) -> Result<(), SchedulerError> {
        if self.is_full() {
            return Err(SchedulerError::QueueFull {
                capacity: self.capacity(),
            });
        }
        self.head = (self.head + self.capacity() - 1) % self.capacity();
        let head = self.head;
        self.slots[head] = Some(flight);
        self.count += 1;
        Ok(())
    }

    /// Logical position (0 = front) of the flight the policy allows next.
    ///
    /// Normal weather: the front entry. Severe weather: the first entry in
    /// queue order that is an emergency landing, or `None` if there is none.
    #[must_use]
    pub fn find_eligible(&self, severe_weather: bool) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        if !severe_weather {
            return Some(0);
        }
        self.iter().position(FlightRequest::is_emergency_landing)
    }

    /// Remove the flight at a logical position, shifting later entries toward `head`.
    pub fn remove_at(&mut self, position: usize) -> Option<FlightRequest> {
        if position >= self.count {
            return None;
        }
        let at = self.slot_index(position);
        let removed = self.slots[at].take();
        for k in position..self.count - 1 {
            let from = self.slot_index(k + 1);
            let to = self.slot_index(k);
            self.slots[to] = self.slots[from].take();
        }
        self.tail = (self.tail + self.capacity() - 1) % self.capacity();
        self.count -= 1;
        removed
    }

    /// Raise the emergency flag on a queued flight. Order is untouched.
    pub fn mark_emergency(&mut self, id: FlightId) -> bool {
        for k in 0..self.count {
            let idx = self.slot_index(k);
            if let Some(flight) = self.slots[idx].as_mut() {
                if flight.id == id {
                    flight.emergency = true;
                    return true;
                }
            }
        }
        false
    }

    /// Queued flights, front to back.
    pub fn iter(&self) -> impl Iterator<Item = &FlightRequest> + '_ {
        (0..self.count).filter_map(move |k| self.slots[self.slot_index(k)].as_ref())
    }

    /// Check the ring bookkeeping; used by tests and debug assertions.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        let capacity = self.capacity();
        let span = (self.tail + capacity - self.head) % capacity;
        let span_ok = if self.count == capacity {
            span == 0
        } else {
            span == self.count
        };
        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        span_ok && occupied == self.count && self.iter().count() == self.count
    }
}

impl Default for FlightQueue {
    fn default() -> Self {
        Self::new(QUEUE_CAPACITY)
    }
}
