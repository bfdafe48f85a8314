// Copyright 2026 Scenehunt Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-memory memoization with per-entry expiry.
//!
//! Expiry is checked on read; nothing is evicted in the background. Every miss
//! sweeps out expired entries, so the map only holds live values and pending
//! computations. Concurrent callers asking for the same missing key share a
//! single computation.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;
use std::time::Instant;

use log::trace;

type ExpiryPolicy<V> = Box<dyn Fn(&V) -> Duration + Send + Sync>;

enum Slot<V> {
    Ready {
        value: V,
        inserted: Instant,
        ttl: Duration,
    },
    Pending(Arc<Flight<V>>),
}

struct Flight<V> {
    state: Mutex<FlightState<V>>,
    done: Condvar,
}

enum FlightState<V> {
    Running,
    Finished(V),
    Abandoned,
}

pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, Slot<V>>>,
    expiry: ExpiryPolicy<V>,
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").finish_non_exhaustive()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Entry lifetime is chosen per value.
    pub fn with_expiry(expiry: impl Fn(&V) -> Duration + Send + Sync + 'static) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            expiry: Box::new(expiry),
        }
    }

    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        self.get_or_compute_at(key, Instant::now(), compute)
    }

    /// Like [`get_or_compute`](Self::get_or_compute) with an explicit clock
    /// reading, which is also the insertion time of a fresh value.
    pub fn get_or_compute_at(&self, key: K, now: Instant, compute: impl FnOnce() -> V) -> V {
        let flight = loop {
            let mut entries = self.lock();
            match entries.get(&key) {
                Some(Slot::Ready {
                    value,
                    inserted,
                    ttl,
                }) if now.saturating_duration_since(*inserted) < *ttl => {
                    trace!("cache hit");
                    return value.clone();
                }
                Some(Slot::Pending(flight)) => {
                    let flight = Arc::clone(flight);
                    drop(entries);
                    if let Some(value) = flight.wait() {
                        return value;
                    }
                    // Leader panicked; try to become the leader ourselves.
                }
                _ => {
                    trace!("cache miss");
                    entries.retain(|_, slot| match slot {
                        Slot::Ready { inserted, ttl, .. } => {
                            now.saturating_duration_since(*inserted) < *ttl
                        }
                        Slot::Pending(_) => true,
                    });
                    let flight = Arc::new(Flight::new());
                    entries.insert(key.clone(), Slot::Pending(Arc::clone(&flight)));
                    break flight;
                }
            }
        };

        let mut guard = LeaderGuard {
            cache: self,
            key: &key,
            flight: &flight,
            armed: true,
        };
        let value = compute();
        guard.armed = false;
        drop(guard);

        let ttl = (self.expiry)(&value);
        self.lock().insert(
            key,
            Slot::Ready {
                value: value.clone(),
                inserted: now,
                ttl,
            },
        );
        flight.finish(FlightState::Finished(value.clone()));
        value
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<V: Clone> Flight<V> {
    fn new() -> Self {
        Self {
            state: Mutex::new(FlightState::Running),
            done: Condvar::new(),
        }
    }

    fn wait(&self) -> Option<V> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        loop {
            match &*state {
                FlightState::Running => {
                    state = self
                        .done
                        .wait(state)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                }
                FlightState::Finished(value) => return Some(value.clone()),
                FlightState::Abandoned => return None,
            }
        }
    }

    fn finish(&self, outcome: FlightState<V>) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *state = outcome;
        self.done.notify_all();
    }
}

/// Clears the pending slot and wakes followers if the computation unwinds.
struct LeaderGuard<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    cache: &'a TtlCache<K, V>,
    key: &'a K,
    flight: &'a Arc<Flight<V>>,
    armed: bool,
}

impl<K, V> Drop for LeaderGuard<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut entries = self.cache.lock();
        if matches!(entries.get(self.key), Some(Slot::Pending(f)) if Arc::ptr_eq(f, self.flight)) {
            entries.remove(self.key);
        }
        drop(entries);
        self.flight.finish(FlightState::Abandoned);
    }
}
