//! Per-key coalescing of concurrent cache misses.

use crate::CacheKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Flights = Arc<Mutex<HashMap<CacheKey, Flight>>>;

/// Serializes loads of the same key so only one caller runs the origin.
///
/// Callers that wait on a flight look the key up again once they get
/// through; by then the leader has populated it.
#[derive(Debug, Default, Clone)]
pub(crate) struct SingleFlight {
    flights: Flights,
}

/// Lock of one key and the number of callers holding or awaiting it.
#[derive(Debug, Default)]
struct Flight {
    lock: Arc<AsyncMutex<()>>,
    holders: usize,
}

impl SingleFlight {
    /// Waits for the flight of `key`, returning a guard held for the load.
    ///
    /// The caller is registered before waiting, so a caller cancelled while
    /// queued still releases its share of the entry.
    pub(crate) async fn acquire(&self, key: &CacheKey) -> FlightGuard {
        let (lock, mut flight) = {
            let mut flights = self.flights.lock();
            let entry = flights.entry(key.clone()).or_default();
            entry.holders += 1;
            let guard = FlightGuard {
                flights: Arc::clone(&self.flights),
                key: key.clone(),
                guard: None,
            };
            (Arc::clone(&entry.lock), guard)
        };

        flight.guard = Some(lock.lock_owned().await);
        flight
    }

    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.flights.lock().len()
    }
}

/// Holds the flight of one key until dropped.
pub(crate) struct FlightGuard {
    flights: Flights,
    key: CacheKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut flights = self.flights.lock();
        if let Some(flight) = flights.get_mut(&self.key) {
            flight.holders = flight.holders.saturating_sub(1);
            if flight.holders == 0 {
                flights.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Namespace;
    use std::time::Duration;

    #[tokio::test]
    async fn test_flight_is_removed_after_release() {
        let flights = SingleFlight::default();
        let key = CacheKey::new(Namespace::new("userById"), "1").unwrap();

        let guard = flights.acquire(&key).await;
        assert_eq!(flights.in_flight(), 1);
        drop(guard);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_caller_waits_for_first() {
        let flights = SingleFlight::default();
        let key = CacheKey::new(Namespace::new("userById"), "1").unwrap();

        let guard = flights.acquire(&key).await;
        let waiter = {
            let flights = flights.clone();
            let key = key.clone();
            tokio::spawn(async move {
                let _guard = flights.acquire(&key).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_waiter_releases_entry() {
        let flights = SingleFlight::default();
        let key = CacheKey::new(Namespace::new("userById"), "1").unwrap();

        let guard = flights.acquire(&key).await;
        let waiter = {
            let flights = flights.clone();
            let key = key.clone();
            tokio::spawn(async move {
                let _guard = flights.acquire(&key).await;
                std::future::pending::<()>().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(guard);
        waiter.abort();
        assert!(waiter.await.unwrap_err().is_cancelled());

        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_cancelled_before_release() {
        let flights = SingleFlight::default();
        let key = CacheKey::new(Namespace::new("userById"), "1").unwrap();

        let guard = flights.acquire(&key).await;
        let waiter = {
            let flights = flights.clone();
            let key = key.clone();
            tokio::spawn(async move {
                let _guard = flights.acquire(&key).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        waiter.abort();
        let _ = waiter.await;
        assert_eq!(flights.in_flight(), 1);

        drop(guard);
        assert_eq!(flights.in_flight(), 0);
    }
}
