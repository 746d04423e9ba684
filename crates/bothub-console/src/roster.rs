//! Read-through cache over the registry's bot list.
//!
//! One query identity (`bots`). At most one registry call is in flight for it:
//! callers arriving while a fetch runs join that fetch and receive its result.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use bothub_client::BotRegistry;
use bothub_common::ConsoleResult;
use bothub_common::models::Bot;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

/// Identity under which the roster is cached.
pub const QUERY_KEY: &str = "bots";

/// First try plus one automatic retry.
const MAX_ATTEMPTS: usize = 2;

type Roster = Arc<Vec<Bot>>;
type SharedFetch = Shared<BoxFuture<'static, ConsoleResult<Roster>>>;

#[derive(Debug)]
struct Snapshot {
    bots: Roster,
    fetched_at: Instant,
}

struct InFlight {
    ticket: u64,
    /// Cache generation the fetch was started under.
    generation: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct QueryState {
    snapshot: Option<Snapshot>,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    /// Bumped by every invalidation.
    generation: u64,
}

/// Coalescing roster query.
///
/// Cheap to share behind an `Arc`; every view reads the same snapshot.
pub struct RosterQuery<R: ?Sized> {
    registry: Arc<R>,
    state: Mutex<QueryState>,
    calls: Arc<AtomicUsize>,
    stale_after: Duration,
}

impl<R> RosterQuery<R>
where
    R: BotRegistry + ?Sized + 'static,
{
    /// A query that treats every snapshot as stale, so each `fetch` reaches the
    /// registry (still coalesced).
    pub fn new(registry: Arc<R>) -> Self {
        Self::with_stale_after(registry, Duration::ZERO)
    }

    /// Serve snapshots younger than `stale_after` without a registry call.
    pub fn with_stale_after(registry: Arc<R>, stale_after: Duration) -> Self {
        Self {
            registry,
            state: Mutex::new(QueryState::default()),
            calls: Arc::new(AtomicUsize::new(0)),
            stale_after,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueryState> {
        // The guarded data is plain bookkeeping; a panic elsewhere cannot leave it torn.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The roster, from a fresh snapshot, a fetch already in flight, or a new fetch.
    ///
    /// A failed fetch keeps the previous snapshot in [`Self::cached`].
    pub async fn fetch(&self) -> ConsoleResult<Roster> {
        let (ticket, fetch) = {
            let mut state = self.lock();
            if let Some(snapshot) = &state.snapshot {
                if snapshot.fetched_at.elapsed() < self.stale_after {
                    debug!(key = QUERY_KEY, "roster cache hit");
                    return Ok(Arc::clone(&snapshot.bots));
                }
            }
            match &state.in_flight {
                Some(running) => {
                    debug!(key = QUERY_KEY, "joining in-flight roster fetch");
                    (running.ticket, running.fetch.clone())
                }
                None => {
                    let ticket = state.next_ticket;
                    state.next_ticket += 1;
                    let fetch =
                        load(Arc::clone(&self.registry), Arc::clone(&self.calls)).boxed().shared();
                    state.in_flight = Some(InFlight {
                        ticket,
                        generation: state.generation,
                        fetch: fetch.clone(),
                    });
                    (ticket, fetch)
                }
            }
        };

        let result = fetch.await;

        let mut state = self.lock();
        if state.in_flight.as_ref().is_some_and(|running| running.ticket == ticket) {
            let started = state.in_flight.take().map(|running| running.generation);
            match &result {
                Ok(bots) if started == Some(state.generation) => {
                    state.snapshot =
                        Some(Snapshot { bots: Arc::clone(bots), fetched_at: Instant::now() });
                }
                Ok(_) => debug!(key = QUERY_KEY, "roster invalidated mid-fetch, not caching"),
                Err(_) => {}
            }
        }
        result
    }

    /// Last successfully fetched roster, however old.
    pub fn cached(&self) -> Option<Roster> {
        self.lock().snapshot.as_ref().map(|s| Arc::clone(&s.bots))
    }

    /// Forget the snapshot. A fetch still in flight stays joinable, so the
    /// registry never sees a second concurrent call, but its result no longer
    /// populates the cache.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.snapshot = None;
        state.generation += 1;
    }

    /// Registry calls issued so far, retries included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

async fn load<R>(registry: Arc<R>, calls: Arc<AtomicUsize>) -> ConsoleResult<Roster>
where
    R: BotRegistry + ?Sized,
{
    let mut attempt = 1;
    loop {
        calls.fetch_add(1, Ordering::Relaxed);
        match registry.list_bots().await {
            Ok(bots) => {
                debug!(key = QUERY_KEY, count = bots.len(), attempt, "roster fetched");
                return Ok(Arc::new(bots));
            }
            Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                warn!(key = QUERY_KEY, "roster fetch failed, retrying once: {e}");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
