//! One view's infinite-scroll sequence of feed pages.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{FeedCache, FeedFetcher, FeedKey, FeedPage, KeyFn};
use crate::{FeedError, Result};

/// Per-cursor revalidation behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorOptions {
    /// Refetch loaded pages when the application regains focus.
    ///
    /// Off by default: feed data is not considered stale enough to justify
    /// the extra provider load.
    pub revalidate_on_focus: bool,
}

/// Coarse status of a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// Nothing requested yet.
    Idle,
    /// The page at `page_index` is being fetched.
    Loading { page_index: usize },
    /// Pages are loaded and more may follow.
    Loaded,
    /// No further pages exist.
    Exhausted,
    /// The page at `page_index` failed; earlier pages are still loaded.
    Failed { page_index: usize, error: FeedError },
}

enum SlotStatus {
    Loading,
    Loaded(Arc<FeedPage>),
    Failed(FeedError),
}

struct PageSlot {
    key: FeedKey,
    status: SlotStatus,
    /// Bumped on every retry of a failed slot. Joining an in-flight load
    /// keeps the current attempt.
    attempt: u32,
}

/// Identifies the load a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoadTicket {
    generation: u64,
    page_index: usize,
    attempt: u32,
}

/// Internal state. Only the last slot can be `Loading` or `Failed`.
struct CursorState {
    keys: KeyFn,
    /// Bumped by `reset`; responses carrying an older generation are dropped.
    generation: u64,
    slots: Vec<PageSlot>,
    exhausted: bool,
}

/// A lazily growing, restartable sequence of feed pages.
///
/// Pages are fetched through a shared [`FeedCache`]. Clones share state, so
/// a cursor can be driven from several tasks.
#[derive(Clone)]
pub struct FeedCursor {
    cache: FeedCache,
    fetcher: Arc<dyn FeedFetcher>,
    options: CursorOptions,
    state: Arc<Mutex<CursorState>>,
}

impl FeedCursor {
    pub fn new(
        cache: FeedCache,
        fetcher: Arc<dyn FeedFetcher>,
        keys: KeyFn,
        options: CursorOptions,
    ) -> Self {
        Self {
            cache,
            fetcher,
            options,
            state: Arc::new(Mutex::new(CursorState {
                keys,
                generation: 0,
                slots: Vec::new(),
                exhausted: false,
            })),
        }
    }

    /// The loaded pages, in order. Stops at the first page not yet loaded.
    pub fn pages(&self) -> Vec<Arc<FeedPage>> {
        self.state
            .lock()
            .slots
            .iter()
            .map_while(|slot| match &slot.status {
                SlotStatus::Loaded(page) => Some(Arc::clone(page)),
                _ => None,
            })
            .collect()
    }

    pub fn status(&self) -> FeedStatus {
        let state = self.state.lock();
        match state.slots.last() {
            None if state.exhausted => FeedStatus::Exhausted,
            None => FeedStatus::Idle,
            Some(slot) => match &slot.status {
                SlotStatus::Loading => FeedStatus::Loading {
                    page_index: state.slots.len() - 1,
                },
                SlotStatus::Failed(error) => FeedStatus::Failed {
                    page_index: state.slots.len() - 1,
                    error: error.clone(),
                },
                SlotStatus::Loaded(_) if state.exhausted => FeedStatus::Exhausted,
                SlotStatus::Loaded(_) => FeedStatus::Loaded,
            },
        }
    }

    /// Whether another `load_next` may fetch.
    pub fn has_more(&self) -> bool {
        !self.state.lock().exhausted
    }

    pub fn options(&self) -> CursorOptions {
        self.options
    }

    /// Request the next page.
    ///
    /// - If the last page is still in flight, joins that request.
    /// - If the last page failed, retries it.
    /// - Otherwise asks the key function for the next key; `None` marks the
    ///   cursor exhausted and nothing is fetched.
    ///
    /// Returns `Ok(None)` when there is nothing more to load, or when the
    /// response arrived after a [`reset`](Self::reset) and was discarded.
    pub async fn load_next(&self) -> Result<Option<Arc<FeedPage>>> {
        let (ticket, key) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            if state.exhausted {
                tracing::trace!("feed exhausted, not loading");
                return Ok(None);
            }

            let len = state.slots.len();
            match state.slots.last_mut() {
                Some(slot) if !matches!(slot.status, SlotStatus::Loaded(_)) => {
                    if matches!(slot.status, SlotStatus::Failed(_)) {
                        slot.attempt += 1;
                    }
                    slot.status = SlotStatus::Loading;
                    let ticket = LoadTicket {
                        generation: state.generation,
                        page_index: len - 1,
                        attempt: slot.attempt,
                    };
                    (ticket, slot.key.clone())
                }
                last => {
                    let previous = last.and_then(|slot| match &slot.status {
                        SlotStatus::Loaded(page) => Some(Arc::clone(page)),
                        _ => None,
                    });
                    let page_index = len;
                    let next = (state.keys)(page_index, previous.as_deref());
                    let Some(key) = next else {
                        tracing::debug!(page_index, "key function ended the feed");
                        state.exhausted = true;
                        return Ok(None);
                    };
                    state.slots.push(PageSlot {
                        key: key.clone(),
                        status: SlotStatus::Loading,
                        attempt: 0,
                    });
                    let ticket = LoadTicket {
                        generation: state.generation,
                        page_index,
                        attempt: 0,
                    };
                    (ticket, key)
                }
            }
        };

        let result = self.cache.get(&key, &self.fetcher).await;
        self.settle(ticket, result)
    }

    /// Record the outcome of a load.
    ///
    /// A response for a superseded sequence is dropped. A response for an
    /// older attempt of the same slot is returned to its caller but leaves
    /// the slot to the newer attempt.
    fn settle(
        &self,
        ticket: LoadTicket,
        result: Result<Arc<FeedPage>>,
    ) -> Result<Option<Arc<FeedPage>>> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.generation != ticket.generation {
            tracing::debug!(
                page_index = ticket.page_index,
                "discarding response for superseded feed"
            );
            return Ok(None);
        }
        let Some(slot) = state.slots.get_mut(ticket.page_index) else {
            return Ok(None);
        };
        if slot.attempt != ticket.attempt {
            tracing::debug!(
                page_index = ticket.page_index,
                attempt = ticket.attempt,
                current = slot.attempt,
                "response for an earlier attempt, slot left to the retry"
            );
            return result.map(Some);
        }

        match result {
            Ok(page) => {
                slot.status = SlotStatus::Loaded(Arc::clone(&page));
                if !page.has_more {
                    state.exhausted = true;
                }
                Ok(Some(page))
            }
            Err(error) => {
                slot.status = SlotStatus::Failed(error.clone());
                Err(error)
            }
        }
    }

    /// Force-refresh every loaded page.
    ///
    /// A page that fails to refresh keeps its previous content; the first
    /// error is returned after all pages were attempted.
    pub async fn revalidate(&self) -> Result<()> {
        let (generation, loaded) = {
            let state = self.state.lock();
            let loaded: Vec<(usize, FeedKey)> = state
                .slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| matches!(slot.status, SlotStatus::Loaded(_)))
                .map(|(i, slot)| (i, slot.key.clone()))
                .collect();
            (state.generation, loaded)
        };

        let mut first_error = None;
        for (page_index, key) in loaded {
            match self.cache.revalidate(&key, &self.fetcher).await {
                Ok(page) => {
                    let mut guard = self.state.lock();
                    let state = &mut *guard;
                    if state.generation != generation {
                        return Ok(());
                    }
                    if page_index >= state.slots.len() {
                        break;
                    }
                    let is_last = page_index + 1 == state.slots.len();
                    state.slots[page_index].status = SlotStatus::Loaded(Arc::clone(&page));
                    if !page.has_more {
                        // A page without successors must end the sequence.
                        state.slots.truncate(page_index + 1);
                        state.exhausted = true;
                    } else if is_last {
                        state.exhausted = false;
                    }
                }
                Err(error) => {
                    tracing::warn!(page_index, error = %error, "page revalidation failed");
                    first_error.get_or_insert(error);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// The application regained focus.
    pub async fn on_focus(&self) -> Result<()> {
        if self.options.revalidate_on_focus {
            self.revalidate().await
        } else {
            Ok(())
        }
    }

    /// Start a new sequence from page 0 with new key inputs.
    ///
    /// In-flight responses for the previous sequence are discarded on
    /// arrival.
    pub fn reset(&self, keys: KeyFn) {
        let mut state = self.state.lock();
        state.keys = keys;
        state.generation += 1;
        state.slots.clear();
        state.exhausted = false;
    }
}
