//! Latest-value state streams
//!
//! A [`StateStream`] holds the current [`OperationResult`] of one kind of
//! request and pushes every change to its subscribers. New subscribers
//! replay the current value first. The stream is idle (`None`) until the
//! first request.
//!
//! ```text
//!  begin()  ──► Loading { last_known }      generation = n
//!  publish(n, Ok)  ──► Success(v)           applied
//!  publish(n, Err) ──► Error { cause, .. }  applied
//!  publish(m < n)  ──► (discarded)          superseded request
//! ```
//!
//! Every request takes a new generation; only a result carrying the
//! current generation is applied. In-place edits of the displayed data
//! ([`StateStream::modify_data`]) keep the generation as it is.

use std::fmt;

use tokio::sync::watch;

use sharesync_core::domain::{OperationResult, ShareError};

/// Generation of the request a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    state: Option<OperationResult<T>>,
}

/// Observable Loading / Success / Error state of one request kind
pub struct StateStream<T> {
    name: &'static str,
    tx: watch::Sender<Slot<T>>,
}

impl<T: Clone> StateStream<T> {
    /// Creates an idle stream; `name` only appears in logs
    pub fn new(name: &'static str) -> Self {
        let (tx, _rx) = watch::channel(Slot {
            generation: 0,
            state: None,
        });
        Self { name, tx }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current state, `None` while idle
    pub fn current(&self) -> Option<OperationResult<T>> {
        self.tx.borrow().state.clone()
    }

    /// Payload currently displayed, whatever the variant
    pub fn data(&self) -> Option<T> {
        self.tx.borrow().state.as_ref().and_then(|s| s.data().cloned())
    }

    pub fn is_idle(&self) -> bool {
        self.tx.borrow().state.is_none()
    }

    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// Starts a request and moves the stream to Loading
    ///
    /// The Loading state carries the data currently displayed, or
    /// `fallback` when nothing is displayed yet.
    pub fn begin(&self, fallback: Option<T>) -> Ticket {
        let mut ticket = Ticket(0);
        self.tx.send_modify(|slot| {
            slot.generation += 1;
            ticket = Ticket(slot.generation);
            let last_known = slot
                .state
                .take()
                .and_then(OperationResult::into_data)
                .or(fallback);
            slot.state = Some(OperationResult::Loading { last_known });
        });
        tracing::debug!(stream = self.name, generation = ticket.0, "Loading");
        ticket
    }

    /// Applies the outcome of the request `ticket`
    ///
    /// Returns false, leaving the stream untouched, when a newer request
    /// was started in the meantime.
    pub fn publish(&self, ticket: Ticket, result: Result<T, ShareError>) -> bool {
        let applied = self.tx.send_if_modified(|slot| {
            if slot.generation != ticket.0 {
                return false;
            }
            slot.state = Some(match result {
                Ok(value) => OperationResult::Success(value),
                Err(cause) => OperationResult::Error {
                    cause,
                    last_known: slot.state.take().and_then(OperationResult::into_data),
                },
            });
            true
        });

        if applied {
            tracing::debug!(stream = self.name, generation = ticket.0, "Result applied");
        } else {
            tracing::debug!(
                stream = self.name,
                generation = ticket.0,
                current = self.generation(),
                "Stale result discarded"
            );
        }
        applied
    }

    /// Emits `value` as the result of a request that completed immediately
    pub fn succeed(&self, value: T) -> Ticket {
        let mut ticket = Ticket(0);
        self.tx.send_modify(|slot| {
            slot.generation += 1;
            ticket = Ticket(slot.generation);
            slot.state = Some(OperationResult::Success(value));
        });
        tracing::debug!(stream = self.name, generation = ticket.0, "Immediate success");
        ticket
    }

    /// Edits the displayed data in place without superseding any request
    ///
    /// Does nothing (and returns false) while the stream shows no data.
    pub fn modify_data(&self, edit: impl FnOnce(&mut T)) -> bool {
        self.tx.send_if_modified(|slot| {
            match slot.state.as_mut().and_then(OperationResult::data_mut) {
                Some(data) => {
                    edit(data);
                    true
                }
                None => false,
            }
        })
    }

    /// Registers a new observer
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T> fmt::Debug for StateStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.tx.borrow();
        f.debug_struct("StateStream")
            .field("name", &self.name)
            .field("generation", &slot.generation)
            .field("idle", &slot.state.is_none())
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

/// Handle of one observer of a [`StateStream`]
///
/// Dropping the handle (or calling [`unsubscribe`](Self::unsubscribe))
/// ends the subscription. Intermediate states may be coalesced when the
/// observer is slower than the stream; the latest state is never lost.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: watch::Receiver<Slot<T>>,
}

impl<T: Clone> Subscription<T> {
    /// Current state, replayed on subscription
    pub fn current(&self) -> Option<OperationResult<T>> {
        self.rx.borrow().state.clone()
    }

    /// Waits for the next state
    ///
    /// Returns `None` once the stream is gone.
    pub async fn changed(&mut self) -> Option<OperationResult<T>> {
        loop {
            self.rx.changed().await.ok()?;
            let state = self.rx.borrow_and_update().state.clone();
            if state.is_some() {
                return state;
            }
        }
    }

    /// Waits until the state satisfies `predicate`, checking the current one first
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&OperationResult<T>) -> bool,
    ) -> Option<OperationResult<T>> {
        let slot = self
            .rx
            .wait_for(|slot| slot.state.as_ref().is_some_and(&mut predicate))
            .await
            .ok()?;
        slot.state.clone()
    }

    pub fn unsubscribe(self) {}
}
