//! Single-slot async lock with FIFO hand-off.
//!
//! `acquire()` returns immediately when the slot is free and nobody is queued.
//! Otherwise the caller joins the back of the queue and suspends. Release hands
//! the slot straight to the queue head (the slot never becomes free in between),
//! so a late arrival cannot overtake a task that was already waiting.
//!
//! # Cancel Safety
//!
//! Dropping an `Acquire` before it completes removes its queue entry. If the
//! slot had already been handed to it, the slot moves on to the next waiter.
//!
//! The lock is not reentrant: acquiring twice from the same task deadlocks.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};
use std::time::Instant;
use tracing::trace;

#[derive(Debug, Default)]
struct LockState {
    held: bool,
    waiters: VecDeque<Waiter>,
    next_waiter_id: u64,
}

#[derive(Debug)]
struct Waiter {
    id: u64,
    waker: Waker,
    /// The slot has been handed to this waiter; it owns it once polled.
    granted: bool,
}

impl LockState {
    /// Give the slot to the queue head, or mark it free. Returns the waker to
    /// call once the state mutex is released.
    fn hand_off(&mut self) -> Option<Waker> {
        match self.waiters.front_mut() {
            Some(next) => {
                next.granted = true;
                Some(next.waker.clone())
            }
            None => {
                self.held = false;
                None
            }
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<LockState>,
}

impl Shared {
    // The state is a flag and a queue; a panic while it is locked cannot leave
    // it half-updated, so a poisoned mutex is still usable.
    fn lock(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        let next = self.lock().hand_off();
        if let Some(waker) = next {
            trace!("async lock handed to next waiter");
            waker.wake();
        }
    }
}

/// Cloning yields another handle to the same lock.
#[derive(Clone, Default)]
pub struct AsyncLock {
    shared: Arc<Shared>,
}

impl fmt::Debug for AsyncLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("AsyncLock")
            .field("held", &state.held)
            .field("waiters", &state.waiters.len())
            .finish()
    }
}

impl AsyncLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the slot. Resolves to the `Releaser` that gives it back.
    pub fn acquire(&self) -> Acquire {
        Acquire {
            shared: Some(Arc::clone(&self.shared)),
            waiter_id: None,
            queued_at: None,
        }
    }

    /// Take the slot only if it is free and nobody is queued for it.
    pub fn try_acquire(&self) -> Option<Releaser> {
        let mut state = self.shared.lock();
        if state.held || !state.waiters.is_empty() {
            return None;
        }
        state.held = true;
        Some(Releaser::new(Arc::clone(&self.shared)))
    }

    /// Acquire, run `fut`, release.
    pub async fn run_exclusive<F: Future>(&self, fut: F) -> F::Output {
        let _releaser = self.acquire().await;
        fut.await
    }

    pub fn is_locked(&self) -> bool {
        self.shared.lock().held
    }

    /// Number of suspended acquirers.
    pub fn waiters(&self) -> usize {
        self.shared.lock().waiters.len()
    }

    /// True when no handle, pending acquire or releaser refers to this lock
    /// besides `self`.
    pub(crate) fn is_idle(&self) -> bool {
        Arc::strong_count(&self.shared) == 1
    }
}

/// Future returned by [`AsyncLock::acquire`].
#[must_use = "futures do nothing unless awaited"]
pub struct Acquire {
    // Taken when the future completes.
    shared: Option<Arc<Shared>>,
    waiter_id: Option<u64>,
    queued_at: Option<Instant>,
}

impl Future for Acquire {
    type Output = Releaser;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Releaser> {
        let this = self.get_mut();
        let Some(shared) = this.shared.clone() else {
            panic!("Acquire polled after completion");
        };
        let mut state = shared.lock();

        let Some(id) = this.waiter_id else {
            if !state.held && state.waiters.is_empty() {
                state.held = true;
                drop(state);
                this.shared = None;
                trace!("async lock acquired immediately");
                return Poll::Ready(Releaser::new(shared));
            }
            let id = state.next_waiter_id;
            state.next_waiter_id = state.next_waiter_id.wrapping_add(1);
            state.waiters.push_back(Waiter {
                id,
                waker: cx.waker().clone(),
                granted: false,
            });
            trace!(queued = state.waiters.len(), "async lock busy, waiting");
            this.waiter_id = Some(id);
            this.queued_at = Some(Instant::now());
            return Poll::Pending;
        };

        // Granted entries are always at the front.
        if state.waiters.front().is_some_and(|w| w.id == id && w.granted) {
            state.waiters.pop_front();
            drop(state);
            this.shared = None;
            this.waiter_id = None;
            if let Some(at) = this.queued_at.take() {
                trace!(waited_ms = at.elapsed().as_millis() as u64, "async lock acquired after wait");
            }
            return Poll::Ready(Releaser::new(shared));
        }

        if let Some(waiter) = state.waiters.iter_mut().find(|w| w.id == id)
            && !waiter.waker.will_wake(cx.waker())
        {
            waiter.waker.clone_from(cx.waker());
        }
        Poll::Pending
    }
}

impl Drop for Acquire {
    fn drop(&mut self) {
        let (Some(shared), Some(id)) = (self.shared.as_ref(), self.waiter_id.take()) else {
            return;
        };
        let next = {
            let mut state = shared.lock();
            match state.waiters.iter().position(|w| w.id == id) {
                Some(pos) => {
                    let was_granted = state.waiters.remove(pos).is_some_and(|w| w.granted);
                    if was_granted { state.hand_off() } else { None }
                }
                None => None,
            }
        };
        if let Some(waker) = next {
            trace!("abandoned acquire passed the async lock on");
            waker.wake();
        }
    }
}

/// Proof of holding an [`AsyncLock`]. Gives the slot back exactly once,
/// on `release()` or on drop, whichever comes first.
#[must_use = "the lock is released as soon as the releaser is dropped"]
pub struct Releaser {
    shared: Option<Arc<Shared>>,
}

impl fmt::Debug for Releaser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Releaser").field("released", &self.is_released()).finish()
    }
}

impl Releaser {
    fn new(shared: Arc<Shared>) -> Self {
        Self { shared: Some(shared) }
    }

    /// Return the slot. Later calls do nothing.
    pub fn release(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.release();
        }
    }

    pub fn is_released(&self) -> bool {
        self.shared.is_none()
    }
}

impl Drop for Releaser {
    fn drop(&mut self) {
        self.release();
    }
}
