//! Cancellable interactive operations.
//!
//! A [`Jig`] pairs a tick driver ([`JigLoop`]) fed by the view's pointer-move
//! stream with a sampler that waits for the confirming gesture. `drag()` runs
//! both and returns once both are done. The first `resolve`/`reject` detaches
//! the tick listener, records the outcome and cancels the loop token; every
//! later call is ignored.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Weak,
    },
};

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::domain::PointerEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{error::JigError, view::View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JigState {
    Idle,
    Active,
    Resolved,
    Rejected,
}

impl JigState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

struct Settlement<T> {
    state: JigState,
    outcome: Option<Result<T, JigError>>,
}

struct LoopShared<T> {
    token: CancellationToken,
    listening: AtomicBool,
    ticks: AtomicU64,
    settlement: Mutex<Settlement<T>>,
}

impl<T> LoopShared<T> {
    fn settle(&self, outcome: Result<T, JigError>) -> bool {
        self.listening.store(false, Ordering::SeqCst);
        {
            let mut settlement = self.settlement.lock();
            if settlement.state.is_terminal() {
                warn!(state = ?settlement.state, "jig already settled; ignoring");
                return false;
            }
            settlement.state = if outcome.is_ok() {
                JigState::Resolved
            } else {
                JigState::Rejected
            };
            settlement.outcome = Some(outcome);
        }
        self.token.cancel();
        true
    }
}

/// Tick driver of one jig. Owned by that jig and never shared; outside code
/// reaches it only through a [`JigCanceller`].
pub struct JigLoop<T> {
    shared: Arc<LoopShared<T>>,
    moves: Mutex<Option<broadcast::Receiver<PointerEvent>>>,
}

impl<T: Send + 'static> JigLoop<T> {
    pub fn new(moves: broadcast::Receiver<PointerEvent>) -> Self {
        Self {
            shared: Arc::new(LoopShared {
                token: CancellationToken::new(),
                listening: AtomicBool::new(true),
                ticks: AtomicU64::new(0),
                settlement: Mutex::new(Settlement {
                    state: JigState::Idle,
                    outcome: None,
                }),
            }),
            moves: Mutex::new(Some(moves)),
        }
    }

    pub fn state(&self) -> JigState {
        self.shared.settlement.lock().state
    }

    /// Ticks delivered to the update listener so far.
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::SeqCst)
    }

    pub fn is_listening(&self) -> bool {
        self.shared.listening.load(Ordering::SeqCst)
    }

    pub fn is_terminated(&self) -> bool {
        self.shared.token.is_cancelled()
    }

    /// Settles the jig with `value`. Returns false if it was already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.shared.settle(Ok(value))
    }

    /// Settles the jig with a rejection. Returns false if it was already
    /// settled.
    pub fn reject(&self, reason: impl Into<String>) -> bool {
        self.shared.settle(Err(JigError::Rejected(reason.into())))
    }

    pub fn canceller(&self) -> JigCanceller<T> {
        JigCanceller {
            shared: Arc::downgrade(&self.shared),
        }
    }

    fn fail(&self, err: JigError) -> bool {
        self.shared.settle(Err(err))
    }

    fn begin(&self) -> bool {
        let mut settlement = self.shared.settlement.lock();
        if settlement.state != JigState::Idle {
            return false;
        }
        settlement.state = JigState::Active;
        true
    }

    fn take_outcome(&self) -> Result<T, JigError> {
        self.shared
            .settlement
            .lock()
            .outcome
            .take()
            .unwrap_or(Err(JigError::Spent))
    }

    /// Delivers pointer moves to `on_tick`, in arrival order, until the token
    /// is cancelled.
    async fn run(&self, mut on_tick: impl FnMut(&PointerEvent)) {
        let moves = self.moves.lock().take();
        let Some(mut moves) = moves else {
            self.shared.token.cancelled().await;
            return;
        };

        loop {
            tokio::select! {
                biased;
                _ = self.shared.token.cancelled() => break,
                received = moves.recv() => match received {
                    Ok(pointer) => {
                        if !self.shared.listening.load(Ordering::SeqCst) {
                            break;
                        }
                        self.shared.ticks.fetch_add(1, Ordering::SeqCst);
                        on_tick(&pointer);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "jig loop fell behind the pointer stream");
                    }
                    Err(RecvError::Closed) => {
                        debug!("pointer stream closed; waiting for jig termination");
                        self.shared.token.cancelled().await;
                        break;
                    }
                },
            }
        }
    }
}

impl<T> fmt::Debug for JigLoop<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JigLoop")
            .field("state", &self.shared.settlement.lock().state)
            .field("ticks", &self.shared.ticks.load(Ordering::SeqCst))
            .finish()
    }
}

/// Rejects a jig from outside its sampler, e.g. on Escape.
pub struct JigCanceller<T> {
    shared: Weak<LoopShared<T>>,
}

impl<T> Clone for JigCanceller<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<T> JigCanceller<T> {
    /// Returns false when the jig is gone or already settled.
    pub fn cancel(&self, reason: impl Into<String>) -> bool {
        match self.shared.upgrade() {
            Some(shared) => shared.settle(Err(JigError::Rejected(reason.into()))),
            None => false,
        }
    }
}

/// What a concrete jig does while it runs.
#[async_trait]
pub trait JigBehavior: Send + Sync {
    type Output: Send + 'static;

    /// Called once per pointer tick while the jig is active. Ticks follow
    /// pointer input, not a clock.
    fn update(&self, _view: &dyn View, _pointer: &PointerEvent) {}

    /// Waits for the confirming gesture and settles `jig`. There is no
    /// timeout: a sampler that never settles keeps the jig running until
    /// someone rejects it. Returning an error rejects the jig.
    async fn sampler(&self, _view: &dyn View, _jig: &JigLoop<Self::Output>) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct Jig<B: JigBehavior> {
    view: Arc<dyn View>,
    behavior: B,
    jig_loop: JigLoop<B::Output>,
}

impl<B: JigBehavior> Jig<B> {
    /// Binds to `view` and subscribes to its pointer moves right away, so
    /// moves that arrive before `drag()` are delivered once it starts.
    pub fn new(view: Arc<dyn View>, behavior: B) -> Self {
        let jig_loop = JigLoop::new(view.pointer_moves());
        Self {
            view,
            behavior,
            jig_loop,
        }
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn state(&self) -> JigState {
        self.jig_loop.state()
    }

    pub fn ticks(&self) -> u64 {
        self.jig_loop.ticks()
    }

    pub fn is_listening(&self) -> bool {
        self.jig_loop.is_listening()
    }

    pub fn resolve(&self, value: B::Output) -> bool {
        self.jig_loop.resolve(value)
    }

    pub fn reject(&self, reason: impl Into<String>) -> bool {
        self.jig_loop.reject(reason)
    }

    pub fn canceller(&self) -> JigCanceller<B::Output> {
        self.jig_loop.canceller()
    }

    /// Runs the tick driver and the sampler together and returns the outcome
    /// once both have finished. A jig settled before `drag()` returns its
    /// outcome without running; a consumed jig returns [`JigError::Spent`].
    pub async fn drag(&self) -> Result<B::Output, JigError> {
        if !self.jig_loop.begin() {
            return self.jig_loop.take_outcome();
        }
        debug!("jig drag started");

        let view = self.view.as_ref();
        let token = self.jig_loop.shared.token.clone();
        let ticker = self
            .jig_loop
            .run(|pointer| self.behavior.update(view, pointer));
        let sampler = async {
            tokio::select! {
                biased;
                sampled = self.behavior.sampler(view, &self.jig_loop) => {
                    if let Err(err) = sampled {
                        self.jig_loop.fail(JigError::Sampler(format!("{err:#}")));
                    }
                }
                _ = token.cancelled() => debug!("sampler dropped on jig termination"),
            }
        };
        tokio::join!(ticker, sampler);

        let outcome = self.jig_loop.take_outcome();
        debug!(state = ?self.state(), ticks = self.ticks(), "jig drag settled");
        outcome
    }
}

type CancelFn = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Slot holding the canceller of the jig currently running in a context.
#[derive(Default)]
pub struct InteractionSlot {
    active: Mutex<Option<CancelFn>>,
}

impl InteractionSlot {
    /// Makes `canceller` the active jig until the returned guard drops.
    pub fn track<T: Send + 'static>(&self, canceller: JigCanceller<T>) -> InteractionGuard<'_> {
        let cancel: CancelFn = Box::new(move |reason: &str| canceller.cancel(reason));
        let previous = self.active.lock().replace(cancel);
        if previous.is_some() {
            warn!("replaced an active jig that was still tracked");
        }
        InteractionGuard { slot: self }
    }

    pub fn is_active(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Rejects the active jig, if any.
    pub fn cancel(&self, reason: &str) -> bool {
        let active = self.active.lock().take();
        let Some(cancel) = active else {
            return false;
        };
        let cancelled = cancel(reason);
        debug!(reason, cancelled, "routed cancellation to active jig");
        cancelled
    }
}

impl fmt::Debug for InteractionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionSlot")
            .field("active", &self.is_active())
            .finish()
    }
}

pub struct InteractionGuard<'a> {
    slot: &'a InteractionSlot,
}

impl Drop for InteractionGuard<'_> {
    fn drop(&mut self) {
        self.slot.active.lock().take();
    }
}

#[cfg(test)]
#[path = "tests/jig_tests.rs"]
mod tests;
