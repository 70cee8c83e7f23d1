//! # Remap engine
//!
//! ## Overview
//!
//! The [RemapEngine] sits between the source of keypresses and the [ActionDispatcher] that
//! interprets them. Each key is added to a buffer, and the buffer is classified against the
//! tables for the host's current mode:
//!
//! - An exact match that can't be extended is applied immediately.
//! - An exact match that could be extended is remembered, and the engine waits for another key
//!   or for its timer to expire.
//! - A partial match waits for another key.
//! - When nothing matches, the remembered exact match is applied if there is one. Otherwise,
//!   the first buffered key goes to the dispatcher unchanged, and the remaining keys are
//!   examined again.
//!
//! Applying a recursive remapping puts its keys at the front of the queue, so that they are
//! examined before anything the user has typed since. Applying a non-recursive remapping
//! executes its keys directly.
//!
//! The engine processes keys synchronously, so a timer can never fire while a remapping is
//! being applied. Hosts should deliver the episode of each [TimerTicket] they were given to
//! [RemapEngine::timeout] from the same thread that delivers keys, or call
//! [RemapEngine::poll_timeout] from their event loop.
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, trace, warn};

use crate::buffer::{KeyBuffer, QueuedKey};
use crate::errors::RemapError;
use crate::host::{Execution, RemapHost};
use crate::provider::ConfigProvider;
use crate::resolve::{Classification, MatchResolver};
use crate::table::{RemapAction, RemapTables, Remapping};
use crate::timer::{AmbiguityTimer, EpisodeId, Fallback, TimerTicket};
use crate::undo::UndoScopeManager;
use crate::{InputKey, RemapMode};

/// Options that control how keys are resolved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineOptions {
    /// How long to wait for another key when the buffer matches a remapping ambiguously.
    pub timeout: Duration,

    /// How many remappings can be applied in a row without an action being executed.
    pub max_map_depth: usize,

    /// Whether to also time out when the buffer only partially matches a remapping.
    pub timeout_incomplete: bool,

    /// How many remappings a single chain can apply in total, even when actions run between
    /// them.
    pub max_chain_length: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            timeout: Duration::from_millis(1000),
            max_map_depth: 1000,
            timeout_incomplete: false,
            max_chain_length: 100_000,
        }
    }
}

/// The progress of the current chain of remappings.
#[derive(Clone, Debug)]
pub struct RemapState<K> {
    performing: bool,
    depth: usize,
    applied: usize,
    fallback: Option<Arc<Remapping<K>>>,
}

impl<K> RemapState<K> {
    /// Whether keys produced by a remapping are still waiting to be handled.
    pub fn is_performing_remap(&self) -> bool {
        self.performing
    }

    /// How many remappings have been applied since an action was last executed.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// How many remappings the current chain has applied.
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// The remapping to apply if the buffered keys turn out not to be the start of a longer
    /// one.
    pub fn fallback(&self) -> Option<&Arc<Remapping<K>>> {
        self.fallback.as_ref()
    }
}

impl<K> Default for RemapState<K> {
    fn default() -> Self {
        RemapState { performing: false, depth: 0, applied: 0, fallback: None }
    }
}

/// Resolves typed keys against remapping tables.
pub struct RemapEngine<K: InputKey, M: RemapMode> {
    provider: Arc<ConfigProvider<K, M>>,
    tables: Arc<RemapTables<K, M>>,
    options: EngineOptions,

    buffer: KeyBuffer<K, M>,
    queue: VecDeque<QueuedKey<K>>,
    state: RemapState<K>,
    timer: AmbiguityTimer<K>,
    undo: UndoScopeManager,
}

impl<K: InputKey, M: RemapMode> RemapEngine<K, M> {
    /// Create an engine that reads its tables from `provider`.
    pub fn new(provider: Arc<ConfigProvider<K, M>>, options: EngineOptions) -> Self {
        let tables = provider.snapshot();

        RemapEngine {
            provider,
            tables,
            options,

            buffer: KeyBuffer::new(),
            queue: VecDeque::new(),
            state: RemapState::default(),
            timer: AmbiguityTimer::new(),
            undo: UndoScopeManager::new(),
        }
    }

    /// Create an engine with a fixed set of tables.
    pub fn from_tables(tables: RemapTables<K, M>, options: EngineOptions) -> Self {
        RemapEngine::new(Arc::new(ConfigProvider::new(tables)), options)
    }

    /// The provider this engine reads its tables from.
    pub fn provider(&self) -> &Arc<ConfigProvider<K, M>> {
        &self.provider
    }

    /// The options currently in use.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Change the options used for future keys.
    pub fn set_options(&mut self, options: EngineOptions) {
        self.options = options;
    }

    /// The progress of the current chain of remappings.
    pub fn state(&self) -> &RemapState<K> {
        &self.state
    }

    /// Keys that might still be the start of a remapping.
    pub fn pending_keys(&self) -> &[K] {
        self.buffer.keys()
    }

    /// The ticket for the timer that the engine is currently waiting on.
    pub fn pending_timer(&self) -> Option<TimerTicket> {
        self.timer.pending()
    }

    /// Whether the engine has nothing left to do.
    pub fn is_idle(&self) -> bool {
        self.buffer.is_empty() && self.queue.is_empty() && !self.state.performing
    }

    /// Process a key typed by the user.
    pub fn input_key<H: RemapHost<K, M>>(&mut self, key: K, host: &mut H) -> Result<(), RemapError> {
        self.input_keys(Some(key), host)
    }

    /// Process several keys typed by the user, in order.
    ///
    /// This behaves the same as calling [RemapEngine::input_key] for each key.
    pub fn input_keys<H, I>(&mut self, keys: I, host: &mut H) -> Result<(), RemapError>
    where
        H: RemapHost<K, M>,
        I: IntoIterator<Item = K>,
    {
        self.disarm(host);
        self.queue.extend(keys.into_iter().map(QueuedKey::user));
        self.run(host, Ok(()))
    }

    /// Handle the expiration of a timer scheduled by the engine.
    ///
    /// Timers for episodes that have already ended are ignored.
    pub fn timeout<H: RemapHost<K, M>>(
        &mut self,
        episode: EpisodeId,
        host: &mut H,
    ) -> Result<(), RemapError> {
        let Some(fallback) = self.timer.expire(episode) else {
            trace!(?episode, "Ignoring timeout for an episode that already ended");
            return Ok(());
        };

        self.expire(fallback, host)
    }

    /// Handle the current timer if it expired at or before `now`.
    ///
    /// This returns whether there was a timer to handle.
    pub fn poll_timeout<H: RemapHost<K, M>>(
        &mut self,
        now: Instant,
        host: &mut H,
    ) -> Result<bool, RemapError> {
        match self.timer.expire_due(now) {
            Some(fallback) => self.expire(fallback, host).map(|_| true),
            None => Ok(false),
        }
    }

    /// Send every pending key to the dispatcher without applying any remappings.
    ///
    /// Hosts should call this before changing modes for reasons other than a key.
    pub fn flush<H: RemapHost<K, M>>(&mut self, host: &mut H) -> Result<(), RemapError> {
        self.disarm(host);
        self.flush_buffer();
        self.run(host, Ok(()))
    }

    fn expire<H: RemapHost<K, M>>(
        &mut self,
        fallback: Fallback<K>,
        host: &mut H,
    ) -> Result<(), RemapError> {
        debug!(keys = %self.describe_pending(), "Timed out waiting for more keys");

        let res = match fallback {
            Fallback::Commit(remap) => self.commit(remap, host),
            Fallback::Flush => {
                self.state.fallback = None;
                self.break_buffer(host)
            },
        };

        self.run(host, res)
    }

    /// Examine queued keys until the queue is empty, and then wait for more if needed.
    fn run<H: RemapHost<K, M>>(
        &mut self,
        host: &mut H,
        res: Result<(), RemapError>,
    ) -> Result<(), RemapError> {
        let mut res = self.check(res, host);
        self.settle_chain(host);

        while let Some(key) = self.queue.pop_front() {
            let step = self.examine(key, host);
            let step = self.check(step, host);

            if res.is_ok() {
                res = step;
            }

            self.settle_chain(host);
        }

        self.arm(host);

        return res;
    }

    fn check<H: RemapHost<K, M>>(
        &mut self,
        res: Result<(), RemapError>,
        host: &mut H,
    ) -> Result<(), RemapError> {
        if let Err(e) = &res {
            if e.is_fatal() {
                error!(error = %e, "Aborting remapping");
                self.abort(host);
            } else {
                warn!(error = %e, "Failed to apply remapping");
            }
        }

        return res;
    }

    fn examine<H: RemapHost<K, M>>(
        &mut self,
        mut key: QueuedKey<K>,
        host: &mut H,
    ) -> Result<(), RemapError> {
        let mode = host.mode().remap_scope();

        if matches!(self.buffer.mode(), Some(m) if m != mode) {
            debug!(keys = %self.describe_pending(), "Mode changed while keys were pending");
            self.queue.push_front(key);
            self.flush_buffer();

            return Ok(());
        }

        if !key.noremap && !host.allows_remap(&key.key) {
            trace!(key = %key.key, "Host doesn't allow remapping key");
            key.noremap = true;
        }

        if key.noremap {
            if self.buffer.is_empty() {
                self.dispatch(key, host);

                return Ok(());
            }

            self.queue.push_front(key);

            return self.break_buffer(host);
        }

        if self.buffer.is_empty() && !self.state.performing {
            self.tables = self.provider.snapshot();
        }

        self.buffer.push(key.key, key.origin, mode);

        match MatchResolver::classify(self.tables.pair(mode), self.buffer.keys()) {
            Classification::Exact(remap) => self.commit(remap, host),
            Classification::Ambiguous(remap) => {
                trace!(keys = %remap.describe(), "Found a remapping that might be extended");
                self.state.fallback = Some(remap);

                Ok(())
            },
            Classification::Potential => Ok(()),
            Classification::NoMatch => self.break_buffer(host),
        }
    }

    /// Resolve a buffer that can't match anything longer.
    fn break_buffer<H: RemapHost<K, M>>(&mut self, host: &mut H) -> Result<(), RemapError> {
        if let Some(remap) = self.state.fallback.take() {
            return self.commit(remap, host);
        }

        let mut keys = self.buffer.take().into_iter();

        if let Some(first) = keys.next() {
            self.requeue(keys);
            self.dispatch(first, host);
        }

        Ok(())
    }

    fn commit<H: RemapHost<K, M>>(
        &mut self,
        remap: Arc<Remapping<K>>,
        host: &mut H,
    ) -> Result<(), RemapError> {
        let (_, rest) = self.buffer.split(remap.before().len());
        self.state.fallback = None;
        self.requeue(rest.into_iter());

        if self.state.performing {
            self.state.depth += 1;
        } else {
            self.state.performing = true;
            self.state.depth = 1;
        }

        self.state.applied += 1;
        self.undo.enter(host);

        if self.state.depth > self.options.max_map_depth {
            return Err(RemapError::RecursiveMapping { depth: self.options.max_map_depth });
        }

        // Actions reset the depth, so loops that never fail are bounded here instead.
        if self.state.applied > self.options.max_chain_length {
            return Err(RemapError::RecursiveMapping { depth: self.options.max_chain_length });
        }

        debug!(
            keys = %remap.describe(),
            depth = self.state.depth,
            recursive = remap.is_recursive(),
            "Applying remapping"
        );

        match remap.action() {
            RemapAction::Keys(after) if remap.is_recursive() => {
                // Keys that repeat the remapping's own trigger start with an unmapped key.
                let skip = if remap.is_self_prefixed() { 1 } else { 0 };
                let keys = after
                    .iter()
                    .enumerate()
                    .map(|(i, key)| QueuedKey::remapped(key.clone(), i < skip))
                    .collect::<Vec<_>>();

                self.requeue(keys.into_iter());
            },
            RemapAction::Keys(after) => {
                if !after.is_empty() {
                    let mode = host.mode();

                    if let Execution::Failed { index, error } = host.execute(after, mode) {
                        debug!(
                            keys = %remap.describe(),
                            index,
                            error = %error,
                            "Remapped keys failed to execute"
                        );
                        self.truncate();
                    }
                }

                self.state.depth = 0;
            },
            RemapAction::Commands(cmds) => {
                self.state.depth = 0;

                for cmd in cmds {
                    if let Err(e) = host.invoke_command(&cmd.name, &cmd.args) {
                        self.truncate();

                        return Err(RemapError::Command {
                            name: cmd.name.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            },
        }

        Ok(())
    }

    fn dispatch<H: RemapHost<K, M>>(&mut self, key: QueuedKey<K>, host: &mut H) {
        let mode = host.mode();

        trace!(key = %key.key, "Executing unmapped key");

        let res = host.execute(std::slice::from_ref(&key.key), mode);

        if let Execution::Failed { error, .. } = res {
            if key.is_remapped() {
                debug!(key = %key.key, error = %error, "Remapped key failed to execute");
                self.truncate();
            } else {
                trace!(key = %key.key, error = %error, "Typed key failed to execute");
            }
        }

        self.state.depth = 0;
    }

    /// Discard the keys still waiting from the current chain of remappings.
    fn truncate(&mut self) {
        let queued = self.queue.len();
        self.queue.retain(|key| !key.is_remapped());

        let dropped = queued - self.queue.len();

        if dropped > 0 {
            debug!(dropped, "Discarding the rest of the remapped keys");
        }
    }

    fn abort<H: RemapHost<K, M>>(&mut self, host: &mut H) {
        self.buffer.clear();
        self.state.fallback = None;
        self.truncate();
        self.disarm(host);
        self.finish_chain(host);
    }

    fn requeue<I>(&mut self, keys: I)
    where
        I: DoubleEndedIterator<Item = QueuedKey<K>>,
    {
        for key in keys.rev() {
            self.queue.push_front(key);
        }
    }

    /// Move every buffered key back onto the queue, to be executed unmapped.
    fn flush_buffer(&mut self) {
        self.state.fallback = None;

        let keys = self.buffer.take().into_iter().map(|mut key| {
            key.noremap = true;
            key
        });

        self.requeue(keys);
    }

    fn settle_chain<H: RemapHost<K, M>>(&mut self, host: &mut H) {
        if !self.state.performing {
            return;
        }

        if self.buffer.has_remapped() || self.queue.iter().any(QueuedKey::is_remapped) {
            return;
        }

        self.finish_chain(host);
    }

    fn finish_chain<H: RemapHost<K, M>>(&mut self, host: &mut H) {
        trace!(applied = self.undo.applied(), "Finished applying remappings");

        self.state.performing = false;
        self.state.depth = 0;
        self.state.applied = 0;
        self.undo.finish(host);
    }

    fn arm<H: RemapHost<K, M>>(&mut self, host: &mut H) {
        if self.buffer.is_empty() || !self.queue.is_empty() {
            return;
        }

        let fallback = match &self.state.fallback {
            Some(remap) => Fallback::Commit(remap.clone()),
            None if self.options.timeout_incomplete => Fallback::Flush,
            None => return,
        };

        let ticket = self.timer.arm(self.options.timeout, fallback, Instant::now());

        debug!(
            episode = ?ticket.episode,
            keys = %self.describe_pending(),
            "Waiting for more keys"
        );

        host.schedule(ticket);
    }

    fn disarm<H: RemapHost<K, M>>(&mut self, host: &mut H) {
        if let Some(ticket) = self.timer.cancel() {
            host.cancel(ticket.episode);
        }
    }

    fn describe_pending(&self) -> String {
        self.buffer.keys().iter().map(ToString::to_string).collect()
    }
}
