//! # Ambiguity timer
//!
//! ## Overview
//!
//! When the buffered keys exactly match a remapping that a longer one could extend, the engine
//! waits before choosing. The [AmbiguityTimer] tracks that wait.
//!
//! Every time the timer is armed it starts a new episode, identified by an [EpisodeId]. Hosts
//! are given a [TimerTicket] to schedule, and hand the ticket's episode back to the engine once
//! it fires. Tickets from older episodes are ignored, so a host doesn't need to cancel them.
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::table::Remapping;

/// Identifies one wait for more input.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EpisodeId(u64);

#[derive(Debug, Default)]
struct IdGenerator {
    next_id: u64,
}

impl IdGenerator {
    fn next(&mut self) -> EpisodeId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        return EpisodeId(id);
    }
}

/// A request for the host to call back into the engine after a delay.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimerTicket {
    /// The episode to pass back to the engine.
    pub episode: EpisodeId,

    /// How long to wait before calling back.
    pub duration: Duration,
}

/// What to do with the buffered keys if the timer expires.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Fallback<K> {
    /// Apply the longest remapping that the buffered keys exactly matched.
    Commit(Arc<Remapping<K>>),

    /// Treat the first buffered key as unmapped, and examine the rest again.
    Flush,
}

#[derive(Debug)]
struct PendingTimer<K> {
    ticket: TimerTicket,
    deadline: Instant,
    fallback: Fallback<K>,
}

/// Tracks the current wait for more input, if there is one.
#[derive(Debug)]
pub struct AmbiguityTimer<K> {
    idgen: IdGenerator,
    pending: Option<PendingTimer<K>>,
}

impl<K> AmbiguityTimer<K> {
    /// Create a new, disarmed timer.
    pub fn new() -> Self {
        AmbiguityTimer { idgen: IdGenerator::default(), pending: None }
    }

    /// Start a new episode, replacing any earlier one.
    pub fn arm(&mut self, duration: Duration, fallback: Fallback<K>, now: Instant) -> TimerTicket {
        let ticket = TimerTicket { episode: self.idgen.next(), duration };
        let deadline = now + duration;

        self.pending = Some(PendingTimer { ticket, deadline, fallback });

        return ticket;
    }

    /// Stop waiting, and return the ticket for the episode that was cancelled.
    pub fn cancel(&mut self) -> Option<TimerTicket> {
        self.pending.take().map(|p| p.ticket)
    }

    /// The ticket for the current episode.
    pub fn pending(&self) -> Option<TimerTicket> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    /// When the current episode expires.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Whether `episode` is the one currently being waited on.
    pub fn is_current(&self, episode: EpisodeId) -> bool {
        self.pending.as_ref().map_or(false, |p| p.ticket.episode == episode)
    }

    /// End the given episode, and return its fallback.
    ///
    /// Nothing is returned if the episode has already ended or been replaced.
    pub fn expire(&mut self, episode: EpisodeId) -> Option<Fallback<K>> {
        if !self.is_current(episode) {
            return None;
        }

        self.pending.take().map(|p| p.fallback)
    }

    /// End the current episode if its deadline has passed, and return its fallback.
    pub fn expire_due(&mut self, now: Instant) -> Option<Fallback<K>> {
        match self.deadline() {
            Some(deadline) if deadline <= now => self.pending.take().map(|p| p.fallback),
            _ => None,
        }
    }
}

impl<K> Default for AmbiguityTimer<K> {
    fn default() -> Self {
        AmbiguityTimer::new()
    }
}
