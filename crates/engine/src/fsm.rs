use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid state transition {from:?} -> {to:?}")]
pub struct TransitionError<S: Debug> {
    pub from: S,
    pub to: S,
}

/// Transition table keyed by ordered state pairs. Each edge carries action
/// data that the owner applies after a successful transition, so the table can
/// be inspected and tested without running side effects.
#[derive(Debug, Clone)]
pub struct StateMachine<S, A> {
    current: S,
    transitions: HashMap<(S, S), A>,
}

impl<S, A> StateMachine<S, A>
where
    S: Copy + Eq + Hash + Debug,
    A: Clone,
{
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            transitions: HashMap::new(),
        }
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    /// Registers the edge `from -> to`, replacing any earlier action for the pair.
    pub fn add_transition(&mut self, from: S, to: S, action: A) {
        self.transitions.insert((from, to), action);
    }

    pub fn can_transition(&self, to: S) -> bool {
        self.transitions.contains_key(&(self.current, to))
    }

    pub fn action_for(&self, from: S, to: S) -> Option<&A> {
        self.transitions.get(&(from, to))
    }

    pub fn transitions(&self) -> impl Iterator<Item = (S, S, &A)> + '_ {
        self.transitions
            .iter()
            .map(|(&(from, to), action)| (from, to, action))
    }

    /// Commits `to` and returns the edge's action. A missing edge is logged and
    /// leaves the current state untouched.
    pub fn transition(&mut self, to: S) -> Result<A, TransitionError<S>> {
        let Some(action) = self.transitions.get(&(self.current, to)).cloned() else {
            let err = TransitionError {
                from: self.current,
                to,
            };
            error!(from = ?err.from, to = ?err.to, "fsm_invalid_transition");
            return Err(err);
        };
        self.current = to;
        Ok(action)
    }
}

/// One-shot countdown measured in the caller's time unit. `tick` yields the
/// pending event exactly once, on the tick that crosses zero from above.
#[derive(Debug, Clone)]
pub struct Countdown<E> {
    remaining: f32,
    on_expire: Option<E>,
}

impl<E> Default for Countdown<E> {
    fn default() -> Self {
        Self {
            remaining: 0.0,
            on_expire: None,
        }
    }
}

impl<E: Clone> Countdown<E> {
    pub fn start(&mut self, duration: f32, on_expire: E) {
        self.remaining = duration;
        self.on_expire = Some(on_expire);
    }

    pub fn clear(&mut self) {
        self.remaining = 0.0;
        self.on_expire = None;
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn pending(&self) -> Option<&E> {
        self.on_expire.as_ref()
    }

    pub fn tick(&mut self, dt: f32) -> Option<E> {
        let already_elapsed = self.remaining <= 0.0;
        self.remaining -= dt;
        if !already_elapsed && self.remaining <= 0.0 {
            return self.on_expire.clone();
        }
        None
    }
}
