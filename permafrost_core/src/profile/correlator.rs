// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generation-keyed correlation of parent and child render samples.
//!
//! Two independently-firing timing signals have to be attributed to the
//! same logical render cycle: an outer ("parent") boundary that always
//! fires, and an inner ("child") boundary that fires only if the wrapped
//! subtree actually rendered. The correlator keys both on a *generation* —
//! a counter that advances by exactly one per outer firing.
//!
//! # Protocol
//!
//! 1. Outer firing: the pre-increment counter value becomes the cycle's
//!    generation; the parent sample is recorded under it; only then does
//!    the counter advance.
//! 2. Inner firing: attributed to the most recently opened generation.
//!    The outer boundary wraps the inner one in the tree, so within one
//!    commit the outer callback fires strictly before the inner one.
//! 3. Completion: a generation is reportable once its parent sample is
//!    present and either its child sample is present or freeze was
//!    requested for the cycle — in which case the child time is
//!    substituted with zero, the expected absence of a child render.
//! 4. On completion the sample is evicted; the live set never retains
//!    completed generations.
//!
//! # Known limitation
//!
//! If freeze was *not* requested and the inner boundary never fires (the
//! subtree was removed, errored, or conditionally not rendered for
//! unrelated reasons), the generation never completes and its sample is
//! never evicted. The live set grows, bounded only by total renders. This
//! is deliberately preserved rather than aged out: silently dropping the
//! sample would hide the missing-child condition the leak makes visible.
//! [`live_generations`](RenderCorrelator::live_generations) exposes the
//! current size for diagnostics.

use alloc::collections::BTreeMap;
use core::fmt;

use crate::time::Duration;

/// Identifier of one render cycle.
///
/// Strictly increasing by one per outer-boundary firing within a single
/// correlator.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generation({})", self.0)
    }
}

/// An incomplete cycle in the live set.
#[derive(Clone, Copy, Debug)]
struct RenderSample {
    parent: Option<Duration>,
    child: Option<Duration>,
    freeze_requested: bool,
}

/// A completed cycle, ready for aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletedGeneration {
    /// Which cycle completed.
    pub generation: Generation,
    /// The outer boundary's measured time.
    pub parent_time: Duration,
    /// The inner boundary's measured time, or zero for a frozen cycle.
    pub child_time: Duration,
    /// Whether freeze was requested for the cycle.
    pub freeze_requested: bool,
}

/// Owns one subtree's generation counter and live sample set.
///
/// Exclusively owned: one correlator per profiled subtree. Sharing one
/// across unrelated subtrees would corrupt generation attribution, since
/// the counter encodes "which cycle is currently open".
#[derive(Debug, Default)]
pub struct RenderCorrelator {
    counter: u64,
    live: BTreeMap<u64, RenderSample>,
}

impl RenderCorrelator {
    /// Creates an empty correlator. The first outer firing opens
    /// generation 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an outer-boundary firing.
    ///
    /// Opens a new generation at the pre-increment counter value, then
    /// advances the counter. Returns the completed cycle immediately when
    /// `freeze_requested` is set, since no child render is expected.
    pub fn parent_rendered(
        &mut self,
        duration: Duration,
        freeze_requested: bool,
    ) -> Option<CompletedGeneration> {
        let g = self.counter;
        self.live.insert(
            g,
            RenderSample {
                parent: Some(duration),
                child: None,
                freeze_requested,
            },
        );
        self.counter += 1;
        self.try_complete(g)
    }

    /// Records an inner-boundary firing, attributed to the most recently
    /// opened generation.
    ///
    /// A child signal with no open generation, or whose generation already
    /// completed (a late child under a frozen cycle), cannot be attributed;
    /// it is logged and dropped. Callers count the firing regardless.
    pub fn child_rendered(&mut self, duration: Duration) -> Option<CompletedGeneration> {
        let Some(g) = self.counter.checked_sub(1) else {
            log::debug!("child render signal before any parent boundary; dropped");
            return None;
        };
        match self.live.get_mut(&g) {
            Some(sample) => {
                sample.child = Some(duration);
                self.try_complete(g)
            }
            None => {
                log::debug!("child render signal for settled generation {g}; dropped");
                None
            }
        }
    }

    /// The number of generations opened so far.
    #[must_use]
    pub fn generations_opened(&self) -> u64 {
        self.counter
    }

    /// The number of incomplete generations currently held live.
    ///
    /// A steadily growing value indicates unfrozen cycles whose child
    /// boundary never fires (see the [module docs](self)).
    #[must_use]
    pub fn live_generations(&self) -> usize {
        self.live.len()
    }

    /// Evicts and returns generation `g` if it satisfies the completion
    /// rule.
    fn try_complete(&mut self, g: u64) -> Option<CompletedGeneration> {
        let sample = self.live.get(&g)?;
        let parent_time = sample.parent?;
        let child_time = match (sample.child, sample.freeze_requested) {
            (Some(d), _) => d,
            // Expected absence of a child render under freeze.
            (None, true) => Duration::ZERO,
            (None, false) => return None,
        };
        let freeze_requested = sample.freeze_requested;
        self.live.remove(&g);
        Some(CompletedGeneration {
            generation: Generation(g),
            parent_time,
            child_time,
            freeze_requested,
        })
    }
}
