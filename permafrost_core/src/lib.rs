// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Freeze-scope tree, update gating, and render-effectiveness profiling.
//!
//! `permafrost_core` lets a host UI engine mark subtrees as *frozen*:
//! their pending updates are discarded instead of reconciled, their
//! interaction surface is disabled, and (through an optional platform
//! notifier) their native views can be dropped from render work entirely.
//! It is `no_std` compatible (with `alloc`) and uses array-based
//! struct-of-arrays storage with index handles for cache-friendly
//! traversal.
//!
//! # Architecture
//!
//! The crate is organized around a commit pass that turns host mutations
//! into incremental freeze decisions:
//!
//! ```text
//!   Host (set_freeze / set_content / topology)
//!       │
//!       ▼
//!   ScopeStore::commit() ──► CommitChanges ──► apply_transitions()
//!                                  │                  │
//!                                  ▼                  ▼
//!                          rendered/skipped     FreezeNotifier
//!                                  │
//!                                  ▼
//!   FreezeProfiler ──► RenderCorrelator ──► MetricsRecord ──► ReportSink
//! ```
//!
//! **[`scope`]** — Struct-of-arrays freeze tree with generational handles.
//! The freeze request, content identity, and view handle are set by the
//! caller; effective flags and skip decisions are computed by the commit.
//!
//! **[`freeze`]** — The pure decision logic: the per-scope state machine,
//! the effective-flag combinator, and the update-skip rule.
//!
//! **[`dirty`]** — Multi-channel dirty tracking via `understory_dirty`.
//! Property mutations automatically mark the appropriate channel. FREEZE
//! propagates to descendants; CONTENT is local-only; TOPOLOGY triggers a
//! traversal rebuild.
//!
//! **[`host`]** — The [`FreezeNotifier`](host::FreezeNotifier) and
//! [`UpdateGate`](host::UpdateGate) traits that host engines implement and
//! consult, plus [`apply_transitions`](host::apply_transitions) for
//! dispatching a commit's transitions.
//!
//! **[`profile`]** — Per-subtree render-effectiveness measurement:
//! generation-keyed correlation of parent/child timing boundaries into
//! metrics records.
//!
//! **[`time`]** — Platform-tick time types and rational timebase
//! conversion.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod freeze;
pub mod host;
pub mod profile;
pub mod scope;
pub mod time;
