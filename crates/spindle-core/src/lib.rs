//! Array lifecycle controller between `spindle-api` and UI consumers.
//!
//! This crate owns the business logic and state model for the Spindle
//! storage console:
//!
//! - **[`ArrayController`]** — Central facade managing the full lifecycle:
//!   [`activate()`](ArrayController::activate) seeds state from the snapshot
//!   cache, performs an immediate fetch, then spawns cancellable background
//!   poll tasks. [`ArrayController::oneshot()`] provides a lightweight mode
//!   for single CLI invocations.
//!
//! - **[`eligibility`]** — Pure predicates deciding which operator actions
//!   are currently legal for an array, member device, or physical disk.
//!   The single source of truth: affordance rendering and the dispatcher's
//!   defensive re-validation both consult these functions.
//!
//! - **[`SnapshotCache`]** — TTL-bound cache of the last-known snapshots so
//!   a freshly opened view renders instantly while the first poll runs.
//!
//! - **[`ActionGate`]** — Single-permit gate guaranteeing at most one
//!   mutating operation in flight across the whole controller.
//!
//! - **[`Command`]** — Typed mutation requests, validated locally, then
//!   dispatched as exactly one remote call followed by a forced re-poll.
//!
//! - **Domain model** ([`model`]) — Canonical types (`RaidArray`,
//!   `ArrayMember`, `AvailableDisk`, `SpeedLimits`) projected wholesale
//!   from each successful poll response.

pub mod cache;
pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod eligibility;
pub mod error;
pub mod gate;
pub mod model;
pub mod notify;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{KeyValueStore, MemoryStore, SnapshotCache, StoredEntry, SNAPSHOT_TTL};
pub use command::{Command, CommandOutcome};
pub use config::{ControllerConfig, TlsVerification};
pub use controller::ArrayController;
pub use error::CoreError;
pub use gate::{ActionGate, ActionPermit};
pub use notify::{AutoConfirm, ConfirmPrompt, Notifier, NullNotifier};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ArrayMember, ArrayStatus, AvailableDisk, CacheVolume, DiskSnapshot, MemberState, RaidArray,
    SpeedLimits, StatusSnapshot,
};
