//! Murmur Room Controller
//!
//! Core library for a small voice-session server: funnels requests from many
//! concurrent callers into the single legal calling thread of an external
//! real-time-communication backend, and tracks the lifecycle of logical voice
//! rooms independently of that bridge.
//!
//! # Architecture
//!
//! ```text
//! caller tasks ── submit ──▶ BridgeHandle ──┐
//!                                           │ pending queue (mpsc)
//! driver task ── tick() ──▶ RequestBridge ──┴──▶ RtcBackend (one call per tick)
//!      │                         ▲
//!      │                         └── CompletionSink::report (any thread)
//!      └──▶ SessionDirectory::remove_expired_sessions (once per cycle)
//! ```
//!
//! Each submission returns a [`bridge::Receipt`]; the caller awaits it for
//! the operation's terminal outcome. The backend may report "still retrying"
//! any number of times before exactly one terminal report, and the bridge
//! never issues a second call for the same operation.
//!
//! Session lifecycle (create/join/kick/mute/heartbeat/expire) runs directly
//! against [`rooms::SessionDirectory`] and per-session locks, independent of
//! the bridge. Expired rooms are reaped by the driver task once per cycle.
//!
//! # Key Design Decisions
//!
//! - **Ownership as thread affinity**: only the task that owns the
//!   [`bridge::RequestBridge`] can reach the backend, so the backend's
//!   "single legal calling thread" contract is enforced by the type system.
//! - **One operation per tick**: bursts drain over successive ticks, a
//!   deliberate backpressure valve in front of the backend.
//! - **Arena correlation**: backend callbacks carry a stable integer
//!   operation id, never a pointer, so a late completion cannot dangle.
//! - **Caller-side ban enforcement**: sessions record bans but do not refuse
//!   banned participants in `add_user`; callers gate on `is_banned` first.
//!
//! The transport layer, request (de)serialization, and process bootstrap are
//! the embedding process's concern; this crate consumes already-validated
//! parameter objects ([`rooms::messages`]) and produces typed outcomes.

pub mod bridge;
pub mod config;
pub mod errors;
pub mod observability;
pub mod rooms;
pub mod tasks;
