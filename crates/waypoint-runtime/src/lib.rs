#![forbid(unsafe_code)]

//! Runtime primitives for Waypoint.
//!
//! The tour runtime is single-threaded and cooperative. Nothing blocks; all
//! waiting is expressed as timers that the host drives by advancing a clock.
//!
//! - [`Signal`]: single-slot broadcast mailbox with replay to late
//!   subscribers.
//! - [`Scheduler`]: deterministic timer queue with cancellation tokens.
//! - [`MonotonicClock`]: converts wall-clock time into scheduler steps.

pub mod clock;
pub mod scheduler;
pub mod signal;

pub use clock::MonotonicClock;
pub use scheduler::{CancelToken, Scheduler, TimerId};
pub use signal::{Signal, Subscription};
