//! Interval sequencing for pomotune
//!
//! A session is built once from a [`SessionConfig`] and then advanced by
//! [`reduce`], one action at a time. Nothing in here sleeps, spawns or does
//! I/O: the caller owns the clock and decides what to do when an interval
//! ends.

mod reducer;
mod session;

pub use reducer::{reduce, Action, TimerState};
pub use session::{create_session, Interval, IntervalKind, SessionConfig, TimerSession};
