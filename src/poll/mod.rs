//! Page polling
//!
//! A [`PollingController`] owns at most one ticker task for one fetcher and
//! publishes results on a `watch` channel.

mod controller;

pub use controller::{PollState, PollingController, MIN_INTERVAL};
