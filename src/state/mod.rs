//! Component state.
//!
//! - [`hooks`] - per-fiber hook records, state setters and the update queue

pub mod hooks;

pub use hooks::{HookRecord, Hooks, StateSetter, UpdateQueue, UpdateRequest};
