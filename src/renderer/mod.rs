//! Renderer Module - the host boundary.
//!
//! The engine talks to a UI surface only through [`HostRenderer`]. Two hosts
//! ship with the crate:
//!
//! - [`MemoryHost`] - an in-memory tree with an operation log, for tests and
//!   headless use
//! - [`TerminalHost`] - a Taffy laid-out tree painted with crossterm
//!
//! [`PropDiff`] is what an UPDATE effect hands to the host.

pub mod diff;
pub mod host;
pub mod memory;
pub mod terminal;

pub use diff::PropDiff;
pub use host::{HostRenderer, HostType};
pub use memory::{HostId, HostOp, MemoryHost, MemoryNode};
pub use terminal::{TerminalConfig, TerminalHost, TextRun};
