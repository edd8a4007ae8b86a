//! Fiber Engine - the work unit tree.
//!
//! Every instantiated element is a [`Fiber`] stored in a [`FiberArena`] and
//! addressed by [`FiberId`]. Links between fibers are ids, never references:
//!
//! ```text
//! #0 root  (host=container, child=#1)
//! #1 div   (parent=#0, child=#2, alternate=#5)
//! #2 h1    (parent=#1, sibling=#3)
//! #3 p     (parent=#1)
//! ```
//!
//! The committed generation and the work-in-progress generation live in the
//! same arena; `alternate` connects a work-in-progress fiber to its committed
//! counterpart.

mod arena;
mod fiber;

pub use arena::*;
pub use fiber::*;
