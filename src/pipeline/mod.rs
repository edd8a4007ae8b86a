//! Render Pipeline
//!
//! Turns element trees into host mutations in two phases.
//!
//! # Pipeline Architecture
//!
//! ```text
//! render(element) → work_loop: perform_unit × N (interruptible) → commit (atomic)
//! ```
//!
//! ## Data Flow
//!
//! 1. **render** - seeds a work-in-progress root for the container
//! 2. **scheduler** - builds the work-in-progress fiber tree one unit at a
//!    time, yielding when the deadline runs low
//! 3. **reconcile** - at each unit, matches new child elements against the
//!    previous generation and tags effects
//! 4. **commit** - applies deletions, placements and updates to the host in
//!    one synchronous pass
//!
//! ## Key Design Principles
//!
//! - **Pure render phase**: the attached host tree only changes in commit
//! - **Last build wins**: a newer build replaces an unfinished one
//! - **Explicit session**: all state lives in a [`RenderSession`]

pub mod commit;
pub mod mount;
pub mod reconcile;
pub mod scheduler;

// Re-exports
pub use commit::CommitStats;
pub use mount::{ROOT_TAG, RenderSession, run_until_idle};
pub use reconcile::{reconcile_children, same_type};
pub use scheduler::{Deadline, FrameDeadline, StepBudget, Unbounded, WorkStatus};
