//! # spark-fiber
//!
//! Incremental fiber reconciler with cooperative scheduling.
//!
//! Given a declarative element tree, spark-fiber computes the smallest set of
//! host mutations that turns the committed tree into the new one. Building
//! the new tree (render phase) can pause between units of work; applying it
//! (commit phase) never does.
//!
//! ## Architecture
//!
//! Elements are instantiated as fibers in an arena. Each fiber links to its
//! parent, first child, next sibling and its counterpart in the committed
//! generation (`alternate`):
//! ```text
//! element! → RenderSession::render → work_loop (perform_unit × N) → commit → HostRenderer
//! ```
//!
//! Children are matched by position only. There are no keys, so reordering
//! a list replaces nodes instead of moving them.
//!
//! ## Modules
//!
//! - [`types`] - Prop values, prop maps, layout dimensions, text attributes
//! - [`primitives`] - Elements, components, `create_element`
//! - [`engine`] - Fiber arena and fibers
//! - [`pipeline`] - Render session, scheduler, reconciler, commit
//! - [`state`] - Hooks and the state update queue
//! - [`renderer`] - Host renderer contract, prop diffing, memory and terminal hosts
//! - [`layout`] - Taffy bridge and text measurement for the terminal host
//!
//! ## Example
//!
//! ```ignore
//! use spark_fiber::*;
//!
//! let mut session = RenderSession::new(MemoryHost::new(), Config::default());
//! let container = session.host().container();
//! let tree = element!("div", props! {}, element!("h1", props! { "title" => "foo" }, "Hello")?)?;
//!
//! session.render(tree, container);
//! session.flush_sync()?;
//! assert_eq!(session.host().to_markup(container), r#"<div><h1 title="foo">Hello</h1></div>"#);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::Config;

pub use error::{ComponentError, ElementError, EngineError, HookError, HostError, HostOpKind};

pub use engine::{EffectTag, Fiber, FiberArena, FiberId};

pub use primitives::{
    CHILDREN_PROP, Child, Component, Element, ElementType, TEXT_ELEMENT, TEXT_VALUE_PROP,
    create_element, text_element,
};

pub use pipeline::{
    CommitStats, Deadline, FrameDeadline, RenderSession, StepBudget, Unbounded, WorkStatus,
    run_until_idle,
};

pub use renderer::{
    HostId, HostOp, HostRenderer, HostType, MemoryHost, PropDiff, TerminalConfig, TerminalHost,
};

pub use state::{Hooks, StateSetter, UpdateRequest};
