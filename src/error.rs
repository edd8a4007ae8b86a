//! Error types.
//!
//! One enum per failure domain:
//! - [`ElementError`] - malformed element input, raised at construction
//! - [`HookError`] - hook order contract broken inside a component
//! - [`ComponentError`] - a render function failed
//! - [`HostError`] - the host renderer refused an operation
//! - [`EngineError`] - what `RenderSession` entry points return

use std::fmt;

/// Malformed element input. A programmer error surfaced immediately.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElementError {
    #[error("host element tag must not be empty")]
    EmptyTag,
    /// The text marker tag cannot be used for a host element.
    #[error("`{0}` is reserved for text elements")]
    ReservedTag(String),
    /// Children are passed as children, never as a prop.
    #[error("prop `{0}` is reserved")]
    ReservedProp(String),
}

/// A hook was read with a different type than it was created with.
///
/// This only happens when a component calls hooks in a different order
/// across renders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    #[error("hook {index} does not hold a `{expected}` (hook call order changed between renders)")]
    TypeMismatch { index: usize, expected: &'static str },
}

/// Failure reported by a component render function.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error(transparent)]
    Element(#[from] ElementError),
    #[error("{0}")]
    Failed(String),
}

impl ComponentError {
    /// Build a failure from any displayable message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::Failed(message.to_string())
    }
}

/// Host operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOpKind {
    Create,
    Update,
    Remove,
    Append,
    Release,
}

impl fmt::Display for HostOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HostOpKind::Create => "create",
            HostOpKind::Update => "update",
            HostOpKind::Remove => "remove",
            HostOpKind::Append => "append",
            HostOpKind::Release => "release",
        })
    }
}

/// The host renderer could not perform an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("host {op} failed: {message}")]
pub struct HostError {
    pub op: HostOpKind,
    pub message: String,
}

impl HostError {
    pub fn new(op: HostOpKind, message: impl Into<String>) -> Self {
        Self { op, message: message.into() }
    }
}

/// Errors returned by the render session.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A render function failed. The build was discarded and the committed
    /// tree is untouched.
    #[error("component `{component}` failed to render")]
    Render {
        component: &'static str,
        #[source]
        source: ComponentError,
    },
    /// The host could not create a detached node during the render phase.
    /// The build was discarded and the committed tree is untouched.
    #[error("render phase aborted")]
    Host(#[source] HostError),
    /// The host failed in the middle of a commit. The host tree may be
    /// partially mutated; `current_root` still names the previous generation.
    #[error("commit partially applied")]
    CommitPartiallyApplied(#[source] HostError),
    /// `commit()` was called while no finished build exists.
    #[error("no completed build to commit")]
    NothingToCommit,
    /// An operation needs a committed tree, but nothing was rendered yet.
    #[error("nothing has been rendered")]
    NotMounted,
}
