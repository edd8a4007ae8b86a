//! Host renderer contract.
//!
//! The engine never touches a real UI surface. Everything it needs from one
//! is these operations. `create_node` and `release_node` are the only ones
//! that may run during the render phase, and both deal in detached nodes.

use std::fmt;

use crate::error::HostError;
use crate::primitives::ElementType;
use crate::types::Props;

use super::diff::PropDiff;

/// Kind of host node to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostType<'a> {
    Element(&'a str),
    Text,
}

impl<'a> HostType<'a> {
    /// Host type for an element type. `None` for components, which never
    /// own host nodes.
    pub fn of(ty: &'a ElementType) -> Option<Self> {
        match ty {
            ElementType::Host(tag) => Some(HostType::Element(tag)),
            ElementType::Text => Some(HostType::Text),
            ElementType::Component(_) => None,
        }
    }
}

/// Primitive operations on a host tree.
pub trait HostRenderer {
    /// Handle to a host node. Cloned into every generation of the fiber that
    /// owns it.
    type Node: Clone + fmt::Debug;

    /// Create a detached node with its initial props.
    fn create_node(&mut self, ty: HostType<'_>, props: &Props) -> Result<Self::Node, HostError>;

    /// Apply a non-empty prop diff to an existing node.
    fn update_node(&mut self, node: &Self::Node, diff: &PropDiff) -> Result<(), HostError>;

    /// Detach and discard a node together with its host subtree.
    fn remove_node(&mut self, node: &Self::Node) -> Result<(), HostError>;

    /// Attach `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

    /// Discard a node created by `create_node` that was never attached,
    /// because the build that asked for it was superseded or failed.
    fn release_node(&mut self, node: &Self::Node) -> Result<(), HostError>;
}
