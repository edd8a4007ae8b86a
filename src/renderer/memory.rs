//! Memory host - a headless host tree.
//!
//! Keeps nodes in a vector (released slots stay empty), logs every successful
//! operation, and can be told to fail an operation. Useful anywhere a real surface is unavailable, and
//! the workhorse of the engine's own tests.
//!
//! ```ignore
//! let mut session = RenderSession::new(MemoryHost::new(), Config::default());
//! let container = session.host().container();
//! session.render(tree, container);
//! session.flush_sync()?;
//! assert_eq!(session.host().to_markup(container), "<div><h1 title=\"foo\">Hello</h1></div>");
//! ```

use std::fmt::Write as _;

use crate::error::{HostError, HostOpKind};
use crate::primitives::TEXT_VALUE_PROP;
use crate::types::{Props, Value, is_listener};

use super::diff::PropDiff;
use super::host::{HostRenderer, HostType};

/// Handle to a memory host node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId(pub usize);

/// A logged host operation.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    Create { node: HostId, tag: String },
    Update { node: HostId, changes: usize },
    Remove { node: HostId },
    Append { parent: HostId, child: HostId },
    Release { node: HostId },
}

impl HostOp {
    pub fn kind(&self) -> HostOpKind {
        match self {
            HostOp::Create { .. } => HostOpKind::Create,
            HostOp::Update { .. } => HostOpKind::Update,
            HostOp::Remove { .. } => HostOpKind::Remove,
            HostOp::Append { .. } => HostOpKind::Append,
            HostOp::Release { .. } => HostOpKind::Release,
        }
    }

    /// Creating or releasing a detached node does not change the visible
    /// tree; everything else does.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, HostOp::Create { .. } | HostOp::Release { .. })
    }
}

/// One node of the memory tree.
#[derive(Debug, Clone)]
pub struct MemoryNode {
    /// Element tag, `None` for text.
    pub tag: Option<String>,
    pub props: Props,
    pub parent: Option<HostId>,
    pub children: Vec<HostId>,
}

impl MemoryNode {
    pub fn is_text(&self) -> bool {
        self.tag.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
struct Fault {
    kind: HostOpKind,
    skip: usize,
}

/// In-memory [`HostRenderer`].
#[derive(Debug)]
pub struct MemoryHost {
    nodes: Vec<Option<MemoryNode>>,
    ops: Vec<HostOp>,
    fault: Option<Fault>,
    container: HostId,
}

impl MemoryHost {
    /// Tag of the container node created with the host.
    pub const CONTAINER_TAG: &'static str = "#container";

    pub fn new() -> Self {
        Self {
            nodes: vec![Some(MemoryNode {
                tag: Some(Self::CONTAINER_TAG.to_string()),
                props: Props::new(),
                parent: None,
                children: Vec::new(),
            })],
            ops: Vec::new(),
            fault: None,
            container: HostId(0),
        }
    }

    /// The root node to render into.
    pub fn container(&self) -> HostId {
        self.container
    }

    pub fn node(&self, id: HostId) -> Option<&MemoryNode> {
        self.nodes.get(id.0)?.as_ref()
    }

    /// Nodes alive in the host, attached or not, container included.
    pub fn allocated_nodes(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn children(&self, id: HostId) -> &[HostId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    // =========================================================================
    // Operation log
    // =========================================================================

    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    /// Logged operations that changed the attached tree.
    pub fn mutation_count(&self) -> usize {
        self.ops.iter().filter(|op| op.is_mutation()).count()
    }

    // =========================================================================
    // Fault injection
    // =========================================================================

    /// Fail the next operation of `kind`.
    pub fn fail_on(&mut self, kind: HostOpKind) {
        self.fail_after(kind, 0);
    }

    /// Let `skip` operations of `kind` succeed, then fail the next one.
    pub fn fail_after(&mut self, kind: HostOpKind, skip: usize) {
        self.fault = Some(Fault { kind, skip });
    }

    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    fn check_fault(&mut self, kind: HostOpKind) -> Result<(), HostError> {
        match &mut self.fault {
            Some(fault) if fault.kind == kind => {
                if fault.skip == 0 {
                    self.fault = None;
                    return Err(HostError::new(kind, "injected failure"));
                }
                fault.skip -= 1;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn node_mut(&mut self, id: HostId, op: HostOpKind) -> Result<&mut MemoryNode, HostError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| HostError::new(op, format!("unknown node {}", id.0)))
    }

    fn detach(&mut self, id: HostId) {
        let parent = self.nodes.get_mut(id.0).and_then(Option::as_mut).and_then(|n| n.parent.take());
        if let Some(parent) = parent {
            if let Some(parent) = self.nodes.get_mut(parent.0).and_then(Option::as_mut) {
                parent.children.retain(|&c| c != id);
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// First attached element with `tag`, depth-first from the container.
    pub fn find(&self, tag: &str) -> Option<HostId> {
        let mut stack = vec![self.container];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if node.tag.as_deref() == Some(tag) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Call the `event` listener of a node. Returns whether one was found.
    pub fn dispatch(&self, id: HostId, event: &str, arg: &Value) -> bool {
        let callback = self
            .node(id)
            .and_then(|n| n.props.get(event))
            .and_then(Value::as_callback)
            .cloned();
        match callback {
            Some(callback) => {
                callback.call(arg);
                true
            }
            None => false,
        }
    }

    /// Compact markup of the subtree under `id`. The container itself is
    /// rendered as its children only; listeners are left out.
    pub fn to_markup(&self, id: HostId) -> String {
        let mut out = String::new();
        if id == self.container {
            for &child in self.children(id) {
                self.write_markup(child, &mut out);
            }
        } else {
            self.write_markup(id, &mut out);
        }
        out
    }

    fn write_markup(&self, id: HostId, out: &mut String) {
        let Some(node) = self.node(id) else { return };
        let Some(tag) = &node.tag else {
            if let Some(value) = node.props.get(TEXT_VALUE_PROP) {
                let _ = write!(out, "{value}");
            }
            return;
        };
        let _ = write!(out, "<{tag}");
        for (key, value) in node.props.iter().filter(|(k, _)| !is_listener(k)) {
            let _ = write!(out, " {key}=\"{value}\"");
        }
        out.push('>');
        for &child in &node.children {
            self.write_markup(child, out);
        }
        let _ = write!(out, "</{tag}>");
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRenderer for MemoryHost {
    type Node = HostId;

    fn create_node(&mut self, ty: HostType<'_>, props: &Props) -> Result<HostId, HostError> {
        self.check_fault(HostOpKind::Create)?;
        let id = HostId(self.nodes.len());
        let tag = match ty {
            HostType::Element(tag) => Some(tag.to_string()),
            HostType::Text => None,
        };
        self.ops.push(HostOp::Create {
            node: id,
            tag: tag.clone().unwrap_or_else(|| "#text".to_string()),
        });
        self.nodes.push(Some(MemoryNode {
            tag,
            props: props.clone(),
            parent: None,
            children: Vec::new(),
        }));
        Ok(id)
    }

    fn update_node(&mut self, node: &HostId, diff: &PropDiff) -> Result<(), HostError> {
        self.check_fault(HostOpKind::Update)?;
        diff.apply(&mut self.node_mut(*node, HostOpKind::Update)?.props);
        self.ops.push(HostOp::Update {
            node: *node,
            changes: diff.len(),
        });
        Ok(())
    }

    fn remove_node(&mut self, node: &HostId) -> Result<(), HostError> {
        self.check_fault(HostOpKind::Remove)?;
        if self.node_mut(*node, HostOpKind::Remove)?.parent.is_none() {
            return Err(HostError::new(HostOpKind::Remove, format!("node {} is not attached", node.0)));
        }
        self.detach(*node);
        self.ops.push(HostOp::Remove { node: *node });
        Ok(())
    }

    fn append_child(&mut self, parent: &HostId, child: &HostId) -> Result<(), HostError> {
        self.check_fault(HostOpKind::Append)?;
        self.node_mut(*child, HostOpKind::Append)?;
        if self.node_mut(*parent, HostOpKind::Append)?.is_text() {
            return Err(HostError::new(HostOpKind::Append, "text nodes cannot have children"));
        }
        self.detach(*child);
        self.node_mut(*parent, HostOpKind::Append)?.children.push(*child);
        self.node_mut(*child, HostOpKind::Append)?.parent = Some(*parent);
        self.ops.push(HostOp::Append {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn release_node(&mut self, node: &HostId) -> Result<(), HostError> {
        self.check_fault(HostOpKind::Release)?;
        if self.node_mut(*node, HostOpKind::Release)?.parent.is_some() {
            return Err(HostError::new(HostOpKind::Release, format!("node {} is attached", node.0)));
        }
        if let Some(slot) = self.nodes.get_mut(node.0) {
            *slot = None;
        }
        self.ops.push(HostOp::Release { node: *node });
        Ok(())
    }
}
