//! Fiber - one instantiated tree position in one generation.

use std::fmt;
use std::rc::Rc;

use crate::primitives::{Element, ElementType};
use crate::state::HookRecord;
use crate::types::Props;

/// Index of a fiber in its [`FiberArena`](super::FiberArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiberId(pub(crate) u32);

impl FiberId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FiberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host mutation a fiber needs at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectTag {
    #[default]
    None,
    /// Attach a new host node under the nearest host ancestor.
    Place,
    /// Patch the existing host node with the prop diff.
    Update,
    /// Remove the host nodes of this subtree.
    Delete,
}

/// A unit of work.
///
/// `parent`/`child`/`sibling` form the tree of one generation. `alternate`
/// points at the fiber holding the same position in the last committed
/// generation and is cleared once this fiber is itself committed.
///
/// `N` is the host renderer's node handle.
#[derive(Debug)]
pub struct Fiber<N> {
    pub ty: ElementType,
    pub props: Props,
    /// Child elements still to be reconciled (host and root fibers).
    pub children: Rc<[Element]>,
    /// Host node handle. Always `None` for component fibers.
    pub host: Option<N>,
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    pub alternate: Option<FiberId>,
    pub effect: EffectTag,
    pub hooks: Vec<HookRecord>,
}

impl<N> Fiber<N> {
    pub fn new(ty: ElementType, props: Props, children: Rc<[Element]>) -> Self {
        Self {
            ty,
            props,
            children,
            host: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            effect: EffectTag::None,
            hooks: Vec::new(),
        }
    }

    /// Fresh fiber for `element`, not linked to anything yet.
    pub fn from_element(element: &Element) -> Self {
        Self::new(element.ty.clone(), element.props.clone(), element.children.clone())
    }

    pub fn is_component(&self) -> bool {
        self.ty.is_component()
    }
}
