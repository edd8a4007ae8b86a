//! Reconciler - matches new child descriptors against the previous
//! generation's children and tags effects.
//!
//! Matching is by position only:
//!
//! ```text
//! old:  div   h1    p
//! new:  div   h2    p    span
//!       ----  ----  ---- ----
//!       UPD   PLACE UPD  PLACE      + h1 goes to deletions
//! ```
//!
//! There are no keys. Reordering a list is seen as a series of type changes
//! (or same-type updates) at each index, never as a move.

use crate::engine::{EffectTag, Fiber, FiberArena, FiberId};
use crate::primitives::{Element, ElementType};

/// Whether a fiber of type `old` can be reused for an element of type `new`.
///
/// Same host tag, both text, or the same component function.
#[inline]
pub fn same_type(old: &ElementType, new: &ElementType) -> bool {
    old == new
}

/// Build the children of `wip` from `elements`, lock-step with the children
/// of its alternate.
///
/// - Same type at an index: a new `Update` fiber sharing the old host node,
///   with `alternate` set to the old fiber
/// - New element without a reusable old fiber: a new `Place` fiber
/// - Old fiber without a matching element: tagged `Delete` and pushed to
///   `deletions`; it gets no counterpart in the new tree
pub fn reconcile_children<N: Clone>(
    arena: &mut FiberArena<N>,
    wip: FiberId,
    elements: &[Element],
    deletions: &mut Vec<FiberId>,
) {
    let mut old = arena[wip].alternate.and_then(|alt| arena.get(alt)).and_then(|f| f.child);
    let mut prev: Option<FiberId> = None;
    arena[wip].child = None;

    let mut index = 0;
    while index < elements.len() || old.is_some() {
        let element = elements.get(index);

        let new_id = match (element, old) {
            (Some(element), Some(old_id)) if same_type(&arena[old_id].ty, &element.ty) => {
                let mut fiber = Fiber::from_element(element);
                fiber.host = arena[old_id].host.clone();
                fiber.alternate = Some(old_id);
                fiber.effect = EffectTag::Update;
                Some(arena.alloc(fiber))
            }
            (element, old) => {
                if let Some(old_id) = old {
                    arena[old_id].effect = EffectTag::Delete;
                    deletions.push(old_id);
                }
                element.map(|element| {
                    let mut fiber = Fiber::from_element(element);
                    fiber.effect = EffectTag::Place;
                    arena.alloc(fiber)
                })
            }
        };

        if let Some(old_id) = old {
            old = arena[old_id].sibling;
        }

        if let Some(id) = new_id {
            arena[id].parent = Some(wip);
            match prev {
                None => arena[wip].child = Some(id),
                Some(prev_id) => arena[prev_id].sibling = Some(id),
            }
            prev = Some(id);
        }

        index += 1;
    }
}
