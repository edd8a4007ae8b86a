//! Fiber Arena - index allocation for fibers.
//!
//! Fibers of every live generation share one arena:
//! - Slots addressed by [`FiberId`]
//! - Free index pool for O(1) reuse
//! - A sweep after each commit that frees every fiber not reachable from the
//!   committed root (previous generation, deleted subtrees, abandoned builds)

use std::ops::{Index, IndexMut};

use super::fiber::{EffectTag, Fiber, FiberId};

/// Arena owning all fibers of a render session.
#[derive(Debug)]
pub struct FiberArena<N> {
    slots: Vec<Option<Fiber<N>>>,
    free: Vec<FiberId>,
    live: usize,
}

impl<N> FiberArena<N> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Store a fiber, reusing a freed index when one is available.
    pub fn alloc(&mut self, fiber: Fiber<N>) -> FiberId {
        self.live += 1;
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(fiber);
            return id;
        }
        let id = FiberId(self.slots.len() as u32);
        self.slots.push(Some(fiber));
        id
    }

    /// Release a single fiber back to the pool.
    pub fn release(&mut self, id: FiberId) -> Option<Fiber<N>> {
        let fiber = self.slots.get_mut(id.index())?.take()?;
        self.live -= 1;
        self.free.push(id);

        // When everything is gone, start over from index 0
        if self.live == 0 {
            self.slots.clear();
            self.free.clear();
        }
        Some(fiber)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<N>> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    pub fn contains(&self, id: FiberId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live fibers.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Children of `id` in sibling order.
    pub fn children(&self, id: FiberId) -> Children<'_, N> {
        Children {
            arena: self,
            next: self.get(id).and_then(|f| f.child),
        }
    }

    /// Walk up from `id` (exclusive) to the first ancestor owning a host node.
    pub fn host_parent(&self, id: FiberId) -> Option<&N> {
        let mut cursor = self.get(id)?.parent;
        while let Some(parent) = cursor {
            let fiber = self.get(parent)?;
            if fiber.host.is_some() {
                return fiber.host.as_ref();
            }
            cursor = fiber.parent;
        }
        None
    }

    // =========================================================================
    // Sweep
    // =========================================================================

    /// Keep only the tree under `root`; free everything else.
    ///
    /// Surviving fibers have their `alternate` link severed and their effect
    /// reset, so no committed fiber refers further back than one generation.
    /// Returns the number of fibers freed.
    pub fn sweep(&mut self, root: FiberId) -> usize {
        let mut reachable = vec![false; self.slots.len()];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(fiber) = self.slots.get_mut(id.index()).and_then(Option::as_mut) else {
                continue;
            };
            reachable[id.index()] = true;
            fiber.alternate = None;
            fiber.effect = EffectTag::None;
            if let Some(sibling) = fiber.sibling {
                if id != root {
                    stack.push(sibling);
                }
            }
            if let Some(child) = fiber.child {
                stack.push(child);
            }
        }

        let mut freed = 0;
        for (index, keep) in reachable.into_iter().enumerate() {
            if !keep && self.slots[index].take().is_some() {
                self.free.push(FiberId(index as u32));
                freed += 1;
            }
        }
        self.live -= freed;
        freed
    }
}

impl<N> Default for FiberArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Index<FiberId> for FiberArena<N> {
    type Output = Fiber<N>;

    fn index(&self, id: FiberId) -> &Fiber<N> {
        match self.get(id) {
            Some(fiber) => fiber,
            None => panic!("fiber {id} was released"),
        }
    }
}

impl<N> IndexMut<FiberId> for FiberArena<N> {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber<N> {
        match self.get_mut(id) {
            Some(fiber) => fiber,
            None => panic!("fiber {id} was released"),
        }
    }
}

/// Iterator over the children of a fiber.
pub struct Children<'a, N> {
    arena: &'a FiberArena<N>,
    next: Option<FiberId>,
}

impl<N> Iterator for Children<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        let id = self.next?;
        self.next = self.arena.get(id).and_then(|f| f.sibling);
        Some(id)
    }
}
