//! Commit Executor - flushes a finished build to the host in one pass.
//!
//! # Order
//!
//! 1. Deletions: for every deleted fiber, remove the nearest host nodes of
//!    its subtree (a component has none of its own, so its children stand in)
//! 2. Placement and updates, depth-first: a fiber, then its children, then
//!    its siblings
//!
//! Both walks use explicit stacks. The commit never yields; when it returns
//! `Ok`, the built tree is the committed tree.

use tracing::{debug, trace, warn};

use crate::engine::{EffectTag, FiberArena, FiberId};
use crate::error::{EngineError, HostError, HostOpKind};
use crate::renderer::{HostRenderer, PropDiff};

use super::mount::RenderSession;

/// Host work done by one commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Host nodes attached.
    pub placed: usize,
    /// Host nodes patched with a non-empty diff.
    pub updated: usize,
    /// Host nodes reused with no prop change.
    pub unchanged: usize,
    /// Host nodes removed.
    pub removed: usize,
}

impl CommitStats {
    /// Number of host mutations performed.
    pub fn mutations(&self) -> usize {
        self.placed + self.updated + self.removed
    }
}

impl<H: HostRenderer> RenderSession<H> {
    /// Apply the completed build to the host and make it current.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NothingToCommit`] when no build is complete
    /// - [`EngineError::CommitPartiallyApplied`] when the host fails midway.
    ///   The host tree may already be partly changed; the previous tree stays
    ///   current, the build is dropped, and state actions stay pending
    pub fn commit(&mut self) -> Result<CommitStats, EngineError> {
        let Some(root) = self.wip_root else {
            return Err(EngineError::NothingToCommit);
        };
        if self.next_unit.is_some() {
            return Err(EngineError::NothingToCommit);
        }

        let mut stats = CommitStats::default();
        let applied = commit_deletions(&self.arena, &mut self.host, &self.deletions, &mut stats)
            .and_then(|()| commit_tree(&self.arena, &mut self.host, root, &mut stats));

        if let Err(err) = applied {
            warn!(target: "spark_fiber::commit", error = %err, ?stats, "commit partially applied");
            self.discard_build();
            return Err(EngineError::CommitPartiallyApplied(err));
        }

        acknowledge_hooks(&self.arena, root);

        self.deletions.clear();
        self.current_root = Some(root);
        self.wip_root = None;
        self.next_unit = None;
        let freed = self.arena.sweep(root);

        debug!(
            target: "spark_fiber::commit",
            placed = stats.placed,
            updated = stats.updated,
            unchanged = stats.unchanged,
            removed = stats.removed,
            freed,
            live = self.arena.len(),
            "committed"
        );
        Ok(stats)
    }
}

/// Remove the host nodes of every deleted subtree.
fn commit_deletions<H: HostRenderer>(
    arena: &FiberArena<H::Node>,
    host: &mut H,
    deletions: &[FiberId],
    stats: &mut CommitStats,
) -> Result<(), HostError> {
    for &deleted in deletions {
        // Never follow the deleted fiber's own siblings
        let mut stack = vec![deleted];
        while let Some(id) = stack.pop() {
            let fiber = &arena[id];
            match &fiber.host {
                Some(node) => {
                    trace!(target: "spark_fiber::commit", fiber = %id, "remove");
                    host.remove_node(node)?;
                    stats.removed += 1;
                }
                None => {
                    let mut children: Vec<FiberId> = arena.children(id).collect();
                    children.reverse();
                    stack.extend(children);
                }
            }
        }
    }
    Ok(())
}

/// Place and update, pre-order from the root's first child.
fn commit_tree<H: HostRenderer>(
    arena: &FiberArena<H::Node>,
    host: &mut H,
    root: FiberId,
    stats: &mut CommitStats,
) -> Result<(), HostError> {
    let mut stack: Vec<FiberId> = arena[root].child.into_iter().collect();

    while let Some(id) = stack.pop() {
        let fiber = &arena[id];

        if let Some(node) = &fiber.host {
            match fiber.effect {
                EffectTag::Place => {
                    let parent = arena
                        .host_parent(id)
                        .ok_or_else(|| HostError::new(HostOpKind::Append, format!("fiber {id} has no host ancestor")))?;
                    trace!(target: "spark_fiber::commit", fiber = %id, "place");
                    host.append_child(parent, node)?;
                    stats.placed += 1;
                }
                EffectTag::Update => {
                    let diff = match fiber.alternate.and_then(|alt| arena.get(alt)) {
                        Some(old) => PropDiff::between(&old.props, &fiber.props),
                        None => PropDiff::default(),
                    };
                    if diff.is_empty() {
                        stats.unchanged += 1;
                    } else {
                        trace!(target: "spark_fiber::commit", fiber = %id, changes = diff.len(), "update");
                        host.update_node(node, &diff)?;
                        stats.updated += 1;
                    }
                }
                EffectTag::None | EffectTag::Delete => {}
            }
        }

        if let Some(sibling) = fiber.sibling {
            stack.push(sibling);
        }
        if let Some(child) = fiber.child {
            stack.push(child);
        }
    }
    Ok(())
}

/// Drop the state actions each committed hook applied.
fn acknowledge_hooks<N>(arena: &FiberArena<N>, root: FiberId) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let fiber = &arena[id];
        for record in &fiber.hooks {
            record.acknowledge();
        }
        stack.extend(arena.children(id));
    }
}
