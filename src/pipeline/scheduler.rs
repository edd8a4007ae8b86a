//! Cooperative Scheduler - the render phase, one fiber at a time.
//!
//! # Work Loop
//!
//! ```text
//! work_loop(deadline)
//!   ├─ pending state updates? start a build from the committed root
//!   ├─ perform_unit(next_unit) ─┐
//!   │    render component / create detached host node
//!   │    reconcile children
//!   │    pick next unit (child, sibling, ancestor's sibling)
//!   ├─ deadline nearly spent? ──┴─> Yielded (resume later from next_unit)
//!   └─ no next unit ──> commit ──> Committed(stats)
//! ```
//!
//! The render phase never mutates the attached host tree. A build can be
//! abandoned at any unit boundary; a newer build simply replaces it.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::engine::{EffectTag, Fiber, FiberId};
use crate::error::EngineError;
use crate::primitives::{Element, ElementType};
use crate::renderer::{HostRenderer, HostType};
use crate::state::Hooks;

use super::commit::CommitStats;
use super::mount::RenderSession;
use super::reconcile::reconcile_children;

// =============================================================================
// Deadlines
// =============================================================================

/// How much time the current slice has left.
pub trait Deadline {
    fn time_remaining(&self) -> Duration;
}

/// Wall-clock deadline for one frame slice.
#[derive(Debug, Clone, Copy)]
pub struct FrameDeadline {
    end: Instant,
}

impl FrameDeadline {
    /// A slice of `budget` starting now.
    pub fn new(budget: Duration) -> Self {
        Self {
            end: Instant::now() + budget,
        }
    }
}

impl Deadline for FrameDeadline {
    fn time_remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

/// Never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// Allows a fixed number of units, then reports no time left.
///
/// Deterministic, so tests can stop a build at an exact point.
#[derive(Debug)]
pub struct StepBudget {
    remaining: Cell<usize>,
}

impl StepBudget {
    pub fn new(units: usize) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }
}

impl Deadline for StepBudget {
    /// Called once after each unit.
    fn time_remaining(&self) -> Duration {
        let left = self.remaining.get().saturating_sub(1);
        self.remaining.set(left);
        if left > 0 { Duration::MAX } else { Duration::ZERO }
    }
}

// =============================================================================
// Work Status
// =============================================================================

/// Outcome of one scheduler call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing to build.
    Idle,
    /// Out of time; the build resumes from `next_unit` on the next call.
    Yielded,
    /// Every unit is done and the build waits for `commit()`.
    BuildComplete,
    /// The build was completed and committed.
    Committed(CommitStats),
}

// =============================================================================
// Render Phase
// =============================================================================

impl<H: HostRenderer> RenderSession<H> {
    /// Process one fiber and return the next one, or `None` when the build
    /// is complete.
    ///
    /// Does not touch the session's build state on error; callers that
    /// want the build discarded use [`perform_work`](Self::perform_work).
    pub fn perform_unit(&mut self, id: FiberId) -> Result<Option<FiberId>, EngineError> {
        let fiber = &self.arena[id];

        let elements: Rc<[Element]> = match &fiber.ty {
            ElementType::Component(component) => {
                let name = component.name();
                let previous = fiber
                    .alternate
                    .and_then(|alt| self.arena.get(alt))
                    .map(|alt| alt.hooks.clone())
                    .unwrap_or_default();
                let mut hooks = Hooks::new(name, previous, self.updates.clone());

                let element = component
                    .render(&mut hooks, &fiber.props, &fiber.children)
                    .map_err(|source| EngineError::Render { component: name, source })?;

                self.arena[id].hooks = hooks.into_records();
                Rc::from(vec![element])
            }
            ty => {
                let children = fiber.children.clone();
                if fiber.host.is_none() {
                    if let Some(host_ty) = HostType::of(ty) {
                        let node = self.host.create_node(host_ty, &fiber.props).map_err(EngineError::Host)?;
                        self.arena[id].host = Some(node);
                    }
                }
                children
            }
        };

        reconcile_children(&mut self.arena, id, &elements, &mut self.deletions);

        if let Some(child) = self.arena[id].child {
            return Ok(Some(child));
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if Some(current) == self.wip_root {
                break;
            }
            if let Some(sibling) = self.arena[current].sibling {
                return Ok(Some(sibling));
            }
            cursor = self.arena[current].parent;
        }
        Ok(None)
    }

    /// Run render work until the build completes or the deadline runs low.
    ///
    /// Never commits. A failed unit discards the whole build and leaves the
    /// committed tree as it was.
    pub fn perform_work(&mut self, deadline: &impl Deadline) -> Result<WorkStatus, EngineError> {
        self.begin_pending_update();

        let Some(mut unit) = self.next_unit else {
            return Ok(if self.wip_root.is_some() {
                WorkStatus::BuildComplete
            } else {
                WorkStatus::Idle
            });
        };

        let mut performed = 0usize;
        loop {
            match self.perform_unit(unit) {
                Ok(next) => self.next_unit = next,
                Err(err) => {
                    warn!(target: "spark_fiber::scheduler", fiber = %unit, error = %err, "build aborted");
                    self.release_detached_nodes();
                    self.discard_build();
                    return Err(err);
                }
            }
            performed += 1;

            let Some(next) = self.next_unit else {
                debug!(target: "spark_fiber::scheduler", performed, "build complete");
                return Ok(WorkStatus::BuildComplete);
            };

            if deadline.time_remaining() < self.config.yield_threshold {
                trace!(target: "spark_fiber::scheduler", performed, next = %next, "yielding");
                return Ok(WorkStatus::Yielded);
            }
            unit = next;
        }
    }

    /// Run render work and commit as soon as the build completes.
    pub fn work_loop(&mut self, deadline: &impl Deadline) -> Result<WorkStatus, EngineError> {
        match self.perform_work(deadline)? {
            WorkStatus::BuildComplete => self.commit().map(WorkStatus::Committed),
            status => Ok(status),
        }
    }

    /// Serve queued state updates with one new build.
    ///
    /// Requests made before the first commit wait until there is a committed
    /// tree to update. A build in progress is restarted, keeping the children
    /// it was asked to render.
    fn begin_pending_update(&mut self) {
        if self.updates.is_empty() {
            return;
        }
        let Some(current) = self.current_root else {
            return;
        };
        let requests = self.updates.drain();

        let source = self.wip_root.unwrap_or(current);
        let (ty, props, children) = {
            let fiber = &self.arena[source];
            (fiber.ty.clone(), fiber.props.clone(), fiber.children.clone())
        };
        let container = self.arena[current].host.clone();

        debug!(
            target: "spark_fiber::scheduler",
            requests = requests.len(),
            restarted = self.wip_root.is_some(),
            "starting update build"
        );

        let mut root = Fiber::new(ty, props, children);
        root.host = container;
        root.alternate = Some(current);
        self.start_build(root);
    }

    /// Make `root` the work-in-progress root, replacing any build in
    /// progress.
    pub(super) fn start_build(&mut self, root: Fiber<H::Node>) {
        if self.wip_root.is_some() {
            trace!(target: "spark_fiber::scheduler", "replacing unfinished build");
            self.release_detached_nodes();
        }
        self.clear_deletions();
        let root = self.arena.alloc(root);
        self.wip_root = Some(root);
        self.next_unit = Some(root);
    }

    /// Hand back the host nodes the build in progress created.
    ///
    /// Only `Place` fibers own nodes nobody else refers to; `Update` fibers
    /// share theirs with the committed tree. Nothing is attached before
    /// commit, so every such node is still detached.
    fn release_detached_nodes(&mut self) {
        let Some(root) = self.wip_root else {
            return;
        };
        let mut released = 0usize;
        let mut stack: Vec<FiberId> = self.arena[root].child.into_iter().collect();
        while let Some(id) = stack.pop() {
            let fiber = &self.arena[id];
            if fiber.effect == EffectTag::Place {
                if let Some(node) = &fiber.host {
                    match self.host.release_node(node) {
                        Ok(()) => released += 1,
                        Err(err) => warn!(target: "spark_fiber::scheduler", fiber = %id, error = %err, "release failed"),
                    }
                }
            }
            if let Some(sibling) = fiber.sibling {
                stack.push(sibling);
            }
            if let Some(child) = fiber.child {
                stack.push(child);
            }
        }
        if released > 0 {
            trace!(target: "spark_fiber::scheduler", released, "released detached host nodes");
        }
    }

    /// Forget the build in progress and free its fibers.
    pub(super) fn discard_build(&mut self) {
        self.clear_deletions();
        self.wip_root = None;
        self.next_unit = None;
        match self.current_root {
            Some(root) => {
                self.arena.sweep(root);
            }
            None => self.arena.clear(),
        }
    }

    fn clear_deletions(&mut self) {
        for id in self.deletions.drain(..) {
            if let Some(fiber) = self.arena.get_mut(id) {
                fiber.effect = EffectTag::None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_budget_counts_units() {
        let budget = StepBudget::new(2);
        assert_eq!(budget.time_remaining(), Duration::MAX);
        assert_eq!(budget.time_remaining(), Duration::ZERO);
        assert_eq!(budget.time_remaining(), Duration::ZERO);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_frame_deadline_runs_out() {
        let deadline = FrameDeadline::new(Duration::ZERO);
        assert_eq!(deadline.time_remaining(), Duration::ZERO);

        let deadline = FrameDeadline::new(Duration::from_secs(60));
        assert!(deadline.time_remaining() > Duration::from_secs(30));
    }

    #[test]
    fn test_unbounded() {
        assert_eq!(Unbounded.time_remaining(), Duration::MAX);
    }
}
