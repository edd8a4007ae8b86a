//! Mount API - the render session and its lifecycle.
//!
//! A [`RenderSession`] owns everything one mounted tree needs: the fiber
//! arena, the host renderer, the committed root, the build in progress and
//! the state update queue. There are no globals; two sessions never share
//! anything.
//!
//! # Example
//!
//! ```ignore
//! let mut session = RenderSession::new(MemoryHost::new(), Config::default());
//! let container = session.host().container();
//!
//! // Option 1: Build and commit in one go
//! session.render(app, container);
//! session.flush_sync()?;
//!
//! // Option 2: Cooperative slices
//! session.render(app, container);
//! run_until_idle(&mut session, Duration::from_millis(8))?;
//!
//! // Clean up
//! session.unmount()?;
//! ```

use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::engine::{Fiber, FiberArena, FiberId};
use crate::error::EngineError;
use crate::primitives::{Element, ElementType};
use crate::renderer::HostRenderer;
use crate::state::UpdateQueue;
use crate::types::Props;

use super::commit::CommitStats;
use super::scheduler::{FrameDeadline, Unbounded, WorkStatus};

/// Tag of the fiber wrapping the container node.
pub const ROOT_TAG: &str = "#root";

// =============================================================================
// Render Session
// =============================================================================

/// One mounted tree and the engine state driving it.
///
/// Single-threaded: state setters share the session's update queue through
/// `Rc`, so the session is neither `Send` nor `Sync`.
pub struct RenderSession<H: HostRenderer> {
    pub(super) arena: FiberArena<H::Node>,
    pub(super) host: H,
    pub(super) config: Config,
    pub(super) updates: UpdateQueue,
    pub(super) current_root: Option<FiberId>,
    pub(super) wip_root: Option<FiberId>,
    pub(super) next_unit: Option<FiberId>,
    pub(super) deletions: Vec<FiberId>,
}

impl<H: HostRenderer> RenderSession<H> {
    pub fn new(host: H, config: Config) -> Self {
        Self {
            arena: FiberArena::with_capacity(config.arena_capacity),
            host,
            config,
            updates: UpdateQueue::new(),
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
        }
    }

    /// Start a build rendering `element` as the only child of `container`.
    ///
    /// Nothing is built until the scheduler runs. A build already in
    /// progress is abandoned. Queued state updates are served by this build.
    pub fn render(&mut self, element: Element, container: H::Node) {
        self.render_children(Rc::from(vec![element]), container);
    }

    fn render_children(&mut self, children: Rc<[Element]>, container: H::Node) {
        let served = self.updates.drain().len();
        debug!(
            target: "spark_fiber::scheduler",
            children = children.len(),
            served,
            "render requested"
        );

        let mut root = Fiber::new(ElementType::from(ROOT_TAG), Props::new(), children);
        root.host = Some(container);
        root.alternate = self.current_root;
        self.start_build(root);
    }

    /// Remove everything the session placed under its container.
    ///
    /// Renders an empty child list and commits synchronously.
    pub fn unmount(&mut self) -> Result<CommitStats, EngineError> {
        let Some(container) = self.current_root.and_then(|root| self.arena[root].host.clone()) else {
            return Err(EngineError::NotMounted);
        };
        self.render_children(Rc::from(Vec::new()), container);
        self.flush_sync()?.ok_or(EngineError::NothingToCommit)
    }

    /// Build and commit everything pending without yielding, including
    /// state updates queued by listeners in between. Returns the stats of
    /// the last commit, if any happened.
    pub fn flush_sync(&mut self) -> Result<Option<CommitStats>, EngineError> {
        let mut last = None;
        loop {
            match self.work_loop(&Unbounded)? {
                WorkStatus::Committed(stats) => last = Some(stats),
                WorkStatus::Idle => return Ok(last),
                WorkStatus::Yielded | WorkStatus::BuildComplete => {}
            }
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Root of the committed tree.
    pub fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }

    /// Root of the build in progress.
    pub fn work_in_progress(&self) -> Option<FiberId> {
        self.wip_root
    }

    /// Where the scheduler resumes.
    pub fn next_unit(&self) -> Option<FiberId> {
        self.next_unit
    }

    /// Committed fibers the build in progress will delete.
    pub fn pending_deletions(&self) -> &[FiberId] {
        &self.deletions
    }

    pub fn fiber(&self, id: FiberId) -> Option<&Fiber<H::Node>> {
        self.arena.get(id)
    }

    /// Children of a fiber in order.
    pub fn children(&self, id: FiberId) -> Vec<FiberId> {
        self.arena.children(id).collect()
    }

    pub fn arena(&self) -> &FiberArena<H::Node> {
        &self.arena
    }

    /// True while a build is in progress or committed state has updates
    /// waiting.
    pub fn has_pending_work(&self) -> bool {
        self.wip_root.is_some() || (self.current_root.is_some() && !self.updates.is_empty())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<H: HostRenderer + std::fmt::Debug> std::fmt::Debug for RenderSession<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("host", &self.host)
            .field("current_root", &self.current_root)
            .field("wip_root", &self.wip_root)
            .field("next_unit", &self.next_unit)
            .field("deletions", &self.deletions.len())
            .field("fibers", &self.arena.len())
            .finish()
    }
}

// =============================================================================
// Event Loop
// =============================================================================

/// Drive the session in slices of `slice` until no work remains.
///
/// Each round gets a fresh [`FrameDeadline`]; a yield just starts the next
/// round, the way a frame callback re-registers itself. Returns the stats of
/// the last commit, if any.
///
/// ```ignore
/// session.render(app, container);
/// run_until_idle(&mut session, Duration::from_millis(8))?;
/// ```
pub fn run_until_idle<H: HostRenderer>(
    session: &mut RenderSession<H>,
    slice: Duration,
) -> Result<Option<CommitStats>, EngineError> {
    let mut last = None;
    loop {
        match session.work_loop(&FrameDeadline::new(slice))? {
            WorkStatus::Committed(stats) => last = Some(stats),
            WorkStatus::Idle => return Ok(last),
            WorkStatus::Yielded | WorkStatus::BuildComplete => {}
        }
    }
}
