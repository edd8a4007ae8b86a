//! Terminal host - committed host tree drawn to a terminal.
//!
//! Every host node is a node in a Taffy tree:
//! - Elements are flexbox containers styled from their props
//! - Text nodes are measured leaves
//!
//! Nothing is drawn during commit. [`TerminalHost::paint`] lays the tree out
//! and writes it with crossterm commands; [`TerminalHost::snapshot`] produces
//! the same picture as plain lines.
//!
//! ```ignore
//! let host = TerminalHost::new(TerminalConfig::from_terminal()?)?;
//! let mut session = RenderSession::new(host, Config::default());
//! let root = session.host().container();
//! session.render(app, root);
//! run_until_idle(&mut session, Duration::from_millis(8))?;
//! session.host_mut().paint(&mut stdout())?;
//! ```

pub mod input;

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;
use unicode_width::UnicodeWidthChar;
use taffy::{AvailableSpace, Dimension as TaffyDimension, NodeId, Size, Style, TaffyError, TaffyTree};

use crate::error::{HostError, HostOpKind};
use crate::layout::{clip_text, measure_text, style_from_props, wrap_text};
use crate::primitives::TEXT_VALUE_PROP;
use crate::types::{Attr, Props, Value};

use super::diff::PropDiff;
use super::host::{HostRenderer, HostType};

// =============================================================================
// Config
// =============================================================================

/// Terminal host settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalConfig {
    /// Columns available to the root.
    pub width: u16,
    /// Rows available to the root.
    pub height: u16,
    /// Clear the screen before each paint.
    pub clear_on_paint: bool,
}

impl TerminalConfig {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Size taken from the attached terminal.
    pub fn from_terminal() -> io::Result<Self> {
        let (width, height) = crossterm::terminal::size()?;
        Ok(Self::new(width, height))
    }

    pub fn with_clear_on_paint(mut self, clear: bool) -> Self {
        self.clear_on_paint = clear;
        self
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            clear_on_paint: true,
        }
    }
}

// =============================================================================
// Nodes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Element(String),
    Text,
}

/// Data attached to each Taffy node.
#[derive(Debug, Clone)]
struct NodeContext {
    kind: NodeKind,
    props: Props,
}

impl NodeContext {
    fn text(&self) -> Option<String> {
        match self.kind {
            NodeKind::Text => Some(self.props.get(TEXT_VALUE_PROP).map(Value::to_string).unwrap_or_default()),
            NodeKind::Element(_) => None,
        }
    }
}

/// A positioned piece of text ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub x: u16,
    pub y: u16,
    pub text: String,
    pub attrs: Attr,
}

fn host_error(op: HostOpKind) -> impl Fn(TaffyError) -> HostError {
    move |err| HostError::new(op, err.to_string())
}

fn root_style(config: &TerminalConfig) -> Style {
    Style {
        size: Size {
            width: TaffyDimension::Length(config.width as f32),
            height: TaffyDimension::Length(config.height as f32),
        },
        ..style_from_props(&Props::new())
    }
}

// =============================================================================
// Terminal Host
// =============================================================================

/// [`HostRenderer`] backed by a Taffy layout tree.
pub struct TerminalHost {
    tree: TaffyTree<NodeContext>,
    root: NodeId,
    config: TerminalConfig,
}

impl TerminalHost {
    /// Tag of the root container.
    pub const ROOT_TAG: &'static str = "#root";

    pub fn new(config: TerminalConfig) -> Result<Self, TaffyError> {
        let mut tree = TaffyTree::new();
        let context = NodeContext {
            kind: NodeKind::Element(Self::ROOT_TAG.to_string()),
            props: Props::new(),
        };
        let root = tree.new_leaf_with_context(root_style(&config), context)?;
        Ok(Self { tree, root, config })
    }

    /// Root node to render into.
    pub fn container(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// Change the available size, e.g. after a terminal resize.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<(), TaffyError> {
        self.config.width = width;
        self.config.height = height;
        self.tree.set_style(self.root, root_style(&self.config))
    }

    /// Number of host nodes under the root, root excluded.
    pub fn node_count(&self) -> usize {
        self.descendants(self.root).len()
    }

    /// Nodes held by the layout tree, attached or not, root included.
    pub fn allocated_nodes(&self) -> usize {
        self.tree.total_node_count()
    }

    /// Props a node currently holds.
    pub fn props(&self, node: NodeId) -> Option<&Props> {
        self.tree.get_node_context(node).map(|ctx| &ctx.props)
    }

    /// Taffy panics on stale ids; every node this host creates has a context.
    fn contains(&self, node: NodeId) -> bool {
        self.tree.get_node_context(node).is_some()
    }

    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = self.tree.children(node).unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.tree.children(id).unwrap_or_default());
        }
        out
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Call every attached `event` listener with `arg`, in tree order.
    /// Returns how many listeners ran.
    pub fn dispatch_all(&self, event: &str, arg: &Value) -> usize {
        let mut callbacks = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if let Some(cb) = self
                .tree
                .get_node_context(id)
                .and_then(|ctx| ctx.props.get(event))
                .and_then(Value::as_callback)
            {
                callbacks.push(cb.clone());
            }
            let mut children = self.tree.children(id).unwrap_or_default();
            children.reverse();
            stack.extend(children);
        }
        // Listeners may queue state updates; none of them touch this tree.
        for cb in &callbacks {
            cb.call(arg);
        }
        callbacks.len()
    }

    // =========================================================================
    // Layout & Paint
    // =========================================================================

    fn compute_layout(&mut self) -> Result<(), TaffyError> {
        let available = Size {
            width: AvailableSpace::Definite(self.config.width as f32),
            height: AvailableSpace::Definite(self.config.height as f32),
        };

        let mut measure_fn = |known_dimensions: Size<Option<f32>>,
                              available_space: Size<AvailableSpace>,
                              _node_id: NodeId,
                              context: Option<&mut NodeContext>,
                              _style: &Style| {
            match context.and_then(|ctx| ctx.text()) {
                Some(content) => measure_text(&content, known_dimensions, available_space),
                None => Size::ZERO,
            }
        };

        self.tree.compute_layout_with_measure(self.root, available, &mut measure_fn)
    }

    /// Lay out the tree and collect the text to draw, with inherited
    /// attributes, clipped to the terminal.
    pub fn text_runs(&mut self) -> Result<Vec<TextRun>, TaffyError> {
        self.compute_layout()?;

        let (width, height) = (self.config.width, self.config.height);
        let mut runs = Vec::new();
        let mut stack = vec![(self.root, 0.0f32, 0.0f32, Attr::NONE)];

        while let Some((id, origin_x, origin_y, inherited)) = stack.pop() {
            let layout = self.tree.layout(id)?;
            let x = origin_x + layout.location.x;
            let y = origin_y + layout.location.y;
            let box_width = layout.size.width.round().max(0.0) as u16;

            let Some(ctx) = self.tree.get_node_context(id) else {
                continue;
            };
            let attrs = inherited | Attr::from_props(&ctx.props);

            if let Some(content) = ctx.text() {
                let (col, row) = (x.round().max(0.0) as u16, y.round().max(0.0) as u16);
                for (i, line) in wrap_text(&content, box_width).into_iter().enumerate() {
                    let line_y = row.saturating_add(i as u16);
                    if line_y >= height || col >= width {
                        break;
                    }
                    let visible = clip_text(&line, width - col);
                    if !visible.is_empty() {
                        runs.push(TextRun {
                            x: col,
                            y: line_y,
                            text: visible.to_string(),
                            attrs,
                        });
                    }
                }
                continue;
            }

            let mut children = self.tree.children(id)?;
            children.reverse();
            stack.extend(children.into_iter().map(|child| (child, x, y, attrs)));
        }

        Ok(runs)
    }

    /// Draw the tree as plain text, one string per terminal row.
    pub fn snapshot(&mut self) -> Result<Vec<String>, TaffyError> {
        let mut rows = vec![vec![' '; self.config.width as usize]; self.config.height as usize];
        for run in self.text_runs()? {
            let mut col = run.x as usize;
            for c in run.text.chars() {
                if let Some(cell) = rows[run.y as usize].get_mut(col) {
                    *cell = c;
                }
                col += c.width().unwrap_or(0);
            }
        }
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
            .collect())
    }

    /// Lay out and draw the tree with crossterm commands, then flush.
    pub fn paint(&mut self, out: &mut impl Write) -> io::Result<()> {
        let runs = self.text_runs().map_err(io::Error::other)?;

        if self.config.clear_on_paint {
            queue!(out, Clear(ClearType::All))?;
        }
        for run in runs {
            queue!(out, MoveTo(run.x, run.y))?;
            for attribute in attributes(run.attrs) {
                queue!(out, SetAttribute(attribute))?;
            }
            queue!(out, Print(&run.text))?;
            if !run.attrs.is_empty() {
                queue!(out, SetAttribute(Attribute::Reset))?;
            }
        }
        out.flush()
    }
}

/// crossterm attributes for an attribute set.
fn attributes(attrs: Attr) -> impl Iterator<Item = Attribute> {
    [
        (Attr::BOLD, Attribute::Bold),
        (Attr::DIM, Attribute::Dim),
        (Attr::ITALIC, Attribute::Italic),
        (Attr::UNDERLINE, Attribute::Underlined),
        (Attr::INVERSE, Attribute::Reverse),
        (Attr::STRIKETHROUGH, Attribute::CrossedOut),
    ]
    .into_iter()
    .filter(move |(flag, _)| attrs.contains(*flag))
    .map(|(_, attribute)| attribute)
}

impl std::fmt::Debug for TerminalHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalHost")
            .field("config", &self.config)
            .field("nodes", &self.node_count())
            .finish()
    }
}

impl HostRenderer for TerminalHost {
    type Node = NodeId;

    fn create_node(&mut self, ty: HostType<'_>, props: &Props) -> Result<NodeId, HostError> {
        let (kind, style) = match ty {
            HostType::Element(tag) => (NodeKind::Element(tag.to_string()), style_from_props(props)),
            HostType::Text => (NodeKind::Text, Style::default()),
        };
        let context = NodeContext {
            kind,
            props: props.clone(),
        };
        self.tree
            .new_leaf_with_context(style, context)
            .map_err(host_error(HostOpKind::Create))
    }

    fn update_node(&mut self, node: &NodeId, diff: &PropDiff) -> Result<(), HostError> {
        let Some(ctx) = self.tree.get_node_context_mut(*node) else {
            return Err(HostError::new(HostOpKind::Update, format!("unknown node {node:?}")));
        };
        diff.apply(&mut ctx.props);

        let style = match ctx.kind {
            NodeKind::Element(_) => Some(style_from_props(&ctx.props)),
            NodeKind::Text => None,
        };
        match style {
            Some(style) => self.tree.set_style(*node, style),
            // New text needs measuring again
            None => self.tree.mark_dirty(*node),
        }
        .map_err(host_error(HostOpKind::Update))
    }

    fn remove_node(&mut self, node: &NodeId) -> Result<(), HostError> {
        if !self.contains(*node) || self.tree.parent(*node).is_none() {
            return Err(HostError::new(HostOpKind::Remove, format!("node {node:?} is not attached")));
        }
        let subtree = self.descendants(*node);
        self.tree.remove(*node).map_err(host_error(HostOpKind::Remove))?;
        for id in subtree {
            self.tree.remove(id).map_err(host_error(HostOpKind::Remove))?;
        }
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
        match self.tree.get_node_context(*parent).map(|ctx| &ctx.kind) {
            Some(NodeKind::Element(_)) => {}
            Some(NodeKind::Text) => {
                return Err(HostError::new(HostOpKind::Append, "text nodes cannot have children"));
            }
            None => return Err(HostError::new(HostOpKind::Append, format!("unknown node {parent:?}"))),
        }
        if !self.contains(*child) {
            return Err(HostError::new(HostOpKind::Append, format!("unknown node {child:?}")));
        }
        if let Some(old_parent) = self.tree.parent(*child) {
            self.tree
                .remove_child(old_parent, *child)
                .map_err(host_error(HostOpKind::Append))?;
        }
        self.tree
            .add_child(*parent, *child)
            .map_err(host_error(HostOpKind::Append))
    }

    fn release_node(&mut self, node: &NodeId) -> Result<(), HostError> {
        if !self.contains(*node) || self.tree.parent(*node).is_some() || *node == self.root {
            return Err(HostError::new(HostOpKind::Release, format!("node {node:?} is not detached")));
        }
        self.tree.remove(*node).map_err(host_error(HostOpKind::Release))?;
        Ok(())
    }
}
