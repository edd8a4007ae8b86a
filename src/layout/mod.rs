//! Layout Module
//!
//! Flexbox layout for the terminal host using
//! [Taffy](https://github.com/DioxusLabs/taffy).
//!
//! The bridge:
//!
//! 1. Converts host element props to Taffy styles
//! 2. Provides the measure function for text intrinsic sizing
//!
//! The Taffy tree itself is owned by
//! [`TerminalHost`](crate::renderer::terminal::TerminalHost), which mirrors the
//! committed host tree one node per host node.

mod taffy_bridge;
mod text_measure;

pub use taffy_bridge::{measure_text, style_from_props};
pub use text_measure::*;
