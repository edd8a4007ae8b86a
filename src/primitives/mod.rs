//! Element primitives - the descriptor builder.
//!
//! Elements are plain immutable values describing what the tree should look
//! like:
//! - [`create_element`] - build an element from type, props and children
//! - [`text_element`] - wrap a primitive value as a text element
//! - [`Component`] - a render function that produces a subtree
//!
//! # Example
//!
//! ```ignore
//! use spark_fiber::{element, props};
//!
//! let tree = element!("div", props! {},
//!     element!("h1", props! { "title" => "foo" }, "Hello")?,
//! )?;
//! ```

mod element;
mod types;

pub use element::{create_element, text_element};
pub use types::*;
