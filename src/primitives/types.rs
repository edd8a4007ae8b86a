//! Element types - the immutable description of a tree before it is
//! instantiated as fibers.

use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

use crate::error::ComponentError;
use crate::state::Hooks;
use crate::types::{Props, Value};

/// Tag reserved for text elements.
pub const TEXT_ELEMENT: &str = "TEXT_ELEMENT";

/// Prop holding the content of a text element.
pub const TEXT_VALUE_PROP: &str = "value";

/// Reserved prop name. Children travel next to props, never inside them;
/// a render function receives its element's children as a separate slice.
pub const CHILDREN_PROP: &str = "children";

// =============================================================================
// Component
// =============================================================================

type RenderFn = dyn Fn(&mut Hooks, &Props, &[Element]) -> Result<Element, ComponentError>;

/// A user-supplied render function with a display name.
///
/// The render function gets the element's props and its children, so
/// wrappers and layout components can place what they were given.
///
/// Two components are the same type when they wrap the same function or
/// closure type under the same name, regardless of captured data. That lets
/// a parent build `Component::new(..)` on every render without the child
/// being remounted. Type-erased functions (`fn` pointers, boxed closures)
/// all share one type, so for those the name tells components apart.
///
/// # Example
///
/// ```ignore
/// let greeting = Component::new("Greeting", |_hooks, props, _children| {
///     let name = props.get("name").map(ToString::to_string).unwrap_or_default();
///     Ok(element!("text", Props::new(), format!("Hello, {name}"))?)
/// });
///
/// let card = Component::new("Card", |_hooks, _props, children| {
///     Ok(element!("box", props! { "padding" => 1 }, children.to_vec())?)
/// });
/// ```
#[derive(Clone)]
pub struct Component {
    name: &'static str,
    type_id: TypeId,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new<F>(name: &'static str, render: F) -> Self
    where
        F: Fn(&mut Hooks, &Props, &[Element]) -> Result<Element, ComponentError> + 'static,
    {
        Self {
            name,
            type_id: TypeId::of::<F>(),
            render: Rc::new(render),
        }
    }

    /// Display name used in errors and logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the render function.
    pub fn render(&self, hooks: &mut Hooks, props: &Props, children: &[Element]) -> Result<Element, ComponentError> {
        (self.render)(hooks, props, children)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

// =============================================================================
// Element Type
// =============================================================================

/// What an element instantiates into.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    /// A host node, identified by its tag.
    Host(Rc<str>),
    /// A text node. Its content lives in the `value` prop.
    Text,
    /// A render function producing a subtree.
    Component(Component),
}

impl ElementType {
    pub fn is_component(&self) -> bool {
        matches!(self, ElementType::Component(_))
    }

    /// Short label for logs.
    pub fn label(&self) -> &str {
        match self {
            ElementType::Host(tag) => tag,
            ElementType::Text => TEXT_ELEMENT,
            ElementType::Component(c) => c.name(),
        }
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::Host(Rc::from(tag))
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        ElementType::Host(Rc::from(tag))
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        ElementType::Component(component)
    }
}

// =============================================================================
// Element
// =============================================================================

/// An immutable element descriptor.
///
/// Built with [`create_element`](super::create_element) or the
/// [`element!`](crate::element) macro. Cloning is cheap for children, which
/// are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) ty: ElementType,
    pub(crate) props: Props,
    pub(crate) children: Rc<[Element]>,
}

impl Element {
    pub fn ty(&self) -> &ElementType {
        &self.ty
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Content of a text element.
    pub fn text(&self) -> Option<&Value> {
        match self.ty {
            ElementType::Text => self.props.get(TEXT_VALUE_PROP),
            _ => None,
        }
    }
}

// =============================================================================
// Child
// =============================================================================

/// Anything that can be passed as a child.
///
/// Strings and numbers are wrapped into text elements; vectors are flattened
/// in order.
#[derive(Debug, Clone)]
pub enum Child {
    Element(Element),
    Text(Value),
    Many(Vec<Child>),
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Element(element)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(Value::from(text))
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(Value::from(text))
    }
}

impl From<i32> for Child {
    fn from(n: i32) -> Self {
        Child::Text(Value::from(n))
    }
}

impl From<i64> for Child {
    fn from(n: i64) -> Self {
        Child::Text(Value::from(n))
    }
}

impl From<u32> for Child {
    fn from(n: u32) -> Self {
        Child::Text(Value::from(n))
    }
}

impl From<usize> for Child {
    fn from(n: usize) -> Self {
        Child::Text(Value::from(n))
    }
}

impl From<f64> for Child {
    fn from(n: f64) -> Self {
        Child::Text(Value::from(n))
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(children: Vec<T>) -> Self {
        Child::Many(children.into_iter().map(Into::into).collect())
    }
}
