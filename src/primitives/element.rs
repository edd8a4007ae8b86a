//! Element construction.

use std::rc::Rc;

use crate::error::ElementError;
use crate::types::{Props, Value};

use super::types::{CHILDREN_PROP, Child, Element, ElementType, TEXT_ELEMENT, TEXT_VALUE_PROP};

/// Build an element from a type, props and children.
///
/// Nested child sequences are flattened in order; strings and numbers become
/// text elements. Nothing else is coerced. Children of a component element
/// are handed to its render function.
///
/// # Errors
///
/// - [`ElementError::EmptyTag`] for an empty host tag
/// - [`ElementError::ReservedTag`] when the text marker is used as a type
/// - [`ElementError::ReservedProp`] when props contain `children`
pub fn create_element(
    ty: impl Into<ElementType>,
    props: Props,
    children: impl IntoIterator<Item = Child>,
) -> Result<Element, ElementError> {
    let ty = ty.into();
    match &ty {
        ElementType::Host(tag) if tag.is_empty() => return Err(ElementError::EmptyTag),
        ElementType::Host(tag) if &**tag == TEXT_ELEMENT => {
            return Err(ElementError::ReservedTag(TEXT_ELEMENT.to_string()));
        }
        ElementType::Text => return Err(ElementError::ReservedTag(TEXT_ELEMENT.to_string())),
        _ => {}
    }
    if props.contains_key(CHILDREN_PROP) {
        return Err(ElementError::ReservedProp(CHILDREN_PROP.to_string()));
    }

    let mut flat = Vec::new();
    for child in children {
        flatten_into(&mut flat, child);
    }

    Ok(Element {
        ty,
        props,
        children: Rc::from(flat),
    })
}

/// Build a text element holding `value`.
pub fn text_element(value: impl Into<Value>) -> Element {
    Element {
        ty: ElementType::Text,
        props: Props::new().with(TEXT_VALUE_PROP, value),
        children: Rc::from(Vec::new()),
    }
}

fn flatten_into(out: &mut Vec<Element>, child: Child) {
    match child {
        Child::Element(element) => out.push(element),
        Child::Text(value) => out.push(text_element(value)),
        Child::Many(children) => {
            for child in children {
                flatten_into(out, child);
            }
        }
    }
}

/// Build a [`Props`] map.
///
/// ```ignore
/// let props = props! { "title" => "foo", "width" => 20 };
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::Props::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut props = $crate::Props::new();
        $( props.insert($key, $value); )+
        props
    }};
}

/// Build an element, converting every child with `Child::from`.
///
/// Evaluates to `Result<Element, ElementError>`.
///
/// ```ignore
/// let tree = element!("div", props!{}, element!("h1", props!{"title" => "foo"}, "Hello")?)?;
/// ```
#[macro_export]
macro_rules! element {
    ($ty:expr) => {
        $crate::create_element($ty, $crate::Props::new(), ::std::vec::Vec::<$crate::Child>::new())
    };
    ($ty:expr, $props:expr $(, $child:expr)* $(,)?) => {
        $crate::create_element(
            $ty,
            $props,
            ::std::vec::Vec::<$crate::Child>::from([$($crate::Child::from($child)),*]),
        )
    };
}
