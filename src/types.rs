//! Core types for spark-fiber.
//!
//! These types define what flows from elements through fibers to the host
//! renderer. Props are the only data a host ever sees, so everything a host
//! can be told about is expressed with [`Value`].

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Callback
// =============================================================================

/// An event listener stored in props.
///
/// Compared by pointer identity: two callbacks are equal only if they are
/// clones of the same closure. Re-creating a closure on every render therefore
/// shows up as a listener change in the commit diff.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&Value)>);

impl Callback {
    /// Wrap a closure as a callback.
    pub fn new(f: impl Fn(&Value) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the listener with an event argument.
    pub fn call(&self, arg: &Value) {
        (self.0)(arg)
    }

    /// Check whether both callbacks point at the same closure.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// Value
// =============================================================================

/// A single property value.
///
/// Floats compare by bit pattern, so a `NaN` prop equals itself and does not
/// show up as a change on every render.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Callback(Callback),
}

impl Value {
    /// Borrow as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Read as an integer (floats are truncated).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Read as a float (integers are widened).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Value::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Callback(a), Value::Callback(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Callback(_) => f.write_str("[callback]"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Rc::from(value))
    }
}

impl From<Rc<str>> for Value {
    fn from(value: Rc<str>) -> Self {
        Value::Str(value)
    }
}

impl From<Callback> for Value {
    fn from(value: Callback) -> Self {
        Value::Callback(value)
    }
}

// =============================================================================
// Props
// =============================================================================

/// Property mapping of an element or fiber.
///
/// Ordered by key so that prop diffs, host calls and markup snapshots are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(BTreeMap<Rc<str>, Value>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<Rc<str>>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<Rc<str>>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.0.iter().map(|(k, v)| (&**k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<Rc<str>>, V: Into<Value>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Event-style property check: keys starting with `on` carry listeners.
#[inline]
pub fn is_listener(key: &str) -> bool {
    key.starts_with("on")
}

// =============================================================================
// Dimension
// =============================================================================

/// A size value for layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    /// Size determined by content/layout.
    #[default]
    Auto,
    /// Fixed size in terminal cells.
    Cells(u16),
    /// Percentage of parent (0-100).
    Percent(f32),
}

impl From<&Value> for Dimension {
    /// `Int`/`Float` are cells, `"50%"` is a percentage, anything else is auto.
    fn from(value: &Value) -> Self {
        match value {
            Value::Int(n) if *n > 0 => Self::Cells((*n).min(u16::MAX as i64) as u16),
            Value::Float(f) if *f > 0.0 => Self::Cells(f.round().min(u16::MAX as f64) as u16),
            Value::Str(s) => match s.trim().strip_suffix('%') {
                Some(pct) => pct.trim().parse().map(Self::Percent).unwrap_or(Self::Auto),
                None => s.trim().parse::<u16>().map(Self::Cells).unwrap_or(Self::Auto),
            },
            _ => Self::Auto,
        }
    }
}

// =============================================================================
// Text Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield for efficient storage and inheritance.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const INVERSE = 1 << 4;
        const STRIKETHROUGH = 1 << 5;
    }
}

impl Attr {
    /// Prop name for each attribute flag.
    const PROP_NAMES: [(&'static str, Attr); 6] = [
        ("bold", Attr::BOLD),
        ("dim", Attr::DIM),
        ("italic", Attr::ITALIC),
        ("underline", Attr::UNDERLINE),
        ("inverse", Attr::INVERSE),
        ("strikethrough", Attr::STRIKETHROUGH),
    ];

    /// Collect the attributes switched on by boolean props.
    pub fn from_props(props: &Props) -> Self {
        let mut attrs = Attr::NONE;
        for (name, flag) in Self::PROP_NAMES {
            if props.get(name).and_then(Value::as_bool).unwrap_or(false) {
                attrs |= flag;
            }
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_values_compare_by_bits() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::from(1.5), Value::Float(1.5));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn test_callback_identity() {
        let a = Callback::new(|_| {});
        let b = a.clone();
        let c = Callback::new(|_| {});
        assert_eq!(Value::Callback(a.clone()), Value::Callback(b));
        assert_ne!(Value::Callback(a), Value::Callback(c));
    }

    #[test]
    fn test_props_are_ordered() {
        let props = Props::new().with("zeta", 1).with("alpha", "a").with("mid", true);
        let keys: Vec<&str> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_dimension_from_value() {
        assert_eq!(Dimension::from(&Value::Int(12)), Dimension::Cells(12));
        assert_eq!(Dimension::from(&Value::from("50%")), Dimension::Percent(50.0));
        assert_eq!(Dimension::from(&Value::from("auto")), Dimension::Auto);
        assert_eq!(Dimension::from(&Value::Int(-3)), Dimension::Auto);
    }

    #[test]
    fn test_attr_from_props() {
        let props = Props::new().with("bold", true).with("underline", true).with("dim", false);
        assert_eq!(Attr::from_props(&props), Attr::BOLD | Attr::UNDERLINE);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("Hello").to_string(), "Hello");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "");
    }
}
