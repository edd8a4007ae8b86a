//! Prop diffing for UPDATE effects.
//!
//! The commit compares the props a host node was last given with the new
//! props and sends only the difference.
//!
//! # Algorithm
//!
//! 1. Listeners (`on*` keys) that are gone or changed: removed
//! 2. Plain props that are gone: removed
//! 3. Plain props that are new or changed: set
//! 4. Listeners that are new or changed: added
//!
//! A changed listener therefore appears twice, once removed and once added,
//! so hosts never hold two listeners for one event.

use crate::types::{Props, Value, is_listener};

/// Difference between two prop maps, in application order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropDiff {
    pub removed_listeners: Vec<(String, Value)>,
    pub removed: Vec<String>,
    pub set: Vec<(String, Value)>,
    pub added_listeners: Vec<(String, Value)>,
}

impl PropDiff {
    /// Compare `old` against `new`.
    pub fn between(old: &Props, new: &Props) -> Self {
        let mut diff = PropDiff::default();

        for (key, old_value) in old.iter() {
            let new_value = new.get(key);
            if is_listener(key) {
                if new_value != Some(old_value) {
                    diff.removed_listeners.push((key.to_string(), old_value.clone()));
                }
            } else if new_value.is_none() {
                diff.removed.push(key.to_string());
            }
        }

        for (key, new_value) in new.iter() {
            if old.get(key) == Some(new_value) {
                continue;
            }
            if is_listener(key) {
                diff.added_listeners.push((key.to_string(), new_value.clone()));
            } else {
                diff.set.push((key.to_string(), new_value.clone()));
            }
        }

        diff
    }

    /// True when applying the diff would change nothing.
    pub fn is_empty(&self) -> bool {
        self.removed_listeners.is_empty()
            && self.removed.is_empty()
            && self.set.is_empty()
            && self.added_listeners.is_empty()
    }

    /// Number of individual changes.
    pub fn len(&self) -> usize {
        self.removed_listeners.len() + self.removed.len() + self.set.len() + self.added_listeners.len()
    }

    /// Apply to a prop map mirrored by a host.
    pub fn apply(&self, props: &mut Props) {
        for (key, _) in &self.removed_listeners {
            props.remove(key);
        }
        for key in &self.removed {
            props.remove(key);
        }
        for (key, value) in self.set.iter().chain(&self.added_listeners) {
            props.insert(key.as_str(), value.clone());
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Callback;

    #[test]
    fn test_nan_prop_is_not_a_change() {
        let props = Props::new().with("ratio", f64::NAN);
        assert!(PropDiff::between(&props, &props.clone()).is_empty());
    }

    #[test]
    fn test_identical_props_are_empty() {
        let cb = Callback::new(|_| {});
        let props = Props::new().with("title", "foo").with("onClick", cb);
        let diff = PropDiff::between(&props, &props.clone());
        assert!(diff.is_empty());
        assert_eq!(diff.len(), 0);
    }

    #[test]
    fn test_removed_and_changed_props() {
        let old = Props::new().with("title", "foo").with("width", 10);
        let new = Props::new().with("width", 20).with("height", 5);
        let diff = PropDiff::between(&old, &new);

        assert_eq!(diff.removed, vec!["title".to_string()]);
        assert_eq!(
            diff.set,
            vec![("height".to_string(), Value::Int(5)), ("width".to_string(), Value::Int(20))]
        );
        assert!(diff.removed_listeners.is_empty());
        assert!(diff.added_listeners.is_empty());
    }

    #[test]
    fn test_changed_listener_is_removed_then_added() {
        let old_cb = Callback::new(|_| {});
        let new_cb = Callback::new(|_| {});
        let old = Props::new().with("onClick", old_cb.clone());
        let new = Props::new().with("onClick", new_cb.clone());
        let diff = PropDiff::between(&old, &new);

        assert_eq!(diff.removed_listeners, vec![("onClick".to_string(), Value::Callback(old_cb))]);
        assert_eq!(diff.added_listeners, vec![("onClick".to_string(), Value::Callback(new_cb))]);
        assert!(diff.set.is_empty());
    }

    #[test]
    fn test_apply_reaches_new_props() {
        let old = Props::new().with("a", 1).with("b", 2).with("onKey", Callback::new(|_| {}));
        let new = Props::new().with("b", 3).with("c", "x");
        let mut mirrored = old.clone();
        PropDiff::between(&old, &new).apply(&mut mirrored);
        assert_eq!(mirrored, new);
    }
}
