//! Hybrid list/map arrays
//!
//! An array is a dense sequence plus an insertion-ordered map. Non-negative
//! integer indexes address the sequence (padding with null when needed);
//! every other index addresses the map. Length counts the sequence only.

use super::error::{InterpResult, RuntimeError};
use super::number;
use super::value::{ArrayRef, Value};
use indexmap::{IndexMap, IndexSet};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Map key with dictionary identity: scalars compare by value, arrays and
/// functions by reference. Strings are snapshotted when the key is made so
/// later mutation of the source cell can't move the entry.
#[derive(Debug, Clone)]
pub struct Key(Value);

impl Key {
    pub fn new(value: &Value) -> Self {
        match value {
            Value::Str(s) => Key(Value::string(s.borrow().as_str())),
            other => Key(other.clone()),
        }
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => *a.borrow() == *b.borrow(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Mysterious, Value::Mysterious) => true,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Number(n) => n.normalize().hash(state),
            Value::Str(s) => s.borrow().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null | Value::Mysterious => {}
            Value::Array(a) => (Rc::as_ptr(a) as *const () as usize).hash(state),
            Value::Function(f) => (Rc::as_ptr(f) as *const () as usize).hash(state),
            Value::Closure(c) => (Rc::as_ptr(c) as *const () as usize).hash(state),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Array cells already on the current walk, so self-containing arrays
/// terminate
pub(super) type Visited = Vec<*const RefCell<Array>>;

/// Pairs of array cells already being compared
pub(super) type VisitedPairs = Vec<(*const RefCell<Array>, *const RefCell<Array>)>;

/// Source cell to fresh copy, so a deep clone keeps shared and cyclic
/// structure instead of unrolling it
pub(super) type Clones = HashMap<*const RefCell<Array>, ArrayRef>;

/// Sequence slot addressed by an index, if it addresses one
fn slot(index: &Value) -> Option<usize> {
    match index {
        Value::Number(n) => number::as_index(*n),
        _ => None,
    }
}

/// Hybrid array value
#[derive(Debug, Clone, Default)]
pub struct Array {
    items: Vec<Value>,
    entries: IndexMap<Key, Value>,
}

impl Array {
    pub fn new() -> Self {
        Array::default()
    }

    pub fn from_parts(items: Vec<Value>, entries: IndexMap<Key, Value>) -> Self {
        Array { items, entries }
    }

    /// Sequence length
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when the map holds anything; this is array truthiness
    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }

    /// Element at `index`, mysterious when absent
    pub fn get(&self, index: &Value) -> Value {
        let found = match slot(index) {
            Some(i) => self.items.get(i),
            None => self.entries.get(&Key::new(index)),
        };
        found.cloned().unwrap_or(Value::Mysterious)
    }

    pub fn set(&mut self, index: &Value, value: Value) {
        match slot(index) {
            Some(i) => {
                if i >= self.items.len() {
                    self.items.resize(i + 1, Value::Null);
                }
                self.items[i] = value;
            }
            None => {
                self.entries.insert(Key::new(index), value);
            }
        }
    }

    /// Array stored at `index`, created when the slot is empty
    fn nest(&mut self, index: &Value) -> InterpResult<ArrayRef> {
        match self.get(index) {
            Value::Array(existing) => Ok(existing),
            Value::Mysterious | Value::Null => {
                let created = Rc::new(RefCell::new(Array::new()));
                self.set(index, Value::Array(Rc::clone(&created)));
                Ok(created)
            }
            _ => Err(RuntimeError::not_indexable(&format!(
                "element {}",
                index.to_text()
            ))),
        }
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    /// Remove the last element
    pub fn pop(&mut self) -> Value {
        self.items.pop().unwrap_or(Value::Mysterious)
    }

    /// Remove the first element
    pub fn dequeue(&mut self) -> Value {
        if self.items.is_empty() {
            return Value::Mysterious;
        }
        self.items.remove(0)
    }

    pub fn join(&self, separator: &str) -> String {
        self.items
            .iter()
            .map(Value::to_text)
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// `array + array`; entries from `other` win on duplicate keys
    pub fn concat(&self, other: &Array) -> Array {
        let mut result = self.clone();
        result.items.extend(other.items.iter().cloned());
        for (key, value) in &other.entries {
            result.entries.insert(key.clone(), value.clone());
        }
        result
    }

    /// `array + value`
    pub fn with_item(&self, value: Value) -> Array {
        let mut result = self.clone();
        result.items.push(value);
        result
    }

    /// `array - array`: distinct items not in `other`, and entries whose
    /// key and value aren't both matched by an entry of `other`.
    pub fn difference(&self, other: &Array) -> Array {
        let excluded: IndexSet<Key> = other.items.iter().map(Key::new).collect();
        let mut seen = IndexSet::new();
        let items = self
            .items
            .iter()
            .filter(|item| {
                let key = Key::new(item);
                !excluded.contains(&key) && seen.insert(key)
            })
            .cloned()
            .collect();
        let entries = self
            .entries
            .iter()
            .filter(|(key, value)| {
                !other
                    .entries
                    .iter()
                    .any(|(k, v)| key.value().equals(k.value()) && value.equals(v))
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Array::from_parts(items, entries)
    }

    /// `array - value`: everything not equal to `value`
    pub fn without(&self, value: &Value) -> Array {
        let items = self
            .items
            .iter()
            .filter(|item| !item.equals(value))
            .cloned()
            .collect();
        let entries = self
            .entries
            .iter()
            .filter(|(_, v)| !v.equals(value))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Array::from_parts(items, entries)
    }

    /// Element-wise sequence match plus an order-insensitive map match
    pub(super) fn equals_within(&self, other: &Array, seen: &mut VisitedPairs) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(&other.items)
                .all(|(a, b)| a.equals_within(b, seen))
            && self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(k, v)| {
                other
                    .entries
                    .get(k)
                    .is_some_and(|w| v.equals_within(w, seen))
            })
    }

    pub fn length(&self) -> Decimal {
        Decimal::from(self.items.len())
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Array {
            items,
            entries: IndexMap::new(),
        }
    }
}

/// Assign through a chain of indexes, creating intermediate arrays
pub fn set_path(array: &ArrayRef, indexes: &[Value], value: Value) -> InterpResult<()> {
    let Some((last, path)) = indexes.split_last() else {
        return Ok(());
    };
    let mut current = Rc::clone(array);
    for index in path {
        let next = current.borrow_mut().nest(index)?;
        current = next;
    }
    current.borrow_mut().set(last, value);
    Ok(())
}

/// Fresh cells all the way down. An array met twice is copied once.
pub(super) fn deep_clone(array: &ArrayRef, clones: &mut Clones) -> ArrayRef {
    let source = Rc::as_ptr(array);
    if let Some(copy) = clones.get(&source) {
        return Rc::clone(copy);
    }
    let copy = Rc::new(RefCell::new(Array::new()));
    clones.insert(source, Rc::clone(&copy));
    let original = array.borrow();
    let items = original
        .items
        .iter()
        .map(|v| v.deep_clone_within(clones))
        .collect();
    let entries = original
        .entries
        .iter()
        .map(|(k, v)| (k.clone(), v.deep_clone_within(clones)))
        .collect();
    *copy.borrow_mut() = Array::from_parts(items, entries);
    copy
}

/// Display form of an array cell; an array nested inside itself shows
/// as `[ ... ]`
pub(super) fn render(array: &ArrayRef) -> String {
    render_within(array, &mut Visited::new())
}

fn render_within(array: &ArrayRef, visited: &mut Visited) -> String {
    let cell = Rc::as_ptr(array);
    if visited.contains(&cell) {
        return String::from("[ ... ]");
    }
    visited.push(cell);
    let text = array.borrow().render_within(visited);
    visited.pop();
    text
}

fn render_value(value: &Value, visited: &mut Visited) -> String {
    match value {
        Value::Array(a) => render_within(a, visited),
        other => other.to_string(),
    }
}

/// Collapse runs of five or more nulls in a rendered array
fn collapse_nulls(text: &str) -> String {
    const NULL: &str = "null";
    const NEXT: &str = ", null";
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(NULL) {
        out.push_str(&rest[..start]);
        let mut end = start + NULL.len();
        let mut repeats = 0;
        while rest[end..].starts_with(NEXT) {
            end += NEXT.len();
            repeats += 1;
        }
        if repeats >= 4 {
            out.push_str(" ... ");
        } else {
            out.push_str(&rest[start..end]);
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

impl Array {
    fn render_within(&self, visited: &mut Visited) -> String {
        let mut text = String::from("[ ");
        let items: Vec<String> = self
            .items
            .iter()
            .map(|v| render_value(v, visited))
            .collect();
        text.push_str(&items.join(", "));
        if !self.entries.is_empty() {
            if !self.items.is_empty() {
                text.push_str("; ");
            }
            let entries: Vec<String> = self
                .entries
                .iter()
                .map(|(k, v)| {
                    let key = render_value(k.value(), visited);
                    format!("{key}: {}", render_value(v, visited))
                })
                .collect();
            text.push_str(&entries.join("; "));
            text.push(' ');
        } else if !self.items.is_empty() {
            text.push(' ');
        }
        text.push(']');
        collapse_nulls(&text)
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_within(&mut Visited::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: i64) -> Value {
        Value::Number(Decimal::from(n))
    }

    #[test]
    fn test_numeric_keys_route_to_sequence() {
        let mut array = Array::new();
        array.set(&num(2), Value::string("c"));
        assert_eq!(array.len(), 3);
        assert!(matches!(array.get(&num(0)), Value::Null));
        assert_eq!(array.get(&num(2)).to_text(), "c");
        assert!(!array.has_entries());
    }

    #[test]
    fn test_other_keys_route_to_map() {
        let mut array = Array::new();
        array.set(&Value::string("name"), Value::string("Tommy"));
        array.set(&num(-1), Value::Bool(true));
        array.set(&Value::Number(Decimal::new(15, 1)), Value::Null);
        assert_eq!(array.len(), 0);
        assert!(array.has_entries());
        assert_eq!(array.get(&Value::string("name")).to_text(), "Tommy");
        assert!(matches!(array.get(&Value::string("NAME")), Value::Mysterious));
    }

    #[test]
    fn test_push_then_dequeue_is_fifo() {
        let mut array = Array::new();
        for n in 0..5 {
            array.push(num(n));
        }
        let drained: Vec<String> = (0..5).map(|_| array.dequeue().to_text()).collect();
        assert_eq!(drained, vec!["0", "1", "2", "3", "4"]);
        assert!(matches!(array.dequeue(), Value::Mysterious));
    }

    #[test]
    fn test_pop_takes_tail() {
        let mut array = Array::from(vec![num(1), num(2)]);
        assert_eq!(array.pop().to_text(), "2");
        assert_eq!(array.pop().to_text(), "1");
        assert!(matches!(array.pop(), Value::Mysterious));
    }

    #[test]
    fn test_key_snapshots_strings() {
        let key_source = Value::string("k");
        let mut array = Array::new();
        array.set(&key_source, num(1));
        if let Value::Str(s) = &key_source {
            s.borrow_mut().push('!');
        }
        assert_eq!(array.get(&Value::string("k")).to_text(), "1");
    }

    #[test]
    fn test_number_keys_compare_by_value() {
        let mut array = Array::new();
        array.set(&Value::Number(Decimal::new(-10, 1)), Value::string("a"));
        assert_eq!(array.get(&num(-1)).to_text(), "a");
    }

    #[test]
    fn test_set_path_creates_nested_arrays() {
        let Value::Array(root) = Value::array(Vec::new()) else { unreachable!() };
        set_path(&root, &[Value::string("a"), num(1)], Value::string("x")).unwrap();
        let inner = root.borrow().get(&Value::string("a"));
        assert_eq!(inner.to_text(), r#"[ null, "x" ]"#);
    }

    #[test]
    fn test_set_path_through_scalar_fails() {
        let Value::Array(root) = Value::array(vec![num(5)]) else { unreachable!() };
        let err = set_path(&root, &[num(0), num(1)], num(1)).unwrap_err();
        assert_eq!(err.kind, crate::interp::error::ErrorKind::NotIndexable);
    }

    #[test]
    fn test_join() {
        let array = Array::from(vec![Value::string("a"), num(1), Value::Bool(true)]);
        assert_eq!(array.join(""), "a1true");
        assert_eq!(array.join("-"), "a-1-true");
    }

    #[test]
    fn test_difference_dedups_and_removes() {
        let a = Array::from(vec![num(1), num(2), num(2), num(3)]);
        let b = Array::from(vec![num(3)]);
        assert_eq!(a.difference(&b).to_string(), "[ 1, 2 ]");
    }

    #[test]
    fn test_without_value() {
        let a = Array::from(vec![num(1), num(2), num(1)]);
        assert_eq!(a.without(&num(1)).to_string(), "[ 2 ]");
    }

    #[test]
    fn test_concat_keeps_entries() {
        let mut a = Array::from(vec![num(1)]);
        a.set(&Value::string("k"), num(1));
        let mut b = Array::from(vec![num(2)]);
        b.set(&Value::string("k"), num(2));
        let joined = a.concat(&b);
        assert_eq!(joined.to_string(), r#"[ 1, 2; "k": 2 ]"#);
    }

    #[test]
    fn test_display_collapses_null_runs() {
        let mut array = Array::new();
        array.set(&num(6), num(1));
        insta::assert_snapshot!(array.to_string(), @"[  ... , 1 ]");
    }

    #[test]
    fn test_display_short_null_run_kept() {
        let mut array = Array::new();
        array.set(&num(2), num(1));
        assert_eq!(array.to_string(), "[ null, null, 1 ]");
    }

    fn self_containing() -> ArrayRef {
        let array = Rc::new(RefCell::new(Array::from(vec![num(1)])));
        array.borrow_mut().push(Value::Array(Rc::clone(&array)));
        array
    }

    #[test]
    fn test_display_self_containing_array() {
        let array = self_containing();
        assert_eq!(render(&array), "[ 1, [ ... ] ]");
    }

    #[test]
    fn test_display_shared_sibling_is_not_a_cycle() {
        let inner = Value::array(vec![num(2)]);
        let outer = Value::array(vec![inner.clone(), inner]);
        assert_eq!(outer.to_text(), "[ [ 2 ], [ 2 ] ]");
    }

    #[test]
    fn test_deep_clone_keeps_cycle() {
        let array = self_containing();
        let copy = deep_clone(&array, &mut Clones::new());
        assert!(!Rc::ptr_eq(&array, &copy));
        let Value::Array(nested) = copy.borrow().get(&num(1)) else {
            unreachable!()
        };
        assert!(Rc::ptr_eq(&nested, &copy));
        copy.borrow_mut().set(&num(0), num(9));
        assert_eq!(render(&array), "[ 1, [ ... ] ]");
        assert_eq!(render(&copy), "[ 9, [ ... ] ]");
    }

    #[test]
    fn test_self_containing_arrays_compare() {
        let first = Value::Array(self_containing());
        let second = Value::Array(self_containing());
        assert!(first.equals(&second));
        assert!(first.equals(&first));
        let Value::Array(cell) = &second else { unreachable!() };
        cell.borrow_mut().set(&num(0), num(2));
        assert!(!first.equals(&second));
    }

    #[test]
    fn test_display_empty() {
        assert_eq!(Array::new().to_string(), "[ ]");
    }
}
