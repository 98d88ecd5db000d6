// SPDX-License-Identifier: MIT OR Apache-2.0
//! Child and descendant traversal
//!
//! Recursive descent uses an explicit stack of child iterators, so depth is
//! bounded by heap rather than call stack. Order is pre-order: a child is
//! yielded before anything beneath it, then the walk continues with its
//! first grandchild.

use std::slice;

use serde_json::{Value, map};
use smallvec::SmallVec;

use crate::filter::NameSet;

/// Direct children of a container, in array or declaration order.
pub enum Children<'a> {
    /// Array elements
    Array(slice::Iter<'a, Value>),
    /// Object properties
    Object(map::Iter<'a>),
    /// Scalars have no children
    Empty,
}

impl<'a> Children<'a> {
    pub fn of(node: &'a Value) -> Self {
        match node {
            Value::Array(items) => Self::Array(items.iter()),
            Value::Object(map) => Self::Object(map.iter()),
            _ => Self::Empty,
        }
    }

    /// Next child with its property name, if it has one.
    fn next_entry(&mut self) -> Option<(Option<&'a str>, &'a Value)> {
        match self {
            Self::Array(items) => items.next().map(|value| (None, value)),
            Self::Object(entries) => entries.next().map(|(key, value)| (Some(key.as_str()), value)),
            Self::Empty => None,
        }
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().map(|(_, value)| value)
    }
}

/// Pre-order walk over every node below a root, excluding the root.
pub struct Descendants<'a> {
    stack: SmallVec<[Children<'a>; 16]>,
}

impl<'a> Descendants<'a> {
    pub fn of(node: &'a Value) -> Self {
        let mut stack = SmallVec::new();
        stack.push(Children::of(node));
        Self { stack }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (Option<&'a str>, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next_entry() {
                Some((key, value)) => {
                    if matches!(value, Value::Array(_) | Value::Object(_)) {
                        self.stack.push(Children::of(value));
                    }
                    return Some((key, value));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Which descendants a scan yields.
enum Accept<'p> {
    /// The start node and every descendant
    All,
    /// Properties with this name
    Name(&'p str),
    /// Properties with any of these names
    Names(&'p NameSet),
}

/// Recursive descent step.
pub struct Scan<'p, 'a> {
    start: Option<&'a Value>,
    descendants: Descendants<'a>,
    accept: Accept<'p>,
}

impl<'p, 'a> Scan<'p, 'a> {
    /// The node itself followed by all descendants.
    pub fn all(node: &'a Value) -> Self {
        Self {
            start: Some(node),
            descendants: Descendants::of(node),
            accept: Accept::All,
        }
    }

    /// Values of descendant properties called `name`.
    pub fn named(node: &'a Value, name: &'p str) -> Self {
        Self {
            start: None,
            descendants: Descendants::of(node),
            accept: Accept::Name(name),
        }
    }

    /// Values of descendant properties with any of `names`.
    pub fn any_of(node: &'a Value, names: &'p NameSet) -> Self {
        Self {
            start: None,
            descendants: Descendants::of(node),
            accept: Accept::Names(names),
        }
    }
}

impl<'a> Iterator for Scan<'_, 'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(start) = self.start.take() {
            return Some(start);
        }
        loop {
            let (key, value) = self.descendants.next()?;
            let accepted = match (&self.accept, key) {
                (Accept::All, _) => true,
                (Accept::Name(name), Some(key)) => *name == key,
                (Accept::Names(names), Some(key)) => names.contains(key),
                (_, None) => false,
            };
            if accepted {
                return Some(value);
            }
        }
    }
}
