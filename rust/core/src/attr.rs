// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized attribute reader for geometry-backend property bags.
//!
//! Geometry backends hand back loosely shaped attribute data: sometimes a
//! bare value, sometimes a record with the value nested under `.value`,
//! sometimes buried inside a named property set. Instead of string-keyed
//! fallback lookups scattered through the engine, the known shapes are
//! declared here as explicit variants and decoded once at the boundary.

use rustc_hash::FxHashMap;

/// Result alias for attribute decoding.
pub type Result<T> = std::result::Result<T, AttrError>;

/// Errors raised while reading attributes.
#[derive(Debug, thiserror::Error)]
pub enum AttrError {
    /// The named attribute does not exist in the bag.
    #[error("attribute not found: {0}")]
    NotFound(String),

    /// The attribute exists but holds a different shape than requested.
    #[error("attribute {name} has unexpected shape: expected {expected}")]
    WrongShape {
        name: String,
        expected: &'static str,
    },
}

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    /// A value wrapped in a `{ value: ... }` record.
    Wrapped(Box<AttrValue>),
    List(Vec<AttrValue>),
    /// A named property set containing further attributes.
    PropertySet(FxHashMap<String, AttrValue>),
}

impl AttrValue {
    /// Strips any number of `Wrapped` layers.
    pub fn unwrap_layers(&self) -> &AttrValue {
        let mut value = self;
        while let AttrValue::Wrapped(inner) = value {
            value = inner;
        }
        value
    }

    /// Returns the text content, looking through wrapping layers.
    pub fn as_text(&self) -> Option<&str> {
        match self.unwrap_layers() {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric content, looking through wrapping layers.
    /// Integers coerce to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self.unwrap_layers() {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the boolean content, looking through wrapping layers.
    pub fn as_bool(&self) -> Option<bool> {
        match self.unwrap_layers() {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list content, looking through wrapping layers.
    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self.unwrap_layers() {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a nested value inside a property set.
    pub fn lookup(&self, key: &str) -> Option<&AttrValue> {
        match self.unwrap_layers() {
            AttrValue::PropertySet(map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.unwrap_layers(), AttrValue::Null)
    }
}

/// All attributes of one element, keyed by attribute name.
pub type AttrBag = FxHashMap<String, AttrValue>;

/// Reads a text attribute from a bag, looking through wrapping layers and
/// one level of property-set nesting (`"Pset/Name"` style paths are not
/// supported; nesting is searched by the leaf key).
pub fn text_attr<'a>(bag: &'a AttrBag, name: &str) -> Result<&'a str> {
    let value = bag
        .get(name)
        .or_else(|| {
            // Fall back to the same key inside any property set
            bag.values()
                .find_map(|v| v.lookup(name))
        })
        .ok_or_else(|| AttrError::NotFound(name.to_string()))?;

    value.as_text().ok_or_else(|| AttrError::WrongShape {
        name: name.to_string(),
        expected: "text",
    })
}

/// Reads a numeric attribute from a bag, with the same nesting rules as
/// [`text_attr`].
pub fn number_attr(bag: &AttrBag, name: &str) -> Result<f64> {
    let value = bag
        .get(name)
        .or_else(|| bag.values().find_map(|v| v.lookup(name)))
        .ok_or_else(|| AttrError::NotFound(name.to_string()))?;

    value.as_f64().ok_or_else(|| AttrError::WrongShape {
        name: name.to_string(),
        expected: "number",
    })
}
