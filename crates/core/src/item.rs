//! Stream items.
//!
//! An item is a keyed record materialized from backend child events. The
//! `StreamItem` trait is the pluggable materialization contract; `Item` is the
//! stock implementation that simply keeps every field it is given.

use crate::value::Value;
use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;

/// Field name to value mapping, as delivered by the backend for one child.
pub type FieldMap = BTreeMap<String, Value>;

/// An object with a unique, stable, string-valued key.
pub trait Keyed {
    /// Returns the key identifying this object within its collection.
    fn key(&self) -> &str;
}

impl<T: Keyed + ?Sized> Keyed for Rc<T> {
    #[inline]
    fn key(&self) -> &str {
        (**self).key()
    }
}

impl<T: Keyed + ?Sized> Keyed for &T {
    #[inline]
    fn key(&self) -> &str {
        (**self).key()
    }
}

/// A record that streams can materialize from backend events.
///
/// Streams construct items with `with_key` and then hydrate them with
/// `update`. Later `Changed` events clone the current item and call `update`
/// again on the copy, so implementations must treat `update` as "replace the
/// fields named in this map".
pub trait StreamItem: Keyed + Clone {
    /// Creates an empty item for the given key.
    fn with_key(key: &str) -> Self;

    /// Hydrates or rehydrates fields from a backend value map.
    fn update(&mut self, fields: &FieldMap);

    /// Returns the value of a named field, `Value::Null` if absent.
    fn field(&self, name: &str) -> Cow<'_, Value>;

    /// Serializes the item back into a value map.
    ///
    /// Streams never call this; it exists for write-path code that persists
    /// items symmetrically to how they were read.
    fn to_value_map(&self) -> FieldMap;
}

/// A generic item that stores every field it receives.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    key: String,
    fields: FieldMap,
}

impl Item {
    /// Creates an item with the given key and fields.
    pub fn new(key: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            key: key.into(),
            fields,
        }
    }

    /// Returns a reference to the fields.
    #[inline]
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Gets a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a field value, returning the previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }
}

impl Keyed for Item {
    #[inline]
    fn key(&self) -> &str {
        &self.key
    }
}

impl StreamItem for Item {
    fn with_key(key: &str) -> Self {
        Self::new(key, FieldMap::new())
    }

    fn update(&mut self, fields: &FieldMap) {
        self.fields = fields.clone();
    }

    fn field(&self, name: &str) -> Cow<'_, Value> {
        match self.fields.get(name) {
            Some(v) => Cow::Borrowed(v),
            None => Cow::Owned(Value::Null),
        }
    }

    fn to_value_map(&self) -> FieldMap {
        self.fields.clone()
    }
}

/// Builds a `FieldMap` from `(name, value)` pairs.
pub fn field_map<I, K, V>(pairs: I) -> FieldMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_with_key() {
        let item = Item::with_key("a");
        assert_eq!(item.key(), "a");
        assert!(item.fields().is_empty());
        assert!(item.field("missing").is_null());
    }

    #[test]
    fn test_item_update_replaces_fields() {
        let mut item = Item::with_key("a").with_field("int", 1i64).with_field("s", "x");
        item.update(&field_map([("int", 2i64)]));

        assert_eq!(item.field("int").as_f64(), Some(2.0));
        assert!(item.field("s").is_null());
    }

    #[test]
    fn test_item_to_value_map() {
        let item = Item::new("k", field_map([("b", true)]));
        assert_eq!(item.to_value_map().get("b"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_keyed_through_rc() {
        let item = Rc::new(Item::with_key("rc"));
        assert_eq!(Keyed::key(&item), "rc");
    }
}
