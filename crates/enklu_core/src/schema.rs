//! Element schema - the key/value property bag carried by every element
//!
//! Authoring tools write properties such as `visible`, `src`, or
//! `anchor.version` into the schema; controllers and filters read them back
//! through the typed getters.

use crate::math::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A single schema property value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    String(String),
    Vec3(Vec3),
}

impl From<bool> for SchemaValue {
    fn from(value: bool) -> Self {
        SchemaValue::Bool(value)
    }
}

impl From<i64> for SchemaValue {
    fn from(value: i64) -> Self {
        SchemaValue::Int(value)
    }
}

impl From<f32> for SchemaValue {
    fn from(value: f32) -> Self {
        SchemaValue::Float(value)
    }
}

impl From<&str> for SchemaValue {
    fn from(value: &str) -> Self {
        SchemaValue::String(value.to_string())
    }
}

impl From<String> for SchemaValue {
    fn from(value: String) -> Self {
        SchemaValue::String(value)
    }
}

impl From<Vec3> for SchemaValue {
    fn from(value: Vec3) -> Self {
        SchemaValue::Vec3(value)
    }
}

/// Property bag keyed by property name
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    values: FxHashMap<String, SchemaValue>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<SchemaValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&SchemaValue> {
        self.values.get(key)
    }

    /// Set a property, returning the previous value
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<SchemaValue>,
    ) -> Option<SchemaValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<SchemaValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            SchemaValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            SchemaValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float getter; integer values widen
    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.values.get(key)? {
            SchemaValue::Float(v) => Some(*v),
            SchemaValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            SchemaValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn get_vec3(&self, key: &str) -> Option<Vec3> {
        match self.values.get(key)? {
            SchemaValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
