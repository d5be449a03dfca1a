//! Logical values stored by the codec
//!
//! A `Value` is what the caller thinks it is storing: a scalar, a symbolic
//! constant, a record of named fields, or an ordered sequence of those.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// A closed, ordered set of symbolic constant names (an enum type)
#[derive(Debug, PartialEq, Eq)]
pub struct ConstantSet {
    name: String,
    constants: Vec<String>,
}

impl ConstantSet {
    /// Declare a constant set. Declaration order is the canonical ordering.
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            name: name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constants(&self) -> &[String] {
        &self.constants
    }

    /// Ordinal of a constant name (case-sensitive)
    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.constants.iter().position(|c| c == name)
    }

    /// Look up a constant by its exact symbolic name
    pub fn constant(self: &Arc<Self>, name: &str) -> Option<EnumConstant> {
        self.ordinal_of(name).map(|ordinal| EnumConstant {
            set: Arc::clone(self),
            ordinal,
        })
    }

    /// Constant at the given ordinal
    pub fn at(self: &Arc<Self>, ordinal: usize) -> Option<EnumConstant> {
        (ordinal < self.constants.len()).then(|| EnumConstant {
            set: Arc::clone(self),
            ordinal,
        })
    }
}

/// One member of a [`ConstantSet`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    set: Arc<ConstantSet>,
    ordinal: usize,
}

impl EnumConstant {
    pub fn name(&self) -> &str {
        &self.set.constants[self.ordinal]
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn set(&self) -> &Arc<ConstantSet> {
        &self.set
    }
}

impl fmt::Display for EnumConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A structured value: named fields, optionally tagged with a type name
///
/// Records decoded without a schema are anonymous (`type_name() == None`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    type_name: Option<String>,
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            fields: BTreeMap::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub(crate) fn with_type_name(type_name: Option<String>) -> Self {
        Self {
            type_name,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Fields in sorted name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A logical value as seen by callers
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Symbolic constant, persisted as its name
    Enum(EnumConstant),
    Struct(Record),
    /// Ordered sequence, persisted as one array
    Seq(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short name of the value's shape, for logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Enum(_) => "enum",
            Value::Struct(_) => "struct",
            Value::Seq(_) => "sequence",
        }
    }

    /// Convert into the generic JSON representation used on disk.
    ///
    /// Fails for non-finite floats, which JSON cannot carry.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        use serde_json::Value as Json;

        Ok(match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            Value::Float(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .ok_or_else(|| Error::Serialization(format!("{n} is not a finite number")))?,
            Value::Str(s) => Json::String(s.clone()),
            Value::Enum(c) => Json::String(c.name().to_owned()),
            Value::Struct(record) => {
                let mut map = serde_json::Map::new();
                for (field, value) in record.fields() {
                    map.insert(field.to_owned(), value.to_json()?);
                }
                Json::Object(map)
            }
            Value::Seq(items) => {
                Json::Array(items.iter().map(Value::to_json).collect::<Result<_>>()?)
            }
        })
    }
}

/// Widening conversion: the shape is read off the JSON itself.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        super::infer(&json)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<EnumConstant> for Value {
    fn from(c: EnumConstant) -> Self {
        Value::Enum(c)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Struct(r)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
