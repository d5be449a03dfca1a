//! Type witnesses that steer decoding back to the intended shape
//!
//! Witnesses are never persisted. An explicit witness asks for an exact
//! shape; `Witness::Infer` lets the stored JSON decide (fallback-widening).

use std::sync::Arc;

use super::value::{ConstantSet, Value};

/// Primitive scalar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Str,
    Int,
    Float,
    Bool,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Str => "string",
            ScalarKind::Int => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "boolean",
        }
    }
}

/// Declared fields of a structured type
#[derive(Debug, PartialEq)]
pub struct Schema {
    name: Option<String>,
    fields: Vec<(String, Witness)>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            fields: Vec::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            name: None,
            fields: Vec::new(),
        }
    }

    /// Declare a field (builder style)
    pub fn field(mut self, name: impl Into<String>, witness: Witness) -> Self {
        self.fields.push((name.into(), witness));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &[(String, Witness)] {
        &self.fields
    }
}

/// How to read a stored value back
#[derive(Debug, Clone, PartialEq)]
pub enum Witness {
    /// Take the shape from the stored JSON; numbers widen to `Float`,
    /// enum constants come back as `Str`
    Infer,
    Scalar(ScalarKind),
    Enum(Arc<ConstantSet>),
    Struct(Arc<Schema>),
    /// Every element decoded with the inner witness
    Seq(Box<Witness>),
}

impl Witness {
    pub fn string() -> Self {
        Witness::Scalar(ScalarKind::Str)
    }

    pub fn int() -> Self {
        Witness::Scalar(ScalarKind::Int)
    }

    pub fn float() -> Self {
        Witness::Scalar(ScalarKind::Float)
    }

    pub fn bool() -> Self {
        Witness::Scalar(ScalarKind::Bool)
    }

    pub fn enumeration(set: &Arc<ConstantSet>) -> Self {
        Witness::Enum(Arc::clone(set))
    }

    pub fn record(schema: Schema) -> Self {
        Witness::Struct(Arc::new(schema))
    }

    pub fn seq_of(element: Witness) -> Self {
        Witness::Seq(Box::new(element))
    }

    /// Derive a witness from a sample (default) value.
    ///
    /// A `Null` sample carries no shape and yields `Infer`. Sequences take
    /// the shape of their first element; an empty sequence yields `Seq(Infer)`.
    pub fn from_sample(sample: &Value) -> Self {
        match sample {
            Value::Null => Witness::Infer,
            Value::Bool(_) => Witness::bool(),
            Value::Int(_) => Witness::int(),
            Value::Float(_) => Witness::float(),
            Value::Str(_) => Witness::string(),
            Value::Enum(c) => Witness::enumeration(c.set()),
            Value::Struct(record) => {
                let mut schema = Schema {
                    name: record.type_name().map(str::to_owned),
                    fields: Vec::with_capacity(record.len()),
                };
                for (field, value) in record.fields() {
                    schema = schema.field(field, Witness::from_sample(value));
                }
                Witness::record(schema)
            }
            Value::Seq(items) => Witness::seq_of(Self::element_of(items)),
        }
    }

    /// Element witness for a sample sequence
    pub fn element_of(items: &[Value]) -> Self {
        items.first().map_or(Witness::Infer, Witness::from_sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Record;

    #[test]
    fn test_null_sample_infers() {
        assert_eq!(Witness::from_sample(&Value::Null), Witness::Infer);
        assert_eq!(
            Witness::from_sample(&Value::Seq(Vec::new())),
            Witness::seq_of(Witness::Infer)
        );
        assert_eq!(
            Witness::from_sample(&Value::Seq(vec![Value::Null, Value::Int(1)])),
            Witness::seq_of(Witness::Infer)
        );
    }

    #[test]
    fn test_sample_shapes() {
        let set = ConstantSet::new("TestEnum", ["FOO", "BAR"]);
        let sample = Value::Enum(set.constant("BAR").unwrap());
        assert_eq!(Witness::from_sample(&sample), Witness::enumeration(&set));
        assert_eq!(Witness::from_sample(&Value::Int(5)), Witness::int());

        let record = Record::new("SomeObject").with("foo", 5).with("bar", "x");
        let expected = Witness::record(
            Schema::new("SomeObject")
                .field("bar", Witness::string())
                .field("foo", Witness::int()),
        );
        assert_eq!(Witness::from_sample(&Value::Struct(record)), expected);
    }
}
