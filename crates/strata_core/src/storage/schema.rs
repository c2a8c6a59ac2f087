//! # Component Schemas
//!
//! Declares the shape of a store: scalar fields, fixed-length array fields
//! and nested shapes. An empty shape declares a tag.
//!
//! Schemas can be built in code or read from TOML:
//!
//! ```toml
//! inventory = ["ui16", 8]
//!
//! [position]
//! x = "f32"
//! y = "f32"
//! ```
//!
//! TOML tables are unordered, so shapes read from TOML list their fields
//! sorted by key.

use crate::error::{EcsError, EcsResult};

use super::types::FieldType;

/// Shape of a component's data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Schema {
    /// One value of the given type per entity.
    Scalar(FieldType),
    /// A fixed-length array of the given type per entity.
    Array(FieldType, usize),
    /// Named sub-schemas, in declaration order.
    Shape(Vec<(String, Schema)>),
}

impl Schema {
    /// The empty shape, which declares a tag component.
    #[must_use]
    pub const fn tag() -> Self {
        Self::Shape(Vec::new())
    }

    /// A scalar field.
    #[must_use]
    pub const fn scalar(ty: FieldType) -> Self {
        Self::Scalar(ty)
    }

    /// A fixed-length array field.
    #[must_use]
    pub const fn array(ty: FieldType, len: usize) -> Self {
        Self::Array(ty, len)
    }

    /// A shape built from `(name, schema)` pairs.
    pub fn shape<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Schema)>,
        S: Into<String>,
    {
        Self::Shape(
            fields
                .into_iter()
                .map(|(name, schema)| (name.into(), schema))
                .collect(),
        )
    }

    /// `{ x, y, z }` of one scalar type.
    #[must_use]
    pub fn vector3(ty: FieldType) -> Self {
        Self::shape([
            ("x", Self::Scalar(ty)),
            ("y", Self::Scalar(ty)),
            ("z", Self::Scalar(ty)),
        ])
    }

    /// Returns `true` for the empty shape.
    #[must_use]
    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Shape(fields) if fields.is_empty())
    }

    /// Parses a schema from a TOML document.
    ///
    /// Strings name scalar types, two-element arrays declare
    /// `[type, length]` array fields and tables nest.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML, unknown type names, missing or
    /// non-positive array lengths and values of any other kind.
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let table: toml::Table = text.parse()?;
        from_table("", &table)
    }

    /// Checks every array declaration in the schema.
    pub(crate) fn validate(&self) -> EcsResult<()> {
        validate_at("", self)
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn validate_at(path: &str, schema: &Schema) -> EcsResult<()> {
    match schema {
        Schema::Scalar(_) => Ok(()),
        Schema::Array(_, len) => {
            if *len == 0 {
                return Err(EcsError::MissingArrayLength {
                    field: path.to_owned(),
                });
            }
            Ok(())
        }
        Schema::Shape(fields) => fields
            .iter()
            .try_for_each(|(name, child)| validate_at(&join(path, name), child)),
    }
}

fn from_table(path: &str, table: &toml::Table) -> EcsResult<Schema> {
    let fields = table
        .iter()
        .map(|(name, value)| {
            let field = join(path, name);
            from_value(&field, value).map(|schema| (name.clone(), schema))
        })
        .collect::<EcsResult<Vec<_>>>()?;
    Ok(Schema::Shape(fields))
}

fn from_value(path: &str, value: &toml::Value) -> EcsResult<Schema> {
    match value {
        toml::Value::String(name) => parse_type(path, name).map(Schema::Scalar),
        toml::Value::Array(items) => {
            let Some(toml::Value::String(name)) = items.first() else {
                return Err(EcsError::MalformedSchema {
                    field: path.to_owned(),
                    reason: "array declarations start with an element type name".into(),
                });
            };
            let ty = parse_type(path, name)?;
            let len = match items.get(1) {
                Some(toml::Value::Integer(len)) if *len > 0 => usize::try_from(*len).ok(),
                _ => None,
            };
            let Some(len) = len else {
                return Err(EcsError::MissingArrayLength {
                    field: path.to_owned(),
                });
            };
            if items.len() > 2 {
                return Err(EcsError::MalformedSchema {
                    field: path.to_owned(),
                    reason: format!("expected [type, length], got {} items", items.len()),
                });
            }
            Ok(Schema::Array(ty, len))
        }
        toml::Value::Table(table) => from_table(path, table),
        other => Err(EcsError::MalformedSchema {
            field: path.to_owned(),
            reason: format!("unexpected {}", other.type_str()),
        }),
    }
}

fn parse_type(path: &str, name: &str) -> EcsResult<FieldType> {
    name.parse().map_err(|()| EcsError::UnknownFieldType {
        field: path.to_owned(),
        type_name: name.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let schema = Schema::from_toml_str(
            r#"
            health = "i32"
            slots = ["ui8", 4]

            [position]
            x = "f32"
            y = "f32"
            "#,
        )
        .unwrap();

        let Schema::Shape(fields) = schema else {
            panic!("expected a shape");
        };
        assert_eq!(fields.len(), 3);
        assert!(fields.contains(&("health".into(), Schema::Scalar(FieldType::I32))));
        assert!(fields.contains(&("slots".into(), Schema::Array(FieldType::U8, 4))));
    }

    #[test]
    fn test_empty_is_tag() {
        assert!(Schema::from_toml_str("").unwrap().is_tag());
        assert!(Schema::tag().is_tag());
        assert!(!Schema::vector3(FieldType::F32).is_tag());
    }

    #[test]
    fn test_rejects_unknown_type() {
        let err = Schema::from_toml_str("x = \"f16\"").unwrap_err();
        assert!(matches!(err, EcsError::UnknownFieldType { ref type_name, .. } if type_name == "f16"));
    }

    #[test]
    fn test_rejects_missing_length() {
        for text in ["v = [\"f32\"]", "v = [\"f32\", 0]", "v = [\"f32\", \"4\"]"] {
            assert!(matches!(
                Schema::from_toml_str(text),
                Err(EcsError::MissingArrayLength { .. })
            ));
        }
        assert!(matches!(
            Schema::shape([("v", Schema::array(FieldType::F32, 0))]).validate(),
            Err(EcsError::MissingArrayLength { ref field }) if field == "v"
        ));
    }

    #[test]
    fn test_rejects_other_values() {
        assert!(matches!(
            Schema::from_toml_str("x = 3"),
            Err(EcsError::MalformedSchema { .. })
        ));
    }
}
