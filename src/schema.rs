//! Field type resolution supplied by the embedding application.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::FormulaType;

/// Outcome of resolving a field reference.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldResolution {
    /// The field exists. For lookups this is the type of the target field
    /// in the linked table, before it is wrapped as a lookup.
    Found(FormulaType),
    NotFound,
    /// A lookup went through a field that is not a link field.
    NotALink,
}

/// Resolves field names to types for the type checker.
pub trait FieldSchema {
    fn resolve(&self, field_name: &str, via_field_name: Option<&str>) -> FieldResolution;
}

/// In-memory schema.
///
/// `links` maps each link field of the table to the fields of the table it
/// links to. A link field should also appear in `fields` (usually typed as an
/// array of links).
///
/// ```
/// use formula_lang::{schema::{FieldResolution, FieldSchema, StaticSchema}, types::FormulaType};
///
/// let schema: StaticSchema = serde_json::from_str(r#"{
///     "fields": { "name": { "type": "text" } },
///     "links": { "orders": { "total": { "type": "number", "decimal_places": 2 } } }
/// }"#).unwrap();
///
/// assert_eq!(schema.resolve("name", None), FieldResolution::Found(FormulaType::Text));
/// assert_eq!(
///     schema.resolve("total", Some("orders")),
///     FieldResolution::Found(FormulaType::number(2))
/// );
/// assert_eq!(schema.resolve("total", Some("name")), FieldResolution::NotALink);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticSchema {
    pub fields: HashMap<String, FormulaType>,
    pub links: HashMap<String, HashMap<String, FormulaType>>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: FormulaType) -> Self {
        self.fields.insert(name.into(), ty);
        self
    }

    /// Adds a link field together with the field types of the linked table.
    pub fn with_link<I, S>(mut self, name: impl Into<String>, target_fields: I) -> Self
    where
        I: IntoIterator<Item = (S, FormulaType)>,
        S: Into<String>,
    {
        let name = name.into();
        self.fields
            .entry(name.clone())
            .or_insert_with(|| FormulaType::array(FormulaType::Link));
        self.links.insert(
            name,
            target_fields
                .into_iter()
                .map(|(field, ty)| (field.into(), ty))
                .collect(),
        );
        self
    }
}

impl FieldSchema for StaticSchema {
    fn resolve(&self, field_name: &str, via_field_name: Option<&str>) -> FieldResolution {
        match via_field_name {
            None => match self.fields.get(field_name) {
                Some(ty) => FieldResolution::Found(ty.clone()),
                None => FieldResolution::NotFound,
            },
            Some(via) => match self.links.get(via) {
                Some(target) => match target.get(field_name) {
                    Some(ty) => FieldResolution::Found(ty.clone()),
                    None => FieldResolution::NotFound,
                },
                None if self.fields.contains_key(via) => FieldResolution::NotALink,
                None => FieldResolution::NotFound,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_link_registers_the_link_field() {
        let schema = StaticSchema::new().with_link("orders", [("total", FormulaType::number(2))]);
        assert_eq!(
            schema.resolve("orders", None),
            FieldResolution::Found(FormulaType::array(FormulaType::Link))
        );
        assert_eq!(schema.resolve("missing", Some("orders")), FieldResolution::NotFound);
        assert_eq!(schema.resolve("total", Some("nowhere")), FieldResolution::NotFound);
    }
}
