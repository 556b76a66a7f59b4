use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

use super::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<String>,
    pub description: String,
}

/// Table name -> columns and description, in declaration order.
///
/// Serialized as a JSON object whose key order is the table order, so the
/// prompt and `/api/schema` list tables the way they were written down.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaDescription {
    tables: Vec<(String, TableSchema)>,
}

impl SchemaDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, columns: &[&str], description: &str) -> Self {
        self.insert(
            name.to_string(),
            TableSchema {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                description: description.to_string(),
            },
        );
        self
    }

    /// Replaces an existing table in place, otherwise appends.
    pub fn insert(&mut self, name: String, table: TableSchema) {
        match self.tables.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = table,
            None => self.tables.push((name, table)),
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableSchema)> {
        self.tables.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Reads a `{"tables": {...}}` document.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        #[derive(Deserialize)]
        struct SchemaDocument {
            tables: SchemaDescription,
        }

        let content = std::fs::read_to_string(path)?;
        let document: SchemaDocument = serde_json::from_str(&content)?;
        Ok(document.tables)
    }

    /// The e-commerce schema the demo datasets are drawn from.
    pub fn builtin() -> Self {
        Self::new()
            .with_table(
                "users",
                &["id", "name", "age", "city", "created_at"],
                "Registered users",
            )
            .with_table(
                "products",
                &["id", "name", "category", "price", "stock"],
                "Product catalog",
            )
            .with_table(
                "orders",
                &["id", "user_id", "order_date", "status", "total_amount", "payment_method"],
                "Customer orders",
            )
            .with_table(
                "order_items",
                &["id", "order_id", "product_id", "quantity", "unit_price"],
                "Line items of each order",
            )
    }
}

impl Serialize for SchemaDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for (name, table) in self.tables() {
            map.serialize_entry(name, table)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SchemaDescription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = SchemaDescription;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of table name to table description")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut schema = SchemaDescription::new();
                while let Some((name, table)) = access.next_entry::<String, TableSchema>()? {
                    schema.insert(name, table);
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}
