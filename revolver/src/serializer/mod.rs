//! # Model Serialization
//!
//! [`SerializerModel`] turns any Sea-ORM `Model` into a JSON object by walking the
//! entity's columns (`Column::iter()` + `ModelTrait::get`) instead of relying on
//! `serde::Serialize`. That keeps exclusion lists, relation loading and extra keys
//! under the API's control and lets the spreadsheet export reuse the same rows.
//!
//! Most models only need the derive:
//!
//! ```rust,ignore
//! #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, SerializerModel)]
//! #[sea_orm(table_name = "posts")]
//! #[revolver(belongs_to(author = "super::author::Entity"), display = "title")]
//! pub struct Model {
//!     #[sea_orm(primary_key, auto_increment = false)]
//!     pub id: Uuid,
//!     #[revolver(label = "Title")]
//!     pub title: String,
//!     pub author_id: i32,
//! }
//! ```

pub mod relations;
pub mod value;

use async_trait::async_trait;
use sea_orm::{
    DatabaseConnection, DbErr, EntityName, EntityTrait, IdenStatic, Iterable, ModelTrait,
    PrimaryKeyToColumn,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub use relations::{BelongsTo, HasMany, RelationKind, RelationLoader};
pub use value::convert;

/// Columns never filled from request payloads
pub const DEFAULT_EXCLUDE_FILLABLE: &[&str] = &["id", "created_at", "updated_at", "is_deleted"];

/// Columns never written to JSON
pub const DEFAULT_EXCLUDE_JSON: &[&str] = &["is_deleted", "password"];

/// Sort key for columns without an explicit position
pub const DEFAULT_SORT_KEY: u32 = 999;

/// Spreadsheet header labels for the bookkeeping columns.
#[must_use]
pub fn default_xls_labels() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("id", "ID"),
        ("created_at", "Created At"),
        ("updated_at", "Updated At"),
        ("is_deleted", "Deleted"),
    ])
}

/// Spreadsheet column position for the bookkeeping columns.
#[must_use]
pub fn default_sort_key(key: &str) -> u32 {
    match key {
        "id" => 0,
        "created_at" => 1,
        "updated_at" => 2,
        "is_deleted" => 3,
        _ => DEFAULT_SORT_KEY,
    }
}

/// Controls how far [`SerializerModel::to_json`] follows relations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Embed many-to-one parents
    pub with_foreign: bool,
    /// Embed one-to-many children under `<name>` and `<name>_count`
    pub with_related: bool,
    /// Children as full objects instead of their `display()` string
    pub related_serializer: bool,
    /// `extra_json` overwrites serialized keys
    pub merge_force: bool,
    pub depth: u8,
    pub max_depth: u8,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            with_foreign: true,
            with_related: true,
            related_serializer: false,
            merge_force: false,
            depth: 0,
            max_depth: 2,
        }
    }
}

impl SerializeOptions {
    /// Only the model's own columns.
    #[must_use]
    pub fn flat() -> Self {
        Self {
            with_foreign: false,
            with_related: false,
            related_serializer: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Options for a parent reached through a foreign key.
    #[must_use]
    pub fn foreign_child(self) -> Self {
        Self {
            with_foreign: true,
            with_related: true,
            related_serializer: false,
            depth: self.depth + 1,
            ..self
        }
    }

    /// Options for an item of a one-to-many list.
    #[must_use]
    pub fn related_child(self) -> Self {
        Self {
            with_foreign: false,
            with_related: false,
            depth: self.depth + 1,
            ..self
        }
    }
}

/// Reflection-driven JSON conversion for Sea-ORM models.
///
/// Every method has a default; override (or use the derive's attributes) to change
/// which columns are exposed, how they are labelled in exports and which relations
/// are embedded.
#[async_trait]
pub trait SerializerModel: ModelTrait + Send + Sync + Sized {
    /// Column names that may never be set from a request.
    fn exclude_fillable() -> Vec<&'static str> {
        DEFAULT_EXCLUDE_FILLABLE.to_vec()
    }

    /// Column names a create or update request may set.
    fn fillable() -> Vec<String> {
        let excluded = Self::exclude_fillable();
        <<Self::Entity as EntityTrait>::Column as Iterable>::iter()
            .map(|column| column.as_str().to_string())
            .filter(|name| !excluded.iter().any(|e| *e == name.as_str()))
            .collect()
    }

    /// Column names left out of JSON output.
    fn exclude_json_keys() -> Vec<&'static str> {
        DEFAULT_EXCLUDE_JSON.to_vec()
    }

    fn xls_key_mapping() -> HashMap<&'static str, &'static str> {
        default_xls_labels()
    }

    /// Header label for a key, falling back to the key itself.
    fn xls_label(key: &str) -> String {
        Self::xls_key_mapping()
            .get(key)
            .map_or_else(|| key.to_string(), ToString::to_string)
    }

    fn xls_sort_key(key: &str) -> u32 {
        default_sort_key(key)
    }

    fn relations() -> Vec<Box<dyn RelationLoader<Self>>> {
        Vec::new()
    }

    /// Computed keys merged into `to_json` output.
    async fn extra_json(&self, _db: &DatabaseConnection) -> Result<Map<String, Value>, DbErr> {
        Ok(Map::new())
    }

    /// Short label used when a one-to-many list is not fully serialized.
    fn display(&self) -> String {
        let key = <<Self::Entity as EntityTrait>::PrimaryKey as Iterable>::iter()
            .map(|pk| match convert(self.get(pk.into_column())) {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} object ({key})",
            <Self::Entity as Default>::default().table_name()
        )
    }

    /// The model's own columns, minus [`exclude_json_keys`](Self::exclude_json_keys).
    fn field_map(&self) -> Map<String, Value> {
        let excluded = Self::exclude_json_keys();
        <<Self::Entity as EntityTrait>::Column as Iterable>::iter()
            .filter(|column| !excluded.iter().any(|e| *e == column.as_str()))
            .map(|column| (column.as_str().to_string(), convert(self.get(column))))
            .collect()
    }

    /// Serialize the model, its relations and its extra keys.
    async fn to_json(
        &self,
        db: &DatabaseConnection,
        options: SerializeOptions,
    ) -> Result<Map<String, Value>, DbErr> {
        let mut result = self.field_map();

        if options.depth < options.max_depth {
            for relation in Self::relations() {
                let name = relation.name().to_string();
                match relation.kind() {
                    RelationKind::Foreign if options.with_foreign => {
                        let parent = relation.load(self, db, options.foreign_child()).await?;
                        result.insert(name, parent);
                    }
                    RelationKind::Related if options.with_related => {
                        let items = relation.load(self, db, options.related_child()).await?;
                        let count = items.as_array().map_or(0, Vec::len);
                        result.insert(format!("{name}_count"), Value::from(count));
                        result.insert(name, items);
                    }
                    _ => {}
                }
            }
        }

        for (key, value) in self.extra_json(db).await? {
            if options.merge_force || result.get(&key).is_none_or(Value::is_null) {
                result.insert(key, value);
            } else {
                tracing::warn!(key = %key, "extra_json key already serialized, keeping column value");
            }
        }

        Ok(result)
    }
}
