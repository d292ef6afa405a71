/// A `belongs_to(...)` or `has_many(...)` entry
pub(super) struct RelationMeta {
    /// Key the relation is serialized under
    pub(super) name: String,
    /// Target entity, e.g. `super::author::Entity`
    pub(super) entity: syn::Path,
}

/// Struct-level `#[revolver(...)]` settings
#[derive(Default)]
pub(super) struct ModelMeta {
    pub(super) belongs_to: Vec<RelationMeta>,
    pub(super) has_many: Vec<RelationMeta>,
    /// Field rendered by `display()`
    pub(super) display: Option<syn::Ident>,
    /// Async fn producing `extra_json`
    pub(super) extra: Option<syn::Path>,
}

/// Field-level `#[revolver(...)]` settings
#[derive(Default)]
pub(super) struct FieldMeta {
    /// Database column name of the field
    pub(super) column: String,
    pub(super) exclude_json: bool,
    pub(super) exclude_fillable: bool,
    pub(super) label: Option<String>,
    pub(super) sort_key: Option<u32>,
}
