use syn::meta::ParseNestedMeta;
use syn::{Attribute, DeriveInput, Field, LitInt, LitStr};

use super::structs::{FieldMeta, ModelMeta, RelationMeta};

const ATTRIBUTE: &str = "revolver";

/// Field name without a raw identifier prefix
pub(crate) fn ident_to_string(ident: &syn::Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map_or(name.clone(), ToString::to_string)
}

fn revolver_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident(ATTRIBUTE))
}

fn parse_str(nested: &ParseNestedMeta) -> syn::Result<LitStr> {
    nested.value()?.parse()
}

/// `belongs_to(author = "super::author::Entity", ...)`
fn parse_relations(nested: &ParseNestedMeta) -> syn::Result<Vec<RelationMeta>> {
    let mut relations = Vec::new();
    nested.parse_nested_meta(|entry| {
        let name = entry
            .path
            .get_ident()
            .map(ident_to_string)
            .ok_or_else(|| entry.error("expected `relation_name = \"path::to::Entity\"`"))?;
        let entity = parse_str(&entry)?.parse::<syn::Path>()?;
        relations.push(RelationMeta { name, entity });
        Ok(())
    })?;
    Ok(relations)
}

/// Parses the struct-level `#[revolver(...)]` attributes.
pub(crate) fn parse_model_meta(input: &DeriveInput) -> syn::Result<ModelMeta> {
    let mut meta = ModelMeta::default();

    for attr in revolver_attrs(&input.attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("belongs_to") {
                meta.belongs_to.extend(parse_relations(&nested)?);
            } else if nested.path.is_ident("has_many") {
                meta.has_many.extend(parse_relations(&nested)?);
            } else if nested.path.is_ident("display") {
                meta.display = Some(parse_str(&nested)?.parse()?);
            } else if nested.path.is_ident("extra") {
                meta.extra = Some(parse_str(&nested)?.parse()?);
            } else {
                return Err(nested.error(
                    "unknown revolver attribute, expected one of: belongs_to, has_many, display, extra",
                ));
            }
            Ok(())
        })?;
    }

    Ok(meta)
}

/// Reads `column_name` from `#[sea_orm(...)]`, skipping every other argument.
fn sea_orm_column_name(field: &Field) -> syn::Result<Option<String>> {
    let mut column = None;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("sea_orm")) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("column_name") {
                column = Some(parse_str(&nested)?.value());
            } else if nested.input.peek(syn::Token![=]) {
                nested.value()?.parse::<syn::Expr>()?;
            } else if nested.input.peek(syn::token::Paren) {
                let content;
                syn::parenthesized!(content in nested.input);
                content.parse::<proc_macro2::TokenStream>()?;
            }
            Ok(())
        })?;
    }
    Ok(column)
}

/// Parses the `#[revolver(...)]` attributes of one model field.
pub(crate) fn parse_field_meta(field: &Field) -> syn::Result<FieldMeta> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "SerializerModel needs named fields"))?;

    let mut meta = FieldMeta {
        column: sea_orm_column_name(field)?.unwrap_or_else(|| ident_to_string(ident)),
        ..FieldMeta::default()
    };

    for attr in revolver_attrs(&field.attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("exclude_json") {
                meta.exclude_json = true;
            } else if nested.path.is_ident("exclude_fillable") {
                meta.exclude_fillable = true;
            } else if nested.path.is_ident("label") {
                meta.label = Some(parse_str(&nested)?.value());
            } else if nested.path.is_ident("sort_key") {
                meta.sort_key = Some(nested.value()?.parse::<LitInt>()?.base10_parse()?);
            } else {
                return Err(nested.error(
                    "unknown revolver field attribute, expected one of: exclude_json, exclude_fillable, label, sort_key",
                ));
            }
            Ok(())
        })?;
    }

    Ok(meta)
}
