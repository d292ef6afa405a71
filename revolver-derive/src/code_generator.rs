use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use super::structs::{FieldMeta, ModelMeta};

fn exclude_fillable_fn(fields: &[FieldMeta]) -> Option<TokenStream> {
    let columns: Vec<&str> = fields
        .iter()
        .filter(|field| field.exclude_fillable)
        .map(|field| field.column.as_str())
        .collect();
    if columns.is_empty() {
        return None;
    }
    Some(quote! {
        fn exclude_fillable() -> ::std::vec::Vec<&'static str> {
            let mut keys = ::revolver::serializer::DEFAULT_EXCLUDE_FILLABLE.to_vec();
            keys.extend([#(#columns),*]);
            keys
        }
    })
}

fn exclude_json_fn(fields: &[FieldMeta]) -> Option<TokenStream> {
    let columns: Vec<&str> = fields
        .iter()
        .filter(|field| field.exclude_json)
        .map(|field| field.column.as_str())
        .collect();
    if columns.is_empty() {
        return None;
    }
    Some(quote! {
        fn exclude_json_keys() -> ::std::vec::Vec<&'static str> {
            let mut keys = ::revolver::serializer::DEFAULT_EXCLUDE_JSON.to_vec();
            keys.extend([#(#columns),*]);
            keys
        }
    })
}

fn xls_key_mapping_fn(fields: &[FieldMeta]) -> Option<TokenStream> {
    let (columns, labels): (Vec<&str>, Vec<&str>) = fields
        .iter()
        .filter_map(|field| {
            field
                .label
                .as_deref()
                .map(|label| (field.column.as_str(), label))
        })
        .unzip();
    if columns.is_empty() {
        return None;
    }
    Some(quote! {
        fn xls_key_mapping() -> ::std::collections::HashMap<&'static str, &'static str> {
            let mut labels = ::revolver::serializer::default_xls_labels();
            #( labels.insert(#columns, #labels); )*
            labels
        }
    })
}

fn xls_sort_key_fn(fields: &[FieldMeta]) -> Option<TokenStream> {
    let (columns, keys): (Vec<&str>, Vec<u32>) = fields
        .iter()
        .filter_map(|field| field.sort_key.map(|key| (field.column.as_str(), key)))
        .unzip();
    if columns.is_empty() {
        return None;
    }
    Some(quote! {
        fn xls_sort_key(key: &str) -> u32 {
            match key {
                #( #columns => #keys, )*
                _ => ::revolver::serializer::default_sort_key(key),
            }
        }
    })
}

fn relations_fn(meta: &ModelMeta) -> Option<TokenStream> {
    if meta.belongs_to.is_empty() && meta.has_many.is_empty() {
        return None;
    }
    let foreign = meta.belongs_to.iter().map(|relation| {
        let (name, entity) = (&relation.name, &relation.entity);
        quote! { ::revolver::BelongsTo::<#entity>::named(#name) }
    });
    let related = meta.has_many.iter().map(|relation| {
        let (name, entity) = (&relation.name, &relation.entity);
        quote! { ::revolver::HasMany::<#entity>::named(#name) }
    });
    Some(quote! {
        fn relations() -> ::std::vec::Vec<::std::boxed::Box<dyn ::revolver::RelationLoader<Self>>> {
            ::std::vec![#(#foreign,)* #(#related,)*]
        }
    })
}

fn display_fn(meta: &ModelMeta) -> Option<TokenStream> {
    let field = meta.display.as_ref()?;
    Some(quote! {
        fn display(&self) -> ::std::string::String {
            ::std::string::ToString::to_string(&self.#field)
        }
    })
}

fn extra_json_fn(meta: &ModelMeta) -> Option<TokenStream> {
    let path = meta.extra.as_ref()?;
    Some(quote! {
        async fn extra_json(
            &self,
            db: &::revolver::__private::sea_orm::DatabaseConnection,
        ) -> ::std::result::Result<
            ::revolver::__private::serde_json::Map<::std::string::String, ::revolver::__private::serde_json::Value>,
            ::revolver::__private::sea_orm::DbErr,
        > {
            #path(self, db).await
        }
    })
}

/// The `SerializerModel` impl, overriding only what the attributes change.
pub(crate) fn generate_serializer_impl(
    input: &DeriveInput,
    meta: &ModelMeta,
    fields: &[FieldMeta],
) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let methods = [
        exclude_fillable_fn(fields),
        exclude_json_fn(fields),
        xls_key_mapping_fn(fields),
        xls_sort_key_fn(fields),
        relations_fn(meta),
        display_fn(meta),
        extra_json_fn(meta),
    ]
    .into_iter()
    .flatten();

    quote! {
        #[::revolver::async_trait]
        impl #impl_generics ::revolver::SerializerModel for #name #ty_generics #where_clause {
            #(#methods)*
        }
    }
}
