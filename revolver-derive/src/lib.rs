mod attribute_parser;
mod code_generator;
mod structs;

use proc_macro::TokenStream;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derives `revolver::SerializerModel` for a Sea-ORM `Model`.
///
/// Struct attributes:
///
/// - `#[revolver(belongs_to(author = "super::author::Entity"))]` embeds the parent row
/// - `#[revolver(has_many(comments = "super::comment::Entity"))]` embeds child rows and
///   a `comments_count`
/// - `#[revolver(display = "title")]` labels the row in parent listings
/// - `#[revolver(extra = "path::to::async_fn")]` merges computed keys into the JSON
///
/// Field attributes:
///
/// - `#[revolver(exclude_json)]` never serialize the column
/// - `#[revolver(exclude_fillable)]` never accept the column from a request
/// - `#[revolver(label = "Title")]` export header
/// - `#[revolver(sort_key = 3)]` export column position
///
/// Every listed value extends the trait defaults.
#[proc_macro_derive(SerializerModel, attributes(revolver))]
pub fn serializer_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "SerializerModel can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "SerializerModel needs a struct with named fields",
        ));
    };

    let meta = attribute_parser::parse_model_meta(input)?;
    let fields = named
        .named
        .iter()
        .map(attribute_parser::parse_field_meta)
        .collect::<syn::Result<Vec<_>>>()?;

    if let Some(display) = &meta.display
        && !named
            .named
            .iter()
            .any(|field| field.ident.as_ref() == Some(display))
    {
        return Err(syn::Error::new_spanned(
            display,
            format!("display field `{display}` does not exist on {}", input.ident),
        ));
    }

    Ok(code_generator::generate_serializer_impl(input, &meta, &fields))
}
