use sea_orm::{
    ColumnTrait, Condition,
    sea_query::{Expr, Func, SimpleExpr},
};
use std::collections::{BTreeMap, HashMap};

use crate::errors::ApiError;
use crate::serializer::value::{ValueKind, typed_value};

/// Query keys that steer the request rather than filter rows
pub const RESERVED_PARAMS: &[&str] = &["page", "size", "order_by", "name"];

const LOOKUP_SEPARATOR: &str = "__";

// Basic safety limit
const MAX_FIELD_VALUE_LENGTH: usize = 10_000;

/// Comparison applied by a `column__lookup=value` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Exact,
    IExact,
    Contains,
    IContains,
    StartsWith,
    EndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
    Ne,
    In,
    IsNull,
}

impl Lookup {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "exact" => Self::Exact,
            "iexact" => Self::IExact,
            "contains" => Self::Contains,
            "icontains" => Self::IContains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "ne" => Self::Ne,
            "in" => Self::In,
            "isnull" => Self::IsNull,
            _ => return None,
        })
    }
}

/// Split `title__icontains` into `("title", Some("icontains"))`.
#[must_use]
pub fn split_lookup(key: &str) -> (&str, Option<&str>) {
    match key.split_once(LOOKUP_SEPARATOR) {
        Some((field, lookup)) => (field, Some(lookup)),
        None => (key, None),
    }
}

/// Find a column by its database name.
pub fn find_column<C: ColumnTrait>(name: &str) -> Option<C> {
    C::iter().find(|column| column.as_str() == name)
}

fn upper(column: impl ColumnTrait) -> SimpleExpr {
    SimpleExpr::FunctionCall(Func::upper(Expr::col(column)))
}

fn typed<C: ColumnTrait>(column: &C, field: &str, raw: &str) -> Result<sea_orm::Value, ApiError> {
    typed_value(ValueKind::of_column(column), raw)
        .map_err(|reason| ApiError::bad_request(format!("invalid value for {field}: {reason}")))
}

/// Build the expression for a single filter.
///
/// # Errors
///
/// Returns a 400 when the value does not fit the column type.
pub fn lookup_expr<C: ColumnTrait + Copy>(
    column: C,
    field: &str,
    lookup: Lookup,
    raw: &str,
) -> Result<SimpleExpr, ApiError> {
    Ok(match lookup {
        Lookup::Exact => column.eq(typed(&column, field, raw)?),
        Lookup::IExact => upper(column).eq(raw.to_uppercase()),
        Lookup::Contains => column.contains(raw),
        Lookup::IContains => upper(column).like(format!("%{}%", raw.to_uppercase())),
        Lookup::StartsWith => column.starts_with(raw),
        Lookup::EndsWith => column.ends_with(raw),
        Lookup::Gt => column.gt(typed(&column, field, raw)?),
        Lookup::Gte => column.gte(typed(&column, field, raw)?),
        Lookup::Lt => column.lt(typed(&column, field, raw)?),
        Lookup::Lte => column.lte(typed(&column, field, raw)?),
        Lookup::Ne => column.ne(typed(&column, field, raw)?),
        Lookup::In => {
            let values = raw
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| typed(&column, field, v))
                .collect::<Result<Vec<_>, _>>()?;
            column.is_in(values)
        }
        Lookup::IsNull => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => column.is_null(),
            "false" | "0" => column.is_not_null(),
            _ => {
                return Err(ApiError::bad_request(format!(
                    "invalid value for {field}: isnull expects true or false"
                )));
            }
        },
    })
}

/// Translate query parameters into a condition over the entity's columns.
///
/// Keys are a column name optionally followed by `__lookup`. Reserved keys, keys that
/// name no column and empty values are ignored; values are trimmed.
///
/// # Errors
///
/// Returns a 400 for unknown lookups and for values that do not fit their column.
pub fn apply_filters<C: ColumnTrait + Copy>(
    params: &HashMap<String, String>,
) -> Result<Condition, ApiError> {
    let mut condition = Condition::all();

    // sorted so the generated SQL is stable
    let sorted: BTreeMap<&String, &String> = params.iter().collect();
    for (key, value) in sorted {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            continue;
        }
        let (field, lookup_name) = split_lookup(key);
        let Some(column) = find_column::<C>(field) else {
            tracing::trace!(key = %key, "ignoring parameter that names no column");
            continue;
        };

        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_FIELD_VALUE_LENGTH {
            continue;
        }

        let lookup = match lookup_name {
            None => Lookup::Exact,
            Some(name) => Lookup::parse(name)
                .ok_or_else(|| ApiError::bad_request(format!("unsupported lookup: {key}")))?,
        };

        condition = condition.add(lookup_expr(column, field, lookup, trimmed)?);
    }

    Ok(condition)
}
