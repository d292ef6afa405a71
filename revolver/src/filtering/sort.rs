use sea_orm::{ColumnTrait, sea_query::Order};

use super::conditions::find_column;

/// Convert a direction suffix to an `Order`.
fn parse_order(direction: &str) -> Option<Order> {
    match direction.to_ascii_lowercase().as_str() {
        "asc" => Some(Order::Asc),
        "desc" => Some(Order::Desc),
        _ => None,
    }
}

/// Resolve one `order_by` token.
///
/// Accepts `column`, `-column`, `column_asc` and `column_desc`. A token whose
/// suffix does not resolve is retried as a plain column name.
fn parse_token<C: ColumnTrait>(token: &str) -> Option<(C, Order)> {
    if let Some(name) = token.strip_prefix('-') {
        return find_column::<C>(name).map(|column| (column, Order::Desc));
    }

    if let Some((name, direction)) = token.rsplit_once('_')
        && let Some(order) = parse_order(direction)
        && let Some(column) = find_column::<C>(name)
    {
        return Some((column, order));
    }

    find_column::<C>(token).map(|column| (column, Order::Asc))
}

/// Parse a comma separated `order_by` value into ordering terms.
///
/// Terms are applied in the order given. Tokens naming no column are dropped.
#[must_use]
pub fn parse_order_by<C: ColumnTrait>(order_by: Option<&str>) -> Vec<(C, Order)> {
    let Some(raw) = order_by else {
        return Vec::new();
    };

    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let parsed = parse_token::<C>(token);
            if parsed.is_none() {
                tracing::debug!(token = %token, "ignoring order_by term that names no column");
            }
            parsed
        })
        .collect()
}
