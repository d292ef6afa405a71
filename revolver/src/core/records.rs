//! Turning submitted fields into models and active models.
//!
//! Fields are overlaid on a JSON image of the model and deserialized with serde, so
//! every column ends up with its Rust type before `ActiveModel::set` sees it. JSON keys
//! are column names, which is what `DeriveEntityModel` produces for unrenamed fields.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::ColumnType;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, IdenStatic, IntoActiveModel,
    Iterable, ModelTrait, PrimaryKeyToColumn, PrimaryKeyTrait,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::traits::{ApiResource, WriteKind};
use crate::errors::ApiError;
use crate::filtering::conditions;
use crate::ownership::CurrentUser;
use crate::serializer::SerializerModel;
use crate::serializer::value::{ValueKind, coerce_json};

pub(crate) const CREATED_AT: &str = "created_at";
pub(crate) const UPDATED_AT: &str = "updated_at";

type PrimaryKeyOf<R> = <<R as ApiResource>::Entity as EntityTrait>::PrimaryKey;

fn primary_key_names<R: ApiResource>() -> Vec<String> {
    <PrimaryKeyOf<R> as Iterable>::iter()
        .map(|pk| pk.into_column().as_str().to_string())
        .collect()
}

fn is_primary_key(primary_keys: &[String], name: &str) -> bool {
    primary_keys.iter().any(|key| key == name)
}

fn find_column<R: ApiResource>(name: &str) -> Option<R::Column> {
    conditions::find_column::<R::Column>(name)
}

/// Current time in the representation the column's Rust type deserializes from.
#[must_use]
pub fn timestamp_json(column_type: &ColumnType, now: DateTime<Utc>) -> Option<Value> {
    match column_type {
        ColumnType::TimestampWithTimeZone => Some(Value::String(now.to_rfc3339())),
        ColumnType::DateTime | ColumnType::Timestamp => Some(Value::String(
            now.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        )),
        ColumnType::Date => Some(Value::String(now.date_naive().to_string())),
        ColumnType::Integer | ColumnType::BigInteger => Some(Value::from(now.timestamp())),
        _ => None,
    }
}

/// Value for a non-nullable column the request left out.
fn zero_value(kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::Integer => Some(Value::from(0)),
        ValueKind::Float => Some(Value::from(0.0)),
        ValueKind::Boolean => Some(Value::Bool(false)),
        ValueKind::Uuid | ValueKind::Json | ValueKind::Text => None,
    }
}

/// Keep the keys a request may write: fillable columns plus the owner column.
///
/// Primary key columns are always dropped on update.
pub(crate) fn writable_fields<R: ApiResource>(
    mut payload: Map<String, Value>,
    kind: WriteKind,
) -> Map<String, Value> {
    payload.remove("id");

    let fillable = R::Model::fillable();
    let owner = R::owner_column().map(|column| column.as_str().to_string());
    let primary_keys = primary_key_names::<R>();

    payload
        .into_iter()
        .filter(|(key, _)| fillable.contains(key) || owner.as_deref() == Some(key.as_str()))
        .filter(|(key, _)| kind == WriteKind::Create || !is_primary_key(&primary_keys, key))
        .collect()
}

/// Apply ownership rules to the writable fields.
///
/// Regular users always own what they create and can never reassign it. Superusers
/// default to themselves and may pick any owner.
pub(crate) fn assign_owner<R: ApiResource>(
    fields: &mut Map<String, Value>,
    viewer: Option<&CurrentUser>,
    kind: WriteKind,
) {
    let (Some(column), Some(user)) = (R::owner_column(), viewer) else {
        return;
    };
    let key = column.as_str().to_string();

    match kind {
        WriteKind::Create => {
            if !user.is_superuser || !fields.contains_key(&key) {
                fields.insert(key, Value::String(user.id.clone()));
            }
        }
        WriteKind::Update => {
            if !user.is_superuser {
                fields.remove(&key);
            }
        }
    }
}

/// Coerce each field to its column type. Keys naming no column are dropped.
///
/// # Errors
///
/// Returns a 400 naming the first field that does not fit its column.
pub(crate) fn coerce_fields<R: ApiResource>(
    fields: Map<String, Value>,
) -> Result<Map<String, Value>, ApiError> {
    let mut coerced = Map::with_capacity(fields.len());
    for (key, value) in fields {
        let Some(column) = find_column::<R>(&key) else {
            tracing::debug!(key = %key, "dropping field that names no column");
            continue;
        };
        let value = coerce_json(
            ValueKind::of_column(&column),
            column.def().is_null(),
            value,
        )
        .map_err(|reason| ApiError::bad_request(format!("invalid value for {key}: {reason}")))?;
        coerced.insert(key, value);
    }
    Ok(coerced)
}

fn deserialize_model<R: ApiResource>(image: Map<String, Value>) -> Result<R::Model, ApiError> {
    serde_json::from_value(Value::Object(image))
        .map_err(|err| ApiError::bad_request(format!("invalid payload: {err}")))
}

/// Build a new model from coerced fields.
///
/// Generated uuid keys, auto-increment placeholders and timestamps are filled in;
/// other missing columns become `null` when nullable or a zero value for numbers and
/// booleans.
///
/// # Errors
///
/// Returns a 400 when a required column is still missing.
pub(crate) fn new_model<R: ApiResource>(
    mut fields: Map<String, Value>,
    now: DateTime<Utc>,
) -> Result<R::Model, ApiError> {
    let primary_keys = primary_key_names::<R>();
    let auto_increment = <PrimaryKeyOf<R> as PrimaryKeyTrait>::auto_increment();

    let mut image = Map::new();
    for column in <R::Column as Iterable>::iter() {
        let name = column.as_str();
        let definition = column.def();
        let kind = ValueKind::of_column(&column);

        let value = if let Some(value) = fields.remove(name) {
            Some(value)
        } else if is_primary_key(&primary_keys, name) {
            match kind {
                ValueKind::Uuid => Some(Value::String(Uuid::new_v4().to_string())),
                ValueKind::Integer if auto_increment => Some(Value::from(0)),
                _ => None,
            }
        } else if name == CREATED_AT || name == UPDATED_AT {
            timestamp_json(definition.get_column_type(), now)
        } else if definition.is_null() {
            Some(Value::Null)
        } else {
            zero_value(kind)
        };

        if let Some(value) = value {
            image.insert(name.to_string(), value);
        }
    }

    deserialize_model::<R>(image)
}

/// Active model that inserts every column except an auto-increment key.
pub(crate) fn insert_model<R: ApiResource>(model: &R::Model) -> R::ActiveModel {
    let auto_increment = <PrimaryKeyOf<R> as PrimaryKeyTrait>::auto_increment();
    let primary_keys = primary_key_names::<R>();

    let mut active = <R::ActiveModel as ActiveModelBehavior>::new();
    for column in <R::Column as Iterable>::iter() {
        if auto_increment && is_primary_key(&primary_keys, column.as_str()) {
            continue;
        }
        active.set(column, model.get(column));
    }
    active
}

/// Apply coerced fields to an existing model, refreshing `updated_at`.
///
/// Only the touched columns are marked as changed.
///
/// # Errors
///
/// Returns a 400 when the merged image no longer deserializes.
pub(crate) fn update_model<R: ApiResource>(
    existing: &R::Model,
    mut fields: Map<String, Value>,
    now: DateTime<Utc>,
) -> Result<R::ActiveModel, ApiError> {
    if let Some(column) = find_column::<R>(UPDATED_AT)
        && let Some(stamp) = timestamp_json(column.def().get_column_type(), now)
    {
        fields.insert(UPDATED_AT.to_string(), stamp);
    }

    let Value::Object(mut image) = serde_json::to_value(existing)
        .map_err(|err| ApiError::internal("failed to read record", Some(err.to_string())))?
    else {
        return Err(ApiError::internal(
            "failed to read record",
            Some("model did not serialize to an object".to_string()),
        ));
    };
    for (key, value) in &fields {
        image.insert(key.clone(), value.clone());
    }
    let updated = deserialize_model::<R>(image)?;

    let mut active: R::ActiveModel = existing.clone().into_active_model();
    for column in <R::Column as Iterable>::iter() {
        if fields.contains_key(column.as_str()) {
            active.set(column, updated.get(column));
        }
    }
    Ok(active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_formats() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();

        assert_eq!(
            timestamp_json(&ColumnType::TimestampWithTimeZone, now),
            Some(Value::from("2024-03-09T14:05:00+00:00"))
        );
        assert_eq!(
            timestamp_json(&ColumnType::DateTime, now),
            Some(Value::from("2024-03-09T14:05:00"))
        );
        assert_eq!(
            timestamp_json(&ColumnType::Date, now),
            Some(Value::from("2024-03-09"))
        );
        assert_eq!(
            timestamp_json(&ColumnType::BigInteger, now),
            Some(Value::from(now.timestamp()))
        );
        assert_eq!(timestamp_json(&ColumnType::Boolean, now), None);
    }

    #[test]
    fn test_primary_key_lookup() {
        let keys = vec!["id".to_string(), "tenant_id".to_string()];
        assert!(is_primary_key(&keys, "tenant_id"));
        assert!(!is_primary_key(&keys, "title"));
        assert!(!is_primary_key(&[], "id"));
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(zero_value(ValueKind::Integer), Some(Value::from(0)));
        assert_eq!(zero_value(ValueKind::Boolean), Some(Value::Bool(false)));
        assert_eq!(zero_value(ValueKind::Text), None);
    }
}
