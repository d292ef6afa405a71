use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityName, EntityTrait, FromQueryResult, IdenStatic, IntoActiveModel, Iterable, ModelTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::errors::ApiError;
use crate::ownership::CurrentUser;
use crate::serializer::{SerializeOptions, SerializerModel};
use crate::validation::Rule;

/// Whether a payload is about to be inserted or applied to an existing row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
}

/// A model exposed through the generated endpoints.
///
/// Implemented on a marker type so one entity can back several APIs:
///
/// ```rust,ignore
/// pub struct PostApi;
///
/// impl ApiResource for PostApi {
///     type Entity = post::Entity;
///     type Model = post::Model;
///     type ActiveModel = post::ActiveModel;
///     type Column = post::Column;
///
///     const ID_COLUMN: post::Column = post::Column::Id;
///
///     fn rules() -> Vec<Rule> {
///         vec![Rule::new("title").required().string().max_length(120)]
///     }
///
///     fn owner_column() -> Option<post::Column> {
///         Some(post::Column::OwnerId)
///     }
/// }
/// ```
#[async_trait]
pub trait ApiResource: Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model, Column = Self::Column> + Sync;
    type Model: SerializerModel
        + ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Serialize
        + DeserializeOwned
        + Clone
        + Send
        + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;
    type Column: ColumnTrait + Copy + Send + Sync;

    const ID_COLUMN: Self::Column;

    /// Anonymous callers may read an owned resource
    const PUBLIC_VIEW: bool = false;

    /// Path segment and export file prefix. Defaults to the table name.
    #[must_use]
    fn route_name() -> String {
        Self::Entity::default().table_name().to_string()
    }

    /// Rules checked against create and update payloads.
    #[must_use]
    fn rules() -> Vec<Rule> {
        Vec::new()
    }

    /// Column holding the id of the owning user.
    #[must_use]
    fn owner_column() -> Option<Self::Column> {
        None
    }

    /// Ordering when the request gives none.
    #[must_use]
    fn default_order() -> Vec<(Self::Column, Order)> {
        let created_at = <Self::Column as Iterable>::iter().find(|c| c.as_str() == "created_at");
        vec![(created_at.unwrap_or(Self::ID_COLUMN), Order::Desc)]
    }

    #[must_use]
    fn serialize_options() -> SerializeOptions {
        SerializeOptions::default()
    }

    /// Adjust the fillable fields before they are written.
    ///
    /// Runs after rule validation and owner assignment. Keys added here are written even
    /// when they are not fillable.
    ///
    /// # Errors
    ///
    /// Any error aborts the write and is returned to the client.
    fn prepare_payload(
        _fields: &mut Map<String, Value>,
        _viewer: Option<&CurrentUser>,
        _kind: WriteKind,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    /// Base query every read goes through.
    #[must_use]
    fn query() -> Select<Self::Entity> {
        Self::Entity::find()
    }

    async fn get_all(
        db: &DatabaseConnection,
        condition: Condition,
        order: &[(Self::Column, Order)],
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Self::Model>, DbErr> {
        let mut query = Self::query().filter(condition);
        for (column, direction) in order {
            query = query.order_by(*column, direction.clone());
        }
        query.offset(offset).limit(limit).all(db).await
    }

    async fn get_one(
        db: &DatabaseConnection,
        condition: Condition,
    ) -> Result<Option<Self::Model>, DbErr> {
        Self::query().filter(condition).one(db).await
    }

    async fn total_count(db: &DatabaseConnection, condition: Condition) -> Result<u64, DbErr> {
        Self::query().filter(condition).count(db).await
    }
}
