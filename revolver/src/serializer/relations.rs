//! Relation loaders used by [`SerializerModel::to_json`](super::SerializerModel::to_json).
//!
//! A model lists its relations once, typically through the derive macro:
//!
//! ```rust,ignore
//! fn relations() -> Vec<Box<dyn RelationLoader<Self>>> {
//!     vec![
//!         BelongsTo::<super::author::Entity>::named("author"),
//!         HasMany::<super::comment::Entity>::named("comments"),
//!     ]
//! }
//! ```
//!
//! Both kinds go through Sea-ORM's `Related` trait, so the entity must implement
//! `Related<Target>` for each listed relation.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Related};
use serde_json::Value;
use std::marker::PhantomData;

use super::{SerializeOptions, SerializerModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Many-to-one: the model holds the foreign key
    Foreign,
    /// One-to-many: other rows point at the model
    Related,
}

#[async_trait]
pub trait RelationLoader<M>: Send + Sync {
    /// Key the relation is serialized under
    fn name(&self) -> &str;

    fn kind(&self) -> RelationKind;

    /// Load and serialize the relation for `model`.
    ///
    /// Foreign relations yield an object or `null`; related ones yield an array.
    async fn load(
        &self,
        model: &M,
        db: &DatabaseConnection,
        options: SerializeOptions,
    ) -> Result<Value, DbErr>;
}

pub struct BelongsTo<R> {
    name: &'static str,
    _target: PhantomData<fn() -> R>,
}

pub struct HasMany<R> {
    name: &'static str,
    _target: PhantomData<fn() -> R>,
}

impl<R> BelongsTo<R>
where
    R: EntityTrait,
    R::Model: SerializerModel,
{
    /// Relation to the parent row referenced by one of the model's foreign keys.
    #[must_use]
    pub fn named<M>(name: &'static str) -> Box<dyn RelationLoader<M>>
    where
        M: SerializerModel,
        M::Entity: Related<R>,
    {
        Box::new(Self {
            name,
            _target: PhantomData,
        })
    }
}

impl<R> HasMany<R>
where
    R: EntityTrait,
    R::Model: SerializerModel,
{
    /// Relation to the rows whose foreign key points at the model.
    #[must_use]
    pub fn named<M>(name: &'static str) -> Box<dyn RelationLoader<M>>
    where
        M: SerializerModel,
        M::Entity: Related<R>,
    {
        Box::new(Self {
            name,
            _target: PhantomData,
        })
    }
}

#[async_trait]
impl<M, R> RelationLoader<M> for BelongsTo<R>
where
    M: SerializerModel,
    M::Entity: Related<R>,
    R: EntityTrait,
    R::Model: SerializerModel,
{
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> RelationKind {
        RelationKind::Foreign
    }

    async fn load(
        &self,
        model: &M,
        db: &DatabaseConnection,
        options: SerializeOptions,
    ) -> Result<Value, DbErr> {
        match model.find_related(R::default()).one(db).await? {
            Some(parent) => Ok(Value::Object(parent.to_json(db, options).await?)),
            None => Ok(Value::Null),
        }
    }
}

#[async_trait]
impl<M, R> RelationLoader<M> for HasMany<R>
where
    M: SerializerModel,
    M::Entity: Related<R>,
    R: EntityTrait,
    R::Model: SerializerModel,
{
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> RelationKind {
        RelationKind::Related
    }

    async fn load(
        &self,
        model: &M,
        db: &DatabaseConnection,
        options: SerializeOptions,
    ) -> Result<Value, DbErr> {
        let children = model.find_related(R::default()).all(db).await?;
        let mut items = Vec::with_capacity(children.len());
        for child in children {
            if options.related_serializer {
                items.push(Value::Object(child.to_json(db, options).await?));
            } else {
                items.push(Value::String(child.display()));
            }
        }
        Ok(Value::Array(items))
    }
}
