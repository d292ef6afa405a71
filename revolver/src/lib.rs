//! # revolver
//!
//! Generic CRUD endpoints for Sea-ORM models on Axum.
//!
//! Derive [`SerializerModel`] on a model, describe the API with an [`ApiResource`]
//! and register it:
//!
//! ```rust,ignore
//! use revolver::{ApiResource, ApiState, Rule};
//!
//! pub struct PostApi;
//!
//! impl ApiResource for PostApi {
//!     type Entity = post::Entity;
//!     type Model = post::Model;
//!     type ActiveModel = post::ActiveModel;
//!     type Column = post::Column;
//!
//!     const ID_COLUMN: post::Column = post::Column::Id;
//!
//!     fn rules() -> Vec<Rule> {
//!         vec![Rule::new("title").required().string().max_length(120)]
//!     }
//! }
//!
//! let app = revolver::router::<PostApi>().with_state(ApiState::new(db));
//! ```

extern crate self as revolver;

pub mod config;
pub mod core;
pub mod errors;
pub mod export;
pub mod filtering;
pub mod models;
pub mod operations;
pub mod ownership;
pub mod payload;
pub mod routes;
pub mod serializer;
pub mod validation;

#[cfg(feature = "derive")]
pub use revolver_derive::SerializerModel;

pub use async_trait::async_trait;
pub use config::{ApiConfig, ExportConfig};
pub use crate::core::{ApiResource, WriteKind};
pub use errors::ApiError;
pub use filtering::Pageable;
pub use models::{ApiResponse, IdParams, ListParams, PageData};
pub use ownership::{CurrentUser, Viewer};
pub use payload::Payload;
pub use routes::{ApiState, register, router};
pub use serializer::{
    BelongsTo, HasMany, RelationKind, RelationLoader, SerializeOptions, SerializerModel,
};
pub use validation::{Rule, RuleType, ValidationError, ValidationErrors};

// Paths used by the derive output
#[doc(hidden)]
pub mod __private {
    pub use sea_orm;
    pub use serde_json;
}
