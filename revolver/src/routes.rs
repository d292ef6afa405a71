//! Route registration.
//!
//! ```rust,ignore
//! let app = Router::new();
//! let app = revolver::register::<PostApi, _>(app, "/api/posts");
//! let app = app.merge(revolver::router::<CommentApi>());
//! let app = app.with_state(ApiState::new(db));
//! ```
//!
//! Each resource gets six endpoints under its base path:
//!
//! | Method   | Path            | Handler |
//! |----------|-----------------|---------|
//! | `GET`    | `base`          | list    |
//! | `POST`   | `base.create`   | create  |
//! | `GET`    | `base.detail`   | detail  |
//! | `DELETE` | `base.delete`   | delete  |
//! | `PUT`    | `base.update`   | update  |
//! | `GET`    | `base.export`   | export  |

use axum::{
    Router,
    extract::FromRef,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::ApiConfig;
use crate::core::ApiResource;
use crate::operations;

/// State the generated handlers extract
#[derive(Debug, Clone)]
pub struct ApiState {
    pub db: DatabaseConnection,
    pub config: Arc<ApiConfig>,
}

impl ApiState {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            config: Arc::new(ApiConfig::default()),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = Arc::new(config);
        self
    }
}

/// Mount the six endpoints of `R` under `base`.
///
/// Works with any router state that can hand out an [`ApiState`].
#[must_use]
pub fn register<R, S>(router: Router<S>, base: &str) -> Router<S>
where
    R: ApiResource,
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    let base = match base.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    tracing::debug!(resource = %R::route_name(), base = %base, "registering routes");

    router
        .route(base, get(operations::list::<R>))
        .route(&format!("{base}.create"), post(operations::create::<R>))
        .route(&format!("{base}.detail"), get(operations::detail::<R>))
        .route(&format!("{base}.delete"), delete(operations::delete::<R>))
        .route(&format!("{base}.update"), put(operations::update::<R>))
        .route(&format!("{base}.export"), get(operations::export::<R>))
}

/// Router with the endpoints of `R` under `/<route_name>`.
#[must_use]
pub fn router<R: ApiResource>() -> Router<ApiState> {
    register::<R, ApiState>(Router::new(), &format!("/{}", R::route_name()))
}
