//! Row-level scoping by owner.
//!
//! Authentication is the host's concern: a middleware inserts a [`CurrentUser`] into
//! the request extensions and the generated handlers read it through [`Viewer`].
//!
//! ```rust,ignore
//! async fn auth(mut req: Request, next: Next) -> Response {
//!     if let Some(user) = lookup_session(&req).await {
//!         req.extensions_mut().insert(CurrentUser::new(user.id));
//!     }
//!     next.run(req).await
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sea_orm::{ColumnTrait, Condition};
use std::convert::Infallible;

use crate::errors::ApiError;
use crate::serializer::value::{ValueKind, typed_value};

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub is_superuser: bool,
}

impl CurrentUser {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_superuser: false,
        }
    }

    #[must_use]
    pub fn superuser(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_superuser: true,
        }
    }
}

/// The request's [`CurrentUser`], if the auth layer set one. Never rejects.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Rows a viewer may touch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    /// Only rows whose owner column equals this id
    Owner(String),
}

impl Scope {
    /// Decide the scope of a request.
    ///
    /// # Errors
    ///
    /// Returns a 401 when an anonymous caller reaches an owned resource, except for
    /// reads on a public resource.
    pub fn resolve(
        viewer: Option<&CurrentUser>,
        owned: bool,
        public_view: bool,
        access: Access,
    ) -> Result<Self, ApiError> {
        if !owned {
            return Ok(Self::All);
        }
        match viewer {
            Some(user) if user.is_superuser => Ok(Self::All),
            Some(user) => Ok(Self::Owner(user.id.clone())),
            None if public_view && access == Access::Read => Ok(Self::All),
            None => Err(ApiError::unauthorized("login required")),
        }
    }

    /// Condition restricting a query to this scope.
    ///
    /// # Errors
    ///
    /// Returns a 400 when the user id does not fit the owner column type.
    pub fn condition<C: ColumnTrait>(&self, owner: Option<C>) -> Result<Condition, ApiError> {
        match (self, owner) {
            (Self::Owner(id), Some(column)) => {
                let value = typed_value(ValueKind::of_column(&column), id)
                    .map_err(|reason| ApiError::bad_request(format!("invalid owner id: {reason}")))?;
                Ok(Condition::all().add(column.eq(value)))
            }
            _ => Ok(Condition::all()),
        }
    }
}
