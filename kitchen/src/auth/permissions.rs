//! Role-based access control.
//!
//! Cooks hold one of two roles: *regular* or *elevated* (`is_superuser`). Elevated cooks may do
//! everything. Regular cooks may:
//!
//! | Resource    | Allowed operations                        |
//! |-------------|-------------------------------------------|
//! | dish types  | `ReadAll`                                 |
//! | dishes      | every operation                           |
//! | cooks       | `ReadOwn`, `UpdateOwn` (the roster, their own details and profile) |
//!
//! Handlers declare what they need with the [`RequiresPermission`] extractor, which
//! authenticates the caller and rejects the request with 403 before the handler body runs:
//!
//! ```ignore
//! async fn create_dish_type(
//!     State(state): State<AppState>,
//!     current_user: RequiresPermission<resource::DishTypes, operation::CreateAll>,
//!     JsonBody(create): JsonBody<DishTypeCreate>,
//! ) -> Result<Json<DishTypeResponse>> { ... }
//! ```
//!
//! Checks that depend on the record being accessed (a cook viewing or editing their own
//! profile) use [`can_read_own_resource`] and [`can_update_own_resource`] inside the handler.

use std::marker::PhantomData;
use std::ops::Deref;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    AppState,
    api::models::{auth::Affordances, cooks::CurrentUser},
    errors::Error,
    types::{CookId, Operation, Permission, Resource},
};

/// Type-level resources for [`RequiresPermission`].
pub mod resource {
    use crate::types::Resource;

    pub trait ResourceType: Send + Sync {
        const RESOURCE: Resource;
    }

    pub struct DishTypes;
    pub struct Dishes;
    pub struct Cooks;

    impl ResourceType for DishTypes {
        const RESOURCE: Resource = Resource::DishTypes;
    }
    impl ResourceType for Dishes {
        const RESOURCE: Resource = Resource::Dishes;
    }
    impl ResourceType for Cooks {
        const RESOURCE: Resource = Resource::Cooks;
    }
}

/// Type-level operations for [`RequiresPermission`].
pub mod operation {
    use crate::types::Operation;

    pub trait OperationType: Send + Sync {
        const OPERATION: Operation;
    }

    pub struct CreateAll;
    pub struct ReadAll;
    pub struct ReadOwn;
    pub struct UpdateAll;
    pub struct DeleteAll;

    impl OperationType for CreateAll {
        const OPERATION: Operation = Operation::CreateAll;
    }
    impl OperationType for ReadAll {
        const OPERATION: Operation = Operation::ReadAll;
    }
    impl OperationType for ReadOwn {
        const OPERATION: Operation = Operation::ReadOwn;
    }
    impl OperationType for UpdateAll {
        const OPERATION: Operation = Operation::UpdateAll;
    }
    impl OperationType for DeleteAll {
        const OPERATION: Operation = Operation::DeleteAll;
    }
}

/// Whether `user` may perform `operation` on `resource`.
pub fn has_permission(user: &CurrentUser, resource: Resource, operation: Operation) -> bool {
    if user.is_elevated() {
        return true;
    }
    matches!(
        (resource, operation),
        (Resource::DishTypes, Operation::ReadAll)
            | (Resource::Dishes, _)
            | (Resource::Cooks, Operation::ReadOwn | Operation::UpdateOwn)
    )
}

/// Whether `user` may read every record of `resource`, not just their own.
pub fn can_read_all_resources(user: &CurrentUser, resource: Resource) -> bool {
    has_permission(user, resource, Operation::ReadAll)
}

/// Whether `user` may read the record owned by `owner_id`.
pub fn can_read_own_resource(user: &CurrentUser, resource: Resource, owner_id: CookId) -> bool {
    user.id == owner_id && has_permission(user, resource, Operation::ReadOwn)
}

/// Whether `user` may update every record of `resource`, not just their own.
pub fn can_update_all_resources(user: &CurrentUser, resource: Resource) -> bool {
    has_permission(user, resource, Operation::UpdateAll)
}

/// Whether `user` may update the record owned by `owner_id`.
pub fn can_update_own_resource(user: &CurrentUser, resource: Resource, owner_id: CookId) -> bool {
    user.id == owner_id && has_permission(user, resource, Operation::UpdateOwn)
}

/// The denial returned when `user` lacks `required`.
pub fn insufficient_permissions(required: Permission, action: Operation, resource: Resource) -> Error {
    Error::InsufficientPermissions {
        required,
        action,
        resource: resource.to_string(),
    }
}

/// What a caller's role lets them do.
pub fn affordances(user: &CurrentUser) -> Affordances {
    Affordances {
        manage_dish_types: has_permission(user, Resource::DishTypes, Operation::CreateAll),
        manage_dishes: has_permission(user, Resource::Dishes, Operation::CreateAll),
        manage_cooks: has_permission(user, Resource::Cooks, Operation::CreateAll),
        view_cook_details: can_read_all_resources(user, Resource::Cooks),
    }
}

/// Extractor that authenticates the caller and requires `O` on `R`.
///
/// Derefs to the [`CurrentUser`].
pub struct RequiresPermission<R, O> {
    user: CurrentUser,
    _marker: PhantomData<fn() -> (R, O)>,
}

impl<R, O> Deref for RequiresPermission<R, O> {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl<R, O> FromRequestParts<AppState> for RequiresPermission<R, O>
where
    R: resource::ResourceType,
    O: operation::OperationType,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !has_permission(&user, R::RESOURCE, O::OPERATION) {
            return Err(insufficient_permissions(
                Permission::Allow(R::RESOURCE, O::OPERATION),
                O::OPERATION,
                R::RESOURCE,
            ));
        }

        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}
