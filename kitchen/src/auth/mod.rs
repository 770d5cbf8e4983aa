//! Authentication and authorization.
//!
//! # Authentication
//!
//! Two methods, tried in order on every request:
//!
//! 1. **Session cookie**: `POST /authentication/login` checks the username and password and
//!    sets an HttpOnly cookie holding a signed JWT. The token only names the cook; the cook is
//!    reloaded from the database on each request, so deleting a cook or changing their role
//!    takes effect immediately.
//! 2. **Proxy header**: when enabled, a trusted reverse proxy names the cook by username in a
//!    configured header (`x-kitchen-user` by default). Unknown usernames are not created.
//!
//! # Authorization
//!
//! See [`permissions`] for the role matrix and the [`RequiresPermission`] extractor.
//!
//! ```ignore
//! use kitchen::auth::permissions::{RequiresPermission, operation, resource};
//!
//! async fn delete_dish_type(
//!     current_user: RequiresPermission<resource::DishTypes, operation::DeleteAll>,
//! ) -> Result<StatusCode> {
//!     tracing::info!("{} is deleting a dish type", current_user.username);
//!     ...
//! }
//! ```
//!
//! [`RequiresPermission`]: permissions::RequiresPermission

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
