// handlers/protected/mod.rs - endpoints behind jwt_auth_middleware
//
// Every handler receives `Extension<AuthUser>` and checks its permission
// before touching the database.

pub mod categories;
pub mod documents;
pub mod roles;
pub mod tags;
pub mod users;
