// handlers/public/mod.rs - endpoints that need no token
//
// Login validates its own input since there is no trusted user context.

pub mod auth;
pub mod health;

pub use auth::login_post;
pub use health::{health, root};
