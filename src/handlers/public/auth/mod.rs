// handlers/public/auth/mod.rs - token acquisition

pub mod login; // POST /api/v1/login

pub use login::login_post;
