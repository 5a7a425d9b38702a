// handlers/mod.rs - two security tiers
//
// Public (no auth) -> Protected (JWT auth + per-route permission checks)

pub mod public; // /, /health, /api/v1/login
pub mod protected; // everything else under /api/v1
