// handlers/protected - admin gate required
//
// Every route here is wrapped with `middleware::require_admin` in
// server.rs. Handlers can rely on an `AuthUser` request extension.

pub mod content;
pub mod migration;

pub use content::{life_path_delete, life_path_put, zodiac_delete, zodiac_put};
pub use migration::migration_trigger;
