// handlers/public - no authentication required
//
// Read-only endpoints: service info, health, migration progress and the
// migrated content itself.

pub mod content;
pub mod migration;
pub mod service;

pub use content::{compatibility_list, life_path_get, life_paths_list, zodiac_get, zodiacs_list};
pub use migration::migration_status;
pub use service::{health, root};
