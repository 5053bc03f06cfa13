/// Database layer for Taskdeck
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: Embedded migration runner
/// - `seed`: Demo data for the legacy dashboard widgets and a sample workspace
///
/// Models live in the `models` module at the crate root.

pub mod migrations;
pub mod pool;
pub mod seed;
