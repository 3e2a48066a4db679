// Database migrations module
// SQLite is the only supported backend.

mod sqlite;
pub use sqlite::run_migrations as run_sqlite_migrations;
pub use sqlite::READINGS_TABLE;
