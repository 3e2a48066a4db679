use rusqlite::Connection;
use tracing::info;

/// Name of the readings table
pub const READINGS_TABLE: &str = "bp_readings";

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_readings_table(conn)?;
    create_readings_index(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the blood pressure readings table.
///
/// `createdAt` holds epoch milliseconds and defaults to the insert time.
fn create_readings_table(conn: &Connection) -> Result<(), String> {
    info!("Creating {} table if not exists", READINGS_TABLE);

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bp_readings (
            readingId INTEGER PRIMARY KEY AUTOINCREMENT,
            systolic INTEGER NOT NULL,
            diastolic INTEGER NOT NULL,
            createdAt INTEGER NOT NULL
                DEFAULT (CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER))
        )",
        [],
    ).map_err(|e| format!("Failed to create {}: {}", READINGS_TABLE, e))?;

    Ok(())
}

/// Create index on createdAt for range filtering
fn create_readings_index(conn: &Connection) -> Result<(), String> {
    info!("Creating index on createdAt");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bp_readings_created_at
        ON bp_readings (createdAt)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}
