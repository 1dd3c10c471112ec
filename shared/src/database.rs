use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::Config;
use crate::error::Result;

/// Open the sea-orm pool with the configured size and connect timeout.
pub async fn get_db_connection(config: &Config) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.db_max_connections)
        .connect_timeout(config.db_connect_timeout)
        .acquire_timeout(config.db_connect_timeout)
        .sqlx_logging(false);

    info!(
        backend = backend_name(&config.database_url),
        max_connections = config.db_max_connections,
        "Connecting to database via Sea-ORM"
    );
    let db = Database::connect(options).await?;
    Ok(db)
}

/// Scheme of a database URL, for logs that must not print credentials.
pub fn backend_name(database_url: &str) -> &str {
    database_url.split(':').next().unwrap_or("unknown")
}
