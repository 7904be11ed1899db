use sqlx::{postgres::PgPoolOptions, PgPool};

#[derive(Clone)]
pub struct DatabaseConnection {
    pub pool: PgPool,
}

/// Serving requests without a database connection is pointless, so any
/// failure here terminates the process before the listener binds.
pub async fn connect(database_url: &str) -> DatabaseConnection {
    match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url)
        .await
    {
        Ok(pool) => DatabaseConnection { pool },
        Err(err) => {
            tracing::error!("Failed to connect to database: {}", err);
            std::process::exit(1);
        }
    }
}

pub async fn migrate(db_conn: DatabaseConnection) {
    if let Err(err) = sqlx::migrate!().run(&db_conn.pool).await {
        tracing::error!("Failed to run database migrations: {}", err);
        std::process::exit(1);
    }
}

pub async fn close(db_conn: DatabaseConnection) {
    db_conn.pool.close().await;
    tracing::debug!("Database connection closed");
}
