use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Open the PostgreSQL connection pool.
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    info!("Database connection pool opened");

    Ok(pool)
}

/// Round-trip a trivial query to check the pool is usable.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
