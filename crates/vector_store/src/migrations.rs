use anyhow::{Context, Result};
use tokio_postgres::NoTls;
use tracing::info;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("./migrations");
}

pub async fn run_migrations(database_url: &str) -> Result<()> {
    info!("Running vector store migrations...");

    let (mut client, connection) = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        tokio_postgres::connect(database_url, NoTls),
    )
    .await
    .context("Database connection timed out")?
    .context("Failed to connect to database")?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Migration connection error: {}", e);
        }
    });

    let report = embedded::migrations::runner()
        .run_async(&mut client)
        .await
        .context("Failed to run migrations")?;

    for migration in report.applied_migrations() {
        info!("Applied migration version {}", migration.version());
    }

    Ok(())
}
