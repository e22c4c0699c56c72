use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

/// Migrations already ran when the CLI connected; this reports the result.
pub async fn handle(db: &DatabaseManager, output_format: OutputFormat) -> anyhow::Result<()> {
    db.health_check().await?;
    output_success(&output_format, "Database schema is up to date", None)
}
