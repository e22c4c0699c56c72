use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::{groups, DatabaseError, DatabaseManager};

#[derive(Subcommand)]
pub enum GroupCommands {
    #[command(about = "List all groups")]
    List,

    #[command(about = "Create a group")]
    Create {
        #[arg(help = "Display title")]
        title: String,
        #[arg(help = "Unique slug")]
        slug: String,
        #[arg(long, default_value = "", help = "Group description")]
        description: String,
    },

    #[command(about = "Delete a group; its posts stay, ungrouped")]
    Delete {
        #[arg(help = "Group slug")]
        slug: String,
    },
}

pub async fn handle(cmd: GroupCommands, db: &DatabaseManager, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        GroupCommands::List => {
            let all = groups::list(db.pool()).await?;
            if all.is_empty() {
                return output_empty_collection(&output_format, "groups", "No groups found");
            }
            output_collection(&output_format, "groups", &all, &format!("{:<6} {:<20} {}", "ID", "SLUG", "TITLE"), |g| {
                format!("{:<6} {:<20} {}", g.id, g.slug, g.title)
            })
        }
        GroupCommands::Create { title, slug, description } => {
            let group = match groups::create(db.pool(), &title, &slug, &description).await {
                Err(DatabaseError::UniqueViolation(_)) => anyhow::bail!("Group with slug '{}' already exists", slug),
                other => other?,
            };
            output_success(
                &output_format,
                &format!("Created group '{}'", group.slug),
                Some(json!({ "group": group })),
            )
        }
        GroupCommands::Delete { slug } => {
            groups::delete_by_slug(db.pool(), &slug)
                .await
                .with_context(|| format!("Could not delete group '{}'", slug))?;
            output_success(&output_format, &format!("Deleted group '{}'", slug), None)
        }
    }
}
