use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{users, DatabaseError, DatabaseManager};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List all users")]
    List,

    #[command(about = "Create a user account")]
    Create {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Password")]
        password: String,
    },

    #[command(about = "Delete a user with their posts, comments and follows")]
    Delete {
        #[arg(help = "Username")]
        username: String,
    },
}

pub async fn handle(
    cmd: UserCommands,
    db: &DatabaseManager,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        UserCommands::List => {
            let all = users::list(db.pool()).await?;
            if all.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }
            output_collection(&output_format, "users", &all, &format!("{:<6} {:<24} {}", "ID", "USERNAME", "JOINED"), |u| {
                format!("{:<6} {:<24} {}", u.id, u.username, u.date_joined.format("%Y-%m-%d %H:%M"))
            })
        }
        UserCommands::Create { username, password } => {
            let hash = hash_password(&password, config.security.password_hash_cost)?;
            let user = match users::create(db.pool(), &username, &hash).await {
                Err(DatabaseError::UniqueViolation(_)) => anyhow::bail!("User '{}' already exists", username),
                other => other?,
            };
            output_success(
                &output_format,
                &format!("Created user '{}'", user.username),
                Some(json!({ "user": { "id": user.id, "username": user.username } })),
            )
        }
        UserCommands::Delete { username } => {
            users::delete_by_username(db.pool(), &username)
                .await
                .with_context(|| format!("Could not delete user '{}'", username))?;
            output_success(&output_format, &format!("Deleted user '{}'", username), None)
        }
    }
}
