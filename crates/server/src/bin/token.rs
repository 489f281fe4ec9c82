//! Issues a session token for a user.
//!
//! ```text
//! parley-token user <USER_ID>
//! parley-token admin <NAME> <EMAIL>
//! ```

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::time::Duration;

use parley::auth::TokenAuthority;
use parley::config::Settings;
use storage::Db;

/// Session token issuer
#[derive(Debug, Parser)]
#[command(name = "parley-token")]
#[command(about = "Issue parley session tokens", long_about = None)]
#[command(version)]
struct Cli {
    /// Override `database.url` from the configuration
    #[arg(long, env = "PARLEY_DATABASE__URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
enum Commands {
    /// Token for an existing user
    User {
        /// User id
        id: i64,
    },

    /// Create or promote an admin, then issue its token
    Admin {
        /// Admin display name
        name: String,
        /// Admin email
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::new().context("Failed to load configuration")?;

    let db_url = cli.database_url.as_deref().unwrap_or(&settings.database.url);
    let db = Db::new(db_url).await?;
    let user = match cli.command {
        Commands::User { id } => db
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| anyhow!("user {} not found", id))?,
        Commands::Admin { name, email } => db.seed_admin(&name, &email).await?,
    };

    let tokens = TokenAuthority::new(
        &settings.security.app_key,
        Duration::from_secs(settings.security.token_ttl_secs),
    );
    eprintln!("user {} ({} <{}>)", user.id, user.name, user.email);
    println!("{}", tokens.issue(user.id));
    Ok(())
}
