//! Takviye CLI - Database migrations, seeding and staff accounts.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! tk-cli migrate
//!
//! # Load catalog and content from a YAML file
//! tk-cli seed crates/cli/seed/demo.yaml
//!
//! # Create a staff account
//! tk-cli admin create -u ayse -e ayse@takviye.com.tr -r super_admin
//!
//! # Change an account's role
//! tk-cli admin set-role -l ayse -r editor
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_PASSWORD` - Password for `admin create` when `--password` is omitted

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tk-cli")]
#[command(author, version, about = "Takviye CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// Directory holding the SQL migration files
        #[arg(short, long, default_value = commands::migrate::DEFAULT_DIR)]
        dir: PathBuf,
    },
    /// Seed catalog and content from a YAML file
    Seed {
        /// Path to the seed file
        file: PathBuf,
    },
    /// Manage staff accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new staff account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Role (`super_admin`, `admin`, `editor`, `order_manager`, `support`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Password (defaults to the `ADMIN_PASSWORD` environment variable)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Change the role of an existing account
    SetRole {
        /// Username or email
        #[arg(short, long)]
        login: String,

        /// New role
        #[arg(short, long)]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Migrate { dir } => commands::migrate::run(&dir).await?,
        Commands::Seed { file } => {
            let summary = commands::seed::run(&file).await?;
            tracing::info!(%summary, "Seeding complete");
        }
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                email,
                role,
                password,
            } => {
                commands::admin::create_user(&username, &email, &role, password).await?;
            }
            AdminAction::SetRole { login, role } => {
                commands::admin::set_role(&login, &role).await?;
            }
        },
    }
    Ok(())
}
