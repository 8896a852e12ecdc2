#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the RTH map server.

use clap::{Parser, Subcommand};
use rth_map_database::{DbPool, admins, districts, statistics};
use rth_map_database_models::AdminRole;
use rth_map_server::config::ServerConfig;
use rth_map_server::interactive;

#[derive(Parser)]
#[command(name = "rth_map_server", about = "RTH map API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (the default when no command is given)
    Serve,
    /// Create an administrator account, prompting for missing values
    CreateAdmin {
        /// Login name (at least 3 characters)
        #[arg(long)]
        username: Option<String>,
        /// Password (at least 6 characters). Prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
        /// Contact email
        #[arg(long)]
        email: Option<String>,
        /// `admin` or `super_admin`
        #[arg(long, default_value = "super_admin", value_parser = parse_role)]
        role: AdminRole,
    },
    /// Enable or disable an administrator account
    AdminStatus {
        /// Login name of the account
        username: String,
        /// Disable the account instead of enabling it
        #[arg(long)]
        disable: bool,
    },
    /// Create the database schema and print table counts
    Migrate,
}

fn parse_role(value: &str) -> Result<AdminRole, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("unknown role '{value}' (expected admin or super_admin)"))
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();
    let config = ServerConfig::from_env()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => rth_map_server::run_server(config).await?,
        Commands::CreateAdmin {
            username,
            password,
            email,
            role,
        } => {
            let pool = DbPool::open(&config.database_path, 1)?;
            let input = interactive::prompt_missing(username, password, email, role)?;
            let admin = interactive::create_admin(&pool, &config.auth, input)?;
            println!("Created {} account '{}'", admin.role, admin.username);
        }
        Commands::AdminStatus { username, disable } => {
            let pool = DbPool::open(&config.database_path, 1)?;
            let admin = interactive::set_admin_active(&pool, &username, !disable)?;
            let status = if admin.is_active { "enabled" } else { "disabled" };
            println!("Account '{}' is now {status}", admin.username);
        }
        Commands::Migrate => {
            let pool = DbPool::open(&config.database_path, 1)?;
            let conn = pool.acquire()?;
            log::info!(
                "Schema ready at {}: {} districts, {} statistics, {} admins",
                config.database_path.display(),
                districts::count(&conn)?,
                statistics::list(&conn)?.len(),
                admins::count(&conn)?
            );
        }
    }

    Ok(())
}
