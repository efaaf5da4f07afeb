//! Provision an admin account.
//!
//! Usage: `cargo run --bin create-admin -- --email me@example.com --password ...`
//!
//! Uses the same `config.yml` / `NEXTPRESS_*` settings as the server and
//! runs migrations first. An existing account is reported and left alone.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use nextpress::config::Config;
use nextpress::db::{self, repositories::SqlxUserRepository};
use nextpress::models::UserRole;
use nextpress::services::{NewUserInput, TokenService, UserService, UserServiceError};

#[derive(Parser)]
#[command(name = "create-admin")]
#[command(about = "Create an admin user for NextPress")]
#[command(version)]
struct Cli {
    #[arg(long, default_value = "admin@example.com", help = "Login email")]
    email: String,

    #[arg(long, default_value = "Admin@123", help = "Initial password")]
    password: String,

    #[arg(long, default_value = "Admin User", help = "Display name")]
    name: String,

    #[arg(long, default_value = "config.yml", help = "Path to the configuration file")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load_with_env(&cli.config)?;

    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;

    let users = UserService::new(
        SqlxUserRepository::boxed(pool),
        Arc::new(TokenService::from_config(&config.auth)),
    );

    provision(&users, cli).await
}

/// Create the admin account. An existing email is reported, not an error.
async fn provision(users: &UserService, cli: Cli) -> Result<()> {
    let input = NewUserInput {
        email: cli.email,
        password: cli.password,
        name: cli.name,
        role: UserRole::Admin,
    };

    match users.create_user(input).await {
        Ok(user) => {
            println!("Admin user created");
            println!("  id:    {}", user.id);
            println!("  email: {}", user.email);
            println!("  name:  {}", user.name);
            Ok(())
        }
        Err(UserServiceError::UserExists(email)) => {
            println!("A user with email {} already exists; nothing changed", email);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
