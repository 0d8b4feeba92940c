//! Marquee operator CLI.
//!
//! Maintenance commands that talk to the catalog database directly:
//! seeding the sample catalog and creating or promoting admin accounts.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use dialoguer::{Input, Password};
use tracing::info;

use marquee_core::Role;
use marquee_core::tracing_init::init_tracing;
use marquee_core::user::RegisterInput;
use marquee_server::auth::password::hash_password;
use marquee_server::ledger::sample_catalog;
use marquee_server::storage::CatalogDatabase;

#[derive(Debug, Parser)]
#[command(name = "marquee", version, about = "Marquee catalog maintenance tool")]
struct Cli {
    /// Catalog database file path
    #[arg(long, default_value = "data/marquee.db", env = "MARQUEE_DB_PATH")]
    db_path: PathBuf,

    /// Run without interactive prompts (use CLI flags)
    #[arg(long, global = true)]
    non_interactive: bool,

    /// Output logs as JSON
    #[arg(long, env = "MARQUEE_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upsert the well-known sample catalog into the record store
    Seed,
    /// Create an admin account, or promote an existing user to admin
    CreateAdmin(CreateAdminArgs),
}

#[derive(Debug, Args)]
struct CreateAdminArgs {
    /// Admin username
    #[arg(long)]
    username: Option<String>,

    /// Admin email
    #[arg(long)]
    email: Option<String>,

    /// Admin password (prompted when omitted)
    #[arg(long, env = "MARQUEE_ADMIN_PASSWORD")]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing("marquee_cli=info,marquee_server=info", cli.log_json);

    let db = CatalogDatabase::open(&cli.db_path)
        .await
        .with_context(|| format!("opening catalog database at {}", cli.db_path.display()))?;

    match cli.command {
        Commands::Seed => seed(&db).await,
        Commands::CreateAdmin(args) => create_admin(&db, args, cli.non_interactive).await,
    }
}

async fn seed(db: &CatalogDatabase) -> Result<()> {
    for movie in sample_catalog() {
        let (action, stored) = db.upsert_movie(&movie).await?;
        info!(title = %stored.title, action = action.as_str(), "Seeded movie");
    }
    info!("Sample catalog seeded");
    Ok(())
}

async fn create_admin(db: &CatalogDatabase, args: CreateAdminArgs, non_interactive: bool) -> Result<()> {
    let username = prompt_value(args.username, "Admin username", non_interactive)?;
    let email = prompt_value(args.email, "Admin email", non_interactive)?;
    let password = match args.password {
        Some(password) => password,
        None if non_interactive => bail!("--password is required with --non-interactive"),
        None => Password::new()
            .with_prompt("Admin password (min 6 characters)")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    let input = RegisterInput {
        username,
        email,
        password,
    };
    let new = input
        .validate()
        .map_err(|errors| anyhow::anyhow!("invalid admin details: {errors:?}"))?;

    // An existing account with this email or username gets promoted instead.
    if let Some(existing) = db
        .find_user_by_username_or_email(&new.username, &new.email)
        .await?
    {
        if existing.role == Role::Admin {
            info!(username = %existing.username, "User is already an admin");
            return Ok(());
        }
        db.promote_to_admin(&existing.id).await?;
        info!(username = %existing.username, "Promoted existing user to admin");
        return Ok(());
    }

    let hash = hash_password(&new.password)
        .map_err(|e| anyhow::anyhow!("hashing password: {e}"))?;
    let user = db
        .create_user(&new.username, &new.email, &hash, Role::Admin)
        .await?;
    info!(username = %user.username, id = %user.id, "Admin account created");
    Ok(())
}

fn prompt_value(flag: Option<String>, prompt: &str, non_interactive: bool) -> Result<String> {
    match flag {
        Some(value) => Ok(value),
        None if non_interactive => bail!("missing required value: {prompt}"),
        None => Ok(Input::new().with_prompt(prompt).interact_text()?),
    }
}
