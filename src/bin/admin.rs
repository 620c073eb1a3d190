//! CLI administration tool for link-registry.
//!
//! Issues per-owner API tokens, inspects and seeds links, and checks the
//! database without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Issue a token that acts for owner "alice"
//! cargo run --bin admin -- token create --owner alice
//!
//! # List and revoke tokens
//! cargo run --bin admin -- token list
//! cargo run --bin admin -- token revoke "Alice laptop"
//!
//! # Inspect or seed an owner's links
//! cargo run --bin admin -- links list --owner alice
//! cargo run --bin admin -- links seed --owner alice
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` components (required)
//! - `TOKEN_SIGNING_SECRET` (required for `token create`)
//! - `BASE_URL` (optional, used when printing short URLs)

use link_registry::application::services::LinkService;
use link_registry::application::services::auth_service::hash_with_secret;
use link_registry::config::Config;
use link_registry::domain::repositories::TokenRepository;
use link_registry::error::AppError;
use link_registry::infrastructure::cache::NullCache;
use link_registry::infrastructure::persistence::{PgLinkRepository, PgTokenRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// Example links for a fresh installation.
const SEED_LINKS: &[(&str, &str)] = &[
    ("mdn-js", "https://developer.mozilla.org/en-US/docs/Web/JavaScript"),
    ("ts-docs", "https://www.typescriptlang.org/docs/"),
    ("react", "https://react.dev/learn"),
    ("nodejs", "https://nodejs.org/en/docs/"),
    ("so-ts", "https://stackoverflow.com/questions/tagged/typescript"),
    ("pg-docs", "https://www.postgresql.org/docs/"),
    ("vite", "https://vitejs.dev/guide/"),
    ("vscode", "https://code.visualstudio.com/docs"),
    ("r-webdev", "https://www.reddit.com/r/webdev/"),
    ("css-tricks", "https://css-tricks.com/"),
];

/// CLI tool for managing link-registry.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Inspect and seed links
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token for an owner
    Create {
        /// Owner the token acts for
        #[arg(short, long)]
        owner: String,

        /// Token name (e.g., "Alice laptop")
        #[arg(short, long)]
        name: Option<String>,

        /// Custom token value (auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

#[derive(Subcommand)]
enum LinksAction {
    /// List an owner's links, most recently updated first
    List {
        #[arg(short, long)]
        owner: String,
    },

    /// Insert the example link set for an owner
    Seed {
        #[arg(short, long)]
        owner: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Links { action } => handle_links_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));

    match action {
        TokenAction::Create {
            owner,
            name,
            token,
            yes,
        } => create_token(repo, owner, name, token, yes).await,
        TokenAction::List => list_tokens(repo).await,
        TokenAction::Revoke { name_or_id } => revoke_token(repo, name_or_id).await,
    }
}

/// Creates a new API token with interactive prompts.
///
/// Only the HMAC of the token is stored; the raw value is shown once.
async fn create_token(
    repo: Arc<PgTokenRepository>,
    owner: String,
    name: Option<String>,
    token: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    let owner = owner.trim().to_string();
    anyhow::ensure!(!owner.is_empty(), "Owner must not be empty");

    let signing_secret = std::env::var("TOKEN_SIGNING_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
        .context("TOKEN_SIGNING_SECRET must be set to the server's value")?;

    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text(format!("{owner} API"))
            .interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "⚠️  Using provided token value".yellow());
            t
        }
        None => {
            println!("{}", "✨ Generated new token".green());
            generate_token()
        }
    };

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:  {}", token_name.cyan());
    println!("  Owner: {}", owner.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  Save this token now. It cannot be shown again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_with_secret(&signing_secret, &token_value);

    repo.create_token(&token_name, &owner, &token_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "✅ Token created".green().bold());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" {}/api/links",
        token_value.bright_yellow(),
        base_url()
    );
    println!();

    Ok(())
}

async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin -- token create --owner <id>",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<4} {:<26} {:<20} {:<17} {:<10}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Owner".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(82).bright_black());

    for token in &tokens {
        let status = if token.is_revoked() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };

        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<4} {:<26} {:<20} {:<17} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token.owner_id,
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes a token by name or numeric ID after confirmation.
async fn revoke_token(repo: Arc<PgTokenRepository>, name_or_id: String) -> Result<()> {
    println!("{}", "🔒 Revoke API Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(&name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    .context("Token not found")?;

    if token.is_revoked() {
        println!("{}", "⚠️  This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  Owner: {}", token.owner_id.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!();
    println!("{}", "✅ Token revoked".green().bold());
    println!();

    Ok(())
}

async fn handle_links_action(action: LinksAction, pool: &PgPool) -> Result<()> {
    let service = LinkService::new(
        Arc::new(PgLinkRepository::new(Arc::new(pool.clone()))),
        Arc::new(NullCache::new()),
        base_url(),
    );

    match action {
        LinksAction::List { owner } => list_links(&service, &owner).await,
        LinksAction::Seed { owner } => seed_links(&service, &owner).await,
    }
}

async fn list_links(service: &LinkService, owner: &str) -> Result<()> {
    println!(
        "{} {}",
        "🔗 Links for".bright_blue().bold(),
        owner.cyan().bold()
    );
    println!();

    let links = service
        .list_links(owner)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    for link in &links {
        println!(
            "  {:<6} {:<22} → {}",
            link.id.to_string().bright_black(),
            format!("/{}", link.short_code).cyan(),
            link.url
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Creates the example links through the registry; taken codes are skipped.
async fn seed_links(service: &LinkService, owner: &str) -> Result<()> {
    println!("{}", "🌱 Seeding example links...".bright_blue().bold());
    println!();

    let mut created = 0usize;
    let mut skipped = 0usize;

    for (code, url) in SEED_LINKS {
        match service
            .create_link(owner, url.to_string(), code.to_string())
            .await
        {
            Ok(link) => {
                created += 1;
                println!(
                    "  {} {} → {}",
                    "✅".green(),
                    service.short_url(&link.short_code).cyan(),
                    link.url
                );
            }
            Err(AppError::Conflict { .. }) => {
                skipped += 1;
                println!("  {} /{} already exists", "⏭️ ".yellow(), code);
            }
            Err(e) => return Err(anyhow::anyhow!("Failed to create /{}: {}", code, e)),
        }
    }

    println!();
    println!(
        "  Created: {}  Skipped: {}",
        created.to_string().bright_green().bold(),
        skipped.to_string().yellow()
    );
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(pool)
                .await?;

            let owners_count: i64 =
                sqlx::query_scalar("SELECT COUNT(DISTINCT owner_id) FROM links")
                    .fetch_one(pool)
                    .await?;

            let tokens_count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL:    {}", version.bright_white());
            println!(
                "  Links:         {}",
                links_count.to_string().bright_green().bold()
            );
            println!(
                "  Owners:        {}",
                owners_count.to_string().bright_green().bold()
            );
            println!(
                "  Active tokens: {}",
                tokens_count.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}

fn base_url() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// 48 alphanumeric characters from the thread-local CSPRNG.
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
