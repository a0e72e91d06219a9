//! CLI administration tool for shortcut-api.
//!
//! Talks to the database directly, so it works before any admin token exists.
//! This is how the first admin token is created.
//!
//! # Usage
//!
//! ```bash
//! # Create the first admin token
//! cargo run --bin admin -- token create admin root
//!
//! # Create a user token, blocked until reviewed
//! cargo run --bin admin -- token create user indico --blocked
//!
//! # Inspect tokens
//! cargo run --bin admin -- token list
//! cargo run --bin admin -- token get --name indico
//!
//! # Block or unblock a token
//! cargo run --bin admin -- token block --api-key 2a6f...
//! cargo run --bin admin -- token unblock --name indico
//!
//! # Counts of tokens and URLs
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`, or `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`

use shortcut_api::application::services::TokenService;
use shortcut_api::config::Config;
use shortcut_api::domain::entities::{Token, TokenFilter, TokenPatch};
use shortcut_api::domain::repositories::TokenRepository;
use shortcut_api::infrastructure::persistence::PgTokenRepository;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortcut-api.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show token and URL counts
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Role {
    Admin,
    User,
}

/// Selects one token by name or API key.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct TokenSelector {
    /// Token name
    #[arg(long)]
    name: Option<String>,

    /// Token API key
    #[arg(long)]
    api_key: Option<String>,
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Token role
        #[arg(value_enum)]
        role: Role,

        /// Unique token name
        name: String,

        /// Create the token blocked
        #[arg(long)]
        blocked: bool,

        /// Callback URL stored with the token
        #[arg(long)]
        callback_url: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show one token
    Get {
        #[command(flatten)]
        selector: TokenSelector,
    },

    /// List all tokens
    List,

    /// Block a token
    Block {
        #[command(flatten)]
        selector: TokenSelector,
    },

    /// Unblock a token
    Unblock {
        #[command(flatten)]
        selector: TokenSelector,
    },
}

/// Database operation subcommands.
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
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));
    let service = TokenService::new(repo.clone());

    match action {
        TokenAction::Create {
            role,
            name,
            blocked,
            callback_url,
            yes,
        } => {
            create_token(&service, role, name, blocked, callback_url, yes).await?;
        }
        TokenAction::Get { selector } => {
            let token = resolve(&service, repo.as_ref(), &selector).await?;
            print_token(&token);
        }
        TokenAction::List => {
            list_tokens(&service).await?;
        }
        TokenAction::Block { selector } => {
            set_blocked(&service, repo.as_ref(), &selector, true).await?;
        }
        TokenAction::Unblock { selector } => {
            set_blocked(&service, repo.as_ref(), &selector, false).await?;
        }
    }

    Ok(())
}

/// Creates a new API token.
///
/// # Flow
///
/// 1. Validate the callback URL, if any
/// 2. Display token details
/// 3. Confirm creation (unless `--yes` flag)
/// 4. Store in database with a generated API key
/// 5. Display the key and usage instructions
async fn create_token(
    service: &TokenService<PgTokenRepository>,
    role: Role,
    name: String,
    blocked: bool,
    callback_url: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    if let Some(ref url) = callback_url {
        shortcut_api::utils::url_validator::validate_callback_url(url)
            .map_err(|_| anyhow::anyhow!("Callback URL is invalid: {url}"))?;
    }

    let is_admin = matches!(role, Role::Admin);

    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:    {}", name.cyan());
    println!(
        "  Role:    {}",
        if is_admin { "admin".red() } else { "user".green() }
    );
    println!("  Blocked: {}", blocked);
    if let Some(ref url) = callback_url {
        println!("  Callback: {}", url.bright_black());
    }
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

    let token = service
        .create(name, is_admin, blocked, callback_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!("{}", "✅ Token created successfully!".green().bold());
    println!();
    println!("{}", "Add this to your requests:".bright_white());
    println!(
        "  {}: Bearer {}",
        "Authorization".bright_cyan(),
        token.api_key.to_string().bright_yellow()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/urls/",
        token.api_key.to_string().bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists all API tokens with status indicators.
///
/// # Output Format
///
/// ```text
/// 📋 API Tokens
///
///   Name                 API key                               Role   Uses    Status
///   ─────────────────────────────────────────────────────────────────────────────────
///   root                 0b7f6f0e-4d5c-4e4f-9d57-0c3b8a2c1e11  admin  12      ACTIVE
///   indico               5f0e0c66-08a4-4d5e-8a57-1f0f9f0c2b22  user   3120    BLOCKED
/// ```
async fn list_tokens(service: &TokenService<PgTokenRepository>) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let tokens = service
        .list(&TokenFilter::default())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create admin <name>",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<20} {:<37} {:<6} {:<7} {:<8}",
        "Name".bright_white().bold(),
        "API key".bright_white().bold(),
        "Role".bright_white().bold(),
        "Uses".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(81).bright_black());

    for token in &tokens {
        println!(
            "  {:<20} {:<37} {:<6} {:<7} {}",
            token.name.cyan(),
            token.api_key.to_string().bright_black(),
            token.role(),
            token.token_uses,
            status(token)
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

/// Blocks or unblocks a token after confirmation.
async fn set_blocked(
    service: &TokenService<PgTokenRepository>,
    repo: &PgTokenRepository,
    selector: &TokenSelector,
    blocked: bool,
) -> Result<()> {
    let token = resolve(service, repo, selector).await?;

    if token.is_blocked == blocked {
        println!(
            "{}",
            format!("⚠️  Token is already {}", if blocked { "blocked" } else { "active" })
                .yellow()
        );
        return Ok(());
    }

    print_token(&token);

    let verb = if blocked { "Block" } else { "Unblock" };
    let confirmed = Confirm::new()
        .with_prompt(format!("{verb} this token?"))
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    let patch = TokenPatch {
        is_blocked: Some(blocked),
        ..TokenPatch::default()
    };
    service
        .update(&token.api_key.to_string(), patch)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update token: {}", e))?;

    println!();
    println!("{}", format!("✅ Token {}ed", verb.to_lowercase()).green().bold());
    println!();

    Ok(())
}

/// Looks up the token named by `selector`.
async fn resolve(
    service: &TokenService<PgTokenRepository>,
    repo: &PgTokenRepository,
    selector: &TokenSelector,
) -> Result<Token> {
    let token = match (&selector.name, &selector.api_key) {
        (Some(name), _) => repo
            .find_by_name(name)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?,
        (None, Some(api_key)) => Some(
            service
                .get(api_key)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        ),
        (None, None) => None,
    };

    token.context("Token not found")
}

fn print_token(token: &Token) {
    println!("  Name:        {}", token.name.cyan());
    println!("  API key:     {}", token.api_key.to_string().bright_yellow());
    println!("  Role:        {}", token.role());
    println!("  Status:      {}", status(token));
    println!("  Uses:        {}", token.token_uses);
    println!(
        "  Last access: {}",
        token.last_access.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
    if let Some(ref url) = token.callback_url {
        println!("  Callback:    {}", url.bright_black());
    }
    println!();
}

fn status(token: &Token) -> ColoredString {
    if token.is_blocked {
        "BLOCKED".red()
    } else {
        "ACTIVE".green()
    }
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of URLs
/// - Number of custom shortcuts
/// - Number of active and blocked tokens
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (urls, custom): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COUNT(*) FILTER (WHERE is_custom) FROM urls")
            .fetch_one(pool)
            .await?;

    let (active, blocked): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*) FILTER (WHERE NOT is_blocked), COUNT(*) FILTER (WHERE is_blocked) FROM tokens",
    )
    .fetch_one(pool)
    .await?;

    println!("  URLs:           {}", urls.to_string().bright_green().bold());
    println!("  Custom:         {}", custom.to_string().bright_green().bold());
    println!("  Active tokens:  {}", active.to_string().bright_green().bold());
    println!("  Blocked tokens: {}", blocked.to_string().bright_red().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
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

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
