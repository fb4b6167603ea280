//! CLI administration tool for user accounts.
//!
//! Runs the same form pipelines as the web application, so every rule and
//! uniqueness check applies to operator edits too.
//!
//! # Usage
//!
//! ```bash
//! # List accounts
//! cargo run --bin accounts-admin -- user list
//!
//! # Register an account (prompts for missing values)
//! cargo run --bin accounts-admin -- user create --user-name alice --email alice@example.com
//!
//! # Forbid an account
//! cargo run --bin accounts-admin -- user edit alice --forbid true
//!
//! # Set a new password
//! cargo run --bin accounts-admin -- user passwd alice
//!
//! # Database tools
//! cargo run --bin accounts-admin -- db check
//! cargo run --bin accounts-admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! See [`account_forms::config`]. `DATABASE_URL` (or the `DB_*` components)
//! is required.

use account_forms::config::{self, Config};
use account_forms::domain::entities::{User, UserField};
use account_forms::forms::{RegisterForm, ResetPwdForm, UserAdminForm, render_errors};
use account_forms::i18n::{Catalog, Locale};
use account_forms::infrastructure::persistence::{self, PgUserRepository};
use account_forms::prelude::{AccountService, AppError, UserRepository};
use account_forms::telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing user accounts.
#[derive(Parser)]
#[command(name = "accounts-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Language used for field error messages (defaults to the first configured one)
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// List accounts
    List {
        #[arg(long, default_value_t = 50)]
        limit: i64,

        #[arg(long, default_value_t = 0)]
        offset: i64,
    },

    /// Register a new account
    Create {
        #[arg(short, long)]
        user_name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        /// Password (generated if omitted and --generate is set, prompted otherwise)
        #[arg(short, long)]
        password: Option<String>,

        /// Generate a random password
        #[arg(short, long)]
        generate: bool,

        /// Activate immediately instead of waiting for email confirmation
        #[arg(long)]
        activate: bool,
    },

    /// Edit an account by id, user name or email
    Edit {
        user: String,

        #[arg(long)]
        nick_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        admin: Option<bool>,

        #[arg(long)]
        active: Option<bool>,

        #[arg(long)]
        forbid: Option<bool>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Set a new password for an account
    Passwd { user: String },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    telemetry::init(&config);

    let pool = persistence::connect(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => {
            let locale = load_locale(&config, cli.lang.as_deref())?;
            handle_user_action(action, &pool, &locale).await?
        }
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn load_locale(config: &Config, lang: Option<&str>) -> Result<Locale> {
    let catalog: Arc<Catalog> = Arc::new(config.load_catalog()?);
    let lang = lang
        .map(str::to_string)
        .or_else(|| config.langs.first().cloned())
        .unwrap_or_default();
    Ok(catalog.locale(&lang))
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool, locale: &Locale) -> Result<()> {
    let repo = Arc::new(PgUserRepository::new(Arc::new(pool.clone())));
    let service = AccountService::new(Arc::clone(&repo));

    let result = match action {
        UserAction::List { limit, offset } => list_users(&service, limit, offset).await,
        UserAction::Create {
            user_name,
            email,
            password,
            generate,
            activate,
        } => {
            create_user(
                &service,
                repo.as_ref(),
                user_name,
                email,
                password,
                generate,
                activate,
            )
            .await
        }
        UserAction::Edit {
            user,
            nick_name,
            email,
            admin,
            active,
            forbid,
            yes,
        } => {
            let overrides = EditOverrides {
                nick_name,
                email,
                admin,
                active,
                forbid,
            };
            edit_user(&service, &user, overrides, yes).await
        }
        UserAction::Passwd { user } => change_password(&service, &user).await,
    };

    match result {
        Err(AppError::InvalidForm(errors)) => {
            println!("{}", "❌ Rejected".red().bold());
            for (field, messages) in render_errors(&errors, locale) {
                for message in messages {
                    println!("  {}: {}", field.cyan(), message);
                }
            }
            std::process::exit(1);
        }
        other => other.map_err(|e| anyhow::anyhow!("{}", e)),
    }
}

/// Lists accounts with status indicators.
///
/// # Output Format
///
/// ```text
/// 👥 Users
///
///   ID  User name        Email                          Status
///   ──────────────────────────────────────────────────────────────────
///   1   alice            alice@example.com              ACTIVE ADMIN
///   2   bob_smith        bob@example.com                INACTIVE
/// ```
async fn list_users(
    service: &AccountService<PgUserRepository>,
    limit: i64,
    offset: i64,
) -> Result<(), AppError> {
    println!("{}", "👥 Users".bright_blue().bold());
    println!();

    let users = service.list_users(limit, offset).await?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        println!();
        println!(
            "  Create one with: {} accounts-admin user create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<4} {:<16} {:<30} {}",
        "ID".bright_white().bold(),
        "User name".bright_white().bold(),
        "Email".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(70).bright_black());

    for user in &users {
        println!(
            "  {:<4} {:<16} {:<30} {}",
            user.id.to_string().bright_black(),
            user.user_name.cyan(),
            user.email,
            status_of(user)
        );
    }

    println!();
    println!("  Shown: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

fn status_of(user: &User) -> String {
    let mut status = if user.is_forbid {
        "FORBIDDEN".red().to_string()
    } else if user.is_active {
        "ACTIVE".green().to_string()
    } else {
        "INACTIVE".yellow().to_string()
    };
    if user.is_admin {
        status.push(' ');
        status.push_str(&"ADMIN".magenta().to_string());
    }
    status
}

/// Registers an account through the sign-up form.
async fn create_user(
    service: &AccountService<PgUserRepository>,
    repo: &PgUserRepository,
    user_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    generate: bool,
    activate: bool,
) -> Result<(), AppError> {
    println!("{}", "👤 Create User".bright_blue().bold());
    println!();

    let user_name = match user_name {
        Some(name) => name,
        None => prompt_text("User name")?,
    };
    let email = match email {
        Some(email) => email,
        None => prompt_text("Email")?,
    };

    let (password, password_re, generated) = match password {
        Some(p) => (p.clone(), p, false),
        None if generate => {
            let p = generate_password();
            (p.clone(), p, true)
        }
        None => {
            let p = prompt_password("Password")?;
            let re = prompt_password("Retype password")?;
            (p, re, false)
        }
    };

    let mut form = RegisterForm {
        user_name,
        email,
        password: password.clone(),
        password_re,
    };
    let mut user = service.register(&mut form).await?;

    if activate {
        user.is_active = true;
        repo.update(&user, &[UserField::IsActive]).await?;
    }

    println!();
    println!("{}", "✅ User created successfully!".green().bold());
    println!("  ID:     {}", user.id.to_string().bright_black());
    println!("  Name:   {}", user.user_name.cyan());
    println!("  Status: {}", status_of(&user));
    if generated {
        println!("  Password: {}", password.bright_yellow().bold());
        println!();
        println!(
            "{}",
            "⚠️  Save this password now, it is not stored in plain text."
                .red()
                .bold()
        );
    }
    println!();

    Ok(())
}

struct EditOverrides {
    nick_name: Option<String>,
    email: Option<String>,
    admin: Option<bool>,
    active: Option<bool>,
    forbid: Option<bool>,
}

/// Edits an account through the admin form, persisting only changed fields.
async fn edit_user(
    service: &AccountService<PgUserRepository>,
    key: &str,
    overrides: EditOverrides,
    skip_confirm: bool,
) -> Result<(), AppError> {
    println!("{}", "✏️  Edit User".bright_blue().bold());
    println!();

    let user = service.find_user(key).await?;

    let mut form = UserAdminForm::default();
    form.set_from_user(&user);
    if let Some(nick_name) = overrides.nick_name {
        form.nick_name = nick_name;
    }
    if let Some(email) = overrides.email {
        form.email = email;
    }
    if let Some(admin) = overrides.admin {
        form.is_admin = admin;
    }
    if let Some(active) = overrides.active {
        form.is_active = active;
    }
    if let Some(forbid) = overrides.forbid {
        form.is_forbid = forbid;
    }

    let changes = form.changes(&user);
    if changes.is_empty() {
        println!("{}", "⚠️  Nothing to change".yellow());
        return Ok(());
    }

    println!("  User:    {}", user.user_name.cyan());
    println!(
        "  Changes: {}",
        changes
            .iter()
            .map(|f| f.column())
            .collect::<Vec<_>>()
            .join(", ")
            .bright_white()
    );
    println!();

    if !skip_confirm && !confirm("Apply these changes?", true)? {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    let user = service.save_user_admin(&mut form).await?;

    println!();
    println!("{}", "✅ User updated successfully!".green().bold());
    println!("  Status: {}", status_of(&user));
    println!();

    Ok(())
}

/// Sets a new password through the reset form. Reactivates the account.
async fn change_password(
    service: &AccountService<PgUserRepository>,
    key: &str,
) -> Result<(), AppError> {
    println!("{}", "🔑 Set Password".bright_blue().bold());
    println!();

    let mut user = service.find_user(key).await?;
    println!("  User: {}", user.user_name.cyan());
    println!();

    let mut form = ResetPwdForm {
        password: prompt_password("New password")?,
        password_re: prompt_password("Retype password")?,
    };
    service.reset_password(&mut user, &mut form).await?;

    println!();
    println!("{}", "✅ Password updated".green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  Users: {}", users.to_string().bright_green().bold());
        }
        DbAction::Migrate => {
            println!("{}", "📦 Applying migrations...".bright_blue());

            persistence::run_migrations(pool).await?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}

fn prompt_text(prompt: &str) -> Result<String, AppError> {
    Input::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(prompt_error)
}

fn prompt_password(prompt: &str) -> Result<String, AppError> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(prompt_error)
}

fn confirm(prompt: &str, default: bool) -> Result<bool, AppError> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(prompt_error)
}

fn prompt_error(e: dialoguer::Error) -> AppError {
    AppError::internal(
        "Prompt failed",
        serde_json::json!({ "reason": e.to_string() }),
    )
}

/// Generates a random 16-character alphanumeric password.
fn generate_password() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const PASSWORD_LEN: usize = 16;

    let mut rng = rand::rng();

    (0..PASSWORD_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
