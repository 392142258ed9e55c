//! chatstatus - custom status manager for team chat
//!
//! Sets, shows and clears a user's custom status (emoji + text + expiry)
//! and manages the recently used status list.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/chatstatus/data.db (~/.local/share/chatstatus/data.db)
//! - Config: $XDG_CONFIG_HOME/chatstatus/config.toml (~/.config/chatstatus/config.toml)

mod commands;

use anyhow::{Context, Result};
use chatstatus_core::status::load_emoji_catalog;
use chatstatus_core::{Config, CustomStatusDuration, Database, StatusService};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chatstatus")]
#[command(about = "Manage your custom chat status")]
#[command(version)]
struct Args {
    /// Act as this user (ID or username) instead of the configured one
    #[arg(short, long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Set your status
    Set {
        /// Status text
        text: Option<String>,

        /// Emoji name, e.g. calendar (defaults to speech_balloon)
        #[arg(short, long, default_value = "")]
        emoji: String,

        /// When to clear: dont_clear, 30m, 1h, 4h, today, this_week
        #[arg(short, long, default_value = "today")]
        duration: CustomStatusDuration,

        /// Clear at a specific time ("2024-05-01 17:00" local, or RFC 3339)
        #[arg(long, conflicts_with = "duration")]
        until: Option<String>,

        /// Use the Nth default suggestion (1-based) instead of text/emoji
        #[arg(short, long, conflicts_with_all = ["text", "emoji"])]
        suggestion: Option<usize>,

        /// Reuse the Nth recent status (1 = newest)
        #[arg(short, long, conflicts_with_all = ["text", "emoji", "suggestion"])]
        recent: Option<usize>,
    },

    /// Clear your status
    Clear,

    /// Show a status (yours by default)
    Show {
        /// Output the raw status JSON
        #[arg(long)]
        json: bool,
    },

    /// List recently used statuses, newest first
    Recent {
        /// Output the raw list JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a status from the recent list, matched by text
    Forget {
        /// Text of the status to forget
        text: String,
    },

    /// List default suggestions not already in the recent list
    Suggestions,

    /// Preview the expiry label for a timestamp
    Expiry {
        /// RFC 3339 timestamp, e.g. 2024-05-01T17:00:00Z
        expires_at: String,
    },

    /// Manage custom emojis and users
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Register a custom emoji
    AddEmoji {
        /// Emoji name
        name: String,
    },

    /// Create or update a user
    AddUser {
        /// User ID
        id: String,
        /// Username
        username: String,
        /// IANA timezone, e.g. Europe/Berlin
        #[arg(long)]
        timezone: Option<String>,
    },

    /// List custom emojis used in statuses or recent emojis that the catalog lacks
    MissingEmojis {
        /// User IDs to check (defaults to all users)
        user_ids: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file, stdout is for command output)
    let _log_guard =
        chatstatus_core::logging::init(&config.logging).context("failed to initialize logging")?;

    // Open database
    let db_path = Config::database_path();
    tracing::info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    // Admin commands run before the identity and catalog are needed
    if let Command::Admin(admin) = &args.command {
        return match admin {
            AdminCommand::AddEmoji { name } => commands::add_emoji(&db, &config, name),
            AdminCommand::AddUser {
                id,
                username,
                timezone,
            } => commands::add_user(&db, id, username, timezone.clone()),
            AdminCommand::MissingEmojis { user_ids } => {
                let catalog = load_emoji_catalog(&db, &config.emoji, &config.status)
                    .context("failed to load emoji catalog")?;
                let service = StatusService::new(&db, &catalog, &config.status)
                    .context("invalid status settings")?;
                commands::missing_emojis(&db, &service, user_ids)
            }
        };
    }

    let user = commands::resolve_user(&db, &config, args.user.as_deref())?;

    let catalog = load_emoji_catalog(&db, &config.emoji, &config.status)
        .context("failed to load emoji catalog")?;
    let service =
        StatusService::new(&db, &catalog, &config.status).context("invalid status settings")?;

    match args.command {
        Command::Set {
            text,
            emoji,
            duration,
            until,
            suggestion,
            recent,
        } => commands::set(
            &service,
            &user,
            commands::SetRequest {
                text,
                emoji,
                duration,
                until,
                suggestion,
                recent,
            },
        ),
        Command::Clear => commands::clear(&service, &user),
        Command::Show { json } => commands::show(&service, &user, json),
        Command::Recent { json } => commands::recent(&service, &user, json),
        Command::Forget { text } => commands::forget(&service, &user, &text),
        Command::Suggestions => commands::suggestions(&service, &user),
        Command::Expiry { expires_at } => commands::expiry(&service, &user, &expires_at),
        Command::Admin(_) => Ok(()),
    }
}
