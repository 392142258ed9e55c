//! Subcommand implementations for the `chatstatus` binary.

use anyhow::{bail, Context, Result};
use chatstatus_core::emoji::CustomEmoji;
use chatstatus_core::expiry::display_expiry;
use chatstatus_core::format::format_time_remaining;
use chatstatus_core::suggestions::DEFAULT_SUGGESTIONS;
use chatstatus_core::{
    Config, CustomStatus, CustomStatusDuration, Database, StatusDraft, StatusService, User,
};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::collections::BTreeSet;

/// Arguments of `chatstatus set`
pub struct SetRequest {
    pub text: Option<String>,
    pub emoji: String,
    pub duration: CustomStatusDuration,
    pub until: Option<String>,
    pub suggestion: Option<usize>,
    pub recent: Option<usize>,
}

/// Find the acting user, creating the configured identity on first use.
pub fn resolve_user(db: &Database, config: &Config, requested: Option<&str>) -> Result<User> {
    if let Some(requested) = requested {
        if let Some(user) = db.get_user(requested)? {
            return Ok(user);
        }
        if let Some(user) = db.get_user_by_username(requested)? {
            return Ok(user);
        }
        bail!("No user found matching '{}'", requested);
    }

    if let Some(user) = db.get_user(&config.user.id)? {
        return Ok(user);
    }

    let mut user = User::new(config.user.id.clone(), config.user.username.clone());
    user.timezone = config.status.timezone.clone();
    db.upsert_user(&user).context("failed to create user")?;
    tracing::info!(user_id = %user.id, "Created configured user");
    Ok(user)
}

/// Parse `--until`: RFC 3339, or a local "YYYY-MM-DD HH:MM" in `tz`.
fn parse_until(value: &str, tz: Tz) -> Result<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&tz));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .with_context(|| format!("invalid --until value '{}'", value))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("'{}' does not exist in {}", value, tz))
}

fn status_line(service: &StatusService, user: &User, status: &CustomStatus, now: &DateTime<Utc>) -> String {
    let mut line = format!(":{}:", status.emoji);
    if !status.text.is_empty() {
        line.push(' ');
        line.push_str(&status.text);
    }
    if let Some(label) = service.expiry_label(user, status, now) {
        line.push_str(&format!(" ({})", label));
    }
    line
}

pub fn set(service: &StatusService, user: &User, request: SetRequest) -> Result<()> {
    let now = Utc::now();

    let mut draft: StatusDraft<Tz> = if let Some(n) = request.suggestion {
        let Some(suggestion) = n.checked_sub(1).and_then(|i| DEFAULT_SUGGESTIONS.get(i)) else {
            bail!("suggestion must be between 1 and {}", DEFAULT_SUGGESTIONS.len());
        };
        suggestion.to_draft()
    } else if let Some(n) = request.recent {
        let recent = service.recent_statuses(&user.id)?;
        let Some(status) = n.checked_sub(1).and_then(|i| recent.iter_recent_first().nth(i)) else {
            bail!("recent status {} does not exist ({} saved)", n, recent.len());
        };
        StatusDraft::from_status(status)
    } else {
        StatusDraft::new(request.emoji, request.text.unwrap_or_default())
            .with_duration(request.duration)
    };

    if let Some(until) = request.until.as_deref() {
        let expiry = parse_until(until, service.user_timezone(user))?;
        draft = draft.with_custom_expiry(expiry);
    }

    let status = service
        .set_custom_status(&user.id, draft, &now)
        .context("failed to set status")?;

    println!("Status set: {}", status_line(service, user, &status, &now));
    Ok(())
}

pub fn clear(service: &StatusService, user: &User) -> Result<()> {
    if service.unset_custom_status(&user.id)? {
        println!("Status cleared.");
    } else {
        println!("No status was set.");
    }
    Ok(())
}

pub fn show(service: &StatusService, user: &User, json: bool) -> Result<()> {
    let now = Utc::now();
    let status = service.get_custom_status(&user.id, &now)?;

    if json {
        let value = match &status {
            Some(status) => serde_json::to_string_pretty(status)?,
            None => "null".to_string(),
        };
        println!("{}", value);
        return Ok(());
    }

    match status {
        Some(status) => {
            println!("{}: {}", user.username, status_line(service, user, &status, &now));
            if let Some(expires_at) = status.expires_at_time().filter(|_| status.duration.expires()) {
                println!("Clears {}", format_time_remaining(&expires_at.with_timezone(&Utc), &now));
            }
        }
        None => println!("{} has no status set.", user.username),
    }

    if service.show_status_dropdown_pulsating_dot(&user.id)? {
        println!();
        println!("Tip: set a status with `chatstatus set \"In a meeting\" --emoji calendar -d 1h`");
    }
    Ok(())
}

pub fn recent(service: &StatusService, user: &User, json: bool) -> Result<()> {
    let recent = service.recent_statuses(&user.id)?;

    if json {
        let newest_first: Vec<_> = recent.iter_recent_first().collect();
        println!("{}", serde_json::to_string_pretty(&newest_first)?);
        return Ok(());
    }

    if recent.is_empty() {
        println!("No recent statuses.");
        return Ok(());
    }

    println!("Recent statuses ({} of {}):", recent.len(), recent.limit());
    for (i, status) in recent.iter_recent_first().enumerate() {
        println!(
            "  {:>2}. :{}: {}  [{}]",
            i + 1,
            status.emoji,
            status.text,
            status.duration
        );
    }
    Ok(())
}

pub fn forget(service: &StatusService, user: &User, text: &str) -> Result<()> {
    let before = service.recent_statuses(&user.id)?.len();
    let target = CustomStatus::new("", text);
    let after = service.remove_recent_status(&user.id, &target)?;

    if after.len() < before {
        println!("Removed '{}' from recent statuses.", text);
    } else {
        println!("'{}' is not in recent statuses.", text);
    }
    Ok(())
}

pub fn suggestions(service: &StatusService, user: &User) -> Result<()> {
    let suggestions = service.suggestions(&user.id)?;
    if suggestions.is_empty() {
        println!("No suggestions left; all are in your recent statuses.");
        return Ok(());
    }

    println!("Suggestions:");
    for suggestion in suggestions {
        // Number by position in the full list so `set --suggestion N` matches
        let n = DEFAULT_SUGGESTIONS
            .iter()
            .position(|s| s == &suggestion)
            .map(|i| i + 1)
            .unwrap_or(0);
        println!(
            "  {}. :{}: {}  [{}]",
            n, suggestion.emoji, suggestion.text, suggestion.duration
        );
    }
    Ok(())
}

pub fn expiry(service: &StatusService, user: &User, expires_at: &str) -> Result<()> {
    let now = Utc::now().with_timezone(&service.user_timezone(user));
    match display_expiry(expires_at, &now, true) {
        Some(label) => println!("{}", label),
        None => bail!("invalid timestamp '{}', expected RFC 3339", expires_at),
    }
    Ok(())
}

pub fn add_emoji(db: &Database, config: &Config, name: &str) -> Result<()> {
    if !config.status.custom_emoji_enabled {
        bail!("custom emojis are disabled in configuration");
    }

    let emoji = CustomEmoji {
        id: format!("custom-{}", name),
        name: name.to_string(),
        creator_id: config.user.id.clone(),
    };
    db.upsert_custom_emoji(&emoji)
        .context("failed to save custom emoji")?;
    println!("Added custom emoji :{}:", name);
    Ok(())
}

pub fn add_user(db: &Database, id: &str, username: &str, timezone: Option<String>) -> Result<()> {
    if let Some(tz) = timezone.as_deref() {
        tz.parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("unknown timezone '{}'", tz))?;
    }

    let mut user = db
        .get_user(id)?
        .unwrap_or_else(|| User::new(id, username));
    user.username = username.to_string();
    user.timezone = timezone;
    db.upsert_user(&user).context("failed to save user")?;
    println!("Saved user {} ({})", user.username, user.id);
    Ok(())
}

pub fn missing_emojis(db: &Database, service: &StatusService, user_ids: &[String]) -> Result<()> {
    let ids: Vec<String> = if user_ids.is_empty() {
        db.list_users()?.into_iter().map(|u| u.id).collect()
    } else {
        user_ids.to_vec()
    };
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();

    let mut missing: BTreeSet<String> = service
        .custom_emojis_to_load(&refs, &Utc::now())?
        .into_iter()
        .collect();
    for id in &ids {
        missing.extend(service.recent_custom_emojis_to_load(id)?);
    }

    if missing.is_empty() {
        println!("No missing custom emojis.");
    } else {
        for name in missing {
            println!("{}", name);
        }
    }
    Ok(())
}
