use std::fmt;

use chrono::{DateTime, Duration, Utc};
use inquire::{InquireError, Select};

use crate::auth::{IssuedToken, TokenGenerator};
use crate::store::Store;
use crate::types::{File, Token, User};

const LIST_PAGE_SIZE: i32 = 500;

/// User for display in pickers and lists
pub struct UserDisplay {
    pub user: User,
}

impl fmt::Display for UserDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.user.active { "" } else { " [inactive]" };
        write!(
            f,
            "{} <{}> (#{}){}",
            self.user.name, self.user.email, self.user.id, status
        )
    }
}

/// Token with resolved user name for display
pub struct TokenDisplay {
    pub token: Token,
    pub username: Option<String>,
}

impl fmt::Display for TokenDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = self.username.as_deref().unwrap_or("admin");
        let created = format_relative_time(&self.token.created_at);
        let last_used = match &self.token.last_used_at {
            Some(dt) => format_relative_time(dt),
            None => "never used".to_string(),
        };
        write!(
            f,
            "stash_{}...  {}  created {}  {}",
            &self.token.token_lookup, user, created, last_used
        )
    }
}

/// File with its share count for display
pub struct FileDisplay {
    pub file: File,
    pub shares: i64,
}

impl fmt::Display for FileDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  {} bytes  {} share(s)",
            self.file.id, self.file.name, self.file.size_bytes, self.shares
        )
    }
}

/// Token expiration option for display
#[derive(Clone)]
pub struct ExpirationOption {
    pub label: &'static str,
    pub days: Option<i64>,
}

impl fmt::Display for ExpirationOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Format a datetime as relative time (e.g., "2 days ago")
#[must_use]
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let diff = Utc::now().signed_duration_since(*dt);

    if diff.num_seconds() < 0 {
        return "in the future".to_string();
    }

    let (value, unit) = if diff.num_seconds() < 60 {
        return "just now".to_string();
    } else if diff.num_minutes() < 60 {
        (diff.num_minutes(), "minute")
    } else if diff.num_hours() < 24 {
        (diff.num_hours(), "hour")
    } else if diff.num_days() < 30 {
        (diff.num_days(), "day")
    } else if diff.num_days() < 365 {
        (diff.num_days() / 30, "month")
    } else {
        (diff.num_days() / 365, "year")
    };

    if value == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{value} {unit}s ago")
    }
}

/// Get all users for listing, walking the id cursor until a short page
pub fn list_users(store: &impl Store) -> anyhow::Result<Vec<UserDisplay>> {
    let mut displays = Vec::new();
    let mut cursor = 0;

    loop {
        let page = store.list_users(cursor, LIST_PAGE_SIZE)?;
        let fetched = page.len();
        if let Some(last) = page.last() {
            cursor = last.id;
        }
        displays.extend(page.into_iter().map(|user| UserDisplay { user }));

        if fetched < LIST_PAGE_SIZE as usize {
            break;
        }
    }

    Ok(displays)
}

/// Get all tokens with resolved user names
pub fn list_tokens(store: &impl Store) -> anyhow::Result<Vec<TokenDisplay>> {
    let tokens = store.list_tokens()?;
    let mut displays = Vec::with_capacity(tokens.len());

    for token in tokens {
        let username = resolve_token_username(store, &token)?;
        displays.push(TokenDisplay { token, username });
    }

    Ok(displays)
}

/// Get all files owned by a user with their share counts
pub fn list_files(store: &impl Store, owner_id: i64) -> anyhow::Result<Vec<FileDisplay>> {
    let files = store.list_user_files(owner_id)?;
    let mut displays = Vec::with_capacity(files.len());

    for file in files {
        let shares = store.count_file_shares(&file.id)?;
        displays.push(FileDisplay { file, shares });
    }

    Ok(displays)
}

/// Pick a user from the list
pub fn pick_user(store: &impl Store) -> anyhow::Result<Option<User>> {
    let users = list_users(store)?;

    if users.is_empty() {
        println!("No users found.");
        return Ok(None);
    }

    let selection = Select::new("Select user:", users)
        .with_page_size(15)
        .with_help_message("Type to filter, Enter to select")
        .with_vim_mode(true)
        .prompt();

    match selection {
        Ok(display) => Ok(Some(display.user)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Pick a token from the list
pub fn pick_token(store: &impl Store) -> anyhow::Result<Option<Token>> {
    let tokens = list_tokens(store)?;

    if tokens.is_empty() {
        println!("No tokens found.");
        return Ok(None);
    }

    let selection = Select::new("Select token:", tokens)
        .with_page_size(15)
        .with_help_message("Type to filter, Enter to select")
        .with_vim_mode(true)
        .prompt();

    match selection {
        Ok(display) => Ok(Some(display.token)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Pick token expiration
pub fn pick_expiration() -> anyhow::Result<Option<Option<Duration>>> {
    let options = vec![
        ExpirationOption {
            label: "30 days",
            days: Some(30),
        },
        ExpirationOption {
            label: "90 days",
            days: Some(90),
        },
        ExpirationOption {
            label: "1 year",
            days: Some(365),
        },
        ExpirationOption {
            label: "Never",
            days: None,
        },
    ];

    let selection = Select::new("Token expiration:", options)
        .with_page_size(4)
        .with_vim_mode(true)
        .prompt();

    match selection {
        Ok(opt) => Ok(Some(opt.days.map(Duration::days))),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Get a user by ID or interactively pick one
pub fn get_or_pick_user(
    store: &impl Store,
    user_id: Option<i64>,
    non_interactive: bool,
) -> anyhow::Result<Option<User>> {
    if let Some(id) = user_id {
        let user = store
            .get_user(id)?
            .ok_or_else(|| anyhow::anyhow!("User not found: {}", id))?;
        Ok(Some(user))
    } else if non_interactive {
        anyhow::bail!("--user-id is required in non-interactive mode");
    } else {
        pick_user(store)
    }
}

/// Resolve a token's user name from its user_id
pub fn resolve_token_username(store: &impl Store, token: &Token) -> anyhow::Result<Option<String>> {
    match token.user_id {
        Some(uid) => Ok(store.get_user(uid)?.map(|u| u.name)),
        None => Ok(None),
    }
}

/// Request confirmation for a destructive operation
pub fn confirm_action(message: &str, yes: bool, non_interactive: bool) -> anyhow::Result<bool> {
    if yes {
        Ok(true)
    } else if non_interactive {
        anyhow::bail!("--yes is required for destructive operations in non-interactive mode");
    } else {
        Ok(inquire::Confirm::new(message)
            .with_default(false)
            .prompt()?)
    }
}

/// Create a new token record for a user
pub fn create_token_for_user(
    generator: &TokenGenerator,
    user_id: i64,
    expires_in: Option<Duration>,
) -> anyhow::Result<IssuedToken> {
    let expires_at = match expires_in {
        Some(d) => Some(
            Utc::now()
                .checked_add_signed(d)
                .ok_or_else(|| anyhow::anyhow!("Token expiration is out of range"))?,
        ),
        None => None,
    };
    Ok(generator.issue(Some(user_id), expires_at)?)
}
