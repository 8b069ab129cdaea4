use chrono::Duration;
use serde::Serialize;

use crate::auth::TokenGenerator;
use crate::store::Store;

use super::init_store;
use super::pickers::{
    TokenDisplay, confirm_action, create_token_for_user, get_or_pick_user, list_tokens,
    pick_expiration, pick_token, resolve_token_username,
};

#[derive(Serialize)]
pub(super) struct TokenOutput {
    id: String,
    lookup: String,
    user_id: Option<i64>,
    username: Option<String>,
    is_admin: bool,
    created_at: String,
    expires_at: Option<String>,
    last_used_at: Option<String>,
}

impl From<&TokenDisplay> for TokenOutput {
    fn from(display: &TokenDisplay) -> Self {
        Self {
            id: display.token.id.clone(),
            lookup: display.token.token_lookup.clone(),
            user_id: display.token.user_id,
            username: display.username.clone(),
            is_admin: display.token.is_admin,
            created_at: display.token.created_at.to_rfc3339(),
            expires_at: display.token.expires_at.map(|dt| dt.to_rfc3339()),
            last_used_at: display.token.last_used_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

pub fn run_token_create(
    data_dir: String,
    user_id: Option<i64>,
    expires_days: Option<i64>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let Some(user) = get_or_pick_user(&store, user_id, non_interactive)? else {
        return Ok(());
    };

    if !user.active {
        anyhow::bail!("User '{}' is inactive", user.name);
    }

    let expires_in = if let Some(days) = expires_days {
        if days <= 0 {
            None
        } else {
            Some(
                Duration::try_days(days)
                    .ok_or_else(|| anyhow::anyhow!("--expires-days is too large"))?,
            )
        }
    } else if non_interactive {
        None
    } else {
        match pick_expiration()? {
            Some(exp) => exp,
            None => {
                println!("Cancelled.");
                return Ok(());
            }
        }
    };

    let generator = TokenGenerator::new();
    let issued = create_token_for_user(&generator, user.id, expires_in)?;
    store.create_token(&issued.token)?;

    println!();
    println!("Token created for '{}': {}", user.name, issued.raw);
    println!("  Save this now - it cannot be retrieved later.");
    println!();

    Ok(())
}

pub fn run_token_list(data_dir: String, json: bool) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let tokens = list_tokens(&store)?;

    if json {
        let output: Vec<TokenOutput> = tokens.iter().map(TokenOutput::from).collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if tokens.is_empty() {
        println!("No tokens found.");
        return Ok(());
    }

    println!();
    for token in &tokens {
        println!("  {token}");
    }
    println!();

    Ok(())
}

pub fn run_token_revoke(
    data_dir: String,
    token_id: Option<String>,
    non_interactive: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let token = if let Some(id) = token_id {
        store
            .get_token_by_id(&id)?
            .ok_or_else(|| anyhow::anyhow!("Token not found: {}", id))?
    } else if non_interactive {
        anyhow::bail!("--token-id is required in non-interactive mode");
    } else {
        match pick_token(&store)? {
            Some(token) => token,
            None => return Ok(()),
        }
    };

    let username = resolve_token_username(&store, &token)?;
    let user_label = username.as_deref().unwrap_or("admin");

    let confirmed = confirm_action(
        &format!(
            "Revoke token stash_{}... for user '{}'?",
            &token.token_lookup, user_label
        ),
        yes,
        non_interactive,
    )?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    store.delete_token(&token.id)?;

    println!();
    println!("Token revoked.");
    println!();

    Ok(())
}
