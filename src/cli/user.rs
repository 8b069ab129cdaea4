use inquire::{Confirm, Text};
use serde::Serialize;

use crate::auth::TokenGenerator;
use crate::error::Error;
use crate::server::validation::{validate_email, validate_user_name};
use crate::store::Store;
use crate::types::NewUser;

use super::init_store;
use super::pickers::{
    confirm_action, create_token_for_user, get_or_pick_user, list_users, pick_expiration,
};

#[derive(Serialize)]
struct UserOutput {
    id: i64,
    name: String,
    email: String,
    active: bool,
    created_at: String,
}

fn prompt_validated(
    label: &str,
    validate: fn(&str) -> Result<(), String>,
) -> anyhow::Result<String> {
    Ok(Text::new(label)
        .with_validator(move |input: &str| {
            Ok(validate(input.trim())
                .map(|()| inquire::validator::Validation::Valid)
                .unwrap_or_else(|e| inquire::validator::Validation::Invalid(e.into())))
        })
        .prompt()?
        .trim()
        .to_string())
}

fn resolve_field(
    value: Option<String>,
    flag: &str,
    label: &str,
    validate: fn(&str) -> Result<(), String>,
    non_interactive: bool,
) -> anyhow::Result<String> {
    if let Some(value) = value {
        let value = value.trim().to_string();
        validate(&value).map_err(anyhow::Error::msg)?;
        Ok(value)
    } else if non_interactive {
        anyhow::bail!("{flag} is required in non-interactive mode");
    } else {
        prompt_validated(label, validate)
    }
}

pub fn run_user_add(
    data_dir: String,
    name: Option<String>,
    email: Option<String>,
    create_token_flag: bool,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let name = resolve_field(name, "--name", "Name:", validate_user_name, non_interactive)?;
    let email = resolve_field(email, "--email", "Email:", validate_email, non_interactive)?;

    let user = match store.create_user(&NewUser { name, email }) {
        Ok(user) => user,
        Err(Error::AlreadyExists) => anyhow::bail!("A user with that email already exists"),
        Err(e) => return Err(e.into()),
    };

    println!();
    println!(
        "Created user \"{}\" <{}> with id {}",
        user.name, user.email, user.id
    );

    let should_create_token = if create_token_flag {
        true
    } else if non_interactive {
        false
    } else {
        Confirm::new("Create access token?")
            .with_default(true)
            .prompt()?
    };

    if should_create_token {
        let expires_in = if non_interactive {
            None
        } else {
            match pick_expiration()? {
                Some(exp) => exp,
                None => {
                    println!("Token creation cancelled.");
                    return Ok(());
                }
            }
        };

        let generator = TokenGenerator::new();
        let issued = create_token_for_user(&generator, user.id, expires_in)?;
        store.create_token(&issued.token)?;

        println!();
        println!("Token created: {}", issued.raw);
        println!("  Save this now - it cannot be retrieved later.");
    }

    println!();

    Ok(())
}

pub fn run_user_list(data_dir: String, json: bool) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let users = list_users(&store)?;

    if json {
        let output: Vec<UserOutput> = users
            .iter()
            .map(|d| UserOutput {
                id: d.user.id,
                name: d.user.name.clone(),
                email: d.user.email.clone(),
                active: d.user.active,
                created_at: d.user.created_at.to_rfc3339(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!();
    for user in &users {
        println!("  {user}");
    }
    println!();

    Ok(())
}

pub fn run_user_deactivate(
    data_dir: String,
    user_id: Option<i64>,
    non_interactive: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let Some(user) = get_or_pick_user(&store, user_id, non_interactive)? else {
        return Ok(());
    };

    if !user.active {
        println!("User '{}' is already inactive.", user.name);
        return Ok(());
    }

    let confirmed = confirm_action(
        &format!(
            "Deactivate user '{}'? Their tokens stop working and they can no longer receive shares.",
            user.name
        ),
        yes,
        non_interactive,
    )?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    store.set_user_active(user.id, false)?;

    println!();
    println!("Deactivated user '{}'", user.name);
    println!();

    Ok(())
}
