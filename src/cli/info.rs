use serde::Serialize;

use crate::store::Store;
use crate::types::Permission;

use super::init_store;
use super::pickers::{list_tokens, list_users};
use super::token::TokenOutput;

#[derive(Serialize)]
struct ServerInfo {
    users: usize,
    users_active: usize,
    tokens: usize,
    files: usize,
    shares: i64,
}

#[derive(Serialize)]
struct UserOutput {
    id: i64,
    name: String,
    email: String,
    active: bool,
    files: usize,
    created_at: String,
}

#[derive(Serialize)]
struct DetailedServerInfo {
    users: Vec<UserOutput>,
    tokens: Vec<TokenOutput>,
    permissions: Vec<Permission>,
    files: usize,
    shares: i64,
}

pub fn run_info(data_dir: String, json: bool) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let users = list_users(&store)?;
    let tokens = list_tokens(&store)?;

    let mut user_outputs = Vec::with_capacity(users.len());
    let mut file_count = 0;
    let mut share_count = 0;

    for display in &users {
        let files = store.list_user_files(display.user.id)?;
        for file in &files {
            share_count += store.count_file_shares(&file.id)?;
        }
        file_count += files.len();

        user_outputs.push(UserOutput {
            id: display.user.id,
            name: display.user.name.clone(),
            email: display.user.email.clone(),
            active: display.user.active,
            files: files.len(),
            created_at: display.user.created_at.to_rfc3339(),
        });
    }

    if json {
        let info = DetailedServerInfo {
            users: user_outputs,
            tokens: tokens.iter().map(TokenOutput::from).collect(),
            permissions: store.list_permissions()?,
            files: file_count,
            shares: share_count,
        };

        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let info = ServerInfo {
            users: users.len(),
            users_active: users.iter().filter(|d| d.user.active).count(),
            tokens: tokens.len(),
            files: file_count,
            shares: share_count,
        };

        println!();
        println!("Stash Server Status");
        println!("{}", "─".repeat(19));
        println!("Users:   {} ({} active)", info.users, info.users_active);
        println!("Tokens:  {}", info.tokens);
        println!("Files:   {}", info.files);
        println!("Shares:  {}", info.shares);
        println!();
    }

    Ok(())
}
