use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::server::validation::validate_file_name;
use crate::store::Store;
use crate::types::File;

use super::init_store;
use super::pickers::list_files;

#[derive(Serialize)]
struct FileOutput {
    id: String,
    name: String,
    owner_id: i64,
    size_bytes: i64,
    shares: i64,
    created_at: String,
}

pub fn run_file_add(
    data_dir: String,
    name: String,
    owner_id: i64,
    size_bytes: i64,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let name = name.trim().to_string();
    validate_file_name(&name).map_err(anyhow::Error::msg)?;
    if size_bytes < 0 {
        anyhow::bail!("--size-bytes cannot be negative");
    }

    let owner = store
        .get_user(owner_id)?
        .ok_or_else(|| anyhow::anyhow!("User not found: {}", owner_id))?;

    let now = Utc::now();
    let file = File {
        id: Uuid::new_v4().to_string(),
        name,
        created_by: owner.id,
        size_bytes,
        created_at: now,
        updated_at: now,
    };
    store.create_file(&file)?;

    println!();
    println!("Registered file \"{}\" for '{}'", file.name, owner.name);
    println!("  id: {}", file.id);
    println!();

    Ok(())
}

pub fn run_file_list(data_dir: String, owner_id: i64, json: bool) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    if store.get_user(owner_id)?.is_none() {
        anyhow::bail!("User not found: {}", owner_id);
    }

    let files = list_files(&store, owner_id)?;

    if json {
        let output: Vec<FileOutput> = files
            .iter()
            .map(|d| FileOutput {
                id: d.file.id.clone(),
                name: d.file.name.clone(),
                owner_id: d.file.created_by,
                size_bytes: d.file.size_bytes,
                shares: d.shares,
                created_at: d.file.created_at.to_rfc3339(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if files.is_empty() {
        println!("No files found.");
        return Ok(());
    }

    println!();
    for file in &files {
        println!("  {file}");
    }
    println!();

    Ok(())
}
