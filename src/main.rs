use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use stash::auth::TokenGenerator;
use stash::cli::{
    AdminCommands, FileCommands, TokenCommands, UserCommands, run_file_add, run_file_list,
    run_info, run_token_create, run_token_list, run_token_revoke, run_user_add,
    run_user_deactivate, run_user_list,
};
use stash::config::{DEFAULT_LOG_FILTER, ServerConfig};
use stash::server::validation::{validate_email, validate_user_name};
use stash::server::{AppState, create_router};
use stash::store::{SqliteStore, Store};
use stash::types::NewUser;

#[cfg(unix)]
fn set_restrictive_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "stash")]
#[command(about = "A file sharing permissions server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to [default: 127.0.0.1]
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to [default: 8080]
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database [default: ./data]
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// TOML config file; flags given on the command line take precedence
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run_init(data_dir: String, non_interactive: bool) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir: data_dir.into(),
        ..ServerConfig::default()
    };
    fs::create_dir_all(&config.data_dir)?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let token_file = config.admin_token_path();

    if store.has_admin_token()? {
        bail!(
            "Server already initialized. Admin token exists at: {}",
            token_file.display()
        );
    }

    let generator = TokenGenerator::new();
    let issued = generator.issue(None, None)?;

    store.create_token(&issued.token)?;
    fs::write(&token_file, &issued.raw)?;

    #[cfg(unix)]
    set_restrictive_permissions(&token_file);

    println!();
    println!("========================================");
    println!("Admin token (save this, it won't be shown again):");
    println!();
    println!("  {}", issued.raw);
    println!();
    println!("Token also written to: {}", token_file.display());
    println!("========================================");
    println!();

    if !non_interactive {
        create_default_user_prompt(&store, &generator)?;
    }

    Ok(())
}

fn create_default_user_prompt(store: &SqliteStore, generator: &TokenGenerator) -> anyhow::Result<()> {
    let create_user = inquire::Confirm::new("Would you like to create a default user?")
        .with_default(false)
        .prompt()?;

    if !create_user {
        return Ok(());
    }

    let name = inquire::Text::new("Name:")
        .with_validator(|input: &str| {
            Ok(validate_user_name(input.trim())
                .map(|()| inquire::validator::Validation::Valid)
                .unwrap_or_else(|e| inquire::validator::Validation::Invalid(e.into())))
        })
        .prompt()?;

    let email = inquire::Text::new("Email:")
        .with_validator(|input: &str| {
            Ok(validate_email(input.trim())
                .map(|()| inquire::validator::Validation::Valid)
                .unwrap_or_else(|e| inquire::validator::Validation::Invalid(e.into())))
        })
        .prompt()?;

    let user = store.create_user(&NewUser {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
    })?;

    let issued = generator.issue(Some(user.id), None)?;
    store.create_token(&issued.token)?;

    println!();
    println!("========================================");
    println!("Created user '{}' (id {}) with token:", user.name, user.id);
    println!();
    println!("  {}", issued.raw);
    println!();
    println!("========================================");
    println!();

    Ok(())
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let token_file = config.admin_token_path();
    if !token_file.exists() {
        bail!(
            "Server not initialized. Run 'stash admin init' first to create the database and admin token."
        );
    }

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;
    if !store.has_admin_token()? {
        bail!(
            "Server not initialized. Run 'stash admin init' first to create the database and admin token."
        );
    }

    info!("Admin token available at {}", token_file.display());

    let state = Arc::new(AppState::new(Arc::new(store)));

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
            config,
        } => {
            let mut server_config = ServerConfig::load(config.as_deref())?;
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            if let Some(data_dir) = data_dir {
                server_config.data_dir = data_dir;
            }

            init_tracing(&server_config.log_filter)?;
            run_serve(server_config).await?;
        }
        Commands::Admin { command } => {
            init_tracing(DEFAULT_LOG_FILTER)?;

            match command {
                AdminCommands::Init {
                    data_dir,
                    non_interactive,
                } => run_init(data_dir, non_interactive)?,
                AdminCommands::User { command } => match command {
                    UserCommands::Add {
                        data_dir,
                        name,
                        email,
                        create_token,
                        non_interactive,
                    } => run_user_add(data_dir, name, email, create_token, non_interactive)?,
                    UserCommands::List { data_dir, json } => run_user_list(data_dir, json)?,
                    UserCommands::Deactivate {
                        data_dir,
                        user_id,
                        non_interactive,
                        yes,
                    } => run_user_deactivate(data_dir, user_id, non_interactive, yes)?,
                },
                AdminCommands::Token { command } => match command {
                    TokenCommands::Create {
                        data_dir,
                        user_id,
                        expires_days,
                        non_interactive,
                    } => run_token_create(data_dir, user_id, expires_days, non_interactive)?,
                    TokenCommands::List { data_dir, json } => run_token_list(data_dir, json)?,
                    TokenCommands::Revoke {
                        data_dir,
                        token_id,
                        non_interactive,
                        yes,
                    } => run_token_revoke(data_dir, token_id, non_interactive, yes)?,
                },
                AdminCommands::File { command } => match command {
                    FileCommands::Add {
                        data_dir,
                        name,
                        owner_id,
                        size_bytes,
                    } => run_file_add(data_dir, name, owner_id, size_bytes)?,
                    FileCommands::List {
                        data_dir,
                        owner_id,
                        json,
                    } => run_file_list(data_dir, owner_id, json)?,
                },
                AdminCommands::Info { data_dir, json } => run_info(data_dir, json)?,
            }
        }
    }

    Ok(())
}
