use anyhow::Context as _;
use clap::Parser;
use opsboard_core::{logging, ServerConfig};
use opsboard_domain::User;
use opsboard_server::cli::{Cli, Commands, UserAction};
use opsboard_server::{store, web, Workspace};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(data_file) = cli.data_file {
        config.data_file = data_file;
    }
    if let Some(storage) = cli.storage {
        config.storage = storage;
    }

    let debug_log = std::env::var_os("OPSBOARD_DEBUG_LOG").map(PathBuf::from);
    logging::init(&config.log_filter, debug_log.as_deref())?;

    match cli.command {
        Commands::Serve(args) => {
            if let Some(bind) = args.bind {
                config.bind_address = bind;
            }
            if let Some(root) = args.attachment_root {
                config.attachment_root = Some(root);
            }
            opsboard_server::serve(config).await?;
        }
        Commands::User(user_cmd) => {
            let workspace = Workspace::load(store::open_store(&config)?).await?;
            match user_cmd.action {
                UserAction::Add {
                    name,
                    email,
                    role,
                    allowed_ips,
                    city_ids,
                    board_ids,
                } => {
                    let user = User {
                        allowed_ips,
                        city_ids,
                        board_ids,
                        ..User::new(name, email, role)
                    };
                    let user = workspace.mutate("add user", |s| s.add_user(user)).await?;
                    println!("{}", serde_json::to_string_pretty(&user)?);
                }
                UserAction::List => {
                    let users = workspace.read(|s| Ok(s.users.clone())).await?;
                    println!("{}", serde_json::to_string_pretty(&users)?);
                }
            }
        }
        Commands::Token { user_id, ttl_hours } => {
            config.validate()?;
            let workspace = Workspace::load(store::open_store(&config)?).await?;
            workspace
                .read(|s| Ok(s.user(user_id).cloned()))
                .await?
                .with_context(|| format!("no user with id {}", user_id))?;
            let token = web::auth::issue_token(
                &config.jwt_secret,
                user_id,
                chrono::Duration::hours(ttl_hours),
            )?;
            println!("{}", token);
        }
    }

    Ok(())
}
