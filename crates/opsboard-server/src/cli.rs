use clap::{Args, Parser, Subcommand};
use opsboard_core::StorageBackend;
use opsboard_domain::{BoardId, CityId, Role, UserId};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "opsboard")]
#[command(about = "Board, card ordering and activity trail service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the per-user config location)
    #[arg(long, global = true, env = "OPSBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data file, overriding the configured one
    #[arg(long, global = true, env = "OPSBOARD_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Storage backend: json or sqlite
    #[arg(long, global = true, env = "OPSBOARD_STORAGE", value_parser = parse_storage)]
    pub storage: Option<StorageBackend>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// User administration
    User(UserCommand),
    /// Sign a bearer token for a user
    Token {
        #[arg(long)]
        user_id: UserId,
        /// Lifetime in hours
        #[arg(long, default_value_t = 24)]
        ttl_hours: i64,
    },
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "OPSBOARD_BIND")]
    pub bind: Option<SocketAddr>,

    /// Directory attachments are served from
    #[arg(long, env = "OPSBOARD_ATTACHMENT_ROOT")]
    pub attachment_root: Option<PathBuf>,
}

#[derive(Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Add a user to the store
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// superadmin, admin, subadmin, counsellor or user
        #[arg(long)]
        role: Role,
        /// Source address the user may call from; repeatable
        #[arg(long = "allowed-ip")]
        allowed_ips: Vec<IpAddr>,
        /// City the user belongs to; repeatable
        #[arg(long = "city-id")]
        city_ids: Vec<CityId>,
        /// Board assigned to the user; repeatable
        #[arg(long = "board-id")]
        board_ids: Vec<BoardId>,
    },
    /// List users in the store
    List,
}

fn parse_storage(value: &str) -> Result<StorageBackend, String> {
    match value.to_lowercase().as_str() {
        "json" => Ok(StorageBackend::Json),
        "sqlite" => Ok(StorageBackend::Sqlite),
        other => Err(format!("unknown storage backend '{other}' (expected json or sqlite)")),
    }
}
