use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "blogcms",
    about = "Blog CMS: a small themed blog with an admin area",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the web server
    Serve(ServeArgs),
    /// Hash an admin password for ADMIN_PASSWORD_HASH
    HashPassword(HashPasswordArgs),
    /// Export all posts as JSON
    Export(ExportArgs),
    /// Import posts from a JSON export
    Import(ImportArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the bind address
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Args)]
pub struct HashPasswordArgs {
    /// Password to hash; prompted on stdin when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct ExportArgs {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://blog.db")]
    pub database: String,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://blog.db")]
    pub database: String,
    pub file: PathBuf,
}
