//! Management commands for the YaMDb schema.

use clap::{Args, Parser, Subcommand};

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "yamdb", version, about = "Manage the YaMDb database")]
pub struct Cli {
    /// Database connection string
    #[arg(long, global = true, env = "DATABASE_URL", value_name = "URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply pending schema migrations
    Migrate,
    /// Create a regular user
    Createuser(UserArgs),
    /// Create a user with the admin role
    Createsuperuser(UserArgs),
    /// Create a user with the moderator role
    Createstaff(UserArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UserArgs {
    #[arg(long, value_name = "EMAIL")]
    pub email: String,

    #[arg(long, value_name = "USERNAME")]
    pub username: String,

    /// Leave unset to create an account without a usable password
    #[arg(long, value_name = "PASSWORD")]
    pub password: Option<String>,

    #[arg(long)]
    pub bio: Option<String>,
}
