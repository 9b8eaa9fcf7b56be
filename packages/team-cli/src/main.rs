//! Team builder CLI
//!
//! Assemble a team of role-specific AI agents, keep track of the humans on
//! the team, and chat with agents through the streaming proxy.

mod cmd;
mod context;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::context::AppContext;

#[derive(Parser)]
#[command(name = "team")]
#[command(about = "Build a team of AI agents and chat with them")]
struct Cli {
    /// Directory holding the persisted team
    #[arg(long, env = "TEAM_DATA_DIR", default_value = ".team-data", global = true)]
    data_dir: PathBuf,

    /// Chat proxy base URL
    #[arg(long, env = "BACKEND_URL", default_value = "http://localhost:3000", global = true)]
    backend: String,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage AI agents
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },

    /// Standard team templates
    Teams {
        #[command(subcommand)]
        command: TeamCommands,
    },

    /// The human who approves agent work
    Approver {
        #[command(subcommand)]
        command: ApproverCommands,
    },

    /// Manage human team members
    Members {
        #[command(subcommand)]
        command: MemberCommands,
    },

    /// Show (or clear) an agent's conversation
    History {
        id: u64,
        #[arg(long)]
        clear: bool,
    },

    /// Send a message to an agent and stream the reply
    Chat {
        id: u64,
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Check that the chat proxy is reachable
    Health,
}

#[derive(Subcommand)]
enum AgentCommands {
    /// List agents
    List,

    /// List the roles an agent can take
    Roles,

    /// Add an agent
    Add {
        role: String,
        #[arg(long)]
        name: Option<String>,
        /// Pick an unused name from the name pool
        #[arg(long, conflicts_with = "name")]
        random_name: bool,
    },

    /// Remove an agent
    Remove { id: u64 },

    /// Rename an agent
    Rename { id: u64, name: String },

    /// Set an agent's temperature (0.0 - 1.0)
    Temperature { id: u64, value: f32 },

    /// Remove every agent
    Clear,
}

#[derive(Subcommand)]
enum TeamCommands {
    /// List the standard teams
    List,

    /// Replace the current agents with a standard team
    Create {
        /// Template id; prompts when omitted
        id: Option<String>,
    },
}

#[derive(Subcommand)]
enum ApproverCommands {
    Show,
    Rename { name: String },
}

#[derive(Subcommand)]
enum MemberCommands {
    List,
    Add {
        role: String,
        #[arg(long)]
        name: Option<String>,
    },
    Remove { id: u64 },
    Rename { id: u64, name: String },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Store warnings go to stderr; RUST_LOG=debug for more
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = AppContext::new(&cli.data_dir, &cli.backend, cli.yes);
    tracing::debug!(data_dir = %ctx.data_dir.display(), "Team loaded");

    match cli.command {
        Commands::Agents { command } => match command {
            AgentCommands::List => cmd::agents::list(&ctx),
            AgentCommands::Roles => cmd::agents::roles(&ctx),
            AgentCommands::Add {
                role,
                name,
                random_name,
            } => cmd::agents::add(&ctx, &role, name.as_deref(), random_name),
            AgentCommands::Remove { id } => cmd::agents::remove(&ctx, id),
            AgentCommands::Rename { id, name } => cmd::agents::rename(&ctx, id, &name),
            AgentCommands::Temperature { id, value } => cmd::agents::temperature(&ctx, id, value),
            AgentCommands::Clear => cmd::agents::clear(&ctx),
        },
        Commands::Teams { command } => match command {
            TeamCommands::List => cmd::teams::list(&ctx),
            TeamCommands::Create { id } => cmd::teams::create(&ctx, id.as_deref()),
        },
        Commands::Approver { command } => match command {
            ApproverCommands::Show => cmd::agents::show_approver(&ctx),
            ApproverCommands::Rename { name } => cmd::agents::rename_approver(&ctx, &name),
        },
        Commands::Members { command } => match command {
            MemberCommands::List => cmd::members::list(&ctx),
            MemberCommands::Add { role, name } => cmd::members::add(&ctx, &role, name.as_deref()),
            MemberCommands::Remove { id } => cmd::members::remove(&ctx, id),
            MemberCommands::Rename { id, name } => cmd::members::rename(&ctx, id, &name),
        },
        Commands::History { id, clear } => cmd::chat::history(&ctx, id, clear),
        Commands::Chat { id, message } => cmd::chat::chat(&ctx, id, &message.join(" ")).await,
        Commands::Health => cmd::chat::health(&ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_chat_joins_message_words() {
        let cli = Cli::try_parse_from(["team", "chat", "3", "plan", "the", "sprint"]).unwrap();
        match cli.command {
            Commands::Chat { id, message } => {
                assert_eq!(id, 3);
                assert_eq!(message.join(" "), "plan the sprint");
            }
            _ => panic!("expected chat"),
        }
    }
}
