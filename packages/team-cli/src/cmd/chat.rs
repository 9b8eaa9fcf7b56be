//! `team chat`, `team history` and `team health`

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use team_store::{ChatController, Sender};

use crate::context::AppContext;

pub async fn chat(ctx: &AppContext, id: u64, message: &str) -> Result<()> {
    let controller = ChatController::new(Arc::clone(&ctx.agents), Arc::new(ctx.proxy()));
    if !controller.select(id) {
        bail!("No agent with id {}", id);
    }
    let agent = controller
        .selected_agent()
        .context("Agent disappeared while starting the chat")?;

    println!("{} {}", "You:".bold(), message.trim());
    print!("{} ", format!("{}:", agent.name).bright_cyan().bold());
    std::io::stdout().flush()?;

    let mut stdout = std::io::stdout();
    let result = controller
        .send(message, |chunk| {
            let _ = write!(stdout, "{}", chunk);
            let _ = stdout.flush();
        })
        .await;
    println!();

    result.with_context(|| format!("Chat with {} failed", agent.name))?;
    Ok(())
}

pub fn history(ctx: &AppContext, id: u64, clear: bool) -> Result<()> {
    let agent = ctx
        .agents
        .agent(id)
        .with_context(|| format!("No agent with id {}", id))?;

    if clear {
        ctx.agents.clear_conversation_history(id);
        ctx.print_success(&format!("Cleared conversation with {}", agent.name));
        return Ok(());
    }

    ctx.print_header(&format!("Conversation with {} ({})", agent.name, agent.role));
    if agent.conversation_history.is_empty() {
        println!("  {}", "No messages yet.".dimmed());
    }
    for message in &agent.conversation_history {
        let time = message.timestamp.format("%H:%M").to_string();
        let who = match message.sender {
            Sender::User => "You".bold(),
            Sender::Agent => agent.name.bright_cyan().bold(),
            Sender::System => "system".red(),
        };
        println!("  {} {} {}", time.dimmed(), who, message.text);
    }
    Ok(())
}

pub async fn health(ctx: &AppContext) -> Result<()> {
    match ctx.proxy().health().await {
        Ok(true) => {
            ctx.print_success(&format!("Chat proxy at {} is up", ctx.backend_url));
            Ok(())
        }
        Ok(false) => bail!("Chat proxy at {} is unhealthy", ctx.backend_url),
        Err(e) => Err(e).with_context(|| format!("Chat proxy at {} is unreachable", ctx.backend_url)),
    }
}
