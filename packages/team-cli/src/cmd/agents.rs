//! `team agents ...` and `team approver ...`

use anyhow::{bail, Result};
use colored::Colorize;
use team_store::{Agent, AgentRole};

use crate::context::AppContext;

pub fn list(ctx: &AppContext) -> Result<()> {
    let agents = ctx.agents.agents();
    ctx.print_header(&format!("AI agents ({})", agents.len()));

    if agents.is_empty() {
        println!("  {}", "No agents yet. Add one with `team agents add <role>`.".dimmed());
        return Ok(());
    }

    for agent in &agents {
        print_agent(agent);
    }
    if let Some(template) = ctx.agents.active_template_id() {
        println!();
        println!("  {} {}", "template:".dimmed(), template);
    }
    Ok(())
}

fn print_agent(agent: &Agent) {
    println!(
        "  {:>3}  {:<22} {:<16} {} {:.1}  {} {}",
        agent.id.to_string().bright_cyan(),
        agent.name.bold(),
        agent.role,
        "temp".dimmed(),
        agent.temperature,
        "messages".dimmed(),
        agent.conversation_history.len()
    );
}

pub fn add(ctx: &AppContext, role: &str, name: Option<&str>, random_name: bool) -> Result<()> {
    let role = parse_role(role)?;
    let suggested = random_name.then(|| ctx.agents.suggested_name());
    let agent = ctx.agents.add_agent(role.as_str(), name.or(suggested));
    ctx.print_success(&format!("Added {} ({}) as #{}", agent.name, agent.role, agent.id));
    Ok(())
}

pub fn remove(ctx: &AppContext, id: u64) -> Result<()> {
    if !ctx.agents.remove_agent(id) {
        bail!("No agent with id {}", id);
    }
    ctx.print_success(&format!("Removed agent #{}", id));
    Ok(())
}

pub fn rename(ctx: &AppContext, id: u64, name: &str) -> Result<()> {
    if ctx.agents.agent(id).is_none() {
        bail!("No agent with id {}", id);
    }
    if !ctx.agents.update_agent_name(id, name) {
        bail!("Name cannot be empty");
    }
    ctx.print_success(&format!("Agent #{} is now {}", id, name.trim()));
    Ok(())
}

pub fn temperature(ctx: &AppContext, id: u64, value: f32) -> Result<()> {
    if ctx.agents.agent(id).is_none() {
        bail!("No agent with id {}", id);
    }
    if !ctx.agents.update_agent_temperature(id, value) {
        bail!("Temperature must be between 0.0 and 1.0");
    }
    ctx.print_success(&format!("Agent #{} temperature set to {:.2}", id, value));
    Ok(())
}

pub fn clear(ctx: &AppContext) -> Result<()> {
    let count = ctx.agents.agents().len();
    if count == 0 {
        ctx.print_warning("No agents to remove");
        return Ok(());
    }
    if !ctx.confirm(&format!("Remove all {} agents?", count), false)? {
        return Ok(());
    }
    ctx.agents.clear_all_agents();
    ctx.print_success(&format!("Removed {} agents", count));
    Ok(())
}

pub fn roles(ctx: &AppContext) -> Result<()> {
    ctx.print_header("Agent roles");
    for role in ctx.agents.roles() {
        println!("  {}", role);
    }
    Ok(())
}

pub fn show_approver(ctx: &AppContext) -> Result<()> {
    let approver = ctx.agents.approver();
    println!("{} {} ({})", "Approver:".bold(), approver.name, approver.id.dimmed());
    Ok(())
}

pub fn rename_approver(ctx: &AppContext, name: &str) -> Result<()> {
    if !ctx.agents.update_approver_name(name) {
        bail!("Name cannot be empty");
    }
    ctx.print_success(&format!("Approver is now {}", name.trim()));
    Ok(())
}

pub(crate) fn parse_role(role: &str) -> Result<AgentRole> {
    match role.parse::<AgentRole>() {
        Ok(role) => Ok(role),
        Err(e) => {
            let known: Vec<&str> = AgentRole::ALL.iter().map(AgentRole::as_str).collect();
            bail!("{} (expected one of: {})", e, known.join(", "))
        }
    }
}
