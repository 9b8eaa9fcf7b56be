//! `team teams ...`: standard team templates

use anyhow::{bail, Result};
use colored::Colorize;
use console::Term;
use dialoguer::Select;
use team_store::TeamTemplate;

use crate::context::AppContext;

pub fn list(ctx: &AppContext) -> Result<()> {
    ctx.print_header("Standard teams");
    let active = ctx.agents.active_template_id();

    for template in ctx.agents.standard_teams() {
        let marker = if active.as_deref() == Some(template.id) {
            "●".bright_green().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {} {} {}",
            marker,
            template.icon,
            template.name.bold(),
            format!("[{}]", template.id).dimmed()
        );
        println!("     {}", template.description);
        println!("     {}", template.roles.join(", ").bright_blue());
    }
    Ok(())
}

pub fn create(ctx: &AppContext, template_id: Option<&str>) -> Result<()> {
    let template = match template_id {
        Some(id) => id.to_string(),
        None => pick_template(ctx)?.id.to_string(),
    };

    let replacing = ctx.agents.agents().len();
    if replacing > 0
        && !ctx.confirm(
            &format!("This replaces the current {} agents. Continue?", replacing),
            false,
        )?
    {
        return Ok(());
    }

    if !ctx.agents.create_standard_team(&template) {
        bail!("Unknown team template '{}'", template);
    }

    let agents = ctx.agents.agents();
    ctx.print_success(&format!("Created team '{}' with {} agents", template, agents.len()));
    for agent in agents {
        println!("  #{} {} ({})", agent.id, agent.name, agent.role);
    }
    Ok(())
}

fn pick_template(ctx: &AppContext) -> Result<&'static TeamTemplate> {
    let templates = ctx.agents.standard_teams();
    let items: Vec<String> = templates
        .iter()
        .map(|t| format!("{} {} - {}", t.icon, t.name, t.description))
        .collect();

    let selection = Select::with_theme(&ctx.theme())
        .with_prompt("Which team?")
        .items(&items)
        .default(0)
        .interact_on(&Term::stderr())?;

    Ok(&templates[selection])
}
