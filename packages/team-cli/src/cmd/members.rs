//! `team members ...`: the humans on the team

use anyhow::{bail, Result};
use colored::Colorize;
use team_store::TeamMemberRole;

use crate::context::AppContext;

pub fn list(ctx: &AppContext) -> Result<()> {
    let members = ctx.members.members();
    ctx.print_header(&format!("Team members ({})", members.len()));

    if members.is_empty() {
        println!("  {}", "No team members yet.".dimmed());
    }
    for member in members {
        println!(
            "  {:>3}  {:<22} {:<10} {}",
            member.id.to_string().bright_cyan(),
            member.name.bold(),
            member.role,
            member.created_at.format("%Y-%m-%d").to_string().dimmed()
        );
    }
    Ok(())
}

pub fn add(ctx: &AppContext, role: &str, name: Option<&str>) -> Result<()> {
    let role = match role.parse::<TeamMemberRole>() {
        Ok(role) => role,
        Err(e) => {
            let known: Vec<&str> = ctx.members.roles();
            bail!("{} (expected one of: {})", e, known.join(", "))
        }
    };
    let member = ctx.members.add_member(role.as_str(), name);
    ctx.print_success(&format!("Added {} ({}) as #{}", member.name, member.role, member.id));
    Ok(())
}

pub fn remove(ctx: &AppContext, id: u64) -> Result<()> {
    if !ctx.members.remove_member(id) {
        bail!("No team member with id {}", id);
    }
    ctx.print_success(&format!("Removed team member #{}", id));
    Ok(())
}

pub fn rename(ctx: &AppContext, id: u64, name: &str) -> Result<()> {
    if ctx.members.member(id).is_none() {
        bail!("No team member with id {}", id);
    }
    if !ctx.members.update_member_name(id, name) {
        bail!("Name cannot be empty");
    }
    ctx.print_success(&format!("Team member #{} is now {}", id, name.trim()));
    Ok(())
}
