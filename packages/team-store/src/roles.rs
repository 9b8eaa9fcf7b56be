//! Fixed role labels.
//!
//! Stores keep roles as plain strings; these enums are the sets offered to
//! callers when they pick a role.

use std::fmt;
use std::str::FromStr;

/// Roles an agent can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    DataAnalyst,
    ProjectManager,
    MartechUser,
    MartechManager,
    Architect,
    DataEngineer,
}

impl AgentRole {
    pub const ALL: [AgentRole; 6] = [
        AgentRole::DataAnalyst,
        AgentRole::ProjectManager,
        AgentRole::MartechUser,
        AgentRole::MartechManager,
        AgentRole::Architect,
        AgentRole::DataEngineer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::DataAnalyst => "Data Analyst",
            AgentRole::ProjectManager => "Project Manager",
            AgentRole::MartechUser => "Martech User",
            AgentRole::MartechManager => "Martech Manager",
            AgentRole::Architect => "Architect",
            AgentRole::DataEngineer => "Data Engineer",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentRole::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Roles a team member can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamMemberRole {
    Developer,
    Designer,
    Manager,
    Analyst,
}

impl TeamMemberRole {
    pub const ALL: [TeamMemberRole; 4] = [
        TeamMemberRole::Developer,
        TeamMemberRole::Designer,
        TeamMemberRole::Manager,
        TeamMemberRole::Analyst,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamMemberRole::Developer => "Developer",
            TeamMemberRole::Designer => "Designer",
            TeamMemberRole::Manager => "Manager",
            TeamMemberRole::Analyst => "Analyst",
        }
    }
}

impl fmt::Display for TeamMemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamMemberRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TeamMemberRole::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);
