//! Standard team templates.

use serde::Serialize;

/// A preset team: one agent per listed role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub roles: &'static [&'static str],
}

pub const STANDARD_TEAMS: &[TeamTemplate] = &[
    TeamTemplate {
        id: "data-migration",
        name: "Data Migration Project",
        description: "Migrate data from legacy systems to modern platforms",
        icon: "🔀",
        roles: &["Data Engineer", "Data Analyst", "Architect", "Project Manager"],
    },
    TeamTemplate {
        id: "marketing-campaign",
        name: "Marketing Campaign",
        description: "Plan and execute marketing campaigns with analytics",
        icon: "📊",
        roles: &["Martech Manager", "Martech User", "Data Analyst", "Project Manager"],
    },
    TeamTemplate {
        id: "analytics-dashboard",
        name: "Analytics Dashboard",
        description: "Build comprehensive data analytics and reporting dashboards",
        icon: "📈",
        roles: &["Data Analyst", "Data Engineer", "Architect"],
    },
    TeamTemplate {
        id: "platform-integration",
        name: "Platform Integration",
        description: "Integrate multiple platforms and ensure data consistency",
        icon: "🔌",
        roles: &["Architect", "Data Engineer", "Martech Manager", "Project Manager"],
    },
    TeamTemplate {
        id: "data-analysis",
        name: "Data Analysis & Insights",
        description: "Analyze data to derive actionable business insights",
        icon: "🔍",
        roles: &["Data Analyst", "Data Engineer"],
    },
    TeamTemplate {
        id: "full-stack",
        name: "Full Stack Team",
        description: "Complete team with all roles for complex projects",
        icon: "🚀",
        roles: &[
            "Project Manager",
            "Architect",
            "Data Engineer",
            "Data Analyst",
            "Martech Manager",
            "Martech User",
        ],
    },
];

pub fn find_template(id: &str) -> Option<&'static TeamTemplate> {
    STANDARD_TEAMS.iter().find(|t| t.id == id)
}
