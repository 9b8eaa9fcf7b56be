//! Name suggestions for new agents.
//!
//! Availability is derived from the names currently on the team rather than
//! tracked separately, so it can never drift from the store.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

pub const NAME_POOL: &[&str] = &[
    "Sarah Chen",
    "Marcus Rodriguez",
    "Priya Patel",
    "James Williams",
    "Emily Johnson",
    "David Kim",
    "Maria Garcia",
    "Alex Thompson",
    "Jessica Martinez",
    "Diksha Yadav",
    "Michael Lee",
    "Rachel Cohen",
    "Kevin Zhang",
    "Aisha Osman",
    "Chris Anderson",
    "Nina Sharma",
    "Ryan O'Brien",
    "Jasmine Wong",
    "Daniel Brown",
    "Sophia Nguyen",
    "Tyler Jackson",
    "Maya Desai",
    "Jordan Taylor",
    "Lauren Davis",
    "Eric Wilson",
    "Samantha Moore",
    "Brandon Harris",
    "Olivia Martin",
    "Justin Clark",
];

/// Pool names not used by any of `taken`.
pub fn available_names<'a>(taken: impl IntoIterator<Item = &'a str>) -> Vec<&'static str> {
    let taken: HashSet<&str> = taken.into_iter().collect();
    NAME_POOL
        .iter()
        .copied()
        .filter(|name| !taken.contains(name))
        .collect()
}

/// Pick a random unused pool name; any pool name once all are taken.
pub fn suggest_name<'a, R: Rng + ?Sized>(
    taken: impl IntoIterator<Item = &'a str>,
    rng: &mut R,
) -> &'static str {
    let available = available_names(taken);
    let pool: &[&'static str] = if available.is_empty() {
        NAME_POOL
    } else {
        &available
    };
    pool.choose(rng).copied().unwrap_or(NAME_POOL[0])
}
