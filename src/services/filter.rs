//! Hard-constraint matching of trails against a preference profile.

use std::collections::HashSet;

use crate::models::{PreferenceProfile, Trail};

/// Whether `trail` satisfies every hard constraint in `profile`.
pub fn matches(trail: &Trail, profile: &PreferenceProfile) -> bool {
    if trail.difficulty() > profile.preferred_difficulty() {
        return false;
    }

    if !(profile.min_length()..=profile.max_length()).contains(&trail.length_km()) {
        return false;
    }

    if trail.rating() < profile.min_rating() {
        return false;
    }

    if !profile
        .preferred_time_range()
        .contains(trail.estimated_time_hours())
    {
        return false;
    }

    let city = profile.preferred_city();
    if !city.is_umbrella() && !city.matches_region(trail.region()) {
        return false;
    }

    true
}

/// Filter `trails` in order, keeping one trail per name.
///
/// Only the first record carrying a given name is ever considered. A later
/// record with the same name is dropped even when the first one fails the
/// profile and the later one would pass.
pub fn filter_all<'a, I>(trails: I, profile: &PreferenceProfile) -> Vec<&'a Trail>
where
    I: IntoIterator<Item = &'a Trail>,
{
    let mut seen_names: HashSet<&'a str> = HashSet::new();
    let mut matched = Vec::new();
    for trail in trails {
        if !seen_names.insert(trail.name()) {
            continue;
        }
        if matches(trail, profile) {
            matched.push(trail);
        }
    }
    matched
}
