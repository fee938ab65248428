use bevy::log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{RegionConfigError, RegionRules, RuleTarget, MAX_REGION_ID};

// `<Player Restrict Region: 1, 2, 3>`
static LIST_TAG: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"(?i)<(player|event|all)\s+(restrict|allow)\s+region:[ ]*(\d+(?:\s*,\s*\d+)*)>")
});

// `<Event Allow Region: 10 to 20>`
static RANGE_TAG: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"(?i)<(player|event|all)\s+(restrict|allow)\s+region:[ ]*(\d+)[ ]+to[ ]+(\d+)>")
});

fn pattern(
    tag: &'static Lazy<Result<Regex, regex::Error>>,
) -> Result<&'static Regex, RegionConfigError> {
    match &**tag {
        Ok(regex) => Ok(regex),
        Err(error) => Err(RegionConfigError::Pattern(error.to_string())),
    }
}

fn target(mover: &str, rule: &str) -> RuleTarget {
    let restrict = rule.eq_ignore_ascii_case("restrict");
    match mover.to_ascii_lowercase().as_str() {
        "player" if restrict => RuleTarget::PlayerRestrict,
        "player" => RuleTarget::PlayerAllow,
        "event" if restrict => RuleTarget::EventRestrict,
        "event" => RuleTarget::EventAllow,
        _ if restrict => RuleTarget::AllRestrict,
        _ => RuleTarget::AllAllow,
    }
}

/// Tag ids are digit runs; ids past the largest region, including runs too
/// long for a `u32`, can never match a tile.
fn region_id(raw: &str) -> Option<u32> {
    raw.parse().ok().filter(|id| *id <= MAX_REGION_ID)
}

/// Adds every region tag found in a map's note to `rules`.
pub fn apply_map_note(note: &str, rules: &mut RegionRules) -> Result<usize, RegionConfigError> {
    let list = pattern(&LIST_TAG)?;
    let range = pattern(&RANGE_TAG)?;
    let mut applied = 0;

    for line in note.lines() {
        for caps in range.captures_iter(line) {
            let Some(start) = region_id(&caps[3]) else {
                warn!("skipping `{}`: region {} is out of range", &caps[0], &caps[3]);
                continue;
            };
            let end = region_id(&caps[4]).unwrap_or(MAX_REGION_ID);
            rules.add(target(&caps[1], &caps[2]), start..=end);
            applied += 1;
        }
        for caps in list.captures_iter(line) {
            let ids = caps[3].split(',').map(str::trim).filter_map(|raw| {
                let id = region_id(raw);
                if id.is_none() {
                    warn!("ignoring region {raw} in `{}`: out of range", &caps[0]);
                }
                id
            });
            rules.add(target(&caps[1], &caps[2]), ids);
            applied += 1;
        }
    }

    Ok(applied)
}
