//! Region-based passability overrides for map movement.
//!
//! Each map tile carries a region id. Rules from plugin parameters and map
//! notetags restrict or allow movement onto tiles of given regions, per mover
//! kind, before the engine's own tile passability is consulted.

use std::{collections::BTreeSet, error::Error, fmt};

use bevy::prelude::Resource;

use crate::config::{ParameterError, PluginParameters};

pub mod notetags;

pub use notetags::apply_map_note;

/// Region ids range over 0..=255 and 0 means "no region".
pub const MAX_REGION_ID: u32 = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionConfigError {
    InvalidParameter(ParameterError),
    Pattern(String),
}

impl fmt::Display for RegionConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(err) => write!(f, "invalid region parameter: {err}"),
            Self::Pattern(err) => write!(f, "region notetag pattern failed to compile: {err}"),
        }
    }
}

impl Error for RegionConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTarget {
    PlayerRestrict,
    EventRestrict,
    AllRestrict,
    PlayerAllow,
    EventAllow,
    AllAllow,
}

const PARAMETER_TARGETS: [(&str, RuleTarget); 6] = [
    ("All Restrict", RuleTarget::AllRestrict),
    ("Player Restrict", RuleTarget::PlayerRestrict),
    ("Event Restrict", RuleTarget::EventRestrict),
    ("All Allow", RuleTarget::AllAllow),
    ("Player Allow", RuleTarget::PlayerAllow),
    ("Event Allow", RuleTarget::EventAllow),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoverKind {
    Player,
    Event,
    /// Followers and other characters that are neither; both rule sets apply.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mover {
    pub kind: MoverKind,
    pub through: bool,
}

impl Mover {
    pub const fn player() -> Self {
        Self {
            kind: MoverKind::Player,
            through: false,
        }
    }

    pub const fn event() -> Self {
        Self {
            kind: MoverKind::Event,
            through: false,
        }
    }

    pub const fn other() -> Self {
        Self {
            kind: MoverKind::Other,
            through: false,
        }
    }

    pub const fn with_through(mut self, through: bool) -> Self {
        self.through = through;
        self
    }

    fn uses_player_rules(self) -> bool {
        self.kind != MoverKind::Event
    }

    fn uses_event_rules(self) -> bool {
        self.kind != MoverKind::Player
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passability {
    Forbidden,
    Allowed,
    /// No rule applies; the engine decides.
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleKind {
    Boat,
    Ship,
    Airship,
}

pub trait RegionMap {
    fn region_id(&self, x: i32, y: i32) -> u32;
}

/// Tile reached by moving from `(x, y)` in numpad direction `d`; 5 or any
/// unknown direction is the tile itself.
pub fn destination(x: i32, y: i32, d: u8) -> (i32, i32) {
    match d {
        1 => (x - 1, y + 1),
        2 => (x, y + 1),
        3 => (x + 1, y + 1),
        4 => (x - 1, y),
        6 => (x + 1, y),
        7 => (x - 1, y - 1),
        8 => (x, y - 1),
        9 => (x + 1, y - 1),
        _ => (x, y),
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionRules {
    restrict_player: BTreeSet<u32>,
    restrict_event: BTreeSet<u32>,
    allow_player: BTreeSet<u32>,
    allow_event: BTreeSet<u32>,
}

impl RegionRules {
    pub fn from_parameters(params: &PluginParameters) -> Result<Self, RegionConfigError> {
        let mut rules = Self::default();
        for (name, target) in PARAMETER_TARGETS {
            let raw = params.text_or(name, "");
            let ids = raw
                .split_whitespace()
                .map(|token| {
                    token.parse::<u32>().map_err(|_| {
                        RegionConfigError::InvalidParameter(ParameterError::new(
                            name,
                            token,
                            "expected space-separated region ids",
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rules.add(target, ids);
        }
        Ok(rules)
    }

    /// Parameter rules extended with the tags of one map's note.
    pub fn with_map_note(&self, note: &str) -> Result<Self, RegionConfigError> {
        let mut rules = self.clone();
        apply_map_note(note, &mut rules)?;
        Ok(rules)
    }

    pub fn add(&mut self, target: RuleTarget, ids: impl IntoIterator<Item = u32>) {
        let ids: Vec<u32> = ids.into_iter().filter(|id| *id != 0).collect();
        match target {
            RuleTarget::PlayerRestrict => self.restrict_player.extend(ids),
            RuleTarget::EventRestrict => self.restrict_event.extend(ids),
            RuleTarget::AllRestrict => {
                self.restrict_player.extend(ids.iter().copied());
                self.restrict_event.extend(ids);
            }
            RuleTarget::PlayerAllow => self.allow_player.extend(ids),
            RuleTarget::EventAllow => self.allow_event.extend(ids),
            RuleTarget::AllAllow => {
                self.allow_player.extend(ids.iter().copied());
                self.allow_event.extend(ids);
            }
        }
    }

    pub fn restricts(&self, mover: Mover, region: u32) -> bool {
        (mover.uses_event_rules() && self.restrict_event.contains(&region))
            || (mover.uses_player_rules() && self.restrict_player.contains(&region))
    }

    pub fn allows(&self, mover: Mover, region: u32) -> bool {
        (mover.uses_event_rules() && self.allow_event.contains(&region))
            || (mover.uses_player_rules() && self.allow_player.contains(&region))
    }

    /// Region verdict for `mover` stepping from `(x, y)` towards `d`.
    /// Restrictions beat allowances and never bind a mover with Through on.
    pub fn passability<M: RegionMap + ?Sized>(
        &self,
        map: &M,
        mover: Mover,
        x: i32,
        y: i32,
        d: u8,
    ) -> Passability {
        let (tx, ty) = destination(x, y, d);
        let region = map.region_id(tx, ty);
        if region == 0 {
            return Passability::Default;
        }
        if !mover.through && self.restricts(mover, region) {
            return Passability::Forbidden;
        }
        if self.allows(mover, region) {
            return Passability::Allowed;
        }
        Passability::Default
    }

    pub fn is_map_passable<M, F>(
        &self,
        map: &M,
        mover: Mover,
        x: i32,
        y: i32,
        d: u8,
        engine: F,
    ) -> bool
    where
        M: RegionMap + ?Sized,
        F: FnOnce() -> bool,
    {
        match self.passability(map, mover, x, y, d) {
            Passability::Forbidden => false,
            Passability::Allowed => true,
            Passability::Default => engine(),
        }
    }

    /// Whether the player may leave `vehicle` onto the tile the engine already
    /// accepted. Airships land on their own tile and check it with Through
    /// off, since boarding an airship turns it on. Boats and ships use the
    /// player's own flag.
    pub fn vehicle_can_land<M: RegionMap + ?Sized>(
        &self,
        map: &M,
        vehicle: VehicleKind,
        player: Mover,
        x: i32,
        y: i32,
        d: u8,
    ) -> bool {
        let (player, d) = match vehicle {
            VehicleKind::Airship => (player.with_through(false), 5),
            VehicleKind::Boat | VehicleKind::Ship => (player, d),
        };
        self.passability(map, player, x, y, d) != Passability::Forbidden
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct GridMap(HashMap<(i32, i32), u32>);

    impl RegionMap for GridMap {
        fn region_id(&self, x: i32, y: i32) -> u32 {
            self.0.get(&(x, y)).copied().unwrap_or(0)
        }
    }

    fn map() -> GridMap {
        GridMap(HashMap::from([
            ((5, 4), 1),
            ((6, 5), 2),
            ((5, 6), 3),
            ((4, 5), 4),
            ((5, 5), 1),
        ]))
    }

    fn rules() -> RegionRules {
        let params = PluginParameters::new()
            .with("Player Restrict", "1")
            .with("Event Restrict", "2 3")
            .with("All Allow", "3 4")
            .with("Player Allow", "0");
        RegionRules::from_parameters(&params).expect("region parameters parse")
    }

    #[test]
    fn parameters_split_on_spaces_and_ignore_region_zero() {
        let rules = rules();
        assert!(rules.restricts(Mover::player(), 1));
        assert!(rules.restricts(Mover::event(), 3));
        assert!(rules.allows(Mover::player(), 4));
        assert!(!rules.allows(Mover::player(), 0));
    }

    #[test]
    fn malformed_parameter_is_rejected() {
        let params = PluginParameters::new().with("Event Allow", "1 two");
        let error = RegionRules::from_parameters(&params).expect_err("bad id should fail");
        assert!(error.to_string().contains("Event Allow"));
    }

    #[test]
    fn destination_follows_numpad_directions() {
        assert_eq!(destination(5, 5, 8), (5, 4));
        assert_eq!(destination(5, 5, 3), (6, 6));
        assert_eq!(destination(5, 5, 5), (5, 5));
        assert_eq!(destination(5, 5, 0), (5, 5));
    }

    #[test]
    fn restriction_beats_allowance_and_engine() {
        let rules = rules();
        let map = map();

        assert_eq!(rules.passability(&map, Mover::player(), 5, 5, 8), Passability::Forbidden);
        assert_eq!(rules.passability(&map, Mover::event(), 5, 5, 8), Passability::Default);
        // Region 3 is restricted for events and allowed for everyone.
        assert_eq!(rules.passability(&map, Mover::event(), 5, 5, 2), Passability::Forbidden);
        assert_eq!(rules.passability(&map, Mover::player(), 5, 5, 2), Passability::Allowed);
        assert!(rules.is_map_passable(&map, Mover::player(), 5, 5, 4, || false));
        assert!(!rules.is_map_passable(&map, Mover::player(), 5, 5, 8, || true));
    }

    #[test]
    fn through_skips_restrictions_but_not_allowances() {
        let rules = rules();
        let map = map();
        let ghost = Mover::event().with_through(true);

        assert_eq!(rules.passability(&map, ghost, 5, 5, 6), Passability::Default);
        assert_eq!(rules.passability(&map, ghost, 5, 5, 2), Passability::Allowed);
    }

    #[test]
    fn region_zero_defers_to_engine() {
        let rules = rules();
        let map = map();
        assert!(rules.is_map_passable(&map, Mover::player(), 0, 0, 2, || true));
        assert!(!rules.is_map_passable(&map, Mover::player(), 0, 0, 2, || false));
    }

    #[test]
    fn followers_obey_both_rule_sets() {
        let rules = rules();
        let map = map();
        assert_eq!(rules.passability(&map, Mover::other(), 5, 5, 8), Passability::Forbidden);
        assert_eq!(rules.passability(&map, Mover::other(), 5, 5, 6), Passability::Forbidden);
    }

    #[test]
    fn vehicles_respect_player_restrictions_when_landing() {
        let rules = rules();
        let map = map();
        let player = Mover::player();

        assert!(!rules.vehicle_can_land(&map, VehicleKind::Ship, player, 5, 5, 8));
        assert!(rules.vehicle_can_land(&map, VehicleKind::Ship, player, 5, 5, 6));
        // Airships check the tile below them.
        assert!(!rules.vehicle_can_land(&map, VehicleKind::Airship, player, 5, 5, 2));
        assert!(rules.vehicle_can_land(&map, VehicleKind::Airship, player, 5, 6, 2));
    }

    #[test]
    fn through_player_lands_boats_anywhere_but_not_airships() {
        let rules = rules();
        let map = map();
        let ghost = Mover::player().with_through(true);

        assert!(rules.vehicle_can_land(&map, VehicleKind::Boat, ghost, 5, 5, 8));
        assert!(rules.vehicle_can_land(&map, VehicleKind::Ship, ghost, 5, 5, 8));
        assert!(!rules.vehicle_can_land(&map, VehicleKind::Airship, ghost, 5, 5, 2));
    }

    #[test]
    fn map_note_extends_parameter_rules() {
        let base = rules();
        let rules = base
            .with_map_note("<Player Restrict Region: 2>")
            .expect("note parses");
        assert!(rules.restricts(Mover::player(), 2));
        assert!(!base.restricts(Mover::player(), 2));
    }
}
