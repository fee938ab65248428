use bevy::{ecs::system::SystemParam, prelude::*};

use crate::{
    config::PluginParameters,
    region::{Mover, RegionConfigError, RegionMap, RegionRules, VehicleKind},
};

/// Region ids of the current map's tiles, row-major. Off-map tiles are 0.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct TileRegions {
    width: usize,
    height: usize,
    ids: Vec<u32>,
}

impl TileRegions {
    pub fn filled(width: usize, height: usize, id: u32) -> Self {
        Self {
            width,
            height,
            ids: vec![id; width * height],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn set(&mut self, x: i32, y: i32, id: u32) -> bool {
        match self.index(x, y) {
            Some(index) => {
                self.ids[index] = id;
                true
            }
            None => false,
        }
    }
}

impl RegionMap for TileRegions {
    fn region_id(&self, x: i32, y: i32) -> u32 {
        self.index(x, y).map_or(0, |index| self.ids[index])
    }
}

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct MapLoaded {
    pub map_id: u32,
    pub note: String,
    pub regions: TileRegions,
}

/// Rules from plugin parameters alone; each map adds its notetags on top.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseRegionRules(pub RegionRules);

pub struct RegionRestrictionsPlugin {
    rules: RegionRules,
}

impl RegionRestrictionsPlugin {
    pub fn new(rules: RegionRules) -> Self {
        Self { rules }
    }

    pub fn from_parameters(params: &PluginParameters) -> Result<Self, RegionConfigError> {
        RegionRules::from_parameters(params).map(Self::new)
    }
}

impl Plugin for RegionRestrictionsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(BaseRegionRules(self.rules.clone()))
            .insert_resource(self.rules.clone())
            .init_resource::<TileRegions>()
            .add_message::<MapLoaded>()
            .add_systems(PreUpdate, apply_loaded_map);
    }
}

fn apply_loaded_map(
    mut loaded: MessageReader<MapLoaded>,
    base: Res<BaseRegionRules>,
    mut rules: ResMut<RegionRules>,
    mut regions: ResMut<TileRegions>,
) {
    for map in loaded.read() {
        *regions = map.regions.clone();
        *rules = match base.0.with_map_note(&map.note) {
            Ok(map_rules) => map_rules,
            Err(error) => {
                warn!(
                    "ignoring region tags of map {}: {error}; using parameter rules",
                    map.map_id
                );
                base.0.clone()
            }
        };
    }
}

/// Movement checks against the current map's regions.
#[derive(SystemParam)]
pub struct RegionPassability<'w> {
    rules: Res<'w, RegionRules>,
    regions: Res<'w, TileRegions>,
}

impl RegionPassability<'_> {
    pub fn is_map_passable<F>(&self, mover: Mover, x: i32, y: i32, d: u8, engine: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        self.rules
            .is_map_passable(&*self.regions, mover, x, y, d, engine)
    }

    /// `engine_ok` is the engine's own landing verdict; regions can only
    /// narrow it.
    pub fn vehicle_can_land(
        &self,
        vehicle: VehicleKind,
        player: Mover,
        x: i32,
        y: i32,
        d: u8,
        engine_ok: bool,
    ) -> bool {
        engine_ok
            && self
                .rules
                .vehicle_can_land(&*self.regions, vehicle, player, x, y, d)
    }
}
