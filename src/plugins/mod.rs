//! Bevy wiring for the menu and region rules.

pub mod field_menu;
pub mod game_data;
pub mod region;

pub use field_menu::{
    ActiveMenu, FieldMenuSystems, MenuFeedback, MenuHostContext, MenuViewChanged, MenuViewport,
    NonCombatMenuPlugin, OpenMenuRequest, PluginCommandIssued,
};
pub use game_data::{
    CommonEventQueue, GameState, GameSwitches, GameSystemFlags, GameVariables, Party, SceneEntry,
    SceneStack,
};
pub use region::{
    BaseRegionRules, MapLoaded, RegionPassability, RegionRestrictionsPlugin, TileRegions,
};
