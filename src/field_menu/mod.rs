//! The field menu core: configured entries, their conditions, keyword
//! routing, and the per-opening scene that reduces player input into effects
//! for the host.

use bevy::prelude::Resource;

use crate::config::{MenuConfig, MenuConfigError, MenuEntry, PluginParameters};

pub mod action;
pub mod command_reducer;
pub mod condition;
pub mod formation;
pub mod host;
pub mod routing;
pub mod scene;
pub mod selection;

#[cfg(test)]
mod flow_tests;

pub use action::{ActionBinding, BuiltInAction, MenuScreen, PluginCommandLine, SceneRequest};
pub use command_reducer::{reduce_menu_selection, DispatchError, MenuReducerResult, ScriptContext};
pub use condition::{Condition, ExpressionError, GameStateView, SystemFlag};
pub use formation::{Formation, FormationOutcome, FormationPhase};
pub use host::{apply_reducer_result, MenuHost, PartyOrder};
pub use routing::{MenuRouting, ScriptCallback, ScriptRegistry};
pub use scene::{MenuFocus, MenuInput, MenuOpenError, MenuScene, VisibleCommand};
pub use selection::SelectionMemory;

/// A validated menu: configuration plus the keyword routing built from it.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MenuDefinition {
    config: MenuConfig,
    routing: MenuRouting,
}

impl MenuDefinition {
    pub fn new(config: MenuConfig, scripts: &ScriptRegistry) -> Result<Self, MenuConfigError> {
        let routing = MenuRouting::build(&config.entries, scripts)?;
        Ok(Self { config, routing })
    }

    pub fn from_parameters(
        params: &PluginParameters,
        scripts: &ScriptRegistry,
    ) -> Result<Self, MenuConfigError> {
        Self::new(MenuConfig::from_parameters(params)?, scripts)
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.config.entries
    }

    pub fn routing(&self) -> &MenuRouting {
        &self.routing
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }
}
