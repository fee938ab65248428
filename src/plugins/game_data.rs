use std::collections::VecDeque;

use bevy::{ecs::system::SystemParam, prelude::*};

use crate::field_menu::{GameStateView, MenuScreen, PartyOrder, SceneRequest, SystemFlag};

/// Switches `1..=len`; anything else is undefined.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSwitches {
    values: Vec<bool>,
}

impl GameSwitches {
    pub fn with_len(len: usize) -> Self {
        Self {
            values: vec![false; len],
        }
    }

    pub fn get(&self, id: u32) -> Option<bool> {
        let index = (id as usize).checked_sub(1)?;
        self.values.get(index).copied()
    }

    /// Returns `false` when `id` is outside the defined range.
    pub fn set(&mut self, id: u32, value: bool) -> bool {
        let Some(slot) = (id as usize)
            .checked_sub(1)
            .and_then(|index| self.values.get_mut(index))
        else {
            return false;
        };
        *slot = value;
        true
    }
}

/// Variables `1..=len`; anything else is undefined.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct GameVariables {
    values: Vec<i64>,
}

impl GameVariables {
    pub fn with_len(len: usize) -> Self {
        Self {
            values: vec![0; len],
        }
    }

    pub fn get(&self, id: u32) -> Option<i64> {
        let index = (id as usize).checked_sub(1)?;
        self.values.get(index).copied()
    }

    pub fn set(&mut self, id: u32, value: i64) -> bool {
        let Some(slot) = (id as usize)
            .checked_sub(1)
            .and_then(|index| self.values.get_mut(index))
        else {
            return false;
        };
        *slot = value;
        true
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSystemFlags {
    pub save_enabled: bool,
    pub menu_enabled: bool,
    pub formation_enabled: bool,
}

impl Default for GameSystemFlags {
    fn default() -> Self {
        Self {
            save_enabled: true,
            menu_enabled: true,
            formation_enabled: true,
        }
    }
}

#[derive(SystemParam)]
pub struct GameState<'w> {
    switches: Res<'w, GameSwitches>,
    variables: Res<'w, GameVariables>,
    flags: Res<'w, GameSystemFlags>,
}

impl GameStateView for GameState<'_> {
    fn switch(&self, id: u32) -> Option<bool> {
        self.switches.get(id)
    }

    fn variable(&self, id: u32) -> Option<i64> {
        self.variables.get(id)
    }

    fn system_flag(&self, flag: SystemFlag) -> bool {
        match flag {
            SystemFlag::SaveEnabled => self.flags.save_enabled,
            SystemFlag::MenuEnabled => self.flags.menu_enabled,
            SystemFlag::FormationEnabled => self.flags.formation_enabled,
        }
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct Party {
    pub members: Vec<String>,
}

impl Party {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

impl PartyOrder for Party {
    fn len(&self) -> usize {
        self.members.len()
    }

    fn swap_order(&mut self, a: usize, b: usize) {
        if a < self.members.len() && b < self.members.len() {
            self.members.swap(a, b);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEntry {
    Map,
    Menu,
    Screen(MenuScreen),
    Named(String),
    Title,
}

impl From<SceneRequest> for SceneEntry {
    fn from(request: SceneRequest) -> Self {
        match request {
            SceneRequest::Screen(screen) => Self::Screen(screen),
            SceneRequest::Named(name) => Self::Named(name),
        }
    }
}

/// Navigation stack shared by the map, the menu and the screens above it.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct SceneStack {
    scenes: Vec<SceneEntry>,
}

impl Default for SceneStack {
    fn default() -> Self {
        Self {
            scenes: vec![SceneEntry::Map],
        }
    }
}

impl SceneStack {
    pub fn top(&self) -> Option<&SceneEntry> {
        self.scenes.last()
    }

    pub fn is_top(&self, scene: &SceneEntry) -> bool {
        self.top() == Some(scene)
    }

    pub fn push(&mut self, scene: SceneEntry) {
        self.scenes.push(scene);
    }

    pub fn pop(&mut self) -> Option<SceneEntry> {
        self.scenes.pop()
    }

    pub fn replace_with_title(&mut self) {
        self.scenes.clear();
        self.scenes.push(SceneEntry::Title);
    }

    pub fn scenes(&self) -> &[SceneEntry] {
        &self.scenes
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonEventQueue {
    reserved: VecDeque<u32>,
}

impl CommonEventQueue {
    pub fn reserve(&mut self, id: u32) {
        self.reserved.push_back(id);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = u32> + '_ {
        self.reserved.drain(..)
    }

    pub fn pending(&self) -> impl Iterator<Item = u32> + '_ {
        self.reserved.iter().copied()
    }
}
