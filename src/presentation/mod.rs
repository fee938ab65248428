//! What a renderer needs to draw the menu. Nothing here draws; it only turns
//! scene state and configuration into positioned rows and windows.

use crate::field_menu::{MenuDefinition, MenuFocus, MenuScene};

pub mod backgrounds;
pub mod layout;

pub use backgrounds::{menu_background, screen_background, BackgroundSpec};
pub use layout::{
    command_window_rect, row_layout, ItemCategory, ItemScreenLayout, Rect, RowLayout, ScreenBox,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRowView {
    pub label: String,
    pub keyword: String,
    pub enabled: bool,
    pub selected: bool,
    pub layout: RowLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormationView {
    pub cursor: usize,
    pub pending: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuView {
    pub window: Rect,
    pub rows: Vec<MenuRowView>,
    pub focus: MenuFocus,
    pub formation: Option<FormationView>,
    pub background: BackgroundSpec,
}

impl MenuView {
    pub fn from_scene(scene: &MenuScene, definition: &MenuDefinition, screen: ScreenBox) -> Self {
        let config = definition.config();
        let commands = scene.commands();
        let rows = commands
            .iter()
            .enumerate()
            .map(|(index, command)| MenuRowView {
                label: command.name.clone(),
                keyword: command.keyword.clone(),
                enabled: command.enabled,
                selected: index == scene.cursor(),
                layout: row_layout(index, command.icon, &config.command_text),
            })
            .collect();

        let formation = (scene.focus() == MenuFocus::Formation).then(|| FormationView {
            cursor: scene.formation().cursor(),
            pending: scene.formation().pending_slot(),
        });

        Self {
            window: command_window_rect(commands.len(), screen),
            rows,
            focus: scene.focus(),
            formation,
            background: menu_background(&config.backgrounds),
        }
    }

    /// The command list is hidden while the party list has focus.
    pub fn command_list_visible(&self) -> bool {
        self.focus == MenuFocus::Commands
    }
}
