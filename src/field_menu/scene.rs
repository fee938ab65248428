use std::{error::Error, fmt};

use bevy::prelude::Message;
use smallvec::smallvec;

use super::{
    action::CANCEL_KEYWORD,
    command_reducer::{reduce_menu_selection, DispatchError, MenuReducerResult},
    condition::{evaluate_condition, ExpressionError, GameStateView},
    formation::{Formation, FormationOutcome},
    host::PartyOrder,
    routing::ScriptRegistry,
    selection::{initial_cursor, SelectionMemory},
    MenuDefinition,
};
use crate::config::{ConditionKind, MenuEntry};

/// A command that passed its show condition on this opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleCommand {
    pub name: String,
    pub keyword: String,
    pub icon: i32,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuFocus {
    #[default]
    Commands,
    Formation,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuInput {
    Up,
    Down,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOpenError {
    pub entry: String,
    pub kind: ConditionKind,
    pub error: ExpressionError,
}

impl fmt::Display for MenuOpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to evaluate the {} of menu entry `{}`: {}",
            self.kind, self.entry, self.error
        )
    }
}

impl Error for MenuOpenError {}

/// Evaluates show conditions, then enable conditions of the shown entries.
pub fn filter_menu_entries<S: GameStateView + ?Sized>(
    entries: &[MenuEntry],
    state: &S,
) -> Result<Vec<VisibleCommand>, MenuOpenError> {
    let mut commands = Vec::with_capacity(entries.len());
    for entry in entries {
        let failure = |kind: ConditionKind| {
            move |error: ExpressionError| MenuOpenError {
                entry: entry.display_name.clone(),
                kind,
                error,
            }
        };
        let shown = evaluate_condition(entry.show_condition.as_ref(), state)
            .map_err(failure(ConditionKind::Show))?;
        if !shown {
            continue;
        }
        let enabled = evaluate_condition(entry.enable_condition.as_ref(), state)
            .map_err(failure(ConditionKind::Enable))?;
        commands.push(VisibleCommand {
            name: entry.display_name.clone(),
            keyword: entry.keyword.clone(),
            icon: entry.icon,
            enabled,
        });
    }
    Ok(commands)
}

/// State of one opening of the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuScene {
    commands: Vec<VisibleCommand>,
    cursor: usize,
    focus: MenuFocus,
    formation: Formation,
}

impl MenuScene {
    pub fn open<S: GameStateView + ?Sized>(
        definition: &MenuDefinition,
        state: &S,
        memory: &SelectionMemory,
    ) -> Result<Self, MenuOpenError> {
        let commands = filter_menu_entries(definition.entries(), state)?;
        let keywords = commands.iter().map(|command| command.keyword.as_str());
        let cursor = initial_cursor(memory, keywords);
        Ok(Self {
            commands,
            cursor,
            focus: MenuFocus::Commands,
            formation: Formation::resuming_at(memory.formation_slot()),
        })
    }

    pub fn commands(&self) -> &[VisibleCommand] {
        &self.commands
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&VisibleCommand> {
        self.commands.get(self.cursor)
    }

    pub fn focus(&self) -> MenuFocus {
        self.focus
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn handle_input(
        &mut self,
        input: MenuInput,
        definition: &MenuDefinition,
        scripts: &ScriptRegistry,
        party: &mut dyn PartyOrder,
        memory: &mut SelectionMemory,
    ) -> Result<MenuReducerResult, DispatchError> {
        match self.focus {
            MenuFocus::Commands => {
                self.handle_command_input(input, definition, scripts, party, memory)
            }
            MenuFocus::Formation => {
                let result = self.handle_formation_input(input, party);
                memory.record_formation_slot(self.formation.last_slot());
                Ok(result)
            }
        }
    }

    fn handle_command_input(
        &mut self,
        input: MenuInput,
        definition: &MenuDefinition,
        scripts: &ScriptRegistry,
        party: &mut dyn PartyOrder,
        memory: &mut SelectionMemory,
    ) -> Result<MenuReducerResult, DispatchError> {
        match input {
            MenuInput::Up | MenuInput::Down => {
                if self.commands.is_empty() {
                    return Ok(MenuReducerResult::default());
                }
                let len = self.commands.len();
                self.cursor = match input {
                    MenuInput::Up => (self.cursor + len - 1) % len,
                    _ => (self.cursor + 1) % len,
                };
                Ok(MenuReducerResult {
                    dirty_menu: true,
                    ..MenuReducerResult::default()
                })
            }
            MenuInput::Cancel => self.dispatch(CANCEL_KEYWORD, definition, scripts, party),
            MenuInput::Confirm => {
                let Some(command) = self.commands.get(self.cursor) else {
                    return Ok(MenuReducerResult::default());
                };
                if !command.enabled {
                    return Ok(MenuReducerResult {
                        play_buzzer: true,
                        ..MenuReducerResult::default()
                    });
                }
                let keyword = command.keyword.clone();
                let result = self.dispatch(&keyword, definition, scripts, party)?;
                if keyword != CANCEL_KEYWORD {
                    memory.record_selection(&keyword);
                }
                Ok(result)
            }
        }
    }

    fn dispatch(
        &mut self,
        keyword: &str,
        definition: &MenuDefinition,
        scripts: &ScriptRegistry,
        party: &mut dyn PartyOrder,
    ) -> Result<MenuReducerResult, DispatchError> {
        let binding = definition
            .routing()
            .resolve(keyword)
            .ok_or_else(|| DispatchError::UnboundKeyword(keyword.to_string()))?;
        let result = reduce_menu_selection(binding, scripts)?;
        if result.enter_formation {
            self.formation.enter(party.len());
            self.focus = MenuFocus::Formation;
        }
        Ok(result)
    }

    fn handle_formation_input(
        &mut self,
        input: MenuInput,
        party: &mut dyn PartyOrder,
    ) -> MenuReducerResult {
        let dirty = MenuReducerResult {
            dirty_menu: true,
            ..MenuReducerResult::default()
        };
        match input {
            MenuInput::Up => {
                self.formation.move_cursor(-1, party.len());
                dirty
            }
            MenuInput::Down => {
                self.formation.move_cursor(1, party.len());
                dirty
            }
            MenuInput::Confirm => match self.formation.confirm(party) {
                FormationOutcome::Pending(slot) => MenuReducerResult {
                    redraw_party_slots: smallvec![slot],
                    ..dirty
                },
                FormationOutcome::Swapped(first, second) => MenuReducerResult {
                    redraw_party_slots: smallvec![first, second],
                    ..dirty
                },
                _ => MenuReducerResult::default(),
            },
            MenuInput::Cancel => {
                let pending = self.formation.pending_slot();
                match self.formation.cancel() {
                    FormationOutcome::PendingCleared => MenuReducerResult {
                        redraw_party_slots: pending.into_iter().collect(),
                        ..dirty
                    },
                    FormationOutcome::Exited => {
                        self.focus = MenuFocus::Commands;
                        dirty
                    }
                    _ => MenuReducerResult::default(),
                }
            }
        }
    }
}
