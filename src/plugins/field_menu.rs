use bevy::{ecs::system::SystemParam, prelude::*};

use super::game_data::{
    CommonEventQueue, GameState, GameSwitches, GameSystemFlags, GameVariables, Party, SceneEntry,
    SceneStack,
};
use crate::{
    config::{MenuConfigError, PluginParameters},
    field_menu::{
        apply_reducer_result, MenuDefinition, MenuHost, MenuInput, MenuScene, PluginCommandLine,
        SceneRequest, ScriptRegistry, SelectionMemory,
    },
    presentation::{MenuView, ScreenBox},
};

/// Asks the map to open the field menu.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMenuRequest;

/// A `cmd=` entry was chosen; the owning plugin handles the line.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct PluginCommandIssued {
    pub line: PluginCommandLine,
}

/// The menu's drawable state changed. `None` once the menu is gone.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct MenuViewChanged {
    pub view: Option<MenuView>,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuFeedback {
    Buzzer,
    RedrawPartySlot(usize),
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveMenu(Option<MenuScene>);

impl ActiveMenu {
    pub fn scene(&self) -> Option<&MenuScene> {
        self.0.as_ref()
    }
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuViewport(pub ScreenBox);

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum FieldMenuSystems {
    Open,
    Input,
    Present,
}

pub struct NonCombatMenuPlugin {
    definition: MenuDefinition,
    scripts: ScriptRegistry,
}

impl NonCombatMenuPlugin {
    pub fn new(definition: MenuDefinition, scripts: ScriptRegistry) -> Self {
        Self {
            definition,
            scripts,
        }
    }

    pub fn from_parameters(
        params: &PluginParameters,
        scripts: ScriptRegistry,
    ) -> Result<Self, MenuConfigError> {
        let definition = MenuDefinition::from_parameters(params, &scripts)?;
        Ok(Self::new(definition, scripts))
    }
}

impl Plugin for NonCombatMenuPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.definition.clone())
            .insert_resource(self.scripts.clone())
            .init_resource::<SelectionMemory>()
            .init_resource::<ActiveMenu>()
            .init_resource::<MenuViewport>()
            .init_resource::<GameSwitches>()
            .init_resource::<GameVariables>()
            .init_resource::<GameSystemFlags>()
            .init_resource::<Party>()
            .init_resource::<SceneStack>()
            .init_resource::<CommonEventQueue>()
            .add_message::<OpenMenuRequest>()
            .add_message::<MenuInput>()
            .add_message::<PluginCommandIssued>()
            .add_message::<MenuViewChanged>()
            .add_message::<MenuFeedback>();

        app.configure_sets(
            Update,
            (
                FieldMenuSystems::Open,
                FieldMenuSystems::Input.after(FieldMenuSystems::Open),
                FieldMenuSystems::Present.after(FieldMenuSystems::Input),
            ),
        );
        app.add_systems(
            Update,
            (open_menu_requests, sync_active_menu)
                .chain()
                .in_set(FieldMenuSystems::Open),
        );
        app.add_systems(Update, handle_menu_input.in_set(FieldMenuSystems::Input));
        app.add_systems(Update, present_menu.in_set(FieldMenuSystems::Present));
        info!(
            "field menu ready with {} entries",
            self.definition.entries().len()
        );
    }
}

#[derive(SystemParam)]
pub struct MenuHostContext<'w> {
    scenes: ResMut<'w, SceneStack>,
    common_events: ResMut<'w, CommonEventQueue>,
    plugin_commands: MessageWriter<'w, PluginCommandIssued>,
}

impl MenuHost for MenuHostContext<'_> {
    fn push_scene(&mut self, scene: SceneRequest) {
        self.scenes.push(scene.into());
    }

    fn pop_scene(&mut self) {
        self.scenes.pop();
    }

    fn goto_title(&mut self) {
        self.scenes.replace_with_title();
    }

    fn reserve_common_event(&mut self, id: u32) {
        self.common_events.reserve(id);
    }

    fn execute_plugin_command(&mut self, line: &PluginCommandLine) {
        self.plugin_commands
            .write(PluginCommandIssued { line: line.clone() });
    }
}

fn open_menu_requests(
    mut requests: MessageReader<OpenMenuRequest>,
    flags: Res<GameSystemFlags>,
    mut scenes: ResMut<SceneStack>,
) {
    for _ in requests.read() {
        if !flags.menu_enabled {
            debug!("menu access is disabled");
            continue;
        }
        if scenes.is_top(&SceneEntry::Map) {
            scenes.push(SceneEntry::Menu);
        }
    }
}

/// Opens a fresh scene whenever the menu is on top of the stack without one,
/// and drops it once something else covers or replaces the menu.
fn sync_active_menu(
    mut active: ResMut<ActiveMenu>,
    mut scenes: ResMut<SceneStack>,
    definition: Res<MenuDefinition>,
    memory: Res<SelectionMemory>,
    state: GameState,
) {
    match (scenes.is_top(&SceneEntry::Menu), active.0.is_some()) {
        (true, false) => match MenuScene::open(&definition, &state, &memory) {
            Ok(scene) => active.0 = Some(scene),
            Err(error) => {
                error!("closing field menu: {error}");
                scenes.pop();
            }
        },
        (false, true) => active.0 = None,
        _ => {}
    }
}

#[derive(SystemParam)]
struct MenuSession<'w> {
    definition: Res<'w, MenuDefinition>,
    scripts: Res<'w, ScriptRegistry>,
    party: ResMut<'w, Party>,
    memory: ResMut<'w, SelectionMemory>,
}

fn handle_menu_input(
    mut inputs: MessageReader<MenuInput>,
    mut active: ResMut<ActiveMenu>,
    mut session: MenuSession,
    mut host: MenuHostContext,
    mut feedback: MessageWriter<MenuFeedback>,
) {
    for input in inputs.read() {
        let Some(scene) = active.0.as_mut() else {
            continue;
        };
        let outcome = scene.handle_input(
            *input,
            &session.definition,
            &session.scripts,
            &mut *session.party,
            &mut session.memory,
        );
        match outcome {
            Ok(result) => {
                if result.play_buzzer {
                    feedback.write(MenuFeedback::Buzzer);
                }
                for slot in &result.redraw_party_slots {
                    feedback.write(MenuFeedback::RedrawPartySlot(*slot));
                }
                apply_reducer_result(&result, &mut host);
            }
            Err(error) => error!("menu dispatch failed: {error}"),
        }

        if !host.scenes.is_top(&SceneEntry::Menu) {
            active.0 = None;
        }
    }
}

fn present_menu(
    active: Res<ActiveMenu>,
    definition: Res<MenuDefinition>,
    viewport: Res<MenuViewport>,
    mut views: MessageWriter<MenuViewChanged>,
    mut was_open: Local<bool>,
) {
    if !active.is_changed() {
        return;
    }
    match active.scene() {
        Some(scene) => {
            *was_open = true;
            views.write(MenuViewChanged {
                view: Some(MenuView::from_scene(scene, &definition, viewport.0)),
            });
        }
        None if *was_open => {
            *was_open = false;
            views.write(MenuViewChanged { view: None });
        }
        None => {}
    }
}
