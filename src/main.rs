use std::{env, fs};

use bevy::prelude::*;

use noncombat_menu::{
    config::{PluginManifest, PluginParameters, MENU_PLUGIN_NAME, REGION_PLUGIN_NAME},
    field_menu::{MenuInput, SceneRequest, ScriptContext, ScriptRegistry},
    plugins::{
        CommonEventQueue, GameSwitches, GameVariables, MapLoaded, MenuFeedback, MenuViewChanged,
        NonCombatMenuPlugin, OpenMenuRequest, Party, PluginCommandIssued, RegionRestrictionsPlugin,
        SceneEntry, SceneStack, TileRegions,
    },
};

const DEFAULT_MANIFEST: &str = "assets/plugins.json";

fn open_bestiary(context: &mut ScriptContext) {
    context.push_scene(SceneRequest::Named("Bestiary".to_string()));
}

fn load_plugins(path: &str) -> Result<(NonCombatMenuPlugin, RegionRestrictionsPlugin), String> {
    let json = fs::read_to_string(path).map_err(|err| err.to_string())?;
    let manifest = PluginManifest::from_json(&json).map_err(|err| err.to_string())?;
    let stock = PluginParameters::new();

    let scripts = ScriptRegistry::new().with("open_bestiary", open_bestiary)?;
    let menu_params = manifest.parameters(MENU_PLUGIN_NAME).unwrap_or_else(|| {
        warn!("{MENU_PLUGIN_NAME} is not enabled; using the stock menu");
        &stock
    });
    let menu = NonCombatMenuPlugin::from_parameters(menu_params, scripts)
        .map_err(|err| err.to_string())?;

    let region_params = manifest.parameters(REGION_PLUGIN_NAME).unwrap_or(&stock);
    let region =
        RegionRestrictionsPlugin::from_parameters(region_params).map_err(|err| err.to_string())?;

    Ok((menu, region))
}

fn main() -> AppExit {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_MANIFEST.to_string());

    // DefaultPlugins installs the log subscriber; load afterwards so
    // configuration problems are reported through it.
    let mut app = App::new();
    app.add_plugins(DefaultPlugins);
    match load_plugins(&path) {
        Ok(plugins) => app.add_plugins(plugins).add_plugins(DemoPlugin).run(),
        Err(message) => {
            error!("{path}: {message}");
            AppExit::error()
        }
    }
}

struct DemoPlugin;

impl Plugin for DemoPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup).add_systems(
            Update,
            (
                keyboard_input,
                log_menu_views,
                log_menu_feedback,
                log_plugin_commands,
                run_common_events,
            ),
        );
    }
}

fn setup(mut commands: Commands, mut loaded: MessageWriter<MapLoaded>) {
    commands.spawn(Camera2d);
    commands.insert_resource(GameSwitches::with_len(20));
    commands.insert_resource(GameVariables::with_len(20));
    commands.insert_resource(Party::new(["Harold", "Therese", "Ada", "Rook"]));

    let mut regions = TileRegions::filled(17, 13, 0);
    regions.set(8, 6, 1);
    loaded.write(MapLoaded {
        map_id: 1,
        note: "<Event Restrict Region: 4 to 6>".to_string(),
        regions,
    });
}

fn keyboard_input(
    keys: Res<ButtonInput<KeyCode>>,
    mut scenes: ResMut<SceneStack>,
    mut open: MessageWriter<OpenMenuRequest>,
    mut inputs: MessageWriter<MenuInput>,
) {
    let on_menu = scenes.is_top(&SceneEntry::Menu);
    if keys.just_pressed(KeyCode::Escape) {
        match scenes.top() {
            Some(SceneEntry::Map) => {
                open.write(OpenMenuRequest);
            }
            Some(SceneEntry::Menu) => {
                inputs.write(MenuInput::Cancel);
            }
            Some(SceneEntry::Screen(_) | SceneEntry::Named(_)) => {
                scenes.pop();
            }
            Some(SceneEntry::Title) | None => {}
        }
    }
    if !on_menu {
        return;
    }
    if keys.just_pressed(KeyCode::ArrowUp) {
        inputs.write(MenuInput::Up);
    }
    if keys.just_pressed(KeyCode::ArrowDown) {
        inputs.write(MenuInput::Down);
    }
    if keys.just_pressed(KeyCode::Enter) || keys.just_pressed(KeyCode::Space) {
        inputs.write(MenuInput::Confirm);
    }
}

fn log_menu_views(mut views: MessageReader<MenuViewChanged>) {
    for changed in views.read() {
        let Some(view) = &changed.view else {
            info!("menu closed");
            continue;
        };
        for row in &view.rows {
            let marker = if row.selected { ">" } else { " " };
            let state = if row.enabled { "" } else { " (disabled)" };
            info!("{marker} {}{state}", row.label);
        }
        if let Some(formation) = view.formation {
            info!(
                "formation cursor {} pending {:?}",
                formation.cursor, formation.pending
            );
        }
    }
}

fn log_menu_feedback(mut feedback: MessageReader<MenuFeedback>, party: Res<Party>) {
    for message in feedback.read() {
        match message {
            MenuFeedback::Buzzer => info!("*buzz*"),
            MenuFeedback::RedrawPartySlot(slot) => {
                info!(
                    "slot {slot}: {}",
                    party.members.get(*slot).map_or("-", String::as_str)
                );
            }
        }
    }
}

fn log_plugin_commands(mut issued: MessageReader<PluginCommandIssued>) {
    for command in issued.read() {
        info!("plugin command: {}", command.line);
    }
}

fn run_common_events(mut events: ResMut<CommonEventQueue>) {
    for id in events.drain() {
        info!("running common event {id}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_manifest_loads() {
        assert!(load_plugins(DEFAULT_MANIFEST).is_ok());
    }

    #[test]
    fn unreadable_manifest_is_an_error() {
        let error = load_plugins("assets/missing.json").err();
        assert!(error.is_some_and(|message| !message.is_empty()));
    }
}
