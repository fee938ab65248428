use std::collections::HashMap;

use super::*;
use crate::{
    config::{PluginParameters, NO_ICON},
    field_menu::{
        condition::tests::FixedState,
        host::tests::{HostCall, RecordingHost, VecParty},
    },
};

fn structured(records: &[(&str, &str, &str, &str)]) -> PluginParameters {
    let list: Vec<serde_json::Value> = records
        .iter()
        .map(|(name, keyword, enable, show)| {
            serde_json::json!({
                "Name": name,
                "Keyword": keyword,
                "Enable Condition": enable,
                "Show Condition": show,
                "Icon": "",
            })
        })
        .collect();
    PluginParameters::new().with("Menu List", serde_json::Value::Array(list).to_string())
}

struct Session {
    definition: MenuDefinition,
    scripts: ScriptRegistry,
    memory: SelectionMemory,
    party: VecParty,
    host: RecordingHost,
}

impl Session {
    fn new(params: PluginParameters, scripts: ScriptRegistry) -> Self {
        let definition =
            MenuDefinition::from_parameters(&params, &scripts).expect("definition builds");
        Self {
            definition,
            scripts,
            memory: SelectionMemory::default(),
            party: VecParty(vec!["Harold", "Therese", "Marsha", "Lucius"]),
            host: RecordingHost::default(),
        }
    }

    fn open(&self, state: &FixedState) -> MenuScene {
        MenuScene::open(&self.definition, state, &self.memory).expect("menu opens")
    }

    fn press(&mut self, scene: &mut MenuScene, input: MenuInput) -> MenuReducerResult {
        let result = scene
            .handle_input(
                input,
                &self.definition,
                &self.scripts,
                &mut self.party,
                &mut self.memory,
            )
            .expect("input reduces");
        apply_reducer_result(&result, &mut self.host);
        result
    }

    fn select(&mut self, scene: &mut MenuScene, keyword: &str) -> MenuReducerResult {
        let steps = scene
            .commands()
            .iter()
            .position(|command| command.keyword == keyword)
            .expect("keyword is visible");
        while scene.cursor() != steps {
            self.press(scene, MenuInput::Down);
        }
        self.press(scene, MenuInput::Confirm)
    }
}

fn rows(scene: &MenuScene) -> Vec<(&str, bool)> {
    scene
        .commands()
        .iter()
        .map(|command| (command.name.as_str(), command.enabled))
        .collect()
}

#[test]
fn structured_list_ignores_conflicting_legacy_fields() {
    let params = structured(&[("Status", "status", "", "")])
        .with("Menu Order", "Items: item, Quit: toTitle")
        .with("Menu Icons", "12, 13");
    let session = Session::new(params, ScriptRegistry::new());

    let scene = session.open(&FixedState::default());
    assert_eq!(rows(&scene), [("Status", true)]);
    assert_eq!(scene.commands()[0].icon, NO_ICON);
}

#[test]
fn hidden_entries_are_absent_and_disabled_entries_buzz() {
    let params = structured(&[
        ("Hidden", "quest", "true", "false"),
        ("Locked", "equip", "false", "true"),
        ("Items", "item", "", ""),
    ]);
    let mut session = Session::new(params, ScriptRegistry::new());
    let mut scene = session.open(&FixedState::default());

    assert_eq!(rows(&scene), [("Locked", false), ("Items", true)]);

    let result = session.press(&mut scene, MenuInput::Confirm);
    assert!(result.play_buzzer);
    assert_eq!(result.push_scene, None);
    assert!(session.host.calls.is_empty());
    assert_eq!(session.memory.initial_selection(), None);
}

#[test]
fn plugin_command_prefix_beats_built_in_name() {
    let params = structured(&[("Items", "cmd=item", "", "")]);
    let mut session = Session::new(params, ScriptRegistry::new());
    let mut scene = session.open(&FixedState::default());

    let result = session.select(&mut scene, "cmd=item");
    assert_eq!(result.push_scene, None);
    assert_eq!(session.host.calls, [HostCall::PluginCommand("item".to_string())]);
}

#[test]
fn cancel_closes_menu_without_configured_cancel_entry() {
    let params = structured(&[("Items", "item", "", "")]);
    let mut session = Session::new(params, ScriptRegistry::new());
    let mut scene = session.open(&FixedState::default());

    let result = session.press(&mut scene, MenuInput::Cancel);
    assert!(result.close_menu);
    assert_eq!(session.host.calls, [HostCall::Pop]);
}

#[test]
fn configured_cancel_entry_closes_without_being_remembered() {
    let params = structured(&[("Items", "item", "", ""), ("Back", "cancel", "", "")]);
    let mut session = Session::new(params, ScriptRegistry::new());
    let mut scene = session.open(&FixedState::default());

    session.select(&mut scene, "cancel");
    assert_eq!(session.host.calls, [HostCall::Pop]);
    assert_eq!(session.memory.initial_selection(), None);
}

#[test]
fn selection_memory_survives_reopening_and_falls_back_when_filtered() {
    let params = structured(&[
        ("Items", "item", "", ""),
        ("Status", "status", "", "s[3]"),
        ("Save", "save", "", ""),
    ]);
    let mut session = Session::new(params, ScriptRegistry::new());
    let visible = FixedState {
        switches: HashMap::from([(3, true)]),
        ..FixedState::default()
    };

    let mut scene = session.open(&visible);
    session.select(&mut scene, "status");
    assert_eq!(session.memory.initial_selection(), Some("status"));

    let reopened = session.open(&visible);
    assert_eq!(
        reopened.selected().map(|command| command.keyword.as_str()),
        Some("status")
    );

    let hidden = FixedState {
        switches: HashMap::from([(3, false)]),
        ..FixedState::default()
    };
    let fallback = session.open(&hidden);
    assert_eq!(fallback.cursor(), 0);
    assert_eq!(
        fallback.selected().map(|command| command.keyword.as_str()),
        Some("item")
    );
}

#[test]
fn formation_swaps_party_and_returns_to_commands() {
    let params = structured(&[("Items", "item", "", ""), ("Party", "formation", "", "")]);
    let mut session = Session::new(params, ScriptRegistry::new());
    let mut scene = session.open(&FixedState::default());

    let entered = session.select(&mut scene, "formation");
    assert!(entered.enter_formation);
    assert_eq!(scene.focus(), MenuFocus::Formation);
    assert_eq!(scene.formation().phase(), FormationPhase::AwaitingFirstPick);

    session.press(&mut scene, MenuInput::Down);
    session.press(&mut scene, MenuInput::Down);
    let pending = session.press(&mut scene, MenuInput::Confirm);
    assert_eq!(pending.redraw_party_slots.as_slice(), [2]);
    assert_eq!(scene.formation().phase(), FormationPhase::PendingSwap(2));

    session.press(&mut scene, MenuInput::Up);
    session.press(&mut scene, MenuInput::Up);
    let swapped = session.press(&mut scene, MenuInput::Confirm);
    assert_eq!(swapped.redraw_party_slots.as_slice(), [2, 0]);
    assert_eq!(session.party.0, ["Marsha", "Therese", "Harold", "Lucius"]);
    assert_eq!(scene.formation().phase(), FormationPhase::AwaitingFirstPick);

    session.press(&mut scene, MenuInput::Cancel);
    assert_eq!(scene.focus(), MenuFocus::Commands);
    assert_eq!(
        scene.selected().map(|command| command.keyword.as_str()),
        Some("formation")
    );
    assert!(session.host.calls.is_empty());
}

#[test]
fn formation_pick_then_cancel_leaves_party_order() {
    let params = structured(&[("Party", "formation", "", "")]);
    let mut session = Session::new(params, ScriptRegistry::new());
    let mut scene = session.open(&FixedState::default());
    session.select(&mut scene, "formation");

    session.press(&mut scene, MenuInput::Confirm);
    session.press(&mut scene, MenuInput::Cancel);
    session.press(&mut scene, MenuInput::Confirm);
    session.press(&mut scene, MenuInput::Cancel);

    assert_eq!(scene.formation().phase(), FormationPhase::AwaitingFirstPick);
    assert_eq!(session.party.0, ["Harold", "Therese", "Marsha", "Lucius"]);
}

#[test]
fn disabled_save_is_listed_but_not_selectable() {
    let params = structured(&[
        ("Item", "item", "", ""),
        ("Save", "save", "$gameSystem.isSaveEnabled()", ""),
        ("Quit", "toTitle", "", ""),
    ]);
    let session = Session::new(params, ScriptRegistry::new());
    let state = FixedState {
        save_enabled: false,
        ..FixedState::default()
    };

    let scene = session.open(&state);
    assert_eq!(
        rows(&scene),
        [("Item", true), ("Save", false), ("Quit", true)]
    );
}

#[test]
fn common_event_entry_schedules_event_and_closes() {
    let params = structured(&[("Items", "item", "", ""), ("Camp", "ce=7", "", "")]);
    let mut session = Session::new(params, ScriptRegistry::new());
    let mut scene = session.open(&FixedState::default());

    let result = session.select(&mut scene, "ce=7");
    assert_eq!(result.reserve_common_event, Some(7));
    assert!(result.close_menu);
    assert_eq!(session.host.calls, [HostCall::CommonEvent(7), HostCall::Pop]);
}

#[test]
fn plugin_command_entry_forwards_command_and_arguments() {
    let params = structured(&[("Craft", "cmd=OpenSynthesis arg1 arg2", "", "")]);
    let mut session = Session::new(params, ScriptRegistry::new());
    let mut scene = session.open(&FixedState::default());

    let result = session.select(&mut scene, "cmd=OpenSynthesis arg1 arg2");
    let line = result.plugin_command.expect("plugin command forwarded");
    assert_eq!(line.command, "OpenSynthesis");
    assert_eq!(line.args.as_slice(), ["arg1", "arg2"]);
    assert!(!result.close_menu);
}

#[test]
fn script_entry_runs_registered_callback() {
    let scripts = ScriptRegistry::new()
        .with("open_bestiary", |context: &mut ScriptContext| {
            context.push_scene(SceneRequest::Named("Bestiary".to_string()));
        })
        .expect("script registers");
    let params = structured(&[("Bestiary", "sc=open_bestiary", "", "")]);
    let mut session = Session::new(params, scripts);
    let mut scene = session.open(&FixedState::default());

    session.select(&mut scene, "sc=open_bestiary");
    assert_eq!(
        session.host.calls,
        [HostCall::Push(SceneRequest::Named("Bestiary".to_string()))]
    );
    assert_eq!(session.memory.initial_selection(), Some("sc=open_bestiary"));
}

#[test]
fn to_title_replaces_stack() {
    let params = structured(&[("Quit", "toTitle", "", "")]);
    let mut session = Session::new(params, ScriptRegistry::new());
    let mut scene = session.open(&FixedState::default());

    session.select(&mut scene, "toTitle");
    assert_eq!(session.host.calls, [HostCall::Title]);
}
