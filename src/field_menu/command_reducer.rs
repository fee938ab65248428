use std::{error::Error, fmt};

use smallvec::SmallVec;

use super::{
    action::{ActionBinding, BuiltInAction, PluginCommandLine, SceneRequest},
    routing::ScriptRegistry,
};

/// Effects of one dispatched command, for the host and the scene to apply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuReducerResult {
    pub push_scene: Option<SceneRequest>,
    pub return_to_title: bool,
    pub reserve_common_event: Option<u32>,
    pub plugin_command: Option<PluginCommandLine>,
    pub enter_formation: bool,
    pub close_menu: bool,
    pub play_buzzer: bool,
    pub redraw_party_slots: SmallVec<[usize; 2]>,
    pub dirty_menu: bool,
}

impl MenuReducerResult {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The handle a script callback gets. Scripts only describe effects; the host
/// applies them after the callback returns.
#[derive(Debug, Default)]
pub struct ScriptContext {
    result: MenuReducerResult,
}

impl ScriptContext {
    pub fn push_scene(&mut self, scene: SceneRequest) {
        self.result.push_scene = Some(scene);
    }

    pub fn reserve_common_event(&mut self, id: u32) {
        self.result.reserve_common_event = Some(id);
    }

    pub fn plugin_command(&mut self, line: PluginCommandLine) {
        self.result.plugin_command = Some(line);
    }

    pub fn return_to_title(&mut self) {
        self.result.return_to_title = true;
    }

    pub fn close_menu(&mut self) {
        self.result.close_menu = true;
    }

    fn finish(self) -> MenuReducerResult {
        self.result
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    UnboundKeyword(String),
    MissingScript(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundKeyword(keyword) => write!(f, "no action is bound to `{keyword}`"),
            Self::MissingScript(name) => write!(f, "script `{name}` is not registered"),
        }
    }
}

impl Error for DispatchError {}

fn reduce_built_in(action: BuiltInAction) -> MenuReducerResult {
    if let Some(screen) = action.screen() {
        return MenuReducerResult {
            push_scene: Some(SceneRequest::Screen(screen)),
            ..MenuReducerResult::default()
        };
    }
    match action {
        BuiltInAction::ToTitle => MenuReducerResult {
            return_to_title: true,
            ..MenuReducerResult::default()
        },
        BuiltInAction::Formation => MenuReducerResult {
            enter_formation: true,
            dirty_menu: true,
            ..MenuReducerResult::default()
        },
        _ => MenuReducerResult {
            close_menu: true,
            ..MenuReducerResult::default()
        },
    }
}

pub fn reduce_menu_selection(
    binding: &ActionBinding,
    scripts: &ScriptRegistry,
) -> Result<MenuReducerResult, DispatchError> {
    let result = match binding {
        ActionBinding::BuiltIn(action) => reduce_built_in(*action),
        ActionBinding::PluginCommand(line) => MenuReducerResult {
            plugin_command: Some(line.clone()),
            ..MenuReducerResult::default()
        },
        ActionBinding::CommonEvent(id) => MenuReducerResult {
            reserve_common_event: Some(*id),
            close_menu: true,
            ..MenuReducerResult::default()
        },
        ActionBinding::Script(name) => {
            let callback = scripts
                .get(name)
                .ok_or_else(|| DispatchError::MissingScript(name.clone()))?;
            let mut context = ScriptContext::default();
            callback(&mut context);
            context.finish()
        }
    };
    Ok(result)
}
