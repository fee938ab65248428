use super::{
    action::{PluginCommandLine, SceneRequest},
    command_reducer::MenuReducerResult,
};

/// Party roster the formation sub-mode reorders.
pub trait PartyOrder {
    fn len(&self) -> usize;
    fn swap_order(&mut self, a: usize, b: usize);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The engine side of the menu: scene navigation and event scheduling.
pub trait MenuHost {
    fn push_scene(&mut self, scene: SceneRequest);
    fn pop_scene(&mut self);
    /// Fades out and replaces the whole scene stack with the title screen.
    fn goto_title(&mut self);
    fn reserve_common_event(&mut self, id: u32);
    fn execute_plugin_command(&mut self, line: &PluginCommandLine);
}

/// Applies reducer effects in a fixed order: forwarded commands and events
/// first, then navigation. Returning to title replaces closing the menu.
pub fn apply_reducer_result<H: MenuHost + ?Sized>(result: &MenuReducerResult, host: &mut H) {
    if let Some(line) = &result.plugin_command {
        host.execute_plugin_command(line);
    }
    if let Some(id) = result.reserve_common_event {
        host.reserve_common_event(id);
    }
    if let Some(scene) = &result.push_scene {
        host.push_scene(scene.clone());
    }
    if result.return_to_title {
        host.goto_title();
    } else if result.close_menu {
        host.pop_scene();
    }
}
