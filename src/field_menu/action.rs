use std::fmt;

use enum_map::Enum;
use phf::phf_map;
use smallvec::SmallVec;

pub const CANCEL_KEYWORD: &str = "cancel";
pub const PLUGIN_COMMAND_PREFIX: &str = "cmd=";
pub const LEGACY_COMMON_EVENT_PREFIX: &str = "CEvent_";
pub const COMMON_EVENT_PREFIX: &str = "ce=";
pub const SCRIPT_PREFIX: &str = "sc=";

/// Screens a menu command can push on top of the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum MenuScreen {
    Item,
    Equip,
    Status,
    Quest,
    Save,
    Load,
    Options,
}

impl MenuScreen {
    pub fn label(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Equip => "equip",
            Self::Status => "status",
            Self::Quest => "quest",
            Self::Save => "save",
            Self::Load => "load",
            Self::Options => "options",
        }
    }
}

impl fmt::Display for MenuScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInAction {
    Item,
    Equip,
    Status,
    Quest,
    Save,
    Options,
    ToTitle,
    Load,
    Formation,
    Cancel,
}

impl BuiltInAction {
    /// The screen this action opens, if it opens one.
    pub fn screen(self) -> Option<MenuScreen> {
        match self {
            Self::Item => Some(MenuScreen::Item),
            Self::Equip => Some(MenuScreen::Equip),
            Self::Status => Some(MenuScreen::Status),
            Self::Quest => Some(MenuScreen::Quest),
            Self::Save => Some(MenuScreen::Save),
            Self::Load => Some(MenuScreen::Load),
            Self::Options => Some(MenuScreen::Options),
            Self::ToTitle | Self::Formation | Self::Cancel => None,
        }
    }
}

// Keys are the capitalized keyword, so `toTitle` and `ToTitle` both match but
// `totitle` does not.
static BUILT_IN_ACTIONS: phf::Map<&'static str, BuiltInAction> = phf_map! {
    "Item" => BuiltInAction::Item,
    "Equip" => BuiltInAction::Equip,
    "Status" => BuiltInAction::Status,
    "Quest" => BuiltInAction::Quest,
    "Save" => BuiltInAction::Save,
    "Options" => BuiltInAction::Options,
    "ToTitle" => BuiltInAction::ToTitle,
    "Load" => BuiltInAction::Load,
    "Formation" => BuiltInAction::Formation,
};

pub fn built_in_for_keyword(keyword: &str) -> Option<BuiltInAction> {
    let mut chars = keyword.chars();
    let first = chars.next()?;
    let capitalized: String = first.to_uppercase().chain(chars).collect();
    BUILT_IN_ACTIONS.get(capitalized.as_str()).copied()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCommandLine {
    pub command: String,
    pub args: SmallVec<[String; 4]>,
}

impl PluginCommandLine {
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = words.next()?.to_string();
        Some(Self {
            command,
            args: words.map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for PluginCommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// A scene the menu asks the host to push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneRequest {
    Screen(MenuScreen),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionBinding {
    BuiltIn(BuiltInAction),
    PluginCommand(PluginCommandLine),
    CommonEvent(u32),
    Script(String),
}

/// Maps a configured keyword onto its action. Prefixes are checked before the
/// built-in table, so `cmd=Item` is a plugin command and not the item screen.
pub fn resolve_keyword(keyword: &str) -> Result<ActionBinding, String> {
    if keyword == CANCEL_KEYWORD {
        return Ok(ActionBinding::BuiltIn(BuiltInAction::Cancel));
    }

    if let Some(line) = keyword.strip_prefix(PLUGIN_COMMAND_PREFIX) {
        return PluginCommandLine::parse(line)
            .map(ActionBinding::PluginCommand)
            .ok_or_else(|| "plugin command keyword has no command name".to_string());
    }

    if let Some(id) = keyword
        .strip_prefix(LEGACY_COMMON_EVENT_PREFIX)
        .or_else(|| keyword.strip_prefix(COMMON_EVENT_PREFIX))
    {
        return id
            .trim()
            .parse::<u32>()
            .map(ActionBinding::CommonEvent)
            .map_err(|_| format!("common event id `{id}` is not a non-negative integer"));
    }

    if let Some(name) = keyword.strip_prefix(SCRIPT_PREFIX) {
        let name = name.trim();
        if name.is_empty() {
            return Err("script keyword has no script name".to_string());
        }
        return Ok(ActionBinding::Script(name.to_string()));
    }

    built_in_for_keyword(keyword)
        .map(ActionBinding::BuiltIn)
        .ok_or_else(|| format!("`{keyword}` does not name a built-in command"))
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;

    #[test]
    fn built_in_keywords_match_after_capitalizing_first_letter() {
        assert_eq!(
            resolve_keyword("toTitle"),
            Ok(ActionBinding::BuiltIn(BuiltInAction::ToTitle))
        );
        assert_eq!(
            resolve_keyword("Item"),
            Ok(ActionBinding::BuiltIn(BuiltInAction::Item))
        );
        assert_eq!(
            resolve_keyword("formation"),
            Ok(ActionBinding::BuiltIn(BuiltInAction::Formation))
        );
        assert!(resolve_keyword("totitle").is_err());
        assert!(resolve_keyword("ITEM").is_err());
        assert!(resolve_keyword("").is_err());
    }

    #[test]
    fn cancel_is_literal() {
        assert_eq!(
            resolve_keyword("cancel"),
            Ok(ActionBinding::BuiltIn(BuiltInAction::Cancel))
        );
        assert!(resolve_keyword("Cancel").is_err());
    }

    #[test]
    fn plugin_command_splits_on_whitespace() {
        assert_eq!(
            resolve_keyword("cmd=OpenQuestLog  chapter 2"),
            Ok(ActionBinding::PluginCommand(PluginCommandLine {
                command: "OpenQuestLog".to_string(),
                args: smallvec!["chapter".to_string(), "2".to_string()],
            }))
        );
        assert!(resolve_keyword("cmd=   ").is_err());
    }

    #[test]
    fn both_common_event_spellings_resolve() {
        assert_eq!(resolve_keyword("ce=12"), Ok(ActionBinding::CommonEvent(12)));
        assert_eq!(resolve_keyword("CEvent_7"), Ok(ActionBinding::CommonEvent(7)));
        assert!(resolve_keyword("ce=twelve").is_err());
        assert!(resolve_keyword("ce=-1").is_err());
    }

    #[test]
    fn prefix_rules_take_precedence_over_built_ins() {
        assert_eq!(
            resolve_keyword("cmd=Item"),
            Ok(ActionBinding::PluginCommand(PluginCommandLine {
                command: "Item".to_string(),
                args: SmallVec::new(),
            }))
        );
        assert_eq!(
            resolve_keyword("sc=open_bestiary"),
            Ok(ActionBinding::Script("open_bestiary".to_string()))
        );
    }

    #[test]
    fn only_screen_actions_have_a_screen() {
        assert_eq!(BuiltInAction::Save.screen(), Some(MenuScreen::Save));
        assert_eq!(BuiltInAction::Formation.screen(), None);
        assert_eq!(BuiltInAction::ToTitle.screen(), None);
    }
}
