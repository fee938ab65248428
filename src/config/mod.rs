use std::{collections::HashMap, error::Error, fmt, str::FromStr};

use enum_map::EnumMap;
use serde::Deserialize;

use crate::field_menu::{condition::ExpressionError, MenuScreen};

pub mod entries;

pub use entries::{parse_menu_entries, MenuEntry, NO_ICON};

pub const MENU_PLUGIN_NAME: &str = "NonCombatMenu";
pub const REGION_PLUGIN_NAME: &str = "YEP_RegionRestrictions";

/// Raw parameter table of one plugin, as the host hands it over: every value
/// is text, including numbers, flags and nested JSON lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginParameters {
    values: HashMap<String, String>,
}

impl PluginParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, MenuConfigError> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|error| MenuConfigError::Parse(format!("plugin parameters: {error}")))?;
        Ok(Self::from_values(raw))
    }

    fn from_values(raw: HashMap<String, serde_json::Value>) -> Self {
        let values = raw
            .into_iter()
            .map(|(name, value)| {
                let text = match value {
                    serde_json::Value::String(text) => text,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (name, text)
            })
            .collect();
        Self { values }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn text_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// `yes`/`no` switches; `true`/`false` are accepted as well.
    pub fn flag(&self, name: &str, default: bool) -> Result<bool, ParameterError> {
        let Some(raw) = self.get(name).map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(default);
        };
        match raw.to_ascii_lowercase().as_str() {
            "yes" | "true" | "on" => Ok(true),
            "no" | "false" | "off" => Ok(false),
            _ => Err(ParameterError::new(name, raw, "expected `yes` or `no`")),
        }
    }

    pub fn number<T: FromStr>(&self, name: &str, default: T) -> Result<T, ParameterError> {
        let Some(raw) = self.get(name).map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(default);
        };
        raw.parse()
            .map_err(|_| ParameterError::new(name, raw, "expected a number"))
    }

    /// Picture names are stored without the `.png` suffix; blank means none.
    pub fn image(&self, name: &str) -> Option<String> {
        let raw = self.get(name)?.trim();
        let stem = raw.strip_suffix(".png").unwrap_or(raw);
        (!stem.is_empty()).then(|| stem.to_string())
    }
}

/// The host's plugin list: `[{ "name": ..., "status": true, "parameters": {...} }]`.
#[derive(Debug, Clone, Default)]
pub struct PluginManifest {
    plugins: Vec<(String, bool, PluginParameters)>,
}

#[derive(Debug, Deserialize)]
struct PluginManifestEntry {
    name: String,
    #[serde(default = "enabled_by_default")]
    status: bool,
    #[serde(default)]
    parameters: HashMap<String, serde_json::Value>,
}

fn enabled_by_default() -> bool {
    true
}

impl PluginManifest {
    pub fn from_json(json: &str) -> Result<Self, MenuConfigError> {
        let entries: Vec<PluginManifestEntry> = serde_json::from_str(json)
            .map_err(|error| MenuConfigError::Parse(format!("plugin manifest: {error}")))?;
        let plugins = entries
            .into_iter()
            .map(|entry| {
                (
                    entry.name,
                    entry.status,
                    PluginParameters::from_values(entry.parameters),
                )
            })
            .collect();
        Ok(Self { plugins })
    }

    /// Parameters of an enabled plugin. Disabled plugins are invisible.
    pub fn parameters(&self, plugin: &str) -> Option<&PluginParameters> {
        self.plugins
            .iter()
            .find(|(name, enabled, _)| *enabled && name == plugin)
            .map(|(_, _, parameters)| parameters)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterError {
    pub name: String,
    pub value: String,
    pub reason: String,
}

impl ParameterError {
    pub fn new(name: &str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parameter `{}` = `{}`: {}",
            self.name, self.value, self.reason
        )
    }
}

impl Error for ParameterError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Enable,
    Show,
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enable => write!(f, "enable condition"),
            Self::Show => write!(f, "show condition"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuConfigError {
    Parse(String),
    InvalidParameter(ParameterError),
    InvalidRecord {
        index: usize,
        reason: String,
    },
    InvalidIcon {
        entry: String,
        value: String,
    },
    InvalidCondition {
        entry: String,
        kind: ConditionKind,
        error: ExpressionError,
    },
    KeywordResolution {
        entry: String,
        keyword: String,
        reason: String,
    },
    DuplicateKeyword {
        keyword: String,
    },
}

impl fmt::Display for MenuConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "menu config parse error: {err}"),
            Self::InvalidParameter(err) => write!(f, "invalid menu parameter: {err}"),
            Self::InvalidRecord { index, reason } => {
                write!(f, "invalid menu entry #{index}: {reason}")
            }
            Self::InvalidIcon { entry, value } => write!(
                f,
                "menu entry `{entry}` has a non-numeric icon `{value}`"
            ),
            Self::InvalidCondition { entry, kind, error } => {
                write!(f, "menu entry `{entry}` has an invalid {kind}: {error}")
            }
            Self::KeywordResolution {
                entry,
                keyword,
                reason,
            } => write!(
                f,
                "keyword resolution error for entry `{entry}` / keyword `{keyword}`: {reason}"
            ),
            Self::DuplicateKeyword { keyword } => {
                write!(f, "duplicate menu keyword `{keyword}`")
            }
        }
    }
}

impl Error for MenuConfigError {}

impl From<ParameterError> for MenuConfigError {
    fn from(error: ParameterError) -> Self {
        Self::InvalidParameter(error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlignment {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTextStyle {
    pub alignment: TextAlignment,
    pub offset: i32,
    /// Only rows that actually carry an icon get the text offset.
    pub offset_icon_only: bool,
}

impl Default for CommandTextStyle {
    fn default() -> Self {
        Self {
            alignment: TextAlignment::Left,
            offset: 40,
            offset_icon_only: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundConfig {
    pub image: Option<String>,
    pub persistent: bool,
    pub opacity: u8,
    pub screens: EnumMap<MenuScreen, Option<String>>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            image: None,
            persistent: false,
            opacity: 128,
            screens: EnumMap::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DescriptionPlacement {
    #[default]
    Top,
    BelowCategories,
    Bottom,
}

impl DescriptionPlacement {
    fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Top),
            1 => Some(Self::BelowCategories),
            2 => Some(Self::Bottom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemScreenConfig {
    pub tabs: u32,
    pub show_consumables: bool,
    pub show_key_items: bool,
    pub show_weapons: bool,
    pub show_armors: bool,
    pub description: DescriptionPlacement,
}

impl Default for ItemScreenConfig {
    fn default() -> Self {
        Self {
            tabs: 2,
            show_consumables: true,
            show_key_items: true,
            show_weapons: false,
            show_armors: false,
            description: DescriptionPlacement::Top,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GoldWindowPosition {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldWindowConfig {
    pub show: bool,
    pub position: GoldWindowPosition,
    pub width: i32,
}

impl Default for GoldWindowConfig {
    fn default() -> Self {
        Self {
            show: true,
            position: GoldWindowPosition::Left,
            width: 240,
        }
    }
}

/// Everything the menu plugin reads from its parameters, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuConfig {
    pub entries: Vec<MenuEntry>,
    pub command_text: CommandTextStyle,
    pub backgrounds: BackgroundConfig,
    pub item_screen: ItemScreenConfig,
    pub gold_window: GoldWindowConfig,
}

impl MenuConfig {
    pub fn from_parameters(params: &PluginParameters) -> Result<Self, MenuConfigError> {
        Ok(Self {
            entries: parse_menu_entries(params)?,
            command_text: parse_command_text(params)?,
            backgrounds: parse_backgrounds(params)?,
            item_screen: parse_item_screen(params)?,
            gold_window: parse_gold_window(params)?,
        })
    }
}

fn parse_command_text(params: &PluginParameters) -> Result<CommandTextStyle, ParameterError> {
    let defaults = CommandTextStyle::default();
    let alignment = match params.get("Text Alignment").filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => TextAlignment::parse(raw).ok_or_else(|| {
            ParameterError::new("Text Alignment", raw, "expected left, right or center")
        })?,
        None => defaults.alignment,
    };
    Ok(CommandTextStyle {
        alignment,
        offset: params.number("Text Offset", defaults.offset)?,
        offset_icon_only: params.flag("Offset Only Icons", defaults.offset_icon_only)?,
    })
}

fn parse_backgrounds(params: &PluginParameters) -> Result<BackgroundConfig, ParameterError> {
    let defaults = BackgroundConfig::default();
    let opacity: i64 = params.number("Menu Background Opacity", i64::from(defaults.opacity))?;
    let opacity = u8::try_from(opacity).map_err(|_| {
        ParameterError::new(
            "Menu Background Opacity",
            &opacity.to_string(),
            "expected a value between 0 and 255",
        )
    })?;

    let mut screens = EnumMap::default();
    for (screen, parameter) in [
        (MenuScreen::Item, "Item Screen BG"),
        (MenuScreen::Equip, "Equip Screen BG"),
        (MenuScreen::Status, "Status Screen BG"),
        (MenuScreen::Save, "Save Screen BG"),
        (MenuScreen::Load, "Load Screen BG"),
        (MenuScreen::Options, "Options Screen BG"),
    ] {
        screens[screen] = params.image(parameter);
    }

    Ok(BackgroundConfig {
        image: params.image("Background Image"),
        persistent: params.flag("Persistent Background", defaults.persistent)?,
        opacity,
        screens,
    })
}

fn parse_item_screen(params: &PluginParameters) -> Result<ItemScreenConfig, ParameterError> {
    let defaults = ItemScreenConfig::default();
    let placement: u8 = params.number("Description Placement", 0)?;
    let description = DescriptionPlacement::from_index(placement).ok_or_else(|| {
        ParameterError::new(
            "Description Placement",
            &placement.to_string(),
            "expected 0 (top), 1 (below tabs) or 2 (bottom)",
        )
    })?;
    let tabs = params.number("Number of Tabs", defaults.tabs)?;
    if tabs == 0 {
        return Err(ParameterError::new(
            "Number of Tabs",
            "0",
            "at least one tab column is required",
        ));
    }

    Ok(ItemScreenConfig {
        tabs,
        show_consumables: params.flag("Show Consumables", defaults.show_consumables)?,
        show_key_items: params.flag("Show Key Items", defaults.show_key_items)?,
        show_weapons: params.flag("Show Weapons", defaults.show_weapons)?,
        show_armors: params.flag("Show Armors", defaults.show_armors)?,
        description,
    })
}

fn parse_gold_window(params: &PluginParameters) -> Result<GoldWindowConfig, ParameterError> {
    let defaults = GoldWindowConfig::default();
    let position = match params
        .get("Gold Window Position")
        .map(|raw| raw.trim().to_ascii_lowercase())
        .as_deref()
    {
        None | Some("") | Some("left") => GoldWindowPosition::Left,
        Some("right") => GoldWindowPosition::Right,
        Some(other) => {
            return Err(ParameterError::new(
                "Gold Window Position",
                other,
                "expected left or right",
            ))
        }
    };
    let width = params.number("Gold Window Width", defaults.width)?;
    if width <= 0 {
        return Err(ParameterError::new(
            "Gold Window Width",
            &width.to_string(),
            "width must be positive",
        ));
    }

    Ok(GoldWindowConfig {
        show: params.flag("Show Gold Window", defaults.show)?,
        position,
        width,
    })
}
