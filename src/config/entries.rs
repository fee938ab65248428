use serde::Deserialize;

use super::{ConditionKind, MenuConfigError, PluginParameters};
use crate::field_menu::condition::Condition;

pub const NO_ICON: i32 = -1;

const MENU_LIST_PARAM: &str = "Menu List";
const MENU_ORDER_PARAM: &str = "Menu Order";
const MENU_ICONS_PARAM: &str = "Menu Icons";

/// The list the plugin ships with when neither format is configured.
const DEFAULT_MENU_LIST: &[(&str, &str, &str)] = &[
    ("Item", "item", ""),
    ("Status", "status", ""),
    ("Save", "save", "$gameSystem.isSaveEnabled()"),
    ("Quit", "toTitle", ""),
];

#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub display_name: String,
    pub keyword: String,
    pub enable_condition: Option<Condition>,
    pub show_condition: Option<Condition>,
    pub icon: i32,
}

impl MenuEntry {
    pub fn new(display_name: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            keyword: keyword.into(),
            enable_condition: None,
            show_condition: None,
            icon: NO_ICON,
        }
    }

    pub fn with_icon(mut self, icon: i32) -> Self {
        self.icon = icon;
        self
    }

    pub fn has_icon(&self) -> bool {
        self.icon >= 0
    }
}

#[derive(Debug, Deserialize)]
struct MenuRecord {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Keyword")]
    keyword: String,
    #[serde(rename = "Enable Condition", default)]
    enable_condition: String,
    #[serde(rename = "Show Condition", default)]
    show_condition: String,
    #[serde(rename = "Icon", default)]
    icon: Option<RecordIcon>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordIcon {
    Index(i64),
    Text(String),
}

/// Reads the configured command list. A non-empty `Menu List` wins over the
/// legacy `Menu Order`/`Menu Icons` pair; with neither, the stock list is used.
pub fn parse_menu_entries(params: &PluginParameters) -> Result<Vec<MenuEntry>, MenuConfigError> {
    if let Some(records) = structured_records(params)? {
        return records
            .into_iter()
            .enumerate()
            .map(|(index, record)| entry_from_record(index, record))
            .collect();
    }

    match params.get(MENU_ORDER_PARAM).filter(|raw| !raw.trim().is_empty()) {
        Some(order) => parse_legacy_entries(order, params.get(MENU_ICONS_PARAM).unwrap_or("")),
        None => DEFAULT_MENU_LIST
            .iter()
            .map(|(name, keyword, enable)| {
                entry_from_parts(name, keyword, enable, "", NO_ICON)
            })
            .collect(),
    }
}

fn structured_records(
    params: &PluginParameters,
) -> Result<Option<Vec<MenuRecord>>, MenuConfigError> {
    let Some(raw) = params.get(MENU_LIST_PARAM).map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let items: Vec<serde_json::Value> = serde_json::from_str(raw)
        .map_err(|error| MenuConfigError::Parse(format!("`{MENU_LIST_PARAM}`: {error}")))?;
    if items.is_empty() {
        return Ok(None);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            // The host stores struct parameters as JSON text inside the list.
            let item = match item {
                serde_json::Value::String(text) => serde_json::from_str(&text).map_err(|error| {
                    MenuConfigError::InvalidRecord {
                        index,
                        reason: error.to_string(),
                    }
                })?,
                other => other,
            };
            serde_json::from_value(item).map_err(|error| MenuConfigError::InvalidRecord {
                index,
                reason: error.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn entry_from_record(index: usize, record: MenuRecord) -> Result<MenuEntry, MenuConfigError> {
    let name = record.name.trim();
    let keyword = record.keyword.trim();
    if keyword.is_empty() {
        return Err(MenuConfigError::InvalidRecord {
            index,
            reason: format!("entry `{name}` has an empty keyword"),
        });
    }
    let icon = match record.icon {
        None => NO_ICON,
        Some(RecordIcon::Index(value)) => {
            i32::try_from(value).map_err(|_| MenuConfigError::InvalidIcon {
                entry: name.to_string(),
                value: value.to_string(),
            })?
        }
        Some(RecordIcon::Text(text)) => parse_icon(name, &text)?,
    };
    entry_from_parts(
        name,
        keyword,
        &record.enable_condition,
        &record.show_condition,
        icon,
    )
}

fn parse_legacy_entries(order: &str, icons: &str) -> Result<Vec<MenuEntry>, MenuConfigError> {
    let icons: Vec<&str> = if icons.trim().is_empty() {
        Vec::new()
    } else {
        icons.split(',').map(str::trim).collect()
    };

    order
        .split(',')
        .enumerate()
        .map(|(index, pair)| {
            // `Name: keyword` with an optional third `: enable condition`.
            let mut fields = pair.splitn(3, ':').map(str::trim);
            let name = fields.next().unwrap_or_default();
            let keyword = fields.next().ok_or_else(|| MenuConfigError::InvalidRecord {
                index,
                reason: format!("`{}` is not a `Name: keyword` pair", pair.trim()),
            })?;
            let enable = fields.next().unwrap_or_default();
            if keyword.is_empty() {
                return Err(MenuConfigError::InvalidRecord {
                    index,
                    reason: format!("entry `{name}` has an empty keyword"),
                });
            }
            let icon = match icons.get(index) {
                Some(raw) => parse_icon(name, raw)?,
                None => NO_ICON,
            };
            entry_from_parts(name, keyword, enable, "", icon)
        })
        .collect()
}

fn parse_icon(entry: &str, raw: &str) -> Result<i32, MenuConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(NO_ICON);
    }
    raw.parse().map_err(|_| MenuConfigError::InvalidIcon {
        entry: entry.to_string(),
        value: raw.to_string(),
    })
}

fn entry_from_parts(
    name: &str,
    keyword: &str,
    enable: &str,
    show: &str,
    icon: i32,
) -> Result<MenuEntry, MenuConfigError> {
    Ok(MenuEntry {
        display_name: name.to_string(),
        keyword: keyword.to_string(),
        enable_condition: compile_condition(name, ConditionKind::Enable, enable)?,
        show_condition: compile_condition(name, ConditionKind::Show, show)?,
        icon,
    })
}

fn compile_condition(
    entry: &str,
    kind: ConditionKind,
    source: &str,
) -> Result<Option<Condition>, MenuConfigError> {
    if source.trim().is_empty() {
        return Ok(None);
    }
    Condition::parse(source)
        .map(Some)
        .map_err(|error| MenuConfigError::InvalidCondition {
            entry: entry.to_string(),
            kind,
            error,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_PARAMETERS_JSON: &str = include_str!("./content/plugin_parameters.example.json");

    fn summary(entries: &[MenuEntry]) -> Vec<(&str, &str, i32)> {
        entries
            .iter()
            .map(|entry| (entry.display_name.as_str(), entry.keyword.as_str(), entry.icon))
            .collect()
    }

    #[test]
    fn legacy_pairs_zip_with_icons() {
        let params = PluginParameters::new()
            .with("Menu Order", "Items: item, Skills: cmd=OpenSkills 3, Quit: toTitle")
            .with("Menu Icons", "176, 79");

        let entries = parse_menu_entries(&params).expect("legacy list parses");

        assert_eq!(
            summary(&entries),
            [
                ("Items", "item", 176),
                ("Skills", "cmd=OpenSkills 3", 79),
                ("Quit", "toTitle", NO_ICON),
            ]
        );
        assert!(entries.iter().all(|entry| entry.enable_condition.is_none()));
    }

    #[test]
    fn legacy_third_field_is_the_enable_condition() {
        let params = PluginParameters::new()
            .with("Menu Order", "Items: item, Save: save: $gameSystem.isSaveEnabled()");

        let entries = parse_menu_entries(&params).expect("legacy list parses");

        assert_eq!(summary(&entries), [("Items", "item", NO_ICON), ("Save", "save", NO_ICON)]);
        assert!(entries[0].enable_condition.is_none());
        assert_eq!(
            entries[1].enable_condition.as_ref().map(Condition::source),
            Some("$gameSystem.isSaveEnabled()")
        );
        assert!(entries[1].show_condition.is_none());
    }

    #[test]
    fn legacy_enable_condition_errors_name_the_entry() {
        let params = PluginParameters::new().with("Menu Order", "Save: save: s[1] &&");
        let error = parse_menu_entries(&params).expect_err("bad condition should fail");
        assert!(matches!(
            error,
            MenuConfigError::InvalidCondition { ref entry, kind: ConditionKind::Enable, .. }
                if entry == "Save"
        ));
    }

    #[test]
    fn legacy_pair_without_separator_is_rejected() {
        let params = PluginParameters::new().with("Menu Order", "Items: item, Status");
        let error = parse_menu_entries(&params).expect_err("missing `:` should fail");
        assert!(matches!(error, MenuConfigError::InvalidRecord { index: 1, .. }));
    }

    #[test]
    fn structured_list_supersedes_legacy_order() {
        let params = PluginParameters::from_json(EXAMPLE_PARAMETERS_JSON)
            .expect("example parameters parse")
            .with("Menu Order", "Ignored: item");

        let entries = parse_menu_entries(&params).expect("structured list parses");

        assert_eq!(
            summary(&entries),
            [
                ("Items", "item", 176),
                ("Party", "formation", NO_ICON),
                ("Bestiary", "sc=open_bestiary", 83),
                ("Camp", "ce=12", NO_ICON),
                ("Save", "save", 225),
                ("Quit", "toTitle", NO_ICON),
            ]
        );
        let save = &entries[4];
        assert_eq!(
            save.enable_condition.as_ref().map(Condition::source),
            Some("$gameSystem.isSaveEnabled()")
        );
        let bestiary = &entries[2];
        assert_eq!(
            bestiary.show_condition.as_ref().map(Condition::source),
            Some("$gameSwitches.value(4)")
        );
    }

    #[test]
    fn structured_items_may_be_plain_objects() {
        let list = r#"[{ "Name": "Status", "Keyword": "status", "Icon": 84 }]"#;
        let params = PluginParameters::new().with("Menu List", list);

        let entries = parse_menu_entries(&params).expect("object records parse");
        assert_eq!(summary(&entries), [("Status", "status", 84)]);
    }

    #[test]
    fn empty_structured_list_defers_to_legacy_order() {
        let params = PluginParameters::new()
            .with("Menu List", "[]")
            .with("Menu Order", "Status: status");

        let entries = parse_menu_entries(&params).expect("legacy list parses");
        assert_eq!(summary(&entries), [("Status", "status", NO_ICON)]);
    }

    #[test]
    fn icon_text_must_be_numeric() {
        let list = r#"["{\"Name\":\"Items\",\"Keyword\":\"item\",\"Icon\":\"bag\"}"]"#;
        let params = PluginParameters::new().with("Menu List", list);

        let error = parse_menu_entries(&params).expect_err("non-numeric icon should fail");
        assert_eq!(
            error,
            MenuConfigError::InvalidIcon {
                entry: "Items".to_string(),
                value: "bag".to_string(),
            }
        );

        let legacy = PluginParameters::new()
            .with("Menu Order", "Items: item")
            .with("Menu Icons", "seven");
        assert!(matches!(
            parse_menu_entries(&legacy),
            Err(MenuConfigError::InvalidIcon { .. })
        ));
    }

    #[test]
    fn empty_icon_text_means_no_icon() {
        let list = r#"["{\"Name\":\"Items\",\"Keyword\":\"item\",\"Icon\":\"\"}"]"#;
        let params = PluginParameters::new().with("Menu List", list);
        let entries = parse_menu_entries(&params).expect("empty icon is valid");
        assert!(!entries[0].has_icon());
    }

    #[test]
    fn condition_syntax_errors_name_the_entry() {
        let list = r#"[{ "Name": "Save", "Keyword": "save", "Show Condition": "s[1] &&" }]"#;
        let params = PluginParameters::new().with("Menu List", list);

        let error = parse_menu_entries(&params).expect_err("broken condition should fail");
        match error {
            MenuConfigError::InvalidCondition { entry, kind, .. } => {
                assert_eq!(entry, "Save");
                assert_eq!(kind, ConditionKind::Show);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_configuration_uses_stock_list() {
        let entries = parse_menu_entries(&PluginParameters::new()).expect("stock list parses");
        assert_eq!(
            summary(&entries),
            [
                ("Item", "item", NO_ICON),
                ("Status", "status", NO_ICON),
                ("Save", "save", NO_ICON),
                ("Quit", "toTitle", NO_ICON),
            ]
        );
        assert!(entries[2].enable_condition.is_some());
    }
}
