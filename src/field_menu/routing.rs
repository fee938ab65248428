use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use bevy::prelude::Resource;

use super::{
    action::{resolve_keyword, ActionBinding, BuiltInAction, CANCEL_KEYWORD},
    command_reducer::ScriptContext,
};
use crate::config::{MenuConfigError, MenuEntry};

pub type ScriptCallback = Arc<dyn Fn(&mut ScriptContext) + Send + Sync>;

/// Named callbacks that `sc=<name>` entries dispatch to.
#[derive(Resource, Clone, Default)]
pub struct ScriptRegistry {
    by_name: HashMap<String, ScriptCallback>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, callback: F) -> Result<(), String>
    where
        F: Fn(&mut ScriptContext) + Send + Sync + 'static,
    {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(format!("duplicate script `{name}` in script registry"));
        }
        self.by_name.insert(name, Arc::new(callback));
        Ok(())
    }

    pub fn with<F>(mut self, name: impl Into<String>, callback: F) -> Result<Self, String>
    where
        F: Fn(&mut ScriptContext) + Send + Sync + 'static,
    {
        self.register(name, callback)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ScriptCallback> {
        self.by_name.get(name)
    }
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.by_name.keys().collect();
        names.sort();
        f.debug_struct("ScriptRegistry")
            .field("scripts", &names)
            .finish()
    }
}

/// Keyword to action table for one menu definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRouting {
    bindings: Vec<(String, ActionBinding)>,
    index: HashMap<String, usize>,
}

impl MenuRouting {
    pub fn build(entries: &[MenuEntry], scripts: &ScriptRegistry) -> Result<Self, MenuConfigError> {
        let mut seen = HashSet::new();
        let mut routing = Self {
            bindings: Vec::with_capacity(entries.len() + 1),
            index: HashMap::new(),
        };

        for entry in entries {
            if !seen.insert(entry.keyword.as_str()) {
                return Err(MenuConfigError::DuplicateKeyword {
                    keyword: entry.keyword.clone(),
                });
            }
            if entry.keyword == CANCEL_KEYWORD {
                continue;
            }

            let binding = resolve_keyword(&entry.keyword).map_err(|reason| {
                MenuConfigError::KeywordResolution {
                    entry: entry.display_name.clone(),
                    keyword: entry.keyword.clone(),
                    reason,
                }
            })?;
            if let ActionBinding::Script(name) = &binding {
                if !scripts.contains(name) {
                    return Err(MenuConfigError::KeywordResolution {
                        entry: entry.display_name.clone(),
                        keyword: entry.keyword.clone(),
                        reason: format!("script `{name}` is not registered"),
                    });
                }
            }
            routing.insert(entry.keyword.clone(), binding);
        }

        // Bound last so no configured entry can shadow closing the menu.
        routing.insert(
            CANCEL_KEYWORD.to_string(),
            ActionBinding::BuiltIn(BuiltInAction::Cancel),
        );
        Ok(routing)
    }

    fn insert(&mut self, keyword: String, binding: ActionBinding) {
        self.index.insert(keyword.clone(), self.bindings.len());
        self.bindings.push((keyword, binding));
    }

    pub fn resolve(&self, keyword: &str) -> Option<&ActionBinding> {
        self.index
            .get(keyword)
            .map(|position| &self.bindings[*position].1)
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|(keyword, _)| keyword.as_str())
    }
}
