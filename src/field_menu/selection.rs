use bevy::prelude::Resource;

/// Last confirmed command keyword and last formation slot, shared by every
/// opening of the menu within a session. Never written to save data.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionMemory {
    last_keyword: Option<String>,
    formation_slot: usize,
}

impl SelectionMemory {
    pub fn record_selection(&mut self, keyword: &str) {
        self.last_keyword = Some(keyword.to_string());
    }

    pub fn initial_selection(&self) -> Option<&str> {
        self.last_keyword.as_deref()
    }

    pub fn record_formation_slot(&mut self, slot: usize) {
        self.formation_slot = slot;
    }

    /// Party slot the formation cursor starts on; clamped on entry.
    pub fn formation_slot(&self) -> usize {
        self.formation_slot
    }

    pub fn clear(&mut self) {
        self.last_keyword = None;
        self.formation_slot = 0;
    }
}

/// Index of the remembered keyword among `keywords`, or the first row.
pub fn initial_cursor<'a>(
    memory: &SelectionMemory,
    keywords: impl IntoIterator<Item = &'a str>,
) -> usize {
    memory
        .initial_selection()
        .and_then(|remembered| keywords.into_iter().position(|keyword| keyword == remembered))
        .unwrap_or(0)
}
