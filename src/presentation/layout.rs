use crate::config::{
    CommandTextStyle, DescriptionPlacement, GoldWindowConfig, GoldWindowPosition, ItemScreenConfig,
    TextAlignment,
};

pub const LINE_HEIGHT: i32 = 36;
pub const STANDARD_PADDING: i32 = 18;
pub const TEXT_PADDING: i32 = 6;
pub const COMMAND_WINDOW_WIDTH: i32 = 240;
pub const ICON_Y_OFFSET: i32 = 2;
pub const HELP_WINDOW_LINES: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenBox {
    pub width: i32,
    pub height: i32,
}

impl Default for ScreenBox {
    fn default() -> Self {
        Self {
            width: 816,
            height: 624,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Window height that shows exactly `rows` lines of content.
pub const fn fitting_height(rows: i32) -> i32 {
    rows * LINE_HEIGHT + STANDARD_PADDING * 2
}

pub fn command_window_rect(rows: usize, screen: ScreenBox) -> Rect {
    let height = fitting_height(rows as i32);
    Rect::new(
        (screen.width - COMMAND_WINDOW_WIDTH) / 2,
        (screen.height - height) / 2,
        COMMAND_WINDOW_WIDTH,
        height,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconPlacement {
    pub index: i32,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    pub icon: Option<IconPlacement>,
    pub text: Rect,
    pub alignment: TextAlignment,
}

/// Layout of one command row, in window content coordinates.
pub fn row_layout(index: usize, icon: i32, style: &CommandTextStyle) -> RowLayout {
    let content_width = COMMAND_WINDOW_WIDTH - STANDARD_PADDING * 2;
    let row = Rect::new(
        TEXT_PADDING,
        index as i32 * LINE_HEIGHT,
        content_width - TEXT_PADDING * 2,
        LINE_HEIGHT,
    );

    let mut offset = if style.offset_icon_only { 0 } else { style.offset };
    let icon = (icon >= 0).then(|| {
        offset = style.offset;
        IconPlacement {
            index: icon,
            x: row.x,
            y: row.y + ICON_Y_OFFSET,
        }
    });

    RowLayout {
        icon,
        text: Rect::new(row.x + offset, row.y, row.width - offset, row.height),
        alignment: style.alignment,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCategory {
    Item,
    Weapon,
    Armor,
    KeyItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemScreenLayout {
    pub help: Rect,
    pub category: Rect,
    pub items: Rect,
    pub gold: Option<Rect>,
    pub categories: Vec<ItemCategory>,
    pub category_columns: u32,
}

impl ItemScreenLayout {
    pub fn compute(
        item_screen: &ItemScreenConfig,
        gold_window: &GoldWindowConfig,
        screen: ScreenBox,
    ) -> Self {
        let help_height = fitting_height(HELP_WINDOW_LINES);
        let bar_height = fitting_height(1);

        let (category_x, category_width) = match (gold_window.show, gold_window.position) {
            (false, _) => (0, screen.width),
            (true, GoldWindowPosition::Left) => {
                (gold_window.width, screen.width - gold_window.width)
            }
            (true, GoldWindowPosition::Right) => (0, screen.width - gold_window.width),
        };
        let gold_x = match gold_window.position {
            GoldWindowPosition::Left => 0,
            GoldWindowPosition::Right => screen.width - gold_window.width,
        };

        let (help_y, bar_y) = match item_screen.description {
            DescriptionPlacement::Top => (0, help_height),
            DescriptionPlacement::BelowCategories => (bar_height, 0),
            DescriptionPlacement::Bottom => (screen.height - help_height, 0),
        };
        let items_y = match item_screen.description {
            DescriptionPlacement::Top => bar_y + bar_height,
            DescriptionPlacement::BelowCategories => bar_y + bar_height + help_height,
            DescriptionPlacement::Bottom => bar_height,
        };
        // The list always leaves room for both the tabs and the help window.
        let items_height = screen.height - bar_height - help_height;

        let categories = [
            (item_screen.show_consumables, ItemCategory::Item),
            (item_screen.show_weapons, ItemCategory::Weapon),
            (item_screen.show_armors, ItemCategory::Armor),
            (item_screen.show_key_items, ItemCategory::KeyItem),
        ]
        .into_iter()
        .filter_map(|(shown, category)| shown.then_some(category))
        .collect();

        Self {
            help: Rect::new(0, help_y, screen.width, help_height),
            category: Rect::new(category_x, bar_y, category_width, bar_height),
            items: Rect::new(0, items_y, screen.width, items_height),
            gold: gold_window
                .show
                .then(|| Rect::new(gold_x, bar_y, gold_window.width, bar_height)),
            categories,
            category_columns: item_screen.tabs,
        }
    }
}
