use crate::{config::BackgroundConfig, field_menu::MenuScreen};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundSpec {
    /// A picture drawn over the map snapshot.
    Picture { name: String, opacity: u8 },
    /// The blurred map snapshot, dimmed.
    DimmedSnapshot { opacity: u8 },
    /// Whatever the screen draws without menu customization.
    EngineDefault,
}

fn picture_or_dim(image: Option<&str>, opacity: u8) -> BackgroundSpec {
    match image {
        Some(name) => BackgroundSpec::Picture {
            name: name.to_string(),
            opacity,
        },
        None => BackgroundSpec::DimmedSnapshot { opacity },
    }
}

/// The command menu's own background.
pub fn menu_background(config: &BackgroundConfig) -> BackgroundSpec {
    picture_or_dim(config.image.as_deref(), config.opacity)
}

/// Background of a screen opened from the menu. With a persistent background
/// every screen reuses the menu's. The quest log draws its own.
pub fn screen_background(screen: MenuScreen, config: &BackgroundConfig) -> BackgroundSpec {
    if screen == MenuScreen::Quest {
        return BackgroundSpec::EngineDefault;
    }
    if config.persistent {
        return menu_background(config);
    }
    picture_or_dim(config.screens[screen].as_deref(), config.opacity)
}
