//! Data-driven field menu and region passability plugins.
//!
//! The menu core (`config`, `field_menu`) is engine agnostic apart from the
//! Bevy derives on its resources; `plugins` wires it into a Bevy `App`.
pub mod config;
pub mod field_menu;
pub mod plugins;
pub mod presentation;
pub mod region;
