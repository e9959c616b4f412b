pub mod adb;
pub mod availability;
pub mod capability;
pub mod config;
pub mod dialog;
pub mod dispatch;
pub mod events;
pub mod settings;
pub mod theme;
pub mod utils;
