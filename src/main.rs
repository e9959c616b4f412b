#![windows_subsystem = "windows"]
#[macro_use]
extern crate log;

use crate::core::utils::{log_file_name, setup_app_dir};
use fern::{
    colors::{Color, ColoredLevelConfig},
    FormatCallback,
};
use log::{LevelFilter, Record};
use static_init::dynamic;
use std::path::PathBuf;
use std::{fmt::Arguments, fs::OpenOptions};

mod core;
mod gui;

#[dynamic]
static CONFIG_DIR: PathBuf = setup_app_dir(dirs::config_dir());

#[dynamic]
static CACHE_DIR: PathBuf = setup_app_dir(dirs::cache_dir());

fn main() -> iced::Result {
    if let Err(e) = setup_logger() {
        eprintln!("Logging is disabled: {e}");
    }
    gui::K9WatchSettings::start()
}

/// Overrides the file log level, e.g. `K9_WATCH_SETTINGS_LOG=trace`.
const LOG_LEVEL_VAR: &str = "K9_WATCH_SETTINGS_LOG";

/// Level of this crate's records in the log file.
///
/// Debug unless `LOG_LEVEL_VAR` names a valid level.
fn file_log_level(var: Option<&str>) -> LevelFilter {
    var.and_then(|v| v.trim().parse().ok())
        .unwrap_or(LevelFilter::Debug)
}

/// One log line: time, level, thread and module.
///
/// The thread matters because clears and notice timers run off the UI thread.
fn format_record(out: FormatCallback, message: &Arguments, record: &Record, level: &str) {
    let thread = std::thread::current();
    out.finish(format_args!(
        "{} {level} [{}] {}: {message}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        thread.name().unwrap_or("?"),
        record.target(),
    ));
}

/// Logs to stdout (warnings only) and to a new `CACHE_DIR/k9-watch-settings_{date}.log`.
/// Also attaches the terminal on Windows machines.
pub fn setup_logger() -> Result<(), fern::InitError> {
    #[cfg(target_os = "windows")]
    {
        attach_windows_console();
    }

    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .debug(Color::BrightBlack);
    let file_level = file_log_level(std::env::var(LOG_LEVEL_VAR).ok().as_deref());

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_name(&CACHE_DIR, chrono::Local::now()))?;

    // iced and wgpu are chatty; only their warnings are kept
    let file_dispatcher = fern::Dispatch::new()
        .format(|out, message, record| {
            format_record(out, message, record, &format!("{:5}", record.level()));
        })
        .level(LevelFilter::Warn)
        // Rust compiler makes module names use _ instead of -
        .level_for("k9_watch_settings", file_level)
        .chain(log_file);

    let stdout_dispatcher = fern::Dispatch::new()
        .format(move |out, message, record| {
            format_record(out, message, record, &format!("{:5}", colors.color(record.level())));
        })
        .level(LevelFilter::Warn)
        .chain(std::io::stdout());

    fern::Dispatch::new()
        .chain(stdout_dispatcher)
        .chain(file_dispatcher)
        .apply()?;

    info!("[LOG] File level: {file_level}");
    Ok(())
}

/// (Windows) Allow the application to display logs to the terminal
/// regardless if it was compiled with `windows_subsystem = "windows"`.
///
/// This is excluded on non-windows targets.
#[cfg(target_os = "windows")]
fn attach_windows_console() {
    use win32console::console::WinConsole;

    const ATTACH_PARENT_PROCESS: u32 = 0xFFFF_FFFF;
    let _ = WinConsole::attach_console(ATTACH_PARENT_PROCESS);
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn file_level_from_env() {
        assert_eq!(file_log_level(None), LevelFilter::Debug);
        assert_eq!(file_log_level(Some("trace")), LevelFilter::Trace);
        assert_eq!(file_log_level(Some(" WARN ")), LevelFilter::Warn);
        assert_eq!(file_log_level(Some("chatty")), LevelFilter::Debug);
    }

    #[test]
    fn init_logger() {
        match setup_logger() {
            Ok(()) => (),
            Err(error) => panic!("Error: {}", error),
        }
    }
}
