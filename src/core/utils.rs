use std::{
    fs,
    path::{Path, PathBuf},
};

/// Canonical shortened name of the application
pub const NAME: &str = "K-9 SmartWatch";
/// Directory name under the platform config/cache dirs
pub const DIR_NAME: &str = "k9-watch-settings";

/// `dir/k9-watch-settings`, created if needed.
///
/// Falls back to the working directory when the platform has no such dir.
pub fn setup_app_dir(dir: Option<PathBuf>) -> PathBuf {
    let dir = dir.unwrap_or_else(|| PathBuf::from(".")).join(DIR_NAME);
    if let Err(e) = fs::create_dir_all(&dir) {
        error!("Can't create directory {}: {e}", dir.display());
    };
    dir
}

pub fn log_file_name(dir: &Path, date: chrono::DateTime<chrono::Local>) -> PathBuf {
    dir.join(format!("{DIR_NAME}_{}.log", date.format("%Y%m%d")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn log_file_is_dated() {
        let date = chrono::Local
            .with_ymd_and_hms(2024, 3, 9, 12, 0, 0)
            .single()
            .unwrap_or_else(|| unreachable!());
        assert_eq!(
            log_file_name(Path::new("/tmp"), date),
            Path::new("/tmp/k9-watch-settings_20240309.log")
        );
    }

    #[test]
    fn app_dir_is_created() {
        let dir = setup_app_dir(Some(std::env::temp_dir()));
        assert!(dir.is_dir());
        assert!(dir.ends_with(DIR_NAME));
    }
}
