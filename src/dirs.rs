use directories::ProjectDirs;
use std::path::PathBuf;

/// Application data directory; everything (config, log, sounds) lives in
/// one place. Falls back to ./pomo when no home directory is available.
pub fn data_dir() -> PathBuf {
    let dir = match ProjectDirs::from("", "", "pomo") {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => PathBuf::from("./pomo"),
    };
    let _ = std::fs::create_dir_all(&dir);
    dir
}

pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

pub fn log_path() -> PathBuf {
    data_dir().join("pomodoro_log.csv")
}

pub fn sounds_dir() -> PathBuf {
    let dir = data_dir().join("sounds");
    let _ = std::fs::create_dir_all(&dir);
    dir
}
