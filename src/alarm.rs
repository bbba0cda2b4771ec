use notify_rust::{Notification, Urgency};
use std::path::{Path, PathBuf};

use crate::timer::TimerKind;

// System sounds tried when the configured alarm file is missing.
const FALLBACK_SOUNDS: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

const PLAYERS: &[&str] = &["paplay", "aplay", "afplay"];

/// Alarm choices for the settings view: base filenames in the sounds
/// directory, extensions stripped, sorted.
pub fn available_alarms(sounds_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(sounds_dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .filter_map(|e| {
                    e.path()
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                })
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names.dedup();
    names
}

/// Find the sound file whose stem matches the configured alarm name.
pub fn resolve(sounds_dir: &Path, name: &str) -> Option<PathBuf> {
    std::fs::read_dir(sounds_dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| p.is_file() && p.file_stem().is_some_and(|stem| stem == name))
}

/// Fire-and-forget alarm playback on a worker thread. Every failure is
/// swallowed: a silent alarm must never interrupt the timer flow.
pub fn play(sounds_dir: &Path, name: &str) {
    let sound_file = resolve(sounds_dir, name);
    std::thread::spawn(move || {
        if let Some(file) = sound_file {
            for &player in PLAYERS {
                if spawn_player(player, &file) {
                    return;
                }
            }
        }
        for &(player, file) in FALLBACK_SOUNDS {
            if Path::new(file).exists() && spawn_player(player, Path::new(file)) {
                return;
            }
        }
    });
}

fn spawn_player(player: &str, file: &Path) -> bool {
    std::process::Command::new(player)
        .arg(file)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .is_ok()
}

/// Desktop notification on completion; failures are swallowed like audio.
pub fn notify_complete(kind: TimerKind) {
    let body = if kind.is_focus() {
        "Focus session complete. Time for a break."
    } else {
        "Break over. Back to focus."
    };
    let _ = Notification::new()
        .summary(&format!("{} finished", kind.name()))
        .body(body)
        .appname("pomo")
        .icon("alarm-clock")
        .urgency(Urgency::Critical)
        .show();
}
