use notify_rust::{Notification, Urgency};
use std::{path::Path, process::{Command, Stdio}};
use tracing::{debug, warn};

const SOUND_CANDIDATES: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// Desktop notification plus an optional chime. Never fails the caller.
pub fn notify(title: &str, body: &str, show_popup: bool, sound: bool) {
    if show_popup {
        if let Err(e) = Notification::new()
            .summary(title)
            .body(body)
            .appname("hacktimer")
            .icon("alarm-clock")
            .urgency(Urgency::Critical)
            .show()
        {
            warn!("desktop notification failed: {}", e);
        }
    }

    if sound {
        std::thread::spawn(play_chime);
    }
}

fn play_chime() {
    let Some((cmd, file)) = SOUND_CANDIDATES
        .iter()
        .find(|(_, file)| Path::new(file).exists())
    else {
        debug!("no completion sound found");
        return;
    };

    if let Err(e) = Command::new(cmd)
        .arg(file)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        debug!("could not run {}: {}", cmd, e);
    }
}
