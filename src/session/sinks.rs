//! Output collaborators of the session: notifications and the alarm

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use crate::models::Notification;

/// Receives user-visible notifications
pub trait NotificationSink: Send {
    fn notify(&mut self, notification: Notification);
}

/// Plays the expiry alarm
pub trait AlarmSink: Send {
    fn ring(&mut self);
}

impl AlarmSink for Box<dyn AlarmSink> {
    fn ring(&mut self) {
        (**self).ring()
    }
}

/// Shared in-memory notification log
///
/// Clones share the same buffer, so one half can be handed to the session
/// while the other is read by the renderer or a test.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything logged so far
    pub fn drain(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .map(|mut entries| std::mem::take(&mut *entries))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for NotificationLog {
    fn notify(&mut self, notification: Notification) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(notification);
        }
    }
}

/// Writes notifications to the tracing log only
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&mut self, notification: Notification) {
        tracing::info!(
            severity = ?notification.severity,
            "{}: {}",
            notification.title,
            notification.description
        );
    }
}

/// Counts rings; clones share the counter
#[derive(Debug, Clone, Default)]
pub struct AlarmCounter {
    rings: Arc<Mutex<usize>>,
}

impl AlarmCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rings(&self) -> usize {
        self.rings.lock().map(|r| *r).unwrap_or(0)
    }
}

impl AlarmSink for AlarmCounter {
    fn ring(&mut self) {
        if let Ok(mut rings) = self.rings.lock() {
            *rings += 1;
        }
    }
}

/// Alarm that never sounds (`--no-alarm`)
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAlarm;

impl AlarmSink for SilentAlarm {
    fn ring(&mut self) {
        tracing::debug!("alarm suppressed");
    }
}

/// Terminal bell
#[derive(Debug, Clone, Copy, Default)]
pub struct BellAlarm;

impl AlarmSink for BellAlarm {
    fn ring(&mut self) {
        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            tracing::warn!(error = %e, "failed to ring terminal bell");
        }
    }
}

/// Plays a sound file through an external player, bell if it can't start
#[derive(Debug, Clone)]
pub struct SoundAlarm {
    command: String,
    sound: PathBuf,
}

impl SoundAlarm {
    pub fn new(command: impl Into<String>, sound: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            sound: sound.into(),
        }
    }

    /// Default player for this platform
    pub fn default_command() -> &'static str {
        if cfg!(target_os = "macos") {
            "afplay"
        } else {
            "paplay"
        }
    }

    fn player_args(&self) -> Vec<String> {
        let sound = self.sound.display().to_string();
        match self.command.as_str() {
            "mpv" => vec!["--no-video".into(), "--really-quiet".into(), sound],
            "ffplay" => vec![
                "-nodisp".into(),
                "-autoexit".into(),
                "-loglevel".into(),
                "quiet".into(),
                sound,
            ],
            _ => vec![sound],
        }
    }
}

impl AlarmSink for SoundAlarm {
    fn ring(&mut self) {
        if !self.sound.exists() {
            tracing::warn!(sound = %self.sound.display(), "alarm sound missing, using bell");
            BellAlarm.ring();
            return;
        }

        let mut cmd = tokio::process::Command::new(&self.command);
        cmd.args(self.player_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false);

        match cmd.spawn() {
            Ok(mut child) => {
                tokio::spawn(async move {
                    let _ = child.wait().await;
                });
            }
            Err(e) => {
                tracing::warn!(command = %self.command, error = %e, "alarm player failed to start");
                BellAlarm.ring();
            }
        }
    }
}
