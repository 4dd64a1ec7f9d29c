//! Terminal implementations of the host collaborators.

use std::{
    cell::RefCell,
    io::{self, Stdout, Write},
    time::Duration,
};

use actions_engine::{AlertSink, NotificationSink, TimerCallback, TimerService};
use tracing::{info, warn};

/// BEL control character; terminals turn it into the system alert sound.
const BELL: &[u8] = b"\x07";

/// Prints notifications as `[application] title` followed by an indented body.
pub struct ConsoleNotifications<W: Write = Stdout> {
    application_name: String,
    writer: RefCell<W>,
}

impl ConsoleNotifications<Stdout> {
    pub fn new(application_name: impl Into<String>) -> Self {
        Self::with_writer(application_name, io::stdout())
    }
}

impl<W: Write> ConsoleNotifications<W> {
    pub fn with_writer(application_name: impl Into<String>, writer: W) -> Self {
        Self {
            application_name: application_name.into(),
            writer: RefCell::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> NotificationSink for ConsoleNotifications<W> {
    fn send(&self, title: &str, body: Option<&str>) {
        info!(title, body, "notification");
        let mut writer = self.writer.borrow_mut();
        let mut result = writeln!(writer, "[{}] {}", self.application_name, title);
        if let Some(body) = body {
            result = result.and_then(|_| writeln!(writer, "    {body}"));
        }
        if let Err(error) = result.and_then(|_| writer.flush()) {
            warn!(%error, "failed to print notification");
        }
    }
}

/// Rings the terminal bell unless muted.
pub struct ConsoleAlerts<W: Write = Stdout> {
    muted: bool,
    writer: RefCell<W>,
}

impl ConsoleAlerts<Stdout> {
    pub fn new(muted: bool) -> Self {
        Self::with_writer(muted, io::stdout())
    }
}

impl<W: Write> ConsoleAlerts<W> {
    pub fn with_writer(muted: bool, writer: W) -> Self {
        Self {
            muted,
            writer: RefCell::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> AlertSink for ConsoleAlerts<W> {
    fn beep(&self) {
        if self.muted {
            info!("alert muted");
            return;
        }
        let mut writer = self.writer.borrow_mut();
        if let Err(error) = writer.write_all(BELL).and_then(|_| writer.flush()) {
            warn!(%error, "failed to ring terminal bell");
        }
    }
}

/// Timer backed by the Tokio clock. Must be used inside a [`tokio::task::LocalSet`].
pub struct TokioTimer;

impl TimerService for TokioTimer {
    fn schedule(&self, seconds: u64, callback: TimerCallback) {
        tokio::task::spawn_local(async move {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            callback();
        });
    }
}
