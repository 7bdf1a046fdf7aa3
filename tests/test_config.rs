use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cyber_strike::config::*;

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLog {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

// Single test: the process environment is shared between test threads.
#[test]
fn settings_read_from_environment() {
    env::set_var(PROFILE_PATH_VAR, "/tmp/cs-profiles.json");
    env::set_var(LOG_PATH_VAR, "/tmp/cs.log");
    env::set_var(FRAME_MS_VAR, "33");
    env::set_var(SYNC_OUTBOX_VAR, "/tmp/cs-outbox.jsonl");
    let s = Settings::from_env();
    assert_eq!(s.profile_path, PathBuf::from("/tmp/cs-profiles.json"));
    assert_eq!(s.log_path, PathBuf::from("/tmp/cs.log"));
    assert_eq!(s.frame, Duration::from_millis(33));
    assert_eq!(s.sync_outbox, Some(PathBuf::from("/tmp/cs-outbox.jsonl")));

    // The log path is available on its own, before any subscriber exists.
    assert_eq!(log_path_from_env(), PathBuf::from("/tmp/cs.log"));

    // Out of range and unparsable frame periods fall back to 16 ms, and the
    // fallback is reported to the installed subscriber.
    env::set_var(FRAME_MS_VAR, "1000");
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let frame = tracing::subscriber::with_default(subscriber, || Settings::from_env().frame);
    assert_eq!(frame, Duration::from_millis(16));
    assert!(log.text().contains(FRAME_MS_VAR), "log = {}", log.text());
    env::set_var(FRAME_MS_VAR, "fast");
    assert_eq!(Settings::from_env().frame, Duration::from_millis(16));

    env::set_var(SYNC_OUTBOX_VAR, "");
    env::remove_var(PROFILE_PATH_VAR);
    env::remove_var(LOG_PATH_VAR);
    assert!(log_path_from_env().ends_with(".cyber_strike.log"));
    let s = Settings::from_env();
    assert_eq!(s.sync_outbox, None);
    assert!(s.profile_path.ends_with(".cyber_strike_profiles.json"));
}
