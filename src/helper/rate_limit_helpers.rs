use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::AppState;

/// Sliding window of upload timestamps for one client IP.
#[derive(Debug, Default)]
pub struct UploadWindow {
    hits: VecDeque<Instant>,
}

pub const WINDOW: Duration = Duration::from_secs(60);

impl UploadWindow {
    /// Prunes expired hits, then either records the attempt (true) or
    /// reports that the window is full (false). `now` is injected so the
    /// window behaviour is testable.
    pub fn check_and_record(&mut self, now: Instant, limit: usize) -> bool {
        while let Some(&front) = self.hits.front() {
            if now.duration_since(front) >= WINDOW {
                self.hits.pop_front();
            } else {
                break;
            }
        }
        if self.hits.len() >= limit {
            return false;
        }
        self.hits.push_back(now);
        true
    }
}

/// Rate-limit check for an upload from `client_ip`. Recovers a poisoned
/// lock rather than panicking the worker.
pub fn allow_upload(state: &AppState, client_ip: &str, limit: usize) -> bool {
    let mut windows = state.upload_windows.lock().unwrap_or_else(|poisoned| {
        log::error!("Upload limiter lock was poisoned! Recovering lock.");
        poisoned.into_inner()
    });
    windows
        .entry(client_ip.to_string())
        .or_default()
        .check_and_record(Instant::now(), limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_limit_within_window() {
        let mut window = UploadWindow::default();
        let now = Instant::now();
        for _ in 0..3 {
            assert!(window.check_and_record(now, 3));
        }
        assert!(!window.check_and_record(now, 3));
    }

    #[test]
    fn recovers_after_window_passes() {
        let mut window = UploadWindow::default();
        let start = Instant::now();
        for _ in 0..2 {
            assert!(window.check_and_record(start, 2));
        }
        assert!(!window.check_and_record(start, 2));
        let later = start + WINDOW + Duration::from_secs(1);
        assert!(window.check_and_record(later, 2));
    }

    #[test]
    fn partial_expiry_frees_exactly_one_slot() {
        let mut window = UploadWindow::default();
        let start = Instant::now();
        assert!(window.check_and_record(start, 2));
        assert!(window.check_and_record(start + Duration::from_secs(30), 2));
        // First hit expired, second still live.
        let t = start + WINDOW + Duration::from_secs(1);
        assert!(window.check_and_record(t, 2));
        assert!(!window.check_and_record(t, 2));
    }

    #[test]
    fn windows_are_per_ip() {
        let state = AppState::new();
        assert!(allow_upload(&state, "10.0.0.1", 1));
        assert!(!allow_upload(&state, "10.0.0.1", 1));
        assert!(allow_upload(&state, "10.0.0.2", 1));
    }
}
