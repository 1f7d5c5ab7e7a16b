use chrono::{DateTime, Local, Utc};
use rand::RngExt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use usagewatch_core::api::TrackerCore;
use usagewatch_core::status::{AppCategory, Session, SessionMetadata, SystemMetrics};

/// Foreground applications cycled through by the generator (exe, window title)
const DEMO_APPS: &[(&str, &str)] = &[
    ("code.exe", "main.rs - usagewatch - Visual Studio Code"),
    ("msedge.exe", "Usage Dashboard - Microsoft Edge"),
    ("slack.exe", "#general - Slack"),
    ("winword.exe", "Quarterly report.docx - Word"),
    ("spotify.exe", "Spotify Premium"),
    ("explorer.exe", "Downloads"),
];

/// Chance per tick that the user switches to another application
const SWITCH_PERCENT: u32 = 30;

/// Session being simulated between ticks
struct ActiveApp {
    index: usize,
    session_id: String,
    start: DateTime<Local>,
    pid: u32,
}

/// Produces plausible session/metrics samples while the tracker is running
pub struct MockGenerator {
    core: Arc<TrackerCore>,
    interval: Duration,
    started: Instant,
    switch_count: u32,
    active: Option<ActiveApp>,
}

impl MockGenerator {
    pub fn new(core: Arc<TrackerCore>, interval: Duration) -> Self {
        Self {
            core,
            interval,
            started: Instant::now(),
            switch_count: 0,
            active: None,
        }
    }

    /// Start generating in a background task
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(mut self) {
        tracing::info!(
            "Demo generator started (interval={}ms)",
            self.interval.as_millis()
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.tick();
        }
    }

    /// Record one sample if the tracker is running
    ///
    /// Returns whether a sample was recorded.
    fn tick(&mut self) -> bool {
        if !self.core.status().is_running {
            // A fresh start begins a fresh session
            self.active = None;
            return false;
        }
        let (session, metrics) = self.next_sample(Local::now());
        self.core.record_sample(session, metrics)
    }

    fn next_sample(&mut self, now: DateTime<Local>) -> (Session, SystemMetrics) {
        let mut rng = rand::rng();

        let active = match self.active.take() {
            Some(active) if rng.random_range(0..100) >= SWITCH_PERCENT => active,
            previous => {
                let mut index = rng.random_range(0..DEMO_APPS.len());
                if let Some(previous) = previous {
                    if index == previous.index {
                        index = (index + 1) % DEMO_APPS.len();
                    }
                    self.switch_count += 1;
                }
                ActiveApp {
                    index,
                    session_id: format!("session_{}", now.timestamp_millis()),
                    start: now,
                    pid: rng.random_range(1000..65000),
                }
            }
        };
        let active = self.active.insert(active);
        let (app_name, window_title) = DEMO_APPS[active.index];
        let category = AppCategory::from_app_name(app_name);

        let session = Session {
            session_id: active.session_id.clone(),
            app_name: app_name.to_string(),
            start: active.start.with_timezone(&Utc),
            window_title: window_title.to_string(),
            pid: active.pid,
            category,
            productivity_score: Some(category.productivity_score()),
            idle_time: rng.random_range(0..30),
            switch_count: self.switch_count,
            metadata: SessionMetadata::from_start(&active.start),
        };

        let metrics = SystemMetrics {
            cpu_percent: rng.random_range(5.0..65.0),
            memory_mb: rng.random_range(2048..12288),
            active_app: app_name.to_string(),
            window_title: window_title.to_string(),
            switch_count: self.switch_count,
            uptime_seconds: self.started.elapsed().as_secs(),
            productivity_score: rng.random_range(55..95),
        };

        (session, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::SimulatedLauncher;
    use usagewatch_core::api::TrackerCoreBuilder;
    use usagewatch_core::config::Settings;

    fn generator() -> MockGenerator {
        let core = TrackerCoreBuilder::new(Settings::default())
            .with_launcher(Arc::new(SimulatedLauncher::new()))
            .build();
        MockGenerator::new(Arc::new(core), Duration::from_millis(10))
    }

    #[test]
    fn test_sample_is_consistent() {
        let mut gen = generator();

        for _ in 0..50 {
            let (session, metrics) = gen.next_sample(Local::now());
            assert_eq!(session.app_name, metrics.active_app);
            assert_eq!(session.window_title, metrics.window_title);
            assert_eq!(session.category, AppCategory::from_app_name(&session.app_name));
            assert_ne!(session.category, AppCategory::Unknown);
            assert!((5.0..65.0).contains(&metrics.cpu_percent));
            assert!(metrics.productivity_score <= 100);
            assert_eq!(session.switch_count, metrics.switch_count);
        }
    }

    #[test]
    fn test_session_kept_until_switch() {
        let mut gen = generator();
        let (first, _) = gen.next_sample(Local::now());
        assert_eq!(gen.switch_count, 0);

        let (second, _) = gen.next_sample(Local::now());
        match gen.switch_count {
            0 => {
                assert_eq!(second.session_id, first.session_id);
                assert_eq!(second.start, first.start);
                assert_eq!(second.pid, first.pid);
            }
            1 => assert_ne!(second.app_name, first.app_name),
            n => panic!("unexpected switch count {}", n),
        }
    }

    #[test]
    fn test_tick_only_while_running() {
        let mut gen = generator();
        assert!(!gen.tick());
        assert!(gen.core.status().current_session.is_none());

        gen.core.start_tracking().unwrap();
        assert!(gen.tick());
        let status = gen.core.status();
        assert!(status.current_session.is_some());
        assert!(status.system_metrics.is_some());

        gen.core.stop_tracking().unwrap();
        assert!(!gen.tick());
        assert!(gen.active.is_none());
    }

    #[tokio::test]
    async fn test_generator_task_publishes_updates() {
        let gen = generator();
        let core = gen.core.clone();
        core.start_tracking().unwrap();
        let mut rx = core.subscribe();

        let task = gen.start();
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no sample recorded")
            .unwrap();
        assert_eq!(event, usagewatch_core::api::TrackerEvent::DataUpdated);

        task.abort();
    }
}
