//! Periodic trigger for the daily check.
//!
//! The scheduler is an ordinary value: build it, `start` it to get a
//! [`SchedulerHandle`], and `stop` the handle to shut the loop down. Each
//! tick runs on its own task; a tick that fires while the previous one still
//! runs is skipped.

use crate::domain::ports::ScheduledJob;
use crate::utils::error::{ReminderError, Result};
use chrono::{Local, NaiveDateTime, NaiveTime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Once a day at a fixed local time.
    Daily { at: NaiveTime },
    /// Fixed period, first tick one period after start.
    Interval(Duration),
}

impl Schedule {
    pub fn daily(hour: u32, min: u32) -> Result<Self> {
        let at = NaiveTime::from_hms_opt(hour, min, 0).ok_or_else(|| {
            ReminderError::InvalidConfigValueError {
                field: "schedule.time".to_string(),
                value: format!("{:02}:{:02}", hour, min),
                reason: "Not a valid time of day".to_string(),
            }
        })?;
        Ok(Self::Daily { at })
    }

    /// 解析 `HH:MM` 格式
    pub fn parse_daily(value: &str) -> Result<Self> {
        let at = NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| {
            ReminderError::InvalidConfigValueError {
                field: "schedule.time".to_string(),
                value: value.to_string(),
                reason: format!("Expected HH:MM ({})", e),
            }
        })?;
        Ok(Self::Daily { at })
    }

    pub fn delay_from(&self, now: NaiveDateTime) -> Duration {
        match self {
            Self::Daily { at } => (next_daily_fire(now, *at) - now)
                .to_std()
                .unwrap_or(Duration::ZERO),
            Self::Interval(period) => *period,
        }
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily { at } => write!(f, "daily at {}", at.format("%H:%M")),
            Self::Interval(period) => write!(f, "every {:?}", period),
        }
    }
}

/// The next time `at` strictly after `now`.
pub fn next_daily_fire(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today_fire = now.date().and_time(at);
    if today_fire > now {
        today_fire
    } else {
        today_fire + chrono::Duration::days(1)
    }
}

/// "Skip if already running" flag shared between ticks.
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    pub fn try_begin(&self) -> Option<RunPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit {
                running: Arc::clone(&self.running),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Releases the guard when dropped.
#[derive(Debug)]
pub struct RunPermit {
    running: Arc<AtomicBool>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

pub struct DailyScheduler<J: ScheduledJob> {
    schedule: Schedule,
    job: Arc<J>,
    guard: RunGuard,
}

impl<J: ScheduledJob> DailyScheduler<J> {
    pub fn new(schedule: Schedule, job: J) -> Self {
        Self {
            schedule,
            job: Arc::new(job),
            guard: RunGuard::default(),
        }
    }

    pub fn start(self) -> SchedulerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let guard = self.guard.clone();

        tracing::info!("⏰ Scheduler started, running {}", self.schedule);

        let task = tokio::spawn(async move {
            let mut in_flight: Option<JoinHandle<()>> = None;

            loop {
                let delay = self.schedule.delay_from(Local::now().naive_local());
                tracing::debug!("Next tick in {:?}", delay);

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        if let Some(tick) = self.fire() {
                            in_flight = Some(tick);
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            if let Some(tick) = in_flight {
                if !tick.is_finished() {
                    tracing::info!("Waiting for the running check to finish");
                }
                if let Err(e) = tick.await {
                    tracing::error!("Scheduled check ended abnormally: {}", e);
                }
            }
            tracing::info!("Scheduler stopped");
        });

        SchedulerHandle {
            stop_tx,
            task,
            guard,
        }
    }

    /// Spawns a tick unless the previous one still holds the guard.
    fn fire(&self) -> Option<JoinHandle<()>> {
        let Some(permit) = self.guard.try_begin() else {
            tracing::warn!("⏭️ Previous check still running, skipping this tick");
            return None;
        };

        let job = Arc::clone(&self.job);
        let today = Local::now().date_naive();
        Some(tokio::spawn(async move {
            let _permit = permit;
            job.run_tick(today).await;
        }))
    }
}

pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    guard: RunGuard,
}

impl SchedulerHandle {
    pub fn is_tick_running(&self) -> bool {
        self.guard.is_running()
    }

    /// Stops future ticks and waits for a tick already in flight to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::error!("Scheduler loop ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[derive(Default)]
    struct CountingJob {
        runs: Arc<AtomicUsize>,
        hold: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl ScheduledJob for CountingJob {
        async fn run_tick(&self, _today: NaiveDate) {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
        }
    }

    #[test]
    fn test_next_daily_fire_later_today() {
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(next_daily_fire(at(2024, 3, 10, 8, 30), time), at(2024, 3, 10, 9, 0));
    }

    #[test]
    fn test_next_daily_fire_rolls_to_tomorrow() {
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(next_daily_fire(at(2024, 3, 10, 9, 0), time), at(2024, 3, 11, 9, 0));
        assert_eq!(next_daily_fire(at(2024, 12, 31, 23, 0), time), at(2025, 1, 1, 9, 0));
    }

    #[test]
    fn test_daily_delay() {
        let schedule = Schedule::daily(9, 0).unwrap();
        assert_eq!(
            schedule.delay_from(at(2024, 3, 10, 8, 0)),
            Duration::from_secs(3600)
        );
        assert_eq!(schedule.to_string(), "daily at 09:00");
    }

    #[test]
    fn test_parse_daily() {
        assert_eq!(
            Schedule::parse_daily("07:45").unwrap(),
            Schedule::daily(7, 45).unwrap()
        );
        assert!(Schedule::parse_daily("25:00").is_err());
        assert!(Schedule::parse_daily("noon").is_err());
        assert!(Schedule::daily(24, 0).is_err());
    }

    #[test]
    fn test_run_guard_allows_one_holder() {
        let guard = RunGuard::default();

        let permit = guard.try_begin().expect("first run should start");
        assert!(guard.is_running());
        assert!(guard.try_begin().is_none());

        drop(permit);
        assert!(!guard.is_running());
        assert!(guard.try_begin().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_ticks_until_stopped() {
        let job = CountingJob::default();
        let runs = Arc::clone(&job.runs);

        let handle =
            DailyScheduler::new(Schedule::Interval(Duration::from_millis(20)), job).start();
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.stop().await;

        let after_stop = runs.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "expected several ticks, got {}", after_stop);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_ticks_are_skipped() {
        let hold = Arc::new(Notify::new());
        let job = CountingJob {
            runs: Arc::new(AtomicUsize::new(0)),
            hold: Some(Arc::clone(&hold)),
        };
        let runs = Arc::clone(&job.runs);

        let handle =
            DailyScheduler::new(Schedule::Interval(Duration::from_millis(10)), job).start();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(handle.is_tick_running());
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        hold.notify_one();
        handle.stop().await;
    }

    struct SlowJob {
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ScheduledJob for SlowJob {
        async fn run_tick(&self, _today: NaiveDate) {
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.finished.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_waits_for_running_tick() {
        let finished = Arc::new(AtomicBool::new(false));
        let job = SlowJob {
            finished: Arc::clone(&finished),
        };

        let handle =
            DailyScheduler::new(Schedule::Interval(Duration::from_millis(10)), job).start();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(handle.is_tick_running());
        assert!(!finished.load(Ordering::SeqCst));

        handle.stop().await;
        assert!(finished.load(Ordering::SeqCst));
    }
}
