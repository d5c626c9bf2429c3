#[cfg(feature = "cli")]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Resource usage of this process at one stage boundary.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy)]
pub struct ProcessSample {
    pub cpu_percent: f32,
    pub rss_mb: u64,
    pub peak_rss_mb: u64,
    pub since_start: Duration,
}

#[cfg(feature = "cli")]
struct Tracked {
    pid: Pid,
    system: Mutex<System>,
}

/// Records CPU and resident memory after each reconciliation stage.
///
/// Only this process is refreshed, not the whole process table.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    tracked: Option<Tracked>,
    started: Instant,
    peak_rss_mb: AtomicU64,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let tracked = enabled
            .then(sysinfo::get_current_pid)
            .and_then(|pid| {
                pid.map_err(|e| tracing::warn!("Resource sampling unavailable: {}", e))
                    .ok()
            })
            .map(|pid| Tracked {
                pid,
                system: Mutex::new(System::new()),
            });

        Self {
            tracked,
            started: Instant::now(),
            peak_rss_mb: AtomicU64::new(0),
        }
    }

    pub fn sample(&self) -> Option<ProcessSample> {
        let tracked = self.tracked.as_ref()?;
        let mut system = tracked.system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[tracked.pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        let process = system.process(tracked.pid)?;
        let rss_mb = process.memory() / (1024 * 1024);
        let peak = self.peak_rss_mb.fetch_max(rss_mb, Ordering::Relaxed).max(rss_mb);

        Some(ProcessSample {
            cpu_percent: process.cpu_usage(),
            rss_mb,
            peak_rss_mb: peak,
            since_start: self.started.elapsed(),
        })
    }

    pub fn log_stats(&self, stage: &str) {
        if let Some(s) = self.sample() {
            tracing::info!(
                stage,
                cpu_percent = s.cpu_percent,
                rss_mb = s.rss_mb,
                peak_rss_mb = s.peak_rss_mb,
                "📊 after {}: {:.1}% cpu, {} MB resident, {:.2?} elapsed",
                stage,
                s.cpu_percent,
                s.rss_mb,
                s.since_start
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(s) = self.sample() {
            tracing::info!(
                "📊 run finished in {:.2?}, peak resident memory {} MB",
                s.since_start,
                s.peak_rss_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tracked.is_some()
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// Without sysinfo the engine still calls the same hooks; they do nothing.
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _stage: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
