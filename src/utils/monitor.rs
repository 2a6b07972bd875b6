use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub phase_time: Duration,
    pub elapsed_time: Duration,
}

/// 各階段的耗時與資源用量（extract / transform / load）
pub struct PhaseMonitor {
    #[cfg(feature = "cli")]
    system: Mutex<System>,
    #[cfg(feature = "cli")]
    pid: Option<Pid>,
    start_time: Instant,
    last_mark: Mutex<Instant>,
    peak_memory: Mutex<u64>,
    enabled: bool,
}

impl PhaseMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();

        #[cfg(feature = "cli")]
        let pid = if enabled {
            match sysinfo::get_current_pid() {
                Ok(pid) => Some(pid),
                Err(e) => {
                    tracing::warn!("⚠️ Cannot resolve current process id, resource stats disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            #[cfg(feature = "cli")]
            system: Mutex::new(System::new()),
            #[cfg(feature = "cli")]
            pid,
            start_time: now,
            last_mark: Mutex::new(now),
            peak_memory: Mutex::new(0),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 結束一個階段並回傳統計；未啟用時回傳 None
    pub fn finish_phase(&self, phase: &str) -> Option<PhaseStats> {
        if !self.enabled {
            return None;
        }

        let now = Instant::now();
        let phase_time = {
            let mut last = self.last_mark.lock().ok()?;
            let elapsed = now.duration_since(*last);
            *last = now;
            elapsed
        };

        let (cpu_usage, memory_usage_mb) = self.sample();

        let peak_memory_mb = {
            let mut peak = self.peak_memory.lock().ok()?;
            *peak = (*peak).max(memory_usage_mb);
            *peak
        };

        Some(PhaseStats {
            phase: phase.to_string(),
            cpu_usage,
            memory_usage_mb,
            peak_memory_mb,
            phase_time,
            elapsed_time: now.duration_since(self.start_time),
        })
    }

    #[cfg(feature = "cli")]
    fn sample(&self) -> (f32, u64) {
        let (Some(pid), Ok(mut system)) = (self.pid, self.system.lock()) else {
            return (0.0, 0);
        };

        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        match system.process(pid) {
            Some(process) => (process.cpu_usage(), process.memory() / 1024 / 1024),
            None => (0.0, 0),
        }
    }

    #[cfg(not(feature = "cli"))]
    fn sample(&self) -> (f32, u64) {
        (0.0, 0)
    }

    pub fn log_phase(&self, phase: &str) {
        if let Some(stats) = self.finish_phase(phase) {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Phase: {:?}",
                stats.phase,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.phase_time
            );
        }
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let peak = self.peak_memory.lock().map(|p| *p).unwrap_or(0);
        tracing::info!(
            "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
            self.start_time.elapsed(),
            peak
        );
    }
}

impl Default for PhaseMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
