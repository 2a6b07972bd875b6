use crate::domain::model::MatchReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::PhaseMonitor;

/// 一次執行的結果：報表內容與輸出位置
#[derive(Debug, Clone)]
pub struct MatchRun {
    pub report: MatchReport,
    pub output_path: String,
}

pub struct MatchEngine<P: Pipeline> {
    pipeline: P,
    monitor: PhaseMonitor,
}

impl<P: Pipeline> MatchEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: PhaseMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<MatchRun> {
        tracing::info!("🚀 Starting empty-leg matching");

        tracing::info!("📥 Extracting fleet data...");
        let snapshot = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} airports and {} aircraft",
            snapshot.airports.len(),
            snapshot.aircraft.len()
        );
        self.monitor.log_phase("Extract");

        tracing::info!("🧭 Finding detours...");
        let report = self.pipeline.transform(snapshot).await?;
        tracing::info!(
            "Matched {} legs, skipped {}",
            report.matches.len(),
            report.skipped.len()
        );
        self.monitor.log_phase("Transform");

        tracing::info!("💾 Writing reports...");
        let output_path = self.pipeline.load(&report).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_phase("Load");

        self.monitor.log_final_stats();

        Ok(MatchRun {
            report,
            output_path,
        })
    }
}
