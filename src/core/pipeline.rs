use crate::core::detour::{AirportCatalog, DetourFinder};
use crate::core::matcher::match_legs;
use crate::core::report::{render_csv, render_json, render_tsv};
use crate::domain::model::{FleetSnapshot, MatchReport};
use crate::domain::ports::{ConfigProvider, FleetSource, Pipeline, Storage};
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const CSV_FILE: &str = "matches.csv";
pub const TSV_FILE: &str = "matches.tsv";
pub const JSON_FILE: &str = "matches.json";

/// 讀取航機與機場、計算繞行建議、寫出報表
pub struct MatchPipeline<S: Storage, C: ConfigProvider> {
    source: Box<dyn FleetSource>,
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> MatchPipeline<S, C> {
    pub fn new(source: Box<dyn FleetSource>, storage: S, config: C) -> Self {
        Self {
            source,
            storage,
            config,
        }
    }

    /// 依設定的格式順序產生 (檔名, 內容)
    fn render_outputs(&self, report: &MatchReport) -> Result<Vec<(&'static str, String)>> {
        let mut outputs = Vec::new();
        for format in self.config.output_formats() {
            match format.as_str() {
                "csv" => outputs.push((CSV_FILE, report.csv_output.clone())),
                "tsv" => outputs.push((TSV_FILE, report.tsv_output.clone())),
                "json" => outputs.push((JSON_FILE, render_json(&report.matches, &report.skipped)?)),
                other => tracing::warn!("⚠️ Ignoring unknown output format '{}'", other),
            }
        }
        Ok(outputs)
    }
}

fn bundle(outputs: &[(&str, String)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (name, content) in outputs {
        zip.start_file::<_, ()>(*name, FileOptions::default())?;
        zip.write_all(content.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for MatchPipeline<S, C> {
    async fn extract(&self) -> Result<FleetSnapshot> {
        let airports = self.source.fetch_airports().await?;
        let aircraft = self.source.fetch_aircraft().await?;

        tracing::debug!(
            "Fetched {} airports and {} aircraft",
            airports.len(),
            aircraft.len()
        );

        Ok(FleetSnapshot { airports, aircraft })
    }

    async fn transform(&self, snapshot: FleetSnapshot) -> Result<MatchReport> {
        let catalog = AirportCatalog::from_records(snapshot.airports)?;
        if catalog.is_empty() {
            tracing::warn!("⚠️ Airport catalog is empty, every leg will be skipped");
        }

        let finder = DetourFinder::with_threshold(self.config.detour_threshold_km());
        let outcome = match_legs(&catalog, &snapshot.aircraft, &finder)?;

        let display_limit = self.config.display_limit();
        let csv_output = render_csv(&outcome.matches, display_limit)?;
        let tsv_output = render_tsv(&outcome.matches, display_limit)?;

        Ok(MatchReport {
            matches: outcome.matches,
            skipped: outcome.skipped,
            csv_output,
            tsv_output,
        })
    }

    async fn load(&self, report: &MatchReport) -> Result<String> {
        let outputs = self.render_outputs(report)?;
        let base = self.config.output_path().trim_end_matches('/');

        if let Some(bundle_name) = self.config.bundle_name() {
            tracing::debug!("Creating ZIP bundle with {} files", outputs.len());
            let zip_data = bundle(&outputs)?;

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(bundle_name, &zip_data).await?;
            return Ok(format!("{}/{}", base, bundle_name));
        }

        for (name, content) in &outputs {
            self.storage.write_file(name, content.as_bytes()).await?;
        }
        tracing::debug!("Wrote {} report files", outputs.len());
        Ok(base.to_string())
    }
}
