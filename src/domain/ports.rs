use crate::domain::model::{Aircraft, AirportRecord, FleetSnapshot, MatchReport, NewAircraft};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 航機與機場資料的來源（Supabase 或本機 CSV）
#[async_trait]
pub trait FleetSource: Send + Sync {
    /// Raw airport rows; coordinates are validated when the catalog is built.
    async fn fetch_airports(&self) -> Result<Vec<AirportRecord>>;
    /// Aircraft ordered by tail number, filtered to the configured owner if any.
    async fn fetch_aircraft(&self) -> Result<Vec<Aircraft>>;
    /// Inserts an already validated registration and returns the stored row.
    async fn insert_aircraft(&self, aircraft: &NewAircraft) -> Result<Aircraft>;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn detour_threshold_km(&self) -> f64;
    fn display_limit(&self) -> usize;
    /// ZIP 檔名；None 表示各格式分開寫出
    fn bundle_name(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<FleetSnapshot>;
    async fn transform(&self, snapshot: FleetSnapshot) -> Result<MatchReport>;
    /// 寫出報表，回傳輸出位置
    async fn load(&self, report: &MatchReport) -> Result<String>;
}
