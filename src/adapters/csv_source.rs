use crate::domain::model::{de_leg_time, Aircraft, AirportRecord, NewAircraft};
use crate::domain::ports::{FleetSource, Storage};
use crate::utils::error::{OptimizerError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_AIRPORTS_FILE: &str = "airports.csv";
pub const DEFAULT_AIRCRAFT_FILE: &str = "aircraft.csv";

/// `aircraft.csv` 的一列；id 原樣保留為字串（如 `007`）
#[derive(Debug, Deserialize)]
struct AircraftRow {
    id: String,
    tail_number: String,
    #[serde(default)]
    model: Option<String>,
    current_icao: String,
    next_leg_icao: String,
    #[serde(default, deserialize_with = "de_leg_time")]
    next_leg_time: Option<DateTime<Utc>>,
    #[serde(default)]
    user_id: Option<String>,
}

impl From<AircraftRow> for Aircraft {
    fn from(row: AircraftRow) -> Self {
        Self {
            id: row.id,
            tail_number: row.tail_number,
            model: row.model,
            current_icao: row.current_icao,
            next_leg_icao: row.next_leg_icao,
            next_leg_time: row.next_leg_time,
            user_id: row.user_id,
        }
    }
}

/// Fleet data kept as two CSV files next to each other.
///
/// `airports.csv`: `icao,name,city,lat,lon`
/// `aircraft.csv`: `id,tail_number,model,current_icao,next_leg_icao,next_leg_time,user_id`
pub struct CsvFleetSource<S: Storage> {
    storage: S,
    airports_file: String,
    aircraft_file: String,
    user_id: Option<String>,
}

impl<S: Storage> CsvFleetSource<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            airports_file: DEFAULT_AIRPORTS_FILE.to_string(),
            aircraft_file: DEFAULT_AIRCRAFT_FILE.to_string(),
            user_id: None,
        }
    }

    pub fn with_files(mut self, airports_file: impl Into<String>, aircraft_file: impl Into<String>) -> Self {
        self.airports_file = airports_file.into();
        self.aircraft_file = aircraft_file.into();
        self
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    async fn read_rows<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let data = self.storage.read_file(path).await?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data.as_slice());

        let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
        tracing::debug!("Read {} rows from {}", rows.len(), path);
        Ok(rows)
    }

    /// 檔案不存在時視為空清單（第一次新增航機）
    async fn read_all_aircraft(&self) -> Result<Vec<Aircraft>> {
        match self.read_rows::<AircraftRow>(&self.aircraft_file).await {
            Ok(rows) => Ok(rows.into_iter().map(Aircraft::from).collect()),
            Err(OptimizerError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

fn next_id(existing: &[Aircraft]) -> String {
    let max = existing
        .iter()
        .filter_map(|ac| ac.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}

#[async_trait]
impl<S: Storage> FleetSource for CsvFleetSource<S> {
    async fn fetch_airports(&self) -> Result<Vec<AirportRecord>> {
        self.read_rows(&self.airports_file).await
    }

    async fn fetch_aircraft(&self) -> Result<Vec<Aircraft>> {
        let mut aircraft: Vec<Aircraft> = self.read_all_aircraft().await?;

        if let Some(user_id) = &self.user_id {
            aircraft.retain(|ac| ac.user_id.as_deref() == Some(user_id.as_str()));
        }
        aircraft.sort_by(|a, b| a.tail_number.cmp(&b.tail_number));

        Ok(aircraft)
    }

    async fn insert_aircraft(&self, new: &NewAircraft) -> Result<Aircraft> {
        let mut rows = self.read_all_aircraft().await?;

        let mut new = new.clone();
        if new.user_id.is_none() {
            new.user_id = self.user_id.clone();
        }
        let stored = new.into_aircraft(next_id(&rows));
        rows.push(stored.clone());

        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &rows {
            writer.serialize(row)?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| OptimizerError::IoError(e.into_error()))?;

        self.storage.write_file(&self.aircraft_file, &data).await?;
        Ok(stored)
    }
}
