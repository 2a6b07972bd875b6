use crate::core::geo::Point;
use crate::utils::error::OptimizerError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 機場資料表的原始一列，座標尚未驗證
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportRecord {
    pub icao: String,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: Option<String>,
    pub point: Point,
}

impl Airport {
    pub fn new(code: impl Into<String>, name: impl Into<String>, lat: f64, lon: f64) -> crate::Result<Self> {
        Ok(Self {
            code: code.into(),
            name: name.into(),
            city: None,
            point: Point::new(lat, lon)?,
        })
    }
}

impl TryFrom<AirportRecord> for Airport {
    type Error = OptimizerError;

    fn try_from(record: AirportRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            point: Point::new(record.lat, record.lon)?,
            code: record.icao.trim().to_uppercase(),
            name: record.name,
            city: record.city.filter(|c| !c.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    #[serde(deserialize_with = "de_row_id")]
    pub id: String,
    pub tail_number: String,
    #[serde(default)]
    pub model: Option<String>,
    pub current_icao: String,
    pub next_leg_icao: String,
    #[serde(default, deserialize_with = "de_leg_time")]
    pub next_leg_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// 新增航機時送出的資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAircraft {
    pub tail_number: String,
    pub current_icao: String,
    pub next_leg_icao: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_leg_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl NewAircraft {
    pub fn new(
        tail_number: impl Into<String>,
        current_icao: impl Into<String>,
        next_leg_icao: impl Into<String>,
    ) -> Self {
        Self {
            tail_number: tail_number.into(),
            current_icao: current_icao.into(),
            next_leg_icao: next_leg_icao.into(),
            model: None,
            next_leg_time: None,
            user_id: None,
        }
    }

    /// Tail numbers are stored upper-case; codes and model are trimmed.
    pub fn normalized(mut self) -> Self {
        self.tail_number = self.tail_number.trim().to_uppercase();
        self.current_icao = self.current_icao.trim().to_uppercase();
        self.next_leg_icao = self.next_leg_icao.trim().to_uppercase();
        self.model = self
            .model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        self
    }

    pub fn into_aircraft(self, id: String) -> Aircraft {
        Aircraft {
            id,
            tail_number: self.tail_number,
            model: self.model,
            current_icao: self.current_icao,
            next_leg_icao: self.next_leg_icao,
            next_leg_time: self.next_leg_time,
            user_id: self.user_id,
        }
    }
}

/// 一次查詢所需的全部資料；機場座標在建立目錄時才驗證
#[derive(Debug, Clone, Default)]
pub struct FleetSnapshot {
    pub airports: Vec<AirportRecord>,
    pub aircraft: Vec<Aircraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetourSuggestion {
    pub code: String,
    pub name: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegMatch {
    pub aircraft_id: String,
    pub tail_number: String,
    pub origin: String,
    pub destination: String,
    pub direct_distance_km: f64,
    pub detours: Vec<DetourSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedLeg {
    pub aircraft_id: String,
    pub tail_number: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct MatchReport {
    pub matches: Vec<LegMatch>,
    pub skipped: Vec<SkippedLeg>,
    pub csv_output: String,
    pub tsv_output: String,
}

/// Row ids are uuid strings in some deployments and integers in others.
fn de_row_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct RowIdVisitor;

    impl Visitor<'_> for RowIdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer or string row id")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(RowIdVisitor)
}

/// Accepts RFC 3339 timestamps and naive `timestamp` columns (read as UTC).
pub(crate) fn de_leg_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let raw = match raw.as_deref().map(str::trim) {
        None | Some("") => return Ok(None),
        Some(s) => s,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid next_leg_time: {}", raw)))
}
