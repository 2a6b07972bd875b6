//! Midpoint-based detour search along a single leg.
//!
//! A leg's midpoint is the arithmetic mean of its endpoints. Every catalog
//! airport closer to that midpoint than the configured threshold, other than
//! the leg's own endpoints, is a detour candidate. Candidates are ranked
//! nearest first; equal distances keep catalog order.

use crate::core::geo::{distance, Point};
use crate::domain::model::{Airport, AirportRecord, DetourSuggestion};
use crate::utils::error::{OptimizerError, Result};
use crate::utils::validation::validate_positive_float;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_DETOUR_THRESHOLD_KM: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetourConfig {
    #[serde(default = "default_threshold")]
    pub detour_threshold_km: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_DETOUR_THRESHOLD_KM
}

impl Default for DetourConfig {
    fn default() -> Self {
        Self {
            detour_threshold_km: DEFAULT_DETOUR_THRESHOLD_KM,
        }
    }
}

impl crate::utils::validation::Validate for DetourConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_float("detour.detour_threshold_km", self.detour_threshold_km)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Route<'a> {
    pub origin: &'a Airport,
    pub destination: &'a Airport,
}

impl<'a> Route<'a> {
    pub fn new(origin: &'a Airport, destination: &'a Airport) -> Self {
        Self {
            origin,
            destination,
        }
    }

    pub fn midpoint(&self) -> Point {
        self.origin.point.midpoint(&self.destination.point)
    }

    fn is_endpoint(&self, code: &str) -> bool {
        code == self.origin.code || code == self.destination.code
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetourCandidate<'a> {
    pub airport: &'a Airport,
    pub distance_km: f64,
}

impl From<&DetourCandidate<'_>> for DetourSuggestion {
    fn from(candidate: &DetourCandidate<'_>) -> Self {
        Self {
            code: candidate.airport.code.clone(),
            name: candidate.airport.name.clone(),
            distance_km: candidate.distance_km,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetourResult<'a> {
    pub direct_distance_km: f64,
    pub midpoint: Point,
    pub ranked: Vec<DetourCandidate<'a>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DetourFinder {
    config: DetourConfig,
}

impl DetourFinder {
    pub fn new(config: DetourConfig) -> Self {
        Self { config }
    }

    pub fn with_threshold(detour_threshold_km: f64) -> Self {
        Self::new(DetourConfig {
            detour_threshold_km,
        })
    }

    pub fn threshold_km(&self) -> f64 {
        self.config.detour_threshold_km
    }

    /// Returns the leg's direct distance and the full, untruncated list of
    /// catalog airports within the threshold of the leg midpoint.
    pub fn find_detours<'a>(&self, route: &Route<'_>, catalog: &'a [Airport]) -> DetourResult<'a> {
        let direct_distance_km = distance(route.origin.point, route.destination.point);
        let midpoint = route.midpoint();

        let mut ranked: Vec<DetourCandidate<'a>> = catalog
            .iter()
            .filter(|airport| !route.is_endpoint(&airport.code))
            .map(|airport| DetourCandidate {
                airport,
                distance_km: midpoint.distance_to(&airport.point),
            })
            .filter(|candidate| candidate.distance_km < self.threshold_km())
            .collect();

        // sort_by 是穩定排序，距離相同時保留目錄順序
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        DetourResult {
            direct_distance_km,
            midpoint,
            ranked,
        }
    }
}

/// Code-indexed view over an ordered airport list.
#[derive(Debug, Clone)]
pub struct AirportCatalog {
    airports: Vec<Airport>,
    index: HashMap<String, usize>,
    // 座標無效而未收錄的代碼，查詢時回報 InvalidCoordinate
    rejected: HashMap<String, (f64, f64)>,
}

impl AirportCatalog {
    /// Fails with [`OptimizerError::DuplicateAirport`] if two airports share a code.
    pub fn new(airports: Vec<Airport>) -> Result<Self> {
        let mut index = HashMap::with_capacity(airports.len());
        for (position, airport) in airports.iter().enumerate() {
            if index.insert(airport.code.clone(), position).is_some() {
                return Err(OptimizerError::DuplicateAirport {
                    code: airport.code.clone(),
                });
            }
        }
        Ok(Self {
            airports,
            index,
            rejected: HashMap::new(),
        })
    }

    /// Builds the catalog from raw rows. Rows with invalid coordinates are
    /// left out, but their codes still resolve to `InvalidCoordinate`.
    pub fn from_records(records: Vec<AirportRecord>) -> Result<Self> {
        let total = records.len();
        let mut airports = Vec::with_capacity(total);
        let mut rejected = HashMap::new();

        for record in records {
            let code = record.icao.trim().to_uppercase();
            let (lat, lon) = (record.lat, record.lon);
            match Airport::try_from(record) {
                Ok(airport) => airports.push(airport),
                Err(e) => {
                    tracing::warn!("⚠️ Airport {} left out of the catalog: {}", code, e);
                    if rejected.insert(code.clone(), (lat, lon)).is_some() {
                        return Err(OptimizerError::DuplicateAirport { code });
                    }
                }
            }
        }

        let mut catalog = Self::new(airports)?;
        if let Some(code) = rejected.keys().find(|code| catalog.index.contains_key(*code)) {
            return Err(OptimizerError::DuplicateAirport { code: code.clone() });
        }

        if !rejected.is_empty() {
            tracing::warn!(
                "Loaded {} of {} airports; the rest had invalid coordinates",
                catalog.len(),
                total
            );
        }
        catalog.rejected = rejected;
        Ok(catalog)
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// Codes are matched case-insensitively, as the catalog stores them upper-cased.
    pub fn get(&self, code: &str) -> Option<&Airport> {
        self.index
            .get(&code.trim().to_uppercase())
            .map(|&i| &self.airports[i])
    }

    pub fn rejected_len(&self) -> usize {
        self.rejected.len()
    }

    pub fn require(&self, code: &str) -> Result<&Airport> {
        if let Some(airport) = self.get(code) {
            return Ok(airport);
        }
        match self.rejected.get(&code.trim().to_uppercase()) {
            Some(&(lat, lon)) => Err(OptimizerError::InvalidCoordinate { lat, lon }),
            None => Err(OptimizerError::UnresolvedAirport {
                code: code.to_string(),
            }),
        }
    }

    pub fn resolve(&self, origin_code: &str, destination_code: &str) -> Result<Route<'_>> {
        Ok(Route::new(
            self.require(origin_code)?,
            self.require(destination_code)?,
        ))
    }

    /// Resolves the leg and runs the finder against the whole catalog.
    pub fn find_detours(
        &self,
        finder: &DetourFinder,
        origin_code: &str,
        destination_code: &str,
    ) -> Result<DetourResult<'_>> {
        let route = self.resolve(origin_code, destination_code)?;
        Ok(finder.find_detours(&route, &self.airports))
    }
}
