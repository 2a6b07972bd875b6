pub mod detour;
pub mod engine;
pub mod geo;
pub mod matcher;
pub mod pipeline;
pub mod registry;
pub mod report;

pub use crate::domain::model::{FleetSnapshot, MatchReport};
pub use crate::domain::ports::{ConfigProvider, FleetSource, Pipeline, Storage};
pub use crate::utils::error::Result;
pub use detour::{AirportCatalog, DetourFinder};
pub use geo::{distance, Point};
