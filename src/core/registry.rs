use crate::core::detour::AirportCatalog;
use crate::domain::model::{Aircraft, NewAircraft};
use crate::domain::ports::FleetSource;
use crate::utils::error::{OptimizerError, Result};

/// Normalizes a registration and checks it against the airport catalog.
pub fn validate_registration(new: NewAircraft, catalog: &AirportCatalog) -> Result<NewAircraft> {
    let new = new.normalized();

    for (field, value) in [
        ("tail_number", &new.tail_number),
        ("current_icao", &new.current_icao),
        ("next_leg_icao", &new.next_leg_icao),
    ] {
        if value.is_empty() {
            return Err(OptimizerError::ValidationError {
                message: format!("{} is required", field),
            });
        }
    }

    catalog.require(&new.current_icao)?;
    catalog.require(&new.next_leg_icao)?;

    Ok(new)
}

/// 新增航機：先取回機場目錄驗證代碼，再寫入資料來源
pub async fn register_aircraft<F>(source: &F, new: NewAircraft) -> Result<Aircraft>
where
    F: FleetSource + ?Sized,
{
    let catalog = AirportCatalog::from_records(source.fetch_airports().await?)?;
    let new = validate_registration(new, &catalog)?;

    tracing::info!(
        "✈️ Registering {} ({} → {})",
        new.tail_number,
        new.current_icao,
        new.next_leg_icao
    );

    let stored = source.insert_aircraft(&new).await?;
    tracing::debug!("Stored aircraft row id {}", stored.id);
    Ok(stored)
}
