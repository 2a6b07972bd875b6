use crate::core::detour::{AirportCatalog, DetourFinder};
use crate::domain::model::{Aircraft, DetourSuggestion, LegMatch, SkippedLeg};
use crate::utils::error::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    pub matches: Vec<LegMatch>,
    pub skipped: Vec<SkippedLeg>,
}

/// Runs the detour search for every aircraft's next leg.
///
/// Legs that cannot be resolved against the catalog are recorded in
/// `skipped` and the batch continues. Any other error aborts the batch.
pub fn match_legs(
    catalog: &AirportCatalog,
    aircraft: &[Aircraft],
    finder: &DetourFinder,
) -> Result<MatchOutcome> {
    let mut outcome = MatchOutcome::default();

    for ac in aircraft {
        match catalog.find_detours(finder, &ac.current_icao, &ac.next_leg_icao) {
            Ok(result) => {
                tracing::debug!(
                    "{} {}→{}: {:.1} km, {} detour candidates",
                    ac.tail_number,
                    ac.current_icao,
                    ac.next_leg_icao,
                    result.direct_distance_km,
                    result.ranked.len()
                );
                outcome.matches.push(LegMatch {
                    aircraft_id: ac.id.clone(),
                    tail_number: ac.tail_number.clone(),
                    origin: ac.current_icao.clone(),
                    destination: ac.next_leg_icao.clone(),
                    direct_distance_km: result.direct_distance_km,
                    detours: result.ranked.iter().map(DetourSuggestion::from).collect(),
                });
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!("⚠️ Skipping {} ({}): {}", ac.tail_number, ac.id, e);
                outcome.skipped.push(SkippedLeg {
                    aircraft_id: ac.id.clone(),
                    tail_number: ac.tail_number.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(outcome)
}
