//! Resident expansion for planets: one concurrent fetch per reference, joined in order.

use futures::future::try_join_all;
use shared::{
    domain::{Page, Planet, PlanetDetail, Resident},
    error::FetchError,
};
use tracing::debug;

use crate::PlanetSource;

/// Fetches every resident of `planet` concurrently.
///
/// The result is positionally aligned with `planet.residents`, independent of
/// completion order. A single failed fetch fails the whole call. Planets
/// without residents return immediately without touching the source.
pub async fn enrich_residents<S>(source: &S, planet: &Planet) -> Result<Vec<Resident>, FetchError>
where
    S: PlanetSource + ?Sized,
{
    if planet.residents.is_empty() {
        return Ok(Vec::new());
    }

    debug!(
        planet = %planet.name,
        count = planet.residents.len(),
        "fetching residents"
    );
    try_join_all(
        planet
            .residents
            .iter()
            .map(|reference| source.fetch_resident(reference)),
    )
    .await
}

/// Enriches every planet of a page up front, preserving planet order.
pub async fn enrich_page<S>(source: &S, page: &Page) -> Result<Vec<PlanetDetail>, FetchError>
where
    S: PlanetSource + ?Sized,
{
    try_join_all(page.results.iter().map(|planet| async move {
        let residents = enrich_residents(source, planet).await?;
        Ok::<_, FetchError>(PlanetDetail {
            planet: planet.clone(),
            residents,
        })
    }))
    .await
}

#[cfg(test)]
#[path = "tests/enricher_tests.rs"]
mod tests;
