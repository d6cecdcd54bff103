//! Plain-text card rendering for the terminal browser.

use client_core::{ListView, ViewState};
use shared::domain::{Attribute, Planet, PlanetDetail, Resident};

const LOADING: &str = "Loading...";

fn field(value: Option<&Attribute>) -> String {
    value
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn planet_card(index: Option<usize>, planet: &Planet) -> String {
    let title = match index {
        Some(index) => format!("[{index}] {}", planet.name),
        None => planet.name.clone(),
    };
    let mut out = format!(
        "{title}\n  Climate: {}\n  Population: {}\n  Terrain: {}\n",
        field(planet.climate.as_ref()),
        field(planet.population.as_ref()),
        field(planet.terrain.as_ref()),
    );
    // Only listed cards offer the detail affordance, and only with residents.
    match (planet.has_residents(), index) {
        (false, _) => out.push_str("  Residents: none\n"),
        (true, Some(_)) => out.push_str(&format!(
            "  Residents: {} (open to view)\n",
            planet.residents.len()
        )),
        (true, None) => out.push_str(&format!("  Residents: {}\n", planet.residents.len())),
    }
    out
}

pub fn resident_card(resident: &Resident) -> String {
    format!(
        "  - {}\n      Height: {}\n      Mass: {}\n      Gender: {}\n",
        resident.name,
        field(resident.height.as_ref()),
        field(resident.mass.as_ref()),
        field(resident.gender.as_ref()),
    )
}

pub fn pagination(list: &ListView) -> String {
    let previous = if list.has_previous() {
        "[p] Previous"
    } else {
        "(Previous disabled)"
    };
    let next = if list.has_next() {
        "[n] Next"
    } else {
        "(Next disabled)"
    };
    format!("{previous}  | page {} |  {next}\n", list.page_number)
}

pub fn list_view(list: &ListView) -> String {
    let mut out = format!("Star Wars Planets (page {})\n\n", list.page_number);
    if list.page.results.is_empty() {
        out.push_str("No planets on this page.\n");
    }
    for (i, planet) in list.page.results.iter().enumerate() {
        out.push_str(&planet_card(Some(i + 1), planet));
        out.push('\n');
    }
    out.push_str(&pagination(list));
    out
}

pub fn detail_view(detail: &PlanetDetail) -> String {
    let mut out = planet_card(None, &detail.planet);
    for resident in &detail.residents {
        out.push_str(&resident_card(resident));
    }
    out.push_str("\n[b] Back\n");
    out
}

pub fn state(state: &ViewState) -> String {
    match state {
        ViewState::Idle => "Nothing loaded yet. Type `r` to load the first page.\n".to_string(),
        ViewState::LoadingList { page_number, .. } => format!("{LOADING} (page {page_number})\n"),
        ViewState::LoadingDetail { planet, .. } => {
            format!("{LOADING} (residents of {})\n", planet.name)
        }
        ViewState::ListLoaded(list) => list_view(list),
        ViewState::DetailLoaded { detail, .. } => detail_view(detail),
        ViewState::Error { message, .. } => format!("{message}\n"),
    }
}

/// Eagerly enriched page: every planet followed by its residents.
pub fn enriched_page(details: &[PlanetDetail]) -> String {
    let mut out = String::new();
    for detail in details {
        out.push_str(&planet_card(None, &detail.planet));
        for resident in &detail.residents {
            out.push_str(&resident_card(resident));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
