//! List/detail view state machine over a [`PlanetSource`].
//!
//! Every fetch is issued against a ticket stamped with the controller's
//! generation at the time it started. Any later transition bumps the
//! generation, so results for superseded tickets are dropped instead of
//! overwriting newer state.

use std::mem;

use shared::{
    domain::{Page, Planet, PlanetDetail, Resident},
    error::FetchError,
};
use tracing::{debug, info, warn};

use crate::{enrich_residents, PageRequest, PlanetSource};

pub const LIST_ERROR_MESSAGE: &str = "Unable to load planets. Please try again.";
pub const DETAIL_ERROR_MESSAGE: &str = "Unable to load residents. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub page: Page,
    /// 1-based.
    pub page_number: u32,
}

impl ListView {
    pub fn has_next(&self) -> bool {
        self.page.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.page.previous.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    LoadingList {
        request: PageRequest,
        page_number: u32,
        /// List shown before this load, kept so a failure can still navigate from it.
        retained: Option<ListView>,
    },
    ListLoaded(ListView),
    LoadingDetail {
        list: ListView,
        planet: Planet,
    },
    DetailLoaded {
        list: ListView,
        detail: PlanetDetail,
    },
    Error {
        message: String,
        retained: Option<ListView>,
    },
}

impl ViewState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoadingList { .. } => "loading_list",
            Self::ListLoaded(_) => "list_loaded",
            Self::LoadingDetail { .. } => "loading_detail",
            Self::DetailLoaded { .. } => "detail_loaded",
            Self::Error { .. } => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::LoadingList { .. } | Self::LoadingDetail { .. })
    }

    /// List the user can paginate from: the loaded list, or the one kept across an error.
    fn navigable_list(&self) -> Option<&ListView> {
        match self {
            Self::ListLoaded(list) => Some(list),
            Self::Error { retained, .. } => retained.as_ref(),
            _ => None,
        }
    }

    fn into_retained_list(self) -> Option<ListView> {
        match self {
            Self::Idle => None,
            Self::ListLoaded(list)
            | Self::LoadingDetail { list, .. }
            | Self::DetailLoaded { list, .. } => Some(list),
            Self::LoadingList { retained, .. } | Self::Error { retained, .. } => retained,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTicket {
    generation: u64,
    pub request: PageRequest,
}

impl ListTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailTicket {
    generation: u64,
    pub planet: Planet,
}

impl DetailTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Next,
    Previous,
}

pub struct ViewStateController<S> {
    source: S,
    state: ViewState,
    generation: u64,
}

impl<S: PlanetSource> ViewStateController<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: ViewState::Idle,
            generation: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn can_go_next(&self) -> bool {
        self.state.navigable_list().is_some_and(ListView::has_next)
    }

    pub fn can_go_previous(&self) -> bool {
        self.state
            .navigable_list()
            .is_some_and(ListView::has_previous)
    }

    /// Starts loading `request` from any state, superseding whatever was in flight.
    pub fn request_page(&mut self, request: PageRequest) -> ListTicket {
        let page_number = request.page_number().unwrap_or(1);
        self.begin_list(request, page_number)
    }

    pub fn request_next(&mut self) -> Option<ListTicket> {
        self.request_adjacent(Direction::Next)
    }

    pub fn request_previous(&mut self) -> Option<ListTicket> {
        self.request_adjacent(Direction::Previous)
    }

    /// Opens the detail view for the planet called `name` on the current page.
    ///
    /// Returns `None` and leaves the state untouched unless a list is loaded
    /// and the planet exists with at least one resident.
    pub fn request_detail(&mut self, name: &str) -> Option<DetailTicket> {
        let planet = match &self.state {
            ViewState::ListLoaded(list) => match list.page.find(name) {
                Some(planet) if planet.has_residents() => planet.clone(),
                Some(_) => {
                    debug!(planet = name, "planet has no residents; detail view unavailable");
                    return None;
                }
                None => {
                    debug!(planet = name, "planet not on current page");
                    return None;
                }
            },
            _ => return None,
        };

        let list = match mem::replace(&mut self.state, ViewState::Idle) {
            ViewState::ListLoaded(list) => list,
            other => {
                self.state = other;
                return None;
            }
        };

        let generation = self.bump_generation();
        info!(
            generation,
            planet = %planet.name,
            residents = planet.residents.len(),
            "loading planet detail"
        );
        self.transition(ViewState::LoadingDetail {
            list,
            planet: planet.clone(),
        });
        Some(DetailTicket { generation, planet })
    }

    /// Returns to the retained list without re-fetching it.
    pub fn back(&mut self) -> bool {
        match mem::replace(&mut self.state, ViewState::Idle) {
            ViewState::LoadingDetail { list, .. }
            | ViewState::DetailLoaded { list, .. }
            | ViewState::Error {
                retained: Some(list),
                ..
            } => {
                self.bump_generation();
                self.transition(ViewState::ListLoaded(list));
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Applies a page fetch result. Returns `false` when the ticket is stale.
    pub fn complete_list(&mut self, ticket: ListTicket, result: Result<Page, FetchError>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale page result"
            );
            return false;
        }

        let (page_number, retained) = match mem::replace(&mut self.state, ViewState::Idle) {
            ViewState::LoadingList {
                page_number,
                retained,
                ..
            } => (page_number, retained),
            other => {
                self.state = other;
                return false;
            }
        };

        match result {
            Ok(page) => {
                info!(
                    page = page_number,
                    planets = page.results.len(),
                    "planets page loaded"
                );
                self.transition(ViewState::ListLoaded(ListView { page, page_number }));
            }
            Err(err) => {
                warn!(page = page_number, error = %err, "failed to load planets page");
                self.transition(ViewState::Error {
                    message: LIST_ERROR_MESSAGE.to_string(),
                    retained,
                });
            }
        }
        true
    }

    /// Applies a resident fetch result. Returns `false` when the ticket is stale.
    pub fn complete_detail(
        &mut self,
        ticket: DetailTicket,
        result: Result<Vec<Resident>, FetchError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                planet = %ticket.planet.name,
                "discarding stale detail result"
            );
            return false;
        }

        let (list, planet) = match mem::replace(&mut self.state, ViewState::Idle) {
            ViewState::LoadingDetail { list, planet } => (list, planet),
            other => {
                self.state = other;
                return false;
            }
        };

        let result = result.and_then(|residents| {
            if residents.len() == planet.residents.len() {
                Ok(residents)
            } else {
                Err(FetchError::decode(
                    planet.name.clone(),
                    format!(
                        "expected {} residents, got {}",
                        planet.residents.len(),
                        residents.len()
                    ),
                ))
            }
        });

        match result {
            Ok(residents) => {
                info!(planet = %planet.name, residents = residents.len(), "planet detail loaded");
                self.transition(ViewState::DetailLoaded {
                    list,
                    detail: PlanetDetail { planet, residents },
                });
            }
            Err(err) => {
                warn!(planet = %planet.name, error = %err, "failed to load residents");
                self.transition(ViewState::Error {
                    message: DETAIL_ERROR_MESSAGE.to_string(),
                    retained: Some(list),
                });
            }
        }
        true
    }

    pub async fn load(&mut self, request: PageRequest) -> &ViewState {
        let ticket = self.request_page(request);
        self.run_list(ticket).await;
        &self.state
    }

    /// Fetches the next page; `false` when there is no next cursor.
    pub async fn next_page(&mut self) -> bool {
        match self.request_next() {
            Some(ticket) => {
                self.run_list(ticket).await;
                true
            }
            None => false,
        }
    }

    /// Fetches the previous page; `false` when there is no previous cursor.
    pub async fn previous_page(&mut self) -> bool {
        match self.request_previous() {
            Some(ticket) => {
                self.run_list(ticket).await;
                true
            }
            None => false,
        }
    }

    /// Selects a planet and fetches its residents; `false` when selection is unavailable.
    pub async fn open_detail(&mut self, name: &str) -> bool {
        let Some(ticket) = self.request_detail(name) else {
            return false;
        };
        let result = enrich_residents(&self.source, &ticket.planet).await;
        self.complete_detail(ticket, result);
        true
    }

    async fn run_list(&mut self, ticket: ListTicket) {
        let result = self.source.fetch_page(&ticket.request).await;
        self.complete_list(ticket, result);
    }

    fn request_adjacent(&mut self, direction: Direction) -> Option<ListTicket> {
        let list = self.state.navigable_list()?;
        let (cursor, fallback) = match direction {
            Direction::Next => (list.page.next.clone()?, list.page_number.saturating_add(1)),
            Direction::Previous => (
                list.page.previous.clone()?,
                list.page_number.saturating_sub(1).max(1),
            ),
        };
        let page_number = cursor.page_number().unwrap_or(fallback);
        Some(self.begin_list(PageRequest::Cursor(cursor), page_number))
    }

    fn begin_list(&mut self, request: PageRequest, page_number: u32) -> ListTicket {
        let retained = mem::replace(&mut self.state, ViewState::Idle).into_retained_list();
        let generation = self.bump_generation();
        info!(generation, page = page_number, "loading planets page");
        self.transition(ViewState::LoadingList {
            request: request.clone(),
            page_number,
            retained,
        });
        ListTicket {
            generation,
            request,
        }
    }

    fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn transition(&mut self, next: ViewState) {
        debug!(
            state = next.label(),
            generation = self.generation,
            "view state transition"
        );
        self.state = next;
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
