use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{Attribute, Page, PageCursor, Planet, Resident, ResidentRef},
    error::FetchError,
};

use crate::{PageRequest, PlanetSource};

fn request_key(request: &PageRequest) -> String {
    match request {
        PageRequest::Default => "default".to_string(),
        PageRequest::Number(number) => format!("page={number}"),
        PageRequest::Cursor(cursor) => cursor.as_str().to_string(),
    }
}

/// In-memory source with per-resident delays and request counters.
#[derive(Default)]
pub(crate) struct FakeSource {
    pages: HashMap<String, Page>,
    residents: HashMap<String, (Resident, Duration)>,
    page_calls: AtomicUsize,
    resident_calls: AtomicUsize,
}

impl FakeSource {
    pub(crate) fn with_page(mut self, request: PageRequest, page: Page) -> Self {
        self.pages.insert(request_key(&request), page);
        self
    }

    pub(crate) fn with_resident(mut self, reference: &str, resident: Resident) -> Self {
        self.residents
            .insert(reference.to_string(), (resident, Duration::ZERO));
        self
    }

    pub(crate) fn with_slow_resident(
        mut self,
        reference: &str,
        resident: Resident,
        delay: Duration,
    ) -> Self {
        self.residents
            .insert(reference.to_string(), (resident, delay));
        self
    }

    pub(crate) fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn resident_calls(&self) -> usize {
        self.resident_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanetSource for FakeSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        let key = request_key(request);
        self.pages
            .get(&key)
            .cloned()
            .ok_or_else(|| FetchError::network(key, "unexpected status 404 Not Found"))
    }

    async fn fetch_resident(&self, reference: &ResidentRef) -> Result<Resident, FetchError> {
        self.resident_calls.fetch_add(1, Ordering::SeqCst);
        let Some((resident, delay)) = self.residents.get(reference.as_str()).cloned() else {
            return Err(FetchError::network(
                reference.as_str(),
                "unexpected status 404 Not Found",
            ));
        };
        tokio::time::sleep(delay).await;
        Ok(resident)
    }
}

pub(crate) fn resident(name: &str, height: &str, mass: &str, gender: &str) -> Resident {
    Resident {
        name: name.to_string(),
        height: Some(Attribute::from(height)),
        mass: Some(Attribute::from(mass)),
        gender: Some(Attribute::from(gender)),
    }
}

pub(crate) fn page(results: Vec<Planet>, next: Option<&str>, previous: Option<&str>) -> Page {
    Page {
        count: None,
        next: next.map(PageCursor::new),
        previous: previous.map(PageCursor::new),
        results,
    }
}
