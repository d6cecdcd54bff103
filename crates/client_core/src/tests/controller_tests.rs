use shared::{
    domain::{PageCursor, Planet},
    error::FetchError,
};

use super::*;
use crate::test_support::{page, resident, FakeSource};

fn tatooine() -> Planet {
    Planet::named("Tatooine").with_residents(["r/1"])
}

fn first_page_source() -> FakeSource {
    FakeSource::default()
        .with_page(
            PageRequest::Default,
            page(
                vec![tatooine(), Planet::named("Yavin IV")],
                Some("page2"),
                None,
            ),
        )
        .with_page(
            PageRequest::Cursor(PageCursor::new("page2")),
            page(
                vec![Planet::named("Hoth")],
                None,
                Some("https://swapi.dev/api/planets/?page=1&format=json"),
            ),
        )
        .with_page(
            PageRequest::Cursor(PageCursor::new(
                "https://swapi.dev/api/planets/?page=1&format=json",
            )),
            page(vec![tatooine()], Some("page2"), None),
        )
        .with_resident("r/1", resident("Luke Skywalker", "172", "77", "male"))
}

fn loaded_list(controller: &ViewStateController<FakeSource>) -> &ListView {
    match controller.state() {
        ViewState::ListLoaded(list) => list,
        other => panic!("expected list_loaded, got {}", other.label()),
    }
}

#[test]
fn starts_idle_and_not_loading() {
    let controller = ViewStateController::new(FakeSource::default());
    assert_eq!(controller.state(), &ViewState::Idle);
    assert!(!controller.is_loading());
    assert!(!controller.can_go_next());
    assert!(!controller.can_go_previous());
}

#[tokio::test]
async fn default_request_loads_first_page() {
    let mut controller = ViewStateController::new(first_page_source());

    let ticket = controller.request_page(PageRequest::Default);
    assert!(controller.is_loading());
    assert_eq!(controller.state().label(), "loading_list");

    let result = controller.source().fetch_page(&ticket.request).await;
    assert!(controller.complete_list(ticket, result));

    let list = loaded_list(&controller);
    assert_eq!(list.page_number, 1);
    assert_eq!(list.page.results.len(), 2);
    assert_eq!(list.page.results[0].name, "Tatooine");
    assert!(!controller.is_loading());
    assert!(controller.can_go_next());
    assert!(!controller.can_go_previous());
}

#[tokio::test]
async fn next_and_previous_follow_cursors_and_refetch() {
    let mut controller = ViewStateController::new(first_page_source());
    controller.load(PageRequest::Default).await;

    assert!(controller.next_page().await);
    let list = loaded_list(&controller);
    assert_eq!(list.page_number, 2);
    assert_eq!(list.page.results[0].name, "Hoth");

    assert!(controller.previous_page().await);
    let list = loaded_list(&controller);
    assert_eq!(list.page_number, 1);
    // No page cache: returning to page 1 goes back to the source.
    assert_eq!(controller.source().page_calls(), 3);
}

#[tokio::test]
async fn next_without_cursor_leaves_state_unchanged() {
    let source = FakeSource::default().with_page(
        PageRequest::Default,
        page(vec![Planet::named("Hoth")], None, None),
    );
    let mut controller = ViewStateController::new(source);
    controller.load(PageRequest::Default).await;
    let before = controller.state().clone();
    let generation = controller.generation();

    assert!(controller.request_next().is_none());
    assert!(!controller.next_page().await);

    assert_eq!(controller.state(), &before);
    assert_eq!(controller.generation(), generation);
    assert_eq!(controller.source().page_calls(), 1);
}

#[tokio::test]
async fn previous_without_cursor_leaves_state_unchanged() {
    let mut controller = ViewStateController::new(first_page_source());
    controller.load(PageRequest::Default).await;
    let before = controller.state().clone();

    assert!(controller.request_previous().is_none());
    assert!(!controller.previous_page().await);

    assert_eq!(controller.state(), &before);
    assert_eq!(controller.source().page_calls(), 1);
}

#[test]
fn navigation_before_any_list_is_a_no_op() {
    let mut controller = ViewStateController::new(first_page_source());
    assert!(controller.request_next().is_none());
    assert!(controller.request_previous().is_none());
    assert!(controller.request_detail("Tatooine").is_none());
    assert!(!controller.back());
    assert_eq!(controller.state(), &ViewState::Idle);
}

#[tokio::test]
async fn selecting_planet_loads_detail_and_back_restores_list_without_refetch() {
    let mut controller = ViewStateController::new(first_page_source());
    controller.load(PageRequest::Default).await;
    let original = loaded_list(&controller).clone();

    let ticket = controller.request_detail("Tatooine").expect("detail ticket");
    assert_eq!(controller.state().label(), "loading_detail");
    assert!(controller.is_loading());

    let result = enrich_residents(controller.source(), &ticket.planet).await;
    assert!(controller.complete_detail(ticket, result));

    match controller.state() {
        ViewState::DetailLoaded { detail, .. } => {
            assert_eq!(detail.planet.name, "Tatooine");
            assert_eq!(
                detail.residents,
                vec![resident("Luke Skywalker", "172", "77", "male")]
            );
            assert_eq!(detail.residents.len(), detail.planet.residents.len());
        }
        other => panic!("expected detail_loaded, got {}", other.label()),
    }
    assert!(!controller.is_loading());

    assert!(controller.back());
    assert_eq!(loaded_list(&controller), &original);
    assert_eq!(controller.source().page_calls(), 1);
}

#[tokio::test]
async fn residentless_or_unknown_planets_do_not_open_detail() {
    let mut controller = ViewStateController::new(first_page_source());
    controller.load(PageRequest::Default).await;
    let before = controller.state().clone();

    assert!(controller.request_detail("Yavin IV").is_none());
    assert!(!controller.open_detail("Coruscant").await);

    assert_eq!(controller.state(), &before);
    assert_eq!(controller.source().resident_calls(), 0);
}

#[tokio::test]
async fn page_failure_enters_error_with_message() {
    let mut controller = ViewStateController::new(FakeSource::default());

    controller.load(PageRequest::Number(4)).await;

    match controller.state() {
        ViewState::Error { message, retained } => {
            assert_eq!(message, LIST_ERROR_MESSAGE);
            assert!(retained.is_none());
        }
        other => panic!("expected error, got {}", other.label()),
    }
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn detail_failure_enters_error_and_back_recovers_list() {
    let source = FakeSource::default().with_page(
        PageRequest::Default,
        page(
            vec![Planet::named("Alderaan").with_residents(["r/missing"])],
            None,
            None,
        ),
    );
    let mut controller = ViewStateController::new(source);
    controller.load(PageRequest::Default).await;

    assert!(controller.open_detail("Alderaan").await);
    match controller.state() {
        ViewState::Error { message, retained } => {
            assert_eq!(message, DETAIL_ERROR_MESSAGE);
            assert!(retained.is_some());
        }
        other => panic!("expected error, got {}", other.label()),
    }
    assert!(!controller.is_loading());

    assert!(controller.back());
    assert_eq!(loaded_list(&controller).page.results[0].name, "Alderaan");
}

#[tokio::test]
async fn error_state_recovers_on_next_navigation_request() {
    let source = FakeSource::default().with_page(
        PageRequest::Default,
        page(vec![Planet::named("Hoth")], Some("page-missing"), None),
    );
    let mut controller = ViewStateController::new(source);
    controller.load(PageRequest::Default).await;

    assert!(controller.next_page().await);
    assert_eq!(controller.state().label(), "error");
    // The list from before the failure still offers its cursors.
    assert!(controller.can_go_next());

    controller.load(PageRequest::Default).await;
    assert_eq!(loaded_list(&controller).page.results[0].name, "Hoth");
}

#[tokio::test]
async fn detail_result_arriving_after_back_is_discarded() {
    let mut controller = ViewStateController::new(first_page_source());
    controller.load(PageRequest::Default).await;

    let ticket = controller.request_detail("Tatooine").expect("detail ticket");
    let result = enrich_residents(controller.source(), &ticket.planet).await;

    // The user navigates back before the residents arrive.
    assert!(controller.back());
    let list_state = controller.state().clone();

    assert!(!controller.complete_detail(ticket, result));
    assert_eq!(controller.state(), &list_state);
}

#[tokio::test]
async fn superseded_page_result_is_discarded() {
    let mut controller = ViewStateController::new(first_page_source());

    let stale = controller.request_page(PageRequest::Default);
    let fresh = controller.request_page(PageRequest::Cursor(PageCursor::new("page2")));
    assert!(fresh.generation() > stale.generation());

    let stale_result = controller.source().fetch_page(&stale.request).await;
    assert!(!controller.complete_list(stale, stale_result));
    assert_eq!(controller.state().label(), "loading_list");

    let fresh_result = controller.source().fetch_page(&fresh.request).await;
    assert!(controller.complete_list(fresh, fresh_result));
    assert_eq!(loaded_list(&controller).page.results[0].name, "Hoth");
}

#[tokio::test]
async fn mismatched_resident_count_is_treated_as_failure() {
    let mut controller = ViewStateController::new(first_page_source());
    controller.load(PageRequest::Default).await;

    let ticket = controller.request_detail("Tatooine").expect("detail ticket");
    assert!(controller.complete_detail(ticket, Ok(Vec::new())));

    assert_eq!(controller.state().label(), "error");
}

#[tokio::test]
async fn explicit_page_number_is_tracked() {
    let source = FakeSource::default().with_page(
        PageRequest::Number(3),
        page(vec![Planet::named("Dagobah")], Some("page4"), Some("page2")),
    );
    let mut controller = ViewStateController::new(source);

    controller.load(PageRequest::Number(3)).await;

    assert_eq!(loaded_list(&controller).page_number, 3);
    assert!(controller.can_go_previous());
}

#[tokio::test]
async fn completing_twice_is_ignored() {
    let mut controller = ViewStateController::new(first_page_source());
    let ticket = controller.request_page(PageRequest::Default);
    let duplicate = ticket.clone();

    let result = controller.source().fetch_page(&ticket.request).await;
    assert!(controller.complete_list(ticket, result));
    assert!(!controller.complete_list(
        duplicate,
        Err(FetchError::network("default", "connection reset"))
    ));
    assert_eq!(controller.state().label(), "list_loaded");
}
