//! Browser Host WASM Tests
//!
//! Exercises `BrowserHost` and a history-mode router against a real document.
//!
//! **Run with**: `wasm-pack test --headless --chrome crates/reinhardt-spa-router`

#![cfg(target_arch = "wasm32")]

use gloo_timers::future::TimeoutFuture;
use reinhardt_spa_router::host::{History, Location, Scheduler, Viewport};
use reinhardt_spa_router::web::BrowserHost;
use reinhardt_spa_router::{
	Handler, HistoryEntryState, Matcher, Mode, Router, RouterOptions, ScrollOffset,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

// ============================================================================
// Test Fixtures
// ============================================================================

fn host() -> BrowserHost {
	BrowserHost::new().expect("browser host should bind to window")
}

fn current_state() -> Option<HistoryEntryState> {
	let state = web_sys::window()?.history().ok()?.state().ok()?;
	let json: String = js_sys::JSON::stringify(&state).ok()?.into();
	HistoryEntryState::from_json(&json)
}

// ============================================================================
// Location and history
// ============================================================================

/// Test: the browser exposes programmatic history
#[wasm_bindgen_test]
fn test_supports_history() {
	assert!(host().supports_history());
}

/// Test: push_state moves the location and stores the entry state
#[wasm_bindgen_test]
fn test_push_state_updates_location() {
	let host = host();
	let state = HistoryEntryState::snapshot(ScrollOffset::new(0.0, 42.0));

	host.push_state(&state, "/spa-router-test/page?tab=a#section")
		.expect("push_state should succeed");

	assert_eq!(host.pathname(), "/spa-router-test/page");
	assert_eq!(host.search(), "?tab=a");
	assert_eq!(host.hash(), "#section");
	assert_eq!(current_state(), Some(state));
}

/// Test: replace_state keeps the history length
#[wasm_bindgen_test]
fn test_replace_state_keeps_length() {
	let host = host();
	let history = web_sys::window().unwrap().history().unwrap();
	let before = history.length().unwrap();

	host.replace_state(&HistoryEntryState::position(7.0), "/spa-router-test/replaced")
		.expect("replace_state should succeed");

	assert_eq!(history.length().unwrap(), before);
	assert_eq!(host.pathname(), "/spa-router-test/replaced");
	assert_eq!(current_state(), Some(HistoryEntryState::position(7.0)));
}

// ============================================================================
// Viewport
// ============================================================================

/// Test: scroll_into_view reports whether the element exists
#[wasm_bindgen_test]
fn test_scroll_into_view() {
	let host = host();
	let document = web_sys::window().unwrap().document().unwrap();
	let element = document.create_element("div").unwrap();
	element.set_id("spa-router-anchor");
	document.body().unwrap().append_child(&element).unwrap();

	assert!(host.scroll_into_view("spa-router-anchor"));
	assert!(!host.scroll_into_view("spa-router-missing"));
}

// ============================================================================
// Scheduler
// ============================================================================

/// Test: scheduled tasks run after the delay unless cancelled
#[wasm_bindgen_test]
async fn test_schedule_and_cancel() {
	let host = host();
	let ran = Rc::new(Cell::new(0));

	let counter = Rc::clone(&ran);
	host.schedule(10, Box::new(move || counter.set(counter.get() + 1)));
	let counter = Rc::clone(&ran);
	let cancelled = host.schedule(10, Box::new(move || counter.set(counter.get() + 10)));
	host.cancel(cancelled);

	TimeoutFuture::new(50).await;
	assert_eq!(ran.get(), 1);
}

// ============================================================================
// Router
// ============================================================================

/// Test: a history-mode push dispatches against the real location
#[wasm_bindgen_test]
fn test_router_push_dispatches() {
	let host = Rc::new(host());
	let router = Router::new(Rc::clone(&host));
	let seen = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&seen);

	router
		.configure(RouterOptions::new().mode(Mode::History).root("/spa-router-test"))
		.add(
			Matcher::regex(r"^users/(\d+)$").unwrap(),
			Handler::new(move |_, captures| sink.borrow_mut().extend_from_slice(captures)),
		)
		.push("/spa-router-test/users/5");

	assert_eq!(router.mode(), Mode::History);
	assert_eq!(host.pathname(), "/spa-router-test/users/5");
	assert_eq!(*seen.borrow(), vec!["5".to_string()]);
}
