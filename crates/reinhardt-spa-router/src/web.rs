//! Browser host backed by `web-sys`.
//!
//! Maps the router's host traits onto `window.location`, `window.history`,
//! DOM lookups, `setTimeout` and document-level click delegation. Event
//! listeners are leaked with [`Closure::forget`]: the page owns them for its
//! whole lifetime.

use crate::history::{HistoryEntryState, ScrollOffset};
use crate::host::{
	ClickListener, EventSource, History, HostError, LinkClick, Location, NavigationEvent,
	NavigationListener, Scheduler, TaskId, Viewport,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, MouseEvent, PopStateEvent, Window};

/// Attribute marking links the router should handle.
pub const ROUTE_LINK_SELECTOR: &str = "[data-route]";

fn js_error(value: JsValue) -> String {
	value
		.as_string()
		.or_else(|| {
			js_sys::JSON::stringify(&value)
				.ok()
				.map(String::from)
		})
		.unwrap_or_else(|| "unknown JavaScript error".to_string())
}

/// The current browser window as a router host.
#[derive(Debug, Clone)]
pub struct BrowserHost {
	window: Window,
	document: Document,
}

impl BrowserHost {
	/// Binds to the global `window` and its document.
	pub fn new() -> Result<Self, HostError> {
		let window =
			web_sys::window().ok_or_else(|| HostError::Other("no window object".to_string()))?;
		let document = window
			.document()
			.ok_or_else(|| HostError::Other("no document object".to_string()))?;
		Ok(Self { window, document })
	}

	fn history(&self) -> Result<web_sys::History, HostError> {
		self.window
			.history()
			.map_err(|_| HostError::HistoryUnavailable)
	}

	fn state_to_js(state: &HistoryEntryState) -> Result<JsValue, HostError> {
		js_sys::JSON::parse(&state.to_json()).map_err(|e| HostError::History(js_error(e)))
	}

	fn state_from_js(value: JsValue) -> Option<HistoryEntryState> {
		if value.is_null() || value.is_undefined() {
			return None;
		}
		let json: String = js_sys::JSON::stringify(&value).ok()?.into();
		HistoryEntryState::from_json(&json)
	}
}

impl Location for BrowserHost {
	fn pathname(&self) -> String {
		self.window.location().pathname().unwrap_or_default()
	}

	fn search(&self) -> String {
		self.window.location().search().unwrap_or_default()
	}

	fn hash(&self) -> String {
		self.window.location().hash().unwrap_or_default()
	}

	fn origin(&self) -> String {
		self.window.location().origin().unwrap_or_default()
	}

	fn href(&self) -> String {
		self.window.location().href().unwrap_or_default()
	}

	fn set_hash(&self, hash: &str) {
		if let Err(e) = self.window.location().set_hash(hash) {
			tracing::warn!(error = %js_error(e), "failed to set location hash");
		}
	}
}

impl History for BrowserHost {
	fn supports_history(&self) -> bool {
		self.window
			.history()
			.ok()
			.and_then(|history| js_sys::Reflect::has(&history, &JsValue::from_str("pushState")).ok())
			.unwrap_or(false)
	}

	fn push_state(&self, state: &HistoryEntryState, url: &str) -> Result<(), HostError> {
		self.history()?
			.push_state_with_url(&Self::state_to_js(state)?, "", Some(url))
			.map_err(|e| HostError::History(js_error(e)))
	}

	fn replace_state(&self, state: &HistoryEntryState, url: &str) -> Result<(), HostError> {
		self.history()?
			.replace_state_with_url(&Self::state_to_js(state)?, "", Some(url))
			.map_err(|e| HostError::History(js_error(e)))
	}
}

impl Viewport for BrowserHost {
	fn scroll_offset(&self) -> ScrollOffset {
		ScrollOffset::new(
			self.window.scroll_x().unwrap_or_default(),
			self.window.scroll_y().unwrap_or_default(),
		)
	}

	fn scroll_to(&self, x: f64, y: f64) {
		self.window.scroll_to_with_x_and_y(x, y);
	}

	fn scroll_into_view(&self, id: &str) -> bool {
		let Some(element) = self.document.get_element_by_id(id) else {
			return false;
		};
		let options = web_sys::ScrollIntoViewOptions::new();
		options.set_behavior(web_sys::ScrollBehavior::Smooth);
		element.scroll_into_view_with_scroll_into_view_options(&options);
		true
	}
}

impl EventSource for BrowserHost {
	fn on_navigation(&self, event: NavigationEvent, listener: NavigationListener) {
		let name = match event {
			NavigationEvent::PopState => "popstate",
			NavigationEvent::HashChange => "hashchange",
		};
		let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
			let state = event
				.dyn_ref::<PopStateEvent>()
				.and_then(|event| BrowserHost::state_from_js(event.state()));
			listener(state);
		});
		if let Err(e) = self
			.window
			.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
		{
			tracing::warn!(event = name, error = %js_error(e), "failed to add listener");
		}
		callback.forget();
	}

	fn on_click(&self, listener: ClickListener) {
		let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
			listener(&BrowserClick { event });
		});
		if let Err(e) = self
			.document
			.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
		{
			tracing::warn!(error = %js_error(e), "failed to add click listener");
		}
		callback.forget();
	}
}

impl Scheduler for BrowserHost {
	fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskId {
		// A cancelled callback is never invoked, so its closure stays leaked.
		let callback = Closure::once_into_js(move || task());
		let timeout = i32::try_from(delay_ms).unwrap_or(i32::MAX);
		match self
			.window
			.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), timeout)
		{
			Ok(handle) => TaskId(i64::from(handle)),
			Err(e) => {
				tracing::warn!(error = %js_error(e), "failed to schedule task");
				TaskId(-1)
			}
		}
	}

	fn cancel(&self, id: TaskId) {
		if let Ok(handle) = i32::try_from(id.0) {
			self.window.clear_timeout_with_handle(handle);
		}
	}
}

/// A browser click event.
struct BrowserClick {
	event: Event,
}

impl BrowserClick {
	fn route_link(&self) -> Option<Element> {
		self.event
			.target()?
			.dyn_into::<Element>()
			.ok()?
			.closest(ROUTE_LINK_SELECTOR)
			.ok()
			.flatten()
	}
}

impl LinkClick for BrowserClick {
	fn route_link_href(&self) -> Option<String> {
		let link = self.route_link()?;
		js_sys::Reflect::get(&link, &JsValue::from_str("href"))
			.ok()?
			.as_string()
			.filter(|href| !href.is_empty())
	}

	fn is_modified(&self) -> bool {
		self.event.dyn_ref::<MouseEvent>().is_some_and(|mouse| {
			mouse.button() != 0
				|| mouse.meta_key()
				|| mouse.ctrl_key()
				|| mouse.shift_key()
				|| mouse.alt_key()
		})
	}

	fn prevent_default(&self) {
		self.event.prevent_default();
	}
}
