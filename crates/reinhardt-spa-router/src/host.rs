//! Host environment abstractions.
//!
//! The router never talks to a browser directly. It consumes the narrow
//! capabilities below, which [`BrowserHost`](crate::web::BrowserHost) maps
//! onto `web-sys` and [`MemoryHost`](crate::testing::MemoryHost) simulates in
//! memory. All methods take `&self`: hosts are single-threaded and use
//! interior mutability.

use crate::history::{HistoryEntryState, ScrollOffset};

/// Errors reported by a host capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum HostError {
	/// The host has no programmatic history.
	#[error("history API is not available")]
	HistoryUnavailable,

	/// The host rejected a history call.
	#[error("history operation failed: {0}")]
	History(String),

	/// A URL could not be built from the given input.
	#[error("invalid URL '{url}': {reason}")]
	InvalidUrl {
		/// The offending input.
		url: String,
		/// Why it was rejected.
		reason: String,
	},

	/// Any other host failure.
	#[error("{0}")]
	Other(String),
}

/// Read access to the active document's location, plus anchor updates.
pub trait Location {
	/// Path component, e.g. `/app/users/42`.
	fn pathname(&self) -> String;
	/// Search component including the leading `?`, or empty.
	fn search(&self) -> String;
	/// Anchor component including the leading `#`, or empty.
	fn hash(&self) -> String;
	/// Scheme, host and port, e.g. `https://example.com`.
	fn origin(&self) -> String;
	/// The full URL.
	fn href(&self) -> String;
	/// Replaces the anchor. Hosts emit [`NavigationEvent::HashChange`] when it
	/// actually changes.
	fn set_hash(&self, hash: &str);
}

/// Programmatic session history.
pub trait History {
	/// Whether push/replace are available at all.
	fn supports_history(&self) -> bool;
	/// Pushes a new entry. Does not emit [`NavigationEvent::PopState`].
	fn push_state(&self, state: &HistoryEntryState, url: &str) -> Result<(), HostError>;
	/// Replaces the current entry. Does not emit [`NavigationEvent::PopState`].
	fn replace_state(&self, state: &HistoryEntryState, url: &str) -> Result<(), HostError>;
}

/// Element lookup and scroll control.
pub trait Viewport {
	/// Current window scroll offset.
	fn scroll_offset(&self) -> ScrollOffset;
	/// Scrolls the window to an absolute offset.
	fn scroll_to(&self, x: f64, y: f64);
	/// Smooth-scrolls the element with `id` into view. Returns `false` when no
	/// such element exists.
	fn scroll_into_view(&self, id: &str) -> bool;
}

/// Location-change notifications a router can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationEvent {
	/// The user traversed session history (back/forward).
	PopState,
	/// The in-page anchor changed.
	HashChange,
}

/// Listener for [`NavigationEvent`]s. Receives the entry's state, if any.
pub type NavigationListener = Box<dyn Fn(Option<HistoryEntryState>)>;

/// Listener for page-wide clicks.
pub type ClickListener = Box<dyn Fn(&dyn LinkClick)>;

/// A click delivered to a [`ClickListener`].
pub trait LinkClick {
	/// Resolved target of the nearest route-owned link around the click
	/// target, if any.
	fn route_link_href(&self) -> Option<String>;
	/// Whether the click used a non-primary button or a modifier key.
	fn is_modified(&self) -> bool {
		false
	}
	/// Suppresses the browser's default navigation.
	fn prevent_default(&self);
}

/// Event subscriptions. Subscriptions live as long as the host.
pub trait EventSource {
	/// Subscribes to a location-change notification.
	fn on_navigation(&self, event: NavigationEvent, listener: NavigationListener);
	/// Subscribes to page-wide clicks.
	fn on_click(&self, listener: ClickListener);
}

/// Identifier of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub i64);

/// Deferred task execution.
pub trait Scheduler {
	/// Runs `task` after `delay_ms` milliseconds.
	fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskId;
	/// Cancels a task that has not run yet. Unknown ids are ignored.
	fn cancel(&self, id: TaskId);
}

/// Everything a [`Router`](crate::Router) needs from its environment.
pub trait Host: Location + History + Viewport + EventSource + Scheduler {}

impl<T> Host for T where T: Location + History + Viewport + EventSource + Scheduler {}

/// Capability flags injected at router construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
	/// Whether the host's programmatic history may be used.
	pub history: bool,
}

impl Capabilities {
	/// Probes the host.
	pub fn probe(host: &dyn Host) -> Self {
		Self {
			history: host.supports_history(),
		}
	}
}
