//! Navigation controller.
//!
//! Programmatic navigation, location-change subscriptions, link delegation
//! and scroll restoration. Subscriptions are never released: the host keeps
//! the listeners (and the router clones they hold) for its whole lifetime.

use crate::config::Mode;
use crate::core::Router;
use crate::history::{HistoryEntryState, NavigationType};
use crate::host::{HostError, LinkClick, NavigationEvent};
use crate::location;

impl Router {
	/// Subscribes to the mode's location-change notification (`popstate` in
	/// history mode, `hashchange` in hash mode).
	///
	/// Each notification re-dispatches the current location and, when the
	/// entry carries a scroll snapshot, restores it after the configured delay.
	pub fn listen(&self) -> &Self {
		let event = match self.mode() {
			Mode::History => NavigationEvent::PopState,
			Mode::Hash => NavigationEvent::HashChange,
		};
		tracing::debug!(?event, "listening for location changes");

		let router = self.clone();
		self.host().on_navigation(
			event,
			Box::new(move |state| router.handle_location_change(state)),
		);
		self
	}

	fn handle_location_change(&self, state: Option<HistoryEntryState>) {
		self.cancel_pending_restore();
		self.dispatch();
		if let Some(state) = state {
			self.schedule_scroll_restore(&state);
		}
	}

	/// Intercepts clicks on route-owned links (`data-route` in the browser)
	/// and turns them into [`navigate`](Self::navigate) calls.
	pub fn delegate_links(&self) -> &Self {
		tracing::debug!("delegating route link clicks");
		let router = self.clone();
		self.host()
			.on_click(Box::new(move |click: &dyn LinkClick| {
				router.handle_link_click(click)
			}));
		self
	}

	fn handle_link_click(&self, click: &dyn LinkClick) {
		if click.is_modified() {
			return;
		}
		let Some(href) = click.route_link_href() else {
			return;
		};

		let path = href.replacen(&self.host().origin(), "", 1);
		let target = location::fragment_of_path(&self.config(), &path);
		if target == self.resolve_fragment() {
			tracing::trace!(path = %path, "link targets the current fragment");
			return;
		}

		click.prevent_default();
		self.navigate(&path, NavigationType::Push);
	}

	/// Navigates to `path`, pushing a new history entry.
	pub fn push(&self, path: &str) -> &Self {
		self.navigate(path, NavigationType::Push)
	}

	/// Navigates to `path`, replacing the current history entry.
	pub fn replace(&self, path: &str) -> &Self {
		self.navigate(path, NavigationType::Replace)
	}

	/// Navigates to `path`.
	///
	/// The scroll offset of the page being left is first written into the
	/// current history entry. A [`Push`](NavigationType::Push) then resets
	/// scroll to the top and dispatches immediately; a
	/// [`Replace`](NavigationType::Replace) does neither.
	pub fn navigate(&self, path: &str, navigation: NavigationType) -> &Self {
		self.cancel_pending_restore();
		let host = self.host();

		if self.capabilities().history {
			let snapshot = HistoryEntryState::snapshot(host.scroll_offset());
			if let Err(error) = host.replace_state(&snapshot, &host.href()) {
				self.report_host_failure(error);
			}
		}

		match self.mode() {
			Mode::History => match relative_url(&host.origin(), path) {
				Ok(url) => {
					let state = HistoryEntryState::empty();
					let result = match navigation {
						NavigationType::Push => host.push_state(&state, &url),
						NavigationType::Replace => host.replace_state(&state, &url),
					};
					if let Err(error) = result {
						self.report_host_failure(error);
					}
				}
				Err(error) => self.report_host_failure(error),
			},
			Mode::Hash => host.set_hash(location::clear_slashes(path)),
		}
		tracing::debug!(path = %path, ?navigation, "navigated");

		if navigation == NavigationType::Push {
			host.scroll_to(0.0, 0.0);
			self.dispatch();
		}
		self
	}

	/// Sets one query parameter of the current location, replacing the
	/// current history entry. Does not dispatch.
	pub fn update_query_param(&self, key: &str, value: &str) -> &Self {
		let host = self.host();
		let query = location::set_query_param(&host.search(), key, value);
		let url = format!("{}{}?{}", host.origin(), host.pathname(), query);
		let state = HistoryEntryState::position(host.scroll_offset().y);

		if let Err(error) = host.replace_state(&state, &url) {
			self.report_host_failure(error);
		}
		tracing::debug!(key = %key, "query parameter updated");
		self
	}
}

/// Resolves `path` against `origin` and returns its path, query and anchor.
fn relative_url(origin: &str, path: &str) -> Result<String, HostError> {
	let invalid = |reason: String| HostError::InvalidUrl {
		url: path.to_string(),
		reason,
	};
	let base = url::Url::parse(origin).map_err(|e| invalid(e.to_string()))?;
	let url = base.join(path).map_err(|e| invalid(e.to_string()))?;
	Ok(url[url::Position::BeforePath..].to_string())
}
