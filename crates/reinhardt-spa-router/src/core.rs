//! Core Router Implementation.
//!
//! [`Router`] owns its configuration and route table and resolves the
//! host's current location against them. It is a cheap, clonable handle:
//! event listeners registered by [`Router::listen`] and
//! [`Router::delegate_links`] hold clones of it.

use crate::config::{Mode, RouterConfig, RouterOptions};
use crate::diagnostic::Diagnostic;
use crate::history::HistoryEntryState;
use crate::host::{Capabilities, Host, HostError, TaskId};
use crate::location::{self, QueryParams};
use crate::pattern::Matcher;
use crate::route::{Handler, Route, RouteContext, RouteCriterion, RouteMatch, RouteOptions, RouteTable};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Fragment used for matching when the resolved fragment is empty.
pub const HOME_FRAGMENT: &str = "home";

type DiagnosticHook = Rc<dyn Fn(&Diagnostic)>;

pub(crate) struct RouterInner {
	pub(crate) host: Rc<dyn Host>,
	pub(crate) capabilities: Capabilities,
	pub(crate) config: RefCell<RouterConfig>,
	pub(crate) routes: RefCell<RouteTable>,
	pub(crate) diagnostic_hook: RefCell<Option<DiagnosticHook>>,
	pub(crate) pending_restore: Cell<Option<TaskId>>,
}

/// Client-side route dispatcher.
///
/// # Example
///
/// ```ignore
/// use reinhardt_spa_router::{Handler, Matcher, Mode, Router, RouterOptions};
/// use reinhardt_spa_router::web::BrowserHost;
/// use std::rc::Rc;
///
/// let router = Router::new(Rc::new(BrowserHost::new()?));
/// router
/// 	.configure(RouterOptions::new().mode(Mode::History).root("/app"))
/// 	.add(
/// 		Matcher::regex(r"^users/(\d+)$")?,
/// 		Handler::new(|ctx, captures| render_user(&captures[0], ctx.query_param("tab"))),
/// 	)
/// 	.add_catch_all(Handler::new(|_, _| render_not_found()))
/// 	.listen()
/// 	.delegate_links()
/// 	.dispatch();
/// ```
#[derive(Clone)]
pub struct Router {
	pub(crate) inner: Rc<RouterInner>,
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("config", &*self.inner.config.borrow())
			.field("capabilities", &self.inner.capabilities)
			.field("routes_count", &self.inner.routes.borrow().len())
			.finish()
	}
}

impl Router {
	/// Creates a router with default configuration, probing the host for
	/// history support.
	pub fn new<H>(host: Rc<H>) -> Self
	where
		H: Host + 'static,
	{
		let capabilities = Capabilities::probe(&*host);
		Self::with_capabilities(host, capabilities)
	}

	/// Creates a router with explicitly injected capabilities.
	pub fn with_capabilities<H>(host: Rc<H>, capabilities: Capabilities) -> Self
	where
		H: Host + 'static,
	{
		let host: Rc<dyn Host> = host;
		Self {
			inner: Rc::new(RouterInner {
				host,
				capabilities,
				config: RefCell::new(RouterConfig::default()),
				routes: RefCell::new(RouteTable::new()),
				diagnostic_hook: RefCell::new(None),
				pending_restore: Cell::new(None),
			}),
		}
	}

	pub(crate) fn host(&self) -> &dyn Host {
		&*self.inner.host
	}

	/// Injected capabilities.
	pub fn capabilities(&self) -> Capabilities {
		self.inner.capabilities
	}

	// ------------------------------------------------------------------
	// Configuration
	// ------------------------------------------------------------------

	/// Applies `options`, replacing the whole configuration.
	///
	/// Never fails: `history` without host support becomes `hash`, and a root
	/// that looks like an absolute URL becomes `/`.
	pub fn configure(&self, options: RouterOptions) -> &Self {
		let resolved = RouterConfig::resolve(&options, self.inner.capabilities.history);
		tracing::debug!(
			mode = %resolved.config.mode,
			root = %resolved.config.root,
			"router configured"
		);
		*self.inner.config.borrow_mut() = resolved.config;

		if resolved.history_downgraded {
			tracing::debug!("history capability unavailable, using hash mode");
			self.emit(Diagnostic::HistoryUnavailable);
		}
		if let Some(root) = resolved.rejected_root {
			tracing::warn!(root = %root, "root looks like an absolute URL, using '/'");
			self.emit(Diagnostic::RootRejected(root));
		}
		self
	}

	/// Effective configuration.
	pub fn config(&self) -> RouterConfig {
		self.inner.config.borrow().clone()
	}

	/// Active mode.
	pub fn mode(&self) -> Mode {
		self.inner.config.borrow().mode
	}

	/// Normalized root.
	pub fn root(&self) -> String {
		self.inner.config.borrow().root.clone()
	}

	/// Registers a callback for conditions the router handles silently.
	pub fn on_diagnostic<F>(&self, hook: F) -> &Self
	where
		F: Fn(&Diagnostic) + 'static,
	{
		*self.inner.diagnostic_hook.borrow_mut() = Some(Rc::new(hook));
		self
	}

	pub(crate) fn emit(&self, diagnostic: Diagnostic) {
		let hook = self.inner.diagnostic_hook.borrow().clone();
		if let Some(hook) = hook {
			hook(&diagnostic);
		}
	}

	pub(crate) fn report_host_failure(&self, error: HostError) {
		tracing::warn!(error = %error, "host operation failed");
		self.emit(Diagnostic::HostFailure(error));
	}

	// ------------------------------------------------------------------
	// Location
	// ------------------------------------------------------------------

	/// Fragment of the current location.
	pub fn resolve_fragment(&self) -> String {
		location::resolve_fragment(&self.inner.config.borrow(), self.host())
	}

	/// Query parameters of the current location.
	pub fn resolve_params(&self) -> QueryParams {
		location::resolve_params(&self.inner.config.borrow(), self.host())
	}

	/// Alias of [`resolve_params`](Self::resolve_params).
	pub fn params(&self) -> QueryParams {
		self.resolve_params()
	}

	// ------------------------------------------------------------------
	// Route table
	// ------------------------------------------------------------------

	/// Appends a route.
	pub fn add(&self, matcher: Matcher, handler: Handler) -> &Self {
		self.add_route(Route::new(matcher, handler, None))
	}

	/// Appends a route carrying options, visible to the handler through
	/// [`RouteContext::options`].
	pub fn add_with_options(&self, matcher: Matcher, handler: Handler, options: RouteOptions) -> &Self {
		self.add_route(Route::new(matcher, handler, Some(options)))
	}

	/// Appends a route accepting every fragment.
	pub fn add_catch_all(&self, handler: Handler) -> &Self {
		self.add_route(Route::catch_all(handler))
	}

	/// Appends a pre-built route.
	pub fn add_route(&self, route: Route) -> &Self {
		tracing::debug!(pattern = %route.matcher(), "route added");
		self.inner.routes.borrow_mut().push(route);
		self
	}

	/// Removes every route whose handler is identical to, or whose matcher has
	/// the same canonical form as, `criterion`.
	pub fn remove(&self, criterion: impl Into<RouteCriterion>) -> &Self {
		let criterion = criterion.into();
		let removed = self.inner.routes.borrow_mut().remove(&criterion);
		tracing::debug!(removed, "routes removed");
		if removed == 0 {
			let label = match &criterion {
				RouteCriterion::Handler(handler) => format!("{:?}", handler),
				RouteCriterion::Pattern(pattern) => pattern.clone(),
			};
			self.emit(Diagnostic::NothingRemoved(label));
		}
		self
	}

	/// Removes all routes and resets the configuration to defaults.
	pub fn flush(&self) -> &Self {
		self.inner.routes.borrow_mut().clear();
		*self.inner.config.borrow_mut() = RouterConfig::default();
		tracing::debug!("router flushed");
		self
	}

	/// Number of registered routes.
	pub fn route_count(&self) -> usize {
		self.inner.routes.borrow().len()
	}

	/// Snapshot of the registered routes in insertion order.
	pub fn routes(&self) -> Vec<Route> {
		self.inner.routes.borrow().iter().cloned().collect()
	}

	// ------------------------------------------------------------------
	// Dispatch
	// ------------------------------------------------------------------

	/// Dispatches the fragment of the current location.
	pub fn dispatch(&self) -> &Self {
		let fragment = self.resolve_fragment();
		self.dispatch_fragment(&fragment)
	}

	/// Runs the first route accepting `fragment`. An empty fragment is
	/// matched as [`HOME_FRAGMENT`]; handlers and diagnostics still see it
	/// empty. Unmatched fragments are a no-op.
	pub fn dispatch_fragment(&self, fragment: &str) -> &Self {
		let query = self.resolve_params();
		let candidate = if fragment.is_empty() {
			HOME_FRAGMENT
		} else {
			fragment
		};

		// The table borrow ends here so handlers may re-enter the router.
		let found = self.inner.routes.borrow().find(candidate);
		let Some(RouteMatch { route, captures }) = found else {
			tracing::debug!(fragment = %candidate, "no route matched");
			self.emit(Diagnostic::NoRouteMatched(fragment.to_string()));
			return self;
		};

		tracing::debug!(
			fragment = %candidate,
			pattern = %route.matcher(),
			captures = captures.len(),
			"dispatching route"
		);
		let ctx = RouteContext::new(query, fragment.to_string(), route.options().cloned());
		route.handler().call(&ctx, &captures);

		self.scroll_to_anchor();
		self
	}

	fn scroll_to_anchor(&self) {
		let hash = self.host().hash();
		let Some(id) = hash.strip_prefix('#').filter(|id| !id.is_empty()) else {
			return;
		};
		if !self.host().scroll_into_view(id) {
			tracing::trace!(id = %id, "anchor target not found");
			self.emit(Diagnostic::AnchorTargetMissing(id.to_string()));
		}
	}

	// ------------------------------------------------------------------
	// Scroll restoration
	// ------------------------------------------------------------------

	pub(crate) fn cancel_pending_restore(&self) {
		if let Some(id) = self.inner.pending_restore.take() {
			tracing::trace!(task = id.0, "pending scroll restore cancelled");
			self.host().cancel(id);
		}
	}

	pub(crate) fn schedule_scroll_restore(&self, state: &HistoryEntryState) {
		let Some(scroll) = state.scroll else {
			return;
		};
		let delay = self.inner.config.borrow().scroll_restore_delay_ms;
		let inner = Rc::downgrade(&self.inner);
		let id = self.host().schedule(
			delay,
			Box::new(move || {
				if let Some(inner) = inner.upgrade() {
					inner.pending_restore.set(None);
					inner.host.scroll_to(scroll.x, scroll.y);
				}
			}),
		);
		self.inner.pending_restore.set(Some(id));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::history::ScrollOffset;
	use crate::testing::MemoryHost;
	use rstest::{fixture, rstest};

	type Calls = Rc<RefCell<Vec<(String, Vec<String>)>>>;

	fn recorder(name: &'static str, calls: &Calls) -> Handler {
		let calls = Rc::clone(calls);
		Handler::new(move |_, captures| {
			calls.borrow_mut().push((name.to_string(), captures.to_vec()));
		})
	}

	#[fixture]
	fn host() -> Rc<MemoryHost> {
		Rc::new(MemoryHost::new("https://app.test/"))
	}

	#[rstest]
	fn test_new_router_has_defaults(host: Rc<MemoryHost>) {
		let router = Router::new(host);
		assert_eq!(router.mode(), Mode::Hash);
		assert_eq!(router.root(), "/");
		assert_eq!(router.route_count(), 0);
		assert!(router.capabilities().history);
	}

	#[rstest]
	fn test_configure_history(host: Rc<MemoryHost>) {
		let router = Router::new(host);
		router.configure(RouterOptions::new().mode(Mode::History).root("app"));
		assert_eq!(router.mode(), Mode::History);
		assert_eq!(router.root(), "/app/");
	}

	#[rstest]
	fn test_configure_downgrades_with_injected_capability(host: Rc<MemoryHost>) {
		let router = Router::with_capabilities(host, Capabilities { history: false });
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		router
			.on_diagnostic(move |d| sink.borrow_mut().push(d.clone()))
			.configure(RouterOptions::new().mode(Mode::History));

		assert_eq!(router.mode(), Mode::Hash);
		assert_eq!(*seen.borrow(), vec![Diagnostic::HistoryUnavailable]);
	}

	#[rstest]
	fn test_configure_rejects_absolute_root(host: Rc<MemoryHost>) {
		let router = Router::new(host);
		router.configure(RouterOptions::new().root("https://cdn.example/app"));
		assert_eq!(router.root(), "/");
	}

	#[rstest]
	fn test_flush_resets(host: Rc<MemoryHost>) {
		let calls = Calls::default();
		let router = Router::new(host);
		router
			.configure(RouterOptions::new().mode(Mode::History).root("/app/"))
			.add_catch_all(recorder("all", &calls))
			.flush();

		assert_eq!(router.mode(), Mode::Hash);
		assert_eq!(router.root(), "/");
		assert_eq!(router.route_count(), 0);
	}

	#[rstest]
	fn test_dispatch_fragment_first_match_wins(host: Rc<MemoryHost>) {
		let calls = Calls::default();
		let router = Router::new(host);
		router
			.add(Matcher::regex(r"^user/(\d+)$").unwrap(), recorder("a", &calls))
			.add(Matcher::regex(r"^user/(\d+)$").unwrap(), recorder("b", &calls))
			.dispatch_fragment("user/42");

		assert_eq!(
			*calls.borrow(),
			vec![("a".to_string(), vec!["42".to_string()])]
		);
	}

	#[rstest]
	fn test_dispatch_empty_fragment_matches_home(host: Rc<MemoryHost>) {
		let calls = Calls::default();
		let router = Router::new(host);
		router
			.add(Matcher::regex("^home$").unwrap(), recorder("home", &calls))
			.dispatch_fragment("");

		assert_eq!(calls.borrow().len(), 1);
		assert_eq!(calls.borrow()[0].0, "home");
	}

	#[rstest]
	fn test_unmatched_empty_fragment_reported_raw(host: Rc<MemoryHost>) {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		let router = Router::new(host);
		router
			.on_diagnostic(move |d| sink.borrow_mut().push(d.clone()))
			.dispatch_fragment("");

		assert_eq!(
			*seen.borrow(),
			vec![Diagnostic::NoRouteMatched(String::new())]
		);
	}

	#[rstest]
	fn test_dispatch_unmatched_is_noop(host: Rc<MemoryHost>) {
		let calls = Calls::default();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		let router = Router::new(host);
		router
			.on_diagnostic(move |d| sink.borrow_mut().push(d.clone()))
			.add(Matcher::regex("^about$").unwrap(), recorder("about", &calls))
			.dispatch_fragment("contact");

		assert!(calls.borrow().is_empty());
		assert_eq!(
			*seen.borrow(),
			vec![Diagnostic::NoRouteMatched("contact".to_string())]
		);
	}

	#[rstest]
	fn test_handler_may_reenter_router(host: Rc<MemoryHost>) {
		let calls = Calls::default();
		let router = Router::new(host);
		let reentrant = router.clone();
		let sink = Rc::clone(&calls);
		router
			.add(
				Matcher::regex("^first$").unwrap(),
				Handler::new(move |_, _| {
					sink.borrow_mut().push(("first".to_string(), Vec::new()));
					reentrant.dispatch_fragment("second");
				}),
			)
			.add(Matcher::regex("^second$").unwrap(), recorder("second", &calls))
			.dispatch_fragment("first");

		let names: Vec<_> = calls.borrow().iter().map(|(n, _)| n.clone()).collect();
		assert_eq!(names, vec!["first", "second"]);
	}

	#[rstest]
	fn test_scheduled_restore_replaces_pending(host: Rc<MemoryHost>) {
		let router = Router::new(Rc::clone(&host));
		router.schedule_scroll_restore(&HistoryEntryState::snapshot(ScrollOffset::new(0.0, 10.0)));
		router.cancel_pending_restore();
		router.schedule_scroll_restore(&HistoryEntryState::snapshot(ScrollOffset::new(0.0, 20.0)));
		assert_eq!(host.pending_tasks(), 1);

		host.advance(50);
		assert_eq!(host.scroll_calls(), vec![ScrollOffset::new(0.0, 20.0)]);
		assert_eq!(router.inner.pending_restore.get(), None);
	}

	#[rstest]
	fn test_restore_skipped_once_router_dropped(host: Rc<MemoryHost>) {
		let router = Router::new(Rc::clone(&host));
		router.schedule_scroll_restore(&HistoryEntryState::snapshot(ScrollOffset::new(0.0, 10.0)));
		drop(router);

		host.advance(50);
		assert!(host.scroll_calls().is_empty());
	}

	#[rstest]
	fn test_restore_without_snapshot_schedules_nothing(host: Rc<MemoryHost>) {
		let router = Router::new(Rc::clone(&host));
		router.schedule_scroll_restore(&HistoryEntryState::position(10.0));
		assert_eq!(host.pending_tasks(), 0);
	}

	#[rstest]
	fn test_remove_reports_nothing_removed(host: Rc<MemoryHost>) {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		let router = Router::new(host);
		router
			.on_diagnostic(move |d| sink.borrow_mut().push(d.clone()))
			.remove("^missing$");

		assert_eq!(
			*seen.borrow(),
			vec![Diagnostic::NothingRemoved("^missing$".to_string())]
		);
	}
}
