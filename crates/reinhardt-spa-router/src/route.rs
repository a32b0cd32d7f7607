//! Route table.
//!
//! Routes are kept in insertion order; dispatch is first-match-wins.

use crate::location::QueryParams;
use crate::pattern::Matcher;
use serde_json::{Map, Value};
use std::fmt;
use std::rc::Rc;

/// Free-form options attached to a route at registration.
pub type RouteOptions = Map<String, Value>;

/// Context passed to a handler on dispatch.
#[derive(Debug, Clone)]
pub struct RouteContext {
	query: QueryParams,
	fragment: String,
	options: Option<RouteOptions>,
}

impl RouteContext {
	pub(crate) fn new(query: QueryParams, fragment: String, options: Option<RouteOptions>) -> Self {
		Self {
			query,
			fragment,
			options,
		}
	}

	/// Query parameters of the current location.
	pub fn query(&self) -> &QueryParams {
		&self.query
	}

	/// A single query parameter.
	pub fn query_param(&self, key: &str) -> Option<&str> {
		self.query.get(key).map(String::as_str)
	}

	/// The resolved fragment. Empty at the application root, even though the
	/// route was matched against `home`.
	pub fn fragment(&self) -> &str {
		&self.fragment
	}

	/// Options the route was registered with.
	pub fn options(&self) -> Option<&RouteOptions> {
		self.options.as_ref()
	}
}

/// A route handler. Cloning shares the underlying callable; equality is
/// identity of that callable.
#[derive(Clone)]
pub struct Handler {
	inner: Rc<dyn Fn(&RouteContext, &[String])>,
}

impl Handler {
	/// Wraps a callable receiving the context and the positional captures.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&RouteContext, &[String]) + 'static,
	{
		Self { inner: Rc::new(f) }
	}

	/// Invokes the handler.
	pub fn call(&self, ctx: &RouteContext, captures: &[String]) {
		(self.inner)(ctx, captures)
	}

	/// Whether both handles refer to the same callable.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl PartialEq for Handler {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Handler")
			.field("ptr", &Rc::as_ptr(&self.inner).cast::<()>())
			.finish()
	}
}

/// A registered route.
#[derive(Debug, Clone)]
pub struct Route {
	matcher: Matcher,
	handler: Handler,
	options: Option<RouteOptions>,
}

impl Route {
	/// Creates a route.
	pub fn new(matcher: Matcher, handler: Handler, options: Option<RouteOptions>) -> Self {
		Self {
			matcher,
			handler,
			options,
		}
	}

	/// Creates a catch-all route.
	pub fn catch_all(handler: Handler) -> Self {
		Self::new(Matcher::catch_all(), handler, None)
	}

	/// The route's matcher.
	pub fn matcher(&self) -> &Matcher {
		&self.matcher
	}

	/// The route's handler.
	pub fn handler(&self) -> &Handler {
		&self.handler
	}

	/// The route's options.
	pub fn options(&self) -> Option<&RouteOptions> {
		self.options.as_ref()
	}

	fn matches_criterion(&self, criterion: &RouteCriterion) -> bool {
		match criterion {
			RouteCriterion::Handler(handler) => self.handler.ptr_eq(handler),
			RouteCriterion::Pattern(canonical) => self.matcher.canonical() == *canonical,
		}
	}
}

/// Selects routes to remove.
#[derive(Debug, Clone)]
pub enum RouteCriterion {
	/// Routes whose handler is this very callable.
	Handler(Handler),
	/// Routes whose matcher has this canonical form.
	Pattern(String),
}

impl From<&Handler> for RouteCriterion {
	fn from(handler: &Handler) -> Self {
		Self::Handler(handler.clone())
	}
}

impl From<Handler> for RouteCriterion {
	fn from(handler: Handler) -> Self {
		Self::Handler(handler)
	}
}

impl From<&Matcher> for RouteCriterion {
	fn from(matcher: &Matcher) -> Self {
		Self::Pattern(matcher.canonical())
	}
}

impl From<&str> for RouteCriterion {
	fn from(pattern: &str) -> Self {
		Self::Pattern(pattern.to_string())
	}
}

impl From<String> for RouteCriterion {
	fn from(pattern: String) -> Self {
		Self::Pattern(pattern)
	}
}

/// A match produced by [`RouteTable::find`].
#[derive(Debug, Clone)]
pub struct RouteMatch {
	/// The winning route.
	pub route: Route,
	/// Captured groups in capture order.
	pub captures: Vec<String>,
}

/// Ordered route collection. Duplicates are allowed.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
	routes: Vec<Route>,
}

impl RouteTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a route.
	pub fn push(&mut self, route: Route) {
		self.routes.push(route);
	}

	/// Removes every route matching `criterion`; returns how many were removed.
	pub fn remove(&mut self, criterion: &RouteCriterion) -> usize {
		let before = self.routes.len();
		self.routes
			.retain(|route| !route.matches_criterion(criterion));
		before - self.routes.len()
	}

	/// Removes all routes.
	pub fn clear(&mut self) {
		self.routes.clear();
	}

	/// Returns the first route accepting `fragment`.
	pub fn find(&self, fragment: &str) -> Option<RouteMatch> {
		self.routes.iter().find_map(|route| {
			route.matcher.captures(fragment).map(|captures| RouteMatch {
				route: route.clone(),
				captures,
			})
		})
	}

	/// Number of routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Whether the table is empty.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Iterates routes in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &Route> {
		self.routes.iter()
	}
}
