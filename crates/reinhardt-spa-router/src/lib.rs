//! # Reinhardt SPA Router
//!
//! Client-side route dispatcher for single-page applications.
//!
//! Given the browser's current location, the router decides which registered
//! handler runs, extracts positional captures and query parameters for it,
//! and keeps location, session history and scroll position in sync as the
//! user moves between pages without full reloads.
//!
//! ## Modes
//!
//! - [`Mode::Hash`] (default) keeps the route in the anchor: `/#/users/42`.
//! - [`Mode::History`] keeps the route in the path: `/app/users/42`. It is
//!   only used when the host supports programmatic history; otherwise
//!   configuration silently falls back to hash mode.
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_spa_router::{Handler, Matcher, Mode, Router, RouterOptions};
//! use reinhardt_spa_router::web::BrowserHost;
//! use std::rc::Rc;
//!
//! let router = Router::new(Rc::new(BrowserHost::new()?));
//! router
//! 	.configure(RouterOptions::new().mode(Mode::History).root("/app"))
//! 	.add(Matcher::regex("^home$")?, Handler::new(|_, _| render_home()))
//! 	.add(
//! 		Matcher::regex(r"^users/(\d+)$")?,
//! 		Handler::new(|ctx, captures| render_user(&captures[0], ctx.query_param("tab"))),
//! 	)
//! 	.add_catch_all(Handler::new(|_, _| render_not_found()))
//! 	.listen()
//! 	.delegate_links()
//! 	.dispatch();
//! ```
//!
//! ## Failure policy
//!
//! No routing operation returns an error. Unmatched fragments, missing
//! anchor targets, unsupported history and malformed roots fall back to safe
//! defaults; register [`Router::on_diagnostic`] to observe them.
//!
//! ## Feature Flags
//!
//! - `testing`: exposes [`testing::MemoryHost`], an in-memory browser.

pub mod config;
pub mod core;
pub mod diagnostic;
pub mod history;
pub mod host;
pub mod location;
pub mod navigation;
pub mod pattern;
pub mod route;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub mod web;

pub use config::{ConfigError, Mode, RouterConfig, RouterOptions};
pub use crate::core::{HOME_FRAGMENT, Router};
pub use diagnostic::Diagnostic;
pub use history::{HistoryEntryState, NavigationType, ScrollOffset};
pub use host::{Capabilities, Host, HostError, LinkClick, NavigationEvent, TaskId};
pub use location::QueryParams;
pub use pattern::{CatchAll, Matcher, Pattern, PatternError};
pub use route::{Handler, Route, RouteContext, RouteCriterion, RouteOptions, RouteTable};
