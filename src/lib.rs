//! # Reinhardt SPA
//!
//! Client-side routing for single-page applications.
//!
//! This crate re-exports [`reinhardt_spa_router`]: a route dispatcher that
//! maps the browser location onto registered handlers in either hash mode
//! (`/#/users/42`) or history mode (`/app/users/42`), and keeps session
//! history and scroll position in sync during in-page navigation.
//!
//! ## Example
//!
//! ```rust,ignore
//! use reinhardt_spa::prelude::*;
//! use reinhardt_spa::web::BrowserHost;
//! use std::rc::Rc;
//!
//! let router = Router::new(Rc::new(BrowserHost::new()?));
//! router
//! 	.add(Matcher::regex(r"^users/(\d+)$")?, Handler::new(|_, ids| show_user(&ids[0])))
//! 	.add_catch_all(Handler::new(|_, _| show_home()))
//! 	.listen()
//! 	.delegate_links()
//! 	.dispatch();
//! ```
//!
//! ## Feature Flags
//!
//! - `testing`: in-memory browser host ([`testing::MemoryHost`]) for
//!   application tests.

pub use reinhardt_spa_router::*;

/// Commonly used types.
pub mod prelude {
	pub use reinhardt_spa_router::{
		Diagnostic, Handler, HistoryEntryState, Matcher, Mode, NavigationType, QueryParams, Route,
		RouteContext, Router, RouterOptions,
	};
}
