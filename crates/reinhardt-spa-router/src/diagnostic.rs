//! Diagnostics for silently handled conditions.
//!
//! Router operations never fail: unmatched fragments, missing anchor targets,
//! rejected roots and host failures all fall back to a safe default. Apps that
//! want to know about them can register a callback with
//! [`Router::on_diagnostic`](crate::Router::on_diagnostic).

use crate::host::HostError;

/// A condition the router handled by falling back to a default.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Diagnostic {
	/// `history` mode was requested but the host lacks the capability.
	#[error("history mode unavailable, falling back to hash mode")]
	HistoryUnavailable,

	/// The configured root looked like an absolute URL and was replaced by `/`.
	#[error("root '{0}' looks like an absolute URL, using '/'")]
	RootRejected(String),

	/// No route accepted the fragment.
	#[error("no route matched fragment '{0}'")]
	NoRouteMatched(String),

	/// The location's anchor names no element.
	#[error("no element with id '{0}' to scroll to")]
	AnchorTargetMissing(String),

	/// A removal criterion matched no route.
	#[error("no route removed for criterion '{0}'")]
	NothingRemoved(String),

	/// A host capability failed.
	#[error("host failure: {0}")]
	HostFailure(#[from] HostError),
}
