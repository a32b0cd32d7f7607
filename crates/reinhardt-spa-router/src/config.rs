//! Router configuration.
//!
//! A router runs in one of two addressing [`Mode`]s and strips a configured
//! root prefix from every resolved path. [`RouterOptions`] is the caller-facing
//! input; [`RouterConfig`] is the normalized, effective result.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default delay before a traversal restores the recorded scroll offset.
pub const DEFAULT_SCROLL_RESTORE_DELAY_MS: u32 = 50;

/// Addressing scheme used to map browser locations onto fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	/// Routes live in the in-page anchor (`/#/users/42`).
	#[default]
	Hash,
	/// Routes live in the real path (`/users/42`); needs the history capability.
	History,
}

impl Mode {
	/// Returns the lowercase name of this mode.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Hash => "hash",
			Self::History => "history",
		}
	}
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Mode {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"hash" => Ok(Self::Hash),
			"history" => Ok(Self::History),
			other => Err(ConfigError::UnknownMode(other.to_string())),
		}
	}
}

/// Errors raised while loading [`RouterOptions`] from external input.
///
/// [`Router::configure`](crate::Router::configure) itself never fails.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
	/// The mode name is neither `hash` nor `history`.
	#[error("unknown router mode: {0}")]
	UnknownMode(String),

	/// The options document could not be parsed.
	#[error("invalid router options: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Caller-supplied router options. Unset fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterOptions {
	/// Requested addressing mode (default `hash`).
	pub mode: Option<Mode>,
	/// Application root prefix (default `/`).
	pub root: Option<String>,
	/// Delay before restoring scroll after a traversal (default 50 ms).
	pub scroll_restore_delay_ms: Option<u32>,
}

impl RouterOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the requested mode.
	pub fn mode(mut self, mode: Mode) -> Self {
		self.mode = Some(mode);
		self
	}

	/// Sets the application root.
	pub fn root(mut self, root: impl Into<String>) -> Self {
		self.root = Some(root.into());
		self
	}

	/// Sets the scroll restoration delay.
	pub fn scroll_restore_delay_ms(mut self, delay: u32) -> Self {
		self.scroll_restore_delay_ms = Some(delay);
		self
	}

	/// Parses options from a JSON document such as
	/// `{"mode": "history", "root": "/app"}`.
	pub fn from_json(input: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(input)?)
	}
}

/// Effective router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterConfig {
	/// Active mode. `History` only when the host supports it.
	pub mode: Mode,
	/// Root prefix, always in `/segment/` form.
	pub root: String,
	/// Delay before restoring scroll after a traversal.
	pub scroll_restore_delay_ms: u32,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			mode: Mode::Hash,
			root: "/".to_string(),
			scroll_restore_delay_ms: DEFAULT_SCROLL_RESTORE_DELAY_MS,
		}
	}
}

/// Outcome of resolving options against host capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolved {
	pub config: RouterConfig,
	pub history_downgraded: bool,
	pub rejected_root: Option<String>,
}

impl RouterConfig {
	/// Resolves `options` into an effective configuration.
	///
	/// `History` is downgraded to `Hash` when `history_supported` is false, and
	/// a root that looks like an absolute URL is replaced by `/`.
	pub(crate) fn resolve(options: &RouterOptions, history_supported: bool) -> Resolved {
		let requested = options.mode.unwrap_or_default();
		let history_downgraded = requested == Mode::History && !history_supported;
		let mode = if history_downgraded {
			Mode::Hash
		} else {
			requested
		};

		let raw_root = options.root.as_deref().unwrap_or("/");
		let (root, rejected_root) = match normalize_root(raw_root) {
			Some(root) => (root, None),
			None => ("/".to_string(), Some(raw_root.to_string())),
		};

		Resolved {
			config: Self {
				mode,
				root,
				scroll_restore_delay_ms: options
					.scroll_restore_delay_ms
					.unwrap_or(DEFAULT_SCROLL_RESTORE_DELAY_MS),
			},
			history_downgraded,
			rejected_root,
		}
	}
}

/// Wraps `root` in single separators, or returns `None` when it looks like an
/// absolute URL (`http://host/app`, `mailto:x`).
pub fn normalize_root(root: &str) -> Option<String> {
	let inner = crate::location::clear_slashes(root);
	if has_scheme(inner) {
		return None;
	}
	if inner.is_empty() {
		return Some("/".to_string());
	}
	Some(format!("/{}/", inner))
}

fn has_scheme(s: &str) -> bool {
	let Some(colon) = s.find(':') else {
		return false;
	};
	let scheme = &s[..colon];
	let mut chars = scheme.chars();
	matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
		&& chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
