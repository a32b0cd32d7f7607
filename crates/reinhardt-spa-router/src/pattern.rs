//! Route matchers.
//!
//! Routes are matched by pre-built predicates over the fragment string. A
//! matcher either rejects a fragment or accepts it and yields the captured
//! substrings in capture order. Path templates are not compiled here: build a
//! [`regex::Regex`] or implement [`Pattern`].

use std::fmt;
use std::rc::Rc;

/// Maximum compiled size of a route regex.
const MAX_PATTERN_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Error returned when a matcher cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route pattern '{pattern}': {reason}")]
pub struct PatternError {
	/// The rejected pattern source.
	pub pattern: String,
	/// Why compilation failed.
	pub reason: String,
}

/// A predicate over fragments that also yields captures.
pub trait Pattern {
	/// Returns the captured groups (excluding the whole match) when `fragment`
	/// is accepted.
	fn captures(&self, fragment: &str) -> Option<Vec<String>>;

	/// Canonical textual form, used to remove routes by pattern.
	fn canonical(&self) -> String;
}

impl Pattern for regex::Regex {
	fn captures(&self, fragment: &str) -> Option<Vec<String>> {
		regex::Regex::captures(self, fragment).map(|caps| {
			caps.iter()
				.skip(1)
				.map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
				.collect()
		})
	}

	fn canonical(&self) -> String {
		self.as_str().to_string()
	}
}

/// Accepts every fragment and captures nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatchAll;

impl Pattern for CatchAll {
	fn captures(&self, _fragment: &str) -> Option<Vec<String>> {
		Some(Vec::new())
	}

	fn canonical(&self) -> String {
		String::new()
	}
}

/// A shareable route matcher.
#[derive(Clone)]
pub struct Matcher {
	inner: Rc<dyn Pattern>,
}

impl Matcher {
	/// Wraps any [`Pattern`].
	pub fn new<P>(pattern: P) -> Self
	where
		P: Pattern + 'static,
	{
		Self {
			inner: Rc::new(pattern),
		}
	}

	/// Compiles a regular expression matcher, e.g. `^user/(\d+)$`.
	///
	/// Note that, like any unanchored regex, `user` also accepts `superuser`.
	pub fn regex(source: &str) -> Result<Self, PatternError> {
		let regex = regex::RegexBuilder::new(source)
			.size_limit(MAX_PATTERN_REGEX_SIZE)
			.build()
			.map_err(|e| PatternError {
				pattern: source.to_string(),
				reason: e.to_string(),
			})?;
		Ok(Self::new(regex))
	}

	/// The matcher used by routes registered without one.
	pub fn catch_all() -> Self {
		Self::new(CatchAll)
	}

	/// Tests `fragment`, returning captures on success.
	pub fn captures(&self, fragment: &str) -> Option<Vec<String>> {
		self.inner.captures(fragment)
	}

	/// Whether `fragment` is accepted.
	pub fn is_match(&self, fragment: &str) -> bool {
		self.captures(fragment).is_some()
	}

	/// Canonical textual form.
	pub fn canonical(&self) -> String {
		self.inner.canonical()
	}
}

impl From<regex::Regex> for Matcher {
	fn from(regex: regex::Regex) -> Self {
		Self::new(regex)
	}
}

impl fmt::Debug for Matcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Matcher").field(&self.canonical()).finish()
	}
}

impl fmt::Display for Matcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.canonical())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_regex_captures_in_order() {
		let matcher = Matcher::regex(r"^users/(\d+)/posts/(\d+)$").unwrap();
		assert_eq!(
			matcher.captures("users/7/posts/99"),
			Some(vec!["7".to_string(), "99".to_string()])
		);
		assert_eq!(matcher.captures("users/7"), None);
	}

	#[rstest]
	fn test_regex_non_participating_group_is_empty() {
		let matcher = Matcher::regex(r"^docs(?:/(\w+))?$").unwrap();
		assert_eq!(matcher.captures("docs"), Some(vec![String::new()]));
		assert_eq!(matcher.captures("docs/intro"), Some(vec!["intro".to_string()]));
	}

	#[rstest]
	fn test_regex_unanchored_matches_substring() {
		let matcher = Matcher::regex("home").unwrap();
		assert!(matcher.is_match("home"));
		assert!(matcher.is_match("my-home-page"));
	}

	#[rstest]
	fn test_catch_all() {
		let matcher = Matcher::catch_all();
		assert_eq!(matcher.captures(""), Some(Vec::new()));
		assert_eq!(matcher.captures("anything/at/all"), Some(Vec::new()));
		assert_eq!(matcher.canonical(), "");
	}

	#[rstest]
	fn test_invalid_regex() {
		let err = Matcher::regex("user/(\\d+").unwrap_err();
		assert_eq!(err.pattern, "user/(\\d+");
		assert!(err.to_string().starts_with("invalid route pattern"));
	}

	#[rstest]
	fn test_canonical_is_source() {
		let matcher = Matcher::from(regex::Regex::new(r"^about$").unwrap());
		assert_eq!(matcher.canonical(), "^about$");
		assert_eq!(matcher.to_string(), "^about$");
	}

	struct Prefix(&'static str);

	impl Pattern for Prefix {
		fn captures(&self, fragment: &str) -> Option<Vec<String>> {
			fragment
				.strip_prefix(self.0)
				.map(|rest| vec![rest.to_string()])
		}

		fn canonical(&self) -> String {
			format!("prefix:{}", self.0)
		}
	}

	#[rstest]
	fn test_custom_pattern() {
		let matcher = Matcher::new(Prefix("files/"));
		assert_eq!(
			matcher.captures("files/a/b.txt"),
			Some(vec!["a/b.txt".to_string()])
		);
		assert_eq!(matcher.canonical(), "prefix:files/");
	}
}
