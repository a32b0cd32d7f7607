//! Location resolution.
//!
//! Derives the logical fragment and the query parameters from the host's
//! current location. Nothing here is cached: the browser location is the
//! source of truth and may change outside the router's control.

use crate::config::{Mode, RouterConfig};
use crate::host::Location;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::collections::HashMap;

/// Query parameters of the current location. Repeated keys keep the last value.
pub type QueryParams = HashMap<String, String>;

/// Removes every leading and trailing `/` from `path`.
pub fn clear_slashes(path: &str) -> &str {
	path.trim_matches('/')
}

/// Computes the fragment of the host's current location.
pub fn resolve_fragment<L: Location + ?Sized>(config: &RouterConfig, location: &L) -> String {
	let fragment = match config.mode {
		Mode::History => {
			let raw = format!("{}{}", location.pathname(), location.search());
			history_fragment(&raw, &config.root)
		}
		Mode::Hash => hash_fragment(&location.hash()),
	};
	tracing::trace!(mode = %config.mode, fragment = %fragment, "resolved fragment");
	fragment
}

/// Computes the fragment a navigation to `path` would produce, without
/// touching the location.
pub fn fragment_of_path(config: &RouterConfig, path: &str) -> String {
	match config.mode {
		Mode::History => history_fragment(path, &config.root),
		Mode::Hash => {
			let path = clear_slashes(path);
			let path = path.strip_prefix('#').unwrap_or(path);
			clear_slashes(before_query(path)).to_string()
		}
	}
}

fn history_fragment(path_and_query: &str, root: &str) -> String {
	let decoded = decode_uri(path_and_query);
	// Literal removal of the first occurrence, wherever it sits in the path.
	let stripped = decoded.replacen(root, "", 1);
	clear_slashes(before_query(&stripped)).to_string()
}

fn hash_fragment(hash: &str) -> String {
	let hash = hash.strip_prefix('#').unwrap_or(hash);
	clear_slashes(before_query(hash)).to_string()
}

fn before_query(s: &str) -> &str {
	s.split('?').next().unwrap_or_default()
}

/// Extracts the query parameters of the host's current location.
///
/// History mode reads the search component; hash mode reads the text after
/// the first `?` inside the hash, up to any following `?`.
pub fn resolve_params<L: Location + ?Sized>(config: &RouterConfig, location: &L) -> QueryParams {
	let query = match config.mode {
		Mode::History => location.search(),
		Mode::Hash => location
			.hash()
			.split('?')
			.nth(1)
			.unwrap_or_default()
			.to_string(),
	};
	parse_query(&query)
}

/// Parses a query string with form-urlencoded rules. A leading `?` is ignored.
pub fn parse_query(query: &str) -> QueryParams {
	let query = query.strip_prefix('?').unwrap_or(query);
	url::form_urlencoded::parse(query.as_bytes())
		.into_owned()
		.collect()
}

/// Sets `key` to `value` in `query` and returns the re-encoded query string
/// (without leading `?`).
///
/// The first occurrence of `key` keeps its position and later duplicates are
/// dropped; a missing key is appended.
pub fn set_query_param(query: &str, key: &str, value: &str) -> String {
	let query = query.strip_prefix('?').unwrap_or(query);
	let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
		.into_owned()
		.collect();

	match pairs.iter().position(|(k, _)| k == key) {
		Some(first) => {
			pairs[first].1 = value.to_string();
			let mut index = 0;
			pairs.retain(|(k, _)| {
				let keep = index <= first || k != key;
				index += 1;
				keep
			});
		}
		None => pairs.push((key.to_string(), value.to_string())),
	}

	url::form_urlencoded::Serializer::new(String::new())
		.extend_pairs(pairs)
		.finish()
}

/// Percent-decodes `input` the way `decodeURI` does.
///
/// Escapes of reserved characters (`;/?:@&=+$,#`) are kept as-is so that a
/// decoded `%3F` cannot start a query. Input with a malformed escape or
/// invalid UTF-8 is returned unchanged.
pub fn decode_uri(input: &str) -> String {
	const RESERVED: &[u8] = b";/?:@&=+$,#";

	if !input.contains('%') {
		return input.to_string();
	}

	let bytes = input.as_bytes();
	let mut out = String::with_capacity(input.len());
	let mut start = 0;
	let mut cursor = 0;
	while let Some(offset) = input[cursor..].find('%') {
		let at = cursor + offset;
		let Some(byte) = bytes.get(at + 1..at + 3).and_then(escaped_byte) else {
			return input.to_string();
		};
		if RESERVED.contains(&byte) {
			let Some(decoded) = decode_segment(&input[start..at]) else {
				return input.to_string();
			};
			out.push_str(&decoded);
			out.push_str(&input[at..at + 3]);
			start = at + 3;
		}
		cursor = at + 3;
	}

	match decode_segment(&input[start..]) {
		Some(decoded) => {
			out.push_str(&decoded);
			out
		}
		None => input.to_string(),
	}
}

fn decode_segment(segment: &str) -> Option<Cow<'_, str>> {
	percent_decode_str(segment).decode_utf8().ok()
}

/// Value of a two-digit hex escape body. Signs and other non-hex bytes are
/// rejected.
fn escaped_byte(hex: &[u8]) -> Option<u8> {
	let digit = |b: u8| char::from(b).to_digit(16);
	match hex {
		[hi, lo] => Some((digit(*hi)? * 16 + digit(*lo)?) as u8),
		_ => None,
	}
}
