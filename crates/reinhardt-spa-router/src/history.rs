//! History entry state.
//!
//! The router stores a small serde document in each history entry it leaves
//! so that a later traversal can put the scroll position back.

use serde::{Deserialize, Serialize};

/// Window scroll offset in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollOffset {
	/// Horizontal offset.
	pub x: f64,
	/// Vertical offset.
	pub y: f64,
}

impl ScrollOffset {
	/// Creates an offset.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// State attached to a session-history entry.
///
/// `scroll` is the navigation snapshot written before every programmatic
/// navigation; `position` is the vertical offset written by query updates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryEntryState {
	/// Scroll offset of the page when it was left.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scroll: Option<ScrollOffset>,
	/// Vertical scroll offset recorded by a query-parameter update.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub position: Option<f64>,
}

impl HistoryEntryState {
	/// An entry state without any recorded offset.
	pub fn empty() -> Self {
		Self::default()
	}

	/// A navigation snapshot.
	pub fn snapshot(scroll: ScrollOffset) -> Self {
		Self {
			scroll: Some(scroll),
			position: None,
		}
	}

	/// A query-update marker carrying the vertical offset.
	pub fn position(y: f64) -> Self {
		Self {
			scroll: None,
			position: Some(y),
		}
	}

	/// Serializes to JSON.
	pub fn to_json(&self) -> String {
		serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
	}

	/// Parses state previously written by [`to_json`](Self::to_json). Foreign
	/// or malformed state yields `None`.
	pub fn from_json(input: &str) -> Option<Self> {
		serde_json::from_str(input).ok()
	}
}

/// How a navigation affects session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationType {
	/// Push a new entry, reset scroll and dispatch immediately.
	Push,
	/// Replace the current entry; no scroll reset or dispatch.
	Replace,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_snapshot_json_shape() {
		let state = HistoryEntryState::snapshot(ScrollOffset::new(0.0, 120.0));
		assert_eq!(state.to_json(), r#"{"scroll":{"x":0.0,"y":120.0}}"#);
	}

	#[rstest]
	fn test_position_json_shape() {
		assert_eq!(
			HistoryEntryState::position(42.0).to_json(),
			r#"{"position":42.0}"#
		);
		assert_eq!(HistoryEntryState::empty().to_json(), "{}");
	}

	#[rstest]
	#[case(r#"{"scroll":{"x":1,"y":2}}"#, Some(ScrollOffset::new(1.0, 2.0)))]
	#[case(r#"{"position":10}"#, None)]
	#[case(r#"{"other":true}"#, None)]
	fn test_from_json(#[case] input: &str, #[case] scroll: Option<ScrollOffset>) {
		let state = HistoryEntryState::from_json(input).unwrap();
		assert_eq!(state.scroll, scroll);
	}

	#[rstest]
	fn test_from_json_malformed() {
		assert!(HistoryEntryState::from_json("not json").is_none());
		assert!(HistoryEntryState::from_json("null").is_none());
	}
}
