//! Property-based tests for the router
//!
//! Uses proptest to verify:
//! 1. Resolved fragments never contain the query delimiter
//! 2. Configuration is idempotent
//! 3. Flush always restores the defaults
//! 4. A push is observable through the resolved fragment
//! 5. First match wins regardless of table size

use proptest::prelude::*;
use reinhardt_spa_router::location::clear_slashes;
use reinhardt_spa_router::testing::MemoryHost;
use reinhardt_spa_router::{Handler, Matcher, Mode, Router, RouterOptions};
use rstest::rstest;
use std::cell::RefCell;
use std::rc::Rc;

fn mode_strategy() -> impl Strategy<Value = Mode> {
	prop_oneof![Just(Mode::Hash), Just(Mode::History)]
}

fn router_at(url: &str) -> (Rc<MemoryHost>, Router) {
	let host = Rc::new(MemoryHost::new(url));
	let router = Router::new(Rc::clone(&host));
	(host, router)
}

// ============================================================================
// PB-01: No query delimiter in fragments
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(50))]

	/// Property: history-mode fragments never contain '?'
	#[rstest]
	fn test_history_fragment_has_no_query_delimiter(
		root in "[a-z/]{0,8}",
		path in "[a-z][a-z0-9/?=&]{0,24}",
	) {
		let (host, router) = router_at("https://app.test/");
		router.configure(RouterOptions::new().mode(Mode::History).root(root));
		host.set_location(&format!("/{}", path));

		prop_assert!(!router.resolve_fragment().contains('?'));
	}

	/// Property: hash-mode fragments never contain '?'
	#[rstest]
	fn test_hash_fragment_has_no_query_delimiter(
		root in "[a-z/]{0,8}",
		hash in "[a-z0-9/?=&]{0,24}",
	) {
		let (host, router) = router_at("https://app.test/");
		router.configure(RouterOptions::new().mode(Mode::Hash).root(root));
		host.set_location(&format!("#{}", hash));

		prop_assert!(!router.resolve_fragment().contains('?'));
	}
}

// ============================================================================
// PB-02: Configuration idempotence
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(50))]

	/// Property: configuring twice equals configuring once
	#[rstest]
	fn test_configure_is_idempotent(
		mode in mode_strategy(),
		root in "[a-z/:.]{0,16}",
		history in any::<bool>(),
	) {
		let host = Rc::new(if history {
			MemoryHost::new("https://app.test/")
		} else {
			MemoryHost::without_history("https://app.test/")
		});
		let router = Router::new(host);
		let options = RouterOptions::new().mode(mode).root(root);

		router.configure(options.clone());
		let once = router.config();
		router.configure(options);
		prop_assert_eq!(router.config(), once);
	}

	/// Property: the effective root is always wrapped in single separators
	#[rstest]
	fn test_effective_root_is_normalized(root in "[a-z/:.]{0,16}") {
		let (_, router) = router_at("https://app.test/");
		router.configure(RouterOptions::new().root(root));

		let effective = router.root();
		prop_assert!(effective.starts_with('/'));
		prop_assert!(effective.ends_with('/'));
		if effective != "/" {
			prop_assert!(!effective.starts_with("//"));
			prop_assert!(!effective.ends_with("//"));
		}
	}
}

// ============================================================================
// PB-03: Flush restores defaults
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(50))]

	/// Property: flush always yields hash mode and the default root
	#[rstest]
	fn test_flush_always_resets(
		mode in mode_strategy(),
		root in "[a-z/]{0,12}",
		routes in 0usize..8,
	) {
		let (_, router) = router_at("https://app.test/");
		router.configure(RouterOptions::new().mode(mode).root(root));
		for i in 0..routes {
			router.add(
				Matcher::regex(&format!("^r{}$", i)).unwrap(),
				Handler::new(|_, _| {}),
			);
		}

		router.flush();
		prop_assert_eq!(router.mode(), Mode::Hash);
		prop_assert_eq!(router.root(), "/");
		prop_assert_eq!(router.route_count(), 0);
	}
}

// ============================================================================
// PB-04: Navigation round-trip
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(50))]

	/// Property: push(p) then resolve_fragment yields p without separators
	#[rstest]
	fn test_push_round_trip(
		mode in mode_strategy(),
		segments in prop::collection::vec("[a-z0-9]{1,8}", 1..4),
		leading in any::<bool>(),
		trailing in any::<bool>(),
	) {
		let (_, router) = router_at("https://app.test/");
		router.configure(RouterOptions::new().mode(mode));

		let joined = segments.join("/");
		let path = format!(
			"{}{}{}",
			if leading { "/" } else { "" },
			joined,
			if trailing { "/" } else { "" },
		);
		router.push(&path);

		prop_assert_eq!(router.resolve_fragment(), clear_slashes(&path));
	}
}

// ============================================================================
// PB-05: First match wins
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(50))]

	/// Property: only the first of several matching routes runs
	#[rstest]
	fn test_first_match_wins(
		fragment in "[a-z]{1,10}",
		misses in 0usize..4,
		matches in 1usize..4,
	) {
		let (_, router) = router_at("https://app.test/");
		let calls = Rc::new(RefCell::new(Vec::new()));

		for i in 0..misses {
			router.add(
				Matcher::regex(&format!("^{}-miss{}$", fragment, i)).unwrap(),
				Handler::new(|_, _| {}),
			);
		}
		for i in 0..matches {
			let sink = Rc::clone(&calls);
			router.add(
				Matcher::regex(&format!("^{}$", fragment)).unwrap(),
				Handler::new(move |_, _| sink.borrow_mut().push(i)),
			);
		}

		router.dispatch_fragment(&fragment);
		prop_assert_eq!(calls.borrow().clone(), vec![0usize]);
	}
}
