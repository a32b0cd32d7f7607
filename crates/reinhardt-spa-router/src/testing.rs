//! In-memory host for tests.
//!
//! [`MemoryHost`] simulates the parts of a browser the router consumes: a
//! location with a session-history stack, `popstate`/`hashchange` delivery,
//! a window scroll offset, a set of element ids, page-wide clicks and a
//! virtual clock for scheduled tasks.
//!
//! Like a browser, `hashchange` is delivered asynchronously: anchor changes
//! queue the event until [`MemoryHost::flush_events`] (or
//! [`MemoryHost::advance`]) runs. `popstate` is delivered synchronously by
//! [`MemoryHost::back`] and [`MemoryHost::forward`].

use crate::history::{HistoryEntryState, ScrollOffset};
use crate::host::{
	ClickListener, EventSource, History, HostError, LinkClick, Location, NavigationEvent,
	NavigationListener, Scheduler, TaskId, Viewport,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::rc::Rc;
use url::Url;

type SharedNavigationListener = Rc<dyn Fn(Option<HistoryEntryState>)>;
type SharedClickListener = Rc<dyn Fn(&dyn LinkClick)>;

#[derive(Debug, Clone)]
struct Entry {
	url: Url,
	state: Option<HistoryEntryState>,
}

struct ScheduledTask {
	due_ms: u64,
	task: Box<dyn FnOnce()>,
}

struct MemoryState {
	entries: Vec<Entry>,
	index: usize,
	scroll: ScrollOffset,
	elements: HashSet<String>,
	scrolled_into_view: Vec<String>,
	scroll_calls: Vec<ScrollOffset>,
	navigation_listeners: Vec<(NavigationEvent, SharedNavigationListener)>,
	click_listeners: Vec<SharedClickListener>,
	queued_events: VecDeque<NavigationEvent>,
	now_ms: u64,
	next_task: i64,
	tasks: BTreeMap<i64, ScheduledTask>,
}

/// Browser simulation implementing every [`Host`](crate::host::Host) trait.
pub struct MemoryHost {
	history_supported: bool,
	state: RefCell<MemoryState>,
}

impl MemoryHost {
	/// Creates a host whose document is at `url`.
	///
	/// # Panics
	///
	/// Panics if `url` is not an absolute URL.
	pub fn new(url: &str) -> Self {
		Self::build(url, true)
	}

	/// Creates a host without programmatic history.
	///
	/// # Panics
	///
	/// Panics if `url` is not an absolute URL.
	pub fn without_history(url: &str) -> Self {
		Self::build(url, false)
	}

	fn build(url: &str, history_supported: bool) -> Self {
		let url = Url::parse(url).unwrap_or_else(|e| panic!("invalid host URL '{}': {}", url, e));
		Self {
			history_supported,
			state: RefCell::new(MemoryState {
				entries: vec![Entry { url, state: None }],
				index: 0,
				scroll: ScrollOffset::default(),
				elements: HashSet::new(),
				scrolled_into_view: Vec::new(),
				scroll_calls: Vec::new(),
				navigation_listeners: Vec::new(),
				click_listeners: Vec::new(),
				queued_events: VecDeque::new(),
				now_ms: 0,
				next_task: 1,
				tasks: BTreeMap::new(),
			}),
		}
	}

	fn current_url(&self) -> Url {
		let state = self.state.borrow();
		state.entries[state.index].url.clone()
	}

	/// Replaces the current entry's URL without any event, like a fresh page
	/// load or a user edit the router has not been told about.
	///
	/// # Panics
	///
	/// Panics if `url` cannot be resolved against the current location.
	pub fn set_location(&self, url: &str) {
		let url = self
			.current_url()
			.join(url)
			.unwrap_or_else(|e| panic!("invalid URL '{}': {}", url, e));
		let mut state = self.state.borrow_mut();
		let index = state.index;
		state.entries[index].url = url;
	}

	/// Number of session-history entries.
	pub fn history_len(&self) -> usize {
		self.state.borrow().entries.len()
	}

	/// Index of the active entry.
	pub fn history_index(&self) -> usize {
		self.state.borrow().index
	}

	/// State stored in the active entry.
	pub fn current_state(&self) -> Option<HistoryEntryState> {
		let state = self.state.borrow();
		state.entries[state.index].state.clone()
	}

	/// State stored in the entry at `index`.
	pub fn state_at(&self, index: usize) -> Option<HistoryEntryState> {
		self.state
			.borrow()
			.entries
			.get(index)
			.and_then(|entry| entry.state.clone())
	}

	/// Traverses one entry back, delivering `popstate` (and a queued
	/// `hashchange` when only the anchor differs). Returns `false` at the start.
	pub fn back(&self) -> bool {
		self.traverse(-1)
	}

	/// Traverses one entry forward. Returns `false` at the end.
	pub fn forward(&self) -> bool {
		self.traverse(1)
	}

	fn traverse(&self, delta: isize) -> bool {
		let (entry_state, hash_changed) = {
			let mut state = self.state.borrow_mut();
			let Some(target) = state.index.checked_add_signed(delta) else {
				return false;
			};
			if target >= state.entries.len() {
				return false;
			}
			let from = state.entries[state.index].url.clone();
			state.index = target;
			let to = &state.entries[target].url;
			let hash_changed = from.fragment() != to.fragment();
			(state.entries[target].state.clone(), hash_changed)
		};

		self.deliver(NavigationEvent::PopState, entry_state);
		if hash_changed {
			self.state
				.borrow_mut()
				.queued_events
				.push_back(NavigationEvent::HashChange);
		}
		true
	}

	/// Delivers queued `hashchange` events.
	pub fn flush_events(&self) {
		loop {
			let next = self.state.borrow_mut().queued_events.pop_front();
			match next {
				Some(event) => self.deliver(event, None),
				None => break,
			}
		}
	}

	fn deliver(&self, event: NavigationEvent, entry_state: Option<HistoryEntryState>) {
		let listeners: Vec<SharedNavigationListener> = self
			.state
			.borrow()
			.navigation_listeners
			.iter()
			.filter(|(kind, _)| *kind == event)
			.map(|(_, listener)| Rc::clone(listener))
			.collect();
		for listener in listeners {
			listener(entry_state.clone());
		}
	}

	/// Number of listeners subscribed to `event`.
	pub fn listener_count(&self, event: NavigationEvent) -> usize {
		self.state
			.borrow()
			.navigation_listeners
			.iter()
			.filter(|(kind, _)| *kind == event)
			.count()
	}

	/// Sets the window scroll offset, as if the user scrolled.
	pub fn set_scroll(&self, x: f64, y: f64) {
		self.state.borrow_mut().scroll = ScrollOffset::new(x, y);
	}

	/// Every offset passed to `scroll_to`, oldest first.
	pub fn scroll_calls(&self) -> Vec<ScrollOffset> {
		self.state.borrow().scroll_calls.clone()
	}

	/// Adds an element with the given id to the document.
	pub fn insert_element(&self, id: &str) {
		self.state.borrow_mut().elements.insert(id.to_string());
	}

	/// Ids scrolled into view, oldest first.
	pub fn scrolled_into_view(&self) -> Vec<String> {
		self.state.borrow().scrolled_into_view.clone()
	}

	/// Clicks a route-owned link whose `href` attribute is `href`. Returns
	/// whether the default navigation was prevented.
	pub fn click_link(&self, href: &str) -> bool {
		self.click(MemoryClick::link(self.resolve_href(href)))
	}

	/// Clicks a route-owned link while a modifier key is held.
	pub fn click_link_modified(&self, href: &str) -> bool {
		let mut click = MemoryClick::link(self.resolve_href(href));
		click.modified = true;
		self.click(click)
	}

	/// Clicks somewhere that is not inside a route-owned link.
	pub fn click_elsewhere(&self) -> bool {
		self.click(MemoryClick {
			href: None,
			modified: false,
			prevented: Cell::new(false),
		})
	}

	fn resolve_href(&self, href: &str) -> String {
		self.current_url()
			.join(href)
			.map(|url| url.to_string())
			.unwrap_or_else(|_| href.to_string())
	}

	fn click(&self, click: MemoryClick) -> bool {
		let listeners: Vec<SharedClickListener> = self
			.state
			.borrow()
			.click_listeners
			.iter()
			.map(Rc::clone)
			.collect();
		for listener in listeners {
			listener(&click);
		}
		click.prevented.get()
	}

	/// Current virtual time.
	pub fn now_ms(&self) -> u64 {
		self.state.borrow().now_ms
	}

	/// Number of scheduled tasks that have not run or been cancelled.
	pub fn pending_tasks(&self) -> usize {
		self.state.borrow().tasks.len()
	}

	/// Delivers queued events, then advances the virtual clock by `ms`,
	/// running due tasks in order.
	pub fn advance(&self, ms: u64) {
		self.flush_events();
		let deadline = self.now_ms() + ms;
		loop {
			let next = {
				let mut state = self.state.borrow_mut();
				let due = state
					.tasks
					.iter()
					.filter(|(_, task)| task.due_ms <= deadline)
					.min_by_key(|(id, task)| (task.due_ms, **id))
					.map(|(id, _)| *id);
				due.and_then(|id| state.tasks.remove(&id)).inspect(|task| {
					state.now_ms = task.due_ms;
				})
			};
			match next {
				Some(task) => (task.task)(),
				None => break,
			}
		}
		self.state.borrow_mut().now_ms = deadline;
	}
}

impl Location for MemoryHost {
	fn pathname(&self) -> String {
		self.current_url().path().to_string()
	}

	fn search(&self) -> String {
		match self.current_url().query() {
			Some(query) if !query.is_empty() => format!("?{}", query),
			_ => String::new(),
		}
	}

	fn hash(&self) -> String {
		match self.current_url().fragment() {
			Some(fragment) if !fragment.is_empty() => format!("#{}", fragment),
			_ => String::new(),
		}
	}

	fn origin(&self) -> String {
		self.current_url().origin().ascii_serialization()
	}

	fn href(&self) -> String {
		self.current_url().to_string()
	}

	fn set_hash(&self, hash: &str) {
		let hash = hash.strip_prefix('#').unwrap_or(hash);
		let mut url = self.current_url();
		let previous = url.fragment().unwrap_or_default().to_string();
		url.set_fragment(Some(hash));
		if url.fragment().unwrap_or_default() == previous {
			return;
		}

		let mut state = self.state.borrow_mut();
		let next = state.index + 1;
		state.entries.truncate(next);
		state.entries.push(Entry { url, state: None });
		state.index = next;
		state.queued_events.push_back(NavigationEvent::HashChange);
	}
}

impl History for MemoryHost {
	fn supports_history(&self) -> bool {
		self.history_supported
	}

	fn push_state(&self, entry_state: &HistoryEntryState, url: &str) -> Result<(), HostError> {
		if !self.history_supported {
			return Err(HostError::HistoryUnavailable);
		}
		let url = self.join(url)?;
		let mut state = self.state.borrow_mut();
		let next = state.index + 1;
		state.entries.truncate(next);
		state.entries.push(Entry {
			url,
			state: Some(entry_state.clone()),
		});
		state.index = next;
		Ok(())
	}

	fn replace_state(&self, entry_state: &HistoryEntryState, url: &str) -> Result<(), HostError> {
		if !self.history_supported {
			return Err(HostError::HistoryUnavailable);
		}
		let url = self.join(url)?;
		let mut state = self.state.borrow_mut();
		let index = state.index;
		state.entries[index] = Entry {
			url,
			state: Some(entry_state.clone()),
		};
		Ok(())
	}
}

impl MemoryHost {
	fn join(&self, url: &str) -> Result<Url, HostError> {
		let current = self.current_url();
		let joined = current.join(url).map_err(|e| HostError::InvalidUrl {
			url: url.to_string(),
			reason: e.to_string(),
		})?;
		if joined.origin() != current.origin() {
			return Err(HostError::History(format!(
				"cannot move history to a different origin: {}",
				joined
			)));
		}
		Ok(joined)
	}
}

impl Viewport for MemoryHost {
	fn scroll_offset(&self) -> ScrollOffset {
		self.state.borrow().scroll
	}

	fn scroll_to(&self, x: f64, y: f64) {
		let mut state = self.state.borrow_mut();
		let offset = ScrollOffset::new(x, y);
		state.scroll = offset;
		state.scroll_calls.push(offset);
	}

	fn scroll_into_view(&self, id: &str) -> bool {
		let mut state = self.state.borrow_mut();
		if !state.elements.contains(id) {
			return false;
		}
		state.scrolled_into_view.push(id.to_string());
		true
	}
}

impl EventSource for MemoryHost {
	fn on_navigation(&self, event: NavigationEvent, listener: NavigationListener) {
		self.state
			.borrow_mut()
			.navigation_listeners
			.push((event, Rc::from(listener)));
	}

	fn on_click(&self, listener: ClickListener) {
		self.state
			.borrow_mut()
			.click_listeners
			.push(Rc::from(listener));
	}
}

impl Scheduler for MemoryHost {
	fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskId {
		let mut state = self.state.borrow_mut();
		let id = state.next_task;
		state.next_task += 1;
		let due_ms = state.now_ms + u64::from(delay_ms);
		state.tasks.insert(id, ScheduledTask { due_ms, task });
		TaskId(id)
	}

	fn cancel(&self, id: TaskId) {
		self.state.borrow_mut().tasks.remove(&id.0);
	}
}

/// A click delivered by [`MemoryHost`].
#[derive(Debug)]
pub struct MemoryClick {
	href: Option<String>,
	modified: bool,
	prevented: Cell<bool>,
}

impl MemoryClick {
	fn link(href: String) -> Self {
		Self {
			href: Some(href),
			modified: false,
			prevented: Cell::new(false),
		}
	}
}

impl LinkClick for MemoryClick {
	fn route_link_href(&self) -> Option<String> {
		self.href.clone()
	}

	fn is_modified(&self) -> bool {
		self.modified
	}

	fn prevent_default(&self) {
		self.prevented.set(true);
	}
}
