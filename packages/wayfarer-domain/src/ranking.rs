use std::{
	cmp::Ordering,
	collections::{BinaryHeap, VecDeque},
};

use crate::{ContentKind, Cursor, ObjectId};

/// An item that can be placed in the trending order.
pub trait Ranked {
	fn trending_score(&self) -> f64;

	fn object_id(&self) -> &ObjectId;

	fn kind(&self) -> ContentKind;
}

/// One page of a merged feed.
#[derive(Debug)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub next_cursor: Option<Cursor>,
	pub has_next_page: bool,
}
impl<T> Page<T> {
	pub fn empty() -> Self {
		Self { items: Vec::new(), next_cursor: None, has_next_page: false }
	}
}

struct Head<T> {
	item: T,
	source: usize,
}
impl<T: Ranked> PartialEq for Head<T> {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}
impl<T: Ranked> Eq for Head<T> {}
impl<T: Ranked> PartialOrd for Head<T> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
impl<T: Ranked> Ord for Head<T> {
	// Max-heap order: the item that belongs first in the feed is the greatest.
	fn cmp(&self, other: &Self) -> Ordering {
		feed_order(&other.item, &self.item)
	}
}

/// Feed order: `Less` when `a` is shown before `b`. Higher scores first, then higher ids.
pub fn feed_order<T: Ranked>(a: &T, b: &T) -> Ordering {
	b.trending_score()
		.total_cmp(&a.trending_score())
		.then_with(|| b.object_id().cmp(a.object_id()))
}

pub fn sort_feed<T: Ranked>(items: &mut [T]) {
	items.sort_by(feed_order);
}

/// Merges sources that are each already in feed order and assembles one page of `limit` items.
///
/// Each source should hold up to `limit + 1` rows past the caller's cursor. Whatever is left in
/// any source after the page is filled means the feed continues.
pub fn merge_page<T: Ranked>(sources: Vec<Vec<T>>, limit: usize) -> Page<T> {
	if limit == 0 {
		return Page::empty();
	}

	let mut queues: Vec<VecDeque<T>> = sources.into_iter().map(VecDeque::from).collect();
	let mut heap = BinaryHeap::with_capacity(queues.len());

	for (source, queue) in queues.iter_mut().enumerate() {
		if let Some(item) = queue.pop_front() {
			heap.push(Head { item, source });
		}
	}

	let mut items = Vec::with_capacity(limit);

	while items.len() < limit {
		let Some(Head { item, source }) = heap.pop() else {
			break;
		};

		if let Some(next) = queues[source].pop_front() {
			heap.push(Head { item: next, source });
		}

		items.push(item);
	}

	let has_next_page = !heap.is_empty();
	let next_cursor = if items.len() == limit {
		items
			.last()
			.map(|last| Cursor::new(last.trending_score(), last.kind(), last.object_id().clone()))
	} else {
		None
	};

	Page { items, next_cursor, has_next_page }
}
