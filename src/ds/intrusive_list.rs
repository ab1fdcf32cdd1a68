//! Recency chain for the LRU policy.
//!
//! Every cached key owns one node in a [`SlotArena`]; nodes are chained by
//! [`SlotId`] rather than by pointer, so the id handed to the entry store
//! stays valid while the node is relinked. A read splices the node out and
//! back in at the head; eviction unlinks the tail.
//!
//! ```text
//!   head                                      tail
//!    │                                          │
//!    ▼                                          ▼
//!   [k3] ──next──► [k1] ──next──► [k7] ──next──► ∅
//!    ∅ ◄──prev──── [k3] ◄──prev── [k1] ◄──prev── [k7]
//!   newest                                    oldest
//! ```
//!
//! All link edits are O(1); only [`IntrusiveList::iter`] and
//! [`IntrusiveList::check_invariants`] walk the chain.

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::{InvariantError, ensure_invariant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Links {
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    links: Links,
}

/// Doubly linked list whose nodes live in a [`SlotArena`].
#[derive(Debug)]
pub struct IntrusiveList<T> {
    nodes: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.nodes.contains(id)
    }

    /// Most recently linked value.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|id| self.get(id))
    }

    /// Oldest value; the next one [`pop_back`](Self::pop_back) returns.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    pub fn back_id(&self) -> Option<SlotId> {
        self.tail
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.nodes.get(id).map(|node| &node.value)
    }

    /// Values from head to tail.
    pub fn iter(&self) -> IntrusiveListIter<'_, T> {
        IntrusiveListIter {
            nodes: &self.nodes,
            cursor: self.head,
        }
    }

    /// Links `value` in at the head and returns its stable id.
    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.nodes.insert(Node {
            value,
            links: Links::default(),
        });
        self.link_between(id, None, self.head);
        id
    }

    /// Links `value` in at the tail and returns its stable id.
    pub fn push_back(&mut self, value: T) -> SlotId {
        let id = self.nodes.insert(Node {
            value,
            links: Links::default(),
        });
        self.link_between(id, self.tail, None);
        id
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.head.and_then(|id| self.remove(id))
    }

    pub fn pop_back(&mut self) -> Option<T> {
        self.tail.and_then(|id| self.remove(id))
    }

    /// Unlinks `id` and frees its node. `None` if the id is vacant.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.unlink(id)?;
        self.nodes.remove(id).map(|node| node.value)
    }

    /// Relinks `id` at the head; `false` if the id is vacant.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if self.head == Some(id) {
            return true;
        }
        if self.unlink(id).is_none() {
            return false;
        }
        self.link_between(id, None, self.head);
        true
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Walks the chain head to tail and checks links, length and tail pointer.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let (head, tail) = (self.head, self.tail);
        if head.is_none() || tail.is_none() {
            ensure_invariant!(
                head.is_none() && tail.is_none() && self.is_empty(),
                "list head/tail disagree on emptiness"
            );
            return Ok(());
        }

        let mut walked = 0usize;
        let mut behind = None;
        let mut cursor = head;
        while let Some(id) = cursor {
            let Some(node) = self.nodes.get(id) else {
                return Err(InvariantError::new(format!(
                    "list links to vacant slot {}",
                    id.index()
                )));
            };
            ensure_invariant!(
                node.links.prev == behind,
                "list node {} has a stale prev link",
                id.index()
            );
            walked += 1;
            ensure_invariant!(walked <= self.len(), "list chain is longer than its arena");
            behind = Some(id);
            cursor = node.links.next;
        }

        ensure_invariant!(tail == behind, "list tail does not end the chain");
        ensure_invariant!(
            walked == self.len(),
            "list chain has {} nodes but arena holds {}",
            walked,
            self.len()
        );
        Ok(())
    }

    fn link_between(&mut self, id: SlotId, prev: Option<SlotId>, next: Option<SlotId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.links = Links { prev, next };
        }
        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(node) => node.links.next = Some(id),
            None => self.head = Some(id),
        }
        match next.and_then(|n| self.nodes.get_mut(n)) {
            Some(node) => node.links.prev = Some(id),
            None => self.tail = Some(id),
        }
    }

    fn unlink(&mut self, id: SlotId) -> Option<()> {
        let Links { prev, next } = std::mem::take(&mut self.nodes.get_mut(id)?.links);
        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(node) => node.links.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.nodes.get_mut(n)) {
            Some(node) => node.links.prev = prev,
            None => self.tail = prev,
        }
        Some(())
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowing iterator from head to tail.
pub struct IntrusiveListIter<'a, T> {
    nodes: &'a SlotArena<Node<T>>,
    cursor: Option<SlotId>,
}

impl<'a, T> Iterator for IntrusiveListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cursor?)?;
        self.cursor = node.links.next;
        Some(&node.value)
    }
}
