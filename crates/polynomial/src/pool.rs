// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Term node pool.
//!
//! Every polynomial stores its terms as a circular chain of nodes inside a
//! [`TermPool`] arena. Nodes are addressed by [`NodeId`] and released nodes are
//! threaded onto a free list through their own `link` field, so storage freed
//! by one polynomial is reused by the next one bound to the same pool.

use crate::term::Term;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A pool shared by every polynomial bound to it.
pub type SharedPool = Rc<RefCell<TermPool>>;

thread_local! {
    static DEFAULT_POOL: SharedPool = TermPool::shared(PoolConfig::default());
}

/// Returns the calling thread's default pool.
///
/// The pool lives as long as the thread. Polynomials created without an
/// explicit pool draw their nodes from here.
pub fn default_pool() -> SharedPool {
    DEFAULT_POOL.with(Rc::clone)
}

/// Stable index of a node inside a [`TermPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Node {
    pub(crate) term: Term,
    pub(crate) link: NodeId,
}

/// Largest `initial_capacity` a [`TermPool`] reserves up front. The arena
/// still grows past it on demand.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 20;

/// Configuration for a [`TermPool`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct PoolConfig {
    /// Number of nodes to reserve up front, at most [`MAX_INITIAL_CAPACITY`].
    pub initial_capacity: usize,
    /// Thread the reserved nodes onto the free list immediately.
    pub preallocate: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            preallocate: false,
        }
    }
}

/// Counters describing how a pool has been used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total calls to [`TermPool::acquire`].
    pub acquired: u64,
    /// Acquisitions served from the free list.
    pub reused: u64,
    /// Acquisitions that grew the arena.
    pub allocated: u64,
    /// Total calls to [`TermPool::release`].
    pub released: u64,
}

/// Arena of term nodes with an intrusive free list.
///
/// Not thread safe. Share it between polynomials of one thread through
/// [`SharedPool`].
#[derive(Debug)]
pub struct TermPool {
    nodes: Vec<Node>,
    /// Head of the free list. The last free node links to itself.
    free: Option<NodeId>,
    free_len: usize,
    stats: PoolStats,
}

impl Default for TermPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TermPool {
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Creates a pool, clamping `initial_capacity` to [`MAX_INITIAL_CAPACITY`].
    pub fn with_config(config: PoolConfig) -> Self {
        let reserve = config.initial_capacity.min(MAX_INITIAL_CAPACITY);
        if reserve < config.initial_capacity {
            warn!(
                requested = config.initial_capacity,
                reserved = reserve,
                "Clamped term pool initial capacity"
            );
        }

        let mut pool = Self {
            nodes: Vec::with_capacity(reserve),
            free: None,
            free_len: 0,
            stats: PoolStats::default(),
        };

        if config.preallocate {
            for _ in 0..reserve {
                let id = pool.push_node();
                pool.push_free(id);
            }
            debug!(nodes = reserve, "Preallocated term pool");
        }

        pool
    }

    /// Creates a pool wrapped for sharing between polynomials.
    pub fn shared(config: PoolConfig) -> SharedPool {
        Rc::new(RefCell::new(Self::with_config(config)))
    }

    /// Hands out a node slot.
    ///
    /// The most recently released node is reused first. When the free list is
    /// empty the arena grows by one node. The slot's previous contents are
    /// unspecified and must be overwritten by the caller.
    ///
    /// # Panics
    ///
    /// Panics if the arena would exceed `u32::MAX` nodes.
    pub fn acquire(&mut self) -> NodeId {
        self.stats.acquired += 1;

        match self.free {
            Some(id) => {
                let next = self.nodes[id.index()].link;
                self.free = if next == id { None } else { Some(next) };
                self.free_len -= 1;
                self.stats.reused += 1;
                id
            }
            None => {
                self.stats.allocated += 1;
                self.push_node()
            }
        }
    }

    /// Returns a node to the free list.
    ///
    /// The caller must not use `id` again until it is handed out by a later
    /// [`acquire`](Self::acquire).
    pub fn release(&mut self, id: NodeId) {
        debug_assert!(id.index() < self.nodes.len(), "node {id:?} not in pool");
        self.stats.released += 1;
        self.push_free(id);
    }

    /// Number of nodes waiting on the free list.
    pub fn free_len(&self) -> usize {
        self.free_len
    }

    /// Number of nodes currently owned by polynomials (sentinels included).
    pub fn in_use(&self) -> usize {
        self.nodes.len() - self.free_len
    }

    /// Total number of nodes the arena holds.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = PoolStats::default();
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn term(&self, id: NodeId) -> Term {
        self.nodes[id.index()].term
    }

    pub(crate) fn link(&self, id: NodeId) -> NodeId {
        self.nodes[id.index()].link
    }

    pub(crate) fn set_term(&mut self, id: NodeId, term: Term) {
        self.nodes[id.index()].term = term;
    }

    pub(crate) fn set_link(&mut self, id: NodeId, link: NodeId) {
        self.nodes[id.index()].link = link;
    }

    fn push_node(&mut self) -> NodeId {
        let index = self.nodes.len();
        assert!(index < u32::MAX as usize, "Term pool capacity exceeded");

        if index == self.nodes.capacity() {
            trace!(nodes = index, "Growing term pool arena");
        }

        let id = NodeId(index as u32);
        self.nodes.push(Node {
            term: Term::default(),
            link: id,
        });
        id
    }

    fn push_free(&mut self, id: NodeId) {
        let link = self.free.unwrap_or(id);
        self.nodes[id.index()].link = link;
        self.free = Some(id);
        self.free_len += 1;
    }
}
