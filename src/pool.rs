// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! A dynamic, single-ended work pool shared between one owner and any number
//! of would-be thieves. The owner drives it depth-first (`push_back`/
//! `pop_back`); phase 1 additionally drains it breadth-first (`pop_front`,
//! abandoning the front slot rather than reclaiming it, since phase 1 keeps
//! the pool small by construction); thieves take a batch off the back
//! (`steal_half`). All mutation goes through `parking_lot::Mutex`, which
//! gives us the single coarse lock the original's CAS spin lock protects,
//! plus the `try_lock` a thief needs to give up on a busy victim rather than
//! block on it.

use parking_lot::Mutex;

use crate::node::Node;

const INITIAL_CAPACITY: usize = 1024;

struct Inner {
    elements: Vec<Node>,
    front: usize,
}

impl Inner {
    fn size(&self) -> usize {
        self.elements.len() - self.front
    }
}

/// A single worker's pool of pending nodes.
pub struct Pool {
    inner: Mutex<Inner>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    pub fn new() -> Self {
        Pool {
            inner: Mutex::new(Inner {
                elements: Vec::with_capacity(INITIAL_CAPACITY),
                front: 0,
            }),
        }
    }

    pub fn with_seed(nodes: Vec<Node>) -> Self {
        Pool {
            inner: Mutex::new(Inner {
                elements: nodes,
                front: 0,
            }),
        }
    }

    /// Number of nodes currently held. Racy the instant it's returned if
    /// other threads can mutate the pool concurrently; callers that need a
    /// consistent view should use `pop_back_bulk`/`steal_half` directly.
    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn push_back(&self, node: Node) {
        let mut inner = self.inner.lock();
        inner.elements.push(node);
    }

    pub fn push_back_bulk(&self, nodes: impl IntoIterator<Item = Node>) {
        let mut inner = self.inner.lock();
        inner.elements.extend(nodes);
    }

    pub fn pop_back(&self) -> Option<Node> {
        let mut inner = self.inner.lock();
        if inner.size() == 0 {
            return None;
        }
        inner.elements.pop()
    }

    /// FIFO pop used only during the breadth-first seeding phase. The
    /// abandoned front slots are not reclaimed; phase 1 is bounded so this
    /// never grows unboundedly in practice.
    pub fn pop_front(&self) -> Option<Node> {
        let mut inner = self.inner.lock();
        if inner.size() == 0 {
            return None;
        }
        let front = inner.front;
        inner.front += 1;
        Some(inner.elements[front])
    }

    /// Atomically take `min(size, max_batch)` nodes off the back, but only
    /// if at least `min_batch` are available; otherwise leave the pool
    /// untouched and return `None`.
    pub fn pop_back_bulk(&self, min_batch: usize, max_batch: usize) -> Option<Vec<Node>> {
        let mut inner = self.inner.lock();
        let size = inner.size();
        if size < min_batch {
            return None;
        }
        let take = size.min(max_batch);
        let split_at = inner.elements.len() - take;
        Some(inner.elements.split_off(split_at))
    }

    /// Atomically take exactly `size / 2` nodes off the back, but only if
    /// at least `2 * min_batch` are available (so the victim keeps enough to
    /// remain worth stealing from again, and the thief gets a worthwhile
    /// batch).
    pub fn steal_half(&self, min_batch: usize) -> Option<Vec<Node>> {
        let mut inner = self.inner.lock();
        let size = inner.size();
        if size < 2 * min_batch {
            return None;
        }
        let half = size / 2;
        let split_at = inner.elements.len() - half;
        Some(inner.elements.split_off(split_at))
    }

    /// Best-effort steal: gives up immediately (returning `None`) instead of
    /// blocking if the pool's lock is currently held, mirroring the bounded
    /// CAS-retry behavior of the original lock.
    pub fn try_steal_half(&self, min_batch: usize) -> Option<Vec<Node>> {
        let mut guard = self.inner.try_lock()?;
        let size = guard.size();
        if size < 2 * min_batch {
            return None;
        }
        let half = size / 2;
        let split_at = guard.elements.len() - half;
        Some(guard.elements.split_off(split_at))
    }
}

#[cfg(test)]
mod test_pool {
    use super::*;

    fn node(tag: i32) -> Node {
        let mut n = Node::root(1);
        n.limit1 = tag;
        n
    }

    #[test]
    fn pop_back_is_lifo_without_stealing() {
        let pool = Pool::new();
        pool.push_back(node(1));
        pool.push_back(node(2));
        pool.push_back(node(3));
        assert_eq!(pool.pop_back().unwrap().limit1, 3);
        assert_eq!(pool.pop_back().unwrap().limit1, 2);
        assert_eq!(pool.pop_back().unwrap().limit1, 1);
        assert!(pool.pop_back().is_none());
    }

    #[test]
    fn pop_front_is_fifo() {
        let pool = Pool::new();
        pool.push_back(node(1));
        pool.push_back(node(2));
        pool.push_back(node(3));
        assert_eq!(pool.pop_front().unwrap().limit1, 1);
        assert_eq!(pool.pop_front().unwrap().limit1, 2);
        assert_eq!(pool.pop_front().unwrap().limit1, 3);
        assert!(pool.pop_front().is_none());
    }

    #[test]
    fn pop_back_bulk_fails_below_minimum() {
        let pool = Pool::new();
        for i in 0..5 {
            pool.push_back(node(i));
        }
        assert!(pool.pop_back_bulk(10, 50).is_none());
        assert_eq!(pool.size(), 5);
    }

    #[test]
    fn pop_back_bulk_caps_at_maximum() {
        let pool = Pool::new();
        for i in 0..100 {
            pool.push_back(node(i));
        }
        let batch = pool.pop_back_bulk(1, 30).unwrap();
        assert_eq!(batch.len(), 30);
        assert_eq!(pool.size(), 70);
    }

    #[test]
    fn steal_half_fails_below_twice_minimum() {
        let pool = Pool::new();
        for i in 0..3 {
            pool.push_back(node(i));
        }
        assert!(pool.steal_half(2).is_none());
        assert_eq!(pool.size(), 3);
    }

    #[test]
    fn steal_half_takes_exactly_half() {
        let pool = Pool::new();
        for i in 0..10 {
            pool.push_back(node(i));
        }
        let stolen = pool.steal_half(1).unwrap();
        assert_eq!(stolen.len(), 5);
        assert_eq!(pool.size(), 5);
    }

    #[test]
    fn push_back_bulk_appends_all() {
        let pool = Pool::new();
        pool.push_back(node(0));
        pool.push_back_bulk(vec![node(1), node(2), node(3)]);
        assert_eq!(pool.size(), 4);
    }

    #[test]
    fn concurrent_steal_and_push_do_not_lose_or_duplicate_nodes() {
        use std::sync::Arc;

        let pool = Arc::new(Pool::new());
        for i in 0..2000 {
            pool.push_back(node(i));
        }
        let thief_pool = Arc::clone(&pool);
        let stolen_count = std::thread::scope(|scope| {
            let handle = scope.spawn(move || {
                let mut total = 0;
                while let Some(batch) = thief_pool.try_steal_half(1) {
                    total += batch.len();
                    if thief_pool.size() < 2 {
                        break;
                    }
                }
                total
            });
            let mut owner_popped = 0;
            while pool.pop_back().is_some() {
                owner_popped += 1;
            }
            let stolen = handle.join().unwrap();
            owner_popped + stolen
        });
        assert_eq!(stolen_count, 2000);
        assert_eq!(pool.size(), 0);
    }
}
