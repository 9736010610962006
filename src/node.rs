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

//! Search-tree node and the forward branching rule.

/// Largest instance size the wire format (and the fixed-size permutation
/// buffer) supports. Matches the historical `MAX_JOBS` of the baseline this
/// solver descends from.
pub const MAX_JOBS: usize = 20;

/// A node of the branch-and-bound tree: a partial permutation of jobs.
///
/// `prmu[0..=limit1]` are the jobs fixed (in schedule order) at the front of
/// the permutation; `prmu[limit1+1..]` is the set of jobs not yet placed.
/// `depth` always equals `limit1 + 1`; it is kept as a separate field because
/// that is how the collaborating bound routines expect to receive it, and
/// because it reads naturally as "number of jobs fixed so far".
///
/// `#[repr(C)]` so the struct can be transmitted byte-for-byte by a
/// collective transport without going through a serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Node {
    pub depth: u8,
    pub limit1: i32,
    pub prmu: [i32; MAX_JOBS],
}

impl Node {
    /// The root of the search tree for an instance of `jobs` jobs: no job is
    /// fixed yet, and the permutation is the identity.
    pub fn root(jobs: usize) -> Self {
        debug_assert!(jobs <= MAX_JOBS);
        let mut prmu = [0i32; MAX_JOBS];
        for (i, slot) in prmu.iter_mut().enumerate().take(jobs) {
            *slot = i as i32;
        }
        Node {
            depth: 0,
            limit1: -1,
            prmu,
        }
    }

    /// `true` once every job has been fixed: this node represents a complete
    /// schedule rather than a branch to explore further.
    pub fn is_leaf(&self, jobs: usize) -> bool {
        self.depth as usize == jobs
    }

    /// The permutation prefix/suffix actually in use, given `jobs`.
    pub fn prmu(&self, jobs: usize) -> &[i32] {
        &self.prmu[..jobs]
    }

    /// Produce the child obtained by fixing job `self.prmu[i]` at position
    /// `limit1 + 1` (`i` ranges over `(limit1, jobs)`).
    pub fn child_swapping(&self, i: usize, jobs: usize) -> Node {
        debug_assert!(i > self.limit1 as usize && i < jobs);
        let mut child = *self;
        child.prmu[..jobs].swap((self.limit1 + 1) as usize, i);
        child.depth = self.depth + 1;
        child.limit1 = self.limit1 + 1;
        child
    }

    /// Enumerate the `(tail_index, child)` pairs obtainable from this node
    /// by forward branching, without consulting any bound.
    pub fn children(&self, jobs: usize) -> impl Iterator<Item = (usize, Node)> + '_ {
        let start = (self.limit1 + 1) as usize;
        (start..jobs).map(move |i| (i, self.child_swapping(i, jobs)))
    }
}

#[cfg(test)]
mod test_node {
    use super::*;

    #[test]
    fn root_has_identity_permutation_and_no_fixed_job() {
        let root = Node::root(5);
        assert_eq!(root.depth, 0);
        assert_eq!(root.limit1, -1);
        assert_eq!(root.prmu(5), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn child_swapping_fixes_one_more_job() {
        let root = Node::root(4);
        let child = root.child_swapping(2, 4);
        assert_eq!(child.depth, 1);
        assert_eq!(child.limit1, 0);
        // position 0 and 2 were swapped
        assert_eq!(child.prmu(4), &[2, 1, 0, 3]);
    }

    #[test]
    fn children_cover_every_unfixed_position() {
        let root = Node::root(4);
        let kids: Vec<_> = root.children(4).collect();
        assert_eq!(kids.len(), 4);
        for (i, (tail_index, child)) in kids.into_iter().enumerate() {
            assert_eq!(tail_index, i);
            assert_eq!(child.depth, 1);
            assert_eq!(child.limit1, 0);
        }
    }

    #[test]
    fn depth_always_equals_limit1_plus_one() {
        let mut node = Node::root(6);
        for i in 0..6 {
            assert_eq!(node.depth as i32, node.limit1 + 1);
            if i < 5 {
                node = node.child_swapping(i + 1, 6);
            }
        }
        assert!(node.is_leaf(6));
    }

    #[test]
    fn child_permutation_stays_a_permutation() {
        let root = Node::root(5);
        let child = root.child_swapping(3, 5);
        let mut sorted = child.prmu(5).to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }
}
