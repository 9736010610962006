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

//! The distributed coordinator's collective contract. No MPI binding is
//! fabricated here: `Collective` fixes exactly the four operations phase 2's
//! end-of-phase reduction needs (gather sizes, gather-v node payloads,
//! sum-reduce two counters, min-reduce one best), and `LocalCollective`
//! satisfies it for the single-process (`P = 1`) case so the rest of the
//! driver can be written and tested without a real transport. A real
//! multi-process deployment implements this trait against whatever
//! transport it has (sockets, an actual MPI binding, ...).

use crate::node::Node;

/// Addressing info for one process in a `P`-process run.
#[derive(Debug, Clone, Copy)]
pub struct RankTopology {
    pub rank: usize,
    pub size: usize,
}

impl RankTopology {
    pub fn single() -> Self {
        RankTopology { rank: 0, size: 1 }
    }

    pub fn is_root(&self) -> bool {
        self.rank == 0
    }

    /// Seed-partitioning rule shared by phase-2 (process-level) and the
    /// worker scheduler (accelerator-level): process `r` of `size` gets
    /// indices `r, r+size, r+2*size, ...`; the last process additionally
    /// absorbs whatever remainder doesn't divide evenly (the tail past
    /// `chunk * size`).
    pub fn partition<T: Clone>(&self, seed: &[T]) -> Vec<T> {
        let chunk = seed.len() / self.size;
        let mut out: Vec<T> = (0..chunk).map(|i| seed[self.rank + i * self.size].clone()).collect();
        if self.rank + 1 == self.size {
            out.extend_from_slice(&seed[chunk * self.size..]);
        }
        out
    }
}

/// Collective operations used once, at the end of phase 2.
pub trait Collective {
    fn topology(&self) -> RankTopology;

    /// Gather each rank's local pool size onto rank 0. Every rank must
    /// call this; only rank 0's return value is meaningful.
    fn gather_sizes(&self, local_size: usize) -> Vec<usize>;

    /// Gather each rank's residual pool elements onto rank 0, in rank
    /// order. Only rank 0's return value is meaningful.
    fn gather_nodes(&self, local: &[Node]) -> Vec<Node>;

    /// Sum-reduce two `u64` counters (explored_tree, explored_sol) across
    /// every rank, returning the totals on every rank.
    fn sum_reduce(&self, tree: u64, sol: u64) -> (u64, u64);

    /// Min-reduce `best` across every rank, returning the minimum on every
    /// rank.
    fn min_reduce(&self, best: i32) -> i32;
}

/// Single-process stand-in: every collective is a no-op identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalCollective;

impl Collective for LocalCollective {
    fn topology(&self) -> RankTopology {
        RankTopology::single()
    }

    fn gather_sizes(&self, local_size: usize) -> Vec<usize> {
        vec![local_size]
    }

    fn gather_nodes(&self, local: &[Node]) -> Vec<Node> {
        local.to_vec()
    }

    fn sum_reduce(&self, tree: u64, sol: u64) -> (u64, u64) {
        (tree, sol)
    }

    fn min_reduce(&self, best: i32) -> i32 {
        best
    }
}

#[cfg(test)]
mod test_collective {
    use super::*;

    #[test]
    fn partition_is_exact_and_covers_every_seed_once() {
        let seed: Vec<i32> = (0..17).collect();
        let size = 4;
        let mut reassembled = Vec::new();
        for rank in 0..size {
            let topo = RankTopology { rank, size };
            reassembled.extend(topo.partition(&seed));
        }
        reassembled.sort_unstable();
        assert_eq!(reassembled, seed);
    }

    #[test]
    fn last_rank_absorbs_the_remainder() {
        let seed: Vec<i32> = (0..10).collect();
        let topo = RankTopology { rank: 2, size: 3 };
        // 10 / 3 = 3 per rank, interleaved indices 2,5,8 plus the tail index 9
        assert_eq!(topo.partition(&seed), vec![2, 5, 8, 9]);
    }

    #[test]
    fn non_last_ranks_get_only_interleaved_indices() {
        let seed: Vec<i32> = (0..10).collect();
        let topo = RankTopology { rank: 0, size: 3 };
        assert_eq!(topo.partition(&seed), vec![0, 3, 6]);
    }

    #[test]
    fn local_collective_is_the_identity() {
        let local = LocalCollective;
        assert_eq!(local.topology().size, 1);
        assert_eq!(local.gather_sizes(7), vec![7]);
        assert_eq!(local.sum_reduce(3, 5), (3, 5));
        assert_eq!(local.min_reduce(42), 42);
    }
}
