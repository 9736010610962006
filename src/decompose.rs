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

//! The decomposer: applies the selected bound to every child of a node,
//! pruning infeasible children and either queuing the survivors or
//! recording a new incumbent when they happen to be complete schedules.

use crate::bound::{BoundKind, Lb1Data, Lb2Data};
use crate::node::Node;
use crate::pool::Pool;

/// Running totals a worker keeps while decomposing nodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    pub explored_tree: u64,
    pub explored_sol: u64,
}

/// Decompose `parent` using `which_bound`, pushing surviving children into
/// `pool` and folding leaves into `best` (kept strictly less-than: a bound
/// equal to the incumbent does not improve it and is pruned like any other
/// non-improving node).
pub fn decompose(
    jobs: usize,
    which_bound: BoundKind,
    lb1: &Lb1Data,
    lb2: &Lb2Data,
    parent: Node,
    best: &mut i32,
    stats: &mut Stats,
    pool: &Pool,
) {
    match which_bound {
        BoundKind::Lb1 => decompose_lb1(jobs, lb1, parent, best, stats, pool),
        BoundKind::Lb1Children => decompose_lb1_children(jobs, lb1, parent, best, stats, pool),
        BoundKind::Lb2 => decompose_lb2(jobs, lb1, lb2, parent, best, stats, pool),
    }
}

fn decompose_lb1(
    jobs: usize,
    lb1: &Lb1Data,
    parent: Node,
    best: &mut i32,
    stats: &mut Stats,
    pool: &Pool,
) {
    for (_, child) in parent.children(jobs) {
        let bound = lb1.bound(child.prmu(jobs), child.limit1, jobs);
        accept(jobs, child, bound, best, stats, pool);
    }
}

fn decompose_lb1_children(
    jobs: usize,
    lb1: &Lb1Data,
    parent: Node,
    best: &mut i32,
    stats: &mut Stats,
    pool: &Pool,
) {
    let mut bounds = vec![0i32; jobs];
    lb1.children_bounds(parent.prmu(jobs), parent.limit1, jobs, &mut bounds);

    for (i, _) in parent.children(jobs) {
        let job = parent.prmu[i];
        let bound = bounds[job as usize];
        let child = parent.child_swapping(i, jobs);
        accept(jobs, child, bound, best, stats, pool);
    }
}

fn decompose_lb2(
    jobs: usize,
    lb1: &Lb1Data,
    lb2: &Lb2Data,
    parent: Node,
    best: &mut i32,
    stats: &mut Stats,
    pool: &Pool,
) {
    for (_, child) in parent.children(jobs) {
        let bound = lb2.bound(lb1, child.prmu(jobs), child.limit1, jobs, *best);
        accept(jobs, child, bound, best, stats, pool);
    }
}

#[inline]
fn accept(jobs: usize, child: Node, bound: i32, best: &mut i32, stats: &mut Stats, pool: &Pool) {
    if child.is_leaf(jobs) {
        stats.explored_sol += 1;
        if bound < *best {
            *best = bound;
        }
    } else if bound < *best {
        pool.push_back(child);
        stats.explored_tree += 1;
    }
}

#[cfg(test)]
mod test_decompose {
    use super::*;

    fn toy() -> (Lb1Data, Lb2Data) {
        let lb1 = Lb1Data::new(4, 2, vec![2, 4, 3, 1, 3, 1, 2, 5]);
        let lb2 = Lb2Data::new(&lb1);
        (lb1, lb2)
    }

    #[test]
    fn root_decompose_produces_one_child_per_job() {
        let (lb1, lb2) = toy();
        let pool = Pool::new();
        let mut best = i32::MAX;
        let mut stats = Stats::default();
        decompose(
            4,
            BoundKind::Lb1,
            &lb1,
            &lb2,
            Node::root(4),
            &mut best,
            &mut stats,
            &pool,
        );
        assert_eq!(stats.explored_tree, 4);
        assert_eq!(pool.size(), 4);
    }

    #[test]
    fn lb1_and_lb1_children_agree_on_survivors() {
        let (lb1, lb2) = toy();
        let pool_a = Pool::new();
        let pool_b = Pool::new();
        let mut best_a = i32::MAX;
        let mut best_b = i32::MAX;
        let mut stats_a = Stats::default();
        let mut stats_b = Stats::default();

        decompose(
            4,
            BoundKind::Lb1,
            &lb1,
            &lb2,
            Node::root(4),
            &mut best_a,
            &mut stats_a,
            &pool_a,
        );
        decompose(
            4,
            BoundKind::Lb1Children,
            &lb1,
            &lb2,
            Node::root(4),
            &mut best_b,
            &mut stats_b,
            &pool_b,
        );

        assert_eq!(stats_a.explored_tree, stats_b.explored_tree);
        assert_eq!(pool_a.size(), pool_b.size());
    }

    #[test]
    fn leaves_update_incumbent_instead_of_queuing() {
        let (lb1, lb2) = toy();
        let pool = Pool::new();
        let mut best = i32::MAX;
        let mut stats = Stats::default();
        let mut parent = Node::root(4);
        // Drive to depth jobs-1 so every child is a leaf.
        for i in 1..4 {
            parent = parent.child_swapping(i, 4);
        }
        decompose(
            4,
            BoundKind::Lb1,
            &lb1,
            &lb2,
            parent,
            &mut best,
            &mut stats,
            &pool,
        );
        assert_eq!(stats.explored_sol, 1);
        assert_eq!(stats.explored_tree, 0);
        assert!(pool.is_empty());
        assert!(best < i32::MAX);
    }
}
