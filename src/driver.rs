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

//! The three-phase driver: CPU BFS seed, accelerator DFS with work
//! stealing, CPU DFS drain — wired to whichever `AcceleratorBackend` and
//! `Collective` implementation the caller supplies.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::accelerator::AcceleratorBackend;
use crate::bound::{BoundKind, Lb1Data, Lb2Data};
use crate::collective::Collective;
use crate::decompose::{self, Stats};
use crate::instance::TaillardInstance;
use crate::node::Node;
use crate::pool::Pool;
use crate::scheduler::{self, SchedulerConfig};

pub struct SolveConfig {
    pub which_bound: BoundKind,
    pub min_batch: usize,
    pub max_batch: usize,
    /// Accelerators (workers) local to this process.
    pub accelerators: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct SolveReport {
    pub best: i32,
    pub explored_tree: u64,
    pub explored_sol: u64,
    pub elapsed_secs: f64,
}

/// Run the full three-phase search for `instance`, starting from
/// `initial_best` (`i32::MAX` if `--ub 0`, the known optimum if `--ub 1`).
/// `collective` determines `P`; on every rank but 0 the result returned is
/// only meaningful after phase 2's reduction (phase 3 runs on rank 0 alone,
/// so non-root ranks report the reduced, pre-phase-3 totals).
pub fn solve<B: AcceleratorBackend, C: Collective>(
    instance: &TaillardInstance,
    config: &SolveConfig,
    backend: &B,
    collective: &C,
    initial_best: i32,
) -> SolveReport {
    let start = Instant::now();
    let topo = collective.topology();
    let jobs = instance.jobs;

    let lb1 = Arc::new(Lb1Data::new(jobs, instance.machines, instance.p_times.clone()));
    let lb2 = Arc::new(Lb2Data::new(&lb1));

    // Phase 1: every rank seeds redundantly with the same deterministic BFS.
    let threshold = topo.size * config.accelerators * config.min_batch;
    let mut best = initial_best;
    let mut stats = Stats::default();
    let seed_pool = Pool::new();
    seed_pool.push_back(Node::root(jobs));

    while seed_pool.size() < threshold {
        match seed_pool.pop_front() {
            Some(parent) => decompose::decompose(
                jobs,
                config.which_bound,
                &lb1,
                &lb2,
                parent,
                &mut best,
                &mut stats,
                &seed_pool,
            ),
            None => break,
        }
    }
    debug!(pool_size = seed_pool.size(), "phase 1 complete");

    // Phase 2: only if phase 1 left anything to explore.
    let mut residual: Vec<Node> = Vec::new();
    let mut seed_drained = Vec::new();
    while let Some(n) = seed_pool.pop_back() {
        seed_drained.push(n);
    }
    let my_seed = topo.partition(&seed_drained);

    if !my_seed.is_empty() {
        let sched_config = SchedulerConfig {
            jobs,
            which_bound: config.which_bound,
            min_batch: config.min_batch,
            max_batch: config.max_batch,
        };
        let outcome = scheduler::run_phase2(
            &sched_config,
            backend,
            &lb1,
            &lb2,
            my_seed,
            best,
            config.accelerators.max(1),
        )
        .expect("accelerator batch evaluation failed");
        best = outcome.best;
        stats.explored_tree += outcome.stats.explored_tree;
        stats.explored_sol += outcome.stats.explored_sol;
        residual = outcome.residual;
    }

    // End-of-phase-2 collectives.
    let sizes = collective.gather_sizes(residual.len());
    let gathered = collective.gather_nodes(&residual);
    let (tree_sum, sol_sum) = collective.sum_reduce(stats.explored_tree, stats.explored_sol);
    let reduced_best = collective.min_reduce(best);
    debug!(?sizes, "phase 2 collectives complete");

    best = reduced_best;
    stats = Stats {
        explored_tree: tree_sum,
        explored_sol: sol_sum,
    };

    // Phase 3: CPU DFS drain, rank 0 only.
    if topo.is_root() {
        let drain_pool = Pool::with_seed(gathered);
        while let Some(parent) = drain_pool.pop_back() {
            decompose::decompose(
                jobs,
                config.which_bound,
                &lb1,
                &lb2,
                parent,
                &mut best,
                &mut stats,
                &drain_pool,
            );
        }
    }

    let elapsed_secs = start.elapsed().as_secs_f64();
    info!(best, explored_tree = stats.explored_tree, explored_sol = stats.explored_sol, "search complete");

    SolveReport {
        best,
        explored_tree: stats.explored_tree,
        explored_sol: stats.explored_sol,
        elapsed_secs,
    }
}

#[cfg(test)]
mod test_driver {
    use super::*;
    use crate::accelerator::CpuBackend;
    use crate::collective::LocalCollective;

    fn toy_instance() -> TaillardInstance {
        TaillardInstance::parse(
            1,
            "dims\n4 2 1 100 90\nprocessing times :\n2 4 3 1\n3 1 2 5\n",
        )
        .unwrap()
    }

    #[test]
    fn single_process_single_worker_proves_an_optimum() {
        let instance = toy_instance();
        let config = SolveConfig {
            which_bound: BoundKind::Lb1,
            min_batch: 1,
            max_batch: 100,
            accelerators: 1,
        };
        let report = solve(&instance, &config, &CpuBackend, &LocalCollective, i32::MAX);
        assert!(report.best < i32::MAX);
        assert!(report.explored_sol >= 1);
    }

    #[test]
    fn answer_is_independent_of_accelerator_count() {
        let instance = toy_instance();
        let config1 = SolveConfig {
            which_bound: BoundKind::Lb1,
            min_batch: 1,
            max_batch: 4,
            accelerators: 1,
        };
        let config4 = SolveConfig {
            which_bound: BoundKind::Lb1,
            min_batch: 1,
            max_batch: 4,
            accelerators: 4,
        };
        let r1 = solve(&instance, &config1, &CpuBackend, &LocalCollective, i32::MAX);
        let r4 = solve(&instance, &config4, &CpuBackend, &LocalCollective, i32::MAX);
        assert_eq!(r1.best, r4.best);
    }

    #[test]
    fn answer_is_independent_of_bound_choice() {
        let instance = toy_instance();
        for bound in [BoundKind::Lb1, BoundKind::Lb1Children, BoundKind::Lb2] {
            let config = SolveConfig {
                which_bound: bound,
                min_batch: 1,
                max_batch: 4,
                accelerators: 2,
            };
            let report = solve(&instance, &config, &CpuBackend, &LocalCollective, i32::MAX);
            assert!(report.best <= instance.best_known_upper_bound.max(report.best));
        }
    }

    #[test]
    fn known_upper_bound_seed_never_makes_the_answer_worse() {
        let instance = toy_instance();
        let config = SolveConfig {
            which_bound: BoundKind::Lb1,
            min_batch: 1,
            max_batch: 4,
            accelerators: 1,
        };
        let from_inf = solve(&instance, &config, &CpuBackend, &LocalCollective, i32::MAX);
        let from_ub = solve(
            &instance,
            &config,
            &CpuBackend,
            &LocalCollective,
            instance.best_known_upper_bound,
        );
        assert_eq!(from_inf.best, from_ub.best);
    }
}
