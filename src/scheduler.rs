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

//! Per-process worker-pool scheduler: one worker per accelerator, a shared
//! array of per-worker pools, and randomized work stealing with idle
//! detection. This is phase 2 of the driver (`driver.rs`): accelerator DFS.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::accelerator::AcceleratorBackend;
use crate::bound::{BoundKind, Lb1Data, Lb2Data};
use crate::collective::RankTopology;
use crate::decompose::Stats;
use crate::error::BbResult;
use crate::node::Node;
use crate::pool::Pool;

/// Bounded retry budget per victim before giving up on it this sweep,
/// matching the original's 10-try CAS loop.
const STEAL_RETRIES: usize = 10;

/// Result of running phase 2 to completion on this process.
pub struct Phase2Outcome {
    pub best: i32,
    pub stats: Stats,
    /// Whatever each worker's pool still holds when every worker went idle.
    /// Phase 2 never runs a pool fully dry by design (workers go idle the
    /// moment stealing stops paying off), so this is usually empty but is
    /// not guaranteed to be.
    pub residual: Vec<Node>,
}

struct WorkerSlot {
    pool: Pool,
    idle: AtomicBool,
}

/// Parameters shared by every worker in a phase-2 run.
pub struct SchedulerConfig {
    pub jobs: usize,
    pub which_bound: BoundKind,
    pub min_batch: usize,
    pub max_batch: usize,
}

/// Run phase 2 with `workers` accelerators, seeding worker `g` with
/// `seed[g + i * workers]` for `i` in `0..seed.len()/workers` (the tail
/// remainder goes to the last worker), exactly as the per-process
/// partitioning in the distributed coordinator does for ranks.
pub fn run_phase2<B: AcceleratorBackend>(
    config: &SchedulerConfig,
    backend: &B,
    lb1: &Arc<Lb1Data>,
    lb2: &Arc<Lb2Data>,
    seed: Vec<Node>,
    initial_best: i32,
    workers: usize,
) -> BbResult<Phase2Outcome> {
    let mirror = backend.upload(lb1, lb2)?;

    let slots: Vec<WorkerSlot> = (0..workers)
        .map(|_| WorkerSlot {
            pool: Pool::new(),
            idle: AtomicBool::new(false),
        })
        .collect();
    partition_round_robin(&slots, seed, workers);

    let all_idle = AtomicBool::new(false);
    let global_best = AtomicI32::new(initial_best);
    let per_worker_stats: Vec<Mutex<Stats>> = (0..workers).map(|_| Mutex::new(Stats::default())).collect();

    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for g in 0..workers {
            let slots = &slots;
            let mirror = &mirror;
            let all_idle = &all_idle;
            let global_best = &global_best;
            let per_worker_stats = &per_worker_stats;
            handles.push(scope.spawn(move || {
                worker_loop(
                    config, backend, mirror, slots, g, workers, all_idle, global_best,
                    &per_worker_stats[g],
                )
            }));
        }
        for h in handles {
            h.join().expect("worker thread panicked");
        }
    });

    let mut total = Stats::default();
    for s in &per_worker_stats {
        let s = s.lock();
        total.explored_tree += s.explored_tree;
        total.explored_sol += s.explored_sol;
    }

    let mut residual = Vec::new();
    for slot in &slots {
        while let Some(n) = slot.pool.pop_back() {
            residual.push(n);
        }
    }

    Ok(Phase2Outcome {
        best: global_best.load(Ordering::Acquire),
        stats: total,
        residual,
    })
}

fn partition_round_robin(slots: &[WorkerSlot], seed: Vec<Node>, workers: usize) {
    for g in 0..workers {
        let topo = RankTopology { rank: g, size: workers };
        slots[g].pool.push_back_bulk(topo.partition(&seed));
    }
}

#[allow(clippy::too_many_arguments)]
fn worker_loop<B: AcceleratorBackend>(
    config: &SchedulerConfig,
    backend: &B,
    mirror: &B::Mirror,
    slots: &[WorkerSlot],
    me: usize,
    workers: usize,
    all_idle: &AtomicBool,
    global_best: &AtomicI32,
    my_stats: &Mutex<Stats>,
) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(me as u64 ^ 0x9E3779B97F4A7C15);
    let mut best_l = global_best.load(Ordering::Acquire);
    let mut bounds_buf: Vec<i32> = Vec::new();

    'outer: loop {
        match slots[me].pool.pop_back_bulk(config.min_batch, config.max_batch) {
            Some(batch) => {
                process_batch(
                    config, backend, mirror, &batch, &mut best_l, my_stats, &slots[me].pool,
                    &mut bounds_buf,
                );
                continue 'outer;
            }
            None => {
                if try_steal(slots, me, workers, config.min_batch, &mut rng) {
                    slots[me].idle.store(false, Ordering::Release);
                    continue 'outer;
                }
                slots[me].idle.store(true, Ordering::Release);
                if everyone_idle(slots) {
                    all_idle.store(true, Ordering::Release);
                    break 'outer;
                }
            }
        }
    }

    // fold the thread-local incumbent back into the shared best with a
    // lock-free min: only ever move it down.
    let mut current = global_best.load(Ordering::Acquire);
    while best_l < current {
        match global_best.compare_exchange_weak(
            current,
            best_l,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => break,
            Err(observed) => current = observed,
        }
    }
}

fn try_steal(
    slots: &[WorkerSlot],
    me: usize,
    workers: usize,
    min_batch: usize,
    rng: &mut Xoshiro256PlusPlus,
) -> bool {
    let mut victims: Vec<usize> = (0..workers).filter(|&g| g != me).collect();
    victims.shuffle(rng);

    for victim in victims {
        for _ in 0..STEAL_RETRIES {
            if let Some(batch) = slots[victim].pool.try_steal_half(min_batch) {
                if batch.is_empty() {
                    // DEADCODE under the locking discipline: steal_half
                    // never returns an empty, non-None batch.
                    continue;
                }
                slots[me].pool.push_back_bulk(batch);
                return true;
            }
        }
    }
    false
}

fn everyone_idle(slots: &[WorkerSlot]) -> bool {
    slots.iter().all(|s| s.idle.load(Ordering::Acquire))
}

#[allow(clippy::too_many_arguments)]
fn process_batch<B: AcceleratorBackend>(
    config: &SchedulerConfig,
    backend: &B,
    mirror: &B::Mirror,
    parents: &[Node],
    best_l: &mut i32,
    stats: &Mutex<Stats>,
    pool: &Pool,
    bounds_buf: &mut Vec<i32>,
) {
    let jobs = config.jobs;
    bounds_buf.clear();
    bounds_buf.resize(jobs * parents.len(), i32::MAX);

    backend
        .evaluate_batch(jobs, config.which_bound, mirror, *best_l, parents, bounds_buf)
        .expect("accelerator batch evaluation failed");

    let mut local_stats = Stats::default();
    for (p_idx, parent) in parents.iter().enumerate() {
        let row = &bounds_buf[p_idx * jobs..(p_idx + 1) * jobs];
        for (i, _) in parent.children(jobs) {
            let job = parent.prmu[i] as usize;
            let bound = row[job];
            let child = parent.child_swapping(i, jobs);
            if child.is_leaf(jobs) {
                local_stats.explored_sol += 1;
                if bound < *best_l {
                    *best_l = bound;
                }
            } else if bound < *best_l {
                pool.push_back(child);
                local_stats.explored_tree += 1;
            }
        }
    }

    let mut s = stats.lock();
    s.explored_tree += local_stats.explored_tree;
    s.explored_sol += local_stats.explored_sol;
}

#[cfg(test)]
mod test_scheduler {
    use super::*;
    use crate::accelerator::CpuBackend;

    fn toy() -> (Arc<Lb1Data>, Arc<Lb2Data>) {
        let lb1 = Arc::new(Lb1Data::new(4, 2, vec![2, 4, 3, 1, 3, 1, 2, 5]));
        let lb2 = Arc::new(Lb2Data::new(&lb1));
        (lb1, lb2)
    }

    #[test]
    fn single_worker_drains_its_seed_to_idle() {
        let (lb1, lb2) = toy();
        let config = SchedulerConfig {
            jobs: 4,
            which_bound: BoundKind::Lb1,
            min_batch: 1,
            max_batch: 100,
        };
        let seed = vec![Node::root(4)];
        let outcome =
            run_phase2(&config, &CpuBackend, &lb1, &lb2, seed, i32::MAX, 1).unwrap();
        assert!(outcome.stats.explored_tree + outcome.stats.explored_sol > 0);
        assert!(outcome.best < i32::MAX);
    }

    #[test]
    fn four_workers_with_stealing_agree_with_one_worker_on_best() {
        let (lb1, lb2) = toy();
        let config = SchedulerConfig {
            jobs: 4,
            which_bound: BoundKind::Lb1,
            min_batch: 1,
            max_batch: 4,
        };

        let seed_for_one = vec![Node::root(4)];
        let single = run_phase2(&config, &CpuBackend, &lb1, &lb2, seed_for_one, i32::MAX, 1).unwrap();

        let seed_for_four: Vec<Node> = Node::root(4).children(4).map(|(_, c)| c).collect();
        let four = run_phase2(&config, &CpuBackend, &lb1, &lb2, seed_for_four, i32::MAX, 4).unwrap();

        assert_eq!(single.best, four.best);
    }

    #[test]
    fn empty_seed_leaves_every_worker_idle_immediately() {
        let (lb1, lb2) = toy();
        let config = SchedulerConfig {
            jobs: 4,
            which_bound: BoundKind::Lb1,
            min_batch: 1,
            max_batch: 4,
        };
        let outcome = run_phase2(&config, &CpuBackend, &lb1, &lb2, vec![], 100, 3).unwrap();
        assert_eq!(outcome.best, 100);
        assert_eq!(outcome.stats.explored_tree, 0);
    }
}
