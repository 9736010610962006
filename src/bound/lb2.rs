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

//! The two-machine (Johnson) relaxation bound ("lb2"). Strictly tighter than
//! `lb1`: for every ordered pair of machines `(a, b)` we relax the problem to
//! a two-machine flow shop by collapsing everything before `a` and after `b`
//! into a single extra operation, solve that two-machine instance optimally
//! with Johnson's rule, and take the best (loosest, cheapest to fix) pair the
//! rule gives us. We keep examining pairs only while they might still beat
//! the running incumbent, which is what lets the caller pass `best` in as an
//! early-exit cutoff.

use super::lb1::Lb1Data;

#[derive(Debug, Clone)]
pub struct Lb2Data {
    machines: usize,
    /// Every ordered pair of distinct machines, examined in `machine_pair_order`.
    pub machine_pairs_1: Vec<usize>,
    pub machine_pairs_2: Vec<usize>,
    /// Order in which to examine `(machine_pairs_1[i], machine_pairs_2[i])`,
    /// most discriminating pairs first so the `best` cutoff bites early.
    pub machine_pair_order: Vec<usize>,
    /// `lags[pair][job]`: contribution of machines strictly between `a` and
    /// `b` that job `job` must also pay for, for the pair at that index.
    pub lags: Vec<Vec<i32>>,
    /// Johnson schedule is produced on the fly per node (it depends on which
    /// jobs are still unscheduled), so no "precomputed schedule" table is
    /// kept here beyond the pair metadata above.
}

impl Lb2Data {
    pub fn new(lb1: &Lb1Data) -> Self {
        let machines = lb1.machines;
        let mut pairs_1 = Vec::new();
        let mut pairs_2 = Vec::new();
        for a in 0..machines {
            for b in (a + 1)..machines {
                pairs_1.push(a);
                pairs_2.push(b);
            }
        }
        let npairs = pairs_1.len();

        let mut lags = vec![Vec::new(); npairs];
        for (idx, (&a, &b)) in pairs_1.iter().zip(pairs_2.iter()).enumerate() {
            let mut lag = vec![0i32; lb1.jobs];
            for job in 0..lb1.jobs {
                let mut sum = 0;
                for m in (a + 1)..b {
                    sum += lb1.p_times[m * lb1.jobs + job];
                }
                lag[job] = sum;
            }
            lags[idx] = lag;
        }

        // widest machine spans are the most informative; examine those first.
        let mut order: Vec<usize> = (0..npairs).collect();
        order.sort_by_key(|&idx| std::cmp::Reverse(pairs_2[idx] - pairs_1[idx]));

        Lb2Data {
            machines,
            machine_pairs_1: pairs_1,
            machine_pairs_2: pairs_2,
            machine_pair_order: order,
            lags,
        }
    }

    /// Johnson's rule applied to the unscheduled jobs for machine pair
    /// `(a, b)`, returning the two-machine makespan of that relaxed
    /// sub-problem given the two machines' ready times `ready_a`/`ready_b`
    /// and per-job lag `lag[job]`.
    fn johnson_makespan(
        lb1: &Lb1Data,
        unscheduled: &[i32],
        a: usize,
        b: usize,
        lag: &[i32],
        ready_a: i32,
        ready_b: i32,
    ) -> i32 {
        let mut front: Vec<i32> = Vec::new();
        let mut back: Vec<i32> = Vec::new();
        for &job in unscheduled {
            let pa = lb1.p_times[a * lb1.jobs + job as usize];
            let pb = lb1.p_times[b * lb1.jobs + job as usize] + lag[job as usize];
            if pa <= pb {
                front.push(job);
            } else {
                back.push(job);
            }
        }
        front.sort_by_key(|&job| lb1.p_times[a * lb1.jobs + job as usize]);
        back.sort_by_key(|&job| std::cmp::Reverse(lb1.p_times[b * lb1.jobs + job as usize]));

        let mut t_a = ready_a;
        let mut t_b = ready_b;
        for job in front.into_iter().chain(back) {
            let pa = lb1.p_times[a * lb1.jobs + job as usize];
            let pb = lb1.p_times[b * lb1.jobs + job as usize] + lag[job as usize];
            t_a += pa;
            t_b = t_a.max(t_b) + pb;
        }
        t_b
    }

    /// lb2 for a node, honoring `best` as an early cutoff: once a machine
    /// pair's bound already reaches or exceeds `best`, we can return
    /// immediately since no further relaxation can make the node feasible.
    pub fn bound(&self, lb1: &Lb1Data, prmu: &[i32], limit1: i32, jobs: usize, best: i32) -> i32 {
        let tail_start = (limit1 + 1) as usize;
        let unscheduled = &prmu[tail_start..jobs];

        // completion times of the fixed prefix on every machine, reused as
        // the ready time for each pair's leading machine.
        let mut completion = vec![0i32; self.machines];
        let mut row = vec![0i32; self.machines];
        for i in 0..=limit1 {
            let job = prmu[i as usize] as usize;
            for k in 0..self.machines {
                let from_prev_machine = if k == 0 { 0 } else { row[k - 1] };
                let from_prev_job = completion[k];
                row[k] = from_prev_machine.max(from_prev_job) + lb1.p_times[k * lb1.jobs + job];
            }
            completion.copy_from_slice(&row);
        }

        let mut overall = 0;
        for &idx in &self.machine_pair_order {
            let a = self.machine_pairs_1[idx];
            let b = self.machine_pairs_2[idx];
            let ready_a = completion[a];
            let ready_b = completion[b];
            let tail = lb1.min_tails[b];
            let makespan =
                Self::johnson_makespan(lb1, unscheduled, a, b, &self.lags[idx], ready_a, ready_b);
            let candidate = makespan + tail;
            overall = overall.max(candidate);
            if overall >= best {
                return overall;
            }
        }
        overall
    }
}

#[cfg(test)]
mod test_lb2 {
    use super::*;
    use crate::bound::lb1::Lb1Data;

    fn toy() -> (Lb1Data, Lb2Data) {
        let lb1 = Lb1Data::new(3, 3, vec![2, 4, 3, 3, 1, 2, 1, 5, 4]);
        let lb2 = Lb2Data::new(&lb1);
        (lb1, lb2)
    }

    #[test]
    fn lb2_is_at_least_as_tight_as_lb1() {
        let (lb1, lb2) = toy();
        let prmu = [0, 1, 2];
        let b1 = lb1.bound(&prmu, -1, 3);
        let b2 = lb2.bound(&lb1, &prmu, -1, 3, i32::MAX);
        assert!(b2 >= b1);
    }

    #[test]
    fn cutoff_short_circuits_without_panicking() {
        let (lb1, lb2) = toy();
        let prmu = [0, 1, 2];
        let b = lb2.bound(&lb1, &prmu, -1, 3, 0);
        assert!(b >= 0);
    }

    #[test]
    fn pair_order_covers_every_pair_exactly_once() {
        let (_lb1, lb2) = toy();
        let mut seen: Vec<usize> = lb2.machine_pair_order.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..lb2.machine_pairs_1.len()).collect::<Vec<_>>());
    }
}
