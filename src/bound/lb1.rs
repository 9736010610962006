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

//! The one-machine relaxation bound ("lb1"): for every machine, the schedule
//! cannot finish before that machine has absorbed the total processing time
//! of every unscheduled job, on top of whatever it already had queued up and
//! whatever minimal tail work remains afterwards.

/// Precomputed, read-only data needed to evaluate `lb1` for a given instance.
/// Built once per run and shared (read-only) by every worker.
#[derive(Debug, Clone)]
pub struct Lb1Data {
    pub jobs: usize,
    pub machines: usize,
    /// Processing times, one row per machine: `p_times[k * jobs + j]` is the
    /// time job `j` spends on machine `k`.
    pub p_times: Vec<i32>,
    /// For each machine, the minimal total processing time any single job
    /// accumulates on the machines preceding it — a constant floor on how
    /// early that machine can ever finish its first unit of work.
    pub min_heads: Vec<i32>,
    /// For each machine, the minimal total processing time any single job
    /// still needs on the machines that follow it.
    pub min_tails: Vec<i32>,
}

impl Lb1Data {
    pub fn new(jobs: usize, machines: usize, p_times: Vec<i32>) -> Self {
        debug_assert_eq!(p_times.len(), jobs * machines);
        let mut data = Lb1Data {
            jobs,
            machines,
            p_times,
            min_heads: vec![0; machines],
            min_tails: vec![0; machines],
        };
        data.fill_min_heads_tails();
        data
    }

    #[inline]
    fn p(&self, machine: usize, job: i32) -> i32 {
        self.p_times[machine * self.jobs + job as usize]
    }

    fn fill_min_heads_tails(&mut self) {
        for k in 0..self.machines {
            let mut min_head = i32::MAX;
            let mut min_tail = i32::MAX;
            for j in 0..self.jobs as i32 {
                let head: i32 = (0..k).map(|k2| self.p(k2, j)).sum();
                let tail: i32 = (k + 1..self.machines).map(|k2| self.p(k2, j)).sum();
                min_head = min_head.min(head);
                min_tail = min_tail.min(tail);
            }
            self.min_heads[k] = if self.jobs == 0 { 0 } else { min_head };
            self.min_tails[k] = if self.jobs == 0 { 0 } else { min_tail };
        }
    }

    /// Completion time of every machine after scheduling the fixed prefix
    /// `prmu[0..=limit1]` (standard flow-shop forward recurrence). Returns
    /// all zeros when `limit1 < 0` (nothing fixed yet).
    fn prefix_completion(&self, prmu: &[i32], limit1: i32) -> Vec<i32> {
        let mut completion = vec![0i32; self.machines];
        let mut row = vec![0i32; self.machines];
        for i in 0..=limit1 {
            let job = prmu[i as usize];
            for k in 0..self.machines {
                let from_prev_machine = if k == 0 { 0 } else { row[k - 1] };
                let from_prev_job = completion[k];
                row[k] = from_prev_machine.max(from_prev_job) + self.p(k, job);
            }
            completion.copy_from_slice(&row);
        }
        completion
    }

    /// The lb1 bound for a node with permutation `prmu` and fixed prefix
    /// `0..=limit1`.
    pub fn bound(&self, prmu: &[i32], limit1: i32, jobs: usize) -> i32 {
        let front = self.prefix_completion(prmu, limit1);
        let mut remaining = vec![0i32; self.machines];
        for &job in &prmu[(limit1 + 1) as usize..jobs] {
            for k in 0..self.machines {
                remaining[k] += self.p(k, job);
            }
        }

        (0..self.machines)
            .map(|k| front[k].max(self.min_heads[k]) + remaining[k] + self.min_tails[k])
            .max()
            .unwrap_or(0)
    }

    /// One bound per candidate tail job, in a single pass: `out[job]` is the
    /// lb1 value of the child obtained by fixing `job` next. Indices outside
    /// the unscheduled set of `prmu[limit1+1..jobs]` are left at `i32::MAX`
    /// as a sentinel (never a feasible candidate).
    pub fn children_bounds(&self, prmu: &[i32], limit1: i32, jobs: usize, out: &mut [i32]) {
        debug_assert!(out.len() >= jobs);
        out[..jobs].fill(i32::MAX);

        let front = self.prefix_completion(prmu, limit1);
        let tail_start = (limit1 + 1) as usize;
        let mut remaining = vec![0i32; self.machines];
        for &job in &prmu[tail_start..jobs] {
            for k in 0..self.machines {
                remaining[k] += self.p(k, job);
            }
        }

        let mut new_row = vec![0i32; self.machines];
        for &job in &prmu[tail_start..jobs] {
            for k in 0..self.machines {
                let from_prev_machine = if k == 0 { 0 } else { new_row[k - 1] };
                let from_prev_job = front[k].max(self.min_heads[k]);
                new_row[k] = from_prev_machine.max(from_prev_job) + self.p(k, job);
            }
            let bound = (0..self.machines)
                .map(|k| {
                    let rest = remaining[k] - self.p(k, job);
                    new_row[k].max(self.min_heads[k]) + rest + self.min_tails[k]
                })
                .max()
                .unwrap_or(0);
            out[job as usize] = bound;
        }
    }
}

#[cfg(test)]
mod test_lb1 {
    use super::*;

    // 2 jobs, 2 machines: job0 = (2,3), job1 = (4,1)
    fn toy() -> Lb1Data {
        Lb1Data::new(2, 2, vec![2, 4, 3, 1])
    }

    #[test]
    fn root_bound_is_a_valid_lower_bound_on_a_known_schedule() {
        let data = toy();
        let root_bound = data.bound(&[0, 1], -1, 2);
        // schedule 0,1: machine0 finishes at 2+4=6, machine1 at max(2,0)+3=5 then max(6,5)+1=7
        assert!(root_bound <= 7);
    }

    #[test]
    fn children_bounds_match_individual_bound_calls() {
        let data = toy();
        let mut out = vec![0i32; 2];
        data.children_bounds(&[0, 1], -1, 2, &mut out);
        for i in 0..2 {
            let job = i as i32;
            let child_prmu = if job == 0 { [0, 1] } else { [1, 0] };
            let expected = data.bound(&child_prmu, 0, 2);
            assert_eq!(out[job as usize], expected);
        }
    }

    #[test]
    fn bound_increases_or_holds_as_more_jobs_are_fixed() {
        let data = toy();
        let b0 = data.bound(&[0, 1], -1, 2);
        let b1 = data.bound(&[0, 1], 0, 2);
        assert!(b1 >= b0);
    }
}
