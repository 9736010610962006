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

//! The accelerator offload contract. A real deployment plugs in a backend
//! that mirrors the bound tables onto a device once and launches a batched
//! kernel per call; the kernel itself is out of scope here, so this module
//! only fixes the host-side contract and ships a CPU reference backend that
//! satisfies it by calling the same bound routines the sequential decomposer
//! uses. Swapping in a real device backend means implementing this trait;
//! nothing else in the driver or scheduler changes.

use std::sync::Arc;

use crate::bound::{BoundKind, Lb1Data, Lb2Data};
use crate::error::BbResult;
use crate::node::Node;

/// Host contract for a batched bound evaluation, mirroring the original's
/// `evaluate_gpu(jobs, lb, size, ..., parents_dev, bounds_dev)`: upload the
/// bound tables once, then evaluate many batches against the same mirror.
/// `bounds[j + i * jobs]` is the bound of fixing `parents[i].prmu[j]` next,
/// for `j` in `(parents[i].limit1, jobs)`; other slots are unspecified.
pub trait AcceleratorBackend: Send + Sync {
    /// Opaque handle to whatever device-resident mirror of `Lb1Data`/
    /// `Lb2Data` this backend built. Cheap to clone and share across
    /// worker threads.
    type Mirror: Send + Sync + Clone;

    /// Build the device-resident mirror of the bound tables. Called once,
    /// before any batch is evaluated.
    fn upload(&self, lb1: &Arc<Lb1Data>, lb2: &Arc<Lb2Data>) -> BbResult<Self::Mirror>;

    /// Evaluate every child of every parent in `parents` in one launch,
    /// filling `bounds` (length at least `jobs * parents.len()`).
    fn evaluate_batch(
        &self,
        jobs: usize,
        which_bound: BoundKind,
        mirror: &Self::Mirror,
        best: i32,
        parents: &[Node],
        bounds: &mut [i32],
    ) -> BbResult<()>;
}

/// Reference backend: evaluates batches on the CPU using the same lb1/lb2
/// routines the CPU decomposer calls directly. Exists so the three-phase
/// driver and worker scheduler can be exercised without any real device.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuBackend;

/// The CPU backend's "device mirror" is just shared ownership of the host
/// tables — there is no separate memory space to copy into.
#[derive(Clone)]
pub struct CpuMirror {
    lb1: Arc<Lb1Data>,
    lb2: Arc<Lb2Data>,
}

impl AcceleratorBackend for CpuBackend {
    type Mirror = CpuMirror;

    fn upload(&self, lb1: &Arc<Lb1Data>, lb2: &Arc<Lb2Data>) -> BbResult<Self::Mirror> {
        Ok(CpuMirror {
            lb1: Arc::clone(lb1),
            lb2: Arc::clone(lb2),
        })
    }

    fn evaluate_batch(
        &self,
        jobs: usize,
        which_bound: BoundKind,
        mirror: &Self::Mirror,
        best: i32,
        parents: &[Node],
        bounds: &mut [i32],
    ) -> BbResult<()> {
        debug_assert!(bounds.len() >= jobs * parents.len());
        let (lb1, lb2) = (&mirror.lb1, &mirror.lb2);

        for (p_idx, parent) in parents.iter().enumerate() {
            let out = &mut bounds[p_idx * jobs..(p_idx + 1) * jobs];
            match which_bound {
                BoundKind::Lb1Children => {
                    lb1.children_bounds(parent.prmu(jobs), parent.limit1, jobs, out);
                }
                BoundKind::Lb1 => {
                    for (i, _) in parent.children(jobs) {
                        let child = parent.child_swapping(i, jobs);
                        let job = parent.prmu[i] as usize;
                        out[job] = lb1.bound(child.prmu(jobs), child.limit1, jobs);
                    }
                }
                BoundKind::Lb2 => {
                    for (i, _) in parent.children(jobs) {
                        let child = parent.child_swapping(i, jobs);
                        let job = parent.prmu[i] as usize;
                        out[job] = lb2.bound(lb1, child.prmu(jobs), child.limit1, jobs, best);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test_accelerator {
    use super::*;

    #[test]
    fn cpu_backend_batch_matches_per_node_bound() {
        let lb1 = Arc::new(Lb1Data::new(4, 2, vec![2, 4, 3, 1, 3, 1, 2, 5]));
        let lb2 = Arc::new(Lb2Data::new(&lb1));
        let backend = CpuBackend;
        let mirror = backend.upload(&lb1, &lb2).unwrap();

        let parents = vec![Node::root(4)];
        let mut bounds = vec![i32::MAX; 4];
        backend
            .evaluate_batch(
                4,
                BoundKind::Lb1Children,
                &mirror,
                i32::MAX,
                &parents,
                &mut bounds,
            )
            .unwrap();

        for job in 0..4 {
            let child = parents[0].child_swapping(job, 4);
            let expected = lb1.bound(child.prmu(4), child.limit1, 4);
            assert_eq!(bounds[job], expected);
        }
    }

    #[test]
    fn evaluate_batch_handles_multiple_parents() {
        let lb1 = Arc::new(Lb1Data::new(4, 2, vec![2, 4, 3, 1, 3, 1, 2, 5]));
        let lb2 = Arc::new(Lb2Data::new(&lb1));
        let backend = CpuBackend;
        let mirror = backend.upload(&lb1, &lb2).unwrap();

        let root = Node::root(4);
        let parents: Vec<Node> = (0..4).map(|i| root.child_swapping(i, 4)).collect();
        let mut bounds = vec![i32::MAX; 4 * parents.len()];
        backend
            .evaluate_batch(4, BoundKind::Lb1, &mirror, i32::MAX, &parents, &mut bounds)
            .unwrap();

        assert_eq!(bounds.len(), 16);
    }
}
