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

//! A parallel branch-and-bound solver for the permutation flow-shop
//! scheduling problem (PFSP): given `n` jobs that must each visit `m`
//! machines in the same order, find the job permutation that minimizes the
//! makespan.
//!
//! The search explores a tree of partial permutations, pruning any branch
//! whose lower bound already meets or exceeds the best complete schedule
//! found so far. Three phases drive the exploration: a short breadth-first
//! seed on the CPU, a work-stealing depth-first dive across one or more
//! accelerators, and a depth-first drain of whatever is left on the CPU.
//! The accelerator itself is modeled behind the [`accelerator::AcceleratorBackend`]
//! trait so the same driver runs against a plain CPU reference backend or a
//! real device backend without changing any exploration logic; likewise a
//! multi-process deployment plugs a transport into [`collective::Collective`].
//!
//! ## Quick example
//! ```
//! use pfsp_bb::accelerator::CpuBackend;
//! use pfsp_bb::bound::BoundKind;
//! use pfsp_bb::collective::LocalCollective;
//! use pfsp_bb::driver::{solve, SolveConfig};
//! use pfsp_bb::instance::TaillardInstance;
//!
//! let instance = TaillardInstance::load(1, None).unwrap();
//! let config = SolveConfig {
//!     which_bound: BoundKind::Lb1,
//!     min_batch: 4,
//!     max_batch: 64,
//!     accelerators: 2,
//! };
//! let report = solve(&instance, &config, &CpuBackend, &LocalCollective, i32::MAX);
//! assert!(report.best < i32::MAX);
//! ```

pub mod accelerator;
pub mod bound;
pub mod cli;
pub mod collective;
pub mod decompose;
pub mod driver;
pub mod error;
pub mod instance;
pub mod logging;
pub mod node;
pub mod pool;
pub mod scheduler;
pub mod stats;
