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

//! Error taxonomy for the solver: configuration mistakes are reported before
//! any work starts, runtime failures abort the run since a partial tree
//! search has no useful partial answer.

use thiserror::Error;

/// Anything that can cause the solver to stop before it has proven the optimum.
#[derive(Debug, Error)]
pub enum BbError {
    /// A command-line or programmatic configuration value was out of range.
    #[error("bad configuration: {0}")]
    BadConfig(String),

    /// The Taillard instance table does not contain the requested id.
    #[error("unknown Taillard instance {0} (expected 1..=120)")]
    UnknownInstance(u32),

    /// Host-side allocation failed while growing a pool or a batch buffer.
    #[error("allocation failure in {kind} at {file}:{line}")]
    Allocation {
        kind: &'static str,
        file: &'static str,
        line: u32,
    },

    /// The accelerator backend reported an error after a batch launch.
    #[error("accelerator error: {0}")]
    Accelerator(String),

    /// Reached a branch that the locking discipline of the pool is supposed
    /// to make unreachable. Kept as a hard error rather than a panic so a
    /// caller can still see which worker tripped it.
    #[error("unreachable pool state reached (lock discipline violated): {0}")]
    DeadCode(String),
}

pub type BbResult<T> = Result<T, BbError>;
