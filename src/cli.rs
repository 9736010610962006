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

//! Command-line surface, in the teacher's `clap`-derive style (cf. the
//! `jssp` example's `Args` struct).

use std::path::PathBuf;

use clap::Parser;

use crate::bound::BoundKind;
use crate::error::{BbError, BbResult};

/// Branch-and-bound solver for the permutation flow-shop scheduling problem.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Taillard instance id to solve.
    #[clap(long, default_value_t = 14)]
    pub inst: u32,

    /// Lower bound: 0 = lb1_d, 1 = lb1, 2 = lb2.
    #[clap(long, default_value_t = 1)]
    pub lb: u8,

    /// Initial upper bound: 0 = none (+inf), 1 = known optimum.
    #[clap(long, default_value_t = 1)]
    pub ub: u8,

    /// Minimum pool size before a worker launches a batch.
    #[clap(long, default_value_t = 25)]
    pub m: usize,

    /// Maximum nodes per batch.
    #[clap(long = "M", default_value_t = 50_000)]
    pub upper_m: usize,

    /// Number of accelerators (workers) per process.
    #[clap(long = "D", default_value_t = 1)]
    pub d: u32,

    /// Override the worker-thread count used by the CPU reference backend.
    #[clap(long)]
    pub threads: Option<usize>,

    /// Optional directory holding full Taillard-format instance files
    /// (`ta<id>.txt`); falls back to the small embedded sample set.
    #[clap(long)]
    pub instance_dir: Option<PathBuf>,

    /// Append the run's stats record to this file.
    #[clap(long)]
    pub stats_file: Option<PathBuf>,

    /// Raise tracing verbosity (repeatable: -v, -vv, -vvv).
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the final run record as JSON instead of the historical
    /// whitespace-separated line.
    #[clap(short, long, action)]
    pub json: bool,
}

pub struct ValidatedArgs {
    pub inst: u32,
    pub bound: BoundKind,
    pub use_known_upper_bound: bool,
    pub min_batch: usize,
    pub max_batch: usize,
    pub accelerators: u32,
    pub threads: usize,
    pub instance_dir: Option<PathBuf>,
    pub stats_file: Option<PathBuf>,
    pub verbose: u8,
    pub json: bool,
}

impl Args {
    pub fn validate(self) -> BbResult<ValidatedArgs> {
        if !(1..=120).contains(&self.inst) {
            return Err(BbError::BadConfig(format!(
                "--inst must be in 1..=120, got {}",
                self.inst
            )));
        }
        let bound = BoundKind::from_cli(self.lb)
            .ok_or_else(|| BbError::BadConfig(format!("--lb must be 0, 1 or 2, got {}", self.lb)))?;
        if !(0..=1).contains(&self.ub) {
            return Err(BbError::BadConfig(format!(
                "--ub must be 0 or 1, got {}",
                self.ub
            )));
        }
        if self.m < 1 {
            return Err(BbError::BadConfig("--m must be >= 1".into()));
        }
        if self.upper_m < self.m {
            return Err(BbError::BadConfig(format!(
                "--M ({}) must be >= --m ({})",
                self.upper_m, self.m
            )));
        }
        if !(0..=16).contains(&self.d) {
            return Err(BbError::BadConfig(format!(
                "--D must be in 0..=16, got {}",
                self.d
            )));
        }
        let accelerators = self.d.max(1);
        let threads = self.threads.unwrap_or_else(num_cpus::get);
        if threads < 1 {
            return Err(BbError::BadConfig("--threads must be >= 1".into()));
        }

        Ok(ValidatedArgs {
            inst: self.inst,
            bound,
            use_known_upper_bound: self.ub == 1,
            min_batch: self.m,
            max_batch: self.upper_m,
            accelerators,
            threads,
            instance_dir: self.instance_dir,
            stats_file: self.stats_file,
            verbose: self.verbose,
            json: self.json,
        })
    }
}

#[cfg(test)]
mod test_cli {
    use super::*;

    fn base() -> Args {
        Args {
            inst: 14,
            lb: 1,
            ub: 1,
            m: 25,
            upper_m: 50_000,
            d: 1,
            threads: None,
            instance_dir: None,
            stats_file: None,
            verbose: 0,
            json: false,
        }
    }

    #[test]
    fn defaults_validate_cleanly() {
        let validated = base().validate().unwrap();
        assert_eq!(validated.inst, 14);
        assert_eq!(validated.bound, BoundKind::Lb1);
    }

    #[test]
    fn rejects_m_greater_than_upper_m() {
        let mut args = base();
        args.m = 100;
        args.upper_m = 50;
        assert!(args.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_instance() {
        let mut args = base();
        args.inst = 0;
        assert!(args.validate().is_err());
        args.inst = 999;
        assert!(args.validate().is_err());
    }

    #[test]
    fn rejects_unknown_lower_bound() {
        let mut args = base();
        args.lb = 9;
        assert!(args.validate().is_err());
    }

    #[test]
    fn d_zero_is_clamped_to_one_worker() {
        let mut args = base();
        args.d = 0;
        let validated = args.validate().unwrap();
        assert_eq!(validated.accelerators, 1);
    }
}
