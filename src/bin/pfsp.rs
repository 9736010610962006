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

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use pfsp_bb::accelerator::CpuBackend;
use pfsp_bb::cli::Args;
use pfsp_bb::collective::LocalCollective;
use pfsp_bb::driver::{solve, SolveConfig};
use pfsp_bb::instance::TaillardInstance;
use pfsp_bb::logging;
use pfsp_bb::stats::RunRecord;

fn main() -> ExitCode {
    let args = Args::parse();
    let verbose = args.verbose;
    logging::init(verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%e, "fatal error");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), pfsp_bb::error::BbError> {
    let validated = args.validate()?;

    let instance = TaillardInstance::load(validated.inst, validated.instance_dir.as_deref())?;
    let initial_best = if validated.use_known_upper_bound {
        instance.best_known_upper_bound
    } else {
        i32::MAX
    };

    tracing::info!(
        inst = validated.inst,
        jobs = instance.jobs,
        machines = instance.machines,
        lb = ?validated.bound,
        accelerators = validated.accelerators,
        "starting PFSP branch-and-bound search"
    );

    // The CPU-only reference backend has no real accelerators to count, so
    // --threads (default num_cpus::get()) overrides --D as the actual worker
    // count; --D is still carried through to the stats record for
    // compatibility with the historical "<D>GPU" field.
    let config = SolveConfig {
        which_bound: validated.bound,
        min_batch: validated.min_batch,
        max_batch: validated.max_batch,
        accelerators: validated.threads,
    };

    let report = solve(
        &instance,
        &config,
        &CpuBackend,
        &LocalCollective,
        initial_best,
    );

    let record = RunRecord {
        instance: validated.inst,
        lb: match validated.bound {
            pfsp_bb::bound::BoundKind::Lb1Children => 0,
            pfsp_bb::bound::BoundKind::Lb1 => 1,
            pfsp_bb::bound::BoundKind::Lb2 => 2,
        },
        accelerators: validated.accelerators,
        elapsed_secs: report.elapsed_secs,
        explored_tree: report.explored_tree,
        explored_sol: report.explored_sol,
        best: report.best,
    };

    if validated.json {
        println!("{}", record.to_json());
    } else {
        println!("{}", record.to_line());
    }
    tracing::info!(record = record.to_line(), "run complete");
    if let Some(path) = &validated.stats_file {
        record.append_to_file(path)?;
    }

    Ok(())
}
