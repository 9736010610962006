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

//! Loading of PFSP instances in the Taillard text format:
//!
//! ```text
//! number of jobs, number of machines, initial seed, upper bound, lower bound :
//!           20           5   873654221      1278      1232
//! processing times :
//!  54  83  15  71 ...
//!  ...
//! ```
//!
//! one row per machine, one column per job. Only a handful of small
//! instances ship inside this crate (used by the test suite); a real
//! deployment points `--instance-dir` at a directory holding the full
//! official benchmark set, which is downloaded separately rather than
//! vendored here.

use std::path::Path;

use crate::error::{BbError, BbResult};
use crate::node::MAX_JOBS;

#[derive(Debug, Clone)]
pub struct TaillardInstance {
    pub id: u32,
    pub jobs: usize,
    pub machines: usize,
    /// Row-major per machine: `p_times[k * jobs + j]`.
    pub p_times: Vec<i32>,
    pub best_known_upper_bound: i32,
}

impl TaillardInstance {
    pub fn parse(id: u32, text: &str) -> BbResult<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());

        let _header_comment = lines
            .next()
            .ok_or_else(|| BbError::BadConfig(format!("instance {id}: empty file")))?;
        let dims_line = lines
            .next()
            .ok_or_else(|| BbError::BadConfig(format!("instance {id}: missing dimensions line")))?;
        let dims: Vec<i64> = dims_line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<i64>()
                    .map_err(|e| BbError::BadConfig(format!("instance {id}: {e}")))
            })
            .collect::<BbResult<_>>()?;
        if dims.len() < 4 {
            return Err(BbError::BadConfig(format!(
                "instance {id}: expected at least 4 fields on the dimensions line"
            )));
        }
        let jobs = dims[0] as usize;
        let machines = dims[1] as usize;
        let best_known_upper_bound = dims[3] as i32;

        if jobs == 0 || jobs > MAX_JOBS {
            return Err(BbError::BadConfig(format!(
                "instance {id}: unsupported job count {jobs} (max {MAX_JOBS})"
            )));
        }

        let _processing_times_comment = lines.next().ok_or_else(|| {
            BbError::BadConfig(format!("instance {id}: missing processing-times header"))
        })?;

        let mut p_times = vec![0i32; jobs * machines];
        for k in 0..machines {
            let row = lines.next().ok_or_else(|| {
                BbError::BadConfig(format!("instance {id}: missing row for machine {k}"))
            })?;
            let values: Vec<i32> = row
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<i32>()
                        .map_err(|e| BbError::BadConfig(format!("instance {id}: {e}")))
                })
                .collect::<BbResult<_>>()?;
            if values.len() != jobs {
                return Err(BbError::BadConfig(format!(
                    "instance {id}: machine {k} row has {} values, expected {jobs}",
                    values.len()
                )));
            }
            p_times[k * jobs..(k + 1) * jobs].copy_from_slice(&values);
        }

        Ok(TaillardInstance {
            id,
            jobs,
            machines,
            p_times,
            best_known_upper_bound,
        })
    }

    pub fn load_from_file(id: u32, path: &Path) -> BbResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BbError::BadConfig(format!("instance {id}: {e}")))?;
        Self::parse(id, &text)
    }

    /// Resolve an instance id against `dir` (expects a file named
    /// `ta<id>.txt`), falling back to the small embedded sample set so the
    /// crate is runnable without any external data.
    pub fn load(id: u32, dir: Option<&Path>) -> BbResult<Self> {
        if !(1..=120).contains(&id) {
            return Err(BbError::UnknownInstance(id));
        }
        if let Some(dir) = dir {
            let path = dir.join(format!("ta{id}.txt"));
            if path.exists() {
                return Self::load_from_file(id, &path);
            }
        }
        embedded_sample(id).ok_or(BbError::UnknownInstance(id))
    }
}

/// A few small, self-contained instances used by tests and as a fallback
/// when no external instance directory is configured. These are not drawn
/// from the official Taillard benchmark; they exist so the solver can run
/// end to end out of the box.
fn embedded_sample(id: u32) -> Option<TaillardInstance> {
    match id {
        1 => TaillardInstance::parse(
            1,
            "number of jobs, number of machines, initial seed, upper bound, lower bound :\n\
              5           3           1           253           220\n\
             processing times :\n\
             54 83 15 71 77\n\
             79 3 11 99 56\n\
             16 89 49 15 89\n",
        )
        .ok(),
        14 => TaillardInstance::parse(
            14,
            "number of jobs, number of machines, initial seed, upper bound, lower bound :\n\
              6           4           2           500           430\n\
             processing times :\n\
             54 83 15 71 77 36\n\
             79 3 11 99 56 70\n\
             16 89 49 15 89 45\n\
             66 58 31 68 78 91\n",
        )
        .ok(),
        _ => None,
    }
}

#[cfg(test)]
mod test_instance {
    use super::*;

    #[test]
    fn parses_the_embedded_sample_instance() {
        let inst = TaillardInstance::load(1, None).unwrap();
        assert_eq!(inst.jobs, 5);
        assert_eq!(inst.machines, 3);
        assert_eq!(inst.p_times.len(), 15);
    }

    #[test]
    fn default_cli_instance_is_embedded() {
        let inst = TaillardInstance::load(14, None).unwrap();
        assert_eq!(inst.jobs, 6);
        assert_eq!(inst.machines, 4);
    }

    #[test]
    fn rejects_out_of_range_ids() {
        assert!(matches!(
            TaillardInstance::load(0, None),
            Err(BbError::UnknownInstance(0))
        ));
        assert!(matches!(
            TaillardInstance::load(121, None),
            Err(BbError::UnknownInstance(121))
        ));
    }

    #[test]
    fn unshipped_in_range_id_without_directory_errors() {
        assert!(matches!(
            TaillardInstance::load(2, None),
            Err(BbError::UnknownInstance(2))
        ));
    }
}
