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

//! The historical stats-file wire format: one whitespace-separated record
//! per run, appended to whatever file `--stats-file` names.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{BbError, BbResult};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunRecord {
    pub instance: u32,
    pub lb: u8,
    pub accelerators: u32,
    pub elapsed_secs: f64,
    pub explored_tree: u64,
    pub explored_sol: u64,
    pub best: i32,
}

impl RunRecord {
    /// `ta<inst> lb<lb> <D>GPU <time> <explored_tree> <explored_sol> <best>`
    pub fn to_line(self) -> String {
        format!(
            "ta{} lb{} {}GPU {:.4} {} {} {}",
            self.instance,
            self.lb,
            self.accelerators,
            self.elapsed_secs,
            self.explored_tree,
            self.explored_sol,
            self.best
        )
    }

    pub fn append_to_file(self, path: &Path) -> BbResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| BbError::BadConfig(format!("stats file {}: {e}", path.display())))?;
        writeln!(file, "{}", self.to_line())
            .map_err(|e| BbError::BadConfig(format!("stats file {}: {e}", path.display())))
    }

    /// A JSON rendering of the same record, for callers that prefer
    /// structured output over the historical whitespace-separated line.
    pub fn to_json(self) -> serde_json::Value {
        serde_json::json!(self)
    }
}

#[cfg(test)]
mod test_stats {
    use super::*;

    #[test]
    fn formats_the_historical_record() {
        let record = RunRecord {
            instance: 14,
            lb: 1,
            accelerators: 2,
            elapsed_secs: 1.23456,
            explored_tree: 1000,
            explored_sol: 42,
            best: 1230,
        };
        assert_eq!(record.to_line(), "ta14 lb1 2GPU 1.2346 1000 42 1230");
    }
}
