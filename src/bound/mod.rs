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

//! Lower bound routines. These are pure functions of an immutable,
//! once-built table (`Lb1Data`/`Lb2Data`) and a node's permutation; they never
//! touch shared mutable state and are safe to call from any worker, on the
//! host or inside an accelerator batch.

mod lb1;
mod lb2;

pub use lb1::Lb1Data;
pub use lb2::Lb2Data;

/// Which lower bound strategy the decomposer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// One bound per child at a time, simplest form.
    Lb1,
    /// All children of a node bounded in one batched call.
    Lb1Children,
    /// Two-machine (Johnson) relaxation, tighter and more expensive.
    Lb2,
}

impl BoundKind {
    pub fn from_cli(value: u8) -> Option<Self> {
        match value {
            0 => Some(BoundKind::Lb1Children),
            1 => Some(BoundKind::Lb1),
            2 => Some(BoundKind::Lb2),
            _ => None,
        }
    }
}
