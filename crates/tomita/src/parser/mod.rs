//! # GLR Runtime
//!
//! The parallel-stack interpreter. A [`GraphStack`] of parse stacks is
//! processed in lock-step per input token: reductions cascade first (forking
//! on conflicts), then every stack that can shift does, then equivalent
//! successors merge. Stacks that can neither reduce usefully nor shift are
//! pruned naturally; panic-mode recovery kicks in only when the whole
//! frontier is stuck.
//!
//! The "parallelism" is simulated: everything runs on the calling thread,
//! and the set of returned trees is deterministic for a fixed grammar and
//! token stream.

mod driver;
mod graph;
mod recovery;
mod stack;

pub use graph::GraphStack;
pub use stack::{Frame, ParseStack};

pub(crate) use driver::run;
