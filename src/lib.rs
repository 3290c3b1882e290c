//! Multi-architecture disassembly call/syscall/mnemonic analyzer.
//!
//! Parses disassembly listings for MIPS, x86/x86-64, ARM, AArch64, and
//! s390x, builds a per-function summary of callees, resolved syscall
//! numbers, and instruction mnemonics, and answers direct and transitive
//! queries over the resulting call graph.

use std::io::{BufRead, BufReader, Read};

/// Architecture Spec (§4.1)
pub mod arch;
/// Block Builder + BlockItem/Block/LabelOrder data model (§3, §4.3)
pub mod block;
/// Line Classifier (§4.2)
pub mod classify;
pub mod error;
/// Function Graph + Query Interface (§4.5, §4.6)
pub mod graph;
/// Syscall Value Resolver + register scan (§4.4)
pub mod syscall;
mod util;

pub use self::arch::Arch;
pub use self::block::BlockItem;
pub use self::error::AnalyzerError;
pub use self::graph::{FunctionGraph, FunctionSummary};

/// Entry point: parses a disassembly listing and builds its function graph.
pub struct Analyzer {
    graph: FunctionGraph,
}

impl Analyzer {
    /// Reads every line from `reader` up front, then builds the block model
    /// and function graph for `arch` (spec.md §5).
    pub fn from_reader<R: Read>(reader: R, arch: Arch) -> Result<Self, AnalyzerError> {
        let lines: Vec<String> = BufReader::new(reader).lines().collect::<Result<_, _>>()?;
        let program = block::build(&lines, arch.spec());
        let graph = FunctionGraph::build(&program);
        Ok(Self { graph })
    }

    /// Opens and parses the file at `path`. The `-`-means-stdin sentinel
    /// (spec.md §5) is the CLI collaborator's concern, not this library
    /// entry point's — callers wanting that dispatch should check for `-`
    /// themselves and call [`Analyzer::from_reader`] with [`std::io::stdin`]
    /// instead, the way `src/bin/disasm-analyzer.rs` does.
    pub fn from_path<P: AsRef<std::path::Path>>(path: P, arch: Arch) -> Result<Self, AnalyzerError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, arch)
    }

    pub fn graph(&self) -> &FunctionGraph {
        &self.graph
    }
}
