//! Function graph and query interface (§4.5, §4.6): groups labels into
//! function roots, aggregates each root's callees/mnemonics/syscall values,
//! and answers direct and transitive queries over the call graph.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::block::{BlockItem, ParsedProgram};

/// Per-function aggregate: everything it (and the sub-labels merged into
/// it) directly calls, issues, and executes.
#[derive(Debug, Clone, Default)]
pub struct FunctionSummary {
    pub callees: BTreeSet<String>,
    pub mnemonics: BTreeSet<String>,
    syscall_values: BTreeSet<String>,
    has_unresolved_syscall: bool,
}

impl FunctionSummary {
    /// Syscall values in ascending order, with the unresolved sentinel `"?"`
    /// placed last rather than sorted lexicographically (spec.md §4.6).
    pub fn syscalls(&self) -> Vec<String> {
        let mut values: Vec<String> = self.syscall_values.iter().cloned().collect();
        if self.has_unresolved_syscall {
            values.push("?".to_string());
        }
        values
    }
}

/// The built call/syscall/mnemonic graph for one analyzed program, answering
/// the query surface of spec.md §6.
pub struct FunctionGraph {
    summaries: HashMap<String, FunctionSummary>,
}

impl FunctionGraph {
    /// Partitions the label stream into function roots and builds each
    /// root's aggregate (spec.md §4.5).
    pub fn build(program: &ParsedProgram) -> Self {
        let mut summaries: HashMap<String, FunctionSummary> = HashMap::new();
        let mut current_root: Option<String> = None;

        for label in &program.label_order {
            if current_root.is_none() || program.identified_functions.contains(label) {
                current_root = Some(label.clone());
                summaries.entry(label.clone()).or_default();
            }
            let Some(root) = current_root.clone() else {
                continue;
            };
            let Some(block) = program.blocks.get(label) else {
                continue;
            };
            let summary = summaries.entry(root).or_default();
            for item in block {
                match item {
                    BlockItem::Instruction { mnemonic, .. } => {
                        summary.mnemonics.insert(mnemonic.clone());
                    }
                    BlockItem::Call { target, .. } => {
                        summary.callees.insert(target.clone());
                    }
                    BlockItem::Syscall { resolved_value } => {
                        if resolved_value == "?" {
                            summary.has_unresolved_syscall = true;
                        } else {
                            summary.syscall_values.insert(resolved_value.clone());
                        }
                    }
                }
            }
        }

        Self { summaries }
    }

    /// All function names, ASCII-sorted ascending.
    pub fn functions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.summaries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn summary(&self, function: &str) -> Option<&FunctionSummary> {
        self.summaries.get(function)
    }

    /// Direct callees of `function`, sorted ascending, or empty if unknown.
    pub fn direct_callees(&self, function: &str) -> Vec<String> {
        self.summaries
            .get(function)
            .map(|s| s.callees.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every function transitively reachable from `function` over the
    /// callee relation, cycle-safe via a visited set. Excludes `function`
    /// itself unless it is reachable from itself through a cycle.
    pub fn transitive_callees(&self, function: &str) -> Vec<String> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        queue.push_back(function.to_string());

        let mut reached_self = false;
        while let Some(current) = queue.pop_front() {
            let Some(summary) = self.summaries.get(&current) else {
                continue;
            };
            for callee in &summary.callees {
                if callee == function {
                    reached_self = true;
                }
                if visited.insert(callee.clone()) {
                    queue.push_back(callee.clone());
                }
            }
        }

        if reached_self {
            visited.insert(function.to_string());
        }
        let mut result: Vec<String> = visited.into_iter().collect();
        result.sort();
        result
    }

    /// Direct syscall values, ascending with `?` last.
    pub fn direct_syscalls(&self, function: &str) -> Vec<String> {
        self.summaries
            .get(function)
            .map(FunctionSummary::syscalls)
            .unwrap_or_default()
    }

    /// Union of syscall values over `function` and its transitive callees,
    /// ascending with `?` last.
    pub fn transitive_syscalls(&self, function: &str) -> Vec<String> {
        let mut values: BTreeSet<String> = BTreeSet::new();
        let mut unresolved = false;
        for f in self.closure(function) {
            if let Some(summary) = self.summaries.get(&f) {
                values.extend(summary.syscall_values.iter().cloned());
                unresolved |= summary.has_unresolved_syscall;
            }
        }
        let mut result: Vec<String> = values.into_iter().collect();
        if unresolved {
            result.push("?".to_string());
        }
        result
    }

    /// Direct mnemonics, ascending.
    pub fn direct_mnemonics(&self, function: &str) -> Vec<String> {
        self.summaries
            .get(function)
            .map(|s| s.mnemonics.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Union of mnemonics over `function` and its transitive callees,
    /// ascending.
    pub fn transitive_mnemonics(&self, function: &str) -> Vec<String> {
        let mut values: BTreeSet<String> = BTreeSet::new();
        for f in self.closure(function) {
            if let Some(summary) = self.summaries.get(&f) {
                values.extend(summary.mnemonics.iter().cloned());
            }
        }
        values.into_iter().collect()
    }

    /// `{function} ∪ transitive_callees(function)`, used by the transitive
    /// syscall/mnemonic queries (spec.md §4.6).
    fn closure(&self, function: &str) -> Vec<String> {
        let mut all = self.transitive_callees(function);
        if self.summaries.contains_key(function) && !all.iter().any(|f| f == function) {
            all.push(function.to_string());
        }
        all
    }
}
