//! Block builder (§4.3): partitions classified lines into an ordered label
//! stream and, per label, an ordered list of `BlockItem`s. Applies
//! architecture-specific filters (MIPS NOP idiom, delay-slot dead code) and
//! retroactively upgrades the previously emitted item when a relocation
//! annotation follows it.

use std::collections::{HashMap, HashSet};

use crate::arch::{is_zero_synonym, ArchSpec};
use crate::classify::{classify, Line};
use crate::syscall::resolve_syscall;
use crate::util::{extract_call_target, is_section_symbol};

/// One entry in a function's (or sub-label's) straight-line instruction
/// stream (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockItem {
    Instruction { mnemonic: String, args: String },
    Call { target: String, from_relocation: bool },
    Syscall { resolved_value: String },
}

impl BlockItem {
    pub fn mnemonic(&self) -> Option<&str> {
        match self {
            BlockItem::Instruction { mnemonic, .. } => Some(mnemonic),
            _ => None,
        }
    }
}

/// The ordered sequence of items between one label header and the next.
pub type Block = Vec<BlockItem>;

/// Standard entry-point symbols that are always treated as function roots,
/// even if nothing else identifies them (spec.md §3).
const STANDARD_ROOTS: &[&str] = &["main", "_start", "__start", "_init", "_fini"];

/// Everything the function graph needs: the label stream in appearance
/// order, each label's block, and the set of labels promoted to function
/// roots.
pub struct ParsedProgram {
    pub label_order: Vec<String>,
    pub blocks: HashMap<String, Block>,
    pub identified_functions: HashSet<String>,
}

struct BuilderState {
    current_label: Option<String>,
    dead: bool,
    delay_slot_counter: u32,
}

/// Consumes raw disassembly lines and builds the label/block/identified-
/// functions tuple the function graph is built from.
pub fn build(lines: &[String], arch: &'static ArchSpec) -> ParsedProgram {
    let mut label_order = Vec::new();
    let mut blocks: HashMap<String, Block> = HashMap::new();
    let mut identified_functions: HashSet<String> =
        STANDARD_ROOTS.iter().map(|s| s.to_string()).collect();

    let mut state = BuilderState {
        current_label: None,
        dead: false,
        delay_slot_counter: 0,
    };

    for raw_line in lines {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        match classify(line) {
            Line::Label(name) => {
                label_order.push(name.clone());
                blocks.insert(name.clone(), Vec::new());
                state.current_label = Some(name);
                state.dead = false;
                state.delay_slot_counter = 0;
            }
            Line::Instruction { mnemonic, args } => {
                handle_instruction(
                    &mut state,
                    &mut blocks,
                    &label_order,
                    &mut identified_functions,
                    arch,
                    mnemonic,
                    args,
                );
            }
            Line::Relocation { target } => {
                handle_relocation(&mut state, &mut blocks, &mut identified_functions, target);
            }
            Line::Ignore => {}
        }
    }

    ParsedProgram {
        label_order,
        blocks,
        identified_functions,
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_instruction(
    state: &mut BuilderState,
    blocks: &mut HashMap<String, Block>,
    label_order: &[String],
    identified_functions: &mut HashSet<String>,
    arch: &'static ArchSpec,
    mnemonic: String,
    args: String,
) {
    let Some(label) = state.current_label.clone() else {
        // Instructions before any label header have nowhere to live.
        return;
    };

    if arch.name == "mips" && mnemonic == "sll" && is_mips_nop(&args) {
        return;
    }

    if state.dead {
        return;
    }

    if state.delay_slot_counter > 0 {
        state.delay_slot_counter -= 1;
        if state.delay_slot_counter == 0 {
            state.dead = true;
        }
    }

    blocks.entry(label.clone()).or_default().push(BlockItem::Instruction {
        mnemonic: mnemonic.clone(),
        args: args.clone(),
    });

    if arch.is_call(&mnemonic) {
        if let Some(target) = extract_call_target(&args) {
            if !is_section_symbol(&target) {
                if let Some(item) = blocks.get_mut(&label).and_then(|b| b.last_mut()) {
                    *item = BlockItem::Call {
                        target: target.clone(),
                        from_relocation: false,
                    };
                }
                identified_functions.insert(target);
            }
        }
    } else if arch.is_syscall(&mnemonic) {
        let resolved_value = resolve_syscall(&label, &mnemonic, &args, blocks, label_order, arch);
        if let Some(item) = blocks.get_mut(&label).and_then(|b| b.last_mut()) {
            *item = BlockItem::Syscall { resolved_value };
        }
    }

    if is_terminator(arch, &mnemonic, &args) {
        if arch.has_delay_slot {
            state.delay_slot_counter = 1;
        }
    }
}

fn handle_relocation(
    state: &mut BuilderState,
    blocks: &mut HashMap<String, Block>,
    identified_functions: &mut HashSet<String>,
    target: String,
) {
    let Some(label) = state.current_label.clone() else {
        return;
    };
    if is_section_symbol(&target) {
        return;
    }
    let block = blocks.entry(label).or_default();
    match block.last_mut() {
        Some(item @ (BlockItem::Instruction { .. } | BlockItem::Call { .. })) => {
            *item = BlockItem::Call {
                target: target.clone(),
                from_relocation: true,
            };
        }
        _ => {
            block.push(BlockItem::Call {
                target: target.clone(),
                from_relocation: true,
            });
        }
    }
    identified_functions.insert(target);
}

/// MIPS `sll $zero,$zero,0`-family NOP idiom (spec.md §4.3): three operands,
/// all synonyms for zero.
fn is_mips_nop(args: &str) -> bool {
    let operands: Vec<&str> = args.split(',').map(str::trim).collect();
    operands.len() == 3 && operands.iter().all(|op| is_zero_synonym(op))
}

/// Terminator test (§4.3.1), with the ARM `pop` and MIPS `beq`/`bne`
/// refinements.
pub fn is_terminator(arch: &ArchSpec, mnemonic: &str, args: &str) -> bool {
    if !arch.is_terminator_mnemonic(mnemonic) {
        return false;
    }
    if arch.name == "arm" && mnemonic == "pop" {
        return args.contains("pc") || args.contains("r15");
    }
    if arch.name == "mips" && (mnemonic == "beq" || mnemonic == "bne") {
        let operands: Vec<&str> = args.split(',').collect();
        let first_two_zero = operands
            .iter()
            .take(2)
            .all(|op| is_zero_synonym(op.trim()));
        return first_two_zero;
    }
    true
}

/// Whether `predecessor`'s block is connected to `current_label` for the
/// purposes of syscall-resolution fallback (spec.md §4.4, step 3): it falls
/// through (its last instruction is not a terminator) or it branches to the
/// current label.
pub fn is_connected_predecessor(
    predecessor_block: &Block,
    current_label: &str,
    arch: &ArchSpec,
) -> bool {
    match predecessor_block.last() {
        None => true,
        Some(BlockItem::Instruction { mnemonic, args }) => {
            !is_terminator(arch, mnemonic, args) || args.contains(current_label)
        }
        Some(BlockItem::Call { .. }) | Some(BlockItem::Syscall { .. }) => true,
    }
}
