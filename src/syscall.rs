//! Syscall value resolver (§4.4): determines the concrete syscall number at
//! a syscall site by inspecting the instruction's own immediate, then
//! backtracking through the current block's register writes, then
//! optionally consulting the linearly preceding block.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::arch::ArchSpec;
use crate::block::{is_connected_predecessor, Block, BlockItem};

const DESTRUCTIVE: &[&str] = &["ldr", "pop", "ldm", "lw", "ld", "lh", "lb", "lbu", "lhu"];
// WRITE mnemonics (mov, add, li, ...) and unclassified mnemonics share the
// same handling below: both attempt immediate extraction after the
// self-move check, so they are not enumerated as a separate list.
const READ: &[&str] = &[
    "cmp", "cmn", "tst", "teq", "str", "push", "beq", "bne", "sw", "sd", "st", "std", "test",
    "sh", "sb",
];

static MEMORY_EXPR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").unwrap());
static IMMEDIATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"0x[0-9a-fA-F]+|-?\b\d+\b").unwrap());

/// Extracts the last immediate literal from instruction argument text,
/// after stripping bracket- and paren-delimited memory expressions
/// (spec.md §4.4.1).
fn extract_last_immediate(args: &str) -> Option<i64> {
    let stripped = MEMORY_EXPR_RE.replace_all(args, " ");
    let last = IMMEDIATE_RE.find_iter(&stripped).last()?;
    let text = last.as_str();
    if let Some(hex) = text.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else {
        text.parse::<i64>().ok()
    }
}

/// Resolves the concrete syscall number for a syscall instruction with
/// mnemonic `mnemonic` and argument text `syscall_args`, occurring in
/// `current_label`'s block.
pub fn resolve_syscall(
    current_label: &str,
    mnemonic: &str,
    syscall_args: &str,
    blocks: &HashMap<String, Block>,
    label_order: &[String],
    arch: &ArchSpec,
) -> String {
    // x86 `int 0x80`'s operand is the fixed interrupt vector, never the
    // syscall number — that lives in eax/rax, so step 1 only applies to
    // architectures where the instruction's own immediate *is* the syscall
    // number (ARM/AArch64 `svc 0x900000`-style direct encoding).
    if mnemonic != "int" {
        if let Some(value) = extract_last_immediate(syscall_args) {
            if value != 0 {
                return value.to_string();
            }
        }
    }

    let current_block = blocks.get(current_label);
    if let Some(block) = current_block {
        if let Some(resolved) = register_scan(block, arch) {
            return resolved;
        }
    }

    if let Some(pos) = label_order.iter().position(|l| l == current_label) {
        if pos > 0 {
            let predecessor_label = &label_order[pos - 1];
            if let Some(predecessor_block) = blocks.get(predecessor_label) {
                if is_connected_predecessor(predecessor_block, current_label, arch) {
                    if let Some(resolved) = register_scan(predecessor_block, arch) {
                        return resolved;
                    }
                }
            }
        }
    }

    "?".to_string()
}

/// Backtracks through a block's items newest-to-oldest looking for the most
/// recent definition of the architecture's syscall register (spec.md
/// §4.4.1). Returns `None` if the block is exhausted without a matching
/// instruction, signaling the caller to try the linear predecessor.
fn register_scan(block: &Block, arch: &ArchSpec) -> Option<String> {
    for item in block.iter().rev() {
        let BlockItem::Instruction { mnemonic, args } = item else {
            continue;
        };
        let stripped_args = args.replace(['$', '%'], "");
        let Some(register_match) = arch.syscall_register.find(&stripped_args) else {
            continue;
        };
        let register_token = register_match.as_str();

        if DESTRUCTIVE.contains(&mnemonic.as_str()) {
            return Some("?".to_string());
        }
        if READ.contains(&mnemonic.as_str()) {
            continue;
        }

        // A self-move (`mov r7, r7`) redefines nothing; detected
        // structurally — the extracted-immediate path can never see it,
        // since the register's own digits (`7` in `r7`) never stand alone
        // as an immediate token. Only an exact two-operand echo counts: an
        // instruction like `add r7, r7, #1` also mentions the register
        // again but genuinely redefines it, so it must fall through to
        // immediate extraction below rather than be treated as a no-op.
        let operands: Vec<&str> = stripped_args.split(',').map(str::trim).collect();
        let is_self_move =
            operands.len() == 2 && operands[0] == register_token && operands[1] == register_token;
        if is_self_move {
            continue;
        }

        // WRITE mnemonics and the unclassified fallback both attempt
        // immediate extraction (open question in spec.md §9: favors recall
        // over precision).
        match extract_last_immediate(args) {
            Some(value) => return Some(value.to_string()),
            None => return Some("?".to_string()),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Arch;

    fn block(items: Vec<BlockItem>) -> Block {
        items
    }

    fn instr(mnemonic: &str, args: &str) -> BlockItem {
        BlockItem::Instruction {
            mnemonic: mnemonic.to_string(),
            args: args.to_string(),
        }
    }

    #[test]
    fn immediate_embedded_in_syscall_instruction() {
        let blocks = HashMap::new();
        let resolved = resolve_syscall(
            "foo",
            "svc",
            "0x900001",
            &blocks,
            &["foo".to_string()],
            Arch::Arm.spec(),
        );
        assert_eq!(resolved, "9437185");
    }

    #[test]
    fn direct_immediate_via_register_write_aarch64() {
        let mut blocks = HashMap::new();
        blocks.insert(
            "foo".to_string(),
            block(vec![instr("mov", "x8, #93"), instr("svc", "#0")]),
        );
        let resolved = resolve_syscall(
            "foo",
            "svc",
            "#0",
            &blocks,
            &["foo".to_string()],
            Arch::Aarch64.spec(),
        );
        assert_eq!(resolved, "93");
    }

    #[test]
    fn unresolvable_mips_syscall_with_no_preceding_write() {
        let mut blocks = HashMap::new();
        blocks.insert("foo".to_string(), block(vec![instr("syscall", "")]));
        let resolved = resolve_syscall(
            "foo",
            "syscall",
            "",
            &blocks,
            &["foo".to_string()],
            Arch::Mips.spec(),
        );
        assert_eq!(resolved, "?");
    }

    #[test]
    fn destructive_load_returns_unresolved() {
        let mut blocks = HashMap::new();
        blocks.insert(
            "foo".to_string(),
            block(vec![instr("ldr", "r7, [sp, #4]"), instr("svc", "#0")]),
        );
        let resolved = resolve_syscall(
            "foo",
            "svc",
            "#0",
            &blocks,
            &["foo".to_string()],
            Arch::Arm.spec(),
        );
        assert_eq!(resolved, "?");
    }

    #[test]
    fn self_move_guard_keeps_backtracking() {
        let mut blocks = HashMap::new();
        blocks.insert(
            "foo".to_string(),
            block(vec![
                instr("mov", "r7, #42"),
                instr("mov", "r7, r7"),
                instr("svc", "#0"),
            ]),
        );
        let resolved = resolve_syscall(
            "foo",
            "svc",
            "#0",
            &blocks,
            &["foo".to_string()],
            Arch::Arm.spec(),
        );
        assert_eq!(resolved, "42");
    }

    #[test]
    fn falls_back_to_connected_predecessor() {
        let mut blocks = HashMap::new();
        blocks.insert("pred".to_string(), block(vec![instr("li", "$v0, 4004")]));
        blocks.insert("foo".to_string(), block(vec![instr("syscall", "")]));
        let resolved = resolve_syscall(
            "foo",
            "syscall",
            "",
            &blocks,
            &["pred".to_string(), "foo".to_string()],
            Arch::Mips.spec(),
        );
        assert_eq!(resolved, "4004");
    }

    #[test]
    fn register_redefined_via_self_referencing_add_is_not_a_self_move() {
        let mut blocks = HashMap::new();
        blocks.insert(
            "foo".to_string(),
            block(vec![
                instr("mov", "r7, #42"),
                instr("add", "r7, r7, #1"),
                instr("svc", "#0"),
            ]),
        );
        let resolved = resolve_syscall(
            "foo",
            "svc",
            "#0",
            &blocks,
            &["foo".to_string()],
            Arch::Arm.spec(),
        );
        // The `add` genuinely redefines r7 (it is not a self-move), so the
        // scan stops there and extracts its own immediate rather than
        // continuing back to the earlier `mov r7, #42`.
        assert_eq!(resolved, "1");
    }

    #[test]
    fn int_0x80_ignores_its_own_operand_and_scans_eax() {
        let mut blocks = HashMap::new();
        blocks.insert(
            "foo".to_string(),
            block(vec![instr("mov", "eax, 60"), instr("int", "0x80")]),
        );
        let resolved = resolve_syscall(
            "foo",
            "int",
            "0x80",
            &blocks,
            &["foo".to_string()],
            Arch::X86.spec(),
        );
        assert_eq!(resolved, "60");
    }
}
