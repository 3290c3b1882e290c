//! End-to-end scenarios over the public query surface, matching the six
//! concrete cases and the universal invariants.

use disasm_analyzer::{Analyzer, Arch};

#[test]
fn direct_immediate_syscall_aarch64() {
    let text = concat!(
        "0000000000000000 <foo>:\n",
        "   0:\t00 00 80 d2 \tmov\tx8, #93\n",
        "   4:\t01 00 00 d4 \tsvc\t#0\n",
    );
    let analyzer = Analyzer::from_reader(text.as_bytes(), Arch::Aarch64).unwrap();
    assert_eq!(
        analyzer.graph().direct_syscalls("foo"),
        vec!["93".to_string()]
    );
}

#[test]
fn immediate_embedded_in_syscall_instruction_arm() {
    let text = concat!(
        "0000000000000000 <foo>:\n",
        "   0:\t01 00 90 ef \tsvc\t0x900001\n",
    );
    let analyzer = Analyzer::from_reader(text.as_bytes(), Arch::Arm).unwrap();
    assert_eq!(
        analyzer.graph().direct_syscalls("foo"),
        vec!["9437185".to_string()]
    );
}

#[test]
fn unresolvable_syscall_mips() {
    let text = concat!(
        "0000000000000000 <foo>:\n",
        "   0:\t00 00 00 0c \tsyscall\n",
    );
    let analyzer = Analyzer::from_reader(text.as_bytes(), Arch::Mips).unwrap();
    assert_eq!(analyzer.graph().direct_syscalls("foo"), vec!["?".to_string()]);
}

#[test]
fn relocation_patched_call_becomes_a_callee() {
    let text = concat!(
        "0000000000000000 <foo>:\n",
        "   0:\tff ff ff 97 \tbl\t0 <unresolved>\n",
        "   0: R_AARCH64_CALL26 puts\n",
    );
    let analyzer = Analyzer::from_reader(text.as_bytes(), Arch::Aarch64).unwrap();
    assert_eq!(analyzer.graph().direct_callees("foo"), vec!["puts".to_string()]);
}

#[test]
fn transitive_closure_with_cycle() {
    let text = concat!(
        "0000000000000000 <a>:\n",
        "   0:\tff ff ff 97 \tbl\t0 <b>\n",
        "0000000000000004 <b>:\n",
        "   4:\tff ff ff 97 \tbl\t0 <a>\n",
    );
    let analyzer = Analyzer::from_reader(text.as_bytes(), Arch::Aarch64).unwrap();
    assert_eq!(analyzer.graph().transitive_callees("a"), vec!["a", "b"]);
    assert_eq!(analyzer.graph().transitive_callees("b"), vec!["a", "b"]);
}

#[test]
fn conditional_beq_is_not_a_terminator_on_mips() {
    let text = concat!(
        "0000000000000000 <foo>:\n",
        "   0:\t00 00 00 00 \tbeq\t$t0,$t1,1000\n",
        "   4:\t00 00 00 00 \taddu\t$t0,$t0,$t1\n",
    );
    let analyzer = Analyzer::from_reader(text.as_bytes(), Arch::Mips).unwrap();
    let mnemonics = analyzer.graph().direct_mnemonics("foo");
    assert!(mnemonics.contains(&"addu".to_string()));
}

#[test]
fn unconditional_beq_on_zero_begins_delay_slot_dead_code() {
    let text = concat!(
        "0000000000000000 <foo>:\n",
        "   0:\t00 00 00 00 \tbeq\t$zero,$zero,1000\n",
        "   4:\t00 00 00 00 \taddu\t$t0,$t0,$t1\n",
        "   8:\t00 00 00 00 \tsubu\t$t1,$t1,$t2\n",
    );
    let analyzer = Analyzer::from_reader(text.as_bytes(), Arch::Mips).unwrap();
    let mnemonics = analyzer.graph().direct_mnemonics("foo");
    assert!(mnemonics.contains(&"addu".to_string()), "delay-slot instruction stays live");
    assert!(!mnemonics.contains(&"subu".to_string()), "instruction past the delay slot is dead code");
}

#[test]
fn determinism_across_runs() {
    let text = concat!(
        "0000000000000000 <foo>:\n",
        "   0:\tff ff ff 97 \tbl\t0 <bar>\n",
        "0000000000000004 <bar>:\n",
        "   4:\t00 00 80 d2 \tmov\tx8, #60\n",
        "   8:\t01 00 00 d4 \tsvc\t#0\n",
    );
    let first = Analyzer::from_reader(text.as_bytes(), Arch::Aarch64).unwrap();
    let second = Analyzer::from_reader(text.as_bytes(), Arch::Aarch64).unwrap();
    assert_eq!(
        first.graph().transitive_syscalls("foo"),
        second.graph().transitive_syscalls("foo")
    );
}

#[test]
fn direct_results_are_contained_in_transitive_results() {
    let text = concat!(
        "0000000000000000 <foo>:\n",
        "   0:\tff ff ff 97 \tbl\t0 <bar>\n",
        "0000000000000004 <bar>:\n",
        "   4:\t00 00 80 d2 \tmov\tx8, #60\n",
        "   8:\t01 00 00 d4 \tsvc\t#0\n",
    );
    let analyzer = Analyzer::from_reader(text.as_bytes(), Arch::Aarch64).unwrap();
    let graph = analyzer.graph();
    for callee in graph.direct_callees("foo") {
        assert!(graph.transitive_callees("foo").contains(&callee) || callee == "foo");
    }
    for syscall in graph.direct_syscalls("bar") {
        assert!(graph.transitive_syscalls("bar").contains(&syscall));
    }
}

#[test]
fn unknown_function_returns_empty_results_not_an_error() {
    let text = "0000000000000000 <foo>:\n";
    let analyzer = Analyzer::from_reader(text.as_bytes(), Arch::X86).unwrap();
    assert!(analyzer.graph().direct_callees("does_not_exist").is_empty());
    assert!(analyzer.graph().transitive_callees("does_not_exist").is_empty());
}

#[test]
fn section_symbols_are_never_recorded_as_callees() {
    let text = concat!(
        "0000000000000000 <foo>:\n",
        "   0:\te8 00 00 00 00 \tcall\t0 <.text>\n",
    );
    let analyzer = Analyzer::from_reader(text.as_bytes(), Arch::X86).unwrap();
    assert!(analyzer.graph().direct_callees("foo").is_empty());
}

#[test]
fn mips_nop_never_contributes_a_mnemonic_end_to_end() {
    let text = concat!(
        "0000000000000000 <foo>:\n",
        "   0:\t00 00 00 00 \tsll\t$zero,$zero,0\n",
        "   4:\t00 00 00 08 \tjr\t$ra\n",
    );
    let analyzer = Analyzer::from_reader(text.as_bytes(), Arch::Mips).unwrap();
    assert!(!analyzer.graph().direct_mnemonics("foo").contains(&"sll".to_string()));
}

#[test]
fn unknown_architecture_falls_back_to_mips_rather_than_failing() {
    let text = concat!(
        "0000000000000000 <foo>:\n",
        "   0:\t00 00 00 0c \tsyscall\n",
    );
    let analyzer = Analyzer::from_reader(text.as_bytes(), Arch::parse("riscv")).unwrap();
    assert_eq!(analyzer.graph().direct_syscalls("foo"), vec!["?".to_string()]);
}
