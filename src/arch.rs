//! Static per-architecture tables (§4.1): call/syscall/terminator mnemonic
//! sets, delay-slot flag, and the register pattern that conventionally holds
//! the syscall number at the point of a syscall instruction.

use once_cell::sync::Lazy;
use regex::Regex;

/// Architecture tag as accepted on the command line / `Analyzer::from_reader`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Mips,
    X86,
    Arm,
    Aarch64,
    S390x,
}

impl Arch {
    /// Resolve a string tag to an architecture, falling back to MIPS with a
    /// diagnostic for anything unrecognized (spec.md §4.1, §7).
    pub fn parse(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "mips" | "mipsel" | "mips64" | "mips64el" => Arch::Mips,
            "x86" | "x86_64" | "x86-64" | "i386" | "amd64" => Arch::X86,
            "arm" | "armv7" | "armv6" => Arch::Arm,
            "aarch64" | "arm64" => Arch::Aarch64,
            "s390x" | "s390" => Arch::S390x,
            other => {
                log::warn!("unknown architecture `{other}`, falling back to mips");
                Arch::Mips
            }
        }
    }

    pub fn spec(self) -> &'static ArchSpec {
        match self {
            Arch::Mips => &MIPS,
            Arch::X86 => &X86,
            Arch::Arm => &ARM,
            Arch::Aarch64 => &AARCH64,
            Arch::S390x => &S390X,
        }
    }
}

/// A static, read-only description of one architecture's instruction
/// vocabulary, used by the block builder and syscall resolver.
pub struct ArchSpec {
    pub name: &'static str,
    pub call_mnemonics: &'static [&'static str],
    pub syscall_mnemonics: &'static [&'static str],
    pub terminator_mnemonics: &'static [&'static str],
    pub has_delay_slot: bool,
    pub syscall_register: Regex,
}

impl ArchSpec {
    pub fn is_call(&self, mnemonic: &str) -> bool {
        self.call_mnemonics.contains(&mnemonic)
    }

    pub fn is_syscall(&self, mnemonic: &str) -> bool {
        self.syscall_mnemonics.contains(&mnemonic)
    }

    pub fn is_terminator_mnemonic(&self, mnemonic: &str) -> bool {
        self.terminator_mnemonics.contains(&mnemonic)
    }
}

/// Register tokens that are synonyms for the literal value zero (§4.3,
/// MIPS NOP filtering and the `beq`/`bne`-as-unconditional idiom).
pub fn is_zero_synonym(token: &str) -> bool {
    matches!(token.trim(), "0" | "zero" | "r0" | "0x0" | "$zero" | "$0")
}

pub static MIPS: Lazy<ArchSpec> = Lazy::new(|| ArchSpec {
    name: "mips",
    call_mnemonics: &["jal", "jalr"],
    syscall_mnemonics: &["syscall"],
    terminator_mnemonics: &[
        "j", "jr", "b", "beq", "bne", "beqz", "bnez", "bgez", "bltz", "bgtz", "blez",
    ],
    has_delay_slot: true,
    syscall_register: Regex::new(r"(?i)\$?v0\b").unwrap(),
});

pub static X86: Lazy<ArchSpec> = Lazy::new(|| ArchSpec {
    name: "x86",
    call_mnemonics: &["call", "callq"],
    syscall_mnemonics: &["syscall", "sysenter", "int"],
    terminator_mnemonics: &["ret", "retq", "retn", "jmp", "jmpq"],
    has_delay_slot: false,
    syscall_register: Regex::new(r"(?i)%?e?ax\b|%?rax\b").unwrap(),
});

pub static ARM: Lazy<ArchSpec> = Lazy::new(|| ArchSpec {
    name: "arm",
    call_mnemonics: &["bl", "blx"],
    syscall_mnemonics: &["svc", "swi"],
    terminator_mnemonics: &["b", "bx", "pop"],
    has_delay_slot: false,
    syscall_register: Regex::new(r"(?i)\b[r]7\b").unwrap(),
});

pub static AARCH64: Lazy<ArchSpec> = Lazy::new(|| ArchSpec {
    name: "aarch64",
    call_mnemonics: &["bl", "blr"],
    syscall_mnemonics: &["svc"],
    terminator_mnemonics: &["ret", "b"],
    has_delay_slot: false,
    syscall_register: Regex::new(r"(?i)\b[xw]8\b").unwrap(),
});

pub static S390X: Lazy<ArchSpec> = Lazy::new(|| ArchSpec {
    name: "s390x",
    call_mnemonics: &["brasl", "basr", "bras"],
    syscall_mnemonics: &["svc"],
    terminator_mnemonics: &["br", "j", "jg"],
    has_delay_slot: false,
    syscall_register: Regex::new(r"(?i)%?r1\b").unwrap(),
});
