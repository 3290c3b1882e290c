//! Line classifier (§4.2): recognizes label headers, instruction lines, and
//! relocation annotations, and filters everything else to `Ignore`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::util::strip_target_decorations;

/// The classification of a single (already-trimmed) input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Label(String),
    Instruction { mnemonic: String, args: String },
    Relocation { target: String },
    Ignore,
}

static LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-fA-F]*\s*<(?P<name>[^>]+)>:$").unwrap());

static RELOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]+:\s+R_[A-Za-z0-9_]+\s+(?P<target>\S+)").unwrap());

static INSTRUCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]+:\s+(?:[0-9a-fA-F]{2}\s+)+(?P<mnemonic>[A-Za-z_.][A-Za-z0-9_.]*)\s*(?P<args>.*)$")
        .unwrap()
});

/// Classify one line of disassembler output. The caller is responsible for
/// trimming leading/trailing whitespace first.
pub fn classify(line: &str) -> Line {
    if let Some(caps) = LABEL_RE.captures(line) {
        return Line::Label(caps["name"].to_string());
    }
    if let Some(caps) = RELOCATION_RE.captures(line) {
        return Line::Relocation {
            target: strip_target_decorations(&caps["target"]),
        };
    }
    if let Some(caps) = INSTRUCTION_RE.captures(line) {
        let mnemonic = caps["mnemonic"].to_ascii_lowercase();
        if mnemonic.starts_with('.') {
            return Line::Ignore;
        }
        return Line::Instruction {
            mnemonic,
            args: caps["args"].trim().to_string(),
        };
    }
    Line::Ignore
}
