//! Small helpers shared by the classifier, block builder, and syscall
//! resolver: symbol-decoration stripping and section-symbol filtering
//! (spec.md §3 invariants, §4.2, §4.3).

use once_cell::sync::Lazy;
use regex::Regex;

static CALL_TARGET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?P<name>[^>+]+)(?:\+0x[0-9a-fA-F]+)?>").unwrap());

/// A symbol that denotes a section marker rather than a real function, per
/// the invariant in spec.md §3: never recorded as a callee.
pub fn is_section_symbol(symbol: &str) -> bool {
    symbol.starts_with('.') || symbol.starts_with('*') || symbol == "ABS" || symbol == "UND"
}

/// Strips a `@SUFFIX` and a trailing `+0xHEX` / `-0xHEX` displacement from a
/// bare (non-bracketed) symbol, as seen in relocation annotations
/// (spec.md §4.2).
pub fn strip_target_decorations(raw: &str) -> String {
    let without_suffix = raw.split('@').next().unwrap_or(raw);
    let displacement_trimmed = match without_suffix.rfind(['+', '-']) {
        Some(idx)
            if without_suffix[idx + 1..]
                .trim_start_matches("0x")
                .chars()
                .all(|c| c.is_ascii_hexdigit())
                && !without_suffix[idx + 1..].is_empty() =>
        {
            &without_suffix[..idx]
        }
        _ => without_suffix,
    };
    displacement_trimmed.trim().to_string()
}

/// Extracts the first `<name>` or `<name+0xHEX>` call target from an
/// instruction's argument text (spec.md §4.3, §6).
pub fn extract_call_target(args: &str) -> Option<String> {
    CALL_TARGET_RE
        .captures(args)
        .map(|caps| caps["name"].to_string())
}
