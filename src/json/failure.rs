//! Purpose: Classify decoder parse failures into stable categories with hints.
//! Exports: `ParseFailureCategory`, `categorize_message`, `hint_for_message`.
//! Role: Shared taxonomy for decode diagnostics across both decoder backends.
//! Invariants: Category mapping is deterministic for representative error text.
//! Invariants: Hints contain only the category label and caller-provided context.
//! Notes: Self-contained on purpose; tests include this file by path.

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    Syntax,
    NumericRange,
    Utf8,
    DepthLimit,
    Unknown,
}

impl ParseFailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::NumericRange => "numeric-range",
            ParseFailureCategory::Utf8 => "utf8",
            ParseFailureCategory::DepthLimit => "depth-limit",
            ParseFailureCategory::Unknown => "unknown",
        }
    }
}

// Both backends report failures as prose, so categorization matches on
// message fragments. Order matters: utf8 and depth markers also contain
// words the syntax bucket would claim.
pub fn categorize_message(message: &str) -> ParseFailureCategory {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("utf-8") || lowered.contains("utf8") {
        ParseFailureCategory::Utf8
    } else if lowered.contains("recursion") || lowered.contains("depth") {
        ParseFailureCategory::DepthLimit
    } else if lowered.contains("out of range") || lowered.contains("overflow") {
        ParseFailureCategory::NumericRange
    } else if lowered.contains("expected")
        || lowered.contains("unexpected")
        || lowered.contains("invalid")
        || lowered.contains("syntax")
        || lowered.contains("eof")
    {
        ParseFailureCategory::Syntax
    } else {
        ParseFailureCategory::Unknown
    }
}

pub fn hint_for_message(message: &str, context: &str) -> String {
    let category = categorize_message(message);
    format!("parse category: {}; context: {}", category.label(), context)
}
