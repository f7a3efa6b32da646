//! Span-based code replacements and synthetic dependency bindings.

/// A constant substitution against the module source.
///
/// Offsets are byte positions relative to the start of the module's own
/// source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeReplacement {
    pub start: u32,
    pub end: u32,
    pub content: String,
}

/// A synthesized module-level binding: `name` resolves to the module produced
/// by `request`.
///
/// The host's dependency graph is the consumer of this record; no source
/// text is generated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticImport {
    pub name: String,
    pub request: String,
}

/// Apply `replacements` to `source`.
///
/// Replacements are spliced back to front so earlier offsets stay valid.
/// Ranges must not overlap.
pub fn apply_replacements(source: &str, replacements: &[CodeReplacement]) -> String {
    let mut ordered: Vec<&CodeReplacement> = replacements.iter().collect();
    ordered.sort_by_key(|r| (r.start, r.end));

    let mut out = source.to_string();
    for replacement in ordered.iter().rev() {
        out.replace_range(
            replacement.start as usize..replacement.end as usize,
            &replacement.content,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replacement(start: u32, end: u32, content: &str) -> CodeReplacement {
        CodeReplacement {
            start,
            end,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_single_replacement() {
        let out = apply_replacements("new Worker(a)", &[replacement(11, 12, "b")]);
        assert_eq!(out, "new Worker(b)");
    }

    #[test]
    fn test_replacements_apply_in_offset_order() {
        // Recorded out of order on purpose.
        let out = apply_replacements(
            "aa bb cc",
            &[replacement(6, 8, "3"), replacement(0, 2, "1")],
        );
        assert_eq!(out, "1 bb 3");
    }

    #[test]
    fn test_blanking_a_range() {
        let out = apply_replacements("{ type: 'module' }", &[replacement(2, 16, "")]);
        assert_eq!(out, "{  }");
    }

    #[test]
    fn test_no_replacements_is_identity() {
        assert_eq!(apply_replacements("let x = 1;", &[]), "let x = 1;");
    }
}
