//! Approximate logical line counting for declarations.

use tree_sitter::Node;

use crate::syntax::{csharp, SourceUnit};

/// Count the meaningful lines of a declaration.
///
/// The declaration text is reconstructed from the syntax tree with comment
/// nodes spliced out, then split into lines; a line counts iff it is
/// non-empty after trimming and does not start with a single-line comment
/// marker. Recomputed per declaration, never cached.
pub fn logical_line_count(unit: &SourceUnit, decl: Node) -> usize {
    let stripped = text_without_comments(unit, decl);
    stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .count()
}

/// The declaration's source text with every comment node's byte range
/// removed. Removal is structural (driven by the tree), so block comments
/// disappear wholesale rather than line by line.
fn text_without_comments(unit: &SourceUnit, decl: Node) -> String {
    let start = decl.start_byte();
    let end = decl.end_byte();
    let mut spans = csharp::comment_spans(decl);
    spans.sort_unstable();

    let mut kept = Vec::with_capacity(end - start);
    let mut pos = start;
    for (comment_start, comment_end) in spans {
        if comment_start > pos {
            kept.extend_from_slice(&unit.source[pos..comment_start]);
        }
        pos = pos.max(comment_end);
    }
    if pos < end {
        kept.extend_from_slice(&unit.source[pos..end]);
    }
    String::from_utf8_lossy(&kept).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::csharp::{kind, CSharpSyntax};
    use crate::syntax::{descendants_of_kind, SyntaxProvider};
    use std::path::Path;

    fn first_method(source: &str) -> (SourceUnit, usize) {
        let unit = CSharpSyntax::new()
            .parse(Path::new("Test.cs"), source.as_bytes())
            .unwrap();
        let methods = descendants_of_kind(unit.root(), kind::METHOD);
        let count = logical_line_count(&unit, methods[0]);
        (unit, count)
    }

    #[test]
    fn counts_signature_and_body_lines() {
        let (_, count) = first_method(
            "class C {\n    void M()\n    {\n        int a = 1;\n        a += 1;\n    }\n}",
        );
        // signature, both braces, two statements
        assert_eq!(count, 5);
    }

    #[test]
    fn blank_lines_and_line_comments_do_not_count() {
        let plain =
            "class C {\n    void M()\n    {\n        int a = 1;\n    }\n}";
        let noisy = "class C {\n    void M()\n    {\n\n        // setup\n        int a = 1;\n\n    }\n}";
        let (_, baseline) = first_method(plain);
        let (_, with_noise) = first_method(noisy);
        assert_eq!(baseline, with_noise);
    }

    #[test]
    fn block_comments_are_spliced_out() {
        let plain = "class C {\n    void M()\n    {\n        int a = 1;\n    }\n}";
        let commented =
            "class C {\n    void M()\n    {\n        /* multi\n           line\n           note */\n        int a = 1;\n    }\n}";
        let (_, baseline) = first_method(plain);
        let (_, with_comment) = first_method(commented);
        assert_eq!(baseline, with_comment);
    }

    #[test]
    fn trailing_comment_does_not_erase_the_statement() {
        let (_, count) = first_method(
            "class C {\n    void M()\n    {\n        int a = 1; // trailing\n    }\n}",
        );
        assert_eq!(count, 4);
    }

    #[test]
    fn expression_bodied_method_is_one_line() {
        let (_, count) = first_method("class C {\n    int M() => 42;\n}");
        assert_eq!(count, 1);
    }
}
