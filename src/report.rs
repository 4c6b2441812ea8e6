//! Output formatting for the declaration/call report.
//!
//! The report is a flat, human-readable text stream: one source header per
//! file, then strictly nested, tab-indented lines - class, declaration one
//! level deeper, call sites one level deeper still. Columns within a line
//! are tab-separated. The writer is generic over the sink so tests capture
//! output in memory.

use std::io;

use crate::analysis::calls::CallSite;
use crate::analysis::walker::DeclarationRecord;

/// One indentation unit.
pub const INDENT: &str = "\t";

pub struct ReportWriter<W: io::Write> {
    out: W,
}

impl<W: io::Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the writer, returning the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// `[Source: <path>]` header opening a file's section.
    pub fn source_header(&mut self, path: &str) -> io::Result<()> {
        writeln!(self.out, "[Source: {}]", path)
    }

    /// Class line at the outermost report level.
    pub fn class_line(&mut self, qualified_name: &str) -> io::Result<()> {
        writeln!(self.out, "Class Declaration: {}", qualified_name)
    }

    /// Declaration line, one level below its class.
    pub fn declaration_line(&mut self, record: &DeclarationRecord) -> io::Result<()> {
        writeln!(
            self.out,
            "{}{}\t{}\t{}{}\t{}\t{}",
            INDENT,
            record.kind.label(),
            record.containing_class,
            record.name,
            record.parameter_signature,
            record.modifiers,
            record.line_count
        )
    }

    /// Call line, one level below its declaration.
    pub fn call_line(&mut self, site: &CallSite) -> io::Result<()> {
        writeln!(
            self.out,
            "{}{}{}{}",
            INDENT,
            INDENT,
            site.label(),
            site.identity()
        )
    }

    /// Trailing blank line closing the whole run.
    pub fn run_trailer(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::calls::CallSite;
    use crate::analysis::resolver::ResolvedCallee;
    use crate::analysis::walker::{DeclarationKind, DeclarationRecord};

    fn render<F: FnOnce(&mut ReportWriter<Vec<u8>>)>(build: F) -> String {
        let mut writer = ReportWriter::new(Vec::new());
        build(&mut writer);
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn declaration_line_is_tab_delimited_and_indented() {
        let record = DeclarationRecord {
            kind: DeclarationKind::Method,
            name: "Render".to_string(),
            parameter_signature: "(int depth)".to_string(),
            modifiers: "public static".to_string(),
            line_count: 7,
            containing_class: "Ui.Widget".to_string(),
            calls: Vec::new(),
        };

        let text = render(|w| w.declaration_line(&record).unwrap());
        assert_eq!(
            text,
            "\tMethod Declaration: \tUi.Widget\tRender(int depth)\tpublic static\t7\n"
        );
    }

    #[test]
    fn constructor_line_uses_its_own_label() {
        let record = DeclarationRecord {
            kind: DeclarationKind::Constructor,
            name: "Widget".to_string(),
            parameter_signature: "(int)".to_string(),
            modifiers: "public".to_string(),
            line_count: 3,
            containing_class: "Ui.Widget".to_string(),
            calls: Vec::new(),
        };

        let text = render(|w| w.declaration_line(&record).unwrap());
        assert_eq!(
            text,
            "\tConstructor Declaration: \tUi.Widget\tWidget(int)\tpublic\t3\n"
        );
    }

    #[test]
    fn call_lines_nest_one_level_deeper() {
        let specified = CallSite::Specified {
            callee: ResolvedCallee {
                namespace: "Ui".to_string(),
                type_name: "Theme".to_string(),
                method_name: "Apply".to_string(),
                return_type: None,
                display: "Ui.Theme.Apply(string)".to_string(),
            },
        };
        let inferred = CallSite::NonSpecified {
            namespace: "Ui".to_string(),
            type_name: "Widget".to_string(),
            method_name: "Refresh".to_string(),
            argument_types: vec!["int".to_string(), "*".to_string()],
        };

        let text = render(|w| {
            w.call_line(&specified).unwrap();
            w.call_line(&inferred).unwrap();
        });
        assert_eq!(
            text,
            "\t\tSpecified Syntax MethodCall: Ui.Theme.Apply(string)\n\
             \t\tNon-specified Syntax MethodCall: Ui.Widget.Refresh(int, *)\n"
        );
    }

    #[test]
    fn header_and_trailer_frame_the_run() {
        let text = render(|w| {
            w.source_header("src/Widget.cs").unwrap();
            w.class_line("Ui.Widget").unwrap();
            w.run_trailer().unwrap();
        });
        assert_eq!(text, "[Source: src/Widget.cs]\nClass Declaration: Ui.Widget\n\n");
    }
}
