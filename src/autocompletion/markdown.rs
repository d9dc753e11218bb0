use crate::metadata::{EnumeratedExpression, ExpressionOwner};
use std::fmt::Write;

/// Incrementally builds Markdown sections for the documentation panel shown
/// next to the autocompletion list.
#[derive(Default)]
pub struct MarkdownWriter {
    buffer: String,
    sections: usize,
}

impl MarkdownWriter {
    pub fn is_empty(&self) -> bool {
        self.sections == 0
    }

    pub fn push_text(&mut self, text: impl AsRef<str>) {
        self.start_section();
        self.buffer.push_str(text.as_ref());
    }

    pub fn push_rule(&mut self) {
        self.start_section();
        self.buffer.push_str("---");
    }

    pub fn push_code_block(&mut self, snippet: &str) {
        self.start_section();
        let _ = writeln!(self.buffer, "```gdexpression");
        self.buffer.push_str(snippet);
        if !snippet.ends_with('\n') {
            self.buffer.push('\n');
        }
        let _ = write!(self.buffer, "```");
    }

    pub fn finish(self) -> Option<String> {
        if self.sections == 0 {
            None
        } else {
            Some(self.buffer)
        }
    }

    fn start_section(&mut self) {
        if self.sections > 0 {
            self.buffer.push_str("\n\n");
        }
        self.sections += 1;
    }
}

/// `Name(first: number, second: string) -> number`, receivers omitted.
pub fn expression_signature(expression: &EnumeratedExpression) -> String {
    let parameters = expression
        .visible_parameters()
        .map(|parameter| {
            let mut text = format!("{}: {}", parameter.name, parameter.value_type);
            if parameter.optional {
                text.push('?');
            }
            text
        })
        .collect::<Vec<_>>()
        .join(", ");
    let receiver = match &expression.owner {
        ExpressionOwner::Free => "",
        ExpressionOwner::Object { .. } => "Object.",
        ExpressionOwner::Behavior { .. } => "Object.Behavior::",
    };
    format!(
        "{receiver}{}({parameters}) -> {}",
        expression.metadata.name, expression.metadata.return_type
    )
}

pub fn expression_markdown(expression: &EnumeratedExpression) -> Option<String> {
    let mut writer = MarkdownWriter::default();
    writer.push_code_block(&expression_signature(expression));
    let metadata = &expression.metadata;
    if !metadata.description.is_empty() {
        writer.push_rule();
        writer.push_text(&metadata.description);
    }
    let described = expression
        .visible_parameters()
        .filter(|parameter| !parameter.description.is_empty())
        .map(|parameter| format!("- `{}`: {}", parameter.name, parameter.description))
        .collect::<Vec<_>>();
    if !described.is_empty() {
        writer.push_text(described.join("\n"));
    }
    writer.finish()
}

pub fn text_markdown(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let mut writer = MarkdownWriter::default();
    writer.push_text(text);
    writer.finish()
}
