//! Indented re-serialisation of a document.

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use crate::error::RenderFailure;

/// Renders documents as indented XML text.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineRenderer;

impl OutlineRenderer {
    pub fn render(&self, text: &str) -> Result<String, RenderFailure> {
        render_outline(text)
    }
}

/// Re-serialise `text` with two-space indentation, dropping blank text runs.
pub fn render_outline(text: &str) -> Result<String, RenderFailure> {
    let mut reader = Reader::from_str(text);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Text(content)) if is_blank(&content) => {}
            Ok(event) => writer
                .write_event(event)
                .map_err(|error| RenderFailure::Write(error.to_string()))?,
            Err(error) => return Err(RenderFailure::Read(error.to_string())),
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|error| RenderFailure::Write(error.to_string()))
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_nested_elements() {
        let rendered = render_outline("<a>\n\n<b>\n<c/></b>   </a>").unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["<a>", "  <b>", "    <c/>", "  </b>", "</a>"]);
    }

    #[test]
    fn reports_unreadable_input() {
        assert!(matches!(
            render_outline("<a></b>"),
            Err(RenderFailure::Read(_))
        ));
    }
}
