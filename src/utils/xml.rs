//! XML well-formedness checks and pretty-printing for package parts.
//!
//! Both operations share one event walk over `quick-xml`:
//! - `validate` rejects anything a word processor would refuse to load
//! - `pretty` drops ignorable whitespace and re-indents with two spaces
//!
//! Whitespace is only ignorable in element-only content. Elements that carry
//! text, have no element children, or sit inside `xml:space="preserve"` are
//! written inline so no whitespace is added to or removed from character data.

use quick_xml::{
    Reader, Writer,
    escape::unescape,
    events::{BytesRef, BytesStart, BytesText, Event},
};
use thiserror::Error;

const INDENT_CHAR: u8 = b' ';
const INDENT_SIZE: usize = 2;

/// Entities every XML document may reference without a DTD.
const PREDEFINED_ENTITIES: [&[u8]; 5] = [b"lt", b"gt", b"amp", b"apos", b"quot"];

/// Structured-text errors.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("content outside the root element at byte {0}")]
    OutsideRoot(u64),

    #[error("failed to write xml: {0}")]
    Write(String),
}

/// Check that `bytes` is a well-formed XML document.
pub fn validate(bytes: &[u8]) -> Result<(), XmlError> {
    walk(bytes, &[], |_, _| Ok(()))
}

/// Re-serialize `bytes` with normalized indentation.
pub fn pretty(bytes: &[u8]) -> Result<Vec<u8>, XmlError> {
    let mut writer =
        Writer::new_with_indent(Vec::with_capacity(bytes.len()), INDENT_CHAR, INDENT_SIZE);

    let inline = inline_elements(bytes);
    walk(bytes, &inline, |event, placement| {
        if placement == Placement::Inline {
            // An empty text event clears the writer's pending line break
            writer
                .write_event(Event::Text(BytesText::from_escaped("")))
                .map_err(|e| XmlError::Write(e.to_string()))?;
        }
        writer
            .write_event(event)
            .map_err(|e| XmlError::Write(e.to_string()))
    })?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Writer may break the line and indent before this event.
    Indented,
    /// Event must follow the previous output directly.
    Inline,
}

impl Placement {
    fn within(inline: bool) -> Self {
        if inline { Self::Inline } else { Self::Indented }
    }
}

struct Frame {
    name: Vec<u8>,
    preserve: bool,
    inline: bool,
}

/// For each start tag in document order, whether its content is laid out inline.
///
/// An element is inline when it has direct character data (mixed content) or
/// no element children at all. Scanning stops at the first syntax error;
/// `walk` reports it.
fn inline_elements(bytes: &[u8]) -> Vec<bool> {
    struct Scan {
        index: usize,
        text: bool,
        children: bool,
    }

    let mut reader = Reader::from_reader(bytes);
    let mut inline = Vec::new();
    let mut stack: Vec<Scan> = Vec::new();

    loop {
        let Ok(event) = reader.read_event() else {
            break;
        };
        match event {
            Event::Eof => break,
            Event::Start(_) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children = true;
                }
                stack.push(Scan {
                    index: inline.len(),
                    text: false,
                    children: false,
                });
                inline.push(false);
            }
            Event::Empty(_) | Event::Comment(_) | Event::PI(_) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children = true;
                }
            }
            Event::Text(text) if !text.iter().all(u8::is_ascii_whitespace) => {
                if let Some(parent) = stack.last_mut() {
                    parent.text = true;
                }
            }
            Event::GeneralRef(_) | Event::CData(_) => {
                if let Some(parent) = stack.last_mut() {
                    parent.text = true;
                }
            }
            Event::End(_) => {
                if let Some(scan) = stack.pop() {
                    inline[scan.index] = scan.text || !scan.children;
                }
            }
            _ => {}
        }
    }
    inline
}

fn walk<'i>(
    bytes: &'i [u8],
    inline_hint: &[bool],
    mut emit: impl FnMut(Event<'i>, Placement) -> Result<(), XmlError>,
) -> Result<(), XmlError> {
    let mut reader = Reader::from_reader(bytes);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root_seen = false;
    let mut starts = 0;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| XmlError::Syntax {
            position: reader.buffer_position() as u64,
            message: e.to_string(),
        })?;
        let inline = stack.last().is_some_and(|f| f.inline);

        match event {
            Event::Eof => break,
            Event::Start(start) => {
                open_element(&stack, &mut root_seen, &start, position)?;
                let inherited = stack.last().is_some_and(|f| f.preserve);
                let preserve = space_preserve(&start, inherited);
                let hinted = inline_hint.get(starts).copied().unwrap_or(false);
                starts += 1;
                stack.push(Frame {
                    name: start.name().as_ref().to_vec(),
                    preserve,
                    inline: preserve || hinted,
                });
                emit(Event::Start(start), Placement::within(inline))?;
            }
            Event::Empty(empty) => {
                open_element(&stack, &mut root_seen, &empty, position)?;
                emit(Event::Empty(empty), Placement::within(inline))?;
            }
            Event::End(end) => {
                let Some(frame) = stack.pop() else {
                    return Err(XmlError::Syntax {
                        position,
                        message: "end tag without a matching start tag".into(),
                    });
                };
                emit(Event::End(end), Placement::within(frame.inline))?;
            }
            Event::Text(text) => {
                check_chars(&text, position)?;
                let blank = text.iter().all(u8::is_ascii_whitespace);
                let Some(frame) = stack.last_mut() else {
                    if blank {
                        continue;
                    }
                    return Err(XmlError::OutsideRoot(position));
                };
                if blank && !frame.inline {
                    continue;
                }
                if !blank {
                    frame.inline = true;
                }
                emit(Event::Text(text), Placement::Indented)?;
            }
            Event::GeneralRef(reference) => {
                let Some(frame) = stack.last_mut() else {
                    return Err(XmlError::OutsideRoot(position));
                };
                frame.inline = true;
                check_reference(&reference, position)?;
                let escaped = format!("&{};", String::from_utf8_lossy(&reference));
                emit(Event::Text(BytesText::from_escaped(escaped)), Placement::Indented)?;
            }
            Event::CData(cdata) => {
                let Some(frame) = stack.last_mut() else {
                    return Err(XmlError::OutsideRoot(position));
                };
                frame.inline = true;
                check_chars(&cdata, position)?;
                emit(Event::CData(cdata), Placement::Inline)?;
            }
            other => emit(other, Placement::within(inline))?,
        }
    }

    if let Some(frame) = stack.last() {
        return Err(XmlError::Unclosed(
            String::from_utf8_lossy(&frame.name).into_owned(),
        ));
    }
    if !root_seen {
        return Err(XmlError::NoRoot);
    }
    Ok(())
}

/// Enforce a single root and well-formed attributes.
fn open_element(
    stack: &[Frame],
    root_seen: &mut bool,
    start: &BytesStart<'_>,
    position: u64,
) -> Result<(), XmlError> {
    if stack.is_empty() {
        if *root_seen {
            return Err(XmlError::OutsideRoot(position));
        }
        *root_seen = true;
    }
    for attr in start.attributes() {
        let attr = attr.map_err(|e| syntax(position, e))?;
        check_chars(&attr.value, position)?;
        let value = std::str::from_utf8(&attr.value).map_err(|e| syntax(position, e))?;
        let value = unescape(value).map_err(|e| syntax(position, e))?;
        check_chars(value.as_bytes(), position)?;
    }
    Ok(())
}

/// Only the predefined entities, or a character reference to a legal `Char`.
fn check_reference(reference: &BytesRef<'_>, position: u64) -> Result<(), XmlError> {
    if reference.is_char_ref() {
        return match reference.resolve_char_ref() {
            Ok(Some(ch)) if is_xml_char(ch) => Ok(()),
            Ok(Some(ch)) => Err(syntax(
                position,
                format!("character reference to illegal character U+{:04X}", ch as u32),
            )),
            Ok(None) => Err(syntax(position, "malformed character reference")),
            Err(e) => Err(syntax(position, e)),
        };
    }
    if PREDEFINED_ENTITIES.contains(&&**reference) {
        return Ok(());
    }
    Err(syntax(
        position,
        format!("undefined entity `&{};`", String::from_utf8_lossy(reference)),
    ))
}

/// Reject control characters XML forbids in character data.
fn check_chars(bytes: &[u8], position: u64) -> Result<(), XmlError> {
    match bytes
        .iter()
        .find(|&&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r'))
    {
        Some(b) => Err(syntax(position, format!("illegal character U+{:04X}", b))),
        None => Ok(()),
    }
}

/// `Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}

fn syntax(position: u64, message: impl ToString) -> XmlError {
    XmlError::Syntax {
        position,
        message: message.to_string(),
    }
}

fn space_preserve(start: &BytesStart<'_>, inherited: bool) -> bool {
    match start.try_get_attribute("xml:space") {
        Ok(Some(attr)) => attr.value.as_ref() == b"preserve",
        _ => inherited,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pretty_str(input: &str) -> String {
        String::from_utf8(pretty(input.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_pretty_indents_element_content() {
        assert_eq!(
            pretty_str("<a><b>x</b><c/></a>"),
            "<a>\n  <b>x</b>\n  <c/>\n</a>\n"
        );
    }

    #[test]
    fn test_pretty_drops_blank_text() {
        assert_eq!(
            pretty_str("<a>\n\n      <b/>   \n</a>"),
            "<a>\n  <b/>\n</a>\n"
        );
    }

    #[test]
    fn test_pretty_keeps_declaration() {
        let out = pretty_str(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<w:document/>",
        );
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:document/>\n"
        );
    }

    #[test]
    fn test_pretty_keeps_preserved_space() {
        let out = pretty_str(
            "<w:p><w:r><w:t xml:space=\"preserve\"> </w:t></w:r><w:r><w:t xml:space=\"preserve\">a  b </w:t></w:r></w:p>",
        );
        assert!(out.contains("<w:t xml:space=\"preserve\"> </w:t>"));
        assert!(out.contains("<w:t xml:space=\"preserve\">a  b </w:t>"));
    }

    #[test]
    fn test_pretty_no_whitespace_inside_preserve() {
        let out = pretty_str("<a><p xml:space=\"preserve\"><b/><c/></p></a>");
        assert!(out.contains("<p xml:space=\"preserve\"><b/><c/></p>"));
    }

    #[test]
    fn test_pretty_keeps_entity_references_inline() {
        assert_eq!(pretty_str("<a>x &amp; y</a>"), "<a>x &amp; y</a>\n");
        assert_eq!(pretty_str("<a><b>x&lt;</b></a>"), "<a>\n  <b>x&lt;</b>\n</a>\n");
    }

    #[test]
    fn test_pretty_is_idempotent() {
        let input = "<?xml version=\"1.0\"?><w:document xmlns:w=\"urn:w\"><w:body><w:p><w:r><w:t xml:space=\"preserve\">Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p><w:sectPr/></w:body></w:document>";
        let once = pretty(input.as_bytes()).unwrap();
        let twice = pretty(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_pretty_keeps_blank_only_content() {
        assert_eq!(pretty_str("<w:r><w:t> </w:t></w:r>"), "<w:r>\n  <w:t> </w:t>\n</w:r>\n");
        assert_eq!(pretty_str("<a><b></b></a>"), "<a>\n  <b></b>\n</a>\n");
    }

    #[test]
    fn test_pretty_mixed_content_with_leading_child() {
        assert_eq!(pretty_str("<p><b/>tail</p>"), "<p><b/>tail</p>\n");
        assert_eq!(
            pretty_str("<a><p><b>x</b> and <i>y</i></p></a>"),
            "<a>\n  <p><b>x</b> and <i>y</i></p>\n</a>\n"
        );
    }

    #[test]
    fn test_validate_rejects_undefined_entity() {
        assert!(validate(b"<w:t>Tom &nbsp; Jerry</w:t>").is_err());
        assert!(validate(b"<a x=\"&nbsp;\"/>").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_character_reference() {
        assert!(validate(b"<a>&#xZZ;</a>").is_err());
        assert!(validate(b"<a>&#1;</a>").is_err());
        assert!(validate(b"<a>&#xFFFE;</a>").is_err());
    }

    #[test]
    fn test_validate_accepts_predefined_and_char_references() {
        assert!(validate(b"<a>&lt;&gt;&amp;&apos;&quot;&#65;&#x263A;&#x9;</a>").is_ok());
        assert!(validate(b"<a x=\"&amp;&#x41;\"/>").is_ok());
    }

    #[test]
    fn test_validate_rejects_control_characters() {
        assert!(validate(b"<a>x\x01y</a>").is_err());
        assert!(validate(b"<a x=\"\x02\"/>").is_err());
        assert!(validate(b"<a>\tx\r\n</a>").is_ok());
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        assert!(validate(b"<w:document><w:body/></w:document>").is_ok());
        assert!(validate(b"<?xml version=\"1.0\"?>\n<!-- note -->\n<a/>\n").is_ok());
    }

    #[test]
    fn test_validate_rejects_mismatched_end() {
        assert!(validate(b"<a><b></a>").is_err());
    }

    #[test]
    fn test_validate_rejects_unclosed() {
        assert!(validate(b"<a><b/>").is_err());
        assert!(validate(b"<w:document><w:body>").is_err());
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        assert!(matches!(validate(b""), Err(XmlError::NoRoot)));
        assert!(matches!(validate(b"  \n"), Err(XmlError::NoRoot)));
    }

    #[test]
    fn test_validate_rejects_content_outside_root() {
        assert!(matches!(validate(b"<a/><b/>"), Err(XmlError::OutsideRoot(_))));
        assert!(matches!(validate(b"<a/>junk"), Err(XmlError::OutsideRoot(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_attribute() {
        assert!(validate(b"<a x=\"1\" x=\"2\"/>").is_err());
    }
}
