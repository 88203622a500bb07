//! Parsed XML result documents.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{Encoding, UTF_8};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Tag name that marks a failed test case
pub const ERROR_TAG: &str = "error";

const TESTCASE_TAG: &[u8] = b"testcase";

/// A child element of a `<testcase>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildNode {
    /// Tag name
    pub kind: String,
    /// Value of the `message` attribute, if present
    pub message: Option<String>,
}

/// A `<testcase>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// `name` attribute; only a failing case must have one
    pub name: Option<String>,
    pub children: Vec<ChildNode>,
}

impl TestCase {
    /// Message of the last `<error>` child, `None` if the case did not fail
    ///
    /// An `<error>` without a `message` attribute reports an empty message.
    pub fn failure_message(&self) -> Option<&str> {
        self.children
            .iter()
            .rev()
            .find(|child| child.kind == ERROR_TAG)
            .map(|child| child.message.as_deref().unwrap_or(""))
    }
}

/// One result file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultDocument {
    /// `<testcase>` elements directly under the root, in document order
    pub test_cases: Vec<TestCase>,
}

/// A result file that is not a well-formed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

impl ResultDocument {
    /// Parse raw file contents
    ///
    /// The text encoding comes from a byte order mark, else from the
    /// `encoding` of the XML declaration, else UTF-8.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        Self::parse(&decode(bytes)?)
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(text);
        let mut depth = 0usize;
        let mut seen_root = false;
        let mut current: Option<TestCase> = None;
        let mut test_cases = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                ParseError(format!("{e} (at byte {})", reader.buffer_position()))
            })?;

            match event {
                Event::Start(element) => {
                    if depth == 0 && seen_root {
                        return Err(ParseError("junk after document element".to_string()));
                    }
                    seen_root = true;
                    depth += 1;
                    open_element(&element, depth, &mut current)?;
                }
                Event::Empty(element) => {
                    if depth == 0 && seen_root {
                        return Err(ParseError("junk after document element".to_string()));
                    }
                    seen_root = true;
                    open_element(&element, depth + 1, &mut current)?;
                    if depth + 1 == 2 {
                        close_test_case(&mut current, &mut test_cases)?;
                    }
                }
                Event::End(_) => {
                    if depth == 2 {
                        close_test_case(&mut current, &mut test_cases)?;
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Text(text) if depth == 0 => {
                    if !String::from_utf8_lossy(&text).trim().is_empty() {
                        return Err(ParseError("text outside the document element".to_string()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(ParseError("no element found".to_string()));
        }
        if depth != 0 {
            return Err(ParseError("unexpected end of document".to_string()));
        }

        Ok(Self { test_cases })
    }

    /// Failing test cases as (name, message) pairs
    ///
    /// Keyed by test case name: a name seen again keeps its first position
    /// but takes the later message.
    pub fn failures(&self) -> Vec<(&str, &str)> {
        let mut failures: Vec<(&str, &str)> = Vec::new();
        for case in &self.test_cases {
            let (Some(name), Some(message)) = (case.name.as_deref(), case.failure_message())
            else {
                continue;
            };
            match failures.iter_mut().find(|(seen, _)| *seen == name) {
                Some(existing) => existing.1 = message,
                None => failures.push((name, message)),
            }
        }
        failures
    }
}

fn decode(bytes: &[u8]) -> Result<Cow<'_, str>, ParseError> {
    let (encoding, bom_len) = match Encoding::for_bom(bytes) {
        Some(found) => found,
        None => (declared_encoding(bytes)?.unwrap_or(UTF_8), 0),
    };
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    if had_errors {
        return Err(ParseError(format!("invalid {} data", encoding.name())));
    }
    Ok(text)
}

/// Encoding named by the XML declaration
///
/// The declaration was read as ASCII, so UTF-16 labels map to UTF-8.
fn declared_encoding(bytes: &[u8]) -> Result<Option<&'static Encoding>, ParseError> {
    const KEY: &[u8] = b"encoding";

    let Some(rest) = bytes.strip_prefix(b"<?xml") else {
        return Ok(None);
    };
    let Some(end) = rest.windows(2).position(|w| w == b"?>") else {
        return Ok(None);
    };
    let decl = &rest[..end];
    let Some(start) = decl.windows(KEY.len()).position(|w| w == KEY) else {
        return Ok(None);
    };
    let Some(value) = decl[start + KEY.len()..].trim_ascii_start().strip_prefix(b"=") else {
        return Ok(None);
    };
    let Some((&quote, value)) = value.trim_ascii_start().split_first() else {
        return Ok(None);
    };
    if quote != b'"' && quote != b'\'' {
        return Ok(None);
    }
    let Some(len) = value.iter().position(|&b| b == quote) else {
        return Ok(None);
    };

    let label = &value[..len];
    Encoding::for_label(label)
        .map(|encoding| Some(encoding.output_encoding()))
        .ok_or_else(|| {
            ParseError(format!(
                "unsupported encoding {}",
                String::from_utf8_lossy(label)
            ))
        })
}

/// Handle an opening tag at `depth` (root is depth 1)
fn open_element(
    element: &BytesStart<'_>,
    depth: usize,
    current: &mut Option<TestCase>,
) -> Result<(), ParseError> {
    match depth {
        2 if element.name().as_ref() == TESTCASE_TAG => {
            *current = Some(TestCase {
                name: attribute(element, "name")?,
                children: Vec::new(),
            });
        }
        3 => {
            if let Some(case) = current.as_mut() {
                case.children.push(ChildNode {
                    kind: String::from_utf8_lossy(element.name().as_ref()).into_owned(),
                    message: attribute(element, "message")?,
                });
            }
        }
        _ => {}
    }
    Ok(())
}

/// Finish the open `<testcase>`, if any
///
/// A failing case has to be named to end up in the report.
fn close_test_case(
    current: &mut Option<TestCase>,
    test_cases: &mut Vec<TestCase>,
) -> Result<(), ParseError> {
    let Some(case) = current.take() else {
        return Ok(());
    };
    if case.name.is_none() && case.failure_message().is_some() {
        return Err(ParseError(
            "failing testcase without a name attribute".to_string(),
        ));
    }
    test_cases.push(case);
    Ok(())
}

fn attribute(element: &BytesStart<'_>, key: &str) -> Result<Option<String>, ParseError> {
    let attr = element
        .try_get_attribute(key)
        .map_err(|e| ParseError(e.to_string()))?;
    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|e| ParseError(e.to_string()))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}
