//! Response body decoding.
//!
//! The API answers in XML. Bodies are turned into a JSON-style map:
//!
//! - an element becomes a key; repeated siblings become an array
//! - text-only elements become scalars (`"1"` -> `1`, `"true"` -> `true`)
//! - attributes become keys next to child elements
//! - text mixed with attributes or children is stored under `"$t"`
//! - an empty element becomes `{}`
//!
//! Decoding never fails. Anything that is not a single well-formed XML
//! document (including the HTML page sent back for malformed requests)
//! yields an empty map, and [`DecodeOutcome`] says why.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Number, Value};

use crate::constants::RESPONSE_WRAPPER;

const TEXT_KEY: &str = "$t";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The body was a well-formed XML document.
    #[default]
    Parsed,
    /// The body was empty or whitespace.
    EmptyInput,
    /// The body could not be read as XML.
    Failed(String),
}

impl DecodeOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBody {
    pub body: Map<String, Value>,
    pub outcome: DecodeOutcome,
}

impl DecodedBody {
    fn fallback(outcome: DecodeOutcome) -> Self {
        Self {
            body: Map::new(),
            outcome,
        }
    }
}

/// Decode a response body. Total: every input gives a map.
pub fn decode(text: &str) -> DecodedBody {
    if text.trim().is_empty() {
        return DecodedBody::fallback(DecodeOutcome::EmptyInput);
    }
    match parse_document(text) {
        Ok(map) => DecodedBody {
            body: unwrap_response(map),
            outcome: DecodeOutcome::Parsed,
        },
        Err(reason) => {
            tracing::debug!(%reason, "response body is not XML, substituting empty body");
            DecodedBody::fallback(DecodeOutcome::Failed(reason))
        }
    }
}

/// Whether a body is an HTML page rather than an API document.
pub fn is_html_document(text: &str) -> bool {
    let head: String = text
        .trim_start()
        .chars()
        .take(14)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Promote the payload of a lone `<response>` root.
fn unwrap_response(mut map: Map<String, Value>) -> Map<String, Value> {
    if map.len() != 1 {
        return map;
    }
    match map.remove(RESPONSE_WRAPPER) {
        Some(Value::Object(inner)) => inner,
        Some(other) => {
            map.insert(RESPONSE_WRAPPER.to_string(), other);
            map
        }
        None => map,
    }
}

struct Element {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut fields = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| format!("bad attribute on <{}>: {}", name, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            fields.insert(key, coerce(&value));
        }
        Ok(Self {
            name,
            fields,
            text: String::new(),
        })
    }

    fn add_child(&mut self, name: String, value: Value) {
        match self.fields.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.fields.insert(name, value);
            }
        }
    }

    fn finish(self) -> (String, Value) {
        let Element {
            name,
            mut fields,
            text,
        } = self;
        let value = if fields.is_empty() {
            if text.is_empty() {
                Value::Object(Map::new())
            } else {
                coerce(&text)
            }
        } else {
            if !text.is_empty() {
                fields.insert(TEXT_KEY.to_string(), coerce(&text));
            }
            Value::Object(fields)
        };
        (name, value)
    }
}

fn parse_document(text: &str) -> Result<Map<String, Value>, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event() {
            Err(e) => {
                return Err(format!(
                    "XML parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                ensure_single_root(&stack, &root)?;
                stack.push(Element::open(&e)?);
            }
            Ok(Event::Empty(e)) => {
                ensure_single_root(&stack, &root)?;
                let element = Element::open(&e)?;
                close(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "closing tag without an open element".to_string())?;
                close(&mut stack, &mut root, element);
            }
            Ok(Event::Text(e)) => {
                let content = e.unescape().map_err(|e| e.to_string())?;
                push_text(&mut stack, &content)?;
            }
            Ok(Event::CData(e)) => {
                let content = String::from_utf8_lossy(&e.into_inner()).into_owned();
                push_text(&mut stack, &content)?;
            }
            // Declarations, comments, doctypes and processing instructions.
            Ok(_) => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    let (name, value) = root.ok_or_else(|| "no root element".to_string())?;
    let mut map = Map::new();
    map.insert(name, value);
    Ok(map)
}

fn ensure_single_root(stack: &[Element], root: &Option<(String, Value)>) -> Result<(), String> {
    if stack.is_empty() && root.is_some() {
        return Err("more than one root element".to_string());
    }
    Ok(())
}

fn close(stack: &mut [Element], root: &mut Option<(String, Value)>, element: Element) {
    let (name, value) = element.finish();
    match stack.last_mut() {
        Some(parent) => parent.add_child(name, value),
        None => *root = Some((name, value)),
    }
}

fn push_text(stack: &mut [Element], content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(content);
            Ok(())
        }
        None => Err("text outside the root element".to_string()),
    }
}

/// Numeric and boolean looking text becomes a number or bool.
fn coerce(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = text.parse::<i64>() {
        return Value::from(int);
    }
    if let Some(number) = text.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(text: &str) -> Value {
        Value::Object(decode(text).body)
    }

    #[test]
    fn unwraps_response_wrapper() {
        let decoded = decode("<response><test>1</test></response>");
        assert_eq!(decoded.outcome, DecodeOutcome::Parsed);
        assert_eq!(Value::Object(decoded.body), json!({"test": 1}));
    }

    #[test]
    fn keeps_scalar_response_and_other_roots() {
        assert_eq!(body("<response>1</response>"), json!({"response": 1}));
        assert_eq!(
            body("<svg><response></response></svg>"),
            json!({"svg": {"response": {}}})
        );
    }

    #[test]
    fn decode_is_total() {
        let inputs = [
            "",
            "   ",
            "String",
            "null",
            "[\"a\",\"basic\",\"array\"]",
            "{\"a\":\"b\"}",
            "<response><test>1</test>",
            "<a></b>",
            "</a>",
            "<a/><b/>",
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Error</title></head><body>Bad</body></html>",
            "<response><test>1</test></response>",
        ];
        for input in inputs {
            let decoded = decode(input);
            if !decoded.outcome.is_parsed() {
                assert!(decoded.body.is_empty(), "fallback body for {:?}", input);
            }
        }
    }

    #[test]
    fn fallback_reasons_are_distinguished() {
        assert_eq!(decode("").outcome, DecodeOutcome::EmptyInput);
        assert!(matches!(decode("String").outcome, DecodeOutcome::Failed(_)));
        assert!(matches!(decode("<a/><b/>").outcome, DecodeOutcome::Failed(_)));
        assert!(matches!(
            decode("<response><test>1</test>").outcome,
            DecodeOutcome::Failed(_)
        ));
    }

    #[test]
    fn attributes_repeats_and_mixed_text() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <response code="1000">
                <!-- availability -->
                <domain name="a.com" available="true">premium</domain>
                <ns>ns1.a.com</ns>
                <ns>ns2.a.com</ns>
                <ns>ns3.a.com</ns>
                <price>12.99</price>
            </response>"#;
        assert_eq!(
            body(xml),
            json!({
                "code": 1000,
                "domain": {"name": "a.com", "available": true, "$t": "premium"},
                "ns": ["ns1.a.com", "ns2.a.com", "ns3.a.com"],
                "price": 12.99
            })
        );
    }

    #[test]
    fn entities_and_cdata_are_text() {
        assert_eq!(
            body("<response><msg>a &amp; b</msg><raw><![CDATA[<x>]]></raw></response>"),
            json!({"msg": "a & b", "raw": "<x>"})
        );
    }

    #[test]
    fn detects_html_pages() {
        assert!(is_html_document("<!DOCTYPE html><html></html>"));
        assert!(is_html_document("\n  <HTML><body>oops</body></HTML>"));
        assert!(!is_html_document("<response/>"));
        assert!(!is_html_document(""));
    }
}
