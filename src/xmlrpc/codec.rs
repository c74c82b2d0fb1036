// src/xmlrpc/codec.rs

//! XML-RPC request encoding and response decoding
//!
//! Responses are first read into a small element tree with quick-xml and
//! then converted to [`Value`]s. Documents are a few kilobytes at most, so
//! the intermediate tree keeps the decoder simple without a streaming cost.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;

use super::value::{DATETIME_FORMAT, Fields, Value, parse_datetime};
use crate::error::{Error, Result};

/// Encode a `methodCall` document
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param><value>");
        encode_value(&mut out, param);
        out.push_str("</value></param>");
    }
    out.push_str("</params></methodCall>\n");
    out
}

fn encode_value(out: &mut String, value: &Value) {
    match value {
        Value::Int(i) => out.push_str(&format!("<int>{i}</int>")),
        Value::Bool(b) => out.push_str(if *b {
            "<boolean>1</boolean>"
        } else {
            "<boolean>0</boolean>"
        }),
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::Double(d) => out.push_str(&format!("<double>{d}</double>")),
        Value::DateTime(dt) => out.push_str(&format!(
            "<dateTime.iso8601>{}</dateTime.iso8601>",
            dt.format(DATETIME_FORMAT)
        )),
        Value::Base64(bytes) => {
            out.push_str("<base64>");
            out.push_str(&BASE64.encode(bytes));
            out.push_str("</base64>");
        }
        Value::Struct(fields) => {
            out.push_str("<struct>");
            for (name, member) in fields {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name><value>");
                encode_value(out, member);
                out.push_str("</value></member>");
            }
            out.push_str("</struct>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                out.push_str("<value>");
                encode_value(out, item);
                out.push_str("</value>");
            }
            out.push_str("</data></array>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
}

/// Decode a `methodResponse` document
///
/// A `fault` response becomes [`Error::Fault`].
pub fn decode_response(xml: &str) -> Result<Value> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(Error::ParseError(format!(
            "Expected <methodResponse>, found <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let value = decode_value(required(fault, "value")?)?;
        let fields = value
            .as_struct()
            .ok_or_else(|| Error::ParseError("Fault payload is not a struct".to_string()))?;
        return Err(Error::Fault {
            code: fields.get("faultCode").and_then(Value::as_i64).unwrap_or(0),
            message: fields
                .get("faultString")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }

    let params = required(&root, "params")?;
    let param = required(params, "param")?;
    decode_value(required(param, "value")?)
}

/// Element tree node; attributes are not used by XML-RPC
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn required<'a>(node: &'a Node, name: &str) -> Result<&'a Node> {
    node.child(name).ok_or_else(|| {
        Error::ParseError(format!("Missing <{}> inside <{}>", name, node.name))
    })
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => {
            return Err(Error::ParseError(
                "Multiple root elements in XML-RPC response".to_string(),
            ));
        }
    }
    Ok(())
}

fn parse_tree(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Node::new(e.local_name().as_ref())),
            Ok(Event::Empty(e)) => {
                attach(&mut stack, &mut root, Node::new(e.local_name().as_ref()))?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| {
                    Error::ParseError(format!("Invalid text in XML-RPC response: {err}"))
                })?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let node = stack.pop().ok_or_else(|| {
                    Error::ParseError("Unbalanced closing tag in XML-RPC response".to_string())
                })?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::ParseError(format!(
                    "Malformed XML-RPC response at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::ParseError(format!(
            "Unterminated <{}> in XML-RPC response",
            open.name
        )));
    }
    root.ok_or_else(|| Error::ParseError("Empty XML-RPC response".to_string()))
}

fn decode_value(node: &Node) -> Result<Value> {
    // <value>text</value> without a type element is a string
    let Some(typed) = node.children.first() else {
        return Ok(Value::String(node.text.clone()));
    };
    let text = typed.text.trim();

    match typed.name.as_str() {
        "i4" | "int" | "i8" => text
            .parse()
            .map(Value::Int)
            .map_err(|e| Error::ParseError(format!("Invalid integer '{text}': {e}"))),
        "boolean" => match text {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            other => Err(Error::ParseError(format!("Invalid boolean '{other}'"))),
        },
        "string" => Ok(Value::String(typed.text.clone())),
        "double" => text
            .parse()
            .map(Value::Double)
            .map_err(|e| Error::ParseError(format!("Invalid double '{text}': {e}"))),
        "dateTime.iso8601" => parse_datetime(text)
            .map(Value::DateTime)
            .ok_or_else(|| Error::ParseError(format!("Invalid dateTime.iso8601 '{text}'"))),
        "base64" => {
            let compact: String = text.split_whitespace().collect();
            BASE64
                .decode(compact.as_bytes())
                .map(Value::Base64)
                .map_err(|e| Error::ParseError(format!("Invalid base64 payload: {e}")))
        }
        "struct" => {
            let mut fields = Fields::new();
            for member in typed.children_named("member") {
                let name = required(member, "name")?.text.clone();
                let value = decode_value(required(member, "value")?)?;
                fields.insert(name, value);
            }
            Ok(Value::Struct(fields))
        }
        "array" => {
            let data = required(typed, "data")?;
            data.children_named("value")
                .map(decode_value)
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        "nil" => Ok(Value::Nil),
        other => Err(Error::ParseError(format!("Unsupported XML-RPC type <{other}>"))),
    }
}
