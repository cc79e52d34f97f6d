//! # XML-RPC Codec
//!
//! Just enough of XML-RPC for Odoo's `common` and `object` services.
//!
//! ## Wire Shape
//! ```text
//! Request                                  Response
//! ───────                                  ────────
//! <methodCall>                             <methodResponse>
//!   <methodName>execute_kw</methodName>      <params><param>
//!   <params>                                   <value><int>42</int></value>
//!     <param><value>...</value></param>      </param></params>
//!     ...                                  </methodResponse>
//!   </params>
//! </methodCall>                            or <fault><value><struct>
//!                                               faultCode / faultString
//!                                             </struct></value></fault>
//! ```
//!
//! Responses are parsed into a small element tree first, then interpreted.
//! A `<value>` with bare text and no type element is a string.

use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::io::Write;

use crate::error::{ErpError, ErpResult};

// =============================================================================
// Value
// =============================================================================

/// An XML-RPC value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(String),
    Double(f64),
    DateTime(String),
    Base64(String),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    Nil,
}

impl Value {
    /// Builds a struct from `(name, value)` pairs.
    pub fn structure<I, K>(members: I) -> Value
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Struct(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.get(name),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Serializes a `methodCall` document.
pub fn encode_call(method: &str, params: &[Value]) -> ErpResult<String> {
    let mut wr = Writer::new(Vec::new());

    write_call(&mut wr, method, params).map_err(xml_error)?;

    String::from_utf8(wr.into_inner()).map_err(|e| ErpError::Protocol(e.to_string()))
}

fn write_call<W: Write>(
    wr: &mut Writer<W>,
    method: &str,
    params: &[Value],
) -> Result<(), quick_xml::Error> {
    wr.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    wr.write_event(Event::Start(BytesStart::new("methodCall")))?;

    write_text_element(wr, "methodName", method)?;

    wr.write_event(Event::Start(BytesStart::new("params")))?;
    for param in params {
        wr.write_event(Event::Start(BytesStart::new("param")))?;
        write_value(wr, param)?;
        wr.write_event(Event::End(BytesStart::new("param").to_end()))?;
    }
    wr.write_event(Event::End(BytesStart::new("params").to_end()))?;

    wr.write_event(Event::End(BytesStart::new("methodCall").to_end()))?;
    Ok(())
}

fn write_value<W: Write>(wr: &mut Writer<W>, value: &Value) -> Result<(), quick_xml::Error> {
    wr.write_event(Event::Start(BytesStart::new("value")))?;

    match value {
        Value::Int(i) => write_text_element(wr, "int", &i.to_string())?,
        Value::Bool(b) => write_text_element(wr, "boolean", if *b { "1" } else { "0" })?,
        Value::String(s) => write_text_element(wr, "string", s)?,
        Value::Double(d) => write_text_element(wr, "double", &d.to_string())?,
        Value::DateTime(s) => write_text_element(wr, "dateTime.iso8601", s)?,
        Value::Base64(s) => write_text_element(wr, "base64", s)?,
        Value::Nil => {
            wr.write_event(Event::Empty(BytesStart::new("nil")))?;
        }
        Value::Array(items) => {
            wr.write_event(Event::Start(BytesStart::new("array")))?;
            wr.write_event(Event::Start(BytesStart::new("data")))?;
            for item in items {
                write_value(wr, item)?;
            }
            wr.write_event(Event::End(BytesStart::new("data").to_end()))?;
            wr.write_event(Event::End(BytesStart::new("array").to_end()))?;
        }
        Value::Struct(members) => {
            wr.write_event(Event::Start(BytesStart::new("struct")))?;
            for (name, member) in members {
                wr.write_event(Event::Start(BytesStart::new("member")))?;
                write_text_element(wr, "name", name)?;
                write_value(wr, member)?;
                wr.write_event(Event::End(BytesStart::new("member").to_end()))?;
            }
            wr.write_event(Event::End(BytesStart::new("struct").to_end()))?;
        }
    }

    wr.write_event(Event::End(BytesStart::new("value").to_end()))?;
    Ok(())
}

fn write_text_element<W: Write>(
    wr: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    wr.write_event(Event::Start(BytesStart::new(name)))?;
    wr.write_event(Event::Text(BytesText::new(text)))?;
    wr.write_event(Event::End(BytesStart::new(name).to_end()))?;
    Ok(())
}

fn xml_error<E: std::fmt::Display>(e: E) -> ErpError {
    ErpError::Protocol(e.to_string())
}

// =============================================================================
// Decoding
// =============================================================================

#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn named(name: String) -> Self {
        Node {
            name,
            ..Node::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn require(&self, name: &str) -> ErpResult<&Node> {
        self.child(name).ok_or_else(|| {
            ErpError::Protocol(format!("<{}> missing inside <{}>", name, self.name))
        })
    }
}

fn parse_tree(xml: &str) -> ErpResult<Node> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack = vec![Node::named("#document".to_string())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(Node::named(name));
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::named(name));
                }
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(xml_error)?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| ErpError::Protocol("unbalanced document".to_string()))?;
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| ErpError::Protocol("unbalanced document".to_string()))?;
                parent.children.push(node);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error(e)),
        }
    }

    let mut document = match stack.pop() {
        Some(doc) if stack.is_empty() => doc,
        _ => return Err(ErpError::Protocol("unclosed element".to_string())),
    };

    if document.children.is_empty() {
        return Err(ErpError::Protocol("empty response".to_string()));
    }
    Ok(document.children.remove(0))
}

/// Parses a `methodResponse` into its single return value.
///
/// A `<fault>` response becomes [`ErpError::Fault`].
pub fn decode_response(xml: &str) -> ErpResult<Value> {
    let root = parse_tree(xml)?;

    if root.name != "methodResponse" {
        return Err(ErpError::Protocol(format!(
            "expected <methodResponse>, got <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let detail = decode_value(fault.require("value")?)?;
        let code = match detail.member("faultCode") {
            Some(Value::Int(code)) => *code,
            _ => 0,
        };
        let message = detail
            .member("faultString")
            .and_then(Value::as_str)
            .unwrap_or("unknown fault")
            .to_string();
        return Err(ErpError::Fault { code, message });
    }

    let value = root.require("params")?.require("param")?.require("value")?;
    decode_value(value)
}

fn decode_value(node: &Node) -> ErpResult<Value> {
    let typed = match node.children.first() {
        Some(typed) => typed,
        None => return Ok(Value::String(node.text.clone())),
    };

    let text = typed.text.trim();
    match typed.name.as_str() {
        "int" | "i4" | "i8" => text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| ErpError::Protocol(format!("bad int '{}': {}", text, e))),
        "boolean" => match text {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(ErpError::Protocol(format!("bad boolean '{}'", other))),
        },
        "double" => text
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| ErpError::Protocol(format!("bad double '{}': {}", text, e))),
        "string" => Ok(Value::String(typed.text.clone())),
        "dateTime.iso8601" => Ok(Value::DateTime(text.to_string())),
        "base64" => Ok(Value::Base64(text.to_string())),
        "nil" => Ok(Value::Nil),
        "array" => {
            let data = typed.require("data")?;
            data.children
                .iter()
                .filter(|c| c.name == "value")
                .map(decode_value)
                .collect::<ErpResult<Vec<_>>>()
                .map(Value::Array)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member.require("name")?.text.clone();
                let value = decode_value(member.require("value")?)?;
                members.insert(name, value);
            }
            Ok(Value::Struct(members))
        }
        other => Err(ErpError::Protocol(format!("unknown value type <{}>", other))),
    }
}

/// Extracts the method name from a `methodCall` (used by test servers).
pub fn decode_method_name(xml: &str) -> ErpResult<String> {
    let root = parse_tree(xml)?;
    Ok(root.require("methodName")?.text.trim().to_string())
}

/// Decodes the parameters of a `methodCall` (used by test servers).
pub fn decode_call_params(xml: &str) -> ErpResult<Vec<Value>> {
    let root = parse_tree(xml)?;
    match root.child("params") {
        Some(params) => params
            .children
            .iter()
            .filter(|p| p.name == "param")
            .map(|p| decode_value(p.require("value")?))
            .collect(),
        None => Ok(Vec::new()),
    }
}

/// Serializes a successful `methodResponse` (used by test servers).
pub fn encode_response(value: &Value) -> ErpResult<String> {
    let mut wr = Writer::new(Vec::new());

    write_response(&mut wr, "params", |wr| {
        wr.write_event(Event::Start(BytesStart::new("param")))?;
        write_value(wr, value)?;
        wr.write_event(Event::End(BytesStart::new("param").to_end()))?;
        Ok(())
    })
    .map_err(xml_error)?;

    String::from_utf8(wr.into_inner()).map_err(|e| ErpError::Protocol(e.to_string()))
}

/// Serializes a fault `methodResponse` (used by test servers).
pub fn encode_fault(code: i64, message: &str) -> ErpResult<String> {
    let detail = Value::structure([
        ("faultCode", Value::Int(code)),
        ("faultString", Value::from(message)),
    ]);

    let mut wr = Writer::new(Vec::new());

    write_response(&mut wr, "fault", |wr| write_value(wr, &detail)).map_err(xml_error)?;

    String::from_utf8(wr.into_inner()).map_err(|e| ErpError::Protocol(e.to_string()))
}

fn write_response<W, F>(wr: &mut Writer<W>, body: &str, inner: F) -> Result<(), quick_xml::Error>
where
    W: Write,
    F: FnOnce(&mut Writer<W>) -> Result<(), quick_xml::Error>,
{
    wr.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    wr.write_event(Event::Start(BytesStart::new("methodResponse")))?;
    wr.write_event(Event::Start(BytesStart::new(body)))?;
    inner(wr)?;
    wr.write_event(Event::End(BytesStart::new(body).to_end()))?;
    wr.write_event(Event::End(BytesStart::new("methodResponse").to_end()))?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_call_shape() {
        let xml = encode_call(
            "authenticate",
            &[
                Value::from("tienda"),
                Value::from("pos@example.pe"),
                Value::from("s3cr&t"),
                Value::Struct(BTreeMap::new()),
            ],
        )
        .unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\"?><methodCall>"));
        assert!(xml.contains("<methodName>authenticate</methodName>"));
        assert!(xml.contains("<param><value><string>tienda</string></value></param>"));
        assert!(xml.contains("s3cr&amp;t"));
        assert!(xml.contains("<value><struct></struct></value>"));
    }

    #[test]
    fn test_encode_nested_values() {
        let line = Value::Array(vec![
            Value::Int(0),
            Value::Int(0),
            Value::structure([
                ("product_id", Value::Int(43)),
                ("quantity", Value::Int(2)),
                ("price_unit", Value::Double(12.255)),
            ]),
        ]);
        let xml = encode_call("execute_kw", &[line]).unwrap();

        assert!(xml.contains("<array><data><value><int>0</int></value>"));
        assert!(xml.contains("<member><name>price_unit</name><value><double>12.255</double></value></member>"));
        assert!(xml.contains("<name>product_id</name><value><int>43</int></value>"));
    }

    #[test]
    fn test_decode_int_response() {
        let xml = r#"<?xml version='1.0'?>
            <methodResponse>
              <params>
                <param>
                  <value><int>7</int></value>
                </param>
              </params>
            </methodResponse>"#;
        assert_eq!(decode_response(xml).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_decode_false_and_untyped_string() {
        let xml = "<methodResponse><params><param><value><boolean>0</boolean></value></param></params></methodResponse>";
        assert_eq!(decode_response(xml).unwrap(), Value::Bool(false));

        let xml = "<methodResponse><params><param><value>hola &amp; chau</value></param></params></methodResponse>";
        assert_eq!(decode_response(xml).unwrap(), Value::from("hola & chau"));
    }

    #[test]
    fn test_decode_fault() {
        let xml = r#"<?xml version="1.0"?>
            <methodResponse><fault><value><struct>
              <member><name>faultCode</name><value><int>3</int></value></member>
              <member><name>faultString</name><value><string>Access Denied</string></value></member>
            </struct></value></fault></methodResponse>"#;

        match decode_response(xml).unwrap_err() {
            ErpError::Fault { code, message } => {
                assert_eq!(code, 3);
                assert_eq!(message, "Access Denied");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_decode_array_struct_and_nil() {
        let xml = r#"<methodResponse><params><param><value><array><data>
              <value><struct><member><name>id</name><value><i4>5</i4></value></member></struct></value>
              <value><nil/></value>
              <value><double>1.5</double></value>
            </data></array></value></param></params></methodResponse>"#;

        let value = decode_response(xml).unwrap();
        let items = match value {
            Value::Array(items) => items,
            other => panic!("unexpected: {other:?}"),
        };
        assert_eq!(items[0].member("id").and_then(Value::as_i64), Some(5));
        assert_eq!(items[1], Value::Nil);
        assert_eq!(items[2], Value::Double(1.5));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_response("<html><body>502 Bad Gateway</body></html>"),
            Err(ErpError::Protocol(_))
        ));
        assert!(matches!(
            decode_response("<methodResponse><params>"),
            Err(ErpError::Protocol(_))
        ));
        assert!(matches!(decode_response(""), Err(ErpError::Protocol(_))));
    }

    #[test]
    fn test_call_decoding_helpers() {
        let xml = encode_call("execute_kw", &[Value::from("db"), Value::Int(2)]).unwrap();
        assert_eq!(decode_method_name(&xml).unwrap(), "execute_kw");
        assert_eq!(
            decode_call_params(&xml).unwrap(),
            vec![Value::from("db"), Value::Int(2)]
        );

        let ok = encode_response(&Value::Int(99)).unwrap();
        assert_eq!(decode_response(&ok).unwrap(), Value::Int(99));

        let fault = encode_fault(2, "boom").unwrap();
        assert!(matches!(
            decode_response(&fault),
            Err(ErpError::Fault { code: 2, .. })
        ));
    }
}
