//! Conversions between [CanonicalRecord]s and the formats the server speaks.
//!
//! OpenNMS accepts users and groups as XML and, when asked with `Accept: application/json`,
//! reports them as JSON. [Serializer] covers the first direction and [parse_observed] the second.

use crate::core::canonical::{CanonicalRecord, FieldSpec, FieldType, FieldValue};
use crate::core::resource::ResourceKind;
use crate::error::{Error, Result};
use crate::store::{Body, Endpoint};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{Map, Value};

/// Writes [CanonicalRecord]s in a format the server accepts.
pub trait Serializer {
    /// The MIME type of the output.
    fn content_type(&self) -> &'static str;

    /// Serializes `record`.
    fn serialize(&self, record: &CanonicalRecord) -> Result<String>;

    /// Serializes `record` and labels it with [Self::content_type].
    fn body(&self, record: &CanonicalRecord) -> Result<Body> {
        Ok(Body {
            content_type: self.content_type(),
            data: self.serialize(record)?,
        })
    }
}

/// Writes records as the XML documents that the v1 REST API expects.
///
/// The root element is named after the record's kind (`<user>` or `<group>`) and has one child
/// element per field, in schema order. List fields become one sibling element per item, and
/// booleans are written as `true` or `false`. Empty text fields are left out, since the server
/// treats a missing field and an empty one alike.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlSerializer;

impl Serializer for XmlSerializer {
    fn content_type(&self) -> &'static str {
        "application/xml"
    }

    fn serialize(&self, record: &CanonicalRecord) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        let root = record.kind().to_string();

        write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write(&mut writer, Event::Start(BytesStart::new(root.as_str())))?;
        for (name, value) in record.fields() {
            match value {
                FieldValue::Text(text) if text.is_empty() => {}
                FieldValue::Text(text) => element(&mut writer, name, text)?,
                FieldValue::Bool(b) => {
                    element(&mut writer, name, if *b { "true" } else { "false" })?
                }
                FieldValue::List(items) => {
                    for item in items {
                        element(&mut writer, name, item)?;
                    }
                }
            }
        }
        write(&mut writer, Event::End(BytesEnd::new(root.as_str())))?;

        String::from_utf8(writer.into_inner()).map_err(|err| Error::Serialization(err.to_string()))
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|err| Error::Serialization(err.to_string()))
}

/// Writes `<name>text</name>`, escaping `text`.
fn element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

/// Parses the JSON body of a `GET` on `endpoint` into a [CanonicalRecord] of `kind`.
///
/// The server's JSON is read leniently, since its rendering varies between versions:
///
/// * Keys that aren't in the kind's schema are ignored, and missing keys take their type's empty
///   value.
/// * A list field may arrive as a single string, which is read as a one-item list.
/// * A boolean may arrive as a JSON boolean or as the string `"true"` or `"false"`.
/// * `null` is the same as a missing key.
///
/// # Errors
///
/// Returns [Error::InvalidResponse] if the body isn't a JSON object or a field has a type that
/// can't be read as its schema type.
pub fn parse_observed(
    kind: ResourceKind,
    endpoint: &Endpoint,
    body: &str,
) -> Result<CanonicalRecord> {
    let invalid = |reason: String| Error::InvalidResponse {
        endpoint: endpoint.to_string(),
        reason,
    };

    let object: Map<String, Value> = match serde_json::from_str(body) {
        Ok(Value::Object(object)) => object,
        Ok(other) => return Err(invalid(format!("expected a JSON object, got {other}"))),
        Err(err) => return Err(invalid(err.to_string())),
    };

    // Convert every field up front so that a bad field fails the whole parse.
    let mut values = Vec::new();
    for spec in crate::core::canonical::schema(kind) {
        let value = match object.get(spec.name) {
            None | Some(Value::Null) => None,
            Some(value) => Some(field_value(spec, value).map_err(invalid)?),
        };
        values.push(value);
    }

    let mut values = values.into_iter();
    Ok(CanonicalRecord::project(kind, |_| values.next().flatten()))
}

/// Reads one JSON value as the type `spec` calls for.
fn field_value(spec: &FieldSpec, value: &Value) -> std::result::Result<FieldValue, String> {
    let mismatch = || format!("field {} has unexpected value {value}", spec.name);
    match (spec.ty, value) {
        (FieldType::Text, Value::String(s)) => Ok(FieldValue::Text(s.clone())),
        (FieldType::Text, Value::Number(n)) => Ok(FieldValue::Text(n.to_string())),
        (FieldType::Bool, Value::Bool(b)) => Ok(FieldValue::Bool(*b)),
        (FieldType::Bool, Value::String(s)) => match s.as_str() {
            "true" => Ok(FieldValue::Bool(true)),
            "false" => Ok(FieldValue::Bool(false)),
            _ => Err(mismatch()),
        },
        (FieldType::List, Value::String(s)) => Ok(FieldValue::List(vec![s.clone()])),
        (FieldType::List, Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(mismatch()),
            })
            .collect::<std::result::Result<_, _>>()
            .map(FieldValue::List),
        _ => Err(mismatch()),
    }
}
