//! XML response decoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::types::{Attribute, Item, Page};
use crate::{Error, Result};

/// A decoded XML element: local name, text content, and children.
#[derive(Debug, Default)]
pub(crate) struct XmlNode {
    pub name: String,
    pub text: String,
    base64: bool,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(start: &BytesStart<'_>) -> Self {
        let base64 = start.attributes().flatten().any(|attr| {
            attr.key.local_name().as_ref() == b"encoding" && attr.value.as_ref() == b"base64"
        });

        Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            base64,
            ..Default::default()
        }
    }

    /// Direct children with the given local name.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First element with the given local name, depth first, including `self`.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Text content, decoded when the element is marked `encoding="base64"`.
    pub fn value(&self) -> Result<String> {
        if !self.base64 {
            return Ok(self.text.clone());
        }

        let bytes = STANDARD
            .decode(self.text.trim())
            .map_err(|e| Error::response(format!("invalid base64 in <{}>: {e}", self.name)))?;
        String::from_utf8(bytes)
            .map_err(|e| Error::response(format!("invalid utf-8 in <{}>: {e}", self.name)))
    }

    fn child_value(&self, name: &str) -> Result<Option<String>> {
        self.child(name).map(XmlNode::value).transpose()
    }
}

/// Parses a document into a synthetic root node holding the top-level element.
pub(crate) fn parse(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![XmlNode::default()];

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(XmlNode::from_start(&start)),
            Event::Empty(start) => {
                let node = XmlNode::from_start(&start);
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| Error::response("unbalanced closing tag"))?;
                stack
                    .last_mut()
                    .ok_or_else(|| Error::response("unbalanced closing tag"))?
                    .children
                    .push(node);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(root), true) => Ok(root),
        _ => Err(Error::response("unexpected end of document")),
    }
}

/// Decodes an error envelope. Falls back to a generic service error when the
/// body is not the expected XML.
pub(crate) fn parse_error(status: u16, body: &str) -> Error {
    let decoded = parse(body).ok().and_then(|root| {
        let error = root.find("Error")?;
        let code = error.child("Code").map(|n| n.text.clone())?;
        let message = error
            .child("Message")
            .map(|n| n.text.clone())
            .unwrap_or_default();
        let request_id = root
            .find("RequestID")
            .or_else(|| root.find("RequestId"))
            .map(|n| n.text.clone());
        Some((code, message, request_id))
    });

    match decoded {
        Some((code, message, request_id)) => {
            Error::service(code, message).with_wire_context(status, request_id)
        }
        None => {
            let snippet: String = body.chars().take(256).collect();
            Error::service("HttpError", format!("HTTP {status}: {snippet}"))
                .with_wire_context(status, None)
        }
    }
}

/// Decodes a `ListDomains` response.
pub(crate) fn parse_domains(root: &XmlNode) -> Result<Page<String>> {
    let result = root
        .find("ListDomainsResult")
        .ok_or_else(|| Error::response("missing ListDomainsResult"))?;

    let domains = result
        .children("DomainName")
        .map(XmlNode::value)
        .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(domains, result.child_value("NextToken")?))
}

/// Decodes a `GetAttributes` response for `item`.
pub(crate) fn parse_attributes(item: &str, root: &XmlNode) -> Result<Vec<Attribute>> {
    let result = root
        .find("GetAttributesResult")
        .ok_or_else(|| Error::response("missing GetAttributesResult"))?;

    group_attributes(item, result)
}

/// Decodes a `Select` response.
pub(crate) fn parse_select(root: &XmlNode) -> Result<Page<Item>> {
    let result = root
        .find("SelectResult")
        .ok_or_else(|| Error::response("missing SelectResult"))?;

    let items = result
        .children("Item")
        .map(|node| {
            let name = node
                .child_value("Name")?
                .ok_or_else(|| Error::response("item without a name"))?;
            let attributes = group_attributes(&name, node)?;
            Ok(Item::new(name, attributes))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(items, result.child_value("NextToken")?))
}

/// The wire format repeats `<Attribute>` once per value; fold those back into
/// one attribute per name, keeping first-seen order.
fn group_attributes(item: &str, parent: &XmlNode) -> Result<Vec<Attribute>> {
    let mut attributes: Vec<Attribute> = Vec::new();

    for node in parent.children("Attribute") {
        let name = node
            .child_value("Name")?
            .ok_or_else(|| Error::response("attribute without a name"))?;
        let value = node.child_value("Value")?.unwrap_or_default();

        match attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.values.push(value),
            None => attributes.push(Attribute::new(item, name, [value])),
        }
    }

    Ok(attributes)
}
