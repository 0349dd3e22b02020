use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::DecodeError;

/// An owned, namespace-resolved XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Parses a complete document and returns its root element.
    pub fn parse(xml: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = NsReader::from_reader(xml);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            let (ns, event) = reader.read_resolved_event_into(&mut buf)?;
            let ns = resolve(ns)?;
            match event {
                Event::Start(start) => stack.push(Element::open(ns, &start)?),
                Event::Empty(start) => {
                    let element = Element::open(ns, &start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| DecodeError::Xml("unbalanced end tag".into()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(core::str::from_utf8(&data)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(DecodeError::UnexpectedEof);
        }
        root.ok_or(DecodeError::EmptyDocument)
    }

    fn open(namespace: Option<String>, start: &BytesStart<'_>) -> Result<Self, DecodeError> {
        let name = core::str::from_utf8(start.local_name().as_ref())?.to_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }
            let key = core::str::from_utf8(attr.key.local_name().as_ref())?.to_owned();
            attributes.push((key, attr.unescape_value()?.into_owned()));
        }
        Ok(Self {
            namespace,
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is(&self, namespace: Option<&str>, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == namespace
    }

    /// Pre-order walk over every element below this one.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    pub fn find(&self, namespace: Option<&str>, name: &str) -> Option<&Element> {
        self.descendants().find(|e| e.is(namespace, name))
    }

    /// First element (this one included) with the given local name, in any namespace.
    pub fn find_local(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.descendants().find(|e| e.name == name)
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

fn resolve(ns: ResolveResult<'_>) -> Result<Option<String>, DecodeError> {
    match ns {
        ResolveResult::Bound(ns) => Ok(Some(core::str::from_utf8(ns.as_ref())?.to_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(DecodeError::Xml(format!(
            "unbound namespace prefix {}",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(DecodeError::Xml("more than one root element".into())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Element;
    use crate::DecodeError;

    const NS: &str = "urn:test";

    #[test]
    fn resolves_namespaces_and_attributes() {
        let doc = br#"<a:Root xmlns:a="urn:test"><a:Item id="1">x &amp; y</a:Item><Plain k='v'/></a:Root>"#;
        let root = Element::parse(doc).unwrap();
        assert!(root.is(Some(NS), "Root"));
        let item = root.find(Some(NS), "Item").unwrap();
        assert_eq!(item.attribute("id"), Some("1"));
        assert_eq!(item.text(), "x & y");
        let plain = root.find(None, "Plain").unwrap();
        assert_eq!(plain.attribute("k"), Some("v"));
        assert!(root.find(None, "Item").is_none());
    }

    #[test]
    fn descendants_are_pre_order() {
        let doc = b"<r><a><b/></a><c/></r>";
        let root = Element::parse(doc).unwrap();
        let names: Vec<_> = root.descendants().map(|e| e.name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn truncated_document_is_rejected() {
        let err = Element::parse(b"<r><a>text</a>").unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedEof);
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        assert!(matches!(
            Element::parse(b"<r><a></b></r>"),
            Err(DecodeError::Xml(_))
        ));
    }

    #[test]
    fn empty_input_has_no_root() {
        assert_eq!(Element::parse(b"").unwrap_err(), DecodeError::EmptyDocument);
        assert_eq!(
            Element::parse(b"  <?xml version=\"1.0\"?>  ").unwrap_err(),
            DecodeError::EmptyDocument
        );
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        assert!(matches!(
            Element::parse(b"<x:r/>"),
            Err(DecodeError::Xml(_))
        ));
    }

    #[test]
    fn find_local_ignores_namespace() {
        let doc = br#"<s:E xmlns:s="urn:soap"><s:Body><timestamp>12.5</timestamp></s:Body></s:E>"#;
        let root = Element::parse(doc).unwrap();
        assert_eq!(root.find_local("timestamp").unwrap().text(), "12.5");
    }
}
