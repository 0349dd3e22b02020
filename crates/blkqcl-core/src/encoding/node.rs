use core::str::FromStr;

use crate::encoding::format::parse_boolean;
use crate::encoding::tree::Element;
use crate::value::{Bounds, CommandResult, Pid, Value};
use crate::{DecodeError, ProtocolVersion};

/// An element viewed through the namespace of one schema revision. All name
/// lookups match that namespace only.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    element: &'a Element,
    ns: &'static str,
}

impl<'a> Node<'a> {
    pub fn new(element: &'a Element, version: ProtocolVersion) -> Self {
        Self {
            element,
            ns: version.namespace(),
        }
    }

    pub fn element(self) -> &'a Element {
        self.element
    }

    pub fn name(self) -> &'a str {
        self.element.name()
    }

    pub fn text(self) -> &'a str {
        self.element.text()
    }

    fn wrap(self, element: &'a Element) -> Self {
        Self {
            element,
            ns: self.ns,
        }
    }

    /// First descendant with the given name.
    pub fn find(self, name: &str) -> Option<Node<'a>> {
        self.element
            .find(Some(self.ns), name)
            .map(|e| self.wrap(e))
    }

    pub fn require(self, name: &'static str) -> Result<Node<'a>, DecodeError> {
        self.find(name).ok_or(DecodeError::MissingElement(name))
    }

    /// Every descendant with the given name, in document order.
    pub fn find_all<'n>(self, name: &'n str) -> impl Iterator<Item = Node<'a>> + 'n
    where
        'a: 'n,
    {
        let ns = self.ns;
        self.element
            .descendants()
            .filter(move |e| e.is(Some(ns), name))
            .map(move |e| Node { element: e, ns })
    }

    /// Direct children with the given name.
    pub fn children<'n>(self, name: &'n str) -> impl Iterator<Item = Node<'a>> + 'n
    where
        'a: 'n,
    {
        let ns = self.ns;
        self.element
            .children()
            .iter()
            .filter(move |e| e.is(Some(ns), name))
            .map(move |e| Node { element: e, ns })
    }

    pub fn child(self, name: &str) -> Option<Node<'a>> {
        self.children(name).next()
    }

    /// First descendant `name` whose attribute `attr` equals `value`.
    pub fn find_with(self, name: &str, attr: &str, value: &str) -> Option<Node<'a>> {
        self.find_all(name)
            .find(|n| n.element.attribute(attr) == Some(value))
    }

    pub fn attribute(self, name: &'static str) -> Result<&'a str, DecodeError> {
        self.element
            .attribute(name)
            .ok_or_else(|| DecodeError::MissingAttribute {
                element: self.name().to_owned(),
                attribute: name,
            })
    }

    pub fn parse<T: FromStr>(self) -> Result<T, DecodeError> {
        parse_text(self.name(), self.text())
    }

    pub fn parse_attribute<T: FromStr>(self, name: &'static str) -> Result<T, DecodeError> {
        parse_text(name, self.attribute(name)?)
    }

    pub fn int(self) -> Result<Value, DecodeError> {
        self.parse().map(Value::Int)
    }

    pub fn float(self) -> Result<Value, DecodeError> {
        self.parse().map(Value::Float)
    }

    pub fn boolean(self) -> Result<Value, DecodeError> {
        Ok(Value::Bool(parse_boolean(self.text())))
    }

    pub fn string(self) -> Result<Value, DecodeError> {
        Ok(Value::Text(self.text().to_owned()))
    }

    pub fn float_range(self) -> Result<Value, DecodeError> {
        self.range(|n, attr| n.parse_attribute(attr).map(Value::Float))
    }

    pub fn int_range(self) -> Result<Value, DecodeError> {
        self.range(|n, attr| n.parse_attribute(attr).map(Value::Int))
    }

    pub fn text_range(self) -> Result<Value, DecodeError> {
        self.range(|n, attr| n.attribute(attr).map(|s| Value::Text(s.to_owned())))
    }

    fn range(
        self,
        bound: impl Fn(Self, &'static str) -> Result<Value, DecodeError>,
    ) -> Result<Value, DecodeError> {
        Ok(Value::Range(Box::new(Bounds {
            lower: bound(self, "lowerBound")?,
            upper: bound(self, "upperBound")?,
        })))
    }

    /// `P`, `I` and `D` direct children, all required.
    pub fn pid(self) -> Result<Value, DecodeError> {
        let gain = |name: &'static str| {
            self.child(name)
                .ok_or(DecodeError::MissingElement(name))?
                .parse::<i64>()
        };
        Ok(Value::Pid(Pid {
            p: gain("P")?,
            i: gain("I")?,
            d: gain("D")?,
        }))
    }
}

fn parse_text<T: FromStr>(field: &str, text: &str) -> Result<T, DecodeError> {
    text.trim()
        .parse()
        .map_err(|_| DecodeError::invalid(field, text))
}

/// Decodes `node` into `out[key]` when the element is present.
pub fn insert_if<'a>(
    out: &mut CommandResult,
    key: &str,
    node: Option<Node<'a>>,
    decode: impl FnOnce(Node<'a>) -> Result<Value, DecodeError>,
) -> Result<(), DecodeError> {
    if let Some(node) = node {
        out.insert(key, decode(node)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{insert_if, Node};
    use crate::encoding::tree::Element;
    use crate::{CommandResult, DecodeError, ProtocolVersion, Value};

    fn doc(body: &str) -> Element {
        let ns = ProtocolVersion::V2016_05.namespace();
        Element::parse(format!("<blk:R xmlns:blk=\"{ns}\">{body}</blk:R>").as_bytes()).unwrap()
    }

    #[test]
    fn lookups_are_namespace_bound() {
        let root = doc("<blk:A>1</blk:A><A>2</A>");
        let node = Node::new(&root, ProtocolVersion::V2016_05);
        assert_eq!(node.find("A").unwrap().text(), "1");
        assert_eq!(node.find_all("A").count(), 1);
        let other = Node::new(&root, ProtocolVersion::V2017_04);
        assert!(other.find("A").is_none());
    }

    #[test]
    fn coercions() {
        let root = doc(
            "<blk:I> 42 </blk:I><blk:F>1.5</blk:F><blk:B>false</blk:B>\
             <blk:R lowerBound=\"1\" upperBound=\"2.5\"/>\
             <blk:Pid><blk:P>1</blk:P><blk:I>2</blk:I><blk:D>3</blk:D></blk:Pid>",
        );
        let node = Node::new(&root, ProtocolVersion::V2016_05);
        assert_eq!(node.find("I").unwrap().int().unwrap(), Value::Int(42));
        assert_eq!(node.find("F").unwrap().float().unwrap(), Value::Float(1.5));
        assert_eq!(node.find("B").unwrap().boolean().unwrap(), Value::Bool(false));
        let range = node.find("R").unwrap().float_range().unwrap();
        let bounds = range.as_range().unwrap();
        assert_eq!(bounds.lower, Value::Float(1.0));
        assert_eq!(bounds.upper, Value::Float(2.5));
        let pid = node.find("Pid").unwrap().pid().unwrap();
        assert_eq!(pid.as_pid().map(|p| (p.p, p.i, p.d)), Some((1, 2, 3)));
    }

    #[test]
    fn bad_numbers_are_decode_errors() {
        let root = doc("<blk:I>abc</blk:I>");
        let node = Node::new(&root, ProtocolVersion::V2016_05);
        assert!(matches!(
            node.find("I").unwrap().int(),
            Err(DecodeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn absent_elements_leave_keys_absent() {
        let root = doc("<blk:A>1</blk:A>");
        let node = Node::new(&root, ProtocolVersion::V2016_05);
        let mut out = CommandResult::new();
        insert_if(&mut out, "A", node.find("A"), Node::int).unwrap();
        insert_if(&mut out, "B", node.find("B"), Node::int).unwrap();
        assert_eq!(out.get("A"), Some(&Value::Int(1)));
        assert!(!out.contains_key("B"));
    }
}
