use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// An argument failed local validation before anything was sent.
    InvalidArgument(String),
    /// A settings field did not hold the value shape its element needs.
    InvalidField { field: String, expected: &'static str },
    /// The request cannot be expressed in the bound schema revision.
    Unsupported {
        operation: &'static str,
        version: &'static str,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::InvalidField { field, expected } => {
                write!(f, "field {field} must hold {expected}")
            }
            Self::Unsupported { operation, version } => {
                write!(f, "{operation} is not supported by schema {version}")
            }
        }
    }
}

impl std::error::Error for EncodeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The document is not well-formed XML.
    Xml(String),
    /// The document ended before its root element was closed.
    UnexpectedEof,
    /// The document has no root element.
    EmptyDocument,
    MissingElement(&'static str),
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
    InvalidValue {
        field: String,
        value: String,
    },
}

impl DecodeError {
    pub(crate) fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml(msg) => write!(f, "malformed xml: {msg}"),
            Self::UnexpectedEof => f.write_str("unexpected end of document"),
            Self::EmptyDocument => f.write_str("document has no root element"),
            Self::MissingElement(name) => write!(f, "missing element {name}"),
            Self::MissingAttribute { element, attribute } => {
                write!(f, "element {element} has no {attribute} attribute")
            }
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value {value:?} for {field}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<quick_xml::Error> for DecodeError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DecodeError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<core::str::Utf8Error> for DecodeError {
    fn from(err: core::str::Utf8Error) -> Self {
        Self::Xml(err.to_string())
    }
}
