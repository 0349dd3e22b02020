//! Request encoders and response decoders, one module per command family.
//!
//! Encoders produce `blk:`-prefixed fragments ready for
//! [`envelope::wrap`](crate::envelope::wrap). Decoders take the parsed
//! response document and the schema revision it was requested in.

pub mod configuration;
pub mod device_management;
pub mod laser_operation;
pub mod registers;
pub mod scan;
pub mod sensors;

use crate::encoding::format;
use crate::encoding::writer::Writer;
use crate::{EncodeError, Value};

/// One request fragment sent `sends` times back to back.
///
/// The 2014 schemas have no server-side repeat, so a repeated command becomes
/// the same plain request issued once per repeat. Newer schemas put the count
/// in the fragment itself and `sends` is 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeated {
    pub fragment: String,
    pub sends: u32,
}

impl Repeated {
    pub fn once(fragment: String) -> Self {
        Self { fragment, sends: 1 }
    }
}

/// `<blk:Name/>` for commands without arguments.
pub fn bare_command(name: &str) -> String {
    let mut w = Writer::new();
    w.empty(name);
    w.finish()
}

pub(crate) fn scalar_text(field: &str, value: &Value) -> Result<String, EncodeError> {
    match value {
        Value::Bool(v) => Ok(format::boolean(*v).to_owned()),
        Value::Int(v) => Ok(v.to_string()),
        Value::Float(v) => Ok(format::float(*v)),
        Value::Text(v) => Ok(v.clone()),
        _ => Err(EncodeError::InvalidField {
            field: field.to_owned(),
            expected: "a scalar",
        }),
    }
}
