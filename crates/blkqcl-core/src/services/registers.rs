use crate::encoding::node::Node;
use crate::encoding::tree::Element;
use crate::encoding::writer::Writer;
use crate::services::Repeated;
use crate::{DecodeError, EncodeError, ProtocolVersion};

/// Which FPGA register file a peek or poke addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlUnit {
    Acu,
    Ccu,
}

impl ControlUnit {
    pub const fn peek_command(self) -> &'static str {
        match self {
            Self::Acu => "ACUPeek",
            Self::Ccu => "CCUPeek",
        }
    }

    pub const fn poke_command(self) -> &'static str {
        match self {
            Self::Acu => "ACUPoke",
            Self::Ccu => "CCUPoke",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeekRequest<'a> {
    pub unit: ControlUnit,
    pub register: &'a str,
    pub repeat_count: u32,
}

impl PeekRequest<'_> {
    /// One fragment carrying `RepeatCount`, or on the 2014 schemas a plain
    /// read to be sent once per repeat.
    pub fn encode(&self, version: ProtocolVersion) -> Result<Repeated, EncodeError> {
        validate_register(self.register)?;
        if self.repeat_count == 0 {
            return Err(EncodeError::InvalidArgument(
                "peek repeat count must be at least 1".into(),
            ));
        }
        let command = self.unit.peek_command();
        let mut w = Writer::new();
        w.start(command).text("RegisterName", self.register);
        if version.predates_2015() {
            w.end(command);
            return Ok(Repeated {
                fragment: w.finish(),
                sends: self.repeat_count,
            });
        }
        w.text("RepeatCount", &self.repeat_count.to_string())
            .end(command);
        Ok(Repeated::once(w.finish()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PokeRequest<'a> {
    pub unit: ControlUnit,
    pub register: &'a str,
    pub value: i64,
}

impl PokeRequest<'_> {
    pub fn encode(&self) -> Result<String, EncodeError> {
        validate_register(self.register)?;
        let command = self.unit.poke_command();
        let mut w = Writer::new();
        w.start(command)
            .text("RegisterName", self.register)
            .text("Value", &self.value.to_string())
            .end(command);
        Ok(w.finish())
    }
}

fn validate_register(register: &str) -> Result<(), EncodeError> {
    if register.trim().is_empty() {
        return Err(EncodeError::InvalidArgument("register name is empty".into()));
    }
    Ok(())
}

/// Every `Value` in a peek response, in order.
pub fn decode_peek_values(root: &Element, version: ProtocolVersion) -> Result<Vec<i64>, DecodeError> {
    let values = Node::new(root, version)
        .find_all("Value")
        .map(Node::parse)
        .collect::<Result<Vec<i64>, _>>()?;
    if values.is_empty() {
        return Err(DecodeError::MissingElement("Value"));
    }
    Ok(values)
}
