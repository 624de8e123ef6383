//! Typed values and query results exchanged with the transport.

use std::fmt;

use super::oid::Oid;

/// Variable kinds the transport distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    Integer,
    OctetString,
    NoSuchObject,
}

/// Value attached to an OID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i32),
    OctetString(String),
}

impl Value {
    pub fn kind(&self) -> VariableType {
        match self {
            Value::Integer(_) => VariableType::Integer,
            Value::OctetString(_) => VariableType::OctetString,
        }
    }
}

impl fmt::Display for Value {
    /// snmpwalk-style rendering: `INTEGER: 1`, `STRING: "sda"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "INTEGER: {}", v),
            Value::OctetString(s) => write!(f, "STRING: \"{}\"", s),
        }
    }
}

/// One entry of the exposed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    pub oid: Oid,
    pub value: Value,
}

impl VarBind {
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }
}

impl fmt::Display for VarBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Result of a GET or GETNEXT. `NoSuchObject` is an ordinary answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Found(VarBind),
    NoSuchObject,
}

impl Response {
    pub fn kind(&self) -> VariableType {
        match self {
            Response::Found(vb) => vb.value.kind(),
            Response::NoSuchObject => VariableType::NoSuchObject,
        }
    }

    pub fn oid(&self) -> Option<&Oid> {
        match self {
            Response::Found(vb) => Some(&vb.oid),
            Response::NoSuchObject => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Response::Found(vb) => Some(&vb.value),
            Response::NoSuchObject => None,
        }
    }

    pub fn into_varbind(self) -> Option<VarBind> {
        match self {
            Response::Found(vb) => Some(vb),
            Response::NoSuchObject => None,
        }
    }
}

impl From<Option<VarBind>> for Response {
    fn from(vb: Option<VarBind>) -> Self {
        vb.map_or(Response::NoSuchObject, Response::Found)
    }
}
