use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Opaque session identifier assigned by the remote session ledger.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a unit of educational content.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgePointId(pub String);

impl Display for KnowledgePointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bearer credential for the remote session ledger.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Credential(pub String);

// No Display and a redacted Debug so tokens never end up in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(..)")
    }
}
