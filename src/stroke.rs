// stroke.rs

use std::fmt;

/// Opaque identifier of one stroke, e.g. `KAT` or `RA*PT`.
///
/// The engine only compares identifiers for equality; nothing inside the
/// text is interpreted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrokeId(String);

impl StrokeId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StrokeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StrokeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for StrokeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Converts between the host's stroke representation and [`StrokeId`].
pub trait StrokeCodec {
    type Raw;

    fn decode(&self, raw: &Self::Raw) -> StrokeId;
    fn encode(&self, stroke: &StrokeId) -> anyhow::Result<Self::Raw>;
}

/// Codec for hosts that already speak RTF/CRE steno text.
///
/// Decoding trims surrounding whitespace; encoding refuses identifiers that
/// would not survive being typed back as one stroke.
#[derive(Clone, Copy, Debug, Default)]
pub struct RtfcreCodec;

impl StrokeCodec for RtfcreCodec {
    type Raw = String;

    fn decode(&self, raw: &String) -> StrokeId {
        StrokeId::new(raw.trim())
    }

    fn encode(&self, stroke: &StrokeId) -> anyhow::Result<String> {
        let s = stroke.as_str();
        if s.is_empty() {
            anyhow::bail!("cannot encode an empty stroke");
        }
        if s.chars().any(char::is_whitespace) {
            anyhow::bail!("stroke {:?} contains whitespace", s);
        }
        Ok(s.to_string())
    }
}
