//! Canonical composite identifier for a lockable logical resource.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Immutable, totally-ordered composite name for a lockable logical resource.
///
/// A key is a `resource_type` plus an ordered sequence of `components`,
/// e.g. `ResourceKey::new("ENTITY", ["100"])`. The canonical string form is
/// `resource_type[:component1[:component2...]]`, with every component
/// percent-encoded (see [`ResourceKey::canonical_string`]); parsing that
/// string always reconstructs an equal key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    resource_type: String,
    components: Vec<String>,
}

/// Errors raised while constructing or parsing a [`ResourceKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceKeyParseError {
    #[error("resource type must not be empty")]
    EmptyResourceType,
    #[error("resource type must not contain ':' (breaks canonical round-trip)")]
    ResourceTypeContainsSeparator,
    #[error("resource key input must not be blank")]
    BlankInput,
    #[error("invalid percent-encoding in resource key component")]
    InvalidPercentEncoding,
    #[error("resource key component is not valid UTF-8 after percent-decoding")]
    InvalidComponentUtf8,
}

impl ResourceKey {
    /// Constructs a key from a resource type and zero or more components.
    /// Each component is rendered via its `Display`/`ToString`
    /// implementation at construction time; the stored sequence is
    /// immutable thereafter.
    ///
    /// Fails with [`ResourceKeyParseError::EmptyResourceType`] when
    /// `resource_type` is empty, and with
    /// [`ResourceKeyParseError::ResourceTypeContainsSeparator`] when it
    /// contains `':'` — the type itself is not percent-encoded in the
    /// canonical form (see [`ResourceKey::canonical_string`]), so a literal
    /// `':'` there would make the round-trip guarantee unsound.
    pub fn new<I, C>(
        resource_type: impl Into<String>,
        components: I,
    ) -> Result<Self, ResourceKeyParseError>
    where
        I: IntoIterator<Item = C>,
        C: ToString,
    {
        let resource_type = resource_type.into();
        if resource_type.is_empty() {
            return Err(ResourceKeyParseError::EmptyResourceType);
        }
        if resource_type.contains(':') {
            return Err(ResourceKeyParseError::ResourceTypeContainsSeparator);
        }
        Ok(Self {
            resource_type,
            components: components.into_iter().map(|c| c.to_string()).collect(),
        })
    }

    /// The resource type, e.g. `"ENTITY"`.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// The ordered component sequence. Read-only: there is no way to mutate
    /// a constructed key's components.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Renders the canonical wire form: `resource_type`, then for each
    /// component `:` followed by the percent-encoded component. A byte is
    /// percent-encoded unless it is an ASCII letter, digit, or one of
    /// `-_.~`; `':'` inside a component always falls into the encoded set.
    pub fn canonical_string(&self) -> String {
        let mut out = String::with_capacity(self.resource_type.len() + self.components.len() * 4);
        out.push_str(&self.resource_type);
        for component in &self.components {
            out.push(':');
            encode_component(component, &mut out);
        }
        out
    }

    /// Parses a canonical string into a key. `None` input yields `Ok(None)`
    /// (the "absent" case); blank/whitespace-only input is rejected.
    /// Surrounding whitespace is trimmed before parsing.
    pub fn parse(s: Option<&str>) -> Result<Option<Self>, ResourceKeyParseError> {
        let Some(s) = s else {
            return Ok(None);
        };
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ResourceKeyParseError::BlankInput);
        }
        let mut parts = trimmed.split(':');
        let resource_type = parts
            .next()
            .expect("str::split always yields at least one item")
            .to_string();
        if resource_type.is_empty() {
            return Err(ResourceKeyParseError::EmptyResourceType);
        }
        let components = parts
            .map(decode_component)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Self {
            resource_type,
            components,
        }))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_string())
    }
}

impl PartialOrd for ResourceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResourceKey {
    /// Lexicographic on `resource_type`, then element-wise on `components`;
    /// a strict-prefix component sequence sorts before the longer one
    /// (`Vec<String>`'s derived `Ord` already has this property).
    fn cmp(&self, other: &Self) -> Ordering {
        self.resource_type
            .cmp(&other.resource_type)
            .then_with(|| self.components.cmp(&other.components))
    }
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

fn encode_component(input: &str, out: &mut String) {
    for byte in input.as_bytes() {
        if is_unreserved(*byte) {
            out.push(*byte as char);
        } else {
            out.push('%');
            out.push_str(&format!("{byte:02X}"));
        }
    }
}

fn decode_component(input: &str) -> Result<String, ResourceKeyParseError> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input
                .get(i + 1..i + 3)
                .ok_or(ResourceKeyParseError::InvalidPercentEncoding)?;
            let value = u8::from_str_radix(hex, 16)
                .map_err(|_| ResourceKeyParseError::InvalidPercentEncoding)?;
            decoded.push(value);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).map_err(|_| ResourceKeyParseError::InvalidComponentUtf8)
}
