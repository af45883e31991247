// ABOUTME: Capability flags a tool requires and an invocation context provides.
// ABOUTME: Invocation is refused unless the context supersets the tool's needs.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single capability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Access to the canvas through its UI execution context.
    Canvas,
    /// Plain text completion.
    TextCompletion,
    /// Completion constrained to a JSON schema.
    JsonOutput,
    /// Completion that can request tool calls.
    ToolCalling,
    /// Outbound HTTP.
    Network,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Canvas => "canvas",
            Capability::TextCompletion => "text_completion",
            Capability::JsonOutput => "json_output",
            Capability::ToolCalling => "tool_calling",
            Capability::Network => "network",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(BTreeSet<Capability>);

impl Capabilities {
    /// The empty set.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a capability.
    pub fn with(mut self, cap: Capability) -> Self {
        self.0.insert(cap);
        self
    }

    pub fn insert(&mut self, cap: Capability) {
        self.0.insert(cap);
    }

    pub fn contains(&self, cap: Capability) -> bool {
        self.0.contains(&cap)
    }

    /// Capabilities in `required` that this set lacks, in stable order.
    pub fn missing(&self, required: &Capabilities) -> Vec<Capability> {
        required.0.difference(&self.0).copied().collect()
    }

    pub fn is_superset(&self, required: &Capabilities) -> bool {
        self.0.is_superset(&required.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Capability; N]> for Capabilities {
    fn from(caps: [Capability; N]) -> Self {
        caps.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superset() {
        let have = Capabilities::from([Capability::Canvas, Capability::TextCompletion]);
        let need = Capabilities::from([Capability::Canvas]);
        assert!(have.is_superset(&need));
        assert!(have.is_superset(&Capabilities::none()));
    }

    #[test]
    fn test_missing_is_sorted() {
        let have = Capabilities::from([Capability::TextCompletion]);
        let need = Capabilities::from([
            Capability::Network,
            Capability::Canvas,
            Capability::TextCompletion,
        ]);
        assert_eq!(
            have.missing(&need),
            vec![Capability::Canvas, Capability::Network]
        );
    }
}
