use pan_eval::Element;
use serde::Serialize;

/// A finished, validated configuration tree ready for a serializer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub object: String,
    pub root: Element,
}

impl Profile {
    /// The tree as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.root)
    }
}
