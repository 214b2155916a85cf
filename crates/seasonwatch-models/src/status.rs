use serde::{Deserialize, Serialize};
use std::fmt;

/// Announcement state of a tracked season
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Source page still shows generic episode slots (e.g. "Episode #1.1")
    Placeholder,
    /// Real episode titles or concrete release dates are published
    Announced,
    /// Reserved for extraction ambiguity; never produced by the classifier
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Placeholder => "placeholder",
            Status::Announced => "announced",
            Status::Unknown => "unknown",
        }
    }

    pub fn is_announced(&self) -> bool {
        matches!(self, Status::Announced)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_as_lowercase_literal() {
        assert_eq!(serde_json::to_string(&Status::Placeholder).unwrap(), "\"placeholder\"");
        assert_eq!(serde_json::to_string(&Status::Announced).unwrap(), "\"announced\"");
        assert_eq!(serde_json::to_string(&Status::Unknown).unwrap(), "\"unknown\"");
    }

    #[test]
    fn test_unknown_status_survives_deserialization() {
        let status: Status = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(status, Status::Unknown);
        assert!(!status.is_announced());
    }
}
