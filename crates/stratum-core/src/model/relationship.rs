use std::fmt;

use super::element::{Properties, fold_tag};

/// Kind of a relationship.
///
/// Tags are folded the same way as element tags; the property-style verbs used
/// by model authors (`composedOf`, `realizes`, `flowsTo`, ...) resolve to the
/// matching noun variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    Composition,
    Aggregation,
    Assignment,
    Realization,
    Serving,
    Access,
    Influence,
    Triggering,
    Flow,
    Specialization,
    Association,
    Uses,
    DeployedTo,
    Implements,
    Requires,
    DependsOn,
    /// A tag with no dedicated variant. Always non-empty.
    Other(String),
}

impl RelationshipKind {
    pub fn from_tag(tag: &str) -> Self {
        match fold_tag(tag).as_str() {
            "composition" | "composedof" | "contains" => RelationshipKind::Composition,
            "aggregation" | "aggregates" => RelationshipKind::Aggregation,
            "assignment" | "assignedto" => RelationshipKind::Assignment,
            "realization" | "realizes" => RelationshipKind::Realization,
            "serving" | "serves" => RelationshipKind::Serving,
            "access" | "accesses" => RelationshipKind::Access,
            "influence" | "influences" => RelationshipKind::Influence,
            "triggering" | "triggers" => RelationshipKind::Triggering,
            "flow" | "flowsto" => RelationshipKind::Flow,
            "specialization" | "specializes" => RelationshipKind::Specialization,
            "association" | "associatedwith" => RelationshipKind::Association,
            "uses" => RelationshipKind::Uses,
            "deployedto" => RelationshipKind::DeployedTo,
            "implements" => RelationshipKind::Implements,
            "requires" => RelationshipKind::Requires,
            "dependson" => RelationshipKind::DependsOn,
            _ => RelationshipKind::Other(tag.to_string()),
        }
    }

    /// Canonical tag of this kind. For [`RelationshipKind::Other`] the original tag.
    pub fn tag(&self) -> &str {
        match self {
            RelationshipKind::Composition => "composition",
            RelationshipKind::Aggregation => "aggregation",
            RelationshipKind::Assignment => "assignment",
            RelationshipKind::Realization => "realization",
            RelationshipKind::Serving => "serving",
            RelationshipKind::Access => "access",
            RelationshipKind::Influence => "influence",
            RelationshipKind::Triggering => "triggering",
            RelationshipKind::Flow => "flow",
            RelationshipKind::Specialization => "specialization",
            RelationshipKind::Association => "association",
            RelationshipKind::Uses => "uses",
            RelationshipKind::DeployedTo => "deployed-to",
            RelationshipKind::Implements => "implements",
            RelationshipKind::Requires => "requires",
            RelationshipKind::DependsOn => "depends-on",
            RelationshipKind::Other(tag) => tag,
        }
    }

    /// Kinds treated as parent → child containment unless configured otherwise.
    pub fn default_containment() -> Vec<RelationshipKind> {
        vec![RelationshipKind::Composition, RelationshipKind::Aggregation]
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A directed, typed link between two elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub kind: RelationshipKind,
    pub source_id: String,
    pub target_id: String,
    pub properties: Properties,
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        kind: RelationshipKind,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            source_id: source_id.into(),
            target_id: target_id.into(),
            properties: Properties::new(),
        }
    }

    /// Type tag of the relationship
    pub fn type_tag(&self) -> &str {
        self.kind.tag()
    }

    /// True when source and target are the same element
    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_verbs() {
        assert_eq!(
            RelationshipKind::from_tag("composedOf"),
            RelationshipKind::Composition
        );
        assert_eq!(
            RelationshipKind::from_tag("flows-to"),
            RelationshipKind::Flow
        );
        assert_eq!(
            RelationshipKind::from_tag("deployedTo"),
            RelationshipKind::DeployedTo
        );
    }

    #[test]
    fn test_unknown_kind_keeps_tag() {
        let kind = RelationshipKind::from_tag("mentors");
        assert_eq!(kind, RelationshipKind::Other("mentors".to_string()));
        assert_eq!(kind.tag(), "mentors");
    }

    #[test]
    fn test_self_loop() {
        let rel = Relationship::new("r", RelationshipKind::Uses, "a", "a");
        assert!(rel.is_self_loop());
    }
}
