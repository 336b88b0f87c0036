use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to every ledger record.
///
/// Records carry their id as an opaque string; this type is how ids are
/// minted and how incoming ids are checked for well-formedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Creates a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an id supplied by a caller.
    ///
    /// Returns None when the text is not a well-formed UUID.
    pub fn parse(id: &str) -> Option<Self> {
        Uuid::parse_str(id.trim()).ok().map(Self)
    }

    /// Returns true when `id` is a well-formed identifier.
    pub fn is_well_formed(id: &str) -> bool {
        Self::parse(id).is_some()
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_new_creates_unique_ids() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn parse_accepts_generated_ids() {
        let id = EntityId::new();
        assert_eq!(EntityId::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        assert!(EntityId::parse("").is_none());
        assert!(EntityId::parse("not-a-uuid").is_none());
        assert!(!EntityId::is_well_formed("1234"));
    }

    #[test]
    fn entity_id_serializes_as_plain_string() {
        let id = EntityId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
