use facetrack_embedding::Embedding;

/// One enrolled person.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityRecord {
    /// Opaque unique identifier, assigned once at enrollment.
    pub id: String,

    /// Human-readable display name. Re-enrollment under the same name
    /// replaces the embedding and keeps the name.
    pub name: String,

    /// Face embedding for this person.
    pub embedding: Embedding,
}

impl IdentityRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            embedding,
        }
    }
}
