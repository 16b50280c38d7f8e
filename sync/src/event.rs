use serde_json::Value;

use facetrack_embedding::Embedding;
use facetrack_registry::IdentityRecord;

use crate::SyncError;

/// A change notification from the remote store feed.
#[derive(Debug, Clone)]
pub struct RemoteEvent {
    /// Store-assigned sequence number; higher means more recent.
    /// Drives last-writer-wins application in the replica.
    pub seq: u64,

    pub kind: RemoteEventKind,
}

/// What changed in the remote store.
#[derive(Debug, Clone)]
pub enum RemoteEventKind {
    /// A record appeared. Subscribe-time replay of existing state also
    /// arrives as `Added`.
    Added { id: String, payload: Value },

    /// A record's fields changed.
    Changed { id: String, payload: Value },

    /// A record was deleted.
    Removed { id: String },
}

/// Decode a wire payload (`{"name": ..., "embedding": [...]}`) into an
/// identity record.
///
/// Other writers share the store, so payloads are not trusted: a
/// missing or blank name, an embedding that is not a list of numbers,
/// or an invalid vector all return [`SyncError::Malformed`].
pub fn decode_record(id: &str, payload: &Value) -> Result<IdentityRecord, SyncError> {
    let malformed = |reason: String| SyncError::Malformed {
        id: id.to_string(),
        reason,
    };

    let obj = payload
        .as_object()
        .ok_or_else(|| malformed("payload is not an object".into()))?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing name".into()))?;
    if name.trim().is_empty() {
        return Err(malformed("blank name".into()));
    }

    let list = obj
        .get("embedding")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("embedding is not a list".into()))?;

    let mut values = Vec::with_capacity(list.len());
    for v in list {
        let f = v
            .as_f64()
            .ok_or_else(|| malformed("embedding component is not a number".into()))?;
        values.push(f as f32);
    }

    let embedding = Embedding::new(values).map_err(|e| malformed(e.to_string()))?;
    Ok(IdentityRecord::new(id, name, embedding))
}

/// Encode record fields into the wire payload.
pub fn encode_record(name: &str, embedding: &Embedding) -> Value {
    serde_json::json!({
        "name": name,
        "embedding": embedding.as_slice(),
    })
}
