use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::error::BackupError;
use crate::firestore::reference::DocumentReference;
use crate::store::DocumentStore;

use super::envelope::Envelope;
use super::layout::BackupLayout;
use super::stamp::BackupStamp;

/// Fetches `doc_ref` and saves its payload as `<doc path>/<stamp>.json`
/// under the layout root, creating directories as needed. Returns the path
/// written.
///
/// An existing backup with the same stamp is overwritten.
pub async fn import_document<S>(
    store: &mut S,
    layout: &BackupLayout,
    doc_ref: &DocumentReference,
    envelope: Envelope,
    stamp: BackupStamp,
) -> Result<PathBuf, BackupError>
where
    S: DocumentStore + ?Sized,
{
    let body = store
        .get_document(doc_ref)
        .await?
        .ok_or_else(|| BackupError::DocumentNotFound(doc_ref.to_string()))?;
    let payload = envelope.payload_from(doc_ref, body)?;

    let dir = layout.dir_for(doc_ref);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(BackupError::io(&dir))?;

    let path = dir.join(stamp.file_name());
    let contents = render(&payload).map_err(BackupError::json(&path))?;
    tokio::fs::write(&path, contents)
        .await
        .map_err(BackupError::io(&path))?;

    tracing::info!(document = %doc_ref, path = %path.display(), "Saved backup");

    Ok(path)
}

/// Pretty-prints with two-space indentation and keys in sorted order.
/// Non-ASCII text is written as is.
pub fn render(payload: &Value) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(&sort_keys(payload))
}

// `serde_json::Map` only sorts when the `preserve_order` feature is off, which
// any crate in the build can turn on.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::firestore::collection;
    use crate::store::MemoryStore;

    #[test]
    fn renders_sorted_and_indented() {
        let rendered = render(&json!({ "b": { "z": 1, "a": "デッキ" }, "a": [true] })).unwrap();

        assert_eq!(
            String::from_utf8(rendered).unwrap(),
            "{\n  \"a\": [\n    true\n  ],\n  \"b\": {\n    \"a\": \"デッキ\",\n    \"z\": 1\n  }\n}"
        );
    }

    #[tokio::test]
    async fn missing_document_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let layout = BackupLayout::new(root.path());
        let doc_ref = collection("dev").doc("1103");

        let result = import_document(
            &mut MemoryStore::new(),
            &layout,
            &doc_ref,
            Envelope::Bare,
            BackupStamp::now(),
        )
        .await;

        assert!(matches!(result, Err(BackupError::DocumentNotFound(path)) if path == "dev/1103"));
        assert!(!layout.dir_for(&doc_ref).exists());
    }

    #[tokio::test]
    async fn same_minute_overwrites() {
        let root = tempfile::tempdir().unwrap();
        let layout = BackupLayout::new(root.path());
        let doc_ref = collection("dev").doc("1103");
        let stamp: BackupStamp = "202211190947".parse().unwrap();
        let mut store = MemoryStore::new().with_document("dev/1103", json!({ "v": 1 }));

        import_document(&mut store, &layout, &doc_ref, Envelope::Bare, stamp)
            .await
            .unwrap();
        store.set_document(&doc_ref, &json!({ "v": 2 })).await.unwrap();
        let path = import_document(&mut store, &layout, &doc_ref, Envelope::Bare, stamp)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "{\n  \"v\": 2\n}");
    }
}
