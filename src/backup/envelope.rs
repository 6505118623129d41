use serde_json::{Map, Value};

use crate::error::BackupError;
use crate::firestore::codec::kind_of;
use crate::firestore::reference::DocumentReference;

const DATA_FIELD: &str = "data";

/// How a backup payload sits inside the remote document.
///
/// Older documents (`1103/decks`, `1103/results`) keep their payload under a
/// single `data` field, newer ones store the payload as the document itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Envelope {
    /// The payload is the document body and must be a JSON object.
    #[default]
    Bare,
    /// The document body is `{"data": <payload>}`.
    Data,
}

impl Envelope {
    /// Turns a backup payload into the body to store at `doc_ref`.
    pub fn body_from(
        self,
        doc_ref: &DocumentReference,
        payload: Value,
    ) -> Result<Value, BackupError> {
        match self {
            Envelope::Bare if payload.is_object() => Ok(payload),
            Envelope::Bare => Err(BackupError::InvalidDocument(format!(
                "{} for '{doc_ref}'",
                kind_of(&payload)
            ))),
            Envelope::Data => {
                let mut body = Map::new();
                body.insert(DATA_FIELD.to_string(), payload);
                Ok(Value::Object(body))
            }
        }
    }

    /// Extracts the backup payload from the body stored at `doc_ref`.
    pub fn payload_from(
        self,
        doc_ref: &DocumentReference,
        body: Value,
    ) -> Result<Value, BackupError> {
        match self {
            Envelope::Bare => Ok(body),
            Envelope::Data => match body {
                Value::Object(mut fields) => {
                    fields
                        .remove(DATA_FIELD)
                        .ok_or_else(|| BackupError::MissingEnvelopeField {
                            document: doc_ref.to_string(),
                            field: DATA_FIELD,
                        })
                }
                _ => Err(BackupError::MissingEnvelopeField {
                    document: doc_ref.to_string(),
                    field: DATA_FIELD,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::firestore::collection;

    #[test]
    fn data_envelope_wraps_any_payload() {
        let doc_ref = collection("1103").doc("results");
        let payload = json!([{ "format": "Single" }]);

        let body = Envelope::Data.body_from(&doc_ref, payload.clone()).unwrap();

        assert_eq!(body, json!({ "data": payload }));
        assert_eq!(Envelope::Data.payload_from(&doc_ref, body).unwrap(), payload);
    }

    #[test]
    fn bare_envelope_needs_an_object() {
        let doc_ref = collection("dev").doc("1103");

        let result = Envelope::Bare.body_from(&doc_ref, json!([1, 2]));

        assert!(matches!(result, Err(BackupError::InvalidDocument(_))));
    }

    #[test]
    fn missing_data_field_is_an_error() {
        let doc_ref = collection("1103").doc("decks");

        let result = Envelope::Data.payload_from(&doc_ref, json!({ "decks": [] }));

        assert!(matches!(
            result,
            Err(BackupError::MissingEnvelopeField { field: "data", .. })
        ));
    }
}
