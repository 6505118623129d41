use std::sync::Arc;

use crate::error::BackupError;

/// Shorthand for [`CollectionReference::new`].
pub fn collection(name: impl Into<String>) -> CollectionReference {
    CollectionReference::new(name)
}

/// A path to a single document, e.g. `dev/1103` or
/// `tales/alice/in/wonderland`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReference(Arc<DocumentReferenceInner>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReference(Arc<CollectionReferenceInner>);

#[derive(Debug, Clone, PartialEq, Eq)]
struct CollectionReferenceInner {
    parent: Option<DocumentReference>,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DocumentReferenceInner {
    parent: CollectionReference,
    id: String,
}

impl CollectionReference {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self(Arc::new(CollectionReferenceInner {
            parent: None,
            name: collection_name.into(),
        }))
    }

    pub fn doc(&self, id: impl Into<String>) -> DocumentReference {
        DocumentReference(Arc::new(DocumentReferenceInner {
            parent: self.clone(),
            id: id.into(),
        }))
    }

    pub fn parent(&self) -> Option<DocumentReference> {
        self.0.parent.clone()
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }
}

impl DocumentReference {
    pub fn collection(&self, name: impl Into<String>) -> CollectionReference {
        CollectionReference(Arc::new(CollectionReferenceInner {
            parent: Some(self.clone()),
            name: name.into(),
        }))
    }

    pub fn parent(&self) -> CollectionReference {
        self.0.parent.clone()
    }

    pub fn id(&self) -> &str {
        &self.0.id
    }

    /// The path segments from the root collection down to this document's ID.
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = vec![self.id(), self.0.parent.name()];
        let mut current = &self.0.parent.0.parent;
        while let Some(doc) = current {
            segments.push(doc.id());
            segments.push(doc.0.parent.name());
            current = &doc.0.parent.0.parent;
        }
        segments.reverse();
        segments
    }
}

impl TryFrom<&str> for DocumentReference {
    type Error = BackupError;

    /// Parses a slash-separated document path. Leading and trailing slashes
    /// are tolerated, empty segments in between are not, and neither are
    /// `.` or `..` since paths also name backup directories.
    fn try_from(path: &str) -> Result<Self, Self::Error> {
        let invalid = || BackupError::InvalidPath(path.to_string());

        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        if segments.len() % 2 != 0
            || segments
                .iter()
                .any(|s| s.is_empty() || *s == "." || *s == "..")
        {
            return Err(invalid());
        }

        let mut pairs = segments.chunks_exact(2);
        let first = pairs.next().ok_or_else(invalid)?;
        let mut doc_ref = collection(first[0]).doc(first[1]);
        for pair in pairs {
            doc_ref = doc_ref.collection(pair[0]).doc(pair[1]);
        }

        Ok(doc_ref)
    }
}

impl std::str::FromStr for DocumentReference {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentReference::try_from(s)
    }
}

impl std::fmt::Display for CollectionReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0.parent {
            Some(doc) => write!(f, "{}/{}", doc, self.0.name),
            None => write!(f, "{}", self.0.name),
        }
    }
}

impl std::fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.0.parent, self.0.id)
    }
}
