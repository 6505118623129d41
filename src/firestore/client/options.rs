pub const DEFAULT_HOST_URL: &str = "https://firestore.googleapis.com";

#[derive(Clone, Debug)]
pub struct FirestoreClientOptions {
    pub host_url: String,
}

impl Default for FirestoreClientOptions {
    fn default() -> Self {
        Self {
            host_url: DEFAULT_HOST_URL.to_string(),
        }
    }
}

impl FirestoreClientOptions {
    /// Point the client somewhere else, e.g. a local emulator at
    /// `http://127.0.0.1:8081`.
    pub fn host_url(mut self, host_url: impl Into<String>) -> Self {
        self.host_url = host_url.into();
        self
    }
}
