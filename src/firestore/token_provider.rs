use anyhow::Context;
use jsonwebtoken::{get_current_timestamp, Algorithm, EncodingKey, Header};
use serde::Serialize;

use crate::{error::BackupError, ServiceAccount};

/// Firestore accepts self-signed JWTs for this audience in place of an OAuth
/// access token.
const AUDIENCE: &str = "https://firestore.googleapis.com/";

/// Google rejects tokens that live longer than an hour.
const TOKEN_LIFETIME_SECS: u64 = 60 * 60;

/// A cached token is replaced this long before it actually expires.
const REFRESH_MARGIN_SECS: u64 = 5 * 60;

/// Signs bearer tokens for Firestore requests with the service account's
/// private key, reusing the last token until it is close to expiring.
#[derive(Clone)]
pub struct FirestoreTokenProvider {
    service_account: ServiceAccount,
    cached: Option<SignedToken>,
}

#[derive(Clone)]
struct SignedToken {
    jwt: String,
    /// Seconds since the UNIX epoch after which the token must not be reused.
    refresh_after: u64,
}

impl SignedToken {
    fn is_fresh(&self, now: u64) -> bool {
        self.refresh_after > now
    }
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
    uid: &'a str,
}

impl FirestoreTokenProvider {
    pub fn new(service_account: ServiceAccount) -> Self {
        Self {
            service_account,
            cached: None,
        }
    }

    pub fn get_token(&mut self) -> Result<String, BackupError> {
        let now = get_current_timestamp();

        if let Some(token) = self.cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.jwt.clone());
        }

        tracing::debug!(
            client_email = %self.service_account.client_email,
            "Signing a new Firestore access token"
        );
        let token = sign_token(&self.service_account, now)?;
        let jwt = token.jwt.clone();
        self.cached = Some(token);

        Ok(jwt)
    }
}

fn sign_token(service_account: &ServiceAccount, now: u64) -> Result<SignedToken, anyhow::Error> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(service_account.private_key_id.clone());

    let claims = JwtClaims {
        iss: &service_account.client_email,
        sub: &service_account.client_email,
        aud: AUDIENCE,
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
        uid: &service_account.client_id,
    };

    let key = EncodingKey::from_rsa_pem(service_account.private_key.as_bytes())
        .context("The service account's private key is not a valid RSA key")?;
    let jwt = jsonwebtoken::encode(&header, &claims, &key).context("Failed to sign JWT")?;

    Ok(SignedToken {
        jwt,
        refresh_after: claims.exp - REFRESH_MARGIN_SECS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Throwaway key generated for these tests only.
    const TEST_KEY: &str = include_str!("../../tests/fixtures/test-key.pem");

    fn service_account(private_key: &str) -> ServiceAccount {
        ServiceAccount {
            project_id: "awa-log-test".to_string(),
            private_key: private_key.to_string(),
            private_key_id: "test-key-id".to_string(),
            client_email: "backup@awa-log-test.iam.gserviceaccount.com".to_string(),
            client_id: "42".to_string(),
        }
    }

    #[test]
    fn reuses_token_until_refresh_margin() {
        let mut provider = FirestoreTokenProvider::new(service_account(TEST_KEY));

        let first = provider.get_token().unwrap();

        // Tokens issued in the same second are identical, so wait a bit to be
        // able to tell a regenerated token apart.
        std::thread::sleep(std::time::Duration::from_secs(1));

        // 50 minutes in, still fresh.
        provider.cached.as_mut().unwrap().refresh_after -= 50 * 60;
        assert_eq!(provider.get_token().unwrap(), first);

        // Another 10 minutes and it is inside the refresh margin.
        provider.cached.as_mut().unwrap().refresh_after -= 10 * 60;
        assert_ne!(provider.get_token().unwrap(), first);
    }

    #[test]
    fn token_carries_key_id() {
        let mut provider = FirestoreTokenProvider::new(service_account(TEST_KEY));

        let jwt = provider.get_token().unwrap();
        let header = jsonwebtoken::decode_header(&jwt).unwrap();

        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("test-key-id"));
    }

    #[test]
    fn invalid_private_key_is_an_error() {
        let mut provider = FirestoreTokenProvider::new(service_account("not a key"));

        assert!(matches!(provider.get_token(), Err(BackupError::Other(_))));
    }
}
