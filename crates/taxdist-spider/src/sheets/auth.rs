use crate::http::{var, HttpClient};
use crate::{Error, Result};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, trace};

/// Read and write access to spreadsheets.
pub const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for the signed assertion; Google caps it at an hour.
const ASSERTION_SECS: i64 = 3600;

/// The fields of a Google service account key file that token exchange needs.
///
/// Parsed as JSON; unknown fields are ignored.
#[derive(Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// A bearer token issued for [`SCOPE`].
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl ServiceAccount {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        crate::fs::read_json(path).await
    }

    /// `GOOGLE_SERVICE_ACCOUNT_JSON` holds the key itself;
    /// `GOOGLE_SERVICE_ACCOUNT_FILE` names a key file and is used when the
    /// former is unset.
    pub async fn from_env() -> Result<Self> {
        if let Ok(json) = var("GOOGLE_SERVICE_ACCOUNT_JSON") {
            trace!("reading service account from GOOGLE_SERVICE_ACCOUNT_JSON");
            return Self::from_json(&json);
        }

        let path = var("GOOGLE_SERVICE_ACCOUNT_FILE").map_err(|source| {
            error!("no service account; set GOOGLE_SERVICE_ACCOUNT_JSON or GOOGLE_SERVICE_ACCOUNT_FILE");
            Error::Env {
                name: "GOOGLE_SERVICE_ACCOUNT_JSON",
                source,
            }
        })?;
        trace!("reading service account from {path}");
        Self::from_file(Path::new(&path)).await
    }

    /// Signed JWT asserting this account's identity, issued at `now`.
    pub fn assertion(&self, now: i64) -> Result<String> {
        let claims = Claims {
            iss: &self.client_email,
            scope: SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;

        Ok(jsonwebtoken::encode(&header, &claims, &key)?)
    }

    /// Exchange a fresh assertion for an access token.
    pub async fn access_token(&self, client: &HttpClient) -> Result<AccessToken> {
        let assertion = self.assertion(chrono::Utc::now().timestamp())?;

        let response = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|err| {
                error!("failed to reach {}, error({err})", self.token_uri);
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("token exchange for {} refused: {status}", self.client_email);
            return Err(Error::Sheets { status, body });
        }

        let token: AccessToken = response.json().await?;
        debug!(
            "access token issued for {}, expires in {:?}s",
            self.client_email, token.expires_in
        );
        Ok(token)
    }
}
