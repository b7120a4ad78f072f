use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::DriveError;

const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const TOKEN_TTL_SECONDS: u64 = 3600;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The subset of a Google service-account key file this client needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Serialize)]
struct GrantClaims {
    iss: String,
    scope: String,
    aud: String,
    exp: usize,
    iat: usize,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    #[serde(rename = "webViewLink")]
    web_view_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Clone)]
pub struct DriveUpload {
    pub file_id: String,
    pub web_view_link: Option<String>,
    pub folder_id: String,
}

fn folder_query(folder_name: &str) -> String {
    let escaped = folder_name.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name='{}' and mimeType='{}' and trashed=false",
        escaped, FOLDER_MIME_TYPE
    )
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Debug)]
pub struct DriveClient {
    http: reqwest::Client,
    key: ServiceAccountKey,
}

impl DriveClient {
    pub fn from_credentials_file(path: &Path) -> Result<Self, DriveError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DriveError::Credentials(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| DriveError::Credentials(format!("Malformed key file: {}", e)))?;
        Ok(Self {
            http: reqwest::Client::new(),
            key,
        })
    }

    /// Exchanges a signed service-account JWT for a bearer token.
    async fn access_token(&self) -> Result<String, DriveError> {
        let now = now_unix();
        let claims = GrantClaims {
            iss: self.key.client_email.clone(),
            scope: DRIVE_SCOPE.to_string(),
            aud: self.key.token_uri.clone(),
            iat: now as usize,
            exp: (now + TOKEN_TTL_SECONDS) as usize,
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| DriveError::Credentials(format!("Invalid private key: {}", e)))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| DriveError::Auth(format!("Failed to sign grant: {}", e)))?;

        let response: TokenResponse = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DriveError::Auth(e.to_string()))?
            .error_for_status()
            .map_err(|e| DriveError::Auth(e.to_string()))?
            .json()
            .await
            .map_err(|e| DriveError::Auth(e.to_string()))?;

        Ok(response.access_token)
    }

    async fn find_folder(&self, token: &str, folder_name: &str) -> Result<Option<String>, DriveError> {
        let list: FileList = self
            .http
            .get(DRIVE_FILES_URL)
            .query(&[
                ("q", folder_query(folder_name).as_str()),
                ("fields", "files(id, name)"),
            ])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| DriveError::Api(e.to_string()))?
            .error_for_status()
            .map_err(|e| DriveError::Api(e.to_string()))?
            .json()
            .await
            .map_err(|e| DriveError::Api(e.to_string()))?;

        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create_folder(&self, token: &str, folder_name: &str) -> Result<String, DriveError> {
        let metadata = serde_json::json!({
            "name": folder_name,
            "mimeType": FOLDER_MIME_TYPE,
        });
        let created: DriveFile = self
            .http
            .post(DRIVE_FILES_URL)
            .query(&[("fields", "id")])
            .bearer_auth(token)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| DriveError::Api(e.to_string()))?
            .error_for_status()
            .map_err(|e| DriveError::Api(e.to_string()))?
            .json()
            .await
            .map_err(|e| DriveError::Api(e.to_string()))?;

        Ok(created.id)
    }

    pub async fn find_or_create_folder(
        &self,
        token: &str,
        folder_name: &str,
    ) -> Result<String, DriveError> {
        match self.find_folder(token, folder_name).await? {
            Some(id) => Ok(id),
            None => self.create_folder(token, folder_name).await,
        }
    }

    async fn upload_file(
        &self,
        token: &str,
        folder_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DriveFile, DriveError> {
        let metadata = serde_json::json!({
            "name": file_name,
            "parents": [folder_id],
        })
        .to_string();

        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata)
                    .mime_str("application/json")
                    .map_err(|e| DriveError::Api(e.to_string()))?,
            )
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes)
                    .file_name(file_name.to_string())
                    .mime_str("application/octet-stream")
                    .map_err(|e| DriveError::Api(e.to_string()))?,
            );

        self.http
            .post(DRIVE_UPLOAD_URL)
            .query(&[("uploadType", "multipart"), ("fields", "id,webViewLink")])
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DriveError::Api(e.to_string()))?
            .error_for_status()
            .map_err(|e| DriveError::Api(e.to_string()))?
            .json()
            .await
            .map_err(|e| DriveError::Api(e.to_string()))
    }

    /// Uploads FIT bytes into the named folder, creating it on first use.
    pub async fn upload_fit_file(
        &self,
        folder_name: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DriveUpload, DriveError> {
        let token = self.access_token().await?;
        let folder_id = self.find_or_create_folder(&token, folder_name).await?;
        let uploaded = self.upload_file(&token, &folder_id, file_name, bytes).await?;

        Ok(DriveUpload {
            file_id: uploaded.id,
            web_view_link: uploaded.web_view_link,
            folder_id,
        })
    }
}
