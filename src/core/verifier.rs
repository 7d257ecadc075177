use crate::config::ApiCredential;
use crate::utils::error::{MailprobeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// What the provider reports for one address. Parsed leniently: providers
/// add and drop fields without notice, so anything beyond the
/// deliverability flag and score is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderVerdict {
    #[serde(default)]
    pub is_deliverable: Option<bool>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// The external verification capability: one address in, one verdict out.
#[async_trait]
pub trait EmailVerifier: Send + Sync {
    async fn verify(&self, email: &str) -> Result<ProviderVerdict>;
}

/// Drives the apilayer email_verification endpoint: GET {base}/{email}
/// with the key in an `apikey` header.
pub struct ApiLayerVerifier {
    client: Client,
    base_url: Url,
    credential: ApiCredential,
}

impl ApiLayerVerifier {
    pub fn new(base_url: Url, credential: ApiCredential) -> Self {
        Self {
            client: Client::new(),
            base_url,
            credential,
        }
    }

    fn endpoint_for(&self, email: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                MailprobeError::internal(format!(
                    "verifier URL cannot be a base: {}",
                    self.base_url
                ))
            })?
            .push(email);
        Ok(url)
    }
}

#[async_trait]
impl EmailVerifier for ApiLayerVerifier {
    async fn verify(&self, email: &str) -> Result<ProviderVerdict> {
        let key = self.credential.key()?;
        let url = self.endpoint_for(email)?;

        tracing::debug!(%url, "verification request");
        let response = self
            .client
            .get(url)
            .header("apikey", key)
            .send()
            .await
            .map_err(|e| MailprobeError::Transport {
                email: email.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailprobeError::Provider {
                email: email.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<ProviderVerdict>()
            .await
            .map_err(|e| MailprobeError::Transport {
                email: email.to_string(),
                source: e,
            })
    }
}
