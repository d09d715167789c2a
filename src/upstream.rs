/**
 * UPSTREAM CLIENT - Accès HTTP à la CMDB (API compatible PuppetDB v3)
 *
 * RÔLE : Émet les requêtes JSON paramétrées vers la CMDB et rend les
 * structures décodées. Un GET par appel, pas de retry : un échec remonte
 * tel quel et sera retenté à la prochaine requête entrante.
 *
 * ENDPOINTS : /v3/nodes (liste des nœuds), /v3/facts (liste des facts).
 */

use crate::models::{Fact, NodeIdentity};
use std::time::Duration;

/// Erreurs possibles lors d'un fetch upstream
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid JSON from upstream: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client sans état entre les appels : uniquement l'URL de base et le
/// client HTTP réutilisable (pool de connexions reqwest).
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    base_url: String,
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// GET {base_url}{path} avec Accept: application/json.
    /// Les paramètres de requête éventuels sont URL-encodés par reqwest.
    pub async fn fetch(
        &self,
        path: &str,
        params: Option<&[(&str, &str)]>,
    ) -> Result<serde_json::Value, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(params) = params {
            request = request.query(params);
        }

        let response = request.send().await?;
        let status = response.status();
        // le corps brut est conservé pour le diagnostic en cas d'échec
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Liste des nœuds connus de la CMDB
    pub async fn nodes(&self) -> Result<Vec<NodeIdentity>, FetchError> {
        let raw = self.fetch("/v3/nodes", None).await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Liste complète des facts (tous hôtes confondus)
    pub async fn facts(&self) -> Result<Vec<Fact>, FetchError> {
        let raw = self.fetch("/v3/facts", None).await?;
        Ok(serde_json::from_value(raw)?)
    }
}
