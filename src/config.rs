use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BridgeConfig {
    /// Base URL de la CMDB upstream (slash final retiré au chargement)
    pub cmdb_url: String,
    /// Durée de validité du cache, partagée par tous les caches du process
    pub cache_seconds: u64,
    /// Timeout des requêtes upstream (durcissement, absent de la source)
    pub upstream_timeout_seconds: u64,
    /// Adresse d'écoute du serveur HTTP
    pub bind: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            cmdb_url: "http://puppet:8080".into(),
            cache_seconds: 1800,
            upstream_timeout_seconds: 10,
            bind: "0.0.0.0:4567".into(),
        }
    }
}

pub async fn load_config() -> BridgeConfig {
    let path = std::env::var("BRIDGE_CONFIG").unwrap_or_else(|_| "bridge.yaml".into());
    let cfg = if Path::new(&path).exists() {
        let txt = fs::read_to_string(&path).await.unwrap_or_default();
        if txt.trim().is_empty() {
            BridgeConfig::default()
        } else {
            serde_yaml::from_str(&txt).unwrap_or_else(|e| {
                eprintln!("[bridge] config invalide: {e}");
                BridgeConfig::default()
            })
        }
    } else {
        eprintln!("[bridge] pas de bridge.yaml, usage config par défaut");
        BridgeConfig::default()
    };

    // les variables d'environnement priment sur le fichier
    let url = std::env::var("CMDB_URL").ok();
    let secs = std::env::var("CACHE_SECONDS").ok();
    normalize(apply_env(cfg, url, secs))
}

fn apply_env(mut cfg: BridgeConfig, url: Option<String>, secs: Option<String>) -> BridgeConfig {
    if let Some(url) = url {
        if !url.trim().is_empty() {
            cfg.cmdb_url = url;
        }
    }
    if let Some(secs) = secs {
        match secs.parse::<u64>() {
            Ok(v) => cfg.cache_seconds = v,
            Err(_) => eprintln!("[bridge] CACHE_SECONDS invalide: {secs}"),
        }
    }
    cfg
}

/// Protège contre les URL configurées avec un slash final
fn normalize(mut cfg: BridgeConfig) -> BridgeConfig {
    cfg.cmdb_url = cfg.cmdb_url.trim_end_matches('/').to_string();
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.cmdb_url, "http://puppet:8080");
        assert_eq!(cfg.cache_seconds, 1800);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg: BridgeConfig = serde_yaml::from_str("cmdb_url: http://cmdb.local:8080\n").unwrap();
        assert_eq!(cfg.cmdb_url, "http://cmdb.local:8080");
        assert_eq!(cfg.cache_seconds, 1800);
        assert_eq!(cfg.bind, "0.0.0.0:4567");
    }

    #[test]
    fn test_env_overrides_file() {
        let cfg = apply_env(
            BridgeConfig::default(),
            Some("http://other:8080/".into()),
            Some("60".into()),
        );
        let cfg = normalize(cfg);
        assert_eq!(cfg.cmdb_url, "http://other:8080");
        assert_eq!(cfg.cache_seconds, 60);
    }

    #[test]
    fn test_bad_cache_seconds_ignored() {
        let cfg = apply_env(BridgeConfig::default(), None, Some("abc".into()));
        assert_eq!(cfg.cache_seconds, 1800);
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let mut cfg = BridgeConfig::default();
        cfg.cmdb_url = "http://puppet:8080///".into();
        assert_eq!(normalize(cfg).cmdb_url, "http://puppet:8080");
    }
}
