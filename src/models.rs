use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identité d'un nœud telle que listée par la CMDB (GET /v3/nodes).
/// Les champs supplémentaires de l'upstream sont ignorés au décodage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub name: String,
}

/// Un fact = triplet (hôte, nom, valeur) listé par la CMDB (GET /v3/facts).
/// La valeur reste du JSON libre (string ou scalaire structuré).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub certname: String,
    pub name: String,
    pub value: serde_json::Value,
}

/// Attributs d'un hôte : nom de fact -> valeur. Un fact absent = clé absente.
/// BTreeMap pour un ordre de sérialisation déterministe.
pub type HostAttributes = BTreeMap<String, serde_json::Value>;

/// Inventaire complet : nom d'hôte -> attributs.
pub type InventorySnapshot = BTreeMap<String, HostAttributes>;
