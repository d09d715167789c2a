/**
 * INVENTORY AGGREGATOR - Fusion nœuds + facts en inventaire par hôte
 *
 * RÔLE : Compose deux caches upstream (nœuds, facts) et un troisième cache
 * qui enveloppe la fusion elle-même. snapshot() rend l'inventaire complet
 * servi aux clients ; les vérifications de péremption se chaînent : un
 * snapshot périmé relit nœuds et facts, chacun derrière son propre cache.
 *
 * FUSION : une entrée par nœud connu (même sans fact), puis repli des facts
 * dans l'ordre de listing — le fact "hostname" (artefact interne CMDB) est
 * exclu, un hôte vu uniquement côté facts gagne son entrée au premier fact,
 * et un doublon (hôte, nom) garde la dernière valeur listée.
 *
 * ÉCHEC : si l'un des deux fetch échoue, la reconstruction échoue en bloc :
 * aucun snapshot partiel n'est produit ni mis en cache, le précédent bon
 * snapshot reste servi par la politique fail-and-keep du TimedCache.
 */

use crate::cache::TimedCache;
use crate::health::HealthTracker;
use crate::models::{Fact, InventorySnapshot, NodeIdentity};
use crate::upstream::{FetchError, UpstreamClient};
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("node listing unavailable: {0}")]
    Nodes(#[source] FetchError),
    #[error("fact listing unavailable: {0}")]
    Facts(#[source] FetchError),
}

pub struct InventoryAggregator {
    client: UpstreamClient,
    nodes: TimedCache<Vec<NodeIdentity>>,
    facts: TimedCache<Vec<Fact>>,
    merged: TimedCache<InventorySnapshot>,
    tracker: HealthTracker,
}

impl InventoryAggregator {
    /// Le même TTL (config unique du process) s'applique aux trois caches.
    pub fn new(client: UpstreamClient, ttl: Duration, tracker: HealthTracker) -> Self {
        Self {
            client,
            nodes: TimedCache::new(ttl),
            facts: TimedCache::new(ttl),
            merged: TimedCache::new(ttl),
            tracker,
        }
    }

    /// Inventaire fusionné courant ; reconstruit paresseusement si périmé.
    pub async fn snapshot(&self, now: Instant) -> Result<InventorySnapshot, AggregationError> {
        self.merged.get(now, || self.rebuild(now)).await
    }

    /// Âge du snapshot fusionné en secondes (pour /system/health)
    pub async fn snapshot_age(&self, now: Instant) -> Option<u64> {
        self.merged
            .last_refreshed()
            .await
            .map(|at| now.duration_since(at).as_secs())
    }

    async fn rebuild(&self, now: Instant) -> Result<InventorySnapshot, AggregationError> {
        let nodes = self
            .nodes
            .get(now, || self.fetch_nodes())
            .await
            .map_err(AggregationError::Nodes)?;
        let facts = self
            .facts
            .get(now, || self.fetch_facts())
            .await
            .map_err(AggregationError::Facts)?;
        self.tracker.mark_merge_rebuild();
        Ok(merge(&nodes, &facts))
    }

    async fn fetch_nodes(&self) -> Result<Vec<NodeIdentity>, FetchError> {
        self.tracker.mark_node_refresh();
        self.client.nodes().await
    }

    async fn fetch_facts(&self) -> Result<Vec<Fact>, FetchError> {
        self.tracker.mark_fact_refresh();
        self.client.facts().await
    }
}

/// Fusion pure nœuds + facts -> inventaire par hôte.
/// Le "lookup-or-insert-empty" est explicite (pas de map à défaut implicite).
pub fn merge(nodes: &[NodeIdentity], facts: &[Fact]) -> InventorySnapshot {
    let mut snapshot = InventorySnapshot::new();

    // chaque nœud connu a son entrée, même sans aucun fact
    for node in nodes {
        snapshot.entry(node.name.clone()).or_default();
    }

    for fact in facts {
        // artefact interne de la CMDB, jamais exposé
        if fact.name == "hostname" {
            continue;
        }
        let attributes = snapshot.entry(fact.certname.clone()).or_default();
        attributes.insert(fact.name.clone(), fact.value.clone());
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(name: &str) -> NodeIdentity {
        NodeIdentity { name: name.into() }
    }

    fn fact(certname: &str, name: &str, value: serde_json::Value) -> Fact {
        Fact {
            certname: certname.into(),
            name: name.into(),
            value,
        }
    }

    #[test]
    fn test_merge_seeds_every_node() {
        let snapshot = merge(&[node("web1"), node("db1")], &[]);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot["web1"].is_empty());
        assert!(snapshot["db1"].is_empty());
    }

    #[test]
    fn test_merge_keys_are_nodes_union_fact_hosts() {
        let snapshot = merge(
            &[node("web1")],
            &[fact("db1", "role", json!("storage"))],
        );
        let hosts: Vec<_> = snapshot.keys().map(String::as_str).collect();
        assert_eq!(hosts, vec!["db1", "web1"]);
    }

    #[test]
    fn test_merge_excludes_hostname_fact() {
        let snapshot = merge(
            &[node("web1")],
            &[
                fact("web1", "hostname", json!("web1")),
                fact("web1", "role", json!("frontend")),
            ],
        );
        assert!(!snapshot["web1"].contains_key("hostname"));
        assert_eq!(snapshot["web1"]["role"], json!("frontend"));
    }

    #[test]
    fn test_merge_last_write_wins() {
        let snapshot = merge(
            &[],
            &[
                fact("web1", "role", json!("frontend")),
                fact("web1", "role", json!("backend")),
            ],
        );
        assert_eq!(snapshot["web1"]["role"], json!("backend"));
    }

    #[test]
    fn test_merge_keeps_structured_values() {
        let snapshot = merge(
            &[],
            &[fact("web1", "interfaces", json!(["eth0", "lo"]))],
        );
        assert_eq!(snapshot["web1"]["interfaces"], json!(["eth0", "lo"]));
    }

    // scénario de référence : un nœud listé, un hôte vu uniquement en facts
    #[test]
    fn test_merge_reference_scenario() {
        let nodes = vec![node("web1")];
        let facts = vec![
            fact("web1", "hostname", json!("web1")),
            fact("web1", "role", json!("frontend")),
            fact("db1", "role", json!("storage")),
        ];
        let snapshot = merge(&nodes, &facts);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["web1"].len(), 1);
        assert_eq!(snapshot["web1"]["role"], json!("frontend"));
        assert_eq!(snapshot["db1"]["role"], json!("storage"));
    }
}
