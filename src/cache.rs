/**
 * TIMED CACHE - Cache générique "valeur + péremption" du bridge
 *
 * RÔLE : Encapsule une valeur reconstructible avec son horodatage de dernier
 * rafraîchissement. À la lecture, si la valeur est absente ou plus vieille que
 * le TTL, le producteur fourni est invoqué de manière synchrone, sinon la
 * valeur en cache est rendue telle quelle.
 *
 * CONCURRENCE : Le mutex async est tenu sur toute la séquence
 * vérification + rafraîchissement : au plus UN producteur en vol par cache,
 * les lecteurs concurrents attendent et reçoivent son résultat. Valeur et
 * horodatage sont remplacés ensemble sous le verrou.
 *
 * ÉCHEC : Si le producteur échoue alors qu'une valeur est déjà en cache, on
 * garde la valeur périmée et on remonte l'erreur (politique fail-and-keep).
 */

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Valeur en cache avec l'instant de son dernier rafraîchissement réussi
#[derive(Debug, Clone)]
pub struct CachedValue<T> {
    pub value: T,
    pub fetched_at: Instant,
}

pub struct TimedCache<T> {
    ttl: Duration,
    slot: Mutex<Option<CachedValue<T>>>,
}

impl<T: Clone> TimedCache<T> {
    /// Le TTL est fixé à la construction (une seule valeur de config
    /// partagée par tous les caches du process).
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Rend la valeur en cache, ou invoque `produce` si elle est absente
    /// ou périmée. `now` est injecté par l'appelant (testabilité).
    pub async fn get<F, Fut, E>(&self, now: Instant, produce: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if now.duration_since(cached.fetched_at) <= self.ttl {
                return Ok(cached.value.clone());
            }
        }

        // échec producteur : le slot n'est pas touché, l'ancienne valeur reste
        let value = produce().await?;
        *slot = Some(CachedValue {
            value: value.clone(),
            fetched_at: now,
        });
        Ok(value)
    }

    /// Instant du dernier rafraîchissement réussi, si le cache est peuplé
    pub async fn last_refreshed(&self) -> Option<Instant> {
        self.slot.lock().await.as_ref().map(|c| c.fetched_at)
    }
}
