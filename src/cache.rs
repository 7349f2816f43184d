//! In-memory caching using moka
//!
//! Payout saves read every selected member's live config; configs change
//! rarely (an admin editing a member), so a short-TTL cache in front of the
//! band_members table absorbs most of those reads.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::queries;
use crate::models::BandMember;

/// Application cache holding band-member payment configs
#[derive(Clone)]
pub struct AppCache {
    /// Band members (id -> live config row)
    pub members: Cache<Uuid, Arc<BandMember>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Band members: 200 entries, 5 min TTL, 2 min idle. A short TTL
            // bounds how long a config edit can feed stale rates into payout
            // computations.
            members: Cache::builder()
                .max_capacity(200)
                .time_to_live(Duration::from_secs(5 * 60))
                .time_to_idle(Duration::from_secs(2 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            members_size: self.members.entry_count(),
        }
    }

    /// Invalidate a member after their config changes
    pub async fn invalidate_member(&self, band_member_id: Uuid) {
        self.members.invalidate(&band_member_id).await;
        info!("Cache invalidated for band member: {}", band_member_id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub members_size: u64,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes every 5 minutes.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool) {
    // Initial warm-up
    warm_cache(&cache, &db).await;

    // Periodic refresh every 5 minutes
    let mut interval = interval(Duration::from_secs(5 * 60));
    loop {
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

/// Warm the cache with every active band member's config
async fn warm_cache(cache: &AppCache, db: &PgPool) {
    match queries::get_active_band_members(db).await {
        Ok(members) => {
            for member in members {
                cache.members.insert(member.id, Arc::new(member)).await;
            }
        }
        Err(e) => warn!("Failed to warm band member cache: {}", e),
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}
