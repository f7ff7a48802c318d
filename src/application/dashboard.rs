use std::sync::Arc;

use thiserror::Error;

use crate::application::crops::{CropError, CropService};
use crate::application::farms::{FarmError, FarmService};
use crate::application::producers::{ProducerError, ProducerService};
use crate::cache::{CacheService, create_cache_key, namespaces};
use crate::domain::entities::DashboardStats;

const CACHE_TTL_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Farms(#[from] FarmError),
    #[error(transparent)]
    Producers(#[from] ProducerError),
    #[error(transparent)]
    Crops(#[from] CropError),
}

/// Aggregated statistics built from the individually cached module stats.
#[derive(Clone)]
pub struct DashboardService {
    farms: FarmService,
    producers: ProducerService,
    crops: CropService,
    cache: Arc<CacheService>,
}

impl DashboardService {
    pub fn new(
        farms: FarmService,
        producers: ProducerService,
        crops: CropService,
        cache: Arc<CacheService>,
    ) -> Self {
        Self {
            farms,
            producers,
            crops,
            cache,
        }
    }

    pub async fn stats(&self) -> Result<DashboardStats, DashboardError> {
        let key = create_cache_key(namespaces::DASHBOARD, CACHE_TTL_SECS, "getDashboardStats", &[]);
        self.cache.read_through(&key, || self.compute()).await
    }

    async fn compute(&self) -> Result<DashboardStats, DashboardError> {
        let (total_farms, total_producers, total_hectares, farms_by_state, crop_stats, land_use) =
            tokio::try_join!(
                async { Ok::<_, DashboardError>(self.farms.count().await?) },
                async { Ok::<_, DashboardError>(self.producers.count().await?) },
                async { Ok::<_, DashboardError>(self.farms.total_hectares().await?) },
                async { Ok::<_, DashboardError>(self.farms.farms_by_state().await?) },
                async { Ok::<_, DashboardError>(self.crops.crop_stats().await?) },
                async { Ok::<_, DashboardError>(self.farms.land_use().await?) },
            )?;

        Ok(DashboardStats {
            total_farms,
            total_producers,
            total_hectares,
            farms_by_state,
            crop_stats,
            land_use,
        })
    }
}
