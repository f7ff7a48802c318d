use std::sync::Arc;

use crate::application::crops::CropService;
use crate::application::dashboard::DashboardService;
use crate::application::farm_crops::FarmCropService;
use crate::application::farms::FarmService;
use crate::application::harvests::HarvestService;
use crate::application::producers::ProducerService;
use crate::application::repos::{
    CropsRepo, FarmCropsRepo, FarmsRepo, HarvestsRepo, HealthRepo, ProducersRepo,
};
use crate::cache::{CacheService, CacheTrigger};

#[derive(Clone)]
pub struct ApiState {
    pub producers: Arc<ProducerService>,
    pub farms: Arc<FarmService>,
    pub crops: Arc<CropService>,
    pub harvests: Arc<HarvestService>,
    pub farm_crops: Arc<FarmCropService>,
    pub dashboard: Arc<DashboardService>,
    pub cache_trigger: Arc<CacheTrigger>,
    pub health: Arc<dyn HealthRepo>,
}

impl ApiState {
    /// Wire every service over one repository backend.
    pub fn from_repositories<R>(
        repos: Arc<R>,
        cache: Arc<CacheService>,
        cache_trigger: Arc<CacheTrigger>,
    ) -> Self
    where
        R: ProducersRepo
            + FarmsRepo
            + CropsRepo
            + HarvestsRepo
            + FarmCropsRepo
            + HealthRepo
            + 'static,
    {
        let producers = ProducerService::new(repos.clone(), cache.clone());
        let farms = FarmService::new(repos.clone(), repos.clone(), cache.clone());
        let crops = CropService::new(repos.clone(), cache.clone());
        let harvests = HarvestService::new(repos.clone(), cache.clone());
        let farm_crops = FarmCropService::new(
            repos.clone(),
            repos.clone(),
            repos.clone(),
            repos.clone(),
            cache.clone(),
        );
        let dashboard =
            DashboardService::new(farms.clone(), producers.clone(), crops.clone(), cache);

        Self {
            producers: Arc::new(producers),
            farms: Arc::new(farms),
            crops: Arc::new(crops),
            harvests: Arc::new(harvests),
            farm_crops: Arc::new(farm_crops),
            dashboard: Arc::new(dashboard),
            cache_trigger,
            health: repos,
        }
    }
}
