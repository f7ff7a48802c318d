//! Demo data for local environments.
//!
//! Records go through the module services, so every seeded row satisfies the
//! same rules as API writes. Planting amounts are derived from the record
//! positions, which keeps repeated seeds identical.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use time::macros::datetime;
use tracing::{info, warn};

use crate::application::crops::{CreateCropCommand, CropError, CropService};
use crate::application::farm_crops::{CreateFarmCropCommand, FarmCropError, FarmCropService};
use crate::application::farms::{CreateFarmCommand, FarmError, FarmService};
use crate::application::harvests::{CreateHarvestCommand, HarvestError, HarvestService};
use crate::application::producers::{CreateProducerCommand, ProducerError, ProducerService};
use crate::application::repos::{RepoError, SeedRepo};
use crate::domain::entities::{CropRecord, FarmRecord, HarvestRecord, ProducerRecord};
use crate::domain::farms::round2;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("database already holds data; pass --force to replace it")]
    NotEmpty,
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("seeding producers failed: {0}")]
    Producer(#[from] ProducerError),
    #[error("seeding farms failed: {0}")]
    Farm(#[from] FarmError),
    #[error("seeding crops failed: {0}")]
    Crop(#[from] CropError),
    #[error("seeding harvests failed: {0}")]
    Harvest(#[from] HarvestError),
    #[error("seeding plantings failed: {0}")]
    FarmCrop(#[from] FarmCropError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub producers: usize,
    pub farms: usize,
    pub crops: usize,
    pub harvests: usize,
    pub plantings: usize,
}

const PRODUCERS: &[(&str, &str)] = &[
    ("52998224725", "João Silva dos Santos"),
    ("11144477735", "Maria Oliveira Costa"),
    ("39053344705", "Carlos Eduardo Pereira"),
    ("11222333000181", "Agropecuária Brasil Ltda"),
    ("11444777000161", "Fazendas Unidas S.A."),
    ("47382910504", "Ana Paula Rodrigues"),
    ("21567890458", "Roberto Carlos Lima"),
    ("45997418000153", "Cooperativa Agrícola Vale Verde"),
];

const CROPS: &[(&str, &str)] = &[
    ("Soja", "Soja transgênica para grãos"),
    ("Milho", "Milho híbrido para silagem e grãos"),
    ("Algodão", "Algodão de fibra longa"),
    ("Café", "Café arábica premium"),
    ("Cana-de-açúcar", "Cana para produção de etanol"),
    ("Trigo", "Trigo para panificação"),
    ("Arroz", "Arroz irrigado"),
    ("Feijão", "Feijão carioca"),
];

struct FarmSeed {
    name: &'static str,
    city: &'static str,
    state: &'static str,
    total: f64,
    agriculturable: f64,
    vegetation: f64,
    producer: usize,
}

const FARMS: &[FarmSeed] = &[
    FarmSeed { name: "Fazenda Santa Maria", city: "Sorriso", state: "MT", total: 2500.0, agriculturable: 2000.0, vegetation: 500.0, producer: 0 },
    FarmSeed { name: "Fazenda Boa Vista", city: "Campo Grande", state: "MS", total: 1800.5, agriculturable: 1400.0, vegetation: 400.5, producer: 1 },
    FarmSeed { name: "Fazenda São José", city: "Uberlândia", state: "MG", total: 3200.75, agriculturable: 2800.0, vegetation: 400.75, producer: 2 },
    FarmSeed { name: "Fazenda Esperança", city: "Cascavel", state: "PR", total: 1500.25, agriculturable: 1200.0, vegetation: 300.25, producer: 3 },
    FarmSeed { name: "Fazenda Progresso", city: "Rio Verde", state: "GO", total: 4000.0, agriculturable: 3500.0, vegetation: 500.0, producer: 4 },
    FarmSeed { name: "Fazenda Três Irmãos", city: "Barreiras", state: "BA", total: 2200.3, agriculturable: 1800.0, vegetation: 400.3, producer: 0 },
    FarmSeed { name: "Fazenda Nova Era", city: "Dourados", state: "MS", total: 1900.0, agriculturable: 1500.0, vegetation: 400.0, producer: 1 },
];

pub struct Seeder {
    repo: Arc<dyn SeedRepo>,
    producers: ProducerService,
    farms: FarmService,
    crops: CropService,
    harvests: HarvestService,
    farm_crops: FarmCropService,
}

impl Seeder {
    pub fn new(
        repo: Arc<dyn SeedRepo>,
        producers: ProducerService,
        farms: FarmService,
        crops: CropService,
        harvests: HarvestService,
        farm_crops: FarmCropService,
    ) -> Self {
        Self {
            repo,
            producers,
            farms,
            crops,
            harvests,
            farm_crops,
        }
    }

    /// Populate the database. Existing data is wiped only when `force` is set.
    pub async fn seed(&self, force: bool) -> Result<SeedSummary, SeedError> {
        if self.repo.has_domain_data().await? {
            if !force {
                return Err(SeedError::NotEmpty);
            }
            warn!("Wiping existing domain data before seeding");
            self.repo.wipe_domain_data().await?;
        }

        let producers = self.seed_producers().await?;
        let crops = self.seed_crops().await?;
        let harvests = self.seed_harvests().await?;
        let farms = self.seed_farms(&producers).await?;
        let plantings = self.seed_plantings(&farms, &crops, &harvests).await?;

        let summary = SeedSummary {
            producers: producers.len(),
            farms: farms.len(),
            crops: crops.len(),
            harvests: harvests.len(),
            plantings,
        };
        info!(
            producers = summary.producers,
            farms = summary.farms,
            crops = summary.crops,
            harvests = summary.harvests,
            plantings = summary.plantings,
            "Seed completed"
        );
        Ok(summary)
    }

    async fn seed_producers(&self) -> Result<Vec<ProducerRecord>, SeedError> {
        let mut created = Vec::with_capacity(PRODUCERS.len());
        for (document, name) in PRODUCERS {
            let command = CreateProducerCommand {
                cpf_cnpj: (*document).to_string(),
                producer_name: (*name).to_string(),
            };
            created.push(self.producers.create(command).await?);
        }
        Ok(created)
    }

    async fn seed_crops(&self) -> Result<Vec<CropRecord>, SeedError> {
        let mut created = Vec::with_capacity(CROPS.len());
        for (name, description) in CROPS {
            let command = CreateCropCommand {
                crop_name: (*name).to_string(),
                description: Some((*description).to_string()),
            };
            created.push(self.crops.create(command).await?);
        }
        Ok(created)
    }

    async fn seed_harvests(&self) -> Result<Vec<HarvestRecord>, SeedError> {
        let seasons = [
            (
                "Safra 2022/2023",
                2022,
                datetime!(2022-09-01 0:00 UTC),
                datetime!(2023-08-31 0:00 UTC),
            ),
            (
                "Safra 2023/2024",
                2023,
                datetime!(2023-09-01 0:00 UTC),
                datetime!(2024-08-31 0:00 UTC),
            ),
            (
                "Safra 2024/2025",
                2024,
                datetime!(2024-09-01 0:00 UTC),
                datetime!(2025-08-31 0:00 UTC),
            ),
        ];

        let mut created = Vec::with_capacity(seasons.len());
        for (name, year, start, end) in seasons {
            let command = CreateHarvestCommand {
                harvest_name: name.to_string(),
                harvest_year: year,
                start_date: Some(start),
                end_date: Some(end),
            };
            created.push(self.harvests.create(command).await?);
        }
        Ok(created)
    }

    async fn seed_farms(&self, producers: &[ProducerRecord]) -> Result<Vec<FarmRecord>, SeedError> {
        let mut created = Vec::with_capacity(FARMS.len());
        for seed in FARMS {
            let Some(owner) = producers.get(seed.producer) else {
                continue;
            };
            let command = CreateFarmCommand {
                farm_name: seed.name.to_string(),
                city: seed.city.to_string(),
                state: seed.state.to_string(),
                total_area: seed.total,
                agriculturable_area: seed.agriculturable,
                vegetation_area: seed.vegetation,
                producer_id: owner.id,
            };
            created.push(self.farms.create(command).await?);
        }
        Ok(created)
    }

    async fn seed_plantings(
        &self,
        farms: &[FarmRecord],
        crops: &[CropRecord],
        harvests: &[HarvestRecord],
    ) -> Result<usize, SeedError> {
        let mut count = 0;
        for (farm_index, farm) in farms.iter().enumerate() {
            for (harvest_index, harvest) in harvests.iter().enumerate() {
                let plan = planting_plan(farm.agriculturable_area, farm_index, harvest_index);
                for (crop, amounts) in crops.iter().zip(plan) {
                    let command = CreateFarmCropCommand {
                        farm_id: farm.id,
                        crop_id: crop.id,
                        harvest_id: harvest.id,
                        planted_area: Some(amounts.planted),
                        expected_yield: Some(amounts.expected),
                        actual_yield: amounts.actual,
                    };
                    self.farm_crops.create(command).await?;
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PlantingAmounts {
    planted: f64,
    expected: f64,
    actual: Option<f64>,
}

/// Two to four plantings sharing at most 54% of the agriculturable area.
/// Only the oldest harvest has actual yields.
fn planting_plan(agriculturable: f64, farm: usize, harvest: usize) -> Vec<PlantingAmounts> {
    let crops = 2 + (farm + harvest) % 3;
    let usable = agriculturable * 0.9;

    (0..crops)
        .map(|crop| {
            let share = 0.2 + 0.1 * ((farm + crop + harvest) % 5) as f64;
            let planted = round2(usable * share / crops as f64);
            let expected = round2(planted * (2.0 + 0.75 * ((farm + crop) % 4) as f64));
            let actual = (harvest == 0)
                .then(|| round2(planted * (1.5 + 0.7 * ((farm + crop + 1) % 4) as f64)));
            PlantingAmounts {
                planted,
                expected,
                actual,
            }
        })
        .collect()
}
