//! Farm land invariants.

use super::error::DomainError;

pub const MIN_AREA: f64 = 0.01;

/// Land split of a farm, in hectares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarmAreas {
    pub total: f64,
    pub agriculturable: f64,
    pub vegetation: f64,
}

impl FarmAreas {
    pub fn new(total: f64, agriculturable: f64, vegetation: f64) -> Self {
        Self {
            total,
            agriculturable,
            vegetation,
        }
    }

    /// Check bounds and that the sub-areas fit inside the total area.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.total.is_finite() || self.total < MIN_AREA {
            return Err(DomainError::validation("Área total deve ser maior que 0"));
        }
        if !self.agriculturable.is_finite() || self.agriculturable < MIN_AREA {
            return Err(DomainError::validation(
                "Área agricultável deve ser maior ou igual a 0",
            ));
        }
        if !self.vegetation.is_finite() || self.vegetation < MIN_AREA {
            return Err(DomainError::validation(
                "Área de vegetação deve ser maior ou igual a 0",
            ));
        }

        let used = self.agriculturable + self.vegetation;
        if exceeds(used, self.total) {
            return Err(DomainError::validation(format!(
                "A soma das áreas ({}ha) não pode exceder a área total ({}ha)",
                round2(used),
                round2(self.total)
            )));
        }
        Ok(())
    }
}

/// Planted area of a crop must fit inside the agriculturable area left for the
/// harvest once the farm's other plantings are accounted for.
pub fn ensure_planted_area_fits(
    planted: f64,
    already_planted: f64,
    agriculturable: f64,
) -> Result<(), DomainError> {
    if exceeds(planted + already_planted, agriculturable) {
        return Err(DomainError::validation(
            "Planted area exceeds farm agriculturable area for this harvest",
        ));
    }
    Ok(())
}

/// Positive amount check shared by planted area and yields.
pub fn ensure_min_amount(value: Option<f64>, message: &'static str) -> Result<(), DomainError> {
    match value {
        Some(amount) if !amount.is_finite() || amount < MIN_AREA => {
            Err(DomainError::validation(message))
        }
        _ => Ok(()),
    }
}

// Areas are stored with two decimals.
fn exceeds(value: f64, limit: f64) -> bool {
    round2(value) > round2(limit)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
