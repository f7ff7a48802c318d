//! Harvest season rules.

use time::OffsetDateTime;

use super::error::DomainError;

pub const MIN_HARVEST_YEAR: i32 = 2000;
pub const MAX_HARVEST_YEAR: i32 = 2050;

pub fn ensure_harvest_year(year: i32) -> Result<(), DomainError> {
    if year < MIN_HARVEST_YEAR {
        return Err(DomainError::validation(
            "O ano da safra deve ser pelo menos 2000",
        ));
    }
    if year > MAX_HARVEST_YEAR {
        return Err(DomainError::validation("O ano da safra não deve exceder 2050"));
    }
    Ok(())
}

/// Both bounds are optional; when both are set the season must start first.
pub fn ensure_season_order(
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
) -> Result<(), DomainError> {
    match (start, end) {
        (Some(start), Some(end)) if start >= end => Err(DomainError::validation(
            "Start date must be before end date",
        )),
        _ => Ok(()),
    }
}
