//! Application services: one per module, plus the shared list machinery.

pub mod crops;
pub mod dashboard;
pub mod error;
pub mod farm_crops;
pub mod farms;
pub mod harvests;
pub mod pagination;
pub mod producers;
pub mod repos;
pub mod seed;

/// Trimmed `value`, or `message` when nothing is left.
pub(crate) fn ensure_present(value: String, message: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(message.to_string());
    }
    if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_string())
    }
}
