pub mod department;
pub mod filter;
pub mod organization;
pub mod risk;
pub mod user;

pub use department::Department;
pub use filter::{filter_by_organization, scope_to_organization, search, OrganizationScoped, Searchable};
pub use organization::Organization;
pub use risk::{AssetType, Risk, RiskDraft, RiskField, RiskStatus, RiskType};
pub use user::{Role, Section, User, UserDraft};

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read a rating the way the form coerces it: numeric strings and floats
/// are accepted, anything else is 0
pub(crate) fn lenient_rating<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(crate::scoring::coerce(&raw))
}

/// Whether a record is being created or edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Create,
    Update,
}
