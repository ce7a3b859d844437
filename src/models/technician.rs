//! Technician directory for ServiceDesk Plus.
//!
//! The `GET_ALL` technician operation lists one record per technician
//! whose first parameter is the technician id and second the display name.
//! The directory maps names to ids so a request can be assigned by name.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::record::record_parameters;
use crate::error::SdpError;

/// Technician display name to technician id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TechnicianDirectory {
    by_name: BTreeMap<String, String>,
}

impl TechnicianDirectory {
    /// Builds the directory from a generic-mode `GET_ALL` response.
    ///
    /// Records missing an id or a name are skipped; when two technicians
    /// share a name the later record wins.
    pub fn from_response(response: &Value) -> Result<Self, SdpError> {
        let mut by_name = BTreeMap::new();
        for params in record_parameters(response)? {
            let id = params.first().and_then(|p| p.value.clone());
            let name = params.get(1).and_then(|p| p.value.clone());
            if let (Some(id), Some(name)) = (id, name) {
                by_name.insert(name, id);
            }
        }
        Ok(Self { by_name })
    }

    /// Looks up the id of a technician by display name.
    ///
    /// # Errors
    ///
    /// Returns `SdpError::TechnicianNotFound` if no technician has that name.
    pub fn resolve(&self, name: &str) -> Result<&str, SdpError> {
        self.get(name)
            .ok_or_else(|| SdpError::technician_not_found(name))
    }

    /// Returns the id for a display name, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Iterates over (name, id) pairs sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_name.iter().map(|(n, i)| (n.as_str(), i.as_str()))
    }

    /// Number of technicians.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl<N, I> FromIterator<(N, I)> for TechnicianDirectory
where
    N: Into<String>,
    I: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (N, I)>>(iter: T) -> Self {
        Self {
            by_name: iter
                .into_iter()
                .map(|(name, id)| (name.into(), id.into()))
                .collect(),
        }
    }
}
