//! Tracked brands from TOML (`[[brands]]` tables)

use aeo_domain::Brand;
use serde::{Deserialize, Serialize};

/// One `[[brands]]` entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBrandConfig {
    pub name: String,
    /// Web domain, e.g. "acme.com"
    pub domain: Option<String>,
    /// Extra names the brand goes by
    pub keywords: Vec<String>,
    pub competitors: Vec<String>,
}

impl FileBrandConfig {
    pub fn to_brand(&self) -> Brand {
        Brand {
            name: self.name.trim().to_string(),
            domain: self.domain.clone().filter(|d| !d.trim().is_empty()),
            keywords: self.keywords.clone(),
            competitors: self.competitors.clone(),
        }
    }
}
