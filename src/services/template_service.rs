//! services/template_service.rs

use std::{fs, path::Path};

use crate::error::CampaignError;

/// Lee la plantilla HTML. Se usa tal cual, sin personalización.
pub fn load_template(path: &Path) -> Result<String, CampaignError> {
    fs::read_to_string(path).map_err(|source| CampaignError::Template {
        path: path.to_path_buf(),
        source,
    })
}
