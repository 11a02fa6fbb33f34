//! Everything the engine needs from static content, loaded once at startup.
use profile_core::{EngineConfig, Progression, StaticCatalog};

use crate::templates::ProfileTemplates;

#[derive(Clone, Debug, Default)]
pub struct ContentBundle {
    pub templates: ProfileTemplates,
    pub catalog: StaticCatalog,
    pub progression: Progression,
    pub config: EngineConfig,
}
