//! Profile template loader.

use std::path::Path;

use profile_core::Profile;

use crate::loaders::{LoadResult, read_file};
use crate::templates::{PROFILE_IDS, ProfileTemplates};

/// Loader for profile template documents, one JSON file per profile id.
pub struct TemplateLoader;

impl TemplateLoader {
    pub fn load(path: &Path) -> LoadResult<Profile> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Profile> {
        serde_json::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse profile template JSON: {}", e))
    }

    /// Load `<profile_id>.json` for every profile an account is created with.
    pub fn load_dir(dir: &Path) -> LoadResult<ProfileTemplates> {
        let mut templates = Vec::with_capacity(PROFILE_IDS.len());
        for profile_id in PROFILE_IDS {
            let path = dir.join(format!("{profile_id}.json"));
            let template = Self::load(&path)?;
            if template.profile_id != profile_id {
                anyhow::bail!(
                    "Template {} declares profileId {}",
                    path.display(),
                    template.profile_id
                );
            }
            templates.push(template);
        }
        Ok(ProfileTemplates::new(templates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_dir_reports_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("athena.json"), r#"{ "profileId": "athena" }"#).unwrap();

        let err = TemplateLoader::load_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("common_core.json"));
    }

    #[test]
    fn load_dir_rejects_mismatched_profile_id() {
        let dir = tempfile::tempdir().unwrap();
        for profile_id in PROFILE_IDS {
            std::fs::write(
                dir.path().join(format!("{profile_id}.json")),
                format!(r#"{{ "profileId": "{profile_id}" }}"#),
            )
            .unwrap();
        }
        std::fs::write(dir.path().join("creative.json"), r#"{ "profileId": "athena" }"#).unwrap();

        let err = TemplateLoader::load_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("declares profileId athena"));
    }
}
