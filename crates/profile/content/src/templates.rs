//! Profile templates and account instantiation.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use profile_core::{Profile, ProfileSet, ids};

/// Profiles every account is created with.
pub const PROFILE_IDS: [&str; 6] = [
    ids::ATHENA,
    ids::COMMON_CORE,
    ids::PROFILE0,
    ids::COMMON_PUBLIC,
    ids::CREATIVE,
    ids::COLLECTIONS,
];

/// Template documents keyed by profile id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileTemplates {
    profiles: BTreeMap<String, Profile>,
}

impl ProfileTemplates {
    pub fn new(templates: impl IntoIterator<Item = Profile>) -> Self {
        Self {
            profiles: templates
                .into_iter()
                .map(|profile| (profile.profile_id.clone(), profile))
                .collect(),
        }
    }

    pub fn get(&self, profile_id: &str) -> Option<&Profile> {
        self.profiles.get(profile_id)
    }

    pub fn profile_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Builds the profile set of a freshly registered account.
    ///
    /// Every template is copied, stamped with the owner and creation time,
    /// and starts at revision zero.
    pub fn instantiate(&self, account_id: &str, now: DateTime<Utc>) -> ProfileSet {
        let mut set = ProfileSet::new(account_id);
        for template in self.profiles.values() {
            let mut profile = template.clone();
            profile.account_id = account_id.to_owned();
            profile.created = now;
            profile.updated = now;
            profile.rvn = 0;
            profile.command_revision = 0;
            set.insert(profile);
        }
        tracing::debug!(account_id, profiles = set.profiles.len(), "profiles instantiated");
        set
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn instantiate_stamps_owner_and_resets_revisions() {
        let mut athena = Profile::new(ids::ATHENA);
        athena.rvn = 12;
        athena.command_revision = 12;
        let templates = ProfileTemplates::new([athena, Profile::new(ids::COMMON_CORE)]);
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

        let set = templates.instantiate("acc", now);

        assert_eq!(set.account_id, "acc");
        assert_eq!(set.profiles.len(), 2);
        let athena = set.resolve(ids::ATHENA).unwrap();
        assert_eq!(athena.account_id, "acc");
        assert_eq!((athena.rvn, athena.command_revision), (0, 0));
        assert_eq!(athena.created, now);
        assert_eq!(athena.updated, now);
        assert_eq!(templates.get(ids::ATHENA).unwrap().rvn, 12);
    }
}
