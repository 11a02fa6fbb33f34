//! Revision counters and the incremental-vs-snapshot response decision.
//!
//! `rvn` and `commandRevision` move together, by exactly one, each time a
//! profile with a non-empty change list is committed. Which of the two a
//! client compares against depends on its protocol version, so the choice is
//! an injected [`RevisionMode`] rather than a constant.
use chrono::{DateTime, Utc};

use crate::change::ChangeRecord;
use crate::profile::Profile;
use crate::response::ProfileUpdate;

/// Which counter a client's cached `rvn` is compared against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RevisionMode {
    /// Newer clients track `commandRevision`.
    CommandRevision,
    /// Older clients and dedicated servers track `rvn`.
    Rvn,
}

impl RevisionMode {
    pub fn select(self, snapshot: RevisionSnapshot) -> i64 {
        match self {
            Self::CommandRevision => snapshot.command_revision,
            Self::Rvn => snapshot.rvn,
        }
    }
}

/// Counters captured before an operation starts mutating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevisionSnapshot {
    pub rvn: i64,
    pub command_revision: i64,
}

impl RevisionSnapshot {
    pub fn of(profile: &Profile) -> Self {
        Self {
            rvn: profile.rvn,
            command_revision: profile.command_revision,
        }
    }
}

/// Client build parsed from a `User-Agent` such as
/// `Fortnite/++Fortnite+Release-12.41-CL-12905909 Windows/10`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct BuildVersion {
    pub season: u32,
    pub build: f64,
}

impl BuildVersion {
    pub const fn new(season: u32, build: f64) -> Self {
        Self { season, build }
    }

    /// Falls back to season 0 / build 0.0 when no `Release-` marker is present.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let Some((_, rest)) = user_agent.split_once("Release-") else {
            return Self::default();
        };
        let raw = rest.split('-').next().unwrap_or_default();
        let mut parts = raw.split('.');
        let (Some(major), Some(minor)) = (parts.next(), parts.next()) else {
            return Self::default();
        };
        // "12.00.1" is read as 12.001, matching how clients report hotfixes
        let patch: String = parts.collect();
        let Ok(build) = format!("{major}.{minor}{patch}").parse::<f64>() else {
            return Self::default();
        };
        Self {
            season: major.parse().unwrap_or(0),
            build,
        }
    }

    pub fn revision_mode(&self, command_revision_build: f64) -> RevisionMode {
        if self.build >= command_revision_build {
            RevisionMode::CommandRevision
        } else {
            RevisionMode::Rvn
        }
    }
}

/// Applies counter bumps and shapes per-profile responses.
#[derive(Clone, Copy, Debug)]
pub struct RevisionTracker {
    mode: RevisionMode,
}

impl RevisionTracker {
    pub const fn new(mode: RevisionMode) -> Self {
        Self { mode }
    }

    pub const fn mode(&self) -> RevisionMode {
        self.mode
    }

    /// An operation that touched nothing must not advance the revision.
    pub fn should_persist(changes: &[ChangeRecord]) -> bool {
        !changes.is_empty()
    }

    pub fn bump(profile: &mut Profile, now: DateTime<Utc>) {
        profile.rvn += 1;
        profile.command_revision += 1;
        profile.updated = now;
    }

    /// Builds the per-profile response.
    ///
    /// A missing client revision or `-1` forces a snapshot. Otherwise the
    /// client value is compared against the pre-operation counter picked by
    /// the mode; on mismatch the incremental `changes` are replaced by a
    /// single `fullProfileUpdate`.
    pub fn respond(
        &self,
        profile: &Profile,
        before: RevisionSnapshot,
        client_revision: Option<i64>,
        changes: Vec<ChangeRecord>,
    ) -> ProfileUpdate {
        let in_sync = client_revision.is_some_and(|rvn| rvn != -1 && rvn == self.mode.select(before));
        let profile_changes = if in_sync {
            changes
        } else {
            vec![ChangeRecord::full(profile)]
        };
        ProfileUpdate {
            profile_revision: profile.rvn,
            profile_id: profile.profile_id.clone(),
            profile_changes_base_revision: before.rvn,
            profile_changes,
            profile_command_revision: profile.command_revision,
        }
    }

    /// Incremental update for a secondary profile carried in `multiUpdate`.
    pub fn secondary(
        profile: &Profile,
        before: RevisionSnapshot,
        changes: Vec<ChangeRecord>,
    ) -> ProfileUpdate {
        ProfileUpdate {
            profile_revision: profile.rvn,
            profile_id: profile.profile_id.clone(),
            profile_changes_base_revision: before.rvn,
            profile_changes: changes,
            profile_command_revision: profile.command_revision,
        }
    }
}
