//! Platform-scoped currency wallet.
//!
//! A profile may hold several currency items (one per purchase platform plus
//! a shared one). The wallet is the first of those, in item-id order, whose
//! platform matches the profile's `current_mtx_platform` or is `Shared`.
use crate::change::ChangeRecord;
use crate::error::McpError;
use crate::profile::{Item, ItemAttributes, Profile};

/// Platform sentinel accepted regardless of the profile's current platform.
pub const SHARED_PLATFORM: &str = "shared";

/// Template used when a credit lands on a profile without any wallet.
pub const DEFAULT_WALLET_TEMPLATE: &str = "Currency:MtxPurchased";

/// Locates the active wallet item.
///
/// `default_platform` applies when the profile has no `current_mtx_platform`.
pub fn find_wallet<'a>(profile: &'a Profile, default_platform: &str) -> Option<(&'a str, &'a Item)> {
    let platform = profile
        .attributes()
        .current_mtx_platform
        .as_deref()
        .unwrap_or(default_platform)
        .to_ascii_lowercase();

    profile
        .items
        .iter()
        .filter(|(_, item)| item.is_currency())
        .find(|(_, item)| {
            item.attributes
                .platform
                .as_deref()
                .map(str::to_ascii_lowercase)
                .is_some_and(|p| p == platform || p == SHARED_PLATFORM)
        })
        .map(|(id, item)| (id.as_str(), item))
}

/// Current wallet balance, or zero when the profile has no wallet.
pub fn balance(profile: &Profile, default_platform: &str) -> i64 {
    find_wallet(profile, default_platform).map_or(0, |(_, item)| item.quantity)
}

/// Fails with `InsufficientFunds` unless the wallet holds at least `amount`.
pub fn ensure_funds(profile: &Profile, amount: i64, default_platform: &str) -> Result<(), McpError> {
    let available = balance(profile, default_platform);
    if available < amount {
        return Err(McpError::InsufficientFunds {
            required: amount,
            available,
        });
    }
    Ok(())
}

/// Removes `amount` from the wallet.
pub fn debit(profile: &mut Profile, amount: i64, default_platform: &str) -> Result<ChangeRecord, McpError> {
    ensure_funds(profile, amount, default_platform)?;
    let wallet_id = find_wallet(profile, default_platform)
        .map(|(id, _)| id.to_owned())
        .ok_or(McpError::InsufficientFunds {
            required: amount,
            available: 0,
        })?;
    let item = profile
        .items
        .get_mut(&wallet_id)
        .ok_or_else(|| McpError::ItemNotFound {
            item_id: wallet_id.clone(),
        })?;
    item.quantity -= amount;
    Ok(ChangeRecord::quantity_changed(wallet_id, item.quantity))
}

/// Adds `amount` to the wallet.
///
/// A profile without a wallet receives a shared `Currency:MtxPurchased` item
/// under a fresh id, reported as `itemAdded`.
pub fn credit(profile: &mut Profile, amount: i64, new_id: impl FnOnce() -> String, default_platform: &str) -> ChangeRecord {
    let wallet_id = find_wallet(profile, default_platform).map(|(id, _)| id.to_owned());
    match wallet_id.and_then(|id| profile.items.get_mut(&id).map(|item| (id, item))) {
        Some((id, item)) => {
            item.quantity = item.quantity.saturating_add(amount);
            ChangeRecord::quantity_changed(id, item.quantity)
        }
        None => {
            let id = new_id();
            let item = Item::new(DEFAULT_WALLET_TEMPLATE, ItemAttributes::currency("Shared"), amount);
            profile.items.insert(id.clone(), item.clone());
            ChangeRecord::item_added(id, item)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ids;

    fn currency(platform: &str, quantity: i64) -> Item {
        Item::new("Currency:MtxPurchased", ItemAttributes::currency(platform), quantity)
    }

    fn profile_with(items: &[(&str, Item)]) -> Profile {
        let mut profile = Profile::new(ids::COMMON_CORE);
        profile.attributes_mut().current_mtx_platform = Some("EpicPC".into());
        for (id, item) in items {
            profile.items.insert((*id).into(), item.clone());
        }
        profile
    }

    #[test]
    fn picks_matching_platform_or_shared() {
        let profile = profile_with(&[
            ("a-xbox", currency("XBox", 50)),
            ("b-shared", currency("Shared", 20)),
        ]);
        let (id, item) = find_wallet(&profile, "EpicPC").unwrap();
        assert_eq!(id, "b-shared");
        assert_eq!(item.quantity, 20);
    }

    #[test]
    fn ties_resolve_to_lowest_item_id() {
        let profile = profile_with(&[
            ("zzz", currency("EpicPC", 1)),
            ("aaa", currency("shared", 2)),
        ]);
        assert_eq!(find_wallet(&profile, "EpicPC").unwrap().0, "aaa");
    }

    #[test]
    fn debit_checks_balance() {
        let mut profile = profile_with(&[("w", currency("EpicPC", 100))]);
        let err = debit(&mut profile, 150, "EpicPC").unwrap_err();
        assert_eq!(
            err,
            McpError::InsufficientFunds {
                required: 150,
                available: 100
            }
        );
        assert_eq!(profile.items["w"].quantity, 100);

        let change = debit(&mut profile, 40, "EpicPC").unwrap();
        assert_eq!(change, ChangeRecord::quantity_changed("w", 60));
    }

    #[test]
    fn missing_wallet_reports_zero_available() {
        let mut profile = profile_with(&[]);
        let err = debit(&mut profile, 1, "EpicPC").unwrap_err();
        assert!(matches!(err, McpError::InsufficientFunds { available: 0, .. }));
    }

    #[test]
    fn credit_creates_shared_wallet_when_absent() {
        let mut profile = profile_with(&[]);
        let change = credit(&mut profile, 300, || "new-wallet".into(), "EpicPC");
        assert!(matches!(change, ChangeRecord::ItemAdded { ref item_id, .. } if item_id == "new-wallet"));
        assert_eq!(balance(&profile, "EpicPC"), 300);

        let change = credit(&mut profile, 5, || unreachable!(), "EpicPC");
        assert_eq!(change, ChangeRecord::quantity_changed("new-wallet", 305));
    }
}
