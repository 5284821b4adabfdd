use xbvr_model::{MembershipItem, MembershipList};

/// A local flip that has been applied and may need reverting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedToggle<K> {
    pub key: K,
    pub list: MembershipList,
    /// Value the flag holds after the flip
    pub value: bool,
}

/// Flip `list` on the item identified by `key`.
///
/// Returns `None` without touching anything when the key is not loaded,
/// the list is not in `allowed`, or the item kind has no such flag.
pub fn toggle<T: MembershipItem>(
    items: &mut [T],
    key: &T::Key,
    list: MembershipList,
    allowed: &[MembershipList],
) -> Option<AppliedToggle<T::Key>> {
    if !allowed.contains(&list) {
        return None;
    }
    let item = items.iter_mut().find(|item| item.key() == key)?;
    let flag = item.flag_mut(list)?;
    *flag = !*flag;
    Some(AppliedToggle {
        key: key.clone(),
        list,
        value: *flag,
    })
}

/// Undo `applied`, but only if the flag still holds the value we set.
///
/// A reload or a second toggle in the meantime wins over the revert.
pub fn revert<T: MembershipItem>(
    items: &mut [T],
    applied: &AppliedToggle<T::Key>,
) -> bool {
    let Some(flag) = items
        .iter_mut()
        .find(|item| item.key() == &applied.key)
        .and_then(|item| item.flag_mut(applied.list))
    else {
        return false;
    };
    if *flag != applied.value {
        return false;
    }
    *flag = !applied.value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbvr_model::{Actor, ActorID, FileRecord, FileID, Scene, SceneKey};

    fn scene(key: &str) -> Scene {
        Scene {
            scene_id: SceneKey::new(key),
            title: format!("title {key}"),
            ..Scene::default()
        }
    }

    const SCENE_LISTS: &[MembershipList] = &[
        MembershipList::Watchlist,
        MembershipList::Favourite,
        MembershipList::Watched,
        MembershipList::Hidden,
        MembershipList::Trailerlist,
        MembershipList::Wishlist,
    ];

    #[test]
    fn unknown_key_leaves_items_unchanged() {
        let mut items = vec![scene("a"), scene("b")];
        let before = items.clone();
        let result = toggle(
            &mut items,
            &SceneKey::new("zzz"),
            MembershipList::Favourite,
            SCENE_LISTS,
        );
        assert_eq!(result, None);
        assert_eq!(items, before);
    }

    #[test]
    fn favourite_flips_on_one_item_only() {
        let mut items = vec![scene("a"), scene("b"), scene("c")];
        let before = items.clone();
        let applied = toggle(
            &mut items,
            &SceneKey::new("b"),
            MembershipList::Favourite,
            SCENE_LISTS,
        )
        .expect("applied");

        assert!(applied.value);
        assert!(items[1].favourite);
        let mut expected = before[1].clone();
        expected.favourite = true;
        assert_eq!(items[1], expected);
        assert_eq!(items[0], before[0]);
        assert_eq!(items[2], before[2]);
    }

    #[test]
    fn list_outside_the_resource_set_is_ignored() {
        let mut items = vec![scene("a")];
        let result = toggle(
            &mut items,
            &SceneKey::new("a"),
            MembershipList::NeedsUpdate,
            SCENE_LISTS,
        );
        assert_eq!(result, None);
        assert!(!items[0].needs_update);
    }

    #[test]
    fn item_without_the_flag_is_ignored() {
        let mut files = vec![FileRecord {
            id: FileID(4),
            ..FileRecord::default()
        }];
        let before = files.clone();
        let result = toggle(
            &mut files,
            &FileID(4),
            MembershipList::Favourite,
            MembershipList::all(),
        );
        assert_eq!(result, None);
        assert_eq!(files, before);
    }

    #[test]
    fn revert_restores_the_previous_value() {
        let mut actors = vec![Actor {
            id: ActorID(3),
            watchlist: true,
            ..Actor::default()
        }];
        let applied = toggle(
            &mut actors,
            &ActorID(3),
            MembershipList::Watchlist,
            &[MembershipList::Watchlist],
        )
        .expect("applied");
        assert!(!actors[0].watchlist);

        assert!(revert(&mut actors, &applied));
        assert!(actors[0].watchlist);
    }

    #[test]
    fn revert_skips_a_flag_that_moved_on() {
        let mut items = vec![scene("a")];
        let applied = toggle(
            &mut items,
            &SceneKey::new("a"),
            MembershipList::Watchlist,
            SCENE_LISTS,
        )
        .expect("applied");
        // flipped back by someone else before the failure arrived
        items[0].watchlist = false;

        assert!(!revert(&mut items, &applied));
        assert!(!items[0].watchlist);
    }
}
