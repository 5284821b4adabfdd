use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::ModelError;

/// Boolean membership flags an item can be toggled in and out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MembershipList {
    #[cfg_attr(feature = "serde", serde(rename = "watchlist"))]
    Watchlist,
    #[cfg_attr(feature = "serde", serde(rename = "favourite"))]
    Favourite,
    #[cfg_attr(feature = "serde", serde(rename = "watched"))]
    Watched,
    #[cfg_attr(feature = "serde", serde(rename = "is_hidden", alias = "hidden"))]
    Hidden,
    #[cfg_attr(feature = "serde", serde(rename = "trailerlist"))]
    Trailerlist,
    #[cfg_attr(feature = "serde", serde(rename = "wishlist"))]
    Wishlist,
    #[cfg_attr(feature = "serde", serde(rename = "needs_update"))]
    NeedsUpdate,
}

impl MembershipList {
    pub fn all() -> &'static [MembershipList] {
        use MembershipList::*;
        &[
            Watchlist,
            Favourite,
            Watched,
            Hidden,
            Trailerlist,
            Wishlist,
            NeedsUpdate,
        ]
    }

    /// Name the toggle endpoint expects in its `list` field.
    pub fn api_name(&self) -> &'static str {
        match self {
            MembershipList::Watchlist => "watchlist",
            MembershipList::Favourite => "favourite",
            MembershipList::Watched => "watched",
            MembershipList::Hidden => "is_hidden",
            MembershipList::Trailerlist => "trailerlist",
            MembershipList::Wishlist => "wishlist",
            MembershipList::NeedsUpdate => "needs_update",
        }
    }
}

impl FromStr for MembershipList {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watchlist" => Ok(MembershipList::Watchlist),
            "favourite" | "favorite" => Ok(MembershipList::Favourite),
            "watched" | "is_watched" => Ok(MembershipList::Watched),
            "hidden" | "is_hidden" => Ok(MembershipList::Hidden),
            "trailerlist" => Ok(MembershipList::Trailerlist),
            "wishlist" => Ok(MembershipList::Wishlist),
            "needs_update" => Ok(MembershipList::NeedsUpdate),
            other => Err(ModelError::UnknownList(other.to_string())),
        }
    }
}

impl fmt::Display for MembershipList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// An item that can be listed in a collection view and carries membership
/// flags.
pub trait MembershipItem {
    /// Identity that stays stable across reloads of the same query.
    type Key: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync;

    fn key(&self) -> &Self::Key;

    /// Current value of `list`, or `None` when this item kind has no such
    /// flag.
    fn flag(&self, list: MembershipList) -> Option<bool>;

    fn flag_mut(&mut self, list: MembershipList) -> Option<&mut bool>;
}
