use crate::ids::ActorID;
use crate::membership::{MembershipItem, MembershipList};

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Actor {
    pub id: ActorID,
    pub name: String,
    /// Number of scenes the actor appears in
    pub count: u64,
    pub image_url: String,
    pub nationality: String,
    pub aliases: String,
    pub star_rating: f64,

    pub favourite: bool,
    pub watchlist: bool,
    pub needs_update: bool,
}

impl MembershipItem for Actor {
    type Key = ActorID;

    fn key(&self) -> &ActorID {
        &self.id
    }

    fn flag(&self, list: MembershipList) -> Option<bool> {
        match list {
            MembershipList::Watchlist => Some(self.watchlist),
            MembershipList::Favourite => Some(self.favourite),
            MembershipList::NeedsUpdate => Some(self.needs_update),
            _ => None,
        }
    }

    fn flag_mut(&mut self, list: MembershipList) -> Option<&mut bool> {
        match list {
            MembershipList::Watchlist => Some(&mut self.watchlist),
            MembershipList::Favourite => Some(&mut self.favourite),
            MembershipList::NeedsUpdate => Some(&mut self.needs_update),
            _ => None,
        }
    }
}
