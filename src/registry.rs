use crate::model::FishId;
use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Ids that currently have a live actor in the tank.
///
/// Owned by the tank controller; an id is present exactly while one actor
/// exists for it.
#[derive(Clone, Debug, Default)]
pub struct TankMembership {
    ids: BTreeSet<FishId>,
}

impl TankMembership {
    pub fn contains(&self, id: FishId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns false if the id was already a member.
    pub(crate) fn insert(&mut self, id: FishId) -> bool {
        self.ids.insert(id)
    }

    pub(crate) fn remove(&mut self, id: FishId) -> bool {
        self.ids.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FishId> + '_ {
        self.ids.iter().copied()
    }
}

/// The fish currently under the pointer, shared by every surface that shows
/// fish (tank sprites and the side list).
///
/// Clones share the same slot, so a write through one handle is seen by all
/// of them immediately. Single-threaded by construction.
#[derive(Clone, Debug, Default)]
pub struct HoverRegistry {
    current: Rc<Cell<Option<FishId>>>,
}

impl HoverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previous hover; `None` is the pointer-leave signal.
    pub fn set_hover(&self, id: Option<FishId>) {
        self.current.set(id);
    }

    pub fn current_hover(&self) -> Option<FishId> {
        self.current.get()
    }

    pub fn is_hovered(&self, id: FishId) -> bool {
        self.current.get() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_is_shared_between_clones() {
        let tank = HoverRegistry::new();
        let list = tank.clone();

        list.set_hover(Some(FishId(3)));
        assert_eq!(tank.current_hover(), Some(FishId(3)));
        assert!(tank.is_hovered(FishId(3)));

        // second hover replaces the first
        tank.set_hover(Some(FishId(9)));
        assert_eq!(list.current_hover(), Some(FishId(9)));
        assert!(!list.is_hovered(FishId(3)));

        list.set_hover(None);
        assert_eq!(tank.current_hover(), None);
    }

    #[test]
    fn separate_registries_are_isolated() {
        let a = HoverRegistry::new();
        let b = HoverRegistry::new();
        a.set_hover(Some(FishId(1)));
        assert_eq!(b.current_hover(), None);
    }

    #[test]
    fn membership_insert_is_exclusive() {
        let mut m = TankMembership::default();
        assert!(m.insert(FishId(1)));
        assert!(!m.insert(FishId(1)));
        assert_eq!(m.len(), 1);
        assert!(m.remove(FishId(1)));
        assert!(!m.remove(FishId(1)));
        assert!(m.is_empty());
    }
}
