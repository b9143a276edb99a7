use std::cmp::Ordering;
use std::collections::HashMap;

use crate::coords::Vec2;
use crate::id::{ListenerId, PointerId};

use super::types::MouseButton;

/// Tracked state of one pressed pointer, in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerRecord {
    pub id: PointerId,
    /// Listener that accepted the press.
    pub owner: ListenerId,
    pub pressed_at: f64,
    /// Press sequence number; breaks ties between equal timestamps.
    pub seq: u64,
    pub start: Vec2,
    pub previous: Vec2,
    pub current: Vec2,
    pub move_count: u32,
    pub end: Option<Vec2>,
    pub button: Option<MouseButton>,
}

impl PointerRecord {
    pub fn cmp_press_order(&self, other: &PointerRecord) -> Ordering {
        self.pressed_at
            .total_cmp(&other.pressed_at)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Pointers currently held down on one engine.
#[derive(Debug, Default)]
pub struct PointerTable {
    records: HashMap<PointerId, PointerRecord>,
    next_seq: u64,
}

impl PointerTable {
    /// Starts tracking `id`. A stale record for the same id is replaced.
    pub fn press(
        &mut self,
        id: PointerId,
        owner: ListenerId,
        at: Vec2,
        pressed_at: f64,
        button: Option<MouseButton>,
    ) -> &PointerRecord {
        let seq = self.next_seq;
        self.next_seq += 1;

        let record = PointerRecord {
            id,
            owner,
            pressed_at,
            seq,
            start: at,
            previous: at,
            current: at,
            move_count: 0,
            end: None,
            button,
        };
        if self.records.insert(id, record).is_some() {
            log::debug!("pointer {id} pressed again before release; restarting");
        }
        &self.records[&id]
    }

    /// Records a move. Returns `false` when the pointer is not tracked.
    pub fn move_to(&mut self, id: PointerId, at: Vec2) -> bool {
        match self.records.get_mut(&id) {
            Some(r) => {
                if r.current != at {
                    r.previous = r.current;
                    r.current = at;
                }
                true
            }
            None => false,
        }
    }

    pub fn bump_moves(&mut self, id: PointerId) {
        if let Some(r) = self.records.get_mut(&id) {
            r.move_count += 1;
        }
    }

    pub fn set_end(&mut self, id: PointerId, at: Vec2) {
        if let Some(r) = self.records.get_mut(&id) {
            r.previous = r.current;
            r.current = at;
            r.end = Some(at);
        }
    }

    pub fn get(&self, id: PointerId) -> Option<&PointerRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: PointerId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn remove(&mut self, id: PointerId) -> Option<PointerRecord> {
        self.records.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids of pointers pressed through `owner`.
    pub fn owned_by(&self, owner: ListenerId) -> Vec<PointerId> {
        let mut owned: Vec<&PointerRecord> =
            self.records.values().filter(|r| r.owner == owner).collect();
        owned.sort_by(|a, b| a.cmp_press_order(b));
        owned.into_iter().map(|r| r.id).collect()
    }

    /// All tracked records, earliest press first.
    pub fn by_press_order(&self) -> Vec<&PointerRecord> {
        let mut all: Vec<&PointerRecord> = self.records.values().collect();
        all.sort_by(|a, b| a.cmp_press_order(b));
        all
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const L: ListenerId = ListenerId(1);

    #[test]
    fn move_keeps_previous_and_start() {
        let mut t = PointerTable::default();
        t.press(PointerId(3), L, Vec2::new(1.0, 1.0), 0.0, None);
        assert!(t.move_to(PointerId(3), Vec2::new(5.0, 1.0)));
        assert!(t.move_to(PointerId(3), Vec2::new(5.0, 1.0)));

        let r = t.get(PointerId(3)).expect("tracked");
        assert_eq!(r.start, Vec2::new(1.0, 1.0));
        assert_eq!(r.previous, Vec2::new(1.0, 1.0));
        assert_eq!(r.current, Vec2::new(5.0, 1.0));
    }

    #[test]
    fn untracked_move_is_rejected() {
        let mut t = PointerTable::default();
        assert!(!t.move_to(PointerId(9), Vec2::ZERO));
    }

    #[test]
    fn press_order_uses_timestamp_then_sequence() {
        let mut t = PointerTable::default();
        t.press(PointerId(7), L, Vec2::ZERO, 5.0, None);
        t.press(PointerId(2), L, Vec2::ZERO, 1.0, None);
        t.press(PointerId(4), L, Vec2::ZERO, 5.0, None);

        let order: Vec<PointerId> = t.by_press_order().iter().map(|r| r.id).collect();
        assert_eq!(order, vec![PointerId(2), PointerId(7), PointerId(4)]);
    }

    #[test]
    fn owned_by_filters_listeners() {
        let mut t = PointerTable::default();
        t.press(PointerId(1), L, Vec2::ZERO, 0.0, None);
        t.press(PointerId(2), ListenerId(2), Vec2::ZERO, 1.0, None);
        assert_eq!(t.owned_by(L), vec![PointerId(1)]);
    }
}
