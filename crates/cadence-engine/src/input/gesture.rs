use std::collections::HashMap;
use std::fmt;

use crate::coords::Vec2;
use crate::id::{ListenerId, PointerId};

/// Key of the shared gesture table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GestureKey {
    Drag(PointerId),
    /// Pointer pair, earlier press first. Displays as `"a-b"`.
    Pinch(PointerId, PointerId),
}

impl GestureKey {
    pub fn involves(&self, pointer: PointerId) -> bool {
        match *self {
            GestureKey::Drag(p) => p == pointer,
            GestureKey::Pinch(a, b) => a == pointer || b == pointer,
        }
    }
}

impl fmt::Display for GestureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureKey::Drag(p) => write!(f, "{p}"),
            GestureKey::Pinch(a, b) => write!(f, "{a}-{b}"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GestureKind {
    Drag,
    Pinch,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GestureState {
    Active,
    Release,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    pub pointer: PointerId,
    pub state: GestureState,
    pub initiator: ListenerId,
    /// Listeners receiving this drag, in join order. Never empty.
    pub members: Vec<ListenerId>,
}

impl DragGesture {
    pub fn new(pointer: PointerId, initiator: ListenerId) -> Self {
        Self {
            pointer,
            state: GestureState::Active,
            initiator,
            members: vec![initiator],
        }
    }

    /// Appends `listener` unless it is already a member.
    pub fn add_member(&mut self, listener: ListenerId) -> bool {
        if self.members.contains(&listener) {
            return false;
        }
        self.members.push(listener);
        true
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PinchSnapshot {
    pub pair: [PointerId; 2],
    pub screen: [Vec2; 2],
    pub distance: f32,
}

impl PinchSnapshot {
    pub fn new(pair: [PointerId; 2], screen: [Vec2; 2]) -> Self {
        Self {
            pair,
            screen,
            distance: screen[0].distance(screen[1]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PinchGesture {
    pub state: GestureState,
    pub members: Vec<ListenerId>,
    pub start: PinchSnapshot,
    pub current: PinchSnapshot,
}

/// Tagged union stored in the gesture table.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Drag(DragGesture),
    Pinch(PinchGesture),
}

impl Gesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            Gesture::Drag(_) => GestureKind::Drag,
            Gesture::Pinch(_) => GestureKind::Pinch,
        }
    }

    pub fn state(&self) -> GestureState {
        match self {
            Gesture::Drag(d) => d.state,
            Gesture::Pinch(p) => p.state,
        }
    }

    pub fn members(&self) -> &[ListenerId] {
        match self {
            Gesture::Drag(d) => &d.members,
            Gesture::Pinch(p) => &p.members,
        }
    }
}

/// Active gestures of one engine.
#[derive(Debug, Default)]
pub struct GestureTable {
    gestures: HashMap<GestureKey, Gesture>,
}

impl GestureTable {
    pub fn get(&self, key: &GestureKey) -> Option<&Gesture> {
        self.gestures.get(key)
    }

    pub fn drag(&self, pointer: PointerId) -> Option<&DragGesture> {
        match self.gestures.get(&GestureKey::Drag(pointer)) {
            Some(Gesture::Drag(d)) => Some(d),
            _ => None,
        }
    }

    pub fn drag_mut(&mut self, pointer: PointerId) -> Option<&mut DragGesture> {
        match self.gestures.get_mut(&GestureKey::Drag(pointer)) {
            Some(Gesture::Drag(d)) => Some(d),
            _ => None,
        }
    }

    pub fn pinch_mut(&mut self, key: &GestureKey) -> Option<&mut PinchGesture> {
        match self.gestures.get_mut(key) {
            Some(Gesture::Pinch(p)) => Some(p),
            _ => None,
        }
    }

    pub fn insert(&mut self, key: GestureKey, gesture: Gesture) {
        self.gestures.insert(key, gesture);
    }

    pub fn remove(&mut self, key: &GestureKey) -> Option<Gesture> {
        self.gestures.remove(key)
    }

    pub fn contains(&self, key: &GestureKey) -> bool {
        self.gestures.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    pub fn drag_count(&self) -> usize {
        self.gestures
            .values()
            .filter(|g| matches!(g, Gesture::Drag(d) if d.state == GestureState::Active))
            .count()
    }

    /// Pointers with an active drag.
    pub fn drag_pointers(&self) -> Vec<PointerId> {
        self.gestures
            .values()
            .filter_map(|g| match g {
                Gesture::Drag(d) if d.state == GestureState::Active => Some(d.pointer),
                _ => None,
            })
            .collect()
    }

    /// Removes and returns every pinch involving `pointer`.
    pub fn take_pinches_involving(&mut self, pointer: PointerId) -> Vec<(GestureKey, PinchGesture)> {
        let keys: Vec<GestureKey> = self
            .gestures
            .keys()
            .filter(|k| matches!(k, GestureKey::Pinch(..)) && k.involves(pointer))
            .copied()
            .collect();

        keys.into_iter()
            .filter_map(|k| match self.gestures.remove(&k) {
                Some(Gesture::Pinch(p)) => Some((k, p)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.gestures.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinch_key_displays_as_pair() {
        assert_eq!(GestureKey::Pinch(PointerId(0), PointerId(1)).to_string(), "0-1");
        assert_eq!(GestureKey::Drag(PointerId(4)).to_string(), "4");
    }

    #[test]
    fn drag_members_are_deduplicated_in_join_order() {
        let mut d = DragGesture::new(PointerId(1), ListenerId(10));
        assert!(d.add_member(ListenerId(11)));
        assert!(!d.add_member(ListenerId(10)));
        assert!(!d.add_member(ListenerId(11)));
        assert_eq!(d.members, vec![ListenerId(10), ListenerId(11)]);
    }

    #[test]
    fn take_pinches_only_removes_matching_pairs() {
        let mut t = GestureTable::default();
        let snap = |a: u64, b: u64| PinchSnapshot::new([PointerId(a), PointerId(b)], [Vec2::ZERO, Vec2::new(3.0, 4.0)]);
        for (a, b) in [(0, 1), (1, 2), (2, 3)] {
            t.insert(
                GestureKey::Pinch(PointerId(a), PointerId(b)),
                Gesture::Pinch(PinchGesture {
                    state: GestureState::Active,
                    members: vec![ListenerId(1)],
                    start: snap(a, b),
                    current: snap(a, b),
                }),
            );
        }
        t.insert(GestureKey::Drag(PointerId(1)), Gesture::Drag(DragGesture::new(PointerId(1), ListenerId(1))));

        let taken = t.take_pinches_involving(PointerId(1));
        assert_eq!(taken.len(), 2);
        assert_eq!(t.len(), 2);
        assert!(t.drag(PointerId(1)).is_some());
        assert_eq!(t.drag_count(), 1);
    }

    #[test]
    fn snapshot_distance_is_euclidean() {
        let s = PinchSnapshot::new([PointerId(0), PointerId(1)], [Vec2::ZERO, Vec2::new(3.0, 4.0)]);
        assert_eq!(s.distance, 5.0);
    }
}
