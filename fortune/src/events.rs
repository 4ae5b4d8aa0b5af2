//! The event queue.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashMap},
};

use ordered_float::NotNan;

use crate::{beach_line::ArcIdx, geom::Point, sites::SiteIdx, SiteSet};

/// The position of an event in the queue.
///
/// Keys are ordered the way the sweep visits them: by decreasing `y`, and
/// then in the order they were pushed. A key identifies its event, so an arc
/// remembers its pending circle event by key and cancels it by key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct EventKey {
    y: Reverse<NotNan<f64>>,
    seq: u64,
}

impl EventKey {
    /// The height of the sweep line when this event happens.
    pub fn y(&self) -> f64 {
        self.y.0.into_inner()
    }
}

impl std::fmt::Debug for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}@{:?}", self.seq, self.y())
    }
}

/// A predicted disappearance of an arc.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CircleEvent {
    /// The lowest point of the circle: the sweep line touches it here.
    pub bottom: Point,
    /// The center of the circle, which becomes a Voronoi vertex.
    pub center: Point,
    /// The radius of the circle.
    pub radius: f64,
    /// The sites of the three consecutive arcs, from left to right.
    pub sites: [SiteIdx; 3],
    /// The middle arc, which disappears.
    pub arc: ArcIdx,
}

/// Something that happens when the sweep line reaches a certain height.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum Event {
    /// The sweep line reaches a site.
    Site(SiteIdx),
    /// An arc shrinks to a point.
    Circle(CircleEvent),
}

/// The pending events, in sweep order.
///
/// Besides the usual priority-queue operations, this supports removing an
/// event that's no longer valid, and it refuses to hold two circle events
/// for the same three sites.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: BTreeMap<EventKey, Event>,
    triples: HashMap<[SiteIdx; 3], EventKey>,
    next_seq: u64,
}

impl EventQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue holding a site event for every site.
    pub fn with_sites(sites: &SiteSet) -> Self {
        let mut queue = Self::new();
        for (idx, p) in sites.iter() {
            queue.push(p.y, Event::Site(idx));
        }
        queue
    }

    fn push(&mut self, y: f64, event: Event) -> EventKey {
        // unwrap: site coordinates are checked on input, and circles through
        // finite sites have finite centers
        let key = EventKey {
            y: Reverse(NotNan::new(y).unwrap()),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.events.insert(key, event);
        key
    }

    /// Adds a circle event, unless there's already one for the same sites.
    pub fn push_circle(&mut self, event: CircleEvent) -> Option<EventKey> {
        if self.triples.contains_key(&event.sites) {
            return None;
        }
        let key = self.push(event.bottom.y, Event::Circle(event));
        self.triples.insert(event.sites, key);
        Some(key)
    }

    /// Is there a pending circle event for these sites (in this order)?
    pub fn contains_triple(&self, sites: &[SiteIdx; 3]) -> bool {
        self.triples.contains_key(sites)
    }

    fn forget(&mut self, event: &Event) {
        if let Event::Circle(c) = event {
            self.triples.remove(&c.sites);
        }
    }

    /// Removes an event if it's still pending.
    pub fn cancel(&mut self, key: EventKey) -> Option<Event> {
        let event = self.events.remove(&key)?;
        self.forget(&event);
        Some(event)
    }

    /// Removes and returns the next event.
    pub fn pop(&mut self) -> Option<(EventKey, Event)> {
        let (key, event) = self.events.pop_first()?;
        self.forget(&event);
        Some((key, event))
    }

    /// The next event, without removing it.
    pub fn peek(&self) -> Option<(&EventKey, &Event)> {
        self.events.first_key_value()
    }

    /// Is this event still pending?
    pub fn contains(&self, key: &EventKey) -> bool {
        self.events.contains_key(key)
    }

    /// The number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Are there no pending events?
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The pending events, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&EventKey, &Event)> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn circle(y: f64, sites: [usize; 3]) -> CircleEvent {
        CircleEvent {
            bottom: Point::new(0.0, y),
            center: Point::new(0.0, y + 1.0),
            radius: 1.0,
            sites: sites.map(SiteIdx),
            arc: ArcIdx(0),
        }
    }

    #[test]
    fn sweep_order() {
        let sites = SiteSet::new([(0.0, 0.0), (1.0, 2.0), (2.0, 1.0)]).unwrap();
        let mut queue = EventQueue::with_sites(&sites);
        queue.push_circle(circle(1.5, [0, 1, 2])).unwrap();

        let ys: Vec<_> = std::iter::from_fn(|| queue.pop())
            .map(|(k, _)| k.y())
            .collect();
        assert_eq!(ys, vec![2.0, 1.5, 1.0, 0.0]);
    }

    #[test]
    fn ties_pop_in_push_order() {
        let mut queue = EventQueue::new();
        let first = queue.push_circle(circle(1.0, [0, 1, 2])).unwrap();
        let second = queue.push_circle(circle(1.0, [1, 2, 3])).unwrap();
        assert!(first < second);
        assert_eq!(queue.pop().unwrap().0, first);
    }

    #[test]
    fn duplicate_triples() {
        let mut queue = EventQueue::new();
        let key = queue.push_circle(circle(1.0, [0, 1, 2])).unwrap();
        assert!(queue.push_circle(circle(1.0, [0, 1, 2])).is_none());
        // Same sites, different arcs: not the same event.
        assert!(queue.push_circle(circle(1.0, [2, 1, 0])).is_some());

        assert_matches!(queue.cancel(key), Some(Event::Circle(_)));
        assert!(!queue.contains_triple(&[0, 1, 2].map(SiteIdx)));
        assert!(queue.cancel(key).is_none());
        assert!(queue.push_circle(circle(1.0, [0, 1, 2])).is_some());
    }

    #[test]
    fn popping_forgets_the_triple() {
        let mut queue = EventQueue::new();
        queue.push_circle(circle(1.0, [0, 1, 2])).unwrap();
        assert_matches!(queue.pop(), Some((_, Event::Circle(_))));
        assert!(queue.is_empty());
        assert!(!queue.contains_triple(&[0, 1, 2].map(SiteIdx)));
    }
}
