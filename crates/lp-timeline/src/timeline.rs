//! `Timeline<O>`: date-ordered events with running totals.
//!
//! # Storage
//!
//! Events live in an `FxHashMap<EventId, Event<O>>`; their order lives in a
//! `BTreeMap<(Date, seq), EventId>`.  Splitting identity from position is
//! what lets [`Timeline::update`] move an event without changing its id, so
//! any record holding that id (a load plan, a cursor) stays valid.
//!
//! # Cost
//!
//! | Operation | Cost                                                       |
//! |-----------|------------------------------------------------------------|
//! | insert    | O(log n + k), k = events after the insertion point         |
//! | update    | O(log n + k), k = events after the earlier of old/new key  |
//! | erase     | O(log n + k)                                               |
//! | step      | O(log n) per cursor step, O(1) amortized for iterators     |
//!
//! The k term is the running-total refresh; it is unavoidable as long as each
//! event stores the cumulative quantity after itself.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};

use rustc_hash::FxHashMap;

use lp_core::{Date, EventId};

use crate::{Cursor, TimelineError, TimelineResult};

/// Ordering key: date first, then insertion sequence for stable ties.
type Key = (Date, u64);

/// Running totals closer than this are considered equal by [`Timeline::verify`].
const TOTAL_TOLERANCE: f64 = 1e-9;

// ── Event ─────────────────────────────────────────────────────────────────────

/// One dated entry on a timeline.
#[derive(Clone, Debug)]
pub struct Event<O> {
    pub id:         EventId,
    /// Who put this event on the timeline.
    pub owner:      O,
    pub date:       Date,
    /// Signed quantity contributed by this event.
    pub quantity:   f64,
    /// Sum of all quantities up to and including this event.
    pub cumulative: f64,
    seq:            u64,
}

impl<O> Event<O> {
    #[inline]
    fn key(&self) -> Key {
        (self.date, self.seq)
    }

    /// Tie-break rank among events on the same date (lower = earlier).
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.seq
    }
}

// ── Timeline ──────────────────────────────────────────────────────────────────

/// An ordered ledger of dated, signed quantities.
#[derive(Clone, Debug)]
pub struct Timeline<O> {
    events:     FxHashMap<EventId, Event<O>>,
    order:      BTreeMap<Key, EventId>,
    next_id:    u64,
    next_seq:   u64,
    /// Bumped on every mutation; cursors from older generations are stale.
    generation: u64,
}

impl<O> Default for Timeline<O> {
    fn default() -> Self {
        Self {
            events:     FxHashMap::default(),
            order:      BTreeMap::new(),
            next_id:    0,
            next_seq:   0,
            generation: 0,
        }
    }
}

impl<O> Timeline<O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Current mutation generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: EventId) -> Option<&Event<O>> {
        self.events.get(&id)
    }

    pub fn contains(&self, id: EventId) -> bool {
        self.events.contains_key(&id)
    }

    pub fn first(&self) -> Option<&Event<O>> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<&Event<O>> {
        self.iter().next_back()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Insert a new event after all existing events on the same date.
    pub fn insert(&mut self, owner: O, quantity: f64, date: Date) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        let seq = self.take_seq();

        self.events.insert(
            id,
            Event { id, owner, date, quantity, cumulative: 0.0, seq },
        );
        self.order.insert((date, seq), id);
        self.generation += 1;
        self.recompute_from((date, seq));
        id
    }

    /// Change an event's quantity and date, keeping its id.
    ///
    /// An event whose date changes is placed after the events already on the
    /// new date, exactly as a fresh insertion would be.  A quantity-only
    /// change leaves its position untouched.
    pub fn update(&mut self, id: EventId, quantity: f64, date: Date) -> TimelineResult<()> {
        let seq = if self.get(id).is_some_and(|e| e.date != date) {
            Some(self.take_seq())
        } else {
            None
        };

        let event = self
            .events
            .get_mut(&id)
            .ok_or(TimelineError::UnknownEvent(id))?;
        let old_key = event.key();
        event.quantity = quantity;
        if let Some(seq) = seq {
            event.date = date;
            event.seq = seq;
            self.order.remove(&old_key);
            self.order.insert((date, seq), id);
        }
        let new_key = (date, seq.unwrap_or(old_key.1));

        self.generation += 1;
        self.recompute_from(old_key.min(new_key));
        Ok(())
    }

    /// Remove an event and return it.
    pub fn erase(&mut self, id: EventId) -> TimelineResult<Event<O>> {
        let event = self
            .events
            .remove(&id)
            .ok_or(TimelineError::UnknownEvent(id))?;
        let key = event.key();
        self.order.remove(&key);
        self.generation += 1;
        self.recompute_from(key);
        Ok(event)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// All events in timeline order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Event<O>> + '_ {
        self.order.values().filter_map(move |id| self.events.get(id))
    }

    /// Events from `id` (inclusive) towards the end.
    pub fn iter_from(&self, id: EventId) -> TimelineResult<impl Iterator<Item = &Event<O>> + '_> {
        let key = self.key_of(id)?;
        Ok(self
            .order
            .range(key..)
            .filter_map(move |(_, id)| self.events.get(id)))
    }

    /// Events from `id` (inclusive) back to the beginning.
    pub fn iter_back_from(
        &self,
        id: EventId,
    ) -> TimelineResult<impl Iterator<Item = &Event<O>> + '_> {
        let key = self.key_of(id)?;
        Ok(self
            .order
            .range(..=key)
            .rev()
            .filter_map(move |(_, id)| self.events.get(id)))
    }

    /// Events dated on or after `date`.
    pub fn iter_from_date(&self, date: Date) -> impl Iterator<Item = &Event<O>> + '_ {
        self.order
            .range((Included((date, 0)), Unbounded))
            .filter_map(move |(_, id)| self.events.get(id))
    }

    /// Running total after every event dated on or before `date`.
    pub fn onhand_at(&self, date: Date) -> f64 {
        self.order
            .range(..=(date, u64::MAX))
            .next_back()
            .and_then(|(_, id)| self.events.get(id))
            .map_or(0.0, |e| e.cumulative)
    }

    /// Check ordering and running totals; returns the first inconsistency.
    pub fn verify(&self) -> TimelineResult<()> {
        if self.order.len() != self.events.len() {
            return Err(TimelineError::Corrupt(format!(
                "{} ordered keys but {} events",
                self.order.len(),
                self.events.len()
            )));
        }
        let mut running = 0.0;
        let mut prev: Option<Date> = None;
        for (key, id) in &self.order {
            let event = self.events.get(id).ok_or(TimelineError::UnknownEvent(*id))?;
            if event.key() != *key {
                return Err(TimelineError::Corrupt(format!("{id} stored under a stale key")));
            }
            if prev.is_some_and(|p| p > event.date) {
                return Err(TimelineError::Corrupt(format!("{id} out of date order")));
            }
            running += event.quantity;
            if (running - event.cumulative).abs() > TOTAL_TOLERANCE {
                return Err(TimelineError::Corrupt(format!(
                    "{id} running total {} expected {running}",
                    event.cumulative
                )));
            }
            prev = Some(event.date);
        }
        Ok(())
    }

    // ── Cursors ───────────────────────────────────────────────────────────

    /// A cursor positioned exactly at `id`.
    pub fn cursor_at(&self, id: EventId) -> TimelineResult<Cursor> {
        self.key_of(id)?;
        Ok(Cursor { at: Some(id), generation: self.generation })
    }

    /// A cursor at the first event (exhausted if the timeline is empty).
    pub fn cursor_front(&self) -> Cursor {
        Cursor {
            at:         self.order.values().next().copied(),
            generation: self.generation,
        }
    }

    /// A cursor at the last event (exhausted if the timeline is empty).
    pub fn cursor_back(&self) -> Cursor {
        Cursor {
            at:         self.order.values().next_back().copied(),
            generation: self.generation,
        }
    }

    /// Return the event under the cursor and move it one step forward.
    pub fn step_forward(&self, cursor: &mut Cursor) -> TimelineResult<Option<&Event<O>>> {
        let Some(event) = self.cursor_event(cursor)? else {
            return Ok(None);
        };
        cursor.at = self
            .order
            .range((Excluded(event.key()), Unbounded))
            .next()
            .map(|(_, id)| *id);
        Ok(Some(event))
    }

    /// Return the event under the cursor and move it one step backward.
    pub fn step_back(&self, cursor: &mut Cursor) -> TimelineResult<Option<&Event<O>>> {
        let Some(event) = self.cursor_event(cursor)? else {
            return Ok(None);
        };
        cursor.at = self.order.range(..event.key()).next_back().map(|(_, id)| *id);
        Ok(Some(event))
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn key_of(&self, id: EventId) -> TimelineResult<Key> {
        self.events
            .get(&id)
            .map(Event::key)
            .ok_or(TimelineError::UnknownEvent(id))
    }

    fn cursor_event(&self, cursor: &Cursor) -> TimelineResult<Option<&Event<O>>> {
        if cursor.generation != self.generation {
            return Err(TimelineError::StaleCursor {
                cursor:  cursor.generation,
                current: self.generation,
            });
        }
        match cursor.at {
            None => Ok(None),
            Some(id) => self.events.get(&id).map(Some).ok_or(TimelineError::UnknownEvent(id)),
        }
    }

    /// Refresh running totals for every event at or after `from`.
    fn recompute_from(&mut self, from: Key) {
        let mut running = self
            .order
            .range(..from)
            .next_back()
            .and_then(|(_, id)| self.events.get(id))
            .map_or(0.0, |e| e.cumulative);
        for id in self.order.range(from..).map(|(_, id)| id) {
            if let Some(event) = self.events.get_mut(id) {
                running += event.quantity;
                event.cumulative = running;
            }
        }
    }
}
