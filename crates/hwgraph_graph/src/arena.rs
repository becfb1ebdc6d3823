//! Sparse, ID-indexed storage for graph entities.
//!
//! Ids are allocated from a numbering space shared by several arenas, so a
//! single arena only ever fills some of its slots. Entities can also be
//! removed (edges replaced by aggregation, folded primitive nodes); their
//! slot is left empty and the id is never reused.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Trait for opaque ID types used as arena keys.
///
/// Implementors must provide a bijection between `u32` values and the ID type.
pub trait ArenaId: Copy {
    /// Creates an ID from a raw `u32` value.
    fn from_raw(raw: u32) -> Self;

    /// Returns the raw `u32` value.
    fn as_raw(self) -> u32;
}

/// A sparse container indexed directly by raw id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<I: ArenaId, T> {
    slots: Vec<Option<T>>,
    live: usize,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            _marker: PhantomData,
        }
    }

    /// Stores `item` under `id`, returning the previous occupant if any.
    pub fn insert(&mut self, id: I, item: T) -> Option<T> {
        let index = id.as_raw() as usize;
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        let previous = self.slots[index].replace(item);
        if previous.is_none() {
            self.live += 1;
        }
        previous
    }

    /// Removes and returns the item stored under `id`.
    pub fn remove(&mut self, id: I) -> Option<T> {
        let removed = self
            .slots
            .get_mut(id.as_raw() as usize)
            .and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Returns a reference to the item with the given ID.
    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.as_raw() as usize).and_then(Option::as_ref)
    }

    /// Returns a mutable reference to the item with the given ID.
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots
            .get_mut(id.as_raw() as usize)
            .and_then(Option::as_mut)
    }

    /// Returns `true` if an item is stored under `id`.
    pub fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    /// Returns the number of stored items.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the arena contains no items.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterates over `(ID, &T)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|item| (I::from_raw(i as u32), item)))
    }

    /// Iterates over references to items in id order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if nothing is stored under `id`.
    fn index(&self, id: I) -> &T {
        match self.get(id) {
            Some(item) => item,
            None => panic!("no arena entry for id {}", id.as_raw()),
        }
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        match self.get_mut(id) {
            Some(item) => item,
            None => panic!("no arena entry for id {}", id.as_raw()),
        }
    }
}
