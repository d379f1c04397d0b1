use kurbo::Point;

use crate::event::ContactKind;

pub const MAX_CONTACTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: i32,
    pub point: Point,
    pub kind: ContactKind,
}

/// Fixed-capacity ordered map of active contacts keyed by platform pointer id.
///
/// Insertion order is kept: the first contact down stays at index 0 until it
/// is removed.
#[derive(Debug, Clone, Default)]
pub struct ContactTable {
    slots: [Option<Contact>; MAX_CONTACTS],
    len: usize,
}

impl ContactTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == MAX_CONTACTS
    }

    pub fn contains(&self, id: i32) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: i32) -> Option<&Contact> {
        self.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.slots[..self.len].iter().flatten()
    }

    pub fn other(&self, id: i32) -> Option<&Contact> {
        self.iter().find(|c| c.id != id)
    }

    /// Adds a new contact. Returns `false` (and stores nothing) when the table
    /// is full or the id is already tracked.
    pub fn insert(&mut self, contact: Contact) -> bool {
        if self.is_full() || self.contains(contact.id) {
            return false;
        }
        self.slots[self.len] = Some(contact);
        self.len += 1;
        true
    }

    pub fn update(&mut self, id: i32, point: Point) -> bool {
        match self.slots[..self.len].iter_mut().flatten().find(|c| c.id == id) {
            Some(c) => {
                c.point = point;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: i32) -> Option<Contact> {
        let idx = self.slots[..self.len]
            .iter()
            .position(|s| s.is_some_and(|c| c.id == id))?;
        let removed = self.slots[idx].take();
        // shift the survivor down to keep the occupied prefix contiguous
        for i in idx..self.len - 1 {
            self.slots[i] = self.slots[i + 1].take();
        }
        self.len -= 1;
        removed
    }

    pub fn clear(&mut self) {
        self.slots = [None; MAX_CONTACTS];
        self.len = 0;
    }
}
