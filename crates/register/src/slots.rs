//! Fixed photo slots and the gallery view derived from them.
//!
//! The gallery shows filled slots in slot order, compacted, followed by an
//! "add" cell while there is room and the product is not being edited.

use crate::controller::EditMode;
use thiserror::Error;

/// Maximum photos per product.
pub const MAX_PRODUCT_IMAGES: usize = 5;

/// Slot index outside `0..MAX_PRODUCT_IMAGES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Slot {slot} is out of range (capacity {capacity})")]
pub struct SlotError {
    /// Requested slot
    pub slot: usize,
    /// Slot capacity
    pub capacity: usize,
}

/// A cell in the photo gallery.
#[derive(Debug, PartialEq, Eq)]
pub enum GalleryCell<'a, T> {
    /// A filled slot
    Image(&'a T),
    /// The trailing "add photo" button
    AddButton,
}

/// Five ordered slots, each optionally holding a photo.
#[derive(Debug, Clone)]
pub struct ImageSlots<T> {
    slots: [Option<T>; MAX_PRODUCT_IMAGES],
}

impl<T> Default for ImageSlots<T> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl<T> ImageSlots<T> {
    /// Empty slots.
    pub fn new() -> Self {
        Self::default()
    }

    fn check(slot: usize) -> Result<(), SlotError> {
        if slot < MAX_PRODUCT_IMAGES {
            Ok(())
        } else {
            Err(SlotError {
                slot,
                capacity: MAX_PRODUCT_IMAGES,
            })
        }
    }

    /// Photo in `slot`, if any.
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Put `item` in `slot`, returning what was there.
    pub fn set(&mut self, slot: usize, item: T) -> Result<Option<T>, SlotError> {
        Self::check(slot)?;
        Ok(self.slots[slot].replace(item))
    }

    /// Put `item` in `slot`, replacing any previous photo, and return the stored item.
    pub fn insert(&mut self, slot: usize, item: T) -> Result<&T, SlotError> {
        Self::check(slot)?;
        Ok(self.slots[slot].insert(item))
    }

    /// Empty `slot`, returning what was there.
    pub fn clear(&mut self, slot: usize) -> Result<Option<T>, SlotError> {
        Self::check(slot)?;
        Ok(self.slots[slot].take())
    }

    /// Number of filled slots.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Filled slots in slot order.
    pub fn filled(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// True when every slot is filled.
    pub fn is_full(&self) -> bool {
        self.active_count() == MAX_PRODUCT_IMAGES
    }

    /// True when no slot is filled.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    fn shows_add_button(&self, mode: EditMode) -> bool {
        mode == EditMode::Registering && !self.is_full()
    }

    /// Number of gallery cells.
    pub fn item_count(&self, mode: EditMode) -> usize {
        self.active_count() + usize::from(self.shows_add_button(mode))
    }

    /// Gallery cell at `item`.
    pub fn cell_at(&self, item: usize, mode: EditMode) -> Option<GalleryCell<'_, T>> {
        if let Some(image) = self.filled().nth(item) {
            return Some(GalleryCell::Image(image));
        }
        if item == self.active_count() && self.shows_add_button(mode) {
            return Some(GalleryCell::AddButton);
        }
        None
    }

    /// Slot a photo picked from gallery `item` should land in.
    ///
    /// An image cell maps to the slot it shows; the add cell maps to the
    /// first empty slot.
    pub fn slot_for_item(&self, item: usize) -> Option<usize> {
        let mut filled = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| i);

        if let Some(slot) = filled.nth(item) {
            return Some(slot);
        }
        if item == self.active_count() {
            return self.slots.iter().position(Option::is_none);
        }
        None
    }
}
