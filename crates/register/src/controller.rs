//! The registration screen controller.
//!
//! One object owns all screen state. Each interaction surface is a separate
//! trait so a front end only depends on what it drives:
//!
//! - [`GalleryDataSource`]: what the photo strip shows
//! - [`GallerySelection`]: tapping a cell
//! - [`PhotoPickerDelegate`]: a photo coming back from the picker
//! - [`CurrencyControl`]: the currency segment
//! - [`SubmitAction`]: the done button

use crate::currency::{on_currency_changed, Currency, UiEffects};
use crate::error::{RegisterError, Result};
use crate::request::{ProductUploader, RegistrationRequest, UploadReceipt};
use crate::slots::{GalleryCell, ImageSlots};
use crate::validation::{validate, ProductDraft};
use image::DynamicImage;
use openmarket_image::{ImageUploadPreparer, PreparationReport, PreparedImage};
use tracing::{debug, info};

/// Whether a new product is being registered or an existing one edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// New listing; photos can be added
    #[default]
    Registering,
    /// Existing listing; photos are fixed
    Editing,
}

/// A request to open the photo picker for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickRequest {
    /// Gallery item that was tapped
    pub item: usize,
    /// Slot the picked photo will fill
    pub slot: usize,
}

/// Contents of the photo strip.
pub trait GalleryDataSource {
    /// Item type shown in image cells.
    type Item;

    /// Number of cells.
    fn item_count(&self) -> usize;

    /// Cell at `item`, or `None` past the end.
    fn cell_at(&self, item: usize) -> Option<GalleryCell<'_, Self::Item>>;
}

/// Taps on the photo strip.
pub trait GallerySelection {
    /// Handle a tap. Returns the picker request to present, if any.
    fn select_item(&mut self, item: usize) -> Option<PickRequest>;
}

/// Photos returned by the picker.
pub trait PhotoPickerDelegate {
    /// Prepare `photo` and store it in the pending slot.
    fn did_pick(&mut self, photo: &DynamicImage) -> Result<&PreparationReport>;

    /// The picker was dismissed without a photo.
    fn did_cancel(&mut self);
}

/// The currency segment.
pub trait CurrencyControl {
    /// Select the currency at segment `index`. `None` for an unknown index.
    fn select_currency(&mut self, index: usize) -> Option<UiEffects>;
}

/// The done button.
pub trait SubmitAction {
    /// Validate `draft`, build the request and hand it to the uploader.
    fn submit(&self, draft: &ProductDraft) -> Result<UploadReceipt>;
}

/// State behind the registration screen.
pub struct RegisterProductController<U> {
    mode: EditMode,
    currency: Currency,
    slots: ImageSlots<PreparedImage>,
    pending_slot: Option<usize>,
    preparer: ImageUploadPreparer,
    uploader: U,
}

impl<U: ProductUploader> RegisterProductController<U> {
    /// Controller for a new listing.
    pub fn new(preparer: ImageUploadPreparer, uploader: U) -> Self {
        Self {
            mode: EditMode::Registering,
            currency: Currency::default(),
            slots: ImageSlots::new(),
            pending_slot: None,
            preparer,
            uploader,
        }
    }

    /// Switch between registering and editing.
    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
        if mode == EditMode::Editing {
            self.pending_slot = None;
        }
    }

    /// Current mode.
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Navigation title for the current mode.
    pub fn title(&self) -> &'static str {
        match self.mode {
            EditMode::Registering => "Register Product",
            EditMode::Editing => "Edit Product",
        }
    }

    /// Selected currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Photo slots.
    pub fn slots(&self) -> &ImageSlots<PreparedImage> {
        &self.slots
    }

    /// Remove the photo in `slot`.
    pub fn remove_photo(&mut self, slot: usize) -> Result<Option<PreparedImage>> {
        if self.mode == EditMode::Editing {
            return Err(RegisterError::ReadOnly);
        }
        Ok(self.slots.clear(slot)?)
    }

    /// Slot waiting for a picked photo.
    pub fn pending_slot(&self) -> Option<usize> {
        self.pending_slot
    }

    /// The uploader.
    pub fn uploader(&self) -> &U {
        &self.uploader
    }
}

impl<U: ProductUploader> GalleryDataSource for RegisterProductController<U> {
    type Item = PreparedImage;

    fn item_count(&self) -> usize {
        self.slots.item_count(self.mode)
    }

    fn cell_at(&self, item: usize) -> Option<GalleryCell<'_, PreparedImage>> {
        self.slots.cell_at(item, self.mode)
    }
}

impl<U: ProductUploader> GallerySelection for RegisterProductController<U> {
    fn select_item(&mut self, item: usize) -> Option<PickRequest> {
        if self.mode == EditMode::Editing {
            return None;
        }
        let slot = self.slots.slot_for_item(item)?;
        self.pending_slot = Some(slot);
        debug!(item, slot, "Opening photo picker");
        Some(PickRequest { item, slot })
    }
}

impl<U: ProductUploader> PhotoPickerDelegate for RegisterProductController<U> {
    fn did_pick(&mut self, photo: &DynamicImage) -> Result<&PreparationReport> {
        if self.mode == EditMode::Editing {
            return Err(RegisterError::ReadOnly);
        }
        let slot = self.pending_slot.take().ok_or(RegisterError::NoPendingPick)?;

        let prepared = self.preparer.prepare(photo)?;
        let stored = self.slots.insert(slot, prepared)?;
        info!(
            slot,
            bytes = stored.encoded.len(),
            side = stored.encoded.width(),
            "Stored product photo"
        );
        Ok(&stored.report)
    }

    fn did_cancel(&mut self) {
        self.pending_slot = None;
    }
}

impl<U: ProductUploader> CurrencyControl for RegisterProductController<U> {
    fn select_currency(&mut self, index: usize) -> Option<UiEffects> {
        let new = Currency::from_index(index)?;
        let effects = on_currency_changed(self.currency, new);
        self.currency = new;
        Some(effects)
    }
}

impl<U: ProductUploader> SubmitAction for RegisterProductController<U> {
    fn submit(&self, draft: &ProductDraft) -> Result<UploadReceipt> {
        let params = validate(draft, self.currency, &self.slots)?;
        let images = self
            .slots
            .filled()
            .map(|prepared| prepared.encoded.clone())
            .collect();

        let request = RegistrationRequest::new(params, images);
        let receipt = self.uploader.upload(&request)?;

        info!(
            request_id = %receipt.request_id,
            images = request.images().len(),
            body_len = receipt.body_len,
            "Submitted product registration"
        );
        Ok(receipt)
    }
}
