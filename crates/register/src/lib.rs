//! Product registration for OpenMarket, without the GUI.
//!
//! This crate models the "register product" screen as plain state:
//! - Currency selection and the field effects it triggers
//! - Five fixed photo slots and the gallery derived from them
//! - Draft validation into marketplace post parameters
//! - Registration requests and the uploader capability
//! - A controller tying the pieces together behind small capability traits

#![warn(missing_docs)]

pub mod controller;
pub mod currency;
mod error;
pub mod request;
pub mod slots;
pub mod validation;

pub use controller::{
    CurrencyControl, EditMode, GalleryDataSource, GallerySelection, PhotoPickerDelegate,
    PickRequest, RegisterProductController, SubmitAction,
};
pub use currency::{on_currency_changed, Currency, KeyboardKind, UiEffects};
pub use error::{RegisterError, Result};
pub use request::{ProductUploader, RegistrationRequest, UploadError, UploadReceipt};
pub use slots::{GalleryCell, ImageSlots, SlotError, MAX_PRODUCT_IMAGES};
pub use validation::{validate, PostParameter, ProductDraft, ValidationError};
