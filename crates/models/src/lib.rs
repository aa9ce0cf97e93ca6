//! Domain records for the salon content documents.
//! - One record type per content collection, plus the single-object salon document.
//! - Creation inputs and partial-update patches carry their own validation.
//! - Persistence is the `service` crate's concern; records only know their shape.

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod errors;
pub mod validate;

pub mod contact;
pub mod menu_item;
pub mod news_item;
pub mod salon;
pub mod style_image;
pub mod stylist;

pub use contact::{ContactMessage, ContactMessageInput};
pub use menu_item::{MenuItem, MenuItemInput, MenuItemPatch};
pub use news_item::{NewsItem, NewsItemInput, NewsItemPatch};
pub use salon::{SalonInfo, SocialLink, SALON_KEY};
pub use style_image::{StyleImage, StyleImageInput, StyleImagePatch};
pub use stylist::{Stylist, StylistInput, StylistPatch};

/// A record living inside one array document in the bucket.
///
/// `KEY` names the document the collection is stored under; `id` is unique
/// within that document after any successful write.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KEY: &'static str;

    fn id(&self) -> &str;
}
