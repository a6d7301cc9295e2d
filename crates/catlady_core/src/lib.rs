//! Catlady core: pure domain types and the image selection algorithm.
mod clock;
mod credential;
mod select;
mod submission;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::Credential;
pub use select::{
    is_image_url, normalize_url, reachable_indices, select_image, select_image_with, Selection,
    IMAGE_WHITELIST,
};
pub use submission::{Snapshot, Submission};
