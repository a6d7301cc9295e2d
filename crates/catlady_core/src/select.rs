use std::ops::Range;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::Snapshot;

/// Substrings that mark a URL as an image or video link. Matching is
/// case-sensitive containment, not pattern matching.
pub const IMAGE_WHITELIST: &[&str] = &[
    "imgur.com",
    "imgur",
    "giphy",
    "flickr",
    "photobucket",
    "youtube",
    "youtu.be",
    "gif",
    "gifv",
    "png",
    "jpg",
    "tiff",
    "webem",
    "bmp",
    "flv",
    "mpg",
    "mpeg",
    "avi",
];

const ANIMATED_HOST_MARKER: &str = "imgur";
const RAW_ANIMATED_SUFFIX: &str = "gif";

/// Result of one selection pass over a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    /// The chosen, normalized URL, or `None` if nothing qualified.
    pub url: Option<String>,
    /// Number of submissions inspected, adult ones included.
    pub inspected: usize,
    pub adult_skipped: usize,
}

pub fn is_image_url(url: &str) -> bool {
    IMAGE_WHITELIST.iter().any(|marker| url.contains(marker))
}

/// Rewrites raw animated links on the image host to its playback variant
/// (`.gif` -> `.gifv`). Everything else is returned unchanged.
pub fn normalize_url(url: &str) -> String {
    if url.contains(ANIMATED_HOST_MARKER) && url.ends_with(RAW_ANIMATED_SUFFIX) {
        return format!("{url}v");
    }
    url.to_string()
}

/// Indices the selector may draw from for a snapshot of `len` entries.
///
/// The final entry is excluded whenever there is more than one: draws come
/// from `[0, len - 1)`. A single-entry snapshot draws index 0.
pub fn reachable_indices(len: usize) -> Range<usize> {
    match len {
        0 => 0..0,
        1 => 0..1,
        n => 0..n - 1,
    }
}

/// Picks a random safe-for-work image URL using the thread-local RNG.
pub fn select_image(snapshot: &Snapshot) -> Selection {
    select_image_with(snapshot, &mut rand::thread_rng())
}

/// Visits the reachable indices in shuffled order, each at most once, and
/// returns the first non-adult submission whose URL is on the whitelist.
pub fn select_image_with<R: Rng + ?Sized>(snapshot: &Snapshot, rng: &mut R) -> Selection {
    let mut order: Vec<usize> = reachable_indices(snapshot.len()).collect();
    order.shuffle(rng);

    let mut selection = Selection::default();
    for index in order {
        selection.inspected += 1;
        let submission = &snapshot.submissions()[index];
        if submission.adult {
            selection.adult_skipped += 1;
            continue;
        }
        if is_image_url(&submission.url) {
            selection.url = Some(normalize_url(&submission.url));
            break;
        }
    }
    selection
}
