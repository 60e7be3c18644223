//! Deterministic category colors.
//!
//! The same category id yields the same color everywhere: arcs, endpoint
//! tinting, and the legend.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Odd 64-bit multiplier (golden ratio fraction).
const MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;

pub const CATEGORY_ALPHA: u8 = 255;

/// An RGBA color, serialized as `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const fn r(&self) -> u8 {
        self.0[0]
    }

    pub const fn g(&self) -> u8 {
        self.0[1]
    }

    pub const fn b(&self) -> u8 {
        self.0[2]
    }

    pub const fn a(&self) -> u8 {
        self.0[3]
    }
}

/// Color for a category id.
///
/// The id is multiplied by an odd constant and the three most significant
/// bytes of the product become red, green and blue. Category 0 is black.
///
/// # Examples
///
/// ```
/// use geocluster::compute::color_of;
///
/// let topic = color_of(42);
/// assert_eq!(topic, color_of(42));
/// assert_eq!(topic.a(), 255);
/// ```
pub const fn color_of(category_id: u32) -> Rgba {
    let h = (category_id as u64).wrapping_mul(MULTIPLIER);
    Rgba([
        (h >> 56) as u8,
        (h >> 48) as u8,
        (h >> 40) as u8,
        CATEGORY_ALPHA,
    ])
}

/// Legend entries for the given categories, first occurrence order.
pub fn legend(category_ids: impl IntoIterator<Item = u32>) -> Vec<(u32, Rgba)> {
    let mut seen = FxHashSet::default();
    category_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .map(|id| (id, color_of(id)))
        .collect()
}
