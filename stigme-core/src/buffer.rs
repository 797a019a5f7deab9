//! Sample buffer partitioning.
//!
//! Captured timestamps land in a single fixed-size buffer shared by all
//! lanes. At configuration time the buffer is split into one equal
//! contiguous region per active lane; each lane's DMA engine writes
//! only inside its own region.

use heapless::Vec;
use stigme_protocol::CHANNEL_COUNT;

/// Total timestamp slots in the sample buffer, across all lanes.
pub const SAMPLE_CAPACITY: usize = 10_000;

/// One lane's contiguous slice of the sample buffer, in slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleRegion {
    /// First slot of the region.
    pub offset: usize,
    /// Slots in the region.
    pub len: usize,
}

impl SampleRegion {
    /// First slot past the region.
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Split the sample buffer into `channel_count` equal contiguous
/// regions, one per active lane in ascending lane order.
///
/// `channel_count` must be in 1..=4; the capture core validates
/// requests before partitioning.
pub fn partition(channel_count: usize) -> Vec<SampleRegion, CHANNEL_COUNT> {
    debug_assert!((1..=CHANNEL_COUNT).contains(&channel_count));

    let len = SAMPLE_CAPACITY / channel_count;
    let mut regions = Vec::new();
    for i in 0..channel_count.min(CHANNEL_COUNT) {
        // Cannot overflow: the loop is bounded by the Vec's capacity.
        let _ = regions.push(SampleRegion {
            offset: i * len,
            len,
        });
    }
    regions
}
