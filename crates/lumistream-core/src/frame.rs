//! Shared color frame state.
//!
//! The capture listener produces complete frames; the streaming loop consumes
//! them. Frames are replaced wholesale and read as atomic snapshots so the
//! loop never observes a half-written frame: publishing swaps an `Arc`
//! handle, it never mutates a published frame in place.

use crate::color::Rgb;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// One complete snapshot of target colors for all sectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorFrame {
    sectors: Vec<Rgb>,
}

impl ColorFrame {
    /// An all-black frame with `sector_count` sectors.
    pub fn black(sector_count: usize) -> Self {
        Self {
            sectors: vec![Rgb::BLACK; sector_count],
        }
    }

    /// Build a frame from per-sector colors.
    pub fn from_sectors(sectors: Vec<Rgb>) -> Self {
        Self { sectors }
    }

    /// Color for sector `index`, if in range.
    pub fn sector(&self, index: usize) -> Option<Rgb> {
        self.sectors.get(index).copied()
    }

    /// Number of sectors. Fixed for the duration of a session.
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }
}

/// Handle shared between the capture listener (writer) and the streaming
/// loop (reader).
#[derive(Debug)]
pub struct SharedFrame {
    inner: ArcSwap<ColorFrame>,
}

impl SharedFrame {
    /// Create shared state seeded with an all-black frame.
    pub fn new(sector_count: usize) -> Self {
        Self {
            inner: ArcSwap::from_pointee(ColorFrame::black(sector_count)),
        }
    }

    /// Replace the current frame. The previous frame stays valid for readers
    /// that already snapshotted it.
    pub fn publish(&self, frame: ColorFrame) {
        self.inner.store(Arc::new(frame));
    }

    /// Take an atomic snapshot of the current frame.
    pub fn snapshot(&self) -> Arc<ColorFrame> {
        self.inner.load_full()
    }
}
