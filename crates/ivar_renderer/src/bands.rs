//! Row-band partitioning for parallel rendering.
//!
//! The output buffer is cut into contiguous bands of whole rows, one per
//! worker, so each worker writes a disjoint slice with no locking.

/// A contiguous range of buffer rows `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBand {
    pub start: u32,
    pub end: u32,
}

impl RowBand {
    pub fn rows(&self) -> u32 {
        self.end - self.start
    }

    pub fn contains(&self, row: u32) -> bool {
        (self.start..self.end).contains(&row)
    }
}

/// Split `height` rows into at most `count` bands whose sizes differ by at most one.
///
/// The first `height % count` bands take the extra row. Never returns an
/// empty band; zero rows yield no bands at all.
pub fn split_rows(height: u32, count: usize) -> Vec<RowBand> {
    if height == 0 {
        return Vec::new();
    }

    let count = count.clamp(1, height as usize) as u32;
    let base = height / count;
    let extra = height % count;

    let mut bands = Vec::with_capacity(count as usize);
    let mut start = 0;
    for index in 0..count {
        let rows = base + u32::from(index < extra);
        bands.push(RowBand { start, end: start + rows });
        start += rows;
    }

    bands
}
