//! Owned multi-channel sample storage.
//!
//! [`Frames`] keeps one row per channel in a single contiguous allocation.
//! Everything that touches audio in lento reads through the [`Planar`] trait,
//! so callers can hand in `Vec<Vec<f32>>`, arrays of slices, or a `Frames`
//! without copying.

use crate::{Error, Result};

/// Read access to planar audio: one slice per channel.
pub trait Planar {
    /// Number of channels in the block.
    fn channel_count(&self) -> usize;

    /// Samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= channel_count()`.
    fn channel(&self, index: usize) -> &[f32];

    /// Frames every channel can supply (the shortest channel length).
    fn frames(&self) -> usize {
        (0..self.channel_count())
            .map(|ch| self.channel(ch).len())
            .min()
            .unwrap_or(0)
    }
}

/// Write access to planar audio.
pub trait PlanarMut: Planar {
    /// Mutable samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= channel_count()`.
    fn channel_mut(&mut self, index: usize) -> &mut [f32];
}

impl<S: AsRef<[f32]>> Planar for [S] {
    #[inline]
    fn channel_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn channel(&self, index: usize) -> &[f32] {
        self[index].as_ref()
    }
}

impl<S: AsRef<[f32]> + AsMut<[f32]>> PlanarMut for [S] {
    #[inline]
    fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        self[index].as_mut()
    }
}

impl<S: AsRef<[f32]>, const N: usize> Planar for [S; N] {
    #[inline]
    fn channel_count(&self) -> usize {
        N
    }

    #[inline]
    fn channel(&self, index: usize) -> &[f32] {
        self[index].as_ref()
    }
}

impl<S: AsRef<[f32]> + AsMut<[f32]>, const N: usize> PlanarMut for [S; N] {
    #[inline]
    fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        self[index].as_mut()
    }
}

impl<S: AsRef<[f32]>> Planar for Vec<S> {
    #[inline]
    fn channel_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn channel(&self, index: usize) -> &[f32] {
        self[index].as_ref()
    }
}

impl<S: AsRef<[f32]> + AsMut<[f32]>> PlanarMut for Vec<S> {
    #[inline]
    fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        self[index].as_mut()
    }
}

/// Channel-major sample matrix (`channels` rows x `len` columns).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frames {
    data: Vec<f32>,
    channels: usize,
    len: usize,
}

impl Frames {
    /// Zero-filled matrix.
    pub fn new(channels: usize, len: usize) -> Self {
        Self {
            data: vec![0.0; channels * len],
            channels,
            len,
        }
    }

    /// Copy a planar block, truncating every channel to the shortest one.
    pub fn from_planar<B: Planar + ?Sized>(block: &B) -> Self {
        let channels = block.channel_count();
        let len = block.frames();
        let mut frames = Self::new(channels, len);
        for ch in 0..channels {
            frames
                .channel_mut(ch)
                .copy_from_slice(&block.channel(ch)[..len]);
        }
        frames
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Columns (samples per channel).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        let idx = self.index(row, col)?;
        Ok(self.data[idx])
    }

    /// Overwrite the element at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Result<()> {
        let idx = self.index(row, col)?;
        self.data[idx] = value;
        Ok(())
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.channels {
            return Err(Error::RowOutOfRange {
                row,
                rows: self.channels,
            });
        }
        if col >= self.len {
            return Err(Error::ColumnOutOfRange {
                col,
                cols: self.len,
            });
        }
        Ok(row * self.len + col)
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Drop the oldest `count` columns of every row, moving the rest to the
    /// front. The freed trailing columns are zeroed.
    pub fn shift_left(&mut self, count: usize) {
        let count = count.min(self.len);
        if count == 0 {
            return;
        }
        for ch in 0..self.channels {
            let row = self.channel_mut(ch);
            row.copy_within(count.., 0);
            let keep = row.len() - count;
            row[keep..].fill(0.0);
        }
    }

    /// Copy each channel of `self` into a separate `Vec`.
    pub fn to_vecs(&self) -> Vec<Vec<f32>> {
        (0..self.channels)
            .map(|ch| self.channel(ch).to_vec())
            .collect()
    }

    /// Iterate channel rows.
    pub fn iter_channels(&self) -> impl Iterator<Item = &[f32]> {
        // chunk size must be non-zero; an empty matrix has no data to chunk
        self.data.chunks_exact(self.len.max(1))
    }
}

impl Planar for Frames {
    #[inline]
    fn channel_count(&self) -> usize {
        self.channels
    }

    #[inline]
    fn channel(&self, index: usize) -> &[f32] {
        assert!(index < self.channels, "channel {index} out of range");
        let start = index * self.len;
        &self.data[start..start + self.len]
    }

    #[inline]
    fn frames(&self) -> usize {
        self.len
    }
}

impl PlanarMut for Frames {
    #[inline]
    fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        assert!(index < self.channels, "channel {index} out of range");
        let start = index * self.len;
        &mut self.data[start..start + self.len]
    }
}
