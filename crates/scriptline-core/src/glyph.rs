//! Glyph storage shared by every item of a layout session.
//!
//! [`GlyphBuffer`] is a struct-of-arrays arena: one column per glyph
//! property, all columns always the same length. Items refer into it by
//! `(glyph_data_offset, num_glyphs)` and borrow a [`GlyphLayout`] or
//! [`GlyphLayoutMut`] view when they need the data. Views borrow the buffer,
//! so none of them can outlive a reallocation.

use smallvec::SmallVec;

use crate::error::{LayoutError, Result};
use crate::fixed::{Fixed, FixedPoint};

/// Glyphs kept inline before the columns spill to the heap.
pub const INLINE_GLYPHS: usize = 32;

/// Justification opportunity class of a glyph, in increasing priority.
///
/// The Arabic classes mark where a kashida (U+0640) may be inserted; the
/// higher the class, the better the insertion point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum JustificationClass {
    #[default]
    None = 0,
    ArabicSpace = 1,
    Character = 2,
    Space = 4,
    ArabicNormal = 7,
    Waw = 8,
    BaRa = 9,
    Alef = 10,
    HaaDal = 11,
    Seen = 12,
    Kashida = 13,
}

impl JustificationClass {
    /// All classes at or above [`JustificationClass::ArabicNormal`] accept kashidas.
    pub fn is_arabic_kashida_point(self) -> bool {
        self >= JustificationClass::ArabicNormal
    }

    /// The class one step down the priority ladder, used when distributing
    /// remaining space.
    pub fn lower(self) -> Option<JustificationClass> {
        use JustificationClass::*;
        match self {
            None => Option::None,
            ArabicSpace => Some(None),
            Character => Some(ArabicSpace),
            Space => Some(Character),
            ArabicNormal => Some(Space),
            Waw => Some(ArabicNormal),
            BaRa => Some(Waw),
            Alef => Some(BaRa),
            HaaDal => Some(Alef),
            Seen => Some(HaaDal),
            Kashida => Some(Seen),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlyphAttributes {
    /// First glyph of a cluster; the cursor may stop before it.
    pub cluster_start: bool,
    /// Combining mark with zero advance.
    pub mark: bool,
    pub justification: JustificationClass,
    /// Takes no space and draws nothing (controls, soft hyphens).
    pub dont_print: bool,
}

/// How extra space was added to a glyph by justification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JustificationKind {
    #[default]
    None,
    Space,
    Kashida,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlyphJustification {
    pub kind: JustificationKind,
    pub n_kashidas: u32,
    /// Extra advance in 26.6 units.
    pub space_18d6: i32,
}

impl GlyphJustification {
    pub fn extra_space(&self) -> Fixed {
        Fixed::from_raw(self.space_18d6)
    }
}

/// Bytes one glyph occupies across all columns.
pub const BYTES_PER_GLYPH: usize = std::mem::size_of::<u32>()
    + 2 * std::mem::size_of::<Fixed>()
    + std::mem::size_of::<FixedPoint>()
    + std::mem::size_of::<GlyphJustification>()
    + std::mem::size_of::<GlyphAttributes>();

/// Largest total allocation accepted for the glyph columns.
pub const MAX_BUFFER_BYTES: usize = i32::MAX as usize;

/// Byte size of `glyphs` glyphs, or `None` past [`MAX_BUFFER_BYTES`].
pub fn checked_buffer_bytes(glyphs: usize) -> Option<usize> {
    glyphs
        .checked_mul(BYTES_PER_GLYPH)
        .filter(|&bytes| bytes <= MAX_BUFFER_BYTES)
}

/// Struct-of-arrays glyph arena.
#[derive(Debug, Clone, Default)]
pub struct GlyphBuffer {
    glyphs: SmallVec<[u32; INLINE_GLYPHS]>,
    advances_x: SmallVec<[Fixed; INLINE_GLYPHS]>,
    advances_y: SmallVec<[Fixed; INLINE_GLYPHS]>,
    offsets: SmallVec<[FixedPoint; INLINE_GLYPHS]>,
    justifications: SmallVec<[GlyphJustification; INLINE_GLYPHS]>,
    attributes: SmallVec<[GlyphAttributes; INLINE_GLYPHS]>,
}

impl GlyphBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_len(len: usize) -> Result<Self> {
        let mut buffer = Self::new();
        buffer.reallocate(len)?;
        Ok(buffer)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Grows every column to `new_len` glyphs; existing glyphs are kept and
    /// new slots are zeroed. Shrinking is not supported and is ignored.
    pub fn reallocate(&mut self, new_len: usize) -> Result<()> {
        if checked_buffer_bytes(new_len).is_none() {
            log::warn!("glyph buffer of {} glyphs exceeds the size limit", new_len);
            return Err(LayoutError::LayoutFailed);
        }
        if new_len <= self.len() {
            return Ok(());
        }
        self.glyphs.resize(new_len, 0);
        self.advances_x.resize(new_len, Fixed::ZERO);
        self.advances_y.resize(new_len, Fixed::ZERO);
        self.offsets.resize(new_len, FixedPoint::default());
        self.justifications.resize(new_len, GlyphJustification::default());
        self.attributes.resize(new_len, GlyphAttributes::default());
        Ok(())
    }

    /// Drops every glyph; the buffer keeps its heap allocation.
    pub fn clear(&mut self) {
        self.glyphs.clear();
        self.advances_x.clear();
        self.advances_y.clear();
        self.offsets.clear();
        self.justifications.clear();
        self.attributes.clear();
    }

    pub fn spilled(&self) -> bool {
        self.glyphs.spilled()
    }

    /// Read-only view of `len` glyphs starting at `offset`, clamped to the
    /// buffer.
    pub fn layout(&self, offset: usize, len: usize) -> GlyphLayout<'_> {
        let start = offset.min(self.len());
        let end = offset.saturating_add(len).min(self.len());
        GlyphLayout {
            glyphs: &self.glyphs[start..end],
            advances_x: &self.advances_x[start..end],
            advances_y: &self.advances_y[start..end],
            offsets: &self.offsets[start..end],
            justifications: &self.justifications[start..end],
            attributes: &self.attributes[start..end],
        }
    }

    /// Mutable view of `len` glyphs starting at `offset`, clamped to the
    /// buffer.
    pub fn layout_mut(&mut self, offset: usize, len: usize) -> GlyphLayoutMut<'_> {
        let start = offset.min(self.len());
        let end = offset.saturating_add(len).min(self.len());
        GlyphLayoutMut {
            glyphs: &mut self.glyphs[start..end],
            advances_x: &mut self.advances_x[start..end],
            advances_y: &mut self.advances_y[start..end],
            offsets: &mut self.offsets[start..end],
            justifications: &mut self.justifications[start..end],
            attributes: &mut self.attributes[start..end],
        }
    }

    /// Copies `len` glyphs from `src` to `dst` inside the buffer.
    pub fn copy_within(&mut self, src: usize, dst: usize, len: usize) {
        let range = src..src + len;
        self.glyphs.copy_within(range.clone(), dst);
        self.advances_x.copy_within(range.clone(), dst);
        self.advances_y.copy_within(range.clone(), dst);
        self.offsets.copy_within(range.clone(), dst);
        self.justifications.copy_within(range.clone(), dst);
        self.attributes.copy_within(range, dst);
    }
}

/// Borrowed window over a glyph run.
#[derive(Debug, Clone, Copy)]
pub struct GlyphLayout<'a> {
    pub glyphs: &'a [u32],
    pub advances_x: &'a [Fixed],
    pub advances_y: &'a [Fixed],
    pub offsets: &'a [FixedPoint],
    pub justifications: &'a [GlyphJustification],
    pub attributes: &'a [GlyphAttributes],
}

impl<'a> GlyphLayout<'a> {
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Shaped advance without justification; zero for non-printing glyphs.
    pub fn natural_advance(&self, i: usize) -> Fixed {
        if self.attributes[i].dont_print {
            return Fixed::ZERO;
        }
        self.advances_x[i]
    }

    /// Advance including justification; zero for non-printing glyphs.
    pub fn effective_advance(&self, i: usize) -> Fixed {
        if self.attributes[i].dont_print {
            return Fixed::ZERO;
        }
        self.advances_x[i] + self.justifications[i].extra_space()
    }

    /// Sum of [`GlyphLayout::effective_advance`] over the whole window.
    pub fn total_advance(&self) -> Fixed {
        (0..self.len()).map(|i| self.effective_advance(i)).sum()
    }

    /// Sub-window of `len` glyphs starting at `pos`, clamped.
    pub fn mid(&self, pos: usize, len: usize) -> GlyphLayout<'a> {
        let start = pos.min(self.len());
        let end = pos.saturating_add(len).min(self.len());
        GlyphLayout {
            glyphs: &self.glyphs[start..end],
            advances_x: &self.advances_x[start..end],
            advances_y: &self.advances_y[start..end],
            offsets: &self.offsets[start..end],
            justifications: &self.justifications[start..end],
            attributes: &self.attributes[start..end],
        }
    }
}

/// Mutable window over a glyph run; what font engines write into.
#[derive(Debug)]
pub struct GlyphLayoutMut<'a> {
    pub glyphs: &'a mut [u32],
    pub advances_x: &'a mut [Fixed],
    pub advances_y: &'a mut [Fixed],
    pub offsets: &'a mut [FixedPoint],
    pub justifications: &'a mut [GlyphJustification],
    pub attributes: &'a mut [GlyphAttributes],
}

impl<'a> GlyphLayoutMut<'a> {
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn as_layout(&self) -> GlyphLayout<'_> {
        GlyphLayout {
            glyphs: &*self.glyphs,
            advances_x: &*self.advances_x,
            advances_y: &*self.advances_y,
            offsets: &*self.offsets,
            justifications: &*self.justifications,
            attributes: &*self.attributes,
        }
    }

    /// Mutable sub-window of `len` glyphs starting at `pos`, clamped.
    pub fn mid(&mut self, pos: usize, len: usize) -> GlyphLayoutMut<'_> {
        let start = pos.min(self.len());
        let end = pos.saturating_add(len).min(self.len());
        GlyphLayoutMut {
            glyphs: &mut self.glyphs[start..end],
            advances_x: &mut self.advances_x[start..end],
            advances_y: &mut self.advances_y[start..end],
            offsets: &mut self.offsets[start..end],
            justifications: &mut self.justifications[start..end],
            attributes: &mut self.attributes[start..end],
        }
    }

    /// Resets glyphs `first..` to zero.
    pub fn clear_from(&mut self, first: usize) {
        let first = first.min(self.len());
        self.glyphs[first..].fill(0);
        self.advances_x[first..].fill(Fixed::ZERO);
        self.advances_y[first..].fill(Fixed::ZERO);
        self.offsets[first..].fill(FixedPoint::default());
        self.justifications[first..].fill(GlyphJustification::default());
        self.attributes[first..].fill(GlyphAttributes::default());
    }
}
