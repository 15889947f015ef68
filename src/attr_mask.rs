// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Pure bitmask encoding for display attributes and color pairs.
//!
//! The native library expects one integer per attribute-set call. The layout:
//!
//! ```text
//! bit 31 .. 16            bit 15 .. 8        bit 7 .. 0
//! ┌──────────────────┐    ┌─────────────┐    ┌──────────┐
//! │ named attributes │    │ color pair  │    │ (unused) │
//! │ one bit each     │    │ index 0-255 │    │          │
//! └──────────────────┘    └─────────────┘    └──────────┘
//! ```
//!
//! Encoding is a fold with bitwise OR, so it is commutative and associative and
//! there is no error path: the attribute set is a closed enum, and raw integers
//! `>= 256` pass through unchanged so callers can combine pre-built masks.

use std::ops::BitOr;
use strum_macros::EnumIter;

/// Bit position where the color-pair byte starts.
pub const PAIR_SHIFT: u32 = 8;

/// Bit position where the named attribute flags start (just above the pair
/// field).
const ATTR_BIT_BASE: u32 = 16;

/// A named display attribute understood by the native library.
///
/// Each variant occupies one fixed bit above the color-pair field; no two
/// variants overlap, and none overlaps the pair field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Attribute {
    Underline,
    Reverse,
    Blink,
    Dim,
    Bold,
    AltCharset,
    Invisible,
    Protect,
    /// Line-drawing flag: left side.
    Left,
    /// Line-drawing flag: right side.
    Right,
    /// Line-drawing flag: top side.
    Top,
    /// Line-drawing flag: bottom side.
    Bottom,
}

impl Attribute {
    /// The single bit this attribute occupies in an [`AttrMask`].
    #[must_use]
    pub const fn bit(self) -> u32 {
        let offset = match self {
            Self::Underline => 0,
            Self::Reverse => 1,
            Self::Blink => 2,
            Self::Dim => 3,
            Self::Bold => 4,
            Self::AltCharset => 5,
            Self::Invisible => 6,
            Self::Protect => 7,
            Self::Left => 8,
            Self::Right => 9,
            Self::Top => 10,
            Self::Bottom => 11,
        };
        1 << (ATTR_BIT_BASE + offset)
    }
}

/// One element of an attribute specification: either a named attribute or a raw
/// integer.
///
/// Raw integers under `256` are color-pair indices; anything else is a pre-built
/// mask and passes through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrItem {
    Attr(Attribute),
    Raw(u32),
}

impl From<Attribute> for AttrItem {
    fn from(attr: Attribute) -> Self { Self::Attr(attr) }
}

impl From<u32> for AttrItem {
    fn from(raw: u32) -> Self { Self::Raw(raw) }
}

impl From<AttrMask> for AttrItem {
    fn from(mask: AttrMask) -> Self { Self::Raw(mask.0) }
}

/// The integer bitmask handed to the native attribute-set operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttrMask(pub u32);

impl AttrMask {
    /// Encodes a single item. Equivalent to [`encode`] with a one-element list.
    #[must_use]
    pub fn of(item: impl Into<AttrItem>) -> Self { Self(encode_one(item.into())) }

    /// Encodes a color-pair index into the pair field.
    #[must_use]
    pub const fn color_pair(index: u8) -> Self { Self((index as u32) << PAIR_SHIFT) }
}

impl From<Attribute> for AttrMask {
    fn from(attr: Attribute) -> Self { Self(attr.bit()) }
}

impl BitOr for AttrMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
}

impl BitOr<Attribute> for AttrMask {
    type Output = Self;
    fn bitor(self, rhs: Attribute) -> Self { Self(self.0 | rhs.bit()) }
}

impl BitOr for Attribute {
    type Output = AttrMask;
    fn bitor(self, rhs: Self) -> AttrMask { AttrMask(self.bit() | rhs.bit()) }
}

fn encode_one(item: AttrItem) -> u32 {
    match item {
        AttrItem::Attr(attr) => attr.bit(),
        AttrItem::Raw(raw) if raw < 256 => raw << PAIR_SHIFT,
        AttrItem::Raw(raw) => raw,
    }
}

/// Folds an ordered list of attribute items into one mask with bitwise OR.
///
/// OR is commutative and associative, so no ordering guarantee is required or
/// given.
pub fn encode<I, T>(items: I) -> AttrMask
where
    I: IntoIterator<Item = T>,
    T: Into<AttrItem>,
{
    AttrMask(
        items
            .into_iter()
            .fold(0, |acc, item| acc | encode_one(item.into())),
    )
}

#[cfg(test)]
mod tests_attr_encoding {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    #[test]
    fn named_attribute_bits_are_disjoint() {
        let mut seen: u32 = 0;
        for attr in Attribute::iter() {
            assert_eq!(seen & attr.bit(), 0, "overlapping bit for {attr:?}");
            seen |= attr.bit();
        }
    }

    #[test]
    fn named_attribute_bits_sit_above_the_pair_field() {
        for attr in Attribute::iter() {
            assert_eq!(attr.bit() & 0xFF00, 0, "{attr:?} overlaps the pair field");
            assert!(attr.bit() >= 1 << 16);
        }
    }

    #[test_case(0)]
    #[test_case(1)]
    #[test_case(42)]
    #[test_case(255)]
    fn color_pair_index_shifts_into_the_pair_field(index: u32) {
        assert_eq!(encode([index]).0, index << 8);
    }

    #[test]
    fn raw_integers_at_or_above_256_pass_through() {
        assert_eq!(encode([256_u32]).0, 256);
        assert_eq!(encode([Attribute::Bold.bit()]).0, Attribute::Bold.bit());
    }

    #[test]
    fn encoding_is_order_insensitive() {
        for a in Attribute::iter() {
            for b in Attribute::iter() {
                assert_eq!(encode([a, b]), encode([b, a]));
            }
        }
    }

    #[test]
    fn pair_and_attribute_combine_without_overlap() {
        let pair = AttrMask::color_pair(7);
        let attr = AttrMask::from(Attribute::Underline);
        let combined = encode([AttrItem::Raw(7), AttrItem::Attr(Attribute::Underline)]);
        assert_eq!(combined.0, pair.0 | attr.0);
        assert_eq!(pair.0 & attr.0, 0);
    }

    #[test]
    fn bitor_operators_agree_with_encode() {
        let via_ops = Attribute::Bold | Attribute::Reverse;
        let via_encode = encode([Attribute::Bold, Attribute::Reverse]);
        assert_eq!(via_ops, via_encode);

        let with_pair = AttrMask::color_pair(3) | Attribute::Blink;
        assert_eq!(with_pair, encode([AttrItem::Raw(3), Attribute::Blink.into()]));
    }

    #[test]
    fn singleton_list_equals_single_encode() {
        assert_eq!(AttrMask::of(Attribute::Dim), encode([Attribute::Dim]));
        assert_eq!(AttrMask::of(9_u32), encode([9_u32]));
    }
}
