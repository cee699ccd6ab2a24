//! The 32-bit flags word stored alongside every value.
//!
//! Flags are a compact tagged-union discriminant with two generations of history baked in.
//! Modern writers populate the top byte; pre-flags writers only ever used the low halfword,
//! and the oldest convention of all was "0 means raw string". The bit layout is:
//!
//! ```text
//!  bit 31..29   bit 28..27   bit 26..24   bit 23..16   bit 15..0
//! +-----------+------------+------------+------------+------------+
//! | cmpr (3)  | format (2) | type (3)   | reserved   | legacy tag |
//! +-----------+------------+------------+------------+------------+
//! ```
//!
//! The format field discriminates between the legacy, common, and compatibility encodings.
//! Compatibility words keep the legacy tag populated, so a reader that masks the word down to
//! its own 16-bit flag space still classifies the payload correctly. Encode always emits the
//! compatibility format; the common format and the bare legacy tags are decode-only.

use std::fmt;

const TYPE_SHIFT: u32 = 24;
const TYPE_MASK: u32 = 0x07 << TYPE_SHIFT;
const FORMAT_SHIFT: u32 = 27;
const FORMAT_MASK: u32 = 0x03 << FORMAT_SHIFT;
const CMPR_SHIFT: u32 = 29;
const CMPR_MASK: u32 = 0x07 << CMPR_SHIFT;
const LEGACY_MASK: u32 = 0xFFFF;

/// Legacy tag for a serialized object payload.
pub const LEGACY_SERIALIZED: u16 = 1;
/// Legacy tag for a big-endian 64-bit integer payload.
pub const LEGACY_SPECIAL_LONG: u16 = 3 << 8;
/// Legacy tag for a single-byte boolean payload.
pub const LEGACY_SPECIAL_BOOLEAN: u16 = 1 << 8;
/// Legacy tag for a raw byte array payload.
pub const LEGACY_SPECIAL_BYTEARRAY: u16 = 8 << 8;

/// Data type carried in the typed portion of the flags word.
///
/// `Unknown` is the decode result for every reserved or unrecognized bit pattern. Unpacking
/// never fails; deciding whether an unknown type is an error belongs to the transcoder that
/// was asked to interpret the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Unknown,
    Serialized,
    Json,
    Binary,
    String,
}

impl DataType {
    pub fn to_u8(self) -> u8 {
        match self {
            DataType::Unknown => 0,
            DataType::Serialized => 1,
            DataType::Json => 2,
            DataType::Binary => 3,
            DataType::String => 4,
        }
    }

    /// Read a 3-bit type tag. Reserved values decode as `Unknown`.
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => DataType::Serialized,
            2 => DataType::Json,
            3 => DataType::Binary,
            4 => DataType::String,
            _ => DataType::Unknown,
        }
    }

    /// The tag a pre-flags client would have written for this type's payloads. String and JSON
    /// both wrote under the untyped string convention, so their tag is 0.
    pub fn legacy_tag(self) -> u16 {
        match self {
            DataType::Serialized => LEGACY_SERIALIZED,
            DataType::Binary => LEGACY_SPECIAL_BYTEARRAY,
            _ => 0,
        }
    }

    /// Classify a bare legacy tag. Only the tags that map onto a modern data type are
    /// recognized; special-format tags and junk both come back as `Unknown`.
    fn from_legacy_tag(tag: u16) -> Self {
        match tag {
            0 => DataType::String,
            LEGACY_SERIALIZED => DataType::Serialized,
            LEGACY_SPECIAL_BYTEARRAY => DataType::Binary,
            _ => DataType::Unknown,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DataType::Unknown => f.write_str("unknown"),
            DataType::Serialized => f.write_str("serialized"),
            DataType::Json => f.write_str("json"),
            DataType::Binary => f.write_str("binary"),
            DataType::String => f.write_str("string"),
        }
    }
}

/// Compression tag in the top three bits. Only `None` is ever written by this crate; the other
/// seven values are reserved and carried through unpack losslessly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    Reserved(u8),
}

impl Compression {
    pub fn to_bits(self) -> u8 {
        match self {
            Compression::None => 0,
            Compression::Reserved(v) => v & 0x07,
        }
    }

    pub fn from_bits(v: u8) -> Self {
        match v & 0x07 {
            0 => Compression::None,
            v => Compression::Reserved(v),
        }
    }
}

/// Which generation of flag encoding a word uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagFormat {
    /// No typed header byte; the low halfword is the whole flag space.
    Legacy,
    /// Typed header only, as written by clients that never populate the legacy tag.
    Common,
    /// Typed header plus a meaningful legacy tag. The only format encode emits.
    Compat,
    /// Format bits that match no defined encoding.
    Reserved,
}

impl FlagFormat {
    fn from_bits(v: u8) -> Self {
        match v & 0x03 {
            0 => FlagFormat::Legacy,
            1 => FlagFormat::Common,
            2 => FlagFormat::Compat,
            _ => FlagFormat::Reserved,
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            FlagFormat::Legacy => 0,
            FlagFormat::Common => 1,
            FlagFormat::Compat => 2,
            FlagFormat::Reserved => 3,
        }
    }
}

/// Decoded view of a flags word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlagView {
    pub data_type: DataType,
    pub compression: Compression,
    pub format: FlagFormat,
}

/// Pack a data type and compression tag into a flags word, in the compatibility format.
///
/// The result is never 0 and never a bare common pattern, so both flag-aware readers and
/// legacy-only readers can classify the payload.
pub fn pack(data_type: DataType, compression: Compression) -> u32 {
    ((compression.to_bits() as u32) << CMPR_SHIFT)
        | ((FlagFormat::Compat.to_bits() as u32) << FORMAT_SHIFT)
        | ((data_type.to_u8() as u32) << TYPE_SHIFT)
        | (data_type.legacy_tag() as u32)
}

/// Unpack a flags word. Total function: unrecognized patterns come back with
/// `DataType::Unknown` rather than an error.
///
/// A word whose upper halfword is empty is interpreted as a legacy-only word through its
/// 16-bit tag, which preserves the historical "0 means raw string" convention as a decode
/// special case.
pub fn unpack(flags: u32) -> FlagView {
    if flags & !LEGACY_MASK == 0 {
        return FlagView {
            data_type: DataType::from_legacy_tag(flags as u16),
            compression: Compression::None,
            format: FlagFormat::Legacy,
        };
    }
    let compression = Compression::from_bits(((flags & CMPR_MASK) >> CMPR_SHIFT) as u8);
    let format = FlagFormat::from_bits(((flags & FORMAT_MASK) >> FORMAT_SHIFT) as u8);
    let data_type = match format {
        FlagFormat::Common | FlagFormat::Compat => {
            DataType::from_u8(((flags & TYPE_MASK) >> TYPE_SHIFT) as u8)
        }
        // Typed bits without a recognized format are garbage, not a type claim.
        FlagFormat::Legacy | FlagFormat::Reserved => DataType::Unknown,
    };
    FlagView {
        data_type,
        compression,
        format,
    }
}

/// The low-halfword tag a legacy-only reader would see in this word.
pub fn legacy_tag(flags: u32) -> u16 {
    (flags & LEGACY_MASK) as u16
}

/// The common-format word for a data type: typed header, no compression, empty legacy tag.
pub fn common_flags(data_type: DataType) -> u32 {
    ((FlagFormat::Common.to_bits() as u32) << FORMAT_SHIFT)
        | ((data_type.to_u8() as u32) << TYPE_SHIFT)
}

/// The compatibility-format word for a data type, with no compression. Equal to
/// `pack(data_type, Compression::None)`.
pub fn compat_flags(data_type: DataType) -> u32 {
    pack(data_type, Compression::None)
}

/// Compatibility word for a payload that only ever had a legacy tag (the special formats
/// pre-flags clients wrote). The typed portion marks it as serialized/private data.
pub fn legacy_compat_flags(tag: u16) -> u32 {
    ((FlagFormat::Compat.to_bits() as u32) << FORMAT_SHIFT)
        | ((DataType::Serialized.to_u8() as u32) << TYPE_SHIFT)
        | (tag as u32)
}

pub const STRING_COMMON_FLAGS: u32 = 0x0C00_0000;
pub const STRING_COMPAT_FLAGS: u32 = 0x1400_0000;
pub const JSON_COMMON_FLAGS: u32 = 0x0A00_0000;
pub const JSON_COMPAT_FLAGS: u32 = 0x1200_0000;
pub const BINARY_COMMON_FLAGS: u32 = 0x0B00_0000;
pub const BINARY_COMPAT_FLAGS: u32 = 0x1300_0800;
pub const SERIALIZED_COMMON_FLAGS: u32 = 0x0900_0000;
pub const SERIALIZED_COMPAT_FLAGS: u32 = 0x1100_0001;

/// One rule in a transcoder's flag acceptance list.
///
/// Each transcoder publishes the patterns it will decode as a slice of these, so the whole
/// compatibility matrix is plain data that can be audited and tested without touching any
/// payload bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagPattern {
    /// Exactly the common-format word for the type.
    Common(DataType),
    /// The compatibility word for the type, with any compression bits. Compression is accepted
    /// here because readers are expected to tolerate words written by compressing clients.
    Compat(DataType),
    /// A legacy-only word carrying exactly this nonzero tag.
    LegacyTag(u16),
    /// The historical untyped word.
    ZeroFlags,
    /// Every word. Reserved for the fallback transcoder.
    Any,
}

impl FlagPattern {
    pub fn matches(self, flags: u32) -> bool {
        match self {
            FlagPattern::Common(t) => flags == common_flags(t),
            FlagPattern::Compat(t) => flags & !CMPR_MASK == compat_flags(t),
            FlagPattern::LegacyTag(tag) => {
                tag != 0 && flags & !LEGACY_MASK == 0 && flags as u16 == tag
            }
            FlagPattern::ZeroFlags => flags == 0,
            FlagPattern::Any => true,
        }
    }
}
