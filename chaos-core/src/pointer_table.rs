use std::collections::BTreeMap;

use crate::patch::Substitution;
use crate::rom::ByteStore;
use crate::text::TextCodec;
use crate::{RandomiserError, Result};

/// Fixed address range reserved for one class of packed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerTableRegion {
    pub name: &'static str,
    pub base_address: usize,
    pub capacity_bytes: usize,
    /// First address a 16-bit pointer relative to `base_address` can no longer
    /// reach without the bank marker.
    pub bank_boundary: usize,
}

impl PointerTableRegion {
    /// Distance from the base to the bank boundary; a region whose boundary
    /// does not lie above its base falls back to a full 64 KiB bank.
    pub fn bank_span(&self) -> usize {
        match self.bank_boundary.checked_sub(self.base_address) {
            Some(span) if span > 0 => span,
            _ => 0x1_0000,
        }
    }
}

/// Where a text block and its pointers live in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBlockLayout {
    pub region: PointerTableRegion,
    pub pointer_table: usize,
    /// Address of the 16-bit index of the first line read from the high bank.
    /// Blocks that never cross a bank have none.
    pub bank_marker: Option<usize>,
    pub line_count: usize,
}

pub const DIALOGUE_BLOCK: TextBlockLayout = TextBlockLayout {
    region: PointerTableRegion {
        name: "dialogue",
        base_address: 0x0D_0000,
        capacity_bytes: 0x1_F100,
        bank_boundary: 0x0E_0000,
    },
    pointer_table: 0x0C_E602,
    bank_marker: Some(0x0C_E600),
    line_count: 0xC8E,
};

pub const LOCATION_NAME_BLOCK: TextBlockLayout = TextBlockLayout {
    region: PointerTableRegion {
        name: "location names",
        base_address: 0x26_8500,
        capacity_bytes: 0x500,
        bank_boundary: 0x27_8500,
    },
    pointer_table: 0x26_8400,
    bank_marker: None,
    line_count: 0x49,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedText {
    pub blob: Vec<u8>,
    /// Two bytes per line, little-endian, relative to the region base.
    pub pointer_table: Vec<u8>,
    pub first_high_index: Option<usize>,
    pub line_count: usize,
}

impl PackedText {
    pub fn pointers(&self) -> Vec<u16> {
        self.pointer_table
            .chunks_exact(2)
            .map(|w| u16::from_le_bytes([w[0], w[1]]))
            .collect()
    }

    /// Blob, pointer table and bank marker as write directives. The line at
    /// `first_high_index` still starts in the low bank, so the marker points
    /// one past it. Every slot of the table must be filled.
    pub fn substitutions(&self, layout: &TextBlockLayout) -> Result<Vec<Substitution>> {
        if self.line_count != layout.line_count {
            return Err(RandomiserError::LineCountMismatch {
                region: layout.region.name,
                expected: layout.line_count,
                found: self.line_count,
            });
        }

        let mut subs = vec![
            Substitution::new(layout.region.base_address, self.blob.clone()),
            Substitution::new(layout.pointer_table, self.pointer_table.clone()),
        ];

        match (layout.bank_marker, self.first_high_index) {
            (Some(marker), high) => {
                let value = high.map_or(self.line_count, |index| index + 1);
                let value = u16::try_from(value).map_err(|_| RandomiserError::AddressOverflow {
                    index: value,
                })?;
                subs.push(Substitution::new(marker, value.to_le_bytes().to_vec()));
            }
            (None, Some(index)) => {
                return Err(RandomiserError::AddressOverflow { index });
            }
            (None, None) => {}
        }

        Ok(subs)
    }
}

/// Lay already-encoded lines out back to back from the region base.
///
/// Pointers are the running offset masked to 16 bits. When the running offset
/// reaches the bank span it wraps once and the index of the line that pushed
/// it over is recorded; a second crossing is fatal. Indices must run
/// `0, 1, 2, ...` since a pointer's slot is its index.
pub fn pack_encoded<'a, I>(lines: I, region: &PointerTableRegion) -> Result<PackedText>
where
    I: IntoIterator<Item = (usize, &'a [u8])>,
{
    let span = region.bank_span();
    let mut blob = Vec::new();
    let mut pointer_table = Vec::new();
    let mut first_high_index: Option<usize> = None;
    let mut offset = 0usize;
    let mut line_count = 0usize;

    for (index, bytes) in lines {
        if index != line_count {
            return Err(RandomiserError::NonContiguousIndex {
                expected: line_count,
                found: index,
            });
        }
        pointer_table.extend_from_slice(&((offset & 0xFFFF) as u16).to_le_bytes());
        blob.extend_from_slice(bytes);
        offset += bytes.len();
        line_count += 1;

        if blob.len() > region.capacity_bytes {
            return Err(RandomiserError::CapacityExceeded {
                region: region.name,
                size: blob.len(),
                capacity: region.capacity_bytes,
            });
        }

        if offset >= span {
            if first_high_index.is_some() || offset >= span * 2 {
                return Err(RandomiserError::AddressOverflow { index });
            }
            first_high_index = Some(index);
            offset -= span;
        }
    }

    Ok(PackedText {
        blob,
        pointer_table,
        first_high_index,
        line_count,
    })
}

/// Encode every line (null-terminated, in index order) and pack it.
pub fn pack(
    lines: &BTreeMap<usize, String>,
    codec: &TextCodec,
    region: &PointerTableRegion,
) -> Result<PackedText> {
    let encoded = lines
        .iter()
        .map(|(&index, text)| Ok((index, codec.encode(text, true)?)))
        .collect::<Result<Vec<(usize, Vec<u8>)>>>()?;

    pack_encoded(
        encoded.iter().map(|(index, bytes)| (*index, bytes.as_slice())),
        region,
    )
}

/// Decode a whole block back into script lines.
pub fn read_block(
    store: &ByteStore,
    layout: &TextBlockLayout,
    codec: &TextCodec,
) -> Result<BTreeMap<usize, String>> {
    let first_high_bank = match layout.bank_marker {
        Some(addr) => store.read_u16(addr)? as usize,
        None => usize::MAX,
    };
    let span = layout.region.bank_span();

    let mut lines = BTreeMap::new();
    for index in 0..layout.line_count {
        let ptr = store.read_u16(layout.pointer_table + index * 2)? as usize;
        let bank = if index >= first_high_bank { span } else { 0 };
        let address = layout.region.base_address + bank + ptr;
        let bytes = store.read_terminated(address)?;
        lines.insert(index, codec.decode(bytes));
    }
    Ok(lines)
}
