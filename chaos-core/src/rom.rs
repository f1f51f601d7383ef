use flate2::Crc;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::{RandomiserError, Result};

/// Size of a headerless image.
pub const ROM_SIZE: usize = 0x30_0000;
/// Copier header some dumps carry in front of the image.
pub const COPIER_HEADER_SIZE: usize = 0x200;

/// CRC-32 values of known-good headerless dumps.
const KNOWN_GOOD_CRC32: &[(u32, &str)] = &[(0xA27F_1C7A, "US 1.0"), (0xC0FA_0464, "US 1.1")];

/// Addressable image the whole run patches in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteStore {
    data: Vec<u8>,
}

impl ByteStore {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    fn check(&self, address: usize, len: usize) -> Result<()> {
        match address.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(RandomiserError::OutOfRange {
                address,
                len,
                store_len: self.data.len(),
            }),
        }
    }

    pub fn read_u8(&self, address: usize) -> Result<u8> {
        self.check(address, 1)?;
        Ok(self.data[address])
    }

    pub fn read_u16(&self, address: usize) -> Result<u16> {
        self.check(address, 2)?;
        Ok(u16::from_le_bytes([self.data[address], self.data[address + 1]]))
    }

    pub fn read_n(&self, address: usize, n: usize) -> Result<&[u8]> {
        self.check(address, n)?;
        Ok(&self.data[address..address + n])
    }

    /// Bytes from `address` up to and including the first zero byte, or to
    /// the end of the store when no terminator follows.
    pub fn read_terminated(&self, address: usize) -> Result<&[u8]> {
        self.check(address, 1)?;
        let tail = &self.data[address..];
        let end = tail
            .iter()
            .position(|&b| b == 0)
            .map_or(tail.len(), |p| p + 1);
        Ok(&tail[..end])
    }

    pub fn write_bytes(&mut self, address: usize, payload: &[u8]) -> Result<()> {
        self.check(address, payload.len())?;
        self.data[address..address + payload.len()].copy_from_slice(payload);
        Ok(())
    }

    pub fn crc32(&self) -> u32 {
        let mut crc = Crc::new();
        crc.update(&self.data);
        crc.sum()
    }
}

/// A loaded ROM file: the headerless image plus any copier header that has
/// to be written back in front of it.
#[derive(Debug, Clone)]
pub struct RomImage {
    pub header: Option<Vec<u8>>,
    pub store: ByteStore,
}

impl RomImage {
    pub fn from_bytes(mut raw: Vec<u8>) -> Result<Self> {
        let header = match raw.len() {
            ROM_SIZE => None,
            n if n == ROM_SIZE + COPIER_HEADER_SIZE => {
                let image = raw.split_off(COPIER_HEADER_SIZE);
                let header = std::mem::replace(&mut raw, image);
                Some(header)
            }
            n => return Err(RandomiserError::InvalidRomSize(n)),
        };

        let image = Self {
            header,
            store: ByteStore::new(raw),
        };
        image.verify_checksum();
        Ok(image)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path)?;
        info!("Loaded ROM {} ({} bytes)", path.display(), raw.len());
        Self::from_bytes(raw)
    }

    /// Returns the matching release name, logging a warning on mismatch.
    pub fn verify_checksum(&self) -> Option<&'static str> {
        let crc = self.store.crc32();
        match KNOWN_GOOD_CRC32.iter().find(|(known, _)| *known == crc) {
            Some((_, release)) => {
                debug!("ROM checksum {:08X} matches {}", crc, release);
                Some(release)
            }
            None => {
                warn!(
                    "ROM checksum {:08X} does not match any known-good dump; continuing anyway",
                    crc
                );
                None
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let header_len = self.header.as_ref().map_or(0, Vec::len);
        let mut out = Vec::with_capacity(header_len + self.store.len());
        if let Some(header) = &self.header {
            out.extend_from_slice(header);
        }
        out.extend_from_slice(self.store.as_slice());
        out
    }

    /// Writes the image next to `path` in a temporary file and renames it into
    /// place only once every byte is on disk.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&self.to_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| RandomiserError::Io(e.error))?;

        info!("Wrote ROM {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_words() {
        let store = ByteStore::new(vec![0x34, 0x12, 0xFF]);
        assert_eq!(store.read_u16(0).unwrap(), 0x1234);
        assert!(matches!(
            store.read_u16(2),
            Err(RandomiserError::OutOfRange { address: 2, len: 2, store_len: 3 })
        ));
    }

    #[test]
    fn read_terminated_includes_zero() {
        let store = ByteStore::new(vec![1, 2, 0, 3, 4]);
        assert_eq!(store.read_terminated(0).unwrap(), &[1, 2, 0]);
        assert_eq!(store.read_terminated(3).unwrap(), &[3, 4]);
    }

    #[test]
    fn strips_and_restores_copier_header() {
        let mut raw = vec![0xAAu8; COPIER_HEADER_SIZE];
        raw.extend(std::iter::repeat(0u8).take(ROM_SIZE));
        let image = RomImage::from_bytes(raw.clone()).unwrap();
        assert_eq!(image.store.len(), ROM_SIZE);
        assert_eq!(image.header.as_ref().map(Vec::len), Some(COPIER_HEADER_SIZE));
        assert_eq!(image.to_bytes(), raw);
    }

    #[test]
    fn rejects_unexpected_size() {
        let err = RomImage::from_bytes(vec![0u8; 1024]).unwrap_err();
        assert!(matches!(err, RandomiserError::InvalidRomSize(1024)));
    }

    #[test]
    fn unknown_checksum_is_not_fatal() {
        let image = RomImage::from_bytes(vec![0u8; ROM_SIZE]).unwrap();
        assert_eq!(image.verify_checksum(), None);
    }

    #[test]
    fn save_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.smc");
        std::fs::write(&path, b"stale").unwrap();

        let mut image = RomImage::from_bytes(vec![0u8; ROM_SIZE]).unwrap();
        image.store.write_bytes(0x10, &[1, 2, 3]).unwrap();
        image.save(&path).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written.len(), ROM_SIZE);
        assert_eq!(&written[0x10..0x13], &[1, 2, 3]);
    }
}
