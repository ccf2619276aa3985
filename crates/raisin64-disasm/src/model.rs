use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use raisin64::{Bus, MemoryError};

#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub name: String,
    pub base: u64,
    pub bytes: Vec<u8>,
    pub perms: &'static str, // e.g., "r-x"
    pub kind: &'static str,  // e.g., "raw"
}

impl Segment {
    /// A read-only, executable segment holding a raw image.
    pub fn raw(base: u64, bytes: Vec<u8>) -> Self {
        Self { name: "segment0".into(), base, bytes, perms: "r-x", kind: "raw" }
    }

    fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr - self.base < self.bytes.len() as u64
    }
}

#[derive(Debug, Clone)]
pub struct Image {
    pub segments: Vec<Segment>,
}

/// Map `len` bytes of `path`, starting `skip` bytes in, at `base`.
pub fn load_raw_bin(path: &Path, base: u64, skip: usize, len: Option<usize>) -> Result<Image> {
    let file = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let rest = file
        .get(skip..)
        .with_context(|| format!("--skip {skip} exceeds file size {}", file.len()))?;
    let payload = match len {
        Some(n) => rest
            .get(..n)
            .with_context(|| format!("--len {n} exceeds the {} bytes left after --skip", rest.len()))?,
        None => rest,
    };
    anyhow::ensure!(
        base.checked_add(payload.len() as u64).is_some(),
        "{} bytes do not fit above {base:#x}",
        payload.len()
    );
    Ok(Image { segments: vec![Segment::raw(base, payload.to_vec())] })
}

pub fn read_u8(img: &Image, addr: u64) -> Option<u8> {
    let s = img.segments.iter().find(|s| s.contains(addr))?;
    Some(s.bytes[(addr - s.base) as usize])
}

/// Big-endian, may straddle segments.
pub fn read_u64(img: &Image, addr: u64) -> Option<u64> {
    let mut b = [0u8; 8];
    for (i, v) in b.iter_mut().enumerate() {
        *v = read_u8(img, addr.wrapping_add(i as u64))?;
    }
    Some(u64::from_be_bytes(b))
}

pub fn is_mapped(img: &Image, addr: u64) -> bool {
    img.segments.iter().any(|s| s.contains(addr))
}

// Raw images are read-only.
impl Bus for Image {
    fn read_u8(&self, addr: u64) -> Result<u8, MemoryError> {
        read_u8(self, addr).ok_or(MemoryError::Unmapped { addr, len: 1 })
    }

    fn write_u8(&mut self, addr: u64, _val: u8) -> Result<(), MemoryError> {
        Err(MemoryError::Unmapped { addr, len: 1 })
    }

    fn read_u64(&self, addr: u64) -> Result<u64, MemoryError> {
        read_u64(self, addr).ok_or(MemoryError::Unmapped { addr, len: 8 })
    }
}
