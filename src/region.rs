use std::{
    fmt,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::RegionError;

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum MapKind {
    #[default]
    None,
    Rom,
    Ram,
}

/// A guest address range backed by a host buffer.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct MappedRegion {
    pub id: String,
    pub kind: MapKind,
    pub base: u32,
    pub size: u32,
    pub source: Option<PathBuf>,
    pub data: Vec<u8>,
}

impl fmt::Display for MappedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} '{}' base=${:08X} size=${:08X}",
            self.kind, self.id, self.base, self.size
        )?;
        if let Some(source) = &self.source {
            write!(f, " path={:?}", source)?;
        }
        Ok(())
    }
}

impl MappedRegion {
    /// ROM region filled from `image`. A short image is repeated to fill `size`.
    pub fn rom(id: &str, image: &[u8], base: u32, size: u32) -> Self {
        Self {
            id: id.to_string(),
            kind: MapKind::Rom,
            base,
            size,
            source: None,
            data: rom_image(image, size),
        }
    }

    pub fn ram(id: &str, base: u32, size: u32) -> Self {
        Self {
            id: id.to_string(),
            kind: MapKind::Ram,
            base,
            size,
            source: None,
            data: vec![0; size as usize],
        }
    }

    pub fn load(id: &str, rom_path: PathBuf, base: u32, size: u32) -> anyhow::Result<Self> {
        let data = load_rom_image(&rom_path, size)?;
        Ok(Self {
            id: id.to_string(),
            kind: MapKind::Rom,
            base,
            size,
            source: Some(rom_path),
            data,
        })
    }

    pub fn contains(&self, address: u32) -> bool {
        address >= self.base && (address - self.base) < self.size
    }

    /// Host bytes from `address` to the end of the region.
    pub fn slice_from(&self, address: u32) -> Option<&[u8]> {
        if !self.contains(address) {
            return None;
        }
        let offset = (address - self.base) as usize;
        self.data.get(offset..)
    }
}

fn rom_image(image: &[u8], size: u32) -> Vec<u8> {
    let size = size as usize;
    if image.is_empty() {
        return vec![0xFF; size];
    }
    image.iter().copied().cycle().take(size).collect()
}

/// Read a ROM file and size it to exactly `size` bytes.
pub fn load_rom_image(path: &Path, size: u32) -> Result<Vec<u8>, RegionError> {
    let mut buffer = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut buffer))
        .map_err(|source| RegionError::Load {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(rom_image(&buffer, size))
}

/// The emulator's table of locally backed guest ranges.
pub trait RegionTable {
    fn find_by_address(&self, address: u32) -> Option<&MappedRegion>;
    fn find_by_tag(&self, tag: &str) -> Option<&MappedRegion>;
    /// Swap the buffer of the region tagged `tag` for `data`, which must already be
    /// exactly the region's size. The table is untouched on error.
    fn replace(&mut self, tag: &str, data: Vec<u8>, source: &Path) -> Result<(), RegionError>;
}

#[derive(Debug, Default, Clone)]
pub struct MapTable {
    regions: Vec<MappedRegion>,
}

impl MapTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, region: MappedRegion) -> usize {
        tracing::info!("[MAPTABLE] Added {}", region);
        self.regions.push(region);
        self.regions.len() - 1
    }

    pub fn regions(&self) -> &[MappedRegion] {
        &self.regions
    }

    pub fn get(&self, index: usize) -> Option<&MappedRegion> {
        self.regions.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut MappedRegion> {
        self.regions.get_mut(index)
    }

    fn position_by_tag(&self, tag: &str) -> Option<usize> {
        self.regions
            .iter()
            .position(|region| region.kind != MapKind::None && region.id == tag)
    }
}

impl RegionTable for MapTable {
    fn find_by_address(&self, address: u32) -> Option<&MappedRegion> {
        self.regions
            .iter()
            .find(|region| region.kind != MapKind::None && region.contains(address))
    }

    fn find_by_tag(&self, tag: &str) -> Option<&MappedRegion> {
        self.position_by_tag(tag).map(|index| &self.regions[index])
    }

    fn replace(&mut self, tag: &str, data: Vec<u8>, source: &Path) -> Result<(), RegionError> {
        let index = self
            .position_by_tag(tag)
            .ok_or_else(|| RegionError::UnknownTag(tag.to_string()))?;
        let old = &self.regions[index];
        if data.len() != old.size as usize {
            return Err(RegionError::SizeMismatch {
                tag: tag.to_string(),
                expected: old.size,
                actual: data.len(),
            });
        }
        let replacement = MappedRegion {
            id: old.id.clone(),
            kind: MapKind::Rom,
            base: old.base,
            size: old.size,
            source: Some(source.to_path_buf()),
            data,
        };

        tracing::info!("[MAPTABLE] Replacing {} with {}", old, replacement);
        self.regions[index] = replacement;
        Ok(())
    }
}
