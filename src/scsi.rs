// PiSCSI drive mapping
// Up to eight host image files exposed to the guest as SCSI units

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use crate::{error::DriveError, registers::MAX_DRIVE_INDEX};

pub const NUM_DRIVES: usize = MAX_DRIVE_INDEX as usize + 1;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DriveDescriptor {
    pub path: Option<PathBuf>,
    pub size: u64,
}

impl DriveDescriptor {
    pub fn is_mapped(&self) -> bool {
        self.path.is_some()
    }
}

/// An opened image file, ready to be placed in a drive slot.
#[derive(Debug)]
pub struct DriveImage {
    pub path: PathBuf,
    pub size: u64,
    file: File,
}

impl DriveImage {
    pub fn open(path: &Path) -> Result<Self, DriveError> {
        let open_err = |source: std::io::Error| DriveError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        let size = file.metadata().map_err(open_err)?.len();
        Ok(Self {
            path: path.to_path_buf(),
            size,
            file,
        })
    }
}

pub trait PiScsi {
    fn init(&mut self);
    fn shutdown(&mut self);
    fn refresh_list(&mut self);
    /// Open `path` without touching any drive slot.
    fn open(&self, path: &Path) -> Result<DriveImage, DriveError>;
    /// Place an opened image in slot `index`, which must be free.
    fn map(&mut self, image: DriveImage, index: u16) -> Result<(), DriveError>;
    fn unmap(&mut self, index: u16);
    fn get(&self, index: u16) -> Option<&DriveDescriptor>;
}

#[derive(Default)]
struct MappedDrive {
    descriptor: DriveDescriptor,
    // held open for as long as the unit is mapped
    _file: Option<File>,
}

pub struct DriveTable {
    drives: [MappedDrive; NUM_DRIVES],
    active: bool,
}

impl Default for DriveTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveTable {
    pub fn new() -> Self {
        Self {
            drives: Default::default(),
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mapped_count(&self) -> usize {
        self.drives
            .iter()
            .filter(|drive| drive.descriptor.is_mapped())
            .count()
    }
}

impl PiScsi for DriveTable {
    fn init(&mut self) {
        self.active = true;
        tracing::info!("[PISCSI] Initialized with {} mapped drive(s)", self.mapped_count());
    }

    fn shutdown(&mut self) {
        // Drives stay mapped so a later enable picks them up again.
        self.active = false;
        tracing::info!("[PISCSI] Shut down");
    }

    fn refresh_list(&mut self) {
        for (index, drive) in self.drives.iter().enumerate() {
            if let Some(path) = &drive.descriptor.path {
                tracing::info!(
                    "[PISCSI] Drive {}: {:?} ({} bytes)",
                    index,
                    path,
                    drive.descriptor.size
                );
            }
        }
    }

    fn open(&self, path: &Path) -> Result<DriveImage, DriveError> {
        DriveImage::open(path)
    }

    fn map(&mut self, image: DriveImage, index: u16) -> Result<(), DriveError> {
        let DriveImage { path, size, file } = image;
        let drive = self
            .drives
            .get_mut(index as usize)
            .ok_or(DriveError::InvalidDrive(index))?;

        tracing::info!("[PISCSI] Mapped {:?} as drive {}", path, index);
        *drive = MappedDrive {
            descriptor: DriveDescriptor {
                path: Some(path),
                size,
            },
            _file: Some(file),
        };
        Ok(())
    }

    fn unmap(&mut self, index: u16) {
        if let Some(drive) = self.drives.get_mut(index as usize) {
            if drive.descriptor.is_mapped() {
                tracing::info!("[PISCSI] Unmapped drive {}", index);
            }
            *drive = MappedDrive::default();
        }
    }

    fn get(&self, index: u16) -> Option<&DriveDescriptor> {
        self.drives
            .get(index as usize)
            .map(|drive| &drive.descriptor)
    }
}
