#![allow(dead_code)]

use std::path::{Path, PathBuf};

use pistorm_dev::{
    BusRead, DriveDescriptor, DriveError, DriveImage, DriveTable, Host, MapTable, MappedRegion, PiNet,
    PiScsi, RangeAdjuster, Rtg,
};

pub const CHIP_RAM_TAG: &str = "chip";
pub const KICKSTART_BASE: u32 = 0x00F8_0000;
pub const KICKSTART_SIZE: u32 = 0x100;

#[derive(Default)]
pub struct FakeRtg {
    pub busy: bool,
    pub inits: usize,
    pub shutdowns: usize,
}

impl Rtg for FakeRtg {
    fn init(&mut self) {
        self.inits += 1;
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
    }

    fn is_busy(&self) -> bool {
        self.busy
    }
}

#[derive(Default)]
pub struct FakeNet {
    pub inits: usize,
    pub shutdowns: usize,
}

impl PiNet for FakeNet {
    fn init(&mut self, _options: Option<&str>) {
        self.inits += 1;
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
    }
}

#[derive(Default)]
pub struct FakeRanges {
    pub notifications: usize,
}

impl RangeAdjuster for FakeRanges {
    fn notify_layout_changed(&mut self) {
        self.notifications += 1;
    }
}

/// Guest memory only reachable over the bus.
#[derive(Default)]
pub struct FakeBus {
    pub memory: Vec<u8>,
    pub reads: usize,
}

impl BusRead for FakeBus {
    fn read8(&mut self, address: u32) -> u8 {
        self.reads += 1;
        self.memory.get(address as usize).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScsiEvent {
    Init,
    Shutdown,
    Refresh,
    Map(u16),
    Unmap(u16),
}

/// DriveTable that records every call made to it.
#[derive(Default)]
pub struct RecordingScsi {
    pub table: DriveTable,
    pub events: Vec<ScsiEvent>,
    /// Fail every open as if the image were locked by another process.
    pub refuse_open: bool,
}

impl PiScsi for RecordingScsi {
    fn init(&mut self) {
        self.events.push(ScsiEvent::Init);
        self.table.init();
    }

    fn shutdown(&mut self) {
        self.events.push(ScsiEvent::Shutdown);
        self.table.shutdown();
    }

    fn refresh_list(&mut self) {
        self.events.push(ScsiEvent::Refresh);
        self.table.refresh_list();
    }

    fn open(&self, path: &Path) -> Result<DriveImage, DriveError> {
        if self.refuse_open {
            return Err(DriveError::Open {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::WouldBlock, "image locked"),
            });
        }
        self.table.open(path)
    }

    fn map(&mut self, image: DriveImage, index: u16) -> Result<(), DriveError> {
        self.events.push(ScsiEvent::Map(index));
        self.table.map(image, index)
    }

    fn unmap(&mut self, index: u16) {
        self.events.push(ScsiEvent::Unmap(index));
        self.table.unmap(index);
    }

    fn get(&self, index: u16) -> Option<&DriveDescriptor> {
        self.table.get(index)
    }
}

/// Every collaborator the device needs, owned in one place.
pub struct Rig {
    pub rtg: FakeRtg,
    pub net: FakeNet,
    pub scsi: RecordingScsi,
    pub regions: MapTable,
    pub bus: FakeBus,
    pub ranges: FakeRanges,
}

impl Rig {
    pub fn new() -> Self {
        let mut regions = MapTable::new();
        regions.add(MappedRegion::ram(CHIP_RAM_TAG, 0x0000_0000, 0x1000));
        regions.add(MappedRegion::rom(
            "kickstart",
            &[0x11],
            KICKSTART_BASE,
            KICKSTART_SIZE,
        ));

        Self {
            rtg: FakeRtg::default(),
            net: FakeNet::default(),
            scsi: RecordingScsi::default(),
            regions,
            bus: FakeBus {
                memory: vec![0; 0x10000],
                reads: 0,
            },
            ranges: FakeRanges::default(),
        }
    }

    pub fn host(&mut self) -> Host<'_> {
        Host {
            rtg: &mut self.rtg,
            net: &mut self.net,
            scsi: &mut self.scsi,
            regions: &mut self.regions,
            bus: &mut self.bus,
            ranges: &mut self.ranges,
        }
    }

    /// Place a NUL-terminated string in chip RAM.
    pub fn poke_string(&mut self, address: u32, s: &str) {
        let region = self.regions.get_mut(0).unwrap();
        let start = (address - region.base) as usize;
        region.data[start..start + s.len()].copy_from_slice(s.as_bytes());
        region.data[start + s.len()] = 0;
    }

    /// Place raw bytes plus a terminator in chip RAM.
    pub fn poke_bytes(&mut self, address: u32, bytes: &[u8]) {
        let region = self.regions.get_mut(0).unwrap();
        let start = (address - region.base) as usize;
        region.data[start..start + bytes.len()].copy_from_slice(bytes);
        region.data[start + bytes.len()] = 0;
    }

    /// Place a NUL-terminated string in memory only visible over the bus.
    pub fn poke_bus_string(&mut self, address: u32, s: &str) {
        let start = address as usize;
        self.bus.memory[start..start + s.len()].copy_from_slice(s.as_bytes());
        self.bus.memory[start + s.len()] = 0;
    }
}

pub fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "pistorm-dev-test-{}-{}",
        std::process::id(),
        name
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn missing_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "pistorm-dev-missing-{}-{}",
        std::process::id(),
        name
    ));
    let _ = std::fs::remove_file(&path);
    path
}
