// Host-side subsystems the device drives. The emulator owns all of them and
// lends them to the device for the duration of one bus access.

use crate::{guest_memory::BusRead, region::RegionTable, scsi::PiScsi};

/// RTG graphics card emulation.
pub trait Rtg {
    fn init(&mut self);
    fn shutdown(&mut self);
    /// True while the guest has an RTG screen open.
    fn is_busy(&self) -> bool;
}

/// Network bridge.
pub trait PiNet {
    fn init(&mut self, options: Option<&str>);
    fn shutdown(&mut self);
}

/// Recomputes which guest ranges are served locally.
pub trait RangeAdjuster {
    fn notify_layout_changed(&mut self);
}

pub struct Host<'a> {
    pub rtg: &'a mut dyn Rtg,
    pub net: &'a mut dyn PiNet,
    pub scsi: &'a mut dyn PiScsi,
    pub regions: &'a mut dyn RegionTable,
    pub bus: &'a mut dyn BusRead,
    pub ranges: &'a mut dyn RangeAdjuster,
}
