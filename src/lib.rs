//! Virtual control device for a PiStorm-style bus bridge.
//!
//! Software on the real 68k side pokes a small register window to switch RTG,
//! networking and PiSCSI on or off, map drive images, swap ROM images and
//! request resets or config switches. [`PiDevice`] decodes those accesses and
//! drives the host subsystems lent to it through [`Host`].

pub mod config;
pub mod device;
pub mod error;
pub mod guest_memory;
pub mod host;
pub mod lifecycle;
pub mod region;
pub mod register_file;
pub mod registers;
pub mod scsi;

pub use config::DeviceConfig;
pub use device::PiDevice;
pub use error::{DeviceError, DriveError, RegionError, StringFetchError};
pub use guest_memory::{fetch_bytes, fetch_path, fetch_string, grab_string, BusRead};
pub use host::{Host, PiNet, RangeAdjuster, Rtg};
pub use lifecycle::{PendingSignals, SubsystemFlags};
pub use region::{MapKind, MapTable, MappedRegion, RegionTable};
pub use registers::{AccessWidth, CommandResult, ConfigCommand, ScsiCommand};
pub use scsi::{DriveDescriptor, DriveImage, DriveTable, PiScsi};

use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `fmt` subscriber filtered by `RUST_LOG`, falling back to `default_filter`.
pub fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
