// Enable/disable/remap logic for the subsystems the device controls.

use std::{fs::File, path::Path};

use crate::{
    error::{DeviceError, DriveError, RegionError},
    host::{PiNet, Rtg},
    region::{load_rom_image, RegionTable},
    registers::{CommandResult, ConfigCommand, MAX_DRIVE_INDEX},
    scsi::PiScsi,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubsystemFlags {
    pub rtg_enabled: bool,
    pub net_enabled: bool,
    pub scsi_enabled: bool,
}

/// Requests picked up by the emulator's main loop. The device only ever sets them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingSignals {
    reset: bool,
    config_reload: u8,
}

impl PendingSignals {
    pub fn request_reset(&mut self) {
        self.reset = true;
    }

    pub fn reset_pending(&self) -> bool {
        self.reset
    }

    pub fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset)
    }

    pub fn request_config_reload(&mut self, command: ConfigCommand) {
        self.config_reload = command.pending_code();
    }

    /// 0 when nothing is pending, otherwise sub-command + 1.
    pub fn config_reload_code(&self) -> u8 {
        self.config_reload
    }

    pub fn config_reload(&self) -> Option<ConfigCommand> {
        ConfigCommand::from_pending_code(self.config_reload)
    }

    pub fn take_config_reload(&mut self) -> Option<ConfigCommand> {
        ConfigCommand::from_pending_code(std::mem::take(&mut self.config_reload))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    pub flags: SubsystemFlags,
    pub signals: PendingSignals,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rtg(&mut self, rtg: &mut dyn Rtg, value: u32) -> CommandResult {
        match (value, self.flags.rtg_enabled) {
            (1, false) => {
                rtg.init();
                self.flags.rtg_enabled = true;
                tracing::info!("[PISTORM-DEV] RTG enabled");
                CommandResult::Ok
            }
            (0, true) if rtg.is_busy() => {
                tracing::warn!("[PISTORM-DEV] Refusing to disable RTG while it is in use");
                CommandResult::Failed
            }
            (0, true) => {
                rtg.shutdown();
                self.flags.rtg_enabled = false;
                tracing::info!("[PISTORM-DEV] RTG disabled");
                CommandResult::Ok
            }
            _ => CommandResult::NoChange,
        }
    }

    pub fn set_net(&mut self, net: &mut dyn PiNet, value: u32) -> CommandResult {
        match (value, self.flags.net_enabled) {
            (1, false) => {
                net.init(None);
                self.flags.net_enabled = true;
                tracing::info!("[PISTORM-DEV] PiNet enabled");
                CommandResult::Ok
            }
            (0, true) => {
                net.shutdown();
                self.flags.net_enabled = false;
                tracing::info!("[PISTORM-DEV] PiNet disabled");
                CommandResult::Ok
            }
            _ => CommandResult::NoChange,
        }
    }

    pub fn enable_scsi(&mut self, scsi: &mut dyn PiScsi) -> CommandResult {
        if self.flags.scsi_enabled {
            return CommandResult::NoChange;
        }
        scsi.init();
        self.flags.scsi_enabled = true;
        scsi.refresh_list();
        tracing::info!("[PISTORM-DEV] PiSCSI enabled");
        CommandResult::Ok
    }

    pub fn disable_scsi(&mut self, scsi: &mut dyn PiScsi) -> CommandResult {
        if !self.flags.scsi_enabled {
            return CommandResult::NoChange;
        }
        scsi.shutdown();
        self.flags.scsi_enabled = false;
        tracing::info!("[PISTORM-DEV] PiSCSI disabled");
        CommandResult::Ok
    }

    /// Map `path` at `index`, replacing whatever drive was there.
    pub fn map_drive(
        &mut self,
        scsi: &mut dyn PiScsi,
        path: &Path,
        index: u16,
    ) -> Result<(), DeviceError> {
        if index > MAX_DRIVE_INDEX {
            return Err(DriveError::InvalidDrive(index).into());
        }

        // A drive already in the slot stays until the new image is open.
        let image = scsi.open(path)?;
        tracing::info!("[PISTORM-DEV] Mapping {:?} as PiSCSI drive {}", path, index);
        if scsi.get(index).is_some_and(|drive| drive.is_mapped()) {
            scsi.unmap(index);
        }
        scsi.map(image, index)?;
        Ok(())
    }

    pub fn unmap_drive(&mut self, scsi: &mut dyn PiScsi, index: u16) -> CommandResult {
        if index > MAX_DRIVE_INDEX {
            tracing::warn!("[PISTORM-DEV] Invalid drive ID {} for PiSCSI unmap", index);
            return CommandResult::InvalidValue;
        }
        if scsi.get(index).is_some_and(|drive| drive.is_mapped()) {
            scsi.unmap(index);
            CommandResult::Ok
        } else {
            CommandResult::NoChange
        }
    }

    /// Swap the ROM image behind `tag` for the contents of `path`, then ask for a reset.
    ///
    /// The new image is fully read before the region is touched, so on any
    /// error the old mapping stays in place.
    pub fn remap_rom(
        &mut self,
        regions: &mut dyn RegionTable,
        tag: &str,
        path: &Path,
    ) -> Result<(), DeviceError> {
        let size = regions
            .find_by_tag(tag)
            .map(|region| region.size)
            .ok_or_else(|| RegionError::UnknownTag(tag.to_string()))?;

        let image = load_rom_image(path, size)?;
        regions.replace(tag, image, path)?;

        tracing::info!("[PISTORM-DEV] Remapped '{}' from {:?}, reset pending", tag, path);
        self.signals.request_reset();
        Ok(())
    }
}

/// Check that `path` names an existing, readable file.
pub fn check_file(path: &Path) -> Result<(), DeviceError> {
    File::open(path)
        .map(|_| ())
        .map_err(|_| DeviceError::FileNotFound(path.to_path_buf()))
}
