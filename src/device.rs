// PiStorm interaction device: register window read/write dispatch.

use std::path::{Path, PathBuf};

use crate::{
    config::DeviceConfig,
    error::{DeviceError, StringFetchError},
    guest_memory::fetch_path,
    host::Host,
    lifecycle::{check_file, Lifecycle, PendingSignals, SubsystemFlags},
    register_file::RegisterFile,
    registers::*,
};

#[derive(Debug)]
pub struct PiDevice {
    config: DeviceConfig,
    regs: RegisterFile,
    lifecycle: Lifecycle,
    cfg_filename: PathBuf,
}

impl Default for PiDevice {
    fn default() -> Self {
        Self::new(DeviceConfig::default())
    }
}

impl PiDevice {
    pub fn new(config: DeviceConfig) -> Self {
        let cfg_filename = config.default_config_file.clone();
        Self {
            config,
            regs: RegisterFile::new(),
            lifecycle: Lifecycle::new(),
            cfg_filename,
        }
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn cmd_result(&self) -> CommandResult {
        self.regs.cmd_result
    }

    pub fn flags(&self) -> SubsystemFlags {
        self.lifecycle.flags
    }

    /// Mark subsystems the emulator brought up from its own config at startup.
    pub fn flags_mut(&mut self) -> &mut SubsystemFlags {
        &mut self.lifecycle.flags
    }

    pub fn signals(&self) -> &PendingSignals {
        &self.lifecycle.signals
    }

    pub fn signals_mut(&mut self) -> &mut PendingSignals {
        &mut self.lifecycle.signals
    }

    pub fn config_filename(&self) -> &Path {
        &self.cfg_filename
    }

    pub fn set_config_filename(&mut self, filename: impl Into<PathBuf>) {
        self.cfg_filename = filename.into();
    }

    pub fn handle_write(&mut self, host: &mut Host<'_>, addr: u32, value: u32, width: AccessWidth) {
        let offset = (addr & 0xFFFF) as u16;

        if offset == PI_DBG_MSG {
            self.debug_message();
            return;
        }

        if let Some((bank, index)) = decode_scratch(offset) {
            let stored = self.regs.store(bank, index, value);
            tracing::debug!(
                "[PISTORM-DEV] Set {} {} to {} (${:08X})",
                bank,
                index,
                stored,
                stored
            );
            return;
        }

        match offset {
            PI_CMD_RTGSTATUS => {
                tracing::debug!("[PISTORM-DEV] Write to RTGSTATUS: {}", value);
                self.regs.cmd_result = self.lifecycle.set_rtg(host.rtg, value);
                host.ranges.notify_layout_changed();
            }
            PI_CMD_NETSTATUS => {
                tracing::debug!("[PISTORM-DEV] Write to NETSTATUS: {}", value);
                self.regs.cmd_result = self.lifecycle.set_net(host.net, value);
                host.ranges.notify_layout_changed();
            }
            PI_CMD_PISCSI_CTRL => {
                self.regs.cmd_result = self.scsi_control(host, value);
                host.ranges.notify_layout_changed();
            }
            PI_CMD_KICKROM => self.remap_rom(host, KICKSTART_TAG),
            PI_CMD_EXTROM => self.remap_rom(host, EXTENDED_TAG),
            PI_CMD_RESET => {
                tracing::info!("[PISTORM-DEV] System reset called, code {}", value & 0xFFFF);
                self.lifecycle.signals.request_reset();
            }
            PI_CMD_SWITCHCONFIG => self.switch_config(host, value),
            _ => {
                tracing::warn!(
                    "[PISTORM-DEV] Unhandled {} register write to {:04X}: {}",
                    width,
                    offset,
                    value
                );
                self.regs.cmd_result = CommandResult::InvalidCommand;
            }
        }
    }

    pub fn handle_read(&self, host: &Host<'_>, addr: u32, width: AccessWidth) -> u32 {
        let offset = (addr & 0xFFFF) as u16;
        let flags = self.lifecycle.flags;

        match offset {
            PI_CMD_HWREV => self.config.hardware_revision,
            PI_CMD_SWREV => self.config.software_revision,
            PI_CMD_RTGSTATUS => {
                ((host.rtg.is_busy() as u32) << 1) | flags.rtg_enabled as u32
            }
            PI_CMD_NETSTATUS => flags.net_enabled as u32,
            PI_CMD_PISCSI_CTRL => flags.scsi_enabled as u32,
            PI_CMDRESULT => self.regs.cmd_result.code(),
            _ => match decode_scratch(offset) {
                // Pointer registers are write-only.
                Some((bank, index)) if !matches!(bank, Bank::String | Bank::DebugString) => {
                    let value = self.regs.load(bank, index);
                    tracing::debug!(
                        "[PISTORM-DEV] Read {} {} ({} / ${:08X})",
                        bank,
                        index,
                        value,
                        value
                    );
                    value
                }
                _ => {
                    tracing::warn!(
                        "[PISTORM-DEV] Unhandled {} register read from {:04X}",
                        width,
                        offset
                    );
                    0
                }
            },
        }
    }

    fn debug_message(&self) {
        tracing::info!(
            "[PISTORM-DEV] DEBUG values: {:08X?} strings: {:08X?}",
            self.regs.dbg_values,
            self.regs.dbg_strings
        );
    }

    /// Resolve `PI_STR1` to a host path that exists.
    fn resolve_path_argument(&self, host: &mut Host<'_>) -> Result<PathBuf, DeviceError> {
        let address = self.regs.string_pointer();
        if address == 0 {
            return Err(StringFetchError::NullPointer.into());
        }
        let path = fetch_path(
            &*host.regions,
            &mut *host.bus,
            address,
            self.config.max_string_len,
        )?;
        check_file(&path)?;
        Ok(path)
    }

    fn scsi_control(&mut self, host: &mut Host<'_>, value: u32) -> CommandResult {
        let command = ScsiCommand::from_value(value);
        tracing::debug!("[PISTORM-DEV] Write to PISCSI_CTRL: {:?}", command);

        match command {
            Some(ScsiCommand::Enable) => self.lifecycle.enable_scsi(host.scsi),
            Some(ScsiCommand::Disable) => self.lifecycle.disable_scsi(host.scsi),
            Some(ScsiCommand::Map) => {
                let index = self.regs.drive_index();
                let result = self
                    .resolve_path_argument(host)
                    .and_then(|path| self.lifecycle.map_drive(host.scsi, &path, index));
                self.regs.clear_string_pointer();
                match result {
                    Ok(()) => CommandResult::Ok,
                    Err(err) => {
                        tracing::warn!("[PISTORM-DEV] PiSCSI map of drive {} failed: {}", index, err);
                        err.result()
                    }
                }
            }
            Some(ScsiCommand::Unmap) => self.lifecycle.unmap_drive(host.scsi, self.regs.drive_index()),
            Some(ScsiCommand::Eject) | Some(ScsiCommand::Insert) => {
                tracing::debug!("[PISTORM-DEV] PiSCSI {:?} not implemented", command);
                CommandResult::NoChange
            }
            Some(ScsiCommand::None) | None => CommandResult::InvalidValue,
        }
    }

    fn remap_rom(&mut self, host: &mut Host<'_>, tag: &str) {
        tracing::debug!("[PISTORM-DEV] Write to ROM remap for '{}'", tag);
        let result = self
            .resolve_path_argument(host)
            .and_then(|path| self.lifecycle.remap_rom(&mut *host.regions, tag, &path));

        self.regs.cmd_result = match result {
            Ok(()) => CommandResult::Ok,
            Err(err) => {
                tracing::warn!("[PISTORM-DEV] Cannot remap '{}': {}", tag, err);
                err.result()
            }
        };
        host.ranges.notify_layout_changed();
        self.regs.clear_string_pointer();
    }

    fn switch_config(&mut self, host: &mut Host<'_>, value: u32) {
        let command = ConfigCommand::from_value(value);
        tracing::debug!("[PISTORM-DEV] Config switch called, command: {:?}", command);

        match command {
            Some(ConfigCommand::Load) => {
                let result = self.resolve_path_argument(host);
                self.regs.clear_string_pointer();
                self.regs.cmd_result = match result {
                    Ok(path) => {
                        tracing::info!("[PISTORM-DEV] Attempting to load config file {:?}", path);
                        self.cfg_filename = path;
                        self.lifecycle.signals.request_config_reload(ConfigCommand::Load);
                        CommandResult::Ok
                    }
                    Err(err) => {
                        tracing::warn!("[PISTORM-DEV] Cannot load config: {}", err);
                        err.result()
                    }
                };
            }
            Some(ConfigCommand::Reload) => {
                tracing::info!("[PISTORM-DEV] Reloading current config file {:?}", self.cfg_filename);
                self.lifecycle.signals.request_config_reload(ConfigCommand::Reload);
            }
            Some(ConfigCommand::Default) => {
                tracing::info!(
                    "[PISTORM-DEV] Loading default config {:?}",
                    self.config.default_config_file
                );
                self.lifecycle.signals.request_config_reload(ConfigCommand::Default);
            }
            None => {
                tracing::warn!("[PISTORM-DEV] Unknown config command {}, ignored", value);
                self.regs.cmd_result = CommandResult::InvalidValue;
            }
        }
    }
}
