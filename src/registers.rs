// PiStorm interaction device register layout.
//
// External software is built against these values, so none of them may move.
//
// +-----------------+---------------------------------------------------+
// | Offset          | Register                                          |
// +-----------------+---------------------------------------------------+
// | 0x0000          | [W]  Reset the host system                        |
// | 0x0002          | [W]  Switch config (sub-command in value)         |
// | 0x0004          | [RW] PiSCSI control / PiSCSI enabled              |
// | 0x0006          | [RW] RTG status                                   |
// | 0x0008          | [RW] Network status                               |
// | 0x000A          | [W]  Remap Kickstart ROM from PI_STR1             |
// | 0x000E          | [W]  Remap extended ROM from PI_STR1              |
// | 0x0010 / 0x0012 | [R]  Hardware / software revision                 |
// | 0x1000          | [W]  Debug message trigger                        |
// | 0x1010-0x101C   | [RW] Debug values 1-4                             |
// | 0x1030-0x103C   | [W]  Debug string pointers 1-4                    |
// | 0x2000-0x2007   | [RW] Bytes 1-8                                    |
// | 0x2008-0x200E   | [RW] Words 1-4                                    |
// | 0x2010-0x201C   | [RW] Longwords 1-4                                |
// | 0x2020-0x202C   | [W]  String pointers 1-4                          |
// | 0x2100          | [R]  Last command result                          |
// +-----------------+---------------------------------------------------+

use std::fmt;

use serde::{Deserialize, Serialize};

pub const PI_CMD_RESET: u16 = 0x0000;
pub const PI_CMD_SWITCHCONFIG: u16 = 0x0002;
pub const PI_CMD_PISCSI_CTRL: u16 = 0x0004;
pub const PI_CMD_RTGSTATUS: u16 = 0x0006;
pub const PI_CMD_NETSTATUS: u16 = 0x0008;
pub const PI_CMD_KICKROM: u16 = 0x000A;
pub const PI_CMD_EXTROM: u16 = 0x000E;

pub const PI_CMD_HWREV: u16 = 0x0010;
pub const PI_CMD_SWREV: u16 = 0x0012;

pub const PI_DBG_MSG: u16 = 0x1000;
pub const PI_DBG_VAL1: u16 = 0x1010;
pub const PI_DBG_VAL2: u16 = 0x1014;
pub const PI_DBG_VAL3: u16 = 0x1018;
pub const PI_DBG_VAL4: u16 = 0x101C;
pub const PI_DBG_STR1: u16 = 0x1030;
pub const PI_DBG_STR2: u16 = 0x1034;
pub const PI_DBG_STR3: u16 = 0x1038;
pub const PI_DBG_STR4: u16 = 0x103C;

pub const PI_BYTE1: u16 = 0x2000;
pub const PI_WORD1: u16 = 0x2008;
pub const PI_LONGWORD1: u16 = 0x2010;
pub const PI_STR1: u16 = 0x2020;
pub const PI_STR2: u16 = 0x2024;
pub const PI_STR3: u16 = 0x2028;
pub const PI_STR4: u16 = 0x202C;

pub const PI_CMDRESULT: u16 = 0x2100;

/// Hardware revision reported at `PI_CMD_HWREV` (1.1).
pub const HARDWARE_REVISION: u32 = 0x0101;
/// Software revision reported at `PI_CMD_SWREV` (1.5).
pub const SOFTWARE_REVISION: u32 = 0x0105;

/// Highest PiSCSI unit number addressable through `PI_WORD1`.
pub const MAX_DRIVE_INDEX: u16 = 7;

/// Region tags the ROM remap commands operate on.
pub const KICKSTART_TAG: &str = "kickstart";
pub const EXTENDED_TAG: &str = "extended";

/// Width of a single bus access. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessWidth {
    Byte,
    Word,
    Longword,
}

impl fmt::Display for AccessWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessWidth::Byte => write!(f, "BYTE"),
            AccessWidth::Word => write!(f, "WORD"),
            AccessWidth::Longword => write!(f, "LONGWORD"),
        }
    }
}

/// Value left in `PI_CMDRESULT` by the last command write.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum CommandResult {
    #[default]
    Ok = 0,
    Failed = 1,
    NoChange = 2,
    FileNotFound = 3,
    InvalidValue = 4,
    InvalidCommand = 5,
}

impl CommandResult {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Sub-commands written to `PI_CMD_PISCSI_CTRL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScsiCommand {
    None = 0,
    Map = 1,
    Unmap = 2,
    Eject = 3,
    Insert = 4,
    Enable = 5,
    Disable = 6,
}

impl ScsiCommand {
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(ScsiCommand::None),
            1 => Some(ScsiCommand::Map),
            2 => Some(ScsiCommand::Unmap),
            3 => Some(ScsiCommand::Eject),
            4 => Some(ScsiCommand::Insert),
            5 => Some(ScsiCommand::Enable),
            6 => Some(ScsiCommand::Disable),
            _ => None,
        }
    }
}

/// Sub-commands written to `PI_CMD_SWITCHCONFIG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    Load = 0,
    Reload = 1,
    Default = 2,
}

impl ConfigCommand {
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(ConfigCommand::Load),
            1 => Some(ConfigCommand::Reload),
            2 => Some(ConfigCommand::Default),
            _ => None,
        }
    }

    /// Code handed to the config loader; zero means "nothing pending".
    pub fn pending_code(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_pending_code(code: u8) -> Option<Self> {
        code.checked_sub(1)
            .and_then(|value| Self::from_value(value as u32))
    }
}

/// Storage bank behind a repeated scratch register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    DebugValue,
    DebugString,
    Byte,
    Word,
    Longword,
    String,
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bank::DebugValue => write!(f, "DEBUG VALUE"),
            Bank::DebugString => write!(f, "DEBUG STRING POINTER"),
            Bank::Byte => write!(f, "BYTE"),
            Bank::Word => write!(f, "WORD"),
            Bank::Longword => write!(f, "LONGWORD"),
            Bank::String => write!(f, "STRING POINTER"),
        }
    }
}

/// A run of identical registers: `count` elements of `stride` bytes from `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWindow {
    pub base: u16,
    pub count: u16,
    pub stride: u16,
    pub bank: Bank,
}

impl RegisterWindow {
    pub fn end(&self) -> u16 {
        self.base + self.count * self.stride
    }

    /// Only offsets aligned to an element start decode.
    pub fn index_of(&self, offset: u16) -> Option<usize> {
        if offset < self.base || offset >= self.end() {
            return None;
        }
        let delta = offset - self.base;
        if delta % self.stride != 0 {
            return None;
        }
        Some((delta / self.stride) as usize)
    }
}

/// Scratch windows, sorted by base offset.
pub const SCRATCH_WINDOWS: [RegisterWindow; 6] = [
    RegisterWindow {
        base: PI_DBG_VAL1,
        count: 4,
        stride: 4,
        bank: Bank::DebugValue,
    },
    RegisterWindow {
        base: PI_DBG_STR1,
        count: 4,
        stride: 4,
        bank: Bank::DebugString,
    },
    RegisterWindow {
        base: PI_BYTE1,
        count: 8,
        stride: 1,
        bank: Bank::Byte,
    },
    RegisterWindow {
        base: PI_WORD1,
        count: 4,
        stride: 2,
        bank: Bank::Word,
    },
    RegisterWindow {
        base: PI_LONGWORD1,
        count: 4,
        stride: 4,
        bank: Bank::Longword,
    },
    RegisterWindow {
        base: PI_STR1,
        count: 4,
        stride: 4,
        bank: Bank::String,
    },
];

/// Map a register offset to a scratch bank slot.
pub fn decode_scratch(offset: u16) -> Option<(Bank, usize)> {
    SCRATCH_WINDOWS
        .iter()
        .find_map(|window| window.index_of(offset).map(|index| (window.bank, index)))
}
