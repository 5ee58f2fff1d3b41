use serde::{Deserialize, Serialize};

use crate::registers::{Bank, CommandResult};

/// Scratch storage held inside the device. Nothing here has side effects.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterFile {
    pub bytes: [u8; 8],
    pub words: [u16; 4],
    pub longwords: [u32; 4],
    pub strings: [u32; 4],
    pub dbg_values: [u32; 4],
    pub dbg_strings: [u32; 4],
    pub cmd_result: CommandResult,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` into a bank slot, masked to the bank's element width.
    /// Returns the value actually stored.
    pub fn store(&mut self, bank: Bank, index: usize, value: u32) -> u32 {
        match bank {
            Bank::DebugValue => self.dbg_values[index] = value,
            Bank::DebugString => self.dbg_strings[index] = value,
            Bank::Byte => self.bytes[index] = (value & 0xFF) as u8,
            Bank::Word => self.words[index] = (value & 0xFFFF) as u16,
            Bank::Longword => self.longwords[index] = value,
            Bank::String => self.strings[index] = value,
        }
        self.load(bank, index)
    }

    pub fn load(&self, bank: Bank, index: usize) -> u32 {
        match bank {
            Bank::DebugValue => self.dbg_values[index],
            Bank::DebugString => self.dbg_strings[index],
            Bank::Byte => self.bytes[index] as u32,
            Bank::Word => self.words[index] as u32,
            Bank::Longword => self.longwords[index],
            Bank::String => self.strings[index],
        }
    }

    /// Pointer argument used by MAP, LOAD and the ROM remap commands.
    pub fn string_pointer(&self) -> u32 {
        self.strings[0]
    }

    pub fn clear_string_pointer(&mut self) {
        self.strings[0] = 0;
    }

    /// Drive unit argument used by MAP and UNMAP.
    pub fn drive_index(&self) -> u16 {
        self.words[0]
    }
}
