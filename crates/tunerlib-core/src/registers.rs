//! Shadow register bank for the Si4700/01/02/03 tuner family.
//!
//! The chip exposes sixteen 16-bit registers, addressed 0x00-0x0F. Every
//! bus transaction moves the bank as a unit: a read returns a 32-byte
//! snapshot starting at the status register and wrapping around to address
//! zero, and a write covers the control span from the power configuration
//! register through the second test register. [`RegisterBank`] mirrors one
//! such snapshot and provides the pack/unpack codecs plus bit-level
//! accessors for the status and identity fields.
//!
//! A bank is transient by design: the physical registers change
//! asynchronously (RDS data ready, seek/tune completion), so every
//! mutation is read-modify-write against a freshly fetched snapshot and a
//! bank is never retained across operations.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Register addresses, used as indices into a [`RegisterBank`].
pub mod reg {
    /// Part number and manufacturer ID.
    pub const DEVICE_ID: usize = 0x00;
    /// Chip revision, device, and firmware version.
    pub const CHIP_ID: usize = 0x01;
    /// Power configuration: mute, mono, seek command, enable/disable.
    pub const POWER_CFG: usize = 0x02;
    /// Tune command and channel selection.
    pub const CHANNEL: usize = 0x03;
    /// RDS enable, interrupt enables, GPIO routing.
    pub const SYS_CONFIG1: usize = 0x04;
    /// Channel spacing, band, and volume.
    pub const SYS_CONFIG2: usize = 0x05;
    /// Seek SNR and impulse thresholds.
    pub const SYS_CONFIG3: usize = 0x06;
    /// Crystal oscillator control (vendor magic value at power-up).
    pub const TEST1: usize = 0x07;
    pub const TEST2: usize = 0x08;
    pub const BOOT_CONFIG: usize = 0x09;
    /// RDS ready, seek/tune busy, band limit, stereo, RSSI.
    pub const STATUS_RSSI: usize = 0x0A;
    /// Channel read-back after a seek or tune.
    pub const READ_CHAN: usize = 0x0B;
    /// RDS block A (program identifier).
    pub const RDS_A: usize = 0x0C;
    /// RDS block B (group type, flags, payload).
    pub const RDS_B: usize = 0x0D;
    /// RDS block C (payload).
    pub const RDS_C: usize = 0x0E;
    /// RDS block D (payload).
    pub const RDS_D: usize = 0x0F;
}

/// Bit positions within the POWER_CFG register.
pub mod power_cfg {
    pub const SMUTE: u16 = 15;
    pub const DMUTE: u16 = 14;
    pub const MONO: u16 = 13;
    /// Seek mode (band-edge wrap behavior).
    pub const SKMODE: u16 = 10;
    /// Seek direction: set = up, clear = down.
    pub const SEEKUP: u16 = 9;
    /// Seek command bit; cleared explicitly when the operation ends.
    pub const SEEK: u16 = 8;
    pub const DISABLE: u16 = 6;
    pub const ENABLE: u16 = 0;
}

/// Bit positions and masks within the CHANNEL register.
pub mod channel {
    /// Tune command bit; cleared explicitly when the operation ends.
    pub const TUNE: u16 = 15;
    /// 10-bit channel field.
    pub const CHANNEL_MASK: u16 = 0x03FF;
}

/// Bit positions within the SYS_CONFIG1 register.
pub mod sys_config1 {
    /// RDS interrupt enable.
    pub const RDSIEN: u16 = 15;
    /// Seek/tune-complete interrupt enable.
    pub const STCIEN: u16 = 14;
    /// RDS decoder enable. Must be cleared before powering the chip down.
    pub const RDS: u16 = 12;
    /// De-emphasis selection.
    pub const DE: u16 = 11;
    /// GPIO2 function field value routing STC/RDS interrupts to the pin.
    pub const GPIO2_INTERRUPT: u16 = 0x0004;
}

/// Bit positions and masks within the SYS_CONFIG2 register.
pub mod sys_config2 {
    /// Channel spacing field (bits 5:4).
    pub const SPACE_SHIFT: u16 = 4;
    pub const SPACE_MASK: u16 = 0x0030;
    /// Volume field (bits 3:0).
    pub const VOLUME_MASK: u16 = 0x000F;
}

/// Bit positions within the SYS_CONFIG3 register.
pub mod sys_config3 {
    /// Minimum seek SNR threshold bit set when starting a seek.
    pub const SKSNR_MIN: u16 = 4;
    /// Minimum FM impulse threshold bit set when starting a seek.
    pub const SKCNT_MIN: u16 = 1;
}

/// Bit positions within the STATUS_RSSI register.
pub mod status {
    /// RDS group ready to be read from the RDS_A-RDS_D registers.
    pub const RDSR: u16 = 15;
    /// Seek/tune busy bit: set while a command runs, clear at completion.
    pub const STC: u16 = 14;
    /// Seek failed / band limit reached.
    pub const SF_BL: u16 = 13;
    pub const AFCRL: u16 = 12;
    pub const STEREO: u16 = 8;
    pub const RSSI_MASK: u16 = 0x00FF;
}

/// Length of one full bus read (all 16 registers).
pub const READ_BUFFER_LEN: usize = 32;

/// Length of one bus write (POWER_CFG through TEST2 inclusive).
pub const WRITE_BUFFER_LEN: usize = 14;

/// The chip's internal channel offset: frequency in tenths of a MHz
/// minus this value gives the channel number.
pub const FREQUENCY_OFFSET: u16 = 875;

/// Static chip identity decoded from the DEVICE_ID and CHIP_ID registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Part number (4 = Si4700 family).
    pub part_number: u16,
    /// Manufacturer ID.
    pub manufacturer_id: u16,
    /// Chip revision.
    pub revision: u16,
    /// Device field (distinguishes Si4700/01/02/03).
    pub device: u16,
    /// Firmware version.
    pub firmware: u16,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pn={} mfg=0x{:03X} rev={} dev={} fw={}",
            self.part_number, self.manufacturer_id, self.revision, self.device, self.firmware
        )
    }
}

/// In-memory mirror of the chip's sixteen 16-bit registers.
///
/// Index it with the constants in [`reg`]. A bank is always a complete
/// snapshot; partial updates are never committed to the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterBank([u16; 16]);

impl RegisterBank {
    /// Create a bank with all registers zeroed.
    pub fn new() -> Self {
        RegisterBank([0; 16])
    }

    /// Unpack a 32-byte bus read into a bank.
    ///
    /// The physical read begins at STATUS_RSSI (0x0A) and wraps around to
    /// address zero, so the transaction order differs from logical register
    /// order: byte pairs are big-endian and land at 0x0A..=0x0F then
    /// 0x00..=0x09.
    pub fn from_read_buffer(buf: &[u8; READ_BUFFER_LEN]) -> Self {
        let mut bank = RegisterBank::new();
        let mut idx = 0;
        let mut register = reg::STATUS_RSSI;
        loop {
            bank.0[register] = u16::from_be_bytes([buf[idx], buf[idx + 1]]);
            idx += 2;
            if register == reg::BOOT_CONFIG {
                break;
            }
            register = (register + 1) % 16;
        }
        bank
    }

    /// Pack the bank into the 32-byte layout produced by a bus read.
    ///
    /// Exact inverse of [`from_read_buffer`](Self::from_read_buffer); used
    /// by bus simulations.
    pub fn to_read_buffer(&self) -> [u8; READ_BUFFER_LEN] {
        let mut buf = [0u8; READ_BUFFER_LEN];
        let mut idx = 0;
        let mut register = reg::STATUS_RSSI;
        loop {
            let [hi, lo] = self.0[register].to_be_bytes();
            buf[idx] = hi;
            buf[idx + 1] = lo;
            idx += 2;
            if register == reg::BOOT_CONFIG {
                break;
            }
            register = (register + 1) % 16;
        }
        buf
    }

    /// Pack the control span POWER_CFG..=TEST2 for a bus write, in
    /// ascending address order as big-endian pairs.
    pub fn to_write_buffer(&self) -> [u8; WRITE_BUFFER_LEN] {
        let mut buf = [0u8; WRITE_BUFFER_LEN];
        for (i, register) in (reg::POWER_CFG..=reg::TEST2).enumerate() {
            let [hi, lo] = self.0[register].to_be_bytes();
            buf[i * 2] = hi;
            buf[i * 2 + 1] = lo;
        }
        buf
    }

    /// Unpack a write buffer into a bank (registers outside the control
    /// span are zero). Used by bus simulations and round-trip tests.
    pub fn from_write_buffer(buf: &[u8; WRITE_BUFFER_LEN]) -> Self {
        let mut bank = RegisterBank::new();
        bank.apply_write_buffer(buf);
        bank
    }

    /// Apply a write buffer to this bank, overwriting POWER_CFG..=TEST2
    /// and leaving every other register untouched.
    pub fn apply_write_buffer(&mut self, buf: &[u8; WRITE_BUFFER_LEN]) {
        for (i, register) in (reg::POWER_CFG..=reg::TEST2).enumerate() {
            self.0[register] = u16::from_be_bytes([buf[i * 2], buf[i * 2 + 1]]);
        }
    }

    /// Current frequency in tenths of a MHz, from the channel read-back.
    pub fn frequency_tenths(&self) -> u16 {
        (self.0[reg::READ_CHAN] & channel::CHANNEL_MASK) + FREQUENCY_OFFSET
    }

    /// Received signal strength indicator.
    pub fn rssi(&self) -> u16 {
        self.0[reg::STATUS_RSSI] & status::RSSI_MASK
    }

    /// Whether a stereo pilot is being received.
    pub fn is_stereo(&self) -> bool {
        self.0[reg::STATUS_RSSI] & (1 << status::STEREO) != 0
    }

    /// Whether an RDS group is ready in the RDS_A-RDS_D registers.
    pub fn is_rds_ready(&self) -> bool {
        self.0[reg::STATUS_RSSI] & (1 << status::RDSR) != 0
    }

    /// Whether a seek/tune command is still running.
    ///
    /// Completion is signaled by the *absence* of this bit after an
    /// interrupt edge; an edge with the bit still set belongs to an
    /// unrelated RDS-ready event.
    pub fn is_seek_tune_busy(&self) -> bool {
        self.0[reg::STATUS_RSSI] & (1 << status::STC) != 0
    }

    /// Whether the last seek failed or hit the band limit.
    pub fn seek_failed(&self) -> bool {
        self.0[reg::STATUS_RSSI] & (1 << status::SF_BL) != 0
    }

    /// The four RDS data blocks (A, B, C, D).
    pub fn rds_blocks(&self) -> (u16, u16, u16, u16) {
        (
            self.0[reg::RDS_A],
            self.0[reg::RDS_B],
            self.0[reg::RDS_C],
            self.0[reg::RDS_D],
        )
    }

    /// Decode the static chip identity fields.
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            part_number: self.0[reg::DEVICE_ID] >> 12,
            manufacturer_id: self.0[reg::DEVICE_ID] & 0x0FFF,
            revision: self.0[reg::CHIP_ID] >> 10,
            device: (self.0[reg::CHIP_ID] >> 6) & 0x0F,
            firmware: self.0[reg::CHIP_ID] & 0x3F,
        }
    }
}

impl Index<usize> for RegisterBank {
    type Output = u16;

    fn index(&self, register: usize) -> &u16 {
        &self.0[register]
    }
}

impl IndexMut<usize> for RegisterBank {
    fn index_mut(&mut self, register: usize) -> &mut u16 {
        &mut self.0[register]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bank() -> RegisterBank {
        let mut bank = RegisterBank::new();
        for i in 0..16 {
            bank[i] = 0x1100u16.wrapping_mul(i as u16 + 1) ^ 0x00A5;
        }
        bank
    }

    #[test]
    fn read_buffer_round_trip() {
        let bank = sample_bank();
        let unpacked = RegisterBank::from_read_buffer(&bank.to_read_buffer());
        assert_eq!(unpacked, bank);
    }

    #[test]
    fn write_buffer_round_trip() {
        let bank = sample_bank();
        let unpacked = RegisterBank::from_write_buffer(&bank.to_write_buffer());
        for register in reg::POWER_CFG..=reg::TEST2 {
            assert_eq!(unpacked[register], bank[register], "register 0x{register:02X}");
        }
    }

    #[test]
    fn read_buffer_starts_at_status_register() {
        let mut bank = RegisterBank::new();
        bank[reg::STATUS_RSSI] = 0xABCD;
        bank[reg::DEVICE_ID] = 0x1234;
        let buf = bank.to_read_buffer();
        // STATUS_RSSI is the first pair on the wire, big-endian.
        assert_eq!(&buf[0..2], &[0xAB, 0xCD]);
        // DEVICE_ID follows the wraparound: 0x0A..0x0F is 6 registers
        // (12 bytes), so 0x00 lands at offset 12.
        assert_eq!(&buf[12..14], &[0x12, 0x34]);
    }

    #[test]
    fn write_buffer_starts_at_power_cfg() {
        let mut bank = RegisterBank::new();
        bank[reg::POWER_CFG] = 0x4001;
        bank[reg::TEST2] = 0xBEEF;
        let buf = bank.to_write_buffer();
        assert_eq!(&buf[0..2], &[0x40, 0x01]);
        assert_eq!(&buf[12..14], &[0xBE, 0xEF]);
    }

    #[test]
    fn apply_write_buffer_leaves_status_registers_alone() {
        let mut bank = RegisterBank::new();
        bank[reg::STATUS_RSSI] = 0x5555;
        let mut update = RegisterBank::new();
        update[reg::POWER_CFG] = 0x4001;
        bank.apply_write_buffer(&update.to_write_buffer());
        assert_eq!(bank[reg::POWER_CFG], 0x4001);
        assert_eq!(bank[reg::STATUS_RSSI], 0x5555);
    }

    #[test]
    fn frequency_from_read_channel() {
        let mut bank = RegisterBank::new();
        // Channel 138 => 875 + 138 = 1013 (101.3 MHz).
        bank[reg::READ_CHAN] = 138;
        assert_eq!(bank.frequency_tenths(), 1013);
    }

    #[test]
    fn status_accessors() {
        let mut bank = RegisterBank::new();
        bank[reg::STATUS_RSSI] =
            (1 << status::RDSR) | (1 << status::STC) | (1 << status::STEREO) | 0x2A;
        assert!(bank.is_rds_ready());
        assert!(bank.is_seek_tune_busy());
        assert!(bank.is_stereo());
        assert!(!bank.seek_failed());
        assert_eq!(bank.rssi(), 0x2A);
    }

    #[test]
    fn device_info_decode() {
        let mut bank = RegisterBank::new();
        // Part number 1, manufacturer 0x242 (Silicon Labs).
        bank[reg::DEVICE_ID] = (1 << 12) | 0x242;
        // Revision 4, device 9 (Si4703), firmware 19.
        bank[reg::CHIP_ID] = (4 << 10) | (9 << 6) | 19;
        let info = bank.device_info();
        assert_eq!(info.part_number, 1);
        assert_eq!(info.manufacturer_id, 0x242);
        assert_eq!(info.revision, 4);
        assert_eq!(info.device, 9);
        assert_eq!(info.firmware, 19);
        assert_eq!(info.to_string(), "pn=1 mfg=0x242 rev=4 dev=9 fw=19");
    }

    #[test]
    fn rds_blocks_in_order() {
        let mut bank = RegisterBank::new();
        bank[reg::RDS_A] = 0xAAAA;
        bank[reg::RDS_B] = 0xBBBB;
        bank[reg::RDS_C] = 0xCCCC;
        bank[reg::RDS_D] = 0xDDDD;
        assert_eq!(bank.rds_blocks(), (0xAAAA, 0xBBBB, 0xCCCC, 0xDDDD));
    }
}
