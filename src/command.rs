//! Command frame encoding
use bitfield_struct::bitfield;

/// Length of a command frame in bytes
pub const FRAME_LEN: usize = 3;

/// Command bits C2..C0 of the command byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandKind {
    /// Write to input register
    Write = 0b000,
    /// Software update, loads the DAC registers from the input registers
    SoftwareUpdate = 0b001,
    /// Write to input register and update all DAC registers
    WriteUpdateAll = 0b010,
    /// Write to input register and update the addressed DAC register
    WriteUpdateTarget = 0b011,
    /// Power up or down DAC channels
    PowerControl = 0b100,
    /// Software reset
    Reset = 0b101,
    /// ~LDAC register setup
    LatchControl = 0b110,
    /// Internal reference enable / disable
    ReferenceControl = 0b111,
}

impl CommandKind {
    /// Command as it appears in the command byte, already shifted into
    /// position (0x00, 0x08 .. 0x38)
    pub fn code(self) -> u8 {
        (self as u8) << 3
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Self::Write,
            0b001 => Self::SoftwareUpdate,
            0b010 => Self::WriteUpdateAll,
            0b011 => Self::WriteUpdateTarget,
            0b100 => Self::PowerControl,
            0b101 => Self::Reset,
            0b110 => Self::LatchControl,
            _ => Self::ReferenceControl,
        }
    }
}

/// Address bits A2..A0 of the command byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Address {
    /// DAC Channel A
    DacA = 0b000,
    /// DAC Channel B
    DacB = 0b001,
    /// Gain register, only used with [`CommandKind::Write`]
    Gain = 0b010,
    /// All DAC Channels
    All = 0b111,
}

impl Address {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b000 => Some(Self::DacA),
            0b001 => Some(Self::DacB),
            0b010 => Some(Self::Gain),
            0b111 => Some(Self::All),
            _ => None,
        }
    }
}

#[bitfield(u8)]
struct CommandByte {
    #[bits(3)]
    addr: u8,

    #[bits(3)]
    cmd: u8,

    #[bits(2)]
    __: u8,
}

/// Encode a command frame. Byte 0 holds the command and address, bytes 1 and
/// 2 the payload MSB first.
///
/// Not every command / address pair means something to the chip, the
/// encoder does not check.
/// ```
/// use dac8563::{encode, Address, CommandKind};
///
/// assert_eq!(encode(CommandKind::WriteUpdateTarget, Address::DacB, 0xF00F), [0x19, 0xF0, 0x0F]);
/// ```
pub fn encode(cmd: CommandKind, addr: Address, payload: u16) -> [u8; FRAME_LEN] {
    let [msb, lsb] = payload.to_be_bytes();
    [
        CommandByte::new()
            .with_cmd(cmd as u8)
            .with_addr(addr as u8)
            .into(),
        msb,
        lsb,
    ]
}

/// Split a frame back into its command, address and payload.
///
/// Returns `None` when the address bits do not name an [`Address`].
pub fn decode(frame: &[u8; FRAME_LEN]) -> Option<(CommandKind, Address, u16)> {
    let byte = CommandByte::from(frame[0]);
    let addr = Address::from_bits(byte.addr())?;
    Some((
        CommandKind::from_bits(byte.cmd()),
        addr,
        u16::from_be_bytes([frame[1], frame[2]]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [CommandKind; 8] = [
        CommandKind::Write,
        CommandKind::SoftwareUpdate,
        CommandKind::WriteUpdateAll,
        CommandKind::WriteUpdateTarget,
        CommandKind::PowerControl,
        CommandKind::Reset,
        CommandKind::LatchControl,
        CommandKind::ReferenceControl,
    ];

    #[test]
    fn command_codes_are_pre_shifted() {
        let codes = KINDS.map(CommandKind::code);
        assert_eq!(codes, [0x00, 0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38]);
    }

    #[test]
    fn command_byte_is_kind_or_address() {
        for kind in KINDS {
            for addr in [Address::DacA, Address::DacB, Address::Gain, Address::All] {
                let frame = encode(kind, addr, 0);
                assert_eq!(frame[0], kind.code() | addr as u8);
            }
        }
    }

    #[test]
    fn payload_is_msb_first() {
        let frame = encode(CommandKind::Write, Address::DacA, 0xA55A);
        assert_eq!(frame, [0x00, 0xA5, 0x5A]);
        assert_eq!(((frame[1] as u16) << 8) | frame[2] as u16, 0xA55A);
    }

    #[test]
    fn known_frames() {
        // Reset everything
        assert_eq!(encode(CommandKind::Reset, Address::All, 1), [0x2F, 0x00, 0x01]);
        // Enable internal reference
        assert_eq!(
            encode(CommandKind::ReferenceControl, Address::All, 1),
            [0x3F, 0x00, 0x01]
        );
        // Gain register, both channels at 1x
        assert_eq!(encode(CommandKind::Write, Address::Gain, 0b11), [0x02, 0x00, 0x03]);
    }

    #[test]
    fn encode_is_deterministic() {
        let a = encode(CommandKind::PowerControl, Address::All, 0x0033);
        let b = encode(CommandKind::PowerControl, Address::All, 0x0033);
        assert_eq!(a, b);
    }

    #[test]
    fn decode_recovers_fields() {
        let frame = encode(CommandKind::LatchControl, Address::All, 0x0002);
        assert_eq!(
            decode(&frame),
            Some((CommandKind::LatchControl, Address::All, 0x0002))
        );
        // 0b100 is not a valid address
        assert_eq!(decode(&[0x04, 0x00, 0x00]), None);
    }
}
