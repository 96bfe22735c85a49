//! Driver for the Texas Instruments DAC8563 dual channel 16bit SPI DAC
//!
//! The same serial protocol is shared by the DAC7562/7563, DAC8162/8163 and
//! DAC8562 parts. Every command is a single 24 bit frame, MSB first:
//!
//! | Byte | Bits  | Content                        |
//! |------|-------|--------------------------------|
//! | 0    | 7..6  | don't care (zero)              |
//! | 0    | 5..3  | command ([`CommandKind`])      |
//! | 0    | 2..0  | address ([`Address`])          |
//! | 1    | 7..0  | payload bits 15..8             |
//! | 2    | 7..0  | payload bits 7..0              |
//!
//! The driver keeps a shadow of the chip configuration in a [`DeviceState`].
//! A few settings interact on the chip and the shadow follows them:
//! - switching the reference source resets the gain of both channels
//!   (internal reference gives 2x, external gives 1x),
//! - powering down both channels while the internal reference is in use turns
//!   the reference off, so the driver re-enables it right away.
//!
//! The bus is expected to run in SPI mode 2 (CPOL = 1, CPHA = 0) with SYNC as
//! the active low chip select of the [`SpiDevice`](embedded_hal::spi::SpiDevice).
//! Keep the clock at or below 50MHz, and around 30MHz when channels use the
//! synchronous latch mode.
//!
//! ```
//! # use embedded_hal_mock::eh1::{pin, spi};
//! use dac8563::{Dac8563, ReferenceMode, Target};
//! # let spi = spi::Mock::new(&[
//! #     spi::Transaction::transaction_start(),
//! #     spi::Transaction::write_vec(vec![0x2Fu8, 0x00, 0x01]),
//! #     spi::Transaction::transaction_end(),
//! #     spi::Transaction::transaction_start(),
//! #     spi::Transaction::write_vec(vec![0x3F, 0x00, 0x01]),
//! #     spi::Transaction::transaction_end(),
//! #     spi::Transaction::transaction_start(),
//! #     spi::Transaction::write_vec(vec![0x18, 0x80, 0x00]),
//! #     spi::Transaction::transaction_end(),
//! # ]);
//! # let clr = pin::Mock::new(&[pin::Transaction::set(pin::State::High)]);
//! # let ldac = pin::Mock::new(&[pin::Transaction::set(pin::State::High)]);
//! let mut dac = Dac8563::initialize(spi, clr, ldac, ReferenceMode::Internal).unwrap();
//! dac.set_value(Target::DacA, 0x8000).unwrap();
//! # let (mut spi, mut clr, mut ldac) = dac.release();
//! # spi.done(); clr.done(); ldac.done();
//! ```

#![deny(unsafe_code, missing_docs)]
#![no_std]

#[macro_use]
mod fmt;

mod command;
mod driver;
mod state;

pub use command::{decode, encode, Address, CommandKind, FRAME_LEN};
pub use driver::Dac8563;
pub use state::{ChannelState, DeviceState};

/// Errors for this crate
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<S> {
    /// SPI communication error
    Spi(S),
    /// Failed to drive the ~CLR or ~LDAC line
    Pin(embedded_hal::digital::ErrorKind),
}

impl<S> core::fmt::Display for Error<S>
where
    S: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Spi(e) => write!(f, "SPI transfer failed: {:?}", e),
            Error::Pin(e) => write!(f, "output pin failed: {:?}", e),
        }
    }
}

/// Dac Channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// DAC Channel A
    DacA,
    /// DAC Channel B
    DacB,
}

/// One or both DAC channels, as addressed by value and power commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// DAC Channel A
    DacA,
    /// DAC Channel B
    DacB,
    /// Both DAC Channels
    AllDacs,
}

impl Target {
    /// Address used by the value write commands
    pub fn address(self) -> Address {
        match self {
            Target::DacA => Address::DacA,
            Target::DacB => Address::DacB,
            Target::AllDacs => Address::All,
        }
    }

    /// Channel select bits of the power control payload
    pub(crate) fn power_bits(self) -> u8 {
        match self {
            Target::DacA => 0b01,
            Target::DacB => 0b10,
            Target::AllDacs => 0b11,
        }
    }

    /// Whether `chan` is addressed by this target
    pub fn includes(self, chan: Channel) -> bool {
        matches!(
            (self, chan),
            (Target::AllDacs, _) | (Target::DacA, Channel::DacA) | (Target::DacB, Channel::DacB)
        )
    }
}

impl From<Channel> for Target {
    fn from(chan: Channel) -> Self {
        match chan {
            Channel::DacA => Target::DacA,
            Channel::DacB => Target::DacB,
        }
    }
}

/// Channel power state. Powered down outputs are pulled to ground through
/// the given impedance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerMode {
    /// Normal operation (default)
    #[default]
    On,
    /// Powered down, output to ground through 1kOhm
    PowerDown1k,
    /// Powered down, output to ground through 100kOhm
    PowerDown100k,
    /// Powered down, output in high impedance
    PowerDownHiZ,
}

impl PowerMode {
    /// Power mode bits (PD1, PD0) of the power control payload
    pub(crate) fn bits(self) -> u8 {
        match self {
            PowerMode::On => 0b00,
            PowerMode::PowerDown1k => 0b01,
            PowerMode::PowerDown100k => 0b10,
            PowerMode::PowerDownHiZ => 0b11,
        }
    }
}

/// Output buffer gain of a single channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// 0V to Vref, power-on default with the external reference
    #[default]
    X1,
    /// 0V to 2 * Vref, applied when the internal reference is enabled
    X2,
}

/// When a written value reaches the output of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LatchMode {
    /// Written values reach the output right away (default)
    #[default]
    Async,
    /// Written values wait for a ~LDAC pulse or a software update
    Sync,
}

/// Voltage reference source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ReferenceMode {
    /// External reference on the VREFIN pin (default)
    #[default]
    External = 0,
    /// On-chip 2.5V reference
    Internal = 1,
}

impl ReferenceMode {
    /// Gain both channels assume when this reference gets selected
    pub fn default_gain(self) -> Gain {
        match self {
            ReferenceMode::External => Gain::X1,
            ReferenceMode::Internal => Gain::X2,
        }
    }
}

/// Scope of a software reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ResetMode {
    /// Clear the input and DAC registers, keep the configuration
    DacOnly = 0,
    /// Return every register to its power-on default
    All = 1,
}
