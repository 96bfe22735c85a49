//! DAC8563 device with shadow state
use embedded_hal::digital::{Error as _, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::command::{encode, Address, CommandKind};
use crate::state::{GainPayload, LatchPayload, PowerPayload};
use crate::{
    Channel, ChannelState, DeviceState, Error, Gain, LatchMode, PowerMode, ReferenceMode,
    ResetMode, Target,
};

/// DAC8563 on an SPI device, with SYNC acting as its chip select
///
/// `CLR` and `LDAC` are the ~CLR and ~LDAC lines of the chip. The driver only
/// believes in a configuration once the frame carrying it has been sent, so
/// after a failed call the shadow still describes the previous state.
pub struct Dac8563<SPI, CLR, LDAC> {
    spi: SPI,
    clr: CLR,
    ldac: LDAC,
    state: DeviceState,
}

impl<SPI, CLR, LDAC, S> Dac8563<SPI, CLR, LDAC>
where
    SPI: SpiDevice<Error = S>,
    CLR: OutputPin,
    LDAC: OutputPin,
{
    /// Create a new driver without talking to the chip.
    ///
    /// The shadow state holds the power-on defaults until [`init`](Self::init)
    /// establishes them on the chip.
    pub fn new(spi: SPI, clr: CLR, ldac: LDAC) -> Self {
        Self {
            spi,
            clr,
            ldac,
            state: DeviceState::power_on_default(),
        }
    }

    /// Create a new driver, fully reset the chip and select the reference
    pub fn initialize(
        spi: SPI,
        clr: CLR,
        ldac: LDAC,
        reference: ReferenceMode,
    ) -> Result<Self, Error<S>> {
        let mut dac = Self::new(spi, clr, ldac);
        dac.init(reference)?;
        Ok(dac)
    }

    /// Bring the chip to a known state: both channels powered up at zero,
    /// full reset, then switch to `reference`.
    pub fn init(&mut self, reference: ReferenceMode) -> Result<(), Error<S>> {
        for chan in [&mut self.state.channel_a, &mut self.state.channel_b] {
            chan.power_mode = PowerMode::On;
            chan.value = 0;
        }
        self.reset(ResetMode::All)?;
        self.switch_reference(reference)
    }

    /// Release the SPI device and both pins
    pub fn release(self) -> (SPI, CLR, LDAC) {
        (self.spi, self.clr, self.ldac)
    }

    /// Current shadow of the chip configuration
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Selected reference source
    pub fn reference_mode(&self) -> ReferenceMode {
        self.state.reference_mode
    }

    /// Shadow of a single channel
    pub fn channel(&self, chan: Channel) -> &ChannelState {
        self.state.channel(chan)
    }

    /// Software reset.
    ///
    /// Both input registers return to zero. A [`ResetMode::All`] reset also
    /// returns the reference, gain and latch settings to their power-on
    /// defaults, so an internal reference has to be switched on again.
    pub fn reset(&mut self, mode: ResetMode) -> Result<(), Error<S>> {
        self.clr.set_high().map_err(|e| Error::Pin(e.kind()))?;
        self.ldac.set_high().map_err(|e| Error::Pin(e.kind()))?;
        self.write(CommandKind::Reset, Address::All, mode as u16)?;
        self.state.apply_reset(mode == ResetMode::All);
        debug!("dac8563: reset {}", mode);
        Ok(())
    }

    /// Switch between the internal and an external reference.
    ///
    /// The chip changes the gain of both channels along with the reference
    /// (2x for internal, 1x for external), overriding earlier gain settings.
    /// Call [`switch_gain`](Self::switch_gain) afterwards for anything else.
    pub fn switch_reference(&mut self, mode: ReferenceMode) -> Result<(), Error<S>> {
        self.write(CommandKind::ReferenceControl, Address::All, mode as u16)?;
        self.state.apply_reference(mode);
        debug!("dac8563: reference {}", mode);
        Ok(())
    }

    /// Power up or down one or both channels.
    ///
    /// The internal reference shuts off once both channels are powered down
    /// and does not come back on its own. With the internal reference
    /// selected, the reference enable is sent again right after the power
    /// command when both channels end up down, and again when a channel
    /// wakes up from that state. What the chip does with the gain settings
    /// across those transitions is not documented.
    pub fn switch_power(&mut self, target: Target, mode: PowerMode) -> Result<(), Error<S>> {
        let payload = PowerPayload::build(target, mode);
        self.write(CommandKind::PowerControl, Address::All, payload.into())?;

        let was_down = self.state.all_powered_down();
        let mut next = self.state;
        next.for_each(target, |chan| chan.power_mode = mode);
        let now_down = next.all_powered_down();
        let rearm = if next.reference_mode == ReferenceMode::Internal && (now_down || was_down) {
            warn!("dac8563: all channels were or are down, re-enabling internal reference");
            self.switch_reference(ReferenceMode::Internal)
        } else {
            Ok(())
        };
        // The power command went out, keep that even if the re-arm failed
        self.state.for_each(target, |chan| chan.power_mode = mode);
        debug!("dac8563: power {} {}", target, mode);
        rearm
    }

    /// Set the output gain of both channels
    pub fn switch_gain(&mut self, gain_a: Gain, gain_b: Gain) -> Result<(), Error<S>> {
        let payload = GainPayload::build(gain_a, gain_b);
        self.write(CommandKind::Write, Address::Gain, payload.into())?;
        self.state.channel_a.gain = gain_a;
        self.state.channel_b.gain = gain_b;
        debug!("dac8563: gain {} {}", gain_a, gain_b);
        Ok(())
    }

    /// Set the latch mode of both channels
    pub fn switch_latch_mode(
        &mut self,
        latch_a: LatchMode,
        latch_b: LatchMode,
    ) -> Result<(), Error<S>> {
        let payload = LatchPayload::build(latch_a, latch_b);
        self.write(CommandKind::LatchControl, Address::All, payload.into())?;
        self.state.channel_a.latch_mode = latch_a;
        self.state.channel_b.latch_mode = latch_b;
        debug!("dac8563: latch {} {}", latch_a, latch_b);
        Ok(())
    }

    /// Pulse ~LDAC low, committing the values held for synchronous channels.
    /// No frame is sent.
    pub fn pulse_latch(&mut self) -> Result<(), Error<S>> {
        self.ldac.set_low().map_err(|e| Error::Pin(e.kind()))?;
        self.ldac.set_high().map_err(|e| Error::Pin(e.kind()))
    }

    /// Write a value and update the output of the addressed channel(s)
    pub fn set_value(&mut self, target: Target, value: u16) -> Result<(), Error<S>> {
        self.write_value(CommandKind::WriteUpdateTarget, target, value)
    }

    /// Write a value to the input register of the addressed channel(s)
    /// without touching the outputs. Use [`load_all`](Self::load_all) or
    /// [`pulse_latch`](Self::pulse_latch) to commit it.
    pub fn stage_value(&mut self, target: Target, value: u16) -> Result<(), Error<S>> {
        self.write_value(CommandKind::Write, target, value)
    }

    /// Write a value to the addressed channel(s) and update both outputs
    pub fn set_value_and_load_all(&mut self, target: Target, value: u16) -> Result<(), Error<S>> {
        self.write_value(CommandKind::WriteUpdateAll, target, value)
    }

    /// Load both DAC registers from their input registers
    pub fn load_all(&mut self) -> Result<(), Error<S>> {
        self.write(CommandKind::SoftwareUpdate, Address::All, 0)
    }

    fn write_value(
        &mut self,
        cmd: CommandKind,
        target: Target,
        value: u16,
    ) -> Result<(), Error<S>> {
        self.write(cmd, target.address(), value)?;
        self.state.for_each(target, |chan| chan.value = value);
        Ok(())
    }

    /// Send a raw command frame. The shadow state is left alone, so only use
    /// this for commands the other methods do not cover.
    pub fn write(&mut self, cmd: CommandKind, addr: Address, payload: u16) -> Result<(), Error<S>> {
        let frame = encode(cmd, addr, payload);
        trace!("dac8563: frame {:02x}", frame);
        self.spi.write(&frame).map_err(Error::Spi)
    }
}
