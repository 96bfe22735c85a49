//! Shadow of the chip configuration and the payload layouts derived from it
use bitfield_struct::bitfield;

use crate::{Channel, Gain, LatchMode, PowerMode, ReferenceMode, Target};

/// Last known settings of a single channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelState {
    /// Last value written to the channel. Depending on the latch mode it may
    /// not have reached the output yet.
    pub value: u16,
    /// Power state
    pub power_mode: PowerMode,
    /// Output buffer gain
    pub gain: Gain,
    /// Latch mode
    pub latch_mode: LatchMode,
}

/// Last known configuration of the whole device
///
/// The default value matches the chip after power-on or a full reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    /// Reference source
    pub reference_mode: ReferenceMode,
    /// DAC Channel A
    pub channel_a: ChannelState,
    /// DAC Channel B
    pub channel_b: ChannelState,
}

impl DeviceState {
    /// State of the chip after power-on or a full reset
    pub fn power_on_default() -> Self {
        Self::default()
    }

    /// Settings of one channel
    pub fn channel(&self, chan: Channel) -> &ChannelState {
        match chan {
            Channel::DacA => &self.channel_a,
            Channel::DacB => &self.channel_b,
        }
    }

    pub(crate) fn channel_mut(&mut self, chan: Channel) -> &mut ChannelState {
        match chan {
            Channel::DacA => &mut self.channel_a,
            Channel::DacB => &mut self.channel_b,
        }
    }

    /// Apply `f` to every channel addressed by `target`
    pub(crate) fn for_each(&mut self, target: Target, mut f: impl FnMut(&mut ChannelState)) {
        for chan in [Channel::DacA, Channel::DacB] {
            if target.includes(chan) {
                f(self.channel_mut(chan));
            }
        }
    }

    /// True when no channel is powered up
    pub fn all_powered_down(&self) -> bool {
        self.channel_a.power_mode != PowerMode::On && self.channel_b.power_mode != PowerMode::On
    }

    /// Select a reference source. The chip resets the gain of both channels
    /// to the default of the new source.
    pub(crate) fn apply_reference(&mut self, mode: ReferenceMode) {
        self.reference_mode = mode;
        self.channel_a.gain = mode.default_gain();
        self.channel_b.gain = mode.default_gain();
    }

    /// Clear both input registers. A full reset also powers both channels
    /// up and restores the configuration defaults.
    pub(crate) fn apply_reset(&mut self, full: bool) {
        self.channel_a.value = 0;
        self.channel_b.value = 0;
        if full {
            self.reference_mode = ReferenceMode::External;
            for chan in [&mut self.channel_a, &mut self.channel_b] {
                chan.gain = ReferenceMode::External.default_gain();
                chan.latch_mode = LatchMode::Async;
                chan.power_mode = PowerMode::On;
            }
        }
    }
}

/// Payload of the power control command
#[bitfield(u16)]
pub(crate) struct PowerPayload {
    /// Channel select, bit 0 for DAC A and bit 1 for DAC B
    #[bits(2)]
    pub target: u8,
    #[bits(2)]
    __: u8,
    /// PD1, PD0
    #[bits(2)]
    pub mode: u8,
    #[bits(10)]
    __: u16,
}

impl PowerPayload {
    pub fn build(target: Target, mode: PowerMode) -> Self {
        Self::new()
            .with_target(target.power_bits())
            .with_mode(mode.bits())
    }
}

/// Payload of a write to the gain register. A set bit selects a gain of 1.
#[bitfield(u16)]
pub(crate) struct GainPayload {
    pub a_unity: bool,
    pub b_unity: bool,
    #[bits(14)]
    __: u16,
}

impl GainPayload {
    pub fn build(gain_a: Gain, gain_b: Gain) -> Self {
        Self::new()
            .with_a_unity(gain_a == Gain::X1)
            .with_b_unity(gain_b == Gain::X1)
    }
}

/// Payload of the ~LDAC register setup. A set bit makes the channel
/// synchronous.
#[bitfield(u16)]
pub(crate) struct LatchPayload {
    pub a_sync: bool,
    pub b_sync: bool,
    #[bits(14)]
    __: u16,
}

impl LatchPayload {
    pub fn build(latch_a: LatchMode, latch_b: LatchMode) -> Self {
        Self::new()
            .with_a_sync(latch_a == LatchMode::Sync)
            .with_b_sync(latch_b == LatchMode::Sync)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_payload_layout() {
        let pl = PowerPayload::build(Target::DacA, PowerMode::On);
        assert_eq!(u16::from(pl), 0x0001);
        let pl = PowerPayload::build(Target::DacB, PowerMode::PowerDown1k);
        assert_eq!(u16::from(pl), 0x0012);
        let pl = PowerPayload::build(Target::AllDacs, PowerMode::PowerDown100k);
        assert_eq!(u16::from(pl), 0x0023);
        let pl = PowerPayload::build(Target::AllDacs, PowerMode::PowerDownHiZ);
        assert_eq!(u16::from(pl), 0x0033);
    }

    #[test]
    fn gain_bits_do_not_collide() {
        assert_eq!(u16::from(GainPayload::build(Gain::X2, Gain::X2)), 0b00);
        assert_eq!(u16::from(GainPayload::build(Gain::X1, Gain::X2)), 0b01);
        assert_eq!(u16::from(GainPayload::build(Gain::X2, Gain::X1)), 0b10);
        assert_eq!(u16::from(GainPayload::build(Gain::X1, Gain::X1)), 0b11);
    }

    #[test]
    fn latch_bits_do_not_collide() {
        assert_eq!(u16::from(LatchPayload::build(LatchMode::Async, LatchMode::Async)), 0b00);
        assert_eq!(u16::from(LatchPayload::build(LatchMode::Sync, LatchMode::Async)), 0b01);
        assert_eq!(u16::from(LatchPayload::build(LatchMode::Async, LatchMode::Sync)), 0b10);
        assert_eq!(u16::from(LatchPayload::build(LatchMode::Sync, LatchMode::Sync)), 0b11);
    }

    #[test]
    fn reference_overrides_gain() {
        let mut state = DeviceState::default();
        state.channel_a.gain = Gain::X2;
        state.apply_reference(ReferenceMode::External);
        assert_eq!(state.channel_a.gain, Gain::X1);
        assert_eq!(state.channel_b.gain, Gain::X1);

        state.channel_b.gain = Gain::X1;
        state.apply_reference(ReferenceMode::Internal);
        assert_eq!(state.channel_a.gain, Gain::X2);
        assert_eq!(state.channel_b.gain, Gain::X2);
    }

    #[test]
    fn partial_reset_keeps_configuration() {
        let mut state = DeviceState::default();
        state.apply_reference(ReferenceMode::Internal);
        state.channel_a.value = 0x1234;
        state.channel_b.latch_mode = LatchMode::Sync;
        state.apply_reset(false);
        assert_eq!(state.channel_a.value, 0);
        assert_eq!(state.reference_mode, ReferenceMode::Internal);
        assert_eq!(state.channel_b.latch_mode, LatchMode::Sync);

        state.channel_a.power_mode = PowerMode::PowerDown1k;
        state.apply_reset(false);
        assert_eq!(state.channel_a.power_mode, PowerMode::PowerDown1k);

        state.apply_reset(true);
        assert_eq!(state, DeviceState::power_on_default());
    }

    #[test]
    fn all_powered_down_needs_both_channels() {
        let mut state = DeviceState::default();
        assert!(!state.all_powered_down());
        state.channel_a.power_mode = PowerMode::PowerDownHiZ;
        assert!(!state.all_powered_down());
        state.channel_b.power_mode = PowerMode::PowerDown1k;
        assert!(state.all_powered_down());
    }
}
