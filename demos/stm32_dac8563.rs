#![no_main]
#![no_std]

// Setting up entry vector/panic handler and logging
use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_probe as _;
// The DAC owns the bus, SYNC is driven as its chip select
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
// Hal imports
use hal::prelude::*;
use hal::spi::{Mode, Spi};
use stm32f4xx_hal as hal;

use dac8563::{Dac8563, Gain, LatchMode, PowerMode, ReferenceMode, Target};

#[entry]
fn main() -> ! {
    // Take peripherals and set up the clocks.
    let p = hal::pac::Peripherals::take().unwrap();
    let pc = cortex_m::Peripherals::take().unwrap();
    let rcc = p.RCC.constrain();
    let ccdr = rcc.cfgr.freeze();
    // Create a SysTick based delay
    let mut delay = cortex_m::delay::Delay::new(pc.SYST, ccdr.sysclk().raw());
    // Setup the DAC's SPI bus, the MISO line is not connected on the DAC8563
    let gpioc = p.GPIOC.split();
    let spi3_sclk = gpioc.pc10.into_alternate();
    let spi3_miso = gpioc.pc11.into_alternate();
    let spi3_mosi = gpioc.pc12.into_alternate();
    // ~SYNC, ~CLR and ~LDAC all idle high
    let gpioa = p.GPIOA.split();
    let dac_sync = gpioa
        .pa15
        .into_push_pull_output_in_state(hal::gpio::PinState::High);
    let dac_clr = gpioa
        .pa8
        .into_push_pull_output_in_state(hal::gpio::PinState::High);
    let dac_ldac = gpioa
        .pa9
        .into_push_pull_output_in_state(hal::gpio::PinState::High);
    // SPI Instance initialization in MODE 2
    let spi3 = Spi::new(
        p.SPI3,
        (spi3_sclk, spi3_miso, spi3_mosi),
        Mode {
            phase: hal::spi::Phase::CaptureOnFirstTransition,
            polarity: hal::spi::Polarity::IdleHigh,
        },
        10.MHz(),
        &ccdr,
    );
    let spi = ExclusiveDevice::new(spi3, dac_sync, NoDelay);

    // Full reset, then the internal reference which sets both gains to 2x
    let mut dac = Dac8563::initialize(spi, dac_clr, dac_ldac, ReferenceMode::Internal).unwrap();
    defmt::info!("dac8563 ready: {}", dac.state());

    // Channel B at unity gain, A keeps 2x
    dac.switch_gain(Gain::X2, Gain::X1).unwrap();
    // Channel B only follows ~LDAC pulses
    dac.switch_latch_mode(LatchMode::Async, LatchMode::Sync).unwrap();
    dac.switch_power(Target::AllDacs, PowerMode::On).unwrap();

    let mut val: u16 = 0x0000;
    loop {
        // A stepped voltage on A, B trailing behind by one step
        delay.delay_ms(250);
        dac.set_value(Target::DacA, val).unwrap();
        dac.pulse_latch().unwrap();
        dac.stage_value(Target::DacB, val).unwrap();
        val = val.wrapping_add(0x1000);
    }
}
