#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
use panic_halt as _;

#[cfg(target_arch = "avr")]
mod firmware {
    use core::convert::Infallible;
    use rf24_bootloader::bootloader::{launch, BootTarget, Bootloader, Outcome, TimeoutGuard};
    use rf24_bootloader::clock::TICKS;
    use rf24_bootloader::config::{
        EXIT_BLINKS, EXIT_BLINK_TICKS, INACTIVITY_TICKS, PACKET_SIZE, RADIO_POWER_UP_TICKS,
        RF24_ADDRESS, RF24_CHANNEL, SESSION_LIMIT_TICKS, TIMEOUT_POLICY,
    };
    use rf24_bootloader::drivers::{Nrf24, Nrf24Error};
    use rf24_bootloader::hal::board::{Pins, RADIO_CE, RADIO_CSN};
    use rf24_bootloader::hal::{delay_ticks, Eeprom, SelfProgramming, Timer0Ticks, Usi};
    use rf24_bootloader::logger::{Event, Log, TimeoutCause};
    use rf24_bootloader::protocol::Receiver;

    #[cfg(not(feature = "debug"))]
    use rf24_bootloader::logger::Discard;
    #[cfg(feature = "debug")]
    use rf24_bootloader::hal::soft_tx::SoftTx;

    type Radio = Nrf24<Usi, RADIO_CE, RADIO_CSN>;

    fn radio_up(ce: RADIO_CE, csn: RADIO_CSN) -> Result<Radio, Nrf24Error<Infallible, Infallible>> {
        let mut radio = Nrf24::new(Usi::new(), ce, csn)?;
        radio.configure(RF24_CHANNEL, PACKET_SIZE as u8)?;
        radio.set_rx_address(&RF24_ADDRESS)?;
        Ok(radio)
    }

    #[avr_device::entry]
    fn main() -> ! {
        // Interrupts stay off: the vector table belongs to the application
        avr_device::interrupt::disable();

        let mut pins = unsafe { Pins::steal() };

        #[cfg(feature = "debug")]
        let mut log = Log::new(SoftTx::new(pins.log_tx));
        #[cfg(not(feature = "debug"))]
        let mut log = Log::new(Discard);

        let mut clock = Timer0Ticks::start(&TICKS);

        pins.radio_power.set_high();
        delay_ticks(&mut clock, RADIO_POWER_UP_TICKS);

        let mut boot = Bootloader::new(SelfProgramming::new(), Eeprom::new(), pins.led);

        let outcome = match radio_up(pins.radio_ce, pins.radio_csn) {
            Ok(radio) => {
                let mut receiver = Receiver::new(radio);
                let mut guard =
                    TimeoutGuard::new(&mut clock, INACTIVITY_TICKS, SESSION_LIMIT_TICKS);
                let outcome = boot.run(&mut receiver, &mut guard, &mut log);

                let mut radio = receiver.release();
                if radio.power_down().is_err() {
                    log.event(Event::TransportFault);
                }
                outcome
            }
            Err(_) => {
                log.event(Event::TransportFault);
                Outcome::TimedOut(TimeoutCause::Inactivity)
            }
        };

        for _ in 0..EXIT_BLINKS {
            boot.indicator_mut().set_high();
            delay_ticks(&mut clock, EXIT_BLINK_TICKS);
            boot.indicator_mut().set_low();
            delay_ticks(&mut clock, EXIT_BLINK_TICKS);
        }

        let target = boot.exit_target(&outcome, TIMEOUT_POLICY);
        match target {
            BootTarget::Jump(address) => log.event(Event::Jump { address }),
            BootTarget::Halt => log.event(Event::Halt),
        }

        #[cfg(feature = "debug")]
        log.into_inner().release();

        clock.stop();
        unsafe { launch(target) }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
