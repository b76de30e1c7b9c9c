use avr_device::attiny84::{PORTA, PORTB};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::OutputPin;

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

#[derive(Debug)]
pub struct Pin<PORT, const PIN: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

impl<PORT, const P: u8> Pin<PORT, P, Input> {
    /// Every pin is an input after reset.
    ///
    /// # Safety
    /// Only one handle per physical pin may exist.
    pub const unsafe fn steal() -> Self {
        Pin {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

macro_rules! impl_port {
    ($PORT:ident, $port:ident, $ddr:ident) => {
        impl<const P: u8, MODE: PinMode> Pin<$PORT, P, MODE> {
            pub fn into_output(self) -> Pin<$PORT, P, Output> {
                // Set DDRx bit
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }

            pub fn into_input(self) -> Pin<$PORT, P, Input> {
                // Clear DDRx bit and disable pull-up
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }
        }

        impl<const P: u8> Pin<$PORT, P, Output> {
            #[inline]
            pub fn set_high(&mut self) {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
            }

            #[inline]
            pub fn set_low(&mut self) {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                }
            }
        }

        impl<const P: u8> OutputPin for Pin<$PORT, P, Output> {
            type Error = Infallible;

            fn set_high(&mut self) -> Result<(), Infallible> {
                Pin::set_high(self);
                Ok(())
            }

            fn set_low(&mut self) -> Result<(), Infallible> {
                Pin::set_low(self);
                Ok(())
            }
        }
    };
}

impl_port!(PORTA, porta, ddra);
impl_port!(PORTB, portb, ddrb);

// Radio board pin definitions
#[allow(non_camel_case_types)]
pub mod board {
    use super::*;

    // Status LED
    pub type LED = Pin<PORTA, 7, Output>;

    // nRF24 LDO enable
    pub type RADIO_POWER = Pin<PORTB, 1, Output>;

    // nRF24 control lines (USI carries SCK/DO/DI on PA4..PA6)
    pub type RADIO_CE = Pin<PORTA, 2, Output>;
    pub type RADIO_CSN = Pin<PORTA, 3, Output>;

    // Debug serial output
    pub type LOG_TX = Pin<PORTB, 0, Output>;

    /// Every pin the bootloader drives
    pub struct Pins {
        pub led: LED,
        pub radio_power: RADIO_POWER,
        pub radio_ce: RADIO_CE,
        pub radio_csn: RADIO_CSN,
        pub log_tx: LOG_TX,
    }

    impl Pins {
        /// # Safety
        /// Call once, before anything else touches these pins.
        pub unsafe fn steal() -> Self {
            Self {
                led: Pin::<PORTA, 7, Input>::steal().into_output(),
                radio_power: Pin::<PORTB, 1, Input>::steal().into_output(),
                radio_ce: Pin::<PORTA, 2, Input>::steal().into_output(),
                radio_csn: Pin::<PORTA, 3, Input>::steal().into_output(),
                log_tx: Pin::<PORTB, 0, Input>::steal().into_output(),
            }
        }
    }
}
