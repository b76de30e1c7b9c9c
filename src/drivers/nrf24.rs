//! nRF24L01(+) 2.4 GHz transceiver, receive side only

use crate::config::PACKET_SIZE;
use crate::protocol::PacketLink;
use embedded_hal::blocking::spi::{Transfer, Write};
use embedded_hal::digital::v2::OutputPin;

// Commands
const R_REGISTER: u8 = 0x00;
const W_REGISTER: u8 = 0x20;
const REGISTER_MASK: u8 = 0x1F;
const R_RX_PAYLOAD: u8 = 0x61;
const FLUSH_RX: u8 = 0xE2;
const NOP: u8 = 0xFF;

// Registers
const CONFIG: u8 = 0x00;
const EN_AA: u8 = 0x01;
const EN_RXADDR: u8 = 0x02;
const SETUP_RETR: u8 = 0x04;
const RF_CH: u8 = 0x05;
const RF_SETUP: u8 = 0x06;
const STATUS: u8 = 0x07;
const RX_ADDR_P1: u8 = 0x0B;
const RX_PW_P0: u8 = 0x11;
const RX_PW_P1: u8 = 0x12;
const RX_PW_P2: u8 = 0x13;
const RX_PW_P3: u8 = 0x14;
const RX_PW_P4: u8 = 0x15;
const RX_PW_P5: u8 = 0x16;
const FIFO_STATUS: u8 = 0x17;
const DYNPD: u8 = 0x1C;

// CONFIG: EN_CRC, 1-byte CRC
const CONFIG_BASE: u8 = 1 << 3;
const PWR_UP: u8 = 1 << 1;
const PRIM_RX: u8 = 1 << 0;

// STATUS
const RX_DR: u8 = 1 << 6;
const TX_DS: u8 = 1 << 5;
const MAX_RT: u8 = 1 << 4;

// FIFO_STATUS
const RX_EMPTY: u8 = 1 << 0;

// Pipes 0 and 1
const PIPES_0_1: u8 = 0b11;
// 1 Mbps, 0 dBm
const RF_SETUP_1MBPS_0DBM: u8 = 0x03 << 1;
// 1250 us retransmit delay, 15 retries
const SETUP_RETR_DEFAULT: u8 = (0x04 << 4) | 0x0F;

pub const ADDRESS_WIDTH: usize = 5;

#[derive(Debug)]
pub enum Nrf24Error<SpiE, PinE> {
    Spi(SpiE),
    Pin(PinE),
}

pub struct Nrf24<SPI, CE, CSN> {
    spi: SPI,
    ce: CE,
    csn: CSN,
}

impl<SPI, CE, CSN, SpiE, PinE> Nrf24<SPI, CE, CSN>
where
    SPI: Transfer<u8, Error = SpiE> + Write<u8, Error = SpiE>,
    CE: OutputPin<Error = PinE>,
    CSN: OutputPin<Error = PinE>,
{
    /// Take the bus with the radio idle (CE low, CSN high)
    pub fn new(spi: SPI, mut ce: CE, mut csn: CSN) -> Result<Self, Nrf24Error<SpiE, PinE>> {
        ce.set_low().map_err(Nrf24Error::Pin)?;
        csn.set_high().map_err(Nrf24Error::Pin)?;
        Ok(Self { spi, ce, csn })
    }

    /// Channel and static payload width on pipe 1, then power up as PRX
    pub fn configure(&mut self, channel: u8, payload: u8) -> Result<(), Nrf24Error<SpiE, PinE>> {
        self.write_register(RF_CH, channel)?;

        self.write_register(RX_PW_P0, 0)?;
        self.write_register(RX_PW_P1, payload)?;
        for pipe in [RX_PW_P2, RX_PW_P3, RX_PW_P4, RX_PW_P5] {
            self.write_register(pipe, 0)?;
        }

        self.write_register(RF_SETUP, RF_SETUP_1MBPS_0DBM)?;
        self.write_register(CONFIG, CONFIG_BASE)?;
        self.write_register(EN_AA, PIPES_0_1)?;
        self.write_register(EN_RXADDR, PIPES_0_1)?;
        self.write_register(SETUP_RETR, SETUP_RETR_DEFAULT)?;
        self.write_register(DYNPD, 0)?;

        self.power_up_rx()
    }

    /// Listen on `address` (pipe 1)
    pub fn set_rx_address(&mut self, address: &[u8; ADDRESS_WIDTH]) -> Result<(), Nrf24Error<SpiE, PinE>> {
        self.ce.set_low().map_err(Nrf24Error::Pin)?;
        let mut frame = [0u8; ADDRESS_WIDTH + 1];
        frame[0] = W_REGISTER | (REGISTER_MASK & RX_ADDR_P1);
        frame[1..].copy_from_slice(address);
        self.command(&frame)?;
        self.ce.set_high().map_err(Nrf24Error::Pin)
    }

    pub fn power_up_rx(&mut self) -> Result<(), Nrf24Error<SpiE, PinE>> {
        self.command(&[FLUSH_RX])?;
        self.write_register(STATUS, RX_DR | TX_DS | MAX_RT)?;
        self.ce.set_low().map_err(Nrf24Error::Pin)?;
        self.write_register(CONFIG, CONFIG_BASE | PWR_UP | PRIM_RX)?;
        self.ce.set_high().map_err(Nrf24Error::Pin)
    }

    pub fn power_down(&mut self) -> Result<(), Nrf24Error<SpiE, PinE>> {
        self.ce.set_low().map_err(Nrf24Error::Pin)?;
        self.write_register(CONFIG, CONFIG_BASE)
    }

    pub fn status(&mut self) -> Result<u8, Nrf24Error<SpiE, PinE>> {
        let mut frame = [NOP];
        self.exchange(&mut frame)?;
        Ok(frame[0])
    }

    /// RX_DR is set or the RX FIFO still holds payloads
    pub fn data_ready(&mut self) -> Result<bool, Nrf24Error<SpiE, PinE>> {
        if self.status()? & RX_DR != 0 {
            return Ok(true);
        }
        Ok(self.read_register(FIFO_STATUS)? & RX_EMPTY == 0)
    }

    pub fn read_payload(&mut self, buffer: &mut [u8]) -> Result<(), Nrf24Error<SpiE, PinE>> {
        self.csn.set_low().map_err(Nrf24Error::Pin)?;
        let result = self.spi.transfer(&mut [R_RX_PAYLOAD]).and_then(|_| {
            buffer.fill(NOP);
            self.spi.transfer(buffer).map(|_| ())
        });
        self.csn.set_high().map_err(Nrf24Error::Pin)?;
        result.map_err(Nrf24Error::Spi)?;

        self.write_register(STATUS, RX_DR)
    }

    pub fn read_register(&mut self, register: u8) -> Result<u8, Nrf24Error<SpiE, PinE>> {
        let mut frame = [R_REGISTER | (REGISTER_MASK & register), NOP];
        self.exchange(&mut frame)?;
        Ok(frame[1])
    }

    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), Nrf24Error<SpiE, PinE>> {
        self.command(&[W_REGISTER | (REGISTER_MASK & register), value])
    }

    fn command(&mut self, frame: &[u8]) -> Result<(), Nrf24Error<SpiE, PinE>> {
        self.csn.set_low().map_err(Nrf24Error::Pin)?;
        let result = self.spi.write(frame);
        self.csn.set_high().map_err(Nrf24Error::Pin)?;
        result.map_err(Nrf24Error::Spi)
    }

    fn exchange(&mut self, frame: &mut [u8]) -> Result<(), Nrf24Error<SpiE, PinE>> {
        self.csn.set_low().map_err(Nrf24Error::Pin)?;
        let result = self.spi.transfer(frame).map(|_| ());
        self.csn.set_high().map_err(Nrf24Error::Pin)?;
        result.map_err(Nrf24Error::Spi)
    }
}

impl<SPI, CE, CSN, SpiE, PinE> PacketLink for Nrf24<SPI, CE, CSN>
where
    SPI: Transfer<u8, Error = SpiE> + Write<u8, Error = SpiE>,
    CE: OutputPin<Error = PinE>,
    CSN: OutputPin<Error = PinE>,
    SpiE: core::fmt::Debug,
    PinE: core::fmt::Debug,
{
    type Error = Nrf24Error<SpiE, PinE>;

    fn data_ready(&mut self) -> Result<bool, Self::Error> {
        Nrf24::data_ready(self)
    }

    fn read_packet(&mut self, packet: &mut [u8; PACKET_SIZE]) -> Result<(), Self::Error> {
        self.read_payload(packet)
    }
}
