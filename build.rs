use std::env;

const MCU: &str = "attiny84";
// Must match config::BOOTLOADER_ADDRESS
const BOOTLOADER_ADDRESS: u16 = 0x0400;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds only carry the testable core
    let target = env::var("TARGET").unwrap_or_default();
    if !target.contains("avr") {
        return;
    }

    println!("cargo:rustc-link-arg=-mmcu={}", MCU);

    // The bootloader lives above the application; reset lands here through
    // the patched rjmp at address 0.
    println!(
        "cargo:rustc-link-arg=-Wl,--section-start=.text={:#06x}",
        BOOTLOADER_ADDRESS
    );

    if env::var("CARGO_FEATURE_DEBUG").is_ok() {
        println!("cargo:warning=Building {} bootloader with serial logging on PB0", MCU);
    }
}
