//! Drive the tuner against a simulated chip and print events.
//!
//! Runs entirely against the mock bus and GPIO from
//! `tunerlib-test-harness`: powers the radio on, tunes to 101.3 MHz, then
//! replays a stream of RDS groups (station name, radio text, clock time)
//! and prints every event the driver publishes. Useful as an end-to-end
//! smoke test and as a template for wiring real platform bindings.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p tunerlib --example radio_sim
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tunerlib::registers::{reg, status};
use tunerlib::si470x::Si470xBuilder;
use tunerlib::TunerEvent;
use tunerlib_test_harness::{MockBus, MockInterruptPin, MockResetPin};

const PI: u16 = 0x54A8;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let bus = MockBus::new();
    let irq = Arc::new(MockInterruptPin::new());

    let tuner = Si470xBuilder::new()
        .reset_pin(Box::new(MockResetPin::new()))
        .interrupt_pin(irq.clone())
        .poll_interval(Duration::from_millis(250))
        .build(Box::new(bus.clone()))
        .await?;

    let mut events = tuner.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                TunerEvent::PowerChanged { on } => {
                    println!("power            -> {}", if on { "on" } else { "off" });
                }
                TunerEvent::FrequencyChanged { tenths } => {
                    println!("frequency        -> {}.{} MHz", tenths / 10, tenths % 10);
                }
                TunerEvent::VolumeChanged { level } => {
                    println!("volume           -> {level}");
                }
                TunerEvent::SignalStrength { rssi } => {
                    println!("rssi             -> {rssi}");
                }
                TunerEvent::StereoChanged { stereo } => {
                    println!("stereo           -> {stereo}");
                }
                TunerEvent::ProgramIdentifierChanged { pi } => {
                    println!("station id       -> 0x{pi:04X}");
                }
                TunerEvent::ProgramTypeChanged { pty } => {
                    println!(
                        "programme type   -> {}",
                        tunerlib::rds::program_type_name_eu(pty)
                    );
                }
                TunerEvent::ProgramNameChanged { name } => {
                    println!("station name     -> {name:?}");
                }
                TunerEvent::RadioTextChanged { text } => {
                    println!("radio text       -> {text:?}");
                }
                TunerEvent::ClockTime {
                    minutes_after_midnight,
                } => {
                    println!(
                        "broadcast clock  -> {:02}:{:02}",
                        minutes_after_midnight.rem_euclid(24 * 60) / 60,
                        minutes_after_midnight.rem_euclid(60)
                    );
                }
            }
        }
    });

    println!("powering on...");
    tuner.power_on().await?;
    println!("chip: {}", tuner.get_info().await?);

    // Simulate a station at 101.3: the chip settles there and raises the
    // completion interrupt.
    bus.set_register(reg::READ_CHAN, 1013 - 875);
    bus.set_register(reg::STATUS_RSSI, 0x2A | (1 << status::STEREO));
    let completion = {
        let irq = irq.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            irq.fire_falling();
        })
    };
    let found = tuner.tune(1013).await?;
    completion.await?;
    println!("tune complete, station found: {found}");

    tuner.set_volume(8).await?;

    // Replay RDS traffic: station name segments (twice, so the decoder
    // confirms them), one radio text message, and a clock group.
    let name = [('W', 'X'), ('Y', 'Z'), ('-', 'F'), ('M', ' ')];
    let mut groups: Vec<(u16, u16, u16)> = Vec::new();
    for _ in 0..2 {
        for (seg, (c1, c2)) in name.iter().enumerate() {
            groups.push((seg as u16, 0, ((*c1 as u16) << 8) | *c2 as u16));
        }
    }
    let text = "Now playing: static";
    let mut padded: Vec<u8> = text.bytes().collect();
    padded.push(b'\r');
    while padded.len() % 4 != 0 {
        padded.push(b' ');
    }
    for (seg, chunk) in padded.chunks(4).enumerate() {
        groups.push((
            (2 << 12) | seg as u16,
            ((chunk[0] as u16) << 8) | chunk[1] as u16,
            ((chunk[2] as u16) << 8) | chunk[3] as u16,
        ));
    }
    // 18:45, zero UTC offset.
    groups.push((4 << 12, 0, (18 << 12) | (45 << 6)));

    for (b, c, d) in groups {
        bus.set_register(
            reg::STATUS_RSSI,
            (1 << status::RDSR) | (1 << status::STEREO) | 0x2A,
        );
        bus.set_register(reg::RDS_A, PI);
        bus.set_register(reg::RDS_B, b);
        bus.set_register(reg::RDS_C, c);
        bus.set_register(reg::RDS_D, d);
        irq.fire_falling();
        sleep(Duration::from_millis(20)).await;
    }

    sleep(Duration::from_millis(200)).await;
    let state = tuner.state();
    println!(
        "\nfinal state: {}.{} MHz, volume {}, station {:?}, text {:?}",
        state.frequency_tenths / 10,
        state.frequency_tenths % 10,
        state.volume,
        state.program_name,
        state.radio_text
    );

    tuner.power_off().await?;
    sleep(Duration::from_millis(100)).await;
    tuner.shutdown();
    printer.abort();
    Ok(())
}
