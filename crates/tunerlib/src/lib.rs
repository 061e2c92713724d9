//! # tunerlib -- Async FM Tuner Control
//!
//! `tunerlib` is an asynchronous Rust library for driving the Si4700
//! family of FM tuner chips (Si4700/01/02/03) over a two-wire bus. It is
//! designed for embedded radio appliances and headless receivers where
//! seek/tune control, RDS decoding, and live state observation matter.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tunerlib::si470x::{SeekDirection, Si470xBuilder};
//!
//! # async fn example(
//! #     bus: Box<dyn tunerlib::RegisterBus>,
//! #     reset: Box<dyn tunerlib::ResetPin>,
//! #     irq: std::sync::Arc<dyn tunerlib::InterruptPin>,
//! # ) -> tunerlib::Result<()> {
//! let tuner = Si470xBuilder::new()
//!     .reset_pin(reset)
//!     .interrupt_pin(irq)
//!     .build(bus)
//!     .await?;
//!
//! tuner.power_on().await?;
//! if tuner.seek(SeekDirection::Up).await? {
//!     println!("tuned to {} x 100 kHz", tuner.state().frequency_tenths);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                   | Purpose                                      |
//! |-------------------------|----------------------------------------------|
//! | `tunerlib-core`         | Bus/GPIO traits, register bank, events, state |
//! | `tunerlib-rds`          | Stateful RDS group decoder, PTY lookup       |
//! | `tunerlib-si470x`       | The Si4700-family driver                     |
//! | `tunerlib-test-harness` | Mock bus and GPIO for tests                  |
//! | **`tunerlib`**          | This facade crate -- re-exports everything   |
//!
//! ## Event Subscription
//!
//! The driver emits [`TunerEvent`]s through a broadcast channel whenever
//! an observable field changes -- frequency, signal strength, RDS station
//! name, radio text, clock time:
//!
//! ```no_run
//! use tunerlib::TunerEvent;
//! # async fn example(tuner: &tunerlib::si470x::Si470x) {
//! let mut events = tuner.subscribe();
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         TunerEvent::ProgramNameChanged { name } => println!("station: {name}"),
//!         TunerEvent::RadioTextChanged { text } => println!("text: {text}"),
//!         other => println!("{other:?}"),
//!     }
//! }
//! # }
//! ```

pub use tunerlib_core::*;

/// Si4700-family driver.
///
/// Provides [`Si470x`](si470x::Si470x) and
/// [`Si470xBuilder`](si470x::Si470xBuilder) for driving the Si4700/01/02/03
/// over any [`RegisterBus`] implementation.
pub mod si470x {
    pub use tunerlib_si470x::*;
}

/// RDS decoding, usable standalone without a driver.
///
/// Provides [`RdsDecoder`](rds::RdsDecoder) plus program type name lookup
/// for both the European RDS and North American RBDS standards.
pub mod rds {
    pub use tunerlib_rds::*;
}
