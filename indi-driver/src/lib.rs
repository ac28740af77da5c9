//! Driver-side runtime for the INDI instrument-control protocol.
//!
//! A driver is a process that owns one or more logical devices and
//! exposes their state as typed vector properties. The controlling
//! server speaks to the driver over stdin/stdout, one XML element per
//! message. This crate is the library linked into every driver: it
//! serializes outbound definitions, updates, deletions and messages;
//! parses and vets inbound commands before invoking the driver's
//! callbacks; applies peer-supplied values under the protocol's typed
//! constraints; paces large binary payloads with a ping/reply round
//! trip; and snapshots property state to disk in the same XML
//! grammar.
//!
//! A minimal driver implements [`Driver`] and hands it to [`run`]:
//!
//! ```ignore
//! #[tokio::main]
//! async fn main() -> indi_driver::Result<()> {
//!     indi_driver::run(Arc::new(MyDriver::new()), Options::default()).await
//! }
//! ```

use std::sync::Arc;

pub mod config;
pub mod sexa;
pub mod types;
pub mod xml;

mod apply;
mod dispatch;
mod driver;
mod registry;
mod runtime;
mod writer;

pub use dispatch::Dispatcher;
pub use driver::{BlobPayload, Driver};
pub use runtime::{Options, Runtime};
pub use types::Error;

/// A `Result` type where the error value is a value from
/// `indi_driver::types::Error`.
pub type Result<T> = std::result::Result<T, types::Error>;

/// The protocol revision this runtime implements. A client that
/// announces a newer version is refused at startup.
pub const PROTOCOL_VERSION: f64 = 1.7;

/// Runs a driver over the process's stdin/stdout until the server
/// closes the stream. This is the normal entry point; tests and
/// embedders can assemble a [`Runtime`] and [`Dispatcher`] over other
/// transports instead.
pub async fn run(driver: Arc<dyn Driver>, options: Options) -> Result<()> {
    let rt = Runtime::new(tokio::io::stdout(), options);

    Dispatcher::new(rt, driver).run(tokio::io::stdin()).await
}
