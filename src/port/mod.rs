//! Console port abstraction layer.
//!
//! Provides the `ConsolePort` trait with a real serial implementation and a
//! scripted mock, enabling dependency injection and hardware-free testing.

pub mod error;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use mock::MockConsole;
pub use sync_port::*;
pub use traits::*;
