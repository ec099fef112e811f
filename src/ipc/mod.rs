//! IPC layer between the configurator and the renderer process.
//!
//! # Components
//!
//! - [`MessageChannel`]: raw send / correlated query over a [`Transport`]
//! - [`CommandComposite`]: reentrant transactions that flush as one `CommandArray`
//! - [`PollingWatcher`]: single-use cancellable periodic query
//! - [`UdpTransport`]: loopback datagram transport plus its receive loop
//!
//! Settings code never talks to the channel directly for outbound changes. It
//! goes through a [`MessageSender`] (in production the [`CommandComposite`]) so
//! every change participates in batching.

pub mod channel;
pub mod composite;
pub mod message;
pub mod polling;
pub mod udp;

pub use channel::{MessageChannel, Transport, TransportError};
pub use composite::{CommandComposite, CompositeScope};
pub use message::{CommandArray, Message, names};
pub use polling::{PollingError, PollingWatcher};
pub use udp::{UdpTransport, spawn_receiver};

/// Outbound side used by settings code.
///
/// `start_composite` / `end_composite` calls must be balanced; prefer
/// [`CompositeScope`] which ends the transaction on drop.
pub trait MessageSender: Send + Sync {
    fn send_message(&self, message: Message);

    fn start_composite(&self);

    fn end_composite(&self);
}
