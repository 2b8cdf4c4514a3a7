//! STOMP 1.2 over WebSocket.

pub mod client;
pub mod error;
pub mod frame;

pub use client::{StompClient, StompConfig, Subscription};
pub use error::{Result, StompError};
pub use frame::{Command, Frame, FrameDecoder};
