//! Domain types shared by the bridge: the sale request and its encoding,
//! the terminal response and its decoding, and the host platform port.

pub mod ports;
pub mod request;
pub mod response;
