pub mod decoder;

pub use decoder::{decode, DecodeError};

/// Greeting a client sends right after connecting.
pub const HELLO: &[u8] = b"BZFLAG\r\n\r\n";

/// Message code of the game query ("qg").
pub const MSG_QUERY_GAME: u16 = 0x7167;

/// Bytes written to the server to ask for its status: the greeting followed
/// by an empty game query message.
pub fn status_request() -> Vec<u8> {
    let mut request = Vec::with_capacity(HELLO.len() + 4);
    request.extend_from_slice(HELLO);
    request.extend_from_slice(&0u16.to_be_bytes());
    request.extend_from_slice(&MSG_QUERY_GAME.to_be_bytes());
    request
}
