pub mod encryption;
pub mod result_ext;

/// Hex encode a utf8 message with a `0x` prefix, the format keyrings expect for personal messages
pub fn hex_encode_message(message: &str) -> String {
    format!("0x{}", hex::encode(message.as_bytes()))
}
