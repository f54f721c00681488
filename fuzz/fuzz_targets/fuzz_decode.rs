#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Frames arrive as text, so only valid UTF-8 reaches the decoder.
    if let Ok(frame) = std::str::from_utf8(data) {
        if let Ok(msg) = connect_four_client::decode(frame) {
            // Anything accepted must carry a known tag.
            assert!(connect_four_client::ServerMessage::KINDS.contains(&msg.kind()));
        }
    }
});
