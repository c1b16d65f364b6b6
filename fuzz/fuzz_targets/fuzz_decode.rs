#![no_main]

use imgconv::{DecodeRequest, ImageFormat, Limits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(4_000_000),
        max_memory_bytes: Some(64 * 1024 * 1024),
        ..Default::default()
    };

    let _ = DecodeRequest::new(data).with_limits(&limits).decode();

    // Forced formats must fail cleanly on foreign bytes.
    for format in ImageFormat::ALL {
        let _ = DecodeRequest::new(data)
            .with_format(format)
            .with_limits(&limits)
            .decode();
    }
});
