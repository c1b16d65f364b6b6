#![no_main]

use arbitrary::Arbitrary;
use imgconv::{DecodeRequest, EncodeOption, FormatOption, Limits, TiffCompression};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    ordinal: u8,
    quality: i32,
    gif_colors: i32,
    tiff_scheme: i32,
    data: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let limits = Limits {
        max_width: Some(512),
        max_height: Some(512),
        ..Default::default()
    };
    let Ok(decoded) = DecodeRequest::new(input.data).with_limits(&limits).decode() else {
        return;
    };

    let mut sink = Vec::new();
    let _ = imgconv::encode_ordinal(
        i32::from(input.ordinal % 7),
        &[
            EncodeOption::Quality(input.quality),
            EncodeOption::GifNumColors(input.gif_colors),
            EncodeOption::TiffCompressionType(TiffCompression::from_ordinal(input.tiff_scheme)),
        ],
        &mut sink,
        &decoded.pixels,
    );

    // Whatever the PNG encoder writes must decode to the same bounds.
    if let Ok(png) = FormatOption::from_extension("png").and_then(|f| f.encode(&decoded.pixels)) {
        let back = DecodeRequest::new(&png.data).decode().expect("png roundtrip");
        assert_eq!((back.width(), back.height()), (decoded.width(), decoded.height()));
    }
});
