#![no_main]

use cellkit_core::keystroke::KeyStroke;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must never panic.
    let Ok(stroke) = text.parse::<KeyStroke>() else {
        return;
    };

    // The textual form parses back to the same stroke.
    let shown = stroke.to_string();
    let reparsed: KeyStroke = shown
        .parse()
        .unwrap_or_else(|err| panic!("{shown:?} from {text:?} does not reparse: {err}"));
    assert_eq!(reparsed, stroke, "round trip through {shown:?}");
});
