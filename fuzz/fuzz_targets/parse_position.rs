#![no_main]
use arbiter::chess::position::Position;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(position) = Position::try_from(input) else {
        return;
    };
    // Whatever is accepted is printed back in a form that parses to the same
    // position.
    let printed = position.to_string();
    assert_eq!(Position::try_from(printed.as_str()).ok(), Some(position));
});
