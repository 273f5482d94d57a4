#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(schedule) = librecur::parse(text) {
            assert_eq!(schedule.to_string(), text);
        }
    }
});
