#![no_main]

use libfuzzer_sys::fuzz_target;
use stager::types::Version;
use stager::version::{to_pre_release, to_release};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(v) = Version::parse(s) else {
        return;
    };

    assert_eq!(Version::parse(&v.to_string()).ok(), Some(v.clone()));
    let snapshot = to_pre_release(&v);
    assert_eq!(to_pre_release(&snapshot), snapshot);
    assert!(!to_release(&snapshot).is_snapshot());
});
