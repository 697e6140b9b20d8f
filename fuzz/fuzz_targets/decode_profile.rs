#![no_main]

use libfuzzer_sys::fuzz_target;
use saip::{Limits, Profile};

fuzz_target!(|data: &[u8]| {
    let limits = Limits::default().with_max_depth(8).with_max_scan(0x1_0000);
    let profile = match Profile::decode_with(data.to_vec().into(), limits) {
        Ok(profile) => profile,
        Err(_) => return,
    };

    // Untouched elements are written back as they were read.
    assert_eq!(profile.encode().unwrap(), data);

    // Encoding from values may fail on missing fields but must not panic.
    for element in profile.iter() {
        let mut target = Vec::new();
        let _ = element.value().append_encoded(&mut target);
        let _ = element.kind().to_string();
    }
});
