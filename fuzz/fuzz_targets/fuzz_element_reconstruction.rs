#![no_main]

use std::sync::OnceLock;

use dlog_protocols::groups::{native, EcF2mGroup, EcFpGroup, NativeP256Group};
use dlog_protocols::DlogGroup;
use libfuzzer_sys::fuzz_target;

struct Groups {
    software: EcFpGroup,
    native: NativeP256Group,
    binary: EcF2mGroup,
}

fn groups() -> &'static Groups {
    static GROUPS: OnceLock<Groups> = OnceLock::new();
    GROUPS.get_or_init(|| {
        native::initialize().unwrap();
        Groups {
            software: EcFpGroup::named("P-256").unwrap(),
            native: NativeP256Group::new().unwrap(),
            binary: EcF2mGroup::named("K-233").unwrap(),
        }
    })
}

fuzz_target!(|data: &[u8]| {
    let groups = groups();
    for compressed in [true, false] {
        let software = groups
            .software
            .reconstruct_element(data, compressed)
            .ok()
            .filter(|e| groups.software.is_member(e).unwrap_or(false));
        let native = groups
            .native
            .reconstruct_element(data, compressed)
            .ok()
            .filter(|e| groups.native.is_member(e).unwrap_or(false));
        // Both P-256 backends must accept exactly the same encodings.
        assert_eq!(software.is_some(), native.is_some());

        if let Ok(point) = groups.binary.reconstruct_element(data, compressed) {
            let _ = groups.binary.is_member(&point);
        }
    }
});
