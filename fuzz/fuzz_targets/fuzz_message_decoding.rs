#![no_main]

use dlog_protocols::ot::OtMessage;
use dlog_protocols::sigma::{SigmaMessage, SigmaProof, ZkPokMessage};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = SigmaProof::from_bytes(data);
    let _ = SigmaMessage::from_bytes(data);
    let _ = ZkPokMessage::from_bytes(data);
    let _ = OtMessage::from_bytes(data);
});
