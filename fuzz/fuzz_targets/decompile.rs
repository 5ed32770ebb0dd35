#![no_main]

use fasscope::{codegen::is_balanced, config::DecompilerConfig, Decompiler};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let decompiler = Decompiler::new(DecompilerConfig::sequential());
    if let Ok(decompilation) = decompiler.decompile(data) {
        assert!(is_balanced(&decompilation.source));
    }
});
