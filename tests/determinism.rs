//! Worker count must never change a result.

use fasscope::{
    codec::{apply_keyed_cipher, PayloadDecoder},
    config::{CodecConfig, ContainerConfig, DecompilerConfig, ResolverConfig},
    strings::StringTableResolver,
    Decompiler,
};

/// A buffer that exercises every string strategy.
fn mixed_buffer() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&64u32.to_le_bytes());
    data.extend_from_slice(&[0u8; 60]);
    for (index, text) in ["defun", "princ", "dict_name"].iter().enumerate() {
        data.extend_from_slice(&(index as u32).to_le_bytes());
        data.extend_from_slice(&(text.len() as u32).to_le_bytes());
        data.extend_from_slice(text.as_bytes());
    }
    data.extend_from_slice(&[0xFF; 8]);
    data.push(6);
    data.extend_from_slice(b"c:test");
    data.extend_from_slice(&[0xFE; 8]);
    data.extend_from_slice(&apply_keyed_cipher(b"setq", 0x31));
    for i in 0..512u32 {
        data.push((i.wrapping_mul(151) % 251) as u8);
    }
    data
}

#[test]
fn resolver_is_deterministic() {
    let buffer = mixed_buffer();
    let config = ResolverConfig {
        keyed_skip_threshold: None,
        ..ResolverConfig::default()
    };

    let sequential = StringTableResolver::new(config.clone(), 1).resolve(&buffer);
    for workers in [2, 4, 0] {
        let parallel = StringTableResolver::new(config.clone(), workers).resolve(&buffer);
        assert_eq!(sequential.table, parallel.table);
        assert_eq!(sequential.candidate_counts, parallel.candidate_counts);
    }
}

#[test]
fn decoder_is_deterministic() {
    let payload = mixed_buffer();

    let sequential =
        PayloadDecoder::new(CodecConfig::default(), ContainerConfig::default(), 1).decode(&payload);
    for workers in [2, 4, 0] {
        let parallel =
            PayloadDecoder::new(CodecConfig::default(), ContainerConfig::default(), workers)
                .decode(&payload);
        assert_eq!(sequential, parallel);
    }
}

#[test]
fn pipeline_is_deterministic() {
    let payload = mixed_buffer();
    let mut data = format!("FAS4-FILE\r\n{}\r\n", payload.len()).into_bytes();
    data.extend_from_slice(&payload);

    let sequential = Decompiler::new(DecompilerConfig::sequential())
        .decompile(&data)
        .unwrap();
    let parallel = Decompiler::new(DecompilerConfig {
        workers: 4,
        ..DecompilerConfig::default()
    })
    .decompile(&data)
    .unwrap();

    assert_eq!(sequential.source, parallel.source);
    assert_eq!(sequential.report, parallel.report);
    assert_eq!(sequential.buffer, parallel.buffer);
}
