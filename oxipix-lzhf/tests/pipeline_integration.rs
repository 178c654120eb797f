//! End-to-end tests for the LZHF pipeline and container.

use oxipix_core::{ErrorKind, OxiPixError};
use oxipix_lzhf::lzss::{LzssToken, parse_tokens, serialize_tokens};
use oxipix_lzhf::{
    Container, LzssEncoder, LzssParams, Payload, Pipeline, StageMode, Verifier, compress,
    decompress, huffman_compress, lzss_decompress,
};

/// 64x64 RGB image with a gradient sky and a checkered floor.
fn synthetic_pixels() -> Vec<u8> {
    let mut pixels = Vec::with_capacity(64 * 64 * 3);
    for y in 0..64u32 {
        for x in 0..64u32 {
            if y < 32 {
                pixels.extend_from_slice(&[(y * 4) as u8, (y * 6) as u8, 255]);
            } else if (x / 8 + y / 8) % 2 == 0 {
                pixels.extend_from_slice(&[40, 40, 40]);
            } else {
                pixels.extend_from_slice(&[200, 200, 200]);
            }
        }
    }
    pixels
}

#[test]
fn test_roundtrip_text() {
    let original = b"This is a test of compression! ".repeat(10);
    let compressed = compress(&original).expect("compression failed");
    let decompressed = decompress(&compressed).expect("decompression failed");

    assert_eq!(decompressed, original);
    assert!(compressed.len() < original.len());
}

#[test]
fn test_roundtrip_pixels() {
    let pixels = synthetic_pixels();
    let pipeline = Pipeline::default();
    let (report, verified) = Verifier::crc32()
        .roundtrip(&pipeline, &pixels)
        .expect("round trip failed");

    assert_eq!(verified.len, pixels.len());
    assert!(report.container_size * 4 < report.original_size);
}

#[test]
fn test_run_of_0x41() {
    let original = [0x41u8; 50];
    let tokens = LzssEncoder::new(LzssParams::DEFAULT).unwrap().tokenize(&original);

    assert_eq!(tokens[0], LzssToken::Literal(0x41));
    assert!(tokens.len() > 1);
    assert!(
        tokens[1..]
            .iter()
            .all(|t| matches!(t, LzssToken::Match { .. }))
    );

    assert_eq!(decompress(&compress(&original).unwrap()).unwrap(), original);
}

#[test]
fn test_uniform_bytes_gain_nothing() {
    let original: Vec<u8> = (0..=255u8).collect();

    let block = huffman_compress(&original).unwrap();
    assert!(block.table.iter().all(|(_, code)| code.length == 8));
    assert!(block.payload.len() >= original.len());

    let compressed = compress(&original).unwrap();
    assert!(compressed.len() >= original.len());
    assert_eq!(decompress(&compressed).unwrap(), original);
}

#[test]
fn test_empty_input() {
    for pipeline in [
        Pipeline::default(),
        Pipeline::single_stage(LzssParams::DEFAULT).unwrap(),
    ] {
        let compressed = pipeline.compress(b"").unwrap();
        let container = Container::parse(&compressed).expect("empty container must parse");
        assert_eq!(container.original_len, 0);
        assert_eq!(container.token_len(), 0);
        assert_eq!(decompress(&compressed).unwrap(), b"");
    }

    // MAGIC + params + two zero varints + empty table + zero padding
    let compressed = compress(b"").unwrap();
    assert_eq!(compressed, b"LZHF\x0f\xff\x12\x03\x00\x00\x00\x00\x00".to_vec());
}

#[test]
fn test_single_byte() {
    for byte in [0x00, 0x7F, 0xFF] {
        let compressed = compress(&[byte]).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), vec![byte]);
    }
}

#[test]
fn test_corrupt_magic_is_format_error() {
    let compressed = compress(b"some pixels, some pixels, some pixels").unwrap();
    for i in 0..4 {
        let mut corrupt = compressed.clone();
        corrupt[i] = corrupt[i].wrapping_add(1);
        let err = decompress(&corrupt).unwrap_err();
        assert!(matches!(err, OxiPixError::InvalidMagic { .. }));
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}

#[test]
fn test_truncated_container() {
    let compressed = compress(&synthetic_pixels()).unwrap();
    for cut in [0, 3, 5, 8, 9, 12, compressed.len() / 2, compressed.len() - 1] {
        let err = decompress(&compressed[..cut]).unwrap_err();
        assert!(err.is_malformed(), "cut at {cut}: {err}");
    }
}

#[test]
fn test_unsupported_parameters_in_container() {
    let mut compressed = compress(b"abcabcabc").unwrap();
    // Window size field: 0 is not expressible.
    compressed[4] = 0;
    compressed[5] = 0;
    let err = decompress(&compressed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn test_external_stream_with_bad_tokens() {
    let params = LzssParams::DEFAULT;

    // Offset past the output produced so far
    let mut tokens = vec![LzssToken::Literal(b'a'), LzssToken::Literal(b'b')];
    tokens.push(LzssToken::Match {
        offset: 3,
        length: 3,
    });
    let stream = serialize_tokens(&tokens, &params).unwrap();
    let err = lzss_decompress(&stream, &params).unwrap_err();
    assert!(err.is_malformed());
    assert_eq!(err.kind(), ErrorKind::Bounds);

    // A length beyond `lookahead` under a narrower parameter set
    let wide = LzssParams::new(4095, 18, 3).unwrap();
    let narrow = LzssParams::new(4095, 10, 3).unwrap();
    let stream = serialize_tokens(
        &[
            LzssToken::Literal(b'z'),
            LzssToken::Match {
                offset: 1,
                length: 18,
            },
        ],
        &wide,
    )
    .unwrap();
    assert_eq!(parse_tokens(&stream, &narrow).unwrap().len(), 2);
    let err = lzss_decompress(&stream, &narrow).unwrap_err();
    assert!(matches!(err, OxiPixError::InvalidMatchLength { length: 18, .. }));
}

#[test]
fn test_payload_corruption_detected() {
    let original = synthetic_pixels();
    let compressed = compress(&original).unwrap();
    let mut corrupt = compressed.clone();
    let last = corrupt.len() - 1;
    corrupt[last] ^= 0xFF;

    // Either the decoder rejects it or the verifier catches the difference.
    match decompress(&corrupt) {
        Err(err) => assert!(err.is_malformed()),
        Ok(output) => {
            let err = Verifier::new().verify(&original, &output).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Verification);
        }
    }
}

#[test]
fn test_container_payload_matches_stage() {
    let data = synthetic_pixels();
    let single = Pipeline::single_stage(LzssParams::DEFAULT)
        .unwrap()
        .compress_container(&data)
        .unwrap();
    let double = Pipeline::default().compress_container(&data).unwrap();

    assert_eq!(single.mode(), StageMode::LzssOnly);
    assert_eq!(double.mode(), StageMode::LzssHuffman);
    assert_eq!(single.token_len(), double.token_len());
    assert!(matches!(single.payload, Payload::Tokens(_)));
    assert!(double.payload_len() < single.payload_len());
}
