use super::{KEY_SIZE, fuzz_streaming};

/// Prefix `msg` with a fixed key and run the streaming fuzzer on it.
fn streaming_fuzzer_test_case(key_byte: u8, msg: &[u8]) {
    let mut data = [key_byte; KEY_SIZE + 160];
    data[KEY_SIZE..KEY_SIZE + msg.len()].copy_from_slice(msg);
    fuzz_streaming(&data[..KEY_SIZE + msg.len()]);
}

#[test]
fn short_input() {
    fuzz_streaming(&[0xaa; KEY_SIZE - 1]);
    fuzz_streaming(&[0xaa; KEY_SIZE]);
}

#[test]
fn single_bytes() {
    // every chunk is one byte long
    streaming_fuzzer_test_case(0x04, &[0x25; 49]);
}

#[test]
fn chunks_straddle_blocks() {
    // chunk lengths vary between 1 and 37 bytes
    let msg: [u8; 133] = core::array::from_fn(|i| (i as u8).wrapping_mul(29).wrapping_add(16));
    streaming_fuzzer_test_case(0xfe, &msg);
}

#[test]
fn exact_block_multiples() {
    // chunk length 16 throughout
    streaming_fuzzer_test_case(0xff, &[0x0f; 128]);
}

#[test]
fn saturated_accumulator() {
    // all-ones key and message keep every limb close to its bound
    streaming_fuzzer_test_case(0xff, &[0xff; 160]);
}

#[test]
fn crash_6() {
    // r = 0x04040404040404040404040404040404, a single short block whose product lands
    // just above 2^130 - 5 before the final reduction.
    let mut data = [0x04u8; KEY_SIZE + 4];
    data[26] = 0xef;
    data[27] = 0x03;
    data[KEY_SIZE + 3] = 0xf2;
    fuzz_streaming(&data);
}
