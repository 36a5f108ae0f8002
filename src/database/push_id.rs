use std::sync::Mutex;

use rand::Rng;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

struct PushState {
    last_push_time: u64,
    last_rand_chars: [u8; 12],
}

static PUSH_STATE: Mutex<PushState> = Mutex::new(PushState {
    last_push_time: 0,
    last_rand_chars: [0; 12],
});

/// Generates a 20 character key that sorts after every key generated before
/// it in this process: 8 characters of millisecond timestamp followed by 12
/// random characters, incremented instead of redrawn within the same
/// millisecond.
pub(crate) fn next_push_id(mut now: u64) -> String {
    let mut state = PUSH_STATE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let duplicate_time = now == state.last_push_time;
    state.last_push_time = now;

    let mut timestamp_chars = [0u8; 8];
    for slot in timestamp_chars.iter_mut().rev() {
        let index = (now % 64) as usize;
        now /= 64;
        *slot = PUSH_CHARS[index];
    }
    debug_assert!(now == 0, "push id timestamp overflowed base64 encoding");

    if !duplicate_time {
        let mut rng = rand::thread_rng();
        for char_slot in state.last_rand_chars.iter_mut() {
            *char_slot = rng.gen_range(0..64);
        }
    } else {
        increment(&mut state.last_rand_chars);
    }

    let mut id = String::with_capacity(20);
    for ch in &timestamp_chars {
        id.push(*ch as char);
    }
    for &rand_index in &state.last_rand_chars {
        id.push(PUSH_CHARS[rand_index as usize] as char);
    }

    debug_assert_eq!(id.len(), 20, "push id should be 20 characters");

    id
}

fn increment(chars: &mut [u8; 12]) {
    let mut index = chars.len();
    while index > 0 && chars[index - 1] == 63 {
        chars[index - 1] = 0;
        index -= 1;
    }
    if index == 0 {
        // wrapped; the next millisecond reseeds
        chars[0] = 0;
    } else {
        chars[index - 1] += 1;
    }
}
