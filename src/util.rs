use crate::layout::geometry::Lcg;

/// Shortens a display name to at most `max_chars` characters, appending an
/// ellipsis when something was cut.
pub fn short_name(name: &str, max_chars: usize) -> String {
    let mut chars = name.chars();
    let head = chars.by_ref().take(max_chars).collect::<String>();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

/// Two values in `[-1, 1]` derived from `key` and `seed`. Only integer
/// mixing and the layout's [`Lcg`] are involved, so placement is the same on
/// every platform and toolchain.
pub fn stable_pair(key: i64, seed: u64) -> (f32, f32) {
    let mut mixed = (key as u64) ^ seed.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    mixed = (mixed ^ (mixed >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    mixed = (mixed ^ (mixed >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    mixed ^= mixed >> 31;

    let mut rng = Lcg::new((mixed ^ (mixed >> 32)) as u32);
    let x = rng.next_f32();
    let y = rng.next_f32();
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
