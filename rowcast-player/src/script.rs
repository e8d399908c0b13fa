//! Key scripts: one character per remote-control key.

use anyhow::bail;
use rowcast_core::CarouselKey;

/// Parse a key script such as `"RRD O"`.
///
/// `L`/`R`/`U`/`D` move focus, `O` is OK and `I` is Info, in either case.
/// Whitespace and commas separate nothing and are ignored.
pub fn parse_keys(script: &str) -> anyhow::Result<Vec<CarouselKey>> {
    let mut keys = Vec::with_capacity(script.len());
    for (offset, c) in script.char_indices() {
        let key = match c.to_ascii_uppercase() {
            'L' => CarouselKey::Left,
            'R' => CarouselKey::Right,
            'U' => CarouselKey::Up,
            'D' => CarouselKey::Down,
            'O' => CarouselKey::Confirm,
            'I' => CarouselKey::Info,
            c if c.is_whitespace() || c == ',' => continue,
            other => bail!("unknown key {other:?} at offset {offset} in key script"),
        };
        keys.push(key);
    }
    Ok(keys)
}
