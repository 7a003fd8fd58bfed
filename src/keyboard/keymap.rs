//! Key code to key name table
//!
//! Names come from `evdev::Key`, which follows `linux/input-event-codes.h`.
//! Some codes carry more than one name; each alias list is sorted and the
//! first entry is the canonical name reported by the decoder.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Highest key code the kernel defines (`KEY_MAX`)
pub const KEY_MAX: u16 = 0x2ff;

/// Codes known under several names in `input-event-codes.h`
static MULTI_NAMES: &[(u16, &[&str])] = &[
    (113, &["KEY_MIN_INTERESTING", "KEY_MUTE"]),
    (122, &["KEY_HANGEUL", "KEY_HANGUEL"]),
    (152, &["KEY_COFFEE", "KEY_SCREENLOCK"]),
    (153, &["KEY_DIRECTION", "KEY_ROTATE_DISPLAY"]),
    (204, &["KEY_ALL_APPLICATIONS", "KEY_DASHBOARD"]),
    (244, &["KEY_BRIGHTNESS_AUTO", "KEY_BRIGHTNESS_ZERO"]),
    (246, &["KEY_WIMAX", "KEY_WWAN"]),
    (0x100, &["BTN_0", "BTN_MISC"]),
    (0x110, &["BTN_LEFT", "BTN_MOUSE"]),
    (0x120, &["BTN_JOYSTICK", "BTN_TRIGGER"]),
    (0x130, &["BTN_A", "BTN_GAMEPAD", "BTN_SOUTH"]),
    (0x131, &["BTN_B", "BTN_EAST"]),
    (0x133, &["BTN_NORTH", "BTN_X"]),
    (0x134, &["BTN_WEST", "BTN_Y"]),
    (0x140, &["BTN_DIGI", "BTN_TOOL_PEN"]),
    (0x150, &["BTN_GEAR_DOWN", "BTN_WHEEL"]),
    (0x1af, &["KEY_BRIGHTNESS_TOGGLE", "KEY_DISPLAYTOGGLE"]),
    (0x2c0, &["BTN_TRIGGER_HAPPY", "BTN_TRIGGER_HAPPY1"]),
];

/// Name evdev knows a code by, if any
#[cfg(target_os = "linux")]
fn evdev_name(code: u16) -> Option<String> {
    // Unnamed codes render as "unknown key: N"
    let name = format!("{:?}", evdev::Key::new(code));
    (name.starts_with("KEY_") || name.starts_with("BTN_")).then_some(name)
}

#[cfg(not(target_os = "linux"))]
fn evdev_name(_code: u16) -> Option<String> {
    None
}

/// Static lookup from key code to its sorted aliases
pub static KEYMAP: LazyLock<HashMap<u16, Vec<String>>> = LazyLock::new(|| {
    let mut map: HashMap<u16, Vec<String>> = HashMap::new();
    for code in 0..=KEY_MAX {
        if let Some(name) = evdev_name(code) {
            map.entry(code).or_default().push(name);
        }
    }
    for (code, names) in MULTI_NAMES {
        map.entry(*code)
            .or_default()
            .extend(names.iter().map(|n| n.to_string()));
    }
    for names in map.values_mut() {
        names.sort();
        names.dedup();
    }
    map
});

/// Reverse lookup from any alias to its key code
static CODES_BY_NAME: LazyLock<HashMap<&'static str, u16>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (code, names) in KEYMAP.iter() {
        for name in names {
            map.insert(name.as_str(), *code);
        }
    }
    map
});

/// All names registered for a key code.
pub fn aliases(code: u16) -> Option<&'static [String]> {
    KEYMAP.get(&code).map(Vec::as_slice)
}

/// Canonical name for a key code.
pub fn key_name(code: u16) -> Option<&'static str> {
    aliases(code).and_then(|names| names.first()).map(String::as_str)
}

/// Key code for a name, accepting any alias.
pub fn code_for_name(name: &str) -> Option<u16> {
    CODES_BY_NAME.get(name).copied()
}

/// Canonical spelling of a key name, so that configured names compare equal
/// to what the decoder emits.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    code_for_name(name).and_then(key_name)
}
