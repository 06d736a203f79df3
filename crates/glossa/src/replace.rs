#![forbid(unsafe_code)]

//! Variable substitution for translated strings.
//!
//! Translators decide where a variable falls in their sentence; code only
//! supplies the values:
//!
//! ```
//! use glossa::replace;
//!
//! // "$GOT_X_GOLD" resolved to "You got <X> gold coins!"
//! let line = replace::flags("You got <X> gold coins!", &[("<X>", "10")]);
//! assert_eq!(line, "You got 10 gold coins!");
//! ```
//!
//! Never build localized sentences by concatenation; word order does not
//! survive translation.

/// Replace each `(marker, value)` pair in order, repeating a pair until its
/// marker no longer occurs. A value that contains its own marker gets a
/// single pass.
#[must_use]
pub fn flags(text: &str, replacements: &[(&str, &str)]) -> String {
    let mut out = text.to_string();
    for (marker, value) in replacements {
        if marker.is_empty() {
            continue;
        }
        if value.contains(marker) {
            out = out.replace(marker, value);
        } else {
            while out.contains(marker) {
                out = out.replace(marker, value);
            }
        }
    }
    out
}
