#![forbid(unsafe_code)]

//! Flag lookup: translation, redirects, placeholder tokens, index strings,
//! fonts, and notes.
//!
//! Two lookup modes exist. Safe lookups ([`Glossa::get`],
//! [`Glossa::get_in`]) never fail: any miss — unknown context, untranslated
//! flag, dead-end redirect — degrades to the caller's original flag text,
//! so untranslated UI shows `$RAW_FLAGS` instead of crashing. Unsafe
//! lookups ([`Glossa::try_get`]) surface an unknown context as an error,
//! for tooling that wants to notice.

use crate::engine::Glossa;
use crate::error::{GlossaError, Result};
use crate::locale;
use crate::replace;

/// Redirect marker: a stored value `<RE>OTHER_FLAG` points at another flag
/// in the same table.
const REDIRECT: &str = "<RE>";

/// Redirect chains longer than this stop where they are.
const MAX_REDIRECT_HOPS: usize = 100;

/// Placeholder tokens applied after redirect resolution, in this order.
const PLACEHOLDERS: [(&str, &str); 6] = [
    ("<N>", "\n"),
    ("<T>", "\t"),
    ("<LQ>", "\u{201C}"),
    ("<RQ>", "\u{201D}"),
    ("<C>", ","),
    ("<Q>", "\""),
];

impl Glossa {
    /// Translate a flag in the default `"data"` context. Safe: a failed
    /// lookup returns the flag itself.
    ///
    /// Flags are case-insensitive (`$hello` and `$HELLO` are one flag).
    #[must_use]
    pub fn get(&self, flag: &str) -> String {
        self.get_in(flag, "data")
    }

    /// Translate a flag in a specific context (table id). Safe.
    #[must_use]
    pub fn get_in(&self, flag: &str, context: &str) -> String {
        match self.lookup(flag, context) {
            Ok(value) if !value.is_empty() => value,
            _ => flag.to_string(),
        }
    }

    /// Translate a flag, surfacing an unknown context as
    /// [`GlossaError::ContextNotFound`]. A missing flag inside a known
    /// context yields `Ok("")`.
    pub fn try_get(&self, flag: &str, context: &str) -> Result<String> {
        self.lookup(flag, context)
    }

    fn lookup(&self, flag: &str, context: &str) -> Result<String> {
        let upper = flag.to_uppercase();

        // The "index" context is a meta-namespace, not a data table.
        if context == "index" {
            return Ok(self.index_string(&upper));
        }

        let table = self
            .index
            .get(context)
            .ok_or_else(|| GlossaError::ContextNotFound {
                context: context.to_string(),
            })?;

        let mut value = match table.get(&upper) {
            Some(v) => v.clone(),
            None => return Ok(String::new()),
        };

        // Chase redirects within the same table, bounded.
        let mut hops = 0usize;
        while value.starts_with(REDIRECT) {
            if hops >= MAX_REDIRECT_HOPS {
                // Give up and hand back the last-seen value, marker and all.
                break;
            }
            let target = value[REDIRECT.len()..].to_uppercase();
            match table.get(&target) {
                Some(next) if !next.is_empty() => value = next.clone(),
                _ => return Ok(String::new()),
            }
            hops += 1;
        }

        Ok(apply_placeholders(value))
    }

    /// Resolve a `$KEY:locale` meta-query against locale metadata.
    ///
    /// Supported keys: `$LANGUAGE`, `$LANGUAGE_NATIVE`, `$REGION`,
    /// `$REGION_NATIVE`, `$LANGUAGE_BILINGUAL`, `$LANGUAGE(REGION)`,
    /// `$LANGUAGE(REGION)_NATIVE`, `$UI_LANGUAGE`, `$UI_REGION`.
    /// Anything unrecognized or malformed comes back unchanged.
    #[must_use]
    pub fn index_string(&self, flag: &str) -> String {
        self.index_string_inner(flag)
            .unwrap_or_else(|| flag.to_string())
    }

    fn index_string_inner(&self, flag: &str) -> Option<String> {
        let upper = flag.to_uppercase();
        if upper.starts_with(':') {
            return None;
        }
        let (key, locale_part) = upper.split_once(':')?;
        if locale_part.contains(':') {
            return None;
        }
        let target = locale::normalize(locale_part);
        let entry = self.manifest.as_ref()?.locales.get(&target)?;

        // Labels written for the active locale name the target language in
        // the user's words; labels written for the target itself are the
        // native rendering.
        let current = entry.label_for(&self.locale);
        let native = entry.label_for(&target);

        match key {
            "$UI_LANGUAGE" => entry.ui.as_ref()?.language.clone(),
            "$UI_REGION" => entry.ui.as_ref()?.region.clone(),
            "$LANGUAGE" => current?.language.clone(),
            "$LANGUAGE_NATIVE" => native?.language.clone(),
            "$REGION" => current?.region.clone(),
            "$REGION_NATIVE" => native?.region.clone(),
            "$LANGUAGE_BILINGUAL" => {
                let in_current = current.and_then(|l| l.language.clone()).unwrap_or_default();
                let in_native = native.and_then(|l| l.language.clone()).unwrap_or_default();
                if in_current == in_native {
                    Some(in_current)
                } else {
                    Some(format!("{in_current} ({in_native})"))
                }
            }
            "$LANGUAGE(REGION)" => {
                let language = self.index_string(&format!("$LANGUAGE:{target}"));
                let region = self.index_string(&format!("$REGION:{target}"));
                Some(format!("{language}({region})"))
            }
            "$LANGUAGE(REGION)_NATIVE" => {
                let language = self.index_string(&format!("$LANGUAGE_NATIVE:{target}"));
                let region = self.index_string(&format!("$REGION_NATIVE:{target}"));
                Some(format!("{language}({region})"))
            }
            _ => None,
        }
    }

    /// Replacement font for a font key. Unknown keys (or rules with no
    /// replacement) come back unchanged.
    #[must_use]
    pub fn font(&self, key: &str) -> String {
        self.fonts
            .get(key)
            .and_then(|rule| rule.replace.clone())
            .unwrap_or_else(|| key.to_string())
    }

    /// Replacement size for a font key at a specific size. Unknown keys or
    /// sizes come back unchanged.
    #[must_use]
    pub fn font_size(&self, key: &str, size: u32) -> u32 {
        self.fonts
            .get(key)
            .and_then(|rule| rule.sizes.get(&size).copied())
            .unwrap_or(size)
    }

    /// Title of a translation note for a locale, with `$N` expanded to a
    /// newline.
    #[must_use]
    pub fn note_title(&self, locale: &str, id: &str) -> Option<String> {
        let note = self.manifest.as_ref()?.notes.get(id)?;
        let text = note.texts.get(locale)?;
        Some(replace::flags(&text.title, &[("$N", "\n")]))
    }

    /// Body of a translation note for a locale, with `$N` expanded to a
    /// newline.
    #[must_use]
    pub fn note_body(&self, locale: &str, id: &str) -> Option<String> {
        let note = self.manifest.as_ref()?.notes.get(id)?;
        let text = note.texts.get(locale)?;
        Some(replace::flags(&text.body, &[("$N", "\n")]))
    }
}

/// Expand placeholder tokens, each repeatedly until absent, in table order.
fn apply_placeholders(mut value: String) -> String {
    if value.is_empty() {
        return value;
    }
    for (token, replacement) in PLACEHOLDERS {
        while value.contains(token) {
            value = value.replace(token, replacement);
        }
    }
    value
}
