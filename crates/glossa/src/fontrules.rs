#![forbid(unsafe_code)]

//! Font replacement rules.
//!
//! Some locales cannot render in the game's default typeface, so a rule
//! file maps font keys to replacements, optionally with per-size overrides:
//!
//! ```xml
//! <data>
//!   <font value="defaultFont" replace="unicodeFont">
//!     <size value="24" replace="18"/>
//!     <size value="16" replace="12"/>
//!   </font>
//! </data>
//! ```
//!
//! Overrides that cannot take effect are resolved away at parse time: an
//! empty `replace` name, a size that does not parse, or a replacement size
//! of zero all mean "keep what you had", so they are simply not stored.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{GlossaError, Result};

/// Replacement rule for one source font key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontRule {
    /// Replacement font name, when one is configured.
    pub replace: Option<String>,
    /// Size overrides: requested size → replacement size.
    pub sizes: HashMap<u32, u32>,
}

/// Parse a font-rule document into a key → rule map.
pub(crate) fn parse_font_rules(xml: &str) -> Result<HashMap<String, FontRule>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut rules: HashMap<String, FontRule> = HashMap::new();
    let mut current: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"font" => {
                    if let Some(key) = attr(&e, "value") {
                        let rule = FontRule {
                            replace: attr(&e, "replace").filter(|r| !r.is_empty()),
                            sizes: HashMap::new(),
                        };
                        rules.insert(key.clone(), rule);
                        current = Some(key);
                    }
                }
                b"size" => {
                    if let Some(rule) = current.as_ref().and_then(|k| rules.get_mut(k)) {
                        let requested = attr(&e, "value").and_then(|v| v.parse::<u32>().ok());
                        let replacement =
                            attr(&e, "replace").and_then(|v| v.parse::<u32>().ok());
                        if let (Some(from), Some(to)) = (requested, replacement) {
                            if to != 0 {
                                rule.sizes.insert(from, to);
                            }
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"font" {
                    current = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(GlossaError::ManifestParse(format!("{e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(rules)
}

fn attr(start: &BytesStart<'_>, name: &str) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::parse_font_rules;

    const RULES: &str = r#"<data>
  <font value="defaultFont" replace="unicodeFont">
    <size value="24" replace="18"/>
    <size value="16" replace="12"/>
  </font>
  <font value="titleFont" replace=""/>
  <font value="bodyFont" replace="serifFont">
    <size value="zero" replace="10"/>
    <size value="8" replace="0"/>
  </font>
</data>"#;

    #[test]
    fn parses_replacements_and_sizes() {
        let rules = parse_font_rules(RULES).unwrap();
        let rule = &rules["defaultFont"];
        assert_eq!(rule.replace.as_deref(), Some("unicodeFont"));
        assert_eq!(rule.sizes[&24], 18);
        assert_eq!(rule.sizes[&16], 12);
    }

    #[test]
    fn empty_replacement_name_is_none() {
        let rules = parse_font_rules(RULES).unwrap();
        assert!(rules["titleFont"].replace.is_none());
    }

    #[test]
    fn useless_size_overrides_are_not_stored() {
        let rules = parse_font_rules(RULES).unwrap();
        assert!(rules["bodyFont"].sizes.is_empty());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(parse_font_rules("<data><font value=oops").is_err());
    }
}
