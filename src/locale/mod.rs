//! Message catalogs and translation
//!
//! Every user-facing sentence is an English template used as its own msgid.
//! A [`Catalog`] maps msgids to translations; a [`Translator`] looks them up
//! and fills `{name}` placeholders.

use crate::errors::{ExplainError, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{Display, Write};
use std::sync::Arc;
use tracing::trace;

const FRENCH: &str = include_str!("../../locales/fr.toml");

static BUILTIN: Lazy<HashMap<&'static str, Arc<Catalog>>> = Lazy::new(|| {
    let mut catalogs = HashMap::new();
    catalogs.insert("en", Arc::new(Catalog::default()));
    match Catalog::from_toml(FRENCH) {
        Ok(catalog) => {
            catalogs.insert("fr", Arc::new(catalog));
        }
        Err(err) => tracing::error!(%err, "built-in French catalog is invalid"),
    }
    catalogs
});

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    messages: HashMap<String, String>,
}

/// msgid → translation
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        Ok(Self { messages: file.messages })
    }

    pub fn insert(&mut self, msgid: impl Into<String>, translation: impl Into<String>) {
        self.messages.insert(msgid.into(), translation.into());
    }

    pub fn get(&self, msgid: &str) -> Option<&str> {
        self.messages.get(msgid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Languages with a built-in catalog.
pub fn available_languages() -> Vec<&'static str> {
    let mut langs: Vec<&'static str> = BUILTIN.keys().copied().collect();
    langs.sort_unstable();
    langs
}

/// Translation of templates into the active language.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: String,
    catalog: Arc<Catalog>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::english()
    }
}

impl Translator {
    pub fn english() -> Self {
        Self { lang: "en".to_string(), catalog: Arc::new(Catalog::default()) }
    }

    /// Built-in catalog for `lang`. A regional code such as `fr_CA` falls
    /// back to its two-letter language.
    pub fn for_lang(lang: &str) -> Result<Self> {
        let key = if BUILTIN.contains_key(lang) { Some(lang) } else { lang.get(..2) };
        match key.and_then(|key| BUILTIN.get(key).map(|catalog| (key, catalog))) {
            Some((key, catalog)) => Ok(Self { lang: key.to_string(), catalog: Arc::clone(catalog) }),
            None => Err(ExplainError::Locale {
                lang: lang.to_string(),
                reason: "no catalog available".to_string(),
            }),
        }
    }

    pub fn with_catalog(lang: impl Into<String>, catalog: Catalog) -> Self {
        Self { lang: lang.into(), catalog: Arc::new(catalog) }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn translate<'a>(&'a self, msgid: &'a str) -> Cow<'a, str> {
        match self.catalog.get(msgid) {
            Some(text) => Cow::Borrowed(text),
            None => {
                if self.lang != "en" {
                    trace!(lang = %self.lang, msgid, "untranslated text");
                }
                Cow::Borrowed(msgid)
            }
        }
    }

    /// Translates `msgid` then fills its placeholders.
    pub fn format(&self, msgid: &str, args: &[(&str, &dyn Display)]) -> String {
        format_template(&self.translate(msgid), args)
    }
}

/// Replaces `{name}` by the matching argument. `{{` and `}}` produce single
/// braces; placeholders without an argument are kept as written.
pub fn format_template(template: &str, args: &[(&str, &dyn Display)]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('{') {
            if let Some(close) = tail.find('}') {
                let key = &tail[1..close];
                if let Some((_, value)) = args.iter().find(|(name, _)| *name == key) {
                    let _ = write!(out, "{}", value);
                    rest = &tail[close + 1..];
                    continue;
                }
            }
        }
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

/// `tr!(t, "text")` translates; `tr!(t, "hello {name}", name = x)` also
/// fills placeholders.
#[macro_export]
macro_rules! tr {
    ($t:expr, $msg:expr) => {
        $t.translate($msg).into_owned()
    };
    ($t:expr, $msg:expr, $($key:ident = $val:expr),+ $(,)?) => {
        $t.format($msg, &[$((stringify!($key), &$val as &dyn ::std::fmt::Display)),+])
    };
}

pub fn please_report(t: &Translator) -> String {
    tr!(t, "Please report this example to the pyexplain issue tracker.\n")
}

pub fn no_information(t: &Translator) -> String {
    let mut text = tr!(t, "No information is known about this exception.\n");
    text.push_str(&please_report(t));
    text
}

pub fn internal_error(t: &Translator, err: &dyn Display) -> String {
    tracing::warn!(%err, "internal error");
    let mut text = tr!(t, "Internal error while explaining this exception.\n");
    text.push_str(&please_report(t));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_template() {
        let name = "x";
        assert_eq!(format_template("name `{name}`", &[("name", &name)]), "name `x`");
        assert_eq!(format_template("{{literal}} {missing}", &[]), "{literal} {missing}");
        assert_eq!(format_template("{a}{a}", &[("a", &1)]), "11");
        assert_eq!(format_template("unbalanced { brace", &[]), "unbalanced { brace");
    }

    #[test]
    fn test_tr_macro() {
        let t = Translator::english();
        let count = 3;
        assert_eq!(tr!(t, "{n} items", n = count), "3 items");
        assert_eq!(tr!(t, "plain"), "plain");
    }

    #[test]
    fn test_french_catalog() {
        let t = Translator::for_lang("fr_CA").unwrap();
        assert_eq!(t.lang(), "fr");
        let text = tr!(t, "Python exception:");
        assert_ne!(text, "Python exception:");
        assert!(Translator::for_lang("xx").is_err());
    }

    #[test]
    fn test_custom_catalog() {
        let mut catalog = Catalog::default();
        catalog.insert("Hello {who}", "Salut {who}");
        let t = Translator::with_catalog("test", catalog);
        assert_eq!(tr!(t, "Hello {who}", who = "toi"), "Salut toi");
        assert_eq!(t.translate("missing"), "missing");
    }
}
