//! Records of a documentation search index.

use std::fmt;

use serde::Serialize;

/// What a link points at, derived from the page name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Class,
    Struct,
    Namespace,
    File,
    Page,
    Member,
    Other,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Namespace => "namespace",
            Self::File => "file",
            Self::Page => "page",
            Self::Member => "member",
            Self::Other => "other",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocTarget {
    /// Page name without the leading `../`, e.g. `classsun_1_1RK4.html`.
    pub page: String,
    pub anchor: Option<String>,
    pub kind: TargetKind,
}

impl DocTarget {
    /// Parse a link url such as `../classsun_1_1RK4.html#a0341c9c8`.
    pub fn from_url(url: &str) -> Self {
        let url = url.strip_prefix("../").unwrap_or(url);
        let (page, anchor) = match url.split_once('#') {
            Some((page, anchor)) if !anchor.is_empty() => (page, Some(anchor.to_string())),
            Some((page, _)) => (page, None),
            None => (url, None),
        };
        let kind = if anchor.is_some() {
            TargetKind::Member
        } else if page.starts_with("class") {
            TargetKind::Class
        } else if page.starts_with("struct") {
            TargetKind::Struct
        } else if page.starts_with("namespace") {
            TargetKind::Namespace
        } else if page.ends_with("_8h.html") {
            TargetKind::File
        } else if page.starts_with("md_") {
            TargetKind::Page
        } else {
            TargetKind::Other
        };
        Self {
            page: page.to_string(),
            anchor,
            kind,
        }
    }

    pub fn url(&self) -> String {
        match &self.anchor {
            Some(anchor) => format!("{}#{anchor}", self.page),
            None => self.page.clone(),
        }
    }

    pub(crate) fn same_location(&self, other: &DocTarget) -> bool {
        self.page == other.page && self.anchor == other.anchor
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEntry {
    pub target: DocTarget,
    pub flag: u32,
    /// Owning scope with HTML entities decoded, e.g. `sun::TF_SISO::setTs()`.
    pub scope: String,
}

impl LinkEntry {
    /// Scope that contains the entity this link documents.
    ///
    /// `scope` sometimes names the entity itself (`sun::TF_SISO::setTs()`
    /// for `setTs`, `sun::TF_SISO` for the class) and sometimes only its
    /// owner (`sun::RK4` for the variable `Ts_2_`). File level members use
    /// `name():&#160;File.h`. All three give the owner here.
    pub fn owning_scope<'a>(&'a self, label: &str) -> &'a str {
        let scope = self.scope.as_str();
        if let Some((_, file)) = scope.split_once(":\u{a0}") {
            return file.trim();
        }
        let path = scope.split('(').next().unwrap_or(scope).trim_end();
        match path.rsplit_once("::") {
            Some((owner, last)) if last.eq_ignore_ascii_case(label) => owner,
            None if path.eq_ignore_ascii_case(label) => "",
            _ => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRecord {
    /// Raw key as generated, e.g. `ss_5ffcn`.
    pub key: String,
    pub label: String,
    pub links: Vec<LinkEntry>,
}

impl SearchRecord {
    pub fn normalized_key(&self) -> String {
        decode_key(&self.key)
    }
}

/// Decode `_XX` hex escapes and lower-case the result.
///
/// `ss_5ffcn` becomes `ss_fcn`, `tf_5fsiso_2eh` becomes `tf_siso.h`.
/// A `_` not followed by two hex digits is kept as is.
pub fn decode_key(key: &str) -> String {
    let bytes = key.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).to_lowercase()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode the entities used in scope strings: `&amp;`, `&lt;`, `&gt;`,
/// `&quot;`, `&apos;` and numeric `&#NNN;` / `&#xHH;`.
pub fn decode_html_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match rest.find(';').and_then(|end| Some((end, decode_entity(&rest[1..end])?))) {
            Some((end, decoded)) => {
                out.push(decoded);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_key() {
        assert_eq!(decode_key("ss_5ffcn"), "ss_fcn");
        assert_eq!(decode_key("tf_5fsiso_2eh"), "tf_siso.h");
        assert_eq!(decode_key("_7essinterface"), "~ssinterface");
        assert_eq!(decode_key("setTs"), "setts");
        assert_eq!(decode_key("trailing_"), "trailing_");
        assert_eq!(decode_key("a_zz"), "a_zz");
    }

    #[test]
    fn test_decode_html_entities() {
        assert_eq!(
            decode_html_entities("setSISO(const TF_SISO &amp;siso)"),
            "setSISO(const TF_SISO &siso)"
        );
        assert_eq!(decode_html_entities("&lt;T&gt; &quot;x&quot;"), "<T> \"x\"");
        assert_eq!(decode_html_entities("a&#160;b"), "a\u{a0}b");
        assert_eq!(decode_html_entities("a&#x41;"), "aA");
        assert_eq!(decode_html_entities("R&D; x & y"), "R&D; x & y");
    }

    #[test]
    fn test_owning_scope() {
        let link = |scope: &str| LinkEntry {
            target: DocTarget::from_url("../x.html"),
            flag: 1,
            scope: scope.to_string(),
        };
        assert_eq!(link("sun::TF_SISO::setTs()").owning_scope("setTs"), "sun::TF_SISO");
        assert_eq!(link("sun::TF_SISO::ts_()").owning_scope("Ts_"), "sun::TF_SISO");
        assert_eq!(
            link("sun::TF_MIMO_DIAGONAL::setSISO(unsigned int index_diag, const TF_SISO &siso)")
                .owning_scope("setSISO"),
            "sun::TF_MIMO_DIAGONAL"
        );
        assert_eq!(link("sun::RK4").owning_scope("Ts_2_"), "sun::RK4");
        assert_eq!(link("sun::SS").owning_scope("SS"), "sun");
        assert_eq!(
            link("SUN_COLORS():\u{a0}Discrete_System_Interface.h").owning_scope("SUN_COLORS"),
            "Discrete_System_Interface.h"
        );
        assert_eq!(link("").owning_scope("sun"), "");
    }

    #[test]
    fn test_target_kinds() {
        let member = DocTarget::from_url("../classsun_1_1RK4.html#a0341c9c8");
        assert_eq!(member.kind, TargetKind::Member);
        assert_eq!(member.page, "classsun_1_1RK4.html");
        assert_eq!(member.anchor.as_deref(), Some("a0341c9c8"));
        assert_eq!(member.url(), "classsun_1_1RK4.html#a0341c9c8");

        let cases = [
            ("../classsun_1_1RK4.html", TargetKind::Class),
            ("../structsun_1_1Foo.html", TargetKind::Struct),
            ("../namespacesun.html", TargetKind::Namespace),
            ("../TF__SISO_8h.html", TargetKind::File),
            ("../md_sun_systems_lib_README.html", TargetKind::Page),
            ("../index.html", TargetKind::Other),
        ];
        for (url, kind) in cases {
            assert_eq!(DocTarget::from_url(url).kind, kind, "{url}");
        }
    }
}
