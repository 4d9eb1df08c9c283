//! Result rows and query highlighting.

use crate::catalog::CatalogRecord;
use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// A piece of text with at most one emphasized span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
    pub text: String,
    /// Byte range of the emphasized match within `text`
    pub emphasis: Option<Range<usize>>,
}

impl Highlighted {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: None,
        }
    }

    /// The emphasized part, if any.
    pub fn emphasized(&self) -> Option<&str> {
        self.emphasis.clone().map(|range| &self.text[range])
    }

    /// Splits the text into `(segment, is_emphasized)` pairs, skipping empty segments.
    pub fn segments(&self) -> Vec<(&str, bool)> {
        let Some(range) = self.emphasis.clone() else {
            return vec![(self.text.as_str(), false)];
        };
        [
            (&self.text[..range.start], false),
            (&self.text[range.clone()], true),
            (&self.text[range.end..], false),
        ]
        .into_iter()
        .filter(|(segment, _)| !segment.is_empty())
        .collect()
    }

    fn write_html(&self, out: &mut String) {
        for (segment, emphasized) in self.segments() {
            if emphasized {
                out.push_str("<b>");
                push_escaped(out, segment);
                out.push_str("</b>");
            } else {
                push_escaped(out, segment);
            }
        }
    }
}

/// One rendered search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub id: u32,
    /// Styling tag, copied from the record
    pub classes: String,
    /// Base url joined with the record url
    pub href: String,
    /// Label of the record's kind, when the catalog names it
    pub kind: Option<String>,
    /// Enclosing scope, rendered as a `parent.` prefix
    pub parent: Option<Highlighted>,
    pub name: Highlighted,
}

impl ResultRow {
    /// The label as plain text, e.g. `Widget.render`.
    pub fn label(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}.{}", parent.text, self.name.text),
            None => self.name.text.clone(),
        }
    }

    /// Render the row as a list item.
    ///
    /// ```text
    /// <li class="tsd-kind-method"><a href="b.html" class="tsd-kind-icon"><span class="parent"><b>Widget</b>.</span>render</a></li>
    /// ```
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<li class=\"");
        push_escaped(&mut out, &self.classes);
        out.push_str("\"><a href=\"");
        push_escaped(&mut out, &self.href);
        out.push_str("\" class=\"tsd-kind-icon\">");
        if let Some(parent) = &self.parent {
            out.push_str("<span class=\"parent\">");
            parent.write_html(&mut out);
            out.push_str(".</span>");
        }
        self.name.write_html(&mut out);
        out.push_str("</a></li>");
        out
    }
}

/// Marks the first case-insensitive occurrence of the query in a piece of text.
#[derive(Debug)]
pub(crate) struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// The query is matched literally; regex metacharacters carry no meaning.
    pub(crate) fn new(query: &str) -> Self {
        let pattern = if query.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(query))
                .case_insensitive(true)
                .build()
                .inspect_err(|e| tracing::warn!("Cannot highlight query '{}': {}", query, e))
                .ok()
        };
        Self { pattern }
    }

    pub(crate) fn apply(&self, text: &str) -> Highlighted {
        let emphasis = self
            .pattern
            .as_ref()
            .and_then(|pattern| pattern.find(text))
            .map(|found| found.range());
        Highlighted {
            text: text.to_string(),
            emphasis,
        }
    }

    /// Build the row for a record.
    pub(crate) fn row(&self, record: &CatalogRecord, base_url: &str, kind: Option<&str>) -> ResultRow {
        ResultRow {
            id: record.id,
            classes: record.classes.clone(),
            href: format!("{}{}", base_url, record.url),
            kind: kind.map(str::to_string),
            parent: record
                .parent
                .as_deref()
                .filter(|parent| !parent.is_empty())
                .map(|parent| self.apply(parent)),
            name: self.apply(&record.name),
        }
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    fn record(name: &str, parent: Option<&str>) -> CatalogRecord {
        CatalogRecord {
            id: 2,
            kind: 1,
            name: name.to_string(),
            url: "b.html".to_string(),
            classes: "tsd-kind-method".to_string(),
            parent: parent.map(str::to_string),
        }
    }

    #[rstest]
    #[case("wid", "Widget", Some("Wid"))]
    #[case("WID", "Widget", Some("Wid"))]
    #[case("get", "getWidget", Some("get"))]
    #[case("x", "Widget", None)]
    #[case("a.b", "aXb", None)]
    #[case("a.b", "the a.b path", Some("a.b"))]
    fn test_highlight_first_occurrence(
        #[case] query: &str,
        #[case] text: &str,
        #[case] expected: Option<&str>,
    ) {
        check!(Highlighter::new(query).apply(text).emphasized() == expected);
    }

    #[test]
    fn test_parent_and_name_highlighted_independently() {
        let row = Highlighter::new("wid").row(&record("render", Some("Widget")), "", None);
        check!(row.parent.as_ref().and_then(Highlighted::emphasized) == Some("Wid"));
        check!(row.name.emphasized().is_none());
        check!(row.label() == "Widget.render");
    }

    #[test]
    fn test_href_joins_base_url() {
        let row = Highlighter::new("r").row(&record("render", None), "/docs/", Some("Method"));
        check!(row.href == "/docs/b.html");
        check!(row.kind.as_deref() == Some("Method"));
    }

    #[test]
    fn test_to_html() {
        let row = Highlighter::new("wid").row(&record("render", Some("Widget")), "", None);
        check!(
            row.to_html()
                == "<li class=\"tsd-kind-method\"><a href=\"b.html\" class=\"tsd-kind-icon\"><span class=\"parent\"><b>Wid</b>get.</span>render</a></li>"
        );
    }

    #[test]
    fn test_to_html_escapes_text() {
        let row = Highlighter::new("lt").row(&record("lt<T>", None), "", None);
        check!(row.to_html().contains("<b>lt</b>&lt;T&gt;"));
    }

    #[test]
    fn test_segments() {
        let highlighted = Highlighter::new("dg").apply("Widget");
        check!(highlighted.segments() == vec![("Wi", false), ("dg", true), ("et", false)]);
        check!(Highlighted::plain("x").segments() == vec![("x", false)]);
    }
}
