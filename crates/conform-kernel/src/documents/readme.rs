//! README heading extraction.
//!
//! Only depth 1 and depth 2 headings are kept; deeper headings are section
//! detail and never part of the layout conventions.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub depth: u8,
    pub text: String,
    /// Byte range of the heading's source fragment.
    pub span: Range<usize>,
}

impl Heading {
    pub fn raw<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.span.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readme {
    pub source: String,
    pub headings: Vec<Heading>,
}

fn depth_of(level: HeadingLevel) -> Option<u8> {
    match level {
        HeadingLevel::H1 => Some(1),
        HeadingLevel::H2 => Some(2),
        _ => None,
    }
}

impl Readme {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let headings = extract_headings(&source);
        Self { source, headings }
    }

    /// Headings of one depth, in document order.
    pub fn at_depth(&self, depth: u8) -> impl Iterator<Item = &Heading> {
        self.headings.iter().filter(move |heading| heading.depth == depth)
    }

    /// Source text strictly between the end of heading `a` and the start of
    /// heading `b`.
    pub fn between(&self, a: usize, b: usize) -> Option<&str> {
        let start = self.headings.get(a)?.span.end;
        let end = self.headings.get(b)?.span.start;
        if start > end {
            return None;
        }
        self.source.get(start..end)
    }
}

pub fn extract_headings(source: &str) -> Vec<Heading> {
    let mut out = Vec::new();
    let mut open: Option<(u8, Range<usize>, String)> = None;

    for (event, range) in Parser::new(source).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                open = depth_of(level).map(|depth| (depth, range, String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((depth, span, text)) = open.take() {
                    out.push(Heading {
                        depth,
                        text: text.trim().to_string(),
                        span,
                    });
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, buf)) = open.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, _, buf)) = open.as_mut() {
                    buf.push(' ');
                }
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# @gramex/charts

Charts for Gramex.

## Example

### Detail

## Installation

Install via `npm`.

## `API` reference
";

    #[test]
    fn keeps_depth_one_and_two_in_order() {
        let readme = Readme::parse(SAMPLE);
        let summary: Vec<(u8, &str)> = readme
            .headings
            .iter()
            .map(|heading| (heading.depth, heading.text.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "@gramex/charts"),
                (2, "Example"),
                (2, "Installation"),
                (2, "API reference"),
            ]
        );
    }

    #[test]
    fn spans_cover_raw_fragment() {
        let readme = Readme::parse(SAMPLE);
        assert!(readme.headings[0].raw(&readme.source).starts_with("# @gramex/charts"));
        assert!(readme.headings[1].raw(&readme.source).starts_with("## Example"));
        let gap = readme.between(0, 1).expect("first two headings exist");
        assert!(gap.contains("Charts for Gramex."));
        assert!(readme.between(0, 9).is_none());
    }

    #[test]
    fn setext_headings_count() {
        let readme = Readme::parse("Title\n=====\n\nSection\n-------\n");
        assert_eq!(readme.headings.len(), 2);
        assert_eq!(readme.headings[0].depth, 1);
        assert_eq!(readme.headings[1].text, "Section");
    }
}
