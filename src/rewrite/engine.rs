//! Insertion point search and splicing.
//!
//! Insertion points come from a single linear regex scan, not an HTML
//! parser. The first match in document order wins, even when it sits in a
//! script literal or follows a malformed structure.

use std::sync::{Arc, LazyLock};

use axum::body::Bytes;
use regex::bytes::Regex;

/// First `<body ...>` start tag, any case, attributes and newlines allowed.
static BODY_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is-u)<\s*body[^>]*>").expect("body-open pattern is valid"));

/// First `</head>` close tag, whitespace allowed around the slash.
static HEAD_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is-u)<\s*/\s*head[^>]*>").expect("head-close pattern is valid"));

/// Where a marker goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Right after the closing `>` of the first body-open tag.
    BodyBeacon,
    /// Right before the `<` of the first head-close tag.
    HeadScript,
}

impl MarkerKind {
    /// Byte offset at which this marker would be inserted into `document`.
    pub fn locate(&self, document: &[u8]) -> Option<usize> {
        match self {
            MarkerKind::BodyBeacon => BODY_OPEN.find(document).map(|m| m.end()),
            MarkerKind::HeadScript => HEAD_CLOSE.find(document).map(|m| m.start()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::BodyBeacon => "body_beacon",
            MarkerKind::HeadScript => "head_script",
        }
    }
}

/// A pre-rendered fragment and the place it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionMarker {
    kind: MarkerKind,
    markup: Arc<str>,
}

impl InjectionMarker {
    pub fn new(kind: MarkerKind, markup: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            markup: markup.into(),
        }
    }

    pub fn kind(&self) -> MarkerKind {
        self.kind
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }
}

/// Result of applying markers to a document.
#[derive(Debug, Clone)]
pub struct Injection {
    pub document: Bytes,
    /// Markers that found their insertion point, in application order.
    pub applied: Vec<MarkerKind>,
}

/// Apply `markers` in order. Each one is located in the output of the
/// previous splice; a marker whose tag is missing is skipped.
pub fn inject(document: Bytes, markers: &[InjectionMarker]) -> Injection {
    let mut document = document;
    let mut applied = Vec::with_capacity(markers.len());

    for marker in markers {
        match marker.kind.locate(&document) {
            Some(offset) => {
                document = Bytes::from(splice(&document, offset, marker.markup.as_bytes()));
                applied.push(marker.kind);
            }
            None => {
                tracing::debug!(marker = marker.kind.as_str(), "Insertion point not found");
            }
        }
    }

    Injection { document, applied }
}

fn splice(document: &[u8], offset: usize, insert: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(document.len() + insert.len());
    out.extend_from_slice(&document[..offset]);
    out.extend_from_slice(insert);
    out.extend_from_slice(&document[offset..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> [InjectionMarker; 2] {
        [
            InjectionMarker::new(MarkerKind::BodyBeacon, "[beacon]"),
            InjectionMarker::new(MarkerKind::HeadScript, "[script]"),
        ]
    }

    fn run(document: &'static str) -> Injection {
        inject(Bytes::from_static(document.as_bytes()), &markers())
    }

    #[test]
    fn test_both_insertions() {
        let out = run("<html><head></head><body>hi</body></html>");
        assert_eq!(
            out.document,
            "<html><head>[script]</head><body>[beacon]hi</body></html>"
        );
        assert_eq!(out.applied, vec![MarkerKind::BodyBeacon, MarkerKind::HeadScript]);
    }

    #[test]
    fn test_body_with_attributes_across_lines() {
        let out = run("<head></head>\n<BODY class=\"home\"\n  data-x=\"1\">text</BODY>");
        assert_eq!(
            out.document,
            "<head>[script]</head>\n<BODY class=\"home\"\n  data-x=\"1\">[beacon]text</BODY>"
        );
    }

    #[test]
    fn test_head_close_with_whitespace() {
        let out = run("<head>< / HEAD ><body></body>");
        assert_eq!(out.document, "<head>[script]< / HEAD ><body>[beacon]</body>");
    }

    #[test]
    fn test_missing_body_only_head_injected() {
        let out = run("<html><head><title>t</title></head>no body tag</html>");
        assert_eq!(
            out.document,
            "<html><head><title>t</title>[script]</head>no body tag</html>"
        );
        assert_eq!(out.applied, vec![MarkerKind::HeadScript]);
    }

    #[test]
    fn test_missing_head_only_body_injected() {
        let out = run("<body>x</body>");
        assert_eq!(out.document, "<body>[beacon]x</body>");
        assert_eq!(out.applied, vec![MarkerKind::BodyBeacon]);
    }

    #[test]
    fn test_no_tags_unchanged() {
        let out = run("plain text");
        assert_eq!(out.document, "plain text");
        assert!(out.applied.is_empty());

        let out = run("");
        assert!(out.document.is_empty());
    }

    #[test]
    fn test_first_match_wins() {
        let out = run("<head></head><body id=1><body id=2></head>");
        assert_eq!(
            out.document,
            "<head>[script]</head><body id=1>[beacon]<body id=2></head>"
        );
    }

    #[test]
    fn test_head_located_after_body_splice() {
        let markers = [
            InjectionMarker::new(MarkerKind::BodyBeacon, "</head>"),
            InjectionMarker::new(MarkerKind::HeadScript, "[script]"),
        ];
        let out = inject(Bytes::from_static(b"<body></body>"), &markers);
        assert_eq!(out.document, "<body>[script]</head></body>");
    }

    #[test]
    fn test_body_after_head_close_in_malformed_document() {
        let out = run("</head><body>");
        assert_eq!(out.document, "[script]</head><body>[beacon]");
    }

    #[test]
    fn test_non_utf8_bytes_preserved() {
        let document = Bytes::from_static(b"<head>\xe9</head><body>\xff</body>");
        let out = inject(document, &markers());
        assert_eq!(&out.document[..], &b"<head>\xe9[script]</head><body>[beacon]\xff</body>"[..]);

        let document = Bytes::from_static(b"<body data-x=\"\xff\">");
        let out = inject(document, &markers());
        assert_eq!(&out.document[..], &b"<body data-x=\"\xff\">[beacon]"[..]);
    }
}
