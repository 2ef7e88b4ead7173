//! Rendering of the injected fragments.
//!
//! Everything interpolated is escaped for where it lands: query values are
//! form-url-encoded, attribute values are HTML-escaped.

use std::sync::Arc;

use url::form_urlencoded;
use url::Url;

use crate::config::TrackingConfig;
use crate::identity::VisitorIdentity;
use crate::rewrite::engine::{InjectionMarker, MarkerKind};

/// Query parameter carrying the visitor identifier on the beacon URL.
pub const BEACON_VISITOR_PARAM: &str = "current_visitor_uuid";

/// Renders the body beacon per request and the head script once.
#[derive(Debug, Clone)]
pub struct MarkupBuilder {
    beacon_base: Url,
    head_script: Arc<str>,
}

impl MarkupBuilder {
    pub fn new(config: &TrackingConfig) -> Result<Self, url::ParseError> {
        let beacon_base = Url::parse(&config.beacon_base_url)?;
        let head_script = render_head_script(&config.site_slug, &config.integration_script_url);
        Ok(Self {
            beacon_base,
            head_script: head_script.into(),
        })
    }

    /// Beacon URL for `identity`, replacing any visitor parameter already on the base.
    pub fn beacon_url(&self, identity: &VisitorIdentity) -> String {
        let mut url = self.beacon_base.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(name, _)| name != BEACON_VISITOR_PARAM)
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(BEACON_VISITOR_PARAM, identity.as_str());
        url.into()
    }

    pub fn body_beacon(&self, identity: &VisitorIdentity) -> InjectionMarker {
        let src = escape_html(&self.beacon_url(identity));
        InjectionMarker::new(
            MarkerKind::BodyBeacon,
            format!("\n<img src=\"{src}\" style=\"position:absolute; left:-9999px;\" alt=\"\" />\n"),
        )
    }

    pub fn head_script(&self) -> InjectionMarker {
        InjectionMarker::new(MarkerKind::HeadScript, self.head_script.clone())
    }

    /// Both markers, body first.
    pub fn markers(&self, identity: &VisitorIdentity) -> [InjectionMarker; 2] {
        [self.body_beacon(identity), self.head_script()]
    }
}

fn render_head_script(site_slug: &str, integration_script_url: &str) -> String {
    let site_id: String = form_urlencoded::byte_serialize(site_slug.as_bytes()).collect();
    let src = escape_html(integration_script_url);
    format!(
        "\n<script>\n  window._talkableq = window._talkableq || [];\n  \
         _talkableq.push(['init', {{ site_id: '{site_id}' }}]);\n</script>\n\
         <script src=\"{src}\" type=\"text/javascript\"></script>\n"
    )
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
