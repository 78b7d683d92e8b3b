//! Content-based format detection.
//!
//! A file is sniffed by what it contains, never by its extension. The input
//! is parsed once into a [`Probe`] and then run through an ordered list of
//! predicates; the first one that matches decides the dialect.
use std::{borrow::Cow, fmt};

use log::{debug, trace};
use scraper::{ElementRef, Html, Node};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bookmark export dialects this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// Anybox JSON: a JSON array of full bookmark objects
    #[serde(rename = "anybox")]
    AnyboxJson,
    /// Anybox HTML: flat Netscape list with a `tags` attribute, no folders
    #[serde(rename = "anybox-html")]
    AnyboxHtml,
    /// Firefox HTML: folder hierarchy with per-link `add_date`
    #[serde(rename = "firefox")]
    Firefox,
    /// Safari HTML: folder hierarchy without per-link timestamps
    #[serde(rename = "safari")]
    Safari,
}

impl Dialect {
    /// Detection priority. The first matching dialect wins.
    pub const PRIORITY: [Dialect; 4] = [
        Dialect::AnyboxJson,
        Dialect::AnyboxHtml,
        Dialect::Firefox,
        Dialect::Safari,
    ];

    /// Source label recorded on imported bookmarks.
    pub fn label(self) -> &'static str {
        match self {
            Dialect::AnyboxJson => "anybox",
            Dialect::AnyboxHtml => "anybox-html",
            Dialect::Firefox => "firefox",
            Dialect::Safari => "safari",
        }
    }

    /// Whether `probe` carries this dialect's fingerprint.
    pub fn matches(self, probe: &Probe) -> bool {
        match self {
            Dialect::AnyboxJson => is_anybox_json(probe),
            Dialect::AnyboxHtml => is_anybox_html(probe),
            Dialect::Firefox => is_firefox(probe),
            Dialect::Safari => is_safari(probe),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields whose presence on the first array element marks Anybox JSON.
const ANYBOX_MARKER_FIELDS: [&str; 3] = ["isStarred", "keyword", "tags"];

const NETSCAPE_DOCTYPE_MARKER: &str = "netscape-bookmark-file";

/// Structural facts gathered from an HTML document in a single walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlMarkers {
    /// Some anchor carries a `tags` attribute
    pub has_tags_attribute: bool,
    /// Some `h3` folder heading exists
    pub has_folder_heading: bool,
    /// Some anchor carries an `add_date` attribute
    pub has_add_date: bool,
    /// Some `h1` reads "bookmarks" (case-insensitive)
    pub has_bookmarks_title: bool,
    /// The Netscape bookmark doctype (or a comment naming it) is present
    pub has_netscape_doctype: bool,
}

impl HtmlMarkers {
    /// Collects markers from a parsed document.
    pub fn scan(document: &Html) -> Self {
        let mut markers = HtmlMarkers::default();

        for node in document.tree.root().descendants() {
            match node.value() {
                Node::Doctype(doctype) => {
                    if doctype.name().to_ascii_lowercase().contains(NETSCAPE_DOCTYPE_MARKER) {
                        markers.has_netscape_doctype = true;
                    }
                }
                Node::Comment(comment) => {
                    if comment.to_ascii_lowercase().contains(NETSCAPE_DOCTYPE_MARKER) {
                        markers.has_netscape_doctype = true;
                    }
                }
                Node::Element(element) => match element.name() {
                    // html5ever lowercases attribute names, so `ADD_DATE`
                    // and `add_date` both land here.
                    "a" => {
                        markers.has_tags_attribute |= element.attr("tags").is_some();
                        markers.has_add_date |= element.attr("add_date").is_some();
                    }
                    "h3" => markers.has_folder_heading = true,
                    "h1" => {
                        if let Some(heading) = ElementRef::wrap(node) {
                            let text: String = heading.text().collect();
                            if text.trim().eq_ignore_ascii_case("bookmarks") {
                                markers.has_bookmarks_title = true;
                            }
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        trace!("HTML markers: {:?}", markers);
        markers
    }
}

/// A byte stream decoded as far as detection needs.
///
/// Input that decodes as a JSON array gets only the JSON view; anything
/// else is read as HTML. Every predicate sees the full input regardless of
/// which ones ran before it.
#[derive(Debug, Default)]
pub struct Probe {
    /// First element of a top-level JSON array, if the input is one
    json_first_element: Option<Value>,
    /// Whether the input decoded as a JSON array at all
    is_json_array: bool,
    /// Markers from the HTML view, absent for JSON input
    html: Option<HtmlMarkers>,
}

impl Probe {
    /// Decodes `bytes` as a JSON array, or failing that as an HTML document.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected, so one
    /// stray byte in a title does not hide the document's structure.
    pub fn new(bytes: &[u8]) -> Self {
        let mut probe = Probe::default();

        if let Ok(elements) = serde_json::from_slice::<Vec<Value>>(bytes) {
            probe.is_json_array = true;
            probe.json_first_element = elements.into_iter().next();
            return probe;
        }

        let text = String::from_utf8_lossy(bytes);
        if let Cow::Owned(_) = text {
            debug!("Input is not valid UTF-8, replacing invalid sequences");
        }
        probe.html = Some(HtmlMarkers::scan(&Html::parse_document(&text)));

        probe
    }

    /// First JSON array element as a field map, if it is an object.
    pub fn json_fields(&self) -> Option<&Map<String, Value>> {
        self.json_first_element.as_ref()?.as_object()
    }

    pub fn is_json_array(&self) -> bool {
        self.is_json_array
    }

    pub fn html_markers(&self) -> Option<&HtmlMarkers> {
        self.html.as_ref()
    }
}

fn is_anybox_json(probe: &Probe) -> bool {
    probe
        .json_fields()
        .is_some_and(|fields| ANYBOX_MARKER_FIELDS.iter().any(|f| fields.contains_key(*f)))
}

fn is_anybox_html(probe: &Probe) -> bool {
    probe
        .html_markers()
        .is_some_and(|m| m.has_tags_attribute && !m.has_folder_heading)
}

fn is_firefox(probe: &Probe) -> bool {
    probe.html_markers().is_some_and(|m| m.has_add_date)
}

/// Safari shares Firefox's skeleton; only the absence of `add_date` on
/// every anchor tells them apart.
fn is_safari(probe: &Probe) -> bool {
    probe.html_markers().is_some_and(|m| {
        (m.has_bookmarks_title || m.has_netscape_doctype) && !m.has_add_date
    })
}

/// Classifies an already-parsed probe.
pub fn classify(probe: &Probe) -> Option<Dialect> {
    Dialect::PRIORITY
        .into_iter()
        .find(|dialect| dialect.matches(probe))
}

/// Detects the dialect of a bookmark export.
///
/// Returns `None` when nothing matches; callers treat that as a skippable
/// classification, not an error.
pub fn detect(bytes: &[u8]) -> Option<Dialect> {
    let dialect = classify(&Probe::new(bytes));
    match dialect {
        Some(d) => debug!("Detected {} format", d),
        None => debug!("No known bookmark format detected"),
    }
    dialect
}
