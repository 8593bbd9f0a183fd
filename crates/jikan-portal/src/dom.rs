//! In-memory page model.
//!
//! A [`Document`] is the set of identified elements of one loaded page, the
//! page location, and the alerts raised while it was open. Controllers only
//! ever replace an element's whole content; they never patch it.
//!
//! Each element also carries a request counter. A render started with
//! [`Document::begin_request`] may only write if no later request has been
//! issued for the same element, so overlapping fetches resolve as
//! last-request-wins regardless of completion order.

use scraper::{ElementRef, Html};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;
use url::Url;

/// Elements that never carry content
const VOID_TAGS: &[&str] = &["input", "img", "br", "hr", "meta", "link"];

/// Page location: path plus decoded query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    params: Vec<(String, String)>,
}

impl Location {
    /// Parse a location such as `/anime-details.html?animeId=5114`
    ///
    /// Relative input is resolved against the site root; unparseable input
    /// is treated as the root page.
    pub fn parse(location: &str) -> Self {
        let parsed = Url::parse("http://localhost/")
            .and_then(|root| root.join(location));

        match parsed {
            Ok(url) => Self {
                path: url.path().to_string(),
                params: url
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            },
            Err(_) => Self::default(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a query parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl Default for Location {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            params: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Element {
    id: String,
    tag: String,
    html: String,
    latest_request: u64,
}

#[derive(Debug)]
struct PageState {
    location: Location,
    elements: Vec<Element>,
    index: HashMap<String, usize>,
    alerts: Vec<String>,
}

impl PageState {
    fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        let idx = *self.index.get(id)?;
        self.elements.get_mut(idx)
    }
}

/// Ticket for one render into one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    element: String,
    seq: u64,
}

impl RequestToken {
    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Shared handle to one loaded page
#[derive(Debug, Clone)]
pub struct Document {
    state: Arc<Mutex<PageState>>,
    changes: Arc<watch::Sender<u64>>,
}

impl Document {
    /// Build a page from element ids in document order; tags default to `div`
    pub fn new<I, S>(location: Location, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_elements(
            location,
            ids.into_iter().map(|id| Element {
                id: id.into(),
                tag: "div".to_string(),
                html: String::new(),
                latest_request: 0,
            }),
        )
    }

    /// Build a page from an HTML template; every element with an `id` becomes addressable
    pub fn from_html(html: &str, location: Location) -> Self {
        let parsed = Html::parse_document(html);

        let elements: Vec<Element> = parsed
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter_map(|el| {
                let id = el.value().id()?;
                Some(Element {
                    id: id.to_string(),
                    tag: el.value().name().to_string(),
                    html: el.inner_html().trim().to_string(),
                    latest_request: 0,
                })
            })
            .collect();

        debug!(elements = elements.len(), path = location.path(), "Page loaded");
        Self::from_elements(location, elements)
    }

    fn from_elements(location: Location, elements: impl IntoIterator<Item = Element>) -> Self {
        let mut state = PageState {
            location,
            elements: Vec::new(),
            index: HashMap::new(),
            alerts: Vec::new(),
        };

        for element in elements {
            // First element wins for duplicate ids, like getElementById
            if !state.index.contains_key(&element.id) {
                state.index.insert(element.id.clone(), state.elements.len());
                state.elements.push(element);
            }
        }

        let (changes, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(state)),
            changes: Arc::new(changes),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }

    pub fn location(&self) -> Location {
        self.lock().location.clone()
    }

    /// True if the page declares an element with this id
    pub fn has(&self, id: &str) -> bool {
        self.lock().index.contains_key(id)
    }

    /// Current inner markup of an element
    pub fn html(&self, id: &str) -> Option<String> {
        let state = self.lock();
        let idx = *state.index.get(id)?;
        state.elements.get(idx).map(|el| el.html.clone())
    }

    /// Replace an element's content unconditionally; false if the element is absent
    pub fn set_html(&self, id: &str, html: impl Into<String>) -> bool {
        let written = match self.lock().element_mut(id) {
            Some(element) => {
                element.html = html.into();
                true
            }
            None => false,
        };

        if written {
            self.notify();
        }
        written
    }

    /// Issue a new request token for an element, superseding earlier ones
    pub fn begin_request(&self, id: &str) -> Option<RequestToken> {
        let mut state = self.lock();
        let element = state.element_mut(id)?;
        element.latest_request += 1;

        Some(RequestToken {
            element: id.to_string(),
            seq: element.latest_request,
        })
    }

    /// True if no request was issued for the element after this token
    pub fn is_current(&self, token: &RequestToken) -> bool {
        let state = self.lock();
        state
            .index
            .get(&token.element)
            .and_then(|&idx| state.elements.get(idx))
            .is_some_and(|el| el.latest_request == token.seq)
    }

    /// Replace the element's content if the token is still the latest one
    ///
    /// Returns false, leaving the element untouched, for a superseded token.
    pub fn apply(&self, token: &RequestToken, html: impl Into<String>) -> bool {
        let applied = match self.lock().element_mut(&token.element) {
            Some(element) if element.latest_request == token.seq => {
                element.html = html.into();
                true
            }
            _ => false,
        };

        if applied {
            self.notify();
        } else {
            debug!(
                element = %token.element,
                token = token.seq,
                "Discarding stale render"
            );
        }
        applied
    }

    /// Raise a blocking user-facing alert
    pub fn alert(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(message = %message, "Alert raised");
        self.lock().alerts.push(message);
        self.notify();
    }

    pub fn alerts(&self) -> Vec<String> {
        self.lock().alerts.clone()
    }

    /// Watch for content changes; the value is a change counter
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Serialize every element, in document order, as `<tag id="...">content</tag>`
    pub fn to_html(&self) -> String {
        let state = self.lock();
        state
            .elements
            .iter()
            .map(|el| {
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    format!("<{} id=\"{}\" />", el.tag, el.id)
                } else {
                    format!("<{tag} id=\"{}\">{}</{tag}>", el.id, el.html, tag = el.tag)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <input id="searchBox" type="text" />
    <section id="anime-list"><p>Static</p></section>
    <div id="anime-list">duplicate</div>
    <div class="no-id"><span id="genre-title">Genres</span></div>
  </body>
</html>"#;

    #[test]
    fn test_from_html_collects_ids() {
        let doc = Document::from_html(PAGE, Location::default());
        assert!(doc.has("searchBox"));
        assert!(doc.has("anime-list"));
        assert!(doc.has("genre-title"));
        assert!(!doc.has("anime-yearly"));
        assert_eq!(doc.html("anime-list").as_deref(), Some("<p>Static</p>"));
        assert_eq!(doc.html("genre-title").as_deref(), Some("Genres"));
    }

    #[test]
    fn test_location_params() {
        let location = Location::parse("/anime-details.html?animeId=5114&x=a+b%26c");
        assert_eq!(location.path(), "/anime-details.html");
        assert_eq!(location.param("animeId"), Some("5114"));
        assert_eq!(location.param("x"), Some("a b&c"));
        assert_eq!(location.param("mangaId"), None);

        let relative = Location::parse("anime-details.html?animeId=1");
        assert_eq!(relative.path(), "/anime-details.html");
    }

    #[test]
    fn test_set_html_on_missing_element() {
        let doc = Document::new(Location::default(), ["anime-list"]);
        assert!(doc.set_html("anime-list", "<p>x</p>"));
        assert!(!doc.set_html("manga-list", "<p>x</p>"));
        assert_eq!(doc.html("manga-list"), None);
    }

    #[test]
    fn test_latest_request_wins() {
        let doc = Document::new(Location::default(), ["anime-list"]);
        let first = doc.begin_request("anime-list").unwrap();
        let second = doc.begin_request("anime-list").unwrap();

        assert!(!doc.is_current(&first));
        assert!(doc.apply(&second, "second"));
        assert!(!doc.apply(&first, "first"));
        assert_eq!(doc.html("anime-list").as_deref(), Some("second"));
    }

    #[test]
    fn test_tokens_are_per_element() {
        let doc = Document::new(Location::default(), ["anime-detail", "anime-characters"]);
        let detail = doc.begin_request("anime-detail").unwrap();
        let _characters = doc.begin_request("anime-characters").unwrap();

        assert!(doc.apply(&detail, "detail"));
        assert!(doc.begin_request("missing").is_none());
    }

    #[test]
    fn test_changes_are_observable() {
        let doc = Document::new(Location::default(), ["anime-list"]);
        let rx = doc.subscribe();
        doc.set_html("anime-list", "a");
        doc.alert("Please enter a valid 4-digit year.");
        assert_eq!(*rx.borrow(), 2);
        assert_eq!(doc.alerts(), vec!["Please enter a valid 4-digit year."]);
    }

    #[test]
    fn test_to_html_keeps_document_order() {
        let doc = Document::from_html(PAGE, Location::default());
        doc.set_html("anime-list", "<div class=\"anime-card\"></div>");

        let html = doc.to_html();
        assert_eq!(
            html,
            "<input id=\"searchBox\" />\n\
             <section id=\"anime-list\"><div class=\"anime-card\"></div></section>\n\
             <span id=\"genre-title\">Genres</span>"
        );
    }
}
