use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::CatalogError;

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\shref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("anchor regex")
});
static POSTBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^javascript:\s*__doPostBack\(\s*'([^']*)'\s*,\s*'([^']*)'\s*\)"#)
        .expect("postback regex")
});
static INPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<input\b[^>]*>").expect("input regex"));
static FORM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<form\b[^>]*>").expect("form regex"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)(?:^|\s)([^\s"'=<>/]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("attribute regex")
});

/// The page-automation primitive discovery drives.
///
/// Every call blocks until the navigation it triggers has settled.
pub trait Browser {
    fn open(&mut self, url: &str) -> Result<(), CatalogError>;
    /// Follows the first anchor whose href contains `href_fragment`.
    fn click(&mut self, href_fragment: &str) -> Result<(), CatalogError>;
    /// Hrefs of every anchor containing `href_fragment`, in page order.
    fn anchor_hrefs(&self, href_fragment: &str) -> Result<Vec<String>, CatalogError>;
    fn close(&mut self);
}

#[derive(Debug, Clone)]
struct Page {
    url: Url,
    html: String,
}

/// Drives ASP.NET WebForms pages over plain HTTP.
///
/// `javascript:__doPostBack(target, argument)` links are emulated by posting the
/// page form with its hidden state fields, which is what the browser would do.
pub struct HttpBrowser {
    client: Client,
    page: Option<Page>,
}

impl HttpBrowser {
    pub fn new(timeout_secs: u64) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("fund-catalog/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CatalogError::Navigation(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|err| CatalogError::Navigation(err.to_string()))?;
        Ok(Self { client, page: None })
    }

    fn current_page(&self) -> Result<&Page, CatalogError> {
        self.page
            .as_ref()
            .ok_or_else(|| CatalogError::Navigation("no page is open".to_string()))
    }

    fn load(response: Result<Response, reqwest::Error>) -> Result<Page, CatalogError> {
        let response = response.map_err(|err| CatalogError::Navigation(err.to_string()))?;
        let status = response.status();
        let url = response.url().clone();
        let html = response
            .text()
            .map_err(|err| CatalogError::Navigation(err.to_string()))?;
        if !status.is_success() {
            return Err(CatalogError::NavigationStatus {
                status: status.as_u16(),
                message: format!("{url}"),
            });
        }
        debug!(%url, bytes = html.len(), "page loaded");
        Ok(Page { url, html })
    }
}

impl Browser for HttpBrowser {
    fn open(&mut self, url: &str) -> Result<(), CatalogError> {
        let page = Self::load(self.client.get(url).send())?;
        self.page = Some(page);
        Ok(())
    }

    fn click(&mut self, href_fragment: &str) -> Result<(), CatalogError> {
        let page = self.current_page()?;
        let href = anchor_hrefs_in(&page.html)
            .into_iter()
            .find(|href| href.contains(href_fragment))
            .ok_or_else(|| CatalogError::MissingControl(href_fragment.to_string()))?;

        let next = match parse_postback(&href) {
            Some((target, argument)) => {
                let action = match form_action(&page.html) {
                    Some(action) => page
                        .url
                        .join(&action)
                        .map_err(|err| CatalogError::Navigation(err.to_string()))?,
                    None => page.url.clone(),
                };
                let fields = postback_fields(&page.html, &target, &argument);
                debug!(%action, %target, %argument, "posting back");
                Self::load(self.client.post(action).form(&fields).send())?
            }
            None => {
                let url = page
                    .url
                    .join(&href)
                    .map_err(|err| CatalogError::Navigation(err.to_string()))?;
                Self::load(self.client.get(url).send())?
            }
        };
        self.page = Some(next);
        Ok(())
    }

    fn anchor_hrefs(&self, href_fragment: &str) -> Result<Vec<String>, CatalogError> {
        let page = self.current_page()?;
        let page_url = &page.url;
        Ok(anchor_hrefs_in(&page.html)
            .into_iter()
            .filter(|href| href.contains(href_fragment))
            .map(|href| match page_url.join(&href) {
                Ok(absolute) if !href.starts_with("javascript:") => absolute.to_string(),
                _ => href,
            })
            .collect())
    }

    fn close(&mut self) {
        self.page = None;
    }
}

/// Decoded href of every anchor, in document order.
pub fn anchor_hrefs_in(html: &str) -> Vec<String> {
    ANCHOR_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|value| decode_entities(value.as_str()))
        .collect()
}

pub fn parse_postback(href: &str) -> Option<(String, String)> {
    let caps = POSTBACK_RE.captures(href.trim())?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Name/value pairs of the page's hidden inputs plus the postback event fields.
pub fn postback_fields(html: &str, target: &str, argument: &str) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = INPUT_RE
        .find_iter(html)
        .map(|tag| tag.as_str())
        .filter(|tag| {
            attribute(tag, "type")
                .map(|kind| kind.eq_ignore_ascii_case("hidden"))
                .unwrap_or(false)
        })
        .filter_map(|tag| {
            let name = attribute(tag, "name")?;
            Some((name, attribute(tag, "value").unwrap_or_default()))
        })
        .filter(|(name, _)| name != "__EVENTTARGET" && name != "__EVENTARGUMENT")
        .collect();
    fields.push(("__EVENTTARGET".to_string(), target.to_string()));
    fields.push(("__EVENTARGUMENT".to_string(), argument.to_string()));
    fields
}

pub fn form_action(html: &str) -> Option<String> {
    let tag = FORM_RE.find(html)?;
    attribute(tag.as_str(), "action").filter(|action| !action.is_empty())
}

fn attribute(tag: &str, name: &str) -> Option<String> {
    ATTR_RE
        .captures_iter(tag)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4)))
        .map(|value| decode_entities(value.as_str()))
}

pub fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
