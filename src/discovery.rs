use tracing::{info, warn};

use crate::browser::Browser;
use crate::config::DiscoverySettings;
use crate::domain::InstrumentId;
use crate::error::CatalogError;

/// Opens the search page, selects the fund category, asks for the full listing
/// and scrapes every instrument id linked from it.
///
/// The browser session is closed before returning, on failure as well.
pub fn discover_instrument_ids<B: Browser>(
    browser: &mut B,
    settings: &DiscoverySettings,
) -> Result<Vec<InstrumentId>, CatalogError> {
    let result = scrape_listing(browser, settings);
    browser.close();
    let ids = result?;
    info!(count = ids.len(), "instrument ids scraped");
    Ok(ids)
}

fn scrape_listing<B: Browser>(
    browser: &mut B,
    settings: &DiscoverySettings,
) -> Result<Vec<InstrumentId>, CatalogError> {
    browser.open(&settings.search_url)?;
    // The listing link is only rendered once the category postback has completed.
    browser.click(&settings.category_link)?;
    browser.click(&settings.full_listing_link)?;

    let hrefs = browser.anchor_hrefs(&settings.id_link)?;
    Ok(hrefs.iter().filter_map(|href| id_from_href(href)).collect())
}

/// Value after the first `=` of the link, minus one leading `'0'`.
/// Links whose value normalizes to nothing are skipped.
pub fn id_from_href(href: &str) -> Option<InstrumentId> {
    let (_, value) = href.split_once('=')?;
    let id = InstrumentId::from_listing_value(value);
    if id.is_none() {
        warn!(%href, "listing link carries no instrument id, skipping");
    }
    id
}
