//! Markup extraction rules for the storefront
//!
//! Pure functions from a parsed document to owned data. These selectors
//! are coupled to one site's layout:
//! - the top-nav menu with per-category dropdown columns
//! - the featured-departments box linking to a category's jersey listing
//! - product cards on a listing page
//! - breadcrumbs, size buttons, and detail/description boxes on a
//!   product page
//!
//! Extraction copies everything it needs out of the document; nothing
//! here holds onto the `Html` value.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A product page reference discovered on a listing page
#[derive(Debug, Clone)]
pub struct ProductLink {
    pub url: Url,

    /// Whether the listing card carried the jersey-assurance marker;
    /// carried along so the product handler need not re-derive it.
    pub jersey_assured: bool,
}

/// Product references extracted from a listing page
///
/// Cards lacking an image-anchor href yield no link; their indices are
/// reported so the caller can surface them through its observer.
#[derive(Debug, Default)]
pub struct ListingLinks {
    pub links: Vec<ProductLink>,
    pub cards_without_link: Vec<usize>,
}

/// Structured result of extracting one product page
#[derive(Debug, Clone, Default)]
pub struct ProductRecord {
    /// Identity parsed from the breadcrumb trail; 0 means unknown and
    /// storage assigns one.
    pub id: i64,
    pub breadcrumbs: Vec<String>,
    pub sizes: Vec<String>,
    pub detail: String,
    pub description: String,
}

/// Collects category dropdown links from the root menu
///
/// Only top-nav entries whose label is in the allow-list contribute; each
/// link in that entry's dropdown columns becomes a tier-2 reference.
pub fn menu_category_links(doc: &Html, allow_list: &[String], base: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    let item_sel = Selector::parse("header .top-nav-component li");
    let label_sel = Selector::parse("a.top-nav-item-link");
    let column_sel = Selector::parse(".dropdown-column > a");

    if let (Ok(item_sel), Ok(label_sel), Ok(column_sel)) = (item_sel, label_sel, column_sel) {
        for item in doc.select(&item_sel) {
            let label = match item.select(&label_sel).next() {
                Some(element) => element_text(&element),
                None => continue,
            };

            if !allow_list.iter().any(|c| c.eq_ignore_ascii_case(&label)) {
                continue;
            }

            for anchor in item.select(&column_sel) {
                if let Some(href) = anchor.value().attr("href") {
                    if let Some(url) = resolve_link(href, base) {
                        links.push(url);
                    }
                }
            }
        }
    }

    links
}

/// Finds the distinguished jerseys sub-link on a category page
pub fn jerseys_link(doc: &Html, base: &Url) -> Option<Url> {
    let selector =
        Selector::parse(r#"div.side-nav-facet-items.featuredDepartmentsBoxes a[href*="jerseys"]"#)
            .ok()?;

    doc.select(&selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve_link(href, base))
}

/// Collects product references from the cards on a listing page
///
/// Cards without an image-anchor href are skipped and reported by index;
/// the jersey-assurance marker on a card becomes the link's provenance
/// flag.
pub fn product_links(doc: &Html, base: &Url) -> ListingLinks {
    let mut result = ListingLinks::default();

    let card_sel = Selector::parse("div.product-card");
    let anchor_sel = Selector::parse("div.product-image-container > a");
    let assurance_sel = Selector::parse("span.jersey-assurance-message");

    if let (Ok(card_sel), Ok(anchor_sel), Ok(assurance_sel)) = (card_sel, anchor_sel, assurance_sel)
    {
        for (index, card) in doc.select(&card_sel).enumerate() {
            let href = card
                .select(&anchor_sel)
                .next()
                .and_then(|a| a.value().attr("href"));

            let href = match href {
                Some(h) => h,
                None => {
                    result.cards_without_link.push(index);
                    continue;
                }
            };

            let jersey_assured = card.select(&assurance_sel).next().is_some();

            if let Some(url) = resolve_link(href, base) {
                result.links.push(ProductLink { url, jersey_assured });
            }
        }
    }

    result
}

/// Extracts the structured record from a product page
///
/// The identity comes from the last breadcrumb entry via the
/// `Product ID: <digits>` pattern; with no match (or no breadcrumbs at
/// all) the id stays 0 and storage will assign one.
pub fn extract_product(doc: &Html) -> ProductRecord {
    let breadcrumbs = select_texts(doc, r#".breadcrumbs-container li[typeof="ListItem"]"#);
    let sizes = select_texts(doc, ".size-selector-list .size-selector-button");
    let detail = select_joined_text(doc, ".product-details");
    let description = select_joined_text(doc, ".description-box-content div");

    let id = breadcrumbs
        .last()
        .and_then(|last| parse_product_id(last))
        .unwrap_or(0);

    ProductRecord {
        id,
        breadcrumbs,
        sizes,
        detail,
        description,
    }
}

/// Parses the product identity out of a breadcrumb entry
fn parse_product_id(text: &str) -> Option<i64> {
    let regex = Regex::new(r"Product ID: (\d+)").ok()?;
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Trimmed text of each element matching the selector
fn select_texts(doc: &Html, selector: &str) -> Vec<String> {
    match Selector::parse(selector) {
        Ok(sel) => doc
            .select(&sel)
            .map(|element| element_text(&element))
            .filter(|text| !text.is_empty())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Concatenated trimmed text of every element matching the selector
fn select_joined_text(doc: &Html, selector: &str) -> String {
    match Selector::parse(selector) {
        Ok(sel) => doc
            .select(&sel)
            .map(|element| element_text(&element))
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string(),
        Err(_) => String::new(),
    }
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolves an href to an absolute http(s) URL
///
/// Returns None for empty hrefs, fragment-only anchors, special schemes,
/// and anything that fails to resolve against the base.
fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        _ => None,
    }
}
