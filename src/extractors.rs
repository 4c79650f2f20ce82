use scraper::{ElementRef, Node, Selector};

use crate::error::ExtractError;
use crate::models::ListingDetails;
use crate::parser;
use crate::profile::{keyword, DetailSelectors, SiteProfile};

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(listing: ElementRef, selector: &Selector) -> Option<String> {
    listing.select(selector).next().map(element_text)
}

pub fn extract_title(listing: ElementRef, profile: &SiteProfile) -> Result<String, ExtractError> {
    first_text(listing, &profile.title)
        .map(|text| {
            if profile.truncate_title {
                parser::truncate_title(&text)
            } else {
                text
            }
        })
        .filter(|title| !title.is_empty())
        .ok_or(ExtractError::MissingField("title"))
}

pub fn extract_description(listing: ElementRef, profile: &SiteProfile) -> Option<String> {
    if !profile.keep_description {
        return None;
    }
    first_text(listing, &profile.title).filter(|text| !text.is_empty())
}

/// The publisher name shows up either as text or as the alt text of the
/// agency logo, depending on the card layout.
pub fn extract_publisher(listing: ElementRef, profile: &SiteProfile) -> Option<String> {
    let selectors = profile.publisher.as_ref()?;

    if let Some(name) = first_text(listing, &selectors.primary).filter(|n| !n.is_empty()) {
        return Some(name);
    }

    let logo = listing.select(&selectors.alternate).next()?;
    logo.value()
        .attr("alt")
        .map(|alt| alt.trim().to_string())
        .filter(|alt| !alt.is_empty())
        .or_else(|| Some(element_text(logo)).filter(|text| !text.is_empty()))
}

pub fn extract_neighborhood(listing: ElementRef, profile: &SiteProfile) -> String {
    first_text(listing, &profile.location)
        .map(|location| parser::strip_city_suffix(&location, &profile.city_suffix))
        .unwrap_or_default()
}

pub fn extract_details(listing: ElementRef, profile: &SiteProfile) -> ListingDetails {
    match &profile.details {
        DetailSelectors::Icons {
            total_area,
            useful_area,
            bedrooms,
            bathrooms,
            garage,
        } => ListingDetails {
            total_area: icon_value(listing, total_area),
            useful_area: icon_value(listing, useful_area),
            bedrooms: icon_value(listing, bedrooms),
            bathrooms: icon_value(listing, bathrooms),
            // no garage icon means no garage
            garage_spots: icon_value(listing, garage).unwrap_or(0),
        },
        DetailSelectors::Keywords { span } => keyword_details(listing, span),
    }
}

/// Reads the value printed right after a detail icon, e.g. `50 m²`.
fn icon_value(listing: ElementRef, icon: &Selector) -> Option<i64> {
    let icon = listing.select(icon).next()?;
    let text = sibling_text(icon)?;
    parser::parse_leading_int(&text)
}

/// Text of the first non-blank node following `element`, be it a bare text
/// node or an element.
fn sibling_text(element: ElementRef) -> Option<String> {
    for node in element.next_siblings() {
        match node.value() {
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
            Node::Element(_) => return ElementRef::wrap(node).map(element_text),
            _ => {}
        }
    }
    None
}

/// Scans every span of the card for detail keywords. Later spans overwrite
/// earlier matches, and anything missing or unparsable counts as zero.
fn keyword_details(listing: ElementRef, span: &Selector) -> ListingDetails {
    let mut total_area = None;
    let mut bedrooms = None;
    let mut bathrooms = None;
    let mut garage = None;

    for fragment in listing.select(span) {
        let text = element_text(fragment);
        let lower = text.to_lowercase();
        let matches = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

        if matches(keyword::TOTAL_AREA_KEYWORDS) {
            total_area = Some(text);
        } else if matches(keyword::BEDROOM_KEYWORDS) {
            bedrooms = Some(text);
        } else if matches(keyword::BATHROOM_KEYWORDS) {
            bathrooms = Some(text);
        } else if matches(keyword::GARAGE_KEYWORDS) {
            garage = Some(text);
        }
    }

    let count = |text: Option<String>| {
        text.as_deref()
            .and_then(parser::parse_leading_int)
            .unwrap_or(0)
    };

    ListingDetails {
        total_area: Some(count(total_area)),
        useful_area: None,
        bedrooms: Some(count(bedrooms)),
        bathrooms: Some(count(bathrooms)),
        garage_spots: count(garage),
    }
}

/// Rent is the one monetary field every listing must have; it never falls
/// back to zero.
pub fn extract_rent(listing: ElementRef, profile: &SiteProfile) -> Result<f64, ExtractError> {
    let text = first_text(listing, &profile.rent).ok_or(ExtractError::MissingField("rent"))?;
    parser::parse_currency(&text).ok_or(ExtractError::Unparsable {
        field: "rent",
        text,
    })
}

pub fn extract_condo_fee(listing: ElementRef, profile: &SiteProfile) -> f64 {
    first_text(listing, &profile.condo_fee)
        .and_then(|text| parser::parse_currency(&text))
        .unwrap_or(0.0)
}

pub fn extract_link(listing: ElementRef, profile: &SiteProfile) -> Option<String> {
    let anchor = listing.select(&profile.link).next()?;
    let href = anchor.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    Some(parser::absolute_link(&profile.origin, href))
}
