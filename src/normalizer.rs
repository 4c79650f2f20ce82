use scraper::{ElementRef, Html};

use crate::error::ExtractError;
use crate::extractors;
use crate::models::ListingRecord;
use crate::profile::SiteProfile;
use crate::{debug_println, Error, Result};

/// What to do with a listing whose title or rent cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequiredFieldPolicy {
    /// Drop the listing and count it.
    #[default]
    SkipListing,
    /// Fail the whole page on the first bad listing.
    FailPage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedListing {
    /// Position of the listing on its page, starting at 0.
    pub index: usize,
    pub reason: ExtractError,
}

/// Records of one page, in document order.
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    pub listings_found: usize,
    pub records: Vec<ListingRecord>,
    pub skipped: Vec<SkippedListing>,
}

pub fn extract_listing(
    listing: ElementRef,
    profile: &SiteProfile,
    page: u32,
) -> std::result::Result<ListingRecord, ExtractError> {
    let title = extractors::extract_title(listing, profile)?;
    let rent = extractors::extract_rent(listing, profile)?;
    let details = extractors::extract_details(listing, profile);

    Ok(ListingRecord {
        title,
        description: extractors::extract_description(listing, profile),
        publisher: extractors::extract_publisher(listing, profile),
        neighborhood: extractors::extract_neighborhood(listing, profile),
        total_area: details.total_area,
        useful_area: details.useful_area,
        bedrooms: details.bedrooms,
        bathrooms: details.bathrooms,
        garage_spots: details.garage_spots,
        rent,
        condo_fee: extractors::extract_condo_fee(listing, profile),
        link: extractors::extract_link(listing, profile),
        page,
    })
}

/// Parses one page of markup and extracts every listing on it.
///
/// A page without listings is not an error; it simply yields no records.
pub fn normalize_page(
    html: &str,
    profile: &SiteProfile,
    page: u32,
    policy: RequiredFieldPolicy,
) -> Result<PageExtraction> {
    let document = Html::parse_document(html);
    let mut extraction = PageExtraction::default();

    for (index, listing) in document.select(&profile.listing).enumerate() {
        extraction.listings_found += 1;

        match extract_listing(listing, profile, page) {
            Ok(record) => extraction.records.push(record),
            Err(reason) => {
                if policy == RequiredFieldPolicy::FailPage {
                    return Err(Error::RequiredField {
                        page,
                        index,
                        source: reason,
                    });
                }
                debug_println!("Skipping listing {} on page {}: {}", index, page, reason);
                extraction.skipped.push(SkippedListing { index, reason });
            }
        }
    }

    debug_println!(
        "Page {}: {} listings, {} extracted, {} skipped",
        page,
        extraction.listings_found,
        extraction.records.len(),
        extraction.skipped.len()
    );
    Ok(extraction)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn icon_card(title: &str, rent: &str, href: Option<&str>) -> String {
        let link = href
            .map(|h| format!(r#"<a class="sc-i1odl-12 EWzaP" href="{}">ver</a>"#, h))
            .unwrap_or_default();
        format!(
            r#"<div class="sc-1tt2vbg-4 dFNvko">
                 <div class="sc-12dh9kl-4 hbUMaO">{rent}</div>
                 <div class="sc-ge2uzh-2 jneaYd">Consolação, São Paulo</div>
                 <span><img class="sc-1uhtbxc-1 eLhfrW"><span>40 m²</span></span>
                 <h2 class="sc-i1odl-11 kvKUxE">{title}</h2>
                 {link}
               </div>"#
        )
    }

    pub(crate) fn page(cards: &[String]) -> String {
        format!(
            "<html><body><main><h1>Resultados</h1>{}</main></body></html>",
            cards.join("\n")
        )
    }

    #[test]
    fn test_normalize_preserves_order() {
        let profile = SiteProfile::icon_tagged().unwrap();
        let html = page(&[
            icon_card("Primeiro", "R$ 1.000", Some("/a.html")),
            icon_card("Segundo", "R$ 2.000", Some("/b.html")),
            icon_card("Terceiro", "R$ 3.000", None),
        ]);

        let extraction = normalize_page(&html, &profile, 4, RequiredFieldPolicy::SkipListing).unwrap();
        let titles: Vec<_> = extraction.records.iter().map(|r| r.title.as_str()).collect();

        assert_eq!(titles, vec!["Primeiro", "Segundo", "Terceiro"]);
        assert_eq!(extraction.records[1].rent, 2000.0);
        assert_eq!(extraction.records[2].link, None);
        assert!(extraction.records.iter().all(|r| r.page == 4));
        assert_eq!(extraction.records[0].neighborhood, "Consolação");
        assert_eq!(extraction.records[0].total_area, Some(40));
    }

    #[test]
    fn test_normalize_skips_listing_without_rent() {
        let profile = SiteProfile::icon_tagged().unwrap();
        let html = page(&[
            icon_card("Ok", "R$ 1.000", Some("/a.html")),
            icon_card("Sem preço", "Consulte", Some("/b.html")),
        ]);

        let extraction = normalize_page(&html, &profile, 1, RequiredFieldPolicy::SkipListing).unwrap();
        assert_eq!(extraction.listings_found, 2);
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].index, 1);
    }

    #[test]
    fn test_normalize_strict_fails_page() {
        let profile = SiteProfile::icon_tagged().unwrap();
        let html = page(&[icon_card("Sem preço", "Consulte", None)]);

        let result = normalize_page(&html, &profile, 3, RequiredFieldPolicy::FailPage);
        assert!(matches!(
            result,
            Err(Error::RequiredField { page: 3, index: 0, .. })
        ));
    }

    #[test]
    fn test_normalize_empty_page() {
        let profile = SiteProfile::icon_tagged().unwrap();
        let extraction =
            normalize_page(&page(&[]), &profile, 2, RequiredFieldPolicy::SkipListing).unwrap();
        assert_eq!(extraction.listings_found, 0);
        assert!(extraction.records.is_empty());
    }
}
