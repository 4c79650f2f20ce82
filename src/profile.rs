//! Site constants and the selector tables of both markup variants.

use scraper::Selector;

use crate::models::MarkupVariant;
use crate::{Error, Result};

pub const SITE_ORIGIN: &str = "https://www.imovelweb.com.br";
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://www.imovelweb.com.br/apartamentos-aluguel-sao-paulo-sp-ordem-precio-menor-pagina-{page}.html";
pub const PAGE_PLACEHOLDER: &str = "{page}";
pub const CITY_SUFFIX: &str = ", São Paulo";

/// Selectors of the icon-tagged layout. Each detail icon carries its own
/// generated class.
pub mod icon {
    pub const LISTING: &str = "div.sc-1tt2vbg-4.dFNvko";
    pub const TITLE: &str = "h2.sc-i1odl-11.kvKUxE";
    pub const LOCATION: &str = "div.sc-ge2uzh-2.jneaYd";
    pub const TOTAL_AREA_ICON: &str = "img.sc-1uhtbxc-1.eLhfrW";
    pub const USEFUL_AREA_ICON: &str = "img.sc-1uhtbxc-1.dRoEma";
    pub const BEDROOMS_ICON: &str = "img.sc-1uhtbxc-1.ljuqxM";
    pub const BATHROOMS_ICON: &str = "img.sc-1uhtbxc-1.foetjI";
    pub const GARAGE_ICON: &str = "img.sc-1uhtbxc-1.eykaou";
    pub const RENT: &str = "div.sc-12dh9kl-4.hbUMaO";
    pub const CONDO_FEE: &str = "div.sc-12dh9kl-2.kzrlNE";
    pub const LINK: &str = "a.sc-i1odl-12.EWzaP";
}

/// Selectors of the keyword-tagged layout, addressed by `data-qa` attributes.
pub mod keyword {
    pub const LISTING: &str = r#"div[data-qa="posting PROPERTY"]"#;
    pub const DESCRIPTION: &str = r#"[data-qa="POSTING_CARD_DESCRIPTION"]"#;
    pub const PUBLISHER: &str = r#"[data-qa="POSTING_CARD_PUBLISHER"] span"#;
    pub const PUBLISHER_LOGO: &str = r#"[data-qa="POSTING_CARD_PUBLISHER"] img"#;
    pub const LOCATION: &str = r#"[data-qa="POSTING_CARD_LOCATION"]"#;
    pub const FEATURE_SPAN: &str = "span";
    pub const RENT: &str = r#"[data-qa="POSTING_CARD_PRICE"]"#;
    pub const CONDO_FEE: &str = r#"[data-qa="expensas"]"#;
    pub const LINK: &str = r#"[data-qa="POSTING_CARD_DESCRIPTION"] a"#;

    pub const TOTAL_AREA_KEYWORDS: &[&str] = &["tot."];
    // "quarto" also covers the plural
    pub const BEDROOM_KEYWORDS: &[&str] = &["quarto"];
    pub const BATHROOM_KEYWORDS: &[&str] = &["banheiro", "ban."];
    pub const GARAGE_KEYWORDS: &[&str] = &["vaga"];
}

/// How the numeric details of a card are located.
#[derive(Debug, Clone)]
pub enum DetailSelectors {
    Icons {
        total_area: Selector,
        useful_area: Selector,
        bedrooms: Selector,
        bathrooms: Selector,
        garage: Selector,
    },
    Keywords {
        span: Selector,
    },
}

/// Publisher name sources, tried in order.
#[derive(Debug, Clone)]
pub struct PublisherSelectors {
    pub primary: Selector,
    pub alternate: Selector,
}

/// Everything the extractors need to read one site layout, compiled once
/// per run.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub variant: MarkupVariant,
    pub origin: String,
    pub city_suffix: String,
    pub listing: Selector,
    pub title: Selector,
    pub truncate_title: bool,
    pub keep_description: bool,
    pub publisher: Option<PublisherSelectors>,
    pub location: Selector,
    pub details: DetailSelectors,
    pub rent: Selector,
    pub condo_fee: Selector,
    pub link: Selector,
}

impl SiteProfile {
    pub fn for_variant(variant: MarkupVariant) -> Result<Self> {
        match variant {
            MarkupVariant::IconTagged => Self::icon_tagged(),
            MarkupVariant::KeywordTagged => Self::keyword_tagged(),
        }
    }

    pub fn icon_tagged() -> Result<Self> {
        Ok(SiteProfile {
            variant: MarkupVariant::IconTagged,
            origin: SITE_ORIGIN.to_string(),
            city_suffix: CITY_SUFFIX.to_string(),
            listing: create_selector(icon::LISTING)?,
            title: create_selector(icon::TITLE)?,
            truncate_title: false,
            keep_description: false,
            publisher: None,
            location: create_selector(icon::LOCATION)?,
            details: DetailSelectors::Icons {
                total_area: create_selector(icon::TOTAL_AREA_ICON)?,
                useful_area: create_selector(icon::USEFUL_AREA_ICON)?,
                bedrooms: create_selector(icon::BEDROOMS_ICON)?,
                bathrooms: create_selector(icon::BATHROOMS_ICON)?,
                garage: create_selector(icon::GARAGE_ICON)?,
            },
            rent: create_selector(icon::RENT)?,
            condo_fee: create_selector(icon::CONDO_FEE)?,
            link: create_selector(icon::LINK)?,
        })
    }

    pub fn keyword_tagged() -> Result<Self> {
        Ok(SiteProfile {
            variant: MarkupVariant::KeywordTagged,
            origin: SITE_ORIGIN.to_string(),
            city_suffix: CITY_SUFFIX.to_string(),
            listing: create_selector(keyword::LISTING)?,
            title: create_selector(keyword::DESCRIPTION)?,
            truncate_title: true,
            keep_description: true,
            publisher: Some(PublisherSelectors {
                primary: create_selector(keyword::PUBLISHER)?,
                alternate: create_selector(keyword::PUBLISHER_LOGO)?,
            }),
            location: create_selector(keyword::LOCATION)?,
            details: DetailSelectors::Keywords {
                span: create_selector(keyword::FEATURE_SPAN)?,
            },
            rent: create_selector(keyword::RENT)?,
            condo_fee: create_selector(keyword::CONDO_FEE)?,
            link: create_selector(keyword::LINK)?,
        })
    }
}

#[inline]
pub fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|e| Error::Selector(format!("{}: {:?}", sel_str, e)))
}

/// Substitutes a page number into a URL template holding `{page}`.
pub fn page_url(template: &str, page: u32) -> Result<String> {
    if !template.contains(PAGE_PLACEHOLDER) {
        return Err(Error::Template(format!(
            "{} has no {} placeholder",
            template, PAGE_PLACEHOLDER
        )));
    }
    Ok(template.replace(PAGE_PLACEHOLDER, &page.to_string()))
}
