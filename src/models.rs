use std::fmt;
use std::str::FromStr;

/// The two site layouts seen on the listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupVariant {
    /// Each detail metric is marked by its own icon image, the value sits in
    /// the node right after the icon.
    IconTagged,
    /// Details are free-text spans tagged by keywords like "quartos".
    KeywordTagged,
}

impl fmt::Display for MarkupVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MarkupVariant::IconTagged => write!(f, "icon"),
            MarkupVariant::KeywordTagged => write!(f, "keyword"),
        }
    }
}

impl FromStr for MarkupVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "icon" | "icon-tagged" => Ok(MarkupVariant::IconTagged),
            "keyword" | "keyword-tagged" => Ok(MarkupVariant::KeywordTagged),
            other => Err(format!("unknown markup variant: {}", other)),
        }
    }
}

/// One apartment advertisement as read from a listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub title: String,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub neighborhood: String,
    pub total_area: Option<i64>,
    pub useful_area: Option<i64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub garage_spots: i64,
    pub rent: f64,
    pub condo_fee: f64,
    pub link: Option<String>,
    pub page: u32,
}

/// Numeric detail fields, extracted together since both markup variants
/// read them from the same part of the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListingDetails {
    pub total_area: Option<i64>,
    pub useful_area: Option<i64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub garage_spots: i64,
}

/// A deduplicated record plus its computed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub record: ListingRecord,
    pub total_value: f64,
    pub rent_per_area: Option<f64>,
}

impl DatasetRow {
    pub fn from_record(record: ListingRecord) -> Self {
        let total_value = record.rent + record.condo_fee;
        let rent_per_area = match record.total_area {
            Some(area) if area != 0 => Some(record.rent / area as f64),
            _ => None,
        };

        DatasetRow {
            record,
            total_value,
            rent_per_area,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(link: Option<&str>, total_area: Option<i64>) -> ListingRecord {
        ListingRecord {
            title: "Apartamento".to_string(),
            description: None,
            publisher: None,
            neighborhood: "Bela Vista".to_string(),
            total_area,
            useful_area: None,
            bedrooms: Some(2),
            bathrooms: Some(1),
            garage_spots: 0,
            rent: 1250.0,
            condo_fee: 350.0,
            link: link.map(str::to_string),
            page: 1,
        }
    }

    #[test]
    fn test_derived_columns() {
        let row = DatasetRow::from_record(record(None, Some(50)));
        assert_eq!(row.total_value, 1600.0);
        assert_eq!(row.rent_per_area, Some(25.0));
    }

    #[test]
    fn test_rent_per_area_needs_nonzero_area() {
        assert_eq!(DatasetRow::from_record(record(None, None)).rent_per_area, None);
        assert_eq!(DatasetRow::from_record(record(None, Some(0))).rent_per_area, None);
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("icon".parse::<MarkupVariant>(), Ok(MarkupVariant::IconTagged));
        assert_eq!("Keyword".parse::<MarkupVariant>(), Ok(MarkupVariant::KeywordTagged));
        assert!("grid".parse::<MarkupVariant>().is_err());
    }
}
