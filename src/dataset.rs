//! Turns the records of a whole crawl into the final table.

use std::collections::HashSet;

use crate::debug_println;
use crate::models::{DatasetRow, ListingRecord, MarkupVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Title,
    Description,
    Publisher,
    Neighborhood,
    TotalArea,
    UsefulArea,
    Bedrooms,
    Bathrooms,
    Garage,
    Rent,
    CondoFee,
    TotalValue,
    RentPerArea,
    Link,
}

/// A single cell, still typed so each sink can render it its own way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Text(Option<&'a str>),
    Integer(Option<i64>),
    Decimal(Option<f64>),
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Title => "Title",
            Column::Description => "Description",
            Column::Publisher => "Publisher",
            Column::Neighborhood => "Neighborhood",
            Column::TotalArea => "Total Area",
            Column::UsefulArea => "Useful Area",
            Column::Bedrooms => "Bedrooms",
            Column::Bathrooms => "Bathrooms",
            Column::Garage => "Garage",
            Column::Rent => "Rent",
            Column::CondoFee => "Condo Fee",
            Column::TotalValue => "Total Value",
            Column::RentPerArea => "Rent per Square Meter",
            Column::Link => "Link",
        }
    }

    pub fn cell<'a>(&self, row: &'a DatasetRow) -> Cell<'a> {
        let record = &row.record;
        match self {
            Column::Title => Cell::Text(Some(&record.title)),
            Column::Description => Cell::Text(record.description.as_deref()),
            Column::Publisher => Cell::Text(record.publisher.as_deref()),
            Column::Neighborhood => Cell::Text(Some(&record.neighborhood)),
            Column::TotalArea => Cell::Integer(record.total_area),
            Column::UsefulArea => Cell::Integer(record.useful_area),
            Column::Bedrooms => Cell::Integer(record.bedrooms),
            Column::Bathrooms => Cell::Integer(record.bathrooms),
            Column::Garage => Cell::Integer(Some(record.garage_spots)),
            Column::Rent => Cell::Decimal(Some(record.rent)),
            Column::CondoFee => Cell::Decimal(Some(record.condo_fee)),
            Column::TotalValue => Cell::Decimal(Some(row.total_value)),
            Column::RentPerArea => Cell::Decimal(row.rent_per_area),
            Column::Link => Cell::Text(record.link.as_deref()),
        }
    }
}

/// Ordered output columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn for_variant(variant: MarkupVariant) -> Self {
        use Column::*;

        let columns = match variant {
            MarkupVariant::IconTagged => vec![
                Title,
                Neighborhood,
                TotalArea,
                UsefulArea,
                Bedrooms,
                Bathrooms,
                Garage,
                Rent,
                CondoFee,
                TotalValue,
                RentPerArea,
                Link,
            ],
            MarkupVariant::KeywordTagged => vec![
                Title,
                Description,
                Publisher,
                Neighborhood,
                TotalArea,
                Bedrooms,
                Bathrooms,
                Garage,
                Rent,
                CondoFee,
                TotalValue,
                RentPerArea,
                Link,
            ],
        };
        Schema { columns }
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(Column::header).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetOptions {
    /// Drop rows whose total area is unknown.
    pub require_total_area: bool,
}

impl DatasetOptions {
    pub fn for_variant(variant: MarkupVariant) -> Self {
        DatasetOptions {
            require_total_area: variant == MarkupVariant::IconTagged,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub input_records: usize,
    pub duplicates_removed: usize,
    pub missing_area_dropped: usize,
    pub rows: usize,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub schema: Schema,
    pub rows: Vec<DatasetRow>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Keeps the first record for every link. Records without a link are all
/// kept.
pub fn dedupe_by_link(records: Vec<ListingRecord>) -> (Vec<ListingRecord>, usize) {
    let mut seen = HashSet::new();
    let before = records.len();

    let unique: Vec<ListingRecord> = records
        .into_iter()
        .filter(|record| match &record.link {
            Some(link) => seen.insert(link.clone()),
            None => true,
        })
        .collect();

    let removed = before - unique.len();
    (unique, removed)
}

pub struct DatasetBuilder {
    schema: Schema,
    options: DatasetOptions,
}

impl DatasetBuilder {
    pub fn new(schema: Schema, options: DatasetOptions) -> Self {
        Self { schema, options }
    }

    pub fn for_variant(variant: MarkupVariant) -> Self {
        Self::new(
            Schema::for_variant(variant),
            DatasetOptions::for_variant(variant),
        )
    }

    /// Dedupes, filters and derives the computed columns, in that order.
    /// Records are expected in page-then-listing order so that the first
    /// occurrence of a link is the earliest one crawled.
    pub fn build(&self, records: Vec<ListingRecord>) -> (Dataset, BuildStats) {
        let mut stats = BuildStats {
            input_records: records.len(),
            ..BuildStats::default()
        };

        let (records, removed) = dedupe_by_link(records);
        stats.duplicates_removed = removed;
        debug_println!("Removed {} duplicate links", removed);

        let before_filter = records.len();
        let records: Vec<ListingRecord> = if self.options.require_total_area {
            records
                .into_iter()
                .filter(|record| record.total_area.is_some())
                .collect()
        } else {
            records
        };
        stats.missing_area_dropped = before_filter - records.len();

        let rows: Vec<DatasetRow> = records.into_iter().map(DatasetRow::from_record).collect();
        stats.rows = rows.len();

        (
            Dataset {
                schema: self.schema.clone(),
                rows,
            },
            stats,
        )
    }
}
