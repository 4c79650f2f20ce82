use std::fs;
use std::path::Path;
use std::time::Duration;

use imovelfinder::crawler::{CrawlOptions, Crawler, PageErrorPolicy};
use imovelfinder::dataset::DatasetBuilder;
use imovelfinder::fetcher::{SettleWait, SnapshotFetcher};
use imovelfinder::models::MarkupVariant;
use imovelfinder::output::{save_dataset, OutputFormat};
use imovelfinder::profile::SiteProfile;
use imovelfinder::Error;

const TEMPLATE: &str = "https://www.imovelweb.com.br/apartamentos-aluguel-sao-paulo-sp-pagina-{page}.html";

fn icon_card(title: &str, rent: &str, area: Option<&str>, href: &str) -> String {
    let area = area
        .map(|a| format!(r#"<span><img class="sc-1uhtbxc-1 eLhfrW" src="area.svg"><span>{}</span></span>"#, a))
        .unwrap_or_default();
    format!(
        r#"<div class="sc-1tt2vbg-4 dFNvko">
             <div class="sc-12dh9kl-4 hbUMaO">{rent}</div>
             <div class="sc-12dh9kl-2 kzrlNE">R$ 500 Condominio</div>
             <div class="sc-ge2uzh-2 jneaYd">Vila Mariana, São Paulo</div>
             {area}
             <span><img class="sc-1uhtbxc-1 eykaou" src="garage.svg"><span>1 vaga</span></span>
             <h2 class="sc-i1odl-11 kvKUxE">{title}</h2>
             <a class="sc-i1odl-12 EWzaP" href="{href}">ver</a>
           </div>"#
    )
}

fn write_page(dir: &Path, page: u32, cards: &[String]) {
    let html = format!("<html><body>{}</body></html>", cards.join("\n"));
    let file = format!("apartamentos-aluguel-sao-paulo-sp-pagina-{}.html", page);
    fs::write(dir.join(file), html).unwrap();
}

fn options(start_page: u32, end_page: u32) -> CrawlOptions {
    CrawlOptions {
        url_template: TEMPLATE.to_string(),
        start_page,
        end_page,
        settle: SettleWait::Fixed(Duration::ZERO),
        page_delay: Duration::ZERO,
        show_progress: false,
        ..CrawlOptions::default()
    }
}

#[test]
fn crawl_two_pages_with_empty_second_page() {
    let dir = tempfile::tempdir().unwrap();
    write_page(
        dir.path(),
        1,
        &[
            icon_card("Apartamento 1", "R$ 1.500", Some("50 m²"), "/imovel-1.html"),
            icon_card("Apartamento 2", "R$ 2.000", Some("80 m²"), "/imovel-2.html"),
            icon_card("Apartamento 3", "R$ 2.500", Some("100 m²"), "/imovel-3.html"),
        ],
    );
    write_page(dir.path(), 2, &[]);

    let profile = SiteProfile::icon_tagged().unwrap();
    let mut crawler = Crawler::new(SnapshotFetcher::new(dir.path()), profile, options(1, 3)).unwrap();
    let outcome = crawler.run().unwrap();

    let (dataset, stats) = DatasetBuilder::for_variant(MarkupVariant::IconTagged).build(outcome.records);
    assert_eq!(dataset.len(), 3);
    assert_eq!(stats.duplicates_removed, 0);
    assert_eq!(outcome.stats.empty_pages, 1);

    let first = &dataset.rows[0];
    assert_eq!(first.record.garage_spots, 1);
    assert_eq!(first.total_value, 2000.0);
    assert_eq!(first.rent_per_area, Some(30.0));
    assert_eq!(
        first.record.link.as_deref(),
        Some("https://www.imovelweb.com.br/imovel-1.html")
    );
}

#[test]
fn crawl_dedupes_across_pages_and_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    write_page(
        dir.path(),
        1,
        &[
            icon_card("Primeira vez", "R$ 1.000", Some("40 m²"), "/repetido.html"),
            icon_card("Sem área", "R$ 1.100", None, "/sem-area.html"),
        ],
    );
    write_page(
        dir.path(),
        2,
        &[icon_card("Repetido", "R$ 9.999", Some("40 m²"), "/repetido.html")],
    );

    let profile = SiteProfile::icon_tagged().unwrap();
    let mut crawler = Crawler::new(SnapshotFetcher::new(dir.path()), profile, options(1, 3)).unwrap();
    let outcome = crawler.run().unwrap();
    assert_eq!(outcome.records.len(), 3);

    let (dataset, stats) = DatasetBuilder::for_variant(MarkupVariant::IconTagged).build(outcome.records);
    assert_eq!(stats.duplicates_removed, 1);
    assert_eq!(stats.missing_area_dropped, 1);
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.rows[0].record.title, "Primeira vez");

    let output = dir.path().join("out").join("apartments.csv");
    let written = save_dataset(&dataset, output.to_str().unwrap(), OutputFormat::Csv).unwrap();
    assert_eq!(written, 1);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.get(0), Some("Title"));
    assert_eq!(headers.get(10), Some("Rent per Square Meter"));

    let row = reader.records().next().unwrap().unwrap();
    assert_eq!(row.get(0), Some("Primeira vez"));
    assert_eq!(row.get(3), Some(""));
    assert_eq!(row.get(7), Some("1000"));
    assert_eq!(row.get(10), Some("25"));
}

#[test]
fn missing_snapshot_is_reported_or_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_page(
        dir.path(),
        1,
        &[icon_card("Único", "R$ 1.000", Some("40 m²"), "/unico.html")],
    );

    let profile = SiteProfile::icon_tagged().unwrap();
    let mut crawler =
        Crawler::new(SnapshotFetcher::new(dir.path()), profile.clone(), options(1, 3)).unwrap();
    match crawler.run() {
        Err(Error::Aborted { page, stats, .. }) => {
            assert_eq!(page, 2);
            assert_eq!(stats.pages_attempted, 2);
            assert_eq!(stats.listings_extracted, 1);
            assert_eq!(stats.failed_pages, vec![2]);
        }
        other => panic!("expected an aborted crawl, got {:?}", other),
    }

    let mut opts = options(1, 3);
    opts.page_errors = PageErrorPolicy::Skip;
    let mut crawler = Crawler::new(SnapshotFetcher::new(dir.path()), profile, opts).unwrap();
    let outcome = crawler.run().unwrap();
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.stats.failed_pages, vec![2]);
}

#[test]
fn keyword_variant_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let card = r#"<div data-qa="posting PROPERTY">
        <div data-qa="POSTING_CARD_PRICE">R$ 3.200</div>
        <div data-qa="expensas">R$ 800 Condominio</div>
        <div data-qa="POSTING_CARD_LOCATION">Moema, São Paulo</div>
        <div data-qa="POSTING_CARD_FEATURES"><span>90 m² tot.</span><span>3 quartos</span><span>2 banheiros</span><span>2 vagas</span></div>
        <h3 data-qa="POSTING_CARD_DESCRIPTION"><a href="/moema-1.html">Apartamento amplo, varanda gourmet</a></h3>
        <div data-qa="POSTING_CARD_PUBLISHER"><span>Imobiliária Moema</span></div>
      </div>"#;
    write_page(dir.path(), 1, &[card.to_string()]);

    let profile = SiteProfile::keyword_tagged().unwrap();
    let mut crawler = Crawler::new(SnapshotFetcher::new(dir.path()), profile, options(1, 2)).unwrap();
    let outcome = crawler.run().unwrap();

    let (dataset, _) = DatasetBuilder::for_variant(MarkupVariant::KeywordTagged).build(outcome.records);
    let row = &dataset.rows[0];
    assert_eq!(row.record.title, "Apartamento amplo");
    assert_eq!(row.record.publisher.as_deref(), Some("Imobiliária Moema"));
    assert_eq!(row.record.neighborhood, "Moema");
    assert_eq!(
        (row.record.total_area, row.record.bedrooms, row.record.bathrooms, row.record.garage_spots),
        (Some(90), Some(3), Some(2), 2)
    );
    assert_eq!(row.total_value, 4000.0);

    let output = dir.path().join("apartments.json");
    save_dataset(&dataset, output.to_str().unwrap(), OutputFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(json[0]["Description"], "Apartamento amplo, varanda gourmet");
}
