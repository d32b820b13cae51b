//! 集成測試：匯入 → 目錄 → BOM → 計價 → 匯出

use bom_core::{ExportConfig, LineItemSource, NewPart, ProjectParams};
use bom_io::{export_file_name, read_candidates, write_delimited, write_export, ColumnMapping, ExportFormat};
use bom_store::{CatalogStore, PartFilter, StoreError};
use bomkit::price_bom;
use rstest::rstest;
use rust_decimal::Decimal;
use std::io::Write;

fn write_master(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("parts_master.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "partNo,description,category1,category2,unit,unitPrice,pricingModel,unitPricePerKWh,unitPricePerYear,notes"
    )
    .unwrap();
    writeln!(file, "BAT-100,LFP battery module,Battery,Module,,250000,,,,").unwrap();
    writeln!(file, "SGCS-E30,EMS element,EMS,Software,lic,,per_kwh,0.05,,").unwrap();
    writeln!(file, "MNT-01,Maintenance,Service,,year,,per_year,,1200,").unwrap();
    writeln!(file, "bat-100,lfp battery module,Battery,Module,,1,,,,duplicate").unwrap();
    writeln!(file, ",orphan,,,,,,,,").unwrap();
    path
}

/// 建立含三種價格模型的目錄與 BOM，返回 (store, bom_id)
fn seeded() -> (tempfile::TempDir, CatalogStore, i64) {
    let dir = tempfile::tempdir().unwrap();
    let master = write_master(dir.path());

    let batch = read_candidates(&master, &ColumnMapping::new(), "set").unwrap();
    assert_eq!(batch.len(), 4);
    assert_eq!(batch.skipped_rows, 1);

    let mut store = CatalogStore::open(dir.path().join("parts_bom.db")).unwrap();
    let report = store.insert_parts(&batch.parts, true).unwrap();
    assert_eq!(report.inserted(), 3);
    assert_eq!(report.duplicates, 1);

    let ids: Vec<i64> = store
        .search_parts(&PartFilter::new())
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();

    let bom = store.create_bom("Site A", true).unwrap();
    store.add_items(bom.id, &ids[..1], Decimal::ONE, true).unwrap();
    store.add_items(bom.id, &ids[1..2], Decimal::TWO, true).unwrap();
    store.add_items(bom.id, &ids[2..3], Decimal::ONE, true).unwrap();

    (dir, store, bom.id)
}

#[test]
fn test_full_flow_without_params() {
    let (_dir, store, bom_id) = seeded();
    let priced = price_bom(&store, bom_id, ProjectParams::new()).unwrap();

    let prices: Vec<_> = priced.lines.iter().map(|l| l.display_unit_price).collect();
    assert_eq!(prices, vec![Some(Decimal::from(250000)), None, None]);
    assert_eq!(priced.total, Decimal::from(250000));
}

#[rstest]
#[case(Decimal::ZERO, Decimal::new(5000, 2), Decimal::from(100))]
#[case(Decimal::new(10, 2), Decimal::new(10000, 2), Decimal::from(200))]
fn test_full_flow_per_kwh(#[case] rate_override: Decimal, #[case] display: Decimal, #[case] amount: Decimal) {
    let (_dir, store, bom_id) = seeded();
    let params = ProjectParams::new()
        .with_capacity_kwh(Decimal::from(1000))
        .with_years(Decimal::from(3))
        .with_rate_override(rate_override);
    let priced = price_bom(&store, bom_id, params).unwrap();

    assert_eq!(priced.lines[1].display_unit_price, Some(display));
    assert_eq!(priced.lines[1].amount, amount);
    assert_eq!(priced.lines[2].display_unit_price, Some(Decimal::from(3600)));
    assert_eq!(priced.total, Decimal::from(250000) + amount + Decimal::from(3600));
}

#[test]
fn test_export_after_alt_text_and_quantity_change() {
    let (_dir, mut store, bom_id) = seeded();
    let items = store.fetch_line_items(bom_id).unwrap();
    store.set_alt_text(items[0].item_id, Some("Battery (customer spec)"), true).unwrap();
    store.update_quantity(items[0].item_id, Decimal::TWO, true).unwrap();

    let params = ProjectParams::new().with_capacity_kwh(Decimal::from(1000));
    let priced = price_bom(&store, bom_id, params).unwrap();

    let mut buf = Vec::new();
    write_delimited(&mut buf, &priced, &ExportConfig::default(), ExportFormat::Csv).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.trim_start_matches('\u{feff}').lines().collect();

    assert_eq!(lines[1], "BAT-100,Battery (customer spec),Battery,Module,set,250000,2,500000,");
    assert_eq!(lines[2], "SGCS-E30,EMS element,EMS,Software,lic,50.00,2,100,");
    assert_eq!(lines.last().copied(), Some(",,,,,合計,,500100,"));
}

#[rstest]
#[case(ExportFormat::Csv)]
#[case(ExportFormat::Xlsx)]
fn test_export_to_file(#[case] format: ExportFormat) {
    let (dir, store, bom_id) = seeded();
    let priced = price_bom(&store, bom_id, ProjectParams::new()).unwrap();

    let path = dir.path().join(export_file_name(bom_id, format));
    write_export(&path, &priced, &ExportConfig::default(), format).unwrap();

    assert!(path.ends_with(format!("bom_{bom_id}.{}", format.extension())));
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn test_read_only_store_refuses_every_write() {
    let (_dir, mut store, bom_id) = seeded();
    let item = store.fetch_line_items(bom_id).unwrap()[0].item_id;

    let results = [
        store.add_part(&NewPart::new("NEW-1", "x"), false).map(|_| ()),
        store.delete_part(1, false),
        store.create_bom("B", false).map(|_| ()),
        store.add_items(bom_id, &[1], Decimal::ONE, false).map(|_| ()),
        store.update_quantity(item, Decimal::TEN, false),
        store.set_alt_text(item, None, false),
        store.remove_item(item, false),
    ];
    for result in results {
        assert!(matches!(result, Err(StoreError::WriteNotAllowed { .. })));
    }
    assert_eq!(store.count_parts().unwrap(), 3);
    assert_eq!(store.fetch_line_items(bom_id).unwrap().len(), 3);
}

#[test]
fn test_unknown_bom_reported_as_not_found() {
    let (_dir, store, _) = seeded();
    assert!(matches!(
        price_bom(&store, 999, ProjectParams::new()),
        Err(bom_core::BomError::BomNotFound(999))
    ));
}
