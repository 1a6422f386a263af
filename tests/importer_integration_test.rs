// ==========================================
// ManifestImporter 集成测试
// ==========================================
// 测试目标: 真实 xlsx 文件 → 解析 → 抽取 → 聚合
// ==========================================


use freight_recon::config::ReconConfig;
use freight_recon::domain::{FileStatus, MasterMapping};
use freight_recon::importer::{
    FileAggregator, ManifestImporter, ManifestImporterImpl, MasterDataLoader,
};
use freight_recon::logging;
use rust_decimal_macros::dec;
use test_helpers::{manifest_xlsx, master_xlsx, narrow_xlsx, source, TripRow};

fn importer() -> ManifestImporterImpl {
    ManifestImporterImpl::new(&ReconConfig::default())
}

#[tokio::test]
async fn test_import_single_manifest() {
    logging::init_test();

    let bytes = manifest_xlsx(
        &[
            TripRow::new("TSK-001", "BGR-SOC-A001-X", 1_500_000),
            TripRow::new("TSK-002", "JKT-BDG-B002-Y", 1_200_000).vehicle("TWB"),
        ],
        &[],
    );
    let result = importer()
        .import_batch(vec![source("manifest.xlsx", bytes)], MasterMapping::new())
        .await;

    assert_eq!(result.total_rows(), 2);
    assert_eq!(result.records[0].route_name, "BGR-SOC-A001");
    assert_eq!(result.records[1].route_name, "JKT-BDG-B002");
    assert_eq!(result.records[0].actual_total, dec!(1486500));
    assert_eq!(result.records[0].row_number, 5);
    assert_eq!(result.records[1].row_number, 6);

    let summary = &result.file_summaries[0];
    assert_eq!(summary.status, FileStatus::Success);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.amount, dec!(1486500) + dec!(1189200));
    assert!(result.warnings.is_empty());
    // 无主数据时不记录缺失编码
    assert!(result.missing_codes.is_empty());
}

#[tokio::test]
async fn test_footer_rows_never_appear() {
    logging::init_test();

    let bytes = manifest_xlsx(
        &[TripRow::new("TSK-001", "BGR-SOC-A001", 1_000_000)],
        &[
            ("Dicek oleh", "Dicek oleh: ___"),
            ("Keterangan", "Catatan:"),
            ("", "Print Date 2025-12-31"),
        ],
    );
    let config = ReconConfig::default();
    let aggregator = FileAggregator::new(&config);
    let files = vec![source("manifest.xlsx", bytes)];

    let first = aggregator.aggregate(&files, &MasterMapping::new());
    let second = aggregator.aggregate(&files, &MasterMapping::new());

    assert_eq!(first.total_rows(), 1);
    assert_eq!(first.records, second.records);
    assert!(first
        .records
        .iter()
        .all(|r| !r.task_code.to_lowercase().contains("dicek")));
}

#[tokio::test]
async fn test_malformed_file_is_isolated() {
    logging::init_test();

    let good = manifest_xlsx(&[TripRow::new("A1", "R1-R2-R3", 100_000)], &[]);
    let files = vec![
        source("first.xlsx", good.clone()),
        source("narrow.xlsx", narrow_xlsx()),
        source("garbage.xlsx", b"definitely not a workbook".to_vec()),
        source("notes.pdf", b"%PDF-1.4".to_vec()),
        source("last.xlsx", good),
    ];

    let result = importer().import_batch(files, MasterMapping::new()).await;

    let statuses: Vec<FileStatus> = result.file_summaries.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![
            FileStatus::Success,
            FileStatus::ErrorColumns,
            FileStatus::Error,
            FileStatus::Error,
            FileStatus::Success,
        ]
    );
    let names: Vec<&str> = result
        .file_summaries
        .iter()
        .map(|s| s.filename.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["first.xlsx", "narrow.xlsx", "garbage.xlsx", "notes.pdf", "last.xlsx"]
    );
    assert_eq!(result.file_summaries[0].rows, 1);
    assert_eq!(result.file_summaries[1].rows, 0);
    assert_eq!(result.file_summaries[4].rows, 1);
    assert_eq!(result.total_rows(), 2);
}

#[tokio::test]
async fn test_identical_warnings_are_deduplicated() {
    logging::init_test();

    // 两个文件第 5 行车型都不合法，警告文本完全相同
    let bytes = manifest_xlsx(&[TripRow::new("A1", "R1-R2-R3", 100_000).vehicle("BOX")], &[]);
    let files = vec![source("a.xlsx", bytes.clone()), source("b.xlsx", bytes)];

    let result = importer().import_batch(files, MasterMapping::new()).await;

    assert_eq!(result.total_rows(), 2);
    assert_eq!(
        result.warnings,
        vec!["Row 5: Jenis Mobil is 'BOX' (Expected: 'CDDL/TWB')".to_string()]
    );
    assert_eq!(result.file_summaries[0].status, FileStatus::Warning);
    assert_eq!(result.file_summaries[1].anomalies.len(), 1);
}

#[tokio::test]
async fn test_master_file_overrides_route_and_tracks_misses() {
    logging::init_test();

    let loader = MasterDataLoader::default();
    let mapping = loader
        .load_bytes("master.xlsx", &master_xlsx(&[("A1", "JAKARTA - BANDUNG")]))
        .unwrap();
    assert_eq!(mapping.len(), 1);

    let bytes = manifest_xlsx(
        &[
            TripRow::new("A1", "JKT-BDG-X01-Z", 100_000),
            TripRow::new("B9", "BGR-SOC-A001-X", 100_000),
            TripRow::new("C7", "BGR-SOC-A001-X", 100_000),
        ],
        &[],
    );
    let result = importer()
        .import_batch(vec![source("manifest.xlsx", bytes)], mapping)
        .await;

    assert_eq!(result.records[0].route_name, "JAKARTA - BANDUNG");
    assert_eq!(result.records[1].route_name, "BGR-SOC-A001");
    assert_eq!(result.missing_codes, vec!["B9".to_string(), "C7".to_string()]);
    assert_eq!(
        result.missing_codes_warning().unwrap(),
        "2 Kode Tugas not found in Master Data (using default name): B9, C7"
    );
}

#[tokio::test]
async fn test_negative_grand_total_warns() {
    logging::init_test();

    let bytes = manifest_xlsx(
        &[TripRow::new("A1", "R1-R2-R3", 100_000).total_text("(250.000)")],
        &[],
    );
    let result = importer()
        .import_batch(vec![source("shifted.xlsx", bytes)], MasterMapping::new())
        .await;

    assert_eq!(result.total_amount(), Some(dec!(-250000)));
    assert!(result
        .warnings
        .iter()
        .any(|w| w.starts_with("Grand total of Total Aktual is negative")));
}
