// ==========================================
// ReconApi 端到端测试
// ==========================================
// 测试目标: 上传运单 → JSON 汇总 + 合并对账表
// ==========================================


use freight_recon::api::{ApiError, ReconApi, ReconRequest};
use freight_recon::config::ReconConfig;
use freight_recon::domain::{Cell, FileStatus};
use freight_recon::importer::file_aggregator::total_overflow_warning;
use freight_recon::importer::{ExcelParser, FileParser};
use freight_recon::logging;
use rust_decimal_macros::dec;
use test_helpers::{manifest_xlsx, master_xlsx, narrow_xlsx, source, TripRow};

#[tokio::test]
async fn test_two_rows_and_footer_end_to_end() {
    logging::init_test();

    let bytes = manifest_xlsx(
        &[
            TripRow::new("TSK-001", "BGR-SOC-A001-X", 1_500_000),
            TripRow::new("TSK-002", "BGR-SOC-A002-X", 1_000_000),
        ],
        &[("Disetujui oleh", "Disetujui oleh: ___")],
    );
    let api = ReconApi::new(ReconConfig::default());
    let response = api
        .reconcile(ReconRequest {
            manifests: vec![source("manifest.xlsx", bytes)],
            filename_suffix: Some("Desember".to_string()),
            ..ReconRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(response.records.len(), 2);
    let summary = &response.summary;
    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.total_amount, Some(dec!(1486500) + dec!(991000)));
    assert_eq!(summary.file_details.len(), 1);
    assert_eq!(summary.file_details[0].rows, 2);
    assert_eq!(summary.file_details[0].status, FileStatus::Success);
    assert!(summary.warnings.is_empty());
    assert_eq!(summary.output_filename, "Rekonsiliasi_Tagihan_Desember.xlsx");

    // 生成的工作簿: 表头 + 2 行
    let sheet = ExcelParser
        .parse_sheet(&summary.output_filename, &response.generated_file)
        .unwrap();
    assert_eq!(sheet.height(), 3);
    assert_eq!(sheet.width(), 13);
    assert_eq!(sheet.cell(1, 1), &Cell::Text("TSK-001".to_string()));
    assert_eq!(sheet.cell(2, 2), &Cell::Text("BGR-SOC-A002".to_string()));
    assert_eq!(sheet.cell(2, 12), &Cell::Number(991000.0));
}

#[tokio::test]
async fn test_response_json_shape() {
    logging::init_test();

    let bytes = manifest_xlsx(&[TripRow::new("A1", "R1-R2-R3", 100_000)], &[]);
    let response = ReconApi::new(ReconConfig::default())
        .reconcile(ReconRequest {
            manifests: vec![source("m.xlsx", bytes), source("bad.xlsx", narrow_xlsx())],
            ..ReconRequest::default()
        })
        .await
        .unwrap();

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["display_columns"].as_array().unwrap().len(), 13);
    assert_eq!(json["records"][0]["Kode Tugas"], "A1");
    assert_eq!(json["records"][0]["Nama Rute"], "R1-R2-R3");
    assert_eq!(json["summary"]["file_details"][1]["status"], "Error: Columns");
    assert!(json.get("generated_file").is_none());
    // 内部溯源字段不输出
    assert!(json["records"][0].get("source_file").is_none());
}

#[tokio::test]
async fn test_master_files_and_paste_are_merged() {
    logging::init_test();

    let manifest = manifest_xlsx(
        &[
            TripRow::new("A1", "JKT-BDG-X01-Z", 100_000),
            TripRow::new("B2", "JKT-BDG-X02-Z", 100_000),
            TripRow::new("C3", "JKT-BDG-X03-Z", 100_000),
        ],
        &[],
    );
    let response = ReconApi::new(ReconConfig::default())
        .reconcile(ReconRequest {
            manifests: vec![source("m.xlsx", manifest)],
            master_files: vec![
                source("master.xlsx", master_xlsx(&[("A1", "JAKARTA - BANDUNG")])),
                source("broken.csv", b"foo;bar\n1;2\n".to_vec()),
            ],
            pasted_master: Some("Kode\tRute\nB2\tJAKARTA - BOGOR\n".to_string()),
            filename_suffix: None,
        })
        .await
        .unwrap();

    let routes: Vec<&str> = response
        .records
        .iter()
        .map(|r| r.route_name.as_str())
        .collect();
    assert_eq!(routes, vec!["JAKARTA - BANDUNG", "JAKARTA - BOGOR", "JKT-BDG-X03"]);
    assert_eq!(response.summary.missing_codes, vec!["C3".to_string()]);
    assert_eq!(response.summary.warnings.len(), 1);
    assert!(response.summary.warnings[0].starts_with("Master Data Error:"));
}

#[tokio::test]
async fn test_empty_request_is_the_only_hard_failure() {
    logging::init_test();

    let api = ReconApi::new(ReconConfig::default());
    let result = api.reconcile(ReconRequest::default()).await;
    assert!(matches!(result, Err(ApiError::EmptyInput)));

    // 全部文件失败仍返回响应
    let response = api
        .reconcile(ReconRequest {
            manifests: vec![source("bad.xlsx", narrow_xlsx())],
            ..ReconRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(response.summary.total_rows, 0);
    assert_eq!(response.summary.file_details[0].status, FileStatus::ErrorColumns);
}

#[tokio::test]
async fn test_grand_total_beyond_decimal_range_is_reported() {
    logging::init_test();

    let huge = "50000000000000000000000000000";
    let first = manifest_xlsx(&[TripRow::new("A1", "R1-R2-R3", 100_000).total_text(huge)], &[]);
    let second = manifest_xlsx(&[TripRow::new("B1", "R1-R2-R3", 100_000).total_text(huge)], &[]);

    let response = ReconApi::new(ReconConfig::default())
        .reconcile(ReconRequest {
            manifests: vec![source("a.xlsx", first), source("b.xlsx", second)],
            ..ReconRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(response.records.len(), 2);
    assert!(response
        .summary
        .file_details
        .iter()
        .all(|d| d.status == FileStatus::Success && d.rows == 1));
    assert_eq!(response.summary.total_amount, None);
    assert_eq!(response.summary.warnings, vec![total_overflow_warning()]);

    let json = serde_json::to_value(&response).unwrap();
    assert!(json["summary"]["total_amount"].is_null());
}
