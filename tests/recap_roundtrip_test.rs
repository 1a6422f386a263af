// ==========================================
// RecapApi 集成测试
// ==========================================
// 测试目标: 本系统生成的发票 → 读取汇总 → Rekap Invoice 表
// ==========================================


use chrono::NaiveDate;
use freight_recon::api::{InvoiceApi, InvoiceRequest, RecapApi};
use freight_recon::config::ReconConfig;
use freight_recon::domain::{Cell, InvoiceHeader, RecapStatus, TaxMode};
use freight_recon::importer::{FileParser, UniversalFileParser};
use freight_recon::logging;
use rust_decimal_macros::dec;
use test_helpers::{manifest_xlsx, source, TripRow};

async fn issued_invoice(invoice_no: &str, tax_mode: TaxMode) -> Vec<u8> {
    let trips: Vec<TripRow> = (0..3)
        .map(|i| TripRow::new(&format!("T{}", i), "JKT-BDG-A01", 100_000))
        .collect();
    let request = InvoiceRequest {
        manifests: vec![source("armada.xlsx", manifest_xlsx(&trips, &[]))],
        header: InvoiceHeader {
            bill_to: "PT GLOBAL JET EXPRESS".to_string(),
            ship_to: "GUDANG BOGOR".to_string(),
            invoice_no: invoice_no.to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 12, 31),
            due_date: NaiveDate::from_ymd_opt(2026, 1, 30),
            currency: "IDR".to_string(),
            ..InvoiceHeader::default()
        },
        tax_mode,
        ..InvoiceRequest::default()
    };
    InvoiceApi::new(ReconConfig::default())
        .create_invoice(request)
        .await
        .unwrap()
        .generated_file
}

#[tokio::test]
async fn test_recap_reads_back_issued_invoice() {
    logging::init_test();

    let bytes = issued_invoice("INV-001", TaxMode::WithTax).await;
    let response = RecapApi::new()
        .read_invoices(vec![source("INVOICE DESEMBER.xlsx", bytes)])
        .await
        .unwrap();

    assert_eq!(response.succeeded, 1);
    let outcome = &response.results[0];
    assert_eq!(outcome.status, RecapStatus::Success);
    assert_eq!(outcome.filename, "INVOICE DESEMBER");

    let recap = outcome.data.as_ref().unwrap();
    assert_eq!(recap.bill_to, "PT GLOBAL JET EXPRESS");
    assert_eq!(recap.ship_to, "GUDANG BOGOR");
    assert_eq!(recap.invoice_no, "INV-001");
    assert_eq!(recap.invoice_date, "31/12/2025");
    assert_eq!(recap.due_date, "30/01/2026");
    assert_eq!(recap.currency, "IDR");
    assert_eq!(recap.dpp, dec!(300000));
    assert_eq!(recap.discount, dec!(0));
    assert_eq!(recap.ppn, dec!(3300));
    assert_eq!(recap.pph, dec!(6000));
    assert_eq!(recap.total_payable, dec!(297300));
}

#[tokio::test]
async fn test_recap_export_keeps_successful_rows_only() {
    logging::init_test();

    let first = issued_invoice("INV-001", TaxMode::WithTax).await;
    let second = issued_invoice("INV-002", TaxMode::NoTax).await;
    let without_number = issued_invoice("", TaxMode::WithTax).await;

    let api = RecapApi::new();
    let response = api
        .read_invoices(vec![
            source("a.xlsx", first),
            source("scan.pdf", b"%PDF".to_vec()),
            source("b.xlsx", second),
            source("c.xlsx", without_number),
        ])
        .await
        .unwrap();

    assert_eq!(response.succeeded, 2);
    assert_eq!(response.failed, 2);
    assert_eq!(response.results[1].error.as_deref(), Some("Bukan file Excel (.xlsx)"));
    assert_eq!(
        response.results[3].error.as_deref(),
        Some("Validasi Gagal: 'No. Invoice' (J8) tidak ditemukan.")
    );

    let recaps = response.recaps();
    assert_eq!(recaps[1].invoice_no, "INV-002");
    // no_tax: PPN 为 0，PPH 仍按 DPP 计算
    assert_eq!(recaps[1].ppn, dec!(0));
    assert_eq!(recaps[1].total_payable, dec!(294000));

    let export = api.export(&recaps).unwrap();
    assert!(export.filename.starts_with("Rekap_Invoice_"));
    assert_eq!(export.rows, 2);

    let sheet = UniversalFileParser
        .parse_sheet(&export.filename, &export.generated_file)
        .unwrap();
    assert_eq!(sheet.name(), export.filename);
    assert_eq!(sheet.height(), 3);
    assert_eq!(sheet.cell(0, 0), &Cell::Text("Filename".to_string()));
    assert_eq!(sheet.cell(0, 11), &Cell::Text("Total Bayar".to_string()));
    assert_eq!(sheet.cell(1, 3), &Cell::Text("INV-001".to_string()));
    assert_eq!(sheet.cell(1, 11), &Cell::Number(297300.0));
    assert_eq!(sheet.cell(2, 0), &Cell::Text("b".to_string()));
}
