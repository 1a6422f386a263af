// ==========================================
// 运费账单对账系统 - 发票工作簿输出
// ==========================================
// 工作表:
//   1. INVOICE            抬头 + 行项目 + 合计 + 大写 + 签字栏
//   2. KWITANSI           收据
//   3. RINCIAN RITASE     分组明细
//   4. RINCIAN KENDARAAN  逐趟明细
// 单元格位置固定，Rekap Invoice 按相同位置回读
// ==========================================

use crate::config::ReconConfig;
use crate::domain::invoice::{InvoiceDocument, InvoiceLine};
use crate::domain::types::TaxMode;
use crate::report::consolidated_writer::amount_f64;
use crate::report::error::ReportResult;
use crate::report::period::long_date;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

pub const INVOICE_SHEET: &str = "INVOICE";
pub const RECEIPT_SHEET: &str = "KWITANSI";
pub const TRIP_SUMMARY_SHEET: &str = "RINCIAN RITASE";
pub const TRIP_DETAIL_SHEET: &str = "RINCIAN KENDARAAN";

/// INVOICE 表中的固定位置（0-based 行, 列）
pub mod cells {
    pub const BILL_TO: (u32, u16) = (6, 1); // B7
    pub const SHIP_TO: (u32, u16) = (11, 1); // B12
    pub const INVOICE_NO: (u32, u16) = (7, 9); // J8
    pub const INVOICE_DATE: (u32, u16) = (12, 9); // J13
    pub const CURRENCY: (u32, u16) = (12, 10); // K13
    pub const DUE_DATE: (u32, u16) = (14, 10); // K15
    /// 合计标签列 H，金额列 K
    pub const TOTAL_LABEL_COL: u16 = 7;
    pub const TOTAL_VALUE_COL: u16 = 10;
    /// 行项目表头（第 17 行）与首行
    pub const LINE_HEADER_ROW: u32 = 16;
    pub const FIRST_LINE_ROW: u32 = 17;
}

const ACCOUNTING_FORMAT: &str = r#"_("Rp"* #,##0_);_("Rp"* (#,##0);_("Rp"* "-"??_);_(@_)"#;
const HEADER_FILL: u32 = 0xED7D31;

/// 发票中的固定文字
#[derive(Debug, Clone)]
pub struct InvoiceLabels {
    pub issuer_name: String,
    pub client_name: String,
    pub vat_rate: Decimal,
    pub pph_rate: Decimal,
}

impl InvoiceLabels {
    pub fn from_config(config: &ReconConfig) -> Self {
        Self {
            issuer_name: config.issuer_name.clone(),
            client_name: config.client_name.clone(),
            vat_rate: config.vat_rate,
            pph_rate: config.pph_rate,
        }
    }
}

/// 0.011 → "1.1%"
pub fn percent_label(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// 1234567.6 → "1.234.568"
pub fn format_thousands(value: Decimal) -> String {
    let rounded = value.round();
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

struct Formats {
    header: Format,
    title: Format,
    bold: Format,
    text: Format,
    centered: Format,
    boxed: Format,
    boxed_center: Format,
    wrapped: Format,
    accounting: Format,
    rupiah: Format,
    total_label: Format,
    total_value: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin),
            title: Format::new()
                .set_bold()
                .set_font_size(14)
                .set_align(FormatAlign::Center),
            bold: Format::new().set_bold(),
            text: Format::new(),
            centered: Format::new().set_align(FormatAlign::Center),
            boxed: Format::new().set_border(FormatBorder::Thin),
            boxed_center: Format::new()
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            wrapped: Format::new()
                .set_text_wrap()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin),
            accounting: Format::new()
                .set_num_format(ACCOUNTING_FORMAT)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin),
            rupiah: Format::new()
                .set_num_format("Rp #,##0")
                .set_border(FormatBorder::Thin),
            total_label: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin),
            total_value: Format::new()
                .set_bold()
                .set_num_format("Rp #,##0")
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_border(FormatBorder::Thin),
        }
    }
}

/// 输出四张工作表的发票工作簿
pub fn write_invoice(doc: &InvoiceDocument, labels: &InvoiceLabels) -> ReportResult<Vec<u8>> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    write_invoice_sheet(workbook.add_worksheet(), doc, labels, &formats)?;
    write_receipt_sheet(workbook.add_worksheet(), doc, labels, &formats)?;
    write_trip_summary_sheet(workbook.add_worksheet(), doc, labels, &formats)?;
    write_trip_detail_sheet(workbook.add_worksheet(), doc, labels, &formats)?;

    Ok(workbook.save_to_buffer()?)
}

fn date_text(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

// ==========================================
// INVOICE
// ==========================================
fn write_invoice_sheet(
    ws: &mut Worksheet,
    doc: &InvoiceDocument,
    labels: &InvoiceLabels,
    f: &Formats,
) -> ReportResult<()> {
    let header = &doc.header;
    ws.set_name(INVOICE_SHEET)?;
    ws.set_paper_size(9);
    ws.set_portrait();
    ws.set_print_fit_to_pages(1, 0);

    // 抬头
    ws.merge_range(1, 2, 1, 8, &labels.issuer_name, &f.title)?;
    ws.write_string_with_format(2, 9, "Invoice", &f.title)?;

    ws.write_string_with_format(6, 0, "Tagihan Kepada :", &f.bold)?;
    ws.write_string_with_format(cells::BILL_TO.0, cells::BILL_TO.1, &header.bill_to, &f.bold)?;
    ws.write_string(7, 1, &header.bill_address)?;
    ws.write_string(10, 1, format!("NPWP : {}", header.bill_npwp))?;
    ws.write_string_with_format(11, 0, "Dikirim ke :", &f.bold)?;
    ws.write_string_with_format(cells::SHIP_TO.0, cells::SHIP_TO.1, &header.ship_to, &f.bold)?;
    ws.write_string(12, 1, &header.ship_address)?;

    ws.write_string_with_format(6, 9, "No. Invoice", &f.header)?;
    ws.write_string_with_format(cells::INVOICE_NO.0, cells::INVOICE_NO.1, &header.invoice_no, &f.boxed_center)?;
    ws.write_string_with_format(9, 9, "No. Faktur", &f.header)?;
    ws.write_string_with_format(11, 9, "Invoice Date", &f.header)?;
    ws.write_string_with_format(11, 10, "Currency", &f.header)?;
    ws.write_string_with_format(
        cells::INVOICE_DATE.0,
        cells::INVOICE_DATE.1,
        date_text(header.invoice_date),
        &f.boxed_center,
    )?;
    ws.write_string_with_format(cells::CURRENCY.0, cells::CURRENCY.1, &header.currency, &f.boxed_center)?;
    ws.write_string_with_format(13, 9, "Tax Rate", &f.header)?;
    ws.write_string_with_format(13, 10, "Due Date", &f.header)?;
    let tax_rate = match doc.tax_mode {
        TaxMode::WithTax => percent_label(labels.vat_rate),
        TaxMode::NoTax => "0%".to_string(),
    };
    ws.write_string_with_format(14, 9, tax_rate, &f.boxed_center)?;
    ws.write_string_with_format(
        cells::DUE_DATE.0,
        cells::DUE_DATE.1,
        date_text(header.due_date),
        &f.boxed_center,
    )?;

    // 行项目表头
    let hr = cells::LINE_HEADER_ROW;
    ws.write_string_with_format(hr, 0, "No.", &f.header)?;
    ws.merge_range(hr, 1, hr, 4, "Deskripsi", &f.header)?;
    for (col, title) in [
        (5u16, "Tipe Mobil"),
        (6, "Total Rit"),
        (7, "Biaya Per Rit"),
        (8, "Diskon"),
        (9, "PPN"),
        (10, "Total Biaya"),
    ] {
        ws.write_string_with_format(hr, col, title, &f.header)?;
    }

    // 行项目
    let mut row = cells::FIRST_LINE_ROW;
    if doc.lines.is_empty() {
        ws.write_number_with_format(row, 0, 1, &f.boxed_center)?;
        ws.merge_range(row, 1, row, 4, "No Data", &f.wrapped)?;
        row += 1;
    }
    for line in &doc.lines {
        write_invoice_line(ws, row, line, &doc.period_label, f)?;
        row += 1;
    }

    // 合计
    let s = row;
    let totals = &doc.totals;
    ws.merge_range(s, 0, s + 1, 6, &doc.amount_in_words.to_uppercase(), &f.wrapped)?;
    let vat_label = format!("Total PPN ({})", percent_label(labels.vat_rate));
    let pph_label = format!("Total PPh 23 ({})", percent_label(labels.pph_rate));
    let total_rows: [(&str, Option<Decimal>); 5] = [
        ("Total Diskon", None),
        ("Total Dasar Pengenaan Pajak", Some(totals.dpp)),
        (&vat_label, Some(totals.vat)),
        (&pph_label, Some(totals.pph)),
        ("Total Bayar", Some(totals.payable)),
    ];
    for (offset, (label, value)) in total_rows.iter().enumerate() {
        let r = s + offset as u32;
        ws.merge_range(r, cells::TOTAL_LABEL_COL, r, 9, label, &f.boxed)?;
        match value {
            Some(v) => {
                ws.write_number_with_format(r, cells::TOTAL_VALUE_COL, amount_f64(*v), &f.accounting)?;
            }
            None => {
                ws.write_string_with_format(r, cells::TOTAL_VALUE_COL, "-", &f.accounting)?;
            }
        }
    }

    let payment_note = format!(
        "Deskripsi : Biaya Transportasi {}\nSilahkan melakukan pembayaran dengan melakukan transfer ke rekening :\n{}\n{}",
        doc.period_label, labels.issuer_name, header.bank_info
    );
    ws.merge_range(
        s + 2,
        0,
        s + 4,
        6,
        &payment_note,
        &Format::new().set_text_wrap().set_border(FormatBorder::Thin),
    )?;

    // 签字栏
    let sig = s + 6;
    for (col, title) in [(0u16, "Prepared By"), (3, "Checked By"), (6, "Approved By"), (9, "Received By")] {
        ws.merge_range(sig, col, sig, col + 1, title, &f.text)?;
        ws.write_string(sig + 8, col, "Tanggal:")?;
    }

    for (col, width) in [(0u16, 5), (1, 25), (2, 10), (3, 10), (4, 10), (5, 15), (6, 10), (7, 15), (8, 15), (9, 15), (10, 20)] {
        ws.set_column_width(col, width)?;
    }
    Ok(())
}

fn write_invoice_line(
    ws: &mut Worksheet,
    row: u32,
    line: &InvoiceLine,
    period_label: &str,
    f: &Formats,
) -> ReportResult<()> {
    ws.write_number_with_format(row, 0, line.no as f64, &f.boxed_center)?;
    ws.merge_range(
        row,
        1,
        row,
        4,
        &format!("Biaya Transportasi {}\n{}", period_label, line.route),
        &f.wrapped,
    )?;
    ws.write_string_with_format(row, 5, &line.vehicle_type, &f.boxed_center)?;
    ws.write_number_with_format(row, 6, line.trip_count as f64, &f.boxed_center)?;
    ws.write_number_with_format(row, 7, amount_f64(line.unit_price), &f.accounting)?;
    ws.write_string_with_format(row, 8, "-", &f.accounting)?;
    ws.write_number_with_format(row, 9, amount_f64(line.vat), &f.accounting)?;
    ws.write_number_with_format(row, 10, amount_f64(line.amount), &f.accounting)?;
    ws.set_row_height(row, 30)?;
    Ok(())
}

// ==========================================
// KWITANSI
// ==========================================
fn write_receipt_sheet(
    ws: &mut Worksheet,
    doc: &InvoiceDocument,
    labels: &InvoiceLabels,
    f: &Formats,
) -> ReportResult<()> {
    let header = &doc.header;
    let amount = format_thousands(doc.totals.payable);
    ws.set_name(RECEIPT_SHEET)?;

    ws.write_string_with_format(3, 2, &labels.issuer_name, &f.bold)?;
    ws.write_string_with_format(3, 9, format!("NO: {}", header.invoice_no), &f.bold)?;
    ws.merge_range(7, 0, 7, 10, "KWITANSI", &f.title)?;
    ws.write_string(9, 0, "Untuk transaksi tersebut dibawah ini")?;

    let rows = [
        ("Nama Perusahaan", header.bill_to.clone()),
        ("Jumlah", format!("Rp {}", amount)),
        (
            "Transaksi",
            format!(
                "Biaya pengiriman ekspedisi logistik {} (termasuk Ppn-Pph 23)",
                header.bill_to
            ),
        ),
    ];
    for (offset, (label, value)) in rows.iter().enumerate() {
        let r = 10 + offset as u32;
        ws.write_string(r, 0, *label)?;
        ws.write_string(r, 1, ":")?;
        ws.write_string(r, 2, value)?;
    }

    ws.write_string_with_format(17, 1, "Rp", &f.bold)?;
    ws.write_string_with_format(17, 2, &amount, &f.bold)?;
    ws.write_string_with_format(18, 1, "Terbilang", &f.bold)?;
    ws.write_string(18, 2, &doc.amount_in_words)?;

    let issued = header.invoice_date.map(long_date).unwrap_or_default();
    ws.write_string_with_format(20, 8, format!("Jakarta, {}", issued).trim_end(), &f.centered)?;

    ws.write_string(21, 0, "Pembayaran dianggap sah")?;
    ws.write_string(22, 0, "setelah cek /giro diuangkan")?;
    ws.write_string_with_format(21, 2, "Cek :", &f.boxed)?;
    ws.write_string_with_format(22, 2, "Giro :", &f.boxed)?;
    ws.write_string_with_format(23, 2, "Cash :", &f.boxed)?;

    ws.write_string(28, 0, "Mengetahui,")?;
    ws.write_string_with_format(35, 0, &labels.issuer_name, &f.bold)?;

    ws.set_column_width(0, 25)?;
    ws.set_column_width(2, 5)?;
    ws.set_column_width(3, 30)?;
    Ok(())
}

// ==========================================
// RINCIAN RITASE
// ==========================================
fn write_trip_summary_sheet(
    ws: &mut Worksheet,
    doc: &InvoiceDocument,
    labels: &InvoiceLabels,
    f: &Formats,
) -> ReportResult<()> {
    ws.set_name(TRIP_SUMMARY_SHEET)?;

    let titles = [
        "RINCIAN RITASE",
        doc.project_name.as_str(),
        "LAPORAN PEMAKAIAN KENDARAAN",
        labels.issuer_name.as_str(),
        doc.period_label.as_str(),
    ];
    for (r, title) in titles.iter().enumerate() {
        let fmt = if r == 0 { &f.title } else { &f.centered };
        ws.merge_range(r as u32, 0, r as u32, 7, title, fmt)?;
    }

    let columns = [
        "NO",
        "TANGGAL",
        "RUTE",
        "TYPE",
        "JENIS TRIP",
        "TOTAL RITASE",
        "HARGA/RIT",
        "TOTAL HARGA",
    ];
    for (col, title) in columns.iter().enumerate() {
        ws.write_string_with_format(5, col as u16, *title, &f.header)?;
    }

    let date_range = doc
        .period_label
        .strip_prefix("Periode ")
        .unwrap_or(&doc.period_label)
        .to_uppercase();
    let mut row = 6u32;
    for line in &doc.lines {
        ws.write_number_with_format(row, 0, line.no as f64, &f.boxed_center)?;
        ws.write_string_with_format(row, 1, &date_range, &f.boxed_center)?;
        ws.write_string_with_format(row, 2, &line.route, &f.boxed)?;
        ws.write_string_with_format(row, 3, &line.vehicle_type, &f.boxed_center)?;
        ws.write_string_with_format(row, 4, &line.trip_type, &f.boxed_center)?;
        ws.write_number_with_format(row, 5, line.trip_count as f64, &f.boxed_center)?;
        ws.write_number_with_format(row, 6, amount_f64(line.unit_price), &f.rupiah)?;
        ws.write_number_with_format(row, 7, amount_f64(line.amount), &f.rupiah)?;
        row += 1;
    }

    ws.merge_range(row, 0, row, 6, "TOTAL", &f.total_label)?;
    ws.write_number_with_format(row, 7, amount_f64(doc.totals.dpp), &f.total_value)?;

    write_acknowledgement(ws, row + 2, labels)?;

    for (col, width) in [(0u16, 5), (1, 25), (2, 20), (3, 10), (4, 15), (5, 14), (6, 15), (7, 18)] {
        ws.set_column_width(col, width)?;
    }
    Ok(())
}

// ==========================================
// RINCIAN KENDARAAN
// ==========================================
fn write_trip_detail_sheet(
    ws: &mut Worksheet,
    doc: &InvoiceDocument,
    labels: &InvoiceLabels,
    f: &Formats,
) -> ReportResult<()> {
    ws.set_name(TRIP_DETAIL_SHEET)?;

    let columns = [
        "NO",
        "TANGGAL",
        "RUTE",
        "KODE TUGAS",
        "TIPE UNIT",
        "TRIP",
        "NO POLISI",
        "HARGA",
    ];
    for (col, title) in columns.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *title, &f.header)?;
    }

    let mut row = 1u32;
    for trip in &doc.trips {
        ws.write_number_with_format(row, 0, trip.no as f64, &f.boxed_center)?;
        ws.write_string_with_format(row, 1, date_text(trip.date), &f.boxed_center)?;
        ws.write_string_with_format(row, 2, &trip.route, &f.boxed)?;
        ws.write_string_with_format(row, 3, &trip.task_code, &f.boxed)?;
        ws.write_string_with_format(row, 4, &trip.vehicle_type, &f.boxed_center)?;
        ws.write_string_with_format(row, 5, &trip.trip_type, &f.boxed_center)?;
        ws.write_string_with_format(row, 6, &trip.plate_number, &f.boxed)?;
        ws.write_number_with_format(row, 7, amount_f64(trip.price), &f.rupiah)?;
        row += 1;
    }

    // 每趟恰好属于一个发票行，合计即 DPP
    ws.merge_range(row, 0, row, 6, "TOTAL", &f.total_label)?;
    ws.write_number_with_format(row, 7, amount_f64(doc.totals.dpp), &f.total_value)?;

    write_acknowledgement(ws, row + 2, labels)?;

    for (col, width) in [(0u16, 5), (1, 12), (2, 20), (3, 20), (4, 12), (5, 15), (6, 12), (7, 18)] {
        ws.set_column_width(col, width)?;
    }
    Ok(())
}

/// 双方 "Mengetahui" 签字栏
fn write_acknowledgement(ws: &mut Worksheet, row: u32, labels: &InvoiceLabels) -> ReportResult<()> {
    let bold = Format::new().set_bold();
    ws.write_string(row, 1, "Mengetahui")?;
    ws.write_string_with_format(row + 6, 1, &labels.issuer_name, &bold)?;
    ws.write_string(row, 6, "Mengetahui")?;
    ws.write_string_with_format(row + 6, 6, &labels.client_name, &bold)?;
    Ok(())
}
