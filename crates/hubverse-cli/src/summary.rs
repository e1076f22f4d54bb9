use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use hubverse_cli::types::{ConversionResult, DocumentSummary, NhsnResult};

pub fn print_summary(result: &ConversionResult) {
    println!("Dataset: {}", result.dataset);
    match &result.output_dir {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: (dry run)"),
    }
    println!(
        "Forecast rows: {} read, {} kept ({} nowcasts, {} samples, {} filtered ids)",
        result.preprocess.input_rows,
        result.preprocess.output_rows,
        result.preprocess.nowcasts,
        result.preprocess.samples,
        result.preprocess.filtered_output_type_ids,
    );
    println!(
        "Models: {} | Locations in directory: {}",
        result.models.len(),
        result.directory_locations
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Location"),
        header_cell("Forecasts"),
        header_cell("Peaks"),
        header_cell("GT dates"),
        header_cell("Valid"),
        header_cell("Written"),
    ]);
    apply_table_style(&mut table);
    for index in 2..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 5, CellAlignment::Center);
    align_column(&mut table, 6, CellAlignment::Center);

    let mut total_forecasts = 0usize;
    let mut total_peaks = 0usize;
    let mut total_invalid = 0usize;
    for summary in &result.documents {
        total_forecasts += summary.forecast_entries;
        total_peaks += summary.peak_entries;
        if summary.violation.is_some() {
            total_invalid += 1;
        }
        table.add_row(document_row(summary, result.output_dir.is_some()));
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} documents", result.documents.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_forecasts).add_attribute(Attribute::Bold),
        Cell::new(total_peaks).add_attribute(Attribute::Bold),
        dim_cell("-"),
        invalid_total_cell(total_invalid),
        dim_cell("-"),
    ]);
    println!("{table}");

    let invalid: Vec<&DocumentSummary> = result.invalid_documents().collect();
    if !invalid.is_empty() {
        eprintln!("Invalid documents:");
        for summary in invalid {
            if let Some(violation) = &summary.violation {
                eprintln!("- {}: {violation}", summary.file_name);
            }
        }
    }
}

pub fn print_nhsn_summary(result: &NhsnResult) {
    println!("Dataset: NHSN");
    match &result.output_dir {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: (dry run)"),
    }
    println!(
        "Records: {} | Columns: {}",
        result.records,
        result.columns.len()
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Location"),
        header_cell("Weeks"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for series in &result.series {
        table.add_row(vec![
            Cell::new(&series.file_name),
            Cell::new(&series.location),
            count_cell(series.weeks),
        ]);
    }
    println!("{table}");
}

fn document_row(summary: &DocumentSummary, wrote_output: bool) -> Vec<Cell> {
    vec![
        Cell::new(&summary.file_name),
        Cell::new(&summary.location),
        Cell::new(summary.forecast_entries),
        count_cell(summary.peak_entries),
        Cell::new(summary.ground_truth_dates),
        if summary.violation.is_some() {
            Cell::new("no").fg(Color::Red).add_attribute(Attribute::Bold)
        } else {
            Cell::new("yes").fg(Color::Green)
        },
        match (wrote_output, summary.written) {
            (false, _) => dim_cell("-"),
            (true, true) => Cell::new("yes").fg(Color::Green),
            (true, false) => Cell::new("skipped").fg(Color::Yellow),
        },
    ]
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn invalid_total_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(format!("{count} invalid"))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("all").fg(Color::Green).add_attribute(Attribute::Bold)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
