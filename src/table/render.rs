//! Plain-text table output

use crate::api::types::Row;
use crate::table::columns::Column;
use crate::table::format::format_cell;
use std::fmt::Write;

/// Render `rows` under the given columns as an aligned text table
pub fn render_table(columns: &[&Column], rows: &[Row]) -> String {
    let header: Vec<String> = columns.iter().map(|c| c.label.to_string()).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| format_cell(c.format, c.key, row)).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for line in &body {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for line in &body {
        push_line(&mut out, line, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

/// `Page 2 of 7 (650 rows)`
pub fn page_footer(page: usize, total_pages: usize, total_count: usize) -> String {
    format!("Page {} of {} ({} rows)", page, total_pages.max(1), total_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::format::Format;
    use serde_json::json;

    #[test]
    fn test_render_aligns_columns() {
        let stock = Column::text("stock", "Stock");
        let price = Column::numeric("price", "Price", Format::Currency);
        let rows: Vec<Row> = vec![
            json!({"stock": "AAPL", "price": 189.5}).as_object().cloned().unwrap(),
            json!({"stock": "BRK.A", "price": null}).as_object().cloned().unwrap(),
        ];

        let text = render_table(&[&stock, &price], &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Stock  Price");
        assert_eq!(lines[1], "-----  -------");
        assert_eq!(lines[2], "AAPL   $189.50");
        assert_eq!(lines[3], "BRK.A  N/A");
        assert_eq!(page_footer(1, 0, 0), "Page 1 of 1 (0 rows)");
    }
}
