//! Markdown and CSV export of a grid snapshot

use csv::{QuoteStyle, WriterBuilder};

use crate::error::MatrixError;
use crate::grid::Grid;
use crate::render::format_value;

/// Heading used when the grid has an empty title
pub const FALLBACK_TITLE: &str = "Weighted Matrix";

/// Which columns the Markdown table includes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Add a `Weight` column after the criteria labels
    pub include_weights: bool,
    /// Render cells as `base (weighted)` instead of just `base`
    pub include_weighted_values: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            include_weights: true,
            include_weighted_values: true,
        }
    }
}

/// Render the grid as a Markdown heading followed by a pipe table
pub fn to_markdown(grid: &Grid, options: MarkdownOptions) -> String {
    let title = if grid.title().is_empty() {
        FALLBACK_TITLE
    } else {
        grid.title()
    };
    let mut md = format!("# {}\n\n", escape_cell(title));

    md.push_str("| Criteria ");
    if options.include_weights {
        md.push_str("| Weight ");
    }
    for column in grid.columns() {
        md.push_str(&format!("| {} ", escape_cell(column)));
    }
    md.push_str("|\n");

    md.push_str("|:-------");
    if options.include_weights {
        md.push_str("|:-----:");
    }
    for _ in grid.columns() {
        md.push_str("|:-----:");
    }
    md.push_str("|\n");

    for row in grid.rows() {
        md.push_str(&format!("| {} ", escape_cell(row.label())));
        if options.include_weights {
            md.push_str(&format!("| {} ", format_value(row.weight())));
        }
        for cell in row.cells() {
            if options.include_weighted_values {
                md.push_str(&format!(
                    "| {} ({}) ",
                    format_value(cell.base()),
                    format_value(cell.weighted(row.weight()))
                ));
            } else {
                md.push_str(&format!("| {} ", format_value(cell.base())));
            }
        }
        md.push_str("|\n");
    }

    md
}

/// Make text safe inside a pipe table cell: backslashes and pipes are
/// backslash-escaped and line breaks become spaces
fn escape_cell(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '|' => escaped.push_str("\\|"),
            '\r' => {
                chars.next_if_eq(&'\n');
                escaped.push(' ');
            }
            '\n' => escaped.push(' '),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Refuse to export a grid with no criteria or no options
pub fn ensure_exportable(grid: &Grid, format: &'static str) -> Result<(), MatrixError> {
    if grid.row_count() == 0 || grid.column_count() == 0 {
        return Err(MatrixError::EmptyExport(format));
    }
    Ok(())
}

/// Render the grid as CSV: a title record, a header record, then one record
/// per criterion with its weight and base values. Every field is quoted.
pub fn to_csv(grid: &Grid) -> Result<String, MatrixError> {
    ensure_exportable(grid, "CSV")?;
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record([grid.title()])?;

    let mut header = vec!["Criteria".to_string(), "Weight".to_string()];
    header.extend(grid.columns().iter().cloned());
    writer.write_record(&header)?;

    for row in grid.rows() {
        let mut record = vec![row.label().to_string(), row.weight().to_string()];
        record.extend(row.cells().iter().map(|cell| cell.base().to_string()));
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| MatrixError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Download file name for a CSV export: whitespace runs become underscores
pub fn csv_file_name(title: &str) -> String {
    let stem = title.split_whitespace().collect::<Vec<_>>().join("_");
    let stem = if stem.is_empty() { "matrix".to_string() } else { stem };
    format!("{}_matrix.csv", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatrixConfig;

    /// Parsed view of an exported Markdown table
    struct ParsedMarkdown {
        title: String,
        columns: Vec<String>,
        rows: Vec<(String, f64, Vec<f64>)>,
    }

    /// Undo `escape_cell` for one cell or heading
    fn unescape(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                out.extend(chars.next());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Split a table line on its unescaped pipes
    fn split_row(line: &str) -> Vec<String> {
        let mut cells = Vec::new();
        let mut current = String::new();
        let mut chars = line.trim().chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    current.push(c);
                    current.extend(chars.next());
                }
                '|' => cells.push(std::mem::take(&mut current)),
                c => current.push(c),
            }
        }
        cells.push(current);
        // Drop the empty edges outside the leading and trailing pipes
        cells.remove(0);
        cells.pop();
        cells.iter().map(|cell| unescape(cell.trim())).collect()
    }

    /// Minimal reader for tables written with weights and weighted values
    fn parse_markdown(md: &str) -> ParsedMarkdown {
        let mut lines = md.lines();
        let title = lines
            .next()
            .and_then(|l| l.strip_prefix("# "))
            .map(unescape)
            .unwrap();
        let table: Vec<&str> = lines.filter(|l| l.starts_with('|')).collect();

        let header = split_row(table[0]);
        assert_eq!(header[0], "Criteria");
        assert_eq!(header[1], "Weight");
        let columns = header[2..].to_vec();

        let rows = table[2..]
            .iter()
            .map(|line| {
                let fields = split_row(line);
                let weight: f64 = fields[1].parse().unwrap();
                let bases = fields[2..]
                    .iter()
                    .map(|f| f.split(" (").next().unwrap().parse().unwrap())
                    .collect();
                (fields[0].clone(), weight, bases)
            })
            .collect();

        ParsedMarkdown { title, columns, rows }
    }

    fn sample_grid() -> Grid {
        let mut grid = Grid::default();
        grid.set_title("Vacation");
        grid.rename_column(0, "Beach");
        grid.set_cell_base(0, 0, 5.0);
        grid.set_cell_base(1, 2, -3.5);
        grid.adjust_weight(1, 1.0);
        grid.adjust_weight(2, -3.0);
        grid.set_cell_base(2, 3, 4.0);
        grid
    }

    #[test]
    fn test_markdown_layout() {
        let mut grid = Grid::new(&MatrixConfig {
            title: "T".to_string(),
            row_labels: vec!["Cost".to_string()],
            column_labels: vec!["A".to_string(), "B".to_string()],
            ..MatrixConfig::default()
        });
        grid.set_cell_base(0, 1, 3.0);
        grid.adjust_weight(0, 1.0);

        let md = to_markdown(&grid, MarkdownOptions::default());
        let expected = "# T\n\n\
            | Criteria | Weight | A | B |\n\
            |:-------|:-----:|:-----:|:-----:|\n\
            | Cost | 2.0 | 0.0 (0.0) | 3.0 (6.0) |\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_markdown_without_weights() {
        let mut grid = Grid::new(&MatrixConfig {
            title: "T".to_string(),
            row_labels: vec!["Cost".to_string()],
            column_labels: vec!["A".to_string()],
            ..MatrixConfig::default()
        });
        grid.set_cell_base(0, 0, -2.0);

        let md = to_markdown(
            &grid,
            MarkdownOptions {
                include_weights: false,
                include_weighted_values: false,
            },
        );
        assert_eq!(md, "# T\n\n| Criteria | A |\n|:-------|:-----:|\n| Cost | -2.0 |\n");
    }

    #[test]
    fn test_markdown_empty_title_fallback() {
        let mut grid = Grid::default();
        grid.set_title("");
        let md = to_markdown(&grid, MarkdownOptions::default());
        assert!(md.starts_with("# Weighted Matrix\n\n"));
    }

    #[test]
    fn test_markdown_round_trip() {
        let grid = sample_grid();
        let parsed = parse_markdown(&to_markdown(&grid, MarkdownOptions::default()));

        assert_eq!(parsed.title, grid.title());
        assert_eq!(parsed.columns, grid.columns());
        assert_eq!(parsed.rows.len(), grid.row_count());
        for ((label, weight, bases), row) in parsed.rows.iter().zip(grid.rows()) {
            assert_eq!(label, row.label());
            assert!((weight - row.weight()).abs() < 0.05);
            for (parsed_base, cell) in bases.iter().zip(row.cells()) {
                assert!(
                    (parsed_base - cell.base()).abs() < 0.05,
                    "base {} parsed as {}",
                    cell.base(),
                    parsed_base
                );
            }
        }
    }

    #[test]
    fn test_markdown_escapes_pipes_in_labels() {
        let mut grid = sample_grid();
        grid.set_title("Pick | choose");
        grid.rename_column(0, "Price | Cost");
        grid.rename_column(1, "C:\\temp");
        grid.rename_row(1, "Speed |");
        grid.rename_row(2, "Two\nlines");

        let md = to_markdown(&grid, MarkdownOptions::default());
        let table: Vec<&str> = md.lines().filter(|l| l.starts_with('|')).collect();
        let widths: Vec<usize> = table.iter().map(|l| split_row(l).len()).collect();
        assert!(
            widths.iter().all(|&w| w == 2 + grid.column_count()),
            "uneven table {:?} in\n{}",
            widths,
            md
        );
        assert!(md.contains("| Price \\| Cost |"));

        let parsed = parse_markdown(&md);
        assert_eq!(parsed.title, "Pick | choose");
        assert_eq!(parsed.columns[0], "Price | Cost");
        assert_eq!(parsed.columns[1], "C:\\temp");
        assert_eq!(parsed.rows[1].0, "Speed |");
        assert_eq!(parsed.rows[2].0, "Two lines");
        assert_eq!(parsed.rows[1].2, vec![0.0, 0.0, -3.5, 0.0]);
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("plain"), "plain");
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell("a\\b"), "a\\\\b");
        assert_eq!(escape_cell("a\r\nb\nc"), "a b c");
    }

    #[test]
    fn test_csv_layout() {
        let mut grid = Grid::new(&MatrixConfig {
            title: "My Matrix".to_string(),
            row_labels: vec!["Cost".to_string(), "Fun".to_string()],
            column_labels: vec!["A".to_string(), "B".to_string()],
            ..MatrixConfig::default()
        });
        grid.set_cell_base(0, 0, 5.0);
        grid.set_cell_base(1, 1, -2.5);
        grid.adjust_weight(1, 1.0);

        let csv = to_csv(&grid).unwrap();
        let expected = "\"My Matrix\"\n\
            \"Criteria\",\"Weight\",\"A\",\"B\"\n\
            \"Cost\",\"1\",\"5\",\"0\"\n\
            \"Fun\",\"2\",\"0\",\"-2.5\"\n";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_csv_escapes_quotes() {
        let mut grid = Grid::default();
        grid.rename_row(0, "Say \"hi\", then leave");
        let csv = to_csv(&grid).unwrap();
        assert!(csv.contains("\"Say \"\"hi\"\", then leave\""));
    }

    #[test]
    fn test_csv_is_readable_back() {
        let grid = sample_grid();
        let csv = to_csv(&grid).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&records[0][0], "Vacation");
        assert_eq!(records.len(), 2 + grid.row_count());
        assert_eq!(&records[3][4], "-3.5");
    }

    #[test]
    fn test_empty_grid_is_not_exported() {
        let no_rows = Grid::new(&MatrixConfig {
            row_labels: Vec::new(),
            ..MatrixConfig::default()
        });
        assert!(matches!(to_csv(&no_rows), Err(MatrixError::EmptyExport("CSV"))));
        assert!(matches!(
            ensure_exportable(&no_rows, "markdown"),
            Err(MatrixError::EmptyExport("markdown"))
        ));

        let no_columns = Grid::new(&MatrixConfig {
            column_labels: Vec::new(),
            ..MatrixConfig::default()
        });
        let err = to_csv(&no_columns).unwrap_err();
        assert_eq!(err.to_string(), "No CSV available to export");

        assert!(ensure_exportable(&Grid::default(), "markdown").is_ok());
    }

    #[test]
    fn test_csv_file_name() {
        assert_eq!(csv_file_name("Weighted Matrix Tool"), "Weighted_Matrix_Tool_matrix.csv");
        assert_eq!(csv_file_name("  "), "matrix_matrix.csv");
    }
}
