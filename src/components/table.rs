//! Tabular alert content, including the overflow path that moves rows into
//! a CSV attachment.

use super::{KeyValueMap, Text};
use crate::error::{AlertError, Result};
use crate::html::{Element, HtmlNode};
use crate::style::{ContentType, FontSize};
use crate::utils::as_code_block;
use comfy_table::presets::UTF8_FULL;
use itertools::Itertools;
use tracing::debug;
use xxhash_rust::xxh32::Xxh32;

/// Slack only renders up to this many rows in a single monospace block.
pub const SLACK_MAX_TABLE_ROWS: usize = 13;

/// Title characters used for the attachment filename stem.
const FILENAME_STEM_CHARS: usize = 50;

/// One table row: `(column, value)` pairs in insertion order.
pub type Row = Vec<(String, String)>;

/// A component that displays tabular data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
    columns: Vec<String>,
    title: Option<Text>,
    attachment: Option<KeyValueMap>,
    rows_detached: bool,
}

impl Table {
    /// Creates a table from rows of `(column, value)` pairs. Columns are
    /// inferred in first-seen order unless set with `with_columns`.
    pub fn new<R, K, V>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: ToString,
    {
        let rows: Vec<Row> = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .collect();
        let columns = rows
            .iter()
            .flat_map(|row| row.iter().map(|(column, _)| column.clone()))
            .unique()
            .collect();
        Self {
            rows,
            columns,
            title: None,
            attachment: None,
            rows_detached: false,
        }
    }

    /// Sets the title shown above the table. An empty title is ignored.
    pub fn with_title(mut self, title: impl ToString) -> Self {
        let title = title.to_string();
        self.title = (!title.is_empty())
            .then(|| Text::styled(title, ContentType::Important, FontSize::Large));
        self
    }

    /// Sets an explicit column order, replacing the inferred one.
    pub fn with_columns<C: ToString>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.columns = columns.into_iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn title(&self) -> Option<&Text> {
        self.title.as_ref()
    }

    /// The reference left behind by `detach_rows_as_file`.
    pub fn attachment(&self) -> Option<&KeyValueMap> {
        self.attachment.as_ref()
    }

    pub fn rows_detached(&self) -> bool {
        self.rows_detached
    }

    /// Moves all rows into a CSV file and replaces them with a reference to
    /// that file. Returns the file name and the CSV bytes.
    ///
    /// The file name is `{stem}_{hash}.csv` where `stem` is derived from the
    /// title and `hash` identifies the row content. Fails with
    /// `AlreadyDetached` when called more than once.
    pub fn detach_rows_as_file(&mut self) -> Result<(String, Vec<u8>)> {
        if self.rows_detached {
            let filename = self
                .attachment
                .as_ref()
                .and_then(|map| map.entries.first())
                .map(|(_, filename)| filename.clone())
                .unwrap_or_default();
            return Err(AlertError::AlreadyDetached(filename));
        }

        let stem = match &self.title {
            Some(title) => title
                .content
                .chars()
                .take(FILENAME_STEM_CHARS)
                .collect::<String>()
                .replace(' ', "_"),
            None => "table".to_string(),
        };
        let filename = format!("{}_{:08x}.csv", stem, self.content_hash());
        let csv = self.to_csv()?;

        debug!(
            filename = %filename,
            rows = self.rows.len(),
            "Detached table rows into CSV attachment"
        );
        self.attachment = Some(KeyValueMap::new([("Attachment", filename.as_str())]));
        self.rows.clear();
        self.rows_detached = true;
        Ok((filename, csv))
    }

    /// xxHash32 over a length-prefixed serialization of every row.
    fn content_hash(&self) -> u32 {
        let mut hasher = Xxh32::new(0);
        hasher.update(&(self.rows.len() as u64).to_le_bytes());
        for row in &self.rows {
            hasher.update(&(row.len() as u64).to_le_bytes());
            for (column, value) in row {
                for field in [column, value] {
                    hasher.update(&(field.len() as u64).to_le_bytes());
                    hasher.update(field.as_bytes());
                }
            }
        }
        hasher.digest()
    }

    fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(self.columns.iter().map(|column| cell(row, column)))?;
        }
        writer
            .into_inner()
            .map_err(|e| AlertError::Csv(e.into_error().into()))
    }

    pub fn html(&self) -> HtmlNode {
        let mut container = Element::new("div").attr("style", "border:1px solid black;");
        if let Some(title) = &self.title {
            container = container.child(title.html());
        }
        if let Some(attachment) = &self.attachment {
            container = container.child(attachment.html());
        }
        if !self.rows.is_empty() {
            let header = Element::new("tr").children(
                self.columns
                    .iter()
                    .map(|column| Element::new("th").text(column.as_str())),
            );
            let body = self.rows.iter().map(|row| {
                Element::new("tr").children(
                    self.columns
                        .iter()
                        .map(|column| Element::new("td").text(cell(row, column))),
                )
            });
            let table = Element::new("table").child(header).children(body);
            container = container.child(Element::new("div").child(table));
        }
        container.into()
    }

    pub fn classic_md(&self) -> String {
        let mut parts = self.preamble(Text::classic_md, KeyValueMap::classic_md);
        if !self.rows.is_empty() {
            let header = self.columns.join("|");
            let separator = vec![":----:"; self.columns.len()].join("|");
            let body = self
                .rows
                .iter()
                .map(|row| self.columns.iter().map(|column| cell(row, column)).join("|"));
            parts.push(
                [header, separator]
                    .into_iter()
                    .chain(body)
                    .join("\n"),
            );
        }
        parts.join("\n\n").trim().to_string()
    }

    /// Renders every block of at most `SLACK_MAX_TABLE_ROWS` rows as its own
    /// fenced grid table.
    pub fn slack_md(&self) -> String {
        let mut parts = self.preamble(Text::slack_md, KeyValueMap::slack_md);
        for chunk in self.rows.chunks(SLACK_MAX_TABLE_ROWS) {
            parts.push(as_code_block(&self.grid(chunk)));
        }
        parts.join("\n\n").trim().to_string()
    }

    fn preamble(
        &self,
        title_md: fn(&Text) -> String,
        attachment_md: fn(&KeyValueMap) -> String,
    ) -> Vec<String> {
        self.title
            .iter()
            .map(title_md)
            .chain(self.attachment.iter().map(attachment_md))
            .collect()
    }

    fn grid(&self, rows: &[Row]) -> String {
        let mut grid = comfy_table::Table::new();
        grid.load_preset(UTF8_FULL)
            .set_header(self.columns.iter().cloned())
            .add_rows(rows.iter().map(|row| {
                self.columns
                    .iter()
                    .map(|column| cell(row, column).to_string())
                    .collect::<Vec<_>>()
            }));
        grid.to_string()
    }
}

fn cell<'a>(row: &'a Row, column: &str) -> &'a str {
    row.iter()
        .find(|(name, _)| name == column)
        .map(|(_, value)| value.as_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> Table {
        Table::new((0..n).map(|i| {
            vec![
                ("id", i.to_string()),
                ("name", format!("host-{i}")),
            ]
        }))
    }

    #[test]
    fn test_columns_inferred_in_first_seen_order() {
        let table = Table::new(vec![
            vec![("a", "1"), ("b", "2")],
            vec![("c", "3"), ("a", "4")],
        ]);
        assert_eq!(table.columns(), ["a", "b", "c"]);
    }

    #[test]
    fn test_cells_are_coerced_to_strings() {
        let table = Table::new(vec![vec![("n", 7)], vec![("n", 8)]]);
        assert_eq!(table.rows()[1], vec![("n".to_string(), "8".to_string())]);
    }

    #[test]
    fn test_empty_title_is_ignored() {
        assert!(sample(1).with_title("").title().is_none());
        assert!(sample(1).with_title("Report").title().is_some());
    }

    #[test]
    fn test_detach_filename_uses_title_stem() {
        let mut table = sample(2).with_title("Disk usage report");
        let (filename, _) = table.detach_rows_as_file().unwrap();
        assert!(filename.starts_with("Disk_usage_report_"), "{filename}");
        assert!(filename.ends_with(".csv"));
        // stem + '_' + 8 hex digits + ".csv"
        assert_eq!(filename.len(), "Disk_usage_report_".len() + 8 + 4);
    }

    #[test]
    fn test_detach_filename_stem_truncated_to_fifty_chars() {
        let title = "x".repeat(80);
        let (filename, _) = sample(1).with_title(&title).detach_rows_as_file().unwrap();
        assert!(filename.starts_with(&format!("{}_", "x".repeat(50))));
        assert!(!filename.starts_with(&"x".repeat(51)));
    }

    #[test]
    fn test_detach_without_title_uses_table_stem() {
        let (filename, _) = sample(1).detach_rows_as_file().unwrap();
        assert!(filename.starts_with("table_"));
    }

    #[test]
    fn test_detach_hash_is_stable_and_content_addressed() {
        let (a, _) = sample(3).detach_rows_as_file().unwrap();
        let (b, _) = sample(3).detach_rows_as_file().unwrap();
        let (c, _) = sample(4).detach_rows_as_file().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_detach_twice_is_rejected() {
        let mut table = sample(2);
        let (filename, _) = table.detach_rows_as_file().unwrap();
        match table.detach_rows_as_file() {
            Err(AlertError::AlreadyDetached(name)) => assert_eq!(name, filename),
            other => panic!("expected AlreadyDetached, got {other:?}"),
        }
    }

    #[test]
    fn test_detach_clears_rows_and_sets_reference() {
        let mut table = sample(2);
        let (filename, csv) = table.detach_rows_as_file().unwrap();
        assert!(table.rows().is_empty());
        assert!(table.rows_detached());
        assert_eq!(
            table.attachment().unwrap().entries,
            vec![("Attachment".to_string(), filename)]
        );
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "id,name\n0,host-0\n1,host-1\n"
        );
    }

    #[test]
    fn test_csv_quotes_and_fills_missing_cells() {
        let mut table = Table::new(vec![
            vec![("a", "x,y"), ("b", "say \"hi\"")],
            vec![("a", "z")],
        ]);
        let (_, csv) = table.detach_rows_as_file().unwrap();
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "a,b\n\"x,y\",\"say \"\"hi\"\"\"\nz,\n"
        );
    }

    #[test]
    fn test_classic_md_pipe_table() {
        let md = sample(2).with_title("Hosts").classic_md();
        assert_eq!(md, "# Hosts\n\nid|name\n:----:|:----:\n0|host-0\n1|host-1");
    }

    #[test]
    fn test_slack_md_chunks_rows() {
        for (rows, fences) in [(1, 1), (13, 1), (14, 2), (26, 2), (27, 3)] {
            let md = sample(rows).slack_md();
            assert_eq!(md.matches("```").count(), fences * 2, "rows={rows}");
        }
    }

    #[test]
    fn test_slack_md_does_not_mutate() {
        let table = sample(30);
        let before = table.clone();
        assert_eq!(table.slack_md(), table.slack_md());
        assert_eq!(table, before);
    }

    #[test]
    fn test_slack_md_after_detach_shows_reference_only() {
        let mut table = sample(20).with_title("Hosts");
        let (filename, _) = table.detach_rows_as_file().unwrap();
        assert_eq!(
            table.slack_md(),
            format!("*Hosts*\n\n*Attachment:* {filename}")
        );
    }

    #[test]
    fn test_html_missing_cells_render_empty() {
        let table = Table::new(vec![vec![("a", "1")], vec![("b", "2")]]);
        let html = table.html().render();
        assert!(html.contains("<tr><th>a</th><th>b</th></tr>"));
        assert!(html.contains("<tr><td>1</td><td></td></tr>"));
        assert!(html.contains("<tr><td></td><td>2</td></tr>"));
    }
}
