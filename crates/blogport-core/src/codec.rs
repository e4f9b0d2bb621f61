//! CSV import/export codec.
//!
//! Import is tolerant of arbitrary spreadsheets: column roles are detected by
//! case-insensitive keyword matching against the header row instead of a
//! fixed schema. Export always writes the same eight columns, every value
//! quoted.

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use tracing::debug;

use crate::{
    error::{CoreError, Result},
    record::{ImportRecord, parse_price},
};

/// Header row written by [`serialize`].
pub const EXPORT_HEADERS: [&str; 8] = [
    "Title",
    "Slug",
    "Author",
    "Price",
    "Content",
    "Categories",
    "Published Date",
    "Image URL",
];

/// Field of an [`ImportRecord`] that a CSV column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Title,
    Slug,
    Author,
    Price,
    Content,
    Categories,
    PublishedAt,
    ImageUrl,
}

const COLUMN_COUNT: usize = 8;

/// Keywords that identify each column role, evaluated in order.
///
/// A role takes the first header containing any of its keywords. Roles are
/// resolved independently, so one header may feed several roles.
pub const COLUMN_KEYWORDS: [(Column, &[&str]); COLUMN_COUNT] = [
    (Column::Title, &["title"]),
    (Column::Slug, &["slug"]),
    (Column::Author, &["author"]),
    (Column::Price, &["price"]),
    (Column::Content, &["content", "description"]),
    (Column::Categories, &["categories", "category"]),
    (Column::PublishedAt, &["date", "published"]),
    (Column::ImageUrl, &["image", "url"]),
];

/// Resolved column positions for one header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [Option<usize>; COLUMN_COUNT],
}

impl ColumnMap {
    /// Detect column roles from header labels.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let normalized: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim().trim_matches('"').to_lowercase())
            .collect();

        let mut map = Self::default();
        for (slot, (_, keywords)) in map.indices.iter_mut().zip(COLUMN_KEYWORDS.iter()) {
            *slot = normalized
                .iter()
                .position(|header| keywords.iter().any(|k| header.contains(k)));
        }
        map
    }

    /// Position of the column feeding `column`, if any header matched.
    #[must_use]
    pub fn index(&self, column: Column) -> Option<usize> {
        COLUMN_KEYWORDS
            .iter()
            .position(|(c, _)| *c == column)
            .and_then(|slot| self.indices[slot])
    }

    fn value<'r>(&self, row: &'r StringRecord, column: Column) -> &'r str {
        self.index(column)
            .and_then(|i| row.get(i))
            .unwrap_or_default()
    }

    /// Build a record from one data row.
    pub fn record(&self, row: &StringRecord) -> ImportRecord {
        let text = |column| self.value(row, column).to_string();

        ImportRecord {
            title: text(Column::Title),
            slug: text(Column::Slug),
            author: Some(text(Column::Author)),
            price: Some(parse_price(self.value(row, Column::Price)).unwrap_or(0.0)),
            content: Some(text(Column::Content)),
            categories: Some(text(Column::Categories)),
            published_at: Some(text(Column::PublishedAt)),
            image_url: Some(text(Column::ImageUrl)),
        }
    }
}

/// Parse CSV text into import records, one per data row.
///
/// The first non-blank row is the header. Quoted fields may contain commas,
/// doubled quotes and line breaks. Blank rows are ignored.
///
/// Every value is trimmed after unquoting, so whitespace just inside the
/// quotes of a quoted field is dropped too.
pub fn parse(text: &str) -> Result<Vec<ImportRecord>> {
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        // Applies to quoted fields as well.
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        rows.push(row);
    }

    let Some((header, data)) = rows.split_first() else {
        return Err(missing_rows());
    };
    if data.is_empty() {
        return Err(missing_rows());
    }

    let columns = ColumnMap::from_headers(header.iter());
    debug!(rows = data.len(), ?columns, "parsed CSV header");

    Ok(data.iter().map(|row| columns.record(row)).collect())
}

fn missing_rows() -> CoreError {
    CoreError::format("CSV file must contain at least a header row and one data row")
}

/// Serialize records to CSV text with the fixed export header.
pub fn serialize(records: &[ImportRecord]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for record in records {
        writer.write_record(export_row(record))?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    let body = String::from_utf8(body).map_err(|e| CoreError::format(e.to_string()))?;

    let mut out = EXPORT_HEADERS.join(",");
    out.push('\n');
    out.push_str(&body);
    Ok(out)
}

fn export_row(record: &ImportRecord) -> [String; 8] {
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        record.title.clone(),
        record.slug.clone(),
        opt(&record.author),
        record.price.map(|p| p.to_string()).unwrap_or_default(),
        opt(&record.content),
        opt(&record.categories),
        opt(&record.published_at),
        opt(&record.image_url),
    ]
}
