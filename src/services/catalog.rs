//! Trail catalog and its CSV loader.
//!
//! The catalog file is a `;`-separated export with a header row:
//!
//! ```text
//! Trail_Name;City;Trail_Length;Difficulty;Rating;Link;Photo
//! Dolina Radości;Gdańsk;5,2 km;easy;4,5;https://...;https://...
//! ```
//!
//! Exports are usually UTF-16 with a byte-order mark; plain UTF-8 is accepted
//! too. Lengths may carry a ` km` suffix and a decimal comma, and a rating of
//! `brak ocen` ("no ratings yet") reads as 0. Ids are 1-based row numbers.
//! Rows that fail to parse or validate are logged and skipped.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::errors::ValidationError;
use crate::models::{Difficulty, Trail, TrailParams};

/// Rating text used by the export for trails nobody has rated yet.
const UNRATED_LABEL: &str = "brak ocen";

/// Header names the loader requires.
const REQUIRED_COLUMNS: [&str; 7] = [
    "Trail_Name",
    "City",
    "Trail_Length",
    "Difficulty",
    "Rating",
    "Link",
    "Photo",
];

/// Errors that stop the whole catalog from loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error reading trail catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Catalog is not valid UTF-8 or UTF-16")]
    Encoding,
    #[error("Missing required columns: {0:?}")]
    MissingColumns(Vec<String>),
    #[error("Invalid catalog: {0}")]
    Invalid(#[from] ValidationError),
}

/// Immutable, id-unique collection of trails in file order.
#[derive(Debug, Clone, Default)]
pub struct TrailCatalog {
    trails: Vec<Trail>,
}

impl TrailCatalog {
    pub fn new(trails: Vec<Trail>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(trails.len());
        for trail in &trails {
            if !seen.insert(trail.id()) {
                return Err(ValidationError::DuplicateTrailId(trail.id()));
            }
        }
        Ok(Self { trails })
    }

    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }

    pub fn get(&self, id: u32) -> Option<&Trail> {
        self.trails.iter().find(|t| t.id() == id)
    }

    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }
}

/// One CSV row, before any parsing.
#[derive(Debug, Deserialize)]
struct CsvTrailRow {
    #[serde(rename = "Trail_Name")]
    name: String,
    #[serde(rename = "City")]
    region: String,
    #[serde(rename = "Trail_Length")]
    length: String,
    #[serde(rename = "Difficulty")]
    difficulty: String,
    #[serde(rename = "Rating")]
    rating: String,
    #[serde(rename = "Link")]
    link: String,
    #[serde(rename = "Photo")]
    photo: String,
}

/// Load the catalog from a CSV file on disk.
pub fn load_catalog_file(path: &Path) -> Result<TrailCatalog, CatalogError> {
    let bytes = std::fs::read(path)?;
    let text = decode_text(&bytes)?;
    let catalog = parse_catalog(&text)?;
    tracing::info!(
        "Loaded {} trails from {}",
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}

/// Parse catalog CSV content.
pub fn parse_catalog(text: &str) -> Result<TrailCatalog, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CatalogError::MissingColumns(missing));
    }

    let mut trails = Vec::new();
    for (index, record) in reader.deserialize::<CsvTrailRow>().enumerate() {
        let id = (index + 1) as u32;
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("Skipping catalog row {}: {}", id, e);
                continue;
            }
        };
        match row_to_trail(id, row) {
            Ok(trail) => trails.push(trail),
            Err(e) => tracing::warn!("Skipping catalog row {}: {}", id, e),
        }
    }

    if trails.is_empty() {
        tracing::warn!("Trail catalog contains no valid rows");
    }

    Ok(TrailCatalog::new(trails)?)
}

fn row_to_trail(id: u32, row: CsvTrailRow) -> Result<Trail, ValidationError> {
    Trail::new(TrailParams {
        id,
        name: row.name,
        region: row.region,
        length_km: parse_length_km(&row.length)?,
        difficulty: row.difficulty.parse::<Difficulty>()?,
        rating: parse_rating(&row.rating)?,
        link: row.link,
        image_link: row.photo,
    })
}

/// "5,2 km" → 5.2
fn parse_length_km(raw: &str) -> Result<f64, ValidationError> {
    let cleaned = raw.trim();
    let cleaned = cleaned
        .strip_suffix("km")
        .unwrap_or(cleaned)
        .trim()
        .replace(',', ".");
    cleaned
        .parse::<f64>()
        .map_err(|_| ValidationError::UnknownVariant {
            field: "length_km",
            value: raw.to_string(),
        })
}

fn parse_rating(raw: &str) -> Result<f64, ValidationError> {
    let cleaned = raw.trim();
    if cleaned.eq_ignore_ascii_case(UNRATED_LABEL) {
        return Ok(0.0);
    }
    cleaned
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| ValidationError::UnknownVariant {
            field: "rating",
            value: raw.to_string(),
        })
}

/// Decode UTF-16 (LE/BE, by BOM) or UTF-8 (with or without BOM).
fn decode_text(bytes: &[u8]) -> Result<String, CatalogError> {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => {
            String::from_utf8(rest.to_vec()).map_err(|_| CatalogError::Encoding)
        }
        _ => String::from_utf8(bytes.to_vec()).map_err(|_| CatalogError::Encoding),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String, CatalogError> {
    if bytes.len() % 2 != 0 {
        return Err(CatalogError::Encoding);
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| CatalogError::Encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trail::sample_params;

    const SAMPLE_CSV: &str = "\
Trail_Name;City;Trail_Length;Difficulty;Rating;Link;Photo;Extra
Dolina Radości;Gdańsk;5,2 km;easy;4,5;https://example.com/1;https://example.com/1.jpg;x
Klif Orłowski;Gdynia;3 km;Moderate;brak ocen;https://example.com/2;https://example.com/2.jpg;y
Broken;Sopot;-1 km;easy;4;https://example.com/3;https://example.com/3.jpg;z
Bad Difficulty;Sopot;2 km;extreme;4;https://example.com/4;https://example.com/4.jpg;z
Szlak Wzgórz;Sopot;12,5;HARD;3,9;https://example.com/5;https://example.com/5.jpg;z
";

    #[test]
    fn test_parse_valid_rows() {
        let catalog = parse_catalog(SAMPLE_CSV).unwrap();
        assert_eq!(catalog.len(), 3);

        let first = &catalog.trails()[0];
        assert_eq!(first.id(), 1);
        assert_eq!(first.name(), "Dolina Radości");
        assert_eq!(first.region(), "Gdańsk");
        assert!((first.length_km() - 5.2).abs() < 1e-12);
        assert!((first.rating() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_unrated_reads_as_zero() {
        let catalog = parse_catalog(SAMPLE_CSV).unwrap();
        let trail = catalog.get(2).unwrap();
        assert_eq!(trail.rating(), 0.0);
        assert_eq!(trail.difficulty(), Difficulty::Moderate);
    }

    #[test]
    fn test_invalid_rows_skipped_ids_keep_row_numbers() {
        let catalog = parse_catalog(SAMPLE_CSV).unwrap();
        assert!(catalog.get(3).is_none());
        assert!(catalog.get(4).is_none());
        let last = catalog.get(5).unwrap();
        assert_eq!(last.difficulty(), Difficulty::Hard);
        assert!((last.length_km() - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_missing_columns_error() {
        let csv = "Trail_Name;City;Trail_Length\nA;Gdańsk;3 km\n";
        match parse_catalog(csv) {
            Err(CatalogError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["Difficulty", "Rating", "Link", "Photo"]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_header_only_gives_empty_catalog() {
        let csv = "Trail_Name;City;Trail_Length;Difficulty;Rating;Link;Photo\n";
        let catalog = parse_catalog(csv).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_decode_utf16_le_with_bom() {
        let text = "Trail_Name;City\nŁąka;Gdańsk\n";
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_text(&bytes).unwrap(), text);
    }

    #[test]
    fn test_decode_utf8_with_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("Sopot".as_bytes());
        assert_eq!(decode_text(&bytes).unwrap(), "Sopot");
    }

    #[test]
    fn test_decode_rejects_odd_utf16() {
        assert!(matches!(
            decode_text(&[0xFF, 0xFE, 0x41]),
            Err(CatalogError::Encoding)
        ));
    }

    #[test]
    fn test_catalog_rejects_duplicate_ids() {
        let a = Trail::new(sample_params()).unwrap();
        let b = Trail::new(TrailParams {
            name: "Other".to_string(),
            ..sample_params()
        })
        .unwrap();
        assert_eq!(
            TrailCatalog::new(vec![a, b]).unwrap_err(),
            ValidationError::DuplicateTrailId(1)
        );
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_catalog_file(Path::new("/nonexistent/trails.csv")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn test_parse_length_variants() {
        assert_eq!(parse_length_km("5 km").unwrap(), 5.0);
        assert_eq!(parse_length_km("7,25km").unwrap(), 7.25);
        assert_eq!(parse_length_km("3.5").unwrap(), 3.5);
        assert!(parse_length_km("far").is_err());
    }
}
