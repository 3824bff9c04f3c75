use crate::enrichment::PriceIndex;
use crate::errors::DataError;
use crate::models::{Config, DataSourceMode, PreferenceRecord, ProgramRecord, Year};
use crate::parser::{parse_preference_row, parse_price_row, parse_program_row, RawRow};
use moka::sync::Cache;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Where CSV files come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Local(PathBuf),
    Internet(String),
}

impl DataSource {
    pub fn from_config(config: &Config) -> Result<Self, DataError> {
        match config.data_source_mode {
            DataSourceMode::Local => config
                .data_directory
                .as_ref()
                .map(|dir| Self::Local(PathBuf::from(dir)))
                .ok_or(DataError::MissingSource("local")),
            DataSourceMode::Internet => config
                .internet_base_url
                .as_ref()
                .map(|url| Self::Internet(url.trim_end_matches('/').to_string()))
                .ok_or(DataError::MissingSource("internet")),
        }
    }
}

/// Parsed CSV rows per file name.
pub type RowCache = Cache<String, Arc<Vec<RawRow>>>;

/// Row cache whose entries expire `ttl` after they are loaded.
pub fn row_cache(ttl: Duration) -> RowCache {
    Cache::builder().time_to_live(ttl).build()
}

/// Parses CSV text into header-keyed rows.
///
/// Rows whose field count differs from the header are skipped.
pub fn parse_csv_rows(text: &str, name: &str) -> Result<Vec<RawRow>, DataError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let csv_error = |source| DataError::Csv {
        name: name.to_string(),
        source,
    };
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.len() != headers.len() {
            skipped += 1;
            continue;
        }
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.to_string(), value.to_string()))
                .collect(),
        );
    }
    if skipped > 0 {
        tracing::warn!(file = name, skipped, "skipped rows with wrong column count");
    }
    Ok(rows)
}

/// Reads program, price and preference CSVs, caching parsed rows per file.
pub struct DataLoader {
    client: reqwest::Client,
    source: DataSource,
    cache: RowCache,
}

impl DataLoader {
    pub fn new(source: DataSource, cache: RowCache) -> Self {
        Self {
            client: reqwest::Client::new(),
            source,
            cache,
        }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub async fn load_programs(
        &self,
        file: &str,
        years: &[Year],
    ) -> Result<Vec<ProgramRecord>, DataError> {
        let rows = self.load_rows(file).await?;
        Ok(rows.iter().map(|row| parse_program_row(row, years)).collect())
    }

    pub async fn load_prices(
        &self,
        file: &str,
        price_years: &[Year],
    ) -> Result<PriceIndex, DataError> {
        let rows = self.load_rows(file).await?;
        let records = rows
            .iter()
            .filter_map(|row| parse_price_row(row, price_years));
        Ok(PriceIndex::new(records, price_years.iter().copied()))
    }

    pub async fn load_preferences(&self, file: &str) -> Result<Vec<PreferenceRecord>, DataError> {
        let rows = self.load_rows(file).await?;
        Ok(rows.iter().filter_map(parse_preference_row).collect())
    }

    async fn load_rows(&self, file: &str) -> Result<Arc<Vec<RawRow>>, DataError> {
        if let Some(rows) = self.cache.get(file) {
            tracing::debug!(file, "serving rows from cache");
            return Ok(rows);
        }

        let text = self.fetch_text(file).await?;
        let rows = Arc::new(parse_csv_rows(&text, file)?);
        tracing::info!(file, rows = rows.len(), "loaded CSV");
        self.cache.insert(file.to_string(), Arc::clone(&rows));
        Ok(rows)
    }

    async fn fetch_text(&self, file: &str) -> Result<String, DataError> {
        match &self.source {
            DataSource::Local(dir) => {
                let path = dir.join(file);
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| DataError::Io { path, source })
            }
            DataSource::Internet(base_url) => {
                let url = format!("{}/{}", base_url, file);
                tracing::info!(%url, "fetching data");

                let response = self
                    .client
                    .get(&url)
                    .timeout(Duration::from_secs(30))
                    .send()
                    .await
                    .map_err(|source| DataError::Http {
                        url: url.clone(),
                        source,
                    })?;

                if !response.status().is_success() {
                    return Err(DataError::HttpStatus {
                        url,
                        status: response.status(),
                    });
                }

                response
                    .text()
                    .await
                    .map_err(|source| DataError::Http { url, source })
            }
        }
    }
}
