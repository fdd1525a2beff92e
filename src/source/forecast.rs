//! Forecast table extraction
//!
//! A forecast page carries one table whose rows are keyed by a `data-row`
//! attribute. The `days` row holds one header cell per day, each spanning
//! `data-columns` time-slot columns; every other row holds one cell per
//! time-slot column. Extraction walks the day headers with a running column
//! index and emits one record per column of each dated header.
//!
//! A header cell with no text is a filler. It emits nothing but still
//! advances the running index by its own `data-columns` span.

use reqwest::Url;
use scraper::{ElementRef, Html};
use std::time::Duration;
use tracing::{debug, info};

use super::html::{clean_text, element_text, last_path_segment, selector};
use super::{PageFetcher, pause};
use crate::models::{ForecastRecord, MountainCatalog, ProcessingPeriod};
use crate::{ForecastError, Result};

const FORECAST_TABLE: &str = "table.forecast__table.forecast__table--js";

/// One day-header cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayHeader {
    /// Cleaned header text, e.g. `Thu 17`; empty for filler cells
    pub label: String,
    /// Number of time-slot columns the header covers
    pub span: usize,
}

impl DayHeader {
    #[must_use]
    pub fn is_filler(&self) -> bool {
        self.label.is_empty()
    }
}

/// Row-oriented content of a forecast table, one `Vec` per `data-row`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastTable {
    pub days: Vec<DayHeader>,
    pub time: Vec<String>,
    /// Read from the wind icon's `alt` text rather than the cell text
    pub wind: Vec<String>,
    pub summary: Vec<String>,
    pub rain: Vec<String>,
    pub snow: Vec<String>,
    pub max_temperature: Vec<String>,
    pub min_temperature: Vec<String>,
    pub chill: Vec<String>,
    pub freezing_level: Vec<String>,
    pub sunrise: Vec<String>,
    pub sunset: Vec<String>,
}

/// Borrowed cells of one time-slot column
struct Column<'t> {
    time: &'t str,
    wind: &'t str,
    summary: &'t str,
    rain: &'t str,
    snow: &'t str,
    max_temperature: &'t str,
    min_temperature: &'t str,
    chill: &'t str,
    freezing_level: &'t str,
    sunrise: &'t str,
    sunset: &'t str,
}

fn find_row<'d>(table: ElementRef<'d>, name: &str) -> Result<ElementRef<'d>> {
    let row_selector = selector(&format!(r#"tr[data-row="{name}"]"#))?;
    table
        .select(&row_selector)
        .next()
        .ok_or_else(|| ForecastError::parse(format!("Forecast table has no '{name}' row")))
}

fn cell_texts(table: ElementRef<'_>, name: &str) -> Result<Vec<String>> {
    let td = selector("td")?;
    Ok(find_row(table, name)?.select(&td).map(element_text).collect())
}

fn wind_texts(table: ElementRef<'_>) -> Result<Vec<String>> {
    let img = selector("img")?;
    find_row(table, "wind")?
        .select(&img)
        .map(|icon| {
            icon.value()
                .attr("alt")
                .map(clean_text)
                .ok_or_else(|| ForecastError::parse("Wind icon has no alt text"))
        })
        .collect()
}

fn cell<'t>(row: &'t [String], name: &str, index: usize) -> Result<&'t str> {
    row.get(index).map(String::as_str).ok_or_else(|| {
        ForecastError::parse(format!(
            "Row '{name}' has {} cells, column {index} requested",
            row.len()
        ))
    })
}

fn day_headers(table: ElementRef<'_>) -> Result<Vec<DayHeader>> {
    let td = selector("td")?;
    find_row(table, "days")?
        .select(&td)
        .map(|header| -> Result<DayHeader> {
            let label = element_text(header);
            let span = header
                .value()
                .attr("data-columns")
                .ok_or_else(|| {
                    ForecastError::parse(format!("Day header '{label}' has no data-columns"))
                })?
                .trim()
                .parse::<usize>()
                .map_err(|e| {
                    ForecastError::parse(format!("Day header '{label}' has a bad data-columns: {e}"))
                })?;
            Ok(DayHeader { label, span })
        })
        .collect()
}

impl ForecastTable {
    /// Locate the forecast table in a page and read all of its rows
    pub fn parse(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        let table_selector = selector(FORECAST_TABLE)?;
        let table = document
            .select(&table_selector)
            .next()
            .ok_or_else(|| ForecastError::parse("Page has no forecast table"))?;

        Ok(Self {
            days: day_headers(table)?,
            time: cell_texts(table, "time")?,
            wind: wind_texts(table)?,
            summary: cell_texts(table, "summary")?,
            rain: cell_texts(table, "rain")?,
            snow: cell_texts(table, "snow")?,
            max_temperature: cell_texts(table, "max-temperature")?,
            min_temperature: cell_texts(table, "min-temperature")?,
            chill: cell_texts(table, "chill")?,
            freezing_level: cell_texts(table, "freezing-level")?,
            sunrise: cell_texts(table, "sunrise")?,
            sunset: cell_texts(table, "sunset")?,
        })
    }

    fn column(&self, index: usize) -> Result<Column<'_>> {
        Ok(Column {
            time: cell(&self.time, "time", index)?,
            wind: cell(&self.wind, "wind", index)?,
            summary: cell(&self.summary, "summary", index)?,
            rain: cell(&self.rain, "rain", index)?,
            snow: cell(&self.snow, "snow", index)?,
            max_temperature: cell(&self.max_temperature, "max-temperature", index)?,
            min_temperature: cell(&self.min_temperature, "min-temperature", index)?,
            chill: cell(&self.chill, "chill", index)?,
            freezing_level: cell(&self.freezing_level, "freezing-level", index)?,
            sunrise: cell(&self.sunrise, "sunrise", index)?,
            sunset: cell(&self.sunset, "sunset", index)?,
        })
    }

    /// Reshape the table into one record per column of every dated header.
    ///
    /// Day-of-month values are placed in `period`; when a header's day is
    /// smaller than the previous dated header the month rolls over.
    pub fn records(
        &self,
        mountain: &str,
        elevation: &str,
        period: ProcessingPeriod,
    ) -> Result<Vec<ForecastRecord>> {
        let mut records = Vec::new();
        let mut period = period;
        let mut previous_day: Option<u32> = None;
        let mut index: usize = 0;

        for header in &self.days {
            let end = index
                .checked_add(header.span)
                .filter(|&end| end <= self.time.len())
                .ok_or_else(|| {
                    ForecastError::parse(format!(
                        "Day header '{}' spans {} columns from column {index}, the table has {}",
                        header.label,
                        header.span,
                        self.time.len()
                    ))
                })?;

            if header.is_filler() {
                index = end;
                continue;
            }

            let day = day_of_month(&header.label)?;
            if previous_day.is_some_and(|previous| day < previous) {
                period = period.next();
            }
            previous_day = Some(day);

            let date = period
                .date(day)
                .ok_or_else(|| {
                    ForecastError::parse(format!(
                        "Day {day} does not exist in {}-{:02}",
                        period.year, period.month
                    ))
                })?
                .format("%Y-%m-%d")
                .to_string();

            for column_index in index..end {
                let column = self.column(column_index)?;
                records.push(ForecastRecord {
                    mountain: mountain.to_string(),
                    date: date.clone(),
                    elevation: elevation.to_string(),
                    time: column.time.to_string(),
                    wind: column.wind.to_string(),
                    summary: column.summary.to_string(),
                    rain: column.rain.to_string(),
                    snow: column.snow.to_string(),
                    max_temperature: column.max_temperature.to_string(),
                    min_temperature: column.min_temperature.to_string(),
                    chill: column.chill.to_string(),
                    freezing_level: column.freezing_level.to_string(),
                    sunrise: column.sunrise.to_string(),
                    sunset: column.sunset.to_string(),
                });
            }
            index = end;
        }

        Ok(records)
    }
}

/// Trailing integer of a day header, e.g. `17` from `Thursday 17`
pub fn day_of_month(label: &str) -> Result<u32> {
    let digits_start = label
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .ok_or_else(|| ForecastError::parse(format!("Day header '{label}' has no day number")))?;

    label[digits_start..]
        .parse()
        .map_err(|e| ForecastError::parse(format!("Day header '{label}': {e}")))
}

/// Elevation label from the trailing path segment of a forecast URL
pub fn elevation_from_url(url: &Url) -> Result<String> {
    last_path_segment(url)
        .map(str::to_string)
        .ok_or_else(|| ForecastError::parse(format!("No elevation in URL {url}")))
}

/// Parse one forecast page into records for `mountain`
pub fn parse_forecast_page(
    html: &str,
    mountain: &str,
    url: &Url,
    period: ProcessingPeriod,
) -> Result<Vec<ForecastRecord>> {
    let elevation = elevation_from_url(url)?;
    let table = ForecastTable::parse(html)?;
    table.records(mountain, &elevation, period)
}

/// Fetches every elevation page of a catalog and extracts its forecasts
pub struct ForecastExtractor<'a> {
    fetcher: &'a dyn PageFetcher,
    delay: Duration,
    period: ProcessingPeriod,
}

impl<'a> ForecastExtractor<'a> {
    #[must_use]
    pub fn new(fetcher: &'a dyn PageFetcher, delay: Duration, period: ProcessingPeriod) -> Self {
        Self {
            fetcher,
            delay,
            period,
        }
    }

    /// Extract records for every mountain and elevation, strictly in sequence.
    ///
    /// The first fetch or parse failure aborts the whole extraction.
    pub async fn extract_forecasts(&self, catalog: &MountainCatalog) -> Result<Vec<ForecastRecord>> {
        let mut records = Vec::new();

        for (mountain, urls) in catalog.iter() {
            info!("Collecting {} ({} elevations)", mountain, urls.len());
            for raw_url in urls {
                let url = Url::parse(raw_url).map_err(|e| {
                    ForecastError::parse(format!("Catalog URL '{raw_url}' for {mountain}: {e}"))
                })?;

                let page = self.fetcher.fetch(&url).await?;
                let page_records = parse_forecast_page(&page, mountain, &url, self.period)
                    .map_err(|e| ForecastError::parse(format!("{mountain} ({url}): {e}")))?;
                debug!("{} records from {}", page_records.len(), url);
                records.extend(page_records);

                pause(self.delay).await;
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Builds a forecast page from day headers and a per-column cell generator
    fn forecast_page(days: &[(&str, usize)], columns: usize) -> String {
        let header: String = days
            .iter()
            .map(|(label, span)| format!(r#"<td data-columns="{span}">{label}</td>"#))
            .collect();
        let row = |name: &str, prefix: &str| -> String {
            let cells: String = (0..columns)
                .map(|i| format!("<td>\n  {prefix} {i}  </td>"))
                .collect();
            format!(r#"<tr data-row="{name}">{cells}</tr>"#)
        };
        let wind: String = (0..columns)
            .map(|i| {
                format!(
                    r#"<td><img src="/w.png" alt="Light  breeze from the WNW {i}"><span>10</span></td>"#
                )
            })
            .collect();

        format!(
            r#"<html><body>
            <table class="forecast__table forecast__table--js">
              <thead><tr data-row="days">{header}</tr></thead>
              <tbody>
                {time}
                <tr data-row="wind">{wind}</tr>
                {summary}{rain}{snow}{max}{min}{chill}{freezing}{sunrise}{sunset}
              </tbody>
            </table></body></html>"#,
            time = row("time", "slot"),
            summary = row("summary", "clear"),
            rain = row("rain", "rain"),
            snow = row("snow", "snow"),
            max = row("max-temperature", "max"),
            min = row("min-temperature", "min"),
            chill = row("chill", "chill"),
            freezing = row("freezing-level", "fl"),
            sunrise = row("sunrise", "rise"),
            sunset = row("sunset", "set"),
        )
    }

    fn url() -> Url {
        Url::parse("https://www.mountain-forecast.com/peaks/Mount-Rainier/forecasts/4392").unwrap()
    }

    #[test]
    fn test_filler_header_consumes_its_span() {
        let html = forecast_page(&[("Thu 17", 2), ("", 1), ("Fri 18", 3)], 6);
        let records =
            parse_forecast_page(&html, "Mount Rainier", &url(), ProcessingPeriod::new(2026, 9))
                .unwrap();

        let mapping: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.time.as_str(), r.date.as_str()))
            .collect();
        assert_eq!(
            mapping,
            vec![
                ("slot 0", "2026-09-17"),
                ("slot 1", "2026-09-17"),
                ("slot 3", "2026-09-18"),
                ("slot 4", "2026-09-18"),
                ("slot 5", "2026-09-18"),
            ]
        );
    }

    #[test]
    fn test_record_count_is_sum_of_dated_spans() {
        let days = [("Mon 5", 3), ("Tue 6", 3), ("", 2), ("Wed 7", 3), ("Thu 8", 1)];
        let html = forecast_page(&days, 12);
        let records =
            parse_forecast_page(&html, "Denali", &url(), ProcessingPeriod::new(2026, 10)).unwrap();

        let dated_span: usize = days.iter().filter(|(l, _)| !l.is_empty()).map(|(_, s)| s).sum();
        assert_eq!(records.len(), dated_span);
        assert_eq!(records.len(), 12 - 2);
    }

    #[test]
    fn test_wind_comes_from_icon_alt() {
        let html = forecast_page(&[("Thu 17", 1)], 1)
            .replace("Light  breeze from the WNW 0", "Light breeze from the WNW");
        let records =
            parse_forecast_page(&html, "Mount Rainier", &url(), ProcessingPeriod::new(2026, 9))
                .unwrap();
        assert_eq!(records[0].wind, "Light breeze from the WNW");
    }

    #[test]
    fn test_cells_are_cleaned_and_fields_mapped() {
        let html = forecast_page(&[("Thu 17", 1)], 1);
        let record = parse_forecast_page(&html, "Mount Rainier", &url(), ProcessingPeriod::new(2026, 9))
            .unwrap()
            .remove(0);

        assert_eq!(record.mountain, "Mount Rainier");
        assert_eq!(record.elevation, "4392");
        assert_eq!(record.time, "slot 0");
        assert_eq!(record.summary, "clear 0");
        assert_eq!(record.rain, "rain 0");
        assert_eq!(record.snow, "snow 0");
        assert_eq!(record.max_temperature, "max 0");
        assert_eq!(record.min_temperature, "min 0");
        assert_eq!(record.chill, "chill 0");
        assert_eq!(record.freezing_level, "fl 0");
        assert_eq!(record.sunrise, "rise 0");
        assert_eq!(record.sunset, "set 0");
    }

    #[test]
    fn test_month_rolls_over() {
        let html = forecast_page(&[("Fri 31", 1), ("Sat 1", 1)], 2);
        let records =
            parse_forecast_page(&html, "Denali", &url(), ProcessingPeriod::new(2026, 12)).unwrap();
        assert_eq!(records[0].date, "2026-12-31");
        assert_eq!(records[1].date, "2027-01-01");
    }

    #[test]
    fn test_missing_table_is_parse_error() {
        let result = parse_forecast_page(
            "<html><body><table class=\"other\"></table></body></html>",
            "Denali",
            &url(),
            ProcessingPeriod::new(2026, 10),
        );
        assert!(matches!(result, Err(ForecastError::Parse { .. })));
    }

    #[test]
    fn test_missing_row_is_parse_error() {
        let html = forecast_page(&[("Thu 17", 1)], 1).replace(r#"data-row="snow""#, r#"data-row="x""#);
        let err = parse_forecast_page(&html, "Denali", &url(), ProcessingPeriod::new(2026, 10))
            .unwrap_err();
        assert!(err.to_string().contains("'snow'"));
    }

    #[test]
    fn test_short_data_row_is_parse_error() {
        // Headers promise 4 columns but rows only carry 3
        let html = forecast_page(&[("Thu 17", 2), ("Fri 18", 2)], 3);
        let result = parse_forecast_page(&html, "Denali", &url(), ProcessingPeriod::new(2026, 10));
        assert!(matches!(result, Err(ForecastError::Parse { .. })));
    }

    #[rstest]
    #[case::dated("Fri 18")]
    #[case::filler("")]
    fn test_oversized_span_is_parse_error(#[case] label: &str) {
        let html = forecast_page(&[("Thu 17", 1), (label, 2)], 3)
            .replace(r#"data-columns="2""#, &format!(r#"data-columns="{}""#, usize::MAX));
        let err = parse_forecast_page(&html, "Denali", &url(), ProcessingPeriod::new(2026, 10))
            .unwrap_err();
        assert!(matches!(err, ForecastError::Parse { .. }));
        assert!(err.to_string().contains("the table has 3"), "got: {err}");
    }

    #[test]
    fn test_header_span_past_table_is_parse_error() {
        let html = forecast_page(&[("Thu 17", 2), ("", 4)], 3);
        let result = parse_forecast_page(&html, "Denali", &url(), ProcessingPeriod::new(2026, 10));
        assert!(matches!(result, Err(ForecastError::Parse { .. })));
    }

    #[test]
    fn test_header_without_day_number_is_parse_error() {
        let html = forecast_page(&[("Today", 1)], 1);
        let result = parse_forecast_page(&html, "Denali", &url(), ProcessingPeriod::new(2026, 10));
        assert!(matches!(result, Err(ForecastError::Parse { .. })));
    }

    #[test]
    fn test_impossible_date_is_parse_error() {
        let html = forecast_page(&[("Mon 30", 1)], 1);
        let result = parse_forecast_page(&html, "Denali", &url(), ProcessingPeriod::new(2026, 2));
        assert!(matches!(result, Err(ForecastError::Parse { .. })));
    }

    #[rstest]
    #[case("Thu 17", 17)]
    #[case("Thursday 5", 5)]
    #[case("Thu17", 17)]
    #[case("30", 30)]
    fn test_day_of_month(#[case] label: &str, #[case] expected: u32) {
        assert_eq!(day_of_month(label).unwrap(), expected);
    }

    #[rstest]
    #[case("Thu")]
    #[case("17 Thu")]
    #[case("")]
    fn test_day_of_month_rejects(#[case] label: &str) {
        assert!(day_of_month(label).is_err());
    }

    #[test]
    fn test_elevation_from_url() {
        assert_eq!(elevation_from_url(&url()).unwrap(), "4392");
        let root = Url::parse("https://www.mountain-forecast.com/").unwrap();
        assert!(elevation_from_url(&root).is_err());
    }
}
