//! "Download CSV data": one row per primary category, one column per real series.
//!
//! Series share the category ordering, so a series' n-th point belongs to the n-th category,
//! exactly as the chart and its tooltip place it.

use crate::config::ChartConfig;
use crate::shaper::shape;
use anyhow::Result;
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;

/// Write the chart's data as CSV. Gaps are empty cells.
pub fn write_csv<W: Write>(config: &ChartConfig, writer: W) -> Result<()> {
    let shaped = shape(&config.series)?;
    let series: Vec<_> = shaped.real().collect();
    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header = vec!["Category".to_string()];
    header.extend(series.iter().map(|s| s.name.clone()));
    wtr.write_record(&header)?;

    for (i, category) in shaped.primary().categories().into_iter().enumerate() {
        let mut row = vec![category];
        for s in &series {
            let y = s.data.get(i).and_then(|p| p.y);
            row.push(y.map(|v| v.to_string()).unwrap_or_default());
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(config: &ChartConfig) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(config, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

pub fn save_csv<P: AsRef<Path>>(config: &ChartConfig, path: P) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(config, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Series;
    use crate::surface::RenderedChart;
    use tempfile::tempdir;

    fn config() -> ChartConfig {
        ChartConfig::builder()
            .idx("3")
            .title("Trade")
            .source("UNCTAD")
            .series(vec![
                Series::from_pairs("World", [("Q1 2022", Some(1.5)), ("Q2 2022", None)]),
                Series::from_pairs("Developing, East", [("Q1 2022", Some(-2.0))]),
            ])
            .build()
            .unwrap()
    }

    #[test]
    fn one_row_per_primary_category() {
        let csv = to_csv_string(&config()).unwrap();
        assert_eq!(
            csv,
            "Category,World,\"Developing, East\"\nQ1 2022,1.5,-2\nQ2 2022,,\n"
        );
    }

    #[test]
    fn rows_match_the_tooltip_for_each_category() {
        let config = config();
        let chart = RenderedChart::build(&config, &shape(&config.series).unwrap());
        let csv = to_csv_string(&config).unwrap();
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        for (i, record) in rdr.records().enumerate() {
            let record = record.unwrap();
            assert_eq!(&record[0], chart.categories[i]);
            let rows = chart.tooltip_rows(i);
            assert_eq!(rows.len(), record.len() - 1);
            for (row, cell) in rows.iter().zip(record.iter().skip(1)) {
                assert_eq!(row.y.map(|v| v.to_string()).unwrap_or_default(), cell);
            }
        }
        assert_eq!(
            chart.tooltip_text(0).unwrap(),
            "Q1 2022\nWorld: 2%\nDeveloping, East: -2%"
        );
    }

    #[test]
    fn saves_to_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.csv");
        save_csv(&config(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Category,World"));
        assert!(!text.contains("Dummy data"));
    }
}
