//! Appends the placeholder series that reserves trailing categories on the secondary axis.

use crate::error::{ChartError, Result};
use crate::models::{DataPoint, Series};

pub const PLACEHOLDER_NAME: &str = "Dummy data";
pub const PLACEHOLDER_CATEGORIES: [&str; 5] = ["2018", "2019", "2020", "2021", "2022"];

/// Slot the placeholder always occupies.
pub const PLACEHOLDER_SLOT: usize = 2;

/// Invisible series: five null points, no legend entry, bound to x axis 1.
pub fn placeholder_series() -> Series {
    Series {
        name: PLACEHOLDER_NAME.to_string(),
        data: PLACEHOLDER_CATEGORIES
            .iter()
            .map(|c| DataPoint::new(*c, None))
            .collect(),
        labels: PLACEHOLDER_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        show_in_legend: false,
        x_axis: 1,
    }
}

pub fn is_placeholder(series: &Series) -> bool {
    series.name == PLACEHOLDER_NAME
}

/// Three series slots: primary, optional comparison, placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedSeries {
    primary: Series,
    comparison: Option<Series>,
    placeholder: Series,
}

impl ShapedSeries {
    /// Number of slots; always 3, an absent comparison series leaves slot 1 vacant.
    pub fn len(&self) -> usize {
        PLACEHOLDER_SLOT + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, slot: usize) -> Option<&Series> {
        match slot {
            0 => Some(&self.primary),
            1 => self.comparison.as_ref(),
            PLACEHOLDER_SLOT => Some(&self.placeholder),
            _ => None,
        }
    }

    /// Occupied slots in order.
    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.real().chain(std::iter::once(&self.placeholder))
    }

    /// Every occupied slot except the placeholder.
    pub fn real(&self) -> impl Iterator<Item = &Series> {
        std::iter::once(&self.primary).chain(self.comparison.as_ref())
    }

    pub fn primary(&self) -> &Series {
        &self.primary
    }

    pub fn into_vec(self) -> Vec<Series> {
        let mut out = vec![self.primary];
        out.extend(self.comparison);
        out.push(self.placeholder);
        out
    }
}

/// Return a new slot list with the placeholder in slot 2.
///
/// Placeholders already present in the input are dropped first, so shaping an already shaped
/// list gives the same result. Accepts one or two real series.
pub fn shape(series: &[Series]) -> Result<ShapedSeries> {
    let mut real = series.iter().filter(|s| !is_placeholder(s)).cloned();
    let primary = real.next();
    let comparison = real.next();
    let extra = real.count();
    let Some(primary) = primary else {
        return Err(ChartError::SeriesCount(0));
    };
    if extra > 0 {
        return Err(ChartError::SeriesCount(2 + extra));
    }
    Ok(ShapedSeries {
        primary,
        comparison,
        placeholder: placeholder_series(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Series {
        Series::from_pairs(
            "World",
            [("2018", Some(3.0)), ("2019", Some(1.0)), ("2020", Some(-5.0))],
        )
    }

    #[test]
    fn two_series_get_placeholder_third() {
        let mut other = world();
        other.name = "Developing".into();
        let input = vec![world(), other.clone()];
        let shaped = shape(&input).unwrap();
        assert_eq!(shaped.len(), 3);
        assert_eq!(shaped.get(0), Some(&input[0]));
        assert_eq!(shaped.get(1), Some(&other));
        assert_eq!(shaped.get(2), Some(&placeholder_series()));
        let placeholder = shaped.get(2).unwrap();
        assert_eq!(placeholder.data.len(), 5);
        assert!(placeholder.data.iter().all(|p| p.y.is_none()));
        assert!(!placeholder.show_in_legend);
        assert_eq!(input.len(), 2);
        assert_eq!(shaped.real().count(), 2);
    }

    #[test]
    fn single_series_leaves_comparison_slot_vacant() {
        let shaped = shape(&[world()]).unwrap();
        assert_eq!(shaped.len(), 3);
        assert!(shaped.get(1).is_none());
        assert!(is_placeholder(shaped.get(2).unwrap()));
        assert_eq!(shaped.iter().count(), 2);
        assert_eq!(shaped.primary().name, "World");
    }

    #[test]
    fn shaping_twice_is_stable() {
        let once = shape(&[world()]).unwrap();
        let twice = shape(&once.clone().into_vec()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_bad_counts() {
        assert!(matches!(shape(&[]), Err(ChartError::SeriesCount(0))));
        assert!(matches!(
            shape(&[placeholder_series()]),
            Err(ChartError::SeriesCount(0))
        ));
        assert!(matches!(
            shape(&[world(), world(), world()]),
            Err(ChartError::SeriesCount(3))
        ));
    }
}
