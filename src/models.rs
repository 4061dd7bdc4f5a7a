use serde::{Deserialize, Serialize};

/// Labels sit this many pixels above their point unless configured otherwise.
pub const DEFAULT_LABEL_OFFSET: f64 = -10.0;

/// Per-point data label settings. Hidden until the label reveal pass turns them on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataLabel {
    #[serde(default)]
    pub enabled: bool,
    /// Vertical offset in pixels (negative = above the point).
    #[serde(default = "default_label_offset")]
    pub y: f64,
}

fn default_label_offset() -> f64 {
    DEFAULT_LABEL_OFFSET
}

impl Default for DataLabel {
    fn default() -> Self {
        Self {
            enabled: false,
            y: DEFAULT_LABEL_OFFSET,
        }
    }
}

/// One observation: a category label and an optional value (absent = gap in the line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub name: String,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub y: Option<f64>,
    #[serde(default, rename = "dataLabels")]
    pub data_label: DataLabel,
}

impl DataPoint {
    pub fn new(name: impl Into<String>, y: Option<f64>) -> Self {
        Self {
            name: name.into(),
            y,
            data_label: DataLabel::default(),
        }
    }
}

/// Serde helper: accept a JSON number, a numeric string, or anything else as a gap.
///
/// Non-finite numbers and strings that do not parse are treated as absent values rather than
/// failing the whole page.
fn de_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
    struct LenientVisitor;

    impl<'de> Visitor<'de> for LenientVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number, a numeric string, or null")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.is_finite().then_some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
            Ok(s.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: serde::Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(LenientVisitor)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(None)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(None)
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}

/// A named line of points sharing the chart's category axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<DataPoint>,
    /// Category labels for the axis this series feeds. Derived from point names when empty.
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default = "default_true", rename = "showInLegend")]
    pub show_in_legend: bool,
    #[serde(default, rename = "xAxis")]
    pub x_axis: usize,
}

fn default_true() -> bool {
    true
}

impl Series {
    /// Build a series from `(category, value)` pairs; labels follow the point names.
    pub fn from_pairs<S: Into<String>>(
        name: impl Into<String>,
        pairs: impl IntoIterator<Item = (S, Option<f64>)>,
    ) -> Self {
        let data: Vec<DataPoint> = pairs
            .into_iter()
            .map(|(c, y)| DataPoint::new(c, y))
            .collect();
        let labels = data.iter().map(|p| p.name.clone()).collect();
        Self {
            name: name.into(),
            data,
            labels,
            show_in_legend: true,
            x_axis: 0,
        }
    }

    /// Category labels, falling back to point names when none were given.
    pub fn categories(&self) -> Vec<String> {
        if self.labels.is_empty() {
            self.data.iter().map(|p| p.name.clone()).collect()
        } else {
            self.labels.clone()
        }
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().filter_map(|p| p.y)
    }
}
