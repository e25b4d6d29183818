//! Category discovery and color assignment for chart series.

use serde::{Deserialize, Serialize};

use crate::{Record, field::FieldPath};

/// A color understood by the chart renderer, e.g. `"#16a34a"` or `"red"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorToken(pub String);

impl ColorToken {
    /// The token as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The two-color policy used by the analytics chart.
///
/// One distinguished "primary" category (e.g. wallet cash-ins) is drawn in
/// the accent color and every other category shares the alert color, so
/// non-primary categories are not distinguishable from each other by color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPalette {
    /// The category drawn in `primary_color`.
    pub primary_category: String,
    /// The accent color for the primary category.
    pub primary_color: ColorToken,
    /// The color shared by all other categories.
    pub alert_color: ColorToken,
}

impl ColorPalette {
    /// A palette with the default green accent and red alert colors.
    pub fn new(primary_category: &str) -> Self {
        Self {
            primary_category: primary_category.to_owned(),
            primary_color: ColorToken("green".to_owned()),
            alert_color: ColorToken("red".to_owned()),
        }
    }

    /// The color to draw `category` with.
    pub fn color_of(&self, category: &str) -> &ColorToken {
        if category == self.primary_category {
            &self.primary_color
        } else {
            &self.alert_color
        }
    }
}

/// The series a chart draws and how to color them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    /// Distinct categories in the order they first appear.
    pub categories: Vec<String>,
    /// The color policy for the categories.
    pub palette: ColorPalette,
}

impl Series {
    /// The color to draw `category` with.
    pub fn color_of(&self, category: &str) -> &ColorToken {
        self.palette.color_of(category)
    }
}

/// Collect the distinct categories of `records` in first-seen order.
///
/// This looks at every record given, including those with dates the
/// aggregator would skip, so a category can be listed without having any
/// points in the chart.
pub fn build_series(
    records: &[Record],
    category_field: &FieldPath,
    palette: ColorPalette,
) -> Series {
    let mut categories: Vec<String> = Vec::new();

    for record in records {
        let category = record.category(category_field);
        if !categories.iter().any(|seen| *seen == category) {
            categories.push(category.into_owned());
        }
    }

    Series {
        categories,
        palette,
    }
}
