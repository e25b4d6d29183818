//! ECharts options for the analytics view.
//!
//! The chart is a stacked bar chart with one bar series per category. Values
//! are passed through untouched, so a bucket whose sum is `NaN` is serialized
//! as `null` and shown as a gap.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, ItemStyle,
        JsFunction, Tooltip, Trigger,
    },
    series::Bar,
};

use crate::view::ChartView;

/// Build the ECharts options for `chart_view`.
///
/// Use `to_string()` on the result to get the JSON option document.
pub fn chart_options(chart_view: &ChartView, title: &str) -> Chart {
    let labels: Vec<String> = chart_view
        .series_data
        .iter()
        .map(|point| point.label.clone())
        .collect();

    let mut chart = Chart::new()
        .title(Title::new().text(title).left(20).top("1%"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(amount_formatter())
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(amount_formatter())),
        );

    for category in &chart_view.categories {
        let data: Vec<Option<f64>> = chart_view
            .series_data
            .iter()
            .map(|point| point.get(category))
            .collect();

        chart = chart.series(
            Bar::new()
                .name(category.as_str())
                .stack("Flows")
                .item_style(ItemStyle::new().color(chart_view.color_of(category).as_str()))
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(data),
        );
    }

    chart
}

#[inline]
fn amount_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const formatter = new Intl.NumberFormat('en-US', {
              maximumFractionDigits: 2
            });
            return (number === null || number === undefined) ? \"-\" : formatter.format(number);",
    )
}
