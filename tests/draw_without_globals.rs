//! Runs in its own process, so nothing has called `globals::init` here.

use trade_trends::shaper::shape;
use trade_trends::{ChartConfig, RenderedChart, Series, globals, viz};

#[test]
fn drawing_leaves_globals_alone() {
    let config = ChartConfig::builder()
        .idx("1")
        .title("T")
        .source("S")
        .series(vec![Series::from_pairs(
            "World",
            [("2018", Some(1.0)), ("2019", Some(2.0))],
        )])
        .build()
        .unwrap();
    let chart = RenderedChart::build(&config, &shape(&config.series).unwrap());

    let rgb = viz::draw_to_rgb(&chart, 600, 400, 1.0).unwrap();
    assert_eq!(rgb.len(), 600 * 400 * 3);
    assert!(globals::symbol("download").is_none());

    globals::init(globals::GlobalOptions::default()).unwrap();
    assert!(globals::symbol("download").is_some());
    viz::draw_to_rgb(&chart, 600, 400, 1.0).unwrap();
}
