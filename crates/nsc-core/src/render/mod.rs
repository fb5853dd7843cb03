//! Result renderer: pure conversions from store results to display shapes.

pub mod chart;
pub mod graph;
pub mod table;

pub use chart::{to_chart_series, ChartKind, ChartSeries, SeriesPoint};
pub use graph::{to_graph_payload, GraphPayload, PayloadEdge, PayloadNode};
pub use table::{to_table, Table};
