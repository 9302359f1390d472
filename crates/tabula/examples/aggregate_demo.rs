//! Aggregated table demo: two sources side by side, a hidden column, a
//! strided source, and a sort.
//!
//! Run with: cargo run -p tabula --example aggregate_demo
//!
//! Set `RUST_LOG=tabula=trace` to see every dropped write and signal.

use std::sync::Arc;

use tabula::config::TableConfig;
use tabula::model::{
    AggregateTableModel, CellValue, ColumnClass, GridColumn, GridSource, RefreshMode, TableSource,
};
use tracing_subscriber::EnvFilter;

fn print_table(model: &AggregateTableModel) {
    let header: Vec<String> = model
        .column_names()
        .iter()
        .map(|name| format!("{name:>10}"))
        .collect();
    println!("{}", header.join(" "));

    for row in 0..model.row_count() {
        let cells: Vec<String> = (0..model.column_count())
            .map(|col| match model.value(row, col) {
                Some(CellValue::Float(x)) => format!("{x:>10.3}"),
                Some(value) => format!("{:>10}", value.to_string()),
                None => format!("{:>10}", "-"),
            })
            .collect();
        println!("{}", cells.join(" "));
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tabula=debug")),
        )
        .init();

    // A projectile: time, position and velocity sampled every 0.1 s.
    let motion = Arc::new(GridSource::new(vec![
        GridColumn::new("t", ColumnClass::Real),
        GridColumn::new("y", ColumnClass::Real),
        GridColumn::new("vy", ColumnClass::Real),
    ]));
    for step in 0..12 {
        let t = step as f64 * 0.1;
        motion.push_row(vec![
            Some(t.into()),
            Some((5.0 * t - 4.9 * t * t).into()),
            Some((5.0 - 9.8 * t).into()),
        ]);
    }

    // Sparse annotations, one per sampled row.
    let notes = Arc::new(GridSource::from_column(
        GridColumn::new("note", ColumnClass::String),
        vec![
            Some("launch".into()),
            None,
            Some("rising".into()),
            Some("apex".into()),
            None,
            Some("falling".into()),
        ],
    ));

    let config = TableConfig::default().with_row_number_visible(true);
    let model = AggregateTableModel::with_config(config)?;

    model.signals().refresh_requested.connect(|mode: &RefreshMode| {
        tracing::info!(?mode, "refresh requested");
    });

    let motion_source: Arc<dyn TableSource> = motion.clone();
    model.add_source(motion_source.clone());
    model.add_source(notes.clone());

    model.set_column_visible(&motion_source, 2, false)?;
    model.set_stride(&motion_source, 2)?;

    println!("== unsorted ==");
    print_table(&model);

    println!("== sorted by y ==");
    model.sort_by(2);
    print_table(&model);

    println!("== sorted by note ==");
    model.sort_on_header_click(3);
    print_table(&model);

    model.set_value(CellValue::from("peak"), 0, 3);
    model.reset_sort();
    println!("== reset, after editing ==");
    print_table(&model);

    println!("revision: {}", model.revision());
    Ok(())
}
