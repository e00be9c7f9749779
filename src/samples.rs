// Built-in sample datasets, one per chart type

use crate::data::{Record, RecordSet, Value};
use crate::PlotKind;

/// File name reported when a sample is loaded
pub const SAMPLE_FILE_NAME: &str = "sample_data.csv";

pub fn sample_for(kind: PlotKind) -> RecordSet {
    match kind {
        PlotKind::Pie => transcript_classes(),
        PlotKind::Bar => fold_changes(),
        PlotKind::Heatmap => expression_matrix(),
        PlotKind::Go => go_terms(),
    }
}

fn labelled(label_column: &str, value_column: &str, rows: &[(&str, f64)]) -> RecordSet {
    rows.iter()
        .map(|(label, value)| {
            Record::from_iter([
                (label_column, Value::from(*label)),
                (value_column, Value::from(*value)),
            ])
        })
        .collect()
}

pub fn transcript_classes() -> RecordSet {
    labelled(
        "Gene.symbol",
        "value",
        &[
            ("Coding", 120.0),
            ("Non-coding", 80.0),
            ("Antisense", 45.0),
            ("Pseudogene", 30.0),
            ("miRNA", 15.0),
        ],
    )
}

pub fn fold_changes() -> RecordSet {
    labelled(
        "Gene.symbol",
        "logFC",
        &[
            ("TP53", 2.5),
            ("EGFR", 1.8),
            ("MYC", 1.2),
            ("BRCA1", -0.5),
            ("PTEN", -1.5),
            ("AKT1", -2.2),
        ],
    )
}

pub fn expression_matrix() -> RecordSet {
    let rows: [(&str, [f64; 4]); 5] = [
        ("Gene1", [10.0, 12.0, 5.0, 2.0]),
        ("Gene2", [2.0, 3.0, 15.0, 18.0]),
        ("Gene3", [8.0, 9.0, 6.0, 7.0]),
        ("Gene4", [1.0, 1.0, 12.0, 11.0]),
        ("Gene5", [14.0, 13.0, 2.0, 1.0]),
    ];
    rows.iter()
        .map(|(gene, samples)| {
            let mut record = Record::new();
            record.insert("Gene.symbol", *gene);
            for (i, v) in samples.iter().enumerate() {
                record.insert(format!("Sample{}", i + 1), *v);
            }
            record
        })
        .collect()
}

pub fn go_terms() -> RecordSet {
    [
        ("DNA replication", "BP", 25.0),
        ("Cell division", "BP", 20.0),
        ("Nucleus", "CC", 35.0),
        ("Cytoplasm", "CC", 28.0),
        ("ATP binding", "MF", 15.0),
        ("DNA binding", "MF", 30.0),
    ]
    .iter()
    .map(|(title, symbol, count)| {
        Record::from_iter([
            ("Gene.title", Value::from(*title)),
            ("Gene.symbol", Value::from(*symbol)),
            ("logFC", Value::from(*count)),
        ])
    })
    .collect()
}
