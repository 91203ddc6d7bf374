use std::fmt::Write as _;

use criterion::{Criterion, criterion_group, criterion_main};
use sheet_insights::assembler::Assembler;
use sheet_insights::charts;
use sheet_insights::config::PipelineConfig;
use sheet_insights::io_utils::Upload;
use sheet_insights::parser::TextParserKind;

fn generate_orders(rows: usize) -> Upload {
    let mut body = String::from("id,ordered_at,region,amount,status\n");
    for i in 0..rows {
        let status = match i % 3 {
            0 => "shipped",
            1 => "pending",
            _ => "processing",
        };
        let region = ["Norte", "Sul", "Leste", "Oeste"][i % 4];
        let day = (i % 28) + 1;
        let _ = writeln!(
            body,
            "{i},2024-01-{day:02},{region},{}.{:02},{status}",
            i % 500,
            i % 100
        );
    }
    Upload::new("orders.csv", body.into_bytes())
}

fn bench_assemble(c: &mut Criterion) {
    let upload = generate_orders(50_000);
    let naive = Assembler::default();
    let quoted = Assembler::new(PipelineConfig {
        text_parser: TextParserKind::Quoted,
        ..PipelineConfig::default()
    });

    let mut group = c.benchmark_group("assemble_csv");
    group.sample_size(20);
    group.bench_function("naive_split", |b| {
        b.iter(|| naive.assemble(&upload, &[]).expect("bundle"));
    });
    group.bench_function("quoted_reader", |b| {
        b.iter(|| quoted.assemble(&upload, &[]).expect("bundle"));
    });
    let selection = vec!["region".to_string(), "amount".to_string()];
    group.bench_function("naive_split_selected", |b| {
        b.iter(|| naive.assemble(&upload, &selection).expect("bundle"));
    });
    group.finish();

    let bundle = naive.assemble(&upload, &[]).expect("bundle");
    let config = PipelineConfig::default();
    c.bench_function("chart_view_auto", |b| {
        b.iter(|| charts::chart_view(&bundle.charts[0], None, &config).expect("chart"));
    });
}

criterion_group!(benches, bench_assemble);
criterion_main!(benches);
