//! Ingestion throughput over in-memory catalogs, so only parsing, classification and validation
//! are measured.

use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use material_catalog::ingestion::{
    LoaderOptions, MaterialLoader, MemorySheet, MemoryWorkbook, MemoryWorkbookReader,
};
use material_catalog::types::CellValue;

const HEADER: [&str; 8] = [
    "Code",
    "Name",
    "Description",
    "ThermalConductivity",
    "Density",
    "SpecificHeat",
    "FireRating",
    "Cost",
];

const CATEGORIES: [&str; 5] = ["Concrete", "Steel", "Insulation", "Pipes", "Sealants"];

fn catalog_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("material-catalog-bench");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("BLE_MATERIALS.xlsx"), b"").unwrap();
    dir
}

fn reader(rows_per_sheet: usize) -> MemoryWorkbookReader {
    let workbook = CATEGORIES.iter().fold(MemoryWorkbook::new(), |wb, category| {
        wb.with_sheet(MemorySheet::new(*category, HEADER).with_generated_rows(rows_per_sheet, |i| {
            vec![
                CellValue::Text(format!("{}-{i:05}", &category[..4])),
                CellValue::Text(format!("{category} {i}")),
                CellValue::Text("benchmark material".to_string()),
                CellValue::Text(format!("{}", 0.5 + i as f64 * 0.001)),
                CellValue::Number(1000.0 + i as f64),
                CellValue::Int(900),
                CellValue::Text("A1".to_string()),
                CellValue::Number(12.5),
            ]
        }))
    });
    MemoryWorkbookReader::new().with_workbook("BLE_MATERIALS.xlsx", workbook)
}

fn bench_load_all(c: &mut Criterion) {
    let dir = catalog_dir();
    let mut group = c.benchmark_group("load_all");

    for rows_per_sheet in [100usize, 1_000, 10_000] {
        let loader = MaterialLoader::with_reader(&dir, LoaderOptions::default(), reader(rows_per_sheet)).unwrap();
        group.throughput(Throughput::Elements((rows_per_sheet * CATEGORIES.len()) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows_per_sheet), &loader, |b, loader| {
            b.iter(|| black_box(loader.load_all().unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_load_all);
criterion_main!(benches);
