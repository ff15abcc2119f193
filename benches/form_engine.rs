use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use formflow::domain::{FieldValidation, FormField, FormGroup, FormSchema, FormStep, ShowWhen};
use formflow::engine::{FormEngine, SchemaValidator};
use serde_json::json;

/// Wizard of `steps` steps, each with 4 groups of 10 fields
fn large_schema(steps: usize) -> FormSchema {
    let steps = (0..steps)
        .map(|s| {
            let groups = (0..4)
                .map(|g| {
                    let fields = (0..10)
                        .map(|f| {
                            let id = format!("s{}_g{}_f{}", s, g, f);
                            match f % 5 {
                                0 => FormField::new(id, "text", format!("Field {}", f))
                                    .required()
                                    .with_validation(FieldValidation {
                                        pattern: Some("^[A-Za-z ]+$".to_string()),
                                        min_length: Some(2),
                                        ..Default::default()
                                    }),
                                1 => FormField::new(id, "email", "Email").required(),
                                2 => FormField::new(id, "number", "Amount").with_validation(
                                    FieldValidation {
                                        min: Some(0.0),
                                        max: Some(1000.0),
                                        ..Default::default()
                                    },
                                ),
                                3 => FormField::new(id, "tel", "Phone").show_when(
                                    format!("s{}_g{}_f0", s, g),
                                    ShowWhen::AnyOf(vec![json!("Call me"), json!("Text me")]),
                                ),
                                _ => FormField::new(id, "select", "Country")
                                    .with_default(json!("GB")),
                            }
                        })
                        .collect();
                    FormGroup::new(format!("Group {}", g), fields)
                })
                .collect();
            FormStep::new(format!("Step {}", s), groups)
        })
        .collect();
    FormSchema::multi("bench", "Benchmark form", steps)
}

fn filled_engine(steps: usize) -> FormEngine {
    let schema = large_schema(steps);
    let ids: Vec<(String, String)> = schema
        .all_fields()
        .map(|f| (f.id.clone(), f.field_type.to_string()))
        .collect();
    let mut engine = FormEngine::new(schema).unwrap();
    for (id, field_type) in ids {
        let value = match field_type.as_str() {
            "text" => json!("Call me"),
            "email" => json!("ada@example.com"),
            "number" => json!(42),
            "tel" => json!("+44 20 7946 0958"),
            _ => continue,
        };
        engine.set_value(&id, value).unwrap();
    }
    engine
}

fn benchmark_schema_validation(c: &mut Criterion) {
    let schema = large_schema(10);
    c.bench_function("schema_validate_400_fields", |b| {
        b.iter(|| SchemaValidator::validate(black_box(&schema)))
    });
}

fn benchmark_validate_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_step");
    for steps in [1usize, 10] {
        let mut engine = filled_engine(steps);
        group.throughput(Throughput::Elements((steps * 40) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(steps), &steps, |b, _| {
            b.iter(|| black_box(engine.validate_step(None)))
        });
    }
    group.finish();
}

fn benchmark_render(c: &mut Criterion) {
    let engine = filled_engine(10);
    c.bench_function("render_step", |b| b.iter(|| black_box(engine.render())));
}

criterion_group!(
    benches,
    benchmark_schema_validation,
    benchmark_validate_step,
    benchmark_render
);
criterion_main!(benches);
