use criterion::{black_box, criterion_group, criterion_main, Criterion};
use b24rest_core::fields::{normalize_filter, normalize_record};
use b24rest_core::FieldNameCodec;
use b24rest_domain::{Params, UserFieldNames};
use serde_json::json;

const FIELD_NAMES: [&str; 8] = [
    "ID",
    "TITLE",
    "ASSIGNED_BY_ID",
    "STAGE_ID",
    "UF_CRM_1_ABC",
    "UF_CRM_DELIVERY_DATE",
    "ufCrm_5_TITLE",
    "*",
];

fn sample_filter() -> Params {
    json!({
        ">=DATE_CREATE": "2024-01-01",
        "!STAGE_ID": ["LOSE", "APOLOGY"],
        "UF_CRM_1_ABC": "x",
        "0": {
            "LOGIC": "OR",
            "%TITLE": "acme",
            "=ASSIGNED_BY_ID": 7
        }
    })
    .as_object()
    .cloned()
    .unwrap()
}

fn sample_record() -> Params {
    json!({
        "id": 42,
        "title": "Deal",
        "assignedById": 7,
        "stageId": "NEW",
        "ufCrm_1_ABC": "x",
        "ufCrmDeliveryDate": null
    })
    .as_object()
    .cloned()
    .unwrap()
}

fn field_codec_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_codec");
    let codec = FieldNameCodec::new(UserFieldNames::Dynamic);

    group.bench_function("to_request_name", |b| {
        b.iter(|| {
            for name in FIELD_NAMES {
                black_box(codec.to_request_name(black_box(name)));
            }
        });
    });

    let filter = sample_filter();
    group.bench_function("normalize_filter", |b| {
        b.iter(|| black_box(normalize_filter(&codec, black_box(&filter))));
    });

    let record = sample_record();
    group.bench_function("normalize_record", |b| {
        b.iter(|| black_box(normalize_record(black_box(record.clone()))));
    });

    group.finish();
}

criterion_group!(codec_benchmarks, field_codec_benchmark);
criterion_main!(codec_benchmarks);
