use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rayconf::builder::{DocumentBuilder, V2rayBuilder};
use rayconf::custom::patch_port_directives;
use rayconf::merge::{AggregateDocument, MultiProfileMerger};
use rayconf::{GlobalSettings, Port, ProfileDescriptor, Protocol};
use tempfile::TempDir;

fn profiles(count: usize) -> Vec<ProfileDescriptor> {
    (0..count)
        .map(|i| {
            ProfileDescriptor::standard(Protocol::Vmess, format!("p{i}.example.com"), 443)
                .with_id("b831381d-6324-4d53-ad4f-8cda48b30811")
                .with_index_id(format!("p{i}"))
        })
        .collect()
}

fn bench_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("fold");
    let settings = GlobalSettings::default();
    let builder = V2rayBuilder::new(&settings);

    for count in [1, 10, 100] {
        let documents: Vec<_> = profiles(count)
            .iter()
            .map(|p| builder.build(p).unwrap())
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &documents, |b, docs| {
            b.iter(|| {
                docs.iter()
                    .cloned()
                    .fold(AggregateDocument::new(), AggregateDocument::fold)
            });
        });
    }

    group.finish();
}

fn bench_generate_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_many");
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("merged.json");
    let settings = GlobalSettings::default();
    let merger = MultiProfileMerger::new(&settings);

    for count in [1, 10, 50] {
        let profiles = profiles(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &profiles, |b, profiles| {
            b.iter(|| {
                merger
                    .generate_many(black_box(profiles.iter().map(Some)), &path)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_patch(c: &mut Criterion) {
    let http = Port::try_from(10809).unwrap();
    let socks = Port::try_from(10808).unwrap();
    let mut contents = String::from("port: 7890\nsocks-port: 7891\n");
    for i in 0..2000 {
        contents.push_str(&format!("  - DOMAIN-SUFFIX,site{i}.example.com,PROXY\n"));
    }

    c.bench_function("patch_port_directives", |b| {
        b.iter(|| patch_port_directives(black_box(contents.as_bytes()), http, socks));
    });
}

criterion_group!(benches, bench_fold, bench_generate_many, bench_patch);
criterion_main!(benches);
