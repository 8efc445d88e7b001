use asyncgen_core::{transform, TransformOptions};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const ASYNC_MODULE: &str = r"
class Client$N extends Base {
  async fetch(url, options) {
    const res = await super.fetch(url, options);
    if (!res.ok) throw new Error(res.status);
    return await res.json();
  }

  async *pages(url) {
    let next = url;
    while (next) {
      const page = await this.fetch(next);
      for (const item of page.items) yield item;
      next = page.next;
    }
  }
}

export async function collect$N(client, url) {
  const out = [];
  for await (const item of client.pages(url)) out.push(item);
  return out;
}

export const delay$N = async (ms) => new Promise((r) => setTimeout(r, ms));
";

const SYNC_MODULE: &str = r"
export function add$N(a, b) { return a + b }
export const items$N = [1, 2, 3].map((x) => x * 2);
";

/// `copies` of `unit` with `$N` numbered so declarations stay unique.
fn source_of(copies: usize, unit: &str) -> String {
    (0..copies)
        .map(|i| unit.replace("$N", &i.to_string()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let options = TransformOptions::default();

    for copies in [1, 16, 128] {
        let source = source_of(copies, ASYNC_MODULE);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("async", copies), &source, |b, source| {
            b.iter(|| transform(black_box(source), &options).unwrap());
        });
    }

    group.finish();
}

fn bench_fast_skip(c: &mut Criterion) {
    let mut group = c.benchmark_group("fast_skip");

    for copies in [1, 128] {
        let source = source_of(copies, SYNC_MODULE);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("skip", copies), &source, |b, source| {
            let options = TransformOptions::default();
            b.iter(|| transform(black_box(source), &options).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("parse", copies), &source, |b, source| {
            let options = TransformOptions::default().with_fast_skip(false);
            b.iter(|| transform(black_box(source), &options).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transform, bench_fast_skip);
criterion_main!(benches);
