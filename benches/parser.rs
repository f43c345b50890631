//! Benchmarks for the parser ingest path.
//!
//! Models realistic PTY workloads at common terminal sizes:
//!
//! - **bulk ASCII**: `cat large_file` / base64 output, the ground-state
//!   fast path's home turf.
//! - **escape heavy**: a TUI repaint with cursor motion and SGR churn on
//!   every line, which defeats the bulk path.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use squall::Terminal;

const SIZES: [(u16, u16); 2] = [
    (80, 24),  // Classic terminal.
    (240, 80), // Full-screen 4K.
];

/// ~1 MiB of base64-like ASCII with newlines every 76 columns.
fn bulk_ascii() -> Vec<u8> {
    let mut out = Vec::with_capacity(1 << 20);
    let alphabet = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut i = 0usize;
    while out.len() < (1 << 20) {
        out.push(alphabet[i % alphabet.len()]);
        i += 1;
        if i % 76 == 0 {
            out.extend_from_slice(b"\r\n");
        }
    }
    out
}

/// A repaint-style stream: home the cursor, restyle and rewrite each row.
fn escape_heavy(cols: u16, rows: u16) -> Vec<u8> {
    let mut out = Vec::new();
    for _ in 0..64 {
        out.extend_from_slice(b"\x1b[H");
        for row in 0..rows {
            out.extend_from_slice(
                format!("\x1b[{};1H\x1b[38;5;{}m", row + 1, (row % 230) + 16).as_bytes(),
            );
            for col in 0..cols {
                out.push(b'!' + ((row + col) % 90) as u8);
            }
            out.extend_from_slice(b"\x1b[0m");
        }
    }
    out
}

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_ingest");

    let ascii = bulk_ascii();
    for (cols, rows) in SIZES {
        group.bench_with_input(
            BenchmarkId::new("bulk_ascii", format!("{cols}x{rows}")),
            &ascii,
            |b, input| {
                b.iter(|| {
                    let mut term = Terminal::new(cols, rows);
                    term.feed(black_box(input));
                    black_box(term.snapshot().cursor)
                });
            },
        );

        let heavy = escape_heavy(cols, rows);
        group.bench_with_input(
            BenchmarkId::new("escape_heavy", format!("{cols}x{rows}")),
            &heavy,
            |b, input| {
                b.iter(|| {
                    let mut term = Terminal::new(cols, rows);
                    term.feed(black_box(input));
                    black_box(term.snapshot().cursor)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_ingest);
criterion_main!(benches);
