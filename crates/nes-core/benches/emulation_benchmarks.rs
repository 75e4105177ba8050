//! Performance benchmarks for the emulation core: CPU instruction
//! throughput, PPU frame rendering, full-console frame stepping, and
//! ROM loading/reset overhead.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nes_core::Console;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn load_test_rom(name: &str) -> Option<Vec<u8>> {
    let path = workspace_root().join("test-roms").join(name);
    if path.exists() {
        fs::read(&path).ok()
    } else {
        None
    }
}

/// A minimal valid NROM image: 32KB PRG, 8KB CHR, infinite `JMP $8000`.
fn create_minimal_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 16 + 32768 + 8192];
    rom[0] = 0x4E; // 'N'
    rom[1] = 0x45; // 'E'
    rom[2] = 0x53; // 'S'
    rom[3] = 0x1A; // EOF
    rom[4] = 2; // 32KB PRG-ROM
    rom[5] = 1; // 8KB CHR-ROM
    rom[6] = 0x01; // mapper 0, vertical mirroring

    rom[16 + 0x7FFC] = 0x00;
    rom[16 + 0x7FFD] = 0x80;

    rom[16] = 0x4C; // JMP absolute
    rom[17] = 0x00;
    rom[18] = 0x80;

    rom
}

fn bench_cpu_instructions(c: &mut Criterion) {
    let rom_data = create_minimal_rom();
    let mut console = Console::from_rom_bytes(&rom_data).expect("failed to create console");

    let mut group = c.benchmark_group("cpu");
    group.throughput(Throughput::Elements(1));
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("single_instruction", |b| {
        b.iter(|| {
            black_box(console.step());
        });
    });

    group.bench_function("1000_instructions", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                black_box(console.step());
            }
        });
    });

    group.finish();
}

fn bench_ppu_frames(c: &mut Criterion) {
    let rom_data = create_minimal_rom();
    let mut console = Console::from_rom_bytes(&rom_data).expect("failed to create console");

    let mut group = c.benchmark_group("ppu");
    group.throughput(Throughput::Elements(1));
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("single_frame", |b| {
        b.iter(|| {
            console.run_frames(1);
            black_box(console.framebuffer_rgba());
        });
    });

    group.finish();
}

fn bench_real_rom_execution(c: &mut Criterion) {
    let rom_data = load_test_rom("cpu/nestest.nes").unwrap_or_else(create_minimal_rom);
    let mut console = Console::from_rom_bytes(&rom_data).expect("failed to create console");

    let mut group = c.benchmark_group("console");
    group.throughput(Throughput::Elements(1));
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("nestest_frame", |b| {
        b.iter(|| {
            console.run_frames(1);
            black_box(console.framebuffer_rgba());
        });
    });

    group.bench_function("60_frames", |b| {
        b.iter(|| {
            console.run_frames(60);
            black_box(console.framebuffer_rgba());
        });
    });

    group.finish();
}

fn bench_rom_loading(c: &mut Criterion) {
    let rom_data = create_minimal_rom();

    let mut group = c.benchmark_group("initialization");
    group.throughput(Throughput::Elements(1));
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("from_rom_bytes", |b| {
        b.iter(|| {
            let console =
                Console::from_rom_bytes(black_box(&rom_data)).expect("failed to create console");
            black_box(console);
        });
    });

    group.bench_function("reset", |b| {
        let mut console = Console::from_rom_bytes(&rom_data).expect("failed to create console");
        b.iter(|| {
            console.reset();
            black_box(console.total_cycles());
        });
    });

    group.finish();
}

fn bench_mapper_variations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mappers");
    group.measurement_time(Duration::from_secs(5));

    let rom_data = create_minimal_rom();
    let mut console = Console::from_rom_bytes(&rom_data).expect("failed to create console");
    group.bench_with_input(BenchmarkId::new("frame", "NROM"), &(), |b, ()| {
        b.iter(|| {
            console.run_frames(1);
            black_box(console.framebuffer_rgba());
        });
    });

    if let Some(rom_data) = load_test_rom("mappers/mapper_holymapperel_1_P128K.nes") {
        if let Ok(mut console) = Console::from_rom_bytes(&rom_data) {
            group.bench_with_input(BenchmarkId::new("frame", "MMC1"), &(), |b, ()| {
                b.iter(|| {
                    console.run_frames(1);
                    black_box(console.framebuffer_rgba());
                });
            });
        }
    }

    group.finish();
}

fn bench_memory_access(c: &mut Criterion) {
    let rom_data = create_minimal_rom();
    let console = Console::from_rom_bytes(&rom_data).expect("failed to create console");

    let mut group = c.benchmark_group("memory");
    group.throughput(Throughput::Bytes(1));
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("peek_ram", |b| {
        b.iter(|| {
            black_box(console.peek_memory(black_box(0x0000)));
        });
    });

    group.bench_function("peek_prg", |b| {
        b.iter(|| {
            black_box(console.peek_memory(black_box(0x8000)));
        });
    });

    group.bench_function("peek_sequential_256", |b| {
        b.iter(|| {
            for addr in 0..256u16 {
                black_box(console.peek_memory(addr));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_cpu_instructions,
    bench_ppu_frames,
    bench_real_rom_execution,
    bench_rom_loading,
    bench_mapper_variations,
    bench_memory_access,
);
criterion_main!(benches);
