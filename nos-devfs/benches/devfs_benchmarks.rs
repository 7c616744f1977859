//! DevFS benchmarks

use core::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use nos_devfs::{DevFs, DevFsConfig, OpenFlags};

fn bench_resolve(c: &mut Criterion) {
    let fs = DevFs::new(&DevFsConfig::default().with_seed(0xbe9c)).unwrap();
    let registry = fs.registry().clone();
    c.bench_function("resolve_urandom", |b| {
        b.iter(|| registry.resolve(black_box("urandom")))
    });
    c.bench_function("resolve_nested", |b| {
        b.iter(|| registry.resolve(black_box("/attestation/user_report_data")))
    });
}

fn bench_open_read_zero(c: &mut Criterion) {
    let fs = DevFs::new(&DevFsConfig::default().with_seed(0xbe9c)).unwrap();
    let mut buf = [0u8; 4096];
    c.bench_function("open_read_zero_4k", |b| {
        b.iter(|| {
            let mut handle = fs.open(black_box("zero"), OpenFlags::READ).unwrap();
            handle.read(&mut buf).unwrap()
        })
    });
}

fn bench_random_read(c: &mut Criterion) {
    let fs = DevFs::new(&DevFsConfig::default().with_seed(0xbe9c)).unwrap();
    let mut handle = fs.open("urandom", OpenFlags::READ).unwrap();
    let mut buf = [0u8; 256];
    c.bench_function("urandom_read_256", |b| {
        b.iter(|| handle.read(black_box(&mut buf)).unwrap())
    });
}

fn bench_readdir(c: &mut Criterion) {
    let fs = DevFs::new(&DevFsConfig::default().with_seed(0xbe9c)).unwrap();
    c.bench_function("readdir_root", |b| b.iter(|| fs.readdir(black_box("")).unwrap()));
}

criterion_group!(
    devfs_benchmarks,
    bench_resolve,
    bench_open_read_zero,
    bench_random_read,
    bench_readdir
);

criterion_main!(devfs_benchmarks);
