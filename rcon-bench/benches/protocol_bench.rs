//! Packet encoding/decoding benchmarks.

use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rcon_protocol::{Decoder, Packet, PacketKind, TERMINAL_RESPONSE};

fn create_response(id: i32, payload_size: usize) -> Packet {
    Packet::new(id, PacketKind::Response, "x".repeat(payload_size))
}

fn bench_packet_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("packet_encode");

    for size in [100, 1000, 4000] {
        let packet = create_response(1, size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &packet, |b, packet| {
            b.iter(|| black_box(packet.encode().unwrap()));
        });
    }

    group.finish();
}

fn bench_packet_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("packet_decode");

    for size in [100, 1000, 4000] {
        let encoded = create_response(1, size).encode().unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| black_box(Packet::decode(encoded).unwrap()));
        });
    }

    group.finish();
}

/// A fragmented response: several full packets followed by the probe's sentinel.
fn create_response_group(fragments: usize, fragment_size: usize) -> BytesMut {
    let mut wire = BytesMut::new();
    for _ in 0..fragments {
        wire.extend_from_slice(&create_response(7, fragment_size).encode().unwrap());
    }
    wire.extend_from_slice(
        &Packet::new(7, PacketKind::Response, TERMINAL_RESPONSE)
            .encode()
            .unwrap(),
    );
    wire
}

fn bench_stream_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_decode");

    for fragments in [1, 4, 16] {
        let wire = create_response_group(fragments, 4000);

        group.throughput(Throughput::Bytes(wire.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fragments), &wire, |b, wire| {
            b.iter(|| {
                let mut decoder = Decoder::new();
                let mut count = 0;
                // Feed in socket-sized chunks to exercise the incremental boundary scan.
                for chunk in wire.chunks(4096) {
                    decoder.extend(chunk);
                    while let Some(packet) = decoder.decode_packet().unwrap() {
                        black_box(&packet);
                        count += 1;
                    }
                }
                assert_eq!(count, fragments + 1);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_packet_encode,
    bench_packet_decode,
    bench_stream_decode,
);

criterion_main!(benches);
