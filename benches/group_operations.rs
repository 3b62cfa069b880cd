use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dlog_protocols::groups::{native, EcF2mGroup, EcFpGroup, NativeP256Group, Rfc5114Group, ZpGroup};
use dlog_protocols::sigma::SigmaDlog;
use dlog_protocols::{DlogGroup, SecureRng, SigmaProver, SigmaVerifier};

fn bench_exponentiation<G: DlogGroup>(c: &mut Criterion, label: &str, group: &G) {
    let mut rng = SecureRng::new();
    let base = group.random_element(&mut rng).unwrap();
    let exponent = group.random_exponent(&mut rng);

    let mut bench = c.benchmark_group("exponentiate");
    bench.bench_with_input(BenchmarkId::new("public", label), &exponent, |b, e| {
        b.iter(|| group.exponentiate(black_box(&base), black_box(e)).unwrap())
    });
    bench.bench_with_input(BenchmarkId::new("secret", label), &exponent, |b, e| {
        b.iter(|| group.exponentiate_secret(black_box(&base), black_box(e)).unwrap())
    });
    bench.finish();
}

fn bench_membership<G: DlogGroup>(c: &mut Criterion, label: &str, group: &G) {
    let mut rng = SecureRng::new();
    let element = group.random_element(&mut rng).unwrap();
    let bytes = group.encode_element(&element, true).unwrap();

    c.bench_function(&format!("decode_and_check/{label}"), |b| {
        b.iter(|| {
            let candidate = group.reconstruct_element(black_box(&bytes), true).unwrap();
            assert!(group.is_member(&candidate).unwrap());
        })
    });
}

fn bench_backends(c: &mut Criterion) {
    native::initialize().unwrap();
    let p256_native = NativeP256Group::new().unwrap();
    let p256_software = EcFpGroup::named("P-256").unwrap();
    let modp_fixed = Rfc5114Group::new().unwrap();
    let modp_software = ZpGroup::named("RFC5114-2048-256").unwrap();
    let k233 = EcF2mGroup::named("K-233").unwrap();

    bench_exponentiation(c, "p256_native", &p256_native);
    bench_exponentiation(c, "p256_software", &p256_software);
    bench_exponentiation(c, "rfc5114_fixed_width", &modp_fixed);
    bench_exponentiation(c, "rfc5114_software", &modp_software);
    bench_exponentiation(c, "k233", &k233);

    bench_membership(c, "p256_native", &p256_native);
    bench_membership(c, "p256_software", &p256_software);
    bench_membership(c, "rfc5114_software", &modp_software);
    bench_membership(c, "k233", &k233);
}

fn bench_dlog_proof(c: &mut Criterion) {
    native::initialize().unwrap();
    let group = std::sync::Arc::new(NativeP256Group::new().unwrap());
    let mut rng = SecureRng::new();
    let w = group.random_exponent(&mut rng);
    let h = group.exponentiate_generator(&w).unwrap();
    let prover = SigmaProver::new(group.clone(), SigmaDlog, 80).unwrap();
    let verifier = SigmaVerifier::new(group, SigmaDlog, 80).unwrap();
    let proof = prover.prove_non_interactive(&h, &w, b"bench", &mut rng).unwrap();

    c.bench_function("dlog_proof_generation", |b| {
        b.iter(|| {
            prover
                .prove_non_interactive(black_box(&h), black_box(&w), b"bench", &mut rng)
                .unwrap()
        })
    });
    c.bench_function("dlog_proof_verification", |b| {
        b.iter(|| {
            assert!(verifier
                .verify_non_interactive(black_box(&h), black_box(&proof), b"bench")
                .unwrap())
        })
    });
}

criterion_group!(benches, bench_backends, bench_dlog_proof);
criterion_main!(benches);
