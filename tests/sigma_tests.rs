mod common;

use std::sync::Arc;

use common::{init_tracing, native_p256, rfc5114_fixed, toy_ec_f2m, toy_ec_fp, toy_zp};
use dlog_protocols::encryption::{CramerShoupKeyPair, ElGamalKeyPair};
use dlog_protocols::sigma::{
    CramerShoupEncryptedValueInput, DhInput, ElGamalEncryptedValueInput, ElGamalKnowledge,
    SigmaAnd, SigmaCramerShoupEncryptedValue, SigmaDhExtended, SigmaDlog,
    SigmaElGamalEncryptedValue, ZkPokProver, ZkPokVerifier,
};
use dlog_protocols::{
    DlogGroup, LocalChannel, SecureRng, SigmaProver, SigmaStatement, SigmaVerifier,
};
use num_bigint::BigUint;

/// Runs the statement interactively and non-interactively, returning both
/// verdicts.
async fn run<G, S>(
    group: Arc<G>,
    statement: S,
    bits: usize,
    input: &S::Input,
    witness: &S::Witness,
) -> (bool, bool)
where
    G: DlogGroup,
    S: SigmaStatement<G> + Clone,
{
    let prover = SigmaProver::new(group.clone(), statement.clone(), bits).unwrap();
    let verifier = SigmaVerifier::new(group, statement, bits).unwrap();

    let (mut a, mut b) = LocalChannel::pair();
    let (proved, interactive) = tokio::join!(
        prover.prove(&mut a, input, witness),
        verifier.verify_interactive(&mut b, input)
    );
    proved.unwrap();

    let proof = prover
        .prove_non_interactive(input, witness, b"sigma-tests", &mut SecureRng::new())
        .unwrap();
    let non_interactive = verifier
        .verify_non_interactive(input, &proof, b"sigma-tests")
        .unwrap();
    (interactive.unwrap(), non_interactive)
}

async fn completeness<G: DlogGroup>(group: Arc<G>, bits: usize) {
    let mut rng = SecureRng::new();
    let g = &*group;

    let w = g.random_exponent(&mut rng);
    let h = g.exponentiate_generator(&w).unwrap();
    assert_eq!(run(group.clone(), SigmaDlog, bits, &h, &w).await, (true, true));

    let bases: Vec<_> = (0..3).map(|_| g.random_element(&mut rng).unwrap()).collect();
    let values = bases
        .iter()
        .map(|b| g.exponentiate_secret(b, &w).unwrap())
        .collect();
    let dh = DhInput::new(bases, values).unwrap();
    assert_eq!(run(group.clone(), SigmaDhExtended, bits, &dh, &w).await, (true, true));

    let keys = ElGamalKeyPair::generate(g, &mut rng).unwrap();
    let x = g.random_element(&mut rng).unwrap();
    let (ciphertext, r) = keys.public_key.encrypt(g, &x, &mut rng).unwrap();
    let input = ElGamalEncryptedValueInput {
        public_key: keys.public_key.clone(),
        ciphertext,
        plaintext: x.clone(),
    };
    let by_randomness = SigmaElGamalEncryptedValue::new(ElGamalKnowledge::Randomness);
    assert_eq!(run(group.clone(), by_randomness, bits, &input, &r).await, (true, true));
    let by_key = SigmaElGamalEncryptedValue::new(ElGamalKnowledge::PrivateKey);
    let k = keys.private_key().clone();
    assert_eq!(run(group.clone(), by_key, bits, &input, &k).await, (true, true));

    let keys = CramerShoupKeyPair::generate(g, &mut rng).unwrap();
    let (ciphertext, r) = keys.public_key.encrypt(g, &x, &mut rng).unwrap();
    assert_eq!(keys.decrypt(g, &ciphertext).unwrap(), x);
    let input = CramerShoupEncryptedValueInput {
        public_key: keys.public_key.clone(),
        ciphertext,
        plaintext: x,
    };
    assert_eq!(
        run(group.clone(), SigmaCramerShoupEncryptedValue, bits, &input, &r).await,
        (true, true)
    );

    let witnesses: Vec<BigUint> = (0..4).map(|_| g.random_exponent(&mut rng)).collect();
    let inputs: Vec<_> = witnesses
        .iter()
        .map(|w| g.exponentiate_generator(w).unwrap())
        .collect();
    assert_eq!(
        run(group, SigmaAnd::new(SigmaDlog), bits, &inputs, &witnesses).await,
        (true, true)
    );
}

#[tokio::test]
async fn honest_provers_always_convince() {
    init_tracing();
    for _ in 0..10 {
        completeness(toy_zp(), 3).await;
        completeness(toy_ec_fp(), 12).await;
        completeness(toy_ec_f2m(), 8).await;
    }
    completeness(native_p256(), 80).await;
    completeness(rfc5114_fixed(), 80).await;
}

#[tokio::test]
async fn false_statement_is_rejected_except_on_zero_challenge() {
    init_tracing();
    let group = toy_zp();
    let bits = 3;
    let trials = 2000;
    let prover = SigmaProver::new(group.clone(), SigmaDlog, bits).unwrap();
    let verifier = SigmaVerifier::new(group.clone(), SigmaDlog, bits).unwrap();
    let h = group.exponentiate_generator(&BigUint::from(3u32)).unwrap();
    let wrong = BigUint::from(8u32);

    let mut accepted = 0;
    for _ in 0..trials {
        let (mut a, mut b) = LocalChannel::pair();
        let (proved, verdict) = tokio::join!(
            prover.prove(&mut a, &h, &wrong),
            verifier.verify_interactive(&mut b, &h)
        );
        proved.unwrap();
        if verdict.unwrap() {
            accepted += 1;
        }
    }
    // Soundness error is 2^-3: a wrong witness only passes when e = 0.
    assert!(accepted <= trials / 8 + 100, "accepted {accepted} of {trials}");
    assert!(accepted > 0, "a zero challenge never came up in {trials} trials");
}

#[tokio::test]
async fn zkpok_rejects_a_wrong_witness() {
    init_tracing();
    let group = toy_ec_fp();
    let prover = ZkPokProver::new(group.clone(), SigmaDlog, 12).unwrap();
    let verifier = ZkPokVerifier::new(group.clone(), SigmaDlog, 12).unwrap();
    let w = BigUint::from(4242u32);
    let h = group.exponentiate_generator(&w).unwrap();

    let (mut a, mut b) = LocalChannel::pair();
    let (proved, accepted) =
        tokio::join!(prover.prove(&mut a, &h, &w), verifier.verify(&mut b, &h));
    proved.unwrap();
    assert!(accepted.unwrap());

    let wrong = BigUint::from(1u32);
    let mut accepted_count = 0;
    for _ in 0..5 {
        let (mut a, mut b) = LocalChannel::pair();
        let (proved, accepted) = tokio::join!(
            prover.prove(&mut a, &h, &wrong),
            verifier.verify(&mut b, &h)
        );
        proved.unwrap();
        if accepted.unwrap() {
            accepted_count += 1;
        }
    }
    // Only an all-zero challenge (probability 2^-12) would accept.
    assert!(accepted_count <= 1);
}
