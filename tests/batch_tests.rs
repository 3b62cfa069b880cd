mod common;

use std::sync::Arc;

use common::{init_tracing, native_p256, toy_ec_f2m};
use dlog_protocols::ot::{ByteArrayPayload, GroupElementPayload};
use dlog_protocols::{
    ChoiceBit, DlogGroup, LocalChannel, OtBatchReceiver, OtBatchSender, OtReceiverInput,
    OtSenderInput, SecurityLevel,
};
use num_bigint::BigUint;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_share_one_facade() {
    init_tracing();
    let group = native_p256();
    let level = SecurityLevel::OneSidedSimulation;
    let sender = Arc::new(OtBatchSender::new(group.clone(), ByteArrayPayload, level, 80).unwrap());
    let receiver =
        Arc::new(OtBatchReceiver::new(group, ByteArrayPayload, level, 80).unwrap());

    let mut tasks = Vec::new();
    for task in 0..8u8 {
        let (mut s, mut r) = LocalChannel::pair();
        let sender = sender.clone();
        let receiver = receiver.clone();
        tasks.push(tokio::spawn(async move {
            let pairs: Vec<_> = (0..4u8)
                .map(|i| (vec![task, i, 0], vec![task, i, 1]))
                .collect();
            let input = OtSenderInput::new(pairs).unwrap();
            let bits: Vec<u8> = (0..4u8).map(|i| (task + i) % 2).collect();
            let choices = OtReceiverInput::from_bits(&bits).unwrap();

            let sending = tokio::spawn(async move { sender.transfer(&mut s, &input).await });
            let output = receiver.transfer(&mut r, &choices).await.unwrap();
            sending.await.unwrap().unwrap();

            for (i, value) in output.values.iter().enumerate() {
                assert_eq!(value, &vec![task, i as u8, bits[i]]);
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
}

#[tokio::test]
async fn semi_honest_batch_of_group_elements() {
    init_tracing();
    let group = toy_ec_f2m();
    let level = SecurityLevel::SemiHonest;
    let sender = OtBatchSender::new(group.clone(), GroupElementPayload, level, 8).unwrap();
    let receiver = OtBatchReceiver::new(group.clone(), GroupElementPayload, level, 8).unwrap();
    assert_eq!(sender.security_level(), level);
    assert_eq!(receiver.security_level(), level);

    let element = |e: u32| group.exponentiate_generator(&BigUint::from(e)).unwrap();
    let pairs: Vec<_> = (1..=16u32).map(|i| (element(i), element(100 + i))).collect();
    let choices: Vec<ChoiceBit> = (0..16).map(|i| ChoiceBit::from(i % 3 == 0)).collect();
    let expected: Vec<_> = pairs
        .iter()
        .zip(&choices)
        .map(|(pair, choice)| choice.select(pair.clone()))
        .collect();

    let (mut s, mut r) = LocalChannel::pair();
    let input = OtSenderInput::new(pairs).unwrap();
    let choices = OtReceiverInput::new(choices).unwrap();
    let (sent, received) =
        tokio::join!(sender.transfer(&mut s, &input), receiver.transfer(&mut r, &choices));
    sent.unwrap();
    assert_eq!(received.unwrap().values, expected);
}
