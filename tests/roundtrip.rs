use sechan::algorithms::{CipherAlgorithm, DigestAlgorithm};
use sechan::channel::{ReceiverChannel, SenderChannel};
use sechan::profile::Profile;
use sechan::wire::Sdu;

fn profile() -> Profile {
    Profile {
        cipher: CipherAlgorithm::Aes128Ecb,
        digest: DigestAlgorithm::Sha1,
        master_key: vec![0u8; 16],
        key_lifetime: 3600,
        block_limit: 1024,
    }
}

/// S1 — basic echo: one SDU, exact plaintext recovered.
#[test]
fn basic_echo_round_trip() {
    let profile = profile();
    let mut sender = SenderChannel::new(&profile, b"5000", b"5001");
    let mut receiver = ReceiverChannel::new(&profile, b"5001", b"5000");

    let wire = sender.send(b"hello\n");
    let sdu = Sdu::parse(&wire).unwrap();
    assert_eq!(sdu.length(), 8 + 16 + 20);

    let plaintext = receiver.receive(&wire).unwrap();
    assert_eq!(plaintext, b"hello\n");
}

/// Invariant 1 — round-trip for any message up to 480 bytes.
#[test]
fn round_trip_across_message_sizes() {
    let profile = profile();
    for len in [0usize, 1, 15, 16, 17, 63, 200, 480] {
        let mut sender = SenderChannel::new(&profile, b"5000", b"5001");
        let mut receiver = ReceiverChannel::new(&profile, b"5001", b"5000");
        let message = vec![0x5Au8; len];
        let wire = sender.send(&message);
        assert_eq!(receiver.receive(&wire).unwrap(), message);
    }
}

/// S2 — rekey on byte limit: second SDU starts a fresh epoch.
#[test]
fn rekey_on_byte_limit() {
    let mut profile = profile();
    profile.block_limit = 1; // 16-byte epochs
    let mut sender = SenderChannel::new(&profile, b"5000", b"5001");
    let mut receiver = ReceiverChannel::new(&profile, b"5001", b"5000");

    let first = sender.send(&[0x11; 16]);
    let second = sender.send(&[0x22; 16]);

    let second_sdu = Sdu::parse(&second).unwrap();
    assert_eq!(second_sdu.context_index(), 1);
    assert_eq!(second_sdu.sequence_number(), 0);

    assert_eq!(receiver.receive(&first).unwrap(), vec![0x11; 16]);
    assert_eq!(receiver.receive(&second).unwrap(), vec![0x22; 16]);
}

/// S3 — flipping any body bit after MAC computation breaks verification.
#[test]
fn tamper_anywhere_in_body_fails_verification() {
    let profile = profile();
    let mut sender = SenderChannel::new(&profile, b"5000", b"5001");
    let wire = sender.send(b"integrity matters");

    for i in 0..wire.len() {
        let mut receiver = ReceiverChannel::new(&profile, b"5001", b"5000");
        let mut tampered = wire.clone();
        tampered[i] ^= 0x01;
        assert!(receiver.receive(&tampered).is_none(), "byte {} tamper went undetected", i);
    }
}

/// S4 — a receiver derived with unswapped nonces can never verify.
#[test]
fn wrong_nonce_receiver_never_verifies() {
    let profile = profile();
    let mut sender = SenderChannel::new(&profile, b"5000", b"5001");
    let mut receiver = ReceiverChannel::new(&profile, b"5000", b"5001");

    let wire = sender.send(b"hello\n");
    assert!(receiver.receive(&wire).is_none());
}

/// S5 — pool size 4, five rekeys; the fifth epoch (id 4) evicts id 0
/// from the shared slot and still decrypts.
#[test]
fn pool_eviction_after_wraparound() {
    let mut profile = profile();
    profile.block_limit = 1;
    let mut sender = SenderChannel::new(&profile, b"5000", b"5001");
    let mut receiver = ReceiverChannel::new(&profile, b"5001", b"5000");

    let mut wires = Vec::new();
    for _ in 0..5 {
        wires.push(sender.send(&[0x33; 16]));
    }

    assert!(receiver.receive(&wires[0]).is_some());
    assert!(receiver.receive(&wires[1]).is_some());
    assert!(receiver.receive(&wires[2]).is_some());
    assert!(receiver.receive(&wires[3]).is_some());
    // context 4 hashes to the same slot as context 0 and evicts it.
    assert!(receiver.receive(&wires[4]).is_some());
}

/// Invariant 3 — context_id strictly increases from 0; sdu_counter
/// resets on every rekey.
#[test]
fn rekey_monotonicity() {
    let mut profile = profile();
    profile.block_limit = 1;
    let mut sender = SenderChannel::new(&profile, b"5000", b"5001");

    let mut seen_context_ids = Vec::new();
    for _ in 0..4 {
        let wire = sender.send(&[0; 16]);
        let sdu = Sdu::parse(&wire).unwrap();
        seen_context_ids.push(sdu.context_index());
        assert_eq!(sdu.sequence_number(), 0);
    }
    assert_eq!(seen_context_ids, vec![0, 1, 2, 3]);
}

/// Invariant 4 — no epoch ever carries more than block_limit * B bytes.
#[test]
fn byte_limit_never_exceeded_within_an_epoch() {
    let mut profile = profile();
    profile.block_limit = 4; // 64 bytes per AES-128 epoch
    let mut sender = SenderChannel::new(&profile, b"5000", b"5001");

    let mut bytes_in_epoch: u64 = 0;
    let mut current_context = 0u16;
    for _ in 0..20 {
        let wire = sender.send(&[0xAB; 20]);
        let sdu = Sdu::parse(&wire).unwrap();
        if sdu.context_index() != current_context {
            bytes_in_epoch = 0;
            current_context = sdu.context_index();
        }
        bytes_in_epoch += 20;
        assert!(bytes_in_epoch <= 64);
    }
}
