#![cfg(all(test, feature = "std"))]

use proptest::collection::vec;
use proptest::prelude::*;

use crate::{Charm, Error, KEY_LEN, NONCE_LEN, TAG_LEN};

fn session(key: &[u8; KEY_LEN], nonce: &Option<[u8; NONCE_LEN]>) -> Charm {
    Charm::new(key, nonce.as_ref().map(|n| &n[..])).expect("session init")
}

fn arb_nonce() -> impl Strategy<Value = Option<[u8; NONCE_LEN]>> {
    prop::option::of(any::<[u8; NONCE_LEN]>())
}

fn arb_msg() -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>(), 0..200)
}

proptest! {
    #[test]
    fn round_trip(key in any::<[u8; KEY_LEN]>(), nonce in arb_nonce(), msg in arb_msg()) {
        let mut buf = msg.clone();
        let tag = session(&key, &nonce).encrypt(&mut buf);
        prop_assert_eq!(tag.len(), TAG_LEN);

        prop_assert!(session(&key, &nonce).decrypt(&mut buf, &tag).is_ok());
        prop_assert_eq!(buf, msg);
    }

    #[test]
    fn tag_tamper_rejected(
        key in any::<[u8; KEY_LEN]>(),
        nonce in arb_nonce(),
        msg in arb_msg(),
        byte in 0..TAG_LEN,
        bit in 0..8u32,
    ) {
        let mut buf = msg;
        let mut tag = session(&key, &nonce).encrypt(&mut buf);
        tag[byte] ^= 1 << bit;

        let err = session(&key, &nonce).decrypt(&mut buf, &tag).unwrap_err();
        prop_assert_eq!(err, Error::TagVerifyFail);
        prop_assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn ciphertext_tamper_rejected(
        key in any::<[u8; KEY_LEN]>(),
        nonce in arb_nonce(),
        msg in vec(any::<u8>(), 1..200),
        idx in any::<prop::sample::Index>(),
        bit in 0..8u32,
    ) {
        let mut buf = msg;
        let tag = session(&key, &nonce).encrypt(&mut buf);
        let idx = idx.index(buf.len());
        buf[idx] ^= 1 << bit;

        let err = session(&key, &nonce).decrypt(&mut buf, &tag).unwrap_err();
        prop_assert_eq!(err, Error::TagVerifyFail);
        prop_assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn hash_is_deterministic(key in any::<[u8; KEY_LEN]>(), nonce in arb_nonce(), msg in arb_msg()) {
        let d0 = session(&key, &nonce).hash(&msg);
        let d1 = session(&key, &nonce).hash(&msg);
        prop_assert_eq!(d0, d1);
    }

    #[test]
    fn hash_separates_messages(
        key in any::<[u8; KEY_LEN]>(),
        nonce in arb_nonce(),
        m0 in arb_msg(),
        m1 in arb_msg(),
    ) {
        prop_assume!(m0 != m1);
        prop_assert_ne!(session(&key, &nonce).hash(&m0), session(&key, &nonce).hash(&m1));
    }

    #[test]
    fn seal_open_round_trip(key in any::<[u8; KEY_LEN]>(), nonce in arb_nonce(), msg in arb_msg()) {
        let sealed = session(&key, &nonce).seal(&msg);
        prop_assert_eq!(sealed.len(), msg.len() + TAG_LEN);

        let opened = session(&key, &nonce).open(&sealed).unwrap();
        prop_assert_eq!(opened, msg);
    }
}
