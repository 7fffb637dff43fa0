use proptest::prelude::*;

use stas_primitives::chainhash::Hash;
use stas_primitives::ec::{PrivateKey, PublicKey, Signature};
use stas_primitives::hash::sha256d;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ecdsa_sign_verify_roundtrip(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        // Not every 32-byte array is a valid scalar.
        if let Ok(key) = PrivateKey::from_bytes(&seed) {
            let hash = sha256d(&msg);
            let sig = key.sign(&hash).unwrap();
            prop_assert!(key.pub_key().verify(&hash, &sig));

            let der = sig.to_der();
            prop_assert!(der.len() <= 72);
            let reparsed = Signature::from_der(&der).unwrap();
            prop_assert!(key.pub_key().verify(&hash, &reparsed));
        }
    }

    #[test]
    fn compressed_public_key_roundtrip(seed in prop::array::uniform32(any::<u8>())) {
        if let Ok(key) = PrivateKey::from_bytes(&seed) {
            let pk = key.pub_key();
            let parsed = PublicKey::from_bytes(&pk.to_compressed()).unwrap();
            prop_assert_eq!(parsed.hash160(), pk.hash160());
        }
    }

    #[test]
    fn hash_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = Hash::new(bytes);
        let hash2 = Hash::from_hex(&hash.to_string()).unwrap();
        prop_assert_eq!(hash.as_bytes(), hash2.as_bytes());
    }
}
