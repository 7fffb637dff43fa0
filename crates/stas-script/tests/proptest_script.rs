use proptest::prelude::*;

use stas_script::chunk::decode_script;
use stas_script::num::{decode_script_num, encode_script_num};
use stas_script::{Address, Network, Script};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn script_number_encode_decode_roundtrip(val in 0u64..=i64::MAX as u64) {
        let bytes = encode_script_num(val);
        prop_assert!(bytes.len() <= 9);
        let back = decode_script_num(&bytes).unwrap();
        prop_assert_eq!(back as u64, val);
    }

    #[test]
    fn appended_numbers_decode_as_single_chunks(values in prop::collection::vec(any::<u32>(), 1..16)) {
        let mut script = Script::new();
        for v in &values {
            script.append_number(*v as u64);
        }
        let chunks = decode_script(script.to_bytes()).unwrap();
        prop_assert_eq!(chunks.len(), values.len());
        for (chunk, v) in chunks.iter().zip(&values) {
            let decoded = match chunk.op {
                0x51 => 1,
                _ => decode_script_num(chunk.push_bytes().unwrap()).unwrap(),
            };
            prop_assert_eq!(decoded as u64, *v as u64);
        }
    }

    #[test]
    fn pushes_survive_decoding(parts in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..300), 1..8)) {
        let mut script = Script::new();
        for p in &parts {
            script.append_push_data(p).unwrap();
        }
        let chunks = script.chunks().unwrap();
        prop_assert_eq!(chunks.len(), parts.len());
        for (chunk, p) in chunks.iter().zip(&parts) {
            prop_assert_eq!(chunk.data.as_deref(), Some(&p[..]));
        }
    }

    #[test]
    fn address_hash_roundtrip(pkh in prop::array::uniform20(any::<u8>()), testnet in any::<bool>()) {
        let network = if testnet { Network::Testnet } else { Network::Mainnet };
        let addr = Address::from_public_key_hash(&pkh, network);
        let parsed = Address::from_string(&addr.address_string).unwrap();
        prop_assert_eq!(parsed.public_key_hash, pkh);
        prop_assert_eq!(parsed.network, network);
    }
}
