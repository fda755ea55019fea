// Copyright 2024 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use rcgen::{CertificateParams, KeyPair, PKCS_ECDSA_P384_SHA384};

use super::fixtures::{certificate, tlv, KeySpec};
use crate::{
    bit_strength::{
        named_curve_size, BitStrengthCalculator, CertificateBitStrength, CurveSizeCache,
        PublicKeyAlgorithm,
    },
    oids,
};

fn strength_of(key: KeySpec) -> CertificateBitStrength {
    let der = certificate("Key", "Key", oids::SHA256_RSA, key);
    BitStrengthCalculator::default().calculate_strength(&der)
}

#[test]
fn rsa_key_size_from_modulus() {
    let strength = strength_of(KeySpec::Rsa(2048));
    assert_eq!(strength.algorithm, PublicKeyAlgorithm::Rsa);
    assert_eq!(strength.bit_size, Some(2048));

    assert_eq!(strength_of(KeySpec::Rsa(1024)).bit_size, Some(1024));
    assert_eq!(strength_of(KeySpec::Rsa(4096)).bit_size, Some(4096));
}

#[test]
fn dsa_key_size_from_prime() {
    let strength = strength_of(KeySpec::Dsa(1024));
    assert_eq!(strength.algorithm, PublicKeyAlgorithm::Dsa);
    assert_eq!(strength.bit_size, Some(1024));
}

#[test]
fn dsa_without_parameters_is_unknown() {
    let strength = strength_of(KeySpec::Algorithm(oids::DSA));
    assert_eq!(strength.algorithm, PublicKeyAlgorithm::Dsa);
    assert_eq!(strength.bit_size, None);
}

#[test]
fn ecdsa_named_curves() {
    let p256 = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let strength = BitStrengthCalculator::default().calculate_strength(p256.cert.der());
    assert_eq!(strength.algorithm, PublicKeyAlgorithm::Ecdsa);
    assert_eq!(strength.bit_size, Some(256));

    let key_pair = KeyPair::generate_for(&PKCS_ECDSA_P384_SHA384).unwrap();
    let p384 = CertificateParams::new(vec!["localhost".to_string()])
        .unwrap()
        .self_signed(&key_pair)
        .unwrap();
    let strength = BitStrengthCalculator::default().calculate_strength(p384.der());
    assert_eq!(strength.bit_size, Some(384));

    let p521 = strength_of(KeySpec::NamedCurve(oids::CURVE_P521));
    assert_eq!(p521.bit_size, Some(521));
}

#[test]
fn unknown_curve_has_no_size() {
    let strength = strength_of(KeySpec::NamedCurve("1.2.840.10045.3.1.127"));
    assert_eq!(strength.algorithm, PublicKeyAlgorithm::Ecdsa);
    assert_eq!(strength.bit_size, None);
}

#[test]
fn explicit_curve_parameters_have_no_size() {
    let specified_curve = tlv(0x30, &tlv(0x02, &[0x01]));
    let strength = strength_of(KeySpec::EcParameters(specified_curve));
    assert_eq!(strength.algorithm, PublicKeyAlgorithm::Ecdsa);
    assert_eq!(strength.bit_size, None);

    let null = strength_of(KeySpec::EcParameters(vec![0x05, 0x00]));
    assert_eq!(null.bit_size, None);
}

#[test]
fn other_algorithms() {
    let ed25519 = strength_of(KeySpec::Algorithm("1.3.101.112"));
    assert_eq!(ed25519.algorithm, PublicKeyAlgorithm::Other);
    assert_eq!(ed25519.bit_size, None);

    let garbage = BitStrengthCalculator::default().calculate_strength(b"not a certificate");
    assert_eq!(garbage.algorithm, PublicKeyAlgorithm::Other);
    assert_eq!(garbage.bit_size, None);
}

#[test]
fn curve_sizes_are_memoized_in_the_shared_cache() {
    let cache = Arc::new(CurveSizeCache::new());
    let first = BitStrengthCalculator::new(cache.clone());
    let second = BitStrengthCalculator::new(cache.clone());
    assert!(cache.is_empty());

    let p384 = KeySpec::NamedCurve(oids::CURVE_P384);
    let p384 = certificate("A", "A", oids::SHA384_ECDSA, p384);

    assert_eq!(first.calculate_strength(&p384).bit_size, Some(384));
    assert_eq!(second.calculate_strength(&p384).bit_size, Some(384));
    assert_eq!(cache.len(), 1);

    // A cached entry wins over the resolver.
    assert_eq!(
        cache.get_or_insert_with(oids::CURVE_P384, |_| panic!("resolver called on a hit")),
        Some(384)
    );
}

#[test]
fn unknown_curves_are_not_cached() {
    let cache = Arc::new(CurveSizeCache::new());
    let calculator = BitStrengthCalculator::new(cache.clone());

    for curve in ["1.3.132.0.99", "1.3.132.0.100", "1.2.840.10045.3.1.127"] {
        let der = certificate("B", "B", oids::SHA384_ECDSA, KeySpec::NamedCurve(curve));
        assert_eq!(calculator.calculate_strength(&der).bit_size, None);
    }
    assert!(cache.is_empty());

    let calls = AtomicUsize::new(0);
    let resolve = |_: &str| {
        calls.fetch_add(1, Ordering::Relaxed);
        None
    };
    assert_eq!(cache.get_or_insert_with("1.3.132.0.99", resolve), None);
    assert_eq!(cache.get_or_insert_with("1.3.132.0.99", resolve), None);
    assert_eq!(calls.load(Ordering::Relaxed), 2);
    assert!(cache.is_empty());
}

#[test]
fn cache_is_shared_across_threads() {
    let calculator = BitStrengthCalculator::default();
    let p256 = KeySpec::NamedCurve(oids::CURVE_P256);
    let der = certificate("T", "T", oids::SHA256_ECDSA, p256);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| calculator.calculate_strength(&der)))
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().bit_size, Some(256));
        }
    });

    assert_eq!(calculator.curve_cache().len(), 1);
}

#[test]
fn named_curve_table() {
    assert_eq!(named_curve_size(oids::CURVE_P192), Some(192));
    assert_eq!(named_curve_size(oids::CURVE_SECP256K1), Some(256));
    assert_eq!(named_curve_size(oids::CURVE_BRAINPOOL_P512R1), Some(512));
    assert_eq!(named_curve_size("1.2.3"), None);
}
