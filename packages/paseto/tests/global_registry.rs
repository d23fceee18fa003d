//! Tests for the process-wide registry. Kept in their own test binary: the
//! global registry can be published only once per process.

use cryypt_paseto::*;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_first_use_runs_one_discovery_pass() {
    const THREADS: usize = 16;

    assert_eq!(ProviderRegistry::discovery_passes(), 0);

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let registry = ProviderRegistry::global().unwrap();
                (registry as *const ProviderRegistry as usize, registry.len())
            })
        })
        .collect();

    let observed: Vec<(usize, usize)> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let (first, _) = observed[0];
    for (address, len) in &observed {
        assert_eq!(*address, first);
        assert_eq!(*len, 8);
    }
    assert_eq!(ProviderRegistry::discovery_passes(), 1);

    // published registry is stable
    let registry = ProviderRegistry::global().unwrap();
    let capability = CryptoCapability::local_encrypt(Version::V2);
    assert!(Arc::ptr_eq(
        registry.resolve(&capability).unwrap(),
        ProviderRegistry::global().unwrap().resolve(&capability).unwrap()
    ));
    assert_eq!(ProviderRegistry::discovery_passes(), 1);

    // too late to install another configuration
    assert!(matches!(
        ProviderRegistry::install(RegistryConfig::new().with_engines(["ring"])),
        Err(PasetoError::AlreadyInitialized)
    ));
    assert_eq!(ProviderRegistry::discovery_passes(), 1);
}
