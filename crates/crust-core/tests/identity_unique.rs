use std::collections::HashSet;
use std::thread;

use crust_core::RunId;

#[test]
fn sequential_minting_is_collision_free() {
    let ids: HashSet<RunId> = (0..10_000).map(|_| RunId::mint()).collect();
    assert_eq!(ids.len(), 10_000);
    assert!(ids.iter().all(|id| id.as_str().len() == RunId::LEN));
}

#[test]
fn concurrent_minting_is_collision_free() {
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| (0..1_250).map(|_| RunId::mint()).collect::<Vec<_>>()))
        .collect();
    let mut ids = HashSet::new();
    for handle in handles {
        ids.extend(handle.join().expect("minting thread"));
    }
    assert_eq!(ids.len(), 10_000);
}

#[test]
fn identities_serialize_as_plain_strings() {
    let id = RunId::mint();
    let json = serde_json::to_string(&id).expect("json");
    assert_eq!(json, format!("\"{id}\""));
}
