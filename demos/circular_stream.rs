//! Circular stream example.
//!
//! Alice routes tokens around a ring of accounts and back to herself. The
//! closing transfer is routed into a virtual terminal during extraction and
//! restored to Alice in the output.

use alloy_primitives::{Address, B256, U256};
use stream_path_engine::prelude::*;
use stream_path_engine::simulation::generator::{generate_stream, StreamConfig};

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  stream-path-engine: Circular Stream Example ║");
    println!("╚══════════════════════════════════════════════╝\n");

    // --- Scenario 1: A hand-built ring ---
    println!("━━━ Scenario 1: A → B → C → A ━━━\n");

    let tx = B256::repeat_byte(0x22);
    let token = Address::repeat_byte(0xee);
    let alice = Address::with_last_byte(0xa1);
    let bob = Address::with_last_byte(0xb2);
    let carol = Address::with_last_byte(0xc3);

    let transfers = vec![
        ElementaryTransfer::single(tx, 0, alice, bob, U256::from(1), token, U256::from(40)),
        ElementaryTransfer::single(tx, 1, bob, carol, U256::from(2), token, U256::from(40)),
        ElementaryTransfer::single(tx, 2, carol, alice, U256::from(3), token, U256::from(40)),
    ];
    let stream = StreamCompleted::new(tx, 3, alice, alice);

    match PathReconstructor::default().reconstruct(&stream, &transfers) {
        Ok(record) => println!("{}", record),
        Err(e) => println!("Reconstruction failed: {}", e),
    }

    // --- Scenario 2: A generated circular stream ---
    println!("━━━ Scenario 2: Generated circular stream (seed 42) ━━━\n");

    let config = StreamConfig {
        path_count: 4,
        max_hops: 5,
        circular: true,
        seed: Some(42),
        ..Default::default()
    };
    let snapshot = generate_stream(&config);
    let report = PathReconstructor::default().reconstruct_transaction(&snapshot);
    println!("{}", report);

    let circular = PathFilter::new().circular_only().apply(&report.paths);
    println!("Circular records: {}", circular.len());
}
