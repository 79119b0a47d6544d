//! Basic path reconstruction example.
//!
//! A payment from Alice to Dave splits across two intermediaries. The
//! engine recovers both routes and the flow each one carried.

use alloy_primitives::{Address, B256, U256};
use stream_path_engine::prelude::*;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  stream-path-engine: Basic Path Example      ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let tx = B256::repeat_byte(0x11);
    let token = Address::repeat_byte(0xee);
    let alice = Address::with_last_byte(0xa1);
    let bob = Address::with_last_byte(0xb2);
    let carol = Address::with_last_byte(0xc3);
    let dave = Address::with_last_byte(0xd4);

    let mut snapshot = TransactionSnapshot::new(tx);
    snapshot.add_transfer(ElementaryTransfer::single(
        tx, 0, alice, bob, U256::from(1), token, U256::from(700),
    ));
    snapshot.add_transfer(ElementaryTransfer::single(
        tx, 1, alice, carol, U256::from(1), token, U256::from(300),
    ));
    snapshot.add_transfer(ElementaryTransfer::single(
        tx, 2, bob, dave, U256::from(2), token, U256::from(700),
    ));
    snapshot.add_transfer(ElementaryTransfer::single(
        tx, 3, carol, dave, U256::from(3), token, U256::from(300),
    ));
    snapshot.add_stream(StreamCompleted::new(tx, 4, alice, dave));

    println!("━━━ Transfers ━━━\n");
    for transfer in snapshot.transfers.transfers() {
        println!(
            "  [{}] {} -> {}  token {}  value {}",
            transfer.log_index(),
            transfer.from(),
            transfer.to(),
            transfer.token_id(),
            transfer.value()
        );
    }
    println!();

    let report = PathReconstructor::default().reconstruct_transaction(&snapshot);
    println!("{}", report);

    let stats = PathStats::for_address(&report.paths, alice);
    println!("━━━ Activity of {} ━━━\n", alice);
    println!("{}", stats);
}
