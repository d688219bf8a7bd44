//! # Reserve-Chain Benchmarks
//!
//! | Engine | Operation | Expected cost |
//! |--------|-----------|---------------|
//! | rc-01 Ledger | mint / transfer / burn through the gate | O(log n) accounts |
//! | rc-01 Ledger | batch whitelist at the cap | O(cap log n) |
//! | rc-03 Multisig | submit + confirm to execution | O(owners) |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rc_01_ledger::{BackedLedgerApi, LedgerCall};
use rc_tests::integration::fixtures::{
    holder, owner, Deployment, BURNER, MINTER, WHITELIST_MANAGER,
};
use shared_types::Address;
use std::time::Duration;

// ============================================================================
// RC-01: Ledger
// ============================================================================

fn bench_ledger_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("rc-01-ledger");
    group.measurement_time(Duration::from_secs(5));

    let holders: Vec<Address> = (1..=64).map(holder).collect();
    let mut d = Deployment::devnet().unwrap();
    d.open_market(&holders).unwrap();

    group.bench_function("mint_transfer_burn", |b| {
        let ledger = d.runtime.ledger_mut();
        let mut i = 0u64;
        b.iter(|| {
            let from = holder(i % 64 + 1);
            let to = holder((i + 1) % 64 + 1);
            ledger.mint(MINTER, from, 1_000, 1_000).unwrap();
            ledger.transfer(from, to, black_box(333)).unwrap();
            ledger.burn(BURNER, to, black_box(111)).unwrap();
            i += 1;
        })
    });

    for size in [10usize, 100, 500] {
        let accounts: Vec<Address> = (10_000..10_000 + size as u64).map(holder).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::new("batch_whitelist", size),
            &accounts,
            |b, accounts| {
                let ledger = d.runtime.ledger_mut();
                let mut flag = true;
                b.iter(|| {
                    let changed = ledger
                        .batch_update_whitelist(WHITELIST_MANAGER, accounts, flag)
                        .unwrap();
                    flag = !flag;
                    black_box(changed)
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// RC-03: Multisig
// ============================================================================

fn bench_multisig_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("rc-03-multisig");

    let mut d = Deployment::devnet().unwrap();
    let ledger = d.runtime.addresses().ledger;
    let payload = LedgerCall::Approve {
        spender: holder(1),
        amount: 1,
    }
    .encode()
    .unwrap();

    group.bench_function("submit_confirm_execute", |b| {
        b.iter(|| {
            let id = d
                .runtime
                .propose(owner(1), ledger, payload.clone())
                .unwrap();
            black_box(d.runtime.confirm(owner(2), id).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_ledger_operations, bench_multisig_round);
criterion_main!(benches);
