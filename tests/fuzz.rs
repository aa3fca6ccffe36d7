use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use stablecoin_prog::engine::{ConfigUpdate, Ledger, PositionKey, RiskParams};

fn default_params() -> RiskParams {
    RiskParams {
        liquidation_threshold: 80,
        liquidation_bonus: 10,
        min_health_factor: 100,
        precision_scale: 100,
        max_ltv: 0,
        collateral_unit: 1_000_000_000,
    }
}

#[test]
fn deterministic_fuzz_simulation() {
    let seed = [0xabu8; 16];
    let mut rng = XorShiftRng::from_seed(seed);
    let mut ledger = Ledger::new(default_params()).unwrap();

    let keys: Vec<PositionKey> = (0..8u8)
        .map(|i| PositionKey { owner: [i % 4; 32], market: [0xee; 32], nonce: (i / 4) as i64 })
        .collect();
    let min_hf = default_params().min_health_factor as u128;

    for _ in 0..500 {
        let op: u8 = rng.gen_range(0..4);
        let key = keys[rng.gen_range(0..keys.len())];
        let price = rng.gen_range(20_000_000..200_000_000u64); // $20..$200

        match op {
            0 => { // Deposit and mint
                let amt = rng.gen_range(1..20_000_000_000u64);
                if let Ok(out) = ledger.deposit_and_mint(key, amt, price) {
                    assert!(out.position.debt_amount == 0 || out.health_factor >= min_hf);
                }
            },
            1 => { // Burn and redeem
                let debt = ledger.position(&key).map_or(0, |p| p.debt_amount);
                let amt = if debt == 0 { 0 } else { rng.gen_range(1..=debt) };
                if let Ok(out) = ledger.burn_and_redeem(&key, amt, price) {
                    assert!(out.position.debt_amount == 0 || out.health_factor >= min_hf);
                }
            },
            2 => { // Liquidate
                let debt = ledger.position(&key).map_or(0, |p| p.debt_amount);
                if debt > 0 {
                    let before = *ledger.position(&key).unwrap();
                    let amt = rng.gen_range(1..=debt);
                    if let Ok(out) = ledger.liquidate(&key, amt, price) {
                        assert!(out.health_factor_before < min_hf);
                        assert!(out.seized <= before.collateral_amount);
                        assert_eq!(out.position.debt_amount, before.debt_amount - amt);
                    }
                }
            },
            3 => { // Retune threshold
                let threshold = rng.gen_range(50..=100u64);
                let _ = ledger.update_config(&ConfigUpdate {
                    liquidation_threshold: Some(threshold),
                    ..ConfigUpdate::default()
                });
            },
            _ => unreachable!(),
        }

        assert!(ledger.check_conservation());
    }
}
