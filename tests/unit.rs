//! Unit tests for the program wrapper: price attestation parsing, instruction
//! decoding and the persisted account layout.

use bytemuck::Zeroable;
use pyth_sdk_solana::Price;
use solana_program::{account_info::AccountInfo, program_error::ProgramError, pubkey::Pubkey};
use stablecoin_prog::{
    constants::{CONFIG_LEN, POSITION_LEN},
    engine::{ConfigUpdate, RiskError},
    error::{map_risk_error, StablecoinError},
    ix::Instruction,
    oracle::{self, PYTH_RECEIVER_PROGRAM_ID},
    state::{self, MarketConfig, PositionAccount},
};

const FEED: [u8; 32] = [3u8; 32];
const NOW: i64 = 1_700_000_000;

// --- Harness ---

struct TestAccount {
    key: Pubkey,
    owner: Pubkey,
    lamports: u64,
    data: Vec<u8>,
}

impl TestAccount {
    fn oracle(data: Vec<u8>) -> Self {
        Self { key: Pubkey::new_unique(), owner: PYTH_RECEIVER_PROGRAM_ID, lamports: 0, data }
    }

    fn to_info<'a>(&'a mut self) -> AccountInfo<'a> {
        AccountInfo::new(&self.key, false, false, &mut self.lamports, &mut self.data, &self.owner, false, 0)
    }
}

/// `full` selects the single-byte verification variant.
fn price_update(full: bool, price: i64, expo: i32, conf: u64, publish_time: i64) -> Vec<u8> {
    let mut data = vec![0u8; oracle::PRICE_UPDATE_V2_MIN_LEN];
    data[..8].copy_from_slice(&oracle::PRICE_UPDATE_V2_DISCRIMINATOR);
    let base = if full {
        data[40] = 1;
        41
    } else {
        data[40] = 0;
        data[41] = 3;
        42
    };
    data[base..base + 32].copy_from_slice(&FEED);
    data[base + 32..base + 40].copy_from_slice(&price.to_le_bytes());
    data[base + 40..base + 48].copy_from_slice(&conf.to_le_bytes());
    data[base + 48..base + 52].copy_from_slice(&expo.to_le_bytes());
    data[base + 52..base + 60].copy_from_slice(&publish_time.to_le_bytes());
    data
}

fn read(acc: &mut TestAccount, conf_bps: u16) -> Result<u64, StablecoinError> {
    let info = acc.to_info();
    oracle::read_price_e6(&info, &FEED, NOW, 60, conf_bps)
}

// --- Oracle ---

#[test]
fn test_oracle_reads_both_verification_variants() {
    let mut partial = TestAccount::oracle(price_update(false, 15_000_000_000, -8, 1_000_000, NOW));
    let mut full = TestAccount::oracle(price_update(true, 15_000_000_000, -8, 1_000_000, NOW - 60));
    assert_eq!(read(&mut partial, 100), Ok(150_000_000));
    assert_eq!(read(&mut full, 100), Ok(150_000_000));
}

#[test]
fn test_oracle_normalization() {
    let p = |price, expo| Price { price, conf: 0, expo, publish_time: NOW };
    assert_eq!(oracle::normalize_price_e6(&p(150, 0)), Ok(150_000_000));
    assert_eq!(oracle::normalize_price_e6(&p(150_123_456_789, -9)), Ok(150_123_456));
    assert_eq!(oracle::normalize_price_e6(&p(1, -7)), Err(StablecoinError::InvalidFeed));
    assert_eq!(oracle::normalize_price_e6(&p(1, 19)), Err(StablecoinError::InvalidFeed));
    assert_eq!(oracle::normalize_price_e6(&p(i64::MAX, 18)), Err(StablecoinError::InvalidFeed));
    assert_eq!(oracle::normalize_price_e6(&p(-5, -8)), Err(StablecoinError::InvalidFeed));
}

#[test]
fn test_oracle_stale() {
    let mut old = TestAccount::oracle(price_update(false, 15_000_000_000, -8, 0, NOW - 61));
    assert_eq!(read(&mut old, 0), Err(StablecoinError::StalePrice));
}

#[test]
fn test_oracle_rejects_wrong_feed() {
    let mut data = price_update(false, 15_000_000_000, -8, 0, NOW);
    data[42] ^= 0xff;
    let mut acc = TestAccount::oracle(data);
    assert_eq!(read(&mut acc, 0), Err(StablecoinError::InvalidFeed));
}

#[test]
fn test_oracle_rejects_non_positive_price() {
    let mut zero = TestAccount::oracle(price_update(false, 0, -8, 0, NOW));
    let mut negative = TestAccount::oracle(price_update(false, -1, -8, 0, NOW));
    assert_eq!(read(&mut zero, 0), Err(StablecoinError::InvalidFeed));
    assert_eq!(read(&mut negative, 0), Err(StablecoinError::InvalidFeed));
}

#[test]
fn test_oracle_confidence_filter() {
    // conf is 2% of price
    let data = price_update(false, 10_000_000_000, -8, 200_000_000, NOW);
    let mut acc = TestAccount::oracle(data);
    assert_eq!(read(&mut acc, 100), Err(StablecoinError::InvalidFeed));
    assert_eq!(read(&mut acc, 200), Ok(100_000_000));
    assert_eq!(read(&mut acc, 0), Ok(100_000_000));
}

#[test]
fn test_oracle_unavailable() {
    let mut foreign = TestAccount::oracle(price_update(false, 15_000_000_000, -8, 0, NOW));
    foreign.owner = Pubkey::new_unique();
    assert_eq!(read(&mut foreign, 0), Err(StablecoinError::PriceUnavailable));

    let mut short = TestAccount::oracle(vec![0u8; 100]);
    assert_eq!(read(&mut short, 0), Err(StablecoinError::PriceUnavailable));

    let mut data = price_update(false, 15_000_000_000, -8, 0, NOW);
    data[40] = 2;
    let mut unknown = TestAccount::oracle(data);
    assert_eq!(read(&mut unknown, 0), Err(StablecoinError::PriceUnavailable));
}

#[test]
fn test_oracle_rejects_other_receiver_accounts() {
    // Same owner and layout, different account type
    let mut data = price_update(false, 15_000_000_000, -8, 0, NOW);
    data[..8].copy_from_slice(&[0u8; 8]);
    let mut other = TestAccount::oracle(data);
    assert_eq!(read(&mut other, 0), Err(StablecoinError::PriceUnavailable));

    let data = price_update(true, 15_000_000_000, -8, 0, NOW);
    assert!(oracle::parse_price_update(&data).is_ok());
    let mut tampered = data;
    tampered[7] ^= 1;
    assert!(oracle::parse_price_update(&tampered).is_err());
}

// --- Instruction decoding ---

fn init_config_bytes() -> Vec<u8> {
    let mut data = vec![0u8];
    data.extend_from_slice(&(-42i64).to_le_bytes());
    for v in [80u64, 10, 100, 100, 75] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    data.extend_from_slice(&FEED);
    data.extend_from_slice(&30u64.to_le_bytes());
    data.extend_from_slice(&250u16.to_le_bytes());
    data
}

#[test]
fn test_decode_init_config() {
    let ix = Instruction::decode(&init_config_bytes()).unwrap();
    assert_eq!(
        ix,
        Instruction::InitConfig {
            nonce: -42,
            liquidation_threshold: 80,
            liquidation_bonus: 10,
            min_health_factor: 100,
            precision_scale: 100,
            max_ltv: 75,
            feed_id: FEED,
            max_staleness_secs: 30,
            conf_filter_bps: 250,
        }
    );
}

#[test]
fn test_decode_truncated() {
    let data = init_config_bytes();
    assert_eq!(Instruction::decode(&data[..data.len() - 1]), Err(ProgramError::InvalidInstructionData));
    assert_eq!(Instruction::decode(&[]), Err(ProgramError::InvalidInstructionData));
    assert_eq!(Instruction::decode(&[3, 1, 2, 3]), Err(ProgramError::InvalidInstructionData));
    assert_eq!(Instruction::decode(&[9, 0, 0, 0, 0, 0, 0, 0, 0]), Err(ProgramError::InvalidInstructionData));
}

#[test]
fn test_decode_update_config_flags() {
    let mut data = vec![1u8];
    for (flag, val) in [(1u8, 70u64), (0, 999), (1, 120)] {
        data.push(flag);
        data.extend_from_slice(&val.to_le_bytes());
    }
    assert_eq!(
        Instruction::decode(&data),
        Ok(Instruction::UpdateConfig {
            update: ConfigUpdate {
                liquidation_threshold: Some(70),
                liquidation_bonus: None,
                min_health_factor: Some(120),
            }
        })
    );

    data[1] = 2;
    assert_eq!(Instruction::decode(&data), Err(ProgramError::InvalidInstructionData));
}

#[test]
fn test_decode_amount_instructions() {
    let mut deposit = vec![2u8];
    deposit.extend_from_slice(&7i64.to_le_bytes());
    deposit.extend_from_slice(&500u64.to_le_bytes());
    assert_eq!(Instruction::decode(&deposit), Ok(Instruction::DepositAndMint { nonce: 7, amount: 500 }));

    let amount = 123_456u64.to_le_bytes();
    let burn: Vec<u8> = [3u8].iter().chain(amount.iter()).copied().collect();
    let liquidate: Vec<u8> = [4u8].iter().chain(amount.iter()).copied().collect();
    assert_eq!(Instruction::decode(&burn), Ok(Instruction::BurnAndRedeem { amount: 123_456 }));
    assert_eq!(Instruction::decode(&liquidate), Ok(Instruction::Liquidate { amount: 123_456 }));
}

// --- State layout ---

#[test]
fn test_account_sizes() {
    assert_eq!(CONFIG_LEN, 248);
    assert_eq!(POSITION_LEN, 152);
    assert_eq!(core::mem::align_of::<MarketConfig>(), 8);
    assert_eq!(core::mem::align_of::<PositionAccount>(), 8);
}

#[test]
fn test_position_write_read() {
    let mut p = PositionAccount::zeroed();
    p.owner = [1u8; 32];
    p.nonce = -3;
    p.collateral_amount = 8_000_000_000;
    p.debt_amount = 960_000_000;

    let mut data = vec![0u8; POSITION_LEN];
    state::write_position(&mut data, &p);
    let back = state::read_position(&data);
    assert_eq!(back.owner, [1u8; 32]);
    assert_eq!(back.nonce, -3);
    assert_eq!(back.position().collateral_amount, 8_000_000_000);
    assert_eq!(back.position().debt_amount, 960_000_000);
}

#[test]
fn test_config_risk_params_round_trip() {
    let mut c = MarketConfig::zeroed();
    c.liquidation_threshold = 80;
    c.liquidation_bonus = 10;
    c.min_health_factor = 100;
    c.precision_scale = 100;
    c.collateral_unit = 1_000_000_000;
    let mut params = c.risk_params();
    assert_eq!(params.validate(), Ok(()));

    params.liquidation_bonus = 7;
    params.precision_scale = 1;
    c.set_risk_params(&params);
    assert_eq!(c.liquidation_bonus, 7);
    assert_eq!(c.precision_scale, 100);
}

// --- Errors ---

#[test]
fn test_error_codes() {
    assert_eq!(ProgramError::from(StablecoinError::InvalidParameter), ProgramError::Custom(0));
    assert_eq!(ProgramError::from(StablecoinError::HealthyPosition), ProgramError::Custom(12));
    assert_eq!(map_risk_error(RiskError::InvalidPrice), StablecoinError::InvalidFeed.into());
    assert_eq!(map_risk_error(RiskError::PositionNotFound), StablecoinError::NotFound.into());
}
