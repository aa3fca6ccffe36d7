//! Stablecoin: single-file Solana program around a pure collateral risk engine.

#![deny(unsafe_code)]

pub mod engine;

// 1. mod constants
pub mod constants {
    use core::mem::size_of;
    use crate::state::{MarketConfig, PositionAccount};

    pub const CONFIG_MAGIC: u64 = 0x5354424c43464731; // "STBLCFG1"
    pub const POSITION_MAGIC: u64 = 0x5354424c504f5331; // "STBLPOS1"
    pub const VERSION: u32 = 1;

    pub const CONFIG_LEN: usize = size_of::<MarketConfig>();
    pub const POSITION_LEN: usize = size_of::<PositionAccount>();

    pub const CONFIG_SEED: &[u8] = b"config";
    pub const POSITION_SEED: &[u8] = b"position";
    pub const VAULT_SEED: &[u8] = b"vault";
    pub const MINT_AUTHORITY_SEED: &[u8] = b"mint_authority";

    pub const STABLECOIN_DECIMALS: u8 = 6;
    pub use crate::engine::PERCENT_BASE;
}

// 2. mod error
pub mod error {
    use num_derive::FromPrimitive;
    use num_traits::FromPrimitive;
    use solana_program::{
        decode_error::DecodeError,
        msg,
        program_error::{PrintProgramError, ProgramError},
    };
    use thiserror::Error;
    use crate::engine::RiskError;

    #[derive(Clone, Copy, Debug, Eq, PartialEq, Error, FromPrimitive)]
    pub enum StablecoinError {
        #[error("Risk parameter out of range")]
        InvalidParameter,
        #[error("Signer is not the market authority")]
        Unauthorized,
        #[error("Account already initialized")]
        AlreadyExists,
        #[error("Account not initialized")]
        NotFound,
        #[error("Amount is zero or overflows")]
        InvalidAmount,
        #[error("Burn amount exceeds outstanding debt")]
        InsufficientDebt,
        #[error("Repay amount exceeds outstanding debt")]
        ExcessiveRepay,
        #[error("Health factor would fall below the minimum")]
        InsufficientCollateral,
        #[error("Position has no collateral left to seize")]
        InsufficientCollateralToSeize,
        #[error("Price attestation is too old")]
        StalePrice,
        #[error("Price attestation has the wrong feed or an unusable value")]
        InvalidFeed,
        #[error("Price attestation unavailable")]
        PriceUnavailable,
        #[error("Position is not eligible for liquidation")]
        HealthyPosition,
        #[error("Account magic mismatch")]
        InvalidMagic,
        #[error("Account version mismatch")]
        InvalidVersion,
        #[error("Account data length mismatch")]
        InvalidAccountLen,
        #[error("Expected signer")]
        ExpectedSigner,
        #[error("Expected writable")]
        ExpectedWritable,
        #[error("Vault is not the position's collateral token account")]
        InvalidVault,
        #[error("Mint does not match the market")]
        InvalidMint,
    }

    impl From<StablecoinError> for ProgramError {
        fn from(e: StablecoinError) -> Self {
            ProgramError::Custom(e as u32)
        }
    }

    impl<T> DecodeError<T> for StablecoinError {
        fn type_of() -> &'static str {
            "StablecoinError"
        }
    }

    impl PrintProgramError for StablecoinError {
        fn print<E>(&self)
        where
            E: 'static + std::error::Error + DecodeError<E> + PrintProgramError + FromPrimitive,
        {
            msg!("Error: {}", self);
        }
    }

    pub fn map_risk_error(e: RiskError) -> ProgramError {
        let err = match e {
            RiskError::InvalidParameter => StablecoinError::InvalidParameter,
            RiskError::InvalidAmount => StablecoinError::InvalidAmount,
            RiskError::InvalidPrice => StablecoinError::InvalidFeed,
            RiskError::InsufficientDebt => StablecoinError::InsufficientDebt,
            RiskError::ExcessiveRepay => StablecoinError::ExcessiveRepay,
            RiskError::InsufficientCollateral => StablecoinError::InsufficientCollateral,
            RiskError::InsufficientCollateralToSeize => StablecoinError::InsufficientCollateralToSeize,
            RiskError::HealthyPosition => StablecoinError::HealthyPosition,
            RiskError::PositionNotFound => StablecoinError::NotFound,
        };
        ProgramError::Custom(err as u32)
    }
}

// 3. mod ix
pub mod ix {
    use arrayref::array_ref;
    use solana_program::program_error::ProgramError;
    use crate::engine::ConfigUpdate;

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum Instruction {
        InitConfig {
            nonce: i64,
            liquidation_threshold: u64,
            liquidation_bonus: u64,
            min_health_factor: u64,
            precision_scale: u64,
            max_ltv: u64,
            feed_id: [u8; 32],
            max_staleness_secs: u64,
            conf_filter_bps: u16,
        },
        UpdateConfig { update: ConfigUpdate },
        DepositAndMint { nonce: i64, amount: u64 },
        BurnAndRedeem { amount: u64 },
        Liquidate { amount: u64 },
    }

    impl Instruction {
        pub fn decode(input: &[u8]) -> Result<Self, ProgramError> {
            let (&tag, mut rest) = input.split_first().ok_or(ProgramError::InvalidInstructionData)?;

            match tag {
                0 => { // InitConfig
                    let nonce = read_i64(&mut rest)?;
                    let liquidation_threshold = read_u64(&mut rest)?;
                    let liquidation_bonus = read_u64(&mut rest)?;
                    let min_health_factor = read_u64(&mut rest)?;
                    let precision_scale = read_u64(&mut rest)?;
                    let max_ltv = read_u64(&mut rest)?;
                    let feed_id = read_bytes32(&mut rest)?;
                    let max_staleness_secs = read_u64(&mut rest)?;
                    let conf_filter_bps = read_u16(&mut rest)?;
                    Ok(Instruction::InitConfig {
                        nonce, liquidation_threshold, liquidation_bonus, min_health_factor,
                        precision_scale, max_ltv, feed_id, max_staleness_secs, conf_filter_bps,
                    })
                },
                1 => { // UpdateConfig
                    let update = ConfigUpdate {
                        liquidation_threshold: read_opt_u64(&mut rest)?,
                        liquidation_bonus: read_opt_u64(&mut rest)?,
                        min_health_factor: read_opt_u64(&mut rest)?,
                    };
                    Ok(Instruction::UpdateConfig { update })
                },
                2 => { // DepositAndMint
                    let nonce = read_i64(&mut rest)?;
                    let amount = read_u64(&mut rest)?;
                    Ok(Instruction::DepositAndMint { nonce, amount })
                },
                3 => { // BurnAndRedeem
                    let amount = read_u64(&mut rest)?;
                    Ok(Instruction::BurnAndRedeem { amount })
                },
                4 => { // Liquidate
                    let amount = read_u64(&mut rest)?;
                    Ok(Instruction::Liquidate { amount })
                },
                _ => Err(ProgramError::InvalidInstructionData),
            }
        }
    }

    fn take<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8], ProgramError> {
        if input.len() < n { return Err(ProgramError::InvalidInstructionData); }
        let (bytes, rest) = input.split_at(n);
        *input = rest;
        Ok(bytes)
    }

    fn read_u8(input: &mut &[u8]) -> Result<u8, ProgramError> {
        let (&val, rest) = input.split_first().ok_or(ProgramError::InvalidInstructionData)?;
        *input = rest;
        Ok(val)
    }

    fn read_u16(input: &mut &[u8]) -> Result<u16, ProgramError> {
        let bytes = take(input, 2)?;
        Ok(u16::from_le_bytes(*array_ref![bytes, 0, 2]))
    }

    fn read_u64(input: &mut &[u8]) -> Result<u64, ProgramError> {
        let bytes = take(input, 8)?;
        Ok(u64::from_le_bytes(*array_ref![bytes, 0, 8]))
    }

    fn read_i64(input: &mut &[u8]) -> Result<i64, ProgramError> {
        let bytes = take(input, 8)?;
        Ok(i64::from_le_bytes(*array_ref![bytes, 0, 8]))
    }

    fn read_bytes32(input: &mut &[u8]) -> Result<[u8; 32], ProgramError> {
        let bytes = take(input, 32)?;
        Ok(*array_ref![bytes, 0, 32])
    }

    /// Flag byte (0 = absent, 1 = present) followed by a u64 that is always encoded.
    fn read_opt_u64(input: &mut &[u8]) -> Result<Option<u64>, ProgramError> {
        let flag = read_u8(input)?;
        let val = read_u64(input)?;
        match flag {
            0 => Ok(None),
            1 => Ok(Some(val)),
            _ => Err(ProgramError::InvalidInstructionData),
        }
    }
}

// 4. mod accounts
pub mod accounts {
    use solana_program::{account_info::AccountInfo, program_error::ProgramError, pubkey::Pubkey};
    use crate::{
        constants::{CONFIG_SEED, MINT_AUTHORITY_SEED, POSITION_SEED, VAULT_SEED},
        error::StablecoinError,
    };

    pub fn expect_len(accounts: &[AccountInfo], n: usize) -> Result<(), ProgramError> {
        if accounts.len() < n {
            return Err(ProgramError::NotEnoughAccountKeys);
        }
        Ok(())
    }

    pub fn expect_signer(ai: &AccountInfo) -> Result<(), ProgramError> {
        if !ai.is_signer {
            return Err(StablecoinError::ExpectedSigner.into());
        }
        Ok(())
    }

    pub fn expect_writable(ai: &AccountInfo) -> Result<(), ProgramError> {
        if !ai.is_writable {
            return Err(StablecoinError::ExpectedWritable.into());
        }
        Ok(())
    }

    pub fn expect_owner(ai: &AccountInfo, owner: &Pubkey) -> Result<(), ProgramError> {
        if ai.owner != owner {
            return Err(ProgramError::IllegalOwner);
        }
        Ok(())
    }

    pub fn expect_key(ai: &AccountInfo, expected: &Pubkey) -> Result<(), ProgramError> {
        if ai.key != expected {
            return Err(ProgramError::InvalidArgument);
        }
        Ok(())
    }

    pub fn derive_config(program_id: &Pubkey, mint: &Pubkey, nonce: i64) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[CONFIG_SEED, mint.as_ref(), &nonce.to_le_bytes()], program_id)
    }

    pub fn derive_mint_authority(program_id: &Pubkey, config: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[MINT_AUTHORITY_SEED, config.as_ref()], program_id)
    }

    pub fn derive_position(program_id: &Pubkey, owner: &Pubkey, config: &Pubkey, nonce: i64) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[POSITION_SEED, owner.as_ref(), config.as_ref(), &nonce.to_le_bytes()],
            program_id,
        )
    }

    pub fn derive_vault_authority(program_id: &Pubkey, position: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[VAULT_SEED, position.as_ref()], program_id)
    }
}

// 5. mod state
pub mod state {
    use bytemuck::{Pod, Zeroable};
    use crate::constants::{CONFIG_LEN, POSITION_LEN};
    use crate::engine::{Position, RiskParams};

    #[repr(C)]
    #[derive(Clone, Copy, Debug, Pod, Zeroable)]
    pub struct MarketConfig {
        pub magic: u64,
        pub version: u32,
        pub mint_authority_bump: u8,
        pub collateral_decimals: u8,
        pub conf_filter_bps: u16,

        pub authority: [u8; 32],
        pub mint: [u8; 32],
        pub collateral_mint: [u8; 32],
        pub feed_id: [u8; 32],

        pub nonce: i64,
        pub liquidation_threshold: u64,
        pub liquidation_bonus: u64,
        pub min_health_factor: u64,
        pub precision_scale: u64,
        pub max_ltv: u64,
        pub max_staleness_secs: u64,
        pub collateral_unit: u64,

        pub total_collateral: u64,
        pub total_debt: u64,
        pub position_count: u64,

        pub init_time: i64,
        pub last_update_time: i64,
    }

    impl MarketConfig {
        pub fn risk_params(&self) -> RiskParams {
            RiskParams {
                liquidation_threshold: self.liquidation_threshold,
                liquidation_bonus: self.liquidation_bonus,
                min_health_factor: self.min_health_factor,
                precision_scale: self.precision_scale,
                max_ltv: self.max_ltv,
                collateral_unit: self.collateral_unit,
            }
        }

        pub fn set_risk_params(&mut self, params: &RiskParams) {
            self.liquidation_threshold = params.liquidation_threshold;
            self.liquidation_bonus = params.liquidation_bonus;
            self.min_health_factor = params.min_health_factor;
        }
    }

    #[repr(C)]
    #[derive(Clone, Copy, Debug, Pod, Zeroable)]
    pub struct PositionAccount {
        pub magic: u64,
        pub version: u32,
        pub vault_authority_bump: u8,
        pub _padding: [u8; 3],

        pub owner: [u8; 32],
        pub market: [u8; 32],
        pub vault: [u8; 32],

        pub nonce: i64,
        pub collateral_amount: u64,
        pub debt_amount: u64,
        pub created_at: i64,
        pub last_update_time: i64,
    }

    impl PositionAccount {
        pub fn position(&self) -> Position {
            Position {
                collateral_amount: self.collateral_amount,
                debt_amount: self.debt_amount,
            }
        }
    }

    pub fn read_config(data: &[u8]) -> MarketConfig {
        let mut c = MarketConfig::zeroed();
        let src = &data[..CONFIG_LEN];
        let dst = bytemuck::bytes_of_mut(&mut c);
        dst.copy_from_slice(src);
        c
    }

    pub fn write_config(data: &mut [u8], c: &MarketConfig) {
        let src = bytemuck::bytes_of(c);
        let dst = &mut data[..CONFIG_LEN];
        dst.copy_from_slice(src);
    }

    pub fn read_position(data: &[u8]) -> PositionAccount {
        let mut p = PositionAccount::zeroed();
        let src = &data[..POSITION_LEN];
        let dst = bytemuck::bytes_of_mut(&mut p);
        dst.copy_from_slice(src);
        p
    }

    pub fn write_position(data: &mut [u8], p: &PositionAccount) {
        let src = bytemuck::bytes_of(p);
        let dst = &mut data[..POSITION_LEN];
        dst.copy_from_slice(src);
    }
}

// 6. mod oracle
pub mod oracle {
    use arrayref::array_ref;
    use pyth_sdk_solana::{Price, PriceFeed, PriceIdentifier};
    use solana_program::{account_info::AccountInfo, pubkey::Pubkey};
    use crate::error::StablecoinError;

    /// Pyth Solana Receiver program ID
    /// rec5EKMGg6MxZYaMdyBfgwp4d5rB9T1VQH5pJv5LtFJ
    pub const PYTH_RECEIVER_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
        0x0c, 0xb7, 0xfa, 0xbb, 0x52, 0xf7, 0xa6, 0x48, 0xbb, 0x5b, 0x31, 0x7d, 0x9a, 0x01, 0x8b,
        0x90, 0x57, 0xcb, 0x02, 0x47, 0x74, 0xfa, 0xfe, 0x01, 0xe6, 0xc4, 0xdf, 0x98, 0xcc, 0x38,
        0x58, 0x81,
    ]);

    // PriceUpdateV2 layout:
    //   [0..8]   discriminator
    //   [8..40]  write_authority
    //   [40]     verification level: 0 = Partial { num_signatures: u8 }, 1 = Full
    //   [base..] feed_id(32) price(i64) conf(u64) expo(i32) publish_time(i64)
    //            prev_publish_time(i64) ema_price(i64) ema_conf(u64)
    //   [..+8]   posted_slot
    pub const PRICE_UPDATE_V2_MIN_LEN: usize = 134;
    /// Anchor account discriminator of `PriceUpdateV2`.
    pub const PRICE_UPDATE_V2_DISCRIMINATOR: [u8; 8] = [34, 241, 35, 99, 157, 126, 244, 205];
    const VERIFICATION_LEVEL_OFF: usize = 40;
    const PRICE_MESSAGE_LEN: usize = 84;

    const MAX_EXPO_ABS: u32 = 18;
    const PRICE_DECIMALS: i32 = 6;

    /// Decodes the raw bytes of a `PriceUpdateV2` account.
    pub fn parse_price_update(data: &[u8]) -> Result<PriceFeed, StablecoinError> {
        if data.len() < PRICE_UPDATE_V2_MIN_LEN {
            return Err(StablecoinError::PriceUnavailable);
        }
        if *array_ref![data, 0, 8] != PRICE_UPDATE_V2_DISCRIMINATOR {
            return Err(StablecoinError::PriceUnavailable);
        }
        let base = match data[VERIFICATION_LEVEL_OFF] {
            0 => VERIFICATION_LEVEL_OFF + 2,
            1 => VERIFICATION_LEVEL_OFF + 1,
            _ => return Err(StablecoinError::PriceUnavailable),
        };
        if base + PRICE_MESSAGE_LEN > data.len() {
            return Err(StablecoinError::PriceUnavailable);
        }
        let msg = array_ref![data, base, PRICE_MESSAGE_LEN];

        let feed_id = *array_ref![msg, 0, 32];
        let conf = u64::from_le_bytes(*array_ref![msg, 40, 8]);
        let expo = i32::from_le_bytes(*array_ref![msg, 48, 4]);
        let publish_time = i64::from_le_bytes(*array_ref![msg, 52, 8]);

        let price = Price {
            price: i64::from_le_bytes(*array_ref![msg, 32, 8]),
            conf,
            expo,
            publish_time,
        };
        let ema_price = Price {
            price: i64::from_le_bytes(*array_ref![msg, 68, 8]),
            conf: u64::from_le_bytes(*array_ref![msg, 76, 8]),
            expo,
            publish_time,
        };
        Ok(PriceFeed::new(PriceIdentifier::new(feed_id), price, ema_price))
    }

    /// Validates a Pyth attestation and returns the price of one whole
    /// collateral token in stablecoin base units.
    ///
    /// `conf_bps == 0` disables the confidence filter.
    pub fn read_price_e6(
        price_ai: &AccountInfo,
        expected_feed_id: &[u8; 32],
        now_unix_ts: i64,
        max_staleness_secs: u64,
        conf_bps: u16,
    ) -> Result<u64, StablecoinError> {
        if *price_ai.owner != PYTH_RECEIVER_PROGRAM_ID {
            return Err(StablecoinError::PriceUnavailable);
        }
        let data = price_ai.try_borrow_data().map_err(|_| StablecoinError::PriceUnavailable)?;
        let feed = parse_price_update(&data)?;

        if feed.id != PriceIdentifier::new(*expected_feed_id) {
            return Err(StablecoinError::InvalidFeed);
        }
        let price = feed
            .get_price_no_older_than(now_unix_ts, max_staleness_secs)
            .ok_or(StablecoinError::StalePrice)?;

        if price.price <= 0 || price.expo.unsigned_abs() > MAX_EXPO_ABS {
            return Err(StablecoinError::InvalidFeed);
        }
        if conf_bps != 0 {
            let lhs = (price.conf as u128) * 10_000;
            let rhs = (price.price as u128) * (conf_bps as u128);
            if lhs > rhs {
                return Err(StablecoinError::InvalidFeed);
            }
        }
        normalize_price_e6(&price)
    }

    /// Rescales a positive Pyth price to 6 decimals, rounding down.
    pub fn normalize_price_e6(price: &Price) -> Result<u64, StablecoinError> {
        if price.price <= 0 || price.expo.unsigned_abs() > MAX_EXPO_ABS {
            return Err(StablecoinError::InvalidFeed);
        }
        let price_u = price.price as u128;
        let scale = price.expo + PRICE_DECIMALS;
        let scaled = if scale >= 0 {
            price_u
                .checked_mul(10u128.pow(scale as u32))
                .ok_or(StablecoinError::InvalidFeed)?
        } else {
            price_u / 10u128.pow((-scale) as u32)
        };
        if scaled == 0 || scaled > u64::MAX as u128 {
            return Err(StablecoinError::InvalidFeed);
        }
        Ok(scaled as u64)
    }
}

// 7. mod token
pub mod token {
    use solana_program::{account_info::AccountInfo, program_error::ProgramError, pubkey::Pubkey, system_program};

    #[cfg(not(test))]
    use solana_program::{
        program::{invoke, invoke_signed},
        system_instruction,
        sysvar::{rent::Rent, Sysvar},
    };

    #[cfg(test)]
    use solana_program::program_pack::Pack;
    #[cfg(test)]
    use spl_token::state::{Account as TokenAccount, Mint};

    #[cfg(test)]
    fn debit(ai: &AccountInfo, amount: u64) -> Result<(), ProgramError> {
        let mut data = ai.try_borrow_mut_data()?;
        let mut state = TokenAccount::unpack(&data)?;
        state.amount = state.amount.checked_sub(amount).ok_or(ProgramError::InsufficientFunds)?;
        TokenAccount::pack(state, &mut data)
    }

    #[cfg(test)]
    fn credit(ai: &AccountInfo, amount: u64) -> Result<(), ProgramError> {
        let mut data = ai.try_borrow_mut_data()?;
        let mut state = TokenAccount::unpack(&data)?;
        state.amount = state.amount.checked_add(amount).ok_or(ProgramError::InvalidAccountData)?;
        TokenAccount::pack(state, &mut data)
    }

    #[cfg(test)]
    fn adjust_supply(mint: &AccountInfo, amount: u64, increase: bool) -> Result<(), ProgramError> {
        let mut data = mint.try_borrow_mut_data()?;
        let mut state = Mint::unpack(&data)?;
        state.supply = if increase {
            state.supply.checked_add(amount).ok_or(ProgramError::InvalidAccountData)?
        } else {
            state.supply.checked_sub(amount).ok_or(ProgramError::InsufficientFunds)?
        };
        Mint::pack(state, &mut data)
    }

    /// Allocates `space` bytes at a PDA and assigns it to `program_id`,
    /// rent exempt and funded by `payer`. The target must still be a
    /// system account.
    pub fn create_pda<'a>(
        _payer: &AccountInfo<'a>,
        target: &AccountInfo<'a>,
        _system_program: &AccountInfo<'a>,
        program_id: &Pubkey,
        space: usize,
        _signer_seeds: &[&[&[u8]]],
    ) -> Result<(), ProgramError> {
        if *target.owner != system_program::ID {
            return Err(ProgramError::IllegalOwner);
        }
        #[cfg(not(test))]
        {
            let lamports = Rent::get()?.minimum_balance(space);
            let ix = system_instruction::create_account(
                _payer.key,
                target.key,
                lamports,
                space as u64,
                program_id,
            );
            invoke_signed(&ix, &[_payer.clone(), target.clone(), _system_program.clone()], _signer_seeds)
        }
        #[cfg(test)]
        {
            // Test buffers cannot grow, so the harness sizes them up front.
            if target.data_len() != space {
                return Err(ProgramError::AccountDataTooSmall);
            }
            target.assign(program_id);
            Ok(())
        }
    }

    /// Moves collateral from a user's token account into a position vault.
    pub fn transfer_in<'a>(
        _token_program: &AccountInfo<'a>,
        source: &AccountInfo<'a>,
        vault: &AccountInfo<'a>,
        _authority: &AccountInfo<'a>,
        amount: u64,
    ) -> Result<(), ProgramError> {
        #[cfg(not(test))]
        {
            let ix = spl_token::instruction::transfer(
                _token_program.key,
                source.key,
                vault.key,
                _authority.key,
                &[],
                amount,
            )?;
            invoke(&ix, &[source.clone(), vault.clone(), _authority.clone(), _token_program.clone()])
        }
        #[cfg(test)]
        {
            debit(source, amount)?;
            credit(vault, amount)
        }
    }

    /// Releases collateral from a position vault, signed by the vault authority PDA.
    pub fn transfer_out<'a>(
        _token_program: &AccountInfo<'a>,
        vault: &AccountInfo<'a>,
        dest: &AccountInfo<'a>,
        _vault_authority: &AccountInfo<'a>,
        amount: u64,
        _signer_seeds: &[&[&[u8]]],
    ) -> Result<(), ProgramError> {
        #[cfg(not(test))]
        {
            let ix = spl_token::instruction::transfer(
                _token_program.key,
                vault.key,
                dest.key,
                _vault_authority.key,
                &[],
                amount,
            )?;
            invoke_signed(&ix, &[vault.clone(), dest.clone(), _vault_authority.clone(), _token_program.clone()], _signer_seeds)
        }
        #[cfg(test)]
        {
            debit(vault, amount)?;
            credit(dest, amount)
        }
    }

    pub fn mint_to<'a>(
        _token_program: &AccountInfo<'a>,
        mint: &AccountInfo<'a>,
        dest: &AccountInfo<'a>,
        _mint_authority: &AccountInfo<'a>,
        amount: u64,
        _signer_seeds: &[&[&[u8]]],
    ) -> Result<(), ProgramError> {
        #[cfg(not(test))]
        {
            let ix = spl_token::instruction::mint_to(
                _token_program.key,
                mint.key,
                dest.key,
                _mint_authority.key,
                &[],
                amount,
            )?;
            invoke_signed(&ix, &[mint.clone(), dest.clone(), _mint_authority.clone(), _token_program.clone()], _signer_seeds)
        }
        #[cfg(test)]
        {
            adjust_supply(mint, amount, true)?;
            credit(dest, amount)
        }
    }

    pub fn burn<'a>(
        _token_program: &AccountInfo<'a>,
        source: &AccountInfo<'a>,
        mint: &AccountInfo<'a>,
        _authority: &AccountInfo<'a>,
        amount: u64,
    ) -> Result<(), ProgramError> {
        #[cfg(not(test))]
        {
            let ix = spl_token::instruction::burn(
                _token_program.key,
                source.key,
                mint.key,
                _authority.key,
                &[],
                amount,
            )?;
            invoke(&ix, &[source.clone(), mint.clone(), _authority.clone(), _token_program.clone()])
        }
        #[cfg(test)]
        {
            debit(source, amount)?;
            adjust_supply(mint, amount, false)
        }
    }
}

// 8. mod processor
pub mod processor {
    use solana_program::{
        account_info::AccountInfo, entrypoint::ProgramResult, msg, program_error::ProgramError,
        program_option::COption, program_pack::Pack, pubkey::Pubkey, system_program,
        sysvar::{clock::Clock, Sysvar},
    };
    use bytemuck::Zeroable;
    #[cfg(feature = "cu-audit")]
    use solana_program::log::sol_log_compute_units;
    use spl_token::state::{Account as TokenAccount, Mint};
    use crate::{
        accounts,
        constants::{
            CONFIG_LEN, CONFIG_MAGIC, CONFIG_SEED, MINT_AUTHORITY_SEED, POSITION_LEN, POSITION_MAGIC,
            POSITION_SEED, STABLECOIN_DECIMALS, VAULT_SEED, VERSION,
        },
        engine::{self, ConfigUpdate, Position, RiskParams},
        error::{map_risk_error, StablecoinError},
        ix::Instruction,
        oracle,
        state::{self, MarketConfig, PositionAccount},
        token,
    };

    fn config_guard(program_id: &Pubkey, a_config: &AccountInfo) -> Result<(), ProgramError> {
        accounts::expect_owner(a_config, program_id)?;
        if a_config.data_len() != CONFIG_LEN {
            return Err(StablecoinError::InvalidAccountLen.into());
        }
        Ok(())
    }

    fn position_guard(program_id: &Pubkey, a_position: &AccountInfo) -> Result<(), ProgramError> {
        accounts::expect_owner(a_position, program_id)?;
        if a_position.data_len() != POSITION_LEN {
            return Err(StablecoinError::InvalidAccountLen.into());
        }
        Ok(())
    }

    fn load_config(program_id: &Pubkey, a_config: &AccountInfo) -> Result<MarketConfig, ProgramError> {
        config_guard(program_id, a_config)?;
        let config = state::read_config(&a_config.try_borrow_data()?);
        if config.magic != CONFIG_MAGIC {
            return Err(StablecoinError::NotFound.into());
        }
        if config.version != VERSION {
            return Err(StablecoinError::InvalidVersion.into());
        }
        Ok(config)
    }

    fn store_config(a_config: &AccountInfo, config: &MarketConfig) -> Result<(), ProgramError> {
        let mut data = a_config.try_borrow_mut_data()?;
        state::write_config(&mut data, config);
        Ok(())
    }

    /// Reads an initialized position that belongs to `a_config`.
    fn load_position(
        program_id: &Pubkey,
        a_config: &AccountInfo,
        a_position: &AccountInfo,
    ) -> Result<PositionAccount, ProgramError> {
        position_guard(program_id, a_position)?;
        let position = state::read_position(&a_position.try_borrow_data()?);
        if position.magic == 0 {
            return Err(StablecoinError::NotFound.into());
        }
        if position.magic != POSITION_MAGIC {
            return Err(StablecoinError::InvalidMagic.into());
        }
        if position.version != VERSION {
            return Err(StablecoinError::InvalidVersion.into());
        }
        if position.market != a_config.key.to_bytes() {
            return Err(StablecoinError::NotFound.into());
        }
        let (expected, _) = accounts::derive_position(
            program_id,
            &Pubkey::new_from_array(position.owner),
            a_config.key,
            position.nonce,
        );
        accounts::expect_key(a_position, &expected)?;
        Ok(position)
    }

    fn store_position(a_position: &AccountInfo, position: &PositionAccount) -> Result<(), ProgramError> {
        let mut data = a_position.try_borrow_mut_data()?;
        state::write_position(&mut data, position);
        Ok(())
    }

    fn load_mint(ai: &AccountInfo) -> Result<Mint, ProgramError> {
        if ai.owner != &spl_token::ID {
            return Err(StablecoinError::InvalidMint.into());
        }
        let data = ai.try_borrow_data()?;
        Mint::unpack(&data).map_err(|_| StablecoinError::InvalidMint.into())
    }

    fn verify_vault(a_vault: &AccountInfo, expected_owner: &Pubkey, expected_mint: &Pubkey) -> Result<(), ProgramError> {
        if a_vault.owner != &spl_token::ID { return Err(StablecoinError::InvalidVault.into()); }
        if a_vault.data_len() != TokenAccount::LEN { return Err(StablecoinError::InvalidVault.into()); }

        let data = a_vault.try_borrow_data()?;
        let tok = TokenAccount::unpack(&data)?;
        if tok.mint != *expected_mint { return Err(StablecoinError::InvalidMint.into()); }
        if tok.owner != *expected_owner { return Err(StablecoinError::InvalidVault.into()); }
        Ok(())
    }

    /// A vault adopted by a new position must hold nothing and have no one
    /// else able to move or close it.
    fn verify_fresh_vault(a_vault: &AccountInfo) -> Result<(), ProgramError> {
        let data = a_vault.try_borrow_data()?;
        let tok = TokenAccount::unpack(&data)?;
        if tok.amount != 0 || tok.delegate.is_some() || tok.close_authority.is_some() {
            return Err(StablecoinError::InvalidVault.into());
        }
        Ok(())
    }

    fn verify_market_mint(a_mint: &AccountInfo, config: &MarketConfig) -> Result<(), ProgramError> {
        if a_mint.key.to_bytes() != config.mint {
            return Err(StablecoinError::InvalidMint.into());
        }
        Ok(())
    }

    fn read_price(a_oracle: &AccountInfo, config: &MarketConfig, now: i64) -> Result<u64, StablecoinError> {
        oracle::read_price_e6(
            a_oracle,
            &config.feed_id,
            now,
            config.max_staleness_secs,
            config.conf_filter_bps,
        )
    }

    pub fn process_instruction<'a, 'b>(
        program_id: &Pubkey,
        accounts: &'b [AccountInfo<'a>],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = Instruction::decode(instruction_data)?;

        match instruction {
            Instruction::InitConfig {
                nonce, liquidation_threshold, liquidation_bonus, min_health_factor,
                precision_scale, max_ltv, feed_id, max_staleness_secs, conf_filter_bps,
            } => {
                let params = RiskParams {
                    liquidation_threshold,
                    liquidation_bonus,
                    min_health_factor,
                    precision_scale,
                    max_ltv,
                    collateral_unit: 0,
                };
                init_config(program_id, accounts, nonce, params, feed_id, max_staleness_secs, conf_filter_bps)
            },
            Instruction::UpdateConfig { update } => update_config(program_id, accounts, &update),
            Instruction::DepositAndMint { nonce, amount } => deposit_and_mint(program_id, accounts, nonce, amount),
            Instruction::BurnAndRedeem { amount } => burn_and_redeem(program_id, accounts, amount),
            Instruction::Liquidate { amount } => liquidate(program_id, accounts, amount),
        }
    }

    /// Accounts:
    /// 0. `[signer, writable]` authority, pays for the config account
    /// 1. `[writable]` config PDA `[b"config", mint, nonce_le]`, created here
    /// 2. `[]` stablecoin mint, authority set to the mint-authority PDA
    /// 3. `[]` collateral mint
    /// 4. `[]` clock sysvar
    /// 5. `[]` system program
    fn init_config(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        nonce: i64,
        mut params: RiskParams,
        feed_id: [u8; 32],
        max_staleness_secs: u64,
        conf_filter_bps: u16,
    ) -> ProgramResult {
        accounts::expect_len(accounts, 6)?;
        let a_authority = &accounts[0];
        let a_config = &accounts[1];
        let a_mint = &accounts[2];
        let a_collateral_mint = &accounts[3];
        let a_clock = &accounts[4];
        let a_system = &accounts[5];

        accounts::expect_signer(a_authority)?;
        accounts::expect_writable(a_authority)?;
        accounts::expect_writable(a_config)?;
        accounts::expect_key(a_system, &system_program::ID)?;

        let (config_key, config_bump) = accounts::derive_config(program_id, a_mint.key, nonce);
        accounts::expect_key(a_config, &config_key)?;

        if a_config.owner == program_id {
            config_guard(program_id, a_config)?;
            let existing = state::read_config(&a_config.try_borrow_data()?);
            if existing.magic == CONFIG_MAGIC {
                return Err(StablecoinError::AlreadyExists.into());
            }
            return Err(StablecoinError::InvalidMagic.into());
        }

        let (mint_authority, mint_authority_bump) = accounts::derive_mint_authority(program_id, &config_key);
        let mint = load_mint(a_mint)?;
        if mint.mint_authority != COption::Some(mint_authority) || mint.supply != 0 {
            return Err(StablecoinError::InvalidMint.into());
        }
        if mint.decimals != STABLECOIN_DECIMALS {
            return Err(StablecoinError::InvalidParameter.into());
        }

        let collateral_mint = load_mint(a_collateral_mint)?;
        params.collateral_unit = 10u64
            .checked_pow(collateral_mint.decimals as u32)
            .ok_or(StablecoinError::InvalidParameter)?;
        params.validate().map_err(map_risk_error)?;

        let now = Clock::from_account_info(a_clock)?.unix_timestamp;
        let config = MarketConfig {
            magic: CONFIG_MAGIC,
            version: VERSION,
            mint_authority_bump,
            collateral_decimals: collateral_mint.decimals,
            conf_filter_bps,
            authority: a_authority.key.to_bytes(),
            mint: a_mint.key.to_bytes(),
            collateral_mint: a_collateral_mint.key.to_bytes(),
            feed_id,
            nonce,
            liquidation_threshold: params.liquidation_threshold,
            liquidation_bonus: params.liquidation_bonus,
            min_health_factor: params.min_health_factor,
            precision_scale: params.precision_scale,
            max_ltv: params.max_ltv,
            max_staleness_secs,
            collateral_unit: params.collateral_unit,
            total_collateral: 0,
            total_debt: 0,
            position_count: 0,
            init_time: now,
            last_update_time: now,
        };

        let nonce_le = nonce.to_le_bytes();
        let bump = [config_bump];
        let seeds: &[&[u8]] = &[CONFIG_SEED, a_mint.key.as_ref(), &nonce_le, &bump];
        token::create_pda(a_authority, a_config, a_system, program_id, CONFIG_LEN, &[seeds])?;
        store_config(a_config, &config)?;

        msg!(
            "init_config: threshold={} bonus={} min_hf={} scale={} max_ltv={}",
            params.liquidation_threshold,
            params.liquidation_bonus,
            params.min_health_factor,
            params.precision_scale,
            params.max_ltv
        );
        Ok(())
    }

    /// Accounts:
    /// 0. `[signer]` market authority
    /// 1. `[writable]` config
    /// 2. `[]` clock sysvar
    fn update_config(program_id: &Pubkey, accounts: &[AccountInfo], update: &ConfigUpdate) -> ProgramResult {
        accounts::expect_len(accounts, 3)?;
        let a_authority = &accounts[0];
        let a_config = &accounts[1];
        let a_clock = &accounts[2];

        accounts::expect_signer(a_authority)?;
        accounts::expect_writable(a_config)?;

        let mut config = load_config(program_id, a_config)?;
        if a_authority.key.to_bytes() != config.authority {
            return Err(StablecoinError::Unauthorized.into());
        }

        let params = config.risk_params().apply(update).map_err(map_risk_error)?;
        let clock = Clock::from_account_info(a_clock)?;
        config.set_risk_params(&params);
        config.last_update_time = clock.unix_timestamp;
        store_config(a_config, &config)?;

        msg!(
            "update_config: threshold={} bonus={} min_hf={}",
            params.liquidation_threshold,
            params.liquidation_bonus,
            params.min_health_factor
        );
        Ok(())
    }

    /// Accounts:
    /// 0.  `[signer, writable]` owner, pays for a new position account
    /// 1.  `[writable]` config
    /// 2.  `[writable]` position PDA `[b"position", owner, config, nonce_le]`, created on first deposit
    /// 3.  `[writable]` vault, collateral token account owned by `[b"vault", position]`,
    ///     empty on first deposit
    /// 4.  `[writable]` owner collateral token account
    /// 5.  `[writable]` stablecoin mint
    /// 6.  `[writable]` owner stablecoin token account
    /// 7.  `[]` mint authority PDA
    /// 8.  `[]` token program
    /// 9.  `[]` clock sysvar
    /// 10. `[]` price update account
    /// 11. `[]` system program
    fn deposit_and_mint(program_id: &Pubkey, accounts: &[AccountInfo], nonce: i64, amount: u64) -> ProgramResult {
        accounts::expect_len(accounts, 12)?;
        let a_owner = &accounts[0];
        let a_config = &accounts[1];
        let a_position = &accounts[2];
        let a_vault = &accounts[3];
        let a_owner_collateral = &accounts[4];
        let a_mint = &accounts[5];
        let a_owner_stablecoin = &accounts[6];
        let a_mint_authority = &accounts[7];
        let a_token = &accounts[8];
        let a_clock = &accounts[9];
        let a_oracle = &accounts[10];
        let a_system = &accounts[11];

        accounts::expect_signer(a_owner)?;
        accounts::expect_writable(a_config)?;
        accounts::expect_writable(a_position)?;
        accounts::expect_writable(a_vault)?;
        accounts::expect_writable(a_mint)?;
        accounts::expect_key(a_token, &spl_token::ID)?;

        let mut config = load_config(program_id, a_config)?;
        verify_market_mint(a_mint, &config)?;
        let (mint_authority, _) = accounts::derive_mint_authority(program_id, a_config.key);
        accounts::expect_key(a_mint_authority, &mint_authority)?;

        let (position_key, position_bump) = accounts::derive_position(program_id, a_owner.key, a_config.key, nonce);
        accounts::expect_key(a_position, &position_key)?;
        let is_new = *a_position.owner == system_program::ID;
        let stored = if is_new {
            accounts::expect_writable(a_owner)?;
            accounts::expect_key(a_system, &system_program::ID)?;
            PositionAccount::zeroed()
        } else {
            let stored = load_position(program_id, a_config, a_position)?;
            if stored.vault != a_vault.key.to_bytes() {
                return Err(StablecoinError::InvalidVault.into());
            }
            stored
        };
        let (vault_authority, vault_authority_bump) = accounts::derive_vault_authority(program_id, a_position.key);
        verify_vault(a_vault, &vault_authority, &Pubkey::new_from_array(config.collateral_mint))?;
        if is_new {
            verify_fresh_vault(a_vault)?;
        }

        let clock = Clock::from_account_info(a_clock)?;
        let price_e6 = read_price(a_oracle, &config, clock.unix_timestamp)?;
        let current = if is_new { Position::default() } else { stored.position() };

        #[cfg(feature = "cu-audit")]
        {
            msg!("CU_CHECKPOINT: deposit_and_mint_start");
            sol_log_compute_units();
        }
        let outcome = engine::deposit_and_mint(&config.risk_params(), &current, amount, price_e6)
            .map_err(map_risk_error)?;
        #[cfg(feature = "cu-audit")]
        {
            msg!("CU_CHECKPOINT: deposit_and_mint_end");
            sol_log_compute_units();
        }

        config.total_collateral = config.total_collateral.checked_add(outcome.deposited).ok_or(StablecoinError::InvalidAmount)?;
        config.total_debt = config.total_debt.checked_add(outcome.minted).ok_or(StablecoinError::InvalidAmount)?;
        if is_new {
            config.position_count = config.position_count.checked_add(1).ok_or(StablecoinError::InvalidAmount)?;
            let nonce_le = nonce.to_le_bytes();
            let bump = [position_bump];
            let seeds: &[&[u8]] = &[POSITION_SEED, a_owner.key.as_ref(), a_config.key.as_ref(), &nonce_le, &bump];
            token::create_pda(a_owner, a_position, a_system, program_id, POSITION_LEN, &[seeds])?;
        }
        token::transfer_in(a_token, a_owner_collateral, a_vault, a_owner, outcome.deposited)?;
        if outcome.minted > 0 {
            let bump = [config.mint_authority_bump];
            let seeds: &[&[u8]] = &[MINT_AUTHORITY_SEED, a_config.key.as_ref(), &bump];
            token::mint_to(a_token, a_mint, a_owner_stablecoin, a_mint_authority, outcome.minted, &[seeds])?;
        }

        let next = PositionAccount {
            magic: POSITION_MAGIC,
            version: VERSION,
            vault_authority_bump,
            _padding: [0; 3],
            owner: a_owner.key.to_bytes(),
            market: a_config.key.to_bytes(),
            vault: a_vault.key.to_bytes(),
            nonce,
            collateral_amount: outcome.position.collateral_amount,
            debt_amount: outcome.position.debt_amount,
            created_at: if is_new { clock.unix_timestamp } else { stored.created_at },
            last_update_time: clock.unix_timestamp,
        };
        store_position(a_position, &next)?;
        store_config(a_config, &config)?;

        msg!(
            "deposit_and_mint: deposited={} minted={} collateral={} debt={}",
            outcome.deposited,
            outcome.minted,
            next.collateral_amount,
            next.debt_amount
        );
        Ok(())
    }

    /// Accounts:
    /// 0.  `[signer]` position owner
    /// 1.  `[writable]` config
    /// 2.  `[writable]` position
    /// 3.  `[writable]` vault
    /// 4.  `[writable]` owner collateral token account
    /// 5.  `[]` vault authority PDA
    /// 6.  `[writable]` stablecoin mint
    /// 7.  `[writable]` owner stablecoin token account
    /// 8.  `[]` token program
    /// 9.  `[]` clock sysvar
    /// 10. `[]` price update account
    fn burn_and_redeem(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        accounts::expect_len(accounts, 11)?;
        let a_owner = &accounts[0];
        let a_config = &accounts[1];
        let a_position = &accounts[2];
        let a_vault = &accounts[3];
        let a_owner_collateral = &accounts[4];
        let a_vault_authority = &accounts[5];
        let a_mint = &accounts[6];
        let a_owner_stablecoin = &accounts[7];
        let a_token = &accounts[8];
        let a_clock = &accounts[9];
        let a_oracle = &accounts[10];

        accounts::expect_signer(a_owner)?;
        accounts::expect_writable(a_config)?;
        accounts::expect_writable(a_position)?;
        accounts::expect_writable(a_vault)?;
        accounts::expect_writable(a_mint)?;
        accounts::expect_key(a_token, &spl_token::ID)?;

        let mut config = load_config(program_id, a_config)?;
        verify_market_mint(a_mint, &config)?;
        let mut position = load_position(program_id, a_config, a_position)?;
        if position.owner != a_owner.key.to_bytes() {
            return Err(StablecoinError::Unauthorized.into());
        }
        if position.vault != a_vault.key.to_bytes() {
            return Err(StablecoinError::InvalidVault.into());
        }
        let (vault_authority, _) = accounts::derive_vault_authority(program_id, a_position.key);
        accounts::expect_key(a_vault_authority, &vault_authority)?;

        let clock = Clock::from_account_info(a_clock)?;
        let price_e6 = read_price(a_oracle, &config, clock.unix_timestamp).map_err(|e| {
            msg!("burn_and_redeem: price rejected: {}", e);
            StablecoinError::PriceUnavailable
        })?;

        let outcome = engine::burn_and_redeem(&config.risk_params(), &position.position(), amount, price_e6)
            .map_err(map_risk_error)?;

        config.total_collateral = config.total_collateral.checked_sub(outcome.redeemed).ok_or(StablecoinError::InvalidAmount)?;
        config.total_debt = config.total_debt.checked_sub(outcome.burned).ok_or(StablecoinError::InvalidAmount)?;

        if outcome.burned > 0 {
            token::burn(a_token, a_owner_stablecoin, a_mint, a_owner, outcome.burned)?;
        }
        if outcome.redeemed > 0 {
            let bump = [position.vault_authority_bump];
            let seeds: &[&[u8]] = &[VAULT_SEED, a_position.key.as_ref(), &bump];
            token::transfer_out(a_token, a_vault, a_owner_collateral, a_vault_authority, outcome.redeemed, &[seeds])?;
        }

        position.collateral_amount = outcome.position.collateral_amount;
        position.debt_amount = outcome.position.debt_amount;
        position.last_update_time = clock.unix_timestamp;
        store_position(a_position, &position)?;
        store_config(a_config, &config)?;

        msg!(
            "burn_and_redeem: burned={} redeemed={} collateral={} debt={}",
            outcome.burned,
            outcome.redeemed,
            position.collateral_amount,
            position.debt_amount
        );
        Ok(())
    }

    /// Accounts:
    /// 0.  `[signer]` liquidator
    /// 1.  `[writable]` config
    /// 2.  `[writable]` position
    /// 3.  `[writable]` vault
    /// 4.  `[writable]` liquidator collateral token account
    /// 5.  `[]` vault authority PDA
    /// 6.  `[writable]` stablecoin mint
    /// 7.  `[writable]` liquidator stablecoin token account
    /// 8.  `[]` token program
    /// 9.  `[]` clock sysvar
    /// 10. `[]` price update account
    fn liquidate(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        accounts::expect_len(accounts, 11)?;
        let a_liquidator = &accounts[0];
        let a_config = &accounts[1];
        let a_position = &accounts[2];
        let a_vault = &accounts[3];
        let a_liquidator_collateral = &accounts[4];
        let a_vault_authority = &accounts[5];
        let a_mint = &accounts[6];
        let a_liquidator_stablecoin = &accounts[7];
        let a_token = &accounts[8];
        let a_clock = &accounts[9];
        let a_oracle = &accounts[10];

        accounts::expect_signer(a_liquidator)?;
        accounts::expect_writable(a_config)?;
        accounts::expect_writable(a_position)?;
        accounts::expect_writable(a_vault)?;
        accounts::expect_writable(a_mint)?;
        accounts::expect_key(a_token, &spl_token::ID)?;

        let mut config = load_config(program_id, a_config)?;
        verify_market_mint(a_mint, &config)?;
        let mut position = load_position(program_id, a_config, a_position)?;
        if position.vault != a_vault.key.to_bytes() {
            return Err(StablecoinError::InvalidVault.into());
        }
        let (vault_authority, _) = accounts::derive_vault_authority(program_id, a_position.key);
        accounts::expect_key(a_vault_authority, &vault_authority)?;

        let clock = Clock::from_account_info(a_clock)?;
        let price_e6 = read_price(a_oracle, &config, clock.unix_timestamp)?;

        #[cfg(feature = "cu-audit")]
        {
            msg!("CU_CHECKPOINT: liquidate_start");
            sol_log_compute_units();
        }
        let outcome = engine::liquidate(&config.risk_params(), &position.position(), amount, price_e6)
            .map_err(map_risk_error)?;
        #[cfg(feature = "cu-audit")]
        {
            msg!("CU_CHECKPOINT: liquidate_end");
            sol_log_compute_units();
        }

        config.total_collateral = config.total_collateral.checked_sub(outcome.seized).ok_or(StablecoinError::InvalidAmount)?;
        config.total_debt = config.total_debt.checked_sub(outcome.repaid).ok_or(StablecoinError::InvalidAmount)?;

        token::burn(a_token, a_liquidator_stablecoin, a_mint, a_liquidator, outcome.repaid)?;
        if outcome.seized > 0 {
            let bump = [position.vault_authority_bump];
            let seeds: &[&[u8]] = &[VAULT_SEED, a_position.key.as_ref(), &bump];
            token::transfer_out(a_token, a_vault, a_liquidator_collateral, a_vault_authority, outcome.seized, &[seeds])?;
        }

        position.collateral_amount = outcome.position.collateral_amount;
        position.debt_amount = outcome.position.debt_amount;
        position.last_update_time = clock.unix_timestamp;
        store_position(a_position, &position)?;
        store_config(a_config, &config)?;

        msg!(
            "liquidate: repaid={} seized={} bonus={} hf_before={} hf_after={}",
            outcome.repaid,
            outcome.seized,
            outcome.bonus,
            outcome.health_factor_before,
            outcome.health_factor_after
        );
        if outcome.shortfall {
            msg!(
                "liquidate: seizure capped at remaining collateral, unbacked debt={}",
                position.debt_amount
            );
        }
        Ok(())
    }
}

// 9. mod entrypoint
#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint {
    use solana_program::{
        account_info::AccountInfo, entrypoint, entrypoint::ProgramResult,
        program_error::PrintProgramError, pubkey::Pubkey,
    };
    use crate::{error::StablecoinError, processor};

    entrypoint!(process_instruction);

    fn process_instruction<'a>(
        program_id: &Pubkey,
        accounts: &'a [AccountInfo<'a>],
        instruction_data: &[u8],
    ) -> ProgramResult {
        if let Err(error) = processor::process_instruction(program_id, accounts, instruction_data) {
            error.print::<StablecoinError>();
            return Err(error);
        }
        Ok(())
    }
}
