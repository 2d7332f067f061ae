//! Per-kind emission templates.
//!
//! Each primitive compiles to a self-contained resource: a set of
//! constants drawn from its numeric parameters, one `key` record and a fixed
//! list of lifecycle functions. Which items are emitted depends only on the
//! kind; the instance contributes parameter values and the collision suffix.

use movematrix_core::param::ParamValue;
use movematrix_core::primitive::{Primitive, PrimitiveKind};

use crate::ir::{Constant, Field, Function, Record};
use crate::naming::{comment_text, const_ident, UNSET};

/// Items emitted for one primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitted {
    pub constants: Vec<Constant>,
    pub record: Record,
    pub functions: Vec<Function>,
}

/// Builds the items for `primitive`, with `suffix` appended to every
/// generated name (`""` for the first instance of its kind).
pub fn emit(primitive: &Primitive, suffix: &str) -> Emitted {
    let ctx = Ctx { primitive, suffix };
    match primitive.kind {
        PrimitiveKind::LendingPool => lending_pool(&ctx),
        PrimitiveKind::AmmPool => amm_pool(&ctx),
        PrimitiveKind::Staking => staking(&ctx),
        PrimitiveKind::Vault => vault(&ctx),
    }
}

// ---------------------------------------------------------------------------
// Numeric encoding
// ---------------------------------------------------------------------------

/// How a numeric parameter is encoded as an integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Percentage used in `/ 10000` arithmetic: `0.3` becomes `30`.
    BasisPoints,
    Days,
}

impl Unit {
    fn scale(self) -> f64 {
        match self {
            Unit::BasisPoints => 100.0,
            Unit::Days => 1.0,
        }
    }

    fn describe(self, raw: f64) -> String {
        match self {
            Unit::BasisPoints => format!("{raw}%"),
            Unit::Days => format!("{raw} days"),
        }
    }
}

/// Encodes `raw` as a non-negative integer literal in `unit`.
pub fn encode(raw: f64, unit: Unit) -> u64 {
    // Float-to-int `as` saturates and maps NaN to 0.
    (raw * unit.scale()).round().max(0.0) as u64
}

/// Vault strategy tags in encoding order.
pub const STRATEGIES: [&str; 3] = ["conservative", "moderate", "aggressive"];

// ---------------------------------------------------------------------------
// Instance context
// ---------------------------------------------------------------------------

struct Ctx<'a> {
    primitive: &'a Primitive,
    suffix: &'a str,
}

impl Ctx<'_> {
    fn name(&self, base: &str) -> String {
        format!("{base}{}", self.suffix)
    }

    fn value(&self, parameter: &str) -> Option<&ParamValue> {
        self.primitive.parameter(parameter).filter(|v| !v.is_empty())
    }

    /// The asset symbol substituted into `coin::Coin<..>`.
    fn asset(&self, parameter: &str) -> String {
        self.value(parameter)
            .and_then(ParamValue::as_str)
            .unwrap_or(UNSET)
            .to_string()
    }

    /// A `u64` constant for a numeric parameter, with its unit comment.
    fn number(&self, parameter: &str, unit: Unit) -> Constant {
        let (value, comment) = match self.value(parameter).and_then(ParamValue::as_number) {
            Some(raw) => (encode(raw, unit).to_string(), unit.describe(raw)),
            None => (UNSET.to_string(), "unset".to_string()),
        };
        Constant {
            name: self.name(&const_ident(parameter)),
            ty: "u64".to_string(),
            value,
            comment: Some(comment),
        }
    }

    /// The `u8` strategy constant; the comment carries the tag itself.
    fn strategy(&self) -> Constant {
        let tag = self.value("strategy").and_then(ParamValue::as_str);
        let value = tag
            .and_then(|t| STRATEGIES.iter().position(|s| s.eq_ignore_ascii_case(t)))
            .map(|i| i.to_string())
            .unwrap_or_else(|| UNSET.to_string());
        Constant {
            name: self.name("STRATEGY"),
            ty: "u8".to_string(),
            value,
            comment: Some(tag.map(comment_text).unwrap_or_else(|| "unset".to_string())),
        }
    }

    fn record(&self, base: &str, fields: Vec<Field>) -> Record {
        Record {
            name: self.name(base),
            doc: Some(format!(
                "{} ({})",
                comment_text(&self.primitive.label),
                self.primitive.kind
            )),
            abilities: vec!["key".to_string()],
            fields,
        }
    }

    fn function(
        &self,
        base: &str,
        doc: &str,
        params: &[(&str, &str)],
        acquires: Option<&str>,
        body: Vec<String>,
    ) -> Function {
        Function {
            name: self.name(base),
            doc: Some(doc.to_string()),
            params: params
                .iter()
                .map(|(n, t)| (n.to_string(), t.to_string()))
                .collect(),
            acquires: acquires.map(|r| r.to_string()),
            body,
        }
    }
}

/// A record field mirroring a constant: same comment, field named after
/// the parameter.
fn field_for(name: &str, constant: &Constant) -> Field {
    Field::new(name, constant.ty.clone(), constant.comment.clone())
}

const SIGNER: (&str, &str) = ("account", "&signer");

// ---------------------------------------------------------------------------
// Lending pool
// ---------------------------------------------------------------------------

fn lending_pool(ctx: &Ctx<'_>) -> Emitted {
    let asset = ctx.asset("assetType");
    let interest = ctx.number("interestRate", Unit::BasisPoints);
    let collateral = ctx.number("collateralRatio", Unit::BasisPoints);
    let liquidation = ctx.number("liquidationThreshold", Unit::BasisPoints);
    let record = ctx.record(
        "LendingPool",
        vec![
            Field::new("reserve", format!("coin::Coin<{asset}>"), None),
            field_for("interest_rate", &interest),
            field_for("collateral_ratio", &collateral),
            field_for("liquidation_threshold", &liquidation),
        ],
    );
    let r = record.name.clone();

    let functions = vec![
        ctx.function(
            "initialize_lending_pool",
            "Initialize lending pool",
            &[SIGNER],
            None,
            vec![
                format!("move_to(account, {r} {{"),
                format!("    reserve: coin::zero<{asset}>(),"),
                format!("    interest_rate: {},", interest.name),
                format!("    collateral_ratio: {},", collateral.name),
                format!("    liquidation_threshold: {},", liquidation.name),
                "});".to_string(),
            ],
        ),
        ctx.function(
            "deposit",
            "Deposit to lending pool",
            &[SIGNER, ("amount", "u64")],
            Some(r.as_str()),
            vec![
                format!("let deposit_coins = coin::withdraw<{asset}>(account, amount);"),
                format!("let lending_pool = borrow_global_mut<{r}>(signer::address_of(account));"),
                "coin::merge(&mut lending_pool.reserve, deposit_coins);".to_string(),
            ],
        ),
        ctx.function(
            "borrow",
            "Borrow from lending pool",
            &[SIGNER, ("amount", "u64")],
            Some(r.as_str()),
            vec![
                format!("let lending_pool = borrow_global_mut<{r}>(signer::address_of(account));"),
                "let coins = coin::extract(&mut lending_pool.reserve, amount);".to_string(),
                "coin::deposit(signer::address_of(account), coins);".to_string(),
            ],
        ),
    ];

    Emitted {
        constants: vec![interest, collateral, liquidation],
        record,
        functions,
    }
}

// ---------------------------------------------------------------------------
// AMM pool
// ---------------------------------------------------------------------------

fn amm_pool(ctx: &Ctx<'_>) -> Emitted {
    let asset_a = ctx.asset("assetTypeA");
    let asset_b = ctx.asset("assetTypeB");
    let fee = ctx.number("feePercent", Unit::BasisPoints);
    let record = ctx.record(
        "AmmPool",
        vec![
            Field::new("reserve_a", format!("coin::Coin<{asset_a}>"), None),
            Field::new("reserve_b", format!("coin::Coin<{asset_b}>"), None),
            field_for("fee_percent", &fee),
            Field::new("lp_supply", "u64", None),
        ],
    );
    let r = record.name.clone();

    let functions = vec![
        ctx.function(
            "initialize_amm_pool",
            "Initialize AMM pool",
            &[SIGNER],
            None,
            vec![
                format!("move_to(account, {r} {{"),
                format!("    reserve_a: coin::zero<{asset_a}>(),"),
                format!("    reserve_b: coin::zero<{asset_b}>(),"),
                format!("    fee_percent: {},", fee.name),
                "    lp_supply: 0,".to_string(),
                "});".to_string(),
            ],
        ),
        ctx.function(
            "add_liquidity",
            "Add liquidity to AMM pool",
            &[SIGNER, ("amount_a", "u64"), ("amount_b", "u64")],
            Some(r.as_str()),
            vec![
                format!("let coins_a = coin::withdraw<{asset_a}>(account, amount_a);"),
                format!("let coins_b = coin::withdraw<{asset_b}>(account, amount_b);"),
                format!("let amm_pool = borrow_global_mut<{r}>(signer::address_of(account));"),
                "coin::merge(&mut amm_pool.reserve_a, coins_a);".to_string(),
                "coin::merge(&mut amm_pool.reserve_b, coins_b);".to_string(),
                "amm_pool.lp_supply = amm_pool.lp_supply + amount_a * amount_b;".to_string(),
            ],
        ),
        ctx.function(
            "swap_a_to_b",
            "Swap in AMM pool",
            &[SIGNER, ("amount_in", "u64")],
            Some(r.as_str()),
            vec![
                format!("let coins_in = coin::withdraw<{asset_a}>(account, amount_in);"),
                format!("let amm_pool = borrow_global_mut<{r}>(signer::address_of(account));"),
                "coin::merge(&mut amm_pool.reserve_a, coins_in);".to_string(),
                "let reserve_a = coin::value(&amm_pool.reserve_a);".to_string(),
                "let reserve_b = coin::value(&amm_pool.reserve_b);".to_string(),
                "let gross_out = (amount_in * reserve_b) / (reserve_a + amount_in);".to_string(),
                "let fee = (gross_out * amm_pool.fee_percent) / 10000;".to_string(),
                "let coins_out = coin::extract(&mut amm_pool.reserve_b, gross_out - fee);"
                    .to_string(),
                "coin::deposit(signer::address_of(account), coins_out);".to_string(),
            ],
        ),
    ];

    Emitted {
        constants: vec![fee],
        record,
        functions,
    }
}

// ---------------------------------------------------------------------------
// Staking pool
// ---------------------------------------------------------------------------

fn staking(ctx: &Ctx<'_>) -> Emitted {
    let asset = ctx.asset("assetType");
    let reward_asset = ctx.asset("rewardAssetType");
    let rate = ctx.number("rewardRate", Unit::BasisPoints);
    let lock = ctx.number("lockPeriod", Unit::Days);
    let record = ctx.record(
        "StakingPool",
        vec![
            Field::new("staked", format!("coin::Coin<{asset}>"), None),
            Field::new("rewards", format!("coin::Coin<{reward_asset}>"), None),
            field_for("reward_rate", &rate),
            field_for("lock_period", &lock),
        ],
    );
    let r = record.name.clone();

    let functions = vec![
        ctx.function(
            "initialize_staking_pool",
            "Initialize staking pool",
            &[SIGNER],
            None,
            vec![
                format!("move_to(account, {r} {{"),
                format!("    staked: coin::zero<{asset}>(),"),
                format!("    rewards: coin::zero<{reward_asset}>(),"),
                format!("    reward_rate: {},", rate.name),
                format!("    lock_period: {},", lock.name),
                "});".to_string(),
            ],
        ),
        ctx.function(
            "stake",
            "Stake tokens",
            &[SIGNER, ("amount", "u64")],
            Some(r.as_str()),
            vec![
                format!("let stake_coins = coin::withdraw<{asset}>(account, amount);"),
                format!("let staking_pool = borrow_global_mut<{r}>(signer::address_of(account));"),
                "coin::merge(&mut staking_pool.staked, stake_coins);".to_string(),
            ],
        ),
        ctx.function(
            "claim_rewards",
            "Claim rewards",
            &[SIGNER],
            Some(r.as_str()),
            vec![
                format!("let staking_pool = borrow_global_mut<{r}>(signer::address_of(account));"),
                "let staked_amount = coin::value(&staking_pool.staked);".to_string(),
                "let rewards_amount = (staked_amount * staking_pool.reward_rate) / 10000 / 365;"
                    .to_string(),
                "let reward_coins = coin::extract(&mut staking_pool.rewards, rewards_amount);"
                    .to_string(),
                "coin::deposit(signer::address_of(account), reward_coins);".to_string(),
            ],
        ),
    ];

    Emitted {
        constants: vec![rate, lock],
        record,
        functions,
    }
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

fn vault(ctx: &Ctx<'_>) -> Emitted {
    let asset = ctx.asset("assetType");
    let strategy = ctx.strategy();
    let performance = ctx.number("performanceFee", Unit::BasisPoints);
    let withdrawal = ctx.number("withdrawalFee", Unit::BasisPoints);
    let record = ctx.record(
        "Vault",
        vec![
            Field::new("assets", format!("coin::Coin<{asset}>"), None),
            field_for("strategy", &strategy),
            field_for("performance_fee", &performance),
            field_for("withdrawal_fee", &withdrawal),
        ],
    );
    let r = record.name.clone();

    let functions = vec![
        ctx.function(
            "initialize_vault",
            "Initialize vault",
            &[SIGNER],
            None,
            vec![
                format!("move_to(account, {r} {{"),
                format!("    assets: coin::zero<{asset}>(),"),
                format!("    strategy: {},", strategy.name),
                format!("    performance_fee: {},", performance.name),
                format!("    withdrawal_fee: {},", withdrawal.name),
                "});".to_string(),
            ],
        ),
        ctx.function(
            "deposit_to_vault",
            "Deposit to vault",
            &[SIGNER, ("amount", "u64")],
            Some(r.as_str()),
            vec![
                format!("let deposit_coins = coin::withdraw<{asset}>(account, amount);"),
                format!("let vault = borrow_global_mut<{r}>(signer::address_of(account));"),
                "coin::merge(&mut vault.assets, deposit_coins);".to_string(),
            ],
        ),
        ctx.function(
            "withdraw_from_vault",
            "Withdraw from vault",
            &[SIGNER, ("amount", "u64")],
            Some(r.as_str()),
            vec![
                format!("let vault = borrow_global_mut<{r}>(signer::address_of(account));"),
                "let fee = (amount * vault.withdrawal_fee) / 10000;".to_string(),
                "let coins = coin::extract(&mut vault.assets, amount - fee);".to_string(),
                "coin::deposit(signer::address_of(account), coins);".to_string(),
            ],
        ),
    ];

    Emitted {
        constants: vec![strategy, performance, withdrawal],
        record,
        functions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movematrix_core::id::IdAllocator;
    use movematrix_core::primitive::Position;
    use movematrix_core::registry::Registry;

    fn instance(kind: PrimitiveKind) -> Primitive {
        Registry::instantiate(kind, Position::default(), &mut IdAllocator::new())
    }

    fn names(emitted: &Emitted) -> Vec<&str> {
        emitted.functions.iter().map(|f| f.name.as_str()).collect()
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    #[test]
    fn basis_points_scale_fractional_percentages() {
        assert_eq!(encode(0.3, Unit::BasisPoints), 30);
        assert_eq!(encode(0.1, Unit::BasisPoints), 10);
        assert_eq!(encode(10.0, Unit::BasisPoints), 1000);
    }

    #[test]
    fn days_round_and_negatives_clamp() {
        assert_eq!(encode(30.0, Unit::Days), 30);
        assert_eq!(encode(2.6, Unit::Days), 3);
        assert_eq!(encode(-4.0, Unit::Days), 0);
    }

    #[test]
    fn fractional_rates_keep_their_fraction() {
        let mut pool = instance(PrimitiveKind::LendingPool);
        pool.parameters
            .insert("interestRate".into(), ParamValue::Number(0.4));
        let emitted = emit(&pool, "");
        let interest = &emitted.constants[0];
        assert_eq!(interest.name, "INTEREST_RATE");
        assert_eq!(interest.value, "40");
        assert_eq!(interest.comment.as_deref(), Some("0.4%"));
        // Defaults: 150% collateral, 120% liquidation.
        assert_eq!(emitted.constants[1].value, "15000");
        assert_eq!(emitted.constants[2].value, "12000");
    }

    #[test]
    fn reward_rate_is_basis_points_per_year() {
        let emitted = emit(&instance(PrimitiveKind::Staking), "");
        let claim = &emitted.functions[2];
        assert!(claim
            .body
            .iter()
            .any(|line| line.contains("reward_rate) / 10000 / 365;")));
    }

    // -----------------------------------------------------------------------
    // Per-kind item sets
    // -----------------------------------------------------------------------

    #[test]
    fn each_kind_emits_its_fixed_function_set() {
        let expected: [(PrimitiveKind, &str, [&str; 3]); 4] = [
            (
                PrimitiveKind::LendingPool,
                "LendingPool",
                ["initialize_lending_pool", "deposit", "borrow"],
            ),
            (
                PrimitiveKind::AmmPool,
                "AmmPool",
                ["initialize_amm_pool", "add_liquidity", "swap_a_to_b"],
            ),
            (
                PrimitiveKind::Staking,
                "StakingPool",
                ["initialize_staking_pool", "stake", "claim_rewards"],
            ),
            (
                PrimitiveKind::Vault,
                "Vault",
                ["initialize_vault", "deposit_to_vault", "withdraw_from_vault"],
            ),
        ];
        for (kind, record, functions) in expected {
            let emitted = emit(&instance(kind), "");
            assert_eq!(emitted.record.name, record);
            assert_eq!(names(&emitted), functions);
        }
    }

    #[test]
    fn suffix_applies_to_every_name() {
        let emitted = emit(&instance(PrimitiveKind::LendingPool), "_2");
        assert_eq!(emitted.record.name, "LendingPool_2");
        assert_eq!(
            names(&emitted),
            ["initialize_lending_pool_2", "deposit_2", "borrow_2"]
        );
        assert!(emitted.constants.iter().all(|c| c.name.ends_with("_2")));
        assert_eq!(emitted.functions[1].acquires.as_deref(), Some("LendingPool_2"));
    }

    // -----------------------------------------------------------------------
    // Parameter substitution
    // -----------------------------------------------------------------------

    #[test]
    fn amm_fee_is_basis_points_with_percent_comment() {
        let emitted = emit(&instance(PrimitiveKind::AmmPool), "");
        let fee = &emitted.constants[0];
        assert_eq!(fee.name, "FEE_PERCENT");
        assert_eq!(fee.value, "30");
        assert_eq!(fee.comment.as_deref(), Some("0.3%"));
        assert_eq!(emitted.record.fields[0].ty, "coin::Coin<USDC>");
        assert_eq!(emitted.record.fields[1].ty, "coin::Coin<ETH>");
    }

    #[test]
    fn vault_strategy_is_encoded_with_tag_comment() {
        let mut vault = instance(PrimitiveKind::Vault);
        vault
            .parameters
            .insert("strategy".into(), ParamValue::EnumTag("aggressive".into()));
        let emitted = emit(&vault, "");
        let strategy = &emitted.constants[0];
        assert_eq!((strategy.ty.as_str(), strategy.value.as_str()), ("u8", "2"));
        let field = &emitted.record.fields[1];
        assert_eq!(field.name, "strategy");
        assert_eq!(field.comment.as_deref(), Some("aggressive"));
    }

    #[test]
    fn missing_values_render_unset() {
        let mut pool = instance(PrimitiveKind::LendingPool);
        pool.parameters
            .insert("assetType".into(), ParamValue::Asset(String::new()));
        pool.parameters.shift_remove("interestRate");
        let emitted = emit(&pool, "");
        assert_eq!(emitted.record.fields[0].ty, "coin::Coin<UNSET>");
        assert_eq!(emitted.constants[0].value, UNSET);
    }

    #[test]
    fn record_doc_names_label_and_kind() {
        let emitted = emit(&instance(PrimitiveKind::Staking), "");
        assert_eq!(emitted.record.doc.as_deref(), Some("Staking Pool (staking)"));
    }
}
