//! Swap engine - route resolution and atomic multi-hop settlement

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::{EngineState, SwapCompleted, SwapQuote, SwapReceipt};
use crate::domain::execution::{
    AssetTransfer, HopExecutor, HopFill, NativeSettlement, Settlement, TransferJournal,
};
use crate::domain::price::PriceOracle;
use crate::domain::protocol::ProtocolConfig;
use crate::domain::registry::{Pair, Route};
use crate::domain::routing::{hops, RouteResolver};
use crate::shared::config::EngineConfig;
use crate::shared::errors::SwapError;
use crate::shared::types::{Amount, AssetId, BasisPoints, BlockHeight, Principal};
use crate::shared::utils::{format_path, generate_id};

const EVENT_CAPACITY: usize = 256;

/// Public entry point of the engine.
///
/// Configuration sits behind one lock: a swap holds the read guard from
/// validation to settlement, admin operations take the write guard, so a
/// swap always sees one consistent snapshot. Transfers committed by a swap
/// that later fails are reversed before the error is returned.
///
/// Swaps settle one at a time under `settlement`, held from the first
/// transfer through rollback, so a reversal never races another swap over
/// the same balances. Quotes and queries do not take it.
pub struct SwapEngine {
    state: RwLock<EngineState>,
    settlement: Mutex<()>,
    oracle: Arc<dyn PriceOracle>,
    assets: Arc<dyn AssetTransfer>,
    native: Arc<dyn NativeSettlement>,
    events: broadcast::Sender<SwapCompleted>,
}

impl SwapEngine {
    pub fn new(
        config: ProtocolConfig,
        oracle: Arc<dyn PriceOracle>,
        assets: Arc<dyn AssetTransfer>,
        native: Arc<dyn NativeSettlement>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(EngineState::new(config)),
            settlement: Mutex::new(()),
            oracle,
            assets,
            native,
            events,
        }
    }

    /// Build an engine and load the configured tables through the admin
    /// operations, so bootstrap data passes the same validation.
    pub async fn bootstrap(
        config: &EngineConfig,
        oracle: Arc<dyn PriceOracle>,
        assets: Arc<dyn AssetTransfer>,
        native: Arc<dyn NativeSettlement>,
    ) -> Result<Self, SwapError> {
        let protocol = ProtocolConfig::try_from(&config.protocol)?;
        let admin = protocol.admin.clone();
        let engine = Self::new(protocol, oracle, assets, native);

        {
            let mut state = engine.state.write().await;
            for asset in &config.assets {
                state.add_asset(&admin, asset.clone())?;
            }
            for pair in &config.pairs {
                state.add_pair(&admin, pair.asset_in.clone(), pair.asset_out.clone(), pair.fee_bps)?;
            }
            for route in &config.routes {
                state.set_route(
                    &admin,
                    route.asset_in.clone(),
                    route.asset_out.clone(),
                    route.path.clone(),
                )?;
            }
            info!(
                assets = state.assets().len(),
                pairs = state.pairs().len(),
                routes = state.routes().len(),
                "Engine bootstrapped"
            );
        }

        Ok(engine)
    }

    /// Receive a `SwapCompleted` for every swap settled after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SwapCompleted> {
        self.events.subscribe()
    }

    /// Convert `amount` of `asset_in` into `asset_out`, returning the
    /// amount delivered to `caller`.
    pub async fn swap(
        &self,
        asset_in: &AssetId,
        asset_out: &AssetId,
        amount: Amount,
        min_out: Amount,
        caller: &Principal,
        current_height: BlockHeight,
    ) -> Result<Amount, SwapError> {
        self.swap_detailed(asset_in, asset_out, amount, min_out, caller, current_height)
            .await
            .map(|receipt| receipt.amount_out)
    }

    /// Same as [`swap`](Self::swap) but returns the per-hop breakdown.
    pub async fn swap_detailed(
        &self,
        asset_in: &AssetId,
        asset_out: &AssetId,
        amount: Amount,
        min_out: Amount,
        caller: &Principal,
        current_height: BlockHeight,
    ) -> Result<SwapReceipt, SwapError> {
        // Taken before the state guard; admin operations never take it
        let _settling = self.settlement.lock().await;
        let state = self.state.read().await;
        preflight(&state, asset_in, asset_out, amount, Some(min_out))?;

        let path = RouteResolver::new(state.routes()).resolve(asset_in, asset_out);
        debug!(path = %format_path(&path), amount, min_out, caller = %caller, "Executing swap");

        let executor = HopExecutor::new(state.config(), state.pairs(), self.oracle.as_ref());
        let settlement = Settlement::new(self.assets.as_ref(), self.native.as_ref());
        let mut journal = TransferJournal::new();

        let settled = if path.len() == 2 {
            let leg = hops(&path).next().ok_or(SwapError::SwapFailed { cause: None })?;
            executor
                .execute_hop(&leg, amount, caller, current_height, &settlement, &mut journal)
                .await
                .map(|fill| vec![fill])
        } else {
            execute_path(&executor, &path, amount, caller, current_height, &settlement, &mut journal)
                .await
        };

        let fills = match settled {
            Ok(fills) => fills,
            Err(e) => {
                warn!(path = %format_path(&path), error = %e, "Swap aborted");
                rollback(journal, &settlement).await;
                return Err(SwapError::swap_failed(e));
            }
        };

        let amount_out = fills.last().map(|f| f.amount_out).unwrap_or(0);
        if amount_out < min_out {
            warn!(min_out, amount_out, "Swap output below minimum");
            rollback(journal, &settlement).await;
            return Err(SwapError::Slippage { min_out, amount_out });
        }

        let event = SwapCompleted {
            asset_in: asset_in.clone(),
            asset_out: asset_out.clone(),
            amount_in: amount,
            amount_out,
        };
        info!(
            asset_in = %event.asset_in,
            asset_out = %event.asset_out,
            amount_in = event.amount_in,
            amount_out = event.amount_out,
            hops = fills.len(),
            "Swap completed"
        );
        // No subscribers is not an error
        let _ = self.events.send(event);

        Ok(SwapReceipt {
            id: generate_id(),
            caller: caller.clone(),
            path,
            hops: fills,
            amount_in: amount,
            amount_out,
            completed_at: Utc::now(),
        })
    }

    /// Price a swap along its resolved path without moving any value.
    pub async fn quote(
        &self,
        asset_in: &AssetId,
        asset_out: &AssetId,
        amount: Amount,
        current_height: BlockHeight,
    ) -> Result<SwapQuote, SwapError> {
        let state = self.state.read().await;
        preflight(&state, asset_in, asset_out, amount, None)?;

        let path = RouteResolver::new(state.routes()).resolve(asset_in, asset_out);
        let executor = HopExecutor::new(state.config(), state.pairs(), self.oracle.as_ref());

        let mut fills = Vec::with_capacity(path.len() - 1);
        let mut running = amount;
        for leg in hops(&path) {
            let fill = executor.price_hop(&leg, running, current_height).await?;
            running = fill.amount_out;
            fills.push(fill);
        }

        Ok(SwapQuote {
            path,
            hops: fills,
            amount_in: amount,
            amount_out: running,
        })
    }

    // ---- admin operations ----

    pub async fn add_asset(&self, caller: &Principal, asset: AssetId) -> Result<(), SwapError> {
        self.state.write().await.add_asset(caller, asset)
    }

    pub async fn add_pair(
        &self,
        caller: &Principal,
        asset_in: AssetId,
        asset_out: AssetId,
        fee_bps: BasisPoints,
    ) -> Result<(), SwapError> {
        self.state.write().await.add_pair(caller, asset_in, asset_out, fee_bps)
    }

    pub async fn set_route(
        &self,
        caller: &Principal,
        asset_in: AssetId,
        asset_out: AssetId,
        path: Vec<AssetId>,
    ) -> Result<(), SwapError> {
        self.state.write().await.set_route(caller, asset_in, asset_out, path)
    }

    pub async fn set_protocol_fee(&self, caller: &Principal, bps: BasisPoints) -> Result<(), SwapError> {
        self.state.write().await.set_protocol_fee(caller, bps)
    }

    pub async fn set_fee_recipient(&self, caller: &Principal, recipient: Principal) -> Result<(), SwapError> {
        self.state.write().await.set_fee_recipient(caller, recipient)
    }

    pub async fn pause(&self, caller: &Principal) -> Result<(), SwapError> {
        self.state.write().await.pause(caller)
    }

    pub async fn unpause(&self, caller: &Principal) -> Result<(), SwapError> {
        self.state.write().await.unpause(caller)
    }

    pub async fn set_admin(&self, caller: &Principal, admin: Principal) -> Result<(), SwapError> {
        self.state.write().await.set_admin(caller, admin)
    }

    pub async fn set_oracle(&self, caller: &Principal, oracle: Principal) -> Result<(), SwapError> {
        self.state.write().await.set_oracle(caller, oracle)
    }

    pub async fn set_max_path_length(&self, caller: &Principal, max: usize) -> Result<(), SwapError> {
        self.state.write().await.set_max_path_length(caller, max)
    }

    pub async fn set_liquidity_threshold(&self, caller: &Principal, threshold: Amount) -> Result<(), SwapError> {
        self.state.write().await.set_liquidity_threshold(caller, threshold)
    }

    // ---- read-only queries ----

    pub async fn get_pair(&self, asset_in: &AssetId, asset_out: &AssetId) -> Option<Pair> {
        self.state.read().await.get_pair(asset_in, asset_out)
    }

    pub async fn get_route(&self, asset_in: &AssetId, asset_out: &AssetId) -> Option<Route> {
        self.state.read().await.get_route(asset_in, asset_out)
    }

    pub async fn is_asset_supported(&self, asset: &AssetId) -> bool {
        self.state.read().await.assets().contains(asset)
    }

    pub async fn supported_assets(&self) -> Vec<AssetId> {
        self.state.read().await.assets().iter().cloned().collect()
    }

    pub async fn get_protocol_fee(&self) -> BasisPoints {
        self.state.read().await.config().protocol_fee_bps
    }

    pub async fn get_fee_recipient(&self) -> Principal {
        self.state.read().await.config().fee_recipient.clone()
    }

    pub async fn is_paused(&self) -> bool {
        self.state.read().await.config().paused
    }

    pub async fn get_admin(&self) -> Principal {
        self.state.read().await.config().admin.clone()
    }

    pub async fn get_oracle(&self) -> Principal {
        self.state.read().await.config().oracle.clone()
    }

    pub async fn get_max_path_length(&self) -> usize {
        self.state.read().await.config().max_path_length
    }

    pub async fn get_liquidity_threshold(&self) -> Amount {
        self.state.read().await.config().liquidity_threshold
    }

    /// Copy of the full configuration state
    pub async fn snapshot(&self) -> EngineState {
        self.state.read().await.clone()
    }
}

/// Checks shared by `swap` and `quote`, in precedence order.
fn preflight(
    state: &EngineState,
    asset_in: &AssetId,
    asset_out: &AssetId,
    amount: Amount,
    min_out: Option<Amount>,
) -> Result<(), SwapError> {
    if state.config().paused {
        return Err(SwapError::Paused);
    }
    if amount == 0 {
        return Err(SwapError::InvalidAmount);
    }
    if min_out == Some(0) {
        return Err(SwapError::InvalidMinOut);
    }
    state.assets().require(asset_in)?;
    state.assets().require(asset_out)?;
    Ok(())
}

/// Fold the executor over consecutive legs, feeding each hop's output into
/// the next. Stops at the first failure.
async fn execute_path(
    executor: &HopExecutor<'_>,
    path: &[AssetId],
    amount: Amount,
    caller: &Principal,
    current_height: BlockHeight,
    settlement: &Settlement<'_>,
    journal: &mut TransferJournal,
) -> Result<Vec<HopFill>, SwapError> {
    let mut fills = Vec::with_capacity(path.len().saturating_sub(1));
    let mut running = amount;
    for leg in hops(path) {
        let fill = executor
            .execute_hop(&leg, running, caller, current_height, settlement, journal)
            .await?;
        running = fill.amount_out;
        fills.push(fill);
    }
    Ok(fills)
}

async fn rollback(journal: TransferJournal, settlement: &Settlement<'_>) {
    let committed = journal.len();
    let failed = journal.unwind(settlement).await;
    if failed > 0 {
        error!(committed, failed, "Swap rollback incomplete, balances need manual reconciliation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use crate::infrastructure::memory::{MemoryLedger, MemoryPriceFeed};
    use crate::shared::types::AssetPair;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    const HEIGHT: BlockHeight = 1_000;

    fn id(name: &str) -> AssetId {
        AssetId::from(name)
    }

    fn ids(names: &[&str]) -> Vec<AssetId> {
        names.iter().map(|n| AssetId::from(*n)).collect()
    }

    fn admin() -> Principal {
        Principal::from("admin")
    }

    fn alice() -> Principal {
        Principal::from("alice")
    }

    fn engine_account() -> Principal {
        Principal::from("engine")
    }

    fn oracle() -> Principal {
        Principal::from("oracle")
    }

    struct Harness {
        engine: SwapEngine,
        feed: Arc<MemoryPriceFeed>,
        ledger: Arc<MemoryLedger>,
    }

    impl Harness {
        async fn price(&self, a: &str, b: &str, rate: u128, at: BlockHeight) {
            self.feed
                .set_price(&oracle(), AssetPair::new(id(a), id(b)), PricePoint::new(rate, at))
                .await;
        }

        async fn balance(&self, asset: &str, owner: &Principal) -> Amount {
            self.ledger.balance_of(&id(asset), owner).await
        }
    }

    /// Serves quotes from the feed, sleeping before the quote for `slow_leg`
    struct DelayedOracle {
        inner: Arc<MemoryPriceFeed>,
        slow_leg: AssetPair,
        delay: Duration,
        log: Arc<StdMutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl PriceOracle for DelayedOracle {
        async fn get_price(&self, oracle: &Principal, pair: &AssetPair) -> Option<PricePoint> {
            if pair == &self.slow_leg {
                tokio::time::sleep(self.delay).await;
                self.log.lock().unwrap().push("slow quote served");
            }
            self.inner.get_price(oracle, pair).await
        }
    }

    async fn harness() -> Harness {
        harness_with_oracle(|feed| feed as Arc<dyn PriceOracle>).await
    }

    /// Harness whose B->C quote takes 100ms to arrive
    async fn slow_harness(log: Arc<StdMutex<Vec<&'static str>>>) -> Harness {
        harness_with_oracle(move |feed| {
            Arc::new(DelayedOracle {
                inner: feed,
                slow_leg: AssetPair::new(id("B"), id("C")),
                delay: Duration::from_millis(100),
                log,
            }) as Arc<dyn PriceOracle>
        })
        .await
    }

    /// Assets A, B, C and native STX; pairs A->B (100 bps) and B->C (50 bps)
    async fn harness_with_oracle(
        make_oracle: impl FnOnce(Arc<MemoryPriceFeed>) -> Arc<dyn PriceOracle>,
    ) -> Harness {
        let feed = Arc::new(MemoryPriceFeed::new());
        let ledger = Arc::new(MemoryLedger::new(id("STX")));
        let config = ProtocolConfig::new(admin(), engine_account(), Principal::from("treasury"), oracle(), id("STX"));
        let engine = SwapEngine::new(config, make_oracle(feed.clone()), ledger.clone(), ledger.clone());

        for asset in ["A", "B", "C", "STX"] {
            engine.add_asset(&admin(), id(asset)).await.unwrap();
        }
        engine.add_pair(&admin(), id("A"), id("B"), 100).await.unwrap();
        engine.add_pair(&admin(), id("B"), id("C"), 50).await.unwrap();

        ledger.credit(&id("A"), &alice(), 1_000_000).await;
        ledger.credit(&id("STX"), &alice(), 1_000_000).await;
        for asset in ["A", "B", "C"] {
            ledger.credit(&id(asset), &engine_account(), 100_000_000).await;
        }

        let h = Harness { engine, feed, ledger };
        h.price("A", "B", 2, HEIGHT).await;
        h.price("B", "C", 3, HEIGHT).await;
        h
    }

    #[tokio::test]
    async fn test_direct_swap() {
        let h = harness().await;

        let out = h
            .engine
            .swap(&id("A"), &id("B"), 1000, 1, &alice(), HEIGHT)
            .await
            .unwrap();

        assert_eq!(out, 1980);
        assert_eq!(h.balance("A", &alice()).await, 999_000);
        assert_eq!(h.balance("B", &alice()).await, 1980);
        assert_eq!(h.balance("STX", &Principal::from("treasury")).await, 20);
    }

    #[tokio::test]
    async fn test_multi_hop_equals_sequential_hops() {
        let h = harness().await;
        h.engine
            .set_route(&admin(), id("A"), id("C"), ids(&["A", "B", "C"]))
            .await
            .unwrap();

        let receipt = h
            .engine
            .swap_detailed(&id("A"), &id("C"), 1000, 1, &alice(), HEIGHT)
            .await
            .unwrap();

        // A->B: 2000 gross, 20 fee, 1980 net; B->C: 5940 gross, 29 fee
        assert_eq!(receipt.hops.len(), 2);
        assert_eq!(receipt.hops[1].amount_in, receipt.hops[0].amount_out);
        assert_eq!(receipt.amount_out, 5911);
        assert_eq!(receipt.path, ids(&["A", "B", "C"]));

        let h2 = harness().await;
        let first = h2.engine.swap(&id("A"), &id("B"), 1000, 1, &alice(), HEIGHT).await.unwrap();
        let second = h2.engine.swap(&id("B"), &id("C"), first, 1, &alice(), HEIGHT).await.unwrap();
        assert_eq!(second, receipt.amount_out);
    }

    #[tokio::test]
    async fn test_slippage_boundary() {
        let h = harness().await;

        let out = h.engine.swap(&id("A"), &id("B"), 1000, 1980, &alice(), HEIGHT).await;
        assert_eq!(out, Ok(1980));

        let err = h
            .engine
            .swap(&id("A"), &id("B"), 1000, 1981, &alice(), HEIGHT)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SwapError::Slippage {
                min_out: 1981,
                amount_out: 1980
            }
        );
        // The rejected swap left no trace
        assert_eq!(h.balance("A", &alice()).await, 999_000);
        assert_eq!(h.balance("B", &alice()).await, 1980);
        assert_eq!(h.balance("STX", &Principal::from("treasury")).await, 20);
    }

    #[tokio::test]
    async fn test_pause_precedes_all_validation() {
        let h = harness().await;
        h.engine.pause(&admin()).await.unwrap();

        assert_eq!(
            h.engine.swap(&id("X"), &id("Y"), 0, 0, &alice(), HEIGHT).await,
            Err(SwapError::Paused)
        );
        assert_eq!(
            h.engine.quote(&id("A"), &id("B"), 1000, HEIGHT).await.unwrap_err(),
            SwapError::Paused
        );

        h.engine.unpause(&admin()).await.unwrap();
        assert!(h.engine.swap(&id("A"), &id("B"), 1000, 1, &alice(), HEIGHT).await.is_ok());
    }

    #[tokio::test]
    async fn test_input_validation_order() {
        let h = harness().await;

        assert_eq!(
            h.engine.swap(&id("X"), &id("B"), 0, 0, &alice(), HEIGHT).await,
            Err(SwapError::InvalidAmount)
        );
        assert_eq!(
            h.engine.swap(&id("X"), &id("B"), 10, 0, &alice(), HEIGHT).await,
            Err(SwapError::InvalidMinOut)
        );
        assert_eq!(
            h.engine.swap(&id("X"), &id("B"), 10, 1, &alice(), HEIGHT).await,
            Err(SwapError::InvalidToken(id("X")))
        );
        assert_eq!(
            h.engine.swap(&id("A"), &id("Y"), 10, 1, &alice(), HEIGHT).await,
            Err(SwapError::InvalidToken(id("Y")))
        );
    }

    #[tokio::test]
    async fn test_hop_errors_are_wrapped() {
        let h = harness().await;

        // No pair C->A
        let err = h
            .engine
            .swap(&id("C"), &id("A"), 10, 1, &alice(), HEIGHT)
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::SwapFailed { cause: Some(_) }));
        assert!(matches!(err.root_cause(), SwapError::InvalidPair { .. }));

        // Stale price
        let err = h
            .engine
            .swap(&id("A"), &id("B"), 10, 1, &alice(), HEIGHT + 10)
            .await
            .unwrap_err();
        assert_eq!(
            err.root_cause(),
            &SwapError::StalePrice {
                quoted_at: HEIGHT,
                current_height: HEIGHT + 10
            }
        );
    }

    #[tokio::test]
    async fn test_route_with_missing_pair_fails_lazily() {
        let h = harness().await;
        // Route accepted even though C->A does not exist yet
        h.engine
            .set_route(&admin(), id("B"), id("A"), ids(&["B", "C", "A"]))
            .await
            .unwrap();
        h.ledger.credit(&id("B"), &alice(), 1_000).await;

        let err = h
            .engine
            .swap(&id("B"), &id("A"), 1_000, 1, &alice(), HEIGHT)
            .await
            .unwrap_err();
        assert_eq!(
            err.root_cause(),
            &SwapError::InvalidPair {
                asset_in: id("C"),
                asset_out: id("A")
            }
        );
        // The settled B->C hop was reversed
        assert_eq!(h.balance("B", &alice()).await, 1_000);
        assert_eq!(h.balance("C", &alice()).await, 0);
        assert_eq!(h.balance("STX", &alice()).await, 1_000_000);
        assert_eq!(h.balance("STX", &Principal::from("treasury")).await, 0);
    }

    #[tokio::test]
    async fn test_fee_transfer_failure_rolls_back() {
        let h = harness().await;
        h.ledger.fail_on(id("STX")).await;

        let err = h
            .engine
            .swap(&id("A"), &id("B"), 1000, 1, &alice(), HEIGHT)
            .await
            .unwrap_err();

        assert_eq!(err.root_cause(), &SwapError::FeeTransferFailed);
        assert_eq!(h.balance("A", &alice()).await, 1_000_000);
        assert_eq!(h.balance("B", &alice()).await, 0);
        assert_eq!(h.balance("B", &engine_account()).await, 100_000_000);
    }

    #[tokio::test]
    async fn test_output_transfer_failure() {
        let h = harness().await;
        h.ledger.fail_on(id("B")).await;

        let err = h
            .engine
            .swap(&id("A"), &id("B"), 1000, 1, &alice(), HEIGHT)
            .await
            .unwrap_err();

        assert!(matches!(
            err.root_cause(),
            SwapError::TransferRejected { asset, .. } if asset == &id("B")
        ));
        assert_eq!(h.balance("A", &alice()).await, 1_000_000);
        assert_eq!(h.balance("A", &engine_account()).await, 100_000_000);
    }

    #[tokio::test]
    async fn test_overflow_surfaces() {
        let h = harness().await;
        h.price("A", "B", u128::MAX, HEIGHT).await;

        let err = h
            .engine
            .swap(&id("A"), &id("B"), 2, 1, &alice(), HEIGHT)
            .await
            .unwrap_err();
        assert_eq!(err.root_cause(), &SwapError::MathOverflow);
    }

    #[tokio::test]
    async fn test_set_oracle_switches_price_source() {
        let h = harness().await;
        h.engine.set_oracle(&admin(), Principal::from("oracle-2")).await.unwrap();

        let err = h
            .engine
            .swap(&id("A"), &id("B"), 1000, 1, &alice(), HEIGHT)
            .await
            .unwrap_err();
        assert!(matches!(err.root_cause(), SwapError::NoRoute { .. }));

        h.feed
            .set_price(
                &Principal::from("oracle-2"),
                AssetPair::new(id("A"), id("B")),
                PricePoint::new(5, HEIGHT),
            )
            .await;
        let out = h.engine.swap(&id("A"), &id("B"), 1000, 1, &alice(), HEIGHT).await.unwrap();
        assert_eq!(out, 4950);
    }

    #[tokio::test]
    async fn test_quote_matches_swap_without_moving_funds() {
        let h = harness().await;
        h.engine
            .set_route(&admin(), id("A"), id("C"), ids(&["A", "B", "C"]))
            .await
            .unwrap();

        let quote = h.engine.quote(&id("A"), &id("C"), 1000, HEIGHT).await.unwrap();
        assert_eq!(quote.amount_out, 5911);
        assert_eq!(quote.total_fee(), 20 + 29);
        assert_eq!(h.balance("A", &alice()).await, 1_000_000);

        let out = h
            .engine
            .swap(&id("A"), &id("C"), 1000, quote.amount_out, &alice(), HEIGHT)
            .await
            .unwrap();
        assert_eq!(out, quote.amount_out);
    }

    #[tokio::test]
    async fn test_swap_completed_event() {
        let h = harness().await;
        let mut events = h.engine.subscribe();

        h.engine.swap(&id("A"), &id("B"), 1000, 1, &alice(), HEIGHT).await.unwrap();
        assert!(h.engine.swap(&id("A"), &id("B"), 1000, 5000, &alice(), HEIGHT).await.is_err());

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            SwapCompleted {
                asset_in: id("A"),
                asset_out: id("B"),
                amount_in: 1000,
                amount_out: 1980,
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_queries() {
        let h = harness().await;
        h.engine.set_protocol_fee(&admin(), 40).await.unwrap();
        h.engine.set_fee_recipient(&admin(), Principal::from("dao")).await.unwrap();
        h.engine.set_liquidity_threshold(&admin(), 77).await.unwrap();
        h.engine.set_max_path_length(&admin(), 3).await.unwrap();

        assert_eq!(h.engine.get_protocol_fee().await, 40);
        assert_eq!(h.engine.get_fee_recipient().await, Principal::from("dao"));
        assert_eq!(h.engine.get_liquidity_threshold().await, 77);
        assert_eq!(h.engine.get_max_path_length().await, 3);
        assert_eq!(h.engine.get_admin().await, admin());
        assert_eq!(h.engine.get_oracle().await, oracle());
        assert!(!h.engine.is_paused().await);
        assert!(h.engine.is_asset_supported(&id("A")).await);
        assert!(!h.engine.is_asset_supported(&id("Z")).await);
        assert_eq!(h.engine.supported_assets().await.len(), 4);
        assert_eq!(h.engine.get_pair(&id("A"), &id("B")).await.map(|p| p.fee_bps), Some(100));
        assert!(h.engine.get_route(&id("A"), &id("C")).await.is_none());
    }

    #[tokio::test]
    async fn test_protocol_fee_does_not_change_hop_fee() {
        let h = harness().await;
        h.engine.set_protocol_fee(&admin(), 500).await.unwrap();

        let out = h.engine.swap(&id("A"), &id("B"), 1000, 1, &alice(), HEIGHT).await.unwrap();
        assert_eq!(out, 1980);
    }

    #[tokio::test]
    async fn test_concurrent_swap_cannot_strand_rollback() {
        let h = slow_harness(Arc::new(StdMutex::new(Vec::new()))).await;
        h.engine.add_pair(&admin(), id("B"), id("A"), 0).await.unwrap();
        h.price("B", "A", 1, HEIGHT).await;
        h.engine
            .set_route(&admin(), id("A"), id("C"), ids(&["A", "B", "C"]))
            .await
            .unwrap();
        // A->C settles its first hop, then finds no B->C quote
        h.feed.remove_price(&oracle(), &AssetPair::new(id("B"), id("C"))).await;

        let (asset_a, asset_c, sender) = (id("A"), id("C"), alice());
        let (failed, spend) = tokio::join!(
            h.engine.swap(&asset_a, &asset_c, 1000, 1, &sender, HEIGHT),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                // Tries to spend the B credited by the first hop
                h.engine.swap(&id("B"), &id("A"), 1980, 1, &alice(), HEIGHT).await
            }
        );

        assert_eq!(
            failed.unwrap_err().root_cause(),
            &SwapError::NoRoute {
                asset_in: id("B"),
                asset_out: id("C")
            }
        );
        // Runs only after the first swap was fully reversed
        assert!(matches!(
            spend.unwrap_err().root_cause(),
            SwapError::TransferRejected { asset, .. } if asset == &id("B")
        ));
        assert_eq!(h.balance("A", &alice()).await, 1_000_000);
        assert_eq!(h.balance("B", &alice()).await, 0);
        assert_eq!(h.balance("STX", &alice()).await, 1_000_000);
        assert_eq!(h.balance("A", &engine_account()).await, 100_000_000);
        assert_eq!(h.balance("B", &engine_account()).await, 100_000_000);
        assert_eq!(h.balance("STX", &Principal::from("treasury")).await, 0);
    }

    #[tokio::test]
    async fn test_admin_change_waits_for_in_flight_swap() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let h = slow_harness(log.clone()).await;
        h.engine
            .set_route(&admin(), id("A"), id("C"), ids(&["A", "B", "C"]))
            .await
            .unwrap();

        let (asset_a, asset_c, sender) = (id("A"), id("C"), alice());
        let (swapped, repointed) = tokio::join!(
            h.engine.swap(&asset_a, &asset_c, 1000, 1, &sender, HEIGHT),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                // oracle-2 has no quotes; the in-flight swap must not see it
                let result = h.engine.set_oracle(&admin(), Principal::from("oracle-2")).await;
                log.lock().unwrap().push("oracle repointed");
                result
            }
        );

        assert_eq!(swapped.unwrap(), 5911);
        repointed.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["slow quote served", "oracle repointed"]);
        assert_eq!(h.engine.get_oracle().await, Principal::from("oracle-2"));
    }

    #[tokio::test]
    async fn test_pause_waits_for_in_flight_swap() {
        let h = slow_harness(Arc::new(StdMutex::new(Vec::new()))).await;
        h.engine
            .set_route(&admin(), id("A"), id("C"), ids(&["A", "B", "C"]))
            .await
            .unwrap();

        let (asset_a, asset_c, sender) = (id("A"), id("C"), alice());
        let (swapped, paused) = tokio::join!(
            h.engine.swap(&asset_a, &asset_c, 1000, 1, &sender, HEIGHT),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                h.engine.pause(&admin()).await
            }
        );

        assert_eq!(swapped.unwrap(), 5911);
        paused.unwrap();
        assert_eq!(
            h.engine.swap(&id("A"), &id("B"), 10, 1, &alice(), HEIGHT).await,
            Err(SwapError::Paused)
        );
    }

    #[tokio::test]
    async fn test_bootstrap_from_config() {
        let config = crate::shared::config::ConfigLoader::parse(
            r#"
assets = ["STX", "USDA", "xBTC"]

[protocol]
admin = "admin"
custody = "engine"
fee_recipient = "treasury"
oracle = "oracle"
native_asset = "STX"

[[pairs]]
asset_in = "STX"
asset_out = "USDA"
fee_bps = 100

[[routes]]
asset_in = "STX"
asset_out = "xBTC"
path = ["STX", "USDA", "xBTC"]
"#,
        )
        .unwrap();
        let feed = Arc::new(MemoryPriceFeed::new());
        let ledger = Arc::new(MemoryLedger::new(id("STX")));

        let engine = SwapEngine::bootstrap(&config, feed, ledger.clone(), ledger)
            .await
            .unwrap();

        assert!(engine.is_asset_supported(&id("xBTC")).await);
        assert!(engine.get_pair(&id("STX"), &id("USDA")).await.is_some());
        assert_eq!(
            engine.get_route(&id("STX"), &id("xBTC")).await.map(|r| r.hop_count()),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_invalid_tables() {
        let mut config = crate::shared::config::ConfigLoader::parse(
            r#"
assets = ["STX"]

[protocol]
admin = "admin"
custody = "engine"
fee_recipient = "treasury"
oracle = "oracle"
native_asset = "STX"
"#,
        )
        .unwrap();
        config.pairs.push(crate::shared::config::PairEntry {
            asset_in: id("STX"),
            asset_out: id("USDA"),
            fee_bps: 30,
        });
        let feed = Arc::new(MemoryPriceFeed::new());
        let ledger = Arc::new(MemoryLedger::new(id("STX")));

        let result = SwapEngine::bootstrap(&config, feed, ledger.clone(), ledger).await;
        assert_eq!(result.err(), Some(SwapError::InvalidToken(id("USDA"))));
    }
}
