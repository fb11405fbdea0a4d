use alloy::primitives::{Address, TxHash};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{sleep, timeout};

use super::error::DeployError;
use super::extractor::extract_token_address;
use super::state::{DeployedToken, DeploymentStore, PendingDeployment};
use super::validator::{validate_request, TokenCreationRequest, ValidatedRequest};
use crate::chain::{ChainReader, TxReceipt, Wallet, WalletError};
use crate::config::Config;
use crate::services::notifier::{Notification, Notifier};

/// Knobs for one orchestrator instance
#[derive(Debug, Clone)]
pub struct DeploymentSettings {
    pub required_chain_id: u64,
    pub factory_address: Address,
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
}

impl DeploymentSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            required_chain_id: config.network.chain_id,
            factory_address: config
                .network
                .erc20_factory_address
                .parse()
                .context("Invalid erc20_factory_address")?,
            confirmation_timeout: Duration::from_secs(config.deployment.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(config.deployment.poll_interval_ms),
            max_poll_attempts: config.deployment.max_poll_attempts,
        })
    }
}

/// Where the current deployment stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeploymentStatus {
    Idle,
    Submitting {
        symbol: String,
    },
    AwaitingConfirmation {
        tx_hash: TxHash,
        attempts: u32,
    },
    Resolving {
        tx_hash: TxHash,
    },
    Succeeded {
        token: DeployedToken,
    },
    Failed {
        tx_hash: Option<TxHash>,
        reason: String,
    },
    TimedOut {
        tx_hash: TxHash,
        reason: String,
    },
    Cancelled {
        tx_hash: Option<TxHash>,
    },
}

impl DeploymentStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            DeploymentStatus::Submitting { .. }
                | DeploymentStatus::AwaitingConfirmation { .. }
                | DeploymentStatus::Resolving { .. }
        )
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            DeploymentStatus::AwaitingConfirmation { tx_hash, .. }
            | DeploymentStatus::Resolving { tx_hash }
            | DeploymentStatus::TimedOut { tx_hash, .. } => Some(*tx_hash),
            DeploymentStatus::Failed { tx_hash, .. } | DeploymentStatus::Cancelled { tx_hash } => {
                *tx_hash
            }
            DeploymentStatus::Succeeded { token } => token.tx_hash.parse().ok(),
            DeploymentStatus::Idle | DeploymentStatus::Submitting { .. } => None,
        }
    }
}

/// The status plus ownership of it.
///
/// Every submission or resume takes a new generation. Work started under an
/// older generation may still finish but can no longer write the status.
#[derive(Debug)]
struct Tracker {
    status: DeploymentStatus,
    generation: u64,
    cancelled: Option<u64>,
    tracked: Option<u64>,
}

impl Tracker {
    fn is_live(&self, generation: u64) -> bool {
        self.generation == generation && self.cancelled != Some(generation)
    }
}

/// A validated request holding the submission slot, ready to broadcast
#[derive(Debug, Clone)]
pub struct PreparedDeployment {
    request: ValidatedRequest,
    generation: u64,
}

impl PreparedDeployment {
    pub fn request(&self) -> &ValidatedRequest {
        &self.request
    }
}

/// One confirmation-tracking run for a broadcast handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingRun {
    pub tx_hash: TxHash,
    generation: u64,
}

/// Drives one token creation at a time from form submission to a recorded token.
///
/// Every transition is a separate awaited step (`prepare`, `broadcast`,
/// `poll_once`, `await_confirmation`, `resolve`); `submit`, `deploy` and `track`
/// chain them and turn any failure into a status plus a notification.
pub struct DeploymentOrchestrator {
    wallet: Arc<dyn Wallet>,
    chain: Arc<dyn ChainReader>,
    store: Arc<dyn DeploymentStore>,
    notifier: Arc<dyn Notifier>,
    settings: DeploymentSettings,
    tracker: RwLock<Tracker>,
    persist_lock: Mutex<()>,
}

impl DeploymentOrchestrator {
    pub fn new(
        wallet: Arc<dyn Wallet>,
        chain: Arc<dyn ChainReader>,
        store: Arc<dyn DeploymentStore>,
        notifier: Arc<dyn Notifier>,
        settings: DeploymentSettings,
    ) -> Self {
        Self {
            wallet,
            chain,
            store,
            notifier,
            settings,
            tracker: RwLock::new(Tracker {
                status: DeploymentStatus::Idle,
                generation: 0,
                cancelled: None,
                tracked: None,
            }),
            persist_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &DeploymentSettings {
        &self.settings
    }

    pub async fn status(&self) -> DeploymentStatus {
        self.tracker.read().await.status.clone()
    }

    pub async fn recent_tokens(&self) -> Result<Vec<DeployedToken>> {
        Ok(self.store.load().await?.recent_tokens)
    }

    /// Submit, wait for the receipt and record the token
    pub async fn deploy(&self, request: &TokenCreationRequest) -> DeploymentStatus {
        match self.submit(request).await {
            Ok(tx_hash) => self.track(tx_hash).await,
            Err(_) => self.status().await,
        }
    }

    /// Validate, check the wallet and broadcast. Returns the transaction hash.
    pub async fn submit(&self, request: &TokenCreationRequest) -> Result<TxHash, DeployError> {
        let prepared = self.prepare(request).await?;
        self.broadcast(prepared).await
    }

    /// Validate the request and check the wallet, then claim the submission slot.
    /// Failures are reported without a transition.
    pub async fn prepare(
        &self,
        request: &TokenCreationRequest,
    ) -> Result<PreparedDeployment, DeployError> {
        let result = self.try_prepare(request).await;
        if let Err(err) = &result {
            warn!("Deployment blocked: {}", err);
            self.notify(Notification::error(err.to_string())).await;
        }
        result
    }

    async fn try_prepare(
        &self,
        request: &TokenCreationRequest,
    ) -> Result<PreparedDeployment, DeployError> {
        let validated = validate_request(request)?;

        if self.wallet.address().is_none() {
            return Err(DeployError::WalletNotConnected);
        }
        let actual = self
            .wallet
            .chain_id()
            .await
            .map_err(|e| DeployError::WalletUnavailable(e.to_string()))?;
        if actual != self.settings.required_chain_id {
            return Err(DeployError::WrongNetwork {
                expected: self.settings.required_chain_id,
                actual,
            });
        }

        let mut tracker = self.tracker.write().await;
        if tracker.status.is_in_flight() {
            return Err(DeployError::Busy);
        }
        tracker.generation += 1;
        tracker.status = DeploymentStatus::Submitting {
            symbol: validated.symbol.clone(),
        };
        Ok(PreparedDeployment {
            request: validated,
            generation: tracker.generation,
        })
    }

    /// Send `createErc20` for a prepared request unless it was cancelled first
    pub async fn broadcast(&self, prepared: PreparedDeployment) -> Result<TxHash, DeployError> {
        let generation = prepared.generation;
        let result = self.try_broadcast(prepared).await;
        if let Err(err) = &result {
            self.report_failure(generation, None, err).await;
        }
        result
    }

    async fn try_broadcast(&self, prepared: PreparedDeployment) -> Result<TxHash, DeployError> {
        let PreparedDeployment {
            request,
            generation,
        } = prepared;

        if !self.tracker.read().await.is_live(generation) {
            return Err(DeployError::Cancelled);
        }

        info!(
            "Submitting createErc20 for {} ({}), supply {} with {} decimals",
            request.name, request.symbol, request.total_supply, request.decimals
        );
        let tx_hash = self
            .wallet
            .create_erc20(&request)
            .await
            .map_err(|err| match err {
                WalletError::Rejected => DeployError::Rejected,
                WalletError::Overloaded(message) => DeployError::Overloaded(message),
                WalletError::Other(message) => DeployError::Broadcast(message),
            })?;
        info!("Token creation broadcast: {:?}", tx_hash);

        self.remember_pending(PendingDeployment::new(&request, tx_hash))
            .await;

        let cancelled = {
            let mut tracker = self.tracker.write().await;
            if tracker.generation != generation {
                None
            } else if tracker.cancelled == Some(generation) {
                tracker.status = DeploymentStatus::Cancelled {
                    tx_hash: Some(tx_hash),
                };
                Some(true)
            } else {
                tracker.status = DeploymentStatus::AwaitingConfirmation {
                    tx_hash,
                    attempts: 0,
                };
                Some(false)
            }
        };

        match cancelled {
            Some(true) => {
                self.notify(Notification::info(format!(
                    "Stopped tracking transaction {:?}. It may still be confirmed on-chain.",
                    tx_hash
                )))
                .await
            }
            Some(false) => {
                self.notify(Notification::info(format!(
                    "Transaction submitted: {:?}. Waiting for confirmation...",
                    tx_hash
                )))
                .await
            }
            None => {}
        }
        Ok(tx_hash)
    }

    async fn remember_pending(&self, pending: PendingDeployment) {
        let _guard = self.persist_lock.lock().await;
        let result = async {
            let mut state = self.store.load().await?;
            state.add_pending(pending);
            self.store.save(&state).await
        }
        .await;
        if let Err(e) = result {
            error!("Failed to persist pending deployment: {}", e);
        }
    }

    /// Wait for the receipt, then resolve it. Failures end up in the status.
    ///
    /// Does nothing unless `tx_hash` is the handle currently awaiting confirmation.
    pub async fn track(&self, tx_hash: TxHash) -> DeploymentStatus {
        let Some(run) = self.begin_tracking(tx_hash).await else {
            debug!("Not tracking {:?}, it is not awaiting confirmation", tx_hash);
            return self.status().await;
        };

        let result = match self.await_confirmation(run).await {
            Ok(receipt) => self.resolve(run, &receipt).await.map(|_| ()),
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            self.report_failure(run.generation, Some(tx_hash), &err).await;
        }
        self.status().await
    }

    /// Claim the confirmation wait for `tx_hash`; at most one run per generation
    pub async fn begin_tracking(&self, tx_hash: TxHash) -> Option<TrackingRun> {
        let mut tracker = self.tracker.write().await;
        let generation = tracker.generation;
        let awaiting = matches!(
            &tracker.status,
            DeploymentStatus::AwaitingConfirmation { tx_hash: current, .. } if *current == tx_hash
        );
        if !awaiting || !tracker.is_live(generation) || tracker.tracked == Some(generation) {
            return None;
        }
        tracker.tracked = Some(generation);
        Some(TrackingRun {
            tx_hash,
            generation,
        })
    }

    /// Poll for the receipt within the configured window and attempt budget
    pub async fn await_confirmation(&self, run: TrackingRun) -> Result<TxReceipt, DeployError> {
        let outcome = match timeout(self.settings.confirmation_timeout, self.poll_for_receipt(run))
            .await
        {
            Ok(outcome) => outcome?,
            Err(_) => None,
        };

        match outcome {
            Some(receipt) => {
                debug!(
                    "Receipt for {:?} observed in block {:?}",
                    run.tx_hash, receipt.block_number
                );
                Ok(receipt)
            }
            None => Err(DeployError::Timeout(self.timeout_reason(run.tx_hash).await)),
        }
    }

    async fn poll_for_receipt(&self, run: TrackingRun) -> Result<Option<TxReceipt>, DeployError> {
        let max_attempts = self.settings.max_poll_attempts;
        for attempt in 1..=max_attempts {
            if let Some(receipt) = self.poll_once(run, attempt).await? {
                return Ok(Some(receipt));
            }
            if attempt < max_attempts {
                sleep(self.settings.poll_interval).await;
            }
        }
        Ok(None)
    }

    /// One receipt lookup. Lookup errors count as "not yet".
    pub async fn poll_once(
        &self,
        run: TrackingRun,
        attempt: u32,
    ) -> Result<Option<TxReceipt>, DeployError> {
        {
            let mut tracker = self.tracker.write().await;
            if !tracker.is_live(run.generation) {
                return Err(DeployError::Cancelled);
            }
            if let DeploymentStatus::AwaitingConfirmation { attempts, .. } = &mut tracker.status {
                *attempts = attempt;
            }
        }

        match self.chain.transaction_receipt(run.tx_hash).await {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                warn!(
                    "Receipt lookup {} for {:?} failed: {}",
                    attempt, run.tx_hash, e
                );
                Ok(None)
            }
        }
    }

    async fn timeout_reason(&self, tx_hash: TxHash) -> String {
        let waited = self.settings.confirmation_timeout.as_secs();
        match self.chain.transaction_known(tx_hash).await {
            Ok(true) => format!(
                "Transaction {:?} is still pending after {}s. It may confirm later, check it in the explorer.",
                tx_hash, waited
            ),
            Ok(false) => format!(
                "Transaction {:?} was not found on the node after {}s.",
                tx_hash, waited
            ),
            Err(e) => {
                warn!("Could not look up transaction {:?}: {}", tx_hash, e);
                format!(
                    "Timed out waiting for transaction {:?} after {}s.",
                    tx_hash, waited
                )
            }
        }
    }

    /// Turn an observed receipt into a recorded token, at most once per transaction
    pub async fn resolve(
        &self,
        run: TrackingRun,
        receipt: &TxReceipt,
    ) -> Result<DeployedToken, DeployError> {
        let tx_hash = run.tx_hash;
        if receipt.tx_hash != tx_hash {
            return Err(DeployError::UnknownTransaction(receipt.tx_hash));
        }

        {
            let mut tracker = self.tracker.write().await;
            if !tracker.is_live(run.generation) {
                return Err(DeployError::Cancelled);
            }
            tracker.status = DeploymentStatus::Resolving { tx_hash };
        }

        let token = {
            let _guard = self.persist_lock.lock().await;
            let mut state = self
                .store
                .load()
                .await
                .map_err(|e| DeployError::Store(e.to_string()))?;

            if state.is_processed(&tx_hash) || state.find_by_tx(&tx_hash).is_some() {
                info!("Transaction {:?} already processed, skipping", tx_hash);
                let token = state
                    .find_by_tx(&tx_hash)
                    .cloned()
                    .ok_or(DeployError::AlreadyProcessed(tx_hash))?;
                self.set_status_if_current(
                    run.generation,
                    DeploymentStatus::Succeeded {
                        token: token.clone(),
                    },
                )
                .await;
                return Ok(token);
            }

            if !receipt.success {
                return Err(DeployError::Reverted(tx_hash));
            }

            let address = extract_token_address(&receipt.logs, self.settings.factory_address)
                .ok_or(DeployError::ExtractionFailed(tx_hash))?;

            let pending = state
                .find_pending(&tx_hash)
                .cloned()
                .ok_or(DeployError::UnknownTransaction(tx_hash))?;

            let token = DeployedToken::new(address, &pending);
            state.record(token.clone());
            self.store
                .save(&state)
                .await
                .map_err(|e| DeployError::Store(e.to_string()))?;
            token
        };

        info!(
            "Token {} deployed at {} in {:?}",
            token.symbol, token.address, tx_hash
        );
        self.set_status_if_current(
            run.generation,
            DeploymentStatus::Succeeded {
                token: token.clone(),
            },
        )
        .await;
        self.notify(Notification::success(format!(
            "Token {} deployed at {}",
            token.symbol, token.address
        )))
        .await;
        Ok(token)
    }

    /// Stop the current deployment. After broadcast only local tracking stops.
    pub async fn cancel(&self) -> DeploymentStatus {
        let (status, stopped) = {
            let mut tracker = self.tracker.write().await;
            let generation = tracker.generation;
            let stopped = match tracker.status.clone() {
                DeploymentStatus::Submitting { .. } => {
                    tracker.cancelled = Some(generation);
                    None
                }
                DeploymentStatus::AwaitingConfirmation { tx_hash, .. } => {
                    tracker.cancelled = Some(generation);
                    tracker.status = DeploymentStatus::Cancelled {
                        tx_hash: Some(tx_hash),
                    };
                    Some(tx_hash)
                }
                _ => None,
            };
            (tracker.status.clone(), stopped)
        };

        if let Some(tx_hash) = stopped {
            info!("Stopped tracking {:?}", tx_hash);
            self.notify(Notification::info(format!(
                "Stopped tracking transaction {:?}. It may still be confirmed on-chain.",
                tx_hash
            )))
            .await;
        }
        status
    }

    /// Re-enter confirmation tracking for a handle broadcast earlier, e.g. after a
    /// timeout or a restart. The caller follows up with [`track`](Self::track).
    pub async fn resume(&self, tx_hash: TxHash) -> Result<(), DeployError> {
        let state = self
            .store
            .load()
            .await
            .map_err(|e| DeployError::Store(e.to_string()))?;
        if !state.knows(&tx_hash) {
            return Err(DeployError::UnknownTransaction(tx_hash));
        }

        let mut tracker = self.tracker.write().await;
        if tracker.status.is_in_flight() {
            return Err(DeployError::Busy);
        }
        tracker.generation += 1;
        tracker.status = DeploymentStatus::AwaitingConfirmation {
            tx_hash,
            attempts: 0,
        };
        info!("Resumed tracking {:?}", tx_hash);
        Ok(())
    }

    /// Record a failure of the given generation. Outcomes of superseded work are dropped.
    async fn report_failure(&self, generation: u64, tx_hash: Option<TxHash>, err: &DeployError) {
        let status = match err {
            DeployError::Rejected => DeploymentStatus::Idle,
            DeployError::Cancelled => DeploymentStatus::Cancelled { tx_hash },
            DeployError::Timeout(reason) => match tx_hash {
                Some(tx_hash) => DeploymentStatus::TimedOut {
                    tx_hash,
                    reason: reason.clone(),
                },
                None => DeploymentStatus::Failed {
                    tx_hash,
                    reason: reason.clone(),
                },
            },
            other => DeploymentStatus::Failed {
                tx_hash,
                reason: other.to_string(),
            },
        };

        if !self.set_status_if_current(generation, status).await {
            debug!(
                "Dropping outcome of superseded deployment {:?}: {}",
                tx_hash, err
            );
            return;
        }

        match err {
            DeployError::Rejected => info!("User declined the transaction"),
            DeployError::Cancelled => {
                if tx_hash.is_none() {
                    self.notify(Notification::info("Deployment cancelled")).await;
                }
            }
            DeployError::Timeout(reason) => {
                warn!("{}", reason);
                self.notify(Notification::error(reason.clone())).await;
            }
            other => {
                error!("Deployment failed: {}", other);
                self.notify(Notification::error(other.to_string())).await;
            }
        }
    }

    async fn set_status_if_current(&self, generation: u64, status: DeploymentStatus) -> bool {
        let mut tracker = self.tracker.write().await;
        if tracker.generation != generation {
            return false;
        }
        tracker.status = status;
        true
    }

    async fn notify(&self, notification: Notification) {
        self.notifier.notify(notification).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ReceiptLog;
    use crate::deployment::state::{DeploymentState, MemoryDeploymentStore};
    use crate::governance::ProposalRecord;
    use crate::services::notifier::NotificationLevel;
    use alloy::primitives::{address, Bytes, B256};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    const FACTORY: Address = address!("0x0000000000000000000000000000000000000806");
    const TOKEN: Address = address!("0x1f9840a85d5af5bf1d1762f925bdaddc4201f984");
    const OTHER_TOKEN: Address = address!("0x6b175474e89094c44da98b954eedeac495271d0f");
    const CHAIN_ID: u64 = 42000;

    struct FakeWallet {
        account: Option<Address>,
        chain_id: u64,
        outcome: std::sync::Mutex<Result<TxHash, WalletError>>,
        broadcasts: AtomicUsize,
    }

    impl FakeWallet {
        fn returning(outcome: Result<TxHash, WalletError>) -> Self {
            Self {
                account: Some(address!("0x00000000000000000000000000000000000000aa")),
                chain_id: CHAIN_ID,
                outcome: std::sync::Mutex::new(outcome),
                broadcasts: AtomicUsize::new(0),
            }
        }

        fn set_outcome(&self, outcome: Result<TxHash, WalletError>) {
            *self.outcome.lock().unwrap() = outcome;
        }

        fn broadcasts(&self) -> usize {
            self.broadcasts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Wallet for FakeWallet {
        fn address(&self) -> Option<Address> {
            self.account
        }

        async fn chain_id(&self) -> Result<u64> {
            Ok(self.chain_id)
        }

        async fn create_erc20(&self, _request: &ValidatedRequest) -> Result<TxHash, WalletError> {
            self.broadcasts.fetch_add(1, Ordering::SeqCst);
            self.outcome.lock().unwrap().clone()
        }
    }

    /// Holds the broadcast open until released
    #[derive(Default)]
    struct GatedWallet {
        entered: Notify,
        release: Notify,
        broadcasts: AtomicUsize,
    }

    #[async_trait]
    impl Wallet for GatedWallet {
        fn address(&self) -> Option<Address> {
            Some(address!("0x00000000000000000000000000000000000000aa"))
        }

        async fn chain_id(&self) -> Result<u64> {
            Ok(CHAIN_ID)
        }

        async fn create_erc20(&self, _request: &ValidatedRequest) -> Result<TxHash, WalletError> {
            self.broadcasts.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(tx())
        }
    }

    #[derive(Default)]
    struct FakeChain {
        receipts: std::sync::Mutex<HashMap<TxHash, TxReceipt>>,
        known: bool,
        lookups: AtomicUsize,
    }

    impl FakeChain {
        fn with_receipt(receipt: TxReceipt) -> Self {
            let chain = Self::default();
            chain.add_receipt(receipt);
            chain
        }

        fn add_receipt(&self, receipt: TxReceipt) {
            self.receipts
                .lock()
                .unwrap()
                .insert(receipt.tx_hash, receipt);
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChainReader for FakeChain {
        async fn chain_id(&self) -> Result<u64> {
            Ok(CHAIN_ID)
        }

        async fn block_number(&self) -> Result<u64> {
            Ok(1)
        }

        async fn gas_price(&self) -> Result<u128> {
            Ok(1)
        }

        async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
        }

        async fn transaction_known(&self, _tx_hash: TxHash) -> Result<bool> {
            Ok(self.known)
        }

        async fn proposals(&self, _page: u64, _page_size: u64) -> Result<Vec<ProposalRecord>> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct Recorder(std::sync::Mutex<Vec<Notification>>);

    impl Recorder {
        fn levels(&self) -> Vec<NotificationLevel> {
            self.0.lock().unwrap().iter().map(|n| n.level).collect()
        }
    }

    #[async_trait]
    impl Notifier for Recorder {
        async fn notify(&self, notification: Notification) {
            self.0.lock().unwrap().push(notification);
        }
    }

    struct Harness {
        orchestrator: Arc<DeploymentOrchestrator>,
        wallet: Arc<FakeWallet>,
        chain: Arc<FakeChain>,
        store: Arc<MemoryDeploymentStore>,
        notes: Arc<Recorder>,
    }

    fn settings() -> DeploymentSettings {
        DeploymentSettings {
            required_chain_id: CHAIN_ID,
            factory_address: FACTORY,
            confirmation_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(1),
            max_poll_attempts: 3,
        }
    }

    fn harness(wallet: FakeWallet, chain: FakeChain, store: MemoryDeploymentStore) -> Harness {
        harness_with(settings(), wallet, chain, store)
    }

    fn harness_with(
        settings: DeploymentSettings,
        wallet: FakeWallet,
        chain: FakeChain,
        store: MemoryDeploymentStore,
    ) -> Harness {
        let wallet = Arc::new(wallet);
        let chain = Arc::new(chain);
        let store = Arc::new(store);
        let notes = Arc::new(Recorder::default());
        let orchestrator = Arc::new(DeploymentOrchestrator::new(
            wallet.clone(),
            chain.clone(),
            store.clone(),
            notes.clone(),
            settings,
        ));
        Harness {
            orchestrator,
            wallet,
            chain,
            store,
            notes,
        }
    }

    fn request() -> TokenCreationRequest {
        TokenCreationRequest {
            name: "Helios Test".to_string(),
            symbol: "HLT".to_string(),
            denom: "ahlt".to_string(),
            total_supply: "1000000".to_string(),
            decimals: 18,
            logo_base64: None,
        }
    }

    fn tx() -> TxHash {
        TxHash::repeat_byte(0x11)
    }

    fn other_tx() -> TxHash {
        TxHash::repeat_byte(0x22)
    }

    fn receipt_creating(tx_hash: TxHash, token: Address) -> TxReceipt {
        let mut word = vec![0u8; 12];
        word.extend_from_slice(token.as_slice());
        TxReceipt {
            tx_hash,
            block_number: Some(10),
            success: true,
            logs: vec![ReceiptLog::new(FACTORY, vec![], Bytes::from(word))],
        }
    }

    fn factory_receipt(tx_hash: TxHash) -> TxReceipt {
        receipt_creating(tx_hash, TOKEN)
    }

    #[tokio::test]
    async fn test_successful_deployment() {
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            FakeChain::with_receipt(factory_receipt(tx())),
            MemoryDeploymentStore::new(),
        );

        let status = h.orchestrator.deploy(&request()).await;

        let DeploymentStatus::Succeeded { token } = status else {
            panic!("expected success, got {:?}", status);
        };
        assert_eq!(token.address, "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984");
        assert_eq!(token.symbol, "HLT");
        assert_eq!(token.tx_hash, format!("{:?}", tx()));

        let state = h.store.load().await.unwrap();
        assert_eq!(state.recent_tokens.len(), 1);
        assert!(state.is_processed(&tx()));
        assert!(state.pending.is_empty());
        assert_eq!(
            h.notes.levels(),
            vec![NotificationLevel::Info, NotificationLevel::Success]
        );
    }

    #[tokio::test]
    async fn test_invalid_request_never_broadcasts() {
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            FakeChain::default(),
            MemoryDeploymentStore::new(),
        );
        let mut req = request();
        req.denom = "Bad Denom".to_string();

        let err = h.orchestrator.submit(&req).await.unwrap_err();

        assert!(matches!(err, DeployError::Validation(_)));
        assert_eq!(h.wallet.broadcasts(), 0);
        assert_eq!(h.orchestrator.status().await, DeploymentStatus::Idle);
        assert_eq!(h.notes.levels(), vec![NotificationLevel::Error]);
    }

    #[tokio::test]
    async fn test_preconditions_block_submission() {
        let mut wallet = FakeWallet::returning(Ok(tx()));
        wallet.account = None;
        let h = harness(wallet, FakeChain::default(), MemoryDeploymentStore::new());
        let err = h.orchestrator.submit(&request()).await.unwrap_err();
        assert_eq!(err, DeployError::WalletNotConnected);
        assert_eq!(h.wallet.broadcasts(), 0);

        let mut wallet = FakeWallet::returning(Ok(tx()));
        wallet.chain_id = 1;
        let h = harness(wallet, FakeChain::default(), MemoryDeploymentStore::new());
        let err = h.orchestrator.submit(&request()).await.unwrap_err();
        assert_eq!(
            err,
            DeployError::WrongNetwork {
                expected: CHAIN_ID,
                actual: 1
            }
        );
        assert_eq!(h.wallet.broadcasts(), 0);
        assert_eq!(h.orchestrator.status().await, DeploymentStatus::Idle);
    }

    #[tokio::test]
    async fn test_user_rejection_is_silent() {
        let h = harness(
            FakeWallet::returning(Err(WalletError::Rejected)),
            FakeChain::default(),
            MemoryDeploymentStore::new(),
        );

        let err = h.orchestrator.submit(&request()).await.unwrap_err();

        assert_eq!(err, DeployError::Rejected);
        assert_eq!(h.orchestrator.status().await, DeploymentStatus::Idle);
        assert!(h.notes.levels().is_empty());
    }

    #[tokio::test]
    async fn test_overloaded_provider_gets_retry_message() {
        let h = harness(
            FakeWallet::returning(Err(WalletError::Overloaded("429".to_string()))),
            FakeChain::default(),
            MemoryDeploymentStore::new(),
        );

        h.orchestrator.submit(&request()).await.unwrap_err();

        let notes = h.notes.0.lock().unwrap().clone();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, crate::deployment::error::OVERLOADED_MESSAGE);
        assert!(matches!(
            h.orchestrator.status().await,
            DeploymentStatus::Failed { tx_hash: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_second_submission_is_rejected_while_in_flight() {
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            FakeChain::default(),
            MemoryDeploymentStore::new(),
        );

        h.orchestrator.submit(&request()).await.unwrap();
        let err = h.orchestrator.submit(&request()).await.unwrap_err();

        assert_eq!(err, DeployError::Busy);
        assert_eq!(h.wallet.broadcasts(), 1);
        assert_eq!(
            h.orchestrator.status().await,
            DeploymentStatus::AwaitingConfirmation {
                tx_hash: tx(),
                attempts: 0
            }
        );
    }

    #[tokio::test]
    async fn test_missing_receipt_times_out_and_keeps_handle() {
        let chain = FakeChain {
            known: true,
            ..Default::default()
        };
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            chain,
            MemoryDeploymentStore::new(),
        );

        let status = h.orchestrator.deploy(&request()).await;

        let DeploymentStatus::TimedOut { tx_hash, reason } = status else {
            panic!("expected timeout, got {:?}", status);
        };
        assert_eq!(tx_hash, tx());
        assert!(reason.contains("still pending"));
        assert_eq!(h.chain.lookups(), 3);
        let state = h.store.load().await.unwrap();
        assert!(state.recent_tokens.is_empty());
        assert!(state.find_pending(&tx()).is_some());
    }

    #[tokio::test]
    async fn test_unknown_handle_timeout_reason() {
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            FakeChain::default(),
            MemoryDeploymentStore::new(),
        );
        let status = h.orchestrator.deploy(&request()).await;
        let DeploymentStatus::TimedOut { reason, .. } = status else {
            panic!("expected timeout, got {:?}", status);
        };
        assert!(reason.contains("not found"));
    }

    #[tokio::test]
    async fn test_unrecognised_receipt_fails_without_panicking() {
        let receipt = TxReceipt {
            tx_hash: tx(),
            block_number: Some(10),
            success: true,
            logs: vec![ReceiptLog::new(TOKEN, vec![B256::ZERO], Bytes::new())],
        };
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            FakeChain::with_receipt(receipt),
            MemoryDeploymentStore::new(),
        );

        let status = h.orchestrator.deploy(&request()).await;

        assert_eq!(
            status,
            DeploymentStatus::Failed {
                tx_hash: Some(tx()),
                reason: "Could not determine deployed token address".to_string(),
            }
        );
        assert!(h.store.load().await.unwrap().recent_tokens.is_empty());
    }

    #[tokio::test]
    async fn test_reverted_receipt_fails() {
        let mut receipt = factory_receipt(tx());
        receipt.success = false;
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            FakeChain::with_receipt(receipt),
            MemoryDeploymentStore::new(),
        );

        let status = h.orchestrator.deploy(&request()).await;

        assert!(matches!(status, DeploymentStatus::Failed { tx_hash: Some(_), .. }));
    }

    #[tokio::test]
    async fn test_replayed_handle_is_not_recorded_twice() {
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            FakeChain::with_receipt(factory_receipt(tx())),
            MemoryDeploymentStore::new(),
        );

        h.orchestrator.deploy(&request()).await;
        h.orchestrator.resume(tx()).await.unwrap();
        let replayed = h.orchestrator.track(tx()).await;

        let DeploymentStatus::Succeeded { token } = replayed else {
            panic!("expected the recorded token, got {:?}", replayed);
        };
        assert_eq!(token.tx_hash, format!("{:?}", tx()));
        assert_eq!(h.store.load().await.unwrap().recent_tokens.len(), 1);
    }

    #[tokio::test]
    async fn test_processed_marker_survives_restart() {
        let mut state = DeploymentState::default();
        state.record(DeployedToken {
            address: format!("{:?}", TOKEN),
            name: "Helios Test".to_string(),
            symbol: "HLT".to_string(),
            denom: "ahlt".to_string(),
            total_supply: "1000000".to_string(),
            decimals: 18,
            logo_base64: None,
            tx_hash: format!("{:?}", tx()),
            timestamp: 1,
        });
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            FakeChain::with_receipt(factory_receipt(tx())),
            MemoryDeploymentStore::with_state(state),
        );

        h.orchestrator.resume(tx()).await.unwrap();
        let status = h.orchestrator.track(tx()).await;

        assert!(matches!(status, DeploymentStatus::Succeeded { .. }));
        assert_eq!(h.store.load().await.unwrap().recent_tokens.len(), 1);
    }

    #[tokio::test]
    async fn test_timed_out_handle_can_be_resumed_after_another_deployment() {
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            FakeChain::default(),
            MemoryDeploymentStore::new(),
        );

        let first = h.orchestrator.deploy(&request()).await;
        assert!(matches!(first, DeploymentStatus::TimedOut { .. }));

        h.wallet.set_outcome(Ok(other_tx()));
        h.chain.add_receipt(receipt_creating(other_tx(), OTHER_TOKEN));
        let second = h.orchestrator.deploy(&request()).await;
        assert!(matches!(second, DeploymentStatus::Succeeded { .. }));

        // a fresh process over the same store still knows the first handle
        let restarted = DeploymentOrchestrator::new(
            h.wallet.clone(),
            h.chain.clone(),
            h.store.clone(),
            h.notes.clone(),
            settings(),
        );
        h.chain.add_receipt(factory_receipt(tx()));
        restarted.resume(tx()).await.unwrap();
        let status = restarted.track(tx()).await;

        let DeploymentStatus::Succeeded { token } = status else {
            panic!("expected the first token, got {:?}", status);
        };
        assert_eq!(token.address, "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984");
        let state = h.store.load().await.unwrap();
        assert_eq!(state.recent_tokens.len(), 2);
        assert!(state.pending.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_broadcast_only_stops_tracking() {
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            FakeChain::with_receipt(factory_receipt(tx())),
            MemoryDeploymentStore::new(),
        );

        let tx_hash = h.orchestrator.submit(&request()).await.unwrap();
        let cancelled = h.orchestrator.cancel().await;
        assert_eq!(
            cancelled,
            DeploymentStatus::Cancelled {
                tx_hash: Some(tx_hash)
            }
        );

        let status = h.orchestrator.track(tx_hash).await;
        assert_eq!(status, cancelled);
        assert_eq!(h.chain.lookups(), 0);

        // the handle is still usable for manual follow-up
        h.orchestrator.resume(tx_hash).await.unwrap();
        let status = h.orchestrator.track(tx_hash).await;
        assert!(matches!(status, DeploymentStatus::Succeeded { .. }));
    }

    #[tokio::test]
    async fn test_cancel_before_broadcast_sends_nothing() {
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            FakeChain::default(),
            MemoryDeploymentStore::new(),
        );

        let prepared = h.orchestrator.prepare(&request()).await.unwrap();
        assert_eq!(prepared.request().symbol, "HLT");
        let during = h.orchestrator.cancel().await;
        assert!(matches!(during, DeploymentStatus::Submitting { .. }));

        let err = h.orchestrator.broadcast(prepared).await.unwrap_err();

        assert_eq!(err, DeployError::Cancelled);
        assert_eq!(h.wallet.broadcasts(), 0);
        assert_eq!(
            h.orchestrator.status().await,
            DeploymentStatus::Cancelled { tx_hash: None }
        );
        assert_eq!(h.notes.levels(), vec![NotificationLevel::Info]);

        // the cancellation does not leak into the next submission
        let tx_hash = h.orchestrator.submit(&request()).await.unwrap();
        assert_eq!(h.wallet.broadcasts(), 1);
        assert_eq!(
            h.orchestrator.status().await,
            DeploymentStatus::AwaitingConfirmation {
                tx_hash,
                attempts: 0
            }
        );
    }

    #[tokio::test]
    async fn test_cancel_during_wallet_call_keeps_handle() {
        let wallet = Arc::new(GatedWallet::default());
        let chain = Arc::new(FakeChain::with_receipt(factory_receipt(tx())));
        let orchestrator = DeploymentOrchestrator::new(
            wallet.clone(),
            chain.clone(),
            Arc::new(MemoryDeploymentStore::new()),
            Arc::new(Recorder::default()),
            settings(),
        );
        let req = request();

        let (submitted, during) = tokio::join!(orchestrator.submit(&req), async {
            wallet.entered.notified().await;
            let status = orchestrator.cancel().await;
            wallet.release.notify_one();
            status
        });

        assert!(matches!(during, DeploymentStatus::Submitting { .. }));
        assert_eq!(submitted.unwrap(), tx());
        assert_eq!(wallet.broadcasts.load(Ordering::SeqCst), 1);
        assert_eq!(
            orchestrator.status().await,
            DeploymentStatus::Cancelled {
                tx_hash: Some(tx())
            }
        );

        orchestrator.track(tx()).await;
        assert_eq!(chain.lookups(), 0);

        orchestrator.resume(tx()).await.unwrap();
        let status = orchestrator.track(tx()).await;
        assert!(matches!(status, DeploymentStatus::Succeeded { .. }));
    }

    #[tokio::test]
    async fn test_stale_tracking_does_not_touch_newer_deployment() {
        let mut slow = settings();
        slow.poll_interval = Duration::from_millis(20);
        slow.max_poll_attempts = 100;
        let h = harness_with(
            slow,
            FakeWallet::returning(Ok(tx())),
            FakeChain::default(),
            MemoryDeploymentStore::new(),
        );

        let first = h.orchestrator.submit(&request()).await.unwrap();
        let orchestrator = h.orchestrator.clone();
        let stale = tokio::spawn(async move { orchestrator.track(first).await });
        while h.chain.lookups() == 0 {
            sleep(Duration::from_millis(1)).await;
        }

        h.orchestrator.cancel().await;
        h.wallet.set_outcome(Ok(other_tx()));
        let second = h.orchestrator.submit(&request()).await.unwrap();
        h.chain.add_receipt(factory_receipt(first));

        stale.await.unwrap();

        assert_eq!(
            h.orchestrator.status().await,
            DeploymentStatus::AwaitingConfirmation {
                tx_hash: second,
                attempts: 0
            }
        );
        assert_eq!(
            h.orchestrator.submit(&request()).await.unwrap_err(),
            DeployError::Busy
        );
        let state = h.store.load().await.unwrap();
        assert!(state.find_pending(&first).is_some());
        assert!(state.recent_tokens.is_empty());
    }

    #[tokio::test]
    async fn test_resume_unknown_handle() {
        let h = harness(
            FakeWallet::returning(Ok(tx())),
            FakeChain::default(),
            MemoryDeploymentStore::new(),
        );
        let err = h.orchestrator.resume(other_tx()).await.unwrap_err();
        assert_eq!(err, DeployError::UnknownTransaction(other_tx()));
    }

    #[test]
    fn test_status_serialization() {
        let status = DeploymentStatus::AwaitingConfirmation {
            tx_hash: tx(),
            attempts: 2,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "awaiting_confirmation");
        assert_eq!(json["attempts"], 2);
        assert_eq!(json["tx_hash"], format!("{:?}", tx()));
    }
}
