//! Integration tests for cross-chain transfers.
//!
//! Run with: cargo test --test integration_test -- --nocapture
//!
//! Each test builds a devnet of two in-process chains (ids 1 and 2) and
//! drives the real relayer service over them: watcher tasks, the submit
//! queue, gateway signing, and retry all run exactly as in production.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use a721_chain::{
    Call, ChainClient, ContractError, Ledger, LedgerConfig, SubmitError, Transaction, TxOutcome,
};
use a721_core::event::{ChainEvent, LoggedEvent};
use a721_core::hash::compute_message_hash;
use a721_core::signer::{GatewaySigner, SignerSet};
use a721_core::types::{ChainId, ItemId};
use a721_relayer::writers::RetryConfig;
use a721_relayer::{RelayerOptions, RelayerService};

const URI: &str = "https://gateway.pinata.cloud/ipfs/uri/{id}.json";

fn admin() -> Address {
    Address::repeat_byte(0xaa)
}

fn alice() -> Address {
    Address::repeat_byte(0x01)
}

fn bob() -> Address {
    Address::repeat_byte(0x02)
}

struct TestNet {
    main: Arc<Ledger>,
    side: Arc<Ledger>,
    gateway: GatewaySigner,
}

impl TestNet {
    /// Two chains (1 and 2), mutually allow-listed, sharing one gateway.
    fn new() -> Self {
        let gateway = GatewaySigner::random();
        let ledger = |id: u64| {
            Arc::new(Ledger::new(LedgerConfig {
                chain_id: ChainId(id),
                admin: admin(),
                gateway_caller: gateway.address(),
                signers: SignerSet::single(gateway.address()),
            }))
        };
        let main = ledger(1);
        let side = ledger(2);
        main.execute(Transaction {
            sender: admin(),
            call: Call::AddChain { chain_id: ChainId(2) },
        })
        .unwrap();
        side.execute(Transaction {
            sender: admin(),
            call: Call::AddChain { chain_id: ChainId(1) },
        })
        .unwrap();
        Self { main, side, gateway }
    }

    fn mint(&self, ledger: &Ledger, owner: Address) -> ItemId {
        let outcome = ledger
            .execute(Transaction {
                sender: admin(),
                call: Call::Mint { owner, uri: URI.into() },
            })
            .unwrap();
        match outcome.events[0].event {
            ChainEvent::Transfer { item_id, .. } => item_id,
            ref other => panic!("expected Transfer, got {other:?}"),
        }
    }

    fn swap(&self, ledger: &Ledger, sender: Address, item_id: ItemId, to: Address, chain_to: u64) {
        ledger
            .execute(Transaction {
                sender,
                call: Call::Swap { item_id, to, chain_to: ChainId(chain_to) },
            })
            .unwrap();
    }

    /// Spawn a relayer over the given clients. Returns the task handle and
    /// its shutdown sender.
    fn spawn_relayer(
        &self,
        clients: Vec<Arc<dyn ChainClient>>,
    ) -> (JoinHandle<eyre::Result<()>>, mpsc::Sender<()>) {
        let options = RelayerOptions {
            poll_interval: Duration::from_millis(10),
            channel_capacity: 64,
            retry: RetryConfig {
                max_retries: 5,
                initial_backoff: Duration::from_millis(10),
                max_backoff: Duration::from_millis(50),
                backoff_multiplier: 2.0,
            },
        };
        let service = RelayerService::new(clients, self.gateway.clone(), options);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let handle = tokio::spawn(service.run(shutdown_rx));
        (handle, shutdown_tx)
    }

    fn both_clients(&self) -> Vec<Arc<dyn ChainClient>> {
        vec![self.main.clone(), self.side.clone()]
    }
}

/// Poll `cond` until it holds or the timeout elapses.
async fn wait_until(cond: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}

async fn stop(handle: JoinHandle<eyre::Result<()>>, shutdown: mpsc::Sender<()>) {
    let _ = shutdown.send(()).await;
    handle.await.unwrap().unwrap();
}

/// Every Transfer event for `item_id` in a log, in order.
fn transfers_for(log: &[LoggedEvent], item_id: ItemId) -> Vec<(Address, Address)> {
    log.iter()
        .filter_map(|entry| match entry.event {
            ChainEvent::Transfer { from, to, item_id: id } if id == item_id => Some((from, to)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_swap_is_settled_on_destination() {
    let net = TestNet::new();

    // Minting twice on chain 1 yields the first two ids of its range
    let item = net.mint(&net.main, alice());
    let second = net.mint(&net.main, alice());
    assert_eq!(item.as_u64(), 10_000);
    assert_eq!(second.as_u64(), 10_001);

    let (handle, shutdown) = net.spawn_relayer(net.both_clients());

    net.swap(&net.main, alice(), item, bob(), 2);

    // Locked at home immediately: held by the bridge, not burned
    assert_eq!(net.main.owner_of(item).unwrap(), net.main.bridge_account());

    let side = net.side.clone();
    assert!(
        wait_until(
            move || side.exists(item) && side.owner_of(item).unwrap() == bob(),
            Duration::from_secs(5)
        )
        .await,
        "swap was not settled on the destination chain"
    );

    // Freshly minted on the destination (transfer out of the zero address),
    // with the metadata carried over verbatim
    assert_eq!(net.side.token_uri(item).unwrap(), URI);
    let transfers = transfers_for(&net.side.events_from(0), item);
    assert_eq!(transfers, vec![(Address::ZERO, bob())]);

    // The settled message hash is consumed on the destination
    let hash = compute_message_hash(item, ChainId(2), ChainId(1), &alice(), &bob(), URI);
    assert!(net.side.is_redeemed(&hash));

    // A replayed redeem fails even with a perfectly valid attestation
    let signature = net.gateway.sign_message_hash(&hash).unwrap();
    let replay = net.side.execute(Transaction {
        sender: net.gateway.address(),
        call: Call::Redeem {
            message_hash: hash,
            signatures: vec![signature],
            item_id: item,
            uri: URI.into(),
            to: bob(),
            chain_from: ChainId(1),
        },
    });
    assert_eq!(replay.unwrap_err(), ContractError::AlreadyRedeemed);

    stop(handle, shutdown).await;
}

#[tokio::test]
async fn test_round_trip_unlocks_at_home() {
    let net = TestNet::new();
    let item = net.mint(&net.main, alice());
    let (handle, shutdown) = net.spawn_relayer(net.both_clients());

    // Out: chain 1 -> chain 2
    net.swap(&net.main, alice(), item, bob(), 2);
    let side = net.side.clone();
    assert!(
        wait_until(move || side.exists(item), Duration::from_secs(5)).await,
        "outbound swap was not settled"
    );

    // Back: chain 2 -> chain 1. The side-chain copy is burned, not locked.
    net.swap(&net.side, bob(), item, alice(), 1);
    assert!(!net.side.exists(item));

    let main = net.main.clone();
    assert!(
        wait_until(
            move || main.owner_of(item).unwrap() == alice(),
            Duration::from_secs(5)
        )
        .await,
        "return swap was not settled"
    );

    // The item came back out of the bridge's custody, it was never
    // re-minted at home: mint, lock, unlock - and nothing from the zero
    // address after the original mint.
    let transfers = transfers_for(&net.main.events_from(0), item);
    assert_eq!(
        transfers,
        vec![
            (Address::ZERO, alice()),
            (alice(), net.main.bridge_account()),
            (net.main.bridge_account(), alice()),
        ]
    );
    assert_eq!(net.main.token_uri(item).unwrap(), URI);

    stop(handle, shutdown).await;
}

#[tokio::test]
async fn test_relayer_restart_redelivers_harmlessly() {
    let net = TestNet::new();
    let item = net.mint(&net.main, alice());

    let (handle, shutdown) = net.spawn_relayer(net.both_clients());
    net.swap(&net.main, alice(), item, bob(), 2);
    let side = net.side.clone();
    assert!(wait_until(move || side.exists(item), Duration::from_secs(5)).await);
    stop(handle, shutdown).await;

    let settled_log_len = net.side.events_from(0).len();

    // A fresh relayer instance starts from cursor 0, re-observes the swap,
    // and re-submits. The destination absorbs the duplicate.
    let (handle, shutdown) = net.spawn_relayer(net.both_clients());
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(net.side.owner_of(item).unwrap(), bob());
    assert_eq!(net.side.events_from(0).len(), settled_log_len);
    assert!(!handle.is_finished(), "relayer must survive redelivery");

    stop(handle, shutdown).await;
}

/// Fails the first `failures` submissions with a transport error, then
/// delegates to the wrapped ledger.
struct FlakyClient {
    inner: Arc<Ledger>,
    failures: AtomicU32,
}

#[async_trait]
impl ChainClient for FlakyClient {
    fn chain_id(&self) -> ChainId {
        ChainClient::chain_id(self.inner.as_ref())
    }

    async fn events_since(&self, cursor: u64) -> Result<Vec<LoggedEvent>, SubmitError> {
        self.inner.events_since(cursor).await
    }

    async fn submit(&self, tx: Transaction) -> Result<TxOutcome, SubmitError> {
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(SubmitError::Transport("connection refused".into()));
        }
        self.inner.submit(tx).await
    }
}

#[tokio::test]
async fn test_transient_submission_failures_are_retried() {
    let net = TestNet::new();
    let item = net.mint(&net.main, alice());

    let flaky_side: Arc<dyn ChainClient> = Arc::new(FlakyClient {
        inner: net.side.clone(),
        failures: AtomicU32::new(3),
    });
    let (handle, shutdown) = net.spawn_relayer(vec![net.main.clone(), flaky_side]);

    net.swap(&net.main, alice(), item, bob(), 2);

    let side = net.side.clone();
    assert!(
        wait_until(
            move || side.exists(item) && side.owner_of(item).unwrap() == bob(),
            Duration::from_secs(5)
        )
        .await,
        "redeem was not retried to completion"
    );

    stop(handle, shutdown).await;
}

#[tokio::test]
async fn test_unknown_destination_is_dropped_not_fatal() {
    let net = TestNet::new();
    let item = net.mint(&net.main, alice());

    // The relayer only has a client for chain 1; chain 2 is unreachable.
    let (handle, shutdown) = net.spawn_relayer(vec![net.main.clone()]);

    net.swap(&net.main, alice(), item, bob(), 2);
    tokio::time::sleep(Duration::from_millis(200)).await;

    // The swap stays locked at home and unsettled, and the service is
    // still alive for everything else.
    assert_eq!(net.main.owner_of(item).unwrap(), net.main.bridge_account());
    assert!(!net.side.exists(item));
    assert!(!handle.is_finished());

    stop(handle, shutdown).await;
}
