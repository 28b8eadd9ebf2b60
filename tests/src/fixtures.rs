//! Shared test fixtures
//!
//! Everything here runs against the in-memory adapters.

use qc_17_block_generation::adapters::{
    EmptyPayloadProvider, FixedScheduleProvider, InMemoryChainStore, InMemoryMempool,
    StateVerifier,
};
use qc_17_block_generation::{
    ChainGenerator, GenerationConfig, GenerationDependencies, GenerationParameters, GenesisSpec,
    LeaderScheduleProvider, PayloadProvider, SecretKeyRegistry,
};
use shared_crypto::Ed25519KeyPair;
use shared_types::{Block, Blund, EpochIndex, EpochOrSlot, StakeholderId};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Generator wired to in-memory store, verifier and mempool
pub type MemGenerator<L = FixedScheduleProvider, P = EmptyPayloadProvider> = ChainGenerator<
    InMemoryChainStore,
    StateVerifier<InMemoryChainStore>,
    L,
    P,
    InMemoryMempool<InMemoryChainStore>,
>;

/// Route `tracing` output through the test harness
///
/// Filter with `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deterministic key number `i`
pub fn key(i: u64) -> Ed25519KeyPair {
    Ed25519KeyPair::derive("qc-tests", i)
}

/// Stakeholder identity of [`key`]`(i)`
pub fn id(i: u64) -> StakeholderId {
    StakeholderId::from_public_key(&key(i).public_key())
}

/// Registry holding keys `indices`
pub fn secrets(indices: impl IntoIterator<Item = u64>) -> SecretKeyRegistry {
    indices.into_iter().map(key).collect()
}

/// Config with `epoch_length` slots per epoch, defaults otherwise
pub fn config(epoch_length: u32) -> GenerationConfig {
    GenerationConfig {
        epoch_length,
        ..GenerationConfig::default()
    }
}

/// Genesis giving `stake` coins to each of keys `0..holders`
pub fn genesis(start_epoch: EpochIndex, holders: u64, stake: u64) -> GenesisSpec {
    GenesisSpec {
        start_epoch,
        balances: (0..holders).map(|i| (id(i), stake)).collect(),
        ..GenesisSpec::default()
    }
}

/// Bootstrapped store
pub fn store(spec: GenesisSpec) -> Arc<InMemoryChainStore> {
    Arc::new(InMemoryChainStore::bootstrap(spec).expect("valid genesis"))
}

/// Generator over `store` with its own mempool
pub fn generator<L, P>(
    store: &Arc<InMemoryChainStore>,
    schedule: Arc<L>,
    payload: Arc<P>,
    config: GenerationConfig,
) -> MemGenerator<L, P>
where
    L: LeaderScheduleProvider,
    P: PayloadProvider,
{
    let mempool = Arc::new(InMemoryMempool::new(store.clone()));
    generator_with_mempool(store, schedule, payload, mempool, config)
}

/// Generator over `store` normalizing the given `mempool`
pub fn generator_with_mempool<L, P>(
    store: &Arc<InMemoryChainStore>,
    schedule: Arc<L>,
    payload: Arc<P>,
    mempool: Arc<InMemoryMempool<InMemoryChainStore>>,
    config: GenerationConfig,
) -> MemGenerator<L, P>
where
    L: LeaderScheduleProvider,
    P: PayloadProvider,
{
    ChainGenerator::new(GenerationDependencies {
        store: store.clone(),
        verifier: Arc::new(StateVerifier::new(store.clone())),
        schedule,
        payload,
        mempool,
        config,
    })
    .expect("valid config")
}

/// Parameters for `count` points
pub fn params(
    count: u64,
    secrets: SecretKeyRegistry,
    skip_if_no_key: bool,
) -> GenerationParameters {
    GenerationParameters {
        block_count: count,
        secrets,
        skip_if_no_key,
    }
}

/// Fold keeping every outcome, skipped slots included
pub fn outcomes(outcome: Option<Blund>) -> Vec<Option<Blund>> {
    vec![outcome]
}

/// Fold keeping applied blocks only
pub fn applied(outcome: Option<Blund>) -> Vec<Blund> {
    outcome.into_iter().collect()
}

/// Positions of `outcomes`, `None` for skipped slots
pub fn points(outcomes: &[Option<Blund>]) -> Vec<Option<EpochOrSlot>> {
    outcomes
        .iter()
        .map(|o| o.as_ref().map(|b| b.block.point()))
        .collect()
}

/// Producer identity of a main block
pub fn producer(block: &Block) -> Option<StakeholderId> {
    match block {
        Block::Main(main) => Some(main.header.producer()),
        Block::Genesis(_) => None,
    }
}
