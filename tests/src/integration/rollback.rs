//! Undo records: rollback and replay

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use qc_17_block_generation::adapters::{
        FixedScheduleProvider, InMemoryChainStore, TransferPayloadGenerator,
    };
    use qc_17_block_generation::{
        ChainGenerationApi, ChainState, ChainStateStore, GenerationError,
    };
    use shared_types::Blund;
    use std::sync::Arc;

    const HOLDERS: u64 = 3;

    fn transfer_generator(
        store: &Arc<InMemoryChainStore>,
        seed: u64,
    ) -> MemGenerator<FixedScheduleProvider, TransferPayloadGenerator<InMemoryChainStore>> {
        generator(
            store,
            Arc::new(FixedScheduleProvider::round_robin((0..HOLDERS).map(id).collect())),
            Arc::new(TransferPayloadGenerator::new(
                store.clone(),
                secrets(0..HOLDERS),
                4,
                seed,
            )),
            config(3),
        )
    }

    fn assert_same_ledger(left: &ChainState, right: &ChainState) {
        assert_eq!(left.tip(), right.tip());
        assert_eq!(left.stake_distribution(), right.stake_distribution());
        assert_eq!(left.utxo_len(), right.utxo_len());
        for i in 0..HOLDERS {
            assert_eq!(left.unspent_of(&id(i)), right.unspent_of(&id(i)));
        }
    }

    #[tokio::test]
    async fn test_rollback_restores_bootstrap_ledger() {
        init_tracing();
        let store = store(genesis(0, HOLDERS, 500));
        let before = store.snapshot().await.unwrap();
        let generator = transfer_generator(&store, 3);

        let blunds: Vec<Blund> = generator
            .generate_chain(&params(9, secrets(0..HOLDERS), false), applied)
            .await
            .unwrap();
        assert!(blunds.iter().any(|b| b
            .block
            .payload()
            .is_some_and(|p| !p.transactions.is_empty())));

        generator.rollback(&blunds).await.unwrap();

        assert_same_ledger(&store.snapshot().await.unwrap(), &before);
    }

    #[tokio::test]
    async fn test_rollback_must_start_at_tip() {
        init_tracing();
        let store = store(genesis(0, HOLDERS, 500));
        let generator = transfer_generator(&store, 3);

        let blunds: Vec<Blund> = generator
            .generate_chain(&params(5, secrets(0..HOLDERS), false), applied)
            .await
            .unwrap();
        let tip = store.get_tip().await.unwrap();

        let err = generator.rollback(&blunds[..2]).await.unwrap_err();
        assert!(matches!(err, GenerationError::StoreError(_)));
        assert_eq!(store.get_tip().await.unwrap(), tip);
    }

    /// After rolling back, the same inputs regenerate the same blocks
    #[tokio::test]
    async fn test_regenerate_after_rollback() {
        init_tracing();
        let store = store(genesis(0, HOLDERS, 500));

        let first: Vec<Blund> = transfer_generator(&store, 21)
            .generate_chain(&params(6, secrets(0..HOLDERS), false), applied)
            .await
            .unwrap();
        let generator = transfer_generator(&store, 21);
        generator.rollback(&first).await.unwrap();

        let second: Vec<Blund> = generator
            .generate_chain(&params(6, secrets(0..HOLDERS), false), applied)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    /// Blunds replay onto a fresh bootstrap state to the same ledger
    #[tokio::test]
    async fn test_blunds_replay_on_fresh_state() {
        init_tracing();
        let spec = genesis(0, HOLDERS, 500);
        let store = store(spec.clone());
        let blunds: Vec<Blund> = transfer_generator(&store, 5)
            .generate_chain(&params(8, secrets(0..HOLDERS), false), applied)
            .await
            .unwrap();

        let mut replica = ChainState::bootstrap(spec).unwrap();
        for blund in &blunds {
            replica.apply(blund).unwrap();
        }

        assert_same_ledger(&replica, &store.snapshot().await.unwrap());
    }
}
