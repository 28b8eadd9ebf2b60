//! Cursor walk, epoch boundaries, schedule memoization, skip/fail policy

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use qc_17_block_generation::adapters::{
        EmptyPayloadProvider, FixedScheduleProvider, InMemoryChainStore,
        StakeWeightedScheduleProvider, TransferPayloadGenerator,
    };
    use qc_17_block_generation::{
        ChainGenerationApi, ChainStateStore, Count, GenerationConfig, GenerationError, GenesisSpec,
    };
    use shared_types::{Blund, EpochOrSlot, SlotId};
    use std::sync::Arc;

    // =============================================================================
    // EPOCH BOUNDARY
    // =============================================================================

    /// Tip at the last slot of epoch 4; one more point is the genesis of epoch 5
    #[tokio::test]
    async fn test_genesis_follows_last_slot_of_epoch() {
        init_tracing();
        let store = store(GenesisSpec {
            leaders: Some(vec![id(0), id(1), id(2)]),
            ..genesis(4, 3, 100)
        });
        let schedule = Arc::new(FixedScheduleProvider::round_robin(vec![id(0), id(1), id(2)]));
        let generator = generator(
            &store,
            schedule.clone(),
            Arc::new(EmptyPayloadProvider),
            config(3),
        );

        let first: Vec<Blund> = generator
            .generate_chain(&params(3, secrets(0..3), false), applied)
            .await
            .unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(store.get_tip().await.unwrap().point(), EpochOrSlot::Slot(SlotId::new(4, 2)));
        assert_eq!(store.get_leaders(5).await.unwrap(), None);

        let blunds: Vec<Blund> = generator
            .generate_chain(&params(1, secrets(0..3), false), applied)
            .await
            .unwrap();

        assert_eq!(blunds.len(), 1);
        assert_eq!(blunds[0].block.point(), EpochOrSlot::Epoch(5));
        assert!(blunds[0].block.is_genesis());
        assert_eq!(schedule.calls_for(4), 0);
        assert_eq!(schedule.calls_for(5), 1);
        assert!(store.get_leaders(5).await.unwrap().is_some());
    }

    // =============================================================================
    // SKIP / FAIL
    // =============================================================================

    /// Store at (5, 2) with the (5, 3) leader's key missing
    async fn tip_at_5_2() -> (Arc<InMemoryChainStore>, MemGenerator) {
        let store = store(GenesisSpec {
            leaders: Some(vec![id(0), id(0), id(0), id(1), id(0), id(0)]),
            ..genesis(5, 2, 100)
        });
        let generator = generator(
            &store,
            Arc::new(FixedScheduleProvider::default()),
            Arc::new(EmptyPayloadProvider),
            config(6),
        );
        let _: () = generator
            .generate_chain(&params(3, secrets([0]), false), |_| ())
            .await
            .unwrap();
        assert_eq!(store.get_tip().await.unwrap().point(), EpochOrSlot::Slot(SlotId::new(5, 2)));
        (store, generator)
    }

    #[tokio::test]
    async fn test_missing_key_skipped_when_allowed() {
        init_tracing();
        let (_store, generator) = tip_at_5_2().await;

        let result = generator
            .generate_chain(&params(3, secrets([0]), true), outcomes)
            .await
            .unwrap();

        assert_eq!(
            points(&result),
            vec![
                None,
                Some(EpochOrSlot::Slot(SlotId::new(5, 4))),
                Some(EpochOrSlot::Slot(SlotId::new(5, 5))),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_key_fatal_when_not_allowed() {
        init_tracing();
        let (store, generator) = tip_at_5_2().await;

        let err = generator
            .generate_chain(&params(3, secrets([0]), false), Count::of)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError::UnknownSecret {
                producer: id(1),
                slot: SlotId::new(5, 3),
            }
        );
        assert_eq!(store.get_tip().await.unwrap().point(), EpochOrSlot::Slot(SlotId::new(5, 2)));
    }

    // =============================================================================
    // ORDERING AND DETERMINISM
    // =============================================================================

    #[tokio::test]
    async fn test_outcomes_follow_cursor_order() {
        init_tracing();
        let store = store(genesis(0, 3, 100));
        let generator = generator(
            &store,
            Arc::new(FixedScheduleProvider::round_robin(vec![id(0), id(1), id(2)])),
            Arc::new(EmptyPayloadProvider),
            config(3),
        );

        let result = generator
            .generate_chain(&params(10, secrets(0..3), false), outcomes)
            .await
            .unwrap();

        let expected: Vec<_> = EpochOrSlot::range(
            3,
            EpochOrSlot::Slot(SlotId::new(0, 0)),
            EpochOrSlot::from_flat_index(10, 3),
        )
        .map(Some)
        .collect();
        assert_eq!(points(&result), expected);

        // Each block links to the one before it.
        let blocks: Vec<_> = result.into_iter().flatten().map(|b| b.block).collect();
        for pair in blocks.windows(2) {
            assert_eq!(pair[1].prev_hash(), pair[0].hash());
        }
    }

    #[tokio::test]
    async fn test_runs_are_deterministic() {
        init_tracing();
        let run = || async {
            let store = store(genesis(0, 4, 1_000));
            let payload =
                Arc::new(TransferPayloadGenerator::new(store.clone(), secrets(0..4), 3, 7));
            let generator = generator(
                &store,
                Arc::new(StakeWeightedScheduleProvider::new([9u8; 32])),
                payload,
                config(4),
            );
            generator
                .generate_chain(&params(12, secrets(0..4), false), applied)
                .await
                .unwrap()
        };

        let first: Vec<Blund> = run().await;
        let second: Vec<Blund> = run().await;
        assert_eq!(first.len(), 12);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_zero_count_leaves_state_untouched() {
        init_tracing();
        let store = store(genesis(0, 3, 100));
        let before = store.snapshot().await.unwrap();
        let schedule = Arc::new(FixedScheduleProvider::round_robin(vec![id(0)]));
        let generator = generator(
            &store,
            schedule.clone(),
            Arc::new(EmptyPayloadProvider),
            config(3),
        );

        let count = generator
            .generate_chain(&params(0, secrets(0..3), false), Count::of)
            .await
            .unwrap();

        assert_eq!(count, Count::default());
        assert_eq!(schedule.total_calls(), 0);
        assert_eq!(store.snapshot().await.unwrap(), before);
    }

    // =============================================================================
    // LAZY SCHEDULES
    // =============================================================================

    /// One schedule per epoch entered, computed from the stake at that time
    #[tokio::test]
    async fn test_stake_weighted_schedules_across_epochs() {
        init_tracing();
        let store = store(genesis(0, 4, 1_000));
        let schedule = Arc::new(StakeWeightedScheduleProvider::new([1u8; 32]));
        let config = GenerationConfig {
            max_payload_txs: 2,
            payload_seed: 11,
            ..config(4)
        };
        let payload = Arc::new(TransferPayloadGenerator::from_config(
            store.clone(),
            secrets(0..4),
            &config,
        ));
        let generator = generator(&store, schedule.clone(), payload, config);

        // (0,0)..(0,3), Epoch(1), (1,0)..(1,3), Epoch(2)
        let count = generator
            .generate_chain(&params(10, secrets(0..4), false), Count::of)
            .await
            .unwrap();

        assert_eq!(count.produced, 10);
        assert_eq!(count.skipped, 0);
        for epoch in 0..=2 {
            assert_eq!(schedule.calls_for(epoch), 1, "epoch {epoch}");
            let leaders = store.get_leaders(epoch).await.unwrap().unwrap();
            assert_eq!(leaders.len(), 4);
        }
        assert_eq!(schedule.calls_for(3), 0);

        let status = generator.status().await.unwrap();
        assert_eq!(status.tip, EpochOrSlot::Epoch(2));
        assert_eq!(status.schedules_computed, 3);
        assert_eq!(status.genesis_blocks, 2);
        assert_eq!(status.main_blocks, 8);
        assert_eq!(status.difficulty, 8);

        // Transfers move coin around but never create or destroy it.
        let state = store.snapshot().await.unwrap();
        assert_eq!(state.total_stake(), 4_000);
    }
}
