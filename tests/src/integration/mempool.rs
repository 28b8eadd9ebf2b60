//! Mempool transactions flowing into blocks

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use qc_17_block_generation::adapters::{
        FixedScheduleProvider, InMemoryMempool, MempoolPayloadProvider,
    };
    use qc_17_block_generation::domain::bootstrap_tx_id;
    use qc_17_block_generation::{
        ChainGenerationApi, ChainStateStore, Mempool, DEFAULT_MAX_PAYLOAD_TXS,
    };
    use shared_types::{Blund, Transaction, TxIn, TxOut};
    use std::sync::Arc;

    fn genesis_output(index: u32) -> TxIn {
        TxIn {
            tx_id: bootstrap_tx_id(),
            index,
        }
    }

    fn pay(from: u64, index: u32, to: u64, value: u64, change: u64) -> Transaction {
        Transaction::signed(
            vec![genesis_output(index)],
            vec![
                TxOut {
                    owner: id(to),
                    value,
                },
                TxOut {
                    owner: id(from),
                    value: change,
                },
            ],
            &[&key(from)],
        )
    }

    #[tokio::test]
    async fn test_included_transaction_leaves_mempool() {
        init_tracing();
        let store = store(genesis(0, 3, 100));
        let mempool = Arc::new(InMemoryMempool::new(store.clone()));
        let generator = generator_with_mempool(
            &store,
            Arc::new(FixedScheduleProvider::round_robin(vec![id(2)])),
            Arc::new(MempoolPayloadProvider::new(mempool.clone(), 1)),
            mempool.clone(),
            config(3),
        );

        let included = pay(0, 0, 1, 60, 40);
        // Spends the same output, so it goes stale once `included` lands.
        let conflicting = pay(0, 0, 2, 10, 90);
        mempool.submit(included.clone()).await.unwrap();
        mempool.submit(conflicting).await.unwrap();
        assert!(mempool.submit(included.clone()).await.is_err());

        let blunds: Vec<Blund> = generator
            .generate_chain(&params(1, secrets([2]), false), applied)
            .await
            .unwrap();

        let payload = blunds[0].block.payload().unwrap();
        assert_eq!(payload.transactions, vec![included]);
        assert!(mempool.is_empty());

        let state = store.snapshot().await.unwrap();
        assert_eq!(state.stake_of(&id(0)), 40);
        assert_eq!(state.stake_of(&id(1)), 160);
        assert_eq!(state.stake_of(&id(2)), 100);
        assert_eq!(blunds[0].undo.spent.len(), 1);
    }

    #[tokio::test]
    async fn test_conflicting_pending_transactions_share_one_block() {
        init_tracing();
        let store = store(genesis(0, 3, 100));
        let mempool = Arc::new(InMemoryMempool::new(store.clone()));
        let generator = generator_with_mempool(
            &store,
            Arc::new(FixedScheduleProvider::round_robin(vec![id(2)])),
            Arc::new(MempoolPayloadProvider::new(
                mempool.clone(),
                DEFAULT_MAX_PAYLOAD_TXS,
            )),
            mempool.clone(),
            config(3),
        );

        let first = pay(1, 1, 0, 60, 40);
        let double_spend = pay(1, 1, 2, 10, 90);
        let independent = pay(0, 0, 2, 30, 70);
        for tx in [first.clone(), double_spend, independent.clone()] {
            mempool.submit(tx).await.unwrap();
        }

        let blunds: Vec<Blund> = generator
            .generate_chain(&params(2, secrets([2]), false), applied)
            .await
            .unwrap();

        assert_eq!(blunds.len(), 2);
        let payload = blunds[0].block.payload().unwrap();
        assert_eq!(payload.transactions, vec![first, independent]);
        assert!(blunds[1].block.payload().unwrap().transactions.is_empty());
        assert!(mempool.is_empty());

        let state = store.snapshot().await.unwrap();
        assert_eq!(state.stake_of(&id(0)), 130);
        assert_eq!(state.stake_of(&id(1)), 40);
        assert_eq!(state.stake_of(&id(2)), 130);
    }
}
