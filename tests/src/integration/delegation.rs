//! Proxy signing through delegation certificates

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use qc_17_block_generation::adapters::{
        EmptyPayloadProvider, FixedScheduleProvider, InMemoryChainStore,
    };
    use qc_17_block_generation::{
        ChainGenerationApi, ChainStateStore, GenerationError, GenesisSpec,
    };
    use shared_types::{Block, Blund, DelegationCertificate, EpochOrSlot, SlotId};
    use std::sync::Arc;

    const ISSUER: u64 = 0;
    const DELEGATE: u64 = 5;

    /// Issuer leads every slot and delegates epoch 0 to the delegate
    fn delegated_chain() -> (Arc<InMemoryChainStore>, MemGenerator, DelegationCertificate) {
        let cert = DelegationCertificate::issue(&key(ISSUER), key(DELEGATE).public_key(), 0, 0);
        let store = store(GenesisSpec {
            delegations: vec![cert.clone()],
            ..genesis(0, 1, 100)
        });
        let generator = generator(
            &store,
            Arc::new(FixedScheduleProvider::round_robin(vec![id(ISSUER)])),
            Arc::new(EmptyPayloadProvider),
            config(3),
        );
        (store, generator, cert)
    }

    #[tokio::test]
    async fn test_delegate_produces_for_absent_leader() {
        init_tracing();
        let (_store, generator, cert) = delegated_chain();

        let blunds: Vec<Blund> = generator
            .generate_chain(&params(3, secrets([DELEGATE]), false), applied)
            .await
            .unwrap();

        assert_eq!(blunds.len(), 3);
        for blund in &blunds {
            let Block::Main(main) = &blund.block else {
                panic!("expected main block at {}", blund.block.point());
            };
            assert_eq!(main.header.producer(), id(DELEGATE));
            assert_eq!(main.header.producer_pk, key(DELEGATE).public_key());
            assert_eq!(main.header.signature.certificate(), Some(&cert));
            assert!(main.header.verify_signature().is_ok());
        }
    }

    /// The issuer's own key does not stand in for its delegate
    #[tokio::test]
    async fn test_issuer_key_unused_while_delegated() {
        init_tracing();
        let (_store, generator, _cert) = delegated_chain();

        let result = generator
            .generate_chain(&params(3, secrets([ISSUER]), true), outcomes)
            .await
            .unwrap();
        assert_eq!(points(&result), vec![None, None, None]);

        let err = generator
            .generate_chain(&params(1, secrets([ISSUER]), false), |_| ())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::UnknownSecret {
                producer: id(DELEGATE),
                slot: SlotId::new(0, 0),
            }
        );
    }

    /// Once the certificate's window closes the issuer must sign again
    #[tokio::test]
    async fn test_expired_delegation_falls_back_to_issuer() {
        init_tracing();
        let (store, generator, _cert) = delegated_chain();

        let blunds: Vec<Blund> = generator
            .generate_chain(&params(4, secrets([DELEGATE]), false), applied)
            .await
            .unwrap();
        assert_eq!(blunds[3].block.point(), EpochOrSlot::Epoch(1));

        let err = generator
            .generate_chain(&params(1, secrets([DELEGATE]), false), |_| ())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::UnknownSecret {
                producer: id(ISSUER),
                slot: SlotId::new(1, 0),
            }
        );

        let blunds: Vec<Blund> = generator
            .generate_chain(&params(1, secrets([ISSUER, DELEGATE]), false), applied)
            .await
            .unwrap();
        assert_eq!(producer(&blunds[0].block), Some(id(ISSUER)));
        assert_eq!(store.get_tip().await.unwrap().point(), EpochOrSlot::Slot(SlotId::new(1, 0)));
    }
}
