//! # Relaying Through Intermediate Nodes
//!
//! Nodes only ever talk to direct neighbours; envelopes reach the rest of
//! the network by being re-flooded from every node that accepts them.

#[cfg(test)]
mod tests {
    use super::super::{collect_payloads, init_test_logging, node, node_with, wait_until};
    use hs_01_envelope::TopicMask;
    use hs_02_message_pool::PoolConfig;
    use hs_04_peer_propagation::{HushApi, PostRequest, PropagationConfig, WorkBudget};
    use std::time::Duration;

    fn request(payload: &[u8]) -> PostRequest {
        PostRequest::new(payload.to_vec(), &["relay"]).work(WorkBudget::Bits(4))
    }

    #[tokio::test]
    async fn test_three_node_chain_delivers_exactly_once() {
        init_test_logging();
        let a = node();
        let b = node();
        let c = node();
        let watch_a = a.host().install_watch(TopicMask::exact(&["relay"]));
        let watch_b = b.host().install_watch(TopicMask::exact(&["relay"]));
        let _ab = a.connect(&b);
        let _bc = b.connect(&c);
        assert!(!a.is_connected_to(&c));

        c.host().post(request(b"from c")).unwrap();

        assert_eq!(collect_payloads(&a, watch_a, 1).await, vec![b"from c".to_vec()]);
        assert_eq!(collect_payloads(&b, watch_b, 1).await, vec![b"from c".to_vec()]);
    }

    #[tokio::test]
    async fn test_triangle_does_not_duplicate() {
        let a = node();
        let b = node();
        let c = node();
        let watch = a.host().install_watch(TopicMask::exact(&["relay"]));
        let _ab = a.connect(&b);
        let _bc = b.connect(&c);
        let _ca = c.connect(&a);

        for i in 0..5u8 {
            c.host().post(request(&[i])).unwrap();
        }

        let mut payloads = collect_payloads(&a, watch, 5).await;
        payloads.sort();
        assert_eq!(payloads, (0..5u8).map(|i| vec![i]).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_late_link_forwards_earlier_posts() {
        let a = node();
        let b = node();
        let c = node();
        let watch = a.host().install_watch(TopicMask::exact(&["relay"]));
        let _ab = a.connect(&b);

        c.host().post(request(b"before link")).unwrap();
        assert!(b.host().pool().is_empty());

        let _bc = b.connect(&c);

        assert_eq!(
            collect_payloads(&a, watch, 1).await,
            vec![b"before link".to_vec()]
        );
    }

    #[tokio::test]
    async fn test_late_link_without_sync_only_carries_new_posts() {
        let quiet = PropagationConfig {
            sync_on_connect: false,
            ..PropagationConfig::default()
        };
        let a = node_with(PoolConfig::default(), quiet.clone());
        let c = node_with(PoolConfig::default(), quiet);
        let watch = a.host().install_watch(TopicMask::exact(&["relay"]));

        c.host().post(request(b"old")).unwrap();
        let _ac = a.connect(&c);
        c.host().post(request(b"new")).unwrap();

        assert_eq!(collect_payloads(&a, watch, 1).await, vec![b"new".to_vec()]);
        assert_eq!(a.host().pool().len(), 1);
    }

    #[tokio::test]
    async fn test_disconnected_peer_stops_receiving() {
        let a = node();
        let b = node();
        let link = a.connect(&b);
        a.disconnect(&b);
        link.closed().await;

        a.host().post(request(b"after")).unwrap();

        let reached_b = wait_until(Duration::from_millis(200), || !b.host().pool().is_empty());
        assert!(!reached_b.await);
        assert_eq!(a.host().peer_count(), 0);
    }
}
