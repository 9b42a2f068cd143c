//! # Topic Filtering Between Two Nodes
//!
//! One node posts squares under "odd" or "even"; its peer watches only
//! "odd" and must see each odd square exactly once.

#[cfg(test)]
mod tests {
    use super::super::{collect_payloads, init_test_logging, node, node_with, wait_until, SETTLE};
    use hs_01_envelope::TopicMask;
    use hs_02_message_pool::PoolConfig;
    use hs_04_peer_propagation::{HushApi, PostRequest, PropagationConfig, WorkBudget};

    fn square_request(i: u32) -> PostRequest {
        let topic = if i % 2 == 1 { "odd" } else { "even" };
        PostRequest::new(rlp::encode(&(i * i)).to_vec(), &[topic]).work(WorkBudget::Bits(4))
    }

    fn decode_square(payload: &[u8]) -> u32 {
        rlp::decode(payload).unwrap()
    }

    #[tokio::test]
    async fn test_odd_watch_sees_each_odd_square_once() {
        init_test_logging();
        let listener = node();
        let poster = node();
        let watch = listener.host().install_watch(TopicMask::exact(&["odd"]));
        let _link = listener.connect(&poster);

        for i in 0..10 {
            poster.host().post(square_request(i)).unwrap();
        }

        let mut squares: Vec<u32> = collect_payloads(&listener, watch, 5)
            .await
            .iter()
            .map(|p| decode_square(p))
            .collect();
        squares.sort_unstable();

        assert_eq!(squares, vec![1, 9, 25, 49, 81]);
        assert_eq!(squares.iter().sum::<u32>(), 165);

        let _ = hush_telemetry::register_metrics();
        let metrics = hush_telemetry::encode_metrics().unwrap();
        assert!(metrics.contains("hush_pool_envelopes_accepted_total"));
        assert!(metrics.contains("hush_peer_envelopes_relayed_total"));
    }

    #[tokio::test]
    async fn test_unwatched_topics_still_flood() {
        let listener = node();
        let poster = node();
        let _link = listener.connect(&poster);

        for i in 0..4 {
            poster.host().post(square_request(i)).unwrap();
        }

        assert!(wait_until(SETTLE, || listener.host().pool().len() == 4).await);
    }

    #[tokio::test]
    async fn test_wildcard_mask_matches_any_first_topic() {
        let listener = node();
        let poster = node();
        let watch = listener
            .host()
            .install_watch(TopicMask::build(&[None, Some("shared")]));
        let _link = listener.connect(&poster);

        poster
            .host()
            .post(PostRequest::new(b"a".to_vec(), &["alpha", "shared"]).work(WorkBudget::Bits(4)))
            .unwrap();
        poster
            .host()
            .post(PostRequest::new(b"b".to_vec(), &["beta", "shared"]).work(WorkBudget::Bits(4)))
            .unwrap();
        poster
            .host()
            .post(PostRequest::new(b"c".to_vec(), &["beta", "other"]).work(WorkBudget::Bits(4)))
            .unwrap();

        assert!(wait_until(SETTLE, || listener.host().pool().len() == 3).await);
        let hits = listener.host().check_watch(watch).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_insufficient_work_is_not_relayed() {
        let strict = PoolConfig {
            min_pow: 1_000_000.0,
            ..PoolConfig::default()
        };
        let poster = node_with(PoolConfig::for_testing(), PropagationConfig::default());
        let strict_node = node_with(strict, PropagationConfig::default());
        let watch = strict_node.host().install_watch(TopicMask::exact(&["odd"]));
        let _link = poster.connect(&strict_node);

        poster.host().post(square_request(1).work(WorkBudget::Bits(0))).unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert_eq!(poster.host().pool().len(), 1);
        assert!(strict_node.host().pool().is_empty());
        assert!(strict_node.host().check_watch(watch).unwrap().is_empty());
    }
}
