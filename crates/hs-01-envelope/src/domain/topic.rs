//! # Topics
//!
//! Topic strings are hashed twice: once into the [`FullTopic`] that keys the
//! message cipher, and again into the 4-byte [`Topic`] commitment carried on
//! the wire. The second step is one-way, so seeing a `Topic` does not reveal
//! the `FullTopic`.

use std::fmt;

use shared_types::{keccak256, Hash};

use super::errors::TopicError;

/// Length of an abridged topic on the wire.
pub const TOPIC_LEN: usize = 4;

/// Maximum number of topics an envelope may carry.
pub const MAX_TOPICS: usize = 4;

/// The 32-byte preimage side of a topic.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FullTopic(pub Hash);

impl FullTopic {
    /// Hashes a topic string.
    pub fn new(topic: &str) -> Self {
        Self(keccak256(topic.as_bytes()))
    }

    /// The wire commitment for this full topic.
    pub fn abridge(&self) -> Topic {
        let hash = keccak256(&self.0);
        let mut out = [0u8; TOPIC_LEN];
        out.copy_from_slice(&hash[..TOPIC_LEN]);
        Topic(out)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for FullTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FullTopic({})", hex::encode(&self.0[..8]))
    }
}

/// Abridged topic commitment, as carried in an envelope.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(pub [u8; TOPIC_LEN]);

impl Topic {
    /// Commitment for a topic string.
    pub fn commit(topic: &str) -> Self {
        FullTopic::new(topic).abridge()
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Topic({})", hex::encode(self.0))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Ordered list of at most [`MAX_TOPICS`] topic commitments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Topics(Vec<Topic>);

impl Topics {
    pub fn new(topics: Vec<Topic>) -> Result<Self, TopicError> {
        if topics.len() > MAX_TOPICS {
            return Err(TopicError::TooManyTopics {
                count: topics.len(),
                max: MAX_TOPICS,
            });
        }
        Ok(Self(topics))
    }

    pub fn from_full(full: &[FullTopic]) -> Result<Self, TopicError> {
        Self::new(full.iter().map(FullTopic::abridge).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Topic> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Topic] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Topics {
    type Item = &'a Topic;
    type IntoIter = std::slice::Iter<'a, Topic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Builds the wire topics for a set of topic strings, together with the
/// full topics needed later to open the resulting envelope.
pub fn build_topic(topics: &[&str]) -> Result<(Topics, Vec<FullTopic>), TopicError> {
    let full: Vec<FullTopic> = topics.iter().map(|t| FullTopic::new(t)).collect();
    let abridged = Topics::from_full(&full)?;
    Ok((abridged, full))
}

/// Positional filter over envelope topics.
///
/// `None` entries are wildcards. An envelope matches when it has exactly as
/// many topics as the mask has entries and every non-wildcard entry equals
/// the topic at the same position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicMask {
    entries: Vec<Option<Topic>>,
    full: Vec<Option<FullTopic>>,
}

impl TopicMask {
    /// Builds a mask from topic strings; `None` becomes a wildcard.
    pub fn build(topics: &[Option<&str>]) -> Self {
        let full: Vec<Option<FullTopic>> = topics.iter().map(|t| t.map(FullTopic::new)).collect();
        let entries = full.iter().map(|f| f.as_ref().map(FullTopic::abridge)).collect();
        Self { entries, full }
    }

    /// Mask requiring exactly the given topic strings, in order.
    pub fn exact(topics: &[&str]) -> Self {
        let wrapped: Vec<Option<&str>> = topics.iter().map(|t| Some(*t)).collect();
        Self::build(&wrapped)
    }

    pub fn matches(&self, topics: &Topics) -> bool {
        self.entries.len() == topics.len()
            && self
                .entries
                .iter()
                .zip(topics.iter())
                .all(|(mask, topic)| mask.map_or(true, |m| m == *topic))
    }

    /// Full topics of the non-wildcard positions, in mask order.
    ///
    /// For a mask without wildcards this is exactly what [`crate::Envelope::open`]
    /// needs for every matching envelope.
    pub fn full_topics(&self) -> Vec<FullTopic> {
        self.full.iter().flatten().copied().collect()
    }

    pub fn entries(&self) -> &[Option<Topic>] {
        &self.entries
    }

    pub fn has_wildcards(&self) -> bool {
        self.entries.iter().any(Option::is_none)
    }
}
