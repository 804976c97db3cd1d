//! # Faker-style producer for demos and load tests.
//!
//! [`RandomProducer`] returns between zero and ten random records per fetch.
//! Enabled via the `demo` feature; not intended for production use.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::error::ProduceError;
use crate::records::Record;

use super::produce::Produce;

/// Producer generating random availability records.
pub struct RandomProducer {
    name: String,
}

impl RandomProducer {
    /// Creates a random producer with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Produce for RandomProducer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, ctx: CancellationToken) -> Result<Vec<Record>, ProduceError> {
        if ctx.is_cancelled() {
            return Err(ProduceError::Canceled);
        }

        let mut rng = rand::thread_rng();
        let count = rng.gen_range(0..=10);
        let records = (0..count)
            .map(|_| {
                Record::new(
                    rng.gen_range(1..=1000),
                    self.name.clone(),
                    rng.gen_range(10.0..1000.0),
                    Utc::now() + ChronoDuration::days(rng.gen_range(1..=30)),
                )
            })
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_is_bounded_and_tagged() {
        let p = RandomProducer::new("rand-1");
        let records = p
            .fetch(CancellationToken::new())
            .await
            .expect("random fetch succeeds");

        assert!(records.len() <= 10);
        assert!(records.iter().all(|r| r.provider == "rand-1"));
    }
}
