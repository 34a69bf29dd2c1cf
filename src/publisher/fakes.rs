// src/publisher/fakes.rs
//! In-memory collaborators for publisher tests

use crate::network::discord::ChatPlatform;
use crate::stats::client::StatsSource;
use crate::types::{
    EmbedField, MessageContent, MessageHandle, RenderedMessage, StatsSnapshot, WorkerStat,
};
use crate::utils::error::BotError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send(String, MessageContent),
    Edit(String, MessageHandle, MessageContent),
    Fetch(String, MessageHandle),
}

/// Chat platform that records every call
#[derive(Default)]
pub struct FakeChat {
    calls: Mutex<Vec<Call>>,
    live: Mutex<HashSet<String>>,
    next_id: AtomicU64,
    pub fail_login: AtomicBool,
    pub fail_text: AtomicBool,
}

impl FakeChat {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of status messages created
    pub fn created(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Send(_, MessageContent::Embed(_))))
            .count()
    }

    /// Number of create or edit calls
    pub fn writes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Send(..) | Call::Edit(..)))
            .count()
    }

    /// Plain-text messages sent
    pub fn notices(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send(_, MessageContent::Text(text)) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Simulates the message being removed by someone else
    pub fn delete(&self, handle: &MessageHandle) {
        self.live.lock().unwrap().remove(&handle.0);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_live(&self, handle: &MessageHandle) -> Result<(), BotError> {
        if self.live.lock().unwrap().contains(&handle.0) {
            Ok(())
        } else {
            Err(BotError::MessageNotFound(handle.0.clone()))
        }
    }
}

#[async_trait]
impl ChatPlatform for FakeChat {
    async fn current_user(&self) -> Result<String, BotError> {
        if self.fail_login.load(Ordering::SeqCst) {
            return Err(BotError::ChatPlatform("401 Unauthorized".into()));
        }
        Ok("statsbot#0001".into())
    }

    async fn send_message(
        &self,
        channel_id: &str,
        content: &MessageContent,
    ) -> Result<MessageHandle, BotError> {
        self.record(Call::Send(channel_id.to_string(), content.clone()));
        if matches!(content, MessageContent::Text(_)) && self.fail_text.load(Ordering::SeqCst) {
            return Err(BotError::ChatPlatform("Missing Permissions".into()));
        }

        let id = (1000 + self.next_id.fetch_add(1, Ordering::SeqCst)).to_string();
        self.live.lock().unwrap().insert(id.clone());
        Ok(MessageHandle(id))
    }

    async fn edit_message(
        &self,
        channel_id: &str,
        handle: &MessageHandle,
        content: &MessageContent,
    ) -> Result<(), BotError> {
        self.record(Call::Edit(
            channel_id.to_string(),
            handle.clone(),
            content.clone(),
        ));
        self.check_live(handle)
    }

    async fn fetch_message(
        &self,
        channel_id: &str,
        handle: &MessageHandle,
    ) -> Result<MessageHandle, BotError> {
        self.record(Call::Fetch(channel_id.to_string(), handle.clone()));
        self.check_live(handle)?;
        Ok(handle.clone())
    }
}

/// Stats source that fails on selected (1-based) calls
#[derive(Default)]
pub struct FakeStats {
    calls: AtomicUsize,
    failing: HashSet<usize>,
}

impl FakeStats {
    pub fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        FakeStats {
            calls: AtomicUsize::new(0),
            failing: calls.into_iter().collect(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsSource for FakeStats {
    async fn fetch(&self) -> Result<StatsSnapshot, BotError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.contains(&n) {
            return Err(BotError::Upstream(format!("HTTP 503 on call {}", n)));
        }
        Ok(sample_snapshot(n as u64))
    }
}

pub fn sample_snapshot(valid_shares: u64) -> StatsSnapshot {
    StatsSnapshot {
        hash_rate: 1_200_000.0,
        valid_shares,
        confirmed_balance: Some(50_000_000_000),
        workers: vec![WorkerStat {
            name: "rig1".into(),
            hash_rate: 600_000.0,
            valid_shares,
            stale_shares: 1,
            last_share: None,
        }],
    }
}

pub fn sample_message(title: &str) -> RenderedMessage {
    RenderedMessage {
        title: title.to_string(),
        color: 0,
        fields: vec![EmbedField {
            name: "n".into(),
            value: "v".into(),
            inline: false,
        }],
    }
}
