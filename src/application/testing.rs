//! 测试替身：可控的合成器、手动播放引擎、固定输出的生成器和内存历史

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::application::audio::encode_pcm;
use crate::application::ports::{
    CompletionNotifier, FlashcardGeneratorPort, GenerationError, HistoryError, HistoryItem,
    HistoryStorePort, PlaybackCompletion, PlaybackEnginePort, PlaybackError, SampleBuffer,
    SourceHandle, SpeechSynthesizerPort, SynthesisError, HISTORY_LIMIT,
};
use crate::domain::{AudioPayload, CardContent, StyleKind};

/// 让出调度若干次，使已就绪的任务跑完
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

enum Scripted {
    Payload(AudioPayload),
    Fail,
}

/// 按文本编排结果的合成器
///
/// - 默认返回 10ms 静音
/// - `hold(text)` 后该文本的请求挂起，直到 `release(text)`
#[derive(Default)]
pub struct ScriptedSynthesizer {
    scripts: DashMap<String, Scripted>,
    gates: DashMap<String, Arc<Semaphore>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_payload() -> AudioPayload {
        encode_pcm(&[0; 240])
    }

    pub fn respond_with(&self, text: &str, payload: AudioPayload) {
        self.scripts
            .insert(text.to_string(), Scripted::Payload(payload));
    }

    pub fn fail_on(&self, text: &str) {
        self.scripts.insert(text.to_string(), Scripted::Fail);
    }

    pub fn hold(&self, text: &str) {
        self.gates
            .insert(text.to_string(), Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, text: &str) {
        if let Some(gate) = self.gates.get(text) {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizerPort for ScriptedSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, SynthesisError> {
        self.calls.lock().unwrap().push(text.to_string());

        let gate = self.gates.get(text).map(|g| g.value().clone());
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        match self.scripts.get(text).as_deref() {
            Some(Scripted::Payload(payload)) => Ok(payload.clone()),
            Some(Scripted::Fail) => Err(SynthesisError::ServiceError(format!(
                "scripted failure for {text}"
            ))),
            None => Ok(Self::default_payload()),
        }
    }

    fn voice(&self) -> &str {
        "Kore"
    }
}

struct ManualSource {
    notifier: Option<CompletionNotifier>,
    started: bool,
    stopped: bool,
}

/// 由测试手动结束播放的引擎
#[derive(Default)]
pub struct ManualEngine {
    next_id: AtomicU64,
    sources: Mutex<HashMap<u64, ManualSource>>,
}

impl ManualEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟自然播放结束；source 已停止或未开始时返回 false
    pub fn finish(&self, source: SourceHandle) -> bool {
        let notifier = self
            .sources
            .lock()
            .unwrap()
            .get_mut(&source.id())
            .and_then(|s| s.notifier.take());
        match notifier {
            Some(notifier) => {
                notifier.notify();
                true
            }
            None => false,
        }
    }

    /// 正在播放的 source
    pub fn playing(&self) -> Vec<SourceHandle> {
        let sources = self.sources.lock().unwrap();
        let mut ids: Vec<u64> = sources
            .iter()
            .filter(|(_, s)| s.started && !s.stopped && s.notifier.is_some())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids.into_iter().map(SourceHandle::new).collect()
    }

    pub fn started_count(&self) -> usize {
        self.sources
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.started)
            .count()
    }

    pub fn was_stopped(&self, source: SourceHandle) -> bool {
        self.sources
            .lock()
            .unwrap()
            .get(&source.id())
            .map(|s| s.stopped)
            .unwrap_or(false)
    }
}

impl PlaybackEnginePort for ManualEngine {
    fn create_source(&self, _buffer: SampleBuffer) -> Result<SourceHandle, PlaybackError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.sources.lock().unwrap().insert(
            id,
            ManualSource {
                notifier: None,
                started: false,
                stopped: false,
            },
        );
        Ok(SourceHandle::new(id))
    }

    fn start(&self, source: &SourceHandle) -> Result<PlaybackCompletion, PlaybackError> {
        let mut sources = self.sources.lock().unwrap();
        let entry = sources
            .get_mut(&source.id())
            .ok_or(PlaybackError::UnknownSource(source.id()))?;
        if entry.started {
            return Err(PlaybackError::AlreadyStarted(source.id()));
        }
        let (notifier, completion) = PlaybackCompletion::channel();
        entry.started = true;
        entry.notifier = Some(notifier);
        Ok(completion)
    }

    fn stop(&self, source: &SourceHandle) {
        if let Some(entry) = self.sources.lock().unwrap().get_mut(&source.id()) {
            entry.stopped = true;
            entry.notifier = None;
        }
    }

    fn is_open(&self) -> bool {
        true
    }
}

/// 返回固定卡片的生成器
#[derive(Default)]
pub struct FixedGenerator {
    cards: Vec<CardContent>,
    requests: Mutex<Vec<(String, StyleKind)>>,
}

impl FixedGenerator {
    pub fn new(cards: Vec<CardContent>) -> Self {
        Self {
            cards,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, StyleKind)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlashcardGeneratorPort for FixedGenerator {
    async fn generate(
        &self,
        source_text: &str,
        style: StyleKind,
    ) -> Result<Vec<CardContent>, GenerationError> {
        self.requests
            .lock()
            .unwrap()
            .push((source_text.to_string(), style));
        if self.cards.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(self.cards.clone())
    }
}

/// 内存历史记录
#[derive(Default)]
pub struct MemoryHistory {
    items: Mutex<Vec<HistoryItem>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStorePort for MemoryHistory {
    async fn load(&self) -> Result<Vec<HistoryItem>, HistoryError> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn save(&self, item: HistoryItem) -> Result<Vec<HistoryItem>, HistoryError> {
        let mut items = self.items.lock().unwrap();
        items.retain(|existing| existing.id != item.id);
        items.insert(0, item);
        items.truncate(HISTORY_LIMIT);
        Ok(items.clone())
    }

    async fn find(&self, id: &str) -> Result<Option<HistoryItem>, HistoryError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id == id)
            .cloned())
    }

    async fn clear(&self) -> Result<(), HistoryError> {
        self.items.lock().unwrap().clear();
        Ok(())
    }
}
