//! Device Playback Engine - 通过 cpal 输出到默认声卡
//!
//! 输出流在首次创建 source 时打开，由专用线程持有直到引擎被丢弃。
//! 回调线程从共享混音器拉取样本：按设备采样率重采样，单声道复制到所有输出声道。

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;

use crate::application::ports::{
    CompletionNotifier, PlaybackCompletion, PlaybackEnginePort, PlaybackError, SampleBuffer,
    SourceHandle,
};

struct Voice {
    id: u64,
    buffer: SampleBuffer,
    position: f64,
    step: f64,
    notifier: Option<CompletionNotifier>,
}

impl Voice {
    fn finished(&self) -> bool {
        self.position as usize >= self.buffer.frames()
    }
}

/// 正在播放的 voice 集合
#[derive(Default)]
struct Mixer {
    voices: Vec<Voice>,
}

impl Mixer {
    fn contains(&self, id: u64) -> bool {
        self.voices.iter().any(|v| v.id == id)
    }

    fn remove(&mut self, id: u64) {
        // 丢弃 notifier 即抑制完成通知
        self.voices.retain(|v| v.id != id);
    }

    /// 填充一段交错输出，自然结束的 voice 在此发出完成通知
    fn render(&mut self, out: &mut [f32], out_channels: usize) {
        out.fill(0.0);
        if out_channels == 0 {
            return;
        }

        for voice in self.voices.iter_mut() {
            let src_channels = voice.buffer.channels() as usize;
            if src_channels == 0 {
                continue;
            }
            let samples = voice.buffer.samples();
            for frame in out.chunks_mut(out_channels) {
                if voice.finished() {
                    break;
                }
                let base = voice.position as usize * src_channels;
                for (c, slot) in frame.iter_mut().enumerate() {
                    *slot += samples[base + c.min(src_channels - 1)];
                }
                voice.position += voice.step;
            }
        }

        for sample in out.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }

        let mut i = 0;
        while i < self.voices.len() {
            if self.voices[i].finished() {
                let mut voice = self.voices.swap_remove(i);
                if let Some(notifier) = voice.notifier.take() {
                    notifier.notify();
                }
            } else {
                i += 1;
            }
        }
    }
}

/// 已打开的输出会话
struct OutputSession {
    sample_rate: u32,
    channels: usize,
    // 丢弃时输出线程退出并关闭流
    _shutdown: mpsc::Sender<()>,
}

impl OutputSession {
    fn open(mixer: Arc<Mutex<Mixer>>) -> Result<Self, PlaybackError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || match build_stream(mixer) {
                Ok((stream, sample_rate, channels)) => {
                    let _ = ready_tx.send(Ok((sample_rate, channels)));
                    // 阻塞直到引擎丢弃 shutdown 发送端
                    let _ = shutdown_rx.recv();
                    drop(stream);
                    tracing::debug!("Audio output closed");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;

        let (sample_rate, channels) = ready_rx
            .recv()
            .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?
            .map_err(PlaybackError::OutputUnavailable)?;

        tracing::info!(sample_rate, channels, "Audio output opened");
        Ok(Self {
            sample_rate,
            channels,
            _shutdown: shutdown_tx,
        })
    }
}

fn build_stream(mixer: Arc<Mutex<Mixer>>) -> Result<(cpal::Stream, u32, usize), String> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| "No audio output device available".to_string())?;
    let config = device
        .default_output_config()
        .map_err(|e| format!("Failed to get default output config: {}", e))?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let on_error = |err| tracing::error!("Audio stream error: {}", err);

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    mixer
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .render(data, channels);
                },
                on_error,
                None,
            )
            .map_err(|e| format!("Failed to build audio stream: {}", e))?,
        cpal::SampleFormat::I16 => {
            let mut scratch: Vec<f32> = vec![0.0; 4096];
            device
                .build_output_stream(
                    &config.into(),
                    move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                        if scratch.len() < data.len() {
                            scratch.resize(data.len(), 0.0);
                        }
                        let frame = &mut scratch[..data.len()];
                        mixer
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .render(frame, channels);
                        for (out, &f) in data.iter_mut().zip(frame.iter()) {
                            *out = (f * 32767.0) as i16;
                        }
                    },
                    on_error,
                    None,
                )
                .map_err(|e| format!("Failed to build audio stream: {}", e))?
        }
        other => return Err(format!("Unsupported sample format: {:?}", other)),
    };

    stream
        .play()
        .map_err(|e| format!("Failed to play audio stream: {}", e))?;

    Ok((stream, sample_rate, channels))
}

/// Device Playback Engine
#[derive(Default)]
pub struct DevicePlaybackEngine {
    next_id: AtomicU64,
    session: Mutex<Option<OutputSession>>,
    mixer: Arc<Mutex<Mixer>>,
    pending: DashMap<u64, SampleBuffer>,
}

impl DevicePlaybackEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn output_format(&self) -> Result<(u32, usize), PlaybackError> {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.is_none() {
            *session = Some(OutputSession::open(self.mixer.clone())?);
        }
        session
            .as_ref()
            .map(|s| (s.sample_rate, s.channels))
            .ok_or_else(|| PlaybackError::OutputUnavailable("output not open".to_string()))
    }
}

impl PlaybackEnginePort for DevicePlaybackEngine {
    fn create_source(&self, buffer: SampleBuffer) -> Result<SourceHandle, PlaybackError> {
        self.output_format()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.pending.insert(id, buffer);
        Ok(SourceHandle::new(id))
    }

    fn start(&self, source: &SourceHandle) -> Result<PlaybackCompletion, PlaybackError> {
        let id = source.id();
        let mut mixer = self.mixer.lock().unwrap_or_else(PoisonError::into_inner);
        let Some((_, buffer)) = self.pending.remove(&id) else {
            if mixer.contains(id) {
                return Err(PlaybackError::AlreadyStarted(id));
            }
            return Err(PlaybackError::UnknownSource(id));
        };

        let (output_rate, _) = self.output_format()?;
        let step = if output_rate == 0 {
            1.0
        } else {
            buffer.sample_rate() as f64 / output_rate as f64
        };

        let (notifier, completion) = PlaybackCompletion::channel();
        mixer.voices.push(Voice {
            id,
            buffer,
            position: 0.0,
            step,
            notifier: Some(notifier),
        });
        Ok(completion)
    }

    fn stop(&self, source: &SourceHandle) {
        self.pending.remove(&source.id());
        self.mixer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(source.id());
    }

    fn is_open(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
