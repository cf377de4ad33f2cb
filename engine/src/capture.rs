//! Capture adapter: camera, microphone, and file upload converge on one
//! [`RawCapture`] shape.
//!
//! A capture runs in two phases so the owning job can report progress:
//!
//! 1. [`CaptureAdapter::acquire`] obtains raw material from a device or file
//!    (job status `capturing`).
//! 2. [`CaptureAdapter::extract`] turns it into normalized text
//!    (job status `extracting`).
//!
//! Devices and on-device extractors are consumed through the narrow traits
//! below; the adapter never touches platform APIs itself.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use ideascore_config::CaptureSettings;
use ideascore_types::{CaptureModality, ErrorKind, RawCapture, clamp_unit};

pub type CaptureFut<'a, T> = Pin<Box<dyn Future<Output = Result<T, CaptureError>> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Camera,
    Microphone,
    FilePicker,
    TextRecognizer,
    SpeechTranscriber,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Camera => "camera",
            Self::Microphone => "microphone",
            Self::FilePicker => "file picker",
            Self::TextRecognizer => "text recognizer",
            Self::SpeechTranscriber => "speech transcriber",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFrame {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    /// Recorded length, when the recorder knows it.
    pub duration: Option<Duration>,
}

/// Text produced by an on-device extractor, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub confidence: Option<f64>,
}

pub trait Camera: Send + Sync {
    fn request_permission(&self) -> CaptureFut<'_, Permission>;
    fn capture(&self) -> CaptureFut<'_, ImageFrame>;
}

pub trait Microphone: Send + Sync {
    fn request_permission(&self) -> CaptureFut<'_, Permission>;
    /// Record until the user stops or `max_duration` elapses.
    fn record(&self, max_duration: Duration) -> CaptureFut<'_, AudioClip>;
}

pub trait FilePicker: Send + Sync {
    /// `None` when the user dismisses the picker.
    fn pick(&self) -> CaptureFut<'_, Option<PathBuf>>;
}

pub trait TextRecognizer: Send + Sync {
    fn recognize<'a>(&'a self, image: &'a ImageFrame) -> CaptureFut<'a, Extraction>;
}

pub trait SpeechTranscriber: Send + Sync {
    fn transcribe<'a>(&'a self, audio: &'a AudioClip) -> CaptureFut<'a, Extraction>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("{device} permission denied")]
    PermissionDenied { device: Device },
    #[error("{device} unavailable: {reason}")]
    DeviceUnavailable { device: Device, reason: String },
    #[error("recording failed: {0}")]
    RecordingFailed(String),
    #[error("text recognition failed: {0}")]
    RecognitionFailed(String),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("unsupported file format: {}", extension_label(.extension))]
    UnsupportedFormat { extension: String },
    #[error("file is {size} bytes, the limit is {limit}")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("failed to read {}: {reason}", .path.display())]
    ReadFailed { path: PathBuf, reason: String },
    #[error("capture dismissed")]
    Dismissed,
}

impl CaptureError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied { .. } => ErrorKind::Permission,
            Self::DeviceUnavailable { .. } | Self::RecordingFailed(_) => ErrorKind::Device,
            Self::RecognitionFailed(_)
            | Self::TranscriptionFailed(_)
            | Self::UnsupportedFormat { .. }
            | Self::FileTooLarge { .. }
            | Self::ReadFailed { .. } => ErrorKind::Extraction,
            Self::Dismissed => ErrorKind::Cancelled,
        }
    }

    fn unavailable(device: Device) -> Self {
        Self::DeviceUnavailable {
            device,
            reason: "not present on this system".to_string(),
        }
    }
}

fn extension_label(extension: &str) -> &str {
    if extension.is_empty() { "(none)" } else { extension }
}

/// Where a capture comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    Camera,
    Microphone,
    /// Ask the file picker for a file.
    PickFile,
    /// A file the caller already chose.
    Upload(PathBuf),
}

/// Raw material from the acquire phase, tagged by how it must be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Image(ImageFrame),
    Audio(AudioClip),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquired {
    pub modality: CaptureModality,
    pub source: String,
    pub payload: Payload,
}

/// Upload handling chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Text,
    Image(&'static str),
    Audio(&'static str),
    /// A scanned document, recognized like an image.
    Pdf,
}

impl UploadKind {
    #[must_use]
    pub const fn modality(self) -> CaptureModality {
        match self {
            Self::Text | Self::Pdf => CaptureModality::Document,
            Self::Image(_) => CaptureModality::Image,
            Self::Audio(_) => CaptureModality::Audio,
        }
    }
}

impl UploadKind {
    pub fn from_path(path: &Path) -> Result<Self, CaptureError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "txt" | "text" | "md" => Ok(Self::Text),
            "jpg" | "jpeg" => Ok(Self::Image("image/jpeg")),
            "png" => Ok(Self::Image("image/png")),
            "gif" => Ok(Self::Image("image/gif")),
            "webp" => Ok(Self::Image("image/webp")),
            "pdf" => Ok(Self::Pdf),
            "mp3" => Ok(Self::Audio("audio/mpeg")),
            "wav" => Ok(Self::Audio("audio/wav")),
            "m4a" => Ok(Self::Audio("audio/mp4")),
            "ogg" => Ok(Self::Audio("audio/ogg")),
            _ => Err(CaptureError::UnsupportedFormat { extension }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLimits {
    pub max_upload_bytes: u64,
    pub max_recording: Duration,
}

impl Default for CaptureLimits {
    fn default() -> Self {
        Self {
            max_upload_bytes: ideascore_config::DEFAULT_MAX_UPLOAD_BYTES,
            max_recording: Duration::from_secs(ideascore_config::DEFAULT_MAX_RECORDING_SECS),
        }
    }
}

impl From<&CaptureSettings> for CaptureLimits {
    fn from(settings: &CaptureSettings) -> Self {
        Self {
            max_upload_bytes: settings.max_upload_bytes,
            max_recording: settings.max_recording,
        }
    }
}

/// Normalizes every capture modality into a [`RawCapture`].
#[derive(Clone, Default)]
pub struct CaptureAdapter {
    camera: Option<Arc<dyn Camera>>,
    microphone: Option<Arc<dyn Microphone>>,
    file_picker: Option<Arc<dyn FilePicker>>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
    transcriber: Option<Arc<dyn SpeechTranscriber>>,
    limits: CaptureLimits,
}

impl fmt::Debug for CaptureAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureAdapter")
            .field("camera", &self.camera.is_some())
            .field("microphone", &self.microphone.is_some())
            .field("file_picker", &self.file_picker.is_some())
            .field("recognizer", &self.recognizer.is_some())
            .field("transcriber", &self.transcriber.is_some())
            .field("limits", &self.limits)
            .finish()
    }
}

impl CaptureAdapter {
    #[must_use]
    pub fn new(limits: CaptureLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn with_camera(mut self, camera: Arc<dyn Camera>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_microphone(mut self, microphone: Arc<dyn Microphone>) -> Self {
        self.microphone = Some(microphone);
        self
    }

    pub fn with_file_picker(mut self, picker: Arc<dyn FilePicker>) -> Self {
        self.file_picker = Some(picker);
        self
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn SpeechTranscriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Acquire and extract in one call.
    pub async fn capture(&self, source: CaptureSource) -> Result<RawCapture, CaptureError> {
        let acquired = self.acquire(source).await?;
        self.extract(acquired).await
    }

    pub async fn acquire(&self, source: CaptureSource) -> Result<Acquired, CaptureError> {
        match source {
            CaptureSource::Camera => {
                let camera = self
                    .camera
                    .as_ref()
                    .ok_or_else(|| CaptureError::unavailable(Device::Camera))?;
                if camera.request_permission().await? == Permission::Denied {
                    return Err(CaptureError::PermissionDenied {
                        device: Device::Camera,
                    });
                }
                let frame = camera.capture().await?;
                Ok(Acquired {
                    modality: CaptureModality::Image,
                    source: Device::Camera.to_string(),
                    payload: Payload::Image(frame),
                })
            }
            CaptureSource::Microphone => {
                let microphone = self
                    .microphone
                    .as_ref()
                    .ok_or_else(|| CaptureError::unavailable(Device::Microphone))?;
                if microphone.request_permission().await? == Permission::Denied {
                    return Err(CaptureError::PermissionDenied {
                        device: Device::Microphone,
                    });
                }
                let clip = microphone.record(self.limits.max_recording).await?;
                if clip.bytes.is_empty() {
                    return Err(CaptureError::RecordingFailed(
                        "no audio was recorded".to_string(),
                    ));
                }
                Ok(Acquired {
                    modality: CaptureModality::Audio,
                    source: Device::Microphone.to_string(),
                    payload: Payload::Audio(clip),
                })
            }
            CaptureSource::PickFile => {
                let picker = self
                    .file_picker
                    .as_ref()
                    .ok_or_else(|| CaptureError::unavailable(Device::FilePicker))?;
                match picker.pick().await? {
                    Some(path) => self.read_upload(&path).await,
                    None => Err(CaptureError::Dismissed),
                }
            }
            CaptureSource::Upload(path) => self.read_upload(&path).await,
        }
    }

    async fn read_upload(&self, path: &Path) -> Result<Acquired, CaptureError> {
        let kind = UploadKind::from_path(path)?;
        let read_failed = |err: std::io::Error| CaptureError::ReadFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };

        let size = tokio::fs::metadata(path).await.map_err(read_failed)?.len();
        if size > self.limits.max_upload_bytes {
            return Err(CaptureError::FileTooLarge {
                size,
                limit: self.limits.max_upload_bytes,
            });
        }
        let bytes = tokio::fs::read(path).await.map_err(read_failed)?;

        let payload = match kind {
            UploadKind::Text => {
                let text = String::from_utf8(bytes).map_err(|_| CaptureError::ReadFailed {
                    path: path.to_path_buf(),
                    reason: "file is not valid UTF-8 text".to_string(),
                })?;
                Payload::Text(text)
            }
            UploadKind::Image(mime) => Payload::Image(ImageFrame { bytes, mime }),
            UploadKind::Pdf => Payload::Image(ImageFrame {
                bytes,
                mime: "application/pdf",
            }),
            UploadKind::Audio(mime) => Payload::Audio(AudioClip {
                bytes,
                mime,
                duration: None,
            }),
        };

        tracing::debug!(path = %path.display(), size, ?kind, "Upload acquired");
        Ok(Acquired {
            modality: kind.modality(),
            source: path.display().to_string(),
            payload,
        })
    }

    pub async fn extract(&self, acquired: Acquired) -> Result<RawCapture, CaptureError> {
        let Acquired {
            modality,
            source,
            payload,
        } = acquired;

        let extraction = match &payload {
            Payload::Text(text) => Extraction {
                text: text.clone(),
                confidence: None,
            },
            Payload::Image(frame) => {
                let recognizer = self.recognizer.as_ref().ok_or_else(|| {
                    CaptureError::RecognitionFailed("no text recognizer available".to_string())
                })?;
                recognizer.recognize(frame).await?
            }
            Payload::Audio(clip) => {
                let transcriber = self.transcriber.as_ref().ok_or_else(|| {
                    CaptureError::TranscriptionFailed(
                        "no speech transcriber available".to_string(),
                    )
                })?;
                transcriber.transcribe(clip).await?
            }
        };

        let text = normalize_text(&extraction.text);
        tracing::debug!(
            %modality,
            chars = text.chars().count(),
            confidence = ?extraction.confidence,
            "Capture extracted"
        );
        Ok(RawCapture::new(
            modality,
            source,
            text,
            extraction.confidence.and_then(clamp_unit),
        ))
    }
}

/// Canonical text form shared by every modality.
///
/// NFC-normalized, `\n` line endings, no control characters other than
/// newline and tab, no trailing whitespace on lines, at most one blank line
/// in a row, trimmed.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    let unified: String = raw
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .nfc()
        .filter(|c| *c == '\n' || *c == '\t' || !c.is_control())
        .collect();

    let mut out = String::with_capacity(unified.len());
    let mut blank_run = 0;
    for line in unified.split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}
