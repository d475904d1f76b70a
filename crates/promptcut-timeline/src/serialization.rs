//! The external timeline wire format.
//!
//! The rendering backend consumes a fixed-lane timeline: one track per lane
//! kind (video, audio, subtitle, effect), clip times as integer frames, a
//! frame rate, and a schema version. The core does not own this contract; it
//! only has to populate it correctly.

use promptcut_core::{FrameRate, PromptcutError, Result};
use serde::{Deserialize, Serialize};

use crate::clip::{Clip, ClipId, ClipKind};
use crate::composition::Composition;

/// Current wire schema version.
pub const CURRENT_VERSION: u32 = 1;

/// The fixed lane enum of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneKind {
    Video,
    Audio,
    Subtitle,
    Effect,
}

impl LaneKind {
    /// Which lane a clip kind is serialized into.
    pub fn for_clip(kind: ClipKind) -> Self {
        match kind {
            ClipKind::Video => Self::Video,
            ClipKind::Audio => Self::Audio,
            ClipKind::Text => Self::Subtitle,
            ClipKind::Overlay | ClipKind::Effect => Self::Effect,
        }
    }

    /// Display name used on the wire ("Video 1", "Subtitles", ...).
    fn track_name(self) -> &'static str {
        match self {
            Self::Video => "Video 1",
            Self::Audio => "Audio 1",
            Self::Subtitle => "Subtitles",
            Self::Effect => "Effects",
        }
    }

    /// Track index a lane maps back to when reading the wire format.
    fn track_index(self) -> usize {
        match self {
            Self::Video => 0,
            Self::Audio => 1,
            Self::Subtitle => 2,
            Self::Effect => 3,
        }
    }

    /// Clip kind a lane maps back to.
    fn clip_kind(self) -> ClipKind {
        match self {
            Self::Video => ClipKind::Video,
            Self::Audio => ClipKind::Audio,
            Self::Subtitle => ClipKind::Text,
            Self::Effect => ClipKind::Effect,
        }
    }
}

/// A clip on the wire. Times are integer frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipData {
    pub id: ClipId,
    pub name: String,
    pub start: i64,
    pub end: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

/// One lane of the wire timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackData {
    pub name: String,
    pub track_type: LaneKind,
    pub clips: Vec<ClipData>,
}

/// The serialized timeline handed to the rendering backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineFile {
    pub version: u32,
    pub frame_rate: f64,
    pub tracks: Vec<TrackData>,
}

impl TimelineFile {
    /// Build the wire timeline from a composition.
    ///
    /// Video and audio clips must carry a resolvable source path; a clip
    /// without one is a recoverable user-facing condition, not a crash.
    pub fn from_composition(comp: &Composition, rate: FrameRate) -> Result<Self> {
        for clip in comp.clips() {
            let needs_source = matches!(clip.kind, ClipKind::Video | ClipKind::Audio);
            if needs_source && clip.source_path.is_none() {
                return Err(PromptcutError::MissingSource(clip.name.clone()));
            }
        }

        let lanes = [
            LaneKind::Video,
            LaneKind::Audio,
            LaneKind::Subtitle,
            LaneKind::Effect,
        ];
        let tracks = lanes
            .into_iter()
            .map(|lane| {
                let mut clips: Vec<&Clip> = comp
                    .clips()
                    .iter()
                    .filter(|c| LaneKind::for_clip(c.kind) == lane)
                    .collect();
                clips.sort_by(|a, b| a.start.total_cmp(&b.start));
                TrackData {
                    name: lane.track_name().to_string(),
                    track_type: lane,
                    clips: clips
                        .into_iter()
                        .map(|c| ClipData {
                            id: c.id,
                            name: c.name.clone(),
                            start: rate.seconds_to_frames(c.start),
                            end: rate.seconds_to_frames(c.end),
                            source_path: c.source_path.clone(),
                        })
                        .collect(),
                }
            })
            .collect();

        Ok(Self {
            version: CURRENT_VERSION,
            frame_rate: rate.to_fps_f64(),
            tracks,
        })
    }

    /// Reconstruct a composition from the wire timeline.
    pub fn into_composition(self) -> Composition {
        let fps = self.frame_rate;
        let mut comp = Composition::new();
        for track in self.tracks {
            let lane = track.track_type;
            for data in track.clips {
                let clip = Clip {
                    id: data.id,
                    track: lane.track_index(),
                    start: data.start as f64 / fps,
                    end: data.end as f64 / fps,
                    kind: lane.clip_kind(),
                    name: data.name,
                    thumbnail: None,
                    source_path: data.source_path,
                };
                comp.add(clip);
            }
        }
        comp
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| PromptcutError::Serialization(format!("failed to serialize timeline: {e}")))
    }

    /// Deserialize from JSON bytes, rejecting newer schema versions.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| PromptcutError::Serialization(format!("invalid JSON: {e}")))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        if version > CURRENT_VERSION {
            return Err(PromptcutError::Serialization(format!(
                "timeline version {version} is newer than supported version {CURRENT_VERSION}"
            )));
        }

        serde_json::from_value(raw)
            .map_err(|e| PromptcutError::Serialization(format!("failed to parse timeline: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comp() -> Composition {
        let mut comp = Composition::new();
        comp.add(Clip::new("intro", ClipKind::Video, 0, 0.0, 5.0).with_source("media/intro.mp4"));
        comp.add(Clip::new("music", ClipKind::Audio, 1, 0.0, 8.0).with_source("media/music.wav"));
        comp.add(Clip::new("caption", ClipKind::Text, 2, 1.0, 3.0));
        comp
    }

    #[test]
    fn test_wire_shape() {
        let file = TimelineFile::from_composition(&comp(), FrameRate::FPS_30).unwrap();
        assert_eq!(file.version, CURRENT_VERSION);
        assert_eq!(file.frame_rate, 30.0);
        assert_eq!(file.tracks.len(), 4);
        assert_eq!(file.tracks[0].name, "Video 1");
        assert_eq!(file.tracks[0].clips.len(), 1);
        // Times land on the wire as frames.
        assert_eq!(file.tracks[0].clips[0].start, 0);
        assert_eq!(file.tracks[0].clips[0].end, 150);
        assert_eq!(file.tracks[2].track_type, LaneKind::Subtitle);
        assert_eq!(file.tracks[2].clips.len(), 1);
    }

    #[test]
    fn test_missing_source_is_recoverable_error() {
        let mut c = comp();
        c.add(Clip::new("orphan", ClipKind::Video, 3, 0.0, 2.0));
        let result = TimelineFile::from_composition(&c, FrameRate::FPS_30);
        assert!(matches!(result, Err(PromptcutError::MissingSource(ref name)) if name == "orphan"));
    }

    #[test]
    fn test_roundtrip() {
        let original = comp();
        let file = TimelineFile::from_composition(&original, FrameRate::FPS_30).unwrap();
        let json = file.to_json().unwrap();
        let loaded = TimelineFile::from_json(&json).unwrap();
        let restored = loaded.into_composition();

        assert_eq!(restored.clip_count(), original.clip_count());
        let video = restored.clips_on_track(0);
        assert_eq!(video.len(), 1);
        assert_eq!(video[0].name, "intro");
        assert_eq!((video[0].start, video[0].end), (0.0, 5.0));
    }

    #[test]
    fn test_future_version_rejected() {
        let json = serde_json::json!({
            "version": 99,
            "frame_rate": 30.0,
            "tracks": [],
        });
        let data = serde_json::to_vec(&json).unwrap();
        assert!(TimelineFile::from_json(&data).is_err());
    }

    #[test]
    fn test_text_clips_need_no_source() {
        let mut c = Composition::new();
        c.add(Clip::new("caption", ClipKind::Text, 2, 0.0, 3.0));
        assert!(TimelineFile::from_composition(&c, FrameRate::FPS_30).is_ok());
    }
}
