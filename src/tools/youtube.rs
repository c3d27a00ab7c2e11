use super::{tool::ToolFuture, Tool, DEFAULT_TOOL_TIMEOUT};
use crate::{
    schemas::{decode_arguments, params_schema},
    AgentError,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
const CAPTION_TRACKS_MARKER: &str = "\"captionTracks\":";

/// Parameters for transcript lookups
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TranscriptParams {
    /// Full YouTube URL or the bare video ID
    pub video_url: String,
}

/// One timed caption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

/// Fetches the captions published for a YouTube video
#[derive(Debug, Clone)]
pub struct TranscriptTool {
    base_url: String,
    language: String,
    timeout: Duration,
    client: Client,
}

impl Default for TranscriptTool {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptTool {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "en".to_string(),
            timeout: DEFAULT_TOOL_TIMEOUT,
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Preferred caption language code
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, AgentError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header("Accept-Language", "en-US")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| AgentError::ToolExecution(format!("Failed to call YouTube: {}", err)))?;

        if !response.status().is_success() {
            return Err(AgentError::ToolExecution(format!(
                "YouTube returned status {}",
                response.status()
            )));
        }

        response.text().await.map_err(|err| {
            AgentError::ToolExecution(format!("Failed to read YouTube response: {}", err))
        })
    }

    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, AgentError> {
        let watch_url = format!("{}/watch", self.base_url.trim_end_matches('/'));
        let page = self.get_text(&watch_url, &[("v", video_id)]).await?;

        let tracks = extract_caption_tracks(&page).ok_or_else(|| {
            AgentError::ToolExecution(format!("No transcript available for video {}", video_id))
        })?;
        let track = pick_track(&tracks, &self.language).ok_or_else(|| {
            AgentError::ToolExecution(format!("Video {} has no caption tracks", video_id))
        })?;

        let xml = self.get_text(&track.base_url, &[]).await?;
        parse_timed_text(&xml)
    }
}

impl Tool for TranscriptTool {
    fn name(&self) -> &'static str {
        "get_youtube_transcript"
    }

    fn description(&self) -> &'static str {
        "Returns the transcript of a YouTube video when provided a video_url or ID."
    }

    fn return_format(&self) -> &'static str {
        "Optional[List[Dict[str, str]]]: List of transcript segments with text and timestamps, or None if transcript is not available"
    }

    fn parameters_schema(&self) -> Value {
        params_schema::<TranscriptParams>()
    }

    fn execute(&self, parameters: Value) -> ToolFuture<'_> {
        Box::pin(async move {
            let params: TranscriptParams = decode_arguments(self.name(), parameters)?;
            let video_id = extract_video_id(&params.video_url);
            if video_id.is_empty() {
                return Err(AgentError::ToolExecution(format!(
                    "Could not find a video ID in {:?}",
                    params.video_url
                )));
            }

            let segments = self.fetch(&video_id).await?;
            serde_json::to_value(segments).map_err(|e| {
                AgentError::ToolExecution(format!("Failed to serialize result: {}", e))
            })
        })
    }
}

/// Resolve a watch URL, short link or bare ID to the video ID
pub fn extract_video_id(video_url: &str) -> String {
    let input = video_url.trim();
    if !(input.contains("youtube.com") || input.contains("youtu.be")) {
        return input.to_string();
    }

    if let Some((_, after)) = input.split_once("v=") {
        return after.split('&').next().unwrap_or_default().to_string();
    }

    let path = input.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn extract_caption_tracks(page: &str) -> Option<Vec<CaptionTrack>> {
    let start = page.find(CAPTION_TRACKS_MARKER)? + CAPTION_TRACKS_MARKER.len();
    // The track list is followed by the rest of the player config; only the first value is read.
    let mut stream = serde_json::Deserializer::from_str(&page[start..]).into_iter::<Vec<CaptionTrack>>();
    let tracks = stream.next()?.ok()?;
    if tracks.is_empty() {
        None
    } else {
        Some(tracks)
    }
}

/// Manual captions in the preferred language, then generated ones, then anything
fn pick_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let matches_language = |track: &&CaptionTrack| {
        track.language_code == language
            || track
                .language_code
                .split('-')
                .next()
                .is_some_and(|code| code == language)
    };
    let is_generated = |track: &&CaptionTrack| track.kind.as_deref() == Some("asr");

    tracks
        .iter()
        .filter(matches_language)
        .find(|track| !is_generated(track))
        .or_else(|| tracks.iter().find(matches_language))
        .or_else(|| tracks.first())
}

fn parse_timed_text(xml: &str) -> Result<Vec<TranscriptSegment>, AgentError> {
    let document = roxmltree::Document::parse(xml).map_err(|err| {
        AgentError::ToolExecution(format!("Failed to parse transcript XML: {}", err))
    })?;

    let segments = document
        .descendants()
        .filter(|node| node.has_tag_name("text"))
        .filter_map(|node| {
            let text: String = node
                .descendants()
                .filter(|child| child.is_text())
                .filter_map(|child| child.text())
                .collect();
            let text = unescape_html(text.trim());
            if text.is_empty() {
                return None;
            }
            let start = node.attribute("start")?.parse().ok()?;
            let duration = node
                .attribute("dur")
                .and_then(|value| value.parse().ok())
                .unwrap_or(0.0);
            Some(TranscriptSegment {
                text,
                start,
                duration,
            })
        })
        .collect();

    Ok(segments)
}

/// Caption text arrives HTML-escaped inside XML, so one entity layer is left after parsing
fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|end| {
            let entity = &tail[1..end];
            decode_entity(entity).map(|ch| (ch, end + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out.replace('\n', " ")
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
