//! Request/response JSON exchanged with the voice platform.

use crate::location::DeviceIdentity;
use serde::{Deserialize, Serialize};

pub const TOP_OFF_TODAY_INTENT: &str = "TopOffToday";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";

#[derive(Debug, Clone, Deserialize)]
pub struct SkillRequest {
    #[serde(default)]
    pub version: Option<String>,
    pub context: RequestContext,
    pub request: RequestBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestContext {
    #[serde(rename = "System")]
    pub system: SystemContext,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemContext {
    #[serde(default)]
    pub application: Option<Application>,
    pub user: User,
    pub device: Device,
    #[serde(default)]
    pub api_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub permissions: Option<Permissions>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    #[serde(default)]
    pub consent_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub intent: Option<Intent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub name: String,
}

/// What the request asks the skill to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Launch,
    Intent(&'a str),
    SessionEnded,
    Unknown,
}

impl SkillRequest {
    pub fn route(&self) -> Route<'_> {
        match self.request.kind.as_str() {
            "LaunchRequest" => Route::Launch,
            "SessionEndedRequest" => Route::SessionEnded,
            "IntentRequest" => match &self.request.intent {
                Some(intent) => Route::Intent(intent.name.as_str()),
                None => Route::Unknown,
            },
            _ => Route::Unknown,
        }
    }

    pub fn application_id(&self) -> Option<&str> {
        self.context
            .system
            .application
            .as_ref()
            .map(|a| a.application_id.as_str())
    }

    pub fn device_identity(&self) -> DeviceIdentity {
        let system = &self.context.system;
        DeviceIdentity {
            device_id: system.device.device_id.clone(),
            consent_token: system
                .user
                .permissions
                .as_ref()
                .and_then(|p| p.consent_token.clone()),
            api_endpoint: system.api_endpoint.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillResponse {
    pub version: String,
    pub response: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    pub should_end_session: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

impl OutputSpeech {
    fn plain(text: &str) -> Self {
        Self {
            kind: "PlainText".to_string(),
            text: text.to_string(),
        }
    }
}

impl SkillResponse {
    /// Speaks and ends the session.
    pub fn tell(text: &str) -> Self {
        Self::build(ResponseBody {
            output_speech: Some(OutputSpeech::plain(text)),
            reprompt: None,
            should_end_session: true,
        })
    }

    /// Speaks and waits for the user's answer, repeating the prompt if they stay silent.
    pub fn ask(text: &str) -> Self {
        Self::build(ResponseBody {
            output_speech: Some(OutputSpeech::plain(text)),
            reprompt: Some(Reprompt {
                output_speech: OutputSpeech::plain(text),
            }),
            should_end_session: false,
        })
    }

    pub fn end() -> Self {
        Self::build(ResponseBody {
            output_speech: None,
            reprompt: None,
            should_end_session: true,
        })
    }

    pub fn speech_text(&self) -> Option<&str> {
        self.response
            .output_speech
            .as_ref()
            .map(|s| s.text.as_str())
    }

    fn build(response: ResponseBody) -> Self {
        Self {
            version: "1.0".to_string(),
            response,
        }
    }
}
