/// Session-only API keys for the generation services.
///
/// Keys live in memory for the lifetime of a `SessionKeys` value. They are
/// never written to the project store and never appear in logs or `Debug`
/// output.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::info;

use crate::core::analysis::trim_space;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("unknown provider '{provider}' for {service}")]
    UnknownProvider { service: Service, provider: String },
    #[error("API key is empty")]
    EmptyKey,
}

/// A generation service that needs an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Service {
    ImageGeneration,
    VideoGeneration,
}

impl Service {
    pub const ALL: [Service; 2] = [Self::ImageGeneration, Self::VideoGeneration];

    pub fn key(&self) -> &'static str {
        match self {
            Self::ImageGeneration => "imageGeneration",
            Self::VideoGeneration => "videoGeneration",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ImageGeneration => "Image Generation",
            Self::VideoGeneration => "Video Generation",
        }
    }

    pub fn from_key(key: &str) -> Option<Service> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn providers(&self) -> &'static [Provider] {
        match self {
            Self::ImageGeneration => &IMAGE_PROVIDERS,
            Self::VideoGeneration => &VIDEO_PROVIDERS,
        }
    }

    pub fn provider(&self, id: &str) -> Option<&'static Provider> {
        self.providers().iter().find(|p| p.id == id)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub id: &'static str,
    pub name: &'static str,
    /// Example key shape shown in input fields.
    pub placeholder: &'static str,
    pub info: &'static str,
}

const CUSTOM_PROVIDER: Provider = Provider {
    id: "custom",
    name: "Custom API",
    placeholder: "your-api-key",
    info: "Enter your custom API endpoint and key. Make sure it's compatible with the expected format.",
};

static IMAGE_PROVIDERS: [Provider; 5] = [
    Provider {
        id: "openai-dalle",
        name: "OpenAI DALL-E",
        placeholder: "sk-...",
        info: "Get your API key from OpenAI Platform (platform.openai.com). DALL-E 3 provides high-quality image generation.",
    },
    Provider {
        id: "stability-ai",
        name: "Stability AI",
        placeholder: "sk-...",
        info: "Get your API key from Stability AI (stability.ai). Known for Stable Diffusion models.",
    },
    Provider {
        id: "midjourney",
        name: "Midjourney (via API)",
        placeholder: "mj-...",
        info: "Midjourney requires a third-party API service. Check community resources for API access.",
    },
    Provider {
        id: "replicate",
        name: "Replicate",
        placeholder: "r8_...",
        info: "Get your API key from Replicate (replicate.com). Access to various AI models including image generation.",
    },
    CUSTOM_PROVIDER,
];

static VIDEO_PROVIDERS: [Provider; 4] = [
    Provider {
        id: "runwayml",
        name: "RunwayML",
        placeholder: "rwml-...",
        info: "Get your API key from RunwayML (runwayml.com). Specialized in video generation and editing.",
    },
    Provider {
        id: "kling",
        name: "Kling AI",
        placeholder: "kling-...",
        info: "Kling AI provides video generation services. Check their website for API access.",
    },
    Provider {
        id: "pika",
        name: "Pika Labs",
        placeholder: "pk-...",
        info: "Pika Labs offers video generation. Check their platform for API availability.",
    },
    CUSTOM_PROVIDER,
];

/// A stored key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey {
    pub provider: String,
    key: String,
    pub added_at: DateTime<Utc>,
}

impl SessionKey {
    pub fn secret(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("provider", &self.provider)
            .field("key", &"<redacted>")
            .field("added_at", &self.added_at)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStatus {
    None,
    Active {
        provider: String,
        /// Provider display name, or "API" if the provider is not listed.
        provider_name: String,
    },
}

impl KeyStatus {
    pub fn display(&self) -> String {
        match self {
            Self::None => "No API key".to_string(),
            Self::Active { provider_name, .. } => format!("{} connected", provider_name),
        }
    }
}

/// In-memory key registry, one key per service.
#[derive(Debug, Clone, Default)]
pub struct SessionKeys {
    image_generation: Option<SessionKey>,
    video_generation: Option<SessionKey>,
}

impl SessionKeys {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, service: Service) -> &Option<SessionKey> {
        match service {
            Service::ImageGeneration => &self.image_generation,
            Service::VideoGeneration => &self.video_generation,
        }
    }

    fn slot_mut(&mut self, service: Service) -> &mut Option<SessionKey> {
        match service {
            Service::ImageGeneration => &mut self.image_generation,
            Service::VideoGeneration => &mut self.video_generation,
        }
    }

    /// Store a key for `service`, replacing any previous one. The key is trimmed.
    pub fn set_key(&mut self, service: Service, provider: &str, key: &str) -> Result<(), KeyError> {
        if service.provider(provider).is_none() {
            return Err(KeyError::UnknownProvider {
                service,
                provider: provider.to_string(),
            });
        }
        let key = trim_space(key);
        if key.is_empty() {
            return Err(KeyError::EmptyKey);
        }

        *self.slot_mut(service) = Some(SessionKey {
            provider: provider.to_string(),
            key: key.to_string(),
            added_at: Utc::now(),
        });
        info!(service = service.key(), provider, "API key saved for this session");
        Ok(())
    }

    pub fn get_key(&self, service: Service) -> Option<&SessionKey> {
        self.slot(service).as_ref()
    }

    pub fn has_key(&self, service: Service) -> bool {
        self.slot(service).is_some()
    }

    pub fn clear_key(&mut self, service: Service) {
        *self.slot_mut(service) = None;
    }

    pub fn clear_all(&mut self) {
        self.image_generation = None;
        self.video_generation = None;
    }

    pub fn status(&self, service: Service) -> KeyStatus {
        match self.slot(service) {
            None => KeyStatus::None,
            Some(key) => KeyStatus::Active {
                provider: key.provider.clone(),
                provider_name: service
                    .provider(&key.provider)
                    .map_or("API", |p| p.name)
                    .to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_lists() {
        let image: Vec<&str> = Service::ImageGeneration
            .providers()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(
            image,
            vec!["openai-dalle", "stability-ai", "midjourney", "replicate", "custom"]
        );
        let video: Vec<&str> = Service::VideoGeneration
            .providers()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(video, vec!["runwayml", "kling", "pika", "custom"]);
    }

    #[test]
    fn set_get_clear() {
        let mut keys = SessionKeys::new();
        assert!(!keys.has_key(Service::ImageGeneration));
        assert_eq!(keys.status(Service::ImageGeneration), KeyStatus::None);

        keys.set_key(Service::ImageGeneration, "replicate", "  r8_secret ")
            .unwrap();
        assert!(keys.has_key(Service::ImageGeneration));
        assert!(!keys.has_key(Service::VideoGeneration));
        assert_eq!(
            keys.get_key(Service::ImageGeneration).unwrap().secret(),
            "r8_secret"
        );
        assert_eq!(
            keys.status(Service::ImageGeneration).display(),
            "Replicate connected"
        );

        keys.clear_key(Service::ImageGeneration);
        assert!(!keys.has_key(Service::ImageGeneration));
    }

    #[test]
    fn clear_all_drops_every_key() {
        let mut keys = SessionKeys::new();
        keys.set_key(Service::ImageGeneration, "custom", "a").unwrap();
        keys.set_key(Service::VideoGeneration, "pika", "b").unwrap();
        keys.clear_all();
        assert!(Service::ALL.iter().all(|s| !keys.has_key(*s)));
    }

    #[test]
    fn rejects_bad_input() {
        let mut keys = SessionKeys::new();
        assert_eq!(
            keys.set_key(Service::ImageGeneration, "runwayml", "k"),
            Err(KeyError::UnknownProvider {
                service: Service::ImageGeneration,
                provider: "runwayml".to_string(),
            })
        );
        assert_eq!(
            keys.set_key(Service::VideoGeneration, "kling", "   "),
            Err(KeyError::EmptyKey)
        );
    }

    #[test]
    fn debug_redacts_secret() {
        let mut keys = SessionKeys::new();
        keys.set_key(Service::ImageGeneration, "openai-dalle", "sk-topsecret")
            .unwrap();
        let printed = format!("{:?}", keys);
        assert!(!printed.contains("topsecret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn service_keys_round_trip() {
        for service in Service::ALL {
            assert_eq!(Service::from_key(service.key()), Some(service));
        }
        assert_eq!(Service::from_key("audioGeneration"), None);
    }
}
