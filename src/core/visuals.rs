/// Image prompt helpers for the visuals step.
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use url::Url;

use crate::core::analysis::trim_space;
use crate::schema::project::GeneratedImage;

/// Style suffixes `enhance_prompt` picks from.
pub const PROMPT_ENHANCEMENTS: [&str; 5] = [
    "detailed, high quality, cinematic lighting",
    "vibrant colors, professional photography",
    "dramatic composition, depth of field",
    "artistic style, beautiful aesthetic",
    "sharp focus, award-winning photography",
];

const MOCK_COLORS: [&str; 5] = ["e74c3c", "3498db", "2ecc71", "f39c12", "9b59b6"];
const MOCK_SIZE: &str = "400x300";
const MOCK_BATCH: usize = 2;

/// Append one random enhancement to `prompt`.
///
/// Returns `None` when the prompt already mentions "detailed".
pub fn enhance_prompt<R: Rng>(prompt: &str, rng: &mut R) -> Option<String> {
    if prompt.contains("detailed") {
        return None;
    }
    let enhancement = PROMPT_ENHANCEMENTS.choose(rng)?;
    Some(format!("{}, {}", prompt, enhancement))
}

/// Placeholder candidates standing in for a real image backend.
pub fn mock_images(prompt: &str) -> Vec<GeneratedImage> {
    let generated_at = Utc::now();
    MOCK_COLORS
        .iter()
        .take(MOCK_BATCH)
        .enumerate()
        .map(|(index, color)| GeneratedImage {
            url: format!(
                "https://via.placeholder.com/{}/{}/ffffff?text=Generated+{}",
                MOCK_SIZE,
                color,
                index + 1
            ),
            prompt: prompt.to_string(),
            generated_at,
        })
        .collect()
}

/// Trim and check that `input` is an absolute URL.
pub fn validate_image_url(input: &str) -> Result<String, url::ParseError> {
    let trimmed = trim_space(input);
    Url::parse(trimmed)?;
    Ok(trimmed.to_string())
}
