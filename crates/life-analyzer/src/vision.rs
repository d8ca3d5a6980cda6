//! Computer vision image analysis client.

use life_core::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const ANALYZE_PATH: &str = "vision/v3.2/analyze";
const VISUAL_FEATURES: &str = "Categories,Description,Color";
const SUBSCRIPTION_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub description: Option<Description>,
    #[serde(default)]
    pub color: Option<ColorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub captions: Vec<Caption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorInfo {
    #[serde(default)]
    pub dominant_color_foreground: String,
    #[serde(default)]
    pub dominant_color_background: String,
    #[serde(default)]
    pub dominant_colors: Vec<String>,
    #[serde(default)]
    pub accent_color: String,
    #[serde(default, rename = "isBwImg")]
    pub is_bw_img: bool,
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    url: &'a str,
}

/// Analyzes images by URL. Endpoint and key are checked on first use.
pub struct VisionClient {
    http_client: Client,
    endpoint: Option<String>,
    subscription_key: Option<String>,
}

impl VisionClient {
    pub fn new(http_client: Client, endpoint: Option<String>, subscription_key: Option<String>) -> Self {
        Self {
            http_client,
            endpoint,
            subscription_key,
        }
    }

    fn analyze_url(&self) -> Result<String> {
        let endpoint = self
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| Error::InvalidConfig("COMPUTER_VISION_ENDPOINT is not set".to_string()))?;

        Ok(format!(
            "{}/{}?visualFeatures={}",
            endpoint.trim_end_matches('/'),
            ANALYZE_PATH,
            VISUAL_FEATURES
        ))
    }

    #[instrument(skip(self, image_url))]
    pub async fn analyze_image(&self, image_url: &str) -> Result<ImageAnalysis> {
        let url = self.analyze_url()?;
        let key = self.subscription_key.as_deref().ok_or_else(|| {
            Error::InvalidConfig("COMPUTER_VISION_SUBSCRIPTION_KEY is not set".to_string())
        })?;

        debug!("Requesting analysis from {}", url);

        let response = self
            .http_client
            .post(&url)
            .header(SUBSCRIPTION_HEADER, key)
            .json(&AnalyzeRequest { url: image_url })
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Remote {
                service: "computer vision".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "categories": [{"name": "abstract_", "score": 0.00390625}, {"name": "others_", "score": 0.0078125}],
        "color": {
            "dominantColorForeground": "White",
            "dominantColorBackground": "White",
            "dominantColors": ["White"],
            "accentColor": "8C2F8C",
            "isBwImg": false,
            "isBWImg": false
        },
        "description": {
            "tags": ["text", "screenshot", "purple"],
            "captions": [{"text": "a purple and white pattern", "confidence": 0.4215}]
        },
        "requestId": "0d1a1f1e-1111-4c5d-9a8b-7f6e5d4c3b2a",
        "metadata": {"height": 800, "width": 800, "format": "Png"},
        "modelVersion": "2021-05-01"
    }"##;

    #[test]
    fn test_parse_analysis() {
        let analysis: ImageAnalysis = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(analysis.categories.len(), 2);
        assert_eq!(analysis.categories[0].name, "abstract_");

        let description = analysis.description.unwrap();
        assert_eq!(description.tags, vec!["text", "screenshot", "purple"]);
        assert_eq!(description.captions[0].text, "a purple and white pattern");

        let color = analysis.color.unwrap();
        assert_eq!(color.accent_color, "8C2F8C");
        assert!(!color.is_bw_img);
    }

    #[test]
    fn test_parse_sparse_analysis() {
        let analysis: ImageAnalysis = serde_json::from_str("{}").unwrap();
        assert!(analysis.categories.is_empty());
        assert!(analysis.description.is_none());
        assert!(analysis.color.is_none());
    }

    #[test]
    fn test_analyze_url() {
        let client = VisionClient::new(
            Client::new(),
            Some("https://life.cognitiveservices.azure.com/".to_string()),
            Some("key".to_string()),
        );
        assert_eq!(
            client.analyze_url().unwrap(),
            "https://life.cognitiveservices.azure.com/vision/v3.2/analyze?visualFeatures=Categories,Description,Color"
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_on_use() {
        let no_endpoint = VisionClient::new(Client::new(), None, Some("key".to_string()));
        assert!(matches!(
            no_endpoint.analyze_image("http://x/y.png").await,
            Err(Error::InvalidConfig(_))
        ));

        let no_key = VisionClient::new(Client::new(), Some("http://localhost:1".to_string()), None);
        assert!(matches!(
            no_key.analyze_image("http://x/y.png").await,
            Err(Error::InvalidConfig(_))
        ));
    }
}
