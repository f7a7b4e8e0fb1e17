//! Generic multi-card rich message handed to `send_template`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AdapterError;

/// One card of a carousel.
///
/// ```
/// use amb_core::{ButtonType, Carousel};
/// use serde_json::json;
///
/// let cards = Carousel::list_from_value(json!([{
///     "title": "Shoe",
///     "text": "Size 42",
///     "buttons": [{"label": "Buy", "type": "url", "data": "https://shop.example/42"}]
/// }]))
/// .unwrap();
/// assert_eq!(cards[0].buttons[0].kind, ButtonType::Url);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Carousel {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub item_url: String,
    #[serde(default)]
    pub buttons: Vec<Button>,
}

impl Carousel {
    /// Validates a dynamically typed carousel list. Anything that is not a list of cards is a
    /// [`AdapterError::TypeMismatch`].
    pub fn list_from_value(value: Value) -> Result<Vec<Carousel>, AdapterError> {
        serde_json::from_value(value).map_err(|source| AdapterError::TypeMismatch {
            expected: "a list of carousel cards",
            source,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Button {
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ButtonType,
    /// Link target for `url` and `account_link` buttons.
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_ratio: Option<WebviewHeight>,
    #[serde(default)]
    pub extensions: bool,
}

impl Button {
    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonType::Url,
            data: url.into(),
            height_ratio: None,
            extensions: false,
        }
    }

    pub fn account_link(url: impl Into<String>) -> Self {
        Self {
            label: String::new(),
            kind: ButtonType::AccountLink,
            data: url.into(),
            height_ratio: None,
            extensions: false,
        }
    }

    pub fn share() -> Self {
        Self {
            label: String::new(),
            kind: ButtonType::Share,
            data: String::new(),
            height_ratio: None,
            extensions: false,
        }
    }
}

/// Button kinds the encoders know about. Other tags decode to `Unsupported` and are left out of
/// every encoded template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ButtonType {
    Url,
    AccountLink,
    Share,
    #[serde(other)]
    Unsupported,
}

/// Webview size hint for `url` buttons (Facebook only).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WebviewHeight {
    Compact,
    Tall,
    Full,
}
