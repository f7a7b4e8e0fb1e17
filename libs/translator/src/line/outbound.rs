//! Reply API payloads for LINE.

use amb_core::{Answer, Button, ButtonType, Carousel};
use serde::Serialize;
use serde_json::Value;

/// Carousel columns beyond this many are dropped.
pub const MAX_COLUMNS: usize = 5;
/// Actions per carousel column, the item link included.
pub const MAX_ACTIONS_PER_COLUMN: usize = 4;
/// Buttons template choices; extra answers are cut from the front.
pub const MAX_QUESTION_ACTIONS: usize = 4;

const BUTTONS_ALT_TEXT: &str = "this is a buttons template";
const CAROUSEL_ALT_TEXT: &str = "this is a carousel template";
const ITEM_LINK_LABEL: &str = "Item Link";

/// One entry of the reply `messages` array.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LineFragment {
    Text {
        text: String,
    },
    Template {
        #[serde(rename = "altText")]
        alt_text: String,
        template: LineTemplate,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LineTemplate {
    Buttons {
        text: String,
        actions: Vec<LineAction>,
    },
    Carousel {
        columns: Vec<LineColumn>,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LineAction {
    Postback {
        label: String,
        data: String,
        text: String,
    },
    Uri {
        label: String,
        uri: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineColumn {
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub thumbnail_image_url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<LineAction>,
}

pub fn text(text: &str) -> LineFragment {
    LineFragment::Text {
        text: text.to_string(),
    }
}

/// Buttons template with a postback action per answer, keeping only the last
/// [`MAX_QUESTION_ACTIONS`] answers.
///
/// ```
/// use amb_core::Answer;
/// use amb_translator::line::{LineAction, LineFragment, LineTemplate, question};
///
/// let answers: Vec<Answer> = ["a", "b", "c", "d", "e", "f"]
///     .iter()
///     .map(|s| Answer::new(*s, *s))
///     .collect();
/// let LineFragment::Template { template: LineTemplate::Buttons { actions, .. }, .. } =
///     question("Pick one", &answers)
/// else {
///     panic!("expected a buttons template");
/// };
/// let labels: Vec<_> = actions
///     .iter()
///     .map(|a| match a {
///         LineAction::Postback { label, .. } | LineAction::Uri { label, .. } => label.as_str(),
///     })
///     .collect();
/// assert_eq!(labels, ["c", "d", "e", "f"]);
/// ```
pub fn question(text: &str, answers: &[Answer]) -> LineFragment {
    let start = answers.len().saturating_sub(MAX_QUESTION_ACTIONS);
    let actions = answers[start..]
        .iter()
        .map(|answer| LineAction::Postback {
            label: answer.title.clone(),
            data: answer.payload.clone(),
            text: answer.title.clone(),
        })
        .collect();

    LineFragment::Template {
        alt_text: BUTTONS_ALT_TEXT.to_string(),
        template: LineTemplate::Buttons {
            text: text.to_string(),
            actions,
        },
    }
}

/// Carousel template built from the first [`MAX_COLUMNS`] cards.
pub fn carousel(cards: &[Carousel]) -> LineFragment {
    let columns = cards.iter().take(MAX_COLUMNS).map(column).collect();
    LineFragment::Template {
        alt_text: CAROUSEL_ALT_TEXT.to_string(),
        template: LineTemplate::Carousel { columns },
    }
}

fn column(card: &Carousel) -> LineColumn {
    let mut actions = Vec::new();
    if !card.item_url.is_empty() {
        actions.push(LineAction::Uri {
            label: ITEM_LINK_LABEL.to_string(),
            uri: card.item_url.clone(),
        });
    }
    actions.extend(card.buttons.iter().filter_map(action));
    actions.truncate(MAX_ACTIONS_PER_COLUMN);

    LineColumn {
        title: card.title.clone(),
        text: card.text.clone(),
        thumbnail_image_url: card.image_url.clone(),
        actions,
    }
}

fn action(btn: &Button) -> Option<LineAction> {
    match btn.kind {
        ButtonType::Url => Some(LineAction::Uri {
            label: btn.label.clone(),
            uri: btn.data.clone(),
        }),
        ButtonType::AccountLink | ButtonType::Share | ButtonType::Unsupported => None,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: &'a [LineFragment],
}

/// Body of the single reply call carrying the whole batch.
pub fn reply_body(
    reply_token: &str,
    messages: &[LineFragment],
) -> Result<Value, serde_json::Error> {
    serde_json::to_value(ReplyRequest {
        reply_token,
        messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_fragment() {
        assert_eq!(
            serde_json::to_value(text("hello")).unwrap(),
            json!({"type": "text", "text": "hello"})
        );
    }

    #[test]
    fn question_keeps_last_four_in_order() {
        let answers: Vec<Answer> = (1..=6)
            .map(|i| Answer::new(format!("A{i}"), format!("P{i}")))
            .collect();
        let value = serde_json::to_value(question("Pick", &answers)).unwrap();
        assert_eq!(value["type"], "template");
        assert_eq!(value["altText"], "this is a buttons template");
        assert_eq!(value["template"]["type"], "buttons");
        assert_eq!(value["template"]["text"], "Pick");
        let actions = value["template"]["actions"].as_array().unwrap();
        let data: Vec<&str> = actions.iter().map(|a| a["data"].as_str().unwrap()).collect();
        assert_eq!(data, ["P3", "P4", "P5", "P6"]);
        assert_eq!(
            actions[0],
            json!({"type": "postback", "label": "A3", "data": "P3", "text": "A3"})
        );
    }

    #[test]
    fn question_with_few_answers_keeps_all() {
        let answers = vec![Answer::new("Yes", "Y"), Answer::new("No", "N")];
        let value = serde_json::to_value(question("Ok?", &answers)).unwrap();
        assert_eq!(value["template"]["actions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn carousel_caps_columns_and_actions() {
        let cards: Vec<Carousel> = (0..7)
            .map(|i| Carousel {
                title: format!("C{i}"),
                text: "body".into(),
                image_url: "https://example.com/i.png".into(),
                item_url: "https://example.com/item".into(),
                buttons: (0..6)
                    .map(|b| Button::url(format!("B{b}"), format!("https://example.com/{b}")))
                    .collect(),
            })
            .collect();
        let value = serde_json::to_value(carousel(&cards)).unwrap();
        let columns = value["template"]["columns"].as_array().unwrap();
        assert_eq!(columns.len(), 5);
        let actions = columns[0]["actions"].as_array().unwrap();
        assert_eq!(actions.len(), 4);
        assert_eq!(
            actions[0],
            json!({"type": "uri", "label": "Item Link", "uri": "https://example.com/item"})
        );
        assert_eq!(actions[3]["label"], "B2");
    }

    #[test]
    fn column_shape_drops_unmapped_buttons() {
        let cards = vec![Carousel {
            title: "Shoe".into(),
            text: "Size 42".into(),
            buttons: vec![
                Button::share(),
                Button::account_link("https://example.com/login"),
                Button::url("Buy", "https://example.com/buy"),
            ],
            ..Default::default()
        }];
        let value = serde_json::to_value(carousel(&cards)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "template",
                "altText": "this is a carousel template",
                "template": {
                    "type": "carousel",
                    "columns": [{
                        "title": "Shoe",
                        "text": "Size 42",
                        "actions": [{"type": "uri", "label": "Buy", "uri": "https://example.com/buy"}]
                    }]
                }
            })
        );
    }

    #[test]
    fn reply_body_wraps_batch() {
        let body = reply_body("tok", &[text("a"), text("b")]).unwrap();
        assert_eq!(
            body,
            json!({
                "replyToken": "tok",
                "messages": [{"type": "text", "text": "a"}, {"type": "text", "text": "b"}]
            })
        );
    }
}
