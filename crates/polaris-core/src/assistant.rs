//! # Investor Assistant Replies
//!
//! Scripted replies for the portal's investor chat. Investor conversations
//! are routed by business category and by keywords in the message; every
//! other conversation gets a generic acknowledgement.

use serde::{Deserialize, Serialize};

use crate::validation::{FromJsonPayload, PayloadReader, ValidationIssues};

/// Category used when the request names none or an unknown one.
pub const DEFAULT_CATEGORY: &str = "restaurants";

/// A validated chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub category: Option<String>,
    pub kind: Option<String>,
}

impl FromJsonPayload for ChatRequest {
    fn from_json(value: &serde_json::Value) -> Result<Self, ValidationIssues> {
        let mut reader = PayloadReader::new(value)?;
        let message = reader.required_text("message");
        let category = reader.optional_string("category", false);
        let kind = reader.optional_string("type", false);

        let issues = reader.into_issues();
        match message {
            Some(message) if issues.is_empty() => Ok(Self {
                message,
                category,
                kind,
            }),
            _ => Err(issues),
        }
    }
}

/// A suggested follow-up button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChatAction {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub action: String,
}

/// Person shown alongside an investor reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Entrepreneur {
    pub name: String,
    pub title: String,
    pub avatar: String,
}

/// License details attached to a business-setup reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct InvestorData {
    pub business_type: String,
    pub license_type: String,
    pub entrepreneur: Entrepreneur,
}

/// Reply returned to the chat widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    pub actions: Vec<ChatAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investor_data: Option<InvestorData>,
}

struct ActionScript(&'static str, &'static str, &'static str);

struct InvestorScript {
    business_type: &'static str,
    license_type: &'static str,
    name: &'static str,
    title: &'static str,
    avatar: &'static str,
}

struct ReplyScript {
    response: &'static str,
    actions: &'static [ActionScript],
    investor: Option<InvestorScript>,
}

struct CategoryScript {
    key: &'static str,
    business_setup: ReplyScript,
    market_analysis: Option<ReplyScript>,
}

const SCRIPTS: &[CategoryScript] = &[
    CategoryScript {
        key: "restaurants",
        business_setup: ReplyScript {
            response: "For restaurant investment in Abu Dhabi, you'll need a Commercial License for F&B. \
                The process involves obtaining health permits, liquor license (if applicable), municipality \
                approvals, and fire safety clearance. Initial investment typically ranges from AED 500,000 \
                to AED 2M depending on size and location.",
            actions: &[
                ActionScript("Explore more options", "secondary", "explore"),
                ActionScript("Set up business", "primary", "setup"),
                ActionScript("Start a Demo", "primary", "demo"),
            ],
            investor: Some(InvestorScript {
                business_type: "Restaurant",
                license_type: "Commercial License for F&B",
                name: "Khalid",
                title: "Entrepreneur",
                avatar: "https://api.builder.io/api/v1/image/assets/TEMP/0142e541255ee20520b15f139d595835c00ea132?width=131",
            }),
        },
        market_analysis: Some(ReplyScript {
            response: "Abu Dhabi's F&B market is valued at AED 12.8B with 15% annual growth. High-demand \
                areas include Al Reem Island, Corniche, and Marina Mall vicinity. Average restaurant ROI \
                is 18-25% within 2-3 years for well-positioned establishments.",
            actions: &[
                ActionScript("View market data", "secondary", "market_data"),
                ActionScript("Location analysis", "primary", "location"),
            ],
            investor: None,
        }),
    },
    CategoryScript {
        key: "fast-food",
        business_setup: ReplyScript {
            response: "Fast food franchises in Abu Dhabi require a Commercial License and franchise \
                agreements. Initial investment ranges from AED 200,000 to AED 800,000. Popular locations \
                include malls, business districts, and residential areas. Approval process takes 4-6 weeks.",
            actions: &[
                ActionScript("Franchise opportunities", "primary", "franchise"),
                ActionScript("Location scout", "secondary", "location"),
            ],
            investor: None,
        },
        market_analysis: None,
    },
    CategoryScript {
        key: "retail-store",
        business_setup: ReplyScript {
            response: "Retail business in Abu Dhabi requires a Commercial License for Trading. Consider \
                e-commerce integration for broader reach. Prime retail locations include Yas Mall, Marina \
                Mall, and Al Wahda Mall. Initial investment varies from AED 150,000 to AED 1.5M.",
            actions: &[
                ActionScript("E-commerce setup", "primary", "ecommerce"),
                ActionScript("Mall partnerships", "secondary", "partnerships"),
            ],
            investor: None,
        },
        market_analysis: None,
    },
];

const SETUP_KEYWORDS: [&str; 3] = ["invest", "business", "setup"];
const MARKET_KEYWORDS: [&str; 2] = ["market", "analysis"];

impl ReplyScript {
    fn render(&self) -> ChatReply {
        ChatReply {
            response: self.response.to_string(),
            actions: self
                .actions
                .iter()
                .map(|ActionScript(label, kind, action)| ChatAction {
                    label: label.to_string(),
                    kind: kind.to_string(),
                    action: action.to_string(),
                })
                .collect(),
            investor_data: self.investor.as_ref().map(|i| InvestorData {
                business_type: i.business_type.to_string(),
                license_type: i.license_type.to_string(),
                entrepreneur: Entrepreneur {
                    name: i.name.to_string(),
                    title: i.title.to_string(),
                    avatar: i.avatar.to_string(),
                },
            }),
        }
    }
}

fn script_for(category: &str) -> &'static CategoryScript {
    SCRIPTS
        .iter()
        .find(|s| s.key == category)
        .or_else(|| SCRIPTS.iter().find(|s| s.key == DEFAULT_CATEGORY))
        .unwrap_or(&SCRIPTS[0])
}

fn investor_reply(message: &str, category: &str) -> ChatReply {
    let script = script_for(category);
    let lowered = message.to_lowercase();

    if SETUP_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return script.business_setup.render();
    }
    if MARKET_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return script
            .market_analysis
            .as_ref()
            .unwrap_or(&script.business_setup)
            .render();
    }
    script.business_setup.render()
}

fn general_reply(message: &str) -> ChatReply {
    ChatReply {
        response: format!(
            "I understand you're asking about: \"{message}\". Let me help you with that business inquiry."
        ),
        actions: vec![
            ChatAction {
                label: "Learn more".into(),
                kind: "secondary".into(),
                action: "learn".into(),
            },
            ChatAction {
                label: "Get started".into(),
                kind: "primary".into(),
                action: "start".into(),
            },
        ],
        investor_data: None,
    }
}

/// Produce the scripted reply for `request`.
pub fn respond(request: &ChatRequest) -> ChatReply {
    match request.kind.as_deref() {
        Some("investor") => investor_reply(
            &request.message,
            request.category.as_deref().unwrap_or(DEFAULT_CATEGORY),
        ),
        _ => general_reply(&request.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn investor(message: &str, category: Option<&str>) -> ChatReply {
        respond(&ChatRequest {
            message: message.into(),
            category: category.map(str::to_string),
            kind: Some("investor".into()),
        })
    }

    #[test]
    fn general_reply_quotes_the_message() {
        let reply = respond(&ChatRequest {
            message: "What permits do I need?".into(),
            category: None,
            kind: None,
        });
        assert!(reply.response.contains("\"What permits do I need?\""));
        assert_eq!(reply.actions.len(), 2);
        assert!(reply.investor_data.is_none());
    }

    #[test]
    fn restaurant_setup_carries_investor_data() {
        let reply = investor("I want to INVEST in a restaurant", Some("restaurants"));
        assert!(reply.response.contains("Commercial License for F&B"));
        let data = reply.investor_data.expect("investor data");
        assert_eq!(data.business_type, "Restaurant");
        assert_eq!(data.entrepreneur.name, "Khalid");
        assert_eq!(reply.actions.len(), 3);
    }

    #[test]
    fn market_question_gets_market_analysis() {
        let reply = investor("show me the market", Some("restaurants"));
        assert!(reply.response.contains("AED 12.8B"));
        assert_eq!(reply.actions[0].action, "market_data");
    }

    #[test]
    fn setup_keywords_win_over_market_keywords() {
        let reply = investor("business market analysis", Some("restaurants"));
        assert!(reply.response.starts_with("For restaurant investment"));
    }

    #[test]
    fn market_question_without_script_falls_back_to_setup() {
        let reply = investor("market analysis please", Some("fast-food"));
        assert!(reply.response.starts_with("Fast food franchises"));
    }

    #[test]
    fn unknown_category_uses_restaurants() {
        let reply = investor("hello", Some("general"));
        assert!(reply.response.starts_with("For restaurant investment"));
        let reply = investor("hello", None);
        assert!(reply.response.starts_with("For restaurant investment"));
    }

    #[test]
    fn retail_setup() {
        let reply = investor("setup a shop", Some("retail-store"));
        assert!(reply.response.contains("Yas Mall"));
        assert_eq!(reply.actions[0].action, "ecommerce");
    }

    #[test]
    fn reply_serializes_camel_case() {
        let reply = investor("invest", Some("restaurants"));
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["investorData"]["licenseType"], "Commercial License for F&B");
        assert_eq!(json["actions"][0]["type"], "secondary");

        let general = serde_json::to_value(general_reply("x")).unwrap();
        assert!(general.get("investorData").is_none());
    }

    #[test]
    fn request_requires_string_message() {
        let issues = ChatRequest::from_json(&json!({"message": 3})).unwrap_err();
        assert!(issues.field("message").is_some());
        let req = ChatRequest::from_json(&json!({"message": "", "type": "investor"})).unwrap();
        assert_eq!(req.kind.as_deref(), Some("investor"));
    }
}
