// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in nurture message templates.
//!
//! Templates personalize on the lead's first name; a lead without a name
//! gets the neutral "there". An unknown template id falls back to the step's
//! literal fallback content, so a misconfigured sequence still sends
//! something sensible.

use propflow_core::types::Lead;

/// Render a template against a lead. Returns `None` for unknown ids; the
/// caller substitutes the step's fallback content.
pub fn render(template_id: &str, lead: &Lead) -> Option<String> {
    let name = lead.name.as_deref().unwrap_or("there");
    let body = match template_id {
        "immediate_call" => format!(
            "Hi {name}! I noticed you're interested in properties. I'd love to help you \
             find the perfect home. When would be a good time for a quick call?"
        ),
        "personalized_properties" => format!(
            "Hi {name}! I've found some properties that match your criteria perfectly. \
             Here are my top recommendations..."
        ),
        "viewing_reminder" => "Don't forget about your property viewing tomorrow! I'm excited \
             to show you around. Let me know if you have any questions."
            .to_string(),
        "welcome_series" => "Welcome! I'm here to help you navigate the real estate market. \
             Here's what's happening in your area..."
            .to_string(),
        "property_recommendations" => "I've curated some properties that might interest you \
             based on your preferences. Take a look and let me know what you think!"
            .to_string(),
        "follow_up_call" => format!(
            "Hi {name}! I wanted to follow up on our conversation. Do you have any \
             questions about the properties I showed you?"
        ),
        "market_update" => "Here's your weekly market update! New listings, price changes, \
             and market trends in your area."
            .to_string(),
        "educational_content" => "Buying a home is a big decision. Here's a helpful guide to \
             the home buying process..."
            .to_string(),
        "market_insights" => "Market insights: what's happening in the real estate market and \
             how it affects your search."
            .to_string(),
        "success_stories" => "Read how other families found their dream homes with us..."
            .to_string(),
        "re_engagement" => format!(
            "Hi {name}! I haven't heard from you in a while. Are you still looking for a \
             home? I have some exciting new listings to share!"
        ),
        _ => return None,
    };
    Some(body)
}

/// Render a step body: template first, literal fallback second.
pub fn render_or_fallback(template_id: &str, fallback: &str, lead: &Lead) -> String {
    render(template_id, lead).unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use propflow_core::types::{LeadId, LeadStatus};

    fn lead(name: Option<&str>) -> Lead {
        Lead {
            id: LeadId("lead_1".into()),
            name: name.map(String::from),
            email: None,
            phone: None,
            budget: None,
            preferred_locations: vec![],
            property_types: vec![],
            timeline: None,
            financing: None,
            score: 0,
            status: LeadStatus::New,
            assigned_agent: None,
            interactions: vec![],
        }
    }

    #[test]
    fn templates_personalize_on_the_lead_name() {
        let rendered = render("immediate_call", &lead(Some("Ada"))).unwrap();
        assert!(rendered.starts_with("Hi Ada!"));
    }

    #[test]
    fn nameless_lead_gets_the_neutral_greeting() {
        let rendered = render("follow_up_call", &lead(None)).unwrap();
        assert!(rendered.starts_with("Hi there!"));
    }

    #[test]
    fn unknown_template_uses_the_fallback() {
        let body = render_or_fallback("no_such_template", "literal fallback", &lead(None));
        assert_eq!(body, "literal fallback");
    }
}
