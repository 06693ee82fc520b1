//! TwiML documents returned to the provider's webhooks

use std::io::Cursor;

use callcenter_admin_core::TelephonyConfig;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::{Error, Result};

const STATUS_CALLBACK_PATH: &str = "/api/twilio/call-status";

const NO_AGENT_MESSAGE: &str =
    "We are sorry, no agent is available to take your call right now. Please try again later.";

/// Parameters for the inbound voice entry document
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    pub greeting: String,
    /// Number the caller is connected to
    pub dial_to: Option<String>,
    /// Where the provider reports the dial outcome
    pub dial_action: String,
}

impl VoiceConfig {
    pub fn from_config(config: &TelephonyConfig) -> Self {
        let dial_action = match &config.base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), STATUS_CALLBACK_PATH),
            None => STATUS_CALLBACK_PATH.to_string(),
        };

        Self {
            greeting: config.greeting.clone(),
            dial_to: config
                .agent_phone_number
                .as_ref()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            dial_action,
        }
    }
}

struct TwimlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl TwimlWriter {
    fn new() -> Result<Self> {
        let mut twiml = Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        };
        twiml.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(twiml)
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::twiml(e.to_string()))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.emit(Event::Start(BytesStart::new(name)))?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn finish(self) -> Result<String> {
        let xml = self.writer.into_inner().into_inner();
        String::from_utf8(xml).map_err(|e| Error::twiml(e.to_string()))
    }
}

/// Greeting followed by a dial to the configured agent line, or an apology
/// and hangup when no line is configured
pub fn voice_response(config: &VoiceConfig) -> Result<String> {
    let mut twiml = TwimlWriter::new()?;
    twiml.emit(Event::Start(BytesStart::new("Response")))?;

    match &config.dial_to {
        Some(number) => {
            twiml.text_element("Say", &config.greeting)?;

            let mut dial = BytesStart::new("Dial");
            dial.push_attribute(("action", config.dial_action.as_str()));
            dial.push_attribute(("method", "POST"));
            twiml.emit(Event::Start(dial))?;
            twiml.emit(Event::Text(BytesText::new(number)))?;
            twiml.emit(Event::End(BytesEnd::new("Dial")))?;
        }
        None => {
            twiml.text_element("Say", NO_AGENT_MESSAGE)?;
            twiml.emit(Event::Empty(BytesStart::new("Hangup")))?;
        }
    }

    twiml.emit(Event::End(BytesEnd::new("Response")))?;
    twiml.finish()
}

/// Acknowledgement with no instructions
pub fn empty_response() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?><Response/>"#.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dial_to: Option<&str>) -> VoiceConfig {
        VoiceConfig {
            greeting: "Thank you for calling our call center. Please wait while we connect you to an agent."
                .to_string(),
            dial_to: dial_to.map(str::to_string),
            dial_action: "/api/twilio/call-status".to_string(),
        }
    }

    #[test]
    fn test_voice_response_dials_agent() {
        let xml = voice_response(&config(Some("+15551112222"))).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(
            "<Say>Thank you for calling our call center. Please wait while we connect you to an agent.</Say>"
        ));
        assert!(xml.contains(
            r#"<Dial action="/api/twilio/call-status" method="POST">+15551112222</Dial>"#
        ));
        assert!(xml.ends_with("</Response>"));
    }

    #[test]
    fn test_voice_response_without_destination_hangs_up() {
        let xml = voice_response(&config(None)).unwrap();
        assert!(xml.contains("<Hangup/>"));
        assert!(!xml.contains("<Dial"));
    }

    #[test]
    fn test_greeting_is_escaped() {
        let mut cfg = config(Some("+15551112222"));
        cfg.greeting = "Sales & <Support>".to_string();
        let xml = voice_response(&cfg).unwrap();
        assert!(xml.contains("<Say>Sales &amp; &lt;Support&gt;</Say>"));
    }

    #[test]
    fn test_from_config_uses_base_url() {
        let telephony = TelephonyConfig {
            base_url: Some("https://cc.example.com/".to_string()),
            agent_phone_number: Some(" ".to_string()),
            ..Default::default()
        };
        let cfg = VoiceConfig::from_config(&telephony);
        assert_eq!(cfg.dial_action, "https://cc.example.com/api/twilio/call-status");
        assert!(cfg.dial_to.is_none());
    }

    #[test]
    fn test_empty_response() {
        assert!(empty_response().ends_with("<Response/>"));
    }
}
