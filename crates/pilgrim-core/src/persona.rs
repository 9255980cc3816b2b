//! System instructions that frame how the model answers.

use std::fmt;

const PILGRIM_GUIDE: &str = "I am your personal PilgrimPath guide for the Ujjain Simhastha. \
I'm here to help you directly. Ask me for the safest routes, where to find food, safety tips, \
or any other guidance you need. I will give you clear and concise answers in the language you \
use (English or Hindi). How can I assist you right now?";

const DIRECT_GUIDE: &str = "I am your personal Ujjain360 guide for the Ujjain Simhastha. \
I'm here to help you directly. Ask me for the safest routes, where to find food, safety tips, \
or any other guidance you need. I will give you clear and concise answers in the language you \
use (English or Hindi). How can I assist you right now?";

const ADMIN_ANALYST: &str = "You are an expert data analyst for the PilgrimPath app admin. \
Based on the user's query and the app's data context, provide concise, data-driven insights. \
Be helpful and direct.";

/// Which voice the model answers in.
///
/// All personas share identical request mechanics; only the instruction text
/// and the audience differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    /// Public-facing guide: routes, food, safety, bilingual English/Hindi.
    PilgrimGuide,
    /// Admin dashboard analyst.
    AdminAnalyst,
    /// Guide used by the standalone client that talks to the model without
    /// the backend. Same brief as [`Persona::PilgrimGuide`] under the
    /// Ujjain360 name.
    DirectGuide,
}

impl Persona {
    pub fn system_instruction(self) -> &'static str {
        match self {
            Persona::PilgrimGuide => PILGRIM_GUIDE,
            Persona::AdminAnalyst => ADMIN_ANALYST,
            Persona::DirectGuide => DIRECT_GUIDE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Persona::PilgrimGuide => "pilgrim-guide",
            Persona::AdminAnalyst => "admin-analyst",
            Persona::DirectGuide => "direct-guide",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
