use serde::{Deserialize, Serialize};

use crate::core::error::CatalogError;
use crate::scoring::classifier::ReplyQuality;

/// Persona used when a guest type has no curated reply bank of its own.
pub const DEFAULT_PERSONA: &str = "curious_explorer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioCategory {
    Sales,
    Complaint,
    Service,
    PreDeparture,
    Onboard,
}

/// A named behavioral profile for a simulated guest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub name_cn: String,
    pub icon: String,
    pub difficulty: Difficulty,
    pub description: String,
    pub sample_lines: Vec<String>,
}

/// A named training situation: opening line, escalation lines, objectives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub category: ScenarioCategory,
    pub title: String,
    pub title_cn: String,
    pub difficulty: Difficulty,
    pub opening_line: String,
    pub trigger_lines: Vec<String>,
    pub training_objectives: Vec<String>,
}

/// Canned guest replies for one persona, bucketed by the classified quality
/// of the agent utterance they answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyBank {
    pub confused: Vec<String>,
    pub weak: Vec<String>,
    pub good: Vec<String>,
}

impl ReplyBank {
    pub fn lines(&self, quality: ReplyQuality) -> &[String] {
        match quality {
            ReplyQuality::Confused => &self.confused,
            ReplyQuality::Weak => &self.weak,
            ReplyQuality::Good => &self.good,
        }
    }
}

/// Fully materialized persona/scenario reference data. Built once at startup;
/// sessions hold ids and resolve them through the explicit lookups below.
#[derive(Debug, Clone)]
pub struct Catalog {
    personas: Vec<Persona>,
    scenarios: Vec<Scenario>,
    banks: Vec<(String, ReplyBank)>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            personas: builtin_personas(),
            scenarios: builtin_scenarios(),
            banks: builtin_reply_banks(),
        }
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn persona(&self, id: &str) -> Result<&Persona, CatalogError> {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::PersonaNotFound(id.to_string()))
    }

    pub fn scenario(&self, id: &str) -> Result<&Scenario, CatalogError> {
        self.scenarios
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CatalogError::ScenarioNotFound(id.to_string()))
    }

    /// Reply bank for a persona. Personas without curated lines share the
    /// default persona's bank; that substitution is intentional policy, not
    /// an error.
    pub fn reply_bank(&self, persona_id: &str) -> &ReplyBank {
        self.banks
            .iter()
            .find(|(id, _)| id == persona_id)
            .or_else(|| self.banks.iter().find(|(id, _)| id == DEFAULT_PERSONA))
            .map(|(_, bank)| bank)
            .expect("default reply bank must exist")
    }
}

fn builtin_personas() -> Vec<Persona> {
    vec![
        Persona {
            id: "curious_explorer".into(),
            name: "Curious Explorer".into(),
            name_cn: "好奇型".into(),
            icon: "🔵".into(),
            difficulty: Difficulty::Easy,
            description: "Friendly, inquisitive guest who enjoys learning about options".into(),
            sample_lines: vec![
                "Oh, that's interesting! Tell me more about...".into(),
                "I hadn't thought of that. What about...?".into(),
                "That sounds lovely! And what's the food like?".into(),
            ],
        },
        Persona {
            id: "value_seeker".into(),
            name: "Value-Seeker".into(),
            name_cn: "性价比型".into(),
            icon: "🟡".into(),
            difficulty: Difficulty::Medium,
            description: "Price-conscious guest who compares options and challenges value claims"
                .into(),
            sample_lines: vec![
                "But competitor X offers this for half the price...".into(),
                "What's the actual dollar value of those inclusions?".into(),
                "That sounds like marketing talk to me.".into(),
            ],
        },
        Persona {
            id: "anxious_planner".into(),
            name: "Anxious Planner".into(),
            name_cn: "焦虑型".into(),
            icon: "🟠".into(),
            difficulty: Difficulty::Medium,
            description: "Worried guest who needs reassurance about details".into(),
            sample_lines: vec![
                "But what if...?".into(),
                "I'm just worried that...".into(),
                "That makes me feel better, but what about...?".into(),
            ],
        },
        Persona {
            id: "strict_impatient".into(),
            name: "Strict & Impatient".into(),
            name_cn: "严肃急躁型".into(),
            icon: "🔴".into(),
            difficulty: Difficulty::Hard,
            description: "Direct, time-sensitive guest with low tolerance for delays".into(),
            sample_lines: vec![
                "I don't need the history, just fix it.".into(),
                "How long is this going to take?".into(),
                "Get to the point.".into(),
            ],
        },
        Persona {
            id: "dissatisfied_customer".into(),
            name: "Dissatisfied Customer".into(),
            name_cn: "不满型".into(),
            icon: "⚫".into(),
            difficulty: Difficulty::Hard,
            description: "Emotionally charged guest expressing strong dissatisfaction".into(),
            sample_lines: vec![
                "This is absolutely unacceptable!".into(),
                "I can't believe this is happening!".into(),
                "I want to speak to a manager!".into(),
            ],
        },
    ]
}

fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "S1_price_objection".into(),
            category: ScenarioCategory::Sales,
            title: "Why is Viking so expensive?".into(),
            title_cn: "为什么这么贵？".into(),
            difficulty: Difficulty::Medium,
            opening_line: "I'm looking at your Mediterranean cruise. I found the same route on \
                           another cruise line for half the price. Why should I pay more for Viking?"
                .into(),
            trigger_lines: vec![
                "Your all-inclusive thing sounds like marketing speak.".into(),
                "I just want to relax, I don't need cultural lectures.".into(),
            ],
            training_objectives: vec![
                "Value presentation".into(),
                "Needs discovery".into(),
                "Objection handling".into(),
            ],
        },
        Scenario {
            id: "S2_cabin_upgrade".into(),
            category: ScenarioCategory::Sales,
            title: "Convince me to upgrade".into(),
            title_cn: "说服我升级".into(),
            difficulty: Difficulty::Medium,
            opening_line: "I'm looking at the basic Veranda cabin. What's the real difference if \
                           I upgrade? Is it worth the extra money?"
                .into(),
            trigger_lines: vec![
                "That sounds nice but I'm not sure I need it.".into(),
                "What about for our anniversary trip specifically?".into(),
            ],
            training_objectives: vec![
                "Upsell techniques".into(),
                "Feature-benefit translation".into(),
            ],
        },
        Scenario {
            id: "C1_excursion_cancelled".into(),
            category: ScenarioCategory::Complaint,
            title: "Shore excursion cancelled!".into(),
            title_cn: "岸上游取消了！".into(),
            difficulty: Difficulty::Hard,
            opening_line: "I specifically booked this cruise for the Santorini excursion. You're \
                           telling me it's cancelled because of weather? This is completely \
                           unacceptable!"
                .into(),
            trigger_lines: vec![
                "I don't want to hear about safety! I paid for this!".into(),
                "I want a full refund for the entire cruise!".into(),
            ],
            training_objectives: vec![
                "LEAP model application".into(),
                "De-escalation techniques".into(),
                "Solution presentation".into(),
            ],
        },
        Scenario {
            id: "C2_wifi_complaint".into(),
            category: ScenarioCategory::Complaint,
            title: "Wi-Fi is terrible!".into(),
            title_cn: "Wi-Fi太慢了！".into(),
            difficulty: Difficulty::Medium,
            opening_line: "The Wi-Fi is absolutely useless! I can't even check my email. I paid \
                           thousands for this cruise and can't stay connected. Fix this NOW!"
                .into(),
            trigger_lines: vec![
                "Don't give me technical excuses!".into(),
                "Other cruise lines have better Wi-Fi!".into(),
            ],
            training_objectives: vec![
                "Managing expectations".into(),
                "Technical explanation".into(),
                "Offering alternatives".into(),
            ],
        },
        Scenario {
            id: "V1_dietary_requirements".into(),
            category: ScenarioCategory::Service,
            title: "Dietary requirements".into(),
            title_cn: "饮食需求".into(),
            difficulty: Difficulty::Easy,
            opening_line: "I have severe allergies - nuts and shellfish. I've had terrible \
                           experiences on other trips. Can Viking really accommodate me?"
                .into(),
            trigger_lines: vec![
                "How can I be sure the kitchen knows?".into(),
                "What if there's cross-contamination?".into(),
            ],
            training_objectives: vec![
                "Reassurance techniques".into(),
                "Process explanation".into(),
            ],
        },
    ]
}

fn builtin_reply_banks() -> Vec<(String, ReplyBank)> {
    vec![
        (
            "curious_explorer".into(),
            ReplyBank {
                confused: vec![
                    "Sorry, I don't quite follow. What do you mean?".into(),
                    "I'm a little lost now. Could you start over?".into(),
                ],
                weak: vec![
                    "Hmm, okay. But what does that actually mean for my trip?".into(),
                    "I'm not sure that answers it. Could you explain a bit more?".into(),
                ],
                good: vec![
                    "That's really helpful! Can you tell me more about the shore excursions?"
                        .into(),
                    "Interesting! What about the dining options on board?".into(),
                    "I see! And how does the cultural program work?".into(),
                ],
            },
        ),
        (
            "value_seeker".into(),
            ReplyBank {
                confused: vec![
                    "That tells me nothing. Numbers, please.".into(),
                    "Was that supposed to be an answer?".into(),
                ],
                weak: vec![
                    "Okay, but break it down for me. What's the actual dollar value?".into(),
                    "I'm still not convinced. Other cruise lines include similar things.".into(),
                ],
                good: vec![
                    "Hmm, that's a fair point. What else should I consider?".into(),
                    "Okay, that breakdown actually helps. Keep going.".into(),
                ],
            },
        ),
        (
            "dissatisfied_customer".into(),
            ReplyBank {
                confused: vec![
                    "What is that supposed to mean? I want a real answer!".into(),
                    "Are you even listening to me?".into(),
                ],
                weak: vec![
                    "That's not good enough! I expected better from Viking!".into(),
                    "Is that really all you have to say?".into(),
                ],
                good: vec![
                    "Well... I suppose that's something. But I'm still not happy.".into(),
                    "Fine. But this better not happen again.".into(),
                ],
            },
        ),
    ]
}
