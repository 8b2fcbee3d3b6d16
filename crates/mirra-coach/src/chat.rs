//! Deterministic chat responder
//!
//! Keyword rules are tried in priority order. Messages matching none of them
//! get one of five generic replies, picked by a SHA-256 of the message so the
//! same message always gets the same reply.

use sha2::{Digest, Sha256};

use crate::SkillLevel;

const GENERIC_RESPONSES: [&str; 5] = [
    "Keep dancing! I'm watching your moves and will let you know how you're doing.",
    "Stay focused on the reference and let your body follow the rhythm.",
    "Every session makes you better. Let's keep the momentum going!",
    "Remember to breathe and stay loose. Tension makes movement stiff.",
    "I'm here to help. Ask me for tips, your score, or how to improve.",
];

/// Session facts the responder may quote
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChatContext {
    pub skill_level: SkillLevel,
    /// Average score of the active session, if any
    pub average_score: Option<f64>,
    pub average_similarity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Help,
    Improve,
    Frustrated,
    Score,
    Thanks,
}

const RULES: &[(Intent, &[&str])] = &[
    (Intent::Help, &["help", "tip"]),
    (Intent::Improve, &["improve", "better"]),
    (Intent::Frustrated, &["frustrated", "hard", "difficult"]),
    (Intent::Score, &["score", "point"]),
    (Intent::Thanks, &["thank"]),
];

fn detect_intent(message: &str) -> Option<Intent> {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(intent, _)| *intent)
}

/// Index of the generic reply for a message
pub fn generic_index(message: &str) -> usize {
    let digest = Sha256::digest(message.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(head) % GENERIC_RESPONSES.len() as u64) as usize
}

/// Reply to a free-text message
pub fn respond(message: &str, context: &ChatContext) -> String {
    match detect_intent(message) {
        Some(Intent::Help) => match context.skill_level {
            SkillLevel::Beginner => {
                "Try to match the big shapes first: arms, legs, then timing. Keep your whole body in view."
                    .to_string()
            }
            SkillLevel::Intermediate => {
                "Focus on clean transitions. Hit each pose on the beat before moving to the next."
                    .to_string()
            }
            SkillLevel::Advanced => {
                "Work on precision: elbow and knee angles, and hold each accent for its full count."
                    .to_string()
            }
        },
        Some(Intent::Improve) => {
            "To improve, practise a short section slowly, then speed up once your accuracy stays above 75%."
                .to_string()
        }
        Some(Intent::Frustrated) => {
            "It's normal to find this hard. Slow down, take a breath, and celebrate each small win."
                .to_string()
        }
        Some(Intent::Score) => match (context.average_score, context.average_similarity) {
            (Some(score), Some(similarity)) => format!(
                "Your average score this session is {score:.1} with {similarity:.1}% similarity. Keep it up!"
            ),
            (Some(score), None) => {
                format!("Your average score this session is {score:.1}. Keep it up!")
            }
            _ => "Start dancing and I'll track your score as you go!".to_string(),
        },
        Some(Intent::Thanks) => "You're welcome! Keep up the great work!".to_string(),
        None => GENERIC_RESPONSES[generic_index(message)].to_string(),
    }
}
