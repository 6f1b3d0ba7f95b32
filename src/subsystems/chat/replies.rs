//! Canned agent replies. There is no model behind the chat; each user turn
//! gets one of these, picked uniformly.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const GREETING: &str = "Hi there! I'm your WanderWise AI travel assistant for Sri Lanka. \
I'll help you create the perfect itinerary. What kind of experience are you looking for?";

pub const AGENT_REPLIES: [&str; 5] = [
    "I've noted your preferences. How many days are you planning to stay in Sri Lanka?",
    "That sounds exciting! Are you more interested in beaches, cultural sites, wildlife, or tea country?",
    "Got it. Would you like to include any specific activities like surfing, hiking, or safari?",
    "I'll factor that in. What's your preferred accommodation style - luxury hotels, boutique stays, or budget options?",
    "Perfect! I'm creating your personalized Sri Lanka itinerary now. You can see it updating on the right.",
];

#[derive(Debug)]
pub struct CannedReplies {
    rng: StdRng,
}

impl CannedReplies {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn pick(&mut self) -> &'static str {
        AGENT_REPLIES.choose(&mut self.rng).copied().unwrap_or(AGENT_REPLIES[0])
    }
}
